//! Randomized spatial/temporal perturbation of landmark sequences
//!
//! Used offline to expand a training set. Each call draws fresh randomness;
//! pass a seeded RNG to [`augment_with_rng`] for reproducible output.

use mudra_core::{AugmentConfig, MIN_SCALE};
use crate::error::LandmarkError;
use crate::layout::Landmarks;
use ndarray::{s, Axis, Zip};
use rand::Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Perturb a `(frames, keypoints, coords)` sequence using the thread RNG.
/// The output has the same shape as the input.
pub fn augment_landmarks(
    landmarks: &Landmarks,
    config: &AugmentConfig,
) -> Result<Landmarks, LandmarkError> {
    augment_with_rng(landmarks, config, &mut rand::thread_rng())
}

/// Perturb a sequence with a caller-supplied RNG:
/// - one rotation in `[-rotation_angle, rotation_angle]` degrees and one scale
///   in `[0.9, scale_factor]`, applied to the x/y plane of every point
/// - independent Gaussian noise on every coordinate
/// - independent per-frame drops, padded back to the original length by
///   repeating the last surviving frame
///
/// If every frame is dropped, one random frame is repeated for the whole
/// sequence, so the result never has zero frames.
pub fn augment_with_rng<R: Rng>(
    landmarks: &Landmarks,
    config: &AugmentConfig,
    rng: &mut R,
) -> Result<Landmarks, LandmarkError> {
    config.validate().map_err(LandmarkError::Config)?;

    let (frames, _, coords) = landmarks.dim();
    if frames == 0 {
        return Err(LandmarkError::Shape("Zero frames detected".to_string()));
    }
    if coords < 2 {
        return Err(LandmarkError::Shape(format!(
            "Invalid shape {:?}, need at least x and y coordinates",
            landmarks.dim()
        )));
    }

    let theta = rng
        .gen_range(-config.rotation_angle..=config.rotation_angle)
        .to_radians();
    let scale = rng.gen_range(MIN_SCALE..=config.scale_factor);
    let (sin, cos) = (theta.sin() as f32, theta.cos() as f32);
    let scale = scale as f32;

    let mut augmented = landmarks.clone();
    {
        let (mut xs, mut ys) = augmented.multi_slice_mut((s![.., .., 0], s![.., .., 1]));
        Zip::from(&mut xs).and(&mut ys).for_each(|x, y| {
            let (x0, y0) = (*x, *y);
            *x = (x0 * cos + y0 * sin) * scale;
            *y = (-x0 * sin + y0 * cos) * scale;
        });
    }

    if config.noise_std > 0.0 {
        let normal = Normal::new(0.0, config.noise_std)
            .map_err(|e| LandmarkError::Config(format!("noise_std: {}", e)))?;
        augmented.mapv_inplace(|v| v + normal.sample(&mut *rng) as f32);
    }

    let kept: Vec<usize> = (0..frames)
        .filter(|_| rng.gen::<f64>() > config.frame_drop_prob)
        .collect();

    let indices: Vec<usize> = match kept.last() {
        Some(&last) => {
            let mut indices = kept.clone();
            indices.resize(frames, last);
            indices
        }
        None => vec![rng.gen_range(0..frames); frames],
    };
    debug!(
        "Augmented {} frames: theta={:.3} rad, scale={:.3}, kept {}",
        frames,
        theta,
        scale,
        kept.len()
    );

    Ok(augmented.select(Axis(0), &indices))
}
