//! Fixed-length canonicalization of raw landmark sequences
//!
//! Every (keypoint, coordinate) time series is processed independently:
//! 1. truncate to `target_frames`, or linearly resample up to it
//! 2. Gaussian smoothing
//! 3. z-score outlier rejection followed by linear gap filling
//!
//! The output is always exactly `(target_frames, 543, 3)` with no NaNs.

use mudra_core::PreprocessConfig;
use crate::error::LandmarkError;
use crate::layout::{validate_shape, Landmarks, COORDS, KEYPOINTS};
use ndarray::{s, Array3};
use tracing::debug;

/// Gaussian kernel truncation, in standard deviations
const TRUNCATE: f64 = 4.0;

/// Canonicalize a `(frames, 543, 3)` sequence to `(target_frames, 543, 3)`.
///
/// Fails with [`LandmarkError::Shape`] on zero frames or a keypoint/coordinate
/// count other than 543/3, and with [`LandmarkError::Config`] on invalid options.
pub fn preprocess_landmarks(
    landmarks: &Landmarks,
    config: &PreprocessConfig,
) -> Result<Landmarks, LandmarkError> {
    config.validate().map_err(LandmarkError::Config)?;
    validate_shape(&landmarks.view())?;

    let frames = landmarks.dim().0;
    let target = config.target_frames;
    let truncate = frames >= target;
    debug!(
        "Preprocessing {} frames to {} ({})",
        frames,
        target,
        if truncate { "truncate" } else { "resample" }
    );

    let mut out = Array3::<f32>::zeros((target, KEYPOINTS, COORDS));
    let mut series: Vec<f64> = Vec::with_capacity(frames.max(target));

    for k in 0..KEYPOINTS {
        for c in 0..COORDS {
            series.clear();
            // Non-finite samples count as missing
            series.extend(landmarks.slice(s![.., k, c]).iter().map(|&v| {
                let v = v as f64;
                if v.is_finite() {
                    v
                } else {
                    f64::NAN
                }
            }));

            let mut canonical = if truncate {
                series[..target].to_vec()
            } else if series.iter().all(|v| v.is_nan()) || series.iter().all(|v| *v == 0.0) {
                // Undetected point: leave missing for gap filling
                vec![f64::NAN; target]
            } else {
                resample_linear(&series, target)
            };

            if !canonical.iter().all(|v| v.is_nan()) {
                canonical = gaussian_filter1d(&canonical, config.sigma);
            }

            reject_outliers(&mut canonical, config.threshold);
            fill_gaps(&mut canonical);

            for (t, v) in canonical.into_iter().enumerate() {
                out[[t, k, c]] = v as f32;
            }
        }
    }

    Ok(out)
}

/// Linearly resample `series` onto `len` evenly spaced points spanning the
/// same interval. A single sample is repeated.
pub(crate) fn resample_linear(series: &[f64], len: usize) -> Vec<f64> {
    let n = series.len();
    if n == 0 || len == 0 {
        return vec![f64::NAN; len];
    }
    if n == 1 || len == 1 {
        return vec![series[0]; len];
    }

    let step = (n - 1) as f64 / (len - 1) as f64;
    (0..len)
        .map(|i| {
            let x = i as f64 * step;
            let lo = (x.floor() as usize).min(n - 1);
            let hi = (lo + 1).min(n - 1);
            let frac = x - lo as f64;
            if frac <= f64::EPSILON || lo == hi {
                series[lo]
            } else {
                series[lo] + (series[hi] - series[lo]) * frac
            }
        })
        .collect()
}

/// 1-D Gaussian filter with edge replication at the boundaries.
/// NaNs propagate into every output sample whose window touches them.
pub(crate) fn gaussian_filter1d(series: &[f64], sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as usize;
    if sigma <= 0.0 || radius == 0 || series.len() < 2 {
        return series.to_vec();
    }

    let mut kernel: Vec<f64> = (0..=2 * radius)
        .map(|j| {
            let x = j as f64 - radius as f64;
            (-0.5 * (x / sigma).powi(2)).exp()
        })
        .collect();
    let total: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= total);

    let last = series.len() as isize - 1;
    (0..series.len())
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .map(|(j, w)| {
                    let idx = (i as isize + j as isize - radius as isize).clamp(0, last);
                    w * series[idx as usize]
                })
                .sum()
        })
        .collect()
}

/// Mark samples with |z| >= `threshold` as NaN. Statistics ignore NaNs; a
/// series with zero spread has undefined z-scores and is left alone.
pub(crate) fn reject_outliers(series: &mut [f64], threshold: f64) {
    let valid: Vec<f64> = series.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return;
    }

    let n = valid.len() as f64;
    let mean = valid.iter().sum::<f64>() / n;
    let variance = valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();
    if !(std > 0.0 && std.is_finite()) {
        return;
    }

    for v in series.iter_mut() {
        if !v.is_nan() && ((*v - mean) / std).abs() >= threshold {
            *v = f64::NAN;
        }
    }
}

/// Fill NaN gaps by linear interpolation over the valid samples, extending
/// linearly past the first/last valid sample. No valid samples: zero-fill.
pub(crate) fn fill_gaps(series: &mut [f64]) {
    let valid: Vec<usize> = (0..series.len()).filter(|&i| !series[i].is_nan()).collect();

    match valid.len() {
        0 => series.iter_mut().for_each(|v| *v = 0.0),
        n if n == series.len() => {}
        1 => {
            let only = series[valid[0]];
            series.iter_mut().for_each(|v| *v = only);
        }
        _ => {
            let line = |a: usize, b: usize, x: usize, s: &[f64]| {
                let slope = (s[b] - s[a]) / (b as f64 - a as f64);
                s[a] + slope * (x as f64 - a as f64)
            };
            let first = valid[0];
            let second = valid[1];
            let last = valid[valid.len() - 1];
            let penultimate = valid[valid.len() - 2];

            for i in 0..series.len() {
                if !series[i].is_nan() {
                    continue;
                }
                let filled = if i < first {
                    line(first, second, i, series)
                } else if i > last {
                    line(penultimate, last, i, series)
                } else {
                    // i lies strictly between two valid samples
                    let right_pos = valid.partition_point(|&v| v < i);
                    line(valid[right_pos - 1], valid[right_pos], i, series)
                };
                series[i] = filled;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_resample_keeps_endpoints() {
        let out = resample_linear(&[0.0, 10.0], 5);
        assert_eq!(out.len(), 5);
        assert!(approx(out[0], 0.0));
        assert!(approx(out[2], 5.0));
        assert!(approx(out[4], 10.0));
    }

    #[test]
    fn test_resample_single_sample_repeats() {
        assert_eq!(resample_linear(&[3.0], 4), vec![3.0; 4]);
    }

    #[test]
    fn test_gaussian_zero_sigma_is_identity() {
        let s = vec![1.0, 5.0, -2.0, 7.0];
        assert_eq!(gaussian_filter1d(&s, 0.0), s);
    }

    #[test]
    fn test_gaussian_preserves_constant_series() {
        let s = vec![2.5; 20];
        for v in gaussian_filter1d(&s, 1.5) {
            assert!(approx(v, 2.5));
        }
    }

    #[test]
    fn test_gaussian_smooths_spike() {
        let mut s = vec![0.0; 21];
        s[10] = 1.0;
        let out = gaussian_filter1d(&s, 1.0);
        assert!(out[10] < 1.0);
        assert!(out[9] > 0.0 && approx(out[9], out[11]));
        let total: f64 = out.iter().sum();
        assert!(approx(total, 1.0));
    }

    #[test]
    fn test_reject_outliers_marks_spike() {
        let mut s = vec![0.0; 30];
        s[15] = 100.0;
        reject_outliers(&mut s, 3.0);
        assert!(s[15].is_nan());
        assert_eq!(s.iter().filter(|v| v.is_nan()).count(), 1);
    }

    #[test]
    fn test_reject_outliers_constant_series_untouched() {
        let mut s = vec![4.0; 10];
        reject_outliers(&mut s, 3.0);
        assert!(s.iter().all(|v| *v == 4.0));
    }

    #[test]
    fn test_fill_gaps_interior_and_edges() {
        let mut s = vec![f64::NAN, 1.0, f64::NAN, 3.0, f64::NAN];
        fill_gaps(&mut s);
        assert!(approx(s[0], 0.0));
        assert!(approx(s[2], 2.0));
        assert!(approx(s[4], 4.0));
    }

    #[test]
    fn test_fill_gaps_all_missing_zero_fills() {
        let mut s = vec![f64::NAN; 6];
        fill_gaps(&mut s);
        assert!(s.iter().all(|v| *v == 0.0));
    }

    #[test]
    fn test_fill_gaps_single_valid_sample() {
        let mut s = vec![f64::NAN, f64::NAN, 7.0];
        fill_gaps(&mut s);
        assert_eq!(s, vec![7.0; 3]);
    }
}
