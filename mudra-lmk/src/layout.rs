//! Canonical keypoint layout of a landmark frame

use crate::error::LandmarkError;
use ndarray::{concatenate, s, Array3, ArrayView3, Axis};
use std::ops::Range;

/// `(frames, keypoints, coords)` landmark tensor
pub type Landmarks = Array3<f32>;

pub const FACE: usize = 468;
pub const LEFT_HAND: usize = 21;
pub const RIGHT_HAND: usize = 21;
pub const POSE: usize = 33;

/// Keypoints per frame
pub const KEYPOINTS: usize = FACE + LEFT_HAND + RIGHT_HAND + POSE;

/// Coordinates per keypoint (x, y, z)
pub const COORDS: usize = 3;

/// Coordinates per keypoint in the visualization variant (x, y, z, visibility, presence)
pub const COORDS_WITH_PRESENCE: usize = 5;

pub const FACE_RANGE: Range<usize> = 0..FACE;
pub const LEFT_HAND_RANGE: Range<usize> = FACE..FACE + LEFT_HAND;
pub const RIGHT_HAND_RANGE: Range<usize> = FACE + LEFT_HAND..FACE + LEFT_HAND + RIGHT_HAND;
pub const POSE_RANGE: Range<usize> = FACE + LEFT_HAND + RIGHT_HAND..KEYPOINTS;

/// Check the `(frames >= 1, 543, 3)` contract. Shape is never coerced.
pub fn validate_shape(landmarks: &ArrayView3<'_, f32>) -> Result<(), LandmarkError> {
    let (frames, keypoints, coords) = landmarks.dim();
    if frames == 0 {
        return Err(LandmarkError::Shape("Zero frames detected".to_string()));
    }
    if keypoints != KEYPOINTS || coords != COORDS {
        return Err(LandmarkError::Shape(format!(
            "Invalid shape {:?}, expected [frames, {}, {}]",
            landmarks.dim(),
            KEYPOINTS,
            COORDS
        )));
    }
    Ok(())
}

/// Landmarks split by body part, as produced by per-part extractors.
/// Any part may be absent (e.g. a hand out of frame for the whole clip).
#[derive(Debug, Clone, Default)]
pub struct LandmarkParts {
    pub face: Option<Array3<f32>>,
    pub left_hand: Option<Array3<f32>>,
    pub right_hand: Option<Array3<f32>>,
    pub pose: Option<Array3<f32>>,
}

impl LandmarkParts {
    /// Concatenate the parts into one `(frames, 543, 3)` tensor in
    /// face / left hand / right hand / pose order, zero-filling absent parts.
    pub fn assemble(&self) -> Result<Landmarks, LandmarkError> {
        let parts = [
            ("face", &self.face, FACE),
            ("left_hand", &self.left_hand, LEFT_HAND),
            ("right_hand", &self.right_hand, RIGHT_HAND),
            ("pose", &self.pose, POSE),
        ];

        let mut frames: Option<usize> = None;
        for (name, part, keypoints) in parts.iter() {
            if let Some(arr) = part {
                let (f, k, c) = arr.dim();
                if k != *keypoints || c != COORDS {
                    return Err(LandmarkError::Shape(format!(
                        "{} has shape {:?}, expected [frames, {}, {}]",
                        name,
                        arr.dim(),
                        keypoints,
                        COORDS
                    )));
                }
                match frames {
                    Some(expected) if expected != f => {
                        return Err(LandmarkError::Shape(format!(
                            "{} has {} frames, other parts have {}",
                            name, f, expected
                        )));
                    }
                    _ => frames = Some(f),
                }
            }
        }

        let frames = frames
            .ok_or_else(|| LandmarkError::Shape("no landmark parts present".to_string()))?;
        if frames == 0 {
            return Err(LandmarkError::Shape("Zero frames detected".to_string()));
        }

        let filled: Vec<Array3<f32>> = parts
            .iter()
            .map(|(_, part, keypoints)| match part {
                Some(arr) => arr.clone(),
                None => Array3::zeros((frames, *keypoints, COORDS)),
            })
            .collect();
        let views: Vec<_> = filled.iter().map(|a| a.view()).collect();

        concatenate(Axis(1), &views).map_err(|e| LandmarkError::Shape(e.to_string()))
    }
}

/// Expand `(frames, 543, 3)` to `(frames, 543, 5)` for visualization.
/// Visibility and presence are 1.0 for a detected point (finite and not all
/// zero) and 0.0 otherwise.
pub fn with_presence_channels(landmarks: &Landmarks) -> Result<Array3<f32>, LandmarkError> {
    validate_shape(&landmarks.view())?;
    let (frames, keypoints, _) = landmarks.dim();
    let mut out = Array3::<f32>::zeros((frames, keypoints, COORDS_WITH_PRESENCE));
    out.slice_mut(s![.., .., ..COORDS]).assign(landmarks);

    for f in 0..frames {
        for k in 0..keypoints {
            let point = landmarks.slice(s![f, k, ..]);
            let detected = point.iter().all(|v| v.is_finite()) && point.iter().any(|v| *v != 0.0);
            let flag = if detected { 1.0 } else { 0.0 };
            out[[f, k, 3]] = flag;
            out[[f, k, 4]] = flag;
        }
    }
    Ok(out)
}

/// Drop the visibility/presence channels of a 5-channel tensor
pub fn strip_presence_channels(landmarks: &Array3<f32>) -> Result<Landmarks, LandmarkError> {
    let (frames, keypoints, coords) = landmarks.dim();
    if coords != COORDS_WITH_PRESENCE || keypoints != KEYPOINTS || frames == 0 {
        return Err(LandmarkError::Shape(format!(
            "Invalid shape {:?}, expected [frames, {}, {}]",
            landmarks.dim(),
            KEYPOINTS,
            COORDS_WITH_PRESENCE
        )));
    }
    Ok(landmarks.slice(s![.., .., ..COORDS]).to_owned())
}
