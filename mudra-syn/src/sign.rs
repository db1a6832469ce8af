//! The synthesized sign sequence handed back to callers

use crate::error::SynthesisError;
use crate::video::VideoEncoder;
use mudra_core::{Gloss, SignFormat};
use mudra_lmk::{write_landmarks, LandmarkError, Landmarks};
use ndarray::{concatenate, Axis};
use std::path::{Path, PathBuf};

/// Container extensions accepted when saving a video sequence
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "mov", "webm", "avi"];

/// One stored clip contributing to a video sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoClip {
    pub gloss: Gloss,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub enum SignBody {
    /// Segments concatenated along the frame axis
    Landmarks {
        frames: Landmarks,
        segment_lengths: Vec<usize>,
    },
    /// Clips to be played or encoded in order
    Video { clips: Vec<VideoClip>, fps: u32 },
}

/// Ordered concatenation of segments for one translated utterance
#[derive(Debug, Clone)]
pub struct SignSequence {
    name: String,
    glosses: Vec<Gloss>,
    skipped: Vec<String>,
    body: SignBody,
}

fn join_name(glosses: &[Gloss]) -> String {
    glosses
        .iter()
        .map(Gloss::as_str)
        .collect::<Vec<_>>()
        .join("_")
}

impl SignSequence {
    /// Concatenate landmark segments, one per gloss, in order
    pub fn from_landmarks(
        glosses: Vec<Gloss>,
        segments: Vec<Landmarks>,
        skipped: Vec<String>,
    ) -> Result<Self, SynthesisError> {
        if glosses.len() != segments.len() {
            return Err(SynthesisError::Landmark(LandmarkError::Shape(format!(
                "{} glosses for {} segments",
                glosses.len(),
                segments.len()
            ))));
        }
        if segments.is_empty() {
            return Err(SynthesisError::Landmark(LandmarkError::Shape(
                "no segments to concatenate".to_string(),
            )));
        }

        let segment_lengths: Vec<usize> = segments.iter().map(|s| s.dim().0).collect();
        let views: Vec<_> = segments.iter().map(|s| s.view()).collect();
        let frames = concatenate(Axis(0), &views)
            .map_err(|e| SynthesisError::Landmark(LandmarkError::Shape(e.to_string())))?;

        Ok(Self {
            name: join_name(&glosses),
            glosses,
            skipped,
            body: SignBody::Landmarks {
                frames,
                segment_lengths,
            },
        })
    }

    pub fn from_clips(clips: Vec<VideoClip>, fps: u32, skipped: Vec<String>) -> Self {
        let glosses: Vec<Gloss> = clips.iter().map(|c| c.gloss.clone()).collect();
        Self {
            name: join_name(&glosses),
            glosses,
            skipped,
            body: SignBody::Video { clips, fps },
        }
    }

    /// Resolved glosses joined by `_`
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Glosses that contributed a segment, in input order
    pub fn glosses(&self) -> &[Gloss] {
        &self.glosses
    }

    /// Tokens or glosses left out because they had no gloss or no segment
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn body(&self) -> &SignBody {
        &self.body
    }

    pub fn format(&self) -> SignFormat {
        match self.body {
            SignBody::Landmarks { .. } => SignFormat::Landmarks,
            SignBody::Video { .. } => SignFormat::Video,
        }
    }

    /// Frame count for landmarks, clip count for video
    pub fn len(&self) -> usize {
        match &self.body {
            SignBody::Landmarks { frames, .. } => frames.dim().0,
            SignBody::Video { clips, .. } => clips.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn landmarks(&self) -> Option<&Landmarks> {
        match &self.body {
            SignBody::Landmarks { frames, .. } => Some(frames),
            SignBody::Video { .. } => None,
        }
    }

    pub fn segment_lengths(&self) -> Option<&[usize]> {
        match &self.body {
            SignBody::Landmarks {
                segment_lengths, ..
            } => Some(segment_lengths),
            SignBody::Video { .. } => None,
        }
    }

    pub fn clips(&self) -> Option<&[VideoClip]> {
        match &self.body {
            SignBody::Video { clips, .. } => Some(clips),
            SignBody::Landmarks { .. } => None,
        }
    }

    /// Save with a default `ffmpeg` from `PATH` for video sequences
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SynthesisError> {
        let fps = match &self.body {
            SignBody::Video { fps, .. } => *fps,
            SignBody::Landmarks { .. } => mudra_core::DEFAULT_FPS,
        };
        self.save_with(path, &VideoEncoder::new("ffmpeg", fps))
    }

    /// Landmarks go to `.npy` or `.csv`; video is re-encoded by `encoder`
    /// into a container named by the extension. Writes are atomic.
    pub fn save_with(
        &self,
        path: impl AsRef<Path>,
        encoder: &VideoEncoder,
    ) -> Result<(), SynthesisError> {
        let path = path.as_ref();
        match &self.body {
            SignBody::Landmarks { frames, .. } => {
                write_landmarks(path, frames).map_err(|e| match e {
                    LandmarkError::UnsupportedFormat(p) => SynthesisError::Configuration(format!(
                        "cannot save landmarks as '{}' (use .npy or .csv)",
                        p
                    )),
                    other => SynthesisError::Landmark(other),
                })
            }
            SignBody::Video { clips, .. } => {
                let ext = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .map(|e| e.to_ascii_lowercase())
                    .unwrap_or_default();
                if !VIDEO_EXTENSIONS.contains(&ext.as_str()) {
                    return Err(SynthesisError::Configuration(format!(
                        "cannot save video as '{}' (use one of {})",
                        path.display(),
                        VIDEO_EXTENSIONS.join(", ")
                    )));
                }
                let paths: Vec<PathBuf> = clips.iter().map(|c| c.path.clone()).collect();
                encoder.encode(&paths, path)
            }
        }
    }
}
