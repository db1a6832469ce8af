//! Locating stored sign segments on disk
//!
//! Landmark segments live in folders under `landmarks_dir`:
//!
//! ```text
//! landmarks/<gloss>_<video_id>/landmarks_preprocessed.npy
//! landmarks/<video_id>/landmarks_preprocessed.npy
//! landmarks/<gloss>/landmarks_preprocessed.npy
//! ```
//!
//! The `<video_id>/` form is the dataset layout the batch jobs in mudra-lmk
//! read and write.
//!
//! Video segments are files under `videos_dir` named `<gloss>.mp4` or
//! `<video_id>.mp4`. When none of the exact names exist, [`FallbackMatch`]
//! decides which other names are acceptable; among those the
//! lexicographically first wins.

use mudra_core::{FallbackMatch, SynthesisOptions};
use mudra_lmk::{read_landmarks, Landmarks};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Where segment artifacts live and what they are called
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentLayout {
    pub landmarks_dir: PathBuf,
    pub videos_dir: PathBuf,
    /// File name of the landmark artifact inside a segment folder
    pub landmark_file: String,
    /// Extension of video segments, without the dot
    pub video_extension: String,
}

impl Default for SegmentLayout {
    fn default() -> Self {
        let options = SynthesisOptions::default();
        Self {
            landmarks_dir: PathBuf::from("assets/landmarks"),
            videos_dir: PathBuf::from("assets/videos"),
            landmark_file: options.landmark_file,
            video_extension: options.video_extension,
        }
    }
}

impl SegmentLayout {
    pub fn validate(&self) -> Result<(), String> {
        if self.landmark_file.is_empty() {
            return Err("landmark_file cannot be empty".to_string());
        }
        if self.landmark_file.contains('/') || self.landmark_file.contains('\\') {
            return Err("landmark_file must be a bare file name".to_string());
        }
        if self.video_extension.is_empty() || self.video_extension.starts_with('.') {
            return Err("video_extension must be non-empty and given without a dot".to_string());
        }
        Ok(())
    }
}

/// Read-only view over the segment artifacts of one layout
#[derive(Debug, Clone)]
pub struct SegmentRepository {
    layout: SegmentLayout,
    fallback: FallbackMatch,
}

impl SegmentRepository {
    pub fn new(layout: SegmentLayout, fallback: FallbackMatch) -> Self {
        Self { layout, fallback }
    }

    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    /// Candidate landmark files for `gloss`, best first: per known recording
    /// the `<gloss>_<video_id>` then the `<video_id>` folder, then the bare
    /// gloss folder, then the fallback match. Only existing files are returned.
    pub fn landmark_candidates(&self, gloss: &str, video_ids: &[String]) -> Vec<PathBuf> {
        let root = &self.layout.landmarks_dir;
        let file = self.layout.landmark_file.as_str();

        let mut candidates: Vec<PathBuf> = video_ids
            .iter()
            .flat_map(|vid| [root.join(format!("{}_{}", gloss, vid)), root.join(vid)])
            .map(|folder| folder.join(file))
            .chain(std::iter::once(root.join(gloss).join(file)))
            .filter(|p| p.is_file())
            .collect();

        if candidates.is_empty() {
            let fallback = self
                .fallback_names(root, gloss, false, |p| p.is_dir())
                .into_iter()
                .map(|name| root.join(name).join(file))
                .find(|p| p.is_file());
            if let Some(path) = fallback {
                debug!("Fallback landmark segment for '{}': {}", gloss, path.display());
                candidates.push(path);
            }
        }
        candidates
    }

    /// Load the first readable landmark segment for `gloss`.
    /// Unreadable or mis-shaped artifacts are logged and skipped.
    pub fn load_landmarks(&self, gloss: &str, video_ids: &[String]) -> Option<(PathBuf, Landmarks)> {
        for path in self.landmark_candidates(gloss, video_ids) {
            match read_landmarks(&path) {
                Ok(landmarks) => return Some((path, landmarks)),
                Err(e) => warn!("Skipping unreadable segment {}: {}", path.display(), e),
            }
        }
        None
    }

    /// The video clip for `gloss`: `<gloss>.<ext>`, then `<video_id>.<ext>`
    /// per known recording, then the fallback match over file stems.
    pub fn locate_video(&self, gloss: &str, video_ids: &[String]) -> Option<PathBuf> {
        let root = &self.layout.videos_dir;
        let ext = self.layout.video_extension.as_str();

        let exact = std::iter::once(gloss)
            .chain(video_ids.iter().map(|v| v.as_str()))
            .map(|stem| root.join(format!("{}.{}", stem, ext)))
            .find(|p| p.is_file());
        if exact.is_some() {
            return exact;
        }

        let fallback = self
            .fallback_names(root, gloss, true, |p| {
                p.is_file()
                    && p.extension()
                        .map(|e| e.eq_ignore_ascii_case(ext))
                        .unwrap_or(false)
            })
            .into_iter()
            .next()
            .map(|name| root.join(name));
        if let Some(path) = &fallback {
            debug!("Fallback video segment for '{}': {}", gloss, path.display());
        }
        fallback
    }

    /// Sorted names of the entries in `dir` accepted by `keep` whose name
    /// (or file stem, with `by_stem`) passes the fallback rule
    fn fallback_names(
        &self,
        dir: &Path,
        gloss: &str,
        by_stem: bool,
        keep: impl Fn(&Path) -> bool,
    ) -> Vec<String> {
        if self.fallback == FallbackMatch::Disabled {
            return Vec::new();
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Cannot list segment directory {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(|entry| entry.ok())
            .filter(|entry| keep(&entry.path()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| {
                let key = if by_stem {
                    Path::new(name)
                        .file_stem()
                        .and_then(|s| s.to_str())
                        .unwrap_or(name.as_str())
                } else {
                    name.as_str()
                };
                self.fallback.matches(key, gloss)
            })
            .collect();
        names.sort();
        names
    }
}
