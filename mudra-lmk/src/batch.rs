//! Dataset-wide landmark jobs
//!
//! Each dataset row names a folder `<landmarks_dir>/<video_name>/`. The raw
//! sequence lives in [`COMPLETE_FILE`] (or, failing that, in per-part files,
//! see [`crate::io::read_parts_dir`]); preprocessing writes [`PROCESSED_FILE`]
//! next to it.

use crate::augment::augment_landmarks;
use crate::error::LandmarkError;
use crate::io::{read_landmarks, read_parts_dir, write_landmarks, PART_FILES};
use crate::layout::Landmarks;
use crate::preprocess::preprocess_landmarks;
use mudra_core::{AugmentConfig, DatasetIndex, PreprocessConfig};
use rayon::prelude::*;
use std::path::Path;
use tracing::{info, warn};

/// Raw full-body sequence of one recording
pub const COMPLETE_FILE: &str = "landmarks_complete.npy";

/// Canonicalized sequence written by [`preprocess_dataset`]
pub const PROCESSED_FILE: &str = "landmarks_complete_processed.npy";

/// Outcome of a batch job
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rows whose output was written
    pub processed: usize,
    /// Video names that were missing, unreadable or invalid, in dataset order
    pub failed: Vec<String>,
}

fn load_raw(folder: &Path) -> Result<Landmarks, LandmarkError> {
    let complete = folder.join(COMPLETE_FILE);
    if complete.is_file() {
        return read_landmarks(&complete);
    }
    if PART_FILES.iter().any(|name| folder.join(name).is_file()) {
        return read_parts_dir(folder);
    }
    Err(LandmarkError::Read {
        path: complete,
        message: "not found".to_string(),
    })
}

/// Preprocess every row of `index` in parallel.
///
/// Rows are independent: each reads its own folder and writes its own output,
/// so a failure is recorded and does not stop the rest of the batch.
pub fn preprocess_dataset(
    index: &DatasetIndex,
    landmarks_dir: &Path,
    config: &PreprocessConfig,
) -> Result<BatchReport, LandmarkError> {
    config.validate().map_err(LandmarkError::Config)?;
    info!(
        "Preprocessing {} dataset rows under {}",
        index.len(),
        landmarks_dir.display()
    );

    let results: Vec<(&str, Result<(), LandmarkError>)> = index
        .entries()
        .par_iter()
        .map(|entry| {
            let folder = landmarks_dir.join(&entry.video_name);
            let result = load_raw(&folder)
                .and_then(|raw| preprocess_landmarks(&raw, config))
                .and_then(|processed| write_landmarks(folder.join(PROCESSED_FILE), &processed));
            (entry.video_name.as_str(), result)
        })
        .collect();

    let mut report = BatchReport::default();
    for (video_name, result) in results {
        match result {
            Ok(()) => report.processed += 1,
            Err(e) => {
                warn!("Failed to preprocess {}: {}", video_name, e);
                report.failed.push(video_name.to_string());
            }
        }
    }

    info!(
        "Preprocessed {} rows, {} failed",
        report.processed,
        report.failed.len()
    );
    Ok(report)
}

/// Fill rows that have no [`COMPLETE_FILE`] with augmented copies of rows
/// that do.
///
/// Sources are taken in dataset order; each fills up to `per_source` of the
/// remaining targets, also in dataset order. Sources containing NaN or only
/// zeros are skipped. A target whose folder does not exist is recorded as
/// failed and its slot is consumed.
pub fn augment_dataset(
    index: &DatasetIndex,
    landmarks_dir: &Path,
    per_source: usize,
    config: &AugmentConfig,
) -> Result<BatchReport, LandmarkError> {
    config.validate().map_err(LandmarkError::Config)?;

    let has_complete = |video: &str| landmarks_dir.join(video).join(COMPLETE_FILE).is_file();
    let (sources, targets): (Vec<&str>, Vec<&str>) = index
        .iter()
        .map(|e| e.video_name.as_str())
        .partition(|video| has_complete(*video));

    let mut report = BatchReport::default();
    if sources.is_empty() {
        warn!("No rows with {} under {}", COMPLETE_FILE, landmarks_dir.display());
        return Ok(report);
    }
    if targets.is_empty() {
        info!("All rows already have {}", COMPLETE_FILE);
        return Ok(report);
    }

    let mut next_target = 0usize;
    for source in sources {
        if next_target >= targets.len() {
            break;
        }

        let landmarks = match read_landmarks(landmarks_dir.join(source).join(COMPLETE_FILE)) {
            Ok(lm) => lm,
            Err(e) => {
                warn!("Skipping source {}: {}", source, e);
                continue;
            }
        };
        if landmarks.iter().any(|v| v.is_nan()) || landmarks.iter().all(|v| *v == 0.0) {
            warn!("Skipping source {}: contains NaN or only zeros", source);
            continue;
        }

        for _ in 0..per_source {
            let Some(&target) = targets.get(next_target) else {
                break;
            };
            next_target += 1;

            let folder = landmarks_dir.join(target);
            if !folder.is_dir() {
                warn!("Target folder {} does not exist, skipping", folder.display());
                report.failed.push(target.to_string());
                continue;
            }

            let written = augment_landmarks(&landmarks, config)
                .and_then(|aug| write_landmarks(folder.join(COMPLETE_FILE), &aug));
            match written {
                Ok(()) => {
                    info!("Augmented {} -> {}", source, target);
                    report.processed += 1;
                }
                Err(e) => {
                    warn!("Failed to augment {} -> {}: {}", source, target, e);
                    report.failed.push(target.to_string());
                }
            }
        }
    }

    info!(
        "Augmentation filled {} of {} targets",
        report.processed,
        targets.len()
    );
    Ok(report)
}
