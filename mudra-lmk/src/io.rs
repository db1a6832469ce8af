//! Landmark artifact files
//!
//! `.npy` is the native artifact format (float32, `(frames, 543, 3)`);
//! float64 files are accepted and narrowed. `.csv` holds one row per frame:
//! the frame index followed by the flattened keypoint coordinates.

use crate::error::LandmarkError;
use crate::layout::{validate_shape, LandmarkParts, Landmarks, COORDS, KEYPOINTS};
use ndarray::{Array3, ArrayView3};
use ndarray_npy::{ReadNpyExt, WriteNpyExt};
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// Per-part artifact names inside a part directory
pub const PART_FILES: [&str; 4] = ["face.npy", "left_hand.npy", "right_hand.npy", "pose.npy"];

enum Format {
    Npy,
    Csv,
}

fn format_of(path: &Path) -> Result<Format, LandmarkError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "npy" => Ok(Format::Npy),
        "csv" => Ok(Format::Csv),
        _ => Err(LandmarkError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Read a landmark tensor from `.npy` or `.csv`. The shape is validated.
pub fn read_landmarks(path: impl AsRef<Path>) -> Result<Landmarks, LandmarkError> {
    let path = path.as_ref();
    let landmarks = match format_of(path)? {
        Format::Npy => read_npy_any(path)?,
        Format::Csv => read_csv(path)?,
    };
    validate_shape(&landmarks.view())?;
    debug!("Read {:?} landmarks from {}", landmarks.dim(), path.display());
    Ok(landmarks)
}

/// Read any `(frames, k, c)` float array from `.npy` without shape checks
pub fn read_npy_any(path: &Path) -> Result<Array3<f32>, LandmarkError> {
    let read_err = |message: String| LandmarkError::Read {
        path: path.to_path_buf(),
        message,
    };

    let mut bytes = Vec::new();
    File::open(path)
        .and_then(|mut f| f.read_to_end(&mut bytes))
        .map_err(|e| read_err(e.to_string()))?;

    match Array3::<f32>::read_npy(&bytes[..]) {
        Ok(arr) => Ok(arr),
        Err(f32_err) => Array3::<f64>::read_npy(&bytes[..])
            .map(|arr| arr.mapv(|v| v as f32))
            .map_err(|_| read_err(f32_err.to_string())),
    }
}

fn read_csv(path: &Path) -> Result<Landmarks, LandmarkError> {
    let read_err = |message: String| LandmarkError::Read {
        path: path.to_path_buf(),
        message,
    };
    let width = KEYPOINTS * COORDS;

    let mut rdr = csv::Reader::from_path(path).map_err(|e| read_err(e.to_string()))?;
    let mut values: Vec<f32> = Vec::new();
    let mut frames = 0usize;
    for (row, record) in rdr.records().enumerate() {
        let record = record.map_err(|e| read_err(format!("row {}: {}", row + 1, e)))?;
        if record.len() != width + 1 {
            return Err(LandmarkError::Shape(format!(
                "row {} has {} columns, expected {}",
                row + 1,
                record.len(),
                width + 1
            )));
        }
        for field in record.iter().skip(1) {
            let v = if field.is_empty() {
                f32::NAN
            } else {
                field
                    .parse::<f32>()
                    .map_err(|e| read_err(format!("row {}: {}", row + 1, e)))?
            };
            values.push(v);
        }
        frames += 1;
    }

    Array3::from_shape_vec((frames, KEYPOINTS, COORDS), values)
        .map_err(|e| LandmarkError::Shape(e.to_string()))
}

/// Write a landmark tensor as `.npy` or `.csv`.
///
/// The data goes to a temporary file next to `path` that is renamed into
/// place, so a reader never observes a partial artifact.
pub fn write_landmarks(path: impl AsRef<Path>, landmarks: &Landmarks) -> Result<(), LandmarkError> {
    let path = path.as_ref();
    let format = format_of(path)?;
    let write_err = |message: String| LandmarkError::Write {
        path: path.to_path_buf(),
        message,
    };

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| write_err(e.to_string()))?;

    match format {
        Format::Npy => {
            let mut writer = BufWriter::new(tmp.as_file_mut());
            landmarks
                .write_npy(&mut writer)
                .map_err(|e| write_err(e.to_string()))?;
            writer.flush().map_err(|e| write_err(e.to_string()))?;
        }
        Format::Csv => write_csv(tmp.as_file_mut(), &landmarks.view())
            .map_err(|e| write_err(e.to_string()))?,
    }

    tmp.persist(path).map_err(|e| write_err(e.error.to_string()))?;
    debug!("Wrote {:?} landmarks to {}", landmarks.dim(), path.display());
    Ok(())
}

fn write_csv<W: Write>(writer: W, landmarks: &ArrayView3<'_, f32>) -> Result<(), csv::Error> {
    let (frames, keypoints, coords) = landmarks.dim();
    let mut wtr = csv::Writer::from_writer(writer);

    let axes = ["x", "y", "z", "visibility", "presence"];
    let mut header = Vec::with_capacity(keypoints * coords + 1);
    header.push("frame".to_string());
    for k in 0..keypoints {
        for axis in axes.iter().take(coords) {
            header.push(format!("{}_{}", k, axis));
        }
    }
    wtr.write_record(&header)?;

    let mut row: Vec<String> = Vec::with_capacity(keypoints * coords + 1);
    for f in 0..frames {
        row.clear();
        row.push(f.to_string());
        row.extend(
            landmarks
                .index_axis(ndarray::Axis(0), f)
                .iter()
                .map(|v| if v.is_nan() { String::new() } else { v.to_string() }),
        );
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Read a per-part directory (`face.npy`, `left_hand.npy`, `right_hand.npy`,
/// `pose.npy`; any may be missing) and assemble it into one tensor.
pub fn read_parts_dir(dir: impl AsRef<Path>) -> Result<Landmarks, LandmarkError> {
    let dir = dir.as_ref();
    let load = |name: &str| -> Result<Option<Array3<f32>>, LandmarkError> {
        let path = dir.join(name);
        if path.is_file() {
            read_npy_any(&path).map(Some)
        } else {
            Ok(None)
        }
    };

    let parts = LandmarkParts {
        face: load(PART_FILES[0])?,
        left_hand: load(PART_FILES[1])?,
        right_hand: load(PART_FILES[2])?,
        pose: load(PART_FILES[3])?,
    };
    parts.assemble()
}
