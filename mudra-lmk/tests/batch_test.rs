//! Tests for dataset-wide preprocessing and augmentation

use mudra_core::{DatasetEntry, DatasetIndex};
use mudra_lmk::{
    augment_dataset, preprocess_dataset, read_landmarks, write_landmarks, AugmentConfig,
    PreprocessConfig, COMPLETE_FILE, COORDS, KEYPOINTS, PROCESSED_FILE,
};
use ndarray::Array3;
use std::fs;
use std::path::Path;

fn index(rows: &[(&str, &str)]) -> DatasetIndex {
    DatasetIndex::new(
        rows.iter()
            .map(|(video, label)| DatasetEntry {
                video_name: video.to_string(),
                label: label.to_string(),
            })
            .collect(),
    )
}

fn write_complete(root: &Path, video: &str, frames: usize, value: f32) {
    let folder = root.join(video);
    fs::create_dir_all(&folder).unwrap();
    let lm = Array3::<f32>::from_shape_fn((frames, KEYPOINTS, COORDS), |(f, _, _)| {
        value + f as f32 * 0.01
    });
    write_landmarks(folder.join(COMPLETE_FILE), &lm).unwrap();
}

#[test]
fn test_preprocess_dataset_writes_processed_files() {
    let dir = tempfile::tempdir().unwrap();
    write_complete(dir.path(), "hello_001", 20, 0.1);
    write_complete(dir.path(), "world_002", 250, 0.2);
    let idx = index(&[("hello_001", "hello"), ("world_002", "world"), ("ghost_003", "ghost")]);

    let config = PreprocessConfig {
        target_frames: 40,
        ..PreprocessConfig::default()
    };
    let report = preprocess_dataset(&idx, dir.path(), &config).unwrap();
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, vec!["ghost_003".to_string()]);

    let out = read_landmarks(dir.path().join("hello_001").join(PROCESSED_FILE)).unwrap();
    assert_eq!(out.dim(), (40, KEYPOINTS, COORDS));
}

#[test]
fn test_preprocess_dataset_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = PreprocessConfig {
        threshold: 0.0,
        ..PreprocessConfig::default()
    };
    assert!(preprocess_dataset(&index(&[]), dir.path(), &config).is_err());
}

#[test]
fn test_augment_dataset_fills_targets_in_order() {
    let dir = tempfile::tempdir().unwrap();
    write_complete(dir.path(), "book_src", 10, 0.3);
    for target in ["book_a", "book_b", "book_c"] {
        fs::create_dir_all(dir.path().join(target)).unwrap();
    }
    let idx = index(&[
        ("book_src", "book"),
        ("book_a", "book"),
        ("book_missing", "book"),
        ("book_b", "book"),
        ("book_c", "book"),
    ]);

    let report = augment_dataset(&idx, dir.path(), 3, &AugmentConfig::default()).unwrap();
    // three slots: book_a, book_missing (no folder), book_b
    assert_eq!(report.processed, 2);
    assert_eq!(report.failed, vec!["book_missing".to_string()]);
    assert!(dir.path().join("book_a").join(COMPLETE_FILE).is_file());
    assert!(dir.path().join("book_b").join(COMPLETE_FILE).is_file());
    assert!(!dir.path().join("book_c").join(COMPLETE_FILE).exists());

    let aug = read_landmarks(dir.path().join("book_a").join(COMPLETE_FILE)).unwrap();
    assert_eq!(aug.dim(), (10, KEYPOINTS, COORDS));
}

#[test]
fn test_augment_dataset_skips_all_zero_source() {
    let dir = tempfile::tempdir().unwrap();
    write_complete(dir.path(), "zero_src", 5, 0.0);
    // overwrite with an all-zero tensor
    write_landmarks(
        dir.path().join("zero_src").join(COMPLETE_FILE),
        &Array3::<f32>::zeros((5, KEYPOINTS, COORDS)),
    )
    .unwrap();
    fs::create_dir_all(dir.path().join("target")).unwrap();
    let idx = index(&[("zero_src", "x"), ("target", "x")]);

    let report = augment_dataset(&idx, dir.path(), 4, &AugmentConfig::default()).unwrap();
    assert_eq!(report.processed, 0);
    assert!(!dir.path().join("target").join(COMPLETE_FILE).exists());
}

#[test]
fn test_augment_dataset_without_sources_is_noop() {
    let dir = tempfile::tempdir().unwrap();
    let idx = index(&[("a", "x"), ("b", "y")]);
    let report = augment_dataset(&idx, dir.path(), 4, &AugmentConfig::default()).unwrap();
    assert_eq!(report, Default::default());
}
