//! mudra-lmk: landmark sequences for sign synthesis
//!
//! A landmark sequence is a `(frames, 543, 3)` float tensor: 468 face,
//! 21 left-hand, 21 right-hand and 33 pose keypoints per frame.
//! This crate provides:
//! - shape validation and part assembly ([`layout`])
//! - fixed-length canonicalization ([`preprocess`])
//! - randomized training-time perturbation ([`augment`])
//! - `.npy` / `.csv` artifact I/O ([`io`])
//! - dataset-wide batch jobs ([`batch`])

pub mod error;
pub mod layout;
pub mod preprocess;
pub mod augment;
pub mod io;
pub mod batch;

pub use error::LandmarkError;
pub use mudra_core::{AugmentConfig, PreprocessConfig};
pub use layout::{LandmarkParts, Landmarks, COORDS, KEYPOINTS};
pub use preprocess::preprocess_landmarks;
pub use augment::{augment_landmarks, augment_with_rng};
pub use io::{read_landmarks, read_parts_dir, write_landmarks};
pub use batch::{augment_dataset, preprocess_dataset, BatchReport, COMPLETE_FILE, PROCESSED_FILE};
