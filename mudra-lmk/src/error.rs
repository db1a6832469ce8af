//! Error types for mudra-lmk

use mudra_core::Error as CoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Landmark processing errors
#[derive(Error, Debug)]
pub enum LandmarkError {
    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to read landmarks from {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write landmarks to {path}: {message}")]
    Write { path: PathBuf, message: String },

    #[error("Unsupported landmark file format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}

impl From<LandmarkError> for CoreError {
    fn from(err: LandmarkError) -> Self {
        match err {
            LandmarkError::Shape(msg) => CoreError::Shape(msg),
            LandmarkError::Config(msg) => CoreError::Configuration(msg),
            LandmarkError::Core(inner) => inner,
            other => CoreError::Synthesis(format!("Landmark error: {}", other)),
        }
    }
}
