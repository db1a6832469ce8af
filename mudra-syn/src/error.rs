//! Error types for mudra-syn

use mudra_core::Error as CoreError;
use mudra_lmk::LandmarkError;
use std::path::PathBuf;
use thiserror::Error;

/// Text-to-sign synthesis errors
#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Failed to read {path}: {source}")]
    MappingIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    MappingParse { path: PathBuf, message: String },

    #[error("No translatable content in '{text}'")]
    NoTranslatableContent { text: String },

    #[error("No gloss found for token '{token}'")]
    UnresolvedToken { token: String },

    #[error("'{choice}' is not a candidate for '{word}'")]
    InvalidChoice { word: String, choice: String },

    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Landmark error: {0}")]
    Landmark(#[from] LandmarkError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Core error: {0}")]
    Core(CoreError),
}

impl From<CoreError> for SynthesisError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Configuration(msg) => SynthesisError::Configuration(msg),
            CoreError::MappingIo { path, source } => SynthesisError::MappingIo { path, source },
            CoreError::MappingParse { path, message } => {
                SynthesisError::MappingParse { path, message }
            }
            other => SynthesisError::Core(other),
        }
    }
}

impl From<SynthesisError> for CoreError {
    fn from(err: SynthesisError) -> Self {
        match err {
            SynthesisError::Configuration(msg) => CoreError::Configuration(msg),
            SynthesisError::MappingIo { path, source } => CoreError::MappingIo { path, source },
            SynthesisError::MappingParse { path, message } => {
                CoreError::MappingParse { path, message }
            }
            SynthesisError::Landmark(e) => e.into(),
            SynthesisError::Io(e) => CoreError::Io(e),
            SynthesisError::Core(e) => e,
            other => CoreError::Synthesis(other.to_string()),
        }
    }
}
