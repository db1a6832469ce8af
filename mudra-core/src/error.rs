use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

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

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Synthesis error: {0}")]
    Synthesis(String),
}

pub type Result<T> = std::result::Result<T, Error>;
