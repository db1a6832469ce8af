//! mudra-core: shared building blocks for text-to-sign synthesis
//!
//! Holds what every other mudra crate agrees on:
//! - the workspace-wide error type
//! - text language, sign language, sign format and gloss-space codes
//! - the dataset index (video name / label pairs)
//! - the top-level configuration file

pub mod types;
pub mod error;
pub mod config;
pub mod dataset;

pub use error::{Error, Result};
pub use types::{Gloss, GlossSpace, SignFormat, SignLanguageCode, TextLanguageCode};
pub use config::{
    AssetsConfig, AugmentConfig, FallbackMatch, MissPolicy, MudraConfig, PreprocessConfig,
    SynthesisOptions, TranslationConfig, VideoConfig, DEFAULT_FPS, MIN_SCALE,
};
pub use dataset::{DatasetEntry, DatasetIndex};
