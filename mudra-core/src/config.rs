//! Top-level configuration for mudra
//!
//! A single file (JSON, TOML or YAML) describes where the static assets live
//! and which language/format triple to translate with. The `synthesis`
//! section carries the segment layout, ingest transforms and video settings
//! consumed by mudra-lmk and mudra-syn. The object is owned by the caller and
//! handed to constructors; nothing here is global.

use crate::error::Error;
use crate::types::{SignFormat, SignLanguageCode, TextLanguageCode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What to do with a token that maps to no gloss
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissPolicy {
    /// Log and continue; fail only when nothing at all resolves
    #[default]
    Skip,
    /// Abort the translation on the first unresolved token
    Fail,
}

/// Locations of the static mapping files and segment artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Base directory; relative paths below are resolved against it
    pub root: PathBuf,

    /// JSON object mapping PSL glosses to English glosses
    pub gloss_mapping: PathBuf,

    /// Dataset index (CSV `video_name,label`, or filtered WLASL JSON)
    pub dataset_index: PathBuf,

    /// Directory of `<gloss>_<video_id>/` landmark folders
    pub landmarks_dir: PathBuf,

    /// Directory of `<gloss>.mp4` clips
    pub videos_dir: PathBuf,
}

/// The (text language, sign language, sign format) triple
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    pub text_language: TextLanguageCode,
    pub sign_language: SignLanguageCode,
    pub sign_format: SignFormat,
    pub miss_policy: MissPolicy,
}

/// Rule for matching a gloss against asset names when no exact name exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMatch {
    /// Exact names only
    Disabled,
    /// Names starting with `<gloss>_` (other recordings of the same gloss)
    #[default]
    Prefix,
    /// Names containing the gloss anywhere
    Substring,
}

impl FallbackMatch {
    pub fn matches(&self, name: &str, gloss: &str) -> bool {
        match self {
            FallbackMatch::Disabled => false,
            FallbackMatch::Prefix => name
                .strip_prefix(gloss)
                .map(|rest| rest.starts_with('_'))
                .unwrap_or(false),
            FallbackMatch::Substring => name.contains(gloss),
        }
    }
}

/// Fixed-length canonicalization settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Output frame count (default 190)
    pub target_frames: usize,

    /// Gaussian smoothing sigma in frames (default 1.0, 0 disables smoothing)
    pub sigma: f64,

    /// |z| at or above which a sample is treated as an outlier (default 3.0)
    pub threshold: f64,
}

/// Randomized perturbation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentConfig {
    /// Maximum absolute rotation of the x/y plane, in degrees (default 10)
    pub rotation_angle: f64,

    /// Upper bound of the uniform scale draw; the lower bound is 0.9 (default 1.1)
    pub scale_factor: f64,

    /// Standard deviation of additive Gaussian noise (default 0.01)
    pub noise_std: f64,

    /// Independent per-frame drop probability (default 0.1)
    pub frame_drop_prob: f64,
}

/// Lower bound of the augmentation scale draw
pub const MIN_SCALE: f64 = 0.9;

/// Output frame rate of re-encoded video sequences
pub const DEFAULT_FPS: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoConfig {
    /// ffmpeg executable, looked up on `PATH` when not absolute
    pub ffmpeg: PathBuf,
    pub fps: u32,
}

/// How the synthesis engine finds and transforms segments
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisOptions {
    /// File name of the landmark artifact inside a segment folder. Set to
    /// `landmarks_complete_processed.npy` to read what `batch preprocess` writes.
    pub landmark_file: String,

    /// Extension of video segments, without the dot
    pub video_extension: String,

    pub fallback: FallbackMatch,

    /// Replacement rules file, resolved against `assets.root`
    pub text_rules: Option<PathBuf>,

    /// Canonicalize every landmark segment as it is loaded
    pub preprocess: Option<PreprocessConfig>,

    /// Perturb every landmark segment as it is loaded (before preprocessing)
    pub augment: Option<AugmentConfig>,

    pub video: VideoConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MudraConfig {
    pub assets: AssetsConfig,
    pub translation: TranslationConfig,
    pub synthesis: SynthesisOptions,

    /// Default tracing filter (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("assets"),
            gloss_mapping: PathBuf::from("mappings/psl_to_wlasl_mapping.json"),
            dataset_index: PathBuf::from("mappings/dataset.csv"),
            landmarks_dir: PathBuf::from("landmarks"),
            videos_dir: PathBuf::from("videos"),
        }
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            text_language: TextLanguageCode::English,
            sign_language: SignLanguageCode::Wlasl,
            sign_format: SignFormat::Landmarks,
            miss_policy: MissPolicy::Skip,
        }
    }
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            target_frames: 190,
            sigma: 1.0,
            threshold: 3.0,
        }
    }
}

impl Default for AugmentConfig {
    fn default() -> Self {
        Self {
            rotation_angle: 10.0,
            scale_factor: 1.1,
            noise_std: 0.01,
            frame_drop_prob: 0.1,
        }
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            ffmpeg: PathBuf::from("ffmpeg"),
            fps: DEFAULT_FPS,
        }
    }
}

impl Default for SynthesisOptions {
    fn default() -> Self {
        Self {
            landmark_file: "landmarks_preprocessed.npy".to_string(),
            video_extension: "mp4".to_string(),
            fallback: FallbackMatch::default(),
            text_rules: None,
            preprocess: None,
            augment: None,
            video: VideoConfig::default(),
        }
    }
}

impl Default for MudraConfig {
    fn default() -> Self {
        Self {
            assets: AssetsConfig::default(),
            translation: TranslationConfig::default(),
            synthesis: SynthesisOptions::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AssetsConfig {
    /// Resolve `path` against `root` unless it is already absolute
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.root.join(path)
        }
    }

    pub fn gloss_mapping_path(&self) -> PathBuf {
        self.resolve(&self.gloss_mapping)
    }

    pub fn dataset_index_path(&self) -> PathBuf {
        self.resolve(&self.dataset_index)
    }

    pub fn landmarks_path(&self) -> PathBuf {
        self.resolve(&self.landmarks_dir)
    }

    pub fn videos_path(&self) -> PathBuf {
        self.resolve(&self.videos_dir)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, path) in [
            ("gloss_mapping", &self.gloss_mapping),
            ("dataset_index", &self.dataset_index),
            ("landmarks_dir", &self.landmarks_dir),
            ("videos_dir", &self.videos_dir),
        ] {
            if path.as_os_str().is_empty() {
                return Err(format!("assets.{} cannot be empty", name));
            }
        }
        Ok(())
    }
}

impl TranslationConfig {
    pub fn validate(&self) -> Result<(), String> {
        // The WLASL pipeline is English-only
        if self.sign_language == SignLanguageCode::Wlasl
            && self.text_language != TextLanguageCode::English
        {
            return Err(format!(
                "sign language '{}' only accepts english text, got '{}'",
                self.sign_language, self.text_language
            ));
        }
        Ok(())
    }
}

impl PreprocessConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.target_frames == 0 {
            return Err("target_frames must be greater than 0".to_string());
        }

        if self.target_frames > 100_000 {
            return Err("target_frames too large (max 100000)".to_string());
        }

        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err("sigma must be a finite value >= 0".to_string());
        }

        // Bounds the smoothing kernel, which spans 8 sigma
        if self.sigma > self.target_frames as f64 {
            return Err(format!(
                "sigma must not exceed target_frames ({})",
                self.target_frames
            ));
        }

        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err("threshold must be a finite value > 0".to_string());
        }

        Ok(())
    }
}

impl AugmentConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=180.0).contains(&self.rotation_angle) {
            return Err("rotation_angle must be between 0 and 180 degrees".to_string());
        }

        if !self.scale_factor.is_finite() || self.scale_factor < MIN_SCALE {
            return Err(format!("scale_factor must be >= {}", MIN_SCALE));
        }

        if !self.noise_std.is_finite() || self.noise_std < 0.0 {
            return Err("noise_std must be a finite value >= 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.frame_drop_prob) {
            return Err("frame_drop_prob must be between 0.0 and 1.0".to_string());
        }

        Ok(())
    }
}

impl VideoConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.ffmpeg.as_os_str().is_empty() {
            return Err("video.ffmpeg cannot be empty".to_string());
        }
        if self.fps == 0 || self.fps > 240 {
            return Err("video.fps must be between 1 and 240".to_string());
        }
        Ok(())
    }
}

impl SynthesisOptions {
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

        self.video.validate()?;

        if let Some(preprocess) = &self.preprocess {
            preprocess
                .validate()
                .map_err(|e| format!("preprocess: {}", e))?;
        }

        if let Some(augment) = &self.augment {
            augment.validate().map_err(|e| format!("augment: {}", e))?;
        }

        Ok(())
    }
}

impl MudraConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!("cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_str(&content)
    }

    /// Load configuration from string, trying JSON, then TOML, then YAML.
    ///
    /// The first format whose syntax accepts the content decides: its
    /// deserialization error is returned as is.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, Error> {
        let invalid = |format: &str, e: &dyn std::fmt::Display| {
            Error::Configuration(format!("invalid {} configuration: {}", format, e))
        };

        if let Ok(value) = serde_json::from_str::<serde_json::Value>(content) {
            return serde_json::from_value(value).map_err(|e| invalid("JSON", &e));
        }

        if content.parse::<toml::Table>().is_ok() {
            return toml::from_str(content).map_err(|e| invalid("TOML", &e));
        }

        // Any bare scalar is valid YAML; only a mapping counts as a config
        if let Ok(serde_yaml::Value::Mapping(_)) = serde_yaml::from_str::<serde_yaml::Value>(content) {
            return serde_yaml::from_str(content).map_err(|e| invalid("YAML", &e));
        }

        Err(Error::Configuration(
            "unrecognized configuration format (expected JSON, TOML or YAML)".to_string(),
        ))
    }

    /// Defaults overridden by `MUDRA_*` environment variables
    pub fn from_env() -> Result<Self, Error> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Apply `MUDRA_*` environment overrides on top of this configuration
    pub fn apply_env(&mut self) -> Result<(), Error> {
        if let Ok(dir) = std::env::var("MUDRA_ASSETS_DIR") {
            self.assets.root = PathBuf::from(dir);
        }

        if let Ok(lang) = std::env::var("MUDRA_TEXT_LANGUAGE") {
            self.translation.text_language = lang.parse()?;
        }

        if let Ok(lang) = std::env::var("MUDRA_SIGN_LANGUAGE") {
            self.translation.sign_language = lang.parse()?;
        }

        if let Ok(format) = std::env::var("MUDRA_SIGN_FORMAT") {
            self.translation.sign_format = format.parse()?;
        }

        if let Ok(level) = std::env::var("MUDRA_LOG_LEVEL") {
            self.log_level = level;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), String> {
        self.assets.validate()?;
        self.translation.validate()?;
        self.synthesis
            .validate()
            .map_err(|e| format!("synthesis.{}", e))?;

        match self.log_level.to_lowercase().as_str() {
            "error" | "warn" | "info" | "debug" | "trace" => Ok(()),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}
