//! Configuration of the synthesis engine

use crate::segments::SegmentLayout;
use mudra_core::{
    AugmentConfig, FallbackMatch, MissPolicy, MudraConfig, PreprocessConfig, SignFormat,
    SignLanguageCode, TextLanguageCode, TranslationConfig, VideoConfig,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub text_language: TextLanguageCode,
    pub sign_language: SignLanguageCode,
    pub sign_format: SignFormat,

    pub layout: SegmentLayout,
    pub miss_policy: MissPolicy,
    pub fallback: FallbackMatch,

    /// Replacement rules file (`text_preprocessing.json`); built-in rules
    /// are used when unset or when the file has no entry for the language
    pub text_rules: Option<PathBuf>,

    /// Canonicalize every landmark segment as it is loaded
    pub preprocess: Option<PreprocessConfig>,

    /// Perturb every landmark segment as it is loaded (before preprocessing)
    pub augment: Option<AugmentConfig>,

    pub video: VideoConfig,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        let translation = TranslationConfig::default();
        Self {
            text_language: translation.text_language,
            sign_language: translation.sign_language,
            sign_format: translation.sign_format,
            layout: SegmentLayout::default(),
            miss_policy: translation.miss_policy,
            fallback: FallbackMatch::default(),
            text_rules: None,
            preprocess: None,
            augment: None,
            video: VideoConfig::default(),
        }
    }
}

impl SynthesisConfig {
    /// Build from the top-level configuration. Asset directories and the
    /// rules file are resolved against `assets.root`.
    pub fn from_core(config: &MudraConfig) -> Self {
        let translation = &config.translation;
        let synthesis = &config.synthesis;
        Self {
            text_language: translation.text_language,
            sign_language: translation.sign_language,
            sign_format: translation.sign_format,
            miss_policy: translation.miss_policy,
            layout: SegmentLayout {
                landmarks_dir: config.assets.landmarks_path(),
                videos_dir: config.assets.videos_path(),
                landmark_file: synthesis.landmark_file.clone(),
                video_extension: synthesis.video_extension.clone(),
            },
            fallback: synthesis.fallback,
            text_rules: synthesis
                .text_rules
                .as_deref()
                .map(|path| config.assets.resolve(path)),
            preprocess: synthesis.preprocess.clone(),
            augment: synthesis.augment.clone(),
            video: synthesis.video.clone(),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        TranslationConfig {
            text_language: self.text_language,
            sign_language: self.sign_language,
            sign_format: self.sign_format,
            miss_policy: self.miss_policy,
        }
        .validate()?;

        self.layout.validate()?;
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_core_resolves_asset_dirs() {
        let mut core = MudraConfig::default();
        core.assets.root = PathBuf::from("/srv/assets");
        core.translation.sign_language = SignLanguageCode::Psl;
        core.translation.text_language = TextLanguageCode::Urdu;

        let config = SynthesisConfig::from_core(&core);
        assert_eq!(config.layout.landmarks_dir, PathBuf::from("/srv/assets/landmarks"));
        assert_eq!(config.layout.videos_dir, PathBuf::from("/srv/assets/videos"));
        assert_eq!(config.text_language, TextLanguageCode::Urdu);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_core_carries_synthesis_section() {
        let mut core = MudraConfig::default();
        core.assets.root = PathBuf::from("/srv/assets");
        core.synthesis.landmark_file = "landmarks_complete_processed.npy".to_string();
        core.synthesis.fallback = FallbackMatch::Disabled;
        core.synthesis.text_rules = Some(PathBuf::from("text_preprocessing.json"));
        core.synthesis.preprocess = Some(PreprocessConfig::default());
        core.synthesis.augment = Some(AugmentConfig::default());
        core.synthesis.video.fps = 25;

        let config = SynthesisConfig::from_core(&core);
        assert_eq!(config.layout.landmark_file, "landmarks_complete_processed.npy");
        assert_eq!(config.fallback, FallbackMatch::Disabled);
        assert_eq!(
            config.text_rules,
            Some(PathBuf::from("/srv/assets/text_preprocessing.json"))
        );
        assert_eq!(config.preprocess, Some(PreprocessConfig::default()));
        assert!(config.augment.is_some());
        assert_eq!(config.video.fps, 25);
    }

    #[test]
    fn test_wlasl_with_urdu_rejected() {
        let config = SynthesisConfig {
            text_language: TextLanguageCode::Urdu,
            sign_language: SignLanguageCode::Wlasl,
            ..SynthesisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nested_option_validation() {
        let config = SynthesisConfig {
            preprocess: Some(PreprocessConfig {
                sigma: -1.0,
                ..PreprocessConfig::default()
            }),
            ..SynthesisConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.starts_with("preprocess:"));
    }
}
