//! Concatenative text-to-sign synthesis
//!
//! `translate` runs text normalization, tokenization, gloss resolution,
//! segment retrieval and concatenation. Tokens and segments that cannot be
//! found are soft misses: they are logged, recorded in
//! [`SignSequence::skipped`] and left out. An ambiguous word stops the
//! translation with a [`DisambiguationRequest`]; the caller picks a form and
//! translates the corrected text again from scratch.

use crate::config::SynthesisConfig;
use crate::error::SynthesisError;
use crate::gloss::GlossMapper;
use crate::segments::SegmentRepository;
use crate::sign::{SignSequence, VideoClip};
use crate::text::{text_language, ReplacementRules, TextLanguage, Token};
use mudra_core::{Gloss, MissPolicy, MudraConfig, SignFormat, SignLanguageCode};
use mudra_lmk::{augment_landmarks, preprocess_landmarks, Landmarks};
use regex::RegexBuilder;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Single entry point shared by text-to-sign models
pub trait TextToSign {
    fn translate(&self, text: &str) -> Result<TranslationOutcome, SynthesisError>;
}

#[derive(Debug, Clone)]
pub enum TranslationOutcome {
    Translated(SignSequence),
    /// A word maps to several sign forms; nothing was produced
    NeedsDisambiguation(DisambiguationRequest),
}

impl TranslationOutcome {
    pub fn sign(self) -> Option<SignSequence> {
        match self {
            TranslationOutcome::Translated(sign) => Some(sign),
            TranslationOutcome::NeedsDisambiguation(_) => None,
        }
    }
}

/// An ambiguous surface word and the sign forms it could stand for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisambiguationRequest {
    pub word: String,
    pub candidates: Vec<String>,
}

impl DisambiguationRequest {
    /// Replace every whole-word occurrence of the ambiguous word in `text`
    /// (case-insensitively) with `choice`, which must be one of the candidates
    pub fn apply(&self, text: &str, choice: &str) -> Result<String, SynthesisError> {
        if !self.candidates.iter().any(|c| c == choice) {
            return Err(SynthesisError::InvalidChoice {
                word: self.word.clone(),
                choice: choice.to_string(),
            });
        }

        // A following sense tag belongs to the word and is replaced with it
        let pattern = format!(r"\b{}\b(?:\([^()]*\))?", regex::escape(&self.word));
        let re = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| SynthesisError::Configuration(e.to_string()))?;
        Ok(re.replace_all(text, regex::NoExpand(choice)).into_owned())
    }
}

/// A token resolved into the target sign language
struct Resolved {
    gloss: Gloss,
    /// Recordings of the gloss, best first (WLASL only)
    video_ids: Vec<String>,
}

enum Resolution {
    Resolved(Resolved),
    Ambiguous(DisambiguationRequest),
    Miss,
}

/// Rule-based synthesis by concatenating stored sign segments
pub struct ConcatenativeSynthesis {
    config: SynthesisConfig,
    mapper: Arc<GlossMapper>,
    language: Box<dyn TextLanguage>,
    segments: SegmentRepository,
}

impl std::fmt::Debug for ConcatenativeSynthesis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcatenativeSynthesis")
            .field("config", &self.config)
            .field("language", &self.language.code())
            .finish_non_exhaustive()
    }
}

impl ConcatenativeSynthesis {
    pub fn new(config: SynthesisConfig, mapper: Arc<GlossMapper>) -> Result<Self, SynthesisError> {
        config.validate().map_err(SynthesisError::Configuration)?;

        let rules = match &config.text_rules {
            Some(path) => ReplacementRules::from_json_file(path)?.remove(&config.text_language),
            None => None,
        };
        let language = text_language(config.text_language, rules)?;
        let segments = SegmentRepository::new(config.layout.clone(), config.fallback);

        info!(
            "Concatenative synthesis ready: {} -> {} ({})",
            config.text_language, config.sign_language, config.sign_format
        );
        Ok(Self {
            config,
            mapper,
            language,
            segments,
        })
    }

    /// Load the mapping tables named by `config` and build the engine
    pub fn from_mudra_config(config: &MudraConfig) -> Result<Self, SynthesisError> {
        config.validate().map_err(SynthesisError::Configuration)?;
        let mapper = GlossMapper::load(
            config.assets.gloss_mapping_path(),
            config.assets.dataset_index_path(),
        )?;
        Self::new(SynthesisConfig::from_core(config), Arc::new(mapper))
    }

    pub fn config(&self) -> &SynthesisConfig {
        &self.config
    }

    pub fn mapper(&self) -> &Arc<GlossMapper> {
        &self.mapper
    }

    pub fn text_language(&self) -> &dyn TextLanguage {
        self.language.as_ref()
    }

    fn resolve(&self, token: &Token) -> Resolution {
        match self.config.sign_language {
            SignLanguageCode::Psl => self.resolve_psl(&token.text),
            SignLanguageCode::Wlasl => self.resolve_wlasl(&token.text),
        }
    }

    fn resolve_psl(&self, word: &str) -> Resolution {
        let lower = word.to_lowercase();
        for form in [word, lower.as_str()] {
            if self.mapper.is_psl_gloss(form) {
                return Resolution::Resolved(Resolved {
                    gloss: Gloss::new(form),
                    video_ids: Vec::new(),
                });
            }
        }

        let candidates = self.mapper.english_to_psl(&lower);
        match candidates.len() {
            0 => Resolution::Miss,
            1 => match candidates.into_iter().next() {
                Some(gloss) => Resolution::Resolved(Resolved {
                    gloss,
                    video_ids: Vec::new(),
                }),
                None => Resolution::Miss,
            },
            _ => Resolution::Ambiguous(DisambiguationRequest {
                word: word.to_string(),
                candidates: candidates.into_iter().map(|g| g.0).collect(),
            }),
        }
    }

    fn resolve_wlasl(&self, word: &str) -> Resolution {
        let lower = word.to_lowercase();
        // a sense tag only matters for PSL; WLASL falls back to the bare word
        let bare = lower.split('(').next().unwrap_or(&lower).to_string();

        for form in [&lower, &bare] {
            let videos = self.mapper.english_to_wlasl_videos(form);
            if !videos.is_empty() {
                return Resolution::Resolved(Resolved {
                    gloss: Gloss::new(form.as_str()),
                    video_ids: videos.to_vec(),
                });
            }
        }

        let english = self
            .mapper
            .psl_to_english(word)
            .or_else(|| self.mapper.psl_to_english(&lower));
        if let Some(english) = english {
            let videos = self.mapper.english_to_wlasl_videos(english.as_str());
            if !videos.is_empty() {
                return Resolution::Resolved(Resolved {
                    gloss: english.clone(),
                    video_ids: videos.to_vec(),
                });
            }
        }
        Resolution::Miss
    }

    /// Apply the configured ingest transforms: augment, then preprocess
    fn ingest(&self, landmarks: Landmarks) -> Result<Landmarks, SynthesisError> {
        let landmarks = match &self.config.augment {
            Some(config) => augment_landmarks(&landmarks, config)?,
            None => landmarks,
        };
        let landmarks = match &self.config.preprocess {
            Some(config) => preprocess_landmarks(&landmarks, config)?,
            None => landmarks,
        };
        Ok(landmarks)
    }

    fn assemble_landmarks(
        &self,
        resolved: Vec<Resolved>,
        mut skipped: Vec<String>,
    ) -> Result<Option<SignSequence>, SynthesisError> {
        let mut glosses = Vec::with_capacity(resolved.len());
        let mut segments = Vec::with_capacity(resolved.len());

        for item in resolved {
            match self.segments.load_landmarks(item.gloss.as_str(), &item.video_ids) {
                Some((path, landmarks)) => {
                    debug!(
                        "Segment '{}': {} frames from {}",
                        item.gloss,
                        landmarks.dim().0,
                        path.display()
                    );
                    segments.push(self.ingest(landmarks)?);
                    glosses.push(item.gloss);
                }
                None => {
                    warn!("No landmark segment for gloss '{}', skipping", item.gloss);
                    skipped.push(item.gloss.0);
                }
            }
        }

        if segments.is_empty() {
            return Ok(None);
        }
        SignSequence::from_landmarks(glosses, segments, skipped).map(Some)
    }

    fn assemble_video(&self, resolved: Vec<Resolved>, mut skipped: Vec<String>) -> Option<SignSequence> {
        let mut clips = Vec::with_capacity(resolved.len());
        for item in resolved {
            match self.segments.locate_video(item.gloss.as_str(), &item.video_ids) {
                Some(path) => clips.push(VideoClip {
                    gloss: item.gloss,
                    path,
                }),
                None => {
                    warn!("No video segment for gloss '{}', skipping", item.gloss);
                    skipped.push(item.gloss.0);
                }
            }
        }

        if clips.is_empty() {
            return None;
        }
        Some(SignSequence::from_clips(clips, self.config.video.fps, skipped))
    }
}

impl TextToSign for ConcatenativeSynthesis {
    fn translate(&self, text: &str) -> Result<TranslationOutcome, SynthesisError> {
        let normalized = self.language.preprocess(text);
        let tokens = self.language.tokenize(&normalized);
        debug!("Tokens: {:?}", tokens.iter().map(|t| t.text.as_str()).collect::<Vec<_>>());

        let mut resolved = Vec::with_capacity(tokens.len());
        let mut skipped = Vec::new();
        for token in &tokens {
            match self.resolve(token) {
                Resolution::Resolved(item) => resolved.push(item),
                Resolution::Ambiguous(request) => {
                    info!(
                        "'{}' needs disambiguation between {:?}",
                        request.word, request.candidates
                    );
                    return Ok(TranslationOutcome::NeedsDisambiguation(request));
                }
                Resolution::Miss => match self.config.miss_policy {
                    MissPolicy::Fail => {
                        return Err(SynthesisError::UnresolvedToken {
                            token: token.text.clone(),
                        })
                    }
                    MissPolicy::Skip => {
                        warn!("No gloss for token '{}', skipping", token.text);
                        skipped.push(token.text.clone());
                    }
                },
            }
        }

        let no_content = || SynthesisError::NoTranslatableContent {
            text: text.to_string(),
        };
        if resolved.is_empty() {
            return Err(no_content());
        }

        let sign = match self.config.sign_format {
            SignFormat::Landmarks => self.assemble_landmarks(resolved, skipped)?,
            SignFormat::Video => self.assemble_video(resolved, skipped),
        }
        .ok_or_else(no_content)?;

        info!(
            "Translated '{}' into '{}' ({} {})",
            text,
            sign.name(),
            sign.len(),
            match sign.format() {
                SignFormat::Landmarks => "frames",
                SignFormat::Video => "clips",
            }
        );
        Ok(TranslationOutcome::Translated(sign))
    }
}
