//! mudra-syn: text-to-sign synthesis by segment concatenation
//!
//! Input text is normalized and tokenized per written language ([`text`]),
//! tokens are resolved to sign glosses through the bilingual mapping
//! ([`gloss`]), and the stored segment of each gloss ([`segments`]) is
//! concatenated into a [`SignSequence`] ([`sign`]). Video output is encoded
//! with an external ffmpeg ([`video`]).

pub mod error;
pub mod config;
pub mod text;
pub mod gloss;
pub mod segments;
pub mod sign;
pub mod video;
pub mod synthesizer;

pub use error::SynthesisError;
pub use config::SynthesisConfig;
pub use text::{text_language, text_language_by_name, English, Hindi, ReplacementRules, TextLanguage, Token, Urdu};
pub use gloss::{GlossMapper, GlossSet};
pub use segments::{SegmentLayout, SegmentRepository};
pub use sign::{SignBody, SignSequence, VideoClip};
pub use video::VideoEncoder;
pub use mudra_core::{FallbackMatch, VideoConfig, DEFAULT_FPS};
pub use synthesizer::{
    ConcatenativeSynthesis, DisambiguationRequest, TextToSign, TranslationOutcome,
};
