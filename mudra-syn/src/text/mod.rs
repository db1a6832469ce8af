//! Text language processors: normalization and word tokenization
//!
//! Each language pairs a set of [`ReplacementRules`] with a word pattern for
//! its script. A word may carry a parenthesised sense tag, `bank(river)`,
//! which is how a caller writes a disambiguated surface form.

mod english;
mod hindi;
mod rules;
mod urdu;

pub use english::English;
pub use hindi::Hindi;
pub use rules::ReplacementRules;
pub use urdu::Urdu;

use crate::error::SynthesisError;
use mudra_core::TextLanguageCode;
use regex::Regex;

/// A word-level unit of normalized input text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub text: String,
    /// Position of the token in its sentence
    pub index: usize,
}

/// Per-language text normalization and tokenization
pub trait TextLanguage: Send + Sync {
    fn code(&self) -> TextLanguageCode;

    /// Apply the language's ordered replacement rules and trim
    fn preprocess(&self, text: &str) -> String;

    /// Split normalized text into word tokens; punctuation is dropped
    fn tokenize(&self, text: &str) -> Vec<Token>;
}

/// Build the processor for `code`, with `rules` replacing the built-in ones
pub fn text_language(
    code: TextLanguageCode,
    rules: Option<ReplacementRules>,
) -> Result<Box<dyn TextLanguage>, SynthesisError> {
    let language: Box<dyn TextLanguage> = match code {
        TextLanguageCode::English => Box::new(English::with_rules(rules)?),
        TextLanguageCode::Urdu => Box::new(Urdu::with_rules(rules)?),
        TextLanguageCode::Hindi => Box::new(Hindi::with_rules(rules)?),
    };
    Ok(language)
}

/// Build the processor named `name` (`english`, `ur`, ...) with built-in rules
pub fn text_language_by_name(name: &str) -> Result<Box<dyn TextLanguage>, SynthesisError> {
    let code: TextLanguageCode = name.parse()?;
    text_language(code, None)
}

/// Regex tokenizer over one script's word characters
#[derive(Debug, Clone)]
pub(crate) struct WordPattern {
    re: Regex,
}

impl WordPattern {
    /// `chars` is a regex character class (without brackets) of word
    /// characters; words may be joined by apostrophes or hyphens.
    pub(crate) fn new(chars: &str) -> Result<Self, SynthesisError> {
        let class = format!("[{}]", chars);
        let pattern = format!(r"{c}+(?:['\-]{c}+)*(?:\([^()]+\))?", c = class);
        let re = Regex::new(&pattern)
            .map_err(|e| SynthesisError::Configuration(format!("word pattern: {}", e)))?;
        Ok(Self { re })
    }

    pub(crate) fn tokenize(&self, text: &str) -> Vec<Token> {
        self.re
            .find_iter(text)
            .enumerate()
            .map(|(index, m)| Token {
                text: m.as_str().to_string(),
                index,
            })
            .collect()
    }
}

pub(crate) fn resolve_rules(
    code: TextLanguageCode,
    rules: Option<ReplacementRules>,
) -> Result<ReplacementRules, SynthesisError> {
    match rules {
        Some(rules) => Ok(rules),
        None => ReplacementRules::defaults(code),
    }
}
