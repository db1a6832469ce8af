use super::{resolve_rules, ReplacementRules, TextLanguage, Token, WordPattern};
use crate::error::SynthesisError;
use mudra_core::TextLanguageCode;

/// Devanagari letters and signs, zero-width joiners, Latin and digits,
/// minus the danda and double danda
const HINDI_WORD: &str = r"\p{Devanagari}\u{200C}\u{200D}\p{Latin}0-9&&[^\u{0964}\u{0965}]";

/// Hindi: Devanagari words, with Latin words allowed for code-switching
#[derive(Debug, Clone)]
pub struct Hindi {
    rules: ReplacementRules,
    words: WordPattern,
}

impl Hindi {
    pub fn new() -> Result<Self, SynthesisError> {
        Self::with_rules(None)
    }

    pub fn with_rules(rules: Option<ReplacementRules>) -> Result<Self, SynthesisError> {
        Ok(Self {
            rules: resolve_rules(TextLanguageCode::Hindi, rules)?,
            words: WordPattern::new(HINDI_WORD)?,
        })
    }
}

impl TextLanguage for Hindi {
    fn code(&self) -> TextLanguageCode {
        TextLanguageCode::Hindi
    }

    fn preprocess(&self, text: &str) -> String {
        self.rules.apply(text).trim().to_string()
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.words.tokenize(text)
    }
}
