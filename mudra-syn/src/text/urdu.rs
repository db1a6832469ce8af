use super::{resolve_rules, ReplacementRules, TextLanguage, Token, WordPattern};
use crate::error::SynthesisError;
use mudra_core::TextLanguageCode;

/// Arabic-script letters and marks, zero-width joiners, Latin and digits,
/// minus the Urdu full stop and the Arabic comma, semicolon and question mark
const URDU_WORD: &str = r"\p{Arabic}\p{Mn}\u{200C}\u{200D}\p{Latin}0-9&&[^\u{06D4}\u{060C}\u{061B}\u{061F}]";

/// Urdu: Arabic-script words, with Latin words allowed for code-switching
#[derive(Debug, Clone)]
pub struct Urdu {
    rules: ReplacementRules,
    words: WordPattern,
}

impl Urdu {
    pub fn new() -> Result<Self, SynthesisError> {
        Self::with_rules(None)
    }

    pub fn with_rules(rules: Option<ReplacementRules>) -> Result<Self, SynthesisError> {
        Ok(Self {
            rules: resolve_rules(TextLanguageCode::Urdu, rules)?,
            words: WordPattern::new(URDU_WORD)?,
        })
    }
}

impl TextLanguage for Urdu {
    fn code(&self) -> TextLanguageCode {
        TextLanguageCode::Urdu
    }

    fn preprocess(&self, text: &str) -> String {
        self.rules.apply(text).trim().to_string()
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.words.tokenize(text)
    }
}
