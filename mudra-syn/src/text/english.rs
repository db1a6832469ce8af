use super::{resolve_rules, ReplacementRules, TextLanguage, Token, WordPattern};
use crate::error::SynthesisError;
use mudra_core::TextLanguageCode;

/// English: Latin-script words and digits
#[derive(Debug, Clone)]
pub struct English {
    rules: ReplacementRules,
    words: WordPattern,
}

impl English {
    pub fn new() -> Result<Self, SynthesisError> {
        Self::with_rules(None)
    }

    pub fn with_rules(rules: Option<ReplacementRules>) -> Result<Self, SynthesisError> {
        Ok(Self {
            rules: resolve_rules(TextLanguageCode::English, rules)?,
            words: WordPattern::new(r"\p{Latin}0-9")?,
        })
    }
}

impl TextLanguage for English {
    fn code(&self) -> TextLanguageCode {
        TextLanguageCode::English
    }

    fn preprocess(&self, text: &str) -> String {
        self.rules.apply(text).trim().to_string()
    }

    fn tokenize(&self, text: &str) -> Vec<Token> {
        self.words.tokenize(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_punctuation_is_dropped() {
        let english = English::new().unwrap();
        let text = english.preprocess("Hello,   world! It\u{2019}s a well-known  fact.");
        assert_eq!(text, "Hello, world! It's a well-known fact.");
        let tokens: Vec<String> = english.tokenize(&text).into_iter().map(|t| t.text).collect();
        assert_eq!(tokens, vec!["Hello", "world", "It's", "a", "well-known", "fact"]);
    }

    #[test]
    fn test_token_indices_are_positions() {
        let english = English::new().unwrap();
        let tokens = english.tokenize("one two three");
        assert_eq!(tokens[2].index, 2);
        assert_eq!(tokens[2].text, "three");
    }
}
