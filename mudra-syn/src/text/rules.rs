//! Ordered regex character replacements applied before tokenization
//!
//! Rules run in declared order and each rule sees the output of the ones
//! before it. A rules file looks like:
//!
//! ```json
//! { "replace": { "urdu": { "؟": "?", "\\s+": " " } } }
//! ```

use crate::error::SynthesisError;
use mudra_core::TextLanguageCode;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Folding shared by every language
const COMMON: &[(&str, &str)] = &[
    ("[\u{201C}\u{201D}\u{201E}\u{201F}\u{2033}]", "\""),
    ("[\u{2018}\u{2019}\u{201A}\u{201B}\u{2032}]", "'"),
    ("[\u{2013}\u{2014}\u{2015}]", "-"),
    ("\u{2026}", "..."),
];

const URDU: &[(&str, &str)] = &[
    ("\u{061F}", "?"),
    ("\u{06D4}", "."),
    ("\u{060C}", ","),
    ("\u{061B}", ";"),
];

const HINDI: &[(&str, &str)] = &[("\u{0965}", "."), ("\u{0964}", ".")];

/// Runs last so earlier rules can introduce or remove spaces freely
const WHITESPACE: (&str, &str) = (r"\s+", " ");

#[derive(Debug, Clone)]
pub struct ReplacementRules {
    rules: Vec<(Regex, String)>,
}

impl ReplacementRules {
    /// Compile `(pattern, replacement)` pairs in order
    pub fn new<I, P, R>(pairs: I) -> Result<Self, SynthesisError>
    where
        I: IntoIterator<Item = (P, R)>,
        P: AsRef<str>,
        R: Into<String>,
    {
        let rules = pairs
            .into_iter()
            .map(|(pattern, replacement)| {
                let pattern = pattern.as_ref();
                Regex::new(pattern)
                    .map(|re| (re, replacement.into()))
                    .map_err(|e| {
                        SynthesisError::Configuration(format!(
                            "invalid replacement pattern '{}': {}",
                            pattern, e
                        ))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Built-in rules for `code`: script punctuation, then quotes and dashes,
    /// then whitespace collapsing.
    pub fn defaults(code: TextLanguageCode) -> Result<Self, SynthesisError> {
        let script: &[(&str, &str)] = match code {
            TextLanguageCode::English => &[],
            TextLanguageCode::Urdu => URDU,
            TextLanguageCode::Hindi => HINDI,
        };
        Self::new(
            script
                .iter()
                .chain(COMMON.iter())
                .chain(std::iter::once(&WHITESPACE))
                .copied(),
        )
    }

    /// Parse a `{"replace": {"<language>": {pattern: replacement}}}` document.
    /// Languages absent from the document are absent from the result.
    pub fn from_json_str(
        content: &str,
    ) -> Result<HashMap<TextLanguageCode, ReplacementRules>, SynthesisError> {
        let parse_err = |message: String| SynthesisError::MappingParse {
            path: "<text rules>".into(),
            message,
        };

        let doc: serde_json::Value =
            serde_json::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        let replace = doc
            .get("replace")
            .and_then(|v| v.as_object())
            .ok_or_else(|| parse_err("missing 'replace' object".to_string()))?;

        let mut by_language = HashMap::new();
        for (language, table) in replace {
            let code: TextLanguageCode = language.parse()?;
            let table = table
                .as_object()
                .ok_or_else(|| parse_err(format!("'replace.{}' must be an object", language)))?;
            let pairs = table
                .iter()
                .map(|(pattern, replacement)| {
                    replacement
                        .as_str()
                        .map(|r| (pattern.as_str(), r.to_string()))
                        .ok_or_else(|| {
                            parse_err(format!("replacement for '{}' must be a string", pattern))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            by_language.insert(code, Self::new(pairs)?);
        }
        Ok(by_language)
    }

    pub fn from_json_file(
        path: impl AsRef<Path>,
    ) -> Result<HashMap<TextLanguageCode, ReplacementRules>, SynthesisError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SynthesisError::MappingIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&content).map_err(|e| match e {
            SynthesisError::MappingParse { message, .. } => SynthesisError::MappingParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    pub fn apply(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
