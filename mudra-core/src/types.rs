use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Canonical label of one sign unit, scoped to a sign-language namespace.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Gloss(pub String);

impl Gloss {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Gloss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Gloss {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Gloss {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Gloss {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// Lets gloss-keyed maps be queried with a plain `&str`
impl Borrow<str> for Gloss {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Lower-case, trim and fold `_`/space to `-` so "Pakistan Sign Language"
/// and "pakistan_sign_language" name the same thing.
pub fn normalize_short_code(code: &str) -> String {
    code.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == '_' || c == ' ' { '-' } else { c })
        .collect()
}

/// Written language of the input text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextLanguageCode {
    English,
    Urdu,
    Hindi,
}

/// Target sign language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SignLanguageCode {
    /// Pakistan Sign Language
    Psl,
    /// Word-Level American Sign Language dataset
    Wlasl,
}

/// Output representation of a synthesized sign sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SignFormat {
    Video,
    Landmarks,
}

/// Namespaces the gloss mapper translates between
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum GlossSpace {
    Psl,
    English,
    WlaslVideo,
}

impl FromStr for TextLanguageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_short_code(s).as_str() {
            "english" | "en" => Ok(Self::English),
            "urdu" | "ur" => Ok(Self::Urdu),
            "hindi" | "hi" => Ok(Self::Hindi),
            other => Err(Error::Configuration(format!(
                "no text language known for '{}'",
                other
            ))),
        }
    }
}

impl FromStr for SignLanguageCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_short_code(s).as_str() {
            "pakistan-sign-language" | "psl" | "pk-sl" => Ok(Self::Psl),
            "wlasl" | "asl" | "american-sign-language" => Ok(Self::Wlasl),
            other => Err(Error::Configuration(format!(
                "no sign language known for '{}'",
                other
            ))),
        }
    }
}

impl FromStr for SignFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_short_code(s).as_str() {
            "video" | "videos" | "mp4" => Ok(Self::Video),
            "landmarks" | "landmark" | "lm" => Ok(Self::Landmarks),
            other => Err(Error::Configuration(format!(
                "unknown sign format '{}'",
                other
            ))),
        }
    }
}

impl FromStr for GlossSpace {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize_short_code(s).as_str() {
            "psl" | "pakistan-sign-language" => Ok(Self::Psl),
            "english" | "en" => Ok(Self::English),
            "wlasl-video" | "wlasl" => Ok(Self::WlaslVideo),
            other => Err(Error::Configuration(format!(
                "unknown gloss space '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for TextLanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextLanguageCode::English => write!(f, "english"),
            TextLanguageCode::Urdu => write!(f, "urdu"),
            TextLanguageCode::Hindi => write!(f, "hindi"),
        }
    }
}

impl fmt::Display for SignLanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignLanguageCode::Psl => write!(f, "pakistan-sign-language"),
            SignLanguageCode::Wlasl => write!(f, "wlasl"),
        }
    }
}

impl fmt::Display for SignFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignFormat::Video => write!(f, "video"),
            SignFormat::Landmarks => write!(f, "landmarks"),
        }
    }
}

impl fmt::Display for GlossSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GlossSpace::Psl => write!(f, "psl"),
            GlossSpace::English => write!(f, "english"),
            GlossSpace::WlaslVideo => write!(f, "wlasl_video"),
        }
    }
}

// Config files go through `FromStr`/`Display`, so they accept the same
// aliases as flags and environment variables
macro_rules! serde_via_str {
    ($($code:ty),+ $(,)?) => {$(
        impl TryFrom<String> for $code {
            type Error = Error;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                s.parse()
            }
        }

        impl From<$code> for String {
            fn from(code: $code) -> String {
                code.to_string()
            }
        }
    )+};
}

serde_via_str!(TextLanguageCode, SignLanguageCode, SignFormat, GlossSpace);
