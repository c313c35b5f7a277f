use serde::{Deserialize, Serialize};
use std::fmt;

/// A single finding reported by IBLinter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// File path as reported by the linter (often absolute)
    pub file: String,
    /// Line number (1-indexed, 0 when the linter reports none)
    #[serde(default)]
    pub line: u32,
    /// Reported level
    pub level: Level,
    /// Violation message
    pub message: String,
}

impl Issue {
    pub fn new(
        file: impl Into<String>,
        line: u32,
        level: Level,
        message: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            line,
            level,
            message: message.into(),
        }
    }
}

/// Issue level as reported by the linter
///
/// Anything other than `error` or `warning` is kept verbatim as `Unknown`
/// and dropped during classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Level {
    Error,
    Warning,
    Unknown(String),
}

impl From<String> for Level {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "error" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<Level> for String {
    fn from(level: Level) -> Self {
        level.to_string()
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
            Self::Unknown(raw) => write!(f, "{}", raw),
        }
    }
}

/// Severity of a posted review annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informative, does not fail the review
    Warn,
    /// Fails the review
    Fail,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}
