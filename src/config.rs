//! Completion configuration
//! Identifier case-folding settings, threaded explicitly into the parser

use serde::{Deserialize, Serialize};

/// How a database folds identifier case. Picked per connection to match the
/// backend's convention (e.g. uppercase for Oracle-style catalogs).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    #[serde(rename = "upper")]
    Upper,
    #[serde(rename = "lower")]
    Lower,
    #[serde(rename = "preserve")]
    Preserve,
}

impl Default for IdentifierCase {
    fn default() -> Self {
        IdentifierCase::Preserve
    }
}

impl std::fmt::Display for IdentifierCase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdentifierCase::Upper => write!(f, "upper"),
            IdentifierCase::Lower => write!(f, "lower"),
            IdentifierCase::Preserve => write!(f, "preserve"),
        }
    }
}

impl IdentifierCase {
    pub fn apply(&self, identifier: &str) -> String {
        match self {
            IdentifierCase::Upper => identifier.to_uppercase(),
            IdentifierCase::Lower => identifier.to_lowercase(),
            IdentifierCase::Preserve => identifier.to_string(),
        }
    }
}

/// Settings for one completion session. Quoted and unquoted spellings fold
/// independently; most backends preserve quoted identifiers verbatim.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CompletionConfig {
    #[serde(default)]
    pub unquoted_case: IdentifierCase,
    #[serde(default)]
    pub quoted_case: IdentifierCase,
}

impl CompletionConfig {
    /// Normalizes one parsed name part. The scanner has already stripped any
    /// quote or bracket delimiters; `quoted` says which folding rule applies.
    pub fn normalize(&self, identifier: &str, quoted: bool) -> String {
        if quoted {
            self.quoted_case.apply(identifier)
        } else {
            self.unquoted_case.apply(identifier)
        }
    }
}
