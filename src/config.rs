//! Externally supplied configuration: the ordered lexer rule table and
//! JSON loading for the formatter and analyzer option maps.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::token::TokenKind;

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid pattern for {kind} rule '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        kind: TokenKind,
        #[source]
        source: regex::Error,
    },
}

/// One `(pattern, tokenKind)` entry of the lexer table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LexerRule {
    pub pattern: String,
    pub token_kind: TokenKind,
}

impl LexerRule {
    #[must_use]
    pub fn new(pattern: impl Into<String>, token_kind: TokenKind) -> Self {
        Self {
            pattern: pattern.into(),
            token_kind,
        }
    }
}

/// Ordered lexer rule table. Earlier rules win over later ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LexerRules {
    pub rules: Vec<LexerRule>,
}

const DEFAULT_RULES: &[(&str, TokenKind)] = &[
    (r"let\b", TokenKind::Let),
    (r"const\b", TokenKind::Const),
    (r"if\b", TokenKind::If),
    (r"else\b", TokenKind::Else),
    (r"(?:number|string|boolean|bool)\b", TokenKind::Type),
    (r"(?:true|false)\b", TokenKind::Boolean),
    (r"[A-Za-z_][A-Za-z0-9_]*", TokenKind::Identifier),
    (r"[0-9]+(?:\.[0-9]+)?", TokenKind::Number),
    (r#""[^"]*"|'[^']*'"#, TokenKind::String),
    (r":", TokenKind::Colon),
    (r";", TokenKind::Semicolon),
    (r",", TokenKind::Comma),
    (r"=", TokenKind::Assign),
    (r"\+", TokenKind::Plus),
    (r"-", TokenKind::Minus),
    (r"\*", TokenKind::Mul),
    (r"/", TokenKind::Div),
    (r"%", TokenKind::Mod),
    (r"\(", TokenKind::OpenParen),
    (r"\)", TokenKind::CloseParen),
    (r"\{", TokenKind::OpenBrace),
    (r"\}", TokenKind::CloseBrace),
];

impl LexerRules {
    #[must_use]
    pub const fn new(rules: Vec<LexerRule>) -> Self {
        Self { rules }
    }

    /// Parse a table of the form `[{"pattern": "...", "tokenKind": "LET"}]`.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON rule table from disk.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        load_json(path)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for LexerRules {
    fn default() -> Self {
        Self {
            rules: DEFAULT_RULES
                .iter()
                .map(|(pattern, kind)| LexerRule::new(*pattern, *kind))
                .collect(),
        }
    }
}

/// Read a JSON file and deserialize it into `T`.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&content)?)
}
