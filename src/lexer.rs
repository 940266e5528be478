use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::{ConfigError, LexerRules};
use crate::token::{Token, TokenKind};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Character that no rule matches and that is not whitespace.
    UnexpectedCharacter(char),
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedCharacter(ch) => write!(f, "unexpected character: {ch}"),
        }
    }
}

/// Error produced during lexing. Aborts the current line only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unexpected character at position {position}: {}", self.character())]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Byte offset of the offending character in the line.
    pub position: usize,
}

impl LexError {
    /// The character that could not be tokenized.
    #[must_use]
    pub const fn character(&self) -> char {
        match self.kind {
            LexErrorKind::UnexpectedCharacter(ch) => ch,
        }
    }
}

static STANDARD: LazyLock<Lexer> = LazyLock::new(|| {
    Lexer::new(&LexerRules::default()).expect("built-in lexer rules are valid regular expressions")
});

/// Tokenize one line of source with the built-in rule table.
///
/// # Errors
///
/// Returns `LexError` on the first character that no rule matches
/// and that is not whitespace.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexError> {
    STANDARD.tokenize(line)
}

/// Table-driven lexer. Rules are tried in table order at each position;
/// the first rule whose pattern matches at the cursor wins.
#[derive(Debug, Clone)]
pub struct Lexer {
    rules: Vec<(Regex, TokenKind)>,
}

impl Lexer {
    /// Compile a rule table. Each pattern is anchored at the cursor.
    pub fn new(rules: &LexerRules) -> Result<Self, ConfigError> {
        let rules = rules
            .rules
            .iter()
            .map(|rule| {
                Regex::new(&format!("^(?:{})", rule.pattern))
                    .map(|regex| (regex, rule.token_kind))
                    .map_err(|source| ConfigError::InvalidPattern {
                        pattern: rule.pattern.clone(),
                        kind: rule.token_kind,
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// The lexer built from the default rule table.
    #[must_use]
    pub fn standard() -> Self {
        STANDARD.clone()
    }

    /// Convert one line into its ordered token sequence.
    pub fn tokenize(&self, line: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        let mut pos = 0;

        while pos < line.len() {
            let rest = &line[pos..];

            if let Some((kind, len)) = self.match_at(rest) {
                let token = Token::new(kind, &rest[..len], pos, pos + len);
                tracing::trace!(%token, "token");
                tokens.push(token);
                pos += len;
                continue;
            }

            // Only reached on a char boundary since every advance is by a
            // whole match or a whole char.
            let Some(ch) = rest.chars().next() else {
                break;
            };
            if ch.is_whitespace() {
                pos += ch.len_utf8();
            } else {
                return Err(LexError {
                    kind: LexErrorKind::UnexpectedCharacter(ch),
                    position: pos,
                });
            }
        }

        Ok(tokens)
    }

    fn match_at(&self, rest: &str) -> Option<(TokenKind, usize)> {
        self.rules.iter().find_map(|(regex, kind)| {
            regex
                .find(rest)
                .filter(|m| m.start() == 0 && !m.is_empty())
                .map(|m| (*kind, m.end()))
        })
    }
}
