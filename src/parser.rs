use std::fmt;

use crate::builder::AstBuilderResult;
use crate::provider::StatementProvider;
use crate::token::{Token, TokenKind};

/// Classifies a parser usage error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// More than one top-level statement terminator on a single line.
    MultipleStatements { count: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleStatements { .. } => {
                write!(f, "Only one line of code is allowed at a time.")
            }
        }
    }
}

/// Caller misuse of the parser, as opposed to a grammar mismatch
/// (which is an [`AstBuilderResult::Failure`]).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: usize,
}

/// Parse the tokens of one line into a statement.
///
/// # Errors
///
/// Returns `ParseError` when the line holds more than one statement.
pub fn parse(tokens: &[Token], line: usize) -> Result<AstBuilderResult, ParseError> {
    Parser::new().parse(tokens, line)
}

/// Line-level parser entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser;

impl Parser {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Validate the one-statement-per-line invariant, then hand the whole
    /// slice to the statement provider.
    pub fn parse(&self, tokens: &[Token], line: usize) -> Result<AstBuilderResult, ParseError> {
        let count = top_level_semicolons(tokens);
        if count > 1 {
            return Err(ParseError {
                kind: ParseErrorKind::MultipleStatements { count },
                line,
            });
        }
        Ok(StatementProvider::new(tokens, line).get_verified_statement_result())
    }
}

/// Semicolons outside any `{ ... }` block. Statements nested in a
/// conditional's blocks belong to that single conditional statement.
fn top_level_semicolons(tokens: &[Token]) -> usize {
    let mut depth = 0_usize;
    let mut count = 0;
    for token in tokens {
        match token.kind {
            TokenKind::OpenBrace => depth += 1,
            TokenKind::CloseBrace => depth = depth.saturating_sub(1),
            TokenKind::Semicolon if depth == 0 => count += 1,
            _ => {}
        }
    }
    count
}
