use std::fmt;

use serde::{Deserialize, Serialize};

/// Half-open byte range `[start, end)` into the originating line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Smallest span covering both `self` and `other`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Whether `other` lies entirely inside this span.
    #[must_use]
    pub const fn contains(&self, other: &Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Token kinds produced by the lexer.
///
/// The serialized names are the tags used by external lexer rule tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    /// `let`
    #[serde(rename = "LET")]
    Let,
    /// `const`
    #[serde(rename = "CONST")]
    Const,
    /// `if`
    #[serde(rename = "IF")]
    If,
    /// `else`
    #[serde(rename = "ELSE")]
    Else,
    /// Type keyword (`number`, `string`, `boolean`).
    #[serde(rename = "TYPE")]
    Type,
    /// `true` or `false`.
    #[serde(rename = "BOOLEAN")]
    Boolean,
    /// Identifier.
    #[serde(rename = "ID")]
    Identifier,
    /// Decimal number literal.
    #[serde(rename = "NUMBER")]
    Number,
    /// Quoted string literal, quotes included in the token text.
    #[serde(rename = "STRING")]
    String,
    #[serde(rename = "COLON")]
    Colon,
    #[serde(rename = "SEMICOLON")]
    Semicolon,
    #[serde(rename = "COMMA")]
    Comma,
    #[serde(rename = "ASSIGN")]
    Assign,
    #[serde(rename = "PLUS")]
    Plus,
    #[serde(rename = "MINUS")]
    Minus,
    #[serde(rename = "MUL")]
    Mul,
    #[serde(rename = "DIV")]
    Div,
    #[serde(rename = "MODULE")]
    Mod,
    /// `(`
    #[serde(rename = "OPAREN")]
    OpenParen,
    /// `)`
    #[serde(rename = "CPAREN")]
    CloseParen,
    /// `{`
    #[serde(rename = "OBRACE")]
    OpenBrace,
    /// `}`
    #[serde(rename = "CBRACE")]
    CloseBrace,
}

impl TokenKind {
    /// Whether the kind is one of the five arithmetic operators.
    #[must_use]
    pub const fn is_operator(self) -> bool {
        matches!(
            self,
            Self::Plus | Self::Minus | Self::Mul | Self::Div | Self::Mod
        )
    }

    /// The external tag of this kind, e.g. `"SEMICOLON"`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Let => "LET",
            Self::Const => "CONST",
            Self::If => "IF",
            Self::Else => "ELSE",
            Self::Type => "TYPE",
            Self::Boolean => "BOOLEAN",
            Self::Identifier => "ID",
            Self::Number => "NUMBER",
            Self::String => "STRING",
            Self::Colon => "COLON",
            Self::Semicolon => "SEMICOLON",
            Self::Comma => "COMMA",
            Self::Assign => "ASSIGN",
            Self::Plus => "PLUS",
            Self::Minus => "MINUS",
            Self::Mul => "MUL",
            Self::Div => "DIV",
            Self::Mod => "MODULE",
            Self::OpenParen => "OPAREN",
            Self::CloseParen => "CPAREN",
            Self::OpenBrace => "OBRACE",
            Self::CloseBrace => "CBRACE",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single token with its kind, text, and source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            span: Span::new(start, end),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}) at {}", self.kind, self.text, self.span)
    }
}
