//! PrintScript lexer, parser, interpreter, formatter, and analyzer.
//!
//! Source is processed one line at a time: a line is tokenized by a
//! table-driven lexer, parsed into a single statement by ordered builder
//! chains, and executed by a tree-walking interpreter whose environment is
//! threaded from line to line.
//!
//! # Quick start
//!
//! ## Run a program
//!
//! ```
//! use printscript::{LineOutcome, Runner};
//!
//! let mut output = Vec::new();
//! let reports = Runner::new().run("let a:number = 1.5;\nprint(a * 2);\n", &mut output);
//! assert!(reports.iter().all(|r| r.outcome == LineOutcome::Executed));
//! assert_eq!(output, vec!["3"]);
//! ```
//!
//! ## Parse and re-format a statement
//!
//! ```
//! use printscript::{FormatConfig, format, parse_line};
//!
//! let node = parse_line("let a:string='hola';", 0).unwrap();
//! assert_eq!(format(&node, &FormatConfig::default()), "let a: string = \"hola\";");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod analyzer;
pub mod ast;
pub mod builder;
pub mod config;
pub mod formatter;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod provider;
pub mod runner;
pub mod token;

pub use analyzer::{AnalyzerConfig, CaseConvention, Diagnostic, analyze};
pub use ast::{DeclarationKind, Node, Operator};
pub use builder::{AstBuilder, AstBuilderResult};
pub use config::{ConfigError, LexerRule, LexerRules};
pub use formatter::{FormatConfig, format, format_program};
pub use interpreter::{
    Environment, InterpretError, Interpreter, Printer, StdoutPrinter, Value, VarType,
    VariableInfo,
};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use parser::{ParseError, ParseErrorKind, Parser, parse};
pub use runner::{LineOutcome, LineReport, Runner};
pub use token::{Span, Token, TokenKind};

/// Unified error type covering every phase.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser usage error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A grammar mismatch, with the aggregated builder message.
    #[error("{0}")]
    Grammar(String),
    /// An interpretation error.
    #[error("{0}")]
    Interpret(#[from] InterpretError),
    /// A configuration error.
    #[error("{0}")]
    Config(#[from] ConfigError),
}

/// Tokenize and parse one line in a single step.
pub fn parse_line(line: &str, index: usize) -> Result<Node, Error> {
    let tokens = tokenize(line)?;
    parse(&tokens, index)?.into_result().map_err(Error::Grammar)
}
