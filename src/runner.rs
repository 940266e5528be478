//! Driving loop: lexer, parser, and interpreter over a source, line by line.
//!
//! Every line yields a [`LineOutcome`]. A failed line never stops the run;
//! the next line starts from the last environment that was successfully
//! produced.

use std::fmt;

use crate::builder::AstBuilderResult;
use crate::interpreter::{InterpretError, Interpreter, Printer};
use crate::lexer::{LexError, Lexer};
use crate::parser::{ParseError, Parser};

/// What happened to one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    /// Whitespace-only line, skipped.
    Blank,
    Executed,
    Lex(LexError),
    Usage(ParseError),
    /// Grammar mismatch, with the aggregated builder message.
    Grammar(String),
    Interpret(InterpretError),
}

impl LineOutcome {
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        !matches!(self, Self::Blank | Self::Executed)
    }
}

impl fmt::Display for LineOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blank => f.write_str("blank"),
            Self::Executed => f.write_str("ok"),
            Self::Lex(e) => write!(f, "{e}"),
            Self::Usage(e) => write!(f, "{e}"),
            Self::Grammar(message) => f.write_str(message),
            Self::Interpret(e) => write!(f, "{e}"),
        }
    }
}

/// Outcome of one line, by zero-based line index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineReport {
    pub line: usize,
    pub outcome: LineOutcome,
}

/// Threads one interpreter value through successive lines.
#[derive(Debug, Clone)]
pub struct Runner {
    lexer: Lexer,
    parser: Parser,
    interpreter: Interpreter,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Runner with the built-in lexer rules and an empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::with_lexer(Lexer::standard())
    }

    #[must_use]
    pub fn with_lexer(lexer: Lexer) -> Self {
        Self {
            lexer,
            parser: Parser::new(),
            interpreter: Interpreter::new(),
        }
    }

    /// The interpreter holding the last good environment.
    #[must_use]
    pub const fn interpreter(&self) -> &Interpreter {
        &self.interpreter
    }

    /// Lex, parse, and interpret one line. The environment only advances
    /// when the line succeeds.
    pub fn run_line(&mut self, text: &str, line: usize, printer: &mut dyn Printer) -> LineOutcome {
        let outcome = self.step(text, line, printer);
        if outcome.is_failure() {
            tracing::warn!(line, %outcome, "line failed");
        }
        outcome
    }

    fn step(&mut self, text: &str, line: usize, printer: &mut dyn Printer) -> LineOutcome {
        if text.trim().is_empty() {
            return LineOutcome::Blank;
        }
        let tokens = match self.lexer.tokenize(text) {
            Ok(tokens) => tokens,
            Err(e) => return LineOutcome::Lex(e),
        };
        let node = match self.parser.parse(&tokens, line) {
            Ok(AstBuilderResult::Success(node)) => node,
            Ok(AstBuilderResult::Failure(message)) => return LineOutcome::Grammar(message),
            Err(e) => return LineOutcome::Usage(e),
        };
        match self.interpreter.interpret(&node, printer) {
            Ok(next) => {
                self.interpreter = next;
                LineOutcome::Executed
            }
            Err(e) => LineOutcome::Interpret(e),
        }
    }

    /// Run every line of `source` in order.
    pub fn run(&mut self, source: &str, printer: &mut dyn Printer) -> Vec<LineReport> {
        let mut reports = Vec::new();
        for (line, text) in source.lines().enumerate() {
            let outcome = self.run_line(text, line, printer);
            reports.push(LineReport { line, outcome });
        }
        reports
    }
}
