//! Static code analysis over parsed statements.
//!
//! Checks naming conventions of declared variables and, optionally, that
//! print calls only receive identifiers or literals.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::ast::{CallExpression, Node, VariableDeclarator};
use crate::token::Span;

const PRINT_FUNCTIONS: &[&str] = &["print", "println"];

static CAMEL_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("^[a-z][a-zA-Z0-9]*$").expect("valid camelCase pattern"));

static SNAKE_CASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("^[a-z][a-z0-9]*(?:_[a-z0-9]+)*$").expect("valid snake_case pattern")
});

/// Naming convention enforced on declared identifiers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CaseConvention {
    #[default]
    #[serde(rename = "camelCase")]
    CamelCase,
    #[serde(rename = "snake_case")]
    SnakeCase,
}

impl CaseConvention {
    #[must_use]
    pub fn matches(self, name: &str) -> bool {
        match self {
            Self::CamelCase => CAMEL_CASE.is_match(name),
            Self::SnakeCase => SNAKE_CASE.is_match(name),
        }
    }
}

impl fmt::Display for CaseConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CamelCase => f.write_str("camelCase"),
            Self::SnakeCase => f.write_str("snake_case"),
        }
    }
}

/// Analyzer options, read from a JSON `option -> value` map.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalyzerConfig {
    pub case_convention: CaseConvention,
    /// Reject print arguments other than identifiers and literals.
    pub restrict_print_arguments: bool,
}

/// One finding, positioned by line index and span within the line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub span: Span,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Warning at ({}, {}): {}", self.line, self.span.start, self.message)
    }
}

/// Collect every diagnostic for one statement, in source order.
#[must_use]
pub fn analyze(node: &Node, config: &AnalyzerConfig, line: usize) -> Vec<Diagnostic> {
    let mut analyzer = Analyzer {
        config,
        line,
        diagnostics: Vec::new(),
    };
    analyzer.visit(node);
    analyzer.diagnostics
}

struct Analyzer<'a> {
    config: &'a AnalyzerConfig,
    line: usize,
    diagnostics: Vec<Diagnostic>,
}

impl Analyzer<'_> {
    fn visit(&mut self, node: &Node) {
        match node {
            Node::VariableDeclaration(declaration) => {
                for declarator in &declaration.declarations {
                    self.declarator(declarator);
                }
            }
            Node::VariableDeclarator(declarator) => self.declarator(declarator),
            Node::CallExpression(call) => {
                self.call(call);
                self.visit_children(node);
            }
            _ => self.visit_children(node),
        }
    }

    fn visit_children(&mut self, node: &Node) {
        for child in node.children() {
            self.visit(child);
        }
    }

    fn declarator(&mut self, declarator: &VariableDeclarator) {
        let convention = self.config.case_convention;
        if !convention.matches(&declarator.id.name) {
            self.report(
                declarator.id.span,
                format!(
                    "Identifier '{}' is not in {convention}",
                    declarator.id.name
                ),
            );
        }
        if let Some(init) = &declarator.init {
            self.visit(init);
        }
    }

    fn call(&mut self, call: &CallExpression) {
        if !self.config.restrict_print_arguments
            || !PRINT_FUNCTIONS.contains(&call.callee.name.as_str())
        {
            return;
        }
        for argument in &call.arguments {
            if !is_simple_argument(argument) {
                self.report(
                    argument.span(),
                    format!(
                        "{} arguments must be identifiers or literals, found {}",
                        call.callee.name,
                        argument.kind_name()
                    ),
                );
            }
        }
    }

    fn report(&mut self, span: Span, message: String) {
        tracing::debug!(line = self.line, %span, %message, "diagnostic");
        self.diagnostics.push(Diagnostic {
            line: self.line,
            span,
            message,
        });
    }
}

const fn is_simple_argument(node: &Node) -> bool {
    matches!(
        node,
        Node::Identifier(_) | Node::NumberLiteral(_) | Node::StringLiteral(_) | Node::BooleanLiteral(_)
    )
}
