//! Ordered-alternative providers.
//!
//! A provider tries a fixed, priority-ordered chain of builders over the same
//! token slice and returns the first success whose node belongs to the
//! expected category. When every builder fails, the collected messages are
//! de-noised and joined into a single failure.

use crate::ast::Node;
use crate::builder::{
    AssignmentExpressionBuilder, AstBuilder, AstBuilderResult, BinaryExpressionBuilder,
    BooleanLiteralBuilder, CallExpressionBuilder, ConditionalStatementBuilder,
    ExpressionStatementBuilder, IdentifierBuilder, NumberLiteralBuilder, StringLiteralBuilder,
    VariableDeclarationBuilder, strip_parens,
};
use crate::token::{Token, TokenKind};

/// One entry of a provider chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderKind {
    Assignment,
    Call,
    Binary,
    Number,
    String,
    Boolean,
    Identifier,
    VariableDeclaration,
    Conditional,
    ExpressionStatement,
}

impl BuilderKind {
    /// Run the builder this kind stands for over `tokens`.
    #[must_use]
    pub fn run(self, tokens: &[Token], line: usize) -> AstBuilderResult {
        match self {
            Self::Assignment => AssignmentExpressionBuilder::new(tokens, line).verify_and_build(),
            Self::Call => CallExpressionBuilder::new(tokens, line).verify_and_build(),
            Self::Binary => BinaryExpressionBuilder::new(tokens, line).verify_and_build(),
            Self::Number => NumberLiteralBuilder::new(tokens, line).verify_and_build(),
            Self::String => StringLiteralBuilder::new(tokens, line).verify_and_build(),
            Self::Boolean => BooleanLiteralBuilder::new(tokens, line).verify_and_build(),
            Self::Identifier => IdentifierBuilder::new(tokens, line).verify_and_build(),
            Self::VariableDeclaration => {
                VariableDeclarationBuilder::new(tokens, line).verify_and_build()
            }
            Self::Conditional => ConditionalStatementBuilder::new(tokens, line).verify_and_build(),
            Self::ExpressionStatement => {
                ExpressionStatementBuilder::new(tokens, line).verify_and_build()
            }
        }
    }

    /// Single-token builders. Their failures are expected whenever the slice
    /// is a composite expression, so they never reach the user.
    #[must_use]
    pub const fn is_atomic(self) -> bool {
        matches!(
            self,
            Self::Number | Self::String | Self::Boolean | Self::Identifier
        )
    }
}

const EXPRESSION_CHAIN: &[BuilderKind] = &[
    BuilderKind::Assignment,
    BuilderKind::Call,
    BuilderKind::Binary,
    BuilderKind::Number,
    BuilderKind::String,
    BuilderKind::Boolean,
    BuilderKind::Identifier,
];

const ASSIGNABLE_CHAIN: &[BuilderKind] = &[
    BuilderKind::Call,
    BuilderKind::Binary,
    BuilderKind::Number,
    BuilderKind::String,
    BuilderKind::Boolean,
    BuilderKind::Identifier,
];

const STATEMENT_CHAIN: &[BuilderKind] = &[
    BuilderKind::VariableDeclaration,
    BuilderKind::Conditional,
    BuilderKind::ExpressionStatement,
];

/// Messages that only say "this was not my production".
const EXPRESSION_NOISE: &[&str] = &[
    "No operator found in binary expression",
    "Binary expression must have at least 3 tokens",
    "Not enough tokens to build assignment expression",
    "Invalid assignment expression",
    "Not enough members for call expression",
    "Invalid start of call expression",
    "Call expression has trailing tokens",
];

const STATEMENT_NOISE: &[&str] = &[
    "Invalid start of variable declaration",
    "Invalid start of conditional statement",
];

/// Try `chain` in order; on total failure return the de-noised messages.
fn first_success(
    chain: &[BuilderKind],
    tokens: &[Token],
    line: usize,
    accepts: fn(&Node) -> bool,
) -> Result<Node, Vec<String>> {
    let mut messages: Vec<String> = Vec::new();

    for &kind in chain {
        match kind.run(tokens, line) {
            AstBuilderResult::Success(node) if accepts(&node) => {
                tracing::trace!(builder = ?kind, node = node.kind_name(), line, "built");
                return Ok(node);
            }
            AstBuilderResult::Success(node) => {
                tracing::debug!(builder = ?kind, node = node.kind_name(), "rejected node category");
            }
            AstBuilderResult::Failure(message) => {
                if !kind.is_atomic() && !messages.contains(&message) {
                    messages.push(message);
                }
            }
        }
    }

    Err(messages)
}

fn denoise(messages: Vec<String>, noise: &[&str]) -> Vec<String> {
    messages
        .into_iter()
        .filter(|m| !noise.contains(&m.as_str()))
        .collect()
}

fn aggregate(headline: &str, messages: &[String]) -> AstBuilderResult {
    if messages.is_empty() {
        AstBuilderResult::Failure(headline.to_string())
    } else {
        AstBuilderResult::Failure(format!("{headline}: {}", messages.join("\n")))
    }
}

/// Any expression, assignments included.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionProvider<'a> {
    tokens: &'a [Token],
    line: usize,
}

impl<'a> ExpressionProvider<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token], line: usize) -> Self {
        Self {
            tokens: strip_parens(tokens),
            line,
        }
    }

    #[must_use]
    pub fn get_verified_expression_result(&self) -> AstBuilderResult {
        match first_success(EXPRESSION_CHAIN, self.tokens, self.line, Node::is_expression) {
            Ok(node) => AstBuilderResult::Success(node),
            Err(messages) => aggregate(
                "No valid expression found",
                &denoise(messages, EXPRESSION_NOISE),
            ),
        }
    }
}

/// Expressions that may appear on the right of `=` or as operands and
/// arguments: everything except assignments.
#[derive(Debug, Clone, Copy)]
pub struct AssignableExpressionProvider<'a> {
    tokens: &'a [Token],
    line: usize,
}

impl<'a> AssignableExpressionProvider<'a> {
    #[must_use]
    pub fn new(tokens: &'a [Token], line: usize) -> Self {
        Self {
            tokens: strip_parens(tokens),
            line,
        }
    }

    #[must_use]
    pub fn get_assignable_expression_result(&self) -> AstBuilderResult {
        match first_success(ASSIGNABLE_CHAIN, self.tokens, self.line, Node::is_expression) {
            Ok(node) => AstBuilderResult::Success(node),
            Err(messages) => aggregate(
                "No valid assignable expression found",
                &denoise(messages, EXPRESSION_NOISE),
            ),
        }
    }
}

/// Whole statements: declarations, conditionals, and expression statements.
#[derive(Debug, Clone, Copy)]
pub struct StatementProvider<'a> {
    tokens: &'a [Token],
    line: usize,
}

impl<'a> StatementProvider<'a> {
    #[must_use]
    pub const fn new(tokens: &'a [Token], line: usize) -> Self {
        Self { tokens, line }
    }

    #[must_use]
    pub fn get_verified_statement_result(&self) -> AstBuilderResult {
        let Some(last) = self.tokens.last() else {
            return AstBuilderResult::Failure(format!("Empty tokens at line {}", self.line));
        };
        let is_conditional = self.tokens[0].kind == TokenKind::If;
        if !is_conditional && last.kind != TokenKind::Semicolon {
            return AstBuilderResult::Failure(format!(
                "Missing semicolon at ({}, {}):\n\
                 Missing semicolon at variable declaration\n\
                 Missing semicolon at expression statement",
                self.line, last.span.end
            ));
        }

        let mut messages = Vec::new();
        for &kind in STATEMENT_CHAIN {
            match kind.run(self.tokens, self.line) {
                AstBuilderResult::Success(node) if node.is_statement() => {
                    tracing::debug!(statement = node.kind_name(), line = self.line, "parsed");
                    return AstBuilderResult::Success(node);
                }
                AstBuilderResult::Success(node) => {
                    tracing::debug!(node = node.kind_name(), "rejected node category");
                }
                // The slice started like this production, so its own
                // diagnostic is the precise one.
                AstBuilderResult::Failure(message) if !STATEMENT_NOISE.contains(&message.as_str()) => {
                    return AstBuilderResult::Failure(message);
                }
                AstBuilderResult::Failure(message) => messages.push(message),
            }
        }

        aggregate("No valid statement found", &messages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;

    fn lex(line: &str) -> Vec<Token> {
        tokenize(line).expect("tokenize failed")
    }

    #[test]
    fn expression_prefers_assignment() {
        let tokens = lex("a = b");
        let result = ExpressionProvider::new(&tokens, 0).get_verified_expression_result();
        assert!(matches!(result.node(), Some(Node::AssignmentExpression(_))));
    }

    #[test]
    fn assignable_rejects_assignment() {
        let tokens = lex("a = b");
        let result = AssignableExpressionProvider::new(&tokens, 0).get_assignable_expression_result();
        let message = result.message().expect("should fail");
        assert!(message.starts_with("No valid assignable expression found"));
    }

    #[test]
    fn literal_failures_are_suppressed() {
        let tokens = lex("a b");
        let result = ExpressionProvider::new(&tokens, 0).get_verified_expression_result();
        let message = result.message().expect("should fail");
        assert!(!message.contains("Identifier"));
        assert!(!message.contains("Number literal"));
        assert!(!message.contains("No operator found"));
        assert!(message.contains("Call expression does not have open parenthesis"));
    }

    #[test]
    fn redundant_parentheses_are_stripped() {
        let tokens = lex("((a))");
        let result = AssignableExpressionProvider::new(&tokens, 0).get_assignable_expression_result();
        assert!(matches!(result.node(), Some(Node::Identifier(id)) if id.name == "a"));
    }

    #[test]
    fn call_before_binary() {
        let tokens = lex("f(1) + g(2)");
        let result = ExpressionProvider::new(&tokens, 0).get_verified_expression_result();
        assert!(matches!(result.node(), Some(Node::BinaryExpression(_))));
    }

    #[test]
    fn statement_empty_tokens() {
        let result = StatementProvider::new(&[], 4).get_verified_statement_result();
        assert_eq!(
            result,
            AstBuilderResult::Failure("Empty tokens at line 4".to_string())
        );
    }

    #[test]
    fn statement_missing_semicolon_is_positional() {
        let tokens = lex("let a:number");
        let result = StatementProvider::new(&tokens, 2).get_verified_statement_result();
        let message = result.message().expect("should fail");
        assert!(message.starts_with("Missing semicolon at (2, 12)"));
        assert!(message.contains("Missing semicolon at variable declaration"));
        assert!(message.contains("Missing semicolon at expression statement"));
    }

    #[test]
    fn declaration_failure_wins() {
        let tokens = lex("let a number;");
        let result = StatementProvider::new(&tokens, 0).get_verified_statement_result();
        assert_eq!(
            result,
            AstBuilderResult::Failure("Invalid declarator: Missing colon".to_string())
        );
    }

    #[test]
    fn statement_conditional_without_semicolon() {
        let tokens = lex("if (a) { b = 1; }");
        let result = StatementProvider::new(&tokens, 0).get_verified_statement_result();
        assert!(matches!(result.node(), Some(Node::ConditionalStatement(_))));
    }
}
