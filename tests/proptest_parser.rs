//! Property-based tests with proptest.
//!
//! Random token soups exercise the parser's invariants; random arithmetic
//! trees check that precedence, the interpreter, and the formatter's
//! parenthesization agree with a reference evaluation.

use printscript::{
    AstBuilderResult, FormatConfig, Interpreter, ParseErrorKind, Span, format, parse, parse_line,
    tokenize,
};
use proptest::prelude::*;

// -- Strategies --

const FRAGMENTS: &[&str] = &[
    "let", "const", "a", "b", "print", "1", "2.5", "\"s\"", "true", ":", "number", "string", "=",
    "+", "-", "*", "/", "%", "(", ")", ",", "if", "{", "}", "else",
];

/// Lexable line without semicolons.
fn soup() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 1..=12).prop_map(|parts| parts.join(" "))
}

/// `name = number;`
fn simple_statement() -> impl Strategy<Value = String> {
    ("[a-z][a-z0-9]{0,6}", 0_u32..1000).prop_map(|(name, n)| std::format!("{name} = {n};"))
}

#[derive(Debug, Clone)]
enum Expr {
    Num(i128),
    Bin(Box<Expr>, char, Box<Expr>),
}

impl Expr {
    fn value(&self) -> i128 {
        match self {
            Self::Num(n) => *n,
            Self::Bin(l, '+', r) => l.value() + r.value(),
            Self::Bin(l, '-', r) => l.value() - r.value(),
            Self::Bin(l, _, r) => l.value() * r.value(),
        }
    }

    /// Fully parenthesized source.
    fn source(&self) -> String {
        match self {
            Self::Num(n) => n.to_string(),
            Self::Bin(l, op, r) => std::format!("({} {op} {})", l.source(), r.source()),
        }
    }
}

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = (0_i128..20).prop_map(Expr::Num);
    leaf.prop_recursive(3, 8, 2, |inner| {
        (inner.clone(), prop::sample::select(vec!['+', '-', '*']), inner)
            .prop_map(|(l, op, r)| Expr::Bin(Box::new(l), op, Box::new(r)))
    })
}

fn printed(line: &str) -> Result<Vec<String>, TestCaseError> {
    let node = parse_line(line, 0)
        .map_err(|e| TestCaseError::fail(std::format!("{line}: {e}")))?;
    let mut output = Vec::new();
    Interpreter::new()
        .interpret(&node, &mut output)
        .map_err(|e| TestCaseError::fail(std::format!("{line}: {e}")))?;
    Ok(output)
}

// -- Property tests --

proptest! {
    /// Parsing the same tokens twice gives the same result.
    #[test]
    fn parse_idempotent(line in soup()) {
        let line = std::format!("{line};");
        let tokens = tokenize(&line).unwrap();
        prop_assert_eq!(parse(&tokens, 0), parse(&tokens, 0));
    }

    /// One semicolon: either a statement spanning the whole line or a
    /// non-empty failure, never a usage error.
    #[test]
    fn single_semicolon_outcome(line in soup()) {
        let line = std::format!("{line};");
        let tokens = tokenize(&line).unwrap();
        let result = parse(&tokens, 0)
            .map_err(|e| TestCaseError::fail(std::format!("usage error: {e}")))?;
        match result {
            AstBuilderResult::Success(node) => {
                let whole = tokens[0].span.union(tokens[tokens.len() - 1].span);
                prop_assert_eq!(node.span(), whole);
                prop_assert!(node.is_statement());
            }
            AstBuilderResult::Failure(message) => prop_assert!(!message.is_empty()),
        }
    }

    /// Every child span lies inside its parent's span.
    #[test]
    fn spans_nest(line in soup()) {
        let line = std::format!("{line};");
        let tokens = tokenize(&line).unwrap();
        if let Ok(AstBuilderResult::Success(node)) = parse(&tokens, 0) {
            let mut stack = vec![&node];
            while let Some(current) = stack.pop() {
                let span: Span = current.span();
                for child in current.child_spans() {
                    prop_assert!(span.contains(&child));
                }
                stack.extend(current.children());
            }
        }
    }

    /// Two or more semicolons outside braces are always a usage error.
    /// Semicolons inside conditional blocks are not counted, so a one-line
    /// `if (c) { a = 1; b = 2; }` is still a single statement.
    #[test]
    fn multiple_statements_rejected(
        statements in prop::collection::vec(simple_statement(), 2..=5)
    ) {
        let line = statements.join(" ");
        let tokens = tokenize(&line).unwrap();
        let err = parse(&tokens, 0).unwrap_err();
        prop_assert_eq!(
            err.kind,
            ParseErrorKind::MultipleStatements { count: statements.len() }
        );
    }

    /// Interpreted arithmetic matches a reference evaluation.
    #[test]
    fn arithmetic_matches_reference(e in expr()) {
        let output = printed(&std::format!("print({});", e.source()))?;
        prop_assert_eq!(output, vec![e.value().to_string()]);
    }

    /// The formatter drops redundant parentheses without changing meaning.
    #[test]
    fn formatting_preserves_value(e in expr()) {
        let line = std::format!("print({});", e.source());
        let node = parse_line(&line, 0).unwrap();
        let formatted = format(&node, &FormatConfig::default());
        prop_assert_eq!(printed(&formatted)?, printed(&line)?);
    }
}
