#![allow(dead_code)]

use printscript::{AstBuilderResult, LineReport, Node, Runner, parse, tokenize};

/// Parse one line, panicking with the builder message on failure.
pub fn parse_ok(line: &str) -> Node {
    let tokens = tokenize(line).expect("tokenize failed");
    match parse(&tokens, 0).expect("usage error") {
        AstBuilderResult::Success(node) => node,
        AstBuilderResult::Failure(message) => {
            panic!("parse failed for {line:?}:\n{message}")
        }
    }
}

/// Parse one line that must be a grammar failure; returns its message.
pub fn parse_failure(line: &str) -> String {
    let tokens = tokenize(line).expect("tokenize failed");
    match parse(&tokens, 0).expect("usage error") {
        AstBuilderResult::Success(node) => panic!("expected failure for {line:?}, got {node:?}"),
        AstBuilderResult::Failure(message) => message,
    }
}

/// Run a whole program, collecting printed lines.
pub fn run(source: &str) -> (Runner, Vec<LineReport>, Vec<String>) {
    let mut runner = Runner::new();
    let mut output = Vec::new();
    let reports = runner.run(source, &mut output);
    (runner, reports, output)
}
