//! Pretty-printer that serializes statements back into source text.
//!
//! Spacing around `:` and `=`, blank lines before print calls, and the
//! indentation of conditional blocks come from [`FormatConfig`].

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::ast::{
    BinaryExpression, CallExpression, ConditionalStatement, Node, StringLiteral,
    VariableDeclaration, VariableDeclarator,
};

const INDENT: &str = "    ";
const PRINT_FUNCTIONS: &[&str] = &["print", "println"];

/// Formatter options, read from a JSON `option -> value` map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatConfig {
    pub space_before_colon: bool,
    pub space_after_colon: bool,
    pub space_around_equals: bool,
    /// Blank lines emitted before each `print`/`println` statement.
    pub newlines_before_println: usize,
    /// Indent units (four spaces each) inside conditional blocks.
    /// Values below 1 are treated as 1.
    pub identation_inside_conditionals: usize,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            space_before_colon: false,
            space_after_colon: true,
            space_around_equals: true,
            newlines_before_println: 0,
            identation_inside_conditionals: 1,
        }
    }
}

impl FormatConfig {
    fn colon(&self) -> String {
        let mut colon = String::new();
        if self.space_before_colon {
            colon.push(' ');
        }
        colon.push(':');
        if self.space_after_colon {
            colon.push(' ');
        }
        colon
    }

    const fn equals(&self) -> &'static str {
        if self.space_around_equals { " = " } else { "=" }
    }

    fn indent(&self) -> String {
        INDENT.repeat(self.identation_inside_conditionals.max(1))
    }
}

/// Format one node. Statements end with `;`, or with `}` for conditionals.
#[must_use]
pub fn format(node: &Node, config: &FormatConfig) -> String {
    let mut out = String::new();
    format_node(&mut out, node, config);
    out
}

/// Format a sequence of statements, one per line, with a trailing newline.
#[must_use]
pub fn format_program(nodes: &[Node], config: &FormatConfig) -> String {
    let mut out = String::new();
    for node in nodes {
        format_node(&mut out, node, config);
        out.push('\n');
    }
    out
}

fn format_node(out: &mut String, node: &Node, config: &FormatConfig) {
    match node {
        Node::VariableDeclaration(declaration) => format_declaration(out, declaration, config),
        Node::ExpressionStatement(statement) => {
            if is_print_call(&statement.expression) {
                out.push_str(&"\n".repeat(config.newlines_before_println));
            }
            format_expression(out, &statement.expression, config);
            out.push(';');
        }
        Node::ConditionalStatement(conditional) => format_conditional(out, conditional, config),
        Node::VariableDeclarator(declarator) => format_declarator(out, declarator, config),
        Node::TypeReference(type_ref) => out.push_str(&type_ref.type_name),
        Node::Identifier(_)
        | Node::NumberLiteral(_)
        | Node::StringLiteral(_)
        | Node::BooleanLiteral(_)
        | Node::BinaryExpression(_)
        | Node::AssignmentExpression(_)
        | Node::CallExpression(_) => format_expression(out, node, config),
    }
}

fn format_declaration(out: &mut String, declaration: &VariableDeclaration, config: &FormatConfig) {
    out.push_str(declaration.kind.keyword());
    out.push(' ');
    for (i, declarator) in declaration.declarations.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        format_declarator(out, declarator, config);
    }
    out.push(';');
}

fn format_declarator(out: &mut String, declarator: &VariableDeclarator, config: &FormatConfig) {
    out.push_str(&declarator.id.name);
    out.push_str(&config.colon());
    out.push_str(&declarator.type_ref.type_name);
    if let Some(init) = &declarator.init {
        out.push_str(config.equals());
        format_expression(out, init, config);
    }
}

fn format_conditional(out: &mut String, conditional: &ConditionalStatement, config: &FormatConfig) {
    let _ = writeln!(out, "if({}) {{", conditional.test.name);
    format_block(out, &conditional.consequent, config);
    out.push('}');
    if !conditional.alternate.is_empty() {
        out.push_str(" else {\n");
        format_block(out, &conditional.alternate, config);
        out.push('}');
    }
}

/// Block statements, each of their lines indented one level.
fn format_block(out: &mut String, statements: &[Node], config: &FormatConfig) {
    let indent = config.indent();
    for statement in statements {
        for line in format(statement, config).lines() {
            // Blank lines from `newlines_before_println` stay empty.
            if !line.is_empty() {
                out.push_str(&indent);
                out.push_str(line);
            }
            out.push('\n');
        }
    }
}

fn format_expression(out: &mut String, node: &Node, config: &FormatConfig) {
    match node {
        Node::Identifier(identifier) => out.push_str(&identifier.name),
        Node::NumberLiteral(literal) => out.push_str(&literal.value.to_plain_string()),
        Node::StringLiteral(literal) => format_string(out, literal),
        Node::BooleanLiteral(literal) => {
            let _ = write!(out, "{}", literal.value);
        }
        Node::BinaryExpression(binary) => format_binary(out, binary, config),
        Node::AssignmentExpression(assignment) => {
            out.push_str(&assignment.left.name);
            out.push_str(config.equals());
            format_expression(out, &assignment.right, config);
        }
        Node::CallExpression(call) => format_call(out, call, config),
        Node::TypeReference(_)
        | Node::VariableDeclarator(_)
        | Node::VariableDeclaration(_)
        | Node::ExpressionStatement(_)
        | Node::ConditionalStatement(_) => format_node(out, node, config),
    }
}

/// Double quotes unless the content itself holds one.
fn format_string(out: &mut String, literal: &StringLiteral) {
    let quote = if literal.value.contains('"') { '\'' } else { '"' };
    out.push(quote);
    out.push_str(&literal.value);
    out.push(quote);
}

fn format_call(out: &mut String, call: &CallExpression, config: &FormatConfig) {
    out.push_str(&call.callee.name);
    out.push('(');
    for (i, argument) in call.arguments.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        format_expression(out, argument, config);
    }
    out.push(')');
}

/// Operands are parenthesized only where precedence or left
/// associativity would otherwise change the tree.
fn format_binary(out: &mut String, binary: &BinaryExpression, config: &FormatConfig) {
    let precedence = binary.operator.precedence();

    let left_parens = operand_precedence(&binary.left).is_some_and(|p| p < precedence);
    format_operand(out, &binary.left, left_parens, config);

    let _ = write!(out, " {} ", binary.operator);

    let right_parens = operand_precedence(&binary.right).is_some_and(|p| p <= precedence);
    format_operand(out, &binary.right, right_parens, config);
}

fn format_operand(out: &mut String, node: &Node, parens: bool, config: &FormatConfig) {
    if parens {
        out.push('(');
        format_expression(out, node, config);
        out.push(')');
    } else {
        format_expression(out, node, config);
    }
}

fn operand_precedence(node: &Node) -> Option<u8> {
    match node {
        Node::BinaryExpression(binary) => Some(binary.operator.precedence()),
        _ => None,
    }
}

fn is_print_call(node: &Node) -> bool {
    matches!(node, Node::CallExpression(call) if PRINT_FUNCTIONS.contains(&call.callee.name.as_str()))
}
