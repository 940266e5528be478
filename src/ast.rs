//! AST node model shared by the parser, interpreter, formatter, and analyzer.
//!
//! `Node` is a closed sum type. Whether a node is an expression or a
//! statement is decided by its variant (see [`Node::is_expression`] and
//! [`Node::is_statement`]), not by separate storage.

use std::fmt;

use bigdecimal::BigDecimal;

use crate::token::{Span, TokenKind};

/// Any AST node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Identifier(Identifier),
    NumberLiteral(NumberLiteral),
    StringLiteral(StringLiteral),
    BooleanLiteral(BooleanLiteral),
    TypeReference(TypeReference),
    BinaryExpression(BinaryExpression),
    AssignmentExpression(AssignmentExpression),
    CallExpression(CallExpression),
    VariableDeclarator(VariableDeclarator),
    VariableDeclaration(VariableDeclaration),
    ExpressionStatement(ExpressionStatement),
    ConditionalStatement(ConditionalStatement),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberLiteral {
    pub value: BigDecimal,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    /// Literal content without the surrounding quotes.
    pub value: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanLiteral {
    pub value: bool,
    pub span: Span,
}

/// Declared type name as written, e.g. `number`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeReference {
    pub type_name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryExpression {
    pub left: Box<Node>,
    pub operator: Operator,
    pub right: Box<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentExpression {
    pub left: Identifier,
    pub right: Box<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallExpression {
    pub callee: Identifier,
    pub arguments: Vec<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclarator {
    pub id: Identifier,
    pub type_ref: TypeReference,
    pub init: Option<Box<Node>>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableDeclaration {
    pub kind: DeclarationKind,
    /// Never empty.
    pub declarations: Vec<VariableDeclarator>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionStatement {
    pub expression: Box<Node>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionalStatement {
    pub test: Identifier,
    pub consequent: Vec<Node>,
    pub alternate: Vec<Node>,
    pub span: Span,
}

/// `let` or `const`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclarationKind {
    Let,
    Const,
}

impl DeclarationKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Let => "let",
            Self::Const => "const",
        }
    }
}

impl fmt::Display for DeclarationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl Operator {
    #[must_use]
    pub const fn from_token_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Plus => Some(Self::Add),
            TokenKind::Minus => Some(Self::Subtract),
            TokenKind::Mul => Some(Self::Multiply),
            TokenKind::Div => Some(Self::Divide),
            TokenKind::Mod => Some(Self::Modulo),
            _ => None,
        }
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }

    /// Binding strength: `+ -` bind looser than `* / %`.
    #[must_use]
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Add | Self::Subtract => 1,
            Self::Multiply | Self::Divide | Self::Modulo => 2,
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl Identifier {
    #[must_use]
    pub fn new(name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            span: Span::new(start, end),
        }
    }
}

impl NumberLiteral {
    #[must_use]
    pub fn new(value: impl Into<BigDecimal>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            span: Span::new(start, end),
        }
    }
}

impl StringLiteral {
    #[must_use]
    pub fn new(value: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            value: value.into(),
            span: Span::new(start, end),
        }
    }
}

impl TypeReference {
    #[must_use]
    pub fn new(type_name: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            type_name: type_name.into(),
            span: Span::new(start, end),
        }
    }
}

impl Node {
    /// Binary expression spanning both operands.
    #[must_use]
    pub fn binary(left: Self, operator: Operator, right: Self) -> Self {
        let span = left.span().union(right.span());
        Self::BinaryExpression(BinaryExpression {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    /// Assignment expression spanning the target and the value.
    #[must_use]
    pub fn assignment(left: Identifier, right: Self) -> Self {
        let span = left.span.union(right.span());
        Self::AssignmentExpression(AssignmentExpression {
            left,
            right: Box::new(right),
            span,
        })
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::Identifier(n) => n.span,
            Self::NumberLiteral(n) => n.span,
            Self::StringLiteral(n) => n.span,
            Self::BooleanLiteral(n) => n.span,
            Self::TypeReference(n) => n.span,
            Self::BinaryExpression(n) => n.span,
            Self::AssignmentExpression(n) => n.span,
            Self::CallExpression(n) => n.span,
            Self::VariableDeclarator(n) => n.span,
            Self::VariableDeclaration(n) => n.span,
            Self::ExpressionStatement(n) => n.span,
            Self::ConditionalStatement(n) => n.span,
        }
    }

    #[must_use]
    pub const fn is_expression(&self) -> bool {
        matches!(
            self,
            Self::Identifier(_)
                | Self::NumberLiteral(_)
                | Self::StringLiteral(_)
                | Self::BooleanLiteral(_)
                | Self::BinaryExpression(_)
                | Self::AssignmentExpression(_)
                | Self::CallExpression(_)
        )
    }

    #[must_use]
    pub const fn is_statement(&self) -> bool {
        matches!(
            self,
            Self::VariableDeclaration(_)
                | Self::ExpressionStatement(_)
                | Self::ConditionalStatement(_)
        )
    }

    /// Spans of the direct children, in source order.
    #[must_use]
    pub fn child_spans(&self) -> Vec<Span> {
        match self {
            Self::Identifier(_)
            | Self::NumberLiteral(_)
            | Self::StringLiteral(_)
            | Self::BooleanLiteral(_)
            | Self::TypeReference(_) => Vec::new(),
            Self::BinaryExpression(n) => vec![n.left.span(), n.right.span()],
            Self::AssignmentExpression(n) => vec![n.left.span, n.right.span()],
            Self::CallExpression(n) => std::iter::once(n.callee.span)
                .chain(n.arguments.iter().map(Self::span))
                .collect(),
            Self::VariableDeclarator(n) => {
                let mut spans = vec![n.id.span, n.type_ref.span];
                spans.extend(n.init.as_deref().map(Self::span));
                spans
            }
            Self::VariableDeclaration(n) => n.declarations.iter().map(|d| d.span).collect(),
            Self::ExpressionStatement(n) => vec![n.expression.span()],
            Self::ConditionalStatement(n) => std::iter::once(n.test.span)
                .chain(n.consequent.iter().map(Self::span))
                .chain(n.alternate.iter().map(Self::span))
                .collect(),
        }
    }

    /// Direct children that are themselves full nodes.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::Identifier(_)
            | Self::NumberLiteral(_)
            | Self::StringLiteral(_)
            | Self::BooleanLiteral(_)
            | Self::TypeReference(_)
            | Self::VariableDeclaration(_) => Vec::new(),
            Self::BinaryExpression(n) => vec![&*n.left, &*n.right],
            Self::AssignmentExpression(n) => vec![&*n.right],
            Self::CallExpression(n) => n.arguments.iter().collect(),
            Self::VariableDeclarator(n) => n.init.as_deref().into_iter().collect(),
            Self::ExpressionStatement(n) => vec![&*n.expression],
            Self::ConditionalStatement(n) => {
                n.consequent.iter().chain(n.alternate.iter()).collect()
            }
        }
    }

    /// Short variant name, used in diagnostics.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Identifier(_) => "Identifier",
            Self::NumberLiteral(_) => "NumberLiteral",
            Self::StringLiteral(_) => "StringLiteral",
            Self::BooleanLiteral(_) => "BooleanLiteral",
            Self::TypeReference(_) => "TypeReference",
            Self::BinaryExpression(_) => "BinaryExpression",
            Self::AssignmentExpression(_) => "AssignmentExpression",
            Self::CallExpression(_) => "CallExpression",
            Self::VariableDeclarator(_) => "VariableDeclarator",
            Self::VariableDeclaration(_) => "VariableDeclaration",
            Self::ExpressionStatement(_) => "ExpressionStatement",
            Self::ConditionalStatement(_) => "ConditionalStatement",
        }
    }
}
