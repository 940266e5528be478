//! Single-production AST builders.
//!
//! Every builder is constructed with the full token slice of the line (or
//! sub-expression) it should recognize and the index of that line. `verify`
//! checks the structural preconditions and hands back whatever it already
//! parsed; `build` assembles the node from those parts. Composite builders
//! resolve their sub-slices through the providers in [`crate::provider`].

use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::ast::{
    BooleanLiteral, CallExpression, ConditionalStatement, DeclarationKind, ExpressionStatement,
    Identifier, Node, NumberLiteral, Operator, StringLiteral, TypeReference, VariableDeclaration,
    VariableDeclarator,
};
use crate::provider::{AssignableExpressionProvider, ExpressionProvider, StatementProvider};
use crate::token::{Span, Token, TokenKind};

/// Outcome of building one production. Failures are data, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstBuilderResult {
    Success(Node),
    Failure(String),
}

impl AstBuilderResult {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    #[must_use]
    pub const fn node(&self) -> Option<&Node> {
        match self {
            Self::Success(node) => Some(node),
            Self::Failure(_) => None,
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(message) => Some(message),
        }
    }

    pub fn into_result(self) -> Result<Node, String> {
        match self {
            Self::Success(node) => Ok(node),
            Self::Failure(message) => Err(message),
        }
    }
}

/// A recognizer for exactly one grammar production.
pub trait AstBuilder {
    /// Whatever `verify` parsed on the way, consumed by `build`.
    type Parts;

    /// Check the slice against this production without panicking.
    fn verify(&self) -> Result<Self::Parts, String>;

    /// Assemble the node from verified parts.
    fn build(&self, parts: Self::Parts) -> Node;

    /// Whether the slice matches this production.
    fn is_valid(&self) -> bool {
        self.verify().is_ok()
    }

    fn verify_and_build(&self) -> AstBuilderResult {
        match self.verify() {
            Ok(parts) => AstBuilderResult::Success(self.build(parts)),
            Err(message) => AstBuilderResult::Failure(message),
        }
    }
}

macro_rules! builder_struct {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy)]
        pub struct $name<'a> {
            tokens: &'a [Token],
            line: usize,
        }

        impl<'a> $name<'a> {
            #[must_use]
            pub const fn new(tokens: &'a [Token], line: usize) -> Self {
                Self { tokens, line }
            }

            #[must_use]
            pub const fn tokens(&self) -> &'a [Token] {
                self.tokens
            }

            /// Index of the source line, used in positional diagnostics.
            #[must_use]
            pub const fn line(&self) -> usize {
                self.line
            }
        }
    };
}

builder_struct!(
    /// `identifier`
    IdentifierBuilder
);
builder_struct!(
    /// Decimal number literal.
    NumberLiteralBuilder
);
builder_struct!(
    /// Quoted string literal.
    StringLiteralBuilder
);
builder_struct!(
    /// `true` / `false`.
    BooleanLiteralBuilder
);
builder_struct!(
    /// `callee ( arg, ... )`
    CallExpressionBuilder
);
builder_struct!(
    /// `expr op expr`, split at the rightmost lowest-precedence operator.
    BinaryExpressionBuilder
);
builder_struct!(
    /// `identifier = expr`
    AssignmentExpressionBuilder
);
builder_struct!(
    /// `identifier : type [= expr]`
    VariableDeclaratorBuilder
);
builder_struct!(
    /// `let|const declarator, ... ;`
    VariableDeclarationBuilder
);
builder_struct!(
    /// `expr ;`
    ExpressionStatementBuilder
);
builder_struct!(
    /// `if ( identifier ) { ... } [else { ... }]`
    ConditionalStatementBuilder
);

// -- Token slice helpers --

/// Span covering the whole slice. Empty slices get an empty span.
pub(crate) fn span_of(tokens: &[Token]) -> Span {
    match (tokens.first(), tokens.last()) {
        (Some(first), Some(last)) => first.span.union(last.span),
        _ => Span::default(),
    }
}

const fn depth_delta(kind: TokenKind) -> i32 {
    match kind {
        TokenKind::OpenParen | TokenKind::OpenBrace => 1,
        TokenKind::CloseParen | TokenKind::CloseBrace => -1,
        _ => 0,
    }
}

/// Index of the token closing the bracket opened at `open`.
pub(crate) fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        depth += depth_delta(token.kind);
        if depth == 0 {
            return Some(i);
        }
        if depth < 0 {
            return None;
        }
    }
    None
}

/// Split on `separator` tokens that sit outside any parentheses or braces.
pub(crate) fn split_top_level(tokens: &[Token], separator: TokenKind) -> Vec<&[Token]> {
    let mut parts = Vec::new();
    let mut depth = 0;
    let mut start = 0;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0 && token.kind == separator {
            parts.push(&tokens[start..i]);
            start = i + 1;
        }
        depth += depth_delta(token.kind);
    }
    parts.push(&tokens[start..]);
    parts
}

/// Number of `ID COLON` pairs outside any parentheses or braces.
fn declarator_heads(tokens: &[Token]) -> usize {
    let mut depth = 0;
    let mut heads = 0;
    for (i, token) in tokens.iter().enumerate() {
        if depth == 0
            && token.kind == TokenKind::Identifier
            && tokens.get(i + 1).map(|t| t.kind) == Some(TokenKind::Colon)
        {
            heads += 1;
        }
        depth += depth_delta(token.kind);
    }
    heads
}

/// Drop outer parentheses that enclose the whole slice.
pub(crate) fn strip_parens(mut tokens: &[Token]) -> &[Token] {
    while tokens.len() >= 2
        && tokens[0].kind == TokenKind::OpenParen
        && matching_close(tokens, 0) == Some(tokens.len() - 1)
    {
        tokens = &tokens[1..tokens.len() - 1];
    }
    tokens
}

fn single<'a>(tokens: &'a [Token], kind: TokenKind, what: &str) -> Result<&'a Token, String> {
    match tokens {
        [token] if token.kind == kind => Ok(token),
        [token] => Err(format!("Expected {what}, found '{}'", token.text)),
        _ => Err(format!("{what} must be a single token")),
    }
}

fn identifier_from(token: &Token) -> Identifier {
    Identifier {
        name: token.text.clone(),
        span: token.span,
    }
}

// -- Literals and identifiers --

impl<'a> AstBuilder for IdentifierBuilder<'a> {
    type Parts = &'a Token;

    fn verify(&self) -> Result<Self::Parts, String> {
        single(self.tokens, TokenKind::Identifier, "Identifier")
    }

    fn build(&self, token: Self::Parts) -> Node {
        Node::Identifier(identifier_from(token))
    }
}

impl AstBuilder for NumberLiteralBuilder<'_> {
    type Parts = (BigDecimal, Span);

    fn verify(&self) -> Result<Self::Parts, String> {
        let token = single(self.tokens, TokenKind::Number, "Number literal")?;
        BigDecimal::from_str(&token.text)
            .map(|value| (value, token.span))
            .map_err(|_| format!("Invalid number literal '{}'", token.text))
    }

    fn build(&self, (value, span): Self::Parts) -> Node {
        Node::NumberLiteral(NumberLiteral { value, span })
    }
}

impl<'a> AstBuilder for StringLiteralBuilder<'a> {
    type Parts = &'a Token;

    fn verify(&self) -> Result<Self::Parts, String> {
        single(self.tokens, TokenKind::String, "String literal")
    }

    fn build(&self, token: Self::Parts) -> Node {
        let text = token.text.as_str();
        let value = ['"', '\'']
            .iter()
            .find_map(|&quote| {
                text.strip_prefix(quote)
                    .and_then(|rest| rest.strip_suffix(quote))
            })
            .unwrap_or(text);
        Node::StringLiteral(StringLiteral {
            value: value.to_string(),
            span: token.span,
        })
    }
}

impl AstBuilder for BooleanLiteralBuilder<'_> {
    type Parts = (bool, Span);

    fn verify(&self) -> Result<Self::Parts, String> {
        let token = single(self.tokens, TokenKind::Boolean, "Boolean literal")?;
        match token.text.as_str() {
            "true" => Ok((true, token.span)),
            "false" => Ok((false, token.span)),
            other => Err(format!("Invalid boolean literal '{other}'")),
        }
    }

    fn build(&self, (value, span): Self::Parts) -> Node {
        Node::BooleanLiteral(BooleanLiteral { value, span })
    }
}

// -- Expressions --

impl AstBuilder for CallExpressionBuilder<'_> {
    type Parts = (Identifier, Vec<Node>);

    fn verify(&self) -> Result<Self::Parts, String> {
        let tokens = self.tokens;
        match tokens.first() {
            Some(first) if first.kind == TokenKind::Identifier => {}
            _ => return Err("Invalid start of call expression".to_string()),
        }
        if tokens.get(1).map(|t| t.kind) != Some(TokenKind::OpenParen) {
            return Err("Call expression does not have open parenthesis".to_string());
        }
        if tokens.last().map(|t| t.kind) != Some(TokenKind::CloseParen) {
            return Err("Call expression does not have close parenthesis".to_string());
        }
        if tokens.len() < 4 {
            return Err("Not enough members for call expression".to_string());
        }
        match matching_close(tokens, 1) {
            None => return Err("Mismatched parenthesis".to_string()),
            Some(close) if close != tokens.len() - 1 => {
                return Err("Call expression has trailing tokens".to_string());
            }
            Some(_) => {}
        }

        let mut arguments = Vec::new();
        for argument in split_top_level(&tokens[2..tokens.len() - 1], TokenKind::Comma) {
            if argument.is_empty() {
                return Err("Empty argument in call expression".to_string());
            }
            let node = AssignableExpressionProvider::new(argument, self.line)
                .get_assignable_expression_result()
                .into_result()
                .map_err(|message| format!("Invalid argument: {message}"))?;
            arguments.push(node);
        }

        Ok((identifier_from(&tokens[0]), arguments))
    }

    fn build(&self, (callee, arguments): Self::Parts) -> Node {
        Node::CallExpression(CallExpression {
            callee,
            arguments,
            span: span_of(self.tokens),
        })
    }
}

impl BinaryExpressionBuilder<'_> {
    /// Rightmost operator of the lowest precedence at parenthesis depth 0.
    fn split_point(&self) -> Result<Option<(usize, Operator)>, String> {
        let mut depth = 0;
        let mut best: Option<(usize, Operator)> = None;

        for (i, token) in self.tokens.iter().enumerate() {
            match token.kind {
                TokenKind::OpenParen => depth += 1,
                TokenKind::CloseParen => {
                    depth -= 1;
                    if depth < 0 {
                        return Err("Mismatched parenthesis".to_string());
                    }
                }
                kind if depth == 0 => {
                    if let Some(op) = Operator::from_token_kind(kind) {
                        if best.is_none_or(|(_, current)| op.precedence() <= current.precedence()) {
                            best = Some((i, op));
                        }
                    }
                }
                _ => {}
            }
        }

        if depth == 0 {
            Ok(best)
        } else {
            Err("Mismatched parenthesis".to_string())
        }
    }

    fn operand(&self, tokens: &[Token], side: &str) -> Result<Node, String> {
        if tokens.is_empty() {
            return Err(format!("Missing {side} operand in binary expression"));
        }
        AssignableExpressionProvider::new(strip_parens(tokens), self.line)
            .get_assignable_expression_result()
            .into_result()
            .map_err(|message| format!("Invalid {side} operand: {message}"))
    }
}

impl AstBuilder for BinaryExpressionBuilder<'_> {
    type Parts = (Node, Operator, Node);

    fn verify(&self) -> Result<Self::Parts, String> {
        if self.tokens.len() < 3 {
            return Err("Binary expression must have at least 3 tokens".to_string());
        }

        let Some((index, operator)) = self.split_point()? else {
            let inner = strip_parens(self.tokens);
            if inner.len() < self.tokens.len() {
                return Self::new(inner, self.line).verify();
            }
            return Err("No operator found in binary expression".to_string());
        };

        let left = self.operand(&self.tokens[..index], "left")?;
        let right = self.operand(&self.tokens[index + 1..], "right")?;
        Ok((left, operator, right))
    }

    fn build(&self, (left, operator, right): Self::Parts) -> Node {
        Node::binary(left, operator, right)
    }
}

impl AstBuilder for AssignmentExpressionBuilder<'_> {
    type Parts = (Identifier, Node);

    fn verify(&self) -> Result<Self::Parts, String> {
        let tokens = self.tokens;
        if tokens.len() < 3 {
            return Err("Not enough tokens to build assignment expression".to_string());
        }
        if tokens[0].kind != TokenKind::Identifier || tokens[1].kind != TokenKind::Assign {
            return Err("Invalid assignment expression".to_string());
        }
        let right = ExpressionProvider::new(&tokens[2..], self.line)
            .get_verified_expression_result()
            .into_result()
            .map_err(|message| format!("Invalid assignment value: {message}"))?;
        Ok((identifier_from(&tokens[0]), right))
    }

    fn build(&self, (left, right): Self::Parts) -> Node {
        Node::assignment(left, right)
    }
}

// -- Statements --

impl AstBuilder for VariableDeclaratorBuilder<'_> {
    type Parts = VariableDeclarator;

    fn verify(&self) -> Result<Self::Parts, String> {
        let tokens = self.tokens;
        let Some(first) = tokens.first() else {
            return Err("Not enough tokens for a variable declarator".to_string());
        };
        if first.kind != TokenKind::Identifier {
            return Err(format!("Invalid variable name '{}'", first.text));
        }

        let type_end = tokens
            .iter()
            .position(|t| t.kind == TokenKind::Assign)
            .unwrap_or(tokens.len());
        let colons = tokens[..type_end]
            .iter()
            .filter(|t| t.kind == TokenKind::Colon)
            .count();
        if colons == 0 || tokens.get(1).map(|t| t.kind) != Some(TokenKind::Colon) {
            return Err("Missing colon".to_string());
        }
        if colons > 1 || type_end != 3 || tokens[2].kind != TokenKind::Type {
            return Err("Invalid type".to_string());
        }

        let init = match &tokens[3..] {
            [] => None,
            [_assign] => return Err("Missing initializer after '='".to_string()),
            [_assign, expression @ ..] => Some(Box::new(
                AssignableExpressionProvider::new(strip_parens(expression), self.line)
                    .get_assignable_expression_result()
                    .into_result()?,
            )),
        };

        Ok(VariableDeclarator {
            id: identifier_from(first),
            type_ref: TypeReference {
                type_name: tokens[2].text.clone(),
                span: tokens[2].span,
            },
            init,
            span: span_of(tokens),
        })
    }

    fn build(&self, declarator: Self::Parts) -> Node {
        Node::VariableDeclarator(declarator)
    }
}

impl AstBuilder for VariableDeclarationBuilder<'_> {
    type Parts = (DeclarationKind, Vec<VariableDeclarator>);

    fn verify(&self) -> Result<Self::Parts, String> {
        let tokens = self.tokens;
        let kind = match tokens.first().map(|t| t.kind) {
            Some(TokenKind::Let) => DeclarationKind::Let,
            Some(TokenKind::Const) => DeclarationKind::Const,
            _ => return Err("Invalid start of variable declaration".to_string()),
        };
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Semicolon) || tokens.len() < 2 {
            return Err("Missing semicolon at variable declaration".to_string());
        }

        let body = &tokens[1..tokens.len() - 1];
        if body.is_empty() {
            return Err("Not enough tokens for a variable declarator".to_string());
        }

        let slices = split_top_level(body, TokenKind::Comma);
        if declarator_heads(body) > slices.len() {
            return Err("Not enough tokens for a variable declarator".to_string());
        }

        let mut declarations = Vec::new();
        for slice in slices {
            if slice.is_empty() {
                return Err("Not enough tokens for a variable declarator".to_string());
            }
            let declarator = VariableDeclaratorBuilder::new(slice, self.line)
                .verify()
                .map_err(|message| format!("Invalid declarator: {message}"))?;
            declarations.push(declarator);
        }

        Ok((kind, declarations))
    }

    fn build(&self, (kind, declarations): Self::Parts) -> Node {
        Node::VariableDeclaration(VariableDeclaration {
            kind,
            declarations,
            span: span_of(self.tokens),
        })
    }
}

impl AstBuilder for ExpressionStatementBuilder<'_> {
    type Parts = Node;

    fn verify(&self) -> Result<Self::Parts, String> {
        let tokens = self.tokens;
        if tokens.is_empty() {
            return Err("Empty tokens".to_string());
        }
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Semicolon) {
            return Err("Missing semicolon at expression statement".to_string());
        }
        let body = &tokens[..tokens.len() - 1];
        if body.is_empty() {
            return Err("Empty expression statement".to_string());
        }
        ExpressionProvider::new(body, self.line)
            .get_verified_expression_result()
            .into_result()
    }

    fn build(&self, expression: Self::Parts) -> Node {
        Node::ExpressionStatement(ExpressionStatement {
            expression: Box::new(expression),
            span: span_of(self.tokens),
        })
    }
}

impl ConditionalStatementBuilder<'_> {
    /// Index of the `}` closing the block opened at `open`.
    fn block_end(&self, open: usize) -> Result<usize, String> {
        if self.tokens.get(open).map(|t| t.kind) != Some(TokenKind::OpenBrace) {
            return Err("Conditional block does not have open brace".to_string());
        }
        matching_close(self.tokens, open)
            .filter(|&close| self.tokens[close].kind == TokenKind::CloseBrace)
            .ok_or_else(|| "Conditional block does not have close brace".to_string())
    }

    /// Parse every statement of a block body independently.
    fn block(&self, body: &[Token]) -> Result<Vec<Node>, String> {
        split_statements(body)
            .into_iter()
            .map(|statement| {
                StatementProvider::new(statement, self.line)
                    .get_verified_statement_result()
                    .into_result()
                    .map_err(|message| format!("Invalid statement in conditional block: {message}"))
            })
            .collect()
    }
}

/// Cut a block body into statements: each ends at a top-level `;`, or at a
/// `}` closing a nested conditional that is not followed by `else`.
pub(crate) fn split_statements(tokens: &[Token]) -> Vec<&[Token]> {
    let mut statements = Vec::new();
    let mut depth = 0;
    let mut start = 0;

    for (i, token) in tokens.iter().enumerate() {
        if token.kind == TokenKind::OpenBrace {
            depth += 1;
        } else if token.kind == TokenKind::CloseBrace {
            depth -= 1;
        }
        let ends_here = depth == 0
            && match token.kind {
                TokenKind::Semicolon => true,
                TokenKind::CloseBrace => {
                    tokens.get(i + 1).map(|t| t.kind) != Some(TokenKind::Else)
                }
                _ => false,
            };
        if ends_here {
            statements.push(&tokens[start..=i]);
            start = i + 1;
        }
    }
    if start < tokens.len() {
        statements.push(&tokens[start..]);
    }
    statements
}

impl AstBuilder for ConditionalStatementBuilder<'_> {
    type Parts = (Identifier, Vec<Node>, Vec<Node>);

    fn verify(&self) -> Result<Self::Parts, String> {
        let tokens = self.tokens;
        if tokens.first().map(|t| t.kind) != Some(TokenKind::If) {
            return Err("Invalid start of conditional statement".to_string());
        }
        if tokens.get(1).map(|t| t.kind) != Some(TokenKind::OpenParen) {
            return Err("Conditional statement does not have open parenthesis".to_string());
        }
        let test = match tokens.get(2) {
            Some(token) if token.kind == TokenKind::Identifier => identifier_from(token),
            _ => return Err("Conditional test must be an identifier".to_string()),
        };
        if tokens.get(3).map(|t| t.kind) != Some(TokenKind::CloseParen) {
            return Err("Conditional statement does not have close parenthesis".to_string());
        }

        let then_end = self.block_end(4)?;
        let consequent = self.block(&tokens[5..then_end])?;

        let alternate = match tokens.get(then_end + 1) {
            None => Vec::new(),
            Some(token) if token.kind == TokenKind::Else => {
                let else_end = self.block_end(then_end + 2)?;
                if else_end != tokens.len() - 1 {
                    return Err("Unexpected tokens after conditional statement".to_string());
                }
                self.block(&tokens[then_end + 3..else_end])?
            }
            Some(_) => return Err("Unexpected tokens after conditional statement".to_string()),
        };

        Ok((test, consequent, alternate))
    }

    fn build(&self, (test, consequent, alternate): Self::Parts) -> Node {
        Node::ConditionalStatement(ConditionalStatement {
            test,
            consequent,
            alternate,
            span: span_of(self.tokens),
        })
    }
}
