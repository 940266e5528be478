//! Tree-walking interpreter.
//!
//! Interpretation is a pure step from one environment to the next: each
//! call to [`Interpreter::interpret`] works on a copy of the current
//! variables and only returns a new interpreter when the whole statement
//! succeeded. The caller threads the returned value into the next line, so a
//! failed statement leaves the previous environment untouched.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use bigdecimal::BigDecimal;

use crate::ast::{
    AssignmentExpression, BinaryExpression, CallExpression, ConditionalStatement,
    DeclarationKind, Node, Operator, VariableDeclaration,
};

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarType {
    Number,
    String,
    Boolean,
}

impl FromStr for VarType {
    type Err = InterpretError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "boolean" | "bool" => Ok(Self::Boolean),
            other => Err(InterpretError::UnknownType(other.to_string())),
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => f.write_str("number"),
            Self::String => f.write_str("string"),
            Self::Boolean => f.write_str("boolean"),
        }
    }
}

/// Runtime value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Number(BigDecimal),
    String(String),
    Boolean(bool),
}

impl Value {
    #[must_use]
    pub const fn var_type(&self) -> VarType {
        match self {
            Self::Number(_) => VarType::Number,
            Self::String(_) => VarType::String,
            Self::Boolean(_) => VarType::Boolean,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => f.write_str(&canonical_number(n)),
            Self::String(s) => f.write_str(s),
            Self::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Plain decimal rendering without insignificant trailing zeros.
#[must_use]
pub fn canonical_number(n: &BigDecimal) -> String {
    let text = n.to_plain_string();
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

/// A declared variable. `value` is `None` until the variable is initialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableInfo {
    pub var_type: VarType,
    pub value: Option<Value>,
    pub constant: bool,
}

/// Variable name to type and value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    variables: HashMap<String, VariableInfo>,
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&VariableInfo> {
        self.variables.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, info: VariableInfo) {
        self.variables.insert(name.into(), info);
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableInfo)> {
        self.variables.iter().map(|(name, info)| (name.as_str(), info))
    }
}

/// Sink for `print` output, one line per call.
pub trait Printer {
    fn print(&mut self, text: &str);
}

impl Printer for Vec<String> {
    fn print(&mut self, text: &str) {
        self.push(text.to_string());
    }
}

/// Prints to standard output.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdoutPrinter;

impl Printer for StdoutPrinter {
    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Errors raised while interpreting one statement.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InterpretError {
    #[error("Undeclared variable '{0}'")]
    UndeclaredVariable(String),

    #[error("Unresolved reference '{0}'")]
    UnresolvedReference(String),

    #[error("Variable '{0}' is declared but not initialized")]
    UninitializedVariable(String),

    #[error("Type mismatch for '{name}': expected {expected}, found {found}")]
    TypeMismatch {
        name: String,
        expected: VarType,
        found: VarType,
    },

    #[error("Invalid operands for '{operator}': {left}, {right}")]
    InvalidOperands {
        operator: Operator,
        left: Value,
        right: Value,
    },

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Condition '{name}' must be boolean, found {found}")]
    NonBooleanCondition { name: String, found: VarType },

    #[error("Cannot reassign constant '{0}'")]
    ConstantReassignment(String),

    #[error("Constant '{0}' must be initialized")]
    UninitializedConstant(String),

    #[error("Unknown function '{0}'")]
    UnknownFunction(String),

    #[error("Function '{0}' does not return a value")]
    NoReturnValue(String),

    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Cannot interpret {0} on its own")]
    UnsupportedNode(&'static str),
}

const PRINT_FUNCTIONS: &[&str] = &["print", "println"];

/// Interpreter state: one immutable environment snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Interpreter {
    environment: Environment,
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_environment(environment: Environment) -> Self {
        Self { environment }
    }

    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    /// Current value of `name`, if declared and initialized.
    #[must_use]
    pub fn value_of(&self, name: &str) -> Option<&Value> {
        self.environment.get(name).and_then(|info| info.value.as_ref())
    }

    /// Interpret one statement and return the interpreter for the next line.
    ///
    /// `self` is never modified; on error the caller keeps using it.
    pub fn interpret(&self, node: &Node, printer: &mut dyn Printer) -> Result<Self, InterpretError> {
        let mut environment = self.environment.clone();
        Execution {
            environment: &mut environment,
            printer,
        }
        .statement(node)?;
        tracing::debug!(statement = node.kind_name(), variables = environment.len(), "interpreted");
        Ok(Self { environment })
    }
}

struct Execution<'a> {
    environment: &'a mut Environment,
    printer: &'a mut dyn Printer,
}

impl Execution<'_> {
    fn statement(&mut self, node: &Node) -> Result<(), InterpretError> {
        match node {
            Node::VariableDeclaration(declaration) => self.declaration(declaration),
            Node::ExpressionStatement(statement) => match statement.expression.as_ref() {
                Node::CallExpression(call) => self.call(call),
                expression => self.expression(expression).map(drop),
            },
            Node::ConditionalStatement(conditional) => self.conditional(conditional),
            Node::CallExpression(call) => self.call(call),
            Node::Identifier(_)
            | Node::NumberLiteral(_)
            | Node::StringLiteral(_)
            | Node::BooleanLiteral(_)
            | Node::BinaryExpression(_)
            | Node::AssignmentExpression(_) => self.expression(node).map(drop),
            Node::TypeReference(_) | Node::VariableDeclarator(_) => {
                Err(InterpretError::UnsupportedNode(node.kind_name()))
            }
        }
    }

    fn declaration(&mut self, declaration: &VariableDeclaration) -> Result<(), InterpretError> {
        let constant = declaration.kind == DeclarationKind::Const;
        for declarator in &declaration.declarations {
            let name = &declarator.id.name;
            let var_type = declarator.type_ref.type_name.parse::<VarType>()?;
            let value = match declarator.init.as_deref() {
                Some(init) => Some(self.expression(init)?),
                None if constant => {
                    return Err(InterpretError::UninitializedConstant(name.clone()));
                }
                None => None,
            };
            if let Some(value) = &value {
                check_type(name, var_type, value)?;
            }
            self.environment.insert(
                name.clone(),
                VariableInfo {
                    var_type,
                    value,
                    constant,
                },
            );
        }
        Ok(())
    }

    fn conditional(&mut self, conditional: &ConditionalStatement) -> Result<(), InterpretError> {
        let name = &conditional.test.name;
        let info = self
            .environment
            .get(name)
            .ok_or_else(|| InterpretError::UndeclaredVariable(name.clone()))?;
        let branch = match &info.value {
            Some(Value::Boolean(true)) => &conditional.consequent,
            Some(Value::Boolean(false)) => &conditional.alternate,
            Some(other) => {
                return Err(InterpretError::NonBooleanCondition {
                    name: name.clone(),
                    found: other.var_type(),
                });
            }
            None => return Err(InterpretError::UninitializedVariable(name.clone())),
        };
        for statement in branch {
            self.statement(statement)?;
        }
        Ok(())
    }

    fn call(&mut self, call: &CallExpression) -> Result<(), InterpretError> {
        let name = &call.callee.name;
        if !PRINT_FUNCTIONS.contains(&name.as_str()) {
            return Err(InterpretError::UnknownFunction(name.clone()));
        }
        let mut text = String::new();
        for argument in &call.arguments {
            text.push_str(&self.expression(argument)?.to_string());
        }
        self.printer.print(&text);
        Ok(())
    }

    fn assignment(&mut self, assignment: &AssignmentExpression) -> Result<Value, InterpretError> {
        let name = &assignment.left.name;
        let value = self.expression(&assignment.right)?;
        let info = self
            .environment
            .get(name)
            .ok_or_else(|| InterpretError::UndeclaredVariable(name.clone()))?;
        if info.constant {
            return Err(InterpretError::ConstantReassignment(name.clone()));
        }
        check_type(name, info.var_type, &value)?;
        let updated = VariableInfo {
            value: Some(value.clone()),
            ..info.clone()
        };
        self.environment.insert(name.clone(), updated);
        Ok(value)
    }

    fn expression(&mut self, node: &Node) -> Result<Value, InterpretError> {
        match node {
            Node::NumberLiteral(literal) => Ok(Value::Number(literal.value.clone())),
            Node::StringLiteral(literal) => Ok(Value::String(literal.value.clone())),
            Node::BooleanLiteral(literal) => Ok(Value::Boolean(literal.value)),
            Node::Identifier(identifier) => {
                let info = self
                    .environment
                    .get(&identifier.name)
                    .ok_or_else(|| InterpretError::UnresolvedReference(identifier.name.clone()))?;
                info.value
                    .clone()
                    .ok_or_else(|| InterpretError::UninitializedVariable(identifier.name.clone()))
            }
            Node::BinaryExpression(binary) => self.binary(binary),
            Node::AssignmentExpression(assignment) => self.assignment(assignment),
            Node::CallExpression(call) => {
                let name = &call.callee.name;
                if PRINT_FUNCTIONS.contains(&name.as_str()) {
                    Err(InterpretError::NoReturnValue(name.clone()))
                } else {
                    Err(InterpretError::UnknownFunction(name.clone()))
                }
            }
            Node::TypeReference(_)
            | Node::VariableDeclarator(_)
            | Node::VariableDeclaration(_)
            | Node::ExpressionStatement(_)
            | Node::ConditionalStatement(_) => Err(InterpretError::UnsupportedNode(node.kind_name())),
        }
    }

    fn binary(&mut self, binary: &BinaryExpression) -> Result<Value, InterpretError> {
        let left = self.expression(&binary.left)?;
        let right = self.expression(&binary.right)?;
        apply(binary.operator, left, right)
    }
}

fn check_type(name: &str, expected: VarType, value: &Value) -> Result<(), InterpretError> {
    let found = value.var_type();
    if found == expected {
        Ok(())
    } else {
        Err(InterpretError::TypeMismatch {
            name: name.to_string(),
            expected,
            found,
        })
    }
}

/// Apply `operator` with exact decimal arithmetic and string concatenation.
pub fn apply(operator: Operator, left: Value, right: Value) -> Result<Value, InterpretError> {
    match (operator, left, right) {
        (Operator::Add, Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
        (Operator::Add, Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
        (Operator::Add, Value::Number(l), Value::String(r)) => {
            Ok(Value::String(canonical_number(&l) + &r))
        }
        (Operator::Add, Value::String(l), Value::Number(r)) => {
            Ok(Value::String(l + &canonical_number(&r)))
        }
        (Operator::Subtract, Value::Number(l), Value::Number(r)) => Ok(Value::Number(l - r)),
        (Operator::Multiply, Value::Number(l), Value::Number(r)) => Ok(Value::Number(l * r)),
        (Operator::Divide | Operator::Modulo, Value::Number(_), Value::Number(r))
            if r == BigDecimal::from(0) =>
        {
            Err(InterpretError::DivisionByZero)
        }
        (Operator::Divide, Value::Number(l), Value::Number(r)) => Ok(Value::Number(l / r)),
        (Operator::Modulo, Value::Number(l), Value::Number(r)) => Ok(Value::Number(l % r)),
        (operator, left, right) => Err(InterpretError::InvalidOperands {
            operator,
            left,
            right,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use crate::parser::parse;

    fn statement(line: &str) -> Node {
        let tokens = tokenize(line).expect("tokenize failed");
        parse(&tokens, 0)
            .expect("single statement")
            .into_result()
            .expect("parse failed")
    }

    fn run(lines: &[&str]) -> (Interpreter, Vec<String>) {
        let mut output = Vec::new();
        let mut interpreter = Interpreter::new();
        for line in lines {
            interpreter = interpreter
                .interpret(&statement(line), &mut output)
                .expect("interpret failed");
        }
        (interpreter, output)
    }

    fn number(text: &str) -> Value {
        Value::Number(text.parse().expect("decimal"))
    }

    #[test]
    fn declaration_binds_value() {
        let (interpreter, _) = run(&[r#"let a:string = "hola";"#]);
        assert_eq!(
            interpreter.environment().get("a"),
            Some(&VariableInfo {
                var_type: VarType::String,
                value: Some(Value::String("hola".to_string())),
                constant: false,
            })
        );
    }

    #[test]
    fn exact_decimal_arithmetic() {
        let (interpreter, _) = run(&["let a:number = 0.1 + 0.2;", "let b:number = 10 / 4;"]);
        assert_eq!(interpreter.value_of("a"), Some(&number("0.3")));
        assert_eq!(interpreter.value_of("b"), Some(&number("2.5")));
    }

    #[test]
    fn modulo_and_precedence() {
        let (interpreter, _) = run(&["let a:number = 1 + 2 * 3 - 7 % 4;"]);
        assert_eq!(interpreter.value_of("a"), Some(&number("4")));
    }

    #[test]
    fn print_concatenates_arguments() {
        let (_, output) = run(&[
            "let name:string = \"world\";",
            "print(\"hello \", name, \"!\");",
            "println(1 + 1.50);",
        ]);
        assert_eq!(output, vec!["hello world!", "2.5"]);
    }

    #[test]
    fn mixed_concatenation() {
        let (_, output) = run(&["print(\"n=\" + 5);", "print(5 + \"!\");"]);
        assert_eq!(output, vec!["n=5", "5!"]);
    }

    #[test]
    fn uninitialized_read_fails_assignment_succeeds() {
        let (interpreter, _) = run(&["let a:number;"]);
        let err = interpreter
            .interpret(&statement("print(a);"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::UninitializedVariable("a".to_string()));

        let next = interpreter
            .interpret(&statement("a = 3;"), &mut Vec::new())
            .expect("assignment succeeds");
        assert_eq!(next.value_of("a"), Some(&number("3")));
    }

    #[test]
    fn failed_statement_keeps_previous_environment() {
        let (interpreter, _) = run(&["let a:number = 1;"]);
        let err = interpreter
            .interpret(&statement("a = a / 0;"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::DivisionByZero);
        assert_eq!(interpreter.value_of("a"), Some(&number("1")));
    }

    #[test]
    fn assignment_to_undeclared_variable() {
        let err = Interpreter::new()
            .interpret(&statement("b = 1;"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::UndeclaredVariable("b".to_string()));
        assert_eq!(err.to_string(), "Undeclared variable 'b'");
    }

    #[test]
    fn unresolved_reference() {
        let err = Interpreter::new()
            .interpret(&statement("print(x);"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::UnresolvedReference("x".to_string()));
    }

    #[test]
    fn invalid_operands() {
        let err = Interpreter::new()
            .interpret(&statement("print(\"a\" - 1);"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid operands for '-': a, 1");

        let err = Interpreter::new()
            .interpret(&statement("print(\"a\" % \"b\");"), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            InterpretError::InvalidOperands {
                operator: Operator::Modulo,
                ..
            }
        ));
    }

    #[test]
    fn declared_type_is_enforced() {
        let err = Interpreter::new()
            .interpret(&statement("let a:number = \"x\";"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            InterpretError::TypeMismatch {
                name: "a".to_string(),
                expected: VarType::Number,
                found: VarType::String,
            }
        );
    }

    #[test]
    fn constants_cannot_be_reassigned() {
        let (interpreter, _) = run(&["const c:number = 1;"]);
        let err = interpreter
            .interpret(&statement("c = 2;"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::ConstantReassignment("c".to_string()));

        let err = Interpreter::new()
            .interpret(&statement("const d:number;"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::UninitializedConstant("d".to_string()));
    }

    #[test]
    fn conditional_branches() {
        let (_, output) = run(&[
            "let flag:boolean = true;",
            "if (flag) { print(\"yes\"); } else { print(\"no\"); }",
            "flag = false;",
            "if (flag) { print(\"yes\"); } else { print(\"no\"); }",
            "if (flag) { print(\"skipped\"); }",
        ]);
        assert_eq!(output, vec!["yes", "no"]);
    }

    #[test]
    fn conditional_branch_assigns() {
        let (interpreter, _) = run(&[
            "let flag:boolean = true;",
            "let n:number = 0;",
            "if (flag) { n = n + 1; n = n * 10; }",
        ]);
        assert_eq!(interpreter.value_of("n"), Some(&number("10")));
    }

    #[test]
    fn conditional_requires_boolean() {
        let (interpreter, _) = run(&["let n:number = 1;"]);
        let err = interpreter
            .interpret(&statement("if (n) { print(n); }"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(
            err,
            InterpretError::NonBooleanCondition {
                name: "n".to_string(),
                found: VarType::Number,
            }
        );
    }

    #[test]
    fn unknown_function() {
        let err = Interpreter::new()
            .interpret(&statement("launch(1);"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::UnknownFunction("launch".to_string()));
    }

    #[test]
    fn print_has_no_value() {
        let err = Interpreter::new()
            .interpret(&statement("let a:number = print(1);"), &mut Vec::new())
            .unwrap_err();
        assert_eq!(err, InterpretError::NoReturnValue("print".to_string()));
    }

    #[test]
    fn canonical_number_rendering() {
        assert_eq!(canonical_number(&"2.500".parse().expect("decimal")), "2.5");
        assert_eq!(canonical_number(&"3.0".parse().expect("decimal")), "3");
        assert_eq!(canonical_number(&"40".parse().expect("decimal")), "40");
        assert_eq!(
            canonical_number(&"0.0000001".parse().expect("decimal")),
            "0.0000001"
        );
        assert_eq!(canonical_number(&"1e3".parse().expect("decimal")), "1000");
    }
}
