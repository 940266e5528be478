//! Interpreter behaviour across statements.

mod common;

use common::parse_ok;
use printscript::{Environment, InterpretError, Interpreter, Value, VarType, VariableInfo};

fn decimal(text: &str) -> Value {
    Value::Number(text.parse().expect("decimal"))
}

fn interpret_all(lines: &[&str]) -> Result<(Interpreter, Vec<String>), InterpretError> {
    let mut output = Vec::new();
    let mut interpreter = Interpreter::new();
    for line in lines {
        interpreter = interpreter.interpret(&parse_ok(line), &mut output)?;
    }
    Ok((interpreter, output))
}

#[test]
fn declaration_round_trips_its_value() {
    let (interpreter, _) = interpret_all(&["let price:number = 19.99 * 3;"]).expect("runs");
    assert_eq!(interpreter.value_of("price"), Some(&decimal("59.97")));
}

#[test]
fn declaration_without_initializer_records_type() {
    let (interpreter, _) = interpret_all(&["let a:number;"]).expect("runs");
    assert_eq!(
        interpreter.environment().get("a"),
        Some(&VariableInfo {
            var_type: VarType::Number,
            value: None,
            constant: false,
        })
    );
}

#[test]
fn bool_is_an_alias_of_boolean() {
    let (interpreter, _) = interpret_all(&["let f:bool = false;"]).expect("runs");
    assert_eq!(
        interpreter.environment().get("f").map(|info| info.var_type),
        Some(VarType::Boolean)
    );
}

#[test]
fn division_is_exact() {
    let (interpreter, output) =
        interpret_all(&["let third:number = 1 / 4;", "print(third * 4);"]).expect("runs");
    assert_eq!(interpreter.value_of("third"), Some(&decimal("0.25")));
    assert_eq!(output, vec!["1"]);
}

#[test]
fn small_numbers_print_as_plain_decimals() {
    let (_, output) = interpret_all(&[
        "print(1 / 1000000000);",
        "print(0.0000001);",
        "print(\"x\" + 0.0000001);",
    ])
    .expect("runs");
    assert_eq!(output, vec!["0.000000001", "0.0000001", "x0.0000001"]);
}

#[test]
fn modulo_by_zero_fails() {
    let err = interpret_all(&["let a:number = 5 % 0;"]).unwrap_err();
    assert_eq!(err, InterpretError::DivisionByZero);
}

#[test]
fn string_concatenation_with_numbers() {
    let (_, output) = interpret_all(&[
        "let n:number = 2.50;",
        "let s:string = \"total: \" + n;",
        "print(s);",
    ])
    .expect("runs");
    assert_eq!(output, vec!["total: 2.5"]);
}

#[test]
fn boolean_arithmetic_is_rejected() {
    let err = interpret_all(&["let b:boolean = true;", "print(b + 1);"]).unwrap_err();
    assert_eq!(err.to_string(), "Invalid operands for '+': true, 1");
}

#[test]
fn string_multiplication_is_rejected() {
    let err = interpret_all(&["print(\"ab\" * 2);"]).unwrap_err();
    assert!(matches!(err, InterpretError::InvalidOperands { .. }));
}

#[test]
fn old_interpreter_is_unchanged_after_step() {
    let (first, _) = interpret_all(&["let a:number = 1;"]).expect("runs");
    let second = first
        .interpret(&parse_ok("a = 2;"), &mut Vec::new())
        .expect("runs");
    assert_eq!(first.value_of("a"), Some(&decimal("1")));
    assert_eq!(second.value_of("a"), Some(&decimal("2")));
}

#[test]
fn failed_branch_statement_rolls_back_environment_not_output() {
    let (before, _) = interpret_all(&["let ok:boolean = true;", "let n:number = 1;"]).expect("runs");
    let mut output = Vec::new();
    let err = before
        .interpret(
            &parse_ok("if (ok) { n = 5; print(n); n = n / 0; }"),
            &mut output,
        )
        .unwrap_err();
    assert_eq!(err, InterpretError::DivisionByZero);
    assert_eq!(before.value_of("n"), Some(&decimal("1")));
    assert_eq!(output, vec!["5"]);
}

#[test]
fn conditional_on_undeclared_variable() {
    let err = interpret_all(&["if (missing) { print(1); }"]).unwrap_err();
    assert_eq!(err, InterpretError::UndeclaredVariable("missing".to_string()));
}

#[test]
fn conditional_on_uninitialized_variable() {
    let err = interpret_all(&["let flag:boolean;", "if (flag) { print(1); }"]).unwrap_err();
    assert_eq!(err, InterpretError::UninitializedVariable("flag".to_string()));
}

#[test]
fn assignment_type_is_checked() {
    let err = interpret_all(&["let s:string = \"a\";", "s = 1;"]).unwrap_err();
    assert!(matches!(
        err,
        InterpretError::TypeMismatch {
            expected: VarType::String,
            found: VarType::Number,
            ..
        }
    ));
}

#[test]
fn redeclaration_overwrites() {
    let (interpreter, _) =
        interpret_all(&["let a:number = 1;", "let a:string = \"x\";"]).expect("runs");
    assert_eq!(
        interpreter.value_of("a"),
        Some(&Value::String("x".to_string()))
    );
}

#[test]
fn interpreter_from_existing_environment() {
    let mut environment = Environment::new();
    environment.insert(
        "seed",
        VariableInfo {
            var_type: VarType::Number,
            value: Some(decimal("7")),
            constant: true,
        },
    );
    let mut output = Vec::new();
    Interpreter::with_environment(environment)
        .interpret(&parse_ok("println(seed * 6);"), &mut output)
        .expect("runs");
    assert_eq!(output, vec!["42"]);
}
