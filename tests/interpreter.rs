//! Evaluation semantics: scoping, coercion, control flow and runtime
//! errors.

mod common;

use common::{SOURCE, emitted, statements};
use docklett::{Environment, Error, Interpreter, RuntimeErrorKind, Value, run_str, run_with};

fn final_value(input: &str, name: &str) -> Value {
    let mut interpreter = Interpreter::new();
    interpreter
        .interpret(&statements(input))
        .unwrap_or_else(|e| panic!("run failed: {e}"));
    interpreter
        .environment()
        .value(name)
        .cloned()
        .unwrap_or_else(|| panic!("'{name}' is not bound"))
}

fn runtime_error(input: &str) -> RuntimeErrorKind {
    match run_str(input, SOURCE) {
        Err(Error::Runtime(error)) => error.kind,
        other => panic!("expected runtime error, got {other:?}"),
    }
}

// -----------------------------------------------------------
// Scoping.
// -----------------------------------------------------------

#[test]
fn block_declaration_shadows_outer() {
    assert_eq!(
        final_value("@SET x = 1\n@FOR\n@SET x = 2\n@END\n", "x"),
        Value::Int(1)
    );
}

#[test]
fn shadowed_value_visible_inside_block() {
    let lines = emitted(
        "@SET x = 1\n@FOR\n@SET x = 2\n@IF x == 2\nRUN inner\n@END\n@END\n@IF x == 1\nRUN outer\n@END\n",
    );
    assert_eq!(lines, ["RUN inner", "RUN outer"]);
}

#[test]
fn assignment_updates_nearest_binding() {
    assert_eq!(
        final_value("@SET x = 1\n@IF @TRUE\nx = 2\n@END\n", "x"),
        Value::Int(2)
    );
}

#[test]
fn block_locals_do_not_leak() {
    assert_eq!(
        runtime_error("@FOR\n@SET tmp = 1\n@END\n@SET y = tmp\n"),
        RuntimeErrorKind::UndefinedVariable {
            name: "tmp".to_string()
        }
    );
}

#[test]
fn assignment_without_declaration_fails() {
    assert_eq!(
        runtime_error("x = 1\n"),
        RuntimeErrorKind::UndefinedVariable {
            name: "x".to_string()
        }
    );
}

#[test]
fn declared_then_assigned_variable_reads_new_value() {
    let input = "@SET x\nx = 5\n@SET y = x\n";
    assert_eq!(final_value(input, "x"), Value::Int(5));
    assert_eq!(final_value(input, "y"), Value::Int(5));
}

#[test]
fn redeclaration_in_same_scope_replaces() {
    assert_eq!(
        final_value("@SET x = 1\n@SET x = \"two\"\n", "x"),
        Value::Str("two".to_string())
    );
}

#[test]
fn declaration_defaults_to_nil() {
    assert_eq!(final_value("@SET x\n", "x"), Value::Nil);
}

// -----------------------------------------------------------
// Values and operators.
// -----------------------------------------------------------

#[test]
fn numeric_coercion() {
    assert_eq!(final_value("@SET x = 3 + 2.5\n", "x"), Value::Float(5.5));
}

#[test]
fn string_concatenation_is_not_numeric() {
    assert_eq!(
        final_value("@SET x = \"3\" + \"2\"\n", "x"),
        Value::Str("32".to_string())
    );
}

#[test]
fn compound_assignment() {
    assert_eq!(
        final_value("@SET n = 10\nn -= 2 * 3\nn *= 2\n", "n"),
        Value::Float(8.0)
    );
}

#[test]
fn chained_assignment_yields_value() {
    let mut interpreter = Interpreter::new();
    interpreter
        .interpret(&statements("@SET a = 0\n@SET b = 0\na = b = 7\n"))
        .expect("run");
    let env = interpreter.environment();
    assert_eq!(env.value("a"), Some(&Value::Int(7)));
    assert_eq!(env.value("b"), Some(&Value::Int(7)));
}

#[test]
fn mixed_comparison() {
    assert_eq!(final_value("@SET b = 2 >= 2.0\n", "b"), Value::Bool(true));
    assert_eq!(final_value("@SET b = 1 != 1.0\n", "b"), Value::Bool(false));
}

#[test]
fn division_by_zero() {
    assert_eq!(
        runtime_error("@SET x = 10 / (5 - 5)\n"),
        RuntimeErrorKind::DivisionByZero
    );
}

#[test]
fn type_mismatch() {
    assert_eq!(
        runtime_error("@SET x = \"a\" == 1\n"),
        RuntimeErrorKind::TypeMismatch {
            operator: "==".to_string(),
            left: "string",
            right: "integer",
        }
    );
}

#[test]
fn boolean_ordering_is_unsupported() {
    assert!(matches!(
        runtime_error("@SET x = @TRUE > @FALSE\n"),
        RuntimeErrorKind::UnsupportedOperator { operand: "boolean", .. }
    ));
}

#[test]
fn runtime_error_location() {
    let err = run_str("@SET a = 1\n@SET b = a / 0\n", SOURCE).unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!((diagnostics[0].line, diagnostics[0].column), (2, 12));
    assert_eq!(diagnostics[0].lexeme, "/");
    assert_eq!(diagnostics[0].message, "division by zero");
}

// -----------------------------------------------------------
// Control flow.
// -----------------------------------------------------------

const CHAIN: &str = "\
@IF n == 1
RUN one
@ELIF n == 2
RUN two
@ELSE
RUN many
@END
";

fn chain_for(n: i64) -> Vec<String> {
    let mut environment = Environment::new();
    environment.define("n", Value::Int(n));
    run_with(CHAIN, SOURCE, environment).expect("run")
}

#[test]
fn exactly_one_branch_runs() {
    assert_eq!(chain_for(1), ["RUN one"]);
    assert_eq!(chain_for(2), ["RUN two"]);
    assert_eq!(chain_for(3), ["RUN many"]);
}

#[test]
fn no_branch_without_else() {
    assert!(emitted("@IF 0\nRUN never\n@END\n").is_empty());
}

#[test]
fn truthiness_of_strings() {
    assert_eq!(emitted("@IF \"\"\nRUN a\n@ELIF \"x\"\nRUN b\n@END\n"), ["RUN b"]);
}

#[test]
fn predefined_variables_are_visible() {
    let mut environment = Environment::new();
    environment.define("target", Value::from("prod"));
    let lines = run_with(
        "@IF target == \"prod\"\nENV MODE=release\n@END\n",
        SOURCE,
        environment,
    )
    .expect("run");
    assert_eq!(lines, ["ENV MODE=release"]);
}

#[test]
fn execution_is_deterministic() {
    let source = "@SET x = 2\nFROM alpine\n@IF x > 1\nRUN a\n@ELSE\nRUN b\n@END\nCMD sh\n";
    let first = run_str(source, SOURCE);
    let second = run_str(source, SOURCE);
    assert_eq!(first, second);
}

#[test]
fn errors_stop_before_later_instructions() {
    let err = run_str("FROM a\n@SET x = missing\nRUN b\n", SOURCE).unwrap_err();
    assert!(matches!(err, Error::Runtime(_)));
}
