#![allow(dead_code)]

use docklett::{Stmt, Token, format, parse, parse_str, run_str, scan};

pub const SOURCE: &str = "test.dkl";

pub fn tokens(input: &str) -> Vec<Token> {
    scan(input, SOURCE).unwrap_or_else(|e| panic!("scan failed: {e}\n--- input ---\n{input}"))
}

pub fn statements(input: &str) -> Vec<Stmt> {
    parse(&tokens(input)).unwrap_or_else(|e| panic!("parse failed: {e}\n--- input ---\n{input}"))
}

/// Run a template and return the emitted instruction lines.
pub fn emitted(input: &str) -> Vec<String> {
    run_str(input, SOURCE).unwrap_or_else(|e| panic!("run failed: {e}\n--- input ---\n{input}"))
}

/// Assert that already-canonical source formats back to itself.
pub fn roundtrip(input: &str) {
    let output = format(&statements(input));
    assert_eq!(
        output, input,
        "round-trip mismatch:\n--- expected ---\n{input}\n--- got ---\n{output}"
    );
}

/// Helper: format an AST, parse it back, assert structural equality.
pub fn assert_ast_roundtrip(original: &[Stmt]) {
    let formatted = format(original);
    let parsed = parse_str(&formatted, SOURCE).unwrap_or_else(|e| {
        panic!(
            "failed to re-parse formatted output: {e}\n\
             --- formatted ---\n{formatted}"
        )
    });

    assert_eq!(
        original,
        parsed.as_slice(),
        "statement mismatch\n--- formatted ---\n{formatted}"
    );
}
