//! Formatter-specific tests.

mod common;

use common::{assert_ast_roundtrip, roundtrip, statements};
use docklett::{Expr, Stmt, format, format_expr};

#[test]
fn canonical_sources_roundtrip() {
    roundtrip("FROM rust:1.85 AS build\n@SET profile = \"release\"\nRUN cargo build\n");
    roundtrip("@SET n = 1\nn = n * (2 + 3)\n");
    roundtrip("@IF a && !b\n\tRUN one\n@END\n");
    roundtrip("@FOR\n\t@SET local = -1.5\n\tRUN echo\n@END\n");
}

#[test]
fn nested_blocks_indent_with_tabs() {
    roundtrip(
        "@IF outer\n\t@FOR\n\t\t@IF inner\n\t\t\tRUN deep\n\t\t@END\n\t@END\n@END\n",
    );
}

#[test]
fn blank_line_around_blocks() {
    let output = format(&statements("FROM a\n@IF x\nRUN b\n@END\n@FOR\n@END\nCMD c\n"));
    assert_eq!(output, "FROM a\n\n@IF x\n\tRUN b\n@END\n\n@FOR\n@END\n\nCMD c\n");
}

#[test]
fn elif_and_nested_else_if_are_distinct() {
    let elif = format(&statements("@IF a\n@ELIF b\n@END\n"));
    let nested = format(&statements("@IF a\n@ELSE\n@IF b\n@END\n@END\n"));
    assert_eq!(elif, "@IF a\n@ELIF b\n@END\n");
    assert_eq!(nested, "@IF a\n@ELSE\n\t@IF b\n\t@END\n@END\n");
}

#[test]
fn bare_booleans_are_normalised() {
    assert_eq!(
        format(&statements("@SET on = TRUE\n@IF FALSE\n@END\n")),
        "@SET on = @TRUE\n\n@IF @FALSE\n@END\n"
    );
}

#[test]
fn compound_assignment_prints_expanded() {
    let output = format(&statements("@SET n = 1\nn += 2 * 3\n"));
    assert_eq!(output, "@SET n = 1\nn = n + (2 * 3)\n");
}

#[test]
fn continuation_lines_are_kept() {
    roundtrip("RUN apk add \\\n    curl \\\n    git\n");
}

#[test]
fn format_single_expression() {
    let program = statements("@SET x = (a + 1) >= 2 && \"s\"\n");
    let Stmt::VarDecl(decl) = &program[0] else {
        panic!("expected declaration");
    };
    let expr: &Expr = decl.initializer.as_ref().expect("initializer");
    assert_eq!(format_expr(expr), "(a + 1) >= 2 && \"s\"");
}

#[test]
fn formatted_output_reparses_equal() {
    let program = statements(
        "FROM alpine\n@SET v = 3\n@IF v > 2\n@SET w = v * 2\nw -= 1\n@ELIF v == 2\nRUN two\n@ELSE\n@FOR\nRUN x\n@END\n@END\n",
    );
    assert_ast_roundtrip(&program);
}
