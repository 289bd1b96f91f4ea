//! Pretty-printer that serializes a docklett AST back into canonical source.
//!
//! Produces tab-indented bodies, one statement per line, and a blank line
//! around every `@IF`/`@FOR` block. Parentheses are printed only for
//! `Grouping` nodes, so formatting a parsed program and parsing the result
//! yields an equal AST.

use crate::ast::{Expr, If, Stmt};
use crate::token::{Literal, TokenKind};

/// Format a list of statements into docklett source text.
#[must_use]
pub fn format(statements: &[Stmt]) -> String {
    let mut out = String::new();
    format_body(&mut out, statements, 0);
    out
}

/// Format a single expression on one line.
#[must_use]
pub fn format_expr(expr: &Expr) -> String {
    let mut out = String::new();
    write_expr(&mut out, expr);
    out
}

fn format_body(out: &mut String, statements: &[Stmt], indent: usize) {
    let mut prev_compound = false;

    for (i, stmt) in statements.iter().enumerate() {
        let compound = matches!(stmt, Stmt::If(_) | Stmt::Block(_));

        // Blank line before a block, or after one
        if i > 0 && (compound || prev_compound) {
            out.push('\n');
        }

        format_stmt(out, stmt, indent);
        prev_compound = compound;
    }
}

fn format_stmt(out: &mut String, stmt: &Stmt, indent: usize) {
    let prefix = "\t".repeat(indent);
    out.push_str(&prefix);

    match stmt {
        Stmt::Expression(stmt) => {
            write_expr(out, &stmt.expression);
            out.push('\n');
        }
        Stmt::VarDecl(decl) => {
            out.push_str("@SET ");
            out.push_str(decl.name.name());
            if let Some(initializer) = &decl.initializer {
                out.push_str(" = ");
                write_expr(out, initializer);
            }
            out.push('\n');
        }
        Stmt::Instruction(instruction) => {
            out.push_str(instruction.text());
            out.push('\n');
        }
        Stmt::Block(block) => {
            out.push_str("@FOR\n");
            format_body(out, &block.statements, indent + 1);
            out.push_str(&prefix);
            out.push_str("@END\n");
        }
        Stmt::If(stmt) => {
            out.push_str("@IF ");
            format_conditional(out, stmt, indent);
            out.push_str(&prefix);
            out.push_str("@END\n");
        }
    }
}

/// Condition, then-branch and the `@ELIF`/`@ELSE` tail, without `@END`.
fn format_conditional(out: &mut String, stmt: &If, indent: usize) {
    let prefix = "\t".repeat(indent);

    write_expr(out, &stmt.condition);
    out.push('\n');
    format_branch(out, &stmt.then_branch, indent + 1);

    match stmt.else_branch.as_deref() {
        None => {}
        Some(Stmt::If(elif)) => {
            out.push_str(&prefix);
            out.push_str("@ELIF ");
            format_conditional(out, elif, indent);
        }
        Some(other) => {
            out.push_str(&prefix);
            out.push_str("@ELSE\n");
            format_branch(out, other, indent + 1);
        }
    }
}

fn format_branch(out: &mut String, branch: &Stmt, indent: usize) {
    match branch {
        Stmt::Block(block) => format_body(out, &block.statements, indent),
        other => format_stmt(out, other, indent),
    }
}

fn write_expr(out: &mut String, expr: &Expr) {
    match expr {
        Expr::Literal(literal) => write_literal(out, &literal.value),
        Expr::Variable(variable) => out.push_str(variable.name.name()),
        Expr::Unary(unary) => {
            out.push_str(unary.operator.kind.symbol());
            write_expr(out, &unary.operand);
        }
        Expr::Binary(binary) => {
            write_expr(out, &binary.left);
            write_operator(out, binary.operator.kind);
            write_expr(out, &binary.right);
        }
        Expr::Logical(logical) => {
            write_expr(out, &logical.left);
            write_operator(out, logical.operator.kind);
            write_expr(out, &logical.right);
        }
        Expr::Grouping(grouping) => {
            out.push('(');
            write_expr(out, &grouping.expression);
            out.push(')');
        }
        Expr::Assign(assign) => {
            out.push_str(assign.name.name());
            out.push_str(" = ");
            write_expr(out, &assign.value);
        }
    }
}

fn write_operator(out: &mut String, kind: TokenKind) {
    out.push(' ');
    out.push_str(kind.symbol());
    out.push(' ');
}

fn write_literal(out: &mut String, value: &Literal) {
    match value {
        Literal::Str(s) => {
            out.push('"');
            out.push_str(s);
            out.push('"');
        }
        Literal::Int(i) => out.push_str(&i.to_string()),
        // Keep the `.` so the literal scans back as a float.
        Literal::Float(x) => {
            let text = x.to_string();
            out.push_str(&text);
            if x.is_finite() && !text.contains('.') {
                out.push_str(".0");
            }
        }
        Literal::Bool(true) => out.push_str("@TRUE"),
        Literal::Bool(false) => out.push_str("@FALSE"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::scanner::scan;

    fn reformat(input: &str) -> String {
        let tokens = scan(input, "test.dkl").expect("scan failed");
        format(&parse(&tokens).expect("parse failed"))
    }

    #[test]
    fn declarations_and_expressions() {
        assert_eq!(
            reformat("@SET   x=1\nx = x+2.0\n"),
            "@SET x = 1\nx = x + 2.0\n"
        );
    }

    #[test]
    fn declaration_without_initializer() {
        assert_eq!(reformat("@SET x"), "@SET x\n");
    }

    #[test]
    fn if_chain_layout() {
        let input = "FROM alpine\n@IF a\nRUN one\n@ELIF b\nRUN two\n@ELSE\nRUN three\n@END\nUSER app\n";
        let expected = "\
FROM alpine

@IF a
\tRUN one
@ELIF b
\tRUN two
@ELSE
\tRUN three
@END

USER app
";
        assert_eq!(reformat(input), expected);
    }

    #[test]
    fn bare_block() {
        assert_eq!(
            reformat("@FOR\n@SET x = 1\n@END\n"),
            "@FOR\n\t@SET x = 1\n@END\n"
        );
    }

    #[test]
    fn literals() {
        assert_eq!(
            reformat("@SET a = \"hi\" + (3 * -1.5) && !@TRUE\n"),
            "@SET a = \"hi\" + (3 * -1.5) && !@TRUE\n"
        );
    }

    #[test]
    fn whole_float_keeps_point() {
        assert_eq!(reformat("@SET x = 2.\n"), "@SET x = 2.0\n");
    }

    #[test]
    fn empty_program() {
        assert_eq!(reformat("\n\n# only a comment\n"), "");
    }
}
