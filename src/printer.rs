//! Indented tree dump of a parsed program, used by `docklett ast`.

use crate::ast::{
    Assign, Binary, Block, ExprVisitor, ExpressionStmt, Grouping, If, Instruction, Logical,
    LiteralExpr, Stmt, StmtVisitor, Unary, VarDecl, Variable,
};
use crate::token::Literal;

const INDENT: &str = "  ";

/// Render every statement as an indented tree, one node per line.
#[must_use]
pub fn print_tree(statements: &[Stmt]) -> String {
    let mut printer = TreePrinter;
    let mut out = String::new();
    for stmt in statements {
        out.push_str(&stmt.accept(&mut printer));
        out.push('\n');
    }
    out
}

/// Visitor that renders nodes as labelled, indented lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct TreePrinter;

fn node(label: &str, children: &[String]) -> String {
    let mut out = label.to_string();
    for child in children {
        for line in child.lines() {
            out.push('\n');
            out.push_str(INDENT);
            out.push_str(line);
        }
    }
    out
}

fn describe_literal(value: &Literal) -> String {
    match value {
        Literal::Str(s) => format!("{s:?}"),
        Literal::Int(i) => i.to_string(),
        Literal::Float(x) => format!("{x:?}"),
        Literal::Bool(b) => b.to_string(),
    }
}

impl ExprVisitor for TreePrinter {
    type Output = String;

    fn visit_literal(&mut self, expr: &LiteralExpr) -> String {
        format!("Literal {}", describe_literal(&expr.value))
    }

    fn visit_variable(&mut self, expr: &Variable) -> String {
        format!("Variable {}", expr.name.name())
    }

    fn visit_unary(&mut self, expr: &Unary) -> String {
        node(
            &format!("Unary {}", expr.operator.kind.symbol()),
            &[expr.operand.accept(self)],
        )
    }

    fn visit_binary(&mut self, expr: &Binary) -> String {
        node(
            &format!("Binary {}", expr.operator.kind.symbol()),
            &[expr.left.accept(self), expr.right.accept(self)],
        )
    }

    fn visit_logical(&mut self, expr: &Logical) -> String {
        node(
            &format!("Logical {}", expr.operator.kind.symbol()),
            &[expr.left.accept(self), expr.right.accept(self)],
        )
    }

    fn visit_grouping(&mut self, expr: &Grouping) -> String {
        node("Grouping", &[expr.expression.accept(self)])
    }

    fn visit_assign(&mut self, expr: &Assign) -> String {
        node(
            &format!("Assign {}", expr.name.name()),
            &[expr.value.accept(self)],
        )
    }
}

impl StmtVisitor for TreePrinter {
    type Output = String;

    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> String {
        node("Expression", &[stmt.expression.accept(self)])
    }

    fn visit_var_decl(&mut self, stmt: &VarDecl) -> String {
        let label = format!("VarDecl {}", stmt.name.name());
        match &stmt.initializer {
            Some(initializer) => node(&label, &[initializer.accept(self)]),
            None => label,
        }
    }

    fn visit_block(&mut self, stmt: &Block) -> String {
        let children: Vec<String> = stmt.statements.iter().map(|s| s.accept(self)).collect();
        node("Block", &children)
    }

    fn visit_if(&mut self, stmt: &If) -> String {
        let mut children = vec![
            node("condition", &[stmt.condition.accept(self)]),
            node("then", &[stmt.then_branch.accept(self)]),
        ];
        if let Some(else_branch) = &stmt.else_branch {
            children.push(node("else", &[else_branch.accept(self)]));
        }
        node("If", &children)
    }

    fn visit_instruction(&mut self, stmt: &Instruction) -> String {
        format!("Instruction {:?}", stmt.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;
    use crate::scanner::scan;

    fn tree(input: &str) -> String {
        let tokens = scan(input, "test.dkl").expect("scan failed");
        print_tree(&parse(&tokens).expect("parse failed"))
    }

    #[test]
    fn declaration_tree() {
        assert_eq!(
            tree("@SET x = 1 + 2.5\n"),
            "VarDecl x\n  Binary +\n    Literal 1\n    Literal 2.5\n"
        );
    }

    #[test]
    fn if_tree() {
        let expected = "\
If
  condition
    Variable debug
  then
    Block
      Instruction \"RUN echo on\"
  else
    Block
";
        assert_eq!(tree("@IF debug\nRUN echo on\n@ELSE\n@END\n"), expected);
    }

    #[test]
    fn compound_assignment_shows_desugared_form() {
        assert_eq!(
            tree("n -= 1\n"),
            "Expression\n  Assign n\n    Binary -\n      Variable n\n      Literal 1\n"
        );
    }
}
