//! Syntax tree for docklett programs and the visitor contracts used to
//! walk it.
//!
//! Nodes are plain data. Consumers implement [`ExprVisitor`] and
//! [`StmtVisitor`]; `accept` dispatches to the method for the node's
//! variant, so a new consumer never touches the node definitions.

use crate::token::{Literal, Token};

/// Expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(LiteralExpr),
    Variable(Variable),
    Unary(Unary),
    Binary(Binary),
    Logical(Logical),
    Grouping(Grouping),
    Assign(Assign),
}

/// Constant value with the token it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct LiteralExpr {
    pub value: Literal,
    pub token: Token,
}

/// Variable reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub name: Token,
}

/// Prefix `!` or `-`.
#[derive(Debug, Clone, PartialEq)]
pub struct Unary {
    pub operator: Token,
    pub operand: Box<Expr>,
}

/// Arithmetic, comparison or equality.
#[derive(Debug, Clone, PartialEq)]
pub struct Binary {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

/// Short-circuiting `&&`.
#[derive(Debug, Clone, PartialEq)]
pub struct Logical {
    pub left: Box<Expr>,
    pub operator: Token,
    pub right: Box<Expr>,
}

/// Parenthesised expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouping {
    pub expression: Box<Expr>,
}

/// `name = value`. Only ever updates an existing binding.
#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub name: Token,
    pub value: Box<Expr>,
}

/// Statement node.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Expression(ExpressionStmt),
    VarDecl(VarDecl),
    Block(Block),
    If(If),
    Instruction(Instruction),
}

/// Expression evaluated for its effect.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStmt {
    pub expression: Expr,
}

/// `@SET name [= initializer]`. Always creates a binding in the current
/// scope.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub name: Token,
    pub initializer: Option<Expr>,
}

/// Statements executed in a child scope.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
}

/// Conditional. `@ELIF` chains nest as `else_branch`.
#[derive(Debug, Clone, PartialEq)]
pub struct If {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
}

/// Dockerfile instruction passed through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub token: Token,
}

impl Instruction {
    #[must_use]
    pub fn text(&self) -> &str {
        &self.token.lexeme
    }
}

/// One operation per expression variant.
pub trait ExprVisitor {
    type Output;

    fn visit_literal(&mut self, expr: &LiteralExpr) -> Self::Output;
    fn visit_variable(&mut self, expr: &Variable) -> Self::Output;
    fn visit_unary(&mut self, expr: &Unary) -> Self::Output;
    fn visit_binary(&mut self, expr: &Binary) -> Self::Output;
    fn visit_logical(&mut self, expr: &Logical) -> Self::Output;
    fn visit_grouping(&mut self, expr: &Grouping) -> Self::Output;
    fn visit_assign(&mut self, expr: &Assign) -> Self::Output;
}

/// One operation per statement variant.
pub trait StmtVisitor {
    type Output;

    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> Self::Output;
    fn visit_var_decl(&mut self, stmt: &VarDecl) -> Self::Output;
    fn visit_block(&mut self, stmt: &Block) -> Self::Output;
    fn visit_if(&mut self, stmt: &If) -> Self::Output;
    fn visit_instruction(&mut self, stmt: &Instruction) -> Self::Output;
}

impl Expr {
    pub fn accept<V: ExprVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Literal(expr) => visitor.visit_literal(expr),
            Self::Variable(expr) => visitor.visit_variable(expr),
            Self::Unary(expr) => visitor.visit_unary(expr),
            Self::Binary(expr) => visitor.visit_binary(expr),
            Self::Logical(expr) => visitor.visit_logical(expr),
            Self::Grouping(expr) => visitor.visit_grouping(expr),
            Self::Assign(expr) => visitor.visit_assign(expr),
        }
    }

    /// The token that best locates this expression in the source.
    /// Groupings defer to their inner expression.
    #[must_use]
    pub fn token(&self) -> &Token {
        match self {
            Self::Literal(expr) => &expr.token,
            Self::Variable(expr) => &expr.name,
            Self::Unary(expr) => &expr.operator,
            Self::Binary(expr) => &expr.operator,
            Self::Logical(expr) => &expr.operator,
            Self::Grouping(expr) => expr.expression.token(),
            Self::Assign(expr) => &expr.name,
        }
    }
}

impl Stmt {
    pub fn accept<V: StmtVisitor>(&self, visitor: &mut V) -> V::Output {
        match self {
            Self::Expression(stmt) => visitor.visit_expression_stmt(stmt),
            Self::VarDecl(stmt) => visitor.visit_var_decl(stmt),
            Self::Block(stmt) => visitor.visit_block(stmt),
            Self::If(stmt) => visitor.visit_if(stmt),
            Self::Instruction(stmt) => visitor.visit_instruction(stmt),
        }
    }
}
