use std::fmt;

use log::{debug, trace};

use crate::ast::{
    Assign, Binary, Block, Expr, ExprVisitor, ExpressionStmt, Grouping, If, Instruction, Logical,
    LiteralExpr, Stmt, StmtVisitor, Unary, VarDecl, Variable,
};
use crate::diagnostic::Diagnostic;
use crate::environment::Environment;
use crate::token::{Position, Token, TokenKind};
use crate::value::Value;

/// Classifies a runtime error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeErrorKind {
    /// Read or assignment of a name no scope binds.
    UndefinedVariable { name: String },
    /// Binary operands of incompatible types.
    TypeMismatch {
        operator: String,
        left: &'static str,
        right: &'static str,
    },
    /// Operator not defined for this operand type, e.g. `>=` on strings.
    UnsupportedOperator {
        operator: String,
        operand: &'static str,
    },
    /// Unary operand of the wrong type.
    InvalidOperand {
        operator: String,
        expected: &'static str,
        found: &'static str,
    },
    DivisionByZero,
    Overflow,
}

impl fmt::Display for RuntimeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedVariable { name } => write!(f, "undefined variable '{name}'"),
            Self::TypeMismatch {
                operator,
                left,
                right,
            } => write!(f, "type mismatch: cannot apply '{operator}' to {left} and {right}"),
            Self::UnsupportedOperator { operator, operand } => {
                write!(f, "operator '{operator}' is not supported for {operand} operands")
            }
            Self::InvalidOperand {
                operator,
                expected,
                found,
            } => write!(f, "operand of '{operator}' must be a {expected}, found {found}"),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::Overflow => write!(f, "integer overflow"),
        }
    }
}

/// Error raised while executing statements. Execution stops at the first
/// one.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct RuntimeError {
    pub kind: RuntimeErrorKind,
    pub position: Position,
    pub lexeme: String,
}

impl RuntimeError {
    #[must_use]
    pub fn at(token: &Token, kind: RuntimeErrorKind) -> Self {
        Self {
            kind,
            position: token.position.clone(),
            lexeme: token.lexeme.clone(),
        }
    }

    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::new(&self.position, &self.lexeme, self.kind.to_string())
    }
}

type RuntimeResult<T> = Result<T, RuntimeError>;

/// Tree-walking evaluator.
///
/// Host-command lines reached during execution are collected in order and
/// available through [`Interpreter::output`].
#[derive(Debug, Default)]
pub struct Interpreter {
    environment: Environment,
    output: Vec<String>,
}

impl Interpreter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a pre-populated environment, e.g. with `-D` definitions.
    #[must_use]
    pub const fn with_environment(environment: Environment) -> Self {
        Self {
            environment,
            output: Vec::new(),
        }
    }

    /// Execute statements in order.
    ///
    /// # Errors
    ///
    /// Returns the first runtime error; later statements are not run.
    pub fn interpret(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        for stmt in statements {
            stmt.accept(self)?;
        }
        debug!(
            "executed {} statement(s), {} line(s) emitted",
            statements.len(),
            self.output.len()
        );
        Ok(())
    }

    /// Evaluate one expression against the current environment.
    ///
    /// # Errors
    ///
    /// Any runtime error raised by the expression.
    pub fn evaluate(&mut self, expr: &Expr) -> RuntimeResult<Value> {
        expr.accept(self)
    }

    #[must_use]
    pub fn output(&self) -> &[String] {
        &self.output
    }

    #[must_use]
    pub fn into_output(self) -> Vec<String> {
        self.output
    }

    #[must_use]
    pub const fn environment(&self) -> &Environment {
        &self.environment
    }

    fn execute_block(&mut self, statements: &[Stmt]) -> RuntimeResult<()> {
        self.environment.push_scope();
        let result = statements.iter().try_for_each(|stmt| stmt.accept(self));
        self.environment.pop_scope();
        result
    }
}

impl ExprVisitor for Interpreter {
    type Output = RuntimeResult<Value>;

    fn visit_literal(&mut self, expr: &LiteralExpr) -> Self::Output {
        Ok(Value::from(expr.value.clone()))
    }

    fn visit_variable(&mut self, expr: &Variable) -> Self::Output {
        self.environment.get(&expr.name)
    }

    fn visit_unary(&mut self, expr: &Unary) -> Self::Output {
        let operand = self.evaluate(&expr.operand)?;
        unary(&expr.operator, operand)
    }

    fn visit_binary(&mut self, expr: &Binary) -> Self::Output {
        let left = self.evaluate(&expr.left)?;
        let right = self.evaluate(&expr.right)?;
        binary(&expr.operator, left, right)
    }

    fn visit_logical(&mut self, expr: &Logical) -> Self::Output {
        if !self.evaluate(&expr.left)?.is_truthy() {
            return Ok(Value::Bool(false));
        }
        Ok(Value::Bool(self.evaluate(&expr.right)?.is_truthy()))
    }

    fn visit_grouping(&mut self, expr: &Grouping) -> Self::Output {
        self.evaluate(&expr.expression)
    }

    fn visit_assign(&mut self, expr: &Assign) -> Self::Output {
        let value = self.evaluate(&expr.value)?;
        self.environment.assign(&expr.name, value.clone())?;
        Ok(value)
    }
}

impl StmtVisitor for Interpreter {
    type Output = RuntimeResult<()>;

    fn visit_expression_stmt(&mut self, stmt: &ExpressionStmt) -> Self::Output {
        let value = self.evaluate(&stmt.expression)?;
        trace!("expression statement evaluated to {value}");
        Ok(())
    }

    fn visit_var_decl(&mut self, stmt: &VarDecl) -> Self::Output {
        let value = match &stmt.initializer {
            Some(initializer) => self.evaluate(initializer)?,
            None => Value::Nil,
        };
        self.environment.define(stmt.name.name(), value);
        Ok(())
    }

    fn visit_block(&mut self, stmt: &Block) -> Self::Output {
        self.execute_block(&stmt.statements)
    }

    fn visit_if(&mut self, stmt: &If) -> Self::Output {
        if self.evaluate(&stmt.condition)?.is_truthy() {
            stmt.then_branch.accept(self)
        } else if let Some(else_branch) = &stmt.else_branch {
            else_branch.accept(self)
        } else {
            Ok(())
        }
    }

    fn visit_instruction(&mut self, stmt: &Instruction) -> Self::Output {
        trace!("{}: emit {}", stmt.token.position, stmt.text());
        self.output.push(stmt.text().to_string());
        Ok(())
    }
}

fn unary(operator: &Token, operand: Value) -> RuntimeResult<Value> {
    match (operator.kind, operand) {
        (TokenKind::Bang, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (TokenKind::Minus, Value::Int(i)) => i
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| RuntimeError::at(operator, RuntimeErrorKind::Overflow)),
        (TokenKind::Minus, Value::Float(x)) => Ok(Value::Float(-x)),
        (kind, operand) => Err(RuntimeError::at(
            operator,
            RuntimeErrorKind::InvalidOperand {
                operator: kind.symbol().to_string(),
                expected: if kind == TokenKind::Bang {
                    "boolean"
                } else {
                    "number"
                },
                found: operand.type_name(),
            },
        )),
    }
}

/// Dispatch on operand types: numbers, then strings, then booleans, then
/// nil. Anything else is a type mismatch.
fn binary(operator: &Token, left: Value, right: Value) -> RuntimeResult<Value> {
    if let (Some(a), Some(b)) = (left.as_number(), right.as_number()) {
        return numeric(operator, a, b);
    }

    match (left, right) {
        (Value::Str(a), Value::Str(b)) => string(operator, a, &b),
        (Value::Bool(a), Value::Bool(b)) => match operator.kind {
            TokenKind::Equal => Ok(Value::Bool(a == b)),
            TokenKind::NotEqual => Ok(Value::Bool(a != b)),
            _ => Err(unsupported(operator, "boolean")),
        },
        (left, right) if left.is_nil() || right.is_nil() => {
            let both = left.is_nil() && right.is_nil();
            match operator.kind {
                TokenKind::Equal => Ok(Value::Bool(both)),
                TokenKind::NotEqual => Ok(Value::Bool(!both)),
                _ => Err(mismatch(operator, &left, &right)),
            }
        }
        (left, right) => Err(mismatch(operator, &left, &right)),
    }
}

#[allow(clippy::float_cmp)]
fn numeric(operator: &Token, a: f64, b: f64) -> RuntimeResult<Value> {
    let value = match operator.kind {
        TokenKind::Plus => Value::Float(a + b),
        TokenKind::Minus => Value::Float(a - b),
        TokenKind::Star => Value::Float(a * b),
        TokenKind::Slash => {
            if b == 0.0 {
                return Err(RuntimeError::at(operator, RuntimeErrorKind::DivisionByZero));
            }
            Value::Float(a / b)
        }
        TokenKind::Equal => Value::Bool(a == b),
        TokenKind::NotEqual => Value::Bool(a != b),
        TokenKind::Greater => Value::Bool(a > b),
        TokenKind::GreaterEqual => Value::Bool(a >= b),
        TokenKind::Less => Value::Bool(a < b),
        TokenKind::LessEqual => Value::Bool(a <= b),
        _ => return Err(unsupported(operator, "number")),
    };
    Ok(value)
}

fn string(operator: &Token, a: String, b: &str) -> RuntimeResult<Value> {
    let value = match operator.kind {
        TokenKind::Plus => Value::Str(a + b),
        TokenKind::Equal => Value::Bool(a == b),
        TokenKind::NotEqual => Value::Bool(a != b),
        TokenKind::Greater => Value::Bool(a.as_str() > b),
        TokenKind::Less => Value::Bool(a.as_str() < b),
        _ => return Err(unsupported(operator, "string")),
    };
    Ok(value)
}

fn unsupported(operator: &Token, operand: &'static str) -> RuntimeError {
    RuntimeError::at(
        operator,
        RuntimeErrorKind::UnsupportedOperator {
            operator: operator.kind.symbol().to_string(),
            operand,
        },
    )
}

fn mismatch(operator: &Token, left: &Value, right: &Value) -> RuntimeError {
    RuntimeError::at(
        operator,
        RuntimeErrorKind::TypeMismatch {
            operator: operator.kind.symbol().to_string(),
            left: left.type_name(),
            right: right.type_name(),
        },
    )
}
