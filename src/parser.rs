use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use crate::ast::{
    Assign, Binary, Block, Expr, ExpressionStmt, Grouping, If, Instruction, Logical, LiteralExpr,
    Stmt, Unary, VarDecl, Variable,
};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::token::{Literal, Position, Token, TokenKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// A token that cannot start an expression.
    ExpectedExpression { found: String },
    /// A specific token was required, e.g. `)` or a newline.
    Expected {
        expected: &'static str,
        found: String,
    },
    /// Left side of `=` is not a variable.
    InvalidAssignmentTarget { target: String },
    /// `@ELIF`, `@ELSE`, `@END` or `@IN` where a statement should start.
    UnexpectedKeyword { keyword: String },
    /// Expressions or blocks nested deeper than the parser allows.
    TooDeep { limit: usize },
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExpectedExpression { found } => {
                write!(f, "expected expression, found {found}")
            }
            Self::Expected { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::InvalidAssignmentTarget { target } => {
                write!(f, "invalid assignment target: '{target}'")
            }
            Self::UnexpectedKeyword { keyword } => {
                write!(f, "unexpected keyword '{keyword}'")
            }
            Self::TooDeep { limit } => {
                write!(f, "nesting deeper than {limit} levels")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub position: Position,
    pub lexeme: String,
}

impl ParseError {
    fn at(token: &Token, kind: ParseErrorKind) -> Self {
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

/// Parse a token stream into a list of statements.
///
/// # Errors
///
/// Returns every syntax error found. Recovery resynchronizes at the next
/// statement boundary, so one malformed statement yields one error and
/// the rest of the input is still checked. No statements are returned
/// when any error was found.
pub fn parse(tokens: &[Token]) -> Result<Vec<Stmt>, Diagnostics<ParseError>> {
    if tokens.last().is_some_and(|t| t.kind == TokenKind::Eof) {
        return Parser::new(tokens).parse();
    }

    let mut terminated = tokens.to_vec();
    terminated.push(eof_after(tokens));
    Parser::new(&terminated).parse()
}

fn eof_after(tokens: &[Token]) -> Token {
    let position = tokens.last().map_or_else(
        || Position::new(1, 1, &Rc::from("<input>")),
        |last| last.position.clone(),
    );
    Token {
        kind: TokenKind::Eof,
        lexeme: String::new(),
        literal: None,
        position,
    }
}

/// Right operand of a desugared compound assignment. Anything that
/// binds looser than a unary is parenthesised so the expansion keeps
/// its meaning when printed.
fn group_compound(value: Expr) -> Expr {
    match value {
        Expr::Binary(_) | Expr::Logical(_) | Expr::Assign(_) => Expr::Grouping(Grouping {
            expression: Box::new(value),
        }),
        atom => atom,
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Bound on nested groupings, unary chains, assignments and blocks.
pub const MAX_DEPTH: usize = 64;

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    errors: Vec<ParseError>,
}

impl<'a> Parser<'a> {
    const fn new(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Vec<Stmt>, Diagnostics<ParseError>> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            if self.matches(TokenKind::Newline) {
                continue;
            }
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        debug!(
            "parsed {} statement(s) with {} error(s)",
            statements.len(),
            self.errors.len()
        );

        Diagnostics::from_vec(self.errors).map_or(Ok(statements), Err)
    }

    // -- Statements --

    /// Parse one declaration. On a syntax error the error is recorded and
    /// the cursor skipped to the next statement boundary.
    fn declaration(&mut self) -> Option<Stmt> {
        let result = if self.matches(TokenKind::Set) {
            self.var_declaration()
        } else {
            self.statement()
        };

        match result {
            Ok(stmt) => Some(stmt),
            Err(error) => {
                trace!("recovering from: {error}");
                self.errors.push(error);
                self.synchronize();
                None
            }
        }
    }

    fn var_declaration(&mut self) -> ParseResult<Stmt> {
        let name = self.consume(TokenKind::Identifier, "identifier after '@SET'")?;
        let initializer = if self.matches(TokenKind::Assign) {
            Some(self.expression()?)
        } else {
            None
        };
        self.terminator("newline after declaration")?;

        Ok(Stmt::VarDecl(VarDecl {
            name: name.clone(),
            initializer,
        }))
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        if self.matches(TokenKind::If) {
            return self.nested(Self::if_statement);
        }
        if self.matches(TokenKind::For) {
            return self.nested(Self::for_block);
        }
        if self.matches(TokenKind::Instruction) {
            let token = self.previous().clone();
            self.terminator("newline after instruction")?;
            return Ok(Stmt::Instruction(Instruction { token }));
        }
        if self.check_any(&[
            TokenKind::Elif,
            TokenKind::Else,
            TokenKind::End,
            TokenKind::In,
        ]) {
            let token = self.peek();
            return Err(ParseError::at(
                token,
                ParseErrorKind::UnexpectedKeyword {
                    keyword: token.lexeme.clone(),
                },
            ));
        }
        self.expression_statement()
    }

    fn expression_statement(&mut self) -> ParseResult<Stmt> {
        let expression = self.expression()?;
        self.terminator("newline after expression")?;
        Ok(Stmt::Expression(ExpressionStmt { expression }))
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let stmt = self.conditional();
        self.consume(TokenKind::End, "'@END' to close '@IF'")?;
        self.terminator("newline after '@END'")?;
        Ok(stmt)
    }

    /// Condition, body and any `@ELIF`/`@ELSE` tail. Each `@ELIF`
    /// re-enters this rule, so only the outermost `@IF` sees `@END`.
    fn conditional(&mut self) -> Stmt {
        let condition = self.header(|p| {
            let condition = p.expression()?;
            p.consume(TokenKind::Newline, "newline after condition")?;
            Ok(condition)
        });
        let then_branch = Box::new(self.block_body());

        let else_branch = if self.matches(TokenKind::Elif) {
            self.header(|p| p.nested(|p| Ok(p.conditional())))
                .map(Box::new)
        } else if self.matches(TokenKind::Else) {
            self.header(|p| p.consume(TokenKind::Newline, "newline after '@ELSE'"));
            Some(Box::new(self.block_body()))
        } else {
            None
        };

        // A broken header is already recorded and the tree is discarded.
        let Some(condition) = condition else {
            return *then_branch;
        };

        Stmt::If(If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `@FOR` only opens a scoped block; loop headers are rejected.
    fn for_block(&mut self) -> ParseResult<Stmt> {
        self.header(|p| {
            p.consume(
                TokenKind::Newline,
                "newline after '@FOR' (loop headers are not supported)",
            )
        });
        let block = self.block_body();
        self.consume(TokenKind::End, "'@END' to close '@FOR'")?;
        self.terminator("newline after '@END'")?;
        Ok(block)
    }

    fn block_body(&mut self) -> Stmt {
        let mut statements = Vec::new();

        while !self.is_at_end()
            && !self.check_any(&[TokenKind::Elif, TokenKind::Else, TokenKind::End])
        {
            if self.matches(TokenKind::Newline) {
                continue;
            }
            if let Some(stmt) = self.declaration() {
                statements.push(stmt);
            }
        }

        Stmt::Block(Block { statements })
    }

    // -- Expressions --

    fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(Self::assignment)
    }

    fn assignment(&mut self) -> ParseResult<Expr> {
        let expr = self.logic_and()?;

        if !self.check_any(&[
            TokenKind::Assign,
            TokenKind::PlusAssign,
            TokenKind::MinusAssign,
            TokenKind::StarAssign,
            TokenKind::SlashAssign,
        ]) {
            return Ok(expr);
        }

        let operator = self.advance();
        let value = self.nested(Self::assignment)?;

        let name = match expr {
            Expr::Variable(Variable { name }) => name,
            target => {
                return Err(ParseError::at(
                    operator,
                    ParseErrorKind::InvalidAssignmentTarget {
                        target: target.token().lexeme.clone(),
                    },
                ));
            }
        };

        // `x += e` is `x = x + (e)`.
        let value = match operator.kind.compound_operator() {
            Some(kind) => Expr::Binary(Binary {
                left: Box::new(Expr::Variable(Variable { name: name.clone() })),
                operator: Token {
                    kind,
                    lexeme: kind.symbol().to_string(),
                    literal: None,
                    position: operator.position.clone(),
                },
                right: Box::new(group_compound(value)),
            }),
            None => value,
        };

        Ok(Expr::Assign(Assign {
            name,
            value: Box::new(value),
        }))
    }

    fn logic_and(&mut self) -> ParseResult<Expr> {
        let mut expr = self.equality()?;

        while self.check(TokenKind::And) {
            let operator = self.advance().clone();
            let right = self.equality()?;
            expr = Expr::Logical(Logical {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn equality(&mut self) -> ParseResult<Expr> {
        self.binary_tier(&[TokenKind::Equal, TokenKind::NotEqual], Self::comparison)
    }

    fn comparison(&mut self) -> ParseResult<Expr> {
        self.binary_tier(
            &[
                TokenKind::Greater,
                TokenKind::GreaterEqual,
                TokenKind::Less,
                TokenKind::LessEqual,
            ],
            Self::term,
        )
    }

    fn term(&mut self) -> ParseResult<Expr> {
        self.binary_tier(&[TokenKind::Plus, TokenKind::Minus], Self::factor)
    }

    fn factor(&mut self) -> ParseResult<Expr> {
        self.binary_tier(&[TokenKind::Star, TokenKind::Slash], Self::unary)
    }

    /// Left-associative tier: `operand (op operand)*`.
    fn binary_tier(
        &mut self,
        operators: &[TokenKind],
        operand: fn(&mut Self) -> ParseResult<Expr>,
    ) -> ParseResult<Expr> {
        let mut expr = operand(self)?;

        while self.check_any(operators) {
            let operator = self.advance().clone();
            let right = operand(self)?;
            expr = Expr::Binary(Binary {
                left: Box::new(expr),
                operator,
                right: Box::new(right),
            });
        }

        Ok(expr)
    }

    fn unary(&mut self) -> ParseResult<Expr> {
        if self.check_any(&[TokenKind::Bang, TokenKind::Minus]) {
            let operator = self.advance().clone();
            let operand = self.nested(Self::unary)?;
            return Ok(Expr::Unary(Unary {
                operator,
                operand: Box::new(operand),
            }));
        }
        self.primary()
    }

    fn primary(&mut self) -> ParseResult<Expr> {
        let token = self.peek();

        match token.kind {
            TokenKind::True | TokenKind::False | TokenKind::Number | TokenKind::String => {
                self.advance();
                let value = token.literal.clone().unwrap_or_else(|| match token.kind {
                    TokenKind::True => Literal::Bool(true),
                    TokenKind::False => Literal::Bool(false),
                    _ => Literal::Str(token.lexeme.clone()),
                });
                Ok(Expr::Literal(LiteralExpr {
                    value,
                    token: token.clone(),
                }))
            }
            TokenKind::Identifier => {
                self.advance();
                Ok(Expr::Variable(Variable {
                    name: token.clone(),
                }))
            }
            TokenKind::LeftParen => {
                self.advance();
                let expression = self.expression()?;
                self.consume(TokenKind::RightParen, "')' after expression")?;
                Ok(Expr::Grouping(Grouping {
                    expression: Box::new(expression),
                }))
            }
            _ => Err(ParseError::at(
                token,
                ParseErrorKind::ExpectedExpression {
                    found: token.describe(),
                },
            )),
        }
    }

    // -- Recovery --

    /// Run a block header rule. On failure the error is recorded and the
    /// rest of the header line skipped, so the body that follows is
    /// still parsed inside its block and its `@END` stays matched.
    fn header<T>(&mut self, rule: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        match rule(self) {
            Ok(value) => Some(value),
            Err(error) => {
                trace!("skipping block header after: {error}");
                self.errors.push(error);
                while !self.is_at_end() {
                    if self.advance().kind == TokenKind::Newline {
                        break;
                    }
                }
                None
            }
        }
    }

    /// Run a recursive rule one level deeper, failing past `MAX_DEPTH`.
    fn nested<T>(&mut self, rule: fn(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_DEPTH {
            return Err(ParseError::at(
                self.peek(),
                ParseErrorKind::TooDeep { limit: MAX_DEPTH },
            ));
        }
        self.depth += 1;
        let result = rule(self);
        self.depth -= 1;
        result
    }

    /// Discard the offending token, then everything up to the next
    /// newline or statement keyword.
    fn synchronize(&mut self) {
        self.advance();

        while !self.is_at_end() {
            if self.previous().kind == TokenKind::Newline {
                return;
            }
            if self.peek().kind.starts_statement() {
                return;
            }
            self.advance();
        }
    }

    // -- Cursor --

    fn peek(&self) -> &'a Token {
        &self.tokens[self.pos]
    }

    fn previous(&self) -> &'a Token {
        &self.tokens[self.pos.saturating_sub(1)]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &'a Token {
        if !self.is_at_end() {
            self.pos += 1;
        }
        self.previous()
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.peek().kind == kind
    }

    fn check_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.peek().kind)
    }

    fn matches(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: TokenKind, expected: &'static str) -> ParseResult<&'a Token> {
        if self.check(kind) {
            return Ok(self.advance());
        }
        Err(self.expected(expected))
    }

    /// A statement ends at a newline or at the end of input.
    fn terminator(&mut self, expected: &'static str) -> ParseResult<()> {
        if self.is_at_end() || self.matches(TokenKind::Newline) {
            Ok(())
        } else {
            Err(self.expected(expected))
        }
    }

    fn expected(&self, expected: &'static str) -> ParseError {
        let token = self.peek();
        ParseError::at(
            token,
            ParseErrorKind::Expected {
                expected,
                found: token.describe(),
            },
        )
    }
}
