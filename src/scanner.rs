use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::token::{self, Literal, Position, Token, TokenKind};

/// Classifies a scanner error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanErrorKind {
    /// Input ended before the closing `"`.
    UnterminatedString,
    /// Character that cannot start any token.
    UnexpectedCharacter(char),
    /// `@word` that is not a DSL keyword.
    UnknownKeyword(String),
    /// Integer literal that does not fit in 64 bits.
    NumberOutOfRange(String),
}

impl fmt::Display for ScanErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnexpectedCharacter(ch) => write!(f, "unexpected character: {ch}"),
            Self::UnknownKeyword(word) => write!(f, "unknown keyword: {word}"),
            Self::NumberOutOfRange(text) => {
                write!(f, "number literal out of range: {text}")
            }
        }
    }
}

/// Error produced during scanning.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", position.line, position.column)]
pub struct ScanError {
    pub kind: ScanErrorKind,
    pub position: Position,
}

impl ScanError {
    #[must_use]
    pub fn to_diagnostic(&self) -> Diagnostic {
        let lexeme = match &self.kind {
            ScanErrorKind::UnterminatedString => "\"".to_string(),
            ScanErrorKind::UnexpectedCharacter(ch) => ch.to_string(),
            ScanErrorKind::UnknownKeyword(text) | ScanErrorKind::NumberOutOfRange(text) => {
                text.clone()
            }
        };
        Diagnostic::new(&self.position, &lexeme, self.kind.to_string())
    }
}

/// Scan a docklett source text into tokens.
///
/// # Errors
///
/// Returns every lexical error found in the pass. Scanning does not
/// stop at the first bad character.
pub fn scan(text: &str, source_name: &str) -> Result<Vec<Token>, Diagnostics<ScanError>> {
    let (tokens, errors) = Scanner::new(text, source_name).scan_all();
    Diagnostics::from_vec(errors).map_or(Ok(tokens), Err)
}

/// Character-level scanner over one source text.
pub struct Scanner {
    chars: Vec<char>,
    source: Rc<str>,
    pos: usize,
    line: usize,
    column: usize,
    start: usize,
    start_line: usize,
    start_column: usize,
    // Set by an `@` keyword, cleared at the end of the line.
    directive_line: bool,
    tokens: Vec<Token>,
    errors: Vec<ScanError>,
}

impl Scanner {
    #[must_use]
    pub fn new(text: &str, source_name: &str) -> Self {
        let text = text.strip_prefix('\u{FEFF}').unwrap_or(text);
        Self {
            chars: text.chars().collect(),
            source: Rc::from(source_name),
            pos: 0,
            line: 1,
            column: 1,
            start: 0,
            start_line: 1,
            start_column: 1,
            directive_line: false,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Scan the whole input, returning the tokens together with every
    /// error encountered. The token list always ends with one `Eof`.
    #[must_use]
    pub fn scan_all(mut self) -> (Vec<Token>, Vec<ScanError>) {
        while self.pos < self.chars.len() {
            self.start = self.pos;
            self.start_line = self.line;
            self.start_column = self.column;
            self.scan_token();
        }

        self.tokens.push(Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            literal: None,
            position: Position::new(self.line, self.column, &self.source),
        });

        debug!(
            "scanned {} tokens from {} with {} error(s)",
            self.tokens.len(),
            self.source,
            self.errors.len()
        );

        (self.tokens, self.errors)
    }

    fn scan_token(&mut self) {
        let Some(ch) = self.advance() else {
            return;
        };

        match ch {
            ' ' | '\t' | '\r' => {}
            '\n' => {
                self.add_token(TokenKind::Newline, None);
                self.directive_line = false;
            }
            '#' => self.skip_comment(),
            '=' => self.add_either('=', TokenKind::Equal, TokenKind::Assign),
            '!' => self.add_either('=', TokenKind::NotEqual, TokenKind::Bang),
            '+' => self.add_either('=', TokenKind::PlusAssign, TokenKind::Plus),
            '-' => self.add_either('=', TokenKind::MinusAssign, TokenKind::Minus),
            '*' => self.add_either('=', TokenKind::StarAssign, TokenKind::Star),
            '/' => self.add_either('=', TokenKind::SlashAssign, TokenKind::Slash),
            '<' => self.add_either('=', TokenKind::LessEqual, TokenKind::Less),
            '>' => self.add_either('=', TokenKind::GreaterEqual, TokenKind::Greater),
            '&' => {
                if self.match_next('&') {
                    self.add_token(TokenKind::And, None);
                } else {
                    self.error(ScanErrorKind::UnexpectedCharacter('&'));
                }
            }
            '(' => self.add_token(TokenKind::LeftParen, None),
            ')' => self.add_token(TokenKind::RightParen, None),
            '{' => self.add_token(TokenKind::LeftBrace, None),
            '}' => self.add_token(TokenKind::RightBrace, None),
            '[' => self.add_token(TokenKind::LeftBracket, None),
            ']' => self.add_token(TokenKind::RightBracket, None),
            ':' => self.add_token(TokenKind::Colon, None),
            ',' => self.add_token(TokenKind::Comma, None),
            '"' => self.read_string(),
            '@' => self.read_directive(),
            c if c.is_ascii_digit() => self.read_number(),
            c if c.is_alphabetic() || c == '_' => self.read_word(),
            c => self.error(ScanErrorKind::UnexpectedCharacter(c)),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn match_next(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn lexeme(&self) -> String {
        self.chars[self.start..self.pos].iter().collect()
    }

    fn start_position(&self) -> Position {
        Position::new(self.start_line, self.start_column, &self.source)
    }

    fn add_token(&mut self, kind: TokenKind, literal: Option<Literal>) {
        let lexeme = self.lexeme();
        self.push_token(kind, lexeme, literal);
    }

    fn push_token(&mut self, kind: TokenKind, lexeme: String, literal: Option<Literal>) {
        let position = self.start_position();
        self.tokens.push(Token {
            kind,
            lexeme,
            literal,
            position,
        });
    }

    fn add_either(&mut self, next: char, matched: TokenKind, single: TokenKind) {
        let kind = if self.match_next(next) { matched } else { single };
        self.add_token(kind, None);
    }

    fn error(&mut self, kind: ScanErrorKind) {
        let position = self.start_position();
        self.errors.push(ScanError { kind, position });
    }

    fn skip_comment(&mut self) {
        while self.peek().is_some_and(|c| c != '\n') {
            self.advance();
        }
    }

    fn read_string(&mut self) {
        let mut value = String::new();
        loop {
            match self.advance() {
                None => {
                    self.error(ScanErrorKind::UnterminatedString);
                    return;
                }
                Some('"') => break,
                Some(c) => value.push(c),
            }
        }
        self.add_token(TokenKind::String, Some(Literal::Str(value)));
    }

    fn read_number(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        let is_float = self.match_next('.');
        if is_float {
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        let text = self.lexeme();
        let literal = if is_float {
            text.parse::<f64>().ok().map(Literal::Float)
        } else {
            text.parse::<i64>().ok().map(Literal::Int)
        };

        match literal {
            Some(literal) => self.push_token(TokenKind::Number, text, Some(literal)),
            None => self.error(ScanErrorKind::NumberOutOfRange(text)),
        }
    }

    fn read_identifier_run(&mut self) {
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.advance();
        }
    }

    fn read_directive(&mut self) {
        let word_start = self.pos;
        self.read_identifier_run();
        let word: String = self.chars[word_start..self.pos].iter().collect();

        match token::dsl_keyword(&word) {
            Some(kind) => {
                self.directive_line = true;
                self.add_token(kind, keyword_literal(kind));
            }
            None => {
                let text = self.lexeme();
                self.error(ScanErrorKind::UnknownKeyword(text));
            }
        }
    }

    fn read_word(&mut self) {
        self.read_identifier_run();
        let text = self.lexeme();

        if self.directive_line {
            if let Some(kind) = token::dsl_keyword(&text) {
                self.push_token(kind, text, keyword_literal(kind));
                return;
            }
        } else if self.at_line_start() && token::is_host_command(&text) {
            self.read_instruction();
            return;
        }

        self.push_token(TokenKind::Identifier, text.clone(), Some(Literal::Str(text)));
    }

    fn at_line_start(&self) -> bool {
        self.tokens
            .last()
            .is_none_or(|t| t.kind == TokenKind::Newline)
    }

    /// Consume the rest of a host-command line verbatim. A backslash that
    /// is the last non-blank character before a newline continues the
    /// instruction on the next line.
    fn read_instruction(&mut self) {
        let mut last_non_blank = None;
        while let Some(c) = self.peek() {
            if c == '\n' {
                if last_non_blank != Some('\\') {
                    break;
                }
                last_non_blank = None;
            } else if !matches!(c, ' ' | '\t' | '\r') {
                last_non_blank = Some(c);
            }
            self.advance();
        }

        let text = self.lexeme().trim_end_matches('\r').to_string();
        self.push_token(TokenKind::Instruction, text.clone(), Some(Literal::Str(text)));
    }
}

const fn keyword_literal(kind: TokenKind) -> Option<Literal> {
    match kind {
        TokenKind::True => Some(Literal::Bool(true)),
        TokenKind::False => Some(Literal::Bool(false)),
        _ => None,
    }
}
