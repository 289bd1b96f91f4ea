use std::fmt;
use std::rc::Rc;

/// Source location for diagnostics.
///
/// `line` and `column` are one-based; columns count code points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pub line: usize,
    pub column: usize,
    pub source: Rc<str>,
}

impl Position {
    #[must_use]
    pub fn new(line: usize, column: usize, source: &Rc<str>) -> Self {
        Self {
            line,
            column,
            source: Rc::clone(source),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.line, self.column)
    }
}

/// Token kinds produced by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,
    String,
    Number,

    /// `=`
    Assign,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `+`
    Plus,
    /// `+=`
    PlusAssign,
    /// `-`
    Minus,
    /// `-=`
    MinusAssign,
    /// `*`
    Star,
    /// `*=`
    StarAssign,
    /// `/`
    Slash,
    /// `/=`
    SlashAssign,
    /// `!`
    Bang,
    /// `&&`
    And,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Colon,
    Comma,

    Set,
    If,
    Elif,
    Else,
    For,
    In,
    End,
    True,
    False,

    /// A host-command line (`RUN ...`, `FROM ...`), kept verbatim.
    Instruction,
    /// Statement terminator.
    Newline,
    Eof,
    Illegal,
}

impl TokenKind {
    /// Keywords that can begin (or close) a statement. The parser
    /// resynchronizes on these after a syntax error.
    #[must_use]
    pub const fn starts_statement(self) -> bool {
        matches!(
            self,
            Self::Set | Self::If | Self::Elif | Self::Else | Self::For | Self::End | Self::Instruction
        )
    }

    /// The compound assignment operator's underlying binary operator.
    #[must_use]
    pub const fn compound_operator(self) -> Option<Self> {
        match self {
            Self::PlusAssign => Some(Self::Plus),
            Self::MinusAssign => Some(Self::Minus),
            Self::StarAssign => Some(Self::Star),
            Self::SlashAssign => Some(Self::Slash),
            _ => None,
        }
    }

    /// Canonical spelling used by the formatter.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Identifier => "identifier",
            Self::String => "string",
            Self::Number => "number",
            Self::Assign => "=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Plus => "+",
            Self::PlusAssign => "+=",
            Self::Minus => "-",
            Self::MinusAssign => "-=",
            Self::Star => "*",
            Self::StarAssign => "*=",
            Self::Slash => "/",
            Self::SlashAssign => "/=",
            Self::Bang => "!",
            Self::And => "&&",
            Self::Less => "<",
            Self::LessEqual => "<=",
            Self::Greater => ">",
            Self::GreaterEqual => ">=",
            Self::LeftParen => "(",
            Self::RightParen => ")",
            Self::LeftBrace => "{",
            Self::RightBrace => "}",
            Self::LeftBracket => "[",
            Self::RightBracket => "]",
            Self::Colon => ":",
            Self::Comma => ",",
            Self::Set => "@SET",
            Self::If => "@IF",
            Self::Elif => "@ELIF",
            Self::Else => "@ELSE",
            Self::For => "@FOR",
            Self::In => "@IN",
            Self::End => "@END",
            Self::True => "@TRUE",
            Self::False => "@FALSE",
            Self::Instruction => "instruction",
            Self::Newline => "newline",
            Self::Eof => "end of input",
            Self::Illegal => "illegal",
        }
    }
}

/// Literal value carried by identifier, string, number, boolean and
/// instruction tokens.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(x) => write!(f, "{x}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// A single token with its kind, source text, literal value and location.
///
/// Tokens compare by kind and literal only. The lexeme spelling and the
/// position are presentation details, so a re-scanned, re-formatted
/// program compares equal to the one it was printed from.
#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub lexeme: String,
    pub literal: Option<Literal>,
    pub position: Position,
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.literal == other.literal
    }
}

impl Token {
    /// Human-readable description for "found ..." diagnostics.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Newline | TokenKind::Eof => self.kind.symbol().to_string(),
            TokenKind::Instruction => {
                let verb = self.lexeme.split_whitespace().next().unwrap_or_default();
                format!("instruction '{verb}'")
            }
            _ => format!("'{}'", self.lexeme),
        }
    }

    /// Name of an identifier token.
    #[must_use]
    pub fn name(&self) -> &str {
        match &self.literal {
            Some(Literal::Str(name)) if self.kind == TokenKind::Identifier => name,
            _ => &self.lexeme,
        }
    }
}

/// DSL keywords, spelled after `@` (or bare inside a directive line).
pub const DSL_KEYWORDS: &[(&str, TokenKind)] = &[
    ("SET", TokenKind::Set),
    ("IF", TokenKind::If),
    ("ELIF", TokenKind::Elif),
    ("ELSE", TokenKind::Else),
    ("FOR", TokenKind::For),
    ("IN", TokenKind::In),
    ("END", TokenKind::End),
    ("TRUE", TokenKind::True),
    ("FALSE", TokenKind::False),
];

/// Dockerfile instruction verbs. A line starting with one of these is
/// passed through as a single `Instruction` token.
pub const HOST_COMMANDS: &[&str] = &[
    "ADD",
    "ARG",
    "CMD",
    "COPY",
    "ENTRYPOINT",
    "ENV",
    "EXPOSE",
    "FROM",
    "HEALTHCHECK",
    "LABEL",
    "MAINTAINER",
    "ONBUILD",
    "RUN",
    "SHELL",
    "STOPSIGNAL",
    "USER",
    "VOLUME",
    "WORKDIR",
];

/// Look up a DSL keyword. Matching is exact (upper case).
#[must_use]
pub fn dsl_keyword(word: &str) -> Option<TokenKind> {
    DSL_KEYWORDS
        .iter()
        .find(|(name, _)| *name == word)
        .map(|(_, kind)| *kind)
}

/// Whether `word` is a host-command verb. Matching ignores case.
#[must_use]
pub fn is_host_command(word: &str) -> bool {
    HOST_COMMANDS
        .iter()
        .any(|verb| verb.eq_ignore_ascii_case(word))
}
