//! docklett scanner, parser, formatter, and interpreter.
//!
//! docklett is a small templating layer over Dockerfiles: plain
//! instruction lines pass through untouched, while `@SET`, `@IF`,
//! `@ELIF`, `@ELSE`, `@FOR` and `@END` lines declare variables and
//! select which instructions survive.
//!
//! # Quick start
//!
//! ## Evaluate a template
//!
//! ```
//! let source = "\
//! @SET debug = 1 > 0
//! FROM alpine
//! @IF debug
//! RUN apk add strace
//! @END
//! ";
//! let lines = docklett::run_str(source, "Dockerfile.dkl").unwrap();
//! assert_eq!(lines, ["FROM alpine", "RUN apk add strace"]);
//! ```
//!
//! ## Parse and re-format
//!
//! ```
//! use docklett::{format, parse, scan};
//!
//! let tokens = scan("@SET  x=1+2\n", "inline").unwrap();
//! let program = parse(&tokens).unwrap();
//! assert_eq!(format(&program), "@SET x = 1 + 2\n");
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod ast;
pub mod diagnostic;
pub mod environment;
pub mod formatter;
pub mod interpreter;
pub mod parser;
pub mod printer;
pub mod scanner;
pub mod token;
pub mod value;

pub use ast::{Expr, ExprVisitor, Stmt, StmtVisitor};
pub use diagnostic::{Diagnostic, Diagnostics};
pub use environment::Environment;
pub use formatter::{format, format_expr};
pub use interpreter::{Interpreter, RuntimeError, RuntimeErrorKind};
pub use parser::{ParseError, ParseErrorKind, parse};
pub use printer::{TreePrinter, print_tree};
pub use scanner::{ScanError, ScanErrorKind, Scanner, scan};
pub use token::{Literal, Position, Token, TokenKind};
pub use value::Value;

/// Unified error type covering every pipeline stage.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Lexical errors; parsing was not attempted.
    #[error("{0}")]
    Scan(#[from] Diagnostics<ScanError>),
    /// Syntax errors; nothing was executed.
    #[error("{0}")]
    Parse(#[from] Diagnostics<ParseError>),
    /// The first runtime error.
    #[error("{0}")]
    Runtime(#[from] RuntimeError),
}

impl Error {
    /// Flatten into renderable diagnostics, in source order of discovery.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Scan(errors) => errors.iter().map(ScanError::to_diagnostic).collect(),
            Self::Parse(errors) => errors.iter().map(ParseError::to_diagnostic).collect(),
            Self::Runtime(error) => vec![error.to_diagnostic()],
        }
    }
}

/// Scan and parse a docklett source string in one step.
pub fn parse_str(input: &str, source_name: &str) -> Result<Vec<Stmt>, Error> {
    let tokens = scan(input, source_name)?;
    Ok(parse(&tokens)?)
}

/// Scan, parse and execute a source string, returning the emitted
/// instruction lines.
pub fn run_str(input: &str, source_name: &str) -> Result<Vec<String>, Error> {
    run_with(input, source_name, Environment::new())
}

/// Like [`run_str`], starting from a pre-populated root environment.
pub fn run_with(
    input: &str,
    source_name: &str,
    environment: Environment,
) -> Result<Vec<String>, Error> {
    let statements = parse_str(input, source_name)?;
    let mut interpreter = Interpreter::with_environment(environment);
    interpreter.interpret(&statements)?;
    Ok(interpreter.into_output())
}
