//! Uniform diagnostic records shared by every pipeline stage.

use std::fmt;
use std::fmt::Write as _;

use crate::token::Position;

/// A renderable report: location, offending lexeme and message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub source: String,
    pub line: usize,
    pub column: usize,
    pub lexeme: String,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn new(position: &Position, lexeme: &str, message: impl Into<String>) -> Self {
        Self {
            source: position.source.to_string(),
            line: position.line,
            column: position.column,
            lexeme: lexeme.to_string(),
            message: message.into(),
        }
    }

    /// Render the diagnostic with the offending source line and a caret
    /// under the reported column.
    #[must_use]
    pub fn render(&self, text: &str) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{}:{}:{}: error: {}",
            self.source, self.line, self.column, self.message
        );

        if let Some(line) = text.lines().nth(self.line.saturating_sub(1)) {
            let gutter = self.line.to_string();
            let pad = " ".repeat(gutter.len());
            let _ = writeln!(out, "{pad} |");
            let _ = writeln!(out, "{gutter} | {line}");

            let offset: String = line
                .chars()
                .take(self.column.saturating_sub(1))
                .map(|c| if c == '\t' { '\t' } else { ' ' })
                .collect();
            let width = self.lexeme.lines().next().map_or(1, |l| l.chars().count().max(1));
            let _ = writeln!(out, "{pad} | {offset}{}", "^".repeat(width));
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.source, self.line, self.column, self.message
        )
    }
}

/// A batch of errors collected in one pass (scanning or parsing).
///
/// Always holds at least one error.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostics<E>(Vec<E>);

impl<E> Diagnostics<E> {
    /// Wrap a batch, or `None` when nothing was reported.
    #[must_use]
    pub fn from_vec(errors: Vec<E>) -> Option<Self> {
        if errors.is_empty() {
            None
        } else {
            Some(Self(errors))
        }
    }

    #[must_use]
    pub fn errors(&self) -> &[E] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, E> {
        self.0.iter()
    }
}

impl<'a, E> IntoIterator for &'a Diagnostics<E> {
    type Item = &'a E;
    type IntoIter = std::slice::Iter<'a, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<E: fmt::Display> fmt::Display for Diagnostics<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for Diagnostics<E> {}
