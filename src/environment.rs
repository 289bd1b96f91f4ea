use std::collections::BTreeMap;

use log::trace;

use crate::interpreter::{RuntimeError, RuntimeErrorKind};
use crate::token::Token;
use crate::value::Value;

/// Variable bindings as a stack of scopes.
///
/// Scope `i` encloses scope `i + 1`. Lookups and assignments walk from the
/// innermost scope outwards; `define` only ever writes the innermost one.
/// The root scope is never popped.
#[derive(Debug, Clone)]
pub struct Environment {
    scopes: Vec<BTreeMap<String, Value>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    #[must_use]
    pub fn new() -> Self {
        Self {
            scopes: vec![BTreeMap::new()],
        }
    }

    /// Bind `name` in the innermost scope, replacing any binding it
    /// already holds there.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        trace!("define {name} = {value} at depth {}", self.depth());
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, value);
        }
    }

    /// Look up the nearest binding of `name`.
    ///
    /// # Errors
    ///
    /// `UndefinedVariable` when no scope binds the name.
    pub fn get(&self, name: &Token) -> Result<Value, RuntimeError> {
        self.lookup(name.name())
            .cloned()
            .ok_or_else(|| undefined(name))
    }

    /// Overwrite the nearest existing binding of `name`.
    ///
    /// # Errors
    ///
    /// `UndefinedVariable` when no scope binds the name; assignment never
    /// creates a binding.
    pub fn assign(&mut self, name: &Token, value: Value) -> Result<(), RuntimeError> {
        let key = name.name();
        for scope in self.scopes.iter_mut().rev() {
            if let Some(slot) = scope.get_mut(key) {
                *slot = value;
                return Ok(());
            }
        }
        Err(undefined(name))
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(BTreeMap::new());
        trace!("enter scope {}", self.depth());
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            trace!("leave scope {}", self.depth());
            self.scopes.pop();
        }
    }

    /// Number of scopes above the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Whether any scope binds `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    /// Value of `name` by plain string, for callers outside the interpreter.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.lookup(name)
    }

    fn lookup(&self, name: &str) -> Option<&Value> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

fn undefined(name: &Token) -> RuntimeError {
    RuntimeError::at(
        name,
        RuntimeErrorKind::UndefinedVariable {
            name: name.name().to_string(),
        },
    )
}
