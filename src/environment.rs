use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::token::Token;
use crate::value::Value;

/// Shared handle to a scope.  Closures, bound methods and the interpreter's
/// "current scope" may all hold the same one.
pub type Env<'a> = Rc<RefCell<Environment<'a>>>;

/// One lexical scope: its own bindings plus a link to the enclosing scope.
#[derive(Debug, Default)]
pub struct Environment<'a> {
    values: HashMap<&'a str, Value<'a>>,
    enclosing: Option<Env<'a>>,
}

impl<'a> Environment<'a> {
    /// A root (global) scope.
    pub fn new() -> Env<'a> {
        Rc::new(RefCell::new(Environment::default()))
    }

    /// A child scope of `enclosing`.
    pub fn with_enclosing(enclosing: Env<'a>) -> Env<'a> {
        Rc::new(RefCell::new(Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }))
    }

    pub fn enclosing(&self) -> Option<Env<'a>> {
        self.enclosing.clone()
    }

    /// Bind `name` in this scope, replacing any previous binding here.
    pub fn define(&mut self, name: &'a str, value: Value<'a>) {
        self.values.insert(name, value);
    }

    /// Dynamic lookup walking the whole chain.  Used for globals.
    pub fn get(&self, name: &Token<'a>) -> Result<Value<'a>> {
        if let Some(value) = self.values.get(name.lexeme) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            Err(undefined(name))
        }
    }

    /// Dynamic assignment walking the whole chain.  Never creates a binding.
    pub fn assign(&mut self, name: &Token<'a>, value: Value<'a>) -> Result<()> {
        if let Some(slot) = self.values.get_mut(name.lexeme) {
            *slot = value;
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            Err(undefined(name))
        }
    }
}

/// The scope exactly `distance` links up from `env`.
pub fn ancestor<'a>(env: &Env<'a>, distance: usize) -> Option<Env<'a>> {
    let mut current: Env<'a> = Rc::clone(env);

    for _ in 0..distance {
        let next = current.borrow().enclosing()?;
        current = next;
    }

    Some(current)
}

/// Read a variable the resolver placed `distance` scopes up.
pub fn get_at<'a>(env: &Env<'a>, distance: usize, name: &Token<'a>) -> Result<Value<'a>> {
    debug!("Reading '{}' at distance {}", name.lexeme, distance);

    let scope = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let value = scope.borrow().values.get(name.lexeme).cloned();

    value.ok_or_else(|| undefined(name))
}

/// Look up a name bound by the interpreter itself (`this`, `super`).
pub fn get_keyword_at<'a>(env: &Env<'a>, distance: usize, name: &str) -> Option<Value<'a>> {
    let scope = ancestor(env, distance)?;
    let value = scope.borrow().values.get(name).cloned();

    value
}

/// Write a variable the resolver placed `distance` scopes up.
pub fn assign_at<'a>(env: &Env<'a>, distance: usize, name: &Token<'a>, value: Value<'a>) -> Result<()> {
    debug!("Assigning '{}' at distance {}", name.lexeme, distance);

    let cell = ancestor(env, distance).ok_or_else(|| undefined(name))?;
    let mut scope = cell.borrow_mut();

    match scope.values.get_mut(name.lexeme) {
        Some(slot) => {
            *slot = value;
            Ok(())
        }
        None => Err(undefined(name)),
    }
}

fn undefined(name: &Token<'_>) -> LoxError {
    LoxError::runtime(name, format!("Undefined variable '{}'.", name.lexeme))
}
