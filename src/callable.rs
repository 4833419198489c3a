use std::cell::RefCell;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::ast::FunctionDecl;
use crate::class::LoxInstance;
use crate::environment::{self, Env, Environment};
use crate::error::Result;
use crate::interpreter::{Flow, Interpreter};
use crate::value::Value;

/// Anything a call expression can invoke.
pub trait Callable<'a> {
    /// Exact number of arguments the callee accepts.
    fn arity(&self) -> usize;

    /// Invoke with already‑evaluated arguments.  The interpreter has checked
    /// `arguments.len() == self.arity()`.
    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<'a, W>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>>;
}

/// A user function or method together with the scope it closes over.
pub struct LoxFunction<'a> {
    declaration: Rc<FunctionDecl<'a>>,
    closure: Env<'a>,
    is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(declaration: Rc<FunctionDecl<'a>>, closure: Env<'a>, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &'a str {
        self.declaration.name.lexeme
    }

    /// A copy of this method whose scope binds `this` to `instance`.
    pub fn bind(&self, instance: Rc<RefCell<LoxInstance<'a>>>) -> LoxFunction<'a> {
        debug!("Binding method '{}'", self.name());

        let environment: Env<'a> = Environment::with_enclosing(Rc::clone(&self.closure));
        environment
            .borrow_mut()
            .define("this", Value::Instance(instance));

        LoxFunction::new(
            Rc::clone(&self.declaration),
            environment,
            self.is_initializer,
        )
    }

    /// The instance an initializer was bound to.
    fn bound_this(&self) -> Value<'a> {
        environment::get_keyword_at(&self.closure, 0, "this").unwrap_or(Value::Nil)
    }
}

impl<'a> Callable<'a> for LoxFunction<'a> {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<'a, W>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Calling function '{}'", self.name());

        let environment: Env<'a> = Environment::with_enclosing(Rc::clone(&self.closure));
        {
            let mut scope = environment.borrow_mut();
            for (param, argument) in self.declaration.params.iter().zip(arguments) {
                scope.define(param.lexeme, argument);
            }
        }

        let flow = interpreter.execute_block(&self.declaration.body, environment)?;

        if self.is_initializer {
            return Ok(self.bound_this());
        }

        Ok(match flow {
            Flow::Return(value) => value,
            Flow::Normal => Value::Nil,
        })
    }
}

impl fmt::Display for LoxFunction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<fn {}>", self.name())
    }
}

// Manual impl: the closure may (indirectly) contain this function again.
impl fmt::Debug for LoxFunction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxFunction")
            .field("name", &self.name())
            .field("arity", &self.arity())
            .field("is_initializer", &self.is_initializer)
            .finish()
    }
}
