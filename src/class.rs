use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::rc::Rc;

use log::debug;

use crate::callable::{Callable, LoxFunction};
use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::token::Token;
use crate::value::Value;

/// Name of the method run when a class is called.
pub const INITIALIZER: &str = "init";

#[derive(Debug)]
pub struct LoxClass<'a> {
    name: &'a str,
    superclass: Option<Rc<LoxClass<'a>>>,
    methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: &'a str,
        superclass: Option<Rc<LoxClass<'a>>>,
        methods: HashMap<&'a str, Rc<LoxFunction<'a>>>,
    ) -> Self {
        Self {
            name,
            superclass,
            methods,
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    /// Look `name` up on this class, then up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction<'a>>> {
        match self.methods.get(name) {
            Some(method) => Some(Rc::clone(method)),
            None => self
                .superclass
                .as_ref()
                .and_then(|superclass| superclass.find_method(name)),
        }
    }
}

/// Calling a class constructs an instance and runs `init` on it.
impl<'a> Callable<'a> for Rc<LoxClass<'a>> {
    fn arity(&self) -> usize {
        self.find_method(INITIALIZER)
            .map_or(0, |initializer| initializer.arity())
    }

    fn call<W: Write>(
        &self,
        interpreter: &mut Interpreter<'a, W>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Instantiating class '{}'", self.name);

        let instance = Rc::new(RefCell::new(LoxInstance::new(Rc::clone(self))));

        if let Some(initializer) = self.find_method(INITIALIZER) {
            initializer
                .bind(Rc::clone(&instance))
                .call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl fmt::Display for LoxClass<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

pub struct LoxInstance<'a> {
    class: Rc<LoxClass<'a>>,
    fields: HashMap<&'a str, Value<'a>>,
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        Self {
            class,
            fields: HashMap::new(),
        }
    }

    /// Property access: fields shadow methods; methods come back bound to
    /// `instance`.
    pub fn get(instance: &Rc<RefCell<LoxInstance<'a>>>, name: &Token<'a>) -> Result<Value<'a>> {
        let this = instance.borrow();

        if let Some(value) = this.fields.get(name.lexeme) {
            return Ok(value.clone());
        }

        match this.class.find_method(name.lexeme) {
            Some(method) => Ok(Value::Function(Rc::new(method.bind(Rc::clone(instance))))),
            None => Err(LoxError::runtime(
                name,
                format!("Undefined property '{}'.", name.lexeme),
            )),
        }
    }

    /// Create or overwrite a field.
    pub fn set(&mut self, name: &Token<'a>, value: Value<'a>) {
        self.fields.insert(name.lexeme, value);
    }
}

impl fmt::Display for LoxInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} instance", self.class.name)
    }
}

// Fields may refer back to the instance, so only their names are shown.
impl fmt::Debug for LoxInstance<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields: Vec<&&str> = self.fields.keys().collect();
        fields.sort();

        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &fields)
            .finish()
    }
}
