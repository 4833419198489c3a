use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{Expr, ExprId, FunctionDecl, Stmt};
use crate::callable::{Callable, LoxFunction};
use crate::class::{LoxClass, LoxInstance, INITIALIZER};
use crate::environment::{self, Env, Environment};
use crate::error::{LoxError, Result};
use crate::resolver::Locals;
use crate::stack::ensure_sufficient_stack;
use crate::token::{Token, TokenType};
use crate::value::Value;

/// How a statement finished.  `return` unwinds through enclosing statements
/// as `Flow::Return` up to the nearest call; runtime errors travel on the
/// `Err` side instead.
#[derive(Debug, Clone)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
}

/// Deepest chain of active Lox calls before `Stack overflow.` is raised.
pub const MAX_CALL_DEPTH: usize = 2048;

/// Tree‑walking evaluator.  `print` output goes to `out`.
pub struct Interpreter<'a, W: Write> {
    globals: Env<'a>,
    environment: Env<'a>,
    locals: Locals,
    out: W,
    depth: usize,
}

impl<'a, W: Write> Interpreter<'a, W> {
    /// Creates an interpreter for one resolved program.
    pub fn new(locals: Locals, out: W) -> Self {
        info!("Initializing Interpreter with {} resolved locals", locals.len());

        let globals: Env<'a> = Environment::new();

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals,
            out,
            depth: 0,
        }
    }

    /// Interprets a list of statements (a "program").  Stops at the first
    /// runtime error; output already written stays written.
    pub fn interpret(&mut self, statements: &[Stmt<'a>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        let result = self.execute_all(statements);
        let flushed = self.out.flush();

        // A runtime error outranks a failed flush.
        match result {
            Ok(_) => {
                flushed?;
                info!("Interpretation completed successfully");
                Ok(())
            }
            Err(e) => {
                info!("Interpretation aborted: {}", e);
                Err(e)
            }
        }
    }

    /// The global scope.
    pub fn globals(&self) -> &Env<'a> {
        &self.globals
    }

    pub fn into_output(self) -> W {
        self.out
    }

    // ───────────────────────────── statements ─────────────────────────────

    fn execute(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                debug!("Printing value: {}", value);
                writeln!(self.out, "{}", value)?;
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Defining variable '{}'", name.lexeme);
                self.environment.borrow_mut().define(name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                return self.execute_block(statements, scope);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);
                let function = LoxFunction::new(Rc::clone(decl), Rc::clone(&self.environment), false);
                self.environment
                    .borrow_mut()
                    .define(decl.name.lexeme, Value::Function(Rc::new(function)));
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.define_class(name, superclass.as_ref(), methods)?,
        }

        Ok(Flow::Normal)
    }

    fn execute_all(&mut self, statements: &[Stmt<'a>]) -> Result<Flow<'a>> {
        for stmt in statements {
            if let Flow::Return(value) = self.execute(stmt)? {
                return Ok(Flow::Return(value));
            }
        }

        Ok(Flow::Normal)
    }

    /// Run `statements` inside `environment`, restoring the current scope on
    /// every exit path.
    pub(crate) fn execute_block(
        &mut self,
        statements: &[Stmt<'a>],
        environment: Env<'a>,
    ) -> Result<Flow<'a>> {
        let previous = std::mem::replace(&mut self.environment, environment);
        let result = self.execute_all(statements);
        self.environment = previous;

        result
    }

    fn define_class(
        &mut self,
        name: &Token<'a>,
        superclass: Option<&Expr<'a>>,
        methods: &[Rc<FunctionDecl<'a>>],
    ) -> Result<()> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Class(class) => Some(class),
                _ => {
                    let token = match expr {
                        Expr::Variable { name, .. } => name,
                        _ => name,
                    };
                    return Err(LoxError::runtime(token, "Superclass must be a class."));
                }
            },
            None => None,
        };

        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        // Methods of a subclass close over an extra scope holding `super`.
        let method_scope: Env<'a> = match &superclass {
            Some(class) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment));
                scope
                    .borrow_mut()
                    .define("super", Value::Class(Rc::clone(class)));
                scope
            }
            None => Rc::clone(&self.environment),
        };

        let table: HashMap<&'a str, Rc<LoxFunction<'a>>> = methods
            .iter()
            .map(|method| {
                let function = LoxFunction::new(
                    Rc::clone(method),
                    Rc::clone(&method_scope),
                    method.name.lexeme == INITIALIZER,
                );
                (method.name.lexeme, Rc::new(function))
            })
            .collect();

        let class = LoxClass::new(name.lexeme, superclass, table);

        self.environment
            .borrow_mut()
            .assign(name, Value::Class(Rc::new(class)))
    }

    // ──────────────────────────── expressions ─────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr<'a>) -> Result<Value<'a>> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(literal) => Ok(Value::from(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left.is_truthy()
                } else {
                    !left.is_truthy()
                };

                if short_circuit {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable { id, name } => self.look_up_variable(*id, name),

            Expr::Assign { id, name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(*id) {
                    Some(distance) => {
                        environment::assign_at(&self.environment, distance, name, value.clone())?
                    }
                    None => self.globals.borrow_mut().assign(name, value.clone())?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee = self.evaluate(callee)?;

                let mut values: Vec<Value<'a>> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                match callee {
                    Value::Function(function) => self.call_value(&*function, paren, values),
                    Value::Class(class) => self.call_value(&class, paren, values),
                    _ => Err(LoxError::runtime(
                        paren,
                        "Can only call functions and classes.",
                    )),
                }
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => LoxInstance::get(&instance, name),
                _ => Err(LoxError::runtime(name, "Only instances have properties.")),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let Value::Instance(instance) = self.evaluate(object)? else {
                    return Err(LoxError::runtime(name, "Only instances have fields."));
                };

                let value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { id, keyword } => self.look_up_variable(*id, keyword),

            Expr::Super {
                id,
                keyword,
                method,
            } => self.evaluate_super(*id, keyword, method),
        }
    }

    fn evaluate_unary(&mut self, operator: &Token<'a>, right: &Expr<'a>) -> Result<Value<'a>> {
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::MINUS => match right {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(operator, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right.is_truthy())),
            _ => Err(unknown_operator(operator)),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr<'a>,
        operator: &Token<'a>,
        right: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let left = self.evaluate(left)?;
        let right = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::String(a + &b)),
                _ => Err(LoxError::runtime(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },
            TokenType::MINUS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a - b))
            }
            TokenType::STAR => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a * b))
            }
            // IEEE semantics: x / 0 is ±inf or NaN, not an error.
            TokenType::SLASH => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Number(a / b))
            }
            TokenType::GREATER => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a > b))
            }
            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a >= b))
            }
            TokenType::LESS => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a < b))
            }
            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, &left, &right)?;
                Ok(Value::Bool(a <= b))
            }
            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),
            _ => Err(unknown_operator(operator)),
        }
    }

    fn evaluate_super(
        &mut self,
        id: ExprId,
        keyword: &Token<'a>,
        method: &Token<'a>,
    ) -> Result<Value<'a>> {
        let unbound = || LoxError::runtime(keyword, "Can't use 'super' outside of a class.");

        let distance = self.locals.get(id).ok_or_else(unbound)?;

        let Some(Value::Class(superclass)) =
            environment::get_keyword_at(&self.environment, distance, "super")
        else {
            return Err(unbound());
        };

        // `this` lives in the scope just inside the one holding `super`.
        let Some(Value::Instance(object)) =
            environment::get_keyword_at(&self.environment, distance.saturating_sub(1), "this")
        else {
            return Err(unbound());
        };

        match superclass.find_method(method.lexeme) {
            Some(found) => Ok(Value::Function(Rc::new(found.bind(object)))),
            None => Err(LoxError::runtime(
                method,
                format!("Undefined property '{}'.", method.lexeme),
            )),
        }
    }

    fn look_up_variable(&self, id: ExprId, name: &Token<'a>) -> Result<Value<'a>> {
        match self.locals.get(id) {
            Some(distance) => environment::get_at(&self.environment, distance, name),
            None => self.globals.borrow().get(name),
        }
    }

    /// Arity and call depth checks, then invoke.
    fn call_value<C: Callable<'a>>(
        &mut self,
        callee: &C,
        paren: &Token<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        if arguments.len() != callee.arity() {
            return Err(LoxError::runtime(
                paren,
                format!(
                    "Expected {} arguments but got {}.",
                    callee.arity(),
                    arguments.len()
                ),
            ));
        }

        if self.depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(paren, "Stack overflow."));
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| callee.call(self, arguments));
        self.depth -= 1;

        result
    }
}

fn number_operands(operator: &Token<'_>, left: &Value<'_>, right: &Value<'_>) -> Result<(f64, f64)> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((*a, *b)),
        _ => Err(LoxError::runtime(operator, "Operands must be numbers.")),
    }
}

fn unknown_operator(operator: &Token<'_>) -> LoxError {
    LoxError::runtime(
        operator,
        format!("Unknown operator '{}'.", operator.lexeme),
    )
}

/// Execute a resolved program, writing `print` output to `out`.
pub fn interpret<'a, W: Write>(statements: &[Stmt<'a>], locals: Locals, out: W) -> Result<()> {
    Interpreter::new(locals, out).interpret(statements)
}
