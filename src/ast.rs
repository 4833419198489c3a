//! Expression and statement trees produced by the parser.
//!
//! Nodes own their children.  Nodes that name a variable (`Variable`,
//! `Assign`, `This`, `Super`) carry an [`ExprId`] so the resolver can
//! annotate each occurrence independently of its spelling.

use std::rc::Rc;

use crate::token::{Literal, Token};

/// Stable identity of a variable‑referencing expression within one parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExprId(pub u32);

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(Literal),

    /// Prefix `!` or `-`.
    Unary {
        operator: Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Arithmetic, comparison and equality operators.
    Binary {
        left: Box<Expr<'a>>,
        operator: Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Short‑circuiting `and` / `or`.
    Logical {
        left: Box<Expr<'a>>,
        operator: Token<'a>,
        right: Box<Expr<'a>>,
    },

    /// Parenthesised sub‑expression.
    Grouping(Box<Expr<'a>>),

    Variable {
        id: ExprId,
        name: Token<'a>,
    },

    Assign {
        id: ExprId,
        name: Token<'a>,
        value: Box<Expr<'a>>,
    },

    Call {
        callee: Box<Expr<'a>>,
        /// The closing `)`, kept for error locations.
        paren: Token<'a>,
        arguments: Vec<Expr<'a>>,
    },

    /// `object.name`
    Get {
        object: Box<Expr<'a>>,
        name: Token<'a>,
    },

    /// `object.name = value`
    Set {
        object: Box<Expr<'a>>,
        name: Token<'a>,
        value: Box<Expr<'a>>,
    },

    This {
        id: ExprId,
        keyword: Token<'a>,
    },

    /// `super.method`
    Super {
        id: ExprId,
        keyword: Token<'a>,
        method: Token<'a>,
    },
}

/// A named function or method: `name(params) { body }`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl<'a> {
    pub name: Token<'a>,
    pub params: Vec<Token<'a>>,
    pub body: Vec<Stmt<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt<'a> {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr<'a>),

    Print(Expr<'a>),

    /// `"var" IDENT ("=" initializer)? ";"`
    Var {
        name: Token<'a>,
        initializer: Option<Expr<'a>>,
    },

    Block(Vec<Stmt<'a>>),

    If {
        condition: Expr<'a>,
        then_branch: Box<Stmt<'a>>,
        else_branch: Option<Box<Stmt<'a>>>,
    },

    /// Also the target of `for` desugaring.
    While {
        condition: Expr<'a>,
        body: Box<Stmt<'a>>,
    },

    /// Shared so every closure created from it points at one declaration.
    Function(Rc<FunctionDecl<'a>>),

    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token<'a>,
        value: Option<Expr<'a>>,
    },

    Class {
        name: Token<'a>,
        /// Always an `Expr::Variable` when present.
        superclass: Option<Expr<'a>>,
        methods: Vec<Rc<FunctionDecl<'a>>>,
    },
}
