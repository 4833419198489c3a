use log::debug;
use serde::Serialize;
use std::fmt;

/// The different kinds of tokens recognized by the Lox scanner.
///
/// Literal payloads live on [`Token::literal`], so every variant here is a
/// plain tag and comparisons are a single discriminant check.
/// `IDENTIFIER` is used for user‑defined names.
/// `EOF` marks the end of input.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TokenType {
    /// '('
    LEFT_PAREN,

    /// ')'
    RIGHT_PAREN,

    /// '{'
    LEFT_BRACE,

    /// '}'
    RIGHT_BRACE,

    /// ','
    COMMA,

    /// '.'
    DOT,

    /// '-'
    MINUS,

    /// '+'
    PLUS,

    /// ';'
    SEMICOLON,

    /// '/'
    SLASH,

    /// '*'
    STAR,

    /// '!'
    BANG,

    /// '!='
    BANG_EQUAL,

    /// '='
    EQUAL,

    /// '=='
    EQUAL_EQUAL,

    /// '>'
    GREATER,

    /// '>='
    GREATER_EQUAL,

    /// '<'
    LESS,

    /// '<='
    LESS_EQUAL,

    /// A user‑defined identifier
    IDENTIFIER,

    /// A string literal
    STRING,

    /// A numeric literal
    NUMBER,

    AND,
    CLASS,
    ELSE,
    FALSE,
    FUN,
    FOR,
    IF,
    NIL,
    OR,
    PRINT,
    RETURN,
    SUPER,
    THIS,
    TRUE,
    VAR,
    WHILE,

    /// End‑of‑file marker
    EOF,
}

/// A scalar constant as written in the source.  Scanned onto `STRING` and
/// `NUMBER` tokens, and reused by the parser for every literal expression.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Literal {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// `true` / `false`.
    Bool(bool),

    /// The `nil` literal.
    Nil,
}

/// A scanned token, including its type, the original lexeme,
/// and the line number where it was found.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Token<'a> {
    /// The category of this token.
    pub token_type: TokenType,

    /// The exact substring from the source that produced this token.
    pub lexeme: &'a str,

    /// Value carried by `STRING` and `NUMBER` tokens.
    pub literal: Option<Literal>,

    /// 1‑based line number in the source.
    pub line: usize,
}

impl<'a> Token<'a> {
    /// Create a new Token with the given type, lexeme, literal and line.
    pub fn new(token_type: TokenType, lexeme: &'a str, literal: Option<Literal>, line: usize) -> Self {
        debug!(
            "Creating new token: type={:?}, lexeme={}, line={}",
            token_type, lexeme, line
        );

        Self {
            token_type,
            lexeme,
            literal,
            line,
        }
    }

    /// Identifier token that did not come from the source text.
    pub(crate) fn synthetic(lexeme: &'static str, line: usize) -> Self {
        Self {
            token_type: TokenType::IDENTIFIER,
            lexeme,
            literal: None,
            line,
        }
    }
}

/// `TYPE lexeme literal`, where numbers always show a fractional part and
/// tokens without a literal print `null`.
impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} {} ", self.token_type, self.lexeme)?;

        match &self.literal {
            Some(Literal::Str(s)) => write!(f, "{}", s),
            // 3 → "3.0", 3.14 → "3.14"
            Some(Literal::Number(n)) if n.fract() == 0.0 => write!(f, "{:.1}", n),
            Some(Literal::Number(n)) => write!(f, "{}", n),
            Some(Literal::Bool(b)) => write!(f, "{}", b),
            Some(Literal::Nil) => write!(f, "nil"),
            None => write!(f, "null"),
        }
    }
}
