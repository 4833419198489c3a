//! Module `scanner` implements a one‑pass, streaming lexer for the Lox language.
//!
//! It transforms a `&str` into a sequence of `Token<'a>`s, skipping whitespace
//! and comments, and emitting exactly one `EOF` token at the end. Designed as a
//! `FusedIterator`, it can be chained safely with other iterator adapters.
//!
//! # Public API
//!
//! - `Scanner::new(src: &'a str) -> Scanner<'a>`
//!   Create a new lexer over the input text.
//!
//! - `impl Iterator for Scanner<'a>`
//!   Yields `Result<Token<'a>, LoxError>` on each `.next()`, where `Ok(token)` is a scanned token
//!   and `Err` reports a lexing error with line information.  Errors never stop
//!   the iterator: the offending input is skipped and scanning resumes.
//!
//! - `scan(src) -> Scanned<'a>`
//!   Drain a scanner, splitting tokens from errors.
//!
//! # Token Recognition (`scan_token`)
//!
//! - Single‑character tokens: `(`, `)`, `{`, `}`, `,`, `.`, `-`, `+`, `;`, `*`.
//! - One‑or‑two character operators: `!`/`!=`, `=`/`==`, `<`/`<=`, `>`/`>=`.
//! - `/` or a `//` comment running to end of line (skipped with `memchr`).
//! - String literals: `"` … `"`, allowing multi‑line and reporting unterminated errors.
//! - Numeric literals: integer and optional fractional part, no exponent.
//! - Identifiers/keywords: alphanumeric/_ sequences, resolved via a perfect‑hash `KEYWORDS` map.
//!
//! # Example
//!
//! ```rust
//! use rox::scanner::Scanner;
//!
//! let mut scanner = Scanner::new("print 123; // example");
//! for result in &mut scanner {
//!     match result {
//!         Ok(token) => println!("{}", token),
//!         Err(err) => eprintln!("{}", err),
//!     }
//! }
//! ```

use crate::error::{LoxError, Result};
use crate::token::{Literal, Token, TokenType};
use log::{debug, info};
use memchr::memchr;
use phf::phf_map;
use std::iter::FusedIterator;

// ─────────────────────────────────────────────────────────────────────────────
// Static keyword map (compile‑time perfect hash)
// ─────────────────────────────────────────────────────────────────────────────

static KEYWORDS: phf::Map<&'static str, TokenType> = phf_map! {
    "and"    => TokenType::AND,
    "class"  => TokenType::CLASS,
    "else"   => TokenType::ELSE,
    "false"  => TokenType::FALSE,
    "fun"    => TokenType::FUN,
    "for"    => TokenType::FOR,
    "if"     => TokenType::IF,
    "nil"    => TokenType::NIL,
    "or"     => TokenType::OR,
    "print"  => TokenType::PRINT,
    "return" => TokenType::RETURN,
    "super"  => TokenType::SUPER,
    "this"   => TokenType::THIS,
    "true"   => TokenType::TRUE,
    "var"    => TokenType::VAR,
    "while"  => TokenType::WHILE,
};

/// A single pass **scanner / lexer**.  The lifetime `'a` ties every emitted
/// token’s `lexeme` slice back to the original source text.
pub struct Scanner<'a> {
    src: &'a str,               // entire source text
    start: usize,               // byte index of the *first* byte of the current lexeme
    curr: usize,                // byte index *one past* the last byte examined
    line: usize,                // 1‑based line counter (\n increments)
    pending: Option<(TokenType, Option<Literal>)>, // recognised token waiting to be emitted
}

impl<'a> Scanner<'a> {
    /// Create a new lexer over `src`.
    #[inline]
    pub fn new(src: &'a str) -> Self {
        info!("Scanner created over {} bytes", src.len());

        Self {
            src,
            start: 0,
            curr: 0,
            line: 1,
            pending: None,
        }
    }

    // ───────────────────────────── primitive helpers ────────────────────────

    #[inline(always)]
    fn bytes(&self) -> &'a [u8] {
        self.src.as_bytes()
    }

    /// Are we at (or past) the end of input?
    #[inline(always)]
    fn is_at_end(&self) -> bool {
        self.curr >= self.src.len()
    }

    /// Advance one byte and return it.  Callers guard with [`Self::is_at_end`].
    #[inline(always)]
    fn advance(&mut self) -> u8 {
        let b = self.bytes()[self.curr];
        self.curr += 1;
        b
    }

    /// Peek at the current byte without consuming it.  Returns `0` past EOF.
    #[inline(always)]
    fn peek(&self) -> u8 {
        self.bytes().get(self.curr).copied().unwrap_or(0)
    }

    /// Peek one byte beyond [`Self::peek`].  Safe at EOF.
    #[inline(always)]
    fn peek_next(&self) -> u8 {
        self.bytes().get(self.curr + 1).copied().unwrap_or(0)
    }

    /// Conditionally consume a byte **iff** it matches `expected`.
    #[inline(always)]
    fn match_byte(&mut self, expected: u8) -> bool {
        if !self.is_at_end() && self.peek() == expected {
            self.advance();
            true
        } else {
            false
        }
    }

    #[inline(always)]
    fn emit(&mut self, token_type: TokenType) {
        self.pending = Some((token_type, None));
    }

    /// Pick `long` if the next byte is `=`, otherwise `short`.
    #[inline(always)]
    fn emit_if_equal(&mut self, long: TokenType, short: TokenType) {
        let tt = if self.match_byte(b'=') { long } else { short };
        self.emit(tt);
    }

    // ───────────────────────────── core lexing ─────────────────────────────

    /// Scan a *single* lexeme starting at `self.curr`.  If the lexeme produces an
    /// actual token it is stored in `self.pending`.  Whitespace and comments
    /// leave `pending` empty.
    fn scan_token(&mut self) -> Result<()> {
        let b = self.advance();

        match b {
            // ── single‑character punctuators ──────────────────────────────
            b'(' => self.emit(TokenType::LEFT_PAREN),
            b')' => self.emit(TokenType::RIGHT_PAREN),
            b'{' => self.emit(TokenType::LEFT_BRACE),
            b'}' => self.emit(TokenType::RIGHT_BRACE),
            b',' => self.emit(TokenType::COMMA),
            b'.' => self.emit(TokenType::DOT),
            b'-' => self.emit(TokenType::MINUS),
            b'+' => self.emit(TokenType::PLUS),
            b';' => self.emit(TokenType::SEMICOLON),
            b'*' => self.emit(TokenType::STAR),

            // ── one‑or‑two character operators ───────────────────────────
            b'!' => self.emit_if_equal(TokenType::BANG_EQUAL, TokenType::BANG),
            b'=' => self.emit_if_equal(TokenType::EQUAL_EQUAL, TokenType::EQUAL),
            b'<' => self.emit_if_equal(TokenType::LESS_EQUAL, TokenType::LESS),
            b'>' => self.emit_if_equal(TokenType::GREATER_EQUAL, TokenType::GREATER),

            // ── whitespace / newline ─────────────────────────────────────
            b' ' | b'\r' | b'\t' => {}

            b'\n' => {
                self.line += 1;
            }

            // ── comments (// … until newline) ────────────────────────────
            b'/' => {
                if self.match_byte(b'/') {
                    // The newline itself is left for the main loop so the
                    // line counter stays in one place.
                    match memchr(b'\n', &self.bytes()[self.curr..]) {
                        Some(pos) => self.curr += pos,
                        None => self.curr = self.src.len(),
                    }
                } else {
                    self.emit(TokenType::SLASH);
                }
            }

            b'"' => return self.string(),

            b'0'..=b'9' => self.number(),

            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.identifier(),

            // ── unexpected character ─────────────────────────────────────
            _ => {
                // Skip the whole UTF‑8 sequence so later slices stay on
                // character boundaries.
                if let Some(c) = self.src[self.start..].chars().next() {
                    self.curr = self.start + c.len_utf8();
                }

                return Err(LoxError::lex(self.line, "Unexpected character."));
            }
        }

        Ok(())
    }

    /// Parse a double‑quoted string literal.
    ///
    /// * `self.start` still points to the opening `"`.
    /// * When we return, `self.curr` points **past** the closing `"`.
    fn string(&mut self) -> Result<()> {
        while !self.is_at_end() && self.peek() != b'"' {
            if self.advance() == b'\n' {
                self.line += 1;
            }
        }

        if self.is_at_end() {
            return Err(LoxError::lex(self.line, "Unterminated string."));
        }

        self.advance(); // closing quote

        let value: &str = &self.src[self.start + 1..self.curr - 1];
        self.pending = Some((TokenType::STRING, Some(Literal::Str(value.to_owned()))));

        Ok(())
    }

    /// Parse a numeric literal (`123`, `3.14`).  Fractions are optional.
    fn number(&mut self) {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        // A fractional part needs at least one digit after the dot.
        if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
            self.advance();

            while self.peek().is_ascii_digit() {
                self.advance();
            }
        }

        let text: &str = &self.src[self.start..self.curr];
        // Digits with at most one inner dot always parse.
        let n: f64 = text.parse::<f64>().unwrap_or(0.0);
        self.pending = Some((TokenType::NUMBER, Some(Literal::Number(n))));
    }

    /// Parse an identifier and decide if it is a **keyword** or a generic
    /// `IDENTIFIER` token.
    fn identifier(&mut self) {
        while {
            let c: u8 = self.peek();
            c.is_ascii_alphanumeric() || c == b'_'
        } {
            self.advance();
        }

        let text: &str = &self.src[self.start..self.curr];

        let tt: TokenType = KEYWORDS.get(text).copied().unwrap_or(TokenType::IDENTIFIER);

        self.emit(tt);
    }
}

// ───────────────────────── Iterator implementation ─────────────────────────

impl<'a> Iterator for Scanner<'a> {
    type Item = Result<Token<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        // Loop until we either emit a token, hit EOF, or see an error.
        while self.curr <= self.src.len() {
            // 1. EOF guard – emit exactly one EOF then terminate.
            if self.curr == self.src.len() {
                self.curr += 1; // fused from here on
                return Some(Ok(Token::new(TokenType::EOF, "", None, self.line)));
            }

            // 2. Reset per‑token state.
            self.start = self.curr;
            self.pending = None;

            // 3. Attempt to scan a token.
            if let Err(e) = self.scan_token() {
                return Some(Err(e));
            }

            // 4. If a real token was recognised, build and return it.
            if let Some((tt, literal)) = self.pending.take() {
                let lexeme: &'a str = &self.src[self.start..self.curr];

                return Some(Ok(Token::new(tt, lexeme, literal, self.line)));
            }
            // Otherwise it was whitespace / comment → continue loop.
        }

        None // already yielded EOF
    }
}

impl FusedIterator for Scanner<'_> {}

/// Everything the scanner produced for one source text.
#[derive(Debug)]
pub struct Scanned<'a> {
    /// All recognised tokens, always terminated by `EOF`.
    pub tokens: Vec<Token<'a>>,

    /// Every scan error, in source order.
    pub errors: Vec<LoxError>,
}

impl Scanned<'_> {
    pub fn had_error(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Scan `src` to completion, collecting tokens and errors separately.
pub fn scan(src: &str) -> Scanned<'_> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();

    for item in Scanner::new(src) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    debug!("Scanned {} tokens with {} errors", tokens.len(), errors.len());

    Scanned { tokens, errors }
}
