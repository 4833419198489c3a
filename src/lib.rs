//! `rox`: a tree‑walking interpreter for the Lox language.
//!
//! The pipeline is exposed stage by stage so callers can stop after any of
//! them:
//!
//! ```rust
//! let source = "var a = 1; print a + 2;";
//!
//! let scanned = rox::scan(source);
//! assert!(!scanned.had_error());
//!
//! let parsed = rox::parse(&scanned.tokens);
//! assert!(!parsed.had_error());
//!
//! let resolved = rox::resolve(&parsed.statements);
//! assert!(!resolved.had_error());
//!
//! let mut out = Vec::new();
//! rox::interpret(&parsed.statements, resolved.locals, &mut out).unwrap();
//! assert_eq!(out, b"3\n");
//! ```

pub mod ast;
pub mod callable;
pub mod class;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod scanner;
mod stack;
pub mod token;
pub mod value;

use std::io::Write;

use log::info;

pub use error::{LoxError, Result, RunError};
pub use interpreter::interpret;
pub use parser::parse;
pub use resolver::resolve;
pub use scanner::scan;

/// Scan, parse, resolve and execute `source`.  Each static stage runs only
/// if the previous one reported no errors.
pub fn run<W: Write>(source: &str, out: W) -> std::result::Result<(), RunError> {
    let scanned = scan(source);
    if scanned.had_error() {
        info!("Scan errors: {}", scanned.errors.len());
        return Err(RunError::Static(scanned.errors));
    }

    let parsed = parse(&scanned.tokens);
    if parsed.had_error() {
        info!("Parse errors: {}", parsed.errors.len());
        return Err(RunError::Static(parsed.errors));
    }

    let resolved = resolve(&parsed.statements);
    if resolved.had_error() {
        info!("Resolution errors: {}", resolved.errors.len());
        return Err(RunError::Static(resolved.errors));
    }

    interpret(&parsed.statements, resolved.locals, out).map_err(RunError::Runtime)
}
