//! Stack growth for the recursive passes.
//!
//! The parser, resolver and interpreter all recurse once per nesting level
//! of the program (and the interpreter once more per Lox call).  Their
//! recursive entry points run through [`ensure_sufficient_stack`], which
//! moves onto a fresh heap‑allocated segment when the native stack is close
//! to exhausted.  Runaway Lox recursion is still cut off by the
//! interpreter's call depth limit.

/// Grow when less than this much stack remains.
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub(crate) fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}
