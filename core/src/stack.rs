//! Host stack safety for recursive reading, evaluation and printing.
//!
//! Non-tail recursion in a program, or deeply nested source text, recurses
//! in Rust. [`ensure_sufficient_stack`] grows the host stack on demand, and
//! [`DepthGuard`] bounds nesting so runaway recursion becomes an ordinary
//! error instead of exhausting memory.

use std::cell::Cell;

use crate::error::{Error, Result};

/// If less than this much stack remains, grow before recursing (100KB).
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB).
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Deepest nesting of guarded calls allowed on one thread.
pub const DEFAULT_MAX_DEPTH: usize = 20_000;

thread_local! {
    static DEPTH: Cell<usize> = const { Cell::new(0) };
    static MAX_DEPTH: Cell<usize> = const { Cell::new(DEFAULT_MAX_DEPTH) };
}

/// Run `f`, first growing the stack if the red zone has been reached.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

/// Set the nesting limit for the current thread. Returns the previous value.
pub fn set_max_depth(depth: usize) -> usize {
    MAX_DEPTH.with(|m| m.replace(depth))
}

/// Current nesting of guarded calls on this thread.
pub fn current_depth() -> usize {
    DEPTH.with(|d| d.get())
}

/// RAII marker for one level of guarded recursion.
pub struct DepthGuard;

impl DepthGuard {
    /// Enter one level. Fails once the thread's limit is passed.
    pub fn enter() -> Result<Self> {
        let depth = DEPTH.with(|d| {
            let next = d.get() + 1;
            d.set(next);
            next
        });
        let max = MAX_DEPTH.with(|m| m.get());
        if depth > max {
            DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
            Err(Error::DepthExceeded(max))
        } else {
            Ok(DepthGuard)
        }
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Run `f` one guarded level deeper, on a stack large enough for it.
pub fn guarded<R>(f: impl FnOnce() -> Result<R>) -> Result<R> {
    let _guard = DepthGuard::enter()?;
    ensure_sufficient_stack(f)
}
