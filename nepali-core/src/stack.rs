//! Stack growth for deeply recursive parsing and evaluation.
//!
//! Parsing and evaluation both recurse along the shape of the source. On
//! native targets the stack is grown on demand with `stacker`, so runaway
//! recursion is stopped by the evaluator's configured call-depth ceiling
//! rather than by the host crashing. On WASM the closure is called directly.

/// Grow the stack when less than this much remains (100KB)
const RED_ZONE: usize = 100 * 1024;

/// Size of each newly allocated stack segment (1MB)
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, first growing the stack if the remaining space is below the red zone
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
