//! # Nepali
//!
//! Command-line front end for the Nepali programming language: a file
//! runner and an interactive REPL on top of `nepali-core`.
//!
//! ## Modules
//!
//! - `runner`: Runs a source file, printing diagnostics, the result or the
//!   runtime error, and reports how the run ended.
//! - `repl`: Provides the Read-Eval-Print Loop; bindings persist across lines.
//! - `commands`: The `:`-prefixed REPL commands.

pub mod commands;
pub mod repl;
pub mod runner;

// Re-export the language core for convenience
pub use nepali_core::{evaluate, parse, tokenize, EvalConfig, Environment, Evaluator, Object};
