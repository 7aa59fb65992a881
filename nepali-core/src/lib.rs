//! # Nepali Core
//!
//! Lexer, parser and tree-walking evaluator for a small interpreted language
//! whose keywords and identifiers are written in Devanagari.
//!
//! ## Example
//!
//! ```
//! use nepali_core::{evaluate, parse, Environment, Object};
//!
//! let (program, errors) = parse("लेट जोड = फन(क, ख) { क + ख }; जोड(२, ३)");
//! assert!(errors.is_empty());
//!
//! let env = Environment::new().into_shared();
//! assert_eq!(evaluate(&program, &env), Object::Integer(5));
//! ```

pub mod parser;
pub mod stack;
pub mod types;

// Re-export commonly used types
pub use parser::{
    evaluate, parse, tokenize, EvalConfig, Environment, Evaluator, Program, RuntimeError,
    SharedEnvironment,
};
pub use types::Object;
