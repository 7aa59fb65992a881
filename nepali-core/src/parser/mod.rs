// nepali-core/src/parser/mod.rs

pub mod ast;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod evaluator;
pub mod lexer;
pub mod statement_parser;

#[cfg(test)]
mod evaluator_tests;

pub use ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement};
pub use builtins::{get_registry, BuiltinFunction, FunctionRegistry};
pub use environment::{Environment, SharedEnvironment};
pub use error::RuntimeError;
pub use evaluator::{evaluate, EvalConfig, Evaluator, Unwind};
pub use lexer::{tokenize, Lexer, Span, Token, TokenKind};
pub use statement_parser::{parse, Parser};
