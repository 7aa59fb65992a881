use crate::types::ObjectType;
use crate::parser::ast::{InfixOperator, PrefixOperator};
use thiserror::Error;

/// Errors produced while evaluating a program.
///
/// These are ordinary values of the language: an evaluation that fails ends
/// with `Object::Error` holding one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("identifier not found: {0}")]
    IdentifierNotFound(String),

    #[error("type mismatch: {left} {operator} {right}")]
    TypeMismatch {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },

    #[error("unknown operator: {operator}{operand}")]
    UnknownPrefixOperator {
        operator: PrefixOperator,
        operand: ObjectType,
    },

    #[error("unknown operator: {left} {operator} {right}")]
    UnknownInfixOperator {
        left: ObjectType,
        operator: InfixOperator,
        right: ObjectType,
    },

    #[error("division by zero")]
    DivisionByZero,

    #[error("unusable as hash key: {0}")]
    UnusableHashKey(ObjectType),

    #[error("index operator not supported: {0}")]
    IndexNotSupported(ObjectType),

    #[error("not a function: {0}")]
    NotAFunction(ObjectType),

    #[error("wrong number of arguments. got={got}, want={want}")]
    WrongArgumentCount { got: usize, want: usize },

    #[error("argument to `{builtin}` must be {expected}, got {got}")]
    InvalidArgument {
        builtin: &'static str,
        expected: &'static str,
        got: ObjectType,
    },

    #[error("stack exhausted: call depth exceeded {limit}")]
    StackExhausted { limit: usize },
}
