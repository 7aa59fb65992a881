//! Tree-walking evaluator
//!
//! Every evaluation step returns `Result<_, Unwind>`. A `प्रतिफल` statement
//! unwinds with `Unwind::Return` until the enclosing function call (or the
//! program) catches it; a runtime error unwinds with `Unwind::Error` all the
//! way out and becomes the program's `Object::Error` value. Neither signal is
//! ever stored in an environment or a collection.

use crate::parser::ast::{
    BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement,
};
use crate::parser::builtins::get_registry;
use crate::parser::environment::{Environment, SharedEnvironment};
use crate::parser::error::RuntimeError;
use crate::stack::ensure_sufficient_stack;
use crate::types::{Function, HashKey, HashObject, Object};
use std::io::{self, Write};
use std::rc::Rc;
use tracing::{debug, trace};

/// Default ceiling on nested function calls
pub const DEFAULT_MAX_DEPTH: usize = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalConfig {
    /// Maximum number of nested user function calls before evaluation fails
    /// with `stack exhausted`
    pub max_depth: usize,
}

impl EvalConfig {
    pub fn with_max_depth(max_depth: usize) -> Self {
        EvalConfig { max_depth }
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Non-local exit from an evaluation step
#[derive(Debug, Clone, PartialEq)]
pub enum Unwind {
    Return(Object),
    Error(RuntimeError),
}

impl From<RuntimeError> for Unwind {
    fn from(error: RuntimeError) -> Self {
        Unwind::Error(error)
    }
}

type EvalResult<T> = Result<T, Unwind>;

pub struct Evaluator {
    config: EvalConfig,
    depth: usize,
    output: Box<dyn Write>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::with_config(EvalConfig::default())
    }

    pub fn with_config(config: EvalConfig) -> Self {
        Evaluator {
            config,
            depth: 0,
            output: Box::new(io::stdout()),
        }
    }

    /// Send output of the print builtins to `output` instead of stdout
    pub fn with_output(mut self, output: Box<dyn Write>) -> Self {
        self.output = output;
        self
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Evaluate every statement of `program` in `env`.
    ///
    /// Returns the value of the last statement, the value of a top-level
    /// `प्रतिफल`, or the runtime error that stopped evaluation. `None` when the
    /// program is empty or ends with a statement that has no value.
    pub fn eval_program(&mut self, program: &Program, env: &SharedEnvironment) -> Option<Object> {
        let result = self.eval_statements(&program.statements, env);
        let _ = self.output.flush();
        match result {
            Ok(value) => value,
            Err(Unwind::Return(value)) => Some(value),
            Err(Unwind::Error(error)) => {
                debug!(%error, "runtime error");
                Some(Object::Error(error))
            }
        }
    }

    fn eval_statement(&mut self, stmt: &Statement, env: &SharedEnvironment) -> EvalResult<Option<Object>> {
        match stmt {
            Statement::Let { name, value } => {
                let value = self.eval_expression(value, env)?;
                trace!(%name, "bind");
                env.borrow_mut().define(name.as_str(), value);
                Ok(None)
            }
            Statement::Return(value) => {
                let value = self.eval_expression(value, env)?;
                Err(Unwind::Return(value))
            }
            Statement::Expression(expr) => self.eval_expression(expr, env).map(Some),
            Statement::Block(block) => self.eval_block(block, env),
        }
    }

    fn eval_block(&mut self, block: &BlockStatement, env: &SharedEnvironment) -> EvalResult<Option<Object>> {
        self.eval_statements(&block.statements, env)
    }

    fn eval_statements(&mut self, stmts: &[Statement], env: &SharedEnvironment) -> EvalResult<Option<Object>> {
        let mut result = None;
        for stmt in stmts {
            result = self.eval_statement(stmt, env)?;
        }
        Ok(result)
    }

    fn eval_expression(&mut self, expr: &Expression, env: &SharedEnvironment) -> EvalResult<Object> {
        ensure_sufficient_stack(|| self.eval_expression_inner(expr, env))
    }

    fn eval_expression_inner(&mut self, expr: &Expression, env: &SharedEnvironment) -> EvalResult<Object> {
        match expr {
            Expression::IntegerLiteral(value) => Ok(Object::Integer(*value)),
            Expression::StringLiteral(value) => Ok(Object::string(value.as_str())),
            Expression::BooleanLiteral(value) => Ok(Object::Boolean(*value)),
            Expression::Identifier(name) => eval_identifier(name, env),

            Expression::Prefix { operator, right } => {
                let right = self.eval_expression(right, env)?;
                Ok(eval_prefix(*operator, right)?)
            }

            Expression::Infix {
                left,
                operator,
                right,
            } => {
                let left = self.eval_expression(left, env)?;
                let right = self.eval_expression(right, env)?;
                Ok(eval_infix(*operator, &left, &right)?)
            }

            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                let condition = self.eval_expression(condition, env)?;
                let branch = if condition.is_truthy() {
                    Some(consequence)
                } else {
                    alternative.as_ref()
                };
                match branch {
                    Some(block) => Ok(self.eval_block(block, env)?.unwrap_or(Object::Null)),
                    None => Ok(Object::Null),
                }
            }

            Expression::FunctionLiteral { parameters, body } => {
                Ok(Object::Function(Rc::new(Function {
                    parameters: parameters.clone(),
                    body: Rc::clone(body),
                    env: Rc::clone(env),
                })))
            }

            Expression::Call {
                function,
                arguments,
            } => {
                let callee = self.eval_expression(function, env)?;
                let args = self.eval_expressions(arguments, env)?;
                self.apply_function(callee, args)
            }

            Expression::ArrayLiteral(elements) => {
                let elements = self.eval_expressions(elements, env)?;
                Ok(Object::array(elements))
            }

            Expression::HashLiteral(pairs) => {
                let mut hash = HashObject::default();
                for (key, value) in pairs {
                    let key = self.eval_expression(key, env)?;
                    let value = self.eval_expression(value, env)?;
                    hash.insert(key, value)?;
                }
                Ok(Object::Hash(Rc::new(hash)))
            }

            Expression::Index { left, index } => {
                let left = self.eval_expression(left, env)?;
                let index = self.eval_expression(index, env)?;
                Ok(eval_index(&left, &index)?)
            }
        }
    }

    /// Evaluate left to right, stopping at the first error
    fn eval_expressions(&mut self, exprs: &[Expression], env: &SharedEnvironment) -> EvalResult<Vec<Object>> {
        exprs
            .iter()
            .map(|expr| self.eval_expression(expr, env))
            .collect()
    }

    fn apply_function(&mut self, callee: Object, args: Vec<Object>) -> EvalResult<Object> {
        match callee {
            Object::Function(function) => {
                if args.len() != function.parameters.len() {
                    return Err(RuntimeError::WrongArgumentCount {
                        got: args.len(),
                        want: function.parameters.len(),
                    }
                    .into());
                }
                if self.depth >= self.config.max_depth {
                    return Err(RuntimeError::StackExhausted {
                        limit: self.config.max_depth,
                    }
                    .into());
                }

                let mut call_env = Environment::enclosed(Rc::clone(&function.env));
                for (param, arg) in function.parameters.iter().zip(args) {
                    call_env.define(param.as_str(), arg);
                }
                let call_env = call_env.into_shared();

                self.depth += 1;
                debug!(depth = self.depth, params = ?function.parameters, "call");
                let result = self.eval_block(&function.body, &call_env);
                self.depth -= 1;

                match result {
                    Ok(value) => Ok(value.unwrap_or(Object::Null)),
                    Err(Unwind::Return(value)) => Ok(value),
                    Err(error) => Err(error),
                }
            }
            Object::Builtin(builtin) => {
                debug!(name = builtin.name, args = args.len(), "call builtin");
                Ok(builtin.call(&args, &mut *self.output)?)
            }
            other => Err(RuntimeError::NotAFunction(other.object_type()).into()),
        }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_identifier(name: &str, env: &SharedEnvironment) -> EvalResult<Object> {
    if let Some(value) = env.borrow().get(name) {
        return Ok(value);
    }
    match get_registry().get(name) {
        Some(builtin) => Ok(Object::Builtin(builtin)),
        None => Err(RuntimeError::IdentifierNotFound(name.to_string()).into()),
    }
}

fn eval_prefix(operator: PrefixOperator, right: Object) -> Result<Object, RuntimeError> {
    match (operator, right) {
        (PrefixOperator::Bang, right) => Ok(Object::Boolean(!right.is_truthy())),
        (PrefixOperator::Minus, Object::Integer(value)) => Ok(Object::Integer(value.wrapping_neg())),
        (PrefixOperator::Minus, right) => Err(RuntimeError::UnknownPrefixOperator {
            operator,
            operand: right.object_type(),
        }),
    }
}

fn eval_infix(operator: InfixOperator, left: &Object, right: &Object) -> Result<Object, RuntimeError> {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix(operator, *l, *r),
        _ if operator == InfixOperator::Eq => Ok(Object::Boolean(left.is_identical(right))),
        _ if operator == InfixOperator::NotEq => Ok(Object::Boolean(!left.is_identical(right))),
        (Object::String(l), Object::String(r)) if operator == InfixOperator::Plus => {
            let mut joined = String::with_capacity(l.len() + r.len());
            joined.push_str(l);
            joined.push_str(r);
            Ok(Object::string(joined))
        }
        _ if left.object_type() != right.object_type() => Err(RuntimeError::TypeMismatch {
            left: left.object_type(),
            operator,
            right: right.object_type(),
        }),
        _ => Err(RuntimeError::UnknownInfixOperator {
            left: left.object_type(),
            operator,
            right: right.object_type(),
        }),
    }
}

fn eval_integer_infix(operator: InfixOperator, left: i64, right: i64) -> Result<Object, RuntimeError> {
    let value = match operator {
        InfixOperator::Plus => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Minus => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Asterisk => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Slash => {
            if right == 0 {
                return Err(RuntimeError::DivisionByZero);
            }
            Object::Integer(left.wrapping_div(right))
        }
        InfixOperator::Lt => Object::Boolean(left < right),
        InfixOperator::Gt => Object::Boolean(left > right),
        InfixOperator::LtEq => Object::Boolean(left <= right),
        InfixOperator::GtEq => Object::Boolean(left >= right),
        InfixOperator::Eq => Object::Boolean(left == right),
        InfixOperator::NotEq => Object::Boolean(left != right),
    };
    Ok(value)
}

fn eval_index(left: &Object, index: &Object) -> Result<Object, RuntimeError> {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => Ok(usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(Object::Null)),
        (Object::Hash(hash), key) => {
            let key = HashKey::try_from(key)?;
            Ok(hash.get(&key).cloned().unwrap_or(Object::Null))
        }
        _ => Err(RuntimeError::IndexNotSupported(left.object_type())),
    }
}

/// Evaluate `program` with a default evaluator, printing to stdout.
///
/// Runtime errors come back as `Object::Error`; a program without a value
/// yields `Object::Null`.
pub fn evaluate(program: &Program, env: &SharedEnvironment) -> Object {
    Evaluator::new()
        .eval_program(program, env)
        .unwrap_or(Object::Null)
}
