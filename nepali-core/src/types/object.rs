use crate::parser::ast::BlockStatement;
use crate::parser::builtins::BuiltinFunction;
use crate::parser::environment::SharedEnvironment;
use crate::parser::error::RuntimeError;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

/// Runtime type tag of an [`Object`], as shown in error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectType {
    Integer,
    Boolean,
    String,
    Array,
    Hash,
    Function,
    Builtin,
    Error,
    Null,
}

impl ObjectType {
    pub fn name(self) -> &'static str {
        match self {
            ObjectType::Integer => "INTEGER",
            ObjectType::Boolean => "BOOLEAN",
            ObjectType::String => "STRING",
            ObjectType::Array => "ARRAY",
            ObjectType::Hash => "HASH",
            ObjectType::Function => "FUNCTION",
            ObjectType::Builtin => "BUILTIN",
            ObjectType::Error => "ERROR",
            ObjectType::Null => "NULL",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A user-defined function together with the environment it was defined in
pub struct Function {
    pub parameters: Vec<String>,
    pub body: Rc<BlockStatement>,
    pub env: SharedEnvironment,
}

// The captured environment usually contains the function itself, so it is
// left out of the debug form.
impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// Keys usable in a hash: integers, booleans and strings
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
}

impl TryFrom<&Object> for HashKey {
    type Error = RuntimeError;

    fn try_from(object: &Object) -> Result<Self, Self::Error> {
        match object {
            Object::Integer(value) => Ok(HashKey::Integer(*value)),
            Object::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Object::String(value) => Ok(HashKey::String(Rc::clone(value))),
            other => Err(RuntimeError::UnusableHashKey(other.object_type())),
        }
    }
}

/// Original key object and its bound value
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HashObject {
    pub pairs: BTreeMap<HashKey, HashPair>,
}

impl HashObject {
    /// Bind `key` to `value`, replacing an earlier binding of an equal key
    pub fn insert(&mut self, key: Object, value: Object) -> Result<(), RuntimeError> {
        let hash_key = HashKey::try_from(&key)?;
        self.pairs.insert(hash_key, HashPair { key, value });
        Ok(())
    }

    pub fn get(&self, key: &HashKey) -> Option<&Object> {
        self.pairs.get(key).map(|pair| &pair.value)
    }
}

/// Runtime values
#[derive(Debug, Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashObject>),
    Function(Rc<Function>),
    Builtin(&'static BuiltinFunction),
    Error(RuntimeError),
    Null,
}

impl Object {
    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Object::String(value.into())
    }

    pub fn array(elements: Vec<Object>) -> Self {
        Object::Array(Rc::new(elements))
    }

    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Integer(_) => ObjectType::Integer,
            Object::Boolean(_) => ObjectType::Boolean,
            Object::String(_) => ObjectType::String,
            Object::Array(_) => ObjectType::Array,
            Object::Hash(_) => ObjectType::Hash,
            Object::Function(_) => ObjectType::Function,
            Object::Builtin(_) => ObjectType::Builtin,
            Object::Error(_) => ObjectType::Error,
            Object::Null => ObjectType::Null,
        }
    }

    /// `मिथ्या` and null are falsey, everything else (including 0) is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Boolean(false) | Object::Null)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// Equality used by the `==` and `!=` operators for non-integer operands.
    ///
    /// Booleans, null and strings compare by value. Arrays, hashes and
    /// functions compare by identity: two separately built arrays with the
    /// same elements are not equal.
    pub fn is_identical(&self, other: &Object) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::String(a), Object::String(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::Array(a), Object::Array(b)) => Rc::ptr_eq(a, b),
            (Object::Hash(a), Object::Hash(b)) => Rc::ptr_eq(a, b),
            (Object::Function(a), Object::Function(b)) => Rc::ptr_eq(a, b),
            (Object::Builtin(a), Object::Builtin(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// Structural comparison, used by tests and hash pairs. Functions and
/// builtins still compare by identity.
impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            _ => self.is_identical(other),
        }
    }
}

impl From<i64> for Object {
    fn from(value: i64) -> Self {
        Object::Integer(value)
    }
}

impl From<bool> for Object {
    fn from(value: bool) -> Self {
        Object::Boolean(value)
    }
}

impl From<&str> for Object {
    fn from(value: &str) -> Self {
        Object::string(value)
    }
}

impl From<RuntimeError> for Object {
    fn from(error: RuntimeError) -> Self {
        Object::Error(error)
    }
}

/// The textual representation shown by the REPL and the print builtins
impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(value) => write!(f, "{}", value),
            Object::Boolean(true) => write!(f, "सत्य"),
            Object::Boolean(false) => write!(f, "असत्य"),
            Object::String(value) => write!(f, "{}", value),
            Object::Array(elements) => {
                write!(f, "[")?;
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", element)?;
                }
                write!(f, "]")
            }
            Object::Hash(hash) => {
                write!(f, "{{")?;
                for (i, pair) in hash.pairs.values().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", pair.key, pair.value)?;
                }
                write!(f, "}}")
            }
            Object::Function(function) => {
                writeln!(f, "फन({}) {{", function.parameters.join(", "))?;
                for stmt in &function.body.statements {
                    writeln!(f, "{}", stmt)?;
                }
                write!(f, "}}")
            }
            Object::Builtin(_) => write!(f, "बिल्टिन फनक्शन"),
            Object::Error(error) => write!(f, "ERROR: {}", error),
            Object::Null => write!(f, "निल"),
        }
    }
}
