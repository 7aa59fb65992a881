use crate::parser::error::RuntimeError;
use crate::types::Object;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::sync::OnceLock;

/// Native implementation of a builtin. Output from the print family goes to
/// `out`.
pub type BuiltinHandler = fn(&[Object], &mut dyn Write) -> Result<Object, RuntimeError>;

static REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

pub fn get_registry() -> &'static FunctionRegistry {
    REGISTRY.get_or_init(FunctionRegistry::new)
}

pub struct BuiltinFunction {
    pub name: &'static str,
    pub description: &'static str,
    pub signature: &'static str, // e.g. "लेन(value: STRING | ARRAY) -> INTEGER"
    pub handler: BuiltinHandler,
}

impl BuiltinFunction {
    pub fn call(&self, args: &[Object], out: &mut dyn Write) -> Result<Object, RuntimeError> {
        (self.handler)(args, out)
    }
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

pub struct DocItem {
    pub name: &'static str,
    pub description: &'static str,
    pub signature: &'static str,
}

pub struct FunctionRegistry {
    functions: HashMap<&'static str, BuiltinFunction>,
}

impl FunctionRegistry {
    pub fn new() -> Self {
        let mut registry = FunctionRegistry {
            functions: HashMap::new(),
        };
        registry.register_all();
        registry
    }

    fn register(
        &mut self,
        name: &'static str,
        description: &'static str,
        signature: &'static str,
        handler: BuiltinHandler,
    ) {
        self.functions.insert(
            name,
            BuiltinFunction {
                name,
                description,
                signature,
                handler,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&BuiltinFunction> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn get_documentation(&self) -> Vec<DocItem> {
        let mut docs: Vec<DocItem> = self
            .functions
            .values()
            .map(|f| DocItem {
                name: f.name,
                description: f.description,
                signature: f.signature,
            })
            .collect();

        docs.sort_by(|a, b| a.name.cmp(b.name));
        docs
    }

    fn register_all(&mut self) {
        self.register(
            "लेन",
            "Length of a string (in characters) or an array",
            "लेन(value: STRING | ARRAY) -> INTEGER",
            builtin_len,
        );
        self.register(
            "प्रिन्ट",
            "Print the arguments separated by spaces, then a newline",
            "प्रिन्ट(...values) -> NULL",
            builtin_print,
        );
        self.register(
            "लेख्नुहोस्",
            "Same as प्रिन्ट",
            "लेख्नुहोस्(...values) -> NULL",
            builtin_print,
        );
        self.register(
            "प्रिन्टल",
            "Print each argument on its own line",
            "प्रिन्टल(...values) -> NULL",
            builtin_println,
        );
        self.register(
            "टाइप",
            "Type name of a value, in lowercase",
            "टाइप(value) -> STRING",
            builtin_type,
        );
        self.register(
            "स्ट्रिंग",
            "Textual representation of a value",
            "स्ट्रिंग(value) -> STRING",
            builtin_string,
        );
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn single_arg(args: &[Object]) -> Result<&Object, RuntimeError> {
    match args {
        [arg] => Ok(arg),
        _ => Err(RuntimeError::WrongArgumentCount {
            got: args.len(),
            want: 1,
        }),
    }
}

fn builtin_len(args: &[Object], _out: &mut dyn Write) -> Result<Object, RuntimeError> {
    let length = match single_arg(args)? {
        Object::String(value) => value.chars().count(),
        Object::Array(elements) => elements.len(),
        other => {
            return Err(RuntimeError::InvalidArgument {
                builtin: "लेन",
                expected: "STRING or ARRAY",
                got: other.object_type(),
            })
        }
    };
    Ok(Object::Integer(length as i64))
}

fn builtin_print(args: &[Object], out: &mut dyn Write) -> Result<Object, RuntimeError> {
    let line = args
        .iter()
        .map(|arg| arg.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    // A closed stdout is not a language error
    let _ = writeln!(out, "{}", line);
    Ok(Object::Null)
}

fn builtin_println(args: &[Object], out: &mut dyn Write) -> Result<Object, RuntimeError> {
    for arg in args {
        if writeln!(out, "{}", arg).is_err() {
            break;
        }
    }
    Ok(Object::Null)
}

fn builtin_type(args: &[Object], _out: &mut dyn Write) -> Result<Object, RuntimeError> {
    let name = single_arg(args)?.object_type().name().to_lowercase();
    Ok(Object::string(name))
}

fn builtin_string(args: &[Object], _out: &mut dyn Write) -> Result<Object, RuntimeError> {
    Ok(Object::string(single_arg(args)?.to_string()))
}
