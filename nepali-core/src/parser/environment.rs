//! Environment for variable scopes
//!
//! Each environment holds its own bindings and an optional link to the
//! enclosing one. Function values keep a handle to the environment they were
//! defined in; every call gets a fresh environment enclosed by that one.

use crate::types::Object;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Environment shared between the evaluator and the closures that captured it
pub type SharedEnvironment = Rc<RefCell<Environment>>;

/// Scoped environment for variable storage
#[derive(Debug, Default)]
pub struct Environment {
    store: HashMap<String, Object>,
    outer: Option<SharedEnvironment>,
}

impl Environment {
    /// Create a new top-level environment
    pub fn new() -> Self {
        Environment {
            store: HashMap::new(),
            outer: None,
        }
    }

    /// Create an environment whose lookups fall back to `outer`
    pub fn enclosed(outer: SharedEnvironment) -> Self {
        Environment {
            store: HashMap::new(),
            outer: Some(outer),
        }
    }

    /// Wrap this environment for sharing
    pub fn into_shared(self) -> SharedEnvironment {
        Rc::new(RefCell::new(self))
    }

    /// Bind a name in this scope, shadowing any outer binding
    pub fn define(&mut self, name: impl Into<String>, value: Object) {
        self.store.insert(name.into(), value);
    }

    /// Look a name up, walking outward through enclosing scopes
    pub fn get(&self, name: &str) -> Option<Object> {
        match self.store.get(name) {
            Some(value) => Some(value.clone()),
            None => self.outer.as_ref()?.borrow().get(name),
        }
    }

    /// Check if a name is bound in this or any enclosing scope
    pub fn is_defined(&self, name: &str) -> bool {
        self.store.contains_key(name)
            || self
                .outer
                .as_ref()
                .is_some_and(|outer| outer.borrow().is_defined(name))
    }

    /// Names bound directly in this scope, sorted
    pub fn current_scope_names(&self) -> Vec<&String> {
        let mut names: Vec<&String> = self.store.keys().collect();
        names.sort();
        names
    }

    /// Number of scopes in the chain (1 = global only)
    pub fn depth(&self) -> usize {
        1 + self
            .outer
            .as_ref()
            .map_or(0, |outer| outer.borrow().depth())
    }
}
