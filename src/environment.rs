use core::fmt;
use std::{cell::RefCell, collections::HashMap, rc::Rc};

use itertools::Itertools;

use crate::{
    ast::FunctionDecl,
    error::RuntimeError,
    value::{Closure, Value},
};

enum Slot {
    Value(Value),
    // A closure over the very scope holding it. Only the declaration is
    // kept, so the scope does not own itself
    SelfCapture(Rc<FunctionDecl>),
}

struct Scope {
    bindings: RefCell<HashMap<String, Slot>>,
    parent: Option<Environment>,
}

/// A handle to one scope in a chain of scopes.
///
/// Cloning the handle does not copy the bindings: every clone, and every
/// closure holding one, reads and writes the same slots. A scope lives for as
/// long as any handle to it does.
#[derive(Clone)]
pub struct Environment(Rc<Scope>);

impl Environment {
    /// The global scope, with no parent
    pub fn root() -> Self {
        Self(Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        }))
    }

    pub fn child_scope(&self) -> Self {
        Self(Rc::new(Scope {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(self.clone()),
        }))
    }

    pub fn is_global(&self) -> bool {
        self.0.parent.is_none()
    }

    /// Number of scopes between this one and the global scope
    pub fn depth(&self) -> usize {
        self.ancestors().count() - 1
    }

    /// Creates a binding in this scope, replacing one of the same name that
    /// already lives here. Bindings in enclosing scopes are shadowed, not touched.
    pub fn define(&self, name: &str, value: Value) {
        let slot = self.slot_for(value);
        self.0.bindings.borrow_mut().insert(name.to_owned(), slot);
    }

    pub fn get(&self, name: &str) -> Result<Value, RuntimeError> {
        self.ancestors()
            .find_map(|environment| environment.lookup(name))
            .ok_or_else(|| RuntimeError::UnboundVariable(name.to_owned()))
    }

    /// Reads `name` from the scope `distance` steps up the chain, and only there
    pub fn get_at(&self, distance: usize, name: &str) -> Result<Value, RuntimeError> {
        self.ancestors()
            .nth(distance)
            .and_then(|environment| environment.lookup(name))
            .ok_or_else(|| RuntimeError::UnboundVariable(name.to_owned()))
    }

    /// Overwrites the innermost binding of `name`. Never creates a binding.
    pub fn assign(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.ancestors().find(|environment| environment.contains(name)) {
            Some(environment) => environment.overwrite(name, value),
            None => Err(RuntimeError::UnboundVariable(name.to_owned())),
        }
    }

    pub fn assign_at(&self, distance: usize, name: &str, value: Value) -> Result<(), RuntimeError> {
        match self.ancestors().nth(distance) {
            Some(environment) => environment.overwrite(name, value),
            None => Err(RuntimeError::UnboundVariable(name.to_owned())),
        }
    }

    pub(crate) fn same_as(&self, other: &Environment) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Drops every binding of this scope
    pub(crate) fn clear(&self) {
        let bindings = std::mem::take(&mut *self.0.bindings.borrow_mut());
        drop(bindings);
    }

    fn slot_for(&self, value: Value) -> Slot {
        match value {
            Value::Closure(closure) if closure.environment.same_as(self) => Slot::SelfCapture(closure.declaration),
            value => Slot::Value(value),
        }
    }

    fn lookup(&self, name: &str) -> Option<Value> {
        self.0.bindings.borrow().get(name).map(|slot| match slot {
            Slot::Value(value) => value.clone(),
            Slot::SelfCapture(declaration) => Value::Closure(Closure::new(Rc::clone(declaration), self.clone())),
        })
    }

    fn contains(&self, name: &str) -> bool {
        self.0.bindings.borrow().contains_key(name)
    }

    fn overwrite(&self, name: &str, value: Value) -> Result<(), RuntimeError> {
        let slot = self.slot_for(value);
        let previous = match self.0.bindings.borrow_mut().get_mut(name) {
            Some(existing) => std::mem::replace(existing, slot),
            None => return Err(RuntimeError::UnboundVariable(name.to_owned())),
        };
        drop(previous);
        Ok(())
    }

    fn ancestors(&self) -> impl Iterator<Item = &Environment> {
        std::iter::successors(Some(self), |environment| environment.0.parent.as_ref())
    }
}

impl fmt::Debug for Environment {
    // Only names are printed, values may hold closures that point back here
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self.0.bindings.borrow().keys().sorted().join(", ");
        write!(f, "Environment(depth: {}, [{}])", self.depth(), names)
    }
}
