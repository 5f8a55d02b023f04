use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::interpreter::value::core::Value;

/// A lexical environment: a set of bindings plus an optional parent frame.
///
/// Environments are reference counted and interior mutable because closures
/// capture their defining frame by reference and may outlive the call that
/// created it. Lookup walks the parent chain; plain assignment always writes
/// to the current frame.
#[derive(Debug, Default)]
pub struct Env {
    parent: Option<Rc<Env>>,
    vars:   RefCell<HashMap<String, Value>>,
}

impl Env {
    /// Creates a fresh environment with the given parent frame.
    #[must_use]
    pub fn new(parent: Option<Rc<Env>>) -> Rc<Self> {
        Rc::new(Self { parent,
                       vars: RefCell::new(HashMap::new()) })
    }

    /// The parent frame, if any.
    #[must_use]
    pub fn parent(&self) -> Option<&Rc<Env>> {
        self.parent.as_ref()
    }

    /// Looks a name up, walking the parent chain.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.vars.borrow().get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref()?.get(name)
    }

    /// Looks a name up in this frame only.
    #[must_use]
    pub fn get_local(&self, name: &str) -> Option<Value> {
        self.vars.borrow().get(name).cloned()
    }

    /// Binds a name in this frame.
    pub fn set_local(&self, name: impl Into<String>, value: Value) {
        self.vars.borrow_mut().insert(name.into(), value);
    }

    /// Binds a name in this frame; `<-` semantics.
    pub fn assign(&self, name: &str, value: Value) {
        self.set_local(name, value);
    }

    /// `<<-` semantics: writes to the nearest enclosing frame that already
    /// defines the name, else to the topmost frame.
    pub fn assign_super(&self, name: &str, value: Value) {
        let mut env = self.parent.clone();
        while let Some(e) = env {
            if e.vars.borrow().contains_key(name) {
                e.vars.borrow_mut().insert(name.to_string(), value);
                return;
            }
            env = e.parent.clone();
        }
        let mut top: &Self = self;
        while let Some(p) = top.parent.as_deref() {
            top = p;
        }
        top.vars.borrow_mut().insert(name.to_string(), value);
    }
}
