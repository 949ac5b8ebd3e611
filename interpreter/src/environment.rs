use std::collections::{hash_map, BTreeMap, HashMap};

use crate::{RuntimeError, Value};

/// The single, flat variable scope of an interpreter.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Environment {
    vars: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<&Value> {
        self.vars.get(identifier)
    }

    pub(crate) fn lookup(&self, identifier: &str) -> Result<Value, RuntimeError> {
        self.vars
            .get(identifier)
            .cloned()
            .ok_or_else(|| RuntimeError::UndefinedVariable {
                name: identifier.to_string(),
            })
    }

    /// Creates the binding on first use, overwrites it afterwards.
    pub(crate) fn assign(&mut self, identifier: &str, value: Value) {
        self.vars.insert(identifier.to_string(), value);
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, String, Value> {
        self.vars.iter()
    }

    /// A copy of every binding, ordered by name.
    pub fn snapshot(&self) -> BTreeMap<String, Value> {
        self.vars
            .iter()
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect()
    }
}
