//! Named parameter sets bound to statements before execution

use indexmap::IndexMap;

use crate::error::MapError;
use crate::value::Value;

/// A set of named parameters for a single statement execution
///
/// Parameter sets persist across statements on a Selector or Updater; they
/// are never auto-reset, so bound values can be reused by the next statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParamSet {
    values: IndexMap<String, Value>,
}

impl ParamSet {
    /// Create an empty parameter set
    pub fn new() -> Self {
        ParamSet::default()
    }

    /// Bind a parameter, overwriting any existing binding of the same name
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(name.into(), value.into());
    }

    /// Get a bound parameter by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Merge all bindings from `other`, failing on any name collision
    ///
    /// Neither side silently wins: a collision between an existing binding
    /// and an incoming one is reported as [`MapError::ParamCollision`] and
    /// nothing past the colliding name is merged.
    pub fn merge_unique(&mut self, other: &ParamSet) -> Result<(), MapError> {
        for (name, value) in &other.values {
            if self.values.contains_key(name) {
                return Err(MapError::ParamCollision { name: name.clone() });
            }
            self.values.insert(name.clone(), value.clone());
        }
        Ok(())
    }

    /// True if no parameters are bound
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Number of bound parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Iterate over bindings
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }
}
