//! Write-path orchestration: single updates, upserts, and batched writes

use crate::error::MapError;
use crate::executor::{Executor, GeneratedKeys};
use crate::mapping::{ColumnMapping, build_params};
use crate::params::ParamSet;
use crate::path::TreePath;
use crate::transform::{Siblings, Transform};
use crate::tree::Tree;
use crate::value::Value;

/// Executes write statements from bound parameters and mapped records
///
/// Like the selector, an updater owns its mutable state for one logical unit
/// of work. Mappings are consumed by the statement that uses them; bound
/// parameters persist. Row-count expectations surface as booleans, never as
/// errors — the caller decides whether a mismatch is fatal.
pub struct Updater<'a, E: Executor + ?Sized> {
    exec: &'a mut E,
    params: ParamSet,
    mappings: Vec<ColumnMapping>,
    key_names: Vec<String>,
    keys: Option<GeneratedKeys>,
}

impl<'a, E: Executor + ?Sized> Updater<'a, E> {
    pub fn new(exec: &'a mut E) -> Self {
        Updater {
            exec,
            params: ParamSet::new(),
            mappings: Vec::new(),
            key_names: Vec::new(),
            keys: None,
        }
    }

    /// Bind a named parameter for following statements
    pub fn param(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.params.set(name, value);
        self
    }

    /// Bind a named parameter, transformed first with an empty sibling
    /// context
    pub fn param_with(
        &mut self,
        name: &str,
        value: impl Into<Value>,
        transform: &Transform,
    ) -> &mut Self {
        let value = transform.apply(&value.into(), &Siblings::Empty);
        self.params.set(name, value);
        self
    }

    /// Map a record path to the parameter of the same name
    pub fn map(&mut self, name: &str) -> Result<&mut Self, MapError> {
        self.map_to_with(name, name, None)
    }

    /// Map a record path to a parameter name
    pub fn map_to(&mut self, name: &str, path: &str) -> Result<&mut Self, MapError> {
        self.map_to_with(name, path, None)
    }

    /// Map a record path to the parameter of the same name, transformed
    pub fn map_with(&mut self, name: &str, transform: Transform) -> Result<&mut Self, MapError> {
        self.map_to_with(name, name, Some(transform))
    }

    /// Map a record path to a parameter name, optionally transformed
    pub fn map_to_with(
        &mut self,
        name: &str,
        path: &str,
        transform: Option<Transform>,
    ) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(path)?;
        self.mappings.push(ColumnMapping::new(name, path, transform));
        Ok(self)
    }

    /// Declare a generated-key column to capture from the next insert
    pub fn key(&mut self, name: &str) -> &mut Self {
        self.key_names.push(name.to_string());
        self
    }

    /// Keys captured by the last keyed statement
    pub fn generated_keys(&self) -> Option<&GeneratedKeys> {
        self.keys.as_ref()
    }

    /// The first captured key as an `i64`
    pub fn key_as_i64(&self) -> Option<i64> {
        self.keys.as_ref().and_then(GeneratedKeys::as_i64)
    }

    /// The first captured key as an `i32`
    pub fn key_as_i32(&self) -> Option<i32> {
        self.keys.as_ref().and_then(GeneratedKeys::as_i32)
    }

    /// Execute a write statement with the bound parameters
    ///
    /// Declared generated-key names are passed along, the captured keys are
    /// stored for retrieval, and the key-name list is cleared. The mapping
    /// list is consumed whether or not the statement used it.
    pub fn execute(&mut self, sql: &str) -> Result<u64, MapError> {
        self.mappings.clear();
        let params = self.params.clone();
        self.run(sql, &params)
    }

    /// Execute and report whether exactly `expected` rows were affected
    pub fn execute_expecting(&mut self, sql: &str, expected: u64) -> Result<bool, MapError> {
        Ok(self.execute(sql)? == expected)
    }

    /// Update-then-insert fallback
    ///
    /// Runs the update statement; exactly one affected row is success. Zero
    /// affected rows falls back to the insert statement, which must itself
    /// affect exactly one row. An update touching multiple rows is a failure
    /// outright and the insert is never attempted. Not an atomic upsert:
    /// concurrent writers racing both statements are the caller's concern.
    pub fn upsert(&mut self, update_sql: &str, insert_sql: &str) -> Result<bool, MapError> {
        match self.execute(update_sql)? {
            1 => Ok(true),
            0 => Ok(self.execute(insert_sql)? == 1),
            _ => Ok(false),
        }
    }

    /// Execute the statement once per record, best effort
    ///
    /// Each record gets a fresh parameter set built from the active mappings,
    /// merged with the globally bound parameters; a name collision between
    /// the two is [`MapError::ParamCollision`]. Every record requires exactly
    /// one affected row. A failing record does not halt the rest; the result
    /// is true only when every record succeeded. Port failures are errors
    /// and propagate immediately.
    pub fn execute_batch(&mut self, sql: &str, records: &[Tree]) -> Result<bool, MapError> {
        let mappings = std::mem::take(&mut self.mappings);
        let mut success = true;
        for record in records {
            let mut params = build_params(&mappings, record);
            params.merge_unique(&self.params)?;
            let count = self.run(sql, &params)?;
            success = success && count == 1;
        }
        Ok(success)
    }

    fn run(&mut self, sql: &str, params: &ParamSet) -> Result<u64, MapError> {
        log::debug!("executing statement with {} parameters", params.len());
        let result = self.exec.execute(sql, params, &self.key_names)?;
        if !self.key_names.is_empty() {
            self.keys = Some(GeneratedKeys::new(result.generated_keys));
            self.key_names.clear();
        }
        Ok(result.rows_affected)
    }
}
