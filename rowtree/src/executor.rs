//! The query execution port
//!
//! Statement execution is an external collaborator: implementations of
//! [`Executor`] own connections, transactions, and dialect concerns. The
//! statement text is opaque to this crate; parameters are bound by name.

use crate::params::ParamSet;
use crate::row::Row;
use crate::value::Value;

/// Error from the execution port
#[derive(Debug)]
pub enum ExecError {
    /// A single-row query matched no rows
    NotFound,
    /// Any other execution failure (connectivity, constraints, bad SQL);
    /// carried unchanged to the caller
    Failed(anyhow::Error),
}

impl std::fmt::Display for ExecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecError::NotFound => write!(f, "query returned no rows"),
            ExecError::Failed(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::NotFound => None,
            ExecError::Failed(e) => Some(e.as_ref()),
        }
    }
}

/// Outcome of a write statement
#[derive(Debug, Clone, Default)]
pub struct UpdateResult {
    /// Number of rows the statement affected
    pub rows_affected: u64,
    /// Database-generated key values, populated only when key names were
    /// requested
    pub generated_keys: Row,
}

/// Executes parameterized statements against a database
///
/// Every call is a single blocking statement execution. Implementations may
/// pool connections or participate in transactions; none of that is visible
/// here.
pub trait Executor {
    /// Execute a query expected to produce a single scalar
    fn query_scalar(&mut self, sql: &str, params: &ParamSet) -> Result<Value, ExecError>;

    /// Execute a query expected to produce a single row
    ///
    /// Must return [`ExecError::NotFound`] when no row matches.
    fn query_row(&mut self, sql: &str, params: &ParamSet) -> Result<Row, ExecError>;

    /// Execute a query producing any number of rows
    fn query_rows(&mut self, sql: &str, params: &ParamSet) -> Result<Vec<Row>, ExecError>;

    /// Execute a write statement; when `key_names` is non-empty the
    /// implementation captures the named generated-key columns
    fn execute(
        &mut self,
        sql: &str,
        params: &ParamSet,
        key_names: &[String],
    ) -> Result<UpdateResult, ExecError>;
}

/// Generated-key values captured after an insert
#[derive(Debug, Clone, Default)]
pub struct GeneratedKeys {
    keys: Row,
}

impl GeneratedKeys {
    pub(crate) fn new(keys: Row) -> Self {
        GeneratedKeys { keys }
    }

    /// Get a captured key by column name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.keys.get(name)
    }

    /// The first captured key as an `i64`
    ///
    /// Integer values convert directly; anything else is parsed from its
    /// lexical form. `None` if no key was captured or conversion fails.
    pub fn as_i64(&self) -> Option<i64> {
        let (_, value) = self.keys.iter().next()?;
        match value {
            Value::Int(i) => Some(*i),
            other => other.lexical()?.parse().ok(),
        }
    }

    /// The first captured key as an `i32`
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|i| i32::try_from(i).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_keys_first_key_coercion() {
        let mut row = Row::new();
        row.set("id", 41i64);
        row.set("other", "x");
        let keys = GeneratedKeys::new(row);
        assert_eq!(keys.as_i64(), Some(41));
        assert_eq!(keys.as_i32(), Some(41));
        assert_eq!(keys.get("other"), Some(&Value::String("x".into())));
    }

    #[test]
    fn test_generated_keys_lexical_fallback() {
        let mut row = Row::new();
        row.set("id", "77");
        let keys = GeneratedKeys::new(row);
        assert_eq!(keys.as_i64(), Some(77));

        let empty = GeneratedKeys::default();
        assert_eq!(empty.as_i64(), None);
    }
}
