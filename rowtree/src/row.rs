//! Raw result rows as returned by the execution port

use indexmap::IndexMap;

use crate::value::Value;

/// An ordered column-name to value record for a single result row
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    /// Create an empty row
    pub fn new() -> Self {
        Row::default()
    }

    /// Get the value under a column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Set a column value, overwriting any existing one
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.columns.insert(column.into(), value.into());
    }

    /// True if the row has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Iterate over columns in result-set order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }

    /// Build a row from a JSON object; nested values are flattened to their
    /// scalar form via [`Value::from_json`]
    pub fn from_json(json: &serde_json::Value) -> Self {
        let mut row = Row::new();
        if let Some(obj) = json.as_object() {
            for (column, value) in obj {
                row.set(column.clone(), Value::from_json(value));
            }
        }
        row
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Row {
            columns: iter.into_iter().collect(),
        }
    }
}
