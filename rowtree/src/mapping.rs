//! Column ⇄ path mappings and the row/record shaping they drive
//!
//! A single mapping list is read in two directions. Shaping a query result
//! reads `column` from the raw row and writes into the fragment at `path`;
//! building write parameters reads `path` from the application record and
//! binds under the parameter name `column`.

use crate::params::ParamSet;
use crate::path::TreePath;
use crate::row::Row;
use crate::transform::{Siblings, Transform};
use crate::tree::Tree;
use crate::value::Value;

/// A declared binding between a column (or parameter name) and a tree path
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMapping {
    /// Location in the fragment (read) or in the source record (write)
    pub path: TreePath,
    /// Column name (read) or parameter name (write)
    pub column: String,
    /// Optional transformer applied to the value in either direction
    pub transform: Option<Transform>,
}

impl ColumnMapping {
    pub fn new(column: impl Into<String>, path: TreePath, transform: Option<Transform>) -> Self {
        ColumnMapping {
            path,
            column: column.into(),
            transform,
        }
    }
}

/// Shape one raw row into a tree fragment (read direction)
///
/// Values are written with overwrite semantics; sibling mappings may target
/// nearby paths of the same fragment. A column absent from the row reads as
/// null; with no transformer declared such a column is skipped entirely,
/// while a transformer always runs (it may synthesize a value from nothing)
/// and its result is written even when null. An empty mapping list yields an
/// empty fragment.
pub fn build_tree(mappings: &[ColumnMapping], row: &Row) -> Tree {
    let mut fragment = Tree::new();
    for mapping in mappings {
        let raw = row.get(&mapping.column);
        match &mapping.transform {
            Some(transform) => {
                let input = raw.cloned().unwrap_or(Value::Null);
                let value = transform.apply(&input, &Siblings::Row(row));
                fragment.put(&mapping.path, value);
            }
            None => {
                if let Some(value) = raw {
                    fragment.put(&mapping.path, value.clone());
                }
            }
        }
    }
    fragment
}

/// Flatten one application record into a parameter set (write direction)
///
/// The value is read from the record at `path` (absent reads as null),
/// transformed with the record itself as sibling context, and bound under
/// the parameter name `column`. Every mapping binds a parameter, null or
/// not, so statements always see their full parameter set.
pub fn build_params(mappings: &[ColumnMapping], record: &Tree) -> ParamSet {
    let mut params = ParamSet::new();
    for mapping in mappings {
        let raw = record
            .value_at(&mapping.path)
            .cloned()
            .unwrap_or(Value::Null);
        let value = match &mapping.transform {
            Some(transform) => transform.apply(&raw, &Siblings::Record(record)),
            None => raw,
        };
        params.set(mapping.column.clone(), value);
    }
    params
}
