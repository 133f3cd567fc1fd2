//! Read-path orchestration: queries, shaping, and cross-result joins

use crate::error::MapError;
use crate::executor::{ExecError, Executor};
use crate::join::{JoinSpec, join_children};
use crate::mapping::{ColumnMapping, build_tree};
use crate::params::ParamSet;
use crate::path::TreePath;
use crate::transform::Transform;
use crate::tree::{Node, Tree};
use crate::value::Value;

/// Builds a composite result tree from one or more queries
///
/// A selector owns its parameters, mappings, join specs, and the accumulated
/// result tree for the duration of one logical unit of work; it is not meant
/// to be shared. Mappings are consumed by the query that uses them and join
/// specs by the join that uses them, so both must be re-declared before every
/// statement that needs them. Bound parameters persist across statements.
pub struct Selector<'a, E: Executor + ?Sized> {
    exec: &'a mut E,
    params: ParamSet,
    mappings: Vec<ColumnMapping>,
    joins: Vec<JoinSpec>,
    results: Tree,
}

impl<'a, E: Executor + ?Sized> Selector<'a, E> {
    pub fn new(exec: &'a mut E) -> Self {
        Selector {
            exec,
            params: ParamSet::new(),
            mappings: Vec::new(),
            joins: Vec::new(),
            results: Tree::new(),
        }
    }

    /// Bind a named parameter for following statements
    pub fn param(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        self.params.set(name, value);
        self
    }

    /// Map a column to the path of the same name
    pub fn map(&mut self, column: &str) -> Result<&mut Self, MapError> {
        self.map_to_with(column, column, None)
    }

    /// Map a column to a path
    pub fn map_to(&mut self, column: &str, path: &str) -> Result<&mut Self, MapError> {
        self.map_to_with(column, path, None)
    }

    /// Map a column to the path of the same name, transformed
    pub fn map_with(&mut self, column: &str, transform: Transform) -> Result<&mut Self, MapError> {
        self.map_to_with(column, column, Some(transform))
    }

    /// Map a column to a path, optionally transformed
    pub fn map_to_with(
        &mut self,
        column: &str,
        path: &str,
        transform: Option<Transform>,
    ) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(path)?;
        self.mappings.push(ColumnMapping::new(column, path, transform));
        Ok(self)
    }

    /// Declare a join: children whose `child_key` equals a parent's
    /// `parent_key` collect into a list at `child_path` under the parent
    pub fn on(
        &mut self,
        parent_key: &str,
        child_key: &str,
        child_path: &str,
    ) -> Result<&mut Self, MapError> {
        let child_path = TreePath::parse(child_path)?;
        self.joins.push(JoinSpec::new(parent_key, child_key, child_path));
        Ok(self)
    }

    /// Execute a query returning a single scalar
    ///
    /// Mappings play no role in a scalar result but are still consumed, like
    /// every other query form.
    pub fn query_scalar(&mut self, sql: &str) -> Result<Value, MapError> {
        let value = self.exec.query_scalar(sql, &self.params)?;
        self.mappings.clear();
        Ok(value)
    }

    /// Execute a single-row query, silently yielding an empty fragment when
    /// no row matches
    pub fn query_row(&mut self, sql: &str) -> Result<Tree, MapError> {
        self.query_row_with(sql, true)
    }

    /// Execute a single-row query
    ///
    /// A no-rows result is never escalated: with `ignore_empty` it is
    /// silent, without it the detail is logged as a warning. Either way an
    /// empty fragment is returned and the mapping list is consumed.
    pub fn query_row_with(&mut self, sql: &str, ignore_empty: bool) -> Result<Tree, MapError> {
        match self.exec.query_row(sql, &self.params) {
            Ok(row) => {
                let fragment = build_tree(&self.mappings, &row);
                self.mappings.clear();
                Ok(fragment)
            }
            Err(ExecError::NotFound) => {
                if !ignore_empty {
                    log::warn!("single-row query matched no rows: {}", sql);
                }
                self.mappings.clear();
                Ok(Tree::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Execute a query, shaping every matching row through the active
    /// mappings
    pub fn query_rows(&mut self, sql: &str) -> Result<Vec<Tree>, MapError> {
        let rows = self.exec.query_rows(sql, &self.params)?;
        let fragments = rows.iter().map(|row| build_tree(&self.mappings, row)).collect();
        self.mappings.clear();
        Ok(fragments)
    }

    /// Query a scalar and store it in the result tree at `path`
    ///
    /// Storing into the result tree always uses unique-write semantics: a
    /// second store at an occupied path is [`MapError::Occupied`].
    pub fn put_scalar_at(&mut self, path: &str, sql: &str) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(path)?;
        let value = self.query_scalar(sql)?;
        self.results.put_unique(&path, value)?;
        Ok(self)
    }

    /// Query a single row and store its fragment in the result tree at `path`
    pub fn put_row_at(&mut self, path: &str, sql: &str) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(path)?;
        let fragment = self.query_row(sql)?;
        self.results.put_unique(&path, fragment)?;
        Ok(self)
    }

    /// Query all rows and store the fragment list in the result tree at `path`
    pub fn put_rows_at(&mut self, path: &str, sql: &str) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(path)?;
        let fragments = self.query_rows(sql)?;
        self.results.put_unique(&path, fragments)?;
        Ok(self)
    }

    /// Execute a child query and join its rows to the single parent tree at
    /// `parent_path` in the result tree, per the declared join specs
    ///
    /// The join spec list is consumed even when the parent is missing.
    pub fn join_map_at(&mut self, parent_path: &str, sql: &str) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(parent_path)?;
        let children = self.query_rows(sql)?;
        let specs = std::mem::take(&mut self.joins);
        match self.results.get_mut(&path) {
            Some(Node::Tree(parent)) => {
                join_children(&specs, parent, &children);
                Ok(self)
            }
            _ => Err(MapError::MissingParent {
                path: path.to_string(),
            }),
        }
    }

    /// Execute a child query and join its rows to every parent in the tree
    /// list at `parent_path` in the result tree
    pub fn join_list_at(&mut self, parent_path: &str, sql: &str) -> Result<&mut Self, MapError> {
        let path = TreePath::parse(parent_path)?;
        let children = self.query_rows(sql)?;
        let specs = std::mem::take(&mut self.joins);
        match self.results.get_mut(&path) {
            Some(Node::List(parents)) => {
                for parent in parents.iter_mut() {
                    join_children(&specs, parent, &children);
                }
                Ok(self)
            }
            _ => Err(MapError::MissingParent {
                path: path.to_string(),
            }),
        }
    }

    /// The accumulated result tree; stays owned by this selector
    pub fn results(&self) -> &Tree {
        &self.results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::UpdateResult;
    use crate::row::Row;
    use anyhow::anyhow;
    use serde_json::json;
    use std::collections::HashMap;

    /// Scripted in-memory executor: statement text keys the canned results
    #[derive(Default)]
    struct FakeExec {
        scalars: HashMap<String, Value>,
        rows: HashMap<String, Vec<serde_json::Value>>,
        calls: Vec<(String, ParamSet)>,
    }

    impl FakeExec {
        fn with_rows(sql: &str, rows: serde_json::Value) -> Self {
            let mut exec = FakeExec::default();
            exec.add_rows(sql, rows);
            exec
        }

        fn add_rows(&mut self, sql: &str, rows: serde_json::Value) {
            self.rows
                .insert(sql.to_string(), rows.as_array().unwrap().clone());
        }
    }

    impl Executor for FakeExec {
        fn query_scalar(&mut self, sql: &str, params: &ParamSet) -> Result<Value, ExecError> {
            self.calls.push((sql.to_string(), params.clone()));
            self.scalars
                .get(sql)
                .cloned()
                .ok_or(ExecError::NotFound)
        }

        fn query_row(&mut self, sql: &str, params: &ParamSet) -> Result<Row, ExecError> {
            self.calls.push((sql.to_string(), params.clone()));
            match self.rows.get(sql).and_then(|r| r.first()) {
                Some(row) => Ok(Row::from_json(row)),
                None => Err(ExecError::NotFound),
            }
        }

        fn query_rows(&mut self, sql: &str, params: &ParamSet) -> Result<Vec<Row>, ExecError> {
            self.calls.push((sql.to_string(), params.clone()));
            Ok(self
                .rows
                .get(sql)
                .map(|rows| rows.iter().map(Row::from_json).collect())
                .unwrap_or_default())
        }

        fn execute(
            &mut self,
            _sql: &str,
            _params: &ParamSet,
            _key_names: &[String],
        ) -> Result<UpdateResult, ExecError> {
            Err(ExecError::Failed(anyhow!("selector never writes")))
        }
    }

    #[test]
    fn test_query_rows_shapes_each_row() {
        let mut exec =
            FakeExec::with_rows("select", json!([{"id": 1, "nm": "A"}, {"id": 2, "nm": "B"}]));
        let mut sel = Selector::new(&mut exec);
        sel.map_to("id", "rec/id").unwrap();
        sel.map_to("nm", "rec/name").unwrap();

        let fragments = sel.query_rows("select").unwrap();
        assert_eq!(fragments.len(), 2);
        assert_eq!(fragments[0].to_json(), json!({"rec": {"id": 1, "name": "A"}}));
        assert_eq!(fragments[1].to_json(), json!({"rec": {"id": 2, "name": "B"}}));
    }

    #[test]
    fn test_mappings_are_consumed_by_the_query() {
        let mut exec = FakeExec::with_rows("select", json!([{"id": 1}]));
        let mut sel = Selector::new(&mut exec);
        sel.map("id").unwrap();

        let first = sel.query_rows("select").unwrap();
        assert_eq!(first[0].to_json(), json!({"id": 1}));

        // same query again, mapping list now empty
        let second = sel.query_rows("select").unwrap();
        assert!(second[0].is_empty());
    }

    #[test]
    fn test_query_row_empty_result_is_absorbed() {
        let mut exec = FakeExec::default();
        let mut sel = Selector::new(&mut exec);
        sel.map("id").unwrap();

        let silent = sel.query_row("select").unwrap();
        assert!(silent.is_empty());

        // logged variant behaves identically, and mappings were consumed above
        let logged = sel.query_row_with("select", false).unwrap();
        assert!(logged.is_empty());
    }

    #[test]
    fn test_query_scalar_not_found_propagates() {
        let mut exec = FakeExec::default();
        let mut sel = Selector::new(&mut exec);
        let err = sel.query_scalar("select count").unwrap_err();
        assert!(matches!(err, MapError::Exec(_)));
    }

    #[test]
    fn test_params_persist_across_statements() {
        let mut exec = FakeExec::with_rows("a", json!([{"id": 1}]));
        exec.add_rows("b", json!([{"id": 2}]));
        {
            let mut sel = Selector::new(&mut exec);
            sel.param("tenant", "acme");
            sel.query_rows("a").unwrap();
            sel.query_rows("b").unwrap();
        }
        assert_eq!(exec.calls.len(), 2);
        for (_, params) in &exec.calls {
            assert_eq!(params.get("tenant"), Some(&Value::String("acme".into())));
        }
    }

    #[test]
    fn test_put_queries_compose_result_tree() {
        let mut exec = FakeExec::default();
        exec.scalars.insert("count".into(), Value::Int(2));
        exec.add_rows("header", json!([{"id": 1, "nm": "A"}]));
        exec.add_rows("lines", json!([{"ln": 10}, {"ln": 20}]));

        let mut sel = Selector::new(&mut exec);
        sel.put_scalar_at("total", "count").unwrap();
        sel.map("id").unwrap().map_to("nm", "name").unwrap();
        sel.put_row_at("order", "header").unwrap();
        sel.map("ln").unwrap();
        sel.put_rows_at("order/lines", "lines").unwrap();

        assert_eq!(
            sel.results().to_json(),
            json!({
                "total": 2,
                "order": {"id": 1, "name": "A", "lines": [{"ln": 10}, {"ln": 20}]}
            })
        );
    }

    #[test]
    fn second_store_at_same_path_fails() {
        let mut exec = FakeExec::default();
        exec.scalars.insert("count".into(), Value::Int(1));
        let mut sel = Selector::new(&mut exec);
        sel.put_scalar_at("total", "count").unwrap();

        let err = sel.put_scalar_at("total", "count").err().unwrap();
        assert!(matches!(err, MapError::Occupied { ref path } if path == "total"));
    }

    #[test]
    fn test_join_map_at_attaches_children_to_single_parent() {
        let mut exec = FakeExec::with_rows("parent", json!([{"id": 1}]));
        exec.add_rows("children", json!([{"pid": 1, "v": "x"}, {"pid": 2, "v": "y"}]));

        let mut sel = Selector::new(&mut exec);
        sel.map("id").unwrap();
        sel.put_row_at("rec", "parent").unwrap();
        sel.map("pid").unwrap().map("v").unwrap();
        sel.on("id", "pid", "children").unwrap();
        sel.join_map_at("rec", "children").unwrap();

        assert_eq!(
            sel.results().to_json(),
            json!({"rec": {"id": 1, "children": [{"pid": 1, "v": "x"}]}})
        );
    }

    #[test]
    fn test_join_list_at_attaches_children_to_every_parent() {
        let mut exec = FakeExec::with_rows("parents", json!([{"id": 1}, {"id": 2}]));
        exec.add_rows("children", json!([{"pid": 1, "v": "x"}, {"pid": 2, "v": "y"}]));

        let mut sel = Selector::new(&mut exec);
        sel.map("id").unwrap();
        sel.put_rows_at("recs", "parents").unwrap();
        sel.map("pid").unwrap().map("v").unwrap();
        sel.on("id", "pid", "children").unwrap();
        sel.join_list_at("recs", "children").unwrap();

        assert_eq!(
            sel.results().to_json(),
            json!({"recs": [
                {"id": 1, "children": [{"pid": 1, "v": "x"}]},
                {"id": 2, "children": [{"pid": 2, "v": "y"}]}
            ]})
        );
    }

    #[test]
    fn test_join_specs_are_consumed() {
        let mut exec = FakeExec::with_rows("parent", json!([{"id": 1}]));
        exec.add_rows("children", json!([{"pid": 1}]));

        let mut sel = Selector::new(&mut exec);
        sel.map("id").unwrap();
        sel.put_row_at("rec", "parent").unwrap();
        sel.map("pid").unwrap();
        sel.on("id", "pid", "children").unwrap();
        sel.join_map_at("rec", "children").unwrap();

        // no specs left: a second join changes nothing
        sel.map("pid").unwrap();
        sel.join_map_at("rec", "children").unwrap();
        assert_eq!(
            sel.results().to_json(),
            json!({"rec": {"id": 1, "children": [{"pid": 1}]}})
        );
    }

    #[test]
    fn test_join_missing_parent_is_an_error() {
        let mut exec = FakeExec::with_rows("children", json!([{"pid": 1}]));
        let mut sel = Selector::new(&mut exec);
        sel.on("id", "pid", "children").unwrap();

        let err = sel.join_map_at("nowhere", "children").err().unwrap();
        assert!(matches!(err, MapError::MissingParent { ref path } if path == "nowhere"));
    }

    #[test]
    fn test_join_list_at_rejects_non_list_parent() {
        let mut exec = FakeExec::with_rows("parent", json!([{"id": 1}]));
        exec.add_rows("children", json!([{"pid": 1}]));

        let mut sel = Selector::new(&mut exec);
        sel.map("id").unwrap();
        sel.put_row_at("rec", "parent").unwrap();
        sel.on("id", "pid", "children").unwrap();

        let err = sel.join_list_at("rec", "children").err().unwrap();
        assert!(matches!(err, MapError::MissingParent { .. }));
    }
}
