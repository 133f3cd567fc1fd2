//! Equality joins attaching child result sets under parent trees

use crate::path::TreePath;
use crate::tree::Tree;

/// Declares how children of an independently executed query attach to parents
#[derive(Debug, Clone, PartialEq)]
pub struct JoinSpec {
    /// Key read from each parent tree
    pub parent_key: String,
    /// Key read from each candidate child tree
    pub child_key: String,
    /// Path under the parent where matched children collect as a list
    pub child_path: TreePath,
}

impl JoinSpec {
    pub fn new(
        parent_key: impl Into<String>,
        child_key: impl Into<String>,
        child_path: TreePath,
    ) -> Self {
        JoinSpec {
            parent_key: parent_key.into(),
            child_key: child_key.into(),
            child_path,
        }
    }
}

/// Attach matching children to one parent for every join spec
///
/// Specs apply independently and additively in declaration order. For each
/// spec: a list is ensured at `child_path` (an existing non-list node there
/// is discarded), then every child whose `child_key` value is non-null and
/// key-equal to the parent's `parent_key` value is appended. Key equality is
/// [`Value::key_eq`](crate::Value::key_eq): nulls never match and mixed-type
/// keys compare by lexical form. A full scan per parent and spec; join
/// inputs are modest in-memory result sets, not bulk data.
pub fn join_children(specs: &[JoinSpec], parent: &mut Tree, children: &[Tree]) {
    for spec in specs {
        let parent_value = parent.value(&spec.parent_key).cloned();
        let matched: Vec<Tree> = match &parent_value {
            Some(pv) if !pv.is_null() => children
                .iter()
                .filter(|child| {
                    child
                        .value(&spec.child_key)
                        .is_some_and(|cv| cv.key_eq(pv))
                })
                .cloned()
                .collect(),
            _ => Vec::new(),
        };
        log::debug!(
            "join {}={} attached {} children at {}",
            spec.parent_key,
            spec.child_key,
            matched.len(),
            spec.child_path
        );
        let list = parent.list_at_mut(&spec.child_path);
        list.extend(matched);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn path(s: &str) -> TreePath {
        TreePath::parse(s).unwrap()
    }

    fn trees(json: serde_json::Value) -> Vec<Tree> {
        json.as_array().unwrap().iter().map(Tree::from_json).collect()
    }

    #[test]
    fn test_join_attaches_matching_children() {
        let mut parent = Tree::from_json(&json!({"id": 1}));
        let children = trees(json!([{"pid": 1, "v": "x"}, {"pid": 2, "v": "y"}]));
        let specs = vec![JoinSpec::new("id", "pid", path("children"))];

        join_children(&specs, &mut parent, &children);
        assert_eq!(
            parent.to_json(),
            json!({"id": 1, "children": [{"pid": 1, "v": "x"}]})
        );
    }

    #[test]
    fn test_join_no_matches_still_creates_empty_list() {
        let mut parent = Tree::from_json(&json!({"id": 9}));
        let children = trees(json!([{"pid": 1, "v": "x"}]));
        let specs = vec![JoinSpec::new("id", "pid", path("children"))];

        join_children(&specs, &mut parent, &children);
        assert_eq!(parent.to_json(), json!({"id": 9, "children": []}));
    }

    #[test]
    fn test_join_null_keys_never_match() {
        let mut parent = Tree::from_json(&json!({"id": null}));
        let children = trees(json!([{"pid": null, "v": "x"}]));
        let specs = vec![JoinSpec::new("id", "pid", path("children"))];

        join_children(&specs, &mut parent, &children);
        assert_eq!(parent.to_json(), json!({"id": null, "children": []}));
    }

    #[test]
    fn test_join_displaces_non_list_at_child_path() {
        let mut parent = Tree::from_json(&json!({"id": 1, "children": "stale"}));
        let children = trees(json!([{"pid": 1, "v": "x"}]));
        let specs = vec![JoinSpec::new("id", "pid", path("children"))];

        join_children(&specs, &mut parent, &children);
        assert_eq!(
            parent.to_json(),
            json!({"id": 1, "children": [{"pid": 1, "v": "x"}]})
        );
    }

    #[test]
    fn mixed_type_keys_join_by_lexical_form() {
        let mut parent = Tree::from_json(&json!({"id": 1}));
        let children = trees(json!([{"pid": "1", "v": "x"}, {"pid": "01", "v": "y"}]));
        let specs = vec![JoinSpec::new("id", "pid", path("children"))];

        join_children(&specs, &mut parent, &children);
        assert_eq!(
            parent.to_json(),
            json!({"id": 1, "children": [{"pid": "1", "v": "x"}]})
        );
    }

    #[test]
    fn test_independent_specs_are_order_insensitive() {
        let children = trees(json!([
            {"pid": 1, "kind": "a"},
            {"owner": 1, "kind": "b"}
        ]));
        let forward = vec![
            JoinSpec::new("id", "pid", path("as")),
            JoinSpec::new("id", "owner", path("bs")),
        ];
        let reversed: Vec<JoinSpec> = forward.iter().rev().cloned().collect();

        let mut left = Tree::from_json(&json!({"id": 1}));
        let mut right = Tree::from_json(&json!({"id": 1}));
        join_children(&forward, &mut left, &children);
        join_children(&reversed, &mut right, &children);

        // disjoint child paths: declaration order does not change the result
        assert_eq!(left.to_json()["as"], right.to_json()["as"]);
        assert_eq!(left.to_json()["bs"], right.to_json()["bs"]);
    }

    #[test]
    fn test_child_matching_multiple_parents_is_cloned() {
        let children = trees(json!([{"pid": 1, "v": "x"}]));
        let specs = vec![JoinSpec::new("id", "pid", path("children"))];

        let mut first = Tree::from_json(&json!({"id": 1}));
        let mut second = Tree::from_json(&json!({"id": 1}));
        join_children(&specs, &mut first, &children);
        join_children(&specs, &mut second, &children);

        assert_eq!(first.to_json()["children"], second.to_json()["children"]);
    }
}
