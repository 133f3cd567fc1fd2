//! Ordered, path-addressable tree container for shaped query results

use indexmap::IndexMap;

use crate::error::MapError;
use crate::path::TreePath;
use crate::value::Value;

/// A node in a [`Tree`]: a scalar, a nested tree, or a list of trees
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A scalar leaf
    Value(Value),
    /// A nested tree
    Tree(Tree),
    /// A sequence of trees
    List(Vec<Tree>),
}

impl Node {
    /// Get the scalar value, if this node is one
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Get the nested tree, if this node is one
    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Node::Tree(t) => Some(t),
            _ => None,
        }
    }

    /// Get the tree list, if this node is one
    pub fn as_list(&self) -> Option<&[Tree]> {
        match self {
            Node::List(l) => Some(l),
            _ => None,
        }
    }

    /// Convert to a JSON value
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Node::Value(v) => v.to_json(),
            Node::Tree(t) => t.to_json(),
            Node::List(l) => serde_json::Value::Array(l.iter().map(Tree::to_json).collect()),
        }
    }
}

impl From<Value> for Node {
    fn from(v: Value) -> Self {
        Node::Value(v)
    }
}

impl From<Tree> for Node {
    fn from(t: Tree) -> Self {
        Node::Tree(t)
    }
}

impl From<Vec<Tree>> for Node {
    fn from(l: Vec<Tree>) -> Self {
        Node::List(l)
    }
}

/// An ordered associative container addressed by segmented paths
///
/// Intermediate path segments auto-create nested trees on write. A path may
/// terminate in a scalar, a nested tree, or a list of trees. Writes come in
/// two flavors: [`put`](Tree::put) overwrites, [`put_unique`](Tree::put_unique)
/// fails with [`MapError::Occupied`] if anything already lives at the path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Tree {
    entries: IndexMap<String, Node>,
}

impl Tree {
    /// Create an empty tree
    pub fn new() -> Self {
        Tree::default()
    }

    /// True if the tree has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of direct entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over direct entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Node)> {
        self.entries.iter()
    }

    /// Get the node under a direct key (no path traversal)
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.entries.get(key)
    }

    /// Get the scalar value under a direct key
    pub fn value(&self, key: &str) -> Option<&Value> {
        self.node(key).and_then(Node::as_value)
    }

    /// Set a direct entry, overwriting any existing one
    pub fn insert(&mut self, key: impl Into<String>, node: impl Into<Node>) {
        self.entries.insert(key.into(), node.into());
    }

    /// Get the node at a path, or `None` if any segment is absent or a
    /// non-tree intermediate blocks traversal
    pub fn get(&self, path: &TreePath) -> Option<&Node> {
        let (rest, leaf) = path.split_leaf();
        let mut current = self;
        for segment in rest {
            current = current.entries.get(segment)?.as_tree()?;
        }
        current.entries.get(leaf)
    }

    /// Get the scalar value at a path
    pub fn value_at(&self, path: &TreePath) -> Option<&Value> {
        self.get(path).and_then(Node::as_value)
    }

    /// Mutable access to the node at a path; never creates anything
    pub fn get_mut(&mut self, path: &TreePath) -> Option<&mut Node> {
        let (rest, leaf) = path.split_leaf();
        let mut current = self;
        for segment in rest {
            current = match current.entries.get_mut(segment)? {
                Node::Tree(t) => t,
                _ => return None,
            };
        }
        current.entries.get_mut(leaf)
    }

    /// Write a node at a path, overwriting whatever is there
    ///
    /// Intermediate segments auto-create nested trees; an intermediate that
    /// holds a non-tree node is displaced by a fresh tree.
    pub fn put(&mut self, path: &TreePath, node: impl Into<Node>) {
        let (rest, leaf) = path.split_leaf();
        let target = self.descend_mut(rest);
        target.entries.insert(leaf.to_string(), node.into());
    }

    /// Write a node at a path, failing if the path is already occupied
    ///
    /// Unlike [`put`](Tree::put) this never displaces anything: an existing
    /// node at the leaf, or a non-tree node blocking an intermediate segment,
    /// yields [`MapError::Occupied`].
    pub fn put_unique(&mut self, path: &TreePath, node: impl Into<Node>) -> Result<(), MapError> {
        let (rest, leaf) = path.split_leaf();
        let mut current = self;
        for segment in rest {
            let entry = current
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Node::Tree(Tree::new()));
            match entry {
                Node::Tree(t) => current = t,
                _ => {
                    return Err(MapError::Occupied {
                        path: path.to_string(),
                    });
                }
            }
        }
        if current.entries.contains_key(leaf) {
            return Err(MapError::Occupied {
                path: path.to_string(),
            });
        }
        current.entries.insert(leaf.to_string(), node.into());
        Ok(())
    }

    /// Get the list of trees at a path, creating an empty one if the path is
    /// absent or holds a non-list node (the existing node is discarded)
    pub fn list_at_mut(&mut self, path: &TreePath) -> &mut Vec<Tree> {
        let (rest, leaf) = path.split_leaf();
        let target = self.descend_mut(rest);
        let entry = target
            .entries
            .entry(leaf.to_string())
            .or_insert_with(|| Node::List(Vec::new()));
        if !matches!(entry, Node::List(_)) {
            *entry = Node::List(Vec::new());
        }
        match entry {
            Node::List(l) => l,
            _ => unreachable!(),
        }
    }

    fn descend_mut(&mut self, segments: &[String]) -> &mut Tree {
        let mut current = self;
        for segment in segments {
            let entry = current
                .entries
                .entry(segment.clone())
                .or_insert_with(|| Node::Tree(Tree::new()));
            if !matches!(entry, Node::Tree(_)) {
                *entry = Node::Tree(Tree::new());
            }
            current = match entry {
                Node::Tree(t) => t,
                _ => unreachable!(),
            };
        }
        current
    }

    /// Convert to a JSON object value
    pub fn to_json(&self) -> serde_json::Value {
        let mut map = serde_json::Map::new();
        for (key, node) in &self.entries {
            map.insert(key.clone(), node.to_json());
        }
        serde_json::Value::Object(map)
    }

    /// Build a tree from a JSON object
    ///
    /// Nested objects become nested trees, arrays become tree lists
    /// (non-object array elements are skipped), everything else becomes a
    /// scalar via [`Value::from_json`]. A non-object input yields an empty
    /// tree.
    pub fn from_json(json: &serde_json::Value) -> Self {
        let mut tree = Tree::new();
        let Some(obj) = json.as_object() else {
            return tree;
        };
        for (key, val) in obj {
            match val {
                serde_json::Value::Object(_) => {
                    tree.insert(key.clone(), Tree::from_json(val));
                }
                serde_json::Value::Array(items) => {
                    let list: Vec<Tree> = items
                        .iter()
                        .filter(|i| i.is_object())
                        .map(Tree::from_json)
                        .collect();
                    tree.insert(key.clone(), list);
                }
                _ => {
                    tree.insert(key.clone(), Value::from_json(val));
                }
            }
        }
        tree
    }
}
