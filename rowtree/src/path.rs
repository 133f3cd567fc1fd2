//! Segmented paths addressing locations inside a [`Tree`](crate::Tree)

use serde::{Deserialize, Serialize};

/// A path to a location in a tree, split on `/` or `.`
///
/// Examples:
/// - "name" -> a single top-level entry
/// - "rec/id" or "rec.id" -> entry "id" inside the nested tree "rec"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreePath {
    segments: Vec<String>,
}

/// Error when parsing a tree path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// Path is empty
    Empty,
    /// Path contains an empty segment
    EmptySegment,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::Empty => write!(f, "tree path cannot be empty"),
            PathError::EmptySegment => write!(f, "tree path contains empty segment"),
        }
    }
}

impl std::error::Error for PathError {}

impl TreePath {
    /// Parse a path from a string
    ///
    /// Validates that the path is not empty and contains no empty segments.
    /// `/` and `.` are interchangeable separators.
    pub fn parse(path: &str) -> Result<Self, PathError> {
        if path.is_empty() {
            return Err(PathError::Empty);
        }

        let segments: Vec<String> = path
            .split(['/', '.'])
            .map(|s| s.to_string())
            .collect();

        if segments.iter().any(|s| s.is_empty()) {
            return Err(PathError::EmptySegment);
        }

        Ok(TreePath { segments })
    }

    /// Create a single-segment path (no validation needed)
    pub fn simple(segment: impl Into<String>) -> Self {
        TreePath {
            segments: vec![segment.into()],
        }
    }

    /// Get all segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Get the leaf segment (last)
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Split into the intermediate segments and the leaf
    pub(crate) fn split_leaf(&self) -> (&[String], &str) {
        let (leaf, rest) = self.segments.split_last().expect("path is never empty");
        (rest, leaf.as_str())
    }
}

impl std::fmt::Display for TreePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl TryFrom<&str> for TreePath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        TreePath::parse(value)
    }
}

impl TryFrom<String> for TreePath {
    type Error = PathError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        TreePath::parse(&value)
    }
}
