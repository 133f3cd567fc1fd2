//! Crate error type

use crate::executor::ExecError;
use crate::path::PathError;

/// Error from mapping, joining, and statement orchestration
#[derive(Debug)]
pub enum MapError {
    /// A path string failed to parse
    Path(PathError),
    /// A unique write targeted a path that already holds a value
    Occupied { path: String },
    /// A join targeted a parent path that is absent or not of the expected
    /// shape (a tree for map joins, a tree list for list joins)
    MissingParent { path: String },
    /// A per-record batch parameter collided with a globally bound parameter
    ParamCollision { name: String },
    /// The execution port failed; the underlying detail is carried unchanged
    Exec(anyhow::Error),
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::Path(e) => write!(f, "{}", e),
            MapError::Occupied { path } => {
                write!(f, "path '{}' already holds a value", path)
            }
            MapError::MissingParent { path } => {
                write!(f, "no joinable parent at path '{}'", path)
            }
            MapError::ParamCollision { name } => {
                write!(f, "parameter '{}' bound both globally and per record", name)
            }
            MapError::Exec(e) => write!(f, "statement execution failed: {}", e),
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::Path(e) => Some(e),
            MapError::Exec(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}

impl From<PathError> for MapError {
    fn from(e: PathError) -> Self {
        MapError::Path(e)
    }
}

impl From<ExecError> for MapError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Failed(err) => MapError::Exec(err),
            ExecError::NotFound => MapError::Exec(anyhow::anyhow!("query returned no rows")),
        }
    }
}
