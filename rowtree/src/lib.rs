//! Declarative mapping between flat SQL result sets and nested trees
//!
//! This crate sits between an application and its database client. It binds
//! named parameters, shapes flat rows into path-addressable trees, joins
//! independently executed result sets in memory, and flattens tree-shaped
//! records back into parameter sets for write statements. It never parses or
//! builds SQL; statement text is opaque and execution happens behind the
//! [`Executor`] trait supplied by the caller.
//!
//! The read path runs through a [`Selector`]:
//!
//! ```no_run
//! # fn demo(exec: &mut dyn rowtree::Executor) -> Result<(), rowtree::MapError> {
//! use rowtree::{Selector, Transform};
//!
//! let mut sel = Selector::new(exec);
//! sel.param("id", 7i64);
//! sel.map_to("order_id", "id")?;
//! sel.map_to_with("placed", "placed", Some(Transform::FormatDate(None)))?;
//! sel.put_row_at("order", "SELECT order_id, placed FROM orders WHERE id = :id")?;
//! sel.map("line_no")?.map("order_id")?;
//! sel.on("id", "order_id", "lines")?;
//! sel.join_map_at("order", "SELECT line_no, order_id FROM lines WHERE order_id = :id")?;
//! let tree = sel.results();
//! # Ok(()) }
//! ```
//!
//! The write path runs through an [`Updater`], which reuses the same
//! mappings and transformers in the opposite direction.

pub mod error;
pub mod executor;
pub mod join;
pub mod mapping;
pub mod params;
pub mod path;
pub mod row;
pub mod selector;
pub mod transform;
pub mod tree;
pub mod updater;
pub mod value;

pub use error::MapError;
pub use executor::{ExecError, Executor, GeneratedKeys, UpdateResult};
pub use join::JoinSpec;
pub use mapping::ColumnMapping;
pub use params::ParamSet;
pub use path::{PathError, TreePath};
pub use row::Row;
pub use selector::Selector;
pub use transform::{Siblings, Transform, TransformFn};
pub use tree::{Node, Tree};
pub use updater::Updater;
pub use value::Value;
