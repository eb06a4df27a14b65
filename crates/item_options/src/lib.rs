#![cfg_attr(test, allow(unused_crate_dependencies))]
//! Sparse, definition-driven options stored as rows on a host entity.
//!
//! A host entity (anything implementing [`OptionHost`]) owns a collection of
//! `(key, value)` rows. Its type declares a [`DefinitionRegistry`] that says,
//! per key, what the default is, which empty-like values are worth a row, and
//! whether a sequence is stored as one row per value.
//!
//! - [`OptionIndex`] lazily indexes the rows by key and rejects duplicate rows
//!   for single-valued keys.
//! - [`ItemOptions`] is the query and update API every host gets: lookups by
//!   key, value resolution with defaults, and [`reconcile_option`], which
//!   applies the minimal row diff for a desired value.
//!
//! [`reconcile_option`]: ItemOptions::reconcile_option
//!
//! # Example
//!
//! ```
//! use item_options::{
//! 	DefinitionConfig, DefinitionRegistry, ItemOptions, OptionHost, OptionIndex, Row, RowSet, Value,
//! };
//!
//! struct Article {
//! 	defs: DefinitionRegistry<Article>,
//! 	rows: RowSet<Row>,
//! 	index: OptionIndex,
//! }
//!
//! impl OptionHost for Article {
//! 	type Row = Row;
//!
//! 	fn option_definitions(&self) -> &DefinitionRegistry<Self> {
//! 		&self.defs
//! 	}
//! 	fn option_rows(&self) -> &RowSet<Row> {
//! 		&self.rows
//! 	}
//! 	fn option_rows_mut(&mut self) -> &mut RowSet<Row> {
//! 		&mut self.rows
//! 	}
//! 	fn option_index(&self) -> &OptionIndex {
//! 		&self.index
//! 	}
//! 	fn option_index_mut(&mut self) -> &mut OptionIndex {
//! 		&mut self.index
//! 	}
//! }
//!
//! let defs = DefinitionRegistry::from_entries([
//! 	("tags", DefinitionConfig::new().multiple(true)),
//! 	("layout", DefinitionConfig::new().default_value("wide")),
//! ])
//! .unwrap();
//! let mut article = Article { defs, rows: RowSet::new(), index: OptionIndex::new() };
//!
//! article.reconcile_option("tags", Value::from(vec!["rust", "db"])).unwrap();
//! assert_eq!(article.option_value("tags", None).unwrap(), Value::from(vec!["rust", "db"]));
//! assert_eq!(article.option_value("layout", None).unwrap(), Value::from("wide"));
//! ```

#[cfg(feature = "bindings")]
pub mod bindings;
#[cfg(feature = "config-toml")]
pub mod config;
pub mod definition;
pub mod error;
pub mod host;
pub mod index;
pub mod reconcile;
pub mod registry;
pub mod rows;
pub mod value;

#[cfg(test)]
pub(crate) mod test_support;

#[cfg(feature = "bindings")]
pub use bindings::{FieldAccess, FieldBinding, FieldMap, FieldPath, OptionBindings};
#[cfg(feature = "config-toml")]
pub use config::{Definitions, EnumCatalog, load_registry_file, load_registry_str, parse_definitions};
pub use definition::{DefinitionConfig, OptionDefinition, PersistFlags, Requirement};
pub use error::{Error, Result};
pub use host::{ItemOptions, OptionHost};
pub use index::{KeyIndex, OptionIndex, OptionRows, Slot};
pub use reconcile::{ReconcilePlan, ReconcileReport, RowOp};
pub use registry::{DefinitionEntry, DefinitionRegistry};
pub use rows::{OptionRow, Row, RowId, RowSet};
pub use value::{EnumMember, EnumScalar, EnumType, Value};
