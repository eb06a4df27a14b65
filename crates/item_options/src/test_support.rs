//! Shared fixtures for unit tests.

use crate::definition::{DefinitionConfig, PersistFlags};
use crate::host::OptionHost;
use crate::index::OptionIndex;
use crate::registry::DefinitionRegistry;
use crate::rows::{Row, RowSet};
use crate::value::Value;

/// Host with its own registry and a flag requirement predicates can test.
pub struct TestHost {
	pub defs: DefinitionRegistry<TestHost>,
	pub rows: RowSet<Row>,
	pub index: OptionIndex,
	pub premium: bool,
}

impl TestHost {
	pub fn new(defs: DefinitionRegistry<TestHost>) -> Self {
		Self {
			defs,
			rows: RowSet::new(),
			index: OptionIndex::new(),
			premium: false,
		}
	}

	/// Host over the [`sample_registry`] holding `rows`.
	pub fn with_rows<'a>(rows: impl IntoIterator<Item = (&'a str, Value)>) -> Self {
		let mut host = Self::new(sample_registry());
		for (key, value) in rows {
			host.rows.insert(Row::new(key, value));
		}
		host
	}

	pub fn values_of(&self, key: &str) -> Vec<Value> {
		self.rows
			.iter()
			.filter(|(_, row)| row.key == key)
			.map(|(_, row)| row.value.clone())
			.collect()
	}
}

impl OptionHost for TestHost {
	type Row = Row;

	fn option_definitions(&self) -> &DefinitionRegistry<Self> {
		&self.defs
	}

	fn option_rows(&self) -> &RowSet<Row> {
		&self.rows
	}

	fn option_rows_mut(&mut self) -> &mut RowSet<Row> {
		&mut self.rows
	}

	fn option_index(&self) -> &OptionIndex {
		&self.index
	}

	fn option_index_mut(&mut self) -> &mut OptionIndex {
		&mut self.index
	}
}

/// `layout` (single, default "wide"), `tags` (multi), `visible` (single,
/// persists false) and `badge` (single, premium hosts only).
pub fn sample_registry() -> DefinitionRegistry<TestHost> {
	DefinitionRegistry::from_entries([
		("layout", DefinitionConfig::new().default_value("wide")),
		("tags", DefinitionConfig::new().multiple(true)),
		("visible", DefinitionConfig::new().allow(PersistFlags::FALSE)),
		("badge", DefinitionConfig::new().requirement(|host: &TestHost| host.premium)),
	])
	.expect("sample registry is valid")
}
