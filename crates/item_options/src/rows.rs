//! Option rows and the insertion-ordered collection that owns them.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::value::Value;


/// Stable, opaque position of a row inside a [`RowSet`].
///
/// Ids are never reused, so an id that outlives its row resolves to
/// nothing instead of to an unrelated row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RowId(u64);

impl RowId {
	pub const fn as_u64(self) -> u64 {
		self.0
	}
}

impl fmt::Display for RowId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "row #{}", self.0)
	}
}

/// One persisted `(key, value)` unit.
///
/// Implementors may carry more state than the key and value; reconciliation
/// only touches the value of rows it keeps.
pub trait OptionRow {
	/// Creates a row for `key` with no value.
	fn with_key(key: &str) -> Self;

	fn key(&self) -> &str;

	fn value(&self) -> &Value;

	fn set_value(&mut self, value: Value);
}

/// Plain option row.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
	pub key: String,
	pub value: Value,
}

impl Row {
	pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
		Self {
			key: key.into(),
			value: value.into(),
		}
	}
}

impl OptionRow for Row {
	fn with_key(key: &str) -> Self {
		Self {
			key: key.to_string(),
			value: Value::Null,
		}
	}

	fn key(&self) -> &str {
		&self.key
	}

	fn value(&self) -> &Value {
		&self.value
	}

	fn set_value(&mut self, value: Value) {
		self.value = value;
	}
}

/// Backing collection of a host's option rows.
///
/// Iteration follows insertion order; removal keeps the order of the
/// remaining rows.
#[derive(Clone)]
pub struct RowSet<R> {
	rows: IndexMap<RowId, R, FxBuildHasher>,
	next_id: u64,
}

impl<R> Default for RowSet<R> {
	fn default() -> Self {
		Self {
			rows: IndexMap::default(),
			next_id: 0,
		}
	}
}

impl<R> RowSet<R> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Appends a row and returns its id.
	pub fn insert(&mut self, row: R) -> RowId {
		let id = RowId(self.next_id);
		self.next_id += 1;
		self.rows.insert(id, row);
		id
	}

	pub fn remove(&mut self, id: RowId) -> Option<R> {
		self.rows.shift_remove(&id)
	}

	pub fn get(&self, id: RowId) -> Option<&R> {
		self.rows.get(&id)
	}

	pub fn get_mut(&mut self, id: RowId) -> Option<&mut R> {
		self.rows.get_mut(&id)
	}

	pub fn contains(&self, id: RowId) -> bool {
		self.rows.contains_key(&id)
	}

	pub fn iter(&self) -> impl ExactSizeIterator<Item = (RowId, &R)> {
		self.rows.iter().map(|(&id, row)| (id, row))
	}

	pub fn len(&self) -> usize {
		self.rows.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rows.is_empty()
	}
}

impl<R: fmt::Debug> fmt::Debug for RowSet<R> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_map().entries(self.rows.iter()).finish()
	}
}

impl<R> FromIterator<R> for RowSet<R> {
	fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
		let mut set = Self::new();
		for row in iter {
			set.insert(row);
		}
		set
	}
}
