//! The host entity boundary and the option API every host gets.

use smallvec::smallvec;

use crate::error::{Error, Result};
use crate::index::{KeyIndex, OptionIndex, OptionRows, Slot};
use crate::reconcile::{self, ReconcileReport};
use crate::registry::DefinitionRegistry;
use crate::rows::{OptionRow, RowId, RowSet};
use crate::value::Value;


/// An entity that carries options as rows.
///
/// Implementors own the row collection and an [`OptionIndex`] cache for it,
/// and hand out the definitions of their type. The row hooks can be
/// overridden to keep other bookkeeping (ORM state, audit trails) in sync.
pub trait OptionHost: Sized {
	type Row: OptionRow;

	/// Definitions for this host type, usually memoized per type.
	fn option_definitions(&self) -> &DefinitionRegistry<Self>;

	fn option_rows(&self) -> &RowSet<Self::Row>;

	fn option_rows_mut(&mut self) -> &mut RowSet<Self::Row>;

	fn option_index(&self) -> &OptionIndex;

	fn option_index_mut(&mut self) -> &mut OptionIndex;

	/// Creates an unattached row for `key`.
	fn new_option_row(&self, key: &str) -> Self::Row {
		Self::Row::with_key(key)
	}

	/// Appends a row to the collection.
	fn add_option_row(&mut self, row: Self::Row) -> RowId {
		self.option_rows_mut().insert(row)
	}

	/// Removes a row from the collection.
	fn remove_option_row(&mut self, id: RowId) -> Option<Self::Row> {
		self.option_rows_mut().remove(id)
	}
}

/// Option queries and updates, provided for every [`OptionHost`].
pub trait ItemOptions: OptionHost {
	/// Returns the built index, building it on first use.
	fn key_index(&self) -> Result<&KeyIndex> {
		self.option_index()
			.get_or_build(self.option_rows(), self.option_definitions())
	}

	/// Whether at least one row is stored for `key`.
	fn has_option(&self, key: &str) -> Result<bool> {
		Ok(self.key_index()?.contains(key))
	}

	/// Whether any (or, with `require_all`, every) key has a row.
	///
	/// An empty key list yields `require_all`.
	fn has_options<'k>(&self, keys: impl IntoIterator<Item = &'k str>, require_all: bool) -> Result<bool> {
		let index = self.key_index()?;
		let mut keys = keys.into_iter();
		Ok(if require_all {
			keys.all(|key| index.contains(key))
		} else {
			keys.any(|key| index.contains(key))
		})
	}

	/// The row(s) stored for `key`, if any.
	fn option(&self, key: &str) -> Result<Option<OptionRows<'_, Self::Row>>> {
		match self.key_index()?.get(key) {
			Some(slot) => OptionRows::resolve(self.option_rows(), key, slot).map(Some),
			None => Ok(None),
		}
	}

	/// The row(s) stored for `key`, appending an empty row when there is none.
	///
	/// Appending invalidates the index, so the next read sees the new row. A
	/// new row of a multi-row option comes back as a one-element list, the
	/// same shape later reads return.
	fn option_or_create(&mut self, key: &str) -> Result<OptionRows<'_, Self::Row>> {
		let existing = self.key_index()?.get(key).cloned();
		let slot = match existing {
			Some(slot) => slot,
			None => {
				let multi = self.option_definitions().get(key).is_some_and(|def| def.is_multi_row());
				let row = self.new_option_row(key);
				let id = self.add_option_row(row);
				self.reset_option_index();
				if multi {
					Slot::Multiple(smallvec![id])
				} else {
					Slot::Single(id)
				}
			}
		};
		OptionRows::resolve(self.option_rows(), key, &slot)
	}

	/// The stored value for `key`, restored through its definition.
	///
	/// Multi-row options yield a sequence in collection order. When nothing
	/// is stored, `fallback` is returned if given, else the definition's
	/// default, else null.
	fn option_value(&self, key: &str, fallback: Option<Value>) -> Result<Value> {
		let def = self.option_definitions().get(key);
		let restore = |value: Value| match def {
			Some(def) => def.denormalize(value),
			None => value,
		};

		match self.option(key)? {
			Some(OptionRows::Single(row)) => Ok(restore(row.value().clone())),
			Some(OptionRows::Multiple(rows)) => Ok(Value::Seq(rows.into_iter().map(|row| restore(row.value().clone())).collect())),
			None => Ok(fallback.unwrap_or_else(|| def.map_or(Value::Null, |def| def.default_value()))),
		}
	}

	/// Drops the index. Required after mutating rows outside this trait.
	fn reset_option_index(&mut self) {
		self.option_index_mut().reset();
	}

	/// Reconciles the rows of `key` with `desired`.
	///
	/// Multi-row options take a sequence (or null for "none"); single-row
	/// options take any value.
	fn reconcile_option(&mut self, key: &str, desired: Value) -> Result<ReconcileReport> {
		let plan = reconcile::plan(self, key, desired)?;
		reconcile::apply(self, plan)
	}

	/// Fails unless `key` is defined and this host meets its requirements.
	fn ensure_option_allowed(&self, key: &str) -> Result<()> {
		let def = self.option_definitions().require(key)?;
		if !def.meets_requirements(self) {
			return Err(Error::IneligibleHost { key: key.to_string() });
		}
		Ok(())
	}
}

impl<H: OptionHost> ItemOptions for H {}
