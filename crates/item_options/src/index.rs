//! Lazy key → row index over a host's option rows.
//!
//! The index is a per-host cache. It is built on first read, dropped by
//! [`OptionIndex::reset`] whenever rows are inserted or removed, and rebuilt
//! on the next read.

use std::cell::OnceCell;

use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use crate::error::{Error, Result};
use crate::registry::DefinitionRegistry;
use crate::rows::{OptionRow, RowId, RowSet};
use crate::value::Value;


/// Where the rows of one key live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
	/// One row holding the whole value.
	Single(RowId),
	/// One row per value, in collection order.
	Multiple(SmallVec<[RowId; 4]>),
}

impl Slot {
	pub fn rows(&self) -> &[RowId] {
		match self {
			Slot::Single(id) => std::slice::from_ref(id),
			Slot::Multiple(ids) => ids,
		}
	}
}

/// A built key → [`Slot`] map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
	slots: FxHashMap<String, Slot>,
}

impl KeyIndex {
	/// Scans `rows` once, in collection order.
	///
	/// A key whose definition is multi-row always gets a list. A repeated key
	/// whose definition is single-row fails with
	/// [`Error::DuplicateSingleValueOption`]. A repeated key with no
	/// definition at all is tolerated as a list.
	pub fn build<H, R: OptionRow>(rows: &RowSet<R>, registry: &DefinitionRegistry<H>) -> Result<Self> {
		let mut slots: FxHashMap<String, Slot> = FxHashMap::default();

		for (id, row) in rows.iter() {
			let key = row.key();
			let def = registry.get(key);

			match slots.get_mut(key) {
				None => {
					let slot = if def.is_some_and(|d| d.is_multi_row()) {
						Slot::Multiple(smallvec![id])
					} else {
						Slot::Single(id)
					};
					slots.insert(key.to_string(), slot);
				}
				Some(slot) => match *slot {
					Slot::Multiple(ref mut ids) => ids.push(id),
					Slot::Single(first) => {
						if def.is_some_and(|d| !d.is_multi_row()) {
							return Err(Error::DuplicateSingleValueOption { key: key.to_string() });
						}
						// Compatibility: options without a definition may repeat.
						tracing::warn!(
							domain = "item_options",
							key,
							"multiple rows for an undefined option; indexing them as a list",
						);
						*slot = Slot::Multiple(smallvec![first, id]);
					}
				},
			}
		}

		tracing::debug!(domain = "item_options", rows = rows.len(), keys = slots.len(), "built option index");
		Ok(Self { slots })
	}

	pub fn get(&self, key: &str) -> Option<&Slot> {
		self.slots.get(key)
	}

	pub fn contains(&self, key: &str) -> bool {
		self.slots.contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}
}

/// Cached [`KeyIndex`] of one host instance.
///
/// Not shared between threads; the host owning it serializes access.
#[derive(Debug, Clone, Default)]
pub struct OptionIndex {
	built: OnceCell<KeyIndex>,
}

impl OptionIndex {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn is_built(&self) -> bool {
		self.built.get().is_some()
	}

	/// Returns the cached index, building it first if needed.
	pub fn get_or_build<H, R: OptionRow>(&self, rows: &RowSet<R>, registry: &DefinitionRegistry<H>) -> Result<&KeyIndex> {
		if let Some(index) = self.built.get() {
			return Ok(index);
		}
		let index = KeyIndex::build(rows, registry)?;
		Ok(self.built.get_or_init(|| index))
	}

	/// Drops the cached index; the next read rebuilds it.
	pub fn reset(&mut self) {
		if self.built.take().is_some() {
			tracing::debug!(domain = "item_options", "option index invalidated");
		}
	}
}

/// Rows stored for one key.
#[derive(Debug)]
pub enum OptionRows<'a, R> {
	Single(&'a R),
	Multiple(Vec<&'a R>),
}

impl<'a, R: OptionRow> OptionRows<'a, R> {
	/// Resolves `slot` against the live collection.
	pub(crate) fn resolve(rows: &'a RowSet<R>, key: &str, slot: &Slot) -> Result<Self> {
		let fetch = |id: RowId| {
			rows.get(id).ok_or_else(|| Error::MissingRow {
				key: key.to_string(),
				row: id,
			})
		};
		Ok(match slot {
			Slot::Single(id) => OptionRows::Single(fetch(*id)?),
			Slot::Multiple(ids) => OptionRows::Multiple(ids.iter().map(|&id| fetch(id)).collect::<Result<_>>()?),
		})
	}

	pub fn iter(&self) -> impl Iterator<Item = &'a R> + '_ {
		let rows: &[&'a R] = match self {
			OptionRows::Single(row) => std::slice::from_ref(row),
			OptionRows::Multiple(rows) => rows,
		};
		rows.iter().copied()
	}

	pub fn len(&self) -> usize {
		match self {
			OptionRows::Single(_) => 1,
			OptionRows::Multiple(rows) => rows.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// The stored value: the row value, or a sequence of row values.
	pub fn value(&self) -> Value {
		match self {
			OptionRows::Single(row) => row.value().clone(),
			OptionRows::Multiple(rows) => Value::Seq(rows.iter().map(|row| row.value().clone()).collect()),
		}
	}
}
