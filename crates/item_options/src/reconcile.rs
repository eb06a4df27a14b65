//! Reconciliation of desired option values with stored rows.
//!
//! [`plan`] diffs the desired value against the indexed rows of one key and
//! [`apply`] carries the resulting [`RowOp`]s out through the host. Rows whose
//! value is unchanged are left alone, so any extra state they carry survives.

use crate::definition::OptionDefinition;
use crate::error::{Error, Result};
use crate::host::{ItemOptions, OptionHost};
use crate::index::Slot;
use crate::rows::{OptionRow, RowId};
use crate::value::Value;


/// One row mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum RowOp {
	/// Append a new row holding `value`.
	Insert { value: Value },
	/// Overwrite the value of an existing row in place.
	Update { row: RowId, value: Value },
	/// Remove an existing row.
	Remove { row: RowId },
}

/// Row mutations for one key, not yet applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan {
	key: String,
	ops: Vec<RowOp>,
}

impl ReconcilePlan {
	pub fn key(&self) -> &str {
		&self.key
	}

	pub fn ops(&self) -> &[RowOp] {
		&self.ops
	}

	pub fn is_empty(&self) -> bool {
		self.ops.is_empty()
	}
}

/// What an applied plan did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
	pub inserted: Vec<RowId>,
	pub updated: Vec<RowId>,
	pub removed: Vec<RowId>,
}

impl ReconcileReport {
	/// Whether rows were added or removed (and the index invalidated).
	pub fn changed_rows(&self) -> bool {
		!self.inserted.is_empty() || !self.removed.is_empty()
	}

	pub fn is_noop(&self) -> bool {
		!self.changed_rows() && self.updated.is_empty()
	}
}

/// Computes the row mutations that make `key` hold `desired`.
///
/// Fails before anything is planned if `key` is undefined or the host does
/// not meet the definition's requirements.
pub fn plan<H: OptionHost>(host: &H, key: &str, desired: Value) -> Result<ReconcilePlan> {
	host.ensure_option_allowed(key)?;
	let def = host.option_definitions().require(key)?;
	let existing = host.key_index()?.get(key);

	let ops = if def.is_multi_row() {
		let stored = match existing {
			None => Vec::new(),
			Some(Slot::Multiple(ids)) => ids
				.iter()
				.map(|&id| {
					let row = host.option_rows().get(id).ok_or_else(|| Error::MissingRow {
						key: key.to_string(),
						row: id,
					})?;
					Ok((id, row.value()))
				})
				.collect::<Result<Vec<_>>>()?,
			Some(Slot::Single(_)) => {
				return Err(Error::InconsistentMultiValue {
					key: key.to_string(),
					reason: "the stored value is a single row".to_string(),
				});
			}
		};
		plan_multiple(def, key, &stored, desired)?
	} else {
		let current = match existing {
			None => None,
			Some(Slot::Single(id)) => Some(*id),
			Some(Slot::Multiple(_)) => {
				return Err(Error::DuplicateSingleValueOption { key: key.to_string() });
			}
		};
		plan_single(def, current, desired)
	};

	Ok(ReconcilePlan {
		key: key.to_string(),
		ops,
	})
}

fn plan_single<H>(def: &OptionDefinition<H>, current: Option<RowId>, desired: Value) -> Vec<RowOp> {
	// Persistence is decided on the typed value; an enum case backed by `0`
	// or `""` is not empty-like.
	let persist = def.should_persist(&desired);
	let value = def.normalize(desired);
	match (persist, current) {
		(true, Some(row)) => vec![RowOp::Update { row, value }],
		(true, None) => vec![RowOp::Insert { value }],
		(false, Some(row)) => vec![RowOp::Remove { row }],
		(false, None) => Vec::new(),
	}
}

fn plan_multiple<H>(def: &OptionDefinition<H>, key: &str, stored: &[(RowId, &Value)], desired: Value) -> Result<Vec<RowOp>> {
	// (typed, stored form) pairs: rows are matched on the stored form, inserts
	// are filtered on the typed value.
	let mut wanted: Vec<(Value, Value)> = match desired {
		Value::Null => Vec::new(),
		Value::Seq(values) => values
			.into_iter()
			.map(|v| {
				let stored = def.normalize(v.clone());
				(v, stored)
			})
			.collect(),
		other => {
			return Err(Error::InconsistentMultiValue {
				key: key.to_string(),
				reason: format!("the desired value is {} rather than a sequence", other.type_name()),
			});
		}
	};

	if wanted.is_empty() {
		return Ok(stored.iter().map(|&(row, _)| RowOp::Remove { row }).collect());
	}

	let mut ops = Vec::new();
	for &(row, value) in stored {
		// Each stored row consumes at most one matching desired value.
		match wanted.iter().position(|(_, form)| form == value) {
			Some(pos) => {
				wanted.remove(pos);
			}
			None => ops.push(RowOp::Remove { row }),
		}
	}
	ops.extend(
		wanted
			.into_iter()
			.filter(|(typed, _)| def.should_persist(typed))
			.map(|(_, value)| RowOp::Insert { value }),
	);
	Ok(ops)
}

/// Applies `plan` to the host's rows.
///
/// Invalidates the index when rows were inserted or removed.
pub fn apply<H: OptionHost>(host: &mut H, plan: ReconcilePlan) -> Result<ReconcileReport> {
	let ReconcilePlan { key, ops } = plan;
	let mut report = ReconcileReport::default();

	let outcome = apply_ops(host, &key, ops, &mut report);
	if report.changed_rows() {
		host.reset_option_index();
	}
	outcome?;

	tracing::debug!(
		domain = "item_options",
		key = key.as_str(),
		inserted = report.inserted.len(),
		updated = report.updated.len(),
		removed = report.removed.len(),
		"reconciled option rows",
	);
	Ok(report)
}

fn apply_ops<H: OptionHost>(host: &mut H, key: &str, ops: Vec<RowOp>, report: &mut ReconcileReport) -> Result<()> {
	let missing = |row| Error::MissingRow { key: key.to_string(), row };

	for op in ops {
		match op {
			RowOp::Insert { value } => {
				let mut row = host.new_option_row(key);
				row.set_value(value);
				report.inserted.push(host.add_option_row(row));
			}
			RowOp::Update { row, value } => {
				host.option_rows_mut().get_mut(row).ok_or_else(|| missing(row))?.set_value(value);
				report.updated.push(row);
			}
			RowOp::Remove { row } => {
				host.remove_option_row(row).ok_or_else(|| missing(row))?;
				report.removed.push(row);
			}
		}
	}
	Ok(())
}
