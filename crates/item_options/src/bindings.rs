//! Bindings between option keys and input fields.
//!
//! An [`OptionBindings`] set moves values between a host's options and any
//! field container implementing [`FieldAccess`]: [`OptionBindings::populate`]
//! fills fields from stored values, [`OptionBindings::submit`] reconciles
//! submitted field values back into rows.

use std::fmt;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use crate::error::{Error, Result};
use crate::host::{ItemOptions, OptionHost};
use crate::reconcile::ReconcileReport;
use crate::value::Value;


/// Location of a field, optionally nested under a parent group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
	pub parent: Option<String>,
	pub field: String,
}

impl FieldPath {
	pub fn new(field: impl Into<String>) -> Self {
		Self {
			parent: None,
			field: field.into(),
		}
	}

	pub fn nested(parent: impl Into<String>, field: impl Into<String>) -> Self {
		Self {
			parent: Some(parent.into()),
			field: field.into(),
		}
	}
}

impl fmt::Display for FieldPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match &self.parent {
			Some(parent) => write!(f, "{parent}.{}", self.field),
			None => f.write_str(&self.field),
		}
	}
}

/// Read/write access to a set of fields.
pub trait FieldAccess {
	/// The value of the field, or `None` if there is no such field.
	fn field_value(&self, path: &FieldPath) -> Option<Value>;

	/// Sets the field; returns false if there is no such field.
	fn set_field_value(&mut self, path: &FieldPath, value: Value) -> bool;
}

/// Fields kept in an ordered map.
///
/// Only declared fields exist; setting an undeclared field fails.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
	fields: IndexMap<FieldPath, Value, FxBuildHasher>,
}

impl FieldMap {
	pub fn new() -> Self {
		Self::default()
	}

	/// Declares a field holding `value`.
	pub fn declare(&mut self, path: FieldPath, value: impl Into<Value>) -> &mut Self {
		self.fields.insert(path, value.into());
		self
	}

	pub fn get(&self, path: &FieldPath) -> Option<&Value> {
		self.fields.get(path)
	}
}

impl FieldAccess for FieldMap {
	fn field_value(&self, path: &FieldPath) -> Option<Value> {
		self.fields.get(path).cloned()
	}

	fn set_field_value(&mut self, path: &FieldPath, value: Value) -> bool {
		match self.fields.get_mut(path) {
			Some(slot) => {
				*slot = value;
				true
			}
			None => false,
		}
	}
}

/// How one option maps onto a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldBinding {
	/// Field name if it differs from the option key.
	pub field: Option<String>,
	/// Parent group if the field is not top-level.
	pub parent: Option<String>,
}

impl FieldBinding {
	pub fn field(mut self, field: impl Into<String>) -> Self {
		self.field = Some(field.into());
		self
	}

	pub fn parent(mut self, parent: impl Into<String>) -> Self {
		self.parent = Some(parent.into());
		self
	}

	fn path(&self, key: &str) -> FieldPath {
		FieldPath {
			parent: self.parent.clone(),
			field: self.field.clone().unwrap_or_else(|| key.to_string()),
		}
	}
}

/// Ordered option key → field bindings.
#[derive(Debug, Clone, Default)]
pub struct OptionBindings {
	bindings: IndexMap<String, FieldPath, FxBuildHasher>,
}

impl OptionBindings {
	pub fn new() -> Self {
		Self::default()
	}

	/// Binds `key` to a field; fails if `key` is already bound.
	pub fn bind(&mut self, key: impl Into<String>, binding: FieldBinding) -> Result<&mut Self> {
		let key = key.into();
		if self.bindings.contains_key(&key) {
			return Err(Error::InvalidConfiguration(format!("field binding for option {key:?} has already been added")));
		}
		let path = binding.path(&key);
		self.bindings.insert(key, path);
		Ok(self)
	}

	pub fn len(&self) -> usize {
		self.bindings.len()
	}

	pub fn is_empty(&self) -> bool {
		self.bindings.is_empty()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldPath)> {
		self.bindings.iter().map(|(key, path)| (key.as_str(), path))
	}

	/// Fills bound fields with the host's option values.
	///
	/// Every bound key must be defined and allowed for the host; fields
	/// missing from `fields` are skipped.
	pub fn populate<H: OptionHost>(&self, host: &H, fields: &mut impl FieldAccess) -> Result<()> {
		for (key, path) in &self.bindings {
			host.ensure_option_allowed(key)?;
			let value = host.option_value(key, None)?;
			if !fields.set_field_value(path, value) {
				tracing::trace!(domain = "item_options", key = key.as_str(), field = %path, "bound field not present");
			}
		}
		Ok(())
	}

	/// Reconciles submitted field values into the host's rows.
	///
	/// Returns one report per bound key whose field was present.
	pub fn submit<H: OptionHost>(&self, host: &mut H, fields: &impl FieldAccess) -> Result<Vec<(String, ReconcileReport)>> {
		let mut reports = Vec::new();
		for (key, path) in &self.bindings {
			if !host.option_definitions().has(key) {
				return Err(host.option_definitions().undefined(key));
			}
			let Some(value) = fields.field_value(path) else {
				continue;
			};
			let report = host.reconcile_option(key, value)?;
			reports.push((key.clone(), report));
		}
		Ok(reports)
	}
}
