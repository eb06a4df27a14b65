//! Option definitions: the persistence policy for one option key.

use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::value::{EnumType, Value};


bitflags::bitflags! {
	/// Empty-like values that are persisted anyway.
	///
	/// By default none of these values produce a row.
	#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
	pub struct PersistFlags: u8 {
		/// Persist an empty sequence.
		const EMPTY_SEQUENCE = 1 << 0;
		/// Persist an empty text value.
		const EMPTY_TEXT = 1 << 1;
		/// Persist integer or floating zero.
		const ZERO = 1 << 2;
		/// Persist `false`.
		const FALSE = 1 << 3;
		/// Persist null.
		const NULL = 1 << 4;
	}
}

/// Eligibility check of a host for an option.
pub type Requirement<H> = Arc<dyn Fn(&H) -> bool + Send + Sync>;

/// Unvalidated configuration record for an [`OptionDefinition`].
///
/// Every attribute is optional; [`Default`] gives a single-row option with a
/// null default that persists nothing empty-like.
pub struct DefinitionConfig<H> {
	/// Store each value of a sequence as its own row.
	pub multiple: bool,
	/// Enum type the in-memory values belong to.
	pub enum_type: Option<Arc<EnumType>>,
	/// Fallback for when nothing is stored. Ignored when `multiple` is set.
	pub default: Value,
	/// Persist a value equal to a non-empty default.
	pub persist_default: bool,
	/// Empty-like values persisted anyway.
	pub allow: PersistFlags,
	/// Hosts failing this predicate may not carry the option.
	pub requirement: Option<Requirement<H>>,
}

impl<H> Default for DefinitionConfig<H> {
	fn default() -> Self {
		Self {
			multiple: false,
			enum_type: None,
			default: Value::Null,
			persist_default: false,
			allow: PersistFlags::empty(),
			requirement: None,
		}
	}
}

impl<H> DefinitionConfig<H> {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn multiple(mut self, multiple: bool) -> Self {
		self.multiple = multiple;
		self
	}

	pub fn enum_type(mut self, ty: Arc<EnumType>) -> Self {
		self.enum_type = Some(ty);
		self
	}

	pub fn default_value(mut self, value: impl Into<Value>) -> Self {
		self.default = value.into();
		self
	}

	pub fn persist_default(mut self, persist: bool) -> Self {
		self.persist_default = persist;
		self
	}

	pub fn allow(mut self, flags: PersistFlags) -> Self {
		self.allow |= flags;
		self
	}

	pub fn requirement(mut self, f: impl Fn(&H) -> bool + Send + Sync + 'static) -> Self {
		self.requirement = Some(Arc::new(f));
		self
	}
}

impl<H> Clone for DefinitionConfig<H> {
	fn clone(&self) -> Self {
		Self {
			multiple: self.multiple,
			enum_type: self.enum_type.clone(),
			default: self.default.clone(),
			persist_default: self.persist_default,
			allow: self.allow,
			requirement: self.requirement.clone(),
		}
	}
}

impl<H> fmt::Debug for DefinitionConfig<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DefinitionConfig")
			.field("multiple", &self.multiple)
			.field("enum_type", &self.enum_type.as_ref().map(|ty| ty.name()))
			.field("default", &self.default)
			.field("persist_default", &self.persist_default)
			.field("allow", &self.allow)
			.field("requirement", &self.requirement.is_some())
			.finish()
	}
}

/// Validated, immutable persistence policy for one option key.
pub struct OptionDefinition<H> {
	multiple: bool,
	enum_type: Option<Arc<EnumType>>,
	default: Value,
	persist_default: bool,
	allow: PersistFlags,
	requirement: Option<Requirement<H>>,
}

impl<H> OptionDefinition<H> {
	/// Validates `config` into a definition.
	///
	/// With an enum type set, a non-null default must be a member of that
	/// enum, compared by backing scalar. It is stored as the enum's own member.
	pub fn new(config: DefinitionConfig<H>) -> Result<Self> {
		let DefinitionConfig {
			multiple,
			enum_type,
			mut default,
			persist_default,
			allow,
			requirement,
		} = config;

		if let Some(ty) = &enum_type
			&& !default.is_null()
		{
			let resolved = default
				.as_enum()
				.and_then(|member| ty.try_from_scalar(&member.scalar().to_value()));
			match resolved {
				Some(member) => default = Value::Enum(member),
				None => {
					return Err(Error::InvalidConfiguration(format!(
						"default {default:?} is not a case of enum type {:?}; it must be null or a member of that enum",
						ty.name()
					)));
				}
			}
		}

		Ok(Self {
			multiple,
			enum_type,
			default,
			persist_default,
			allow,
			requirement,
		})
	}

	/// Replaces the requirement predicate.
	pub fn with_requirement(mut self, f: impl Fn(&H) -> bool + Send + Sync + 'static) -> Self {
		self.set_requirement(Arc::new(f));
		self
	}

	pub(crate) fn set_requirement(&mut self, requirement: Requirement<H>) {
		self.requirement = Some(requirement);
	}

	/// Returns the host's eligibility for this option; true without a predicate.
	pub fn meets_requirements(&self, host: &H) -> bool {
		self.requirement.as_ref().is_none_or(|f| f(host))
	}

	/// Whether each value is stored as its own row.
	pub fn is_multi_row(&self) -> bool {
		self.multiple
	}

	pub fn enum_type(&self) -> Option<&Arc<EnumType>> {
		self.enum_type.as_ref()
	}

	pub fn has_requirement(&self) -> bool {
		self.requirement.is_some()
	}

	/// Fallback for when nothing is stored; always `[]` for multi-row options.
	pub fn default_value(&self) -> Value {
		if self.multiple {
			Value::empty_seq()
		} else {
			self.default.clone()
		}
	}

	/// Decides whether `value` is worth a row.
	///
	/// Special empty-like values are checked first, so a value that is both
	/// empty-like and equal to the default follows its `allow` flag rather
	/// than `persist_default`.
	pub fn should_persist(&self, value: &Value) -> bool {
		if value.is_empty_seq() {
			return self.allow.contains(PersistFlags::EMPTY_SEQUENCE);
		}
		if value.is_empty_text() {
			return self.allow.contains(PersistFlags::EMPTY_TEXT);
		}
		if value.is_zero() {
			return self.allow.contains(PersistFlags::ZERO);
		}
		if value.is_false() {
			return self.allow.contains(PersistFlags::FALSE);
		}
		if value.is_null() {
			return self.allow.contains(PersistFlags::NULL);
		}

		let default = self.default_value();
		if !default.is_empty_like() && self.normalize(value.clone()) == self.normalize(default) {
			return self.persist_default;
		}
		true
	}

	/// Prepares a value for storage: enum members become their backing scalar.
	pub fn normalize(&self, value: Value) -> Value {
		match (&self.enum_type, value) {
			(Some(ty), Value::Enum(member)) if member.is_of(ty) => member.scalar().to_value(),
			(_, value) => value,
		}
	}

	/// Restores a stored value: scalars become the matching enum member.
	///
	/// A scalar no case is backed by is returned unchanged, so rows written
	/// before a case was added or after one was removed still load.
	pub fn denormalize(&self, value: Value) -> Value {
		let Some(ty) = &self.enum_type else {
			return value;
		};
		if !value.is_scalar() {
			return value;
		}
		match ty.try_from_scalar(&value) {
			Some(member) => Value::Enum(member),
			None => {
				tracing::trace!(
					domain = "item_options",
					enum_type = ty.name(),
					?value,
					"no enum case for stored scalar; keeping raw value",
				);
				value
			}
		}
	}
}

impl<H> Clone for OptionDefinition<H> {
	fn clone(&self) -> Self {
		Self {
			multiple: self.multiple,
			enum_type: self.enum_type.clone(),
			default: self.default.clone(),
			persist_default: self.persist_default,
			allow: self.allow,
			requirement: self.requirement.clone(),
		}
	}
}

impl<H> fmt::Debug for OptionDefinition<H> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("OptionDefinition")
			.field("multiple", &self.multiple)
			.field("enum_type", &self.enum_type.as_ref().map(|ty| ty.name()))
			.field("default", &self.default)
			.field("persist_default", &self.persist_default)
			.field("allow", &self.allow)
			.field("requirement", &self.requirement.is_some())
			.finish()
	}
}

impl<H> TryFrom<DefinitionConfig<H>> for OptionDefinition<H> {
	type Error = Error;

	fn try_from(config: DefinitionConfig<H>) -> Result<Self> {
		Self::new(config)
	}
}
