//! TOML definitions files.
//!
//! A definitions document declares enum types and option definitions:
//!
//! ```toml
//! [enums.Color]
//! red = "r"
//! blue = "b"
//!
//! [options]
//! color = { enum_type = "Color", default = "r" }
//! tags = { multiple = true, allow_empty_sequence = true }
//! legacy = true # bare key, empty configuration
//! ```
//!
//! Option entries are tables of definition attributes or the boolean
//! `true`. TOML has no null, so an omitted `default` means null.
//! Requirement predicates are attached afterwards with
//! [`DefinitionRegistry::with_requirement`].

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;
use serde::Deserialize;

use crate::definition::{DefinitionConfig, PersistFlags};
use crate::error::{Error, Result};
use crate::registry::{DefinitionEntry, DefinitionRegistry};
use crate::value::{EnumScalar, EnumType, Value};


/// Enum types available to `enum_type` references, by name.
#[derive(Debug, Clone, Default)]
pub struct EnumCatalog {
	types: IndexMap<String, Arc<EnumType>, FxBuildHasher>,
}

impl EnumCatalog {
	pub fn new() -> Self {
		Self::default()
	}

	/// Adds an enum type; returns false if its name is taken.
	pub fn register(&mut self, ty: Arc<EnumType>) -> bool {
		if self.types.contains_key(ty.name()) {
			return false;
		}
		self.types.insert(ty.name().to_string(), ty);
		true
	}

	pub fn get(&self, name: &str) -> Option<&Arc<EnumType>> {
		self.types.get(name)
	}

	pub fn len(&self) -> usize {
		self.types.len()
	}

	pub fn is_empty(&self) -> bool {
		self.types.is_empty()
	}
}

/// A parsed definitions document.
pub struct Definitions<H> {
	pub enums: EnumCatalog,
	pub registry: DefinitionRegistry<H>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
	#[serde(default)]
	enums: IndexMap<String, IndexMap<String, toml::Value>>,
	#[serde(default)]
	options: IndexMap<String, toml::Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawDefinition {
	multiple: bool,
	enum_type: Option<String>,
	default: Option<toml::Value>,
	persist_default: bool,
	#[serde(alias = "allow_empty_array")]
	allow_empty_sequence: bool,
	#[serde(alias = "allow_empty_string")]
	allow_empty_text: bool,
	allow_zero: bool,
	allow_false: bool,
	allow_null: bool,
}

impl RawDefinition {
	fn flags(&self) -> PersistFlags {
		let mut flags = PersistFlags::empty();
		flags.set(PersistFlags::EMPTY_SEQUENCE, self.allow_empty_sequence);
		flags.set(PersistFlags::EMPTY_TEXT, self.allow_empty_text);
		flags.set(PersistFlags::ZERO, self.allow_zero);
		flags.set(PersistFlags::FALSE, self.allow_false);
		flags.set(PersistFlags::NULL, self.allow_null);
		flags
	}

	fn into_config<H>(self, key: &str, catalog: &EnumCatalog) -> Result<DefinitionConfig<H>> {
		let allow = self.flags();
		let enum_type = match &self.enum_type {
			Some(name) => Some(Arc::clone(catalog.get(name).ok_or_else(|| {
				Error::InvalidConfiguration(format!("option {key:?}: enum_type {name:?} is not a declared enum"))
			})?)),
			None => None,
		};

		let default = match self.default {
			Some(raw) => convert_value(raw).map_err(|e| prefix(key, e))?,
			None => Value::Null,
		};
		let default = match &enum_type {
			Some(ty) if !default.is_null() => Value::Enum(ty.try_from_scalar(&default).ok_or_else(|| {
				Error::InvalidConfiguration(format!(
					"option {key:?}: default {default:?} is not the scalar of any case of enum {:?}",
					ty.name()
				))
			})?),
			_ => default,
		};

		Ok(DefinitionConfig {
			multiple: self.multiple,
			enum_type,
			default,
			persist_default: self.persist_default,
			allow,
			requirement: None,
		})
	}
}

fn prefix(key: &str, error: Error) -> Error {
	match error {
		Error::InvalidConfiguration(msg) => Error::InvalidConfiguration(format!("option {key:?}: {msg}")),
		other => other,
	}
}

fn convert_value(raw: toml::Value) -> Result<Value> {
	Ok(match raw {
		toml::Value::Boolean(v) => Value::Bool(v),
		toml::Value::Integer(v) => Value::Int(v),
		toml::Value::Float(v) => Value::Float(v),
		toml::Value::String(v) => Value::Text(v),
		toml::Value::Array(items) => Value::Seq(items.into_iter().map(convert_value).collect::<Result<_>>()?),
		other => {
			return Err(Error::InvalidConfiguration(format!(
				"{} values are not supported",
				other.type_str()
			)));
		}
	})
}

fn convert_enum(name: &str, cases: IndexMap<String, toml::Value>) -> Result<Arc<EnumType>> {
	let cases = cases
		.into_iter()
		.map(|(case, raw)| {
			let scalar = match raw {
				toml::Value::Integer(v) => EnumScalar::Int(v),
				toml::Value::String(v) => EnumScalar::Text(v),
				other => {
					return Err(Error::InvalidConfiguration(format!(
						"enum {name:?} case {case:?} must be backed by an integer or string, got {}",
						other.type_str()
					)));
				}
			};
			Ok((case, scalar))
		})
		.collect::<Result<Vec<_>>>()?;
	EnumType::new(name, cases)
}

/// Parses a definitions document, extending `catalog` with its enums.
pub fn parse_definitions<H>(src: &str, mut catalog: EnumCatalog) -> Result<Definitions<H>> {
	let doc: Document = toml::from_str(src)?;

	for (name, cases) in doc.enums {
		let ty = convert_enum(&name, cases)?;
		if !catalog.register(ty) {
			return Err(Error::InvalidConfiguration(format!("enum {name:?} is declared more than once")));
		}
	}

	let entries = doc
		.options
		.into_iter()
		.map(|(key, raw)| match raw {
			toml::Value::Boolean(true) => Ok(DefinitionEntry::Bare(key)),
			toml::Value::Table(table) => {
				let raw = RawDefinition::deserialize(toml::Value::Table(table))
					.map_err(|e| Error::InvalidConfiguration(format!("option {key:?}: {e}")))?;
				let config = raw.into_config(&key, &catalog)?;
				Ok(DefinitionEntry::Config(key, config))
			}
			other => Err(Error::InvalidConfiguration(format!(
				"option {key:?} must be a table of attributes or `true`, got {}",
				other.type_str()
			))),
		})
		.collect::<Result<Vec<_>>>()?;

	let registry = DefinitionRegistry::from_entries(entries)?;
	tracing::debug!(
		domain = "item_options",
		enums = catalog.len(),
		options = registry.len(),
		"loaded option definitions",
	);
	Ok(Definitions {
		enums: catalog,
		registry,
	})
}

/// Parses a definitions document into a registry.
pub fn load_registry_str<H>(src: &str) -> Result<DefinitionRegistry<H>> {
	parse_definitions(src, EnumCatalog::new()).map(|defs| defs.registry)
}

/// Reads and parses a definitions file into a registry.
pub fn load_registry_file<H>(path: &Path) -> Result<DefinitionRegistry<H>> {
	let src = std::fs::read_to_string(path).map_err(|error| Error::Io {
		path: path.to_path_buf(),
		error,
	})?;
	load_registry_str(&src)
}
