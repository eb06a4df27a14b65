//! Ordered key → definition mapping for one host type.

use std::sync::Arc;

use indexmap::IndexMap;
use indexmap::map::Entry;
use rustc_hash::FxBuildHasher;

use crate::definition::{DefinitionConfig, OptionDefinition};
use crate::error::{Error, Result};


/// One entry of a bulk registry definition.
pub enum DefinitionEntry<H> {
	/// A key with an implied empty configuration.
	Bare(String),
	/// A key with a raw configuration record, validated on construction.
	Config(String, DefinitionConfig<H>),
	/// A key with a ready definition.
	Definition(String, OptionDefinition<H>),
}

impl<H> DefinitionEntry<H> {
	fn key(&self) -> &str {
		match self {
			Self::Bare(key) | Self::Config(key, _) | Self::Definition(key, _) => key,
		}
	}

	fn into_definition(self) -> Result<(String, OptionDefinition<H>)> {
		match self {
			Self::Bare(key) => Ok((key, OptionDefinition::new(DefinitionConfig::default())?)),
			Self::Config(key, config) => {
				let def = OptionDefinition::new(config).map_err(|e| match e {
					Error::InvalidConfiguration(msg) => Error::InvalidConfiguration(format!("option {key:?}: {msg}")),
					other => other,
				})?;
				Ok((key, def))
			}
			Self::Definition(key, def) => Ok((key, def)),
		}
	}
}

impl<H> From<&str> for DefinitionEntry<H> {
	fn from(key: &str) -> Self {
		Self::Bare(key.to_string())
	}
}

impl<H> From<String> for DefinitionEntry<H> {
	fn from(key: String) -> Self {
		Self::Bare(key)
	}
}

impl<H, K: Into<String>> From<(K, DefinitionConfig<H>)> for DefinitionEntry<H> {
	fn from((key, config): (K, DefinitionConfig<H>)) -> Self {
		Self::Config(key.into(), config)
	}
}

impl<H, K: Into<String>> From<(K, OptionDefinition<H>)> for DefinitionEntry<H> {
	fn from((key, def): (K, OptionDefinition<H>)) -> Self {
		Self::Definition(key.into(), def)
	}
}

/// Definitions of every option a host type may carry, in declaration order.
pub struct DefinitionRegistry<H> {
	definitions: IndexMap<String, OptionDefinition<H>, FxBuildHasher>,
}

impl<H> Default for DefinitionRegistry<H> {
	fn default() -> Self {
		Self {
			definitions: IndexMap::default(),
		}
	}
}

impl<H> DefinitionRegistry<H> {
	pub fn new() -> Self {
		Self::default()
	}

	/// Builds a registry from bulk entries.
	///
	/// Fails with [`Error::InvalidConfiguration`] if a configuration record
	/// does not validate or a key appears more than once.
	pub fn from_entries<I, E>(entries: I) -> Result<Self>
	where
		I: IntoIterator<Item = E>,
		E: Into<DefinitionEntry<H>>,
	{
		let mut registry = Self::new();
		for entry in entries {
			let entry = entry.into();
			if registry.has(entry.key()) {
				return Err(Error::InvalidConfiguration(format!(
					"option {:?} is defined more than once",
					entry.key()
				)));
			}
			let (key, def) = entry.into_definition()?;
			registry.definitions.insert(key, def);
		}
		Ok(registry)
	}

	/// Adds a definition; returns false if `key` is already defined.
	pub fn add(&mut self, key: impl Into<String>, definition: OptionDefinition<H>) -> bool {
		match self.definitions.entry(key.into()) {
			Entry::Vacant(slot) => {
				slot.insert(definition);
				true
			}
			Entry::Occupied(_) => false,
		}
	}

	/// Removes a definition, keeping the order of the rest.
	pub fn remove(&mut self, key: &str) -> bool {
		self.definitions.shift_remove(key).is_some()
	}

	pub fn has(&self, key: &str) -> bool {
		self.definitions.contains_key(key)
	}

	pub fn get(&self, key: &str) -> Option<&OptionDefinition<H>> {
		self.definitions.get(key)
	}

	/// All definitions in declaration order.
	pub fn all(&self) -> impl ExactSizeIterator<Item = (&str, &OptionDefinition<H>)> {
		self.definitions.iter().map(|(key, def)| (key.as_str(), def))
	}

	pub fn keys(&self) -> impl ExactSizeIterator<Item = &str> {
		self.definitions.keys().map(String::as_str)
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}

	/// Attaches a requirement predicate to an already defined option.
	pub fn with_requirement(mut self, key: &str, f: impl Fn(&H) -> bool + Send + Sync + 'static) -> Result<Self> {
		let Some(index) = self.definitions.get_index_of(key) else {
			return Err(self.undefined(key));
		};
		self.definitions[index].set_requirement(Arc::new(f));
		Ok(self)
	}

	/// Looks up `key`, failing with [`Error::UndefinedOptionKey`].
	pub fn require(&self, key: &str) -> Result<&OptionDefinition<H>> {
		self.get(key).ok_or_else(|| self.undefined(key))
	}

	/// Builds an [`Error::UndefinedOptionKey`] with the closest defined key.
	pub fn undefined(&self, key: &str) -> Error {
		Error::UndefinedOptionKey {
			key: key.to_string(),
			suggestion: self.suggest(key),
		}
	}

	fn suggest(&self, key: &str) -> Option<String> {
		self.keys()
			.min_by_key(|k| strsim::levenshtein(key, k))
			.filter(|k| strsim::levenshtein(key, k) <= 3)
			.map(str::to_string)
	}
}

impl<H> std::fmt::Debug for DefinitionRegistry<H> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_map().entries(self.definitions.iter()).finish()
	}
}

impl<'a, H> IntoIterator for &'a DefinitionRegistry<H> {
	type Item = (&'a String, &'a OptionDefinition<H>);
	type IntoIter = indexmap::map::Iter<'a, String, OptionDefinition<H>>;

	fn into_iter(self) -> Self::IntoIter {
		self.definitions.iter()
	}
}
