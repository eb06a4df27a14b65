//! Error types for option definitions, indexing and reconciliation.

#[cfg(feature = "config-toml")]
use std::path::PathBuf;

use thiserror::Error;

use crate::rows::RowId;

/// Errors raised by this crate.
///
/// None of these are transient. Each one points at misconfiguration or at a
/// consistency violation in the code that owns the row collection.
#[derive(Debug, Error)]
pub enum Error {
	/// Malformed definition or registry input.
	#[error("invalid option configuration: {0}")]
	InvalidConfiguration(String),

	/// The index found two rows for a key whose definition forbids it.
	#[error("found multiple rows for option {key:?} but its definition does not permit more than one")]
	DuplicateSingleValueOption {
		/// The offending option key.
		key: String,
	},

	/// The index points at a row the collection no longer has.
	#[error("expected a row for option {key:?} at {row} but the collection has no such row (index and collection have diverged)")]
	MissingRow {
		/// The option key being resolved.
		key: String,
		/// The stale position.
		row: RowId,
	},

	/// Stored or desired value shape disagrees with the declared multiplicity.
	#[error("option {key:?} is stored with multiple rows but {reason}")]
	InconsistentMultiValue {
		/// The option key.
		key: String,
		/// What was found instead of a sequence.
		reason: String,
	},

	/// The key has no definition in the host's registry.
	#[error("undefined option {key:?}{}", suggestion.as_ref().map(|s| format!(" (did you mean {s:?}?)")).unwrap_or_default())]
	UndefinedOptionKey {
		/// The unrecognized option key.
		key: String,
		/// A registered key close to the requested one.
		suggestion: Option<String>,
	},

	/// The host fails the definition's requirement predicate.
	#[error("host does not satisfy the requirements for option {key:?}")]
	IneligibleHost {
		/// The option key.
		key: String,
	},

	/// Error parsing a TOML definitions document.
	#[cfg(feature = "config-toml")]
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Error reading a definitions file.
	#[cfg(feature = "config-toml")]
	#[error("I/O error reading {path}: {error}")]
	Io {
		/// Path to the file that failed to read.
		path: PathBuf,
		/// The underlying I/O error.
		error: std::io::Error,
	},
}

/// Result type for option operations.
pub type Result<T> = std::result::Result<T, Error>;
