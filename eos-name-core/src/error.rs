use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Every failure the generator can report.
///
/// None of these are transient: the same corpus and configuration always
/// produce the same error, so callers should not retry.
#[derive(Debug, Error)]
pub enum Error {
	/// The seed corpus contains a word that is not lowercase ASCII
	/// or that is longer than the name length.
	#[error("{reason}")]
	DataValidation { reason: String },

	/// The seed corpus could not be read.
	#[error("{source}: '{}'", .path.display())]
	SourceNotFound {
		path: PathBuf,
		#[source]
		source: io::Error,
	},

	/// A sampler precondition was violated.
	#[error(transparent)]
	Sampler(#[from] SamplerError),

	/// An injected sampler does not honor the sampler contract.
	#[error("sampler `{name}` does not provide the required capability: {reason}")]
	Capability { name: String, reason: String },

	/// One or more configuration fields are out of range.
	#[error("invalid configuration: {0}")]
	ConfigValidation(ValidationErrors),
}

impl Error {
	pub(crate) fn data_validation(reason: impl Into<String>) -> Self {
		Error::DataValidation { reason: reason.into() }
	}
}

impl From<ValidationErrors> for Error {
	fn from(errors: ValidationErrors) -> Self {
		Error::ConfigValidation(errors)
	}
}

/// Precondition violations of [`crate::model::sampler::Sampler`] operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplerError {
	#[error("Cannot choose from an empty sequence")]
	EmptySequence,

	#[error("`items` and `weights` must have same size (got {items} and {weights})")]
	SizeMismatch { items: usize, weights: usize },

	#[error("{0}")]
	InvalidWeight(String),

	/// The sampler returned an index the caller cannot use.
	#[error("sampled index {index} is out of range for {len} items")]
	IndexOutOfRange { index: usize, len: usize },
}

/// Field-tagged configuration errors.
///
/// Violations are collected rather than reported one at a time, so
/// a caller sees every invalid field at once. Serializes as
/// `{ "field": ["message", ...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(BTreeMap<String, Vec<String>>);

impl ValidationErrors {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records a message against `field`.
	pub fn add(&mut self, field: &str, message: impl Into<String>) {
		self.0.entry(field.to_owned()).or_default().push(message.into());
	}

	/// Moves every message of `other` into `self`.
	pub fn merge(&mut self, other: ValidationErrors) {
		for (field, messages) in other.0 {
			self.0.entry(field).or_default().extend(messages);
		}
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// Messages recorded for `field`, if any.
	pub fn field(&self, field: &str) -> Option<&[String]> {
		self.0.get(field).map(Vec::as_slice)
	}

	pub fn fields(&self) -> impl Iterator<Item = &str> {
		self.0.keys().map(String::as_str)
	}

	/// `Ok(())` when nothing was recorded, the collected errors otherwise.
	pub fn into_result(self) -> Result<(), ValidationErrors> {
		if self.is_empty() { Ok(()) } else { Err(self) }
	}
}

impl fmt::Display for ValidationErrors {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let mut first = true;
		for (field, messages) in &self.0 {
			for message in messages {
				if !first {
					f.write_str("; ")?;
				}
				write!(f, "{field}: {message}")?;
				first = false;
			}
		}
		Ok(())
	}
}

impl std::error::Error for ValidationErrors {}
