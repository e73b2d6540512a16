use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::sampler::SamplerKind;
use crate::error::ValidationErrors;

/// Default chance of a digit suffix.
pub const DEFAULT_NUMBERS_PROBABILITY: f64 = 0.1;

pub const NUMBERS_PROBABILITY_FIELD: &str = "numbers_probabilities";
pub const NUM_FIELD: &str = "num";

const NUMBERS_PROBABILITY_MESSAGE: &str = "Numbers probabilities must be between 0 and 1.";
const NUM_MESSAGE: &str = "Num must be greater than 0.";

/// Requested changes to a [`crate::Generator`].
///
/// Every field is optional: `None` keeps the current value.
///
/// # Fields
/// - `numbers_probability`: chance of a digit suffix, in `[0, 1]`.
///   Serialized as `numbers_probabilities`, like the command-line option.
/// - `seed_data_path`: plain text word list replacing the corpus
/// - `sampler`: built-in sampler provider
/// - `rng_seed`: makes the sampler reproducible
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
	#[serde(rename = "numbers_probabilities", alias = "numbers_probability")]
	pub numbers_probability: Option<f64>,
	pub seed_data_path: Option<PathBuf>,
	pub sampler: Option<SamplerKind>,
	pub rng_seed: Option<u64>,
}

impl GeneratorConfig {
	/// Checks every field and reports all violations together.
	pub fn validate(&self) -> Result<(), ValidationErrors> {
		let mut errors = ValidationErrors::new();
		if let Some(probability) = self.numbers_probability {
			check_numbers_probability(probability, &mut errors);
		}
		errors.into_result()
	}

	/// Whether applying this configuration replaces the sampler.
	pub(crate) fn touches_sampler(&self) -> bool {
		self.sampler.is_some() || self.rng_seed.is_some()
	}
}

/// Records an error unless `0 <= probability <= 1`.
pub fn check_numbers_probability(probability: f64, errors: &mut ValidationErrors) {
	if !(0.0..=1.0).contains(&probability) {
		errors.add(NUMBERS_PROBABILITY_FIELD, NUMBERS_PROBABILITY_MESSAGE);
	}
}

/// Records an error unless at least one name is requested.
///
/// Signed so that a negative count is reported like a zero one.
pub fn check_num(num: i64, errors: &mut ValidationErrors) {
	if num < 1 {
		errors.add(NUM_FIELD, NUM_MESSAGE);
	}
}
