use log::trace;

use super::EOS_NAME_LENGTH;
use super::corpus::WordCorpus;
use super::distribution::LengthDistribution;
use super::sampler::Sampler;
use crate::error::{Result, SamplerError};

/// Smallest digit used in numeric suffixes.
pub const MIN_SUFFIX_DIGIT: usize = 1;

/// Largest digit used in numeric suffixes.
pub const MAX_SUFFIX_DIGIT: usize = 4;

/// Composes one name of exactly `EOS_NAME_LENGTH` characters.
///
/// # Parameters
/// - `corpus`: Words grouped by length.
/// - `distribution`: Length probabilities derived from `corpus`.
/// - `numbers_probability`: Chance of a digit suffix when a word suffix
///   of the complementary length exists.
/// - `sampler`: Source of every random decision.
///
/// # Behavior
/// - Draws a base length `L` from `distribution`, then a base word of
///   that length uniformly.
/// - Looks up words of the complementary length `R = 12 - L`.
/// - Chooses a word suffix with probability `1 - numbers_probability`,
///   or digits otherwise. Digits are forced when no word of length `R`
///   exists, which includes `L = 12`.
/// - A digit suffix is `R` independent digits in `1..=4`.
///
/// # Errors
/// Propagates sampler errors, e.g. `InvalidWeight` when
/// `numbers_probability` is outside `[0, 1]`.
pub fn compose(
	corpus: &WordCorpus,
	distribution: &LengthDistribution,
	numbers_probability: f64,
	sampler: &mut dyn Sampler,
) -> Result<String> {
	let base_len = *sampler.choose(distribution.lengths(), distribution.probabilities())?;
	let base_word = sampler.pick(corpus.bucket(base_len))?;

	// Bucket lengths never exceed the name length
	let rest = EOS_NAME_LENGTH - base_len;
	let alt_words = corpus.bucket(rest);

	let numbers_probability = if alt_words.is_empty() { 1.0 } else { numbers_probability };
	let word_suffix = *sampler.choose(&[true, false], &[1.0 - numbers_probability, numbers_probability])?;

	let mut name = String::with_capacity(EOS_NAME_LENGTH);
	name.push_str(base_word);

	if word_suffix {
		name.push_str(sampler.pick(alt_words)?);
	} else {
		for _ in 0..rest {
			let digit = sampler.uniform_index(MIN_SUFFIX_DIGIT, MAX_SUFFIX_DIGIT)?;
			let c = u32::try_from(digit)
				.ok()
				.and_then(|d| char::from_digit(d, 10))
				.ok_or(SamplerError::IndexOutOfRange { index: digit, len: 10 })?;
			name.push(c);
		}
	}

	trace!("composed {name} (base length {base_len}, word suffix {word_suffix})");
	Ok(name)
}
