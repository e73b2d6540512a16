use std::fmt;
use std::str::FromStr;

use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result, SamplerError};

/// Accepted distance between the sum of the weights and 1.0.
pub const WEIGHT_SUM_TOLERANCE: f64 = 0.01;

/// Capability of drawing outcomes from discrete distributions.
///
/// The composer only relies on these operations, so any provider can be
/// plugged into a [`crate::Generator`]. `Send` lets a generator be
/// shared behind a lock.
///
/// # Contract
/// - `choose_index` validates its weights with [`validate_weights`] and
///   returns an index of a positive weight
/// - `uniform_index` returns a value in `low..=high`, and fails with
///   `EmptySequence` if `low > high`
pub trait Sampler: Send {
	/// Name of the provider, used in logs and settings.
	fn name(&self) -> &str;

	/// Draws one index, outcome `i` being weighted by `weights[i]`.
	fn choose_index(&mut self, weights: &[f64]) -> Result<usize, SamplerError>;

	/// Draws an integer uniformly in `low..=high`.
	fn uniform_index(&mut self, low: usize, high: usize) -> Result<usize, SamplerError>;

	/// Draws `count` independent indices from the same weights.
	fn choose_indices(&mut self, weights: &[f64], count: usize) -> Result<Vec<usize>, SamplerError> {
		validate_weights(weights)?;
		(0..count).map(|_| self.choose_index(weights)).collect()
	}
}

impl dyn Sampler + '_ {
	/// Draws one item, `items[i]` being weighted by `weights[i]`.
	///
	/// # Errors
	/// - `EmptySequence` if `items` is empty, whatever the weights
	/// - `SizeMismatch` if `items` and `weights` differ in size
	/// - `InvalidWeight` if a weight is negative or they do not sum to 1.0
	pub fn choose<'a, T>(&mut self, items: &'a [T], weights: &[f64]) -> Result<&'a T, SamplerError> {
		if items.is_empty() {
			return Err(SamplerError::EmptySequence);
		}
		if items.len() != weights.len() {
			return Err(SamplerError::SizeMismatch { items: items.len(), weights: weights.len() });
		}
		let index = self.choose_index(weights)?;
		items.get(index).ok_or(SamplerError::IndexOutOfRange { index, len: items.len() })
	}

	/// Draws one item uniformly.
	pub fn pick<'a, T>(&mut self, items: &'a [T]) -> Result<&'a T, SamplerError> {
		if items.is_empty() {
			return Err(SamplerError::EmptySequence);
		}
		let index = self.uniform_index(0, items.len() - 1)?;
		items.get(index).ok_or(SamplerError::IndexOutOfRange { index, len: items.len() })
	}
}

/// Checks that `weights` is a usable probability distribution.
///
/// # Errors
/// - `EmptySequence` if there are no weights
/// - `InvalidWeight` if a weight is negative or NaN
/// - `InvalidWeight` if the sum is outside `[0.99, 1.01]`
pub fn validate_weights(weights: &[f64]) -> Result<(), SamplerError> {
	if weights.is_empty() {
		return Err(SamplerError::EmptySequence);
	}
	if !weights.iter().all(|w| *w >= 0.0) {
		return Err(SamplerError::InvalidWeight("Probabilities are not non-negative".to_owned()));
	}

	let sum: f64 = weights.iter().sum();
	if !((1.0 - WEIGHT_SUM_TOLERANCE)..=(1.0 + WEIGHT_SUM_TOLERANCE)).contains(&sum) {
		return Err(SamplerError::InvalidWeight(format!("Probabilities do not sum to 1 (got {sum})")));
	}

	Ok(())
}

fn uniform<R: Rng>(rng: &mut R, low: usize, high: usize) -> Result<usize, SamplerError> {
	if low > high {
		return Err(SamplerError::EmptySequence);
	}
	Ok(rng.random_range(low..=high))
}

/// Rejection-free weighted sampler.
///
/// Every outcome draws an independent uniform shift in `[0, 1)` and
/// subtracts its weight from it. The lowest shifted value wins.
///
/// This performs:
/// - one pass over the weights, one random draw per positive weight
/// - no cumulative table and no retry loop, whatever the weights
///
/// Zero-weight outcomes never win. The selection favours heavy outcomes
/// but is not strictly proportional to the weights; use
/// [`WeightedIndexSampler`] when exact proportions matter.
#[derive(Debug, Clone)]
pub struct ShiftSampler<R = StdRng> {
	rng: R,
}

impl ShiftSampler {
	/// Sampler seeded from the operating system.
	pub fn new() -> Self {
		Self { rng: StdRng::from_os_rng() }
	}

	/// Reproducible sampler.
	pub fn seeded(seed: u64) -> Self {
		Self { rng: StdRng::seed_from_u64(seed) }
	}
}

impl Default for ShiftSampler {
	fn default() -> Self {
		Self::new()
	}
}

impl<R: Rng + Send> ShiftSampler<R> {
	pub fn with_rng(rng: R) -> Self {
		Self { rng }
	}

	/// Selection step, weights already validated.
	fn select(&mut self, weights: &[f64]) -> Result<usize, SamplerError> {
		let mut selected = None;
		let mut lowest = f64::INFINITY;

		for (index, weight) in weights.iter().enumerate() {
			if *weight <= 0.0 {
				continue;
			}
			let shifted = self.rng.random::<f64>() - weight;
			if shifted < lowest {
				lowest = shifted;
				selected = Some(index);
			}
		}

		selected.ok_or_else(|| SamplerError::InvalidWeight("No positive probability".to_owned()))
	}
}

impl<R: Rng + Send> Sampler for ShiftSampler<R> {
	fn name(&self) -> &str {
		SamplerKind::Shift.as_str()
	}

	fn choose_index(&mut self, weights: &[f64]) -> Result<usize, SamplerError> {
		validate_weights(weights)?;
		self.select(weights)
	}

	fn uniform_index(&mut self, low: usize, high: usize) -> Result<usize, SamplerError> {
		uniform(&mut self.rng, low, high)
	}

	fn choose_indices(&mut self, weights: &[f64], count: usize) -> Result<Vec<usize>, SamplerError> {
		validate_weights(weights)?;
		(0..count).map(|_| self.select(weights)).collect()
	}
}

/// Weighted sampler backed by `rand`'s [`WeightedIndex`].
///
/// Builds a cumulative table per call and samples exactly
/// proportionally to the weights.
#[derive(Debug, Clone)]
pub struct WeightedIndexSampler<R = StdRng> {
	rng: R,
}

impl WeightedIndexSampler {
	pub fn new() -> Self {
		Self { rng: StdRng::from_os_rng() }
	}

	pub fn seeded(seed: u64) -> Self {
		Self { rng: StdRng::seed_from_u64(seed) }
	}
}

impl Default for WeightedIndexSampler {
	fn default() -> Self {
		Self::new()
	}
}

impl<R: Rng + Send> WeightedIndexSampler<R> {
	pub fn with_rng(rng: R) -> Self {
		Self { rng }
	}
}

impl<R: Rng + Send> Sampler for WeightedIndexSampler<R> {
	fn name(&self) -> &str {
		SamplerKind::WeightedIndex.as_str()
	}

	fn choose_index(&mut self, weights: &[f64]) -> Result<usize, SamplerError> {
		validate_weights(weights)?;
		let distribution = weighted_index(weights)?;
		Ok(distribution.sample(&mut self.rng))
	}

	fn uniform_index(&mut self, low: usize, high: usize) -> Result<usize, SamplerError> {
		uniform(&mut self.rng, low, high)
	}

	fn choose_indices(&mut self, weights: &[f64], count: usize) -> Result<Vec<usize>, SamplerError> {
		validate_weights(weights)?;
		let distribution = weighted_index(weights)?;
		Ok((&distribution).sample_iter(&mut self.rng).take(count).collect())
	}
}

fn weighted_index(weights: &[f64]) -> Result<WeightedIndex<f64>, SamplerError> {
	WeightedIndex::new(weights).map_err(|e| SamplerError::InvalidWeight(e.to_string()))
}

/// Built-in sampler providers, selectable by name.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case", try_from = "String")]
pub enum SamplerKind {
	/// [`ShiftSampler`]
	#[default]
	Shift,
	/// [`WeightedIndexSampler`]
	WeightedIndex,
}

impl SamplerKind {
	pub fn as_str(&self) -> &'static str {
		match self {
			SamplerKind::Shift => "shift",
			SamplerKind::WeightedIndex => "weighted-index",
		}
	}

	/// Instantiates the provider, reproducible when `seed` is set.
	pub fn build(self, seed: Option<u64>) -> Box<dyn Sampler> {
		match (self, seed) {
			(SamplerKind::Shift, Some(seed)) => Box::new(ShiftSampler::seeded(seed)),
			(SamplerKind::Shift, None) => Box::new(ShiftSampler::new()),
			(SamplerKind::WeightedIndex, Some(seed)) => Box::new(WeightedIndexSampler::seeded(seed)),
			(SamplerKind::WeightedIndex, None) => Box::new(WeightedIndexSampler::new()),
		}
	}
}

impl fmt::Display for SamplerKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for SamplerKind {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self> {
		match s.to_lowercase().as_str() {
			"shift" => Ok(SamplerKind::Shift),
			"weighted-index" | "weighted_index" => Ok(SamplerKind::WeightedIndex),
			_ => Err(Error::Capability {
				name: s.to_owned(),
				reason: "unknown sampler, expected `shift` or `weighted-index`".to_owned(),
			}),
		}
	}
}

impl TryFrom<String> for SamplerKind {
	type Error = Error;

	fn try_from(value: String) -> Result<Self> {
		value.parse()
	}
}

/// Runs `sampler` once against known inputs before it is accepted.
///
/// # Errors
/// Returns `Capability` if the sampler accepts invalid weights, draws a
/// zero-weight outcome, or leaves the requested integer range.
pub fn ensure_capability(sampler: &mut dyn Sampler) -> Result<()> {
	let name = sampler.name().to_owned();
	let incapable = |reason: String| Error::Capability { name: name.clone(), reason };

	match sampler.uniform_index(1, 4) {
		Ok(value) if (1..=4).contains(&value) => (),
		other => return Err(incapable(format!("uniform_index(1, 4) returned {other:?}"))),
	}
	match sampler.choose_index(&[1.0]) {
		Ok(0) => (),
		other => return Err(incapable(format!("choose_index([1.0]) returned {other:?}"))),
	}
	match sampler.choose_index(&[0.0, 1.0]) {
		Ok(1) => (),
		other => return Err(incapable(format!("choose_index([0.0, 1.0]) returned {other:?}"))),
	}
	match sampler.choose_index(&[0.5]) {
		Err(SamplerError::InvalidWeight(_)) => (),
		other => return Err(incapable(format!("choose_index([0.5]) returned {other:?}"))),
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::collections::HashSet;

	fn uniform_weights(n: usize) -> Vec<f64> {
		vec![1.0 / n as f64; n]
	}

	fn samplers() -> Vec<Box<dyn Sampler>> {
		vec![Box::new(ShiftSampler::seeded(7)), Box::new(WeightedIndexSampler::seeded(7))]
	}

	#[test]
	fn choose_returns_an_item_of_the_sequence() {
		let numbers: Vec<i32> = (-10_000..10_000).collect();
		let weights = uniform_weights(numbers.len());

		for mut sampler in samplers() {
			let number = sampler.choose(&numbers, &weights).unwrap();
			assert!((-10_000..10_000).contains(number));
		}
	}

	#[test]
	fn uniform_choice_rarely_collides() {
		let numbers: Vec<i32> = (-1_000..1_000).collect();
		let weights = uniform_weights(numbers.len());

		for mut sampler in samplers() {
			let drawn: Vec<i32> = (0..1_000).map(|_| *sampler.choose(&numbers, &weights).unwrap()).collect();
			let unique: HashSet<_> = drawn.iter().collect();
			assert!(((drawn.len() - unique.len()) as f64) < 0.15 * numbers.len() as f64);
		}
	}

	#[test]
	fn single_positive_weight_always_wins() {
		let mut weights = vec![0.0; 2_000];
		weights[1_234] = 1.0;

		for mut sampler in samplers() {
			for _ in 0..1_000 {
				assert_eq!(sampler.choose_index(&weights), Ok(1_234));
			}
		}
	}

	#[test]
	fn empty_items_fail_whatever_the_weights() {
		let items: [u8; 0] = [];
		for mut sampler in samplers() {
			assert_eq!(sampler.choose(&items, &[1.0]), Err(SamplerError::EmptySequence));
			assert_eq!(sampler.choose(&items, &[]), Err(SamplerError::EmptySequence));
		}
	}

	#[test]
	fn mismatched_sizes_fail() {
		for mut sampler in samplers() {
			assert_eq!(
				sampler.choose(&['a', 'b', 'c'], &[0.5, 0.5]),
				Err(SamplerError::SizeMismatch { items: 3, weights: 2 })
			);
		}
	}

	#[test]
	fn negative_weight_fails() {
		for mut sampler in samplers() {
			let result = sampler.choose(&[1, 2, 3], &[1.5, -1.0, 0.5]);
			assert!(matches!(result, Err(SamplerError::InvalidWeight(_))));
		}
	}

	#[test]
	fn nan_weight_fails() {
		assert!(matches!(validate_weights(&[f64::NAN, 1.0]), Err(SamplerError::InvalidWeight(_))));
	}

	#[test]
	fn weight_sum_tolerance() {
		for rejected in [0.98, 1.02, 0.5] {
			assert!(
				matches!(validate_weights(&[rejected / 2.0, rejected / 2.0]), Err(SamplerError::InvalidWeight(_))),
				"sum {rejected} should be rejected"
			);
		}
		for accepted in [0.995, 1.0, 1.005] {
			assert!(validate_weights(&[accepted / 2.0, accepted / 2.0]).is_ok(), "sum {accepted} should be accepted");
		}

		for mut sampler in samplers() {
			assert!(sampler.choose(&["a", "b"], &[0.49, 0.49]).is_err());
			assert!(sampler.choose(&["a", "b"], &[0.5, 0.505]).is_ok());
		}
	}

	#[test]
	fn uniform_index_stays_in_bounds() {
		for mut sampler in samplers() {
			let drawn: HashSet<usize> = (0..1_000).map(|_| sampler.uniform_index(1, 4).unwrap()).collect();
			assert_eq!(drawn, HashSet::from([1, 2, 3, 4]));
			assert_eq!(sampler.uniform_index(5, 5), Ok(5));
			assert_eq!(sampler.uniform_index(5, 4), Err(SamplerError::EmptySequence));
		}
	}

	#[test]
	fn pick_from_empty_fails() {
		let mut sampler = ShiftSampler::seeded(1);
		let sampler: &mut dyn Sampler = &mut sampler;
		assert_eq!(sampler.pick::<u8>(&[]), Err(SamplerError::EmptySequence));
		assert_eq!(sampler.pick(&[42]), Ok(&42));
	}

	#[test]
	fn batch_draws_requested_count() {
		for mut sampler in samplers() {
			let indices = sampler.choose_indices(&[0.0, 0.25, 0.75], 500).unwrap();
			assert_eq!(indices.len(), 500);
			assert!(indices.iter().all(|i| *i == 1 || *i == 2));
			assert!(sampler.choose_indices(&[0.3], 3).is_err());
		}
	}

	#[test]
	fn weighted_index_is_proportional() {
		let mut sampler = WeightedIndexSampler::seeded(3);
		let draws = sampler.choose_indices(&[0.9, 0.1], 20_000).unwrap();
		let ones = draws.iter().filter(|i| **i == 1).count() as f64 / draws.len() as f64;
		assert!((ones - 0.1).abs() < 0.02, "got {ones}");
	}

	#[test]
	fn shift_sampler_favours_heavier_outcomes() {
		let mut sampler = ShiftSampler::seeded(3);
		let draws = sampler.choose_indices(&[0.7, 0.3], 10_000).unwrap();
		let heavy = draws.iter().filter(|i| **i == 0).count();
		assert!(heavy > 5_000);
	}

	#[test]
	fn seeded_samplers_are_reproducible() {
		let weights = uniform_weights(100);
		let mut left = ShiftSampler::seeded(99);
		let mut right = ShiftSampler::seeded(99);
		assert_eq!(left.choose_indices(&weights, 50), right.choose_indices(&weights, 50));
	}

	#[test]
	fn custom_rng_matches_seeded_constructor() {
		let weights = uniform_weights(50);

		let mut shift = ShiftSampler::with_rng(StdRng::seed_from_u64(12));
		assert_eq!(shift.choose_indices(&weights, 30), ShiftSampler::seeded(12).choose_indices(&weights, 30));

		let mut weighted = WeightedIndexSampler::with_rng(StdRng::seed_from_u64(12));
		assert_eq!(
			weighted.choose_indices(&weights, 30),
			WeightedIndexSampler::seeded(12).choose_indices(&weights, 30)
		);
		ensure_capability(&mut weighted).unwrap();
	}

	#[test]
	fn sampler_kind_parsing() {
		assert_eq!("shift".parse::<SamplerKind>().unwrap(), SamplerKind::Shift);
		assert_eq!("Weighted-Index".parse::<SamplerKind>().unwrap(), SamplerKind::WeightedIndex);
		assert!(matches!("numpy".parse::<SamplerKind>(), Err(Error::Capability { .. })));
		assert_eq!(SamplerKind::WeightedIndex.build(Some(1)).name(), "weighted-index");
	}

	#[test]
	fn built_in_samplers_pass_the_capability_probe() {
		for mut sampler in samplers() {
			ensure_capability(sampler.as_mut()).unwrap();
		}
	}

	struct Stuck;

	impl Sampler for Stuck {
		fn name(&self) -> &str {
			"stuck"
		}

		fn choose_index(&mut self, _weights: &[f64]) -> Result<usize, SamplerError> {
			Ok(0)
		}

		fn uniform_index(&mut self, low: usize, _high: usize) -> Result<usize, SamplerError> {
			Ok(low)
		}
	}

	#[test]
	fn misbehaving_sampler_fails_the_capability_probe() {
		let result = ensure_capability(&mut Stuck);
		assert!(matches!(result, Err(Error::Capability { name, .. }) if name == "stuck"));
	}
}
