use std::fmt;

use log::debug;
use serde::Serialize;

use super::EOS_NAME_LENGTH;
use super::composer::compose;
use super::config::{DEFAULT_NUMBERS_PROBABILITY, GeneratorConfig, check_numbers_probability};
use super::corpus::{BundledCorpus, CorpusProvider, FileCorpus, WordCorpus};
use super::distribution::LengthDistribution;
use super::sampler::{Sampler, SamplerKind, ensure_capability};
use crate::error::{Result, ValidationErrors};

/// High-level `EOS` name generator.
///
/// # Responsibilities
/// - Own the corpus, its length distribution and the sampler
/// - Generate one or many names
/// - Apply configuration changes atomically: a failed change leaves the
///   previous configuration active
///
/// The corpus and distribution are read-only between reconfigurations.
/// Generation only mutates the sampler state, hence `&mut self`.
pub struct Generator {
	corpus: WordCorpus,
	distribution: LengthDistribution,
	numbers_probability: f64,
	sampler: Box<dyn Sampler>,
	sampler_kind: Option<SamplerKind>,
	corpus_origin: String,
}

/// Read-only snapshot of a generator configuration.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct GeneratorSettings {
	pub name_length: usize,
	pub numbers_probability: f64,
	pub sampler: String,
	pub corpus: String,
	pub word_count: usize,
	pub length_distribution: Vec<(usize, f64)>,
}

impl Generator {
	/// Generator over the bundled noun list, with the default numbers
	/// probability and an OS-seeded [`super::sampler::ShiftSampler`].
	pub fn new() -> Result<Self> {
		Self::from_provider(&BundledCorpus)
	}

	/// Generator over the corpus of `provider`, other settings default.
	pub fn from_provider(provider: &dyn CorpusProvider) -> Result<Self> {
		let corpus = provider.load()?;
		let distribution = LengthDistribution::from_corpus(&corpus);
		let kind = SamplerKind::default();

		Ok(Self {
			corpus,
			distribution,
			numbers_probability: DEFAULT_NUMBERS_PROBABILITY,
			sampler: kind.build(None),
			sampler_kind: Some(kind),
			corpus_origin: provider.describe(),
		})
	}

	/// Default generator with `config` applied on top.
	pub fn with_config(config: &GeneratorConfig) -> Result<Self> {
		config.validate()?;
		let mut generator = match &config.seed_data_path {
			Some(path) => Self::from_provider(&FileCorpus::new(path))?,
			None => Self::new()?,
		};
		let config = GeneratorConfig { seed_data_path: None, ..config.clone() };
		generator.reconfigure(&config)?;
		Ok(generator)
	}

	/// Generates one name of exactly `EOS_NAME_LENGTH` characters.
	pub fn generate(&mut self) -> Result<String> {
		compose(&self.corpus, &self.distribution, self.numbers_probability, self.sampler.as_mut())
	}

	/// Generates `num` independent names, in call order.
	///
	/// `num == 0` yields an empty list.
	pub fn generate_many(&mut self, num: usize) -> Result<Vec<String>> {
		(0..num).map(|_| self.generate()).collect()
	}

	/// Replaces the corpus with the one of `provider`.
	///
	/// # Errors
	/// `DataValidation` or `SourceNotFound` from the provider; the
	/// current corpus is kept in that case.
	pub fn set_corpus_provider(&mut self, provider: &dyn CorpusProvider) -> Result<()> {
		let corpus = provider.load()?;
		let distribution = LengthDistribution::from_corpus(&corpus);
		self.commit_corpus(corpus, distribution, provider.describe());
		Ok(())
	}

	/// Replaces the corpus with a word list read from `path`.
	pub fn set_seed_data_path<P: Into<std::path::PathBuf>>(&mut self, path: P) -> Result<()> {
		self.set_corpus_provider(&FileCorpus::new(path))
	}

	/// Sets the chance of a digit suffix.
	///
	/// # Errors
	/// `ConfigValidation` unless `0 <= probability <= 1`.
	pub fn set_numbers_probability(&mut self, probability: f64) -> Result<()> {
		let mut errors = ValidationErrors::new();
		check_numbers_probability(probability, &mut errors);
		errors.into_result()?;

		debug!("numbers probability set to {probability}");
		self.numbers_probability = probability;
		Ok(())
	}

	/// Replaces the sampler after checking it honors the sampler contract.
	///
	/// # Errors
	/// `Capability` if the probe fails; the current sampler is kept.
	pub fn set_sampler(&mut self, mut sampler: Box<dyn Sampler>) -> Result<()> {
		ensure_capability(sampler.as_mut())?;
		debug!("sampler set to {}", sampler.name());
		self.sampler = sampler;
		self.sampler_kind = None;
		Ok(())
	}

	/// Applies every field of `config` at once.
	///
	/// # Behavior
	/// - Validates all fields, reporting every violation together.
	/// - Loads the new corpus and builds the new sampler aside.
	/// - Commits only when everything succeeded.
	///
	/// # Notes
	/// - An `rng_seed` without `sampler` reseeds the current built-in
	///   provider, or the default one if a custom sampler is installed.
	pub fn reconfigure(&mut self, config: &GeneratorConfig) -> Result<()> {
		config.validate()?;

		let corpus = match &config.seed_data_path {
			Some(path) => {
				let provider = FileCorpus::new(path);
				let corpus = provider.load()?;
				let distribution = LengthDistribution::from_corpus(&corpus);
				Some((corpus, distribution, provider.describe()))
			}
			None => None,
		};

		let sampler = if config.touches_sampler() {
			let kind = config.sampler.or(self.sampler_kind).unwrap_or_default();
			let mut sampler = kind.build(config.rng_seed);
			ensure_capability(sampler.as_mut())?;
			Some((kind, sampler))
		} else {
			None
		};

		if let Some((corpus, distribution, origin)) = corpus {
			self.commit_corpus(corpus, distribution, origin);
		}
		if let Some((kind, sampler)) = sampler {
			debug!("sampler set to {kind}");
			self.sampler = sampler;
			self.sampler_kind = Some(kind);
		}
		if let Some(probability) = config.numbers_probability {
			debug!("numbers probability set to {probability}");
			self.numbers_probability = probability;
		}
		Ok(())
	}

	fn commit_corpus(&mut self, corpus: WordCorpus, distribution: LengthDistribution, origin: String) {
		debug!(
			"corpus loaded from {origin}: {} words in {} buckets",
			corpus.word_count(),
			corpus.bucket_count()
		);
		self.corpus = corpus;
		self.distribution = distribution;
		self.corpus_origin = origin;
	}

	pub fn corpus(&self) -> &WordCorpus {
		&self.corpus
	}

	pub fn distribution(&self) -> &LengthDistribution {
		&self.distribution
	}

	pub fn numbers_probability(&self) -> f64 {
		self.numbers_probability
	}

	/// Snapshot of the active configuration.
	pub fn settings(&self) -> GeneratorSettings {
		GeneratorSettings {
			name_length: EOS_NAME_LENGTH,
			numbers_probability: self.numbers_probability,
			sampler: self.sampler.name().to_owned(),
			corpus: self.corpus_origin.clone(),
			word_count: self.corpus.word_count(),
			length_distribution: self.distribution.iter().collect(),
		}
	}
}

impl fmt::Debug for Generator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Generator")
			.field("corpus", &self.corpus_origin)
			.field("numbers_probability", &self.numbers_probability)
			.field("sampler", &self.sampler.name())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::error::Error;
	use crate::model::sampler::ShiftSampler;

	fn seeded(words: &[&str], seed: u64) -> Generator {
		let corpus = WordCorpus::from_words(words).unwrap();
		let mut generator = Generator::from_provider(&corpus).unwrap();
		generator.set_sampler(Box::new(ShiftSampler::seeded(seed))).unwrap();
		generator
	}

	#[test]
	fn default_generator_produces_valid_names() {
		let mut generator = Generator::new().unwrap();
		let name = generator.generate().unwrap();

		assert_eq!(name.len(), EOS_NAME_LENGTH);
		assert!(name.bytes().all(|b| b.is_ascii_lowercase() || (b'1'..=b'4').contains(&b)));
	}

	#[test]
	fn generate_many_returns_requested_count() {
		let mut generator = Generator::new().unwrap();

		assert!(generator.generate_many(0).unwrap().is_empty());
		let names = generator.generate_many(100).unwrap();
		assert_eq!(names.len(), 100);
		assert!(names.iter().all(|n| n.len() == EOS_NAME_LENGTH));
	}

	#[test]
	fn invalid_probability_keeps_previous_value() {
		let mut generator = Generator::new().unwrap();
		generator.set_numbers_probability(0.3).unwrap();

		for invalid in [-1.0, 1.01, f64::NAN] {
			let result = generator.set_numbers_probability(invalid);
			assert!(matches!(result, Err(Error::ConfigValidation(_))));
		}
		assert_eq!(generator.numbers_probability(), 0.3);
	}

	#[test]
	fn failed_corpus_change_keeps_previous_corpus() {
		let mut generator = seeded(&["frog", "elephant"], 1);

		let invalid = generator.set_corpus_provider(&FileCorpus::new("./no/such/file.txt"));
		assert!(matches!(invalid, Err(Error::SourceNotFound { .. })));

		assert_eq!(generator.corpus().word_count(), 2);
		assert_eq!(generator.generate().unwrap().len(), EOS_NAME_LENGTH);
	}

	#[test]
	fn reconfigure_is_all_or_nothing() {
		let mut generator = seeded(&["frog", "elephant"], 1);
		let before = generator.settings();

		let config = GeneratorConfig {
			numbers_probability: Some(0.9),
			seed_data_path: Some("./no/such/file.txt".into()),
			sampler: Some(SamplerKind::WeightedIndex),
			rng_seed: Some(4),
		};
		assert!(generator.reconfigure(&config).is_err());
		assert_eq!(generator.settings(), before);

		let config = GeneratorConfig { numbers_probability: Some(7.0), sampler: Some(SamplerKind::WeightedIndex), ..Default::default() };
		assert!(matches!(generator.reconfigure(&config), Err(Error::ConfigValidation(_))));
		assert_eq!(generator.settings(), before);
	}

	#[test]
	fn reconfigure_applies_every_field() {
		let mut generator = seeded(&["frog", "elephant"], 1);
		let config = GeneratorConfig {
			numbers_probability: Some(1.0),
			sampler: Some(SamplerKind::WeightedIndex),
			rng_seed: Some(8),
			..Default::default()
		};

		generator.reconfigure(&config).unwrap();

		let settings = generator.settings();
		assert_eq!(settings.numbers_probability, 1.0);
		assert_eq!(settings.sampler, "weighted-index");
		assert_eq!(settings.length_distribution, vec![(4, 0.5), (8, 0.5)]);
	}

	#[test]
	fn rng_seed_makes_generation_reproducible() {
		let config = GeneratorConfig { rng_seed: Some(42), ..Default::default() };
		let mut left = Generator::with_config(&config).unwrap();
		let mut right = Generator::with_config(&config).unwrap();

		assert_eq!(left.generate_many(20).unwrap(), right.generate_many(20).unwrap());
	}

	#[test]
	fn debug_shows_configuration() {
		let generator = seeded(&["frog"], 1);
		let debug = format!("{generator:?}");
		assert!(debug.contains("numbers_probability: 0.1"));
		assert!(debug.contains("shift"));
	}
}
