//! Top-level module for the name generation system.
//!
//! - Length-bucketed seed corpus (`WordCorpus`) and its providers
//! - Length sampling probabilities (`LengthDistribution`)
//! - Weighted samplers (`Sampler`, `ShiftSampler`, `WeightedIndexSampler`)
//! - Name composition (`compose`)
//! - Validated configuration (`GeneratorConfig`)
//! - A high-level generation interface (`Generator`)

/// Length of every generated `EOS` account name.
pub const EOS_NAME_LENGTH: usize = 12;

/// Seed word list loading and validation.
///
/// Groups words by exact length and rejects the whole list on the
/// first invalid word.
pub mod corpus;

/// Word-length sampling probabilities derived from a corpus.
pub mod distribution;

/// Discrete weighted sampling.
///
/// Defines the sampler capability and its two providers.
pub mod sampler;

/// Assembles one fixed-length name from a base word and a suffix.
pub mod composer;

/// Configuration input and field-tagged validation.
pub mod config;

/// High-level generator owning corpus, distribution and sampler.
///
/// Exposes single and batch generation and atomic reconfiguration.
pub mod generator;
