//! Random `EOS` account name generation.
//!
//! This crate builds 12-character names that satisfy the `eosio` account
//! naming rules by gluing dictionary words together:
//! - Seed corpus loading, grouped by word length
//! - Length distribution derived from the corpus bucket sizes
//! - Weighted sampling with swappable sampler providers
//! - Name composition from a base word and a word or digit suffix
//!
//! The [`Generator`] facade is the entry point; the lower-level pieces
//! are public so callers can compose names with their own corpus or sampler.

/// Error taxonomy shared by every module.
pub mod error;

/// Corpus, sampling, composition and the generator facade.
pub mod model;

/// I/O utilities (line reading).
///
/// Not exposed
pub(crate) mod io;

pub use error::{Error, Result, SamplerError, ValidationErrors};
pub use model::generator::Generator;
