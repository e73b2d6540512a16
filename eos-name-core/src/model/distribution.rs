use serde::Serialize;

use super::corpus::WordCorpus;

/// Probability of drawing each word length from a corpus.
///
/// The probability of a length is the share of corpus words having
/// that length, so sampling a length then a word uniformly inside its
/// bucket is the same as sampling a word uniformly from the corpus.
///
/// # Invariants
/// - `lengths` and `probabilities` have the same size and order
/// - Probabilities are non-negative and sum to 1.0 (up to rounding)
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct LengthDistribution {
	lengths: Vec<usize>,
	probabilities: Vec<f64>,
}

impl LengthDistribution {
	/// Derives the distribution from bucket sizes.
	pub fn from_corpus(corpus: &WordCorpus) -> Self {
		let total = corpus.word_count() as f64;
		let (lengths, probabilities) = corpus
			.buckets()
			.map(|(len, words)| (len, words.len() as f64 / total))
			.unzip();

		Self { lengths, probabilities }
	}

	/// Word lengths, in increasing order.
	pub fn lengths(&self) -> &[usize] {
		&self.lengths
	}

	/// Probabilities matching `lengths()` index by index.
	pub fn probabilities(&self) -> &[f64] {
		&self.probabilities
	}

	/// Probability of `len`, 0.0 when the corpus has no such words.
	pub fn probability(&self, len: usize) -> f64 {
		self.lengths
			.iter()
			.position(|l| *l == len)
			.map_or(0.0, |index| self.probabilities[index])
	}

	/// Iterates `(length, probability)` pairs.
	pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
		self.lengths.iter().copied().zip(self.probabilities.iter().copied())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn probabilities_follow_bucket_sizes() {
		let corpus = WordCorpus::from_words(["frog", "lion", "bear", "elephant"]).unwrap();
		let distribution = LengthDistribution::from_corpus(&corpus);

		assert_eq!(distribution.lengths(), &[4, 8]);
		assert_eq!(distribution.probability(4), 0.75);
		assert_eq!(distribution.probability(8), 0.25);
		assert_eq!(distribution.probability(5), 0.0);
	}

	#[test]
	fn probabilities_sum_to_one() {
		let corpus = WordCorpus::bundled().unwrap();
		let distribution = LengthDistribution::from_corpus(&corpus);

		let sum: f64 = distribution.iter().map(|(_, p)| p).sum();
		assert!((sum - 1.0).abs() < 1e-9);
		assert!(distribution.probabilities().iter().all(|p| *p > 0.0));
	}
}
