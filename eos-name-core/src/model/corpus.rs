use std::collections::BTreeMap;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::EOS_NAME_LENGTH;
use crate::error::{Error, Result};
use crate::io::{read_file, read_lines};

/// Noun list shipped with the crate, one word per line.
const BUNDLED_NOUNS: &str = include_str!("../../data/nounlist.txt");

const INVALID_DATA_MESSAGE: &str = "Data contains invalid characters or does not match the name length";

/// Seed words grouped by their exact length.
///
/// # Invariants
/// - Every word is lowercase ASCII and at most `EOS_NAME_LENGTH` long
/// - Every word in bucket `k` has length `k`
/// - Buckets are never empty and keep the input order of their words
/// - The corpus holds at least one word
///
/// Only the constructors can build a corpus, so a value of this type
/// always satisfies the invariants above.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WordCorpus {
	buckets: BTreeMap<usize, Vec<String>>,
	word_count: usize,
}

impl WordCorpus {
	/// Builds a corpus from already tokenized words.
	///
	/// # Errors
	/// - `DataValidation` if any word is invalid. No partial corpus is produced.
	/// - `DataValidation` if there are no words at all.
	pub fn from_words<I, S>(words: I) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut buckets: BTreeMap<usize, Vec<String>> = BTreeMap::new();
		let mut word_count = 0;

		for word in words {
			let word = word.as_ref();
			if !is_valid_word(word) {
				return Err(Error::data_validation(format!("{INVALID_DATA_MESSAGE}: {word:?}")));
			}
			buckets.entry(word.len()).or_default().push(word.to_owned());
			word_count += 1;
		}

		if word_count == 0 {
			return Err(Error::data_validation("Data contains no words"));
		}

		Ok(Self { buckets, word_count })
	}

	/// Reads newline-separated words from a stream.
	///
	/// A non UTF-8 stream is reported as invalid data, any other
	/// read failure as `SourceNotFound`.
	pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
		let lines = read_lines(reader).map_err(|e| read_error(Path::new("<stream>"), e))?;
		Self::from_words(lines)
	}

	/// Reads newline-separated words from a file.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
		let path = path.as_ref();
		let lines = read_file(path).map_err(|e| read_error(path, e))?;
		Self::from_words(lines)
	}

	/// Loads the noun list bundled with the crate.
	pub fn bundled() -> Result<Self> {
		Self::from_words(BUNDLED_NOUNS.lines())
	}

	/// Words of exactly `len` characters, empty if there are none.
	pub fn bucket(&self, len: usize) -> &[String] {
		self.buckets.get(&len).map(Vec::as_slice).unwrap_or(&[])
	}

	/// Iterates buckets in increasing length order.
	pub fn buckets(&self) -> impl Iterator<Item = (usize, &[String])> {
		self.buckets.iter().map(|(len, words)| (*len, words.as_slice()))
	}

	/// Word lengths present in the corpus, in increasing order.
	pub fn lengths(&self) -> impl Iterator<Item = usize> + '_ {
		self.buckets.keys().copied()
	}

	pub fn word_count(&self) -> usize {
		self.word_count
	}

	pub fn bucket_count(&self) -> usize {
		self.buckets.len()
	}
}

fn is_valid_word(word: &str) -> bool {
	!word.is_empty() && word.len() <= EOS_NAME_LENGTH && word.bytes().all(|b| b.is_ascii_lowercase())
}

fn read_error(path: &Path, error: std::io::Error) -> Error {
	if error.kind() == ErrorKind::InvalidData {
		Error::data_validation(format!("{INVALID_DATA_MESSAGE}: not valid UTF-8"))
	} else {
		Error::SourceNotFound { path: path.to_path_buf(), source: error }
	}
}

/// Anything able to produce a validated corpus.
///
/// The generator only depends on this capability, so a corpus can come
/// from the bundled list, a file, or memory.
pub trait CorpusProvider {
	/// Loads and validates the corpus.
	fn load(&self) -> Result<WordCorpus>;

	/// Short human-readable origin, used in logs and settings.
	fn describe(&self) -> String;
}

/// The noun list shipped with the crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledCorpus;

impl CorpusProvider for BundledCorpus {
	fn load(&self) -> Result<WordCorpus> {
		WordCorpus::bundled()
	}

	fn describe(&self) -> String {
		"bundled:nounlist".to_owned()
	}
}

/// A plain text word list on disk.
#[derive(Debug, Clone)]
pub struct FileCorpus {
	path: PathBuf,
}

impl FileCorpus {
	pub fn new<P: Into<PathBuf>>(path: P) -> Self {
		Self { path: path.into() }
	}

	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl CorpusProvider for FileCorpus {
	fn load(&self) -> Result<WordCorpus> {
		WordCorpus::from_file(&self.path)
	}

	fn describe(&self) -> String {
		self.path.display().to_string()
	}
}

impl CorpusProvider for WordCorpus {
	fn load(&self) -> Result<WordCorpus> {
		Ok(self.clone())
	}

	fn describe(&self) -> String {
		format!("memory:{} words", self.word_count)
	}
}
