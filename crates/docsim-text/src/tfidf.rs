//! TF-IDF vector space with cosine similarity.
//!
//! Word features first; when no document yields a single word feature the
//! engine retries once with character n-grams over the raw text.

use std::collections::{BTreeMap, HashMap};

use docsim_core::SimilarityMatrix;
use thiserror::Error;
use tracing::warn;

/// Stands in for documents that normalized to nothing during the fallback.
pub const PLACEHOLDER: &str = "_";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TfidfError {
	#[error("empty vocabulary; perhaps the documents only contain stop words")]
	EmptyVocabulary,
}

/// Which feature space produced a TF-IDF matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureStrategy {
	Words,
	CharNgrams,
}

/// How a vectorizer splits a document into features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Analyzer {
	/// Runs of two or more word characters.
	Word,
	/// Every contiguous span of `min..=max` chars after whitespace collapsing.
	Char { min: usize, max: usize },
}

impl Analyzer {
	fn features(&self, text: &str) -> Vec<String> {
		let lowered = text.to_lowercase();
		match *self {
			Analyzer::Word => word_tokens(&lowered),
			Analyzer::Char { min, max } => char_ngrams(&lowered, min, max),
		}
	}
}

fn word_tokens(text: &str) -> Vec<String> {
	text.split(|c: char| !(c.is_alphanumeric() || c == '_'))
		.filter(|tok| tok.chars().count() >= 2)
		.map(str::to_string)
		.collect()
}

fn char_ngrams(text: &str, min: usize, max: usize) -> Vec<String> {
	let chars: Vec<char> = text.split_whitespace().collect::<Vec<_>>().join(" ").chars().collect();
	let mut grams = Vec::new();
	for n in min..=max {
		if n == 0 || n > chars.len() {
			continue;
		}
		grams.extend(chars.windows(n).map(|w| w.iter().collect::<String>()));
	}
	grams
}

/// One L2-normalized document vector: `(feature index, weight)` sorted by index.
pub type SparseRow = Vec<(usize, f64)>;

/// Fits a vocabulary and smoothed IDF weights over a document set and
/// returns the weighted rows.
#[derive(Debug, Clone, Copy)]
pub struct TfidfVectorizer {
	analyzer: Analyzer,
}

impl TfidfVectorizer {
	pub fn new(analyzer: Analyzer) -> Self {
		Self { analyzer }
	}

	pub fn fit_transform<S: AsRef<str>>(&self, docs: &[S]) -> Result<Vec<SparseRow>, TfidfError> {
		let counts: Vec<HashMap<String, usize>> = docs
			.iter()
			.map(|doc| {
				let mut tf = HashMap::new();
				for feature in self.analyzer.features(doc.as_ref()) {
					*tf.entry(feature).or_insert(0) += 1;
				}
				tf
			})
			.collect();

		let mut df: BTreeMap<&str, usize> = BTreeMap::new();
		for tf in &counts {
			for term in tf.keys() {
				*df.entry(term.as_str()).or_insert(0) += 1;
			}
		}
		if df.is_empty() {
			return Err(TfidfError::EmptyVocabulary);
		}

		let n = docs.len() as f64;
		let vocab: HashMap<&str, (usize, f64)> = df
			.iter()
			.enumerate()
			.map(|(idx, (term, freq))| (*term, (idx, ((1.0 + n) / (1.0 + *freq as f64)).ln() + 1.0)))
			.collect();

		Ok(counts
			.iter()
			.map(|tf| {
				let mut row: SparseRow = tf
					.iter()
					.map(|(term, count)| {
						let (idx, idf) = vocab[term.as_str()];
						(idx, *count as f64 * idf)
					})
					.collect();
				row.sort_unstable_by_key(|(idx, _)| *idx);
				let norm = row.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
				if norm > 0.0 {
					row.iter_mut().for_each(|(_, w)| *w /= norm);
				}
				row
			})
			.collect())
	}
}

/// Dot product of two index-sorted sparse rows.
pub fn sparse_dot(a: &[(usize, f64)], b: &[(usize, f64)]) -> f64 {
	let (mut i, mut j, mut acc) = (0, 0, 0.0);
	while i < a.len() && j < b.len() {
		match a[i].0.cmp(&b[j].0) {
			std::cmp::Ordering::Less => i += 1,
			std::cmp::Ordering::Greater => j += 1,
			std::cmp::Ordering::Equal => {
				acc += a[i].1 * b[j].1;
				i += 1;
				j += 1;
			}
		}
	}
	acc
}

fn cosine_matrix(rows: &[SparseRow]) -> SimilarityMatrix {
	SimilarityMatrix::from_symmetric_fn(rows.len(), |i, j| sparse_dot(&rows[i], &rows[j]).clamp(0.0, 1.0))
}

#[derive(Debug, Clone)]
pub struct StatisticalOutcome {
	pub matrix: SimilarityMatrix,
	pub strategy: FeatureStrategy,
}

/// Word-level TF-IDF cosine with the char n-gram fallback.
#[derive(Debug, Clone, Copy)]
pub struct StatisticalEngine {
	char_ngram_min: usize,
	char_ngram_max: usize,
}

impl StatisticalEngine {
	pub fn new(char_ngram_min: usize, char_ngram_max: usize) -> Self {
		Self { char_ngram_min, char_ngram_max }
	}

	/// `normalized` drives the word space; `raw` (same order and length)
	/// feeds the fallback.
	pub fn tfidf_cosine_matrix<S, R>(&self, normalized: &[S], raw: &[R]) -> Result<StatisticalOutcome, TfidfError>
	where
		S: AsRef<str>,
		R: AsRef<str>,
	{
		match TfidfVectorizer::new(Analyzer::Word).fit_transform(normalized) {
			Ok(rows) => Ok(StatisticalOutcome { matrix: cosine_matrix(&rows), strategy: FeatureStrategy::Words }),
			Err(TfidfError::EmptyVocabulary) => {
				warn!(
					min = self.char_ngram_min,
					max = self.char_ngram_max,
					"no word features in any document; falling back to character n-grams"
				);
				let docs: Vec<&str> = normalized
					.iter()
					.zip(raw)
					.map(|(norm, raw)| if norm.as_ref().trim().is_empty() { PLACEHOLDER } else { raw.as_ref() })
					.collect();
				let analyzer = Analyzer::Char { min: self.char_ngram_min, max: self.char_ngram_max };
				let rows = TfidfVectorizer::new(analyzer).fit_transform(&docs)?;
				Ok(StatisticalOutcome { matrix: cosine_matrix(&rows), strategy: FeatureStrategy::CharNgrams })
			}
		}
	}
}

impl Default for StatisticalEngine {
	fn default() -> Self {
		Self::new(3, 5)
	}
}
