use tantivy::tokenizer::TextAnalyzer;

use crate::analyzer::{analyze, build_analyzer};
use crate::lemma::lemmatize;

/// Turns raw document text into the space-joined token string the lexical
/// and statistical engines compare.
///
/// Steps: collapse whitespace, tokenize (lowercased, stop words removed,
/// hyphenated and dotted words kept whole), keep purely alphabetic tokens,
/// lemmatize, rejoin with single spaces.
#[derive(Clone)]
pub struct TextNormalizer {
	analyzer: TextAnalyzer,
}

impl TextNormalizer {
	pub fn new() -> Self {
		Self { analyzer: build_analyzer() }
	}

	pub fn normalize(&self, raw: &str) -> String {
		let cleaned = collapse_whitespace(raw);
		if cleaned.is_empty() {
			return String::new();
		}
		// token_stream needs `&mut`; analyzers are cheap to clone
		let mut analyzer = self.analyzer.clone();
		analyze(&mut analyzer, &cleaned)
			.iter()
			.filter(|token| token.chars().all(char::is_alphabetic))
			.map(|token| lemmatize(token).into_owned())
			.collect::<Vec<_>>()
			.join(" ")
	}
}

impl Default for TextNormalizer {
	fn default() -> Self {
		Self::new()
	}
}

/// Lowercase and squeeze every whitespace run into a single space.
pub fn collapse_whitespace(raw: &str) -> String {
	raw.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}
