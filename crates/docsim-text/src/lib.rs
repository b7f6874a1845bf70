//! Text side of docsim: the normalizer and the engines that compare
//! documents by their words and characters.
//!
//! - `normalize`: raw text to lemmatized, stop-word-free token strings
//! - `lexical`: Jaccard overlap of normalized token sets
//! - `surface`: Levenshtein ratio and Jaro-Winkler over raw text
//! - `tfidf`: TF-IDF cosine with the character n-gram fallback

pub mod analyzer;
pub mod lemma;
pub mod lexical;
pub mod normalize;
pub mod surface;
pub mod tfidf;

pub use lexical::jaccard_matrix;
pub use normalize::{collapse_whitespace, TextNormalizer};
pub use surface::{jaro_winkler_matrix, levenshtein_ratio, levenshtein_ratio_matrix};
pub use tfidf::{FeatureStrategy, StatisticalEngine, StatisticalOutcome, TfidfError};
