use std::collections::HashSet;

use docsim_core::SimilarityMatrix;

/// Added to the union size so two empty documents score 0 instead of NaN.
pub const JACCARD_EPSILON: f64 = 1e-12;

/// Pairwise Jaccard overlap of the unique whitespace tokens of each
/// normalized text.
pub fn jaccard_matrix<S: AsRef<str>>(normalized: &[S]) -> SimilarityMatrix {
	let sets: Vec<HashSet<&str>> = normalized
		.iter()
		.map(|text| text.as_ref().split_whitespace().collect())
		.collect();
	SimilarityMatrix::from_symmetric_fn(sets.len(), |i, j| jaccard(&sets[i], &sets[j]))
}

fn jaccard(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
	let inter = a.intersection(b).count() as f64;
	let union = a.union(b).count() as f64;
	inter / (union + JACCARD_EPSILON)
}
