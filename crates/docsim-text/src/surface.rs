use docsim_core::SimilarityMatrix;
use rapidfuzz::fuzz;
use tracing::debug;

/// Normalized indel similarity: `2 * LCS(a, b) / (|a| + |b|)` over chars.
///
/// Identical strings (including two empty ones) score 1.
pub fn levenshtein_ratio(a: &str, b: &str) -> f64 {
	if a.is_empty() && b.is_empty() {
		return 1.0;
	}
	fuzz::ratio(a.chars(), b.chars())
}

/// Pairwise [`levenshtein_ratio`] over raw texts. The score is commutative,
/// so only the upper triangle is evaluated.
pub fn levenshtein_ratio_matrix<S: AsRef<str>>(raw: &[S]) -> SimilarityMatrix {
	SimilarityMatrix::from_symmetric_fn(raw.len(), |i, j| {
		if i == j {
			1.0
		} else {
			levenshtein_ratio(raw[i].as_ref(), raw[j].as_ref())
		}
	})
}

/// Pairwise Jaro-Winkler similarity over raw texts, every ordered pair.
pub fn jaro_winkler_matrix<S: AsRef<str>>(raw: &[S]) -> SimilarityMatrix {
	let m = SimilarityMatrix::from_fn(raw.len(), |i, j| strsim::jaro_winkler(raw[i].as_ref(), raw[j].as_ref()));
	let skew = m.max_asymmetry();
	if skew > 0.0 {
		debug!(skew, "jaro-winkler matrix is not exactly symmetric");
	}
	m
}

#[cfg(test)]
mod tests {
	use super::*;

	fn lcs_dp(a: &[char], b: &[char]) -> usize {
		let mut prev = vec![0usize; b.len() + 1];
		for ca in a {
			let mut cur = vec![0usize; b.len() + 1];
			for (j, cb) in b.iter().enumerate() {
				cur[j + 1] = if ca == cb { prev[j] + 1 } else { prev[j + 1].max(cur[j]) };
			}
			prev = cur;
		}
		prev[b.len()]
	}

	#[test]
	fn ratio_matches_lcs_reference() {
		let long_a: String = (0..300).map(|i| char::from(b'a' + (i * 7 % 26) as u8)).collect();
		let long_b: String = (0..230).map(|i| char::from(b'a' + (i * 11 % 26) as u8)).collect();
		let cases = [
			("kitten", "sitting"),
			("abc", "abc"),
			("abc", "xyz"),
			("naïve café", "naive cafe"),
			(long_a.as_str(), long_b.as_str()),
			(long_a.as_str(), long_a.as_str()),
		];
		for (a, b) in cases {
			let ac: Vec<char> = a.chars().collect();
			let bc: Vec<char> = b.chars().collect();
			let expected = 2.0 * lcs_dp(&ac, &bc) as f64 / (ac.len() + bc.len()) as f64;
			assert!((levenshtein_ratio(a, b) - expected).abs() < 1e-9, "{a:?} vs {b:?}");
			assert!((levenshtein_ratio(b, a) - expected).abs() < 1e-9, "{b:?} vs {a:?}");
		}
	}

	#[test]
	fn ratio_is_indel_based() {
		// LCS("kitten", "sitting") = 4 -> 8 / 13
		assert!((levenshtein_ratio("kitten", "sitting") - 8.0 / 13.0).abs() < 1e-12);
		assert_eq!(levenshtein_ratio("", ""), 1.0);
		assert_eq!(levenshtein_ratio("abc", ""), 0.0);
	}
}
