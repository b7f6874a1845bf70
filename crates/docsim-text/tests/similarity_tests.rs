use docsim_text::tfidf::{sparse_dot, Analyzer, TfidfVectorizer};
use docsim_text::{
    jaccard_matrix, jaro_winkler_matrix, levenshtein_ratio_matrix, FeatureStrategy, StatisticalEngine, TfidfError,
};

const EPS: f64 = 1e-9;

#[test]
fn jaccard_scores_overlap_of_unique_tokens() {
    let m = jaccard_matrix(&["a b c", "b c d c", "x y", ""]);
    assert_eq!(m.dim(), 4);
    assert!((m.get(0, 0) - 1.0).abs() < EPS);
    assert!((m.get(0, 1) - 0.5).abs() < EPS);
    assert_eq!(m.get(0, 2), 0.0, "disjoint vocabularies");
    assert_eq!(m.get(3, 3), 0.0, "empty against empty stays 0");
    assert_eq!(m.max_asymmetry(), 0.0);
}

#[test]
fn identical_raw_texts_score_one_on_surface_metrics() {
    let docs = ["The quick brown fox.", "The quick brown fox.", "Lorem ipsum dolor sit amet"];
    let lev = levenshtein_ratio_matrix(&docs);
    let jw = jaro_winkler_matrix(&docs);
    for m in [&lev, &jw] {
        assert_eq!(m.dim(), 3);
        assert_eq!(m.get(0, 1), 1.0);
        for i in 0..3 {
            assert_eq!(m.get(i, i), 1.0);
            for j in 0..3 {
                assert!((0.0..=1.0).contains(&m.get(i, j)));
            }
        }
        assert!(m.get(0, 2) < 1.0);
    }
    assert_eq!(lev.max_asymmetry(), 0.0);
    assert!(jw.max_asymmetry() < 1e-9);
}

#[test]
fn jaro_winkler_reference_value() {
    let m = jaro_winkler_matrix(&["MARTHA", "MARHTA"]);
    assert!((m.get(0, 1) - 0.9611).abs() < 1e-3);
}

#[test]
fn levenshtein_ratio_counts_insertions_and_deletions() {
    let m = levenshtein_ratio_matrix(&["abcd", "abed", ""]);
    // LCS = 3 -> 6 / 8
    assert!((m.get(0, 1) - 0.75).abs() < EPS);
    assert_eq!(m.get(0, 2), 0.0);
    assert_eq!(m.get(2, 2), 1.0);
}

#[test]
fn tfidf_uses_smoothed_idf() {
    let engine = StatisticalEngine::default();
    let docs = ["alpha beta", "alpha gamma", "alpha beta"];
    let out = engine.tfidf_cosine_matrix(&docs, &docs).unwrap();
    assert_eq!(out.strategy, FeatureStrategy::Words);
    assert!((out.matrix.get(0, 2) - 1.0).abs() < EPS);
    assert!((out.matrix.get(0, 0) - 1.0).abs() < EPS);

    // idf(alpha) = 1, idf(beta) = ln(4/3) + 1, idf(gamma) = ln(4/2) + 1
    let b = (4.0f64 / 3.0).ln() + 1.0;
    let g = 2.0f64.ln() + 1.0;
    let expected = 1.0 / ((1.0 + b * b).sqrt() * (1.0 + g * g).sqrt());
    assert!((out.matrix.get(0, 1) - expected).abs() < EPS);
    assert_eq!(out.matrix.max_asymmetry(), 0.0);
}

#[test]
fn tfidf_disjoint_documents_score_zero() {
    let docs = ["apple orchard", "submarine engine"];
    let out = StatisticalEngine::default().tfidf_cosine_matrix(&docs, &docs).unwrap();
    assert_eq!(out.matrix.get(0, 1), 0.0);
}

#[test]
fn single_letter_vocabulary_falls_back_to_char_ngrams() {
    let normalized = ["b c", "e f", "b c"];
    let raw = ["B  C", "E F", "b c"];
    let out = StatisticalEngine::default().tfidf_cosine_matrix(&normalized, &raw).unwrap();
    assert_eq!(out.strategy, FeatureStrategy::CharNgrams);
    assert_eq!(out.matrix.dim(), 3);
    assert!((out.matrix.get(0, 2) - 1.0).abs() < EPS, "whitespace collapsed and lowercased");
    assert_eq!(out.matrix.get(0, 1), 0.0);
}

#[test]
fn fallback_substitutes_placeholder_for_empty_documents() {
    let normalized = ["x", ""];
    let raw = ["x-ray xylophone", "the and of"];
    let out = StatisticalEngine::default().tfidf_cosine_matrix(&normalized, &raw).unwrap();
    assert_eq!(out.strategy, FeatureStrategy::CharNgrams);
    assert!((out.matrix.get(0, 0) - 1.0).abs() < EPS);
    assert_eq!(out.matrix.get(1, 1), 0.0, "placeholder yields no n-grams");
    assert_eq!(out.matrix.get(0, 1), 0.0);
}

#[test]
fn fallback_failure_is_reported() {
    let err = StatisticalEngine::default().tfidf_cosine_matrix(&["", ""], &["", ""]).unwrap_err();
    assert_eq!(err, TfidfError::EmptyVocabulary);
    assert!(err.to_string().contains("empty vocabulary"));
}

#[test]
fn vectorizer_rows_are_unit_length() {
    let rows = TfidfVectorizer::new(Analyzer::Char { min: 2, max: 3 })
        .fit_transform(&["hello there", "general kenobi"])
        .unwrap();
    for row in &rows {
        assert!((sparse_dot(row, row) - 1.0).abs() < EPS);
        assert!(row.windows(2).all(|w| w[0].0 < w[1].0));
    }
}
