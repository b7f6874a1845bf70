mod common;

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use common::*;
use docsim_core::config::{Config, PipelineSettings};
use docsim_core::{EmbeddingModelSpec, Error};
use docsim_embed::HashingEmbedder;
use docsim_extract::FileExtractor;
use docsim_pipeline::{ModelSlot, SemanticEngine, SimilarityOrchestrator};
use figment::providers::{Format, Toml};
use figment::Figment;
use tempfile::TempDir;

const DOCS: [&str; 3] = [
    "The committee approved the annual budget after a long debate.",
    "After a long debate, the committee approved the annual budget.",
    "Photosynthesis converts light energy into chemical energy in plants.",
];

#[test]
fn every_matrix_is_square_in_input_order() {
    let bundle = orchestrator(hashing_slots()).run_texts(&texts(&DOCS)).unwrap();
    assert_eq!(bundle.dim(), 3);
    for (name, m) in bundle.mandatory() {
        assert_eq!(m.dim(), 3, "{name}");
        for i in 0..3 {
            for j in 0..3 {
                let v = m.get(i, j);
                assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{name}[{i}][{j}] = {v}");
            }
        }
    }
    assert_eq!(bundle.embedding.len(), 3);
    for m in bundle.embedding.values() {
        assert_eq!(m.dim(), 3);
    }
    // the paraphrase pair outranks the unrelated document everywhere
    assert!(bundle.jaccard.get(0, 1) > bundle.jaccard.get(0, 2));
    assert!(bundle.tfidf_cosine.get(0, 1) > bundle.tfidf_cosine.get(0, 2));
}

#[test]
fn mandatory_matrices_are_symmetric() {
    let bundle = orchestrator(hashing_slots()).run_texts(&texts(&DOCS)).unwrap();
    for (name, m) in bundle.mandatory() {
        assert!(m.max_asymmetry() < 1e-9, "{name}");
    }
}

#[test]
fn identical_documents_score_one() {
    let doc = "Shared text about rivers, bridges and the towns between them.";
    let bundle = orchestrator(hashing_slots()).run_texts(&texts(&[doc, doc])).unwrap();
    assert_eq!(bundle.levenshtein.get(0, 1), 1.0);
    assert_eq!(bundle.jaro_winkler.get(0, 1), 1.0);
    assert!((bundle.tfidf_cosine.get(0, 1) - 1.0).abs() < 1e-9);
    assert!((bundle.jaccard.get(0, 1) - 1.0).abs() < 1e-9);
    assert!((bundle.jaccard.get(0, 0) - 1.0).abs() < 1e-9);
    for m in bundle.embedding.values() {
        assert!((m.get(0, 1) - 1.0).abs() < 1e-6);
    }
}

#[test]
fn disjoint_vocabularies_have_zero_jaccard() {
    let bundle = orchestrator(hashing_slots()).run_texts(&texts(&["apples oranges", "submarines torpedoes"])).unwrap();
    assert_eq!(bundle.jaccard.get(0, 1), 0.0);
    assert_eq!(bundle.tfidf_cosine.get(0, 1), 0.0);
}

#[test]
fn single_document_is_rejected_before_any_work() {
    let counter = Arc::new(CountingEmbedder::default());
    let slots = vec![ModelSlot::available(EmbeddingModelSpec::MINILM, counter.clone())];
    let orch = orchestrator(slots);

    let err = orch.run_texts(&texts(&["only one"])).unwrap_err();
    assert!(matches!(err, Error::TooFewDocuments(1)));
    assert!(err.is_client_error());
    assert!(matches!(orch.run_texts(&[]).unwrap_err(), Error::TooFewDocuments(0)));
    assert_eq!(counter.calls.load(Ordering::SeqCst), 0);

    orch.run_texts(&texts(&["one", "two"])).unwrap();
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn documents_without_usable_words_are_rejected() {
    let err = orchestrator(hashing_slots()).run_texts(&texts(&["the and of", "   \n "])).unwrap_err();
    assert!(matches!(err, Error::NoUsableText));
    assert_eq!(err.status_code(), 400);
}

#[test]
fn hyphenated_words_alone_are_not_usable_text() {
    let err = orchestrator(hashing_slots())
        .run_texts(&texts(&["well-known e-mail", "state-of-the-art x-ray"]))
        .unwrap_err();
    assert!(matches!(err, Error::NoUsableText));
}

#[test]
fn all_models_failing_still_returns_mandatory_matrices() {
    let slots = vec![
        ModelSlot::available(EmbeddingModelSpec::MINILM, Arc::new(FailingEmbedder)),
        ModelSlot::available(EmbeddingModelSpec::MPNET, Arc::new(PanickingEmbedder)),
        ModelSlot::unavailable(EmbeddingModelSpec::MULTI_MPNET, "weights missing"),
    ];
    let bundle = orchestrator(slots).run_texts(&texts(&DOCS)).unwrap();
    assert!(bundle.embedding.is_empty());
    for (_, m) in bundle.mandatory() {
        assert_eq!(m.dim(), 3);
    }

    let json = serde_json::to_value(&bundle).unwrap();
    assert_eq!(json["embedding"], serde_json::json!({}));
}

#[test]
fn degenerate_word_vocabulary_uses_char_ngrams() {
    // single letters survive normalization but are too short for word features
    let bundle = orchestrator(hashing_slots()).run_texts(&texts(&["B C", "E F", "b   c"])).unwrap();
    let m = &bundle.tfidf_cosine;
    assert_eq!(m.dim(), 3);
    assert!((m.get(0, 2) - 1.0).abs() < 1e-9);
    assert_eq!(m.get(0, 1), 0.0);
}

#[test]
fn slow_models_are_dropped_at_the_deadline() {
    let slow = SlowEmbedder { delay: Duration::from_secs(3), inner: HashingEmbedder::new(32, 64) };
    let slots = vec![
        ModelSlot::available(EmbeddingModelSpec::MINILM, hashing(0)),
        ModelSlot::available(EmbeddingModelSpec::MPNET, Arc::new(slow)),
    ];
    let orch = orchestrator(slots).with_timeout(Some(Duration::from_millis(500)));
    let bundle = orch.run_texts(&texts(&DOCS)).unwrap();
    assert_eq!(bundle.embedding.keys().collect::<Vec<_>>(), ["MiniLM"]);
}

#[test]
fn mandatory_stage_past_deadline_times_out() {
    let orch = orchestrator(hashing_slots()).with_timeout(Some(Duration::ZERO));
    let err = orch.run_texts(&texts(&DOCS)).unwrap_err();
    assert!(matches!(err, Error::Timeout { .. }), "{err}");
    assert_eq!(err.status_code(), 500);
}

#[test]
fn run_files_extracts_then_compares() {
    let tmp = TempDir::new().unwrap();
    let a = tmp.path().join("a.txt");
    let b = tmp.path().join("b.md");
    std::fs::write(&a, DOCS[0]).unwrap();
    std::fs::write(&b, DOCS[1]).unwrap();

    let orch = orchestrator(hashing_slots());
    let bundle = orch.run_files(&FileExtractor::default(), &[a.clone(), b]).unwrap();
    assert_eq!(bundle.dim(), 2);

    let err = orch.run_files(&FileExtractor::default(), &[a.clone(), tmp.path().join("missing.txt")]).unwrap_err();
    assert!(matches!(err, Error::NotFound(_)));

    // count is checked before extraction
    let err = orch.run_files(&FileExtractor::default(), &[tmp.path().join("missing.txt")]).unwrap_err();
    assert!(matches!(err, Error::TooFewDocuments(1)));
}

#[test]
fn built_from_settings_with_hashing_models() {
    let toml = "[models]\nuse_fake = true\nfake_dim = 32\n\n[pipeline]\nparallel_models = false\n";
    let settings = Config::from_figment(Figment::new().merge(Toml::string(toml))).settings().unwrap();
    let orch = SimilarityOrchestrator::from_settings(&settings);
    assert_eq!(orch.semantic().available_models(), ["MiniLM", "MPNet", "Multi_MPNet"]);

    let bundle = orch.run_texts(&texts(&DOCS)).unwrap();
    assert_eq!(bundle.embedding.len(), 3);
}

#[test]
fn narrow_ngram_range_is_honoured() {
    let pipeline = PipelineSettings { char_ngram_min: 1, char_ngram_max: 1, ..PipelineSettings::default() };
    let orch = SimilarityOrchestrator::new(SemanticEngine::new(Vec::new(), true), &pipeline);
    // unigram chars: "b c" and "c b" share every feature
    let bundle = orch.run_texts(&texts(&["b c", "c b"])).unwrap();
    assert!((bundle.tfidf_cosine.get(0, 1) - 1.0).abs() < 1e-9);
    assert!(bundle.embedding.is_empty());
}
