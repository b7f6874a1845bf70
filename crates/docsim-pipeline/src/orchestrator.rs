use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use docsim_core::config::{PipelineSettings, Settings};
use docsim_core::{Document, Error, Result, ResultBundle, TextExtractor};
use docsim_text::{jaccard_matrix, jaro_winkler_matrix, levenshtein_ratio_matrix, StatisticalEngine, TextNormalizer};
use tracing::{debug, info, info_span};

use crate::semantic::{panic_message, SemanticEngine};

/// Drives one similarity request: validation, normalization, the four
/// mandatory engines, then the per-model semantic engine.
///
/// Built once and shared; holds no per-request state.
pub struct SimilarityOrchestrator {
    normalizer: TextNormalizer,
    statistical: StatisticalEngine,
    semantic: SemanticEngine,
    timeout: Option<Duration>,
}

impl SimilarityOrchestrator {
    pub fn new(semantic: SemanticEngine, pipeline: &PipelineSettings) -> Self {
        Self {
            normalizer: TextNormalizer::new(),
            statistical: StatisticalEngine::new(pipeline.char_ngram_min, pipeline.char_ngram_max),
            semantic,
            timeout: pipeline.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Load every model named in `settings` and wire up the engines.
    pub fn from_settings(settings: &Settings) -> Self {
        let semantic = SemanticEngine::from_settings(&settings.models, settings.pipeline.parallel_models);
        Self::new(semantic, &settings.pipeline)
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn semantic(&self) -> &SemanticEngine {
        &self.semantic
    }

    /// Extract every file, then run the pipeline. The document count is
    /// checked before any file is read.
    pub fn run_files<E>(&self, extractor: &E, paths: &[PathBuf]) -> Result<ResultBundle>
    where
        E: TextExtractor + ?Sized,
    {
        ensure_enough(paths.len())?;
        let raw = paths.iter().map(|p| extractor.extract(p)).collect::<Result<Vec<_>>>()?;
        self.run_texts(&raw)
    }

    /// Run the pipeline on already-extracted texts.
    pub fn run_texts(&self, raw_texts: &[String]) -> Result<ResultBundle> {
        ensure_enough(raw_texts.len())?;
        let documents: Vec<Document> = raw_texts
            .iter()
            .map(|raw| Document::new(raw.clone(), self.normalizer.normalize(raw)))
            .collect();
        self.run(&documents)
    }

    pub fn run(&self, documents: &[Document]) -> Result<ResultBundle> {
        let start = Instant::now();
        let deadline = self.timeout.map(|t| start + t);
        ensure_enough(documents.len())?;
        if documents.iter().all(Document::is_blank) {
            return Err(Error::NoUsableText);
        }

        let raw: Vec<String> = documents.iter().map(|d| d.raw_text().to_string()).collect();
        let normalized: Vec<&str> = documents.iter().map(Document::normalized_text).collect();

        let jaccard = run_stage("jaccard", deadline, || Ok(jaccard_matrix(&normalized)))?;
        let levenshtein = run_stage("levenshtein", deadline, || Ok(levenshtein_ratio_matrix(&raw)))?;
        let jaro_winkler = run_stage("jaro_winkler", deadline, || Ok(jaro_winkler_matrix(&raw)))?;
        let tfidf_cosine = run_stage("tfidf", deadline, || {
            let outcome = self
                .statistical
                .tfidf_cosine_matrix(&normalized, &raw)
                .map_err(|e| Error::internal("tfidf", format!("{e:?}"), e))?;
            debug!(strategy = ?outcome.strategy, "tfidf feature space");
            Ok(outcome.matrix)
        })?;

        let semantic = {
            let span = info_span!("stage", name = "embedding");
            let _enter = span.enter();
            let t = Instant::now();
            let outcome = self.semantic.compute(&raw, deadline);
            debug!(elapsed_ms = t.elapsed().as_millis() as u64, omitted = outcome.failures.len(), "stage finished");
            outcome
        };

        let bundle = ResultBundle { tfidf_cosine, jaccard, levenshtein, jaro_winkler, embedding: semantic.matrices };
        info!(
            documents = documents.len(),
            embedding_models = bundle.embedding.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "similarity analysis complete"
        );
        Ok(bundle)
    }
}

fn ensure_enough(count: usize) -> Result<()> {
    if count < 2 {
        return Err(Error::TooFewDocuments(count));
    }
    Ok(())
}

/// Run one mandatory stage inside its own span. Panics become internal
/// errors; finishing past `deadline` is a timeout.
fn run_stage<T, F>(name: &'static str, deadline: Option<Instant>, f: F) -> Result<T>
where
    F: FnOnce() -> Result<T>,
{
    let span = info_span!("stage", name);
    let _enter = span.enter();
    let past_deadline = || deadline.is_some_and(|d| Instant::now() >= d);
    if past_deadline() {
        return Err(Error::Timeout { stage: name });
    }

    let start = Instant::now();
    let value = panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| Error::internal(name, "Panic", panic_message(payload.as_ref())))??;
    debug!(elapsed_ms = start.elapsed().as_millis() as u64, "stage finished");

    if past_deadline() {
        return Err(Error::Timeout { stage: name });
    }
    Ok(value)
}
