//! Multi-model embedding similarity. Each model is an isolated unit: its
//! encode and compare steps run on a dedicated thread, and any error, panic
//! or missed deadline only removes that model from the output.

use std::any::Any;
use std::collections::BTreeMap;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

use docsim_core::config::ModelSettings;
use docsim_core::{Embedder, EmbeddingModelSpec, SimilarityMatrix};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SemanticError {
    #[error("model unavailable: {0}")]
    Unavailable(String),
    #[error("encoding failed: {0}")]
    Encode(String),
    #[error("expected {expected} embeddings of one width, got {actual}")]
    Shape { expected: usize, actual: String },
    #[error("model panicked: {0}")]
    Panicked(String),
    #[error("worker thread failed: {0}")]
    Worker(String),
    #[error("missed the request deadline")]
    TimedOut,
}

/// Whether a model can serve requests, decided once at construction.
#[derive(Clone)]
pub enum ModelCapability {
    Available(Arc<dyn Embedder>),
    Unavailable(String),
}

#[derive(Clone)]
pub struct ModelSlot {
    pub spec: EmbeddingModelSpec,
    pub capability: ModelCapability,
}

impl ModelSlot {
    pub fn available(spec: EmbeddingModelSpec, embedder: Arc<dyn Embedder>) -> Self {
        Self { spec, capability: ModelCapability::Available(embedder) }
    }

    pub fn unavailable(spec: EmbeddingModelSpec, reason: impl Into<String>) -> Self {
        Self { spec, capability: ModelCapability::Unavailable(reason.into()) }
    }
}

/// Matrices of the models that succeeded plus the reason each other one was
/// left out.
#[derive(Debug, Default)]
pub struct SemanticOutcome {
    pub matrices: BTreeMap<String, SimilarityMatrix>,
    pub failures: Vec<(String, SemanticError)>,
}

pub struct SemanticEngine {
    slots: Vec<ModelSlot>,
    parallel: bool,
}

impl SemanticEngine {
    pub fn new(slots: Vec<ModelSlot>, parallel: bool) -> Self {
        for slot in &slots {
            match &slot.capability {
                ModelCapability::Available(e) => info!(model = slot.spec.name, dim = e.dim(), "embedding model ready"),
                ModelCapability::Unavailable(reason) => {
                    warn!(model = slot.spec.name, reason = %reason, "embedding model unavailable, it will be omitted")
                }
            }
        }
        Self { slots, parallel }
    }

    /// Load the fixed model set; a model that fails to load becomes
    /// [`ModelCapability::Unavailable`] instead of failing the engine.
    pub fn from_settings(settings: &ModelSettings, parallel: bool) -> Self {
        let slots = EmbeddingModelSpec::ALL
            .iter()
            .map(|spec| match docsim_embed::load_embedder(spec, settings) {
                Ok(embedder) => ModelSlot::available(*spec, embedder),
                Err(e) => ModelSlot::unavailable(*spec, format!("{e:#}")),
            })
            .collect();
        Self::new(slots, parallel)
    }

    pub fn slots(&self) -> &[ModelSlot] {
        &self.slots
    }

    pub fn available_models(&self) -> Vec<&'static str> {
        self.slots
            .iter()
            .filter(|s| matches!(s.capability, ModelCapability::Available(_)))
            .map(|s| s.spec.name)
            .collect()
    }

    /// Run every model over `raw` texts. Never fails: the outcome holds
    /// whatever subset of models succeeded before `deadline`.
    pub fn compute(&self, raw: &[String], deadline: Option<Instant>) -> SemanticOutcome {
        let texts: Arc<[String]> = raw.into();
        let mut outcome = SemanticOutcome::default();
        let mut pending = Vec::new();

        for slot in &self.slots {
            let name = slot.spec.name;
            match &slot.capability {
                ModelCapability::Unavailable(reason) => {
                    debug!(model = name, "model unavailable, omitted");
                    outcome.failures.push((name.to_string(), SemanticError::Unavailable(reason.clone())));
                }
                ModelCapability::Available(embedder) => {
                    let rx = spawn_unit(name, Arc::clone(embedder), Arc::clone(&texts));
                    if self.parallel {
                        pending.push((name, rx));
                    } else {
                        record(&mut outcome, name, wait(rx, deadline));
                    }
                }
            }
        }
        for (name, rx) in pending {
            record(&mut outcome, name, wait(rx, deadline));
        }
        outcome
    }
}

type UnitResult = Result<SimilarityMatrix, SemanticError>;

fn spawn_unit(name: &'static str, embedder: Arc<dyn Embedder>, texts: Arc<[String]>) -> mpsc::Receiver<UnitResult> {
    let (tx, rx) = mpsc::channel();
    let worker_tx = tx.clone();
    let spawned = thread::Builder::new().name(format!("embed-{name}")).spawn(move || {
        let start = Instant::now();
        let result = panic::catch_unwind(AssertUnwindSafe(|| encode_and_compare(embedder.as_ref(), &texts)))
            .unwrap_or_else(|payload| Err(SemanticError::Panicked(panic_message(payload.as_ref()))));
        debug!(model = name, elapsed_ms = start.elapsed().as_millis() as u64, ok = result.is_ok(), "embedding unit finished");
        // the receiver is gone when the request already gave up on this unit
        let _ = worker_tx.send(result);
    });
    if let Err(e) = spawned {
        let _ = tx.send(Err(SemanticError::Worker(e.to_string())));
    }
    rx
}

fn wait(rx: mpsc::Receiver<UnitResult>, deadline: Option<Instant>) -> UnitResult {
    match deadline {
        None => rx.recv().unwrap_or_else(|_| Err(SemanticError::Worker("worker exited without a result".into()))),
        Some(deadline) => match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(SemanticError::TimedOut),
            Err(mpsc::RecvTimeoutError::Disconnected) => {
                Err(SemanticError::Worker("worker exited without a result".into()))
            }
        },
    }
}

fn record(outcome: &mut SemanticOutcome, name: &str, result: UnitResult) {
    match result {
        Ok(matrix) => {
            outcome.matrices.insert(name.to_string(), matrix);
        }
        Err(e) => {
            warn!(model = name, error = %e, "embedding model failed, omitting it");
            outcome.failures.push((name.to_string(), e));
        }
    }
}

fn encode_and_compare(embedder: &dyn Embedder, texts: &[String]) -> UnitResult {
    let vectors = embedder.embed_batch(texts).map_err(|e| SemanticError::Encode(format!("{e:#}")))?;
    let width = vectors.first().map_or(0, Vec::len);
    if vectors.len() != texts.len() || vectors.iter().any(|v| v.len() != width) {
        let widths: Vec<usize> = vectors.iter().map(Vec::len).collect();
        return Err(SemanticError::Shape {
            expected: texts.len(),
            actual: format!("{} with widths {:?}", vectors.len(), widths),
        });
    }
    Ok(cosine_matrix(&vectors))
}

/// Pairwise cosine of dense vectors. Zero vectors score 0 against everything.
pub fn cosine_matrix(vectors: &[Vec<f32>]) -> SimilarityMatrix {
    let norms: Vec<f64> = vectors
        .iter()
        .map(|v| v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt())
        .collect();
    SimilarityMatrix::from_symmetric_fn(vectors.len(), |i, j| {
        if norms[i] == 0.0 || norms[j] == 0.0 {
            return 0.0;
        }
        let dot: f64 = vectors[i].iter().zip(&vectors[j]).map(|(a, b)| f64::from(*a) * f64::from(*b)).sum();
        (dot / (norms[i] * norms[j])).clamp(-1.0, 1.0)
    })
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
