#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use docsim_core::config::PipelineSettings;
use docsim_core::{Embedder, EmbeddingModelSpec};
use docsim_embed::HashingEmbedder;
use docsim_pipeline::{ModelSlot, SemanticEngine, SimilarityOrchestrator};

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize {
        4
    }
    fn max_len(&self) -> usize {
        8
    }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Err(anyhow!("device out of memory"))
    }
}

pub struct PanickingEmbedder;

impl Embedder for PanickingEmbedder {
    fn dim(&self) -> usize {
        4
    }
    fn max_len(&self) -> usize {
        8
    }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        panic!("tensor shape mismatch")
    }
}

/// Returns one vector fewer than asked for.
pub struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn dim(&self) -> usize {
        2
    }
    fn max_len(&self) -> usize {
        8
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().skip(1).map(|_| vec![1.0, 0.0]).collect())
    }
}

pub struct SlowEmbedder {
    pub delay: Duration,
    pub inner: HashingEmbedder,
}

impl Embedder for SlowEmbedder {
    fn dim(&self) -> usize {
        self.inner.dim()
    }
    fn max_len(&self) -> usize {
        self.inner.max_len()
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        std::thread::sleep(self.delay);
        self.inner.embed_batch(texts)
    }
}

#[derive(Default)]
pub struct CountingEmbedder {
    pub calls: AtomicUsize,
}

impl Embedder for CountingEmbedder {
    fn dim(&self) -> usize {
        3
    }
    fn max_len(&self) -> usize {
        8
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
    }
}

pub fn hashing(seed: u64) -> Arc<dyn Embedder> {
    Arc::new(HashingEmbedder::new(128, 256).with_seed(seed))
}

pub fn hashing_slots() -> Vec<ModelSlot> {
    EmbeddingModelSpec::ALL
        .iter()
        .enumerate()
        .map(|(i, spec)| ModelSlot::available(*spec, hashing(i as u64)))
        .collect()
}

pub fn orchestrator(slots: Vec<ModelSlot>) -> SimilarityOrchestrator {
    SimilarityOrchestrator::new(SemanticEngine::new(slots, true), &PipelineSettings::default())
}

pub fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
