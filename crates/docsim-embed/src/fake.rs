use anyhow::Result;
use docsim_core::Embedder;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

/// Deterministic feature-hashing embedder. Lowercased whitespace tokens are
/// hashed into `dim` buckets and the vector is L2-normalized; texts sharing
/// words get similar vectors. No weights, no I/O.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dim: usize,
    max_len: usize,
    seed: u64,
}

impl HashingEmbedder {
    pub fn new(dim: usize, max_len: usize) -> Self {
        Self { dim: dim.max(1), max_len, seed: 0 }
    }

    /// Different seeds give unrelated vector spaces, one per stand-in model.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        for token in text.split_whitespace().take(self.max_len.max(1)) {
            let mut hasher = XxHash64::with_seed(self.seed);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            v[idx] += 0.5 + ((h >> 32) as u32) as f32 / u32::MAX as f32;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            v.iter_mut().for_each(|x| *x /= norm);
        }
        v
    }
}

impl Embedder for HashingEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.max_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
