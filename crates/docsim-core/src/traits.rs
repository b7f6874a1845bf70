use std::path::Path;

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    /// One vector per input text, in input order.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Turns an uploaded file into raw text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> crate::error::Result<String>;
}
