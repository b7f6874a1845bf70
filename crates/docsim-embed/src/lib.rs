//! Sentence-embedding backends for the semantic engine: candle BERT,
//! XLM-RoBERTa and MPNet encoders with mean pooling, plus a hashing
//! embedder for development without model weights.

pub mod device;
pub mod fake;
pub mod model;
pub mod mpnet;
pub mod pool;
pub mod tokenize;

use std::sync::Arc;

use anyhow::Result;
use docsim_core::config::ModelSettings;
use docsim_core::{Embedder, EmbeddingModelSpec};
use tracing::info;

pub use device::select_device;
pub use fake::HashingEmbedder;
pub use model::{resolve_model_dir, SentenceEmbedder};
pub use pool::{l2_normalize, masked_mean};

/// Build the embedder for one fixed model spec according to `settings`.
///
/// With `use_fake` every spec gets its own seeded [`HashingEmbedder`];
/// otherwise the checkpoint is loaded from `settings.dir`.
pub fn load_embedder(spec: &EmbeddingModelSpec, settings: &ModelSettings) -> Result<Arc<dyn Embedder>> {
    if settings.use_fake {
        info!(model = spec.name, dim = settings.fake_dim, "using HashingEmbedder");
        let seed = EmbeddingModelSpec::ALL.iter().position(|s| s.name == spec.name).unwrap_or(0) as u64;
        return Ok(Arc::new(HashingEmbedder::new(settings.fake_dim, spec.max_seq_len).with_seed(seed)));
    }
    let dir = resolve_model_dir(&settings.dir_path(), spec)?;
    let device = select_device(&settings.device);
    Ok(Arc::new(SentenceEmbedder::load(*spec, &dir, settings.batch_size, device)?))
}
