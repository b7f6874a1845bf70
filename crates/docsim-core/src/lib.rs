//! Shared vocabulary of the docsim workspace: documents, similarity
//! matrices, the result bundle, the error taxonomy, the seams other crates
//! plug into and the configuration loader.

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::{Embedder, TextExtractor};
pub use types::{Document, EmbeddingModelSpec, ModelArchitecture, ResultBundle, SimilarityMatrix};
