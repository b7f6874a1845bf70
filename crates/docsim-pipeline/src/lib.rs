//! Similarity pipeline: the semantic engine and the orchestrator that
//! composes it with the text engines into one [`ResultBundle`].
//!
//! [`ResultBundle`]: docsim_core::ResultBundle

pub mod orchestrator;
pub mod semantic;

pub use orchestrator::SimilarityOrchestrator;
pub use semantic::{cosine_matrix, ModelCapability, ModelSlot, SemanticEngine, SemanticError, SemanticOutcome};
