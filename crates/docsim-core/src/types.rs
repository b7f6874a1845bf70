//! Domain types shared by the normalizer, the similarity engines and the
//! orchestrator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One uploaded document after extraction.
///
/// - `raw_text`: text as produced by the extractor, fed to surface and semantic engines
/// - `normalized_text`: normalizer output, fed to lexical and statistical engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    raw_text: String,
    normalized_text: String,
}

impl Document {
    pub fn new(raw_text: String, normalized_text: String) -> Self {
        Self { raw_text, normalized_text }
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    pub fn normalized_text(&self) -> &str {
        &self.normalized_text
    }

    /// True when normalization left no comparable tokens.
    pub fn is_blank(&self) -> bool {
        self.normalized_text.trim().is_empty()
    }
}

/// Square matrix of pairwise scores, row-major, in document order.
///
/// Serialized as a JSON array of rows so the wire shape is `[[f64]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Vec<Vec<f64>>", try_from = "Vec<Vec<f64>>")]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn zeros(dim: usize) -> Self {
        Self { dim, values: vec![0.0; dim * dim] }
    }

    /// Build a matrix by evaluating `f(i, j)` for every ordered pair.
    pub fn from_fn<F>(dim: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut values = Vec::with_capacity(dim * dim);
        for i in 0..dim {
            for j in 0..dim {
                values.push(f(i, j));
            }
        }
        Self { dim, values }
    }

    /// Build a matrix from a commutative score, evaluating each unordered
    /// pair (and the diagonal) once and mirroring it.
    pub fn from_symmetric_fn<F>(dim: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            for j in i..dim {
                let v = f(i, j);
                m.set(i, j, v);
                m.set(j, i, v);
            }
        }
        m
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.dim + j]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[i * self.dim + j] = value;
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.dim).map(|i| self.row(i).to_vec()).collect()
    }

    /// Largest `|M[i][j] - M[j][i]|` over all pairs.
    pub fn max_asymmetry(&self) -> f64 {
        let mut worst = 0.0f64;
        for i in 0..self.dim {
            for j in (i + 1)..self.dim {
                worst = worst.max((self.get(i, j) - self.get(j, i)).abs());
            }
        }
        worst
    }
}

impl From<SimilarityMatrix> for Vec<Vec<f64>> {
    fn from(m: SimilarityMatrix) -> Self {
        m.rows()
    }
}

impl TryFrom<Vec<Vec<f64>>> for SimilarityMatrix {
    type Error = String;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self, Self::Error> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(format!("row {i} has {} columns, expected {dim}", row.len()));
            }
            values.extend(row);
        }
        Ok(Self { dim, values })
    }
}

/// Network family an embedding checkpoint is built on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModelArchitecture {
    Bert,
    MpNet,
    XlmRoberta,
}

/// A sentence-embedding model the semantic engine runs.
///
/// `name` is the key the model's matrix is reported under; `model_id` names
/// the checkpoint (its last path segment is the folder looked up under the
/// models directory).
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct EmbeddingModelSpec {
    pub name: &'static str,
    pub model_id: &'static str,
    pub architecture: ModelArchitecture,
    pub max_seq_len: usize,
    pub produces_normalized_vectors: bool,
}

impl EmbeddingModelSpec {
    /// General-purpose, fast.
    pub const MINILM: Self = Self {
        name: "MiniLM",
        model_id: "sentence-transformers/all-MiniLM-L6-v2",
        architecture: ModelArchitecture::Bert,
        max_seq_len: 256,
        produces_normalized_vectors: false,
    };

    /// General-purpose, high quality.
    pub const MPNET: Self = Self {
        name: "MPNet",
        model_id: "sentence-transformers/all-mpnet-base-v2",
        architecture: ModelArchitecture::MpNet,
        max_seq_len: 384,
        produces_normalized_vectors: true,
    };

    /// Multilingual.
    pub const MULTI_MPNET: Self = Self {
        name: "Multi_MPNet",
        model_id: "sentence-transformers/paraphrase-multilingual-mpnet-base-v2",
        architecture: ModelArchitecture::XlmRoberta,
        max_seq_len: 128,
        produces_normalized_vectors: true,
    };

    /// The fixed model set, in reporting order.
    pub const ALL: [Self; 3] = [Self::MINILM, Self::MPNET, Self::MULTI_MPNET];

    /// Folder name of the checkpoint (last segment of `model_id`).
    pub fn folder_name(&self) -> &'static str {
        self.model_id.rsplit('/').next().unwrap_or(self.model_id)
    }
}

/// Everything a successful request returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultBundle {
    pub tfidf_cosine: SimilarityMatrix,
    pub jaccard: SimilarityMatrix,
    pub levenshtein: SimilarityMatrix,
    pub jaro_winkler: SimilarityMatrix,
    /// Only models that succeeded appear here.
    pub embedding: BTreeMap<String, SimilarityMatrix>,
}

impl ResultBundle {
    /// Dimension shared by every matrix in the bundle.
    pub fn dim(&self) -> usize {
        self.tfidf_cosine.dim()
    }

    /// The four always-present matrices with their wire names.
    pub fn mandatory(&self) -> [(&'static str, &SimilarityMatrix); 4] {
        [
            ("tfidf_cosine", &self.tfidf_cosine),
            ("jaccard", &self.jaccard),
            ("levenshtein", &self.levenshtein),
            ("jaro_winkler", &self.jaro_winkler),
        ]
    }
}
