use anyhow::{anyhow, bail, Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use candle_core::{DType, Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig};
use candle_transformers::models::xlm_roberta::{Config as XLMRobertaConfig, XLMRobertaModel};
use docsim_core::{Embedder, EmbeddingModelSpec, ModelArchitecture};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::mpnet::{MpNetConfig, MpNetModel};
use crate::pool::{l2_normalize, masked_mean};
use crate::tokenize::{tokenize_batch, EncodedBatch};

enum Backbone {
    Bert(BertModel),
    XlmRoberta(XLMRobertaModel),
    MpNet(MpNetModel),
}

impl Backbone {
    fn forward(&self, batch: &EncodedBatch) -> Result<Tensor> {
        let hidden = match self {
            Backbone::Bert(m) => m.forward(&batch.input_ids, &batch.token_type_ids, Some(&batch.attention_mask))?,
            Backbone::XlmRoberta(m) => {
                m.forward(&batch.input_ids, &batch.attention_mask, &batch.token_type_ids, None, None, None)?
            }
            Backbone::MpNet(m) => m.forward(&batch.input_ids, &batch.attention_mask)?,
        };
        Ok(hidden)
    }
}

/// A sentence-transformers checkpoint loaded from a local folder holding
/// `config.json`, `tokenizer.json` and `model.safetensors` or `pytorch_model.bin`.
pub struct SentenceEmbedder {
    spec: EmbeddingModelSpec,
    backbone: Backbone,
    tokenizer: Tokenizer,
    device: Device,
    pad_id: u32,
    dim: usize,
    batch_size: usize,
}

impl SentenceEmbedder {
    pub fn load(spec: EmbeddingModelSpec, model_dir: &Path, batch_size: usize, device: Device) -> Result<Self> {
        let start = Instant::now();
        info!(model = spec.name, dir = %model_dir.display(), "loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let mut tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer from {}: {}", tokenizer_path.display(), e))?;
        // batching and truncation are handled in `tokenize_batch`
        tokenizer.with_padding(None);
        tokenizer
            .with_truncation(None)
            .map_err(|e| anyhow!("Failed to reset tokenizer truncation: {}", e))?;

        let config_path = model_dir.join("config.json");
        let raw_config = std::fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read {}", config_path.display()))?;
        let config_value: serde_json::Value = serde_json::from_str(&raw_config)?;
        let dim = config_value
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .ok_or_else(|| anyhow!("{} has no hidden_size", config_path.display()))? as usize;
        let pad_id = config_value
            .get("pad_token_id")
            .and_then(serde_json::Value::as_u64)
            .unwrap_or(0) as u32;

        let vb = load_weights(model_dir, &device)?;
        let backbone = match spec.architecture {
            ModelArchitecture::Bert => {
                let config: BertConfig = serde_json::from_str(&raw_config)?;
                Backbone::Bert(BertModel::load(vb, &config)?)
            }
            ModelArchitecture::XlmRoberta => {
                let config: XLMRobertaConfig = serde_json::from_str(&raw_config)?;
                Backbone::XlmRoberta(XLMRobertaModel::new(&config, vb)?)
            }
            ModelArchitecture::MpNet => {
                let config: MpNetConfig = serde_json::from_str(&raw_config)?;
                Backbone::MpNet(MpNetModel::load(vb, &config)?)
            }
        };

        info!(model = spec.name, dim, elapsed_ms = start.elapsed().as_millis() as u64, "embedding model loaded");
        Ok(Self { spec, backbone, tokenizer, device, pad_id, dim, batch_size: batch_size.max(1) })
    }

    fn embed_chunk(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let batch = tokenize_batch(&self.tokenizer, texts, self.spec.max_seq_len, self.pad_id, &self.device)?;
        let hidden = self.backbone.forward(&batch)?;
        let mut pooled = masked_mean(&hidden, &batch.attention_mask)?;
        if self.spec.produces_normalized_vectors {
            pooled = l2_normalize(&pooled)?;
        }
        Ok(pooled.to_dtype(DType::F32)?.to_device(&Device::Cpu)?.to_vec2::<f32>()?)
    }
}

impl Embedder for SentenceEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn max_len(&self) -> usize {
        self.spec.max_seq_len
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let start = Instant::now();
        let mut out = Vec::with_capacity(texts.len());
        for chunk in texts.chunks(self.batch_size) {
            out.extend(self.embed_chunk(chunk)?);
        }
        debug!(model = self.spec.name, texts = texts.len(), elapsed_ms = start.elapsed().as_millis() as u64, "encoded");
        Ok(out)
    }
}

/// Memory-map `model.safetensors` when present, otherwise read the pickled
/// `pytorch_model.bin`.
fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        // SAFETY: the file is opened read-only and not modified while mapped.
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DType::F32, device)? };
        return Ok(vb);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights: HashMap<String, Tensor> = candle_core::pickle::read_all(&pickle)?.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights, DType::F32, device));
    }
    bail!("no model.safetensors or pytorch_model.bin in {}", model_dir.display())
}

/// Locate the checkpoint folder for `spec` under `models_dir`, accepting
/// either `<dir>/<folder>` or `<dir>/<org>/<folder>`.
pub fn resolve_model_dir(models_dir: &Path, spec: &EmbeddingModelSpec) -> Result<PathBuf> {
    let candidates = [models_dir.join(spec.folder_name()), models_dir.join(spec.model_id)];
    candidates
        .iter()
        .find(|p| p.join("config.json").exists())
        .cloned()
        .ok_or_else(|| anyhow!("Could not locate {} under {}", spec.model_id, models_dir.display()))
}
