//! MPNet encoder (the `all-mpnet-base-v2` backbone) on candle-nn layers.
//!
//! Same layout as BERT except for the attention: no token type embeddings,
//! and every layer adds a learned bias indexed by the bucketed relative
//! distance between query and key positions. Weight names follow the
//! HuggingFace `MPNetModel` checkpoint.

use candle_core::{DType, Device, Module, Result, Tensor};
use candle_nn::{embedding, layer_norm, linear, Embedding, LayerNorm, Linear, VarBuilder};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct MpNetConfig {
    pub vocab_size: usize,
    pub hidden_size: usize,
    pub num_hidden_layers: usize,
    pub num_attention_heads: usize,
    pub intermediate_size: usize,
    pub max_position_embeddings: usize,
    #[serde(default = "default_layer_norm_eps")]
    pub layer_norm_eps: f64,
    #[serde(default = "default_buckets")]
    pub relative_attention_num_buckets: usize,
    #[serde(default = "default_pad")]
    pub pad_token_id: u32,
}

fn default_layer_norm_eps() -> f64 {
    1e-5
}

fn default_buckets() -> usize {
    32
}

fn default_pad() -> u32 {
    1
}

const MAX_DISTANCE: f64 = 128.0;

/// Bucket of the relative distance `memory - context`, T5/MPNet style:
/// half the buckets per direction, exact below `buckets / 4`, logarithmic up
/// to `MAX_DISTANCE`.
pub(crate) fn relative_position_bucket(relative_position: i64, num_buckets: usize) -> u32 {
    let half = (num_buckets / 2) as i64;
    let n = -relative_position;
    let mut ret = if n < 0 { half } else { 0 };
    let n = n.abs();
    let max_exact = half / 2;
    if n < max_exact {
        ret += n;
    } else {
        let scaled = ((n as f64 / max_exact as f64).ln() / (MAX_DISTANCE / max_exact as f64).ln()
            * (half - max_exact) as f64) as i64;
        ret += (max_exact + scaled).min(half - 1);
    }
    ret as u32
}

struct MpNetEmbeddings {
    word_embeddings: Embedding,
    position_embeddings: Embedding,
    layer_norm: LayerNorm,
    pad_token_id: u32,
}

impl MpNetEmbeddings {
    fn load(vb: VarBuilder, cfg: &MpNetConfig) -> Result<Self> {
        Ok(Self {
            word_embeddings: embedding(cfg.vocab_size, cfg.hidden_size, vb.pp("word_embeddings"))?,
            position_embeddings: embedding(cfg.max_position_embeddings, cfg.hidden_size, vb.pp("position_embeddings"))?,
            layer_norm: layer_norm(cfg.hidden_size, cfg.layer_norm_eps, vb.pp("LayerNorm"))?,
            pad_token_id: cfg.pad_token_id,
        })
    }

    /// Positions count non-pad tokens from `pad + 1`; pads sit at `pad`.
    fn position_ids(&self, input_ids: &Tensor) -> Result<Tensor> {
        let pad = self.pad_token_id;
        let (batch, seq) = input_ids.dims2()?;
        let positions: Vec<u32> = input_ids
            .to_vec2::<u32>()?
            .into_iter()
            .flat_map(|row| {
                let mut seen = 0u32;
                row.into_iter().map(move |id| {
                    if id == pad {
                        pad
                    } else {
                        seen += 1;
                        pad + seen
                    }
                })
            })
            .collect();
        Tensor::from_vec(positions, (batch, seq), input_ids.device())
    }

    fn forward(&self, input_ids: &Tensor) -> Result<Tensor> {
        let words = self.word_embeddings.forward(input_ids)?;
        let positions = self.position_embeddings.forward(&self.position_ids(input_ids)?)?;
        self.layer_norm.forward(&(words + positions)?)
    }
}

struct MpNetLayer {
    q: Linear,
    k: Linear,
    v: Linear,
    o: Linear,
    attention_norm: LayerNorm,
    intermediate: Linear,
    output: Linear,
    output_norm: LayerNorm,
    num_heads: usize,
    head_dim: usize,
}

impl MpNetLayer {
    fn load(vb: VarBuilder, cfg: &MpNetConfig) -> Result<Self> {
        let h = cfg.hidden_size;
        let attn = vb.pp("attention");
        Ok(Self {
            q: linear(h, h, attn.pp("attn").pp("q"))?,
            k: linear(h, h, attn.pp("attn").pp("k"))?,
            v: linear(h, h, attn.pp("attn").pp("v"))?,
            o: linear(h, h, attn.pp("attn").pp("o"))?,
            attention_norm: layer_norm(h, cfg.layer_norm_eps, attn.pp("LayerNorm"))?,
            intermediate: linear(h, cfg.intermediate_size, vb.pp("intermediate").pp("dense"))?,
            output: linear(cfg.intermediate_size, h, vb.pp("output").pp("dense"))?,
            output_norm: layer_norm(h, cfg.layer_norm_eps, vb.pp("output").pp("LayerNorm"))?,
            num_heads: cfg.num_attention_heads,
            head_dim: h / cfg.num_attention_heads,
        })
    }

    fn split_heads(&self, xs: &Tensor) -> Result<Tensor> {
        let (b, t, _) = xs.dims3()?;
        xs.reshape((b, t, self.num_heads, self.head_dim))?.transpose(1, 2)?.contiguous()
    }

    /// `mask_bias` is `[B,1,1,T]`, `position_bias` is `[1,heads,T,T]`.
    fn forward(&self, xs: &Tensor, mask_bias: &Tensor, position_bias: &Tensor) -> Result<Tensor> {
        let (b, t, h) = xs.dims3()?;
        let q = self.split_heads(&self.q.forward(xs)?)?;
        let k = self.split_heads(&self.k.forward(xs)?)?;
        let v = self.split_heads(&self.v.forward(xs)?)?;

        let scores = (q.matmul(&k.t()?)? / (self.head_dim as f64).sqrt())?
            .broadcast_add(position_bias)?
            .broadcast_add(mask_bias)?;
        let probs = candle_nn::ops::softmax_last_dim(&scores)?;
        let context = probs.matmul(&v)?.transpose(1, 2)?.reshape((b, t, h))?;
        let attended = self.attention_norm.forward(&(self.o.forward(&context)? + xs)?)?;

        let inner = self.intermediate.forward(&attended)?.gelu_erf()?;
        self.output_norm.forward(&(self.output.forward(&inner)? + attended)?)
    }
}

pub struct MpNetModel {
    embeddings: MpNetEmbeddings,
    layers: Vec<MpNetLayer>,
    relative_attention_bias: Embedding,
    num_buckets: usize,
}

impl MpNetModel {
    pub fn load(vb: VarBuilder, cfg: &MpNetConfig) -> Result<Self> {
        let encoder = vb.pp("encoder");
        let layers = (0..cfg.num_hidden_layers)
            .map(|i| MpNetLayer::load(encoder.pp("layer").pp(i.to_string()), cfg))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            embeddings: MpNetEmbeddings::load(vb.pp("embeddings"), cfg)?,
            layers,
            relative_attention_bias: embedding(
                cfg.relative_attention_num_buckets,
                cfg.num_attention_heads,
                encoder.pp("relative_attention_bias"),
            )?,
            num_buckets: cfg.relative_attention_num_buckets,
        })
    }

    fn position_bias(&self, seq_len: usize, device: &Device) -> Result<Tensor> {
        let mut buckets = Vec::with_capacity(seq_len * seq_len);
        for context in 0..seq_len as i64 {
            for memory in 0..seq_len as i64 {
                buckets.push(relative_position_bucket(memory - context, self.num_buckets));
            }
        }
        let buckets = Tensor::from_vec(buckets, (seq_len, seq_len), device)?;
        // [T,T,heads] -> [1,heads,T,T]
        self.relative_attention_bias.forward(&buckets)?.permute((2, 0, 1))?.unsqueeze(0)?.contiguous()
    }

    /// Last hidden state `[B,T,H]` for `input_ids` / `attention_mask` (`[B,T]`, u32).
    pub fn forward(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let (_, seq_len) = input_ids.dims2()?;
        let mut xs = self.embeddings.forward(input_ids)?;
        let position_bias = self.position_bias(seq_len, xs.device())?.to_dtype(xs.dtype())?;
        // 0 for real tokens, large negative for padding
        let mask_bias = ((attention_mask.to_dtype(DType::F32)?.affine(1.0, -1.0)? * 10_000.0)?)
            .to_dtype(xs.dtype())?
            .unsqueeze(1)?
            .unsqueeze(1)?;
        for layer in &self.layers {
            xs = layer.forward(&xs, &mask_bias, &position_bias)?;
        }
        Ok(xs)
    }
}
