use anyhow::{anyhow, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Model inputs for one batch, all `[B,T]` with `T` the longest sequence in the batch.
pub struct EncodedBatch {
    pub input_ids: Tensor,
    pub attention_mask: Tensor,
    pub token_type_ids: Tensor,
}

/// Cut `ids` to `max_len`, keeping the closing special token in last position.
pub fn fit_to_length(mut ids: Vec<u32>, max_len: usize) -> Vec<u32> {
    if ids.len() > max_len && max_len > 0 {
        let last = ids[ids.len() - 1];
        ids.truncate(max_len - 1);
        ids.push(last);
    }
    ids
}

/// Right-pad every row to the longest one. Returns flattened ids, the
/// matching attention mask and the padded width.
pub fn pad_rows(rows: &[Vec<u32>], pad_id: u32) -> (Vec<u32>, Vec<u32>, usize) {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut ids = Vec::with_capacity(rows.len() * width);
    let mut mask = Vec::with_capacity(rows.len() * width);
    for row in rows {
        ids.extend_from_slice(row);
        mask.extend(std::iter::repeat(1u32).take(row.len()));
        let pad = width - row.len();
        ids.extend(std::iter::repeat(pad_id).take(pad));
        mask.extend(std::iter::repeat(0u32).take(pad));
    }
    (ids, mask, width)
}

pub fn tokenize_batch(
    tokenizer: &Tokenizer,
    texts: &[String],
    max_len: usize,
    pad_id: u32,
    device: &Device,
) -> Result<EncodedBatch> {
    let rows = texts
        .iter()
        .map(|text| {
            let enc = tokenizer.encode(text.as_str(), true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
            Ok(fit_to_length(enc.get_ids().to_vec(), max_len))
        })
        .collect::<Result<Vec<_>>>()?;
    let (ids, mask, width) = pad_rows(&rows, pad_id);
    let shape = (rows.len(), width);
    Ok(EncodedBatch {
        input_ids: Tensor::from_vec(ids, shape, device)?,
        attention_mask: Tensor::from_vec(mask, shape, device)?,
        token_type_ids: Tensor::zeros(shape, candle_core::DType::U32, device)?,
    })
}
