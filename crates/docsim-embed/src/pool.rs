use anyhow::{ensure, Result};
use candle_core::{DType, Tensor};

/// Attention-masked mean over the token axis: `[B,T,H]` x `[B,T]` -> `[B,H]`.
pub fn masked_mean(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let dims = hidden.dims();
    ensure!(dims.len() == 3, "hidden shape must be [B,T,H], got {:?}", dims);
    ensure!(
        attention_mask.dims() == &dims[..2],
        "attention mask shape {:?} does not match hidden {:?}",
        attention_mask.dims(),
        dims
    );

    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    let lengths = mask.sum_keepdim(1)?.clamp(1e-9f32, f32::MAX)?;
    Ok(summed.broadcast_div(&lengths)?)
}

/// Scale every row of a `[B,H]` tensor to unit L2 norm.
pub fn l2_normalize(embeddings: &Tensor) -> Result<Tensor> {
    let eps_val = match embeddings.dtype() {
        DType::F16 => 1e-6f32,
        _ => 1e-12f32,
    };
    let eps = Tensor::new(&[eps_val], embeddings.device())?.to_dtype(embeddings.dtype())?.unsqueeze(0)?;
    let norm = embeddings.sqr()?.sum_keepdim(1)?.sqrt()?.broadcast_add(&eps)?;
    Ok(embeddings.broadcast_div(&norm)?)
}
