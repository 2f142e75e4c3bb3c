use anyhow::{ensure, Result};
use candle_core::Tensor;

/// Mean over the unmasked token states, then L2 normalisation.
///
/// `hidden` is `[B, T, H]`, `attention_mask` is `[B, T]` (any numeric dtype,
/// 1 for real tokens). Returns `[B, H]`.
pub fn masked_mean_l2(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let (batch, _tokens, hidden_dim) = hidden.dims3()?;
    let mask = attention_mask.to_device(hidden.device())?.to_dtype(hidden.dtype())?;
    ensure!(mask.dims() == &hidden.dims()[..2], "mask shape {:?} does not match hidden {:?}", mask.dims(), hidden.dims());

    let summed = hidden.broadcast_mul(&mask.unsqueeze(2)?)?.sum(1)?;
    let lengths = mask.sum_keepdim(1)?;
    let mean = summed.broadcast_div(&lengths)?;
    let norm = (mean.sqr()?.sum_keepdim(1)?.sqrt()? + 1e-12)?;
    let out = mean.broadcast_div(&norm)?;
    ensure!(out.dims2()? == (batch, hidden_dim), "unexpected pooled shape {:?}", out.dims());
    Ok(out)
}
