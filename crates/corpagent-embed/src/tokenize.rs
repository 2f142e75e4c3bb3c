use anyhow::{anyhow, bail, Result};
use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;

/// Encodes one text as `[1, T]` id and mask tensors, `T <= max_len`.
/// On truncation the final special token is kept in the last slot.
pub fn tokenize_on_device(tokenizer: &Tokenizer, text: &str, max_len: usize, device: &Device) -> Result<(Tensor, Tensor)> {
    let enc = tokenizer.encode(text, true).map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let mut ids = enc.get_ids().to_vec();
    let mut mask = enc.get_attention_mask().to_vec();
    if ids.is_empty() { bail!("tokenizer produced no tokens"); }
    if max_len > 0 && ids.len() > max_len {
        let last = ids[ids.len() - 1];
        ids.truncate(max_len);
        mask.truncate(max_len);
        ids[max_len - 1] = last;
    }
    let len = ids.len();
    let input_ids = Tensor::from_vec(ids, (1, len), device)?;
    let attention_mask = Tensor::from_vec(mask, (1, len), device)?;
    Ok((input_ids, attention_mask))
}
