//! Build-time embedding cache keyed by content hash.
//!
//! Reference documents often repeat boilerplate paragraphs, so identical
//! chunk texts are embedded once and the vector is reused for every
//! position. The output stays co-indexed with the input texts.
use anyhow::{bail, Result};
use indicatif::ProgressBar;
use std::collections::HashMap;

use corpagent_core::traits::Embedder;

pub fn content_hash(s: &str) -> String {
    blake3::hash(s.as_bytes()).to_hex().to_string()
}

#[derive(Debug, Default)]
pub struct EmbeddingCache {
    slots: HashMap<String, usize>,
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingCache {
    pub fn new() -> Self { Self::default() }

    pub fn len(&self) -> usize { self.vectors.len() }

    pub fn is_empty(&self) -> bool { self.vectors.is_empty() }

    pub fn get(&self, hash: &str) -> Option<&Vec<f32>> {
        self.slots.get(hash).map(|&i| &self.vectors[i])
    }

    fn put(&mut self, hash: String, vector: Vec<f32>) {
        if !self.slots.contains_key(&hash) {
            self.slots.insert(hash, self.vectors.len());
            self.vectors.push(vector);
        }
    }

    /// Embeds every text, calling the embedder only for hashes not seen
    /// before. Any embedder error or short batch fails the whole call.
    pub fn embed_all(&mut self, embedder: &dyn Embedder, texts: &[String], batch_size: usize, pb: &ProgressBar) -> Result<Vec<Vec<f32>>> {
        let hashes: Vec<String> = texts.iter().map(|t| content_hash(t)).collect();
        let mut pending: Vec<(String, String)> = Vec::new();
        let mut queued = std::collections::HashSet::new();
        for (text, h) in texts.iter().zip(&hashes) {
            if self.get(h).is_none() && queued.insert(h.clone()) {
                pending.push((h.clone(), text.clone()));
            }
        }
        pb.set_length(pending.len() as u64);
        for batch in pending.chunks(batch_size.max(1)) {
            let inputs: Vec<String> = batch.iter().map(|(_, t)| t.clone()).collect();
            let embs = embedder.embed_batch(&inputs)?;
            if embs.len() != inputs.len() { bail!("embedder returned {} vectors for {} inputs", embs.len(), inputs.len()); }
            for ((h, _), v) in batch.iter().zip(embs) { self.put(h.clone(), v); }
            pb.inc(batch.len() as u64);
        }
        hashes
            .iter()
            .map(|h| self.get(h).cloned().ok_or_else(|| anyhow::anyhow!("missing embedding for {}", h)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder { calls: AtomicUsize }
    impl Embedder for CountingEmbedder {
        fn dim(&self) -> usize { 1 }
        fn max_len(&self) -> usize { 8 }
        fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32]).collect())
        }
    }

    #[test]
    fn duplicate_texts_are_embedded_once() {
        let e = CountingEmbedder { calls: AtomicUsize::new(0) };
        let texts: Vec<String> = ["a", "bb", "a", "ccc", "bb"].iter().map(|s| s.to_string()).collect();
        let mut cache = EmbeddingCache::new();
        let out = cache.embed_all(&e, &texts, 2, &ProgressBar::hidden()).unwrap();
        assert_eq!(e.calls.load(Ordering::SeqCst), 3);
        assert_eq!(out, vec![vec![1.0], vec![2.0], vec![1.0], vec![3.0], vec![2.0]]);
        assert_eq!(cache.len(), 3);
    }
}
