//! Overlapping fixed-size word windows.
//!
//! Text is split on whitespace; a window of `chunk_size` words starts every
//! `chunk_size - overlap` words and the last window may be shorter. For `N`
//! words this yields `ceil((N - overlap) / (chunk_size - overlap))` windows,
//! and at least one when `N > 0`.

use crate::error::{Error, Result};
use crate::types::{Chunk, ReferenceDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkingConfig {
    chunk_size: usize,
    overlap: usize,
}

impl ChunkingConfig {
    /// Fails with [`Error::Configuration`] unless `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        if overlap >= chunk_size {
            return Err(Error::Configuration(format!(
                "chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})"
            )));
        }
        Ok(Self { chunk_size, overlap })
    }

    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn overlap(&self) -> usize { self.overlap }
    pub fn stride(&self) -> usize { self.chunk_size - self.overlap }

    /// Number of windows produced for `words` tokens.
    pub fn expected_chunks(&self, words: usize) -> usize {
        if words == 0 {
            return 0;
        }
        words.saturating_sub(self.overlap).div_ceil(self.stride()).max(1)
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 400, overlap: 50 }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self { Self { config } }

    pub fn config(&self) -> ChunkingConfig { self.config }

    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        let mut chunks = Vec::with_capacity(self.config.expected_chunks(words.len()));
        let mut start = 0;
        while start < words.len() {
            let end = (start + self.config.chunk_size).min(words.len());
            chunks.push(words[start..end].join(" "));
            if end >= words.len() { break; }
            start += self.config.stride();
        }
        chunks
    }

    pub fn chunk_document(&self, document: &ReferenceDocument) -> Vec<Chunk> {
        self.chunk_text(&document.text)
            .into_iter()
            .enumerate()
            .map(|(sequence_index, text)| Chunk { text, source_document_id: document.id.clone(), sequence_index })
            .collect()
    }

    /// Chunks of every document, in document order.
    pub fn chunk_all(&self, documents: &[ReferenceDocument]) -> Vec<Chunk> {
        documents.iter().flat_map(|d| self.chunk_document(d)).collect()
    }
}

/// Validates the parameters, then chunks `text`.
pub fn chunk(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(Chunker::new(ChunkingConfig::new(chunk_size, overlap)?).chunk_text(text))
}
