use anyhow::{anyhow, bail, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};

use corpagent_core::traits::{Embedder, SearchBackend};
use corpagent_core::types::{Chunk, SearchMode, SearchResult};

use crate::cache::EmbeddingCache;
use crate::index::FlatL2Index;

#[derive(Debug, Clone, Copy)]
pub struct BuildOptions {
    pub batch_size: usize,
    pub show_progress: bool,
}

impl Default for BuildOptions {
    fn default() -> Self { Self { batch_size: 32, show_progress: false } }
}

/// Embedding-mode search: `chunks[i]` is row `i` of the index.
pub struct EmbeddingBackend {
    chunks: Vec<Chunk>,
    index: FlatL2Index,
    embedder: Box<dyn Embedder>,
}

impl EmbeddingBackend {
    /// Embeds every chunk and builds the index. Fails as a whole; there is
    /// never a partially populated index.
    pub fn build(chunks: Vec<Chunk>, embedder: Box<dyn Embedder>, opts: BuildOptions) -> Result<Self> {
        info!(chunks = chunks.len(), dim = embedder.dim(), "building embedding index");
        let pb = if opts.show_progress { ProgressBar::new(chunks.len() as u64) } else { ProgressBar::hidden() };
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} chunks ({percent}%) {msg}")
            .map(|s| s.progress_chars("#>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        pb.set_style(style);

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let mut cache = EmbeddingCache::new();
        let embeddings = cache.embed_all(embedder.as_ref(), &texts, opts.batch_size, &pb)?;
        if embeddings.len() != chunks.len() {
            bail!("{} embeddings for {} chunks", embeddings.len(), chunks.len());
        }
        if let Some(v) = embeddings.iter().find(|v| v.len() != embedder.dim()) {
            bail!("embedder declared {} dims but produced {}", embedder.dim(), v.len());
        }
        let index = FlatL2Index::build(&embeddings)?;
        pb.finish_and_clear();
        info!(vectors = index.len(), unique = cache.len(), "embedding index ready");
        Ok(Self { chunks, index, embedder })
    }

    pub fn len(&self) -> usize { self.chunks.len() }

    pub fn is_empty(&self) -> bool { self.chunks.is_empty() }

    pub fn dim(&self) -> usize { self.embedder.dim() }
}

impl SearchBackend for EmbeddingBackend {
    fn mode(&self) -> SearchMode { SearchMode::Embedding }

    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        if self.is_empty() { return Ok(vec![]); }
        let query_vec = self
            .embedder
            .embed_batch(&[query.to_string()])?
            .pop()
            .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
        let hits = self.index.search(&query_vec, top_k)?;
        debug!(query, hits = hits.len(), "embedding search");
        Ok(hits
            .into_iter()
            .map(|(row, distance)| {
                let chunk = &self.chunks[row];
                SearchResult { snippet: chunk.text.clone(), source_document_id: chunk.source_document_id.clone(), distance: distance.max(0.0) }
            })
            .collect())
    }
}
