//! corpagent-retrieval
//!
//! The retrieval engine handed to the review pipeline. The backend is picked
//! once, when the engine is built: embedding search if an embedder is
//! available and the index builds cleanly, lexical search otherwise.

use tracing::{info, warn};

use corpagent_core::chunker::{Chunker, ChunkingConfig};
use corpagent_core::config::{expand_path, EmbeddingSettings, RetrievalSettings, Settings};
use corpagent_core::corpus::load_corpus;
use corpagent_core::error::Result;
use corpagent_core::traits::{CitationSource, Embedder, SearchBackend};
use corpagent_core::types::{Citation, ReferenceDocument, SearchMode, SearchResult};
use corpagent_embed::probe_embedder;
use corpagent_text::LexicalBackend;
use corpagent_vector::backend::BuildOptions;
use corpagent_vector::EmbeddingBackend;

pub const DEFAULT_TOP_K: usize = 2;

pub struct RetrievalEngine {
    backend: Box<dyn SearchBackend>,
    documents: usize,
}

impl RetrievalEngine {
    /// Wraps an already selected backend.
    pub fn new(backend: Box<dyn SearchBackend>, documents: usize) -> Self {
        Self { backend, documents }
    }

    /// Probes for an embedding backend and builds the engine from the
    /// configured corpus directory.
    pub fn startup(settings: &Settings) -> Result<Self> {
        ChunkingConfig::new(settings.retrieval.chunk_size, settings.retrieval.overlap)?;
        let embedder = probe_embedder(&settings.embedding);
        Self::build(&settings.retrieval, &settings.embedding, embedder)
    }

    /// Chunking parameters are validated before the corpus is read.
    pub fn build(retrieval: &RetrievalSettings, embedding: &EmbeddingSettings, embedder: Option<Box<dyn Embedder>>) -> Result<Self> {
        let chunking = ChunkingConfig::new(retrieval.chunk_size, retrieval.overlap)?;
        let documents = load_corpus(&expand_path(&retrieval.corpus_dir), &retrieval.extensions);
        let opts = BuildOptions { batch_size: embedding.batch_size, show_progress: embedding.show_progress };
        Ok(Self::from_documents(documents, chunking, embedder, opts))
    }

    pub fn from_documents(documents: Vec<ReferenceDocument>, chunking: ChunkingConfig, embedder: Option<Box<dyn Embedder>>, opts: BuildOptions) -> Self {
        let count = documents.len();
        let backend: Box<dyn SearchBackend> = match embedder {
            Some(embedder) => {
                let chunks = Chunker::new(chunking).chunk_all(&documents);
                match EmbeddingBackend::build(chunks, embedder, opts) {
                    Ok(backend) => Box::new(backend),
                    Err(e) => {
                        warn!(error = %e, "embedding index build failed, falling back to lexical search");
                        Box::new(LexicalBackend::new(documents))
                    }
                }
            }
            None => Box::new(LexicalBackend::new(documents)),
        };
        info!(mode = %backend.mode(), documents = count, "retrieval engine ready");
        Self { backend, documents: count }
    }

    pub fn mode(&self) -> SearchMode { self.backend.mode() }

    pub fn document_count(&self) -> usize { self.documents }

    /// At most `top_k` results. Blank queries and backend failures give an
    /// empty list.
    pub fn retrieve(&self, query: &str, top_k: usize) -> Vec<SearchResult> {
        if query.trim().is_empty() || top_k == 0 { return vec![]; }
        match self.backend.search(query, top_k) {
            Ok(mut results) => {
                results.truncate(top_k);
                results
            }
            Err(e) => {
                warn!(query, error = %e, "retrieval failed");
                vec![]
            }
        }
    }

    pub fn get_citation(&self, query: &str) -> Option<Citation> {
        self.retrieve(query, 1).into_iter().next().map(Citation::from)
    }
}

impl CitationSource for RetrievalEngine {
    fn get_citation(&self, query: &str) -> Option<Citation> { RetrievalEngine::get_citation(self, query) }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingBackend;
    impl SearchBackend for FailingBackend {
        fn mode(&self) -> SearchMode { SearchMode::Embedding }
        fn search(&self, _query: &str, _top_k: usize) -> anyhow::Result<Vec<SearchResult>> { anyhow::bail!("query dimension mismatch") }
    }

    struct OverfullBackend;
    impl SearchBackend for OverfullBackend {
        fn mode(&self) -> SearchMode { SearchMode::Lexical }
        fn search(&self, query: &str, _top_k: usize) -> anyhow::Result<Vec<SearchResult>> {
            Ok((0..5).map(|i| SearchResult { snippet: query.to_string(), source_document_id: format!("{}.txt", i), distance: 0.0 }).collect())
        }
    }

    #[test]
    fn backend_errors_become_empty_results() {
        let engine = RetrievalEngine::new(Box::new(FailingBackend), 1);
        assert!(engine.retrieve("anything", 2).is_empty());
        assert!(engine.get_citation("anything").is_none());
    }

    #[test]
    fn results_are_capped_at_top_k() {
        let engine = RetrievalEngine::new(Box::new(OverfullBackend), 5);
        assert_eq!(engine.retrieve("q", 2).len(), 2);
        assert_eq!(engine.get_citation("q").map(|c| c.citation_rule), Some("0.txt".to_string()));
        assert!(engine.retrieve("q", 0).is_empty());
    }
}
