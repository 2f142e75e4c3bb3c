use crate::types::{Citation, SearchMode, SearchResult};

pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn max_len(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// One of the two retrieval strategies. Selected once at startup and never
/// swapped afterwards.
pub trait SearchBackend: Send + Sync {
    fn mode(&self) -> SearchMode;
    /// Up to `top_k` hits for a non-blank query.
    fn search(&self, query: &str, top_k: usize) -> anyhow::Result<Vec<SearchResult>>;
}

/// The only retrieval surface the review collaborators see.
pub trait CitationSource {
    fn get_citation(&self, query: &str) -> Option<Citation>;
}
