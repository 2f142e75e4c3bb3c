//! corpagent-vector
//!
//! Exact nearest-neighbour search over chunk embeddings. The index is built
//! once, fully in memory, and is read-only afterwards.

pub mod backend;
pub mod cache;
pub mod index;

pub use backend::EmbeddingBackend;
pub use index::FlatL2Index;
