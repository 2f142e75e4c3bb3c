//! corpagent-text
//!
//! Keyword fallback used when no embedding backend is available. See
//! [`search::LexicalBackend`] for the matching and snippet rules.
pub mod search;

pub use search::{LexicalBackend, SNIPPET_AFTER, SNIPPET_BEFORE};
