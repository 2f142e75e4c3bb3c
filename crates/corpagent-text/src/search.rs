use anyhow::Result;
use tracing::debug;

use corpagent_core::traits::SearchBackend;
use corpagent_core::types::{ReferenceDocument, SearchMode, SearchResult};

/// Characters kept before the first matching query token.
pub const SNIPPET_BEFORE: usize = 200;
/// Characters kept from the first matching query token onwards.
pub const SNIPPET_AFTER: usize = 400;

struct LexicalDocument {
    id: String,
    text: String,
    lowered: String,
}

/// Whole-document substring search.
///
/// A document matches when every lowercased whitespace token of the query
/// occurs somewhere in its lowercased text. The snippet is cut around the
/// earliest occurrence of any token. Matches come back in corpus order and
/// carry no ranking, so `distance` is always `0.0`.
pub struct LexicalBackend {
    documents: Vec<LexicalDocument>,
}

impl LexicalBackend {
    pub fn new(documents: Vec<ReferenceDocument>) -> Self {
        let documents = documents
            .into_iter()
            .map(|d| LexicalDocument { lowered: d.text.to_lowercase(), id: d.id, text: d.text })
            .collect();
        Self { documents }
    }

    pub fn len(&self) -> usize { self.documents.len() }

    pub fn is_empty(&self) -> bool { self.documents.is_empty() }
}

impl SearchBackend for LexicalBackend {
    fn mode(&self) -> SearchMode { SearchMode::Lexical }

    fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>> {
        let lowered_query = query.to_lowercase();
        let tokens: Vec<&str> = lowered_query.split_whitespace().collect();
        let mut results = Vec::new();
        if tokens.is_empty() || top_k == 0 { return Ok(results); }

        'docs: for doc in &self.documents {
            let mut earliest = usize::MAX;
            for token in &tokens {
                match doc.lowered.find(token) {
                    Some(pos) => earliest = earliest.min(pos),
                    None => continue 'docs,
                }
            }
            let char_offset = doc.lowered[..earliest].chars().count();
            results.push(SearchResult {
                snippet: snippet_window(&doc.text, char_offset, SNIPPET_BEFORE, SNIPPET_AFTER),
                source_document_id: doc.id.clone(),
                distance: 0.0,
            });
            if results.len() == top_k { break; }
        }
        debug!(query, hits = results.len(), "lexical search");
        Ok(results)
    }
}

/// Characters `[offset - before, offset + after)` of `text`, clamped to the
/// text, newlines turned into spaces, surrounding whitespace trimmed.
pub fn snippet_window(text: &str, char_offset: usize, before: usize, after: usize) -> String {
    let start = char_offset.saturating_sub(before);
    let end = char_offset.saturating_add(after);
    let window: String = text.chars().skip(start).take(end - start).collect();
    window.replace('\n', " ").trim().to_string()
}
