//! Domain types shared by the retrieval backends and the review pipeline.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type DocumentId = String;

/// A plain-text reference document loaded from the corpus directory.
///
/// `id` is the file name (including extension) and doubles as the
/// citation rule reported to callers. Never mutated after loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDocument {
    pub id: DocumentId,
    pub text: String,
}

impl ReferenceDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into() }
    }
}

/// A window of consecutive words cut from one reference document.
///
/// - `text`: the words of the window joined by single spaces
/// - `source_document_id`: `ReferenceDocument::id` of the parent
/// - `sequence_index`: position of the window within the parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub source_document_id: DocumentId,
    pub sequence_index: usize,
}

/// Which backend answered a query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Embedding,
    Lexical,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Embedding => f.write_str("embedding"),
            SearchMode::Lexical => f.write_str("lexical"),
        }
    }
}

/// One retrieval hit.
///
/// `distance` is squared L2 in embedding mode (ascending order) and always
/// `0.0` in lexical mode. Values are not comparable across modes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub snippet: String,
    pub source_document_id: DocumentId,
    pub distance: f32,
}

/// The citation record attached to issues and checklist entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub citation: String,
    pub citation_rule: DocumentId,
}

impl From<SearchResult> for Citation {
    fn from(result: SearchResult) -> Self {
        Self { citation: result.snippet, citation_rule: result.source_document_id }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => f.write_str("Low"),
            Severity::Medium => f.write_str("Medium"),
            Severity::High => f.write_str("High"),
        }
    }
}

/// A static compliance rule. `query_template` is what gets sent to the
/// retrieval engine when a citation is needed for this rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    pub rule_id: String,
    pub doc_type: String,
    pub severity: Severity,
    pub query_template: String,
    pub default_citation_rule: String,
}

/// A detected compliance problem, either from a paragraph scan or from a
/// missing required document (in which case `document` is `None`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub rule_id: String,
    pub document: Option<String>,
    pub section: String,
    #[serde(rename = "issue")]
    pub issue_text: String,
    pub severity: Severity,
    pub suggestion: String,
    pub citation: Option<String>,
    pub citation_rule: Option<String>,
}

impl Issue {
    pub fn attach_citation(&mut self, citation: Option<Citation>) {
        if let Some(c) = citation {
            self.citation = Some(c.citation);
            self.citation_rule = Some(c.citation_rule);
        }
    }
}
