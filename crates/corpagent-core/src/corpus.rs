use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::types::ReferenceDocument;

/// Reads the reference corpus: every regular file directly inside a
/// directory whose extension is one of `extensions`.
#[derive(Debug, Clone)]
pub struct CorpusLoader {
    extensions: Vec<String>,
}

impl Default for CorpusLoader {
    fn default() -> Self {
        Self::new(["txt", "md"])
    }
}

impl CorpusLoader {
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim_start_matches('.').to_ascii_lowercase())
            .collect();
        Self { extensions }
    }

    /// A missing, unreadable or empty directory yields an empty corpus.
    /// Documents are returned sorted by file name so load order is stable.
    pub fn load(&self, dir: &Path) -> Vec<ReferenceDocument> {
        if !dir.is_dir() {
            warn!(dir = %dir.display(), "reference directory not found, corpus is empty");
            return vec![];
        }
        let mut documents = Vec::new();
        for path in self.list_files(dir) {
            let Some(id) = path.file_name().map(|n| n.to_string_lossy().to_string()) else { continue };
            match read_text_lossy(&path) {
                Ok(text) => {
                    debug!(document = %id, bytes = text.len(), "loaded reference document");
                    documents.push(ReferenceDocument { id, text });
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable reference document"),
            }
        }
        info!(dir = %dir.display(), documents = documents.len(), "reference corpus loaded");
        documents
    }

    fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .min_depth(1)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| self.accepts(p))
            .collect();
        files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        files
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|s| s.to_str())
            .map(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
            .unwrap_or(false)
    }
}

/// Reads a file as UTF-8, replacing invalid sequences.
pub fn read_text_lossy(file_path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(file_path)?;
    Ok(match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).to_string(),
    })
}

/// Convenience wrapper around [`CorpusLoader::load`].
pub fn load_corpus(dir: &Path, extensions: &[String]) -> Vec<ReferenceDocument> {
    CorpusLoader::new(extensions).load(dir)
}
