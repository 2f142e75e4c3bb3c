use std::path::Path;

use anyhow::{Context, Result};

use corpagent_core::corpus::read_text_lossy;

/// Turns an uploaded file into its sequence of non-empty paragraphs.
pub trait TextExtractor: Send + Sync {
    fn paragraphs(&self, path: &Path) -> Result<Vec<String>>;
}

/// One paragraph per non-blank line, trimmed. Invalid UTF-8 is replaced.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn paragraphs(&self, path: &Path) -> Result<Vec<String>> {
        let text = read_text_lossy(path).with_context(|| format!("failed to read {}", path.display()))?;
        Ok(split_paragraphs(&text))
    }
}

pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.lines().map(str::trim).filter(|l| !l.is_empty()).map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_dropped() {
        let paras = split_paragraphs("  First clause \n\n\r\n\tSecond clause\n   \nSigned by the director");
        assert_eq!(paras, vec!["First clause", "Second clause", "Signed by the director"]);
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(PlainTextExtractor.paragraphs(Path::new("/no/such/upload.txt")).is_err());
    }
}
