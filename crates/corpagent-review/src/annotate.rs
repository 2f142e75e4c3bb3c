//! Plain-text annotated copies of reviewed documents.
//!
//! Flagged paragraphs are wrapped in `==` highlight markers and followed by
//! one inline marker per issue. When a document has issues, a page break
//! and a red-flags summary with suggestions and citations are appended.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use corpagent_core::types::Issue;

pub const SUMMARY_HEADING: &str = "=== RED FLAGS SUMMARY ===";
const CITATION_PREVIEW_CHARS: usize = 1000;

fn paragraph_number(section: &str) -> Option<usize> {
    section.strip_prefix("Paragraph ")?.trim().parse().ok()
}

pub fn annotate(paragraphs: &[String], issues: &[Issue]) -> String {
    let mut out: Vec<String> = paragraphs
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let flagged: Vec<&Issue> = issues.iter().filter(|is| paragraph_number(&is.section) == Some(i + 1)).collect();
            if flagged.is_empty() {
                return text.clone();
            }
            let mut line = format!("=={}==", text);
            for issue in flagged {
                line.push_str(&format!("  [⚠ {} - {}]", issue.severity, issue.issue_text));
            }
            line
        })
        .collect();

    if !issues.is_empty() {
        out.push("\u{000C}".to_string());
        out.push(SUMMARY_HEADING.to_string());
        for issue in issues {
            out.push(format!("⚠ {} - {}", issue.severity, issue.issue_text));
            out.push(format!("Suggestion: {}", issue.suggestion));
            if let Some(citation) = issue.citation.as_deref().filter(|c| !c.is_empty()) {
                let preview: String = citation.chars().take(CITATION_PREVIEW_CHARS).collect();
                let source = issue.citation_rule.as_deref().unwrap_or("unknown");
                out.push(format!("Citation (source: {}): {}...", source, preview));
            }
        }
    }
    let mut text = out.join("\n");
    text.push('\n');
    text
}

/// Writes `reviewed_<file_name>` into `out_dir` and returns its path.
pub fn write_annotated(out_dir: &Path, file_name: &str, paragraphs: &[String], issues: &[Issue]) -> Result<PathBuf> {
    fs::create_dir_all(out_dir).with_context(|| format!("failed to create {}", out_dir.display()))?;
    let path = out_dir.join(format!("reviewed_{}", file_name));
    fs::write(&path, annotate(paragraphs, issues)).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(path)
}
