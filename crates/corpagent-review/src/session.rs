use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{info, warn};

use corpagent_core::rules::RuleRegistry;
use corpagent_core::traits::CitationSource;
use corpagent_core::types::{Issue, SearchMode};

use crate::annotate::write_annotated;
use crate::checklist::{detect_process, missing_document_issues, verify_checklist};
use crate::classify::detect_document_type;
use crate::extract::{PlainTextExtractor, TextExtractor};
use crate::red_flags::scan_paragraphs;
use crate::report::{assemble_report, FileDetection, Report};

pub const REPORT_FILE: &str = "report.json";

#[derive(Debug, Clone)]
pub struct FileReview {
    pub file: String,
    pub detected_type: String,
    pub issues: usize,
    pub annotated_path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ReviewOutcome {
    pub report: Report,
    pub report_path: PathBuf,
    pub files: Vec<FileReview>,
}

/// One batch review. Borrows the citation source for its lifetime; each
/// file is processed to completion before the next one starts.
pub struct ReviewSession<'a> {
    registry: &'a RuleRegistry,
    citations: Option<(&'a dyn CitationSource, SearchMode)>,
    extractor: Box<dyn TextExtractor>,
    output_dir: PathBuf,
}

impl<'a> ReviewSession<'a> {
    pub fn new(registry: &'a RuleRegistry, output_dir: impl Into<PathBuf>) -> Self {
        Self { registry, citations: None, extractor: Box::new(PlainTextExtractor), output_dir: output_dir.into() }
    }

    pub fn with_citations(mut self, source: &'a dyn CitationSource, mode: SearchMode) -> Self {
        self.citations = Some((source, mode));
        self
    }

    pub fn with_extractor(mut self, extractor: Box<dyn TextExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn output_dir(&self) -> &Path { &self.output_dir }

    fn source(&self) -> Option<&'a dyn CitationSource> { self.citations.map(|(s, _)| s) }

    /// Annotated copies are named after the upload's file name, so two
    /// uploads sharing a name are rejected before anything is written.
    pub fn run(&self, files: &[PathBuf]) -> Result<ReviewOutcome> {
        let names = file_names(files)?;
        fs::create_dir_all(&self.output_dir).with_context(|| format!("failed to create {}", self.output_dir.display()))?;
        let mut all_issues: Vec<Issue> = Vec::new();
        let mut details = Vec::with_capacity(files.len());
        let mut reviews = Vec::with_capacity(files.len());

        for (path, file) in files.iter().zip(names) {
            let paragraphs = self.extractor.paragraphs(path)?;
            if paragraphs.is_empty() {
                warn!(file = %file, "document has no text");
            }
            let detection = detect_document_type(&paragraphs.join("\n"));
            let issues = scan_paragraphs(&file, &paragraphs, self.registry, self.source());
            let annotated_path = write_annotated(&self.output_dir, &file, &paragraphs, &issues)?;
            info!(file = %file, detected = %detection.detected_type, issues = issues.len(), "document reviewed");

            reviews.push(FileReview { file: file.clone(), detected_type: detection.detected_type.clone(), issues: issues.len(), annotated_path });
            details.push(FileDetection { file, detected_type: detection.detected_type, matched_keywords: detection.matched_keywords });
            all_issues.extend(issues);
        }

        let uploaded: Vec<String> = details.iter().map(|d| d.detected_type.clone()).collect();
        let process = detect_process(&uploaded, self.registry);
        let summary = verify_checklist(&uploaded, &process, self.registry);
        all_issues.extend(missing_document_issues(&summary.missing_documents, self.registry, self.source()));

        let report = assemble_report(summary, details, all_issues, self.registry, self.source(), self.citations.map(|(_, m)| m));
        let report_path = self.output_dir.join(REPORT_FILE);
        report.write_json(&report_path)?;
        info!(
            process = %report.process,
            issues = report.issues_found.len(),
            violations = report.violations().count(),
            report = %report_path.display(),
            "review complete"
        );
        Ok(ReviewOutcome { report, report_path, files: reviews })
    }
}

fn file_names(files: &[PathBuf]) -> Result<Vec<String>> {
    let mut seen = HashSet::new();
    files
        .iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .with_context(|| format!("not a file path: {}", path.display()))?;
            if !seen.insert(name.clone()) {
                bail!("duplicate upload name {}: annotated copies would overwrite each other", name);
            }
            Ok(name)
        })
        .collect()
}
