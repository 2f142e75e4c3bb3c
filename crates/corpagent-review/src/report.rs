use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use corpagent_core::rules::RuleRegistry;
use corpagent_core::traits::CitationSource;
use corpagent_core::types::{Issue, SearchMode, Severity};

use crate::checklist::ChecklistSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComplianceStatus {
    Compliant,
    Violation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    pub rule_id: String,
    pub doc_type: String,
    pub status: ComplianceStatus,
    pub severity: Severity,
    pub citation: Option<String>,
    pub citation_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetection {
    pub file: String,
    pub detected_type: String,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub process: String,
    pub documents_uploaded: usize,
    pub required_documents: usize,
    pub missing_documents: Vec<String>,
    pub detail_per_file: Vec<FileDetection>,
    pub issues_found: Vec<Issue>,
    pub compliance_checklist: Vec<ChecklistEntry>,
    pub retrieval_mode: Option<SearchMode>,
    pub generated_at: String,
}

impl Report {
    pub fn violations(&self) -> impl Iterator<Item = &ChecklistEntry> {
        self.compliance_checklist.iter().filter(|e| e.status == ComplianceStatus::Violation)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("failed to serialise report")
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json_pretty()?).with_context(|| format!("failed to write report {}", path.display()))
    }
}

/// One checklist entry per rule, in registry order.
///
/// A rule is violated when its document type is missing or when any issue
/// carries its id. The first such issue supplies the citation; for a missing
/// document the citation is looked up in `source`. When nothing was found
/// the rule's default citation source is reported.
pub fn assemble_report(
    summary: ChecklistSummary,
    detail_per_file: Vec<FileDetection>,
    issues: Vec<Issue>,
    registry: &RuleRegistry,
    source: Option<&dyn CitationSource>,
    retrieval_mode: Option<SearchMode>,
) -> Report {
    let compliance_checklist = registry
        .rules()
        .iter()
        .map(|rule| {
            let mut status = ComplianceStatus::Compliant;
            let mut citation = None;
            let mut citation_rule = None;

            if summary.missing_documents.contains(&rule.doc_type) {
                status = ComplianceStatus::Violation;
                match source.and_then(|s| s.get_citation(&rule.query_template)) {
                    Some(c) => {
                        citation = Some(c.citation);
                        citation_rule = Some(c.citation_rule);
                    }
                    None => citation_rule = Some(rule.default_citation_rule.clone()),
                }
            }
            if let Some(issue) = issues.iter().find(|i| i.rule_id == rule.rule_id) {
                status = ComplianceStatus::Violation;
                citation = issue.citation.clone();
                citation_rule = issue.citation_rule.clone().or_else(|| Some(rule.default_citation_rule.clone()));
            }

            ChecklistEntry { rule_id: rule.rule_id.clone(), doc_type: rule.doc_type.clone(), status, severity: rule.severity, citation, citation_rule }
        })
        .collect();

    Report {
        process: summary.process,
        documents_uploaded: summary.documents_uploaded,
        required_documents: summary.required_documents,
        missing_documents: summary.missing_documents,
        detail_per_file,
        issues_found: issues,
        compliance_checklist,
        retrieval_mode,
        generated_at: Utc::now().to_rfc3339(),
    }
}
