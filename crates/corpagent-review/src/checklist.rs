use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use corpagent_core::rules::{RuleRegistry, COMPANY_INCORPORATION};
use corpagent_core::traits::CitationSource;
use corpagent_core::types::Issue;

use crate::classify::{known_types, UNKNOWN_TYPE};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistSummary {
    pub process: String,
    pub required_documents: usize,
    pub documents_uploaded: usize,
    pub missing_documents: Vec<String>,
}

/// The first process fully covered by the uploads; otherwise company
/// incorporation when at least one recognised type was uploaded.
pub fn detect_process(uploaded: &[String], registry: &RuleRegistry) -> String {
    let set: HashSet<&str> = uploaded.iter().map(String::as_str).collect();
    if let Some(p) = registry.processes().iter().find(|p| p.required.iter().all(|d| set.contains(d.as_str()))) {
        return p.name.clone();
    }
    if known_types().any(|t| set.contains(t)) {
        return COMPANY_INCORPORATION.to_string();
    }
    UNKNOWN_TYPE.to_string()
}

/// `documents_uploaded` counts every upload, including unrecognised ones.
pub fn verify_checklist(uploaded: &[String], process: &str, registry: &RuleRegistry) -> ChecklistSummary {
    let required = registry.required_documents(process);
    let missing_documents: Vec<String> = required.iter().filter(|d| !uploaded.contains(d)).cloned().collect();
    debug!(process, required = required.len(), missing = missing_documents.len(), "checklist verified");
    ChecklistSummary {
        process: process.to_string(),
        required_documents: required.len(),
        documents_uploaded: uploaded.len(),
        missing_documents,
    }
}

/// One issue per missing document type, raised against the first rule for
/// that type. Types with no rule produce nothing.
pub fn missing_document_issues(missing: &[String], registry: &RuleRegistry, source: Option<&dyn CitationSource>) -> Vec<Issue> {
    missing
        .iter()
        .filter_map(|doc_type| {
            let rule = registry.first_for_doc_type(doc_type)?;
            let mut issue = Issue {
                rule_id: rule.rule_id.clone(),
                document: None,
                section: "N/A".to_string(),
                issue_text: format!("Missing required document: {}", doc_type),
                severity: rule.severity,
                suggestion: format!("Provide the '{}' as per ADGM requirements.", doc_type),
                citation: None,
                citation_rule: None,
            };
            if let Some(source) = source {
                issue.attach_citation(source.get_citation(&rule.query_template));
            }
            Some(issue)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(list: &[&str]) -> Vec<String> { list.iter().map(|s| s.to_string()).collect() }

    #[test]
    fn full_set_selects_the_process() {
        let registry = RuleRegistry::builtin();
        let all = registry.required_documents(COMPANY_INCORPORATION).to_vec();
        assert_eq!(detect_process(&all, &registry), COMPANY_INCORPORATION);
        assert!(verify_checklist(&all, COMPANY_INCORPORATION, &registry).missing_documents.is_empty());
    }

    #[test]
    fn partial_set_falls_back_to_incorporation() {
        let registry = RuleRegistry::builtin();
        let uploaded = types(&["Board Resolution", UNKNOWN_TYPE]);
        assert_eq!(detect_process(&uploaded, &registry), COMPANY_INCORPORATION);
        let summary = verify_checklist(&uploaded, COMPANY_INCORPORATION, &registry);
        assert_eq!(summary.required_documents, 8);
        assert_eq!(summary.documents_uploaded, 2);
        assert_eq!(summary.missing_documents.len(), 7);
        assert_eq!(summary.missing_documents[0], "Articles of Association");
    }

    #[test]
    fn unknown_uploads_have_no_process() {
        let registry = RuleRegistry::builtin();
        let uploaded = types(&[UNKNOWN_TYPE]);
        assert_eq!(detect_process(&uploaded, &registry), UNKNOWN_TYPE);
        let summary = verify_checklist(&uploaded, UNKNOWN_TYPE, &registry);
        assert_eq!(summary.required_documents, 0);
        assert!(summary.missing_documents.is_empty());
    }

    #[test]
    fn missing_documents_use_the_first_rule_of_the_type() {
        let registry = RuleRegistry::builtin();
        let issues = missing_document_issues(&types(&["Articles of Association", "Not A Type"]), &registry, None);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].rule_id, "JURISDICTION_ADGM");
        assert_eq!(issues[0].section, "N/A");
        assert_eq!(issues[0].issue_text, "Missing required document: Articles of Association");
        assert_eq!(issues[0].suggestion, "Provide the 'Articles of Association' as per ADGM requirements.");
        assert!(issues[0].citation.is_none());
    }
}
