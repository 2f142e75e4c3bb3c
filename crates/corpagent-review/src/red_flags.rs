use corpagent_core::rules::RuleRegistry;
use corpagent_core::traits::CitationSource;
use corpagent_core::types::{Issue, Severity};

pub const JURISDICTION_RULE: &str = "JURISDICTION_ADGM";
pub const SIGNATORY_RULE: &str = "MISSING_SIGNATORY";

/// Scans paragraphs for red flags. Paragraph numbers in the issues are
/// 1-based positions in `paragraphs`.
pub fn scan_paragraphs(file_name: &str, paragraphs: &[String], registry: &RuleRegistry, source: Option<&dyn CitationSource>) -> Vec<Issue> {
    let mut issues = Vec::new();
    for (idx, text) in paragraphs.iter().enumerate() {
        // also covers "uae federal court(s)"
        if text.to_lowercase().contains("federal court") {
            issues.push(build_issue(
                registry,
                source,
                JURISDICTION_RULE,
                file_name,
                idx + 1,
                "Jurisdiction clause does not specify ADGM",
                "Update jurisdiction to ADGM Courts.",
            ));
        }
    }
    if let Some(last) = paragraphs.last() {
        let last = last.to_lowercase();
        if !last.contains("signed by") && !last.contains("signature") {
            issues.push(build_issue(
                registry,
                source,
                SIGNATORY_RULE,
                file_name,
                paragraphs.len(),
                "Missing signatory section at the end of the document",
                "Add a proper signatory section with authorized signatures.",
            ));
        }
    }
    issues
}

fn build_issue(
    registry: &RuleRegistry,
    source: Option<&dyn CitationSource>,
    rule_id: &str,
    file_name: &str,
    paragraph: usize,
    issue_text: &str,
    suggestion: &str,
) -> Issue {
    let rule = registry.get(rule_id);
    let mut issue = Issue {
        rule_id: rule_id.to_string(),
        document: Some(file_name.to_string()),
        section: format!("Paragraph {}", paragraph),
        issue_text: issue_text.to_string(),
        severity: rule.map(|r| r.severity).unwrap_or(Severity::Medium),
        suggestion: suggestion.to_string(),
        citation: None,
        citation_rule: None,
    };
    if let (Some(source), Some(rule)) = (source, rule) {
        issue.attach_citation(source.get_citation(&rule.query_template));
    }
    issue
}
