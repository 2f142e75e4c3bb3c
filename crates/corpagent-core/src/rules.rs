//! Static compliance rule table and per-process document requirements.
//!
//! The registry is small and read-only, so lookups are linear scans in
//! declaration order. Several rules may share one `doc_type`.

use std::collections::HashSet;
use std::path::Path;

use figment::providers::{Format, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Rule, Severity};

pub const COMPANY_INCORPORATION: &str = "Company Incorporation";
pub const DEFAULT_CITATION_RULE: &str = "adgm_companies_regulations_2020.txt";

/// Required document types for one registration process, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRequirement {
    pub name: String,
    pub required: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleRegistry {
    #[serde(default)]
    rules: Vec<Rule>,
    #[serde(default)]
    processes: Vec<ProcessRequirement>,
}

impl RuleRegistry {
    /// Rejects duplicate rule ids, duplicate process names and repeated
    /// document types within one process.
    pub fn new(rules: Vec<Rule>, processes: Vec<ProcessRequirement>) -> Result<Self> {
        let mut ids = HashSet::new();
        for rule in &rules {
            if !ids.insert(rule.rule_id.as_str()) {
                return Err(Error::Configuration(format!("duplicate rule id '{}'", rule.rule_id)));
            }
        }
        let mut names = HashSet::new();
        for process in &processes {
            if !names.insert(process.name.as_str()) {
                return Err(Error::Configuration(format!("duplicate process '{}'", process.name)));
            }
            let mut seen = HashSet::new();
            if let Some(dup) = process.required.iter().find(|d| !seen.insert(d.as_str())) {
                return Err(Error::Configuration(format!(
                    "process '{}' lists '{}' more than once",
                    process.name, dup
                )));
            }
        }
        Ok(Self { rules, processes })
    }

    pub fn builtin() -> Self {
        let rule = |id: &str, doc_type: &str, severity: Severity, query: &str| Rule {
            rule_id: id.to_string(),
            doc_type: doc_type.to_string(),
            severity,
            query_template: query.to_string(),
            default_citation_rule: DEFAULT_CITATION_RULE.to_string(),
        };
        let rules = vec![
            rule("JURISDICTION_ADGM", "Articles of Association", Severity::High, "Part 6 – Jurisdiction_ADGM"),
            rule("MISSING_SIGNATORY", "Memorandum of Association", Severity::Medium, "Part 33 – Signatory Requirements"),
            rule("REQ_ARTICLES_ASSOCIATION", "Articles of Association", Severity::High, "Part 10 – Articles of Association"),
            rule("REQ_MEMORANDUM_ASSOCIATION", "Memorandum of Association", Severity::High, "Part 11 – Memorandum of Association"),
            rule("REQ_BOARD_RESOLUTION", "Board Resolution", Severity::High, "Part 15 – Board Resolution"),
            rule("REQ_SHAREHOLDER_RESOLUTION", "Shareholder Resolution", Severity::High, "Part 16 – Shareholder Resolution"),
            rule("REQ_INCORP_APP_FORM", "Incorporation Application Form", Severity::High, "Part 20 – Incorporation Application Form"),
            rule("REQ_UBO_DECLARATION", "UBO Declaration Form", Severity::High, "Part 21 – Ultimate Beneficial Owner (UBO) Declaration Form"),
            rule("REQ_REGISTER_MEMBERS_DIRECTORS", "Register of Members and Directors", Severity::High, "Part 22 – Register of Members and Directors"),
            rule("REQ_CHANGE_ADDRESS_NOTICE", "Change of Registered Address Notice", Severity::High, "Part 23 – Change of Registered Address Notice"),
        ];
        let processes = vec![ProcessRequirement {
            name: COMPANY_INCORPORATION.to_string(),
            required: [
                "Articles of Association",
                "Memorandum of Association",
                "Board Resolution",
                "Shareholder Resolution",
                "Incorporation Application Form",
                "UBO Declaration Form",
                "Register of Members and Directors",
                "Change of Registered Address Notice",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }];
        Self { rules, processes }
    }

    /// Loads a replacement table:
    ///
    /// ```toml
    /// [[rules]]
    /// rule_id = "JURISDICTION_ADGM"
    /// doc_type = "Articles of Association"
    /// severity = "High"
    /// query_template = "Part 6 – Jurisdiction_ADGM"
    /// default_citation_rule = "adgm_companies_regulations_2020.txt"
    ///
    /// [[processes]]
    /// name = "Company Incorporation"
    /// required = ["Articles of Association"]
    /// ```
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        if !path.is_file() {
            return Err(Error::NotFound(format!("rules file {}", path.display())));
        }
        let table: RuleRegistry = Figment::from(Toml::file(path)).extract()?;
        Self::new(table.rules, table.processes)
    }

    pub fn rules(&self) -> &[Rule] { &self.rules }

    pub fn processes(&self) -> &[ProcessRequirement] { &self.processes }

    pub fn get(&self, rule_id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.rule_id == rule_id)
    }

    /// Several rules may share a document type; all of them, in table order.
    pub fn by_doc_type(&self, doc_type: &str) -> impl Iterator<Item = &Rule> + '_ {
        let doc_type = doc_type.to_string();
        self.rules.iter().filter(move |r| r.doc_type == doc_type)
    }

    pub fn first_for_doc_type(&self, doc_type: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.doc_type == doc_type)
    }

    pub fn required_documents(&self, process: &str) -> &[String] {
        self.processes
            .iter()
            .find(|p| p.name == process)
            .map(|p| p.required.as_slice())
            .unwrap_or(&[])
    }
}

impl Default for RuleRegistry {
    fn default() -> Self { Self::builtin() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_table_shape() {
        let reg = RuleRegistry::builtin();
        assert_eq!(reg.rules().len(), 10);
        assert_eq!(reg.required_documents(COMPANY_INCORPORATION).len(), 8);
        assert!(reg.required_documents("Branch Registration").is_empty());
        assert_eq!(reg.get("MISSING_SIGNATORY").map(|r| r.severity), Some(Severity::Medium));
        assert!(reg.get("NOPE").is_none());
    }

    #[test]
    fn doc_type_lookup_returns_all_matches_in_order() {
        let reg = RuleRegistry::builtin();
        let ids: Vec<&str> = reg.by_doc_type("Articles of Association").map(|r| r.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["JURISDICTION_ADGM", "REQ_ARTICLES_ASSOCIATION"]);
        assert_eq!(reg.first_for_doc_type("Board Resolution").map(|r| r.rule_id.as_str()), Some("REQ_BOARD_RESOLUTION"));
    }

    #[test]
    fn doc_type_lookups_outlive_a_temporary_key() {
        let reg = RuleRegistry::builtin();
        let first = {
            let key = String::from("Memorandum of Association");
            reg.first_for_doc_type(&key)
        };
        assert_eq!(first.map(|r| r.rule_id.as_str()), Some("MISSING_SIGNATORY"));
        let all: Vec<&Rule> = {
            let key = String::from("Memorandum of Association");
            reg.by_doc_type(&key).collect()
        };
        assert_eq!(all.len(), 2);
        assert!(reg.first_for_doc_type("Unknown").is_none());
    }

    #[test]
    fn duplicate_rule_ids_are_rejected() {
        let reg = RuleRegistry::builtin();
        let mut rules = reg.rules().to_vec();
        rules.push(rules[0].clone());
        assert!(matches!(RuleRegistry::new(rules, vec![]), Err(Error::Configuration(_))));
    }
}
