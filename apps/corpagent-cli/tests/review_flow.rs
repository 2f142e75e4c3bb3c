use std::fs;
use std::path::PathBuf;

use clap::Parser;
use tempfile::TempDir;

use corpagent_cli::{commands, Cli};
use corpagent_core::chunker::ChunkingConfig;
use corpagent_core::config::{RetrievalSettings, Settings};
use corpagent_core::rules::{RuleRegistry, COMPANY_INCORPORATION};
use corpagent_core::types::SearchMode;
use corpagent_retrieval::RetrievalEngine;
use corpagent_review::ComplianceStatus;

fn test_data() -> PathBuf {
    // apps/corpagent-cli -> apps -> repo root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).ancestors().nth(2).unwrap().join("test_data")
}

fn lexical_engine() -> RetrievalEngine {
    let settings = RetrievalSettings { corpus_dir: test_data().join("legal_refs").to_string_lossy().to_string(), ..RetrievalSettings::default() };
    RetrievalEngine::build(&settings, &Default::default(), None).expect("engine")
}

fn uploads() -> Vec<PathBuf> {
    let dir = test_data().join("uploads");
    ["articles_of_association.txt", "memorandum_of_association.txt", "board_resolution.txt"].iter().map(|f| dir.join(f)).collect()
}

#[test]
fn review_writes_report_and_annotated_copies() {
    let out_dir = TempDir::new().unwrap();
    let engine = lexical_engine();
    assert_eq!(engine.mode(), SearchMode::Lexical);
    let registry = RuleRegistry::builtin();
    let mut stdout = Vec::new();

    let outcome = commands::review(&Settings::default(), &registry, &engine, &uploads(), Some(out_dir.path()), &mut stdout).expect("review");
    let report = &outcome.report;

    assert_eq!(report.process, COMPANY_INCORPORATION);
    assert_eq!(report.documents_uploaded, 3);
    assert_eq!(report.required_documents, 8);
    assert_eq!(report.missing_documents.len(), 5);
    assert_eq!(report.retrieval_mode, Some(SearchMode::Lexical));
    let types: Vec<&str> = report.detail_per_file.iter().map(|d| d.detected_type.as_str()).collect();
    assert_eq!(types, vec!["Articles of Association", "Memorandum of Association", "Board Resolution"]);

    let jurisdiction = report.issues_found.iter().find(|i| i.rule_id == "JURISDICTION_ADGM").expect("jurisdiction issue");
    assert_eq!(jurisdiction.document.as_deref(), Some("articles_of_association.txt"));
    assert_eq!(jurisdiction.section, "Paragraph 4");
    assert_eq!(jurisdiction.citation_rule.as_deref(), Some("adgm_companies_regulations_2020.txt"));
    assert!(jurisdiction.citation.as_deref().unwrap_or_default().contains("ADGM Courts"));

    let signatory = report.issues_found.iter().find(|i| i.rule_id == "MISSING_SIGNATORY").expect("signatory issue");
    assert_eq!(signatory.document.as_deref(), Some("memorandum_of_association.txt"));

    // 2 red flags + 5 missing documents
    assert_eq!(report.issues_found.len(), 7);
    let board = report.compliance_checklist.iter().find(|e| e.rule_id == "REQ_BOARD_RESOLUTION").unwrap();
    assert_eq!(board.status, ComplianceStatus::Compliant);
    let ubo = report.compliance_checklist.iter().find(|e| e.rule_id == "REQ_UBO_DECLARATION").unwrap();
    assert_eq!(ubo.status, ComplianceStatus::Violation);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&outcome.report_path).unwrap()).unwrap();
    assert_eq!(json["issues_found"].as_array().unwrap().len(), 7);
    assert_eq!(json["issues_found"][0]["issue"], "Jurisdiction clause does not specify ADGM");

    let annotated = fs::read_to_string(out_dir.path().join("reviewed_articles_of_association.txt")).unwrap();
    assert!(annotated.contains("==3. Any dispute arising out of these articles shall be referred to the UAE Federal Courts.==  [⚠ High - Jurisdiction clause does not specify ADGM]"));
    assert!(annotated.contains("=== RED FLAGS SUMMARY ==="));
    let clean = fs::read_to_string(out_dir.path().join("reviewed_board_resolution.txt")).unwrap();
    assert!(!clean.contains("RED FLAGS"));

    let printed = String::from_utf8(stdout).unwrap();
    assert!(printed.contains("Retrieval mode: lexical"));
    assert!(printed.contains("Report: "));
}

#[test]
fn cite_prints_null_for_an_empty_corpus() {
    let empty = TempDir::new().unwrap();
    let settings = RetrievalSettings { corpus_dir: empty.path().to_string_lossy().to_string(), ..RetrievalSettings::default() };
    let engine = RetrievalEngine::build(&settings, &Default::default(), None).unwrap();
    let mut out = Vec::new();
    commands::cite(&engine, "Part 6 – Jurisdiction_ADGM", &mut out).unwrap();
    assert_eq!(String::from_utf8(out).unwrap().trim(), "null");
}

#[test]
fn search_reports_mode_and_sources() {
    let mut out = Vec::new();
    commands::search(&lexical_engine(), "signatory requirements", 2, &mut out).unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.starts_with("Mode: lexical"));
    assert!(printed.contains("1. adgm_companies_regulations_2020.txt"));
}

#[test]
fn chunks_command_reports_counts_and_validates_overlap() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("ten_thousand.txt");
    let text: Vec<String> = (0..10_000).map(|i| format!("w{}", i)).collect();
    fs::write(&file, text.join(" ")).unwrap();

    let mut out = Vec::new();
    commands::chunks(&file, 400, 50, &mut out).unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Chunks: 29"));
    assert_eq!(ChunkingConfig::new(400, 50).unwrap().expected_chunks(10_000), 29);

    assert!(commands::chunks(&file, 50, 50, &mut Vec::new()).is_err());
}

#[test]
fn rules_lists_every_rule_and_the_process() {
    let mut out = Vec::new();
    commands::rules(&RuleRegistry::builtin(), &mut out).unwrap();
    let printed = String::from_utf8(out).unwrap();
    assert_eq!(printed.lines().filter(|l| l.starts_with("REQ_") || l.starts_with("JURISDICTION") || l.starts_with("MISSING")).count(), 10);
    assert!(printed.contains("Company Incorporation requires:"));
}

#[test]
fn relative_paths_in_a_config_file_resolve_next_to_it() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("rules.toml"),
        r#"
[[rules]]
rule_id = "BOARD_QUORUM"
doc_type = "Board Resolution"
severity = "Low"
query_template = "board quorum"
default_citation_rule = "board.txt"

[[processes]]
name = "Board Change"
required = ["Board Resolution"]
"#,
    )
    .unwrap();
    let config = dir.path().join("corpagent.toml");
    fs::write(&config, "[review]\nrules_file = \"rules.toml\"\n").unwrap();

    let cli = Cli::try_parse_from(["corpagent", "--config", config.to_str().unwrap(), "rules"]).unwrap();
    let mut stdout = Vec::new();
    commands::run(cli, &mut stdout).expect("rules");
    let text = String::from_utf8(stdout).unwrap();
    assert!(text.contains("BOARD_QUORUM"));
    assert!(text.contains("Board Change requires:"));
}

#[test]
fn command_errors_are_returned_without_output() {
    let cli = Cli::try_parse_from(["corpagent", "--config", "/no/such/corpagent.toml", "rules"]).unwrap();
    let mut stdout = Vec::new();
    let err = commands::run(cli, &mut stdout).unwrap_err();
    assert!(err.to_string().contains("/no/such/corpagent.toml"));
    assert!(stdout.is_empty());
}
