use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use corpagent_core::chunker::{Chunker, ChunkingConfig};
use corpagent_core::config::{expand_path, Config, Settings};
use corpagent_core::corpus::read_text_lossy;
use corpagent_core::rules::RuleRegistry;
use corpagent_retrieval::RetrievalEngine;
use corpagent_review::{ReviewOutcome, ReviewSession};

use crate::cli::{Cli, Command};

pub fn run(cli: Cli, out: &mut dyn Write) -> Result<()> {
    let config = Config::load_with(cli.config.as_deref())?;
    let mut settings = config.settings()?;
    if let Some(base) = cli.config.as_deref().and_then(Path::parent) {
        settings.resolve_paths(base);
    }
    match cli.command {
        Command::Review { files, out: out_dir } => {
            let registry = load_registry(&settings)?;
            let engine = RetrievalEngine::startup(&settings)?;
            review(&settings, &registry, &engine, &files, out_dir.as_deref(), out).map(|_| ())
        }
        Command::Search { query, top_k } => {
            let engine = RetrievalEngine::startup(&settings)?;
            search(&engine, &query, top_k.unwrap_or(settings.retrieval.top_k), out)
        }
        Command::Cite { query } => {
            let engine = RetrievalEngine::startup(&settings)?;
            cite(&engine, &query, out)
        }
        Command::Chunks { file, chunk_size, overlap } => chunks(
            &file,
            chunk_size.unwrap_or(settings.retrieval.chunk_size),
            overlap.unwrap_or(settings.retrieval.overlap),
            out,
        ),
        Command::Rules => rules(&load_registry(&settings)?, out),
    }
}

/// The built-in table unless `review.rules_file` points at a replacement.
pub fn load_registry(settings: &Settings) -> Result<RuleRegistry> {
    match &settings.review.rules_file {
        Some(path) => Ok(RuleRegistry::from_toml_file(&expand_path(path))?),
        None => Ok(RuleRegistry::builtin()),
    }
}

pub fn review(
    settings: &Settings,
    registry: &RuleRegistry,
    engine: &RetrievalEngine,
    files: &[PathBuf],
    out_dir: Option<&Path>,
    out: &mut dyn Write,
) -> Result<ReviewOutcome> {
    let out_dir = out_dir.map(Path::to_path_buf).unwrap_or_else(|| expand_path(&settings.review.output_dir));
    let outcome = ReviewSession::new(registry, out_dir).with_citations(engine, engine.mode()).run(files)?;

    writeln!(out, "Retrieval mode: {} ({} reference documents)", engine.mode(), engine.document_count())?;
    for f in &outcome.files {
        writeln!(out, "📄 {} → {} ({} issue(s)) → {}", f.file, f.detected_type, f.issues, f.annotated_path.display())?;
    }
    let report = &outcome.report;
    writeln!(out, "Process: {}", report.process)?;
    writeln!(out, "Documents: {} uploaded / {} required", report.documents_uploaded, report.required_documents)?;
    for missing in &report.missing_documents {
        writeln!(out, "  missing: {}", missing)?;
    }
    if report.issues_found.is_empty() {
        writeln!(out, "✅ No issues found")?;
    } else {
        writeln!(out, "⚠️  {} issue(s), {} checklist violation(s)", report.issues_found.len(), report.violations().count())?;
    }
    writeln!(out, "Report: {}", outcome.report_path.display())?;
    Ok(outcome)
}

pub fn search(engine: &RetrievalEngine, query: &str, top_k: usize, out: &mut dyn Write) -> Result<()> {
    let results = engine.retrieve(query, top_k);
    writeln!(out, "Mode: {} | query: '{}' | {} result(s)", engine.mode(), query, results.len())?;
    for (i, r) in results.iter().enumerate() {
        writeln!(out, "{}. {} (distance {:.4})", i + 1, r.source_document_id, r.distance)?;
        writeln!(out, "   {}", r.snippet)?;
    }
    Ok(())
}

pub fn cite(engine: &RetrievalEngine, query: &str, out: &mut dyn Write) -> Result<()> {
    let citation = engine.get_citation(query);
    writeln!(out, "{}", serde_json::to_string_pretty(&citation)?)?;
    Ok(())
}

pub fn chunks(file: &Path, chunk_size: usize, overlap: usize, out: &mut dyn Write) -> Result<()> {
    let config = ChunkingConfig::new(chunk_size, overlap)?;
    let text = read_text_lossy(file).with_context(|| format!("failed to read {}", file.display()))?;
    let words = text.split_whitespace().count();
    let chunks = Chunker::new(config).chunk_text(&text);
    writeln!(out, "File: {}", file.display())?;
    writeln!(out, "Words: {} | chunk_size: {} | overlap: {}", words, chunk_size, overlap)?;
    writeln!(out, "Chunks: {}", chunks.len())?;
    if let Some(last) = chunks.last() {
        writeln!(out, "Last chunk words: {}", last.split_whitespace().count())?;
    }
    Ok(())
}

pub fn rules(registry: &RuleRegistry, out: &mut dyn Write) -> Result<()> {
    for rule in registry.rules() {
        writeln!(out, "{:<32} {:<8} {:<36} {}", rule.rule_id, rule.severity.to_string(), rule.doc_type, rule.query_template)?;
    }
    for process in registry.processes() {
        writeln!(out, "\n{} requires:", process.name)?;
        for doc in &process.required {
            writeln!(out, "  - {}", doc)?;
        }
    }
    Ok(())
}
