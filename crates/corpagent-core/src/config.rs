//! Lightweight configuration loader and path helpers.
//!
//! Uses Figment to merge `config.toml` + `config.<env>.toml` + `APP_*` env vars.
//! Nested keys in env vars are separated by `__`, e.g. `APP_RETRIEVAL__TOP_K=3`.
//! Every setting has a default, so an empty environment yields a usable
//! [`Settings`].

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};

pub struct Config {
    figment: Figment,
}

impl Config {
    /// Merges `config.toml`, `config.<env>.toml`, then `extra` (the
    /// `--config <file>`), then `APP_*` variables.
    pub fn load_with(extra: Option<&Path>) -> anyhow::Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::new().merge(Toml::file("config.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("config.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("config.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("config.test.toml")),
            _ => {}
        }
        if let Some(path) = extra {
            if !path.exists() {
                anyhow::bail!("config file {} does not exist", path.display());
            }
            figment = figment.merge(Toml::file(path));
        }
        figment = figment.merge(Env::prefixed("APP_").split("__"));

        let config = Self { figment };
        config.settings()?.validate()?;
        Ok(config)
    }

    /// Only the given TOML file, no environment overlay.
    pub fn from_file(path: &Path) -> Self {
        Self { figment: Figment::new().merge(Toml::file(path)) }
    }

    pub fn get<T>(&self, key: &str) -> anyhow::Result<T>
    where
        T: serde::de::DeserializeOwned,
    {
        self.figment
            .extract_inner(key)
            .map_err(|e| anyhow::anyhow!("Failed to get '{}': {}", key, e))
    }

    pub fn settings(&self) -> anyhow::Result<Settings> {
        self.figment
            .extract::<Settings>()
            .map_err(|e| anyhow::anyhow!("Failed to read settings: {}", e))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub retrieval: RetrievalSettings,
    pub embedding: EmbeddingSettings,
    pub review: ReviewSettings,
}

impl Settings {
    pub fn validate(&self) -> crate::error::Result<()> {
        crate::chunker::ChunkingConfig::new(self.retrieval.chunk_size, self.retrieval.overlap).map(|_| ())
    }

    /// Rewrites relative corpus, model, output and rules paths so they are
    /// relative to `base` (the directory of an explicit config file).
    pub fn resolve_paths(&mut self, base: &Path) {
        let rebase = |p: &str| resolve_with_base(base, p).to_string_lossy().to_string();
        self.retrieval.corpus_dir = rebase(&self.retrieval.corpus_dir);
        self.embedding.model_dir = rebase(&self.embedding.model_dir);
        self.review.output_dir = rebase(&self.review.output_dir);
        self.review.rules_file = self.review.rules_file.as_deref().map(rebase);
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalSettings {
    pub corpus_dir: String,
    pub chunk_size: usize,
    pub overlap: usize,
    pub top_k: usize,
    pub extensions: Vec<String>,
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            corpus_dir: "legal_refs".to_string(),
            chunk_size: 400,
            overlap: 50,
            top_k: 2,
            extensions: vec!["txt".to_string(), "md".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingSettings {
    pub model_dir: String,
    pub max_len: usize,
    pub batch_size: usize,
    pub use_hash_embedder: bool,
    pub hash_dim: usize,
    pub show_progress: bool,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            model_dir: "models/all-MiniLM-L6-v2".to_string(),
            max_len: 256,
            batch_size: 32,
            use_hash_embedder: false,
            hash_dim: 384,
            show_progress: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewSettings {
    pub output_dir: String,
    pub rules_file: Option<String>,
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self { output_dir: "reviewed".to_string(), rules_file: None }
    }
}

/// Expand a user-provided path string:
/// - Expands leading '~' to the user's home directory
/// - Expands ${VAR} and $VAR environment variables
/// - Returns a PathBuf without attempting to canonicalize
pub fn expand_path<S: AsRef<str>>(input: S) -> PathBuf {
    let s = input.as_ref();
    let expanded_env = shellexpand::env(s).unwrap_or(std::borrow::Cow::Borrowed(s));
    let expanded = shellexpand::tilde(&expanded_env);
    PathBuf::from(expanded.as_ref())
}

/// Resolve a possibly relative path against a given base directory after expansion.
/// If `p` is absolute, it's returned as-is; otherwise `base.join(p)` is returned.
pub fn resolve_with_base<S: AsRef<str>>(base: &Path, p: S) -> PathBuf {
    let p = expand_path(p);
    if p.is_absolute() { p } else { base.join(p) }
}
