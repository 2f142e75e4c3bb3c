use corpagent_core::config::EmbeddingSettings;
use corpagent_core::traits::Embedder;
use corpagent_embed::{probe_embedder, HashEmbedder};

#[test]
fn hash_embedder_shapes_and_determinism() {
    let embedder = HashEmbedder::new(384);
    let texts = vec!["ADGM Courts jurisdiction".to_string(), "adgm courts JURISDICTION".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let (v1, v2) = (&embs[0], &embs[1]);

    assert_eq!(v1.len(), 384);
    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    // Case-insensitive and deterministic
    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn hash_embedder_handles_empty_text() {
    let v = HashEmbedder::new(16).embed_text("   ");
    assert_eq!(v.len(), 16);
    assert!(v.iter().all(|x| *x == 0.0));
}

#[test]
fn probe_selects_hash_embedder_when_configured() {
    let settings = EmbeddingSettings { use_hash_embedder: true, hash_dim: 64, ..EmbeddingSettings::default() };
    let embedder = probe_embedder(&settings).expect("hash embedder is always available");
    assert_eq!(embedder.dim(), 64);
}

#[test]
fn probe_reports_unavailable_without_model_files() {
    let tmp = tempfile::TempDir::new().unwrap();
    let settings = EmbeddingSettings {
        model_dir: tmp.path().join("missing-model").to_string_lossy().to_string(),
        ..EmbeddingSettings::default()
    };
    if std::env::var("APP_MODEL_DIR").is_err() && std::env::var("MODEL_DIR").is_err() && std::env::var("APP_USE_FAKE_EMBEDDINGS").is_err() {
        assert!(probe_embedder(&settings).is_none());
    }
}

#[test]
fn probe_reports_unavailable_for_incomplete_model_dir() {
    let tmp = tempfile::TempDir::new().unwrap();
    std::fs::write(tmp.path().join("config.json"), "{}").unwrap();
    let settings = EmbeddingSettings { model_dir: tmp.path().to_string_lossy().to_string(), ..EmbeddingSettings::default() };
    if std::env::var("APP_MODEL_DIR").is_err() && std::env::var("MODEL_DIR").is_err() && std::env::var("APP_USE_FAKE_EMBEDDINGS").is_err() {
        assert!(probe_embedder(&settings).is_none(), "no tokenizer or weights");
    }
}
