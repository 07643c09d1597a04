// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Backend selection tests.
//!
//! Tests that need real model downloads are `#[ignore]`d; run them with
//! `cargo test -- --ignored` on a machine with network access.

use embeddings_server::config::ServiceConfig;
use embeddings_server::embeddings::{
    init_backend, BackendInitError, BackendKind, EmbeddingBackend, FastEmbedBackend,
    OnnxSentenceBackend,
};

/// A model id outside the fastembed list is rejected before any download.
#[test]
fn test_unknown_model_fails_primary_without_download() {
    let dir = tempfile::tempdir().unwrap();
    let result = FastEmbedBackend::new("no-such/model", dir.path());

    assert!(result.is_err());
    assert!(format!("{:#}", result.err().unwrap()).contains("no-such/model"));
}

/// When both backends fail, the selection error names both causes.
#[tokio::test]
async fn test_both_backends_failing_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        model_id: "no-such/model".to_string(),
        api_port: 0,
        cache_dir: dir.path().to_path_buf(),
    };

    let err = init_backend(&config).await.err().expect("should not select");
    let BackendInitError::AllBackendsFailed {
        model,
        primary,
        fallback,
    } = err;

    assert_eq!(model, "no-such/model");
    assert!(primary.to_string().contains("fastembed model list"));
    // The fallback cause depends on the environment (404 vs no network), it
    // just has to be present.
    assert!(!fallback.to_string().is_empty());
}

/// The default model resolves to the primary backend.
#[tokio::test]
#[ignore] // Downloads model artifacts
async fn test_default_model_selects_fastembed() {
    let dir = tempfile::tempdir().unwrap();
    let config = ServiceConfig {
        model_id: "BAAI/bge-small-en-v1.5".to_string(),
        api_port: 0,
        cache_dir: dir.path().to_path_buf(),
    };

    let selected = init_backend(&config).await.expect("selection failed");
    assert_eq!(selected.kind, BackendKind::FastEmbed);

    let texts = vec!["hello world".to_string(), "second".to_string()];
    let embeddings = selected.backend.embed_batch(&texts).await.unwrap();
    assert_eq!(embeddings.len(), 2);
    assert_eq!(embeddings[0].len(), 384);
    assert!(embeddings
        .iter()
        .all(|v| v.iter().all(|x| x.is_finite())));
}

/// The fallback path produces unit-length vectors.
#[tokio::test]
#[ignore] // Downloads model artifacts
async fn test_onnx_backend_normalizes_to_unit_length() {
    let dir = tempfile::tempdir().unwrap();
    let backend = OnnxSentenceBackend::new("sentence-transformers/all-MiniLM-L6-v2", dir.path())
        .await
        .expect("failed to load fallback backend");

    assert_eq!(backend.dimension(), 384);
    assert_eq!(backend.kind(), BackendKind::SentenceTransformers);

    let texts = vec!["hello world".to_string(), "a different sentence".to_string()];
    let embeddings = backend.embed_batch(&texts).await.unwrap();
    assert_eq!(embeddings.len(), 2);

    for vector in &embeddings {
        assert_eq!(vector.len(), 384);
        let magnitude = vector.iter().map(|x| x * x).sum::<f64>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.01, "magnitude {}", magnitude);
    }
}

/// Empty batches never touch the model.
#[tokio::test]
#[ignore] // Downloads model artifacts
async fn test_empty_batch_returns_empty() {
    let dir = tempfile::tempdir().unwrap();
    let backend = FastEmbedBackend::new("BAAI/bge-small-en-v1.5", dir.path()).unwrap();

    let embeddings = backend.embed_batch(&[]).await.unwrap();
    assert!(embeddings.is_empty());
}
