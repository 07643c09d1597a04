// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for GET /health.

use super::support::HashBackend;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use embeddings_server::api::{router, AppState};
use embeddings_server::embeddings::BackendKind;
use std::sync::Arc;
use tower::ServiceExt;

async fn health_json(state: AppState) -> serde_json::Value {
    let app = router(state);
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Health reports the configured model id and a fixed status token.
#[tokio::test]
async fn test_health_reports_configured_model() {
    let state = AppState {
        backend: Arc::new(HashBackend::new(8)),
        model_id: "BAAI/bge-small-en-v1.5".to_string(),
    };

    let json = health_json(state).await;
    assert_eq!(
        json,
        serde_json::json!({"status": "ok", "model": "BAAI/bge-small-en-v1.5"})
    );
}

/// The payload is identical regardless of which backend was selected.
#[tokio::test]
async fn test_health_is_backend_independent() {
    let primary = AppState {
        backend: Arc::new(HashBackend::with_kind(8, BackendKind::FastEmbed)),
        model_id: "some/model".to_string(),
    };
    let fallback = AppState {
        backend: Arc::new(HashBackend::with_kind(8, BackendKind::SentenceTransformers)),
        model_id: "some/model".to_string(),
    };

    assert_eq!(health_json(primary).await, health_json(fallback).await);
}
