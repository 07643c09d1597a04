// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! HTTP surface: router construction and server startup.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, sync::Arc};
use tower_http::cors::{Any, CorsLayer};

use crate::api::embed::embed_handler;
use crate::api::errors::ApiError;
use crate::config::ServiceConfig;
use crate::embeddings::{EmbeddingBackend, SelectedBackend};

/// Shared read-only request state
///
/// Constructed once at bootstrap and cloned into every handler. The backend
/// is never mutated after startup, so concurrent requests share it freely.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn EmbeddingBackend>,
    pub model_id: String,
}

/// Response body for GET /health
///
/// Reports the configured model id, not the resolved backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
}

/// Builds the application router. Split out of [`start_server`] so tests can
/// drive the app without binding a socket.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/embed", post(embed_handler))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

pub async fn start_server(
    config: &ServiceConfig,
    selected: SelectedBackend,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = AppState {
        backend: selected.backend,
        model_id: config.model_id.clone(),
    };

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.api_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_handler(State(state): State<AppState>) -> axum::response::Json<HealthResponse> {
    axum::response::Json(HealthResponse {
        status: "ok".to_string(),
        model: state.model_id,
    })
}

// Error response wrapper
pub struct ApiErrorResponse(pub ApiError);

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        (status, axum::response::Json(self.0.to_response())).into_response()
    }
}
