// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /embed HTTP handler
//!
//! Delegates text-to-vector conversion to the backend selected at startup.
//! The whole request fails atomically if the model call fails — no retries,
//! no partial results, no per-item error isolation.

use crate::api::errors::ApiError;
use crate::api::http_server::{ApiErrorResponse, AppState};
use crate::api::{EmbedRequest, EmbedResponse};
use axum::{extract::State, Json};
use tracing::{debug, error};

/// POST /embed handler
///
/// # Request Body
/// ```json
/// {
///   "inputs": ["text1", "text2"]
/// }
/// ```
///
/// # Response Body
/// ```json
/// {
///   "embeddings": [[0.1, 0.2, ...], [0.3, 0.4, ...]]
/// }
/// ```
pub async fn embed_handler(
    State(state): State<AppState>,
    Json(request): Json<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiErrorResponse> {
    debug!(
        backend = %state.backend.kind(),
        count = request.inputs.len(),
        "embedding batch"
    );

    let embeddings = state
        .backend
        .embed_batch(&request.inputs)
        .await
        .map_err(|e| {
            error!("embedding batch failed: {:#}", e);
            ApiErrorResponse(ApiError::InternalError(e.to_string()))
        })?;

    Ok(Json(EmbedResponse { embeddings }))
}
