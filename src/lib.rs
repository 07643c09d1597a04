// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod config;
pub mod embeddings;

// Re-export main types
pub use api::{
    embed_handler, ApiError, EmbedRequest, EmbedResponse, ErrorResponse, HealthResponse,
};
pub use config::ServiceConfig;
pub use embeddings::{
    init_backend, BackendInitError, BackendKind, EmbeddingBackend, FastEmbedBackend,
    OnnxSentenceBackend, SelectedBackend,
};
