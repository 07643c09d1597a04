// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Embedding backends and startup backend selection.
//!
//! Two backends produce text embeddings behind one trait:
//! - [`FastEmbedBackend`]: curated fastembed model list (primary)
//! - [`OnnxSentenceBackend`]: ort session over Hub artifacts, the
//!   sentence-transformers equivalent (fallback)
//!
//! [`init_backend`] picks one at process startup. The choice is fixed for the
//! process lifetime; there is no request-time re-selection.

use crate::config::ServiceConfig;
use anyhow::Result;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

pub mod fastembed_backend;
pub mod onnx_backend;

pub use fastembed_backend::FastEmbedBackend;
pub use onnx_backend::OnnxSentenceBackend;

/// Which backend was selected at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    FastEmbed,
    SentenceTransformers,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::FastEmbed => "fastembed",
            BackendKind::SentenceTransformers => "sentence-transformers",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Batch text-to-vector conversion
///
/// Implementations own their shape coercion: whatever the underlying library
/// yields, `embed_batch` returns one `Vec<f64>` per input, in input order.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    fn kind(&self) -> BackendKind;

    /// Embeds a batch of texts. An empty batch returns `Ok(vec![])` without
    /// touching the model.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>>;
}

/// Backend resolved at startup, shared read-only with every request handler
#[derive(Clone)]
pub struct SelectedBackend {
    pub kind: BackendKind,
    pub backend: Arc<dyn EmbeddingBackend>,
}

/// Startup backend-initialization failure
///
/// Carries both failure causes so the fatal log names what broke on each
/// path instead of swallowing the primary error.
#[derive(Debug, Error)]
pub enum BackendInitError {
    #[error(
        "no embedding backend available for model '{model}': \
         fastembed: {primary}; sentence-transformers: {fallback}"
    )]
    AllBackendsFailed {
        model: String,
        primary: anyhow::Error,
        fallback: anyhow::Error,
    },
}

/// Selects and initializes an embedding backend for the configured model.
///
/// Tries fastembed first; on any failure, falls back to the ort-based
/// sentence-transformers path. If both fail the error is fatal — there is no
/// third backend and no retry.
pub async fn init_backend(config: &ServiceConfig) -> Result<SelectedBackend, BackendInitError> {
    info!("Initializing fastembed backend for model {}", config.model_id);

    let primary_err = match FastEmbedBackend::new(&config.model_id, &config.cache_dir) {
        Ok(backend) => {
            info!("✅ fastembed backend ready ({})", config.model_id);
            return Ok(SelectedBackend {
                kind: BackendKind::FastEmbed,
                backend: Arc::new(backend),
            });
        }
        Err(e) => {
            warn!("fastembed backend unavailable: {:#}", e);
            e
        }
    };

    info!(
        "Falling back to sentence-transformers backend for model {}",
        config.model_id
    );

    match OnnxSentenceBackend::new(&config.model_id, &config.cache_dir).await {
        Ok(backend) => {
            info!(
                "✅ sentence-transformers backend ready ({}, {} dimensions)",
                config.model_id,
                backend.dimension()
            );
            Ok(SelectedBackend {
                kind: BackendKind::SentenceTransformers,
                backend: Arc::new(backend),
            })
        }
        Err(fallback_err) => Err(BackendInitError::AllBackendsFailed {
            model: config.model_id.clone(),
            primary: primary_err,
            fallback: fallback_err,
        }),
    }
}
