// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Deterministic stub backends for driving the HTTP surface without model
//! downloads.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use embeddings_server::api::AppState;
use embeddings_server::embeddings::{BackendKind, EmbeddingBackend};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Hash-seeded pseudo-random embeddings: deterministic per input text, so
/// tests can assert order preservation without a real model.
pub struct HashBackend {
    pub dimension: usize,
    pub kind: BackendKind,
}

impl HashBackend {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            kind: BackendKind::FastEmbed,
        }
    }

    pub fn with_kind(dimension: usize, kind: BackendKind) -> Self {
        Self { dimension, kind }
    }

    /// Expected vector for `text`, usable as a test oracle.
    pub fn vector_for(&self, text: &str) -> Vec<f64> {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        let mut seed = hasher.finish();

        (0..self.dimension)
            .map(|i| {
                seed = seed.wrapping_mul(1664525).wrapping_add(1013904223) ^ (i as u64);
                (seed as f64 / u64::MAX as f64) * 2.0 - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl EmbeddingBackend for HashBackend {
    fn kind(&self) -> BackendKind {
        self.kind
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        Ok(texts.iter().map(|text| self.vector_for(text)).collect())
    }
}

/// Backend whose model call always fails, for exercising the 500 path.
pub struct FailingBackend;

#[async_trait]
impl EmbeddingBackend for FailingBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::FastEmbed
    }

    async fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f64>>> {
        Err(anyhow!("model call failed"))
    }
}

pub fn test_state(backend: Arc<dyn EmbeddingBackend>) -> AppState {
    AppState {
        backend,
        model_id: "test-model".to_string(),
    }
}
