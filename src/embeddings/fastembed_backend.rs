// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Primary embedding backend over the fastembed crate.
//!
//! fastembed bundles tokenization and ONNX inference for a curated list of
//! models. The configured model id must match one of the supported model
//! codes; anything else is an initialization error, which triggers the
//! sentence-transformers fallback at startup.

use crate::embeddings::{BackendKind, EmbeddingBackend};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use fastembed::{InitOptions, TextEmbedding};
use std::path::Path;
use std::sync::Mutex;

pub struct FastEmbedBackend {
    /// fastembed requires exclusive access to run inference
    model: Mutex<TextEmbedding>,
    model_id: String,
}

impl FastEmbedBackend {
    /// Resolves `model_id` against the fastembed supported-model list and
    /// initializes the model, downloading artifacts into `cache_dir` on
    /// first use.
    pub fn new(model_id: &str, cache_dir: &Path) -> Result<Self> {
        let supported = TextEmbedding::list_supported_models();
        let info = supported
            .iter()
            .find(|m| m.model_code == model_id)
            .ok_or_else(|| anyhow!("model '{}' is not in the fastembed model list", model_id))?;

        let options = InitOptions::new(info.model.clone())
            .with_cache_dir(cache_dir.to_path_buf())
            .with_show_download_progress(false);

        let model = TextEmbedding::try_new(options)
            .with_context(|| format!("failed to initialize fastembed model '{}'", model_id))?;

        Ok(Self {
            model: Mutex::new(model),
            model_id: model_id.to_string(),
        })
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

impl std::fmt::Debug for FastEmbedBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedBackend")
            .field("model_id", &self.model_id)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl EmbeddingBackend for FastEmbedBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::FastEmbed
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let raw = self
            .model
            .lock()
            .unwrap()
            .embed(texts.to_vec(), None)
            .context("fastembed batch embedding failed")?;

        // fastembed yields f32 vectors; widen to f64 for the wire contract.
        Ok(raw
            .into_iter()
            .map(|vector| vector.into_iter().map(f64::from).collect())
            .collect())
    }
}
