// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Fallback embedding backend: ONNX Runtime over HuggingFace Hub artifacts.
//!
//! This is the sentence-transformers equivalent path. Given a model id it
//! downloads `tokenizer.json` and the ONNX export from the Hub, runs batch
//! inference through ort, mean-pools the token embeddings weighted by the
//! attention mask, and L2-normalizes each vector to unit length.
//!
//! Output dimensionality is discovered with a probe inference at load time
//! rather than hardcoded, so any sentence-transformer-style export works.

use crate::embeddings::{BackendKind, EmbeddingBackend};
use anyhow::{Context, Result};
use async_trait::async_trait;
use hf_hub::api::sync::ApiBuilder;
use ndarray::{Array2, Axis};
use ort::ep::CPU as CPUExecutionProvider;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tokenizers::Tokenizer;
use tracing::info;

/// Padded batch encodings ready for ort
struct EncodedBatch {
    input_ids: Array2<i64>,
    attention_mask: Array2<i64>,
    token_type_ids: Array2<i64>,
    /// Row-major copy of the attention mask, kept for mean pooling
    mask_rows: Vec<Vec<i64>>,
}

pub struct OnnxSentenceBackend {
    /// ort requires exclusive access to run inference
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    model_id: String,
    dimension: usize,
}

impl std::fmt::Debug for OnnxSentenceBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxSentenceBackend")
            .field("model_id", &self.model_id)
            .field("dimension", &self.dimension)
            .finish_non_exhaustive()
    }
}

impl OnnxSentenceBackend {
    /// Downloads model artifacts for `model_id` from the HuggingFace Hub and
    /// initializes an ort session.
    ///
    /// # Errors
    /// Returns error if:
    /// - The Hub repo has no `tokenizer.json` or ONNX export
    /// - ONNX Runtime initialization fails
    /// - The model does not output token-level embeddings
    pub async fn new(model_id: &str, cache_dir: &Path) -> Result<Self> {
        let api = ApiBuilder::new()
            .with_cache_dir(cache_dir.join("hf-hub"))
            .with_progress(false)
            .build()
            .context("failed to build HuggingFace Hub client")?;
        let repo = api.model(model_id.to_string());

        let tokenizer_path = repo
            .get("tokenizer.json")
            .with_context(|| format!("no tokenizer.json in Hub repo '{}'", model_id))?;

        // Sentence-transformer repos put the export either at the root or
        // under onnx/.
        let model_path = repo.get("onnx/model.onnx").or_else(|_| repo.get("model.onnx"))
            .with_context(|| format!("no ONNX export in Hub repo '{}'", model_id))?;

        let tokenizer = Tokenizer::from_file(&tokenizer_path)
            .map_err(|e| anyhow::anyhow!("failed to load tokenizer: {}", e))?;

        info!("Loading ONNX session for {}", model_id);
        let mut session = Session::builder()
            .context("failed to create session builder")?
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("failed to set CPU execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("failed to set optimization level")?
            .with_intra_threads(4)
            .map_err(|e| anyhow::anyhow!("{e}"))
            .context("failed to set intra threads")?
            .commit_from_file(&model_path)
            .with_context(|| format!("failed to load ONNX model from {}", model_path.display()))?;

        // Probe inference to discover output dimensionality and verify the
        // model yields token-level embeddings ([batch, seq_len, hidden_dim]).
        let dimension = {
            let probe = encode_batch(&tokenizer, &["dimension probe".to_string()])?;
            let outputs = session.run(ort::inputs![
                "input_ids" => Value::from_array(probe.input_ids)?,
                "attention_mask" => Value::from_array(probe.attention_mask)?,
                "token_type_ids" => Value::from_array(probe.token_type_ids)?
            ])?;

            let output = outputs[0]
                .try_extract_array::<f32>()
                .context("failed to extract probe output tensor")?;
            let shape = output.shape();
            if shape.len() != 3 {
                anyhow::bail!(
                    "model outputs unexpected shape {:?} (expected [batch, seq_len, hidden_dim])",
                    shape
                );
            }
            shape[2]
        };

        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            model_id: model_id.to_string(),
            dimension,
        })
    }

    /// Output vector dimensionality, discovered at load time
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_id(&self) -> &str {
        &self.model_id
    }
}

#[async_trait]
impl EmbeddingBackend for OnnxSentenceBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::SentenceTransformers
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f64>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let encoded = encode_batch(&self.tokenizer, texts)?;
        let mask_rows = encoded.mask_rows;

        let mut session = self.session.lock().unwrap();
        let outputs = session.run(ort::inputs![
            "input_ids" => Value::from_array(encoded.input_ids)?,
            "attention_mask" => Value::from_array(encoded.attention_mask)?,
            "token_type_ids" => Value::from_array(encoded.token_type_ids)?
        ])?;

        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("failed to extract output tensor")?;

        let mut embeddings = Vec::with_capacity(texts.len());
        for (batch_idx, mask) in mask_rows.iter().enumerate() {
            // [seq_len, hidden_dim] token embeddings for this input
            let tokens = output.index_axis(Axis(0), batch_idx);
            let mut pooled = mean_pool(&tokens, mask);

            if pooled.len() != self.dimension {
                anyhow::bail!(
                    "unexpected embedding dimension at index {}: {} (expected {})",
                    batch_idx,
                    pooled.len(),
                    self.dimension
                );
            }

            l2_normalize(&mut pooled);
            embeddings.push(pooled.into_iter().map(f64::from).collect());
        }

        Ok(embeddings)
    }
}

/// Tokenizes a batch and pads every sequence to the batch max length.
fn encode_batch(tokenizer: &Tokenizer, texts: &[String]) -> Result<EncodedBatch> {
    let encodings = texts
        .iter()
        .map(|text| {
            tokenizer
                .encode(text.as_str(), true)
                .map_err(|e| anyhow::anyhow!("tokenization failed: {}", e))
        })
        .collect::<Result<Vec<_>>>()?;

    let max_len = encodings
        .iter()
        .map(|enc| enc.get_ids().len())
        .max()
        .unwrap_or(0);

    let mut input_ids = Vec::with_capacity(texts.len() * max_len);
    let mut attention_mask = Vec::with_capacity(texts.len() * max_len);
    let mut mask_rows = Vec::with_capacity(texts.len());

    for encoding in &encodings {
        let ids = encoding.get_ids();
        let mask = encoding.get_attention_mask();
        let padding = max_len - ids.len();

        input_ids.extend(ids.iter().map(|&id| id as i64));
        input_ids.extend(std::iter::repeat(0i64).take(padding));

        let mut row: Vec<i64> = mask.iter().map(|&m| m as i64).collect();
        row.extend(std::iter::repeat(0i64).take(padding));
        attention_mask.extend_from_slice(&row);
        mask_rows.push(row);
    }

    // token_type_ids are all zeros for single-sentence embedding
    let token_type_ids = vec![0i64; texts.len() * max_len];

    Ok(EncodedBatch {
        input_ids: Array2::from_shape_vec((texts.len(), max_len), input_ids)
            .context("failed to create input_ids array")?,
        attention_mask: Array2::from_shape_vec((texts.len(), max_len), attention_mask)
            .context("failed to create attention_mask array")?,
        token_type_ids: Array2::from_shape_vec((texts.len(), max_len), token_type_ids)
            .context("failed to create token_type_ids array")?,
        mask_rows,
    })
}

/// Averages token embeddings over the sequence dimension, weighted by the
/// attention mask so padding tokens do not contribute.
fn mean_pool(tokens: &ndarray::ArrayViewD<'_, f32>, mask: &[i64]) -> Vec<f32> {
    let seq_len = tokens.shape()[0];
    let hidden_dim = tokens.shape()[1];

    let mut pooled = vec![0.0f32; hidden_dim];
    let mut mask_sum = 0.0f32;

    for i in 0..seq_len {
        let weight = mask[i] as f32;
        mask_sum += weight;
        for j in 0..hidden_dim {
            pooled[j] += tokens[[i, j]] * weight;
        }
    }

    for value in &mut pooled {
        *value /= mask_sum.max(1e-9);
    }

    pooled
}

/// Scales a vector to unit length, matching sentence-transformers'
/// `normalize_embeddings=True`.
fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for value in vector.iter_mut() {
            *value /= norm;
        }
    }
}
