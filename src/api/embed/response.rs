// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedResponse type for the POST /embed endpoint.

use serde::{Deserialize, Serialize};

/// Response body for POST /embed
///
/// Invariants: one vector per input string, in input order; all vectors share
/// the model-determined dimensionality.
///
/// # Example
/// ```json
/// {
///   "embeddings": [[0.1, 0.2], [0.3, 0.4]]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embeddings: Vec<Vec<f64>>,
}
