// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! EmbedRequest type for the POST /embed endpoint.

use serde::{Deserialize, Serialize};

/// Request body for POST /embed
///
/// # Fields
/// - `inputs`: Ordered text strings to embed. May be empty; each element may
///   be arbitrarily long (truncation, if any, is the embedding library's
///   concern).
///
/// Type and shape validation is owned by the JSON extractor: a body without
/// an `inputs` array is rejected upstream with a 422-class status. This
/// component performs no further validation.
///
/// # Example
/// ```json
/// {
///   "inputs": ["Hello world", "Another text"]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbedRequest {
    /// Text strings to embed, in order
    pub inputs: Vec<String>,
}
