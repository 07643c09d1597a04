// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use embeddings_server::{api, config::ServiceConfig, embeddings};
use std::env;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    println!("🚀 Starting Embeddings Server v{}\n", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::from_env();
    tracing::info!(
        "Configuration: model={}, port={}, cache_dir={}",
        config.model_id,
        config.api_port,
        config.cache_dir.display()
    );

    // Backend choice is made once here and fixed for the process lifetime.
    let selected = embeddings::init_backend(&config).await?;
    tracing::info!("Selected embedding backend: {}", selected.kind);

    api::start_server(&config, selected)
        .await
        .map_err(|e| anyhow::anyhow!("server error: {}", e))?;

    Ok(())
}
