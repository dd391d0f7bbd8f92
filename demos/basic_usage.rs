//! Basic usage example for the TinCan storage client
//!
//! Reads credentials from TINCAN_APP_NAME, TINCAN_APP_ID and TINCAN_APP_KEY.
//!
//! Run with: cargo run --example basic_usage

use serde_json::json;
use tincan_storage::{ClientConfig, StorageClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut config = ClientConfig::from_env().map_err(|e| format!("Configuration error: {}", e))?;
    config.debug.request = true;
    config.debug.response = true;

    info!("Connecting to application '{}'...", config.name);
    let Some(client) = StorageClient::connect(config).await else {
        info!("Credentials were not accepted");
        return Ok(());
    };

    info!("Inserting a record...");
    client
        .insert(&json!({"table": "testTable", "id": 1, "name": "TinCan"}))
        .await?;

    info!("Selecting it back...");
    let rows = client.select(&json!({"table": "testTable"})).await?;
    info!("Found: {}", rows);

    info!("Removing it...");
    client.remove(&json!({"table": "testTable"})).await?;

    for entry in client.take_debug_log() {
        info!("{}", entry);
    }

    info!("Example completed successfully!");
    Ok(())
}
