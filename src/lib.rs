//! A client for the TinCan key-value document storage service
//!
//! Every operation POSTs a JSON body to `{scheme}://{id}:{key}@apps.tincan.me/{app}/{action}`
//! and decodes the `{success, data, error}` envelope the service replies with.
//!
//! # Features
//! - Insert, select and remove JSON documents
//! - Soft-fail authorization probe and `connect` factory
//! - Optional per-client debug log of raw request/response bodies
//! - Pluggable [`Transport`] for testing
//! - Configurable request timeout
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use serde_json::json;
//! use tincan_storage::{ClientConfig, StorageClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), tincan_storage::Error> {
//!     let config = ClientConfig::new("my-app", "my-id", "my-key");
//!     let Some(client) = StorageClient::connect(config).await else {
//!         return Ok(());
//!     };
//!
//!     client.insert(&json!({"table": "testTable", "id": 1})).await?;
//!     let rows = client.select(&json!({"table": "testTable"})).await?;
//!     println!("Found: {}", rows);
//!     client.remove(&json!({"table": "testTable"})).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs, rust_2018_idioms)]

pub mod client;
pub mod config;
pub mod debug;
pub mod error;
pub mod transport;
pub mod types;

pub use client::StorageClient;
pub use config::{ClientConfig, Credentials, DebugConfig};
pub use debug::{DebugEntry, DebugLog};
pub use error::{Error, Result};
pub use transport::{HyperTransport, Transport};
pub use types::{Action, Envelope, Operation};
