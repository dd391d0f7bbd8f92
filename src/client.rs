//! Storage client implementation for TinCan

use std::io;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::{ClientConfig, Credentials, DebugConfig};
use crate::debug::{DebugEntry, DebugLog};
use crate::error::{Error, Result, DEFAULT_FAILURE_MESSAGE};
use crate::transport::{HyperTransport, Transport};
use crate::types::{Action, Envelope, Operation};

/// Body the service reads as "every record"; also sent for an empty `select` payload.
const SELECT_ALL_BODY: &str = "[]";

/// Client for one TinCan storage application
///
/// Each operation POSTs a JSON body to `{base_url}{action}` and decodes the
/// `{success, data, error}` envelope the service answers with. A client is
/// meant to be driven by one task at a time.
///
/// # Example
/// ```rust,no_run
/// use serde_json::json;
/// use tincan_storage::{ClientConfig, StorageClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), tincan_storage::Error> {
///     let config = ClientConfig::new("notes", "my-id", "my-key");
///     let Some(client) = StorageClient::connect(config).await else {
///         eprintln!("credentials rejected");
///         return Ok(());
///     };
///
///     client.insert(&json!({"table": "notes", "id": 1})).await?;
///     let rows = client.select(&json!({"table": "notes"})).await?;
///     println!("{}", rows);
///     Ok(())
/// }
/// ```
pub struct StorageClient<T: Transport = HyperTransport> {
    credentials: Credentials,
    base_url: String,
    debug: DebugConfig,
    transport: T,
    debug_log: Mutex<DebugLog>,
}

impl StorageClient<HyperTransport> {
    /// Create a client that talks HTTP through hyper.
    ///
    /// Never fails and sends nothing; bad credentials only show up once a
    /// request is made. Prefer [`StorageClient::connect`].
    pub fn new(config: ClientConfig) -> Self {
        let transport = HyperTransport::new(config.timeout_ms);
        Self::with_transport(config, transport)
    }

    /// Create a client and keep it only if the service accepts its credentials.
    ///
    /// Returns `None` for rejected credentials, network failure or a
    /// malformed reply alike. Enable the debug log to find out which.
    pub async fn connect(config: ClientConfig) -> Option<Self> {
        Self::connect_with(Self::new(config)).await
    }
}

impl<T: Transport> StorageClient<T> {
    /// Create a client over a caller-supplied transport
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        let credentials = Credentials::from_config(&config);
        let base_url = credentials.base_url();

        Self {
            credentials,
            base_url,
            debug: config.debug,
            transport,
            debug_log: Mutex::new(DebugLog::new()),
        }
    }

    /// [`StorageClient::connect`] over a caller-supplied transport
    pub async fn connect_with_transport(config: ClientConfig, transport: T) -> Option<Self> {
        Self::connect_with(Self::with_transport(config, transport)).await
    }

    async fn connect_with(client: Self) -> Option<Self> {
        if client.is_authorized().await {
            Some(client)
        } else {
            warn!(
                "Authorization failed for application '{}'",
                client.credentials.name()
            );
            None
        }
    }

    /// Base URL every action is appended to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Credentials the base URL was derived from
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Debug log settings
    pub fn debug_config(&self) -> DebugConfig {
        self.debug
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Snapshot of the debug log
    pub fn debug_log(&self) -> Vec<DebugEntry> {
        self.log().entries().to_vec()
    }

    /// Drain the debug log
    pub fn take_debug_log(&self) -> Vec<DebugEntry> {
        self.log().take()
    }

    /// Store a record
    ///
    /// # Errors
    /// - [`Error::InvalidPayload`] if `payload` is not a JSON object or array
    /// - [`Error::OperationFailed`] if the service does not report success
    /// - [`Error::Communication`] if the request could not be completed
    ///
    /// # Example
    /// ```rust,no_run
    /// # use tincan_storage::{ClientConfig, StorageClient};
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), tincan_storage::Error> {
    /// # let client = StorageClient::new(ClientConfig::new("notes", "id", "key"));
    /// client
    ///     .insert(&serde_json::json!({"table": "testTable", "id": 1, "name": "TinCan"}))
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn insert<P: Serialize + ?Sized>(&self, payload: &P) -> Result<()> {
        let body = encode_payload(Operation::Insertion, payload)?;
        let response = self.send(Action::Insert, body).await;
        expect_success(Operation::Insertion, response)?;
        Ok(())
    }

    /// Query records matching `payload`
    ///
    /// Returns the envelope's `data` as-is. A successful reply without `data`
    /// is [`Error::MissingData`], not an empty result. An empty object or
    /// array selects every record, as [`StorageClient::select_all`] does.
    pub async fn select<P: Serialize + ?Sized>(&self, payload: &P) -> Result<Value> {
        let body = encode_payload(Operation::Selection, payload)?;
        if body == "{}" || body == SELECT_ALL_BODY {
            return self.select_all().await;
        }
        self.find(body).await
    }

    /// Query every record of the application
    pub async fn select_all(&self) -> Result<Value> {
        self.find(SELECT_ALL_BODY.to_string()).await
    }

    async fn find(&self, body: String) -> Result<Value> {
        let response = self.send(Action::Find, body).await;
        expect_success(Operation::Selection, response)?
            .data
            .ok_or(Error::MissingData)
    }

    /// Remove records matching `payload`
    ///
    /// Removing a record that does not exist is reported however the service
    /// reports it.
    pub async fn remove<P: Serialize + ?Sized>(&self, payload: &P) -> Result<()> {
        let body = encode_payload(Operation::Deletion, payload)?;
        let response = self.send(Action::Remove, body).await;
        expect_success(Operation::Deletion, response)?;
        Ok(())
    }

    /// Check whether the service accepts these credentials.
    ///
    /// Any failure, including network errors and undecodable replies,
    /// yields `false`.
    pub async fn is_authorized(&self) -> bool {
        match self.send(Action::Authorized, String::new()).await {
            Ok(body) => Envelope::decode(&body).is_some_and(|envelope| envelope.success),
            Err(e) => {
                debug!("Authorization check failed: {}", e);
                false
            }
        }
    }

    /// Send a raw, already encoded body to a named action.
    ///
    /// `action` must be one of `insert`, `find`, `update`, `remove` or
    /// `authorized`; anything else is [`Error::InvalidRequestType`] and
    /// nothing is sent. The body is not validated. Returns the raw response
    /// body, whatever it contains.
    pub async fn request(&self, action: &str, body: &str) -> Result<String> {
        let action: Action = action.parse()?;
        self.send(action, body.to_string()).await
    }

    async fn send(&self, action: Action, body: String) -> Result<String> {
        let url = format!("{}{}", self.base_url, action);

        if self.debug.request {
            self.log().push(DebugEntry::Request(body.clone()));
        }

        debug!("Sending '{}' request ({} bytes)", action, body.len());
        let result = self.transport.post(&url, body).await;

        if self.debug.response {
            let entry = match &result {
                Ok(response) => DebugEntry::Response(response.clone()),
                Err(e) => DebugEntry::Failure(e.to_string()),
            };
            self.log().push(entry);
        }

        result
    }

    fn log(&self) -> MutexGuard<'_, DebugLog> {
        self.debug_log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<T: Transport> StorageClient<T> {
    /// Write the debug log to `out` if printing is enabled and anything was recorded
    fn print_debug_log<W: io::Write>(&self, out: &mut W) -> io::Result<()> {
        if !self.debug.print {
            return Ok(());
        }
        let log = self.log();
        if log.is_empty() {
            return Ok(());
        }
        log.emit(out)
    }
}

impl<T: Transport> Drop for StorageClient<T> {
    fn drop(&mut self) {
        if let Err(e) = self.print_debug_log(&mut io::stderr().lock()) {
            warn!("Failed to print debug log: {}", e);
        }
    }
}

/// Encode a payload, accepting only JSON objects and arrays.
fn encode_payload<P: Serialize + ?Sized>(operation: Operation, payload: &P) -> Result<String> {
    match serde_json::to_value(payload) {
        Ok(Value::Object(_) | Value::Array(_)) => {
            serde_json::to_string(payload).map_err(|_| Error::InvalidPayload(operation))
        }
        _ => Err(Error::InvalidPayload(operation)),
    }
}

/// Decode a response and require `success: true`.
fn expect_success(operation: Operation, response: Result<String>) -> Result<Envelope> {
    let body = response?;
    match Envelope::decode(&body) {
        Some(envelope) if envelope.success => Ok(envelope),
        Some(envelope) => Err(Error::OperationFailed {
            operation,
            message: envelope
                .error
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string()),
        }),
        None => {
            debug!("Undecodable response to {}: {:?}", operation, body);
            Err(Error::OperationFailed {
                operation,
                message: DEFAULT_FAILURE_MESSAGE.to_string(),
            })
        }
    }
}
