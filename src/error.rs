//! Error types for the TinCan storage client

use thiserror::Error;

use crate::types::Operation;

/// Message used when the server rejects an operation without explaining why
pub const DEFAULT_FAILURE_MESSAGE: &str = "No error message provided by server";

/// Errors that can occur when interacting with TinCan storage
#[derive(Error, Debug)]
pub enum Error {
    /// The payload could not be encoded as a JSON object or array.
    /// Raised locally, no request is sent.
    #[error("Invalid payload for {0}.")]
    InvalidPayload(Operation),

    /// The action name is not one of the endpoints the service exposes.
    /// Raised locally, no request is sent.
    #[error("Invalid request type: {0}")]
    InvalidRequestType(String),

    /// The server answered but did not report success
    #[error("Data {operation} failed: {message}")]
    OperationFailed {
        /// The operation that was rejected
        operation: Operation,
        /// Error text from the server, or [`DEFAULT_FAILURE_MESSAGE`]
        message: String,
    },

    /// A selection succeeded but the envelope carried no `data` field
    #[error("Selection succeeded but no data was returned")]
    MissingData,

    /// The HTTP exchange itself could not be completed
    #[error("Communication failure: {0}")]
    Communication(String),
}

impl Error {
    /// Returns true if the error was raised before anything was sent
    pub fn is_local(&self) -> bool {
        matches!(self, Error::InvalidPayload(_) | Error::InvalidRequestType(_))
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;
