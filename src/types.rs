//! Data types for the TinCan storage client

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// An endpoint suffix appended to the base URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Store a record
    Insert,
    /// Query records
    Find,
    /// Reserved by the service, no client operation uses it
    Update,
    /// Delete records
    Remove,
    /// Probe whether the credentials are accepted
    Authorized,
}

impl Action {
    /// Every action the service understands
    pub const ALL: [Action; 5] = [
        Action::Insert,
        Action::Find,
        Action::Update,
        Action::Remove,
        Action::Authorized,
    ];

    /// The path segment for this action
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Insert => "insert",
            Action::Find => "find",
            Action::Update => "update",
            Action::Remove => "remove",
            Action::Authorized => "authorized",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .iter()
            .copied()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| Error::InvalidRequestType(s.to_string()))
    }
}

/// The caller-facing operation an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `insert`
    Insertion,
    /// `select` / `select_all`
    Selection,
    /// `remove`
    Deletion,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Operation::Insertion => "insertion",
            Operation::Selection => "selection",
            Operation::Deletion => "deletion",
        })
    }
}

/// The `{success, data, error}` wrapper every response is decoded into
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the server accepted the request
    #[serde(default)]
    pub success: bool,
    /// Query results, only meaningful for `find`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Server supplied failure text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Envelope {
    /// Decode a raw response body.
    ///
    /// Returns `None` unless the body is a JSON object. `success` is read
    /// loosely (see [`is_truthy`]); a `null` field is treated as absent.
    pub fn decode(body: &str) -> Option<Self> {
        let Value::Object(mut fields) = serde_json::from_str::<Value>(body).ok()? else {
            return None;
        };

        let success = fields.get("success").is_some_and(is_truthy);
        let data = fields.remove("data").filter(|v| !v.is_null());
        let error = match fields.remove("error") {
            None | Some(Value::Null) => None,
            Some(Value::String(message)) => Some(message),
            Some(other) => Some(other.to_string()),
        };

        Some(Envelope {
            success,
            data,
            error,
        })
    }

    /// A successful envelope with no data.
    ///
    /// This and the other constructors build the replies a service (or a
    /// test double standing in for one) sends back.
    pub fn ok() -> Self {
        Envelope {
            success: true,
            ..Default::default()
        }
    }

    /// A successful envelope carrying query results
    pub fn with_data(data: Value) -> Self {
        Envelope {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// A failed envelope with an error message
    pub fn failure(message: impl Into<String>) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Whether a `success` value counts as set.
///
/// Servers are not consistent about the type: besides `true`, any nonzero
/// number, a string other than `""` and `"0"`, and a non-empty array or
/// object are accepted.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
