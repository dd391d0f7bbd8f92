//! Per-client record of raw request and response bodies

use std::fmt;
use std::io::{self, Write};

/// A single recorded body
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DebugEntry {
    /// Body sent to the service
    Request(String),
    /// Body received from the service
    Response(String),
    /// The exchange did not complete; holds the failure text
    Failure(String),
}

impl DebugEntry {
    /// The recorded text, whatever its kind
    pub fn body(&self) -> &str {
        match self {
            DebugEntry::Request(body) | DebugEntry::Response(body) | DebugEntry::Failure(body) => {
                body
            }
        }
    }
}

impl fmt::Display for DebugEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebugEntry::Request(body) => write!(f, "request: {}", body),
            DebugEntry::Response(body) => write!(f, "response: {}", body),
            DebugEntry::Failure(reason) => write!(f, "failure: {}", reason),
        }
    }
}

/// Append-only, insertion-ordered log of [`DebugEntry`] values
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DebugLog {
    entries: Vec<DebugEntry>,
}

impl DebugLog {
    /// An empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: DebugEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first
    pub fn entries(&self) -> &[DebugEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Move every entry out, leaving the log empty
    pub fn take(&mut self) -> Vec<DebugEntry> {
        std::mem::take(&mut self.entries)
    }

    /// Write one numbered line per entry, in insertion order
    pub fn emit<W: Write>(&self, out: &mut W) -> io::Result<()> {
        for (i, entry) in self.entries.iter().enumerate() {
            writeln!(out, "[{}] {}", i, entry)?;
        }
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_keeps_insertion_order() {
        let mut log = DebugLog::new();
        log.push(DebugEntry::Request("{\"id\":1}".to_string()));
        log.push(DebugEntry::Response("{\"success\":true}".to_string()));

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0], DebugEntry::Request("{\"id\":1}".to_string()));
        assert_eq!(log.entries()[1].body(), "{\"success\":true}");
    }

    #[test]
    fn test_emit_format() {
        let mut log = DebugLog::new();
        log.push(DebugEntry::Request("[]".to_string()));
        log.push(DebugEntry::Failure("connection refused".to_string()));

        let mut out = Vec::new();
        log.emit(&mut out).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "[0] request: []\n[1] failure: connection refused\n"
        );
    }

    #[test]
    fn test_emit_empty_writes_nothing() {
        let mut out = Vec::new();
        DebugLog::new().emit(&mut out).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_take_empties_log() {
        let mut log = DebugLog::new();
        log.push(DebugEntry::Response("{}".to_string()));
        let taken = log.take();
        assert_eq!(taken.len(), 1);
        assert!(log.is_empty());
    }
}
