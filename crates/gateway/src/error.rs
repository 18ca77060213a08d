//! Error types for the gateway crate

use thiserror::Error;

/// Transport-level errors
///
/// Every variant is recoverable from the caller's point of view: agents log
/// it and move on to their next cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Receive failed: {0}")]
    Receive(String),

    #[error("Timeout waiting for response")]
    Timeout,

    #[error("Empty response")]
    EmptyResponse,

    #[error("Response exceeded {0} bytes")]
    ResponseTooLarge(usize),

    #[error("Invalid response from server: {reason}")]
    Malformed { reason: String, raw: String },

    #[error("Serialization failed: {0}")]
    Serialization(String),
}

impl TransportError {
    /// Raw response body kept for diagnostics, if any
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            TransportError::Malformed { raw, .. } => Some(raw),
            _ => None,
        }
    }
}

/// Codec errors (structural translation only, no business validation)
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Encode failed: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Decode failed: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("Expected a JSON object, got {0}")]
    NotAnObject(String),
}

impl From<CodecError> for TransportError {
    fn from(e: CodecError) -> Self {
        match e {
            CodecError::Encode(inner) => TransportError::Serialization(inner.to_string()),
            other => TransportError::Malformed {
                reason: other.to_string(),
                raw: String::new(),
            },
        }
    }
}
