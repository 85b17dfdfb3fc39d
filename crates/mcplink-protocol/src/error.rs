//! Error taxonomy for the MCP client.
//!
//! Every public operation returns [`Result`]; the variants tell the caller
//! which layer failed:
//!
//! - [`Error::Transport`]: the channel to the server broke or refused a write
//! - [`Error::Protocol`]: the server answered with a JSON-RPC error object
//! - [`Error::Timeout`]: no answer arrived within the per-call deadline
//! - [`Error::Serialization`]: a payload could not be encoded or decoded
//!
//! The remaining variants describe client lifecycle misuse or shutdown.

use serde_json::Value;
use thiserror::Error;

use crate::jsonrpc::{JsonRpcError, JsonRpcErrorCode};

/// Boxed lower-level cause carried by [`Error::Transport`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout mcplink
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the MCP client core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The transport failed (spawn, I/O, HTTP).
    #[error("Transport error: {message}")]
    Transport {
        /// Human-readable description
        message: String,
        /// Underlying cause, when one exists
        #[source]
        source: Option<BoxError>,
    },

    /// The server returned a JSON-RPC error object.
    #[error("Protocol error {code}: {message}")]
    Protocol {
        /// JSON-RPC error code
        code: i32,
        /// Error message from the server
        message: String,
        /// Optional structured data from the server
        data: Option<Value>,
    },

    /// The call did not complete before its deadline.
    #[error("Request '{method}' timed out")]
    Timeout {
        /// Method that did not complete
        method: String,
    },

    /// Malformed JSON on send or receive.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// An operation was attempted before the handshake completed.
    #[error("Client not initialized")]
    NotInitialized,

    /// The client was closed while the operation was pending, or afterwards.
    #[error("Client closed")]
    Closed,

    /// The caller cancelled the wait.
    #[error("Request cancelled")]
    Cancelled,

    /// The client is in the wrong lifecycle state for the operation.
    #[error("Invalid client state: {0}")]
    InvalidState(String),
}

impl Error {
    /// Create a transport error without an underlying cause
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Create a transport error wrapping a lower-level cause
    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Create a timeout error for `method`
    pub fn timeout(method: impl Into<String>) -> Self {
        Self::Timeout {
            method: method.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// JSON-RPC code for protocol errors
    #[must_use]
    pub fn protocol_code(&self) -> Option<i32> {
        match self {
            Self::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Classified JSON-RPC code for protocol errors
    #[must_use]
    pub fn protocol_kind(&self) -> Option<JsonRpcErrorCode> {
        self.protocol_code().map(JsonRpcErrorCode::from)
    }

    /// Check if this is a timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Check if this error came from client shutdown
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }

    /// Check if this is a transport failure
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<JsonRpcError> for Error {
    fn from(error: JsonRpcError) -> Self {
        Self::Protocol {
            code: error.code,
            message: error.message,
            data: error.data,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::transport_with_source(err.to_string(), err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::error::Error as _;

    #[test]
    fn test_protocol_from_rpc_error() {
        let rpc = JsonRpcError::with_data(-32001, "boom", json!({"tool": "search"}));
        let err = Error::from(rpc);
        assert_eq!(err.protocol_code(), Some(-32001));
        assert_eq!(
            err.protocol_kind(),
            Some(JsonRpcErrorCode::ToolExecutionFailed)
        );
        match err {
            Error::Protocol { message, data, .. } => {
                assert_eq!(message, "boom");
                assert_eq!(data, Some(json!({"tool": "search"})));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_timeout_names_method() {
        let err = Error::timeout("tools/call");
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Request 'tools/call' timed out");
    }

    #[test]
    fn test_transport_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = Error::from(io);
        assert!(err.is_transport());
        assert!(err.source().is_some());
    }

    #[test]
    fn test_serialization_from_serde() {
        let err: Error = serde_json::from_str::<Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::NotInitialized.to_string(), "Client not initialized");
        assert_eq!(Error::Closed.to_string(), "Client closed");
        let err = Error::Protocol {
            code: -32002,
            message: "missing".into(),
            data: None,
        };
        assert_eq!(err.to_string(), "Protocol error -32002: missing");
    }
}
