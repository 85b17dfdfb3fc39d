//! Client configuration.

use std::time::Duration;

use mcplink_protocol::LATEST_PROTOCOL_VERSION;
use mcplink_protocol::types::{ClientCapabilities, Implementation};
use serde::{Deserialize, Serialize};

/// Per-call deadline used when none is configured
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Settings fixed at client construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Sent as `clientInfo` in the handshake
    pub client_info: Implementation,

    /// Sent as `capabilities` in the handshake
    pub capabilities: ClientCapabilities,

    /// Requested `protocolVersion`
    pub protocol_version: String,

    /// How long each call waits for its response
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            client_info: Implementation::new(crate::CRATE_NAME, crate::VERSION),
            capabilities: ClientCapabilities::standard(),
            protocol_version: LATEST_PROTOCOL_VERSION.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Override the per-call deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}
