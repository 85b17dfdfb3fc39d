//! Fluent construction of a [`Client`].

use std::sync::Arc;
use std::time::Duration;

use mcplink_protocol::types::{ClientCapabilities, Implementation};
use mcplink_transport_traits::Transport;

use super::config::ClientConfig;
use super::core::Client;
use crate::handlers::{NotificationHandler, TracingNotificationHandler};

/// Builder for configuring and creating MCP clients
///
/// ```rust,no_run
/// use mcplink_client::ClientBuilder;
/// use mcplink_http::{HttpTransport, HttpTransportConfig};
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let transport = HttpTransport::new(HttpTransportConfig::new("https://api.example.com/mcp"))?;
/// let client = ClientBuilder::new()
///     .with_name("inventory-agent")
///     .with_version("2.1.0")
///     .with_request_timeout(Duration::from_secs(60))
///     .build(transport);
/// client.connect().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    config: ClientConfig,
    handler: Option<Arc<dyn NotificationHandler>>,
}

impl ClientBuilder {
    /// Create a new client builder
    ///
    /// Returns a new builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration
    pub fn with_config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    /// `clientInfo.name`
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.config.client_info.name = name.into();
        self
    }

    /// `clientInfo.version`
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.config.client_info.version = version.into();
        self
    }

    /// Replace `clientInfo` entirely
    pub fn with_client_info(mut self, client_info: Implementation) -> Self {
        self.config.client_info = client_info;
        self
    }

    /// Capabilities advertised in the handshake
    pub fn with_capabilities(mut self, capabilities: ClientCapabilities) -> Self {
        self.config.capabilities = capabilities;
        self
    }

    /// Protocol version requested in the handshake
    pub fn with_protocol_version(mut self, version: impl Into<String>) -> Self {
        self.config.protocol_version = version.into();
        self
    }

    /// Per-call response deadline
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Handler for server notifications (defaults to logging them)
    pub fn with_notification_handler<H>(mut self, handler: H) -> Self
    where
        H: NotificationHandler + 'static,
    {
        self.handler = Some(Arc::new(handler));
        self
    }

    /// Same as [`with_notification_handler`](Self::with_notification_handler)
    /// for a handler the application keeps a reference to
    pub fn with_shared_notification_handler(
        mut self,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        self.handler = Some(handler);
        self
    }

    /// Build an unconnected client on `transport`
    pub fn build<T: Transport + 'static>(self, transport: T) -> Client<T> {
        let handler = self
            .handler
            .unwrap_or_else(|| Arc::new(TracingNotificationHandler));
        Client::from_parts(transport, self.config, handler)
    }
}
