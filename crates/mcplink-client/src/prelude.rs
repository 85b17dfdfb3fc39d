//! Commonly used types in one import.
//!
//! ```rust
//! use mcplink_client::prelude::*;
//!
//! let config = ClientConfig::default();
//! assert_eq!(config.request_timeout.as_millis(), 30_000);
//! ```

pub use crate::{CRATE_NAME, VERSION};

pub use crate::{
    CancellationToken, Client, ClientBuilder, ClientConfig, ClientState, Error,
    NotificationHandler, Result, Transport, TracingNotificationHandler,
};

pub use mcplink_protocol::types::{
    CallToolResult, ClientCapabilities, ContentBlock, GetPromptResult, Implementation,
    InitializeResult, ListPromptsResult, ListResourcesResult, ListToolsResult, LogLevel, Prompt,
    ReadResourceResult, Resource, ResourceContent, ServerCapabilities, Tool,
};
