//! # mcplink HTTP Transport
//!
//! Client-side HTTP transport for the Model Context Protocol. Each outgoing
//! JSON-RPC message is POSTed to a single endpoint; response bodies are
//! queued and handed out by `receive`.
//!
//! ## Features
//!
//! - **Accept negotiation**: `application/json, text/event-stream`; JSON bodies,
//!   batch arrays and SSE-framed responses are all understood
//! - **Session Management**: `Mcp-Session-Id` captured from responses and echoed back
//! - **Protocol version header**: `MCP-Protocol-Version` on every request
//! - **OAuth 2.0 client credentials**: tokens fetched and refreshed ahead of expiry
//! - **Fail closed**: with OAuth configured, no request is sent without a token
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mcplink_http::{HttpTransport, HttpTransportConfig, OAuthConfig};
//! use mcplink_transport_traits::Transport;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpTransportConfig::new("https://api.example.com/mcp")
//!         .with_timeout(Duration::from_secs(30))
//!         .with_oauth(
//!             OAuthConfig::client_credentials(
//!                 "https://auth.example.com/token",
//!                 "my-client",
//!                 "my-secret",
//!             )
//!             .with_scopes(["mcp:tools"]),
//!         );
//!
//!     let transport = HttpTransport::new(config)?;
//!     transport.connect().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Manually supplied tokens
//!
//! When the OAuth configuration has no secret or token URL, the application
//! hands tokens in with [`HttpTransport::set_access_token`]. Once such a token
//! expires, sends fail with `AuthenticationFailed("manual token required")`.

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod auth;
mod config;
mod sse;
mod transport;

pub use config::{HttpTransportConfig, OAuthConfig};
pub use transport::HttpTransport;

// Re-export common types from traits crate for convenience
pub use mcplink_transport_traits::{
    Transport, TransportError, TransportMetrics, TransportResult, TransportState, TransportType,
};
