//! # mcplink client
//!
//! MCP client core: drives the `initialize` handshake over any
//! [`Transport`], correlates concurrent requests with their responses, and
//! exposes typed tool, resource, and prompt operations.
//!
//! ## Architecture
//!
//! ```text
//! caller tasks ──call()──► pending table ◄── receive loop ◄── transport.receive()
//!       │                       ▲                  │
//!       └────── send() ─────────┼──────────────────┴──► NotificationHandler
//!                               └── timeout / cancellation / close
//! ```
//!
//! One background task per connected client is the only reader of the
//! transport. Every [`Client::call`] registers a single-use slot keyed by
//! request id before sending, then waits for whichever comes first: the
//! response, the per-call timeout, the caller's cancellation token, or the
//! client shutting down. The slot is removed on every path.
//!
//! ## Example
//!
//! ```rust,no_run
//! use mcplink_client::Client;
//! use mcplink_stdio::{ChildProcessConfig, ChildProcessTransport};
//!
//! # async fn example() -> mcplink_client::Result<()> {
//! let transport = ChildProcessTransport::new(
//!     ChildProcessConfig::new("my-mcp-server").with_args(["--stdio"]),
//! );
//! let client = Client::new(transport);
//! let init = client.connect().await?;
//! println!("connected to {}", init.server_info.name);
//!
//! for tool in client.list_tools().await? {
//!     println!("{}", tool.name);
//! }
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all
)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    clippy::must_use_candidate
)]

pub mod client;
pub mod handlers;
pub mod prelude;

pub use client::{Client, ClientBuilder, ClientConfig, ClientState};
pub use handlers::{NotificationHandler, TracingNotificationHandler};

pub use mcplink_protocol::types;
pub use mcplink_protocol::{Error, JsonRpcErrorCode, Message, RequestId, Result};
pub use mcplink_transport_traits::{Transport, TransportError};
pub use tokio_util::sync::CancellationToken;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name, used as the default `clientInfo.name`
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
