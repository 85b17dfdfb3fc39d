//! # mcplink child-process transport
//!
//! Launches an MCP server as a child process and exchanges newline-delimited
//! JSON-RPC messages over its stdin and stdout.
//!
//! ## Framing
//!
//! - **One message per line**: outgoing messages are compact JSON followed by `\n`
//! - **No embedded newlines**: messages containing `\n` or `\r` are rejected before writing
//! - **Large frames**: incoming lines of at least 1 MiB are accepted
//! - **stderr**: always drained so a chatty server never blocks, optionally logged
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mcplink_stdio::{ChildProcessConfig, ChildProcessTransport};
//! use mcplink_transport_traits::Transport;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ChildProcessConfig::new("my-mcp-server").with_args(["--verbose"]);
//! let transport = ChildProcessTransport::new(config);
//! transport.connect().await?;
//!
//! while let Some(message) = transport.receive().await? {
//!     println!("{message}");
//! }
//! transport.close().await?;
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

mod config;
mod transport;

pub use config::{ChildProcessConfig, MIN_LINE_LENGTH};
pub use transport::ChildProcessTransport;

// Re-export common types for convenience
pub use mcplink_transport_traits::{
    Transport, TransportError, TransportMetrics, TransportResult, TransportState, TransportType,
};
