//! # mcplink protocol
//!
//! The message layer of the mcplink MCP client:
//!
//! - **JSON-RPC**: [`Message`] envelope with deferred payload decoding,
//!   structural classification and constructors
//! - **Types**: MCP handshake, capability, tool, resource and prompt payloads
//! - **Errors**: the [`Error`] taxonomy every public operation returns
//! - **Ids**: [`RequestIdGenerator`] for correlation
//!
//! ```rust
//! use mcplink_protocol::{Message, MessageKind};
//!
//! let msg = Message::request(1, "tools/list", None::<serde_json::Value>).unwrap();
//! assert_eq!(msg.kind(), MessageKind::Request);
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

pub mod error;
pub mod id;
pub mod jsonrpc;
pub mod types;

pub use error::{BoxError, Error, Result};
pub use id::RequestIdGenerator;
pub use jsonrpc::{
    JSONRPC_VERSION, JsonRpcError, JsonRpcErrorCode, JsonRpcVersion, Message, MessageKind,
    RequestId,
};
pub use types::{Implementation, LATEST_PROTOCOL_VERSION};
