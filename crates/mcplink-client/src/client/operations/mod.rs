//! Typed MCP operations
//!
//! Each submodule adds an `impl Client<T>` block for one protocol feature.
//! All of them require a completed handshake and fail with
//! [`Error::NotInitialized`](mcplink_protocol::Error::NotInitialized) before it.

pub mod connection;
pub mod prompts;
pub mod resources;
pub mod tools;
