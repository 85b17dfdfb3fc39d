//! MCP client implementation
//!
//! - `core`: [`Client<T>`], its lifecycle and the generic `call`/`notify`
//! - `protocol`: request/response correlation with timeout and cancellation
//! - `dispatcher`: the receive loop and the pending-request table
//! - `config` / `builder`: construction
//! - `operations`: typed tool, resource, prompt and ping operations

pub mod builder;
pub mod config;
pub mod core;
mod dispatcher;
pub mod operations;
mod protocol;

pub use self::builder::ClientBuilder;
pub use self::config::{ClientConfig, DEFAULT_REQUEST_TIMEOUT};
pub use self::core::{Client, ClientState};
