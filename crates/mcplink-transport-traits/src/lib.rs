//! # mcplink transport traits
//!
//! The seam between the MCP client and whatever moves bytes to the server.
//!
//! - **Trait**: [`Transport`]
//! - **Types**: [`TransportType`], [`TransportState`]
//! - **Errors**: [`TransportError`], [`TransportResult`]
//! - **Metrics**: [`TransportMetrics`], [`AtomicMetrics`]
//!
//! Implementations live in `mcplink-stdio` (child process pipes) and
//! `mcplink-http` (one POST per message). [`MemoryTransport`] connects two
//! endpoints inside one process.

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

mod error;
mod memory;
mod metrics;
mod traits;
mod types;

pub use error::{TransportError, TransportResult};
pub use memory::MemoryTransport;
pub use metrics::{AtomicMetrics, TransportMetrics};
pub use traits::{Transport, TransportFuture};
pub use types::{TransportState, TransportType};

pub use mcplink_protocol::Message;
