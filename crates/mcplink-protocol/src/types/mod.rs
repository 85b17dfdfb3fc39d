//! MCP payload types.
//!
//! Each submodule covers one protocol feature. Everything is re-exported
//! here so callers can `use mcplink_protocol::types::*`.

pub mod capabilities;
pub mod content;
pub mod core;
pub mod initialization;
pub mod notifications;
pub mod prompts;
pub mod resources;
pub mod tools;

pub use capabilities::*;
pub use content::*;
pub use self::core::*;
pub use initialization::*;
pub use notifications::*;
pub use prompts::*;
pub use resources::*;
pub use tools::*;
