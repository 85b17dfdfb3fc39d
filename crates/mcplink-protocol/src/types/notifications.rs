//! Notification method names and the payloads the client understands.

use serde::{Deserialize, Serialize};

/// Well-known notification method names
pub mod methods {
    /// Sent by the client once the handshake completes
    pub const INITIALIZED: &str = "notifications/initialized";
    /// Server log message
    pub const MESSAGE: &str = "notifications/message";
    /// Progress update for a long-running request
    pub const PROGRESS: &str = "notifications/progress";
    /// Request cancellation
    pub const CANCELLED: &str = "notifications/cancelled";
    /// Tool list changed
    pub const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";
    /// Resource list changed
    pub const RESOURCES_LIST_CHANGED: &str = "notifications/resources/list_changed";
    /// Prompt list changed
    pub const PROMPTS_LIST_CHANGED: &str = "notifications/prompts/list_changed";
}

/// Log severity, ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Debug
    Debug,
    /// Info
    Info,
    /// Notice
    Notice,
    /// Warning
    Warning,
    /// Error
    Error,
    /// Critical
    Critical,
    /// Alert
    Alert,
    /// Emergency
    Emergency,
}

/// Params of `notifications/message`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingMessageNotification {
    /// Severity
    pub level: LogLevel,
    /// Logger name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logger: Option<String>,
    /// Arbitrary JSON payload
    pub data: serde_json::Value,
}

/// Params of `notifications/progress`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressNotification {
    /// Token from the originating request's `_meta.progressToken`
    #[serde(rename = "progressToken")]
    pub progress_token: serde_json::Value,
    /// Progress so far
    pub progress: f64,
    /// Total, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    /// Human-readable status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
