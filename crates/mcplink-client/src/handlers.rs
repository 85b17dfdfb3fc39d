//! Handlers for server-initiated notifications.
//!
//! The receive loop hands every notification to one [`NotificationHandler`],
//! in the order the transport delivered them. Handlers run on the receive
//! loop itself, so they must return quickly: anything slow belongs on a
//! channel or a spawned task.
//!
//! ```rust
//! use mcplink_client::NotificationHandler;
//! use mcplink_client::types::ProgressNotification;
//! use std::sync::atomic::{AtomicU64, Ordering};
//!
//! #[derive(Debug, Default)]
//! struct ProgressCounter(AtomicU64);
//!
//! impl NotificationHandler for ProgressCounter {
//!     fn on_progress(&self, _progress: ProgressNotification) {
//!         self.0.fetch_add(1, Ordering::Relaxed);
//!     }
//! }
//! ```

use mcplink_protocol::Message;
use mcplink_protocol::types::{LogLevel, LoggingMessageNotification, ProgressNotification, methods};
use tracing::{debug, error, info, warn};

/// Receives notifications pushed by the server.
///
/// [`on_notification`](NotificationHandler::on_notification) sees every
/// notification. Its default implementation decodes the well-known methods
/// and forwards them to the typed hooks, which by default log through
/// `tracing`. Override the hooks you care about, or `on_notification` itself
/// to take over routing entirely.
pub trait NotificationHandler: Send + Sync + std::fmt::Debug {
    /// Called for every notification, in arrival order.
    fn on_notification(&self, notification: &Message) {
        let method = notification.method_name();
        match method {
            methods::MESSAGE => match notification.decode_params::<LoggingMessageNotification>() {
                Ok(log) => self.on_log_message(log),
                Err(e) => warn!(method, error = %e, "Malformed log notification"),
            },
            methods::PROGRESS => match notification.decode_params::<ProgressNotification>() {
                Ok(progress) => self.on_progress(progress),
                Err(e) => warn!(method, error = %e, "Malformed progress notification"),
            },
            methods::TOOLS_LIST_CHANGED
            | methods::RESOURCES_LIST_CHANGED
            | methods::PROMPTS_LIST_CHANGED => self.on_list_changed(method),
            _ => self.on_other(notification),
        }
    }

    /// `notifications/message`
    fn on_log_message(&self, log: LoggingMessageNotification) {
        let logger = log.logger.as_deref().unwrap_or("server");
        let message = match &log.data {
            serde_json::Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        match log.level {
            LogLevel::Debug => debug!("[{}] {}", logger, message),
            LogLevel::Info => info!("[{}] {}", logger, message),
            LogLevel::Notice => info!("[{}] [NOTICE] {}", logger, message),
            LogLevel::Warning => warn!("[{}] {}", logger, message),
            LogLevel::Error => error!("[{}] {}", logger, message),
            LogLevel::Critical => error!("[{}] [CRITICAL] {}", logger, message),
            LogLevel::Alert => error!("[{}] [ALERT] {}", logger, message),
            LogLevel::Emergency => error!("[{}] [EMERGENCY] {}", logger, message),
        }
    }

    /// `notifications/progress`
    fn on_progress(&self, progress: ProgressNotification) {
        debug!(
            token = %progress.progress_token,
            progress = progress.progress,
            total = ?progress.total,
            "Progress: {}",
            progress.message.as_deref().unwrap_or("")
        );
    }

    /// `notifications/{tools,resources,prompts}/list_changed`
    fn on_list_changed(&self, method: &str) {
        debug!(method, "Server list changed");
    }

    /// Any notification without a dedicated hook
    fn on_other(&self, notification: &Message) {
        debug!(method = notification.method_name(), "Unhandled server notification");
    }
}

/// Default handler: logs everything through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotificationHandler;

impl NotificationHandler for TracingNotificationHandler {}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl NotificationHandler for Recorder {
        fn on_log_message(&self, log: LoggingMessageNotification) {
            self.seen.lock().push(format!("log:{:?}", log.level));
        }

        fn on_progress(&self, progress: ProgressNotification) {
            self.seen.lock().push(format!("progress:{}", progress.progress));
        }

        fn on_list_changed(&self, method: &str) {
            self.seen.lock().push(format!("changed:{method}"));
        }

        fn on_other(&self, notification: &Message) {
            self.seen
                .lock()
                .push(format!("other:{}", notification.method_name()));
        }
    }

    fn notification(method: &str, params: serde_json::Value) -> Message {
        Message::notification(method, Some(params)).unwrap()
    }

    #[test]
    fn test_default_routing() {
        let recorder = Recorder::default();
        recorder.on_notification(&notification(
            "notifications/message",
            json!({"level": "warning", "data": "disk low"}),
        ));
        recorder.on_notification(&notification(
            "notifications/progress",
            json!({"progressToken": "abc", "progress": 0.5}),
        ));
        recorder.on_notification(&notification(
            "notifications/tools/list_changed",
            json!({}),
        ));
        recorder.on_notification(&notification("notifications/custom", json!({})));

        assert_eq!(
            *recorder.seen.lock(),
            vec![
                "log:Warning",
                "progress:0.5",
                "changed:notifications/tools/list_changed",
                "other:notifications/custom",
            ]
        );
    }

    #[test]
    fn test_malformed_params_are_dropped() {
        let recorder = Recorder::default();
        recorder.on_notification(&notification(
            "notifications/message",
            json!({"level": "loud"}),
        ));
        assert!(recorder.seen.lock().is_empty());
    }

    #[test]
    fn test_tracing_handler_accepts_everything() {
        let handler = TracingNotificationHandler;
        let levels = [
            "debug",
            "info",
            "notice",
            "warning",
            "error",
            "critical",
            "alert",
            "emergency",
        ];
        for level in levels {
            handler.on_notification(&notification(
                "notifications/message",
                json!({"level": level, "logger": "db", "data": {"rows": 3}}),
            ));
        }
        handler.on_notification(&notification("notifications/cancelled", json!({})));
    }
}
