//! Child process launch configuration.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Smallest accepted line limit for stdout frames (1 MiB).
pub const MIN_LINE_LENGTH: usize = 1024 * 1024;

/// How to launch the server process and frame its output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChildProcessConfig {
    /// Program to execute
    pub command: String,

    /// Arguments passed to the program
    pub args: Vec<String>,

    /// Extra environment variables, layered over the inherited environment
    pub environment: HashMap<String, String>,

    /// Working directory for the process
    pub working_directory: Option<PathBuf>,

    /// Longest stdout line accepted, in bytes. Never below [`MIN_LINE_LENGTH`].
    pub max_line_length: usize,

    /// Forward stderr lines to `tracing` under the `mcplink_stdio::stderr` target
    pub log_stderr: bool,

    /// How long `close` waits for the process to exit after killing it
    pub shutdown_timeout: Duration,

    /// Capacity of the channel between the stdout reader and `receive`
    pub buffer_size: usize,
}

impl Default for ChildProcessConfig {
    fn default() -> Self {
        Self {
            command: String::new(),
            args: Vec::new(),
            environment: HashMap::new(),
            working_directory: None,
            max_line_length: MIN_LINE_LENGTH,
            log_stderr: true,
            shutdown_timeout: Duration::from_secs(5),
            buffer_size: 256,
        }
    }
}

impl ChildProcessConfig {
    /// Configuration that runs `command` with no arguments
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    /// Set the program arguments
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Add one environment variable
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    /// Set the working directory
    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    /// Set the stdout line limit; values below [`MIN_LINE_LENGTH`] are raised to it
    pub fn with_max_line_length(mut self, max: usize) -> Self {
        self.max_line_length = max;
        self
    }

    /// Enable or disable stderr logging (stderr is drained either way)
    pub fn with_stderr_logging(mut self, enabled: bool) -> Self {
        self.log_stderr = enabled;
        self
    }

    /// Set the shutdown grace period
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Line limit actually applied to stdout
    pub fn effective_line_length(&self) -> usize {
        self.max_line_length.max(MIN_LINE_LENGTH)
    }

    /// `command arg1 arg2 ...` for logs and `Transport::endpoint`
    pub fn command_line(&self) -> String {
        std::iter::once(self.command.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
