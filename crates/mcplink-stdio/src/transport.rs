//! Child process transport.
//!
//! The server's stdout is consumed by a background reader task that frames
//! lines with [`LinesCodec`] and forwards parsed messages through a bounded
//! channel; [`Transport::receive`] simply awaits that channel, which keeps it
//! cancel-safe. A second task drains stderr for the life of the process.

use std::fmt;
use std::process::Stdio;
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use mcplink_protocol::Message;
use mcplink_transport_traits::{
    AtomicMetrics, Transport, TransportError, TransportFuture, TransportMetrics, TransportResult,
    TransportState, TransportType,
};
use parking_lot::Mutex;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, mpsc};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, error, info, trace, warn};

use crate::config::ChildProcessConfig;

type Incoming = mpsc::Receiver<TransportResult<Message>>;

/// Transport that talks to an MCP server running as a child process.
///
/// `connect` spawns the process with all three stdio streams piped, `close`
/// kills it and reaps the exit status. End of the server's stdout is reported
/// by `receive` as `Ok(None)`.
pub struct ChildProcessTransport {
    config: ChildProcessConfig,
    state: Mutex<TransportState>,
    pid: Mutex<Option<u32>>,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<FramedWrite<ChildStdin, LinesCodec>>>,
    incoming: AsyncMutex<Option<Incoming>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    metrics: Arc<AtomicMetrics>,
}

impl fmt::Debug for ChildProcessTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChildProcessTransport")
            .field("command", &self.config.command_line())
            .field("state", &*self.state.lock())
            .field("pid", &*self.pid.lock())
            .finish_non_exhaustive()
    }
}

impl ChildProcessTransport {
    /// Create a transport for `config`. Nothing is spawned until `connect`.
    pub fn new(config: ChildProcessConfig) -> Self {
        Self {
            config,
            state: Mutex::new(TransportState::Disconnected),
            pid: Mutex::new(None),
            child: AsyncMutex::new(None),
            writer: AsyncMutex::new(None),
            incoming: AsyncMutex::new(None),
            tasks: Mutex::new(Vec::new()),
            metrics: Arc::new(AtomicMetrics::new()),
        }
    }

    /// Launch configuration
    pub fn config(&self) -> &ChildProcessConfig {
        &self.config
    }

    /// OS process id of the running server, if any
    pub fn pid(&self) -> Option<u32> {
        *self.pid.lock()
    }

    fn set_state(&self, state: TransportState) {
        *self.state.lock() = state;
    }

    async fn spawn_process(&self) -> TransportResult<()> {
        info!("Starting child process: {}", self.config.command_line());

        let mut command = Command::new(&self.config.command);
        command
            .args(&self.config.args)
            .envs(&self.config.environment)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.config.working_directory {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| {
            TransportError::ConnectionFailed(format!("Failed to spawn process: {e}"))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TransportError::ConnectionFailed("Failed to get stdin handle".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TransportError::ConnectionFailed("Failed to get stdout handle".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| TransportError::ConnectionFailed("Failed to get stderr handle".into()))?;

        let pid = child.id();
        let (tx, rx) = mpsc::channel(self.config.buffer_size.max(1));

        let reader = tokio::spawn(read_stdout(
            stdout,
            self.config.effective_line_length(),
            tx,
            Arc::clone(&self.metrics),
        ));
        let drain = tokio::spawn(drain_stderr(stderr, self.config.log_stderr, pid));

        *self.writer.lock().await = Some(FramedWrite::new(stdin, LinesCodec::new()));
        *self.incoming.lock().await = Some(rx);
        *self.child.lock().await = Some(child);
        *self.pid.lock() = pid;
        self.tasks.lock().extend([reader, drain]);

        info!("Child process started (pid {:?})", pid);
        Ok(())
    }

    async fn stop_process(&self) {
        let tasks: Vec<_> = self.tasks.lock().drain(..).collect();
        for task in tasks {
            task.abort();
        }

        let child = self.child.lock().await.take();
        let Some(mut child) = child else {
            // Never started or already stopped; still release the pipes
            self.writer.lock().await.take();
            self.incoming.lock().await.take();
            return;
        };

        info!("Stopping child process");
        match child.try_wait() {
            Ok(Some(status)) => debug!("Child process already exited with status: {}", status),
            Ok(None) => {
                if let Err(e) = child.start_kill() {
                    warn!("Failed to send kill signal to child process: {}", e);
                }
            }
            Err(e) => warn!("Failed to poll child process status: {}", e),
        }

        // The kill above unblocks any writer stuck on a full pipe
        self.writer.lock().await.take();
        self.incoming.lock().await.take();

        match timeout(self.config.shutdown_timeout, child.wait()).await {
            Ok(Ok(status)) => info!("Child process exited with status: {}", status),
            Ok(Err(e)) => error!("Failed to wait for child process exit: {}", e),
            Err(_) => warn!(
                "Child process did not exit within {:?}",
                self.config.shutdown_timeout
            ),
        }
        *self.pid.lock() = None;
    }
}

impl Transport for ChildProcessTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::ChildProcess
    }

    fn state(&self) -> TransportState {
        self.state.lock().clone()
    }

    fn connect(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            {
                let mut state = self.state.lock();
                if matches!(
                    *state,
                    TransportState::Connected | TransportState::Connecting
                ) {
                    return Err(TransportError::AlreadyConnected);
                }
                if self.config.command.trim().is_empty() {
                    return Err(TransportError::ConfigurationError(
                        "command must not be empty".into(),
                    ));
                }
                *state = TransportState::Connecting;
            }

            match self.spawn_process().await {
                Ok(()) => {
                    self.metrics.record_connection(true);
                    self.set_state(TransportState::Connected);
                    Ok(())
                }
                Err(e) => {
                    self.metrics.record_connection(false);
                    self.set_state(TransportState::Failed {
                        reason: e.to_string(),
                    });
                    Err(e)
                }
            }
        })
    }

    fn send(&self, message: Message) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }

            let json = message
                .to_json()
                .map_err(|e| TransportError::SerializationFailed(e.to_string()))?;
            if json.contains('\n') || json.contains('\r') {
                return Err(TransportError::SerializationFailed(
                    "message contains embedded newlines".into(),
                ));
            }

            let mut writer = self.writer.lock().await;
            let writer = writer.as_mut().ok_or(TransportError::NotConnected)?;
            writer
                .send(json.as_str())
                .await
                .map_err(|e| TransportError::SendFailed(e.to_string()))?;

            self.metrics.record_sent(json.len() + 1);
            trace!("Sent {} bytes to child process", json.len() + 1);
            Ok(())
        })
    }

    fn receive(&self) -> TransportFuture<'_, Option<Message>> {
        Box::pin(async move {
            if !self.is_connected() {
                return Err(TransportError::NotConnected);
            }

            let mut incoming = self.incoming.lock().await;
            let rx = incoming.as_mut().ok_or(TransportError::NotConnected)?;
            match rx.recv().await {
                Some(Ok(message)) => Ok(Some(message)),
                Some(Err(e)) => Err(e),
                None => {
                    debug!("Child process stdout reached end of stream");
                    Ok(None)
                }
            }
        })
    }

    fn close(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.set_state(TransportState::Disconnecting);
            self.stop_process().await;
            self.set_state(TransportState::Disconnected);
            Ok(())
        })
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.snapshot()
    }

    fn endpoint(&self) -> Option<String> {
        Some(self.config.command_line())
    }
}

impl Drop for ChildProcessTransport {
    fn drop(&mut self) {
        // The child itself is killed by `kill_on_drop`
        for task in self.tasks.get_mut().drain(..) {
            task.abort();
        }
    }
}

/// Frame stdout into messages until end of stream or the first framing error.
async fn read_stdout(
    stdout: ChildStdout,
    max_line_length: usize,
    tx: mpsc::Sender<TransportResult<Message>>,
    metrics: Arc<AtomicMetrics>,
) {
    let mut lines = FramedRead::new(stdout, LinesCodec::new_with_max_length(max_line_length));

    while let Some(next) = lines.next().await {
        let item = match next {
            Ok(line) => match parse_line(&line) {
                Some(parsed) => {
                    metrics.record_received(line.len() + 1);
                    parsed
                }
                None => continue,
            },
            Err(LinesCodecError::MaxLineLengthExceeded) => Err(TransportError::MessageTooLarge {
                size: max_line_length + 1,
                max: max_line_length,
            }),
            Err(LinesCodecError::Io(e)) => Err(TransportError::ReceiveFailed(e.to_string())),
        };

        let failed = item.is_err();
        if tx.send(item).await.is_err() || failed {
            break;
        }
    }

    debug!("Child process stdout reader finished");
}

/// Parse one stdout line; blank lines yield `None`.
fn parse_line(line: &str) -> Option<TransportResult<Message>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    Some(Message::parse(line).map_err(|e| TransportError::SerializationFailed(e.to_string())))
}

/// Read stderr to the end so the server never blocks on a full pipe.
async fn drain_stderr(mut stderr: ChildStderr, log: bool, pid: Option<u32>) {
    let mut chunk = vec![0u8; STDERR_CHUNK];
    let mut lines = StderrLines::default();
    let emit = |line: &[u8]| {
        let line = String::from_utf8_lossy(line);
        debug!(target: "mcplink_stdio::stderr", pid, "{}", line.trim_end());
    };

    loop {
        match stderr.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) if log => lines.push(&chunk[..n], emit),
            Ok(_) => {}
            Err(e) => {
                debug!("Child process stderr read failed: {}", e);
                break;
            }
        }
    }
    if log {
        lines.finish(emit);
    }
}

const STDERR_CHUNK: usize = 8 * 1024;

/// Longest stderr line kept for logging; the rest of the line is dropped.
const STDERR_LINE_LIMIT: usize = 64 * 1024;

/// Splits raw stderr bytes into lines with bounded memory.
#[derive(Debug, Default)]
struct StderrLines {
    line: Vec<u8>,
}

impl StderrLines {
    fn push(&mut self, mut bytes: &[u8], mut emit: impl FnMut(&[u8])) {
        while let Some(newline) = bytes.iter().position(|&b| b == b'\n') {
            self.extend(&bytes[..newline]);
            emit(&self.line);
            self.line.clear();
            bytes = &bytes[newline + 1..];
        }
        self.extend(bytes);
    }

    fn finish(&mut self, mut emit: impl FnMut(&[u8])) {
        if !self.line.is_empty() {
            emit(&self.line);
            self.line.clear();
        }
    }

    fn extend(&mut self, bytes: &[u8]) {
        let room = STDERR_LINE_LIMIT.saturating_sub(self.line.len());
        self.line.extend_from_slice(&bytes[..bytes.len().min(room)]);
    }
}
