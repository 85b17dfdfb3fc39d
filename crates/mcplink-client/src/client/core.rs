//! Core `Client<T>` implementation.
//!
//! `Client<T>` is a cheap `Arc` handle; every clone shares one transport, one
//! pending table and one receive loop.
//!
//! ## Lifecycle
//!
//! ```text
//! Unconnected ─connect()─► Connecting ─► Handshaking ─► Ready ─close()─► Closed
//!                               │              │
//!                               └──── error ───┴─► Failed
//! ```
//!
//! A `Ready` client also becomes `Closed` when the server ends the stream,
//! and `Failed` when the transport breaks. `Failed` behaves like `Closed`.
//! A client is never reused: to reconnect, build a new one on a fresh
//! transport.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use mcplink_protocol::types::{
    ClientCapabilities, Implementation, InitializeRequest, InitializeResult, ServerCapabilities,
    methods,
};
use mcplink_protocol::{Error, Result};
use mcplink_transport_traits::Transport;
use parking_lot::{Mutex, RwLock};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::builder::ClientBuilder;
use super::config::ClientConfig;
use super::dispatcher::MessageDispatcher;
use super::protocol::ProtocolClient;
use crate::handlers::{NotificationHandler, TracingNotificationHandler};

/// Where a client is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientState {
    /// Constructed, `connect` not yet called
    Unconnected,
    /// Opening the transport
    Connecting,
    /// Receive loop running, `initialize` in flight
    Handshaking,
    /// Handshake complete; operations are allowed
    Ready,
    /// Closed by the application or by the server ending the stream
    Closed,
    /// `connect` failed or the transport broke; terminal
    Failed,
}

impl ClientState {
    /// `Closed` or `Failed`
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Closed | Self::Failed)
    }
}

impl fmt::Display for ClientState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Unconnected => "unconnected",
            Self::Connecting => "connecting",
            Self::Handshaking => "handshaking",
            Self::Ready => "ready",
            Self::Closed => "closed",
            Self::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// State shared by every clone of a [`Client`]
pub(crate) struct ClientInner<T: Transport + 'static> {
    pub(crate) protocol: ProtocolClient<T>,
    pub(crate) config: ClientConfig,
    pub(crate) handler: Arc<dyn NotificationHandler>,
    pub(crate) state: Arc<RwLock<ClientState>>,
    pub(crate) initialize_result: RwLock<Option<InitializeResult>>,
    pub(crate) receive_loop: Mutex<Option<JoinHandle<()>>>,
    /// Set once the loop, pending table and transport have been torn down
    pub(crate) released: AtomicBool,
}

impl<T: Transport + 'static> Drop for ClientInner<T> {
    fn drop(&mut self) {
        // Last handle gone: the receive loop must not outlive the client
        debug!("Last client handle dropped, stopping receive loop");
        self.protocol.shutdown_token().cancel();
    }
}

/// MCP client over a transport `T`.
///
/// Cloning is cheap and every clone drives the same connection, so a client
/// can be handed to any number of tasks that call concurrently.
///
/// ```rust,no_run
/// use mcplink_client::Client;
/// use mcplink_stdio::{ChildProcessConfig, ChildProcessTransport};
/// use std::collections::HashMap;
///
/// # async fn example() -> mcplink_client::Result<()> {
/// let client = Client::new(ChildProcessTransport::new(ChildProcessConfig::new("weather-server")));
/// client.connect().await?;
///
/// let worker = client.clone();
/// tokio::spawn(async move {
///     let mut args = HashMap::new();
///     args.insert("city".to_string(), serde_json::json!("Oslo"));
///     worker.call_tool("forecast", Some(args)).await
/// });
/// # Ok(())
/// # }
/// ```
pub struct Client<T: Transport + 'static> {
    pub(crate) inner: Arc<ClientInner<T>>,
}

impl<T: Transport + 'static> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Transport + 'static> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("state", &self.state())
            .field("transport", self.inner.protocol.transport())
            .field("pending_requests", &self.pending_requests())
            .finish_non_exhaustive()
    }
}

impl<T: Transport + 'static> Client<T> {
    /// Client with default configuration and the logging notification handler
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    /// Client with explicit configuration
    pub fn with_config(transport: T, config: ClientConfig) -> Self {
        Self::from_parts(transport, config, Arc::new(TracingNotificationHandler))
    }

    /// Start configuring a client
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn from_parts(
        transport: T,
        config: ClientConfig,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                protocol: ProtocolClient::new(transport, config.request_timeout),
                config,
                handler,
                state: Arc::new(RwLock::new(ClientState::Unconnected)),
                initialize_result: RwLock::new(None),
                receive_loop: Mutex::new(None),
                released: AtomicBool::new(false),
            }),
        }
    }

    /// Open the transport, start the receive loop, and run the handshake.
    ///
    /// On success the client is [`ClientState::Ready`]. On any failure the
    /// receive loop is stopped, the transport closed, and the client left
    /// [`ClientState::Failed`].
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidState`] unless the client is still unconnected
    /// - [`Error::Transport`] if the transport cannot be opened
    /// - any error of the `initialize` call itself
    pub async fn connect(&self) -> Result<InitializeResult> {
        self.advance(ClientState::Unconnected, ClientState::Connecting)?;

        match self.establish().await {
            Ok(result) => Ok(result),
            Err(e) => {
                warn!(error = %e, "Connect failed");
                if let Err(close_error) = self.release().await {
                    warn!(error = %close_error, "Failed to close transport");
                }
                {
                    let mut state = self.inner.state.write();
                    if !state.is_terminal() {
                        *state = ClientState::Failed;
                    }
                }
                Err(e)
            }
        }
    }

    async fn establish(&self) -> Result<InitializeResult> {
        let protocol = &self.inner.protocol;

        debug!(transport = %protocol.transport().transport_type(), "Connecting transport");
        protocol.transport().connect().await?;
        self.advance(ClientState::Connecting, ClientState::Handshaking)?;

        let dispatcher = MessageDispatcher::new(
            Arc::clone(protocol.transport()),
            Arc::clone(protocol.pending()),
            Arc::clone(&self.inner.handler),
            Arc::clone(&self.inner.state),
            protocol.shutdown_token().clone(),
        );
        *self.inner.receive_loop.lock() = Some(dispatcher.spawn());

        let request = InitializeRequest {
            protocol_version: self.inner.config.protocol_version.clone(),
            capabilities: self.inner.config.capabilities.clone(),
            client_info: self.inner.config.client_info.clone(),
        };
        let result: InitializeResult = protocol.request("initialize", Some(request), None).await?;

        if !result.is_supported_version() {
            warn!(
                protocol_version = %result.protocol_version,
                "Server chose a protocol version this client does not know"
            );
        }

        *self.inner.initialize_result.write() = Some(result.clone());
        protocol.notify(methods::INITIALIZED, None::<()>).await?;
        self.advance(ClientState::Handshaking, ClientState::Ready)?;
        // The server may have hung up right after the handshake
        if protocol.shutdown_token().is_cancelled() {
            return Err(Error::Closed);
        }

        info!(
            server = %result.server_info.name,
            version = %result.server_info.version,
            protocol_version = %result.protocol_version,
            "MCP handshake complete"
        );
        Ok(result)
    }

    /// Stop the receive loop, wake every waiter with [`Error::Closed`], and
    /// close the transport. Safe to call more than once.
    ///
    /// A client the server already disconnected keeps its `Closed` or
    /// `Failed` state, but its transport is still closed here.
    pub async fn close(&self) -> Result<()> {
        {
            let mut state = self.inner.state.write();
            if !state.is_terminal() {
                *state = ClientState::Closed;
            }
        }

        info!("Closing client");
        self.release().await
    }

    /// Tear down the loop, pending table and transport, once.
    async fn release(&self) -> Result<()> {
        if self.inner.released.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.inner.protocol.shutdown_token().cancel();
        self.join_receive_loop().await;
        self.inner.protocol.pending().clear();
        self.inner.protocol.transport().close().await?;
        Ok(())
    }

    async fn join_receive_loop(&self) {
        let handle = self.inner.receive_loop.lock().take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
            && e.is_panic()
        {
            warn!("Receive loop panicked");
        }
    }

    /// Move `from -> to`, failing if another path got there first.
    fn advance(&self, from: ClientState, to: ClientState) -> Result<()> {
        let mut state = self.inner.state.write();
        if *state == from {
            *state = to;
            debug!(from = %from, to = %to, "Client state changed");
            Ok(())
        } else if state.is_terminal() && from != ClientState::Unconnected {
            Err(Error::Closed)
        } else {
            Err(Error::InvalidState(format!(
                "expected {from}, client is {}",
                *state
            )))
        }
    }

    /// Gate for operations that need a completed handshake
    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match *self.inner.state.read() {
            ClientState::Ready => Ok(()),
            ClientState::Closed | ClientState::Failed => Err(Error::Closed),
            _ => Err(Error::NotInitialized),
        }
    }

    /// Send a request and decode its result.
    ///
    /// Waits at most [`ClientConfig::request_timeout`].
    ///
    /// # Errors
    ///
    /// - [`Error::NotInitialized`] before the handshake completes
    /// - [`Error::Protocol`] when the server answers with an error object
    /// - [`Error::Timeout`] naming `method` when no answer arrives in time
    /// - [`Error::Closed`] when the client closes while waiting
    pub async fn call<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<R> {
        self.ensure_ready()?;
        self.inner.protocol.request(method, params, None).await
    }

    /// [`call`](Self::call) that also gives up with [`Error::Cancelled`]
    /// once `cancel` fires.
    ///
    /// Only this caller's wait is abandoned; the server still receives the
    /// request.
    pub async fn call_with_cancellation<R: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
        cancel: &CancellationToken,
    ) -> Result<R> {
        self.ensure_ready()?;
        self.inner.protocol.request(method, params, Some(cancel)).await
    }

    /// Send a notification; no response is expected.
    pub async fn notify(&self, method: &str, params: Option<Value>) -> Result<()> {
        self.ensure_ready()?;
        self.inner.protocol.notify(method, params).await
    }

    /// Current lifecycle state
    pub fn state(&self) -> ClientState {
        *self.inner.state.read()
    }

    /// True once the handshake has completed and until close
    pub fn is_ready(&self) -> bool {
        self.state() == ClientState::Ready
    }

    /// Number of calls currently waiting for a response
    pub fn pending_requests(&self) -> usize {
        self.inner.protocol.pending().len()
    }

    /// Full `initialize` result, once connected
    pub fn initialize_result(&self) -> Option<InitializeResult> {
        self.inner.initialize_result.read().clone()
    }

    /// `serverInfo` from the handshake
    pub fn server_info(&self) -> Option<Implementation> {
        self.inner
            .initialize_result
            .read()
            .as_ref()
            .map(|result| result.server_info.clone())
    }

    /// Capabilities the server advertised
    pub fn server_capabilities(&self) -> Option<ServerCapabilities> {
        self.inner
            .initialize_result
            .read()
            .as_ref()
            .map(|result| result.capabilities.clone())
    }

    /// `clientInfo` sent in the handshake
    pub fn client_info(&self) -> &Implementation {
        &self.inner.config.client_info
    }

    /// Capabilities sent in the handshake
    pub fn capabilities(&self) -> &ClientCapabilities {
        &self.inner.config.capabilities
    }

    /// Configuration this client was built with
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        self.inner.protocol.transport()
    }
}
