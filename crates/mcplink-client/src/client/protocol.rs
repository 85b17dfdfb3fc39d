//! JSON-RPC request/response correlation.
//!
//! ```text
//! ProtocolClient::request()
//!   1. take a fresh id and register its slot in the pending table
//!   2. send the request through the transport
//!   3. wait for the first of: response, timeout, caller cancel, shutdown
//!   4. the slot guard drops, removing the id whatever happened
//! ```

use std::sync::Arc;
use std::time::Duration;

use mcplink_protocol::{Error, Message, RequestIdGenerator, Result};
use mcplink_transport_traits::Transport;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::dispatcher::PendingRequests;

/// Request/response plumbing shared by every clone of a client
#[derive(Debug)]
pub(crate) struct ProtocolClient<T: Transport> {
    transport: Arc<T>,
    ids: RequestIdGenerator,
    pending: Arc<PendingRequests>,
    shutdown: CancellationToken,
    request_timeout: Duration,
}

impl<T: Transport + 'static> ProtocolClient<T> {
    pub(crate) fn new(transport: T, request_timeout: Duration) -> Self {
        Self {
            transport: Arc::new(transport),
            ids: RequestIdGenerator::new(),
            pending: Arc::new(PendingRequests::default()),
            shutdown: CancellationToken::new(),
            request_timeout,
        }
    }

    pub(crate) fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub(crate) fn pending(&self) -> &Arc<PendingRequests> {
        &self.pending
    }

    /// Cancelled once by `close`, drop, or the receive loop ending
    pub(crate) fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown
    }

    /// Send a request and decode its result into `R`.
    ///
    /// `cancel` lets the caller abandon the wait; the request itself has
    /// already gone out and is not retracted.
    pub(crate) async fn request<P, R>(
        &self,
        method: &str,
        params: Option<P>,
        cancel: Option<&CancellationToken>,
    ) -> Result<R>
    where
        P: Serialize,
        R: DeserializeOwned,
    {
        if self.shutdown.is_cancelled() {
            return Err(Error::Closed);
        }

        let id = self.ids.next_id();
        let request = Message::request(id.clone(), method, params)?;

        // Registered before sending so a fast response always finds its slot
        let (slot, receiver) = self.pending.register(id);
        trace!(method, id = %slot.id(), "Sending request");
        self.transport.send(request).await?;

        let response = tokio::select! {
            biased;

            delivered = receiver => match delivered {
                Ok(response) => response,
                Err(_) => return Err(Error::Closed),
            },
            () = self.shutdown.cancelled() => {
                debug!(method, id = %slot.id(), "Request abandoned: client closed");
                return Err(Error::Closed);
            }
            () = caller_cancelled(cancel) => {
                debug!(method, id = %slot.id(), "Request cancelled by caller");
                return Err(Error::Cancelled);
            }
            () = tokio::time::sleep(self.request_timeout) => {
                warn!(
                    method,
                    id = %slot.id(),
                    timeout_ms = self.request_timeout.as_millis() as u64,
                    "Request timed out"
                );
                return Err(Error::timeout(method));
            }
        };
        drop(slot);

        if let Some(error) = response.error {
            debug!(method, code = error.code, message = %error.message, "Server returned error");
            return Err(error.into());
        }
        response.decode_result()
    }

    /// Fire-and-forget; nothing is registered and nothing is awaited.
    pub(crate) async fn notify<P: Serialize>(&self, method: &str, params: Option<P>) -> Result<()> {
        if self.shutdown.is_cancelled() {
            return Err(Error::Closed);
        }
        let notification = Message::notification(method, params)?;
        trace!(method, "Sending notification");
        self.transport.send(notification).await?;
        Ok(())
    }
}

async fn caller_cancelled(token: Option<&CancellationToken>) {
    match token {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}
