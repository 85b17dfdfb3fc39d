//! Receive loop and pending-request table.
//!
//! The dispatcher task is the single consumer of `transport.receive()`.
//! It routes what it reads:
//!
//! - **Responses** go to the single-use slot registered by the waiting call
//! - **Notifications** go to the [`NotificationHandler`], in arrival order
//! - **Requests** from the server are answered: `ping` with `{}`, anything
//!   else with a method-not-found error
//!
//! When the transport reports end of stream or fails, the loop exits, moves
//! a ready client to `Closed` or `Failed`, and cancels the client's shutdown
//! token so no caller waits forever.

use std::collections::HashMap;
use std::sync::Arc;

use mcplink_protocol::types::EmptyResult;
use mcplink_protocol::{JsonRpcError, Message, MessageKind, RequestId};
use mcplink_transport_traits::Transport;
use parking_lot::RwLock;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use super::core::ClientState;
use crate::handlers::NotificationHandler;

/// Outstanding calls keyed by request id.
///
/// An id is present exactly while a call is waiting for it. Delivery takes
/// the entry out; otherwise the waiter's [`PendingSlot`] removes it on
/// timeout, cancellation or a dropped future.
#[derive(Debug, Default)]
pub(crate) struct PendingRequests {
    slots: RwLock<HashMap<RequestId, oneshot::Sender<Message>>>,
}

impl PendingRequests {
    /// Register `id` and return the guard that unregisters it on drop.
    pub(crate) fn register(&self, id: RequestId) -> (PendingSlot<'_>, oneshot::Receiver<Message>) {
        let (tx, rx) = oneshot::channel();
        self.slots.write().insert(id.clone(), tx);
        trace!(id = %id, "Registered pending request");
        (PendingSlot { pending: self, id }, rx)
    }

    /// Hand a response to its waiter. Returns `false` for unknown ids.
    pub(crate) fn deliver(&self, response: Message) -> bool {
        let Some(id) = response.id.as_ref() else {
            return false;
        };
        let sender = self.slots.write().remove(id);
        match sender {
            // A waiter that gave up has dropped its receiver
            Some(tx) => {
                let _ = tx.send(response);
                true
            }
            None => false,
        }
    }

    #[cfg(test)]
    pub(crate) fn contains(&self, id: &RequestId) -> bool {
        self.slots.read().contains_key(id)
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.read().len()
    }

    pub(crate) fn clear(&self) {
        self.slots.write().clear();
    }

    fn remove(&self, id: &RequestId) {
        self.slots.write().remove(id);
    }
}

/// Removes its request id from the table when dropped.
#[derive(Debug)]
pub(crate) struct PendingSlot<'a> {
    pending: &'a PendingRequests,
    id: RequestId,
}

impl PendingSlot<'_> {
    pub(crate) fn id(&self) -> &RequestId {
        &self.id
    }
}

impl Drop for PendingSlot<'_> {
    fn drop(&mut self) {
        self.pending.remove(&self.id);
    }
}

/// Background task routing everything the transport delivers
#[derive(Debug)]
pub(crate) struct MessageDispatcher<T: Transport + 'static> {
    transport: Arc<T>,
    pending: Arc<PendingRequests>,
    handler: Arc<dyn NotificationHandler>,
    state: Arc<RwLock<ClientState>>,
    shutdown: CancellationToken,
}

impl<T: Transport + 'static> MessageDispatcher<T> {
    pub(crate) fn new(
        transport: Arc<T>,
        pending: Arc<PendingRequests>,
        handler: Arc<dyn NotificationHandler>,
        state: Arc<RwLock<ClientState>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            transport,
            pending,
            handler,
            state,
            shutdown,
        }
    }

    /// Start the receive loop on the current runtime
    pub(crate) fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(self) {
        debug!("Receive loop started");

        let ended = loop {
            tokio::select! {
                biased;

                () = self.shutdown.cancelled() => {
                    debug!("Receive loop stopping on shutdown");
                    break None;
                }

                result = self.transport.receive() => match result {
                    Ok(Some(message)) => self.route(message),
                    Ok(None) => {
                        info!("Transport reached end of stream");
                        break Some(ClientState::Closed);
                    }
                    Err(e) => {
                        error!(error = %e, "Transport receive failed");
                        break Some(ClientState::Failed);
                    }
                },
            }
        };

        // A handshake in progress is failed by `connect` itself
        if let Some(next) = ended {
            let mut state = self.state.write();
            if *state == ClientState::Ready {
                *state = next;
                info!(state = %next, "Connection lost");
            }
        }

        // Wakes every caller still waiting on a response
        self.shutdown.cancel();
        debug!(pending = self.pending.len(), "Receive loop terminated");
    }

    fn route(&self, message: Message) {
        match message.kind() {
            MessageKind::Response => {
                let id = message.id.clone();
                if self.pending.deliver(message) {
                    trace!(id = ?id, "Routed response");
                } else {
                    debug!(id = ?id, "Discarding response for unknown request id");
                }
            }
            MessageKind::Notification => {
                trace!(method = message.method_name(), "Routing notification");
                self.handler.on_notification(&message);
            }
            MessageKind::Request => self.answer(message),
            MessageKind::Invalid => warn!(message = %message, "Discarding invalid message"),
        }
    }

    /// Reply to a server-initiated request without blocking the loop.
    fn answer(&self, request: Message) {
        let Some(id) = request.id else {
            return;
        };
        let method = request.method.unwrap_or_default();

        let reply = if method == "ping" {
            match Message::success_response(id, &EmptyResult::default()) {
                Ok(reply) => reply,
                Err(e) => {
                    error!(error = %e, "Failed to encode ping reply");
                    return;
                }
            }
        } else {
            debug!(method = %method, id = %id, "Rejecting unsupported server request");
            let error = JsonRpcError::method_not_found(&method);
            Message::error_response(id, error.code, error.message, None)
        };

        let transport = Arc::clone(&self.transport);
        tokio::spawn(async move {
            if let Err(e) = transport.send(reply).await {
                warn!(method = %method, error = %e, "Failed to answer server request");
            }
        });
    }
}
