//! In-process transport backed by tokio channels.

use mcplink_protocol::Message;
use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};

use crate::error::{TransportError, TransportResult};
use crate::metrics::{AtomicMetrics, TransportMetrics};
use crate::traits::{Transport, TransportFuture};
use crate::types::{TransportState, TransportType};

/// One end of an in-process message channel.
///
/// [`MemoryTransport::pair`] returns two connected-on-demand ends: whatever
/// one sends, the other receives. Closing an end drops its sender, so the
/// peer's next `receive` reports end of stream. An end cannot be reopened
/// after `close`.
#[derive(Debug)]
pub struct MemoryTransport {
    state: Mutex<TransportState>,
    outgoing: Mutex<Option<mpsc::UnboundedSender<Message>>>,
    incoming: tokio::sync::Mutex<mpsc::UnboundedReceiver<Message>>,
    closed: watch::Sender<bool>,
    metrics: AtomicMetrics,
}

impl MemoryTransport {
    /// Two ends wired to each other
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = mpsc::unbounded_channel();
        let (b_tx, b_rx) = mpsc::unbounded_channel();
        (Self::new(a_tx, b_rx), Self::new(b_tx, a_rx))
    }

    fn new(
        outgoing: mpsc::UnboundedSender<Message>,
        incoming: mpsc::UnboundedReceiver<Message>,
    ) -> Self {
        Self {
            state: Mutex::new(TransportState::Disconnected),
            outgoing: Mutex::new(Some(outgoing)),
            incoming: tokio::sync::Mutex::new(incoming),
            closed: watch::Sender::new(false),
            metrics: AtomicMetrics::new(),
        }
    }

    fn ensure_connected(&self) -> TransportResult<()> {
        if self.state.lock().is_connected() {
            Ok(())
        } else {
            Err(TransportError::NotConnected)
        }
    }
}

fn frame_len(message: &Message) -> usize {
    message.to_json().map(|json| json.len()).unwrap_or_default()
}

impl Transport for MemoryTransport {
    fn transport_type(&self) -> TransportType {
        TransportType::Memory
    }

    fn state(&self) -> TransportState {
        self.state.lock().clone()
    }

    fn connect(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            let mut state = self.state.lock();
            if state.is_connected() {
                return Err(TransportError::AlreadyConnected);
            }
            if self.outgoing.lock().is_none() {
                self.metrics.record_connection(false);
                return Err(TransportError::ConnectionFailed(
                    "memory transport cannot be reopened".into(),
                ));
            }
            *state = TransportState::Connected;
            self.metrics.record_connection(true);
            Ok(())
        })
    }

    fn send(&self, message: Message) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            self.ensure_connected()?;
            let bytes = frame_len(&message);
            let outgoing = self.outgoing.lock();
            let sender = outgoing.as_ref().ok_or(TransportError::NotConnected)?;
            sender
                .send(message)
                .map_err(|_| TransportError::ConnectionLost("peer dropped".into()))?;
            self.metrics.record_sent(bytes);
            Ok(())
        })
    }

    fn receive(&self) -> TransportFuture<'_, Option<Message>> {
        Box::pin(async move {
            self.ensure_connected()?;
            let mut closed = self.closed.subscribe();
            let mut incoming = self.incoming.lock().await;

            tokio::select! {
                message = incoming.recv() => {
                    if let Some(message) = &message {
                        self.metrics.record_received(frame_len(message));
                    }
                    Ok(message)
                }
                _ = async { closed.wait_for(|closed| *closed).await.map(|_| ()) } => Ok(None),
            }
        })
    }

    fn close(&self) -> TransportFuture<'_, ()> {
        Box::pin(async move {
            *self.state.lock() = TransportState::Disconnected;
            self.outgoing.lock().take();
            self.closed.send_replace(true);
            Ok(())
        })
    }

    fn metrics(&self) -> TransportMetrics {
        self.metrics.snapshot()
    }
}
