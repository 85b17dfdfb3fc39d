//! Core transport trait.

use std::future::Future;
use std::pin::Pin;

use mcplink_protocol::Message;

use crate::error::TransportResult;
use crate::metrics::TransportMetrics;
use crate::types::{TransportState, TransportType};

/// Boxed future returned by [`Transport`] methods
pub type TransportFuture<'a, T> = Pin<Box<dyn Future<Output = TransportResult<T>> + Send + 'a>>;

/// A bidirectional channel carrying one JSON-RPC message at a time.
///
/// Methods take `&self` so a single transport can be shared between the
/// client's receive loop and any number of senders.
///
/// `receive` must be cancel-safe: dropping its future before completion must
/// not lose a message that a later call would have returned.
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Returns the type of this transport.
    fn transport_type(&self) -> TransportType;

    /// Returns the current state of the transport.
    fn state(&self) -> TransportState;

    /// Establishes the underlying channel.
    ///
    /// Fails with `AlreadyConnected` if called twice without an intervening
    /// [`Transport::close`].
    fn connect(&self) -> TransportFuture<'_, ()>;

    /// Serializes and transmits one message.
    fn send(&self, message: Message) -> TransportFuture<'_, ()>;

    /// Waits for the next message.
    ///
    /// `Ok(None)` means the peer closed the channel (end of stream).
    fn receive(&self) -> TransportFuture<'_, Option<Message>>;

    /// Releases all resources. Safe to call more than once.
    fn close(&self) -> TransportFuture<'_, ()>;

    /// Returns a snapshot of the transport's counters.
    fn metrics(&self) -> TransportMetrics;

    /// Returns `true` if the transport is currently in the `Connected` state.
    fn is_connected(&self) -> bool {
        self.state().is_connected()
    }

    /// Returns the endpoint address or command for this transport, if applicable.
    fn endpoint(&self) -> Option<String> {
        None
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn transport_type(&self) -> TransportType {
        (**self).transport_type()
    }

    fn state(&self) -> TransportState {
        (**self).state()
    }

    fn connect(&self) -> TransportFuture<'_, ()> {
        (**self).connect()
    }

    fn send(&self, message: Message) -> TransportFuture<'_, ()> {
        (**self).send(message)
    }

    fn receive(&self) -> TransportFuture<'_, Option<Message>> {
        (**self).receive()
    }

    fn close(&self) -> TransportFuture<'_, ()> {
        (**self).close()
    }

    fn metrics(&self) -> TransportMetrics {
        (**self).metrics()
    }

    fn is_connected(&self) -> bool {
        (**self).is_connected()
    }

    fn endpoint(&self) -> Option<String> {
        (**self).endpoint()
    }
}
