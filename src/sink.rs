//! Delivery of completed messages.
//!
//! Each stream produces exactly one [`CompletedMessage`] when its peer closes
//! the write half. The server hands it to a [`CompletionSink`], which may be a
//! plain closure or a [`ChannelSink`] feeding an async consumer.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::reassembly::ReassembledMessage;

/// A reassembled message and the peer that sent it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletedMessage {
    peer_addr: Option<SocketAddr>,
    message: ReassembledMessage,
}

impl CompletedMessage {
    /// Pair a message with its sender.
    #[must_use]
    pub fn new(peer_addr: Option<SocketAddr>, message: ReassembledMessage) -> Self {
        Self { peer_addr, message }
    }

    /// Address of the sending peer, when known.
    #[must_use]
    pub const fn peer_addr(&self) -> Option<SocketAddr> { self.peer_addr }

    /// Borrow the reassembled message.
    #[must_use]
    pub fn message(&self) -> &ReassembledMessage { &self.message }

    /// Borrow the reassembled text.
    #[must_use]
    pub fn text(&self) -> &str { self.message.text() }

    /// Consume the wrapper, returning the message.
    #[must_use]
    pub fn into_message(self) -> ReassembledMessage { self.message }
}

/// Errors a sink reports when it cannot accept a message.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
    /// The consumer is gone.
    #[error("completion sink is closed")]
    Closed,
    /// The consumer refused the message.
    #[error("completion sink rejected message: {0}")]
    Rejected(String),
}

/// Receives completed messages, once per stream.
///
/// Implemented for any `Fn(CompletedMessage) -> Result<(), DeliveryError>`
/// closure.
///
/// # Examples
///
/// ```
/// use wirestitch::sink::{CompletedMessage, CompletionSink, DeliveryError};
///
/// fn accepts<S: CompletionSink>(_sink: S) {}
///
/// accepts(|completed: CompletedMessage| -> Result<(), DeliveryError> {
///     println!("{}", completed.text());
///     Ok(())
/// });
/// ```
pub trait CompletionSink: Send + Sync + 'static {
    /// Hand over one completed message.
    ///
    /// # Errors
    ///
    /// Returns a [`DeliveryError`] when the message cannot be accepted. The
    /// message is not retried.
    fn deliver(&self, completed: CompletedMessage) -> Result<(), DeliveryError>;
}

impl<F> CompletionSink for F
where
    F: Fn(CompletedMessage) -> Result<(), DeliveryError> + Send + Sync + 'static,
{
    fn deliver(&self, completed: CompletedMessage) -> Result<(), DeliveryError> { self(completed) }
}

/// Sink forwarding messages into an unbounded channel.
#[derive(Clone, Debug)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<CompletedMessage>,
}

impl ChannelSink {
    /// Create a sink and the receiver that observes its messages.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CompletedMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Wrap an existing sender.
    #[must_use]
    pub fn from_sender(tx: mpsc::UnboundedSender<CompletedMessage>) -> Self { Self { tx } }
}

impl CompletionSink for ChannelSink {
    fn deliver(&self, completed: CompletedMessage) -> Result<(), DeliveryError> {
        self.tx.send(completed).map_err(|_| DeliveryError::Closed)
    }
}
