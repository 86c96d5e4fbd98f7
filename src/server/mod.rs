//! Tokio-based TCP front end for [`ReassemblyBuffer`](crate::reassembly::ReassemblyBuffer).
//!
//! `ReassemblyServer` spawns worker tasks that accept TCP connections. Each
//! connection is one stream: every read becomes a chunk, the peer closing its
//! write half ends the stream, and the reassembled message is handed to the
//! configured [`CompletionSink`](crate::sink::CompletionSink).

use std::sync::Arc;

use tokio::{net::TcpListener, sync::oneshot};

use crate::{
    framing::{FramingConfig, HeaderFrameParser},
    reassembly::ReassemblyLimits,
    sink::CompletionSink,
};

/// TCP server reassembling one message per connection.
///
/// The server carries a typestate `S` indicating whether it is [`Unbound`]
/// or [`Bound`]. New servers start `Unbound` and must call
/// [`bind`](ReassemblyServer::bind) or
/// [`bind_existing_listener`](ReassemblyServer::bind_existing_listener)
/// before running. Binding resolves the framing configuration, so a server
/// with unusable delimiters never accepts a connection.
pub struct ReassemblyServer<S = Unbound>
where
    S: ServerState,
{
    pub(crate) framing: FramingConfig,
    pub(crate) limits: ReassemblyLimits,
    pub(crate) workers: usize,
    pub(crate) sink: Option<Arc<dyn CompletionSink>>,
    pub(crate) on_stream_error: Option<StreamErrorHandler>,
    /// Channel used to notify when the server is ready.
    ///
    /// A `oneshot::Sender` can transmit only one readiness notification, so
    /// a new sender must be provided each time the server is started.
    pub(crate) ready_tx: Option<oneshot::Sender<()>>,
    pub(crate) backoff_config: BackoffConfig,
    /// Typestate tracking whether the server has been bound to a listener.
    pub(crate) state: S,
}

/// Marker indicating the server has not yet bound a listener.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbound;

/// Marker indicating the server is bound to a TCP listener.
#[derive(Debug, Clone)]
pub struct Bound {
    pub(crate) listener: Arc<TcpListener>,
    pub(crate) parser: HeaderFrameParser,
}

/// Trait implemented by [`Unbound`] and [`Bound`] to model binding typestate.
pub trait ServerState: sealed::Sealed {}

mod sealed {
    //! Prevent external implementations of [`ServerState`].

    pub trait Sealed {}
    impl Sealed for super::Unbound {}
    impl Sealed for super::Bound {}
}

impl ServerState for Unbound {}
impl ServerState for Bound {}

mod config;
pub use config::binding;
mod connection;
pub mod error;
mod runtime;

pub use connection::read_message;
pub use error::{ServerError, StreamError, StreamErrorHandler};
/// Re-exported configuration types for server backoff behavior.
pub use runtime::BackoffConfig;

#[cfg(test)]
pub(crate) mod test_util;
