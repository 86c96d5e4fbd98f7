//! Configuration utilities for [`ReassemblyServer`].

use std::{net::SocketAddr, sync::Arc};

use tokio::sync::oneshot;

use super::{BackoffConfig, ReassemblyServer, ServerState, StreamError, Unbound};
use crate::{framing::FramingConfig, reassembly::ReassemblyLimits, sink::CompletionSink};

pub mod binding;

impl ReassemblyServer<Unbound> {
    /// Create a new `ReassemblyServer` using `framing` for every connection.
    ///
    /// The worker count defaults to the number of available CPU cores (or 1 if this cannot be
    /// determined). The TCP listener is unset; call [`bind`](Self::bind) before running the
    /// server.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirestitch::{framing::FramingConfig, server::ReassemblyServer};
    ///
    /// let server = ReassemblyServer::new(FramingConfig::default()).workers(2);
    /// assert_eq!(server.worker_count(), 2);
    /// ```
    #[must_use]
    pub fn new(framing: FramingConfig) -> Self {
        let workers = std::thread::available_parallelism().map_or(1, std::num::NonZeroUsize::get);
        Self {
            framing,
            limits: ReassemblyLimits::default(),
            workers,
            sink: None,
            on_stream_error: None,
            ready_tx: None,
            backoff_config: BackoffConfig::default(),
            state: Unbound,
        }
    }
}

impl<S> ReassemblyServer<S>
where
    S: ServerState,
{
    /// Set the number of worker tasks to spawn for the server.
    #[must_use]
    pub fn workers(mut self, count: usize) -> Self {
        self.workers = count.max(1);
        self
    }

    /// Replace the limits applied to each connection's buffer.
    #[must_use]
    pub fn limits(mut self, limits: ReassemblyLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configure accept-loop back-off. Values are normalised when the server runs.
    #[must_use]
    pub fn backoff(mut self, config: BackoffConfig) -> Self {
        self.backoff_config = config;
        self
    }

    /// Register the sink receiving each completed message.
    ///
    /// Without a sink, completed messages are logged and discarded.
    #[must_use]
    pub fn on_message<K>(mut self, sink: K) -> Self
    where
        K: CompletionSink,
    {
        self.sink = Some(Arc::new(sink));
        self
    }

    /// Register a callback invoked when a stream is aborted.
    #[must_use]
    pub fn on_stream_error<H>(mut self, handler: H) -> Self
    where
        H: Fn(&StreamError, Option<SocketAddr>) + Send + Sync + 'static,
    {
        self.on_stream_error = Some(Arc::new(handler));
        self
    }

    /// Configure a channel used to signal when the server is ready to accept connections.
    #[must_use]
    pub fn ready_signal(mut self, tx: oneshot::Sender<()>) -> Self {
        self.ready_tx = Some(tx);
        self
    }

    /// Returns the configured number of worker tasks for the server.
    #[inline]
    #[must_use]
    pub const fn worker_count(&self) -> usize { self.workers }

    /// Framing applied to every connection.
    #[must_use]
    pub const fn framing_config(&self) -> &FramingConfig { &self.framing }

    /// Limits applied to every connection's buffer.
    #[must_use]
    pub const fn reassembly_limits(&self) -> &ReassemblyLimits { &self.limits }

    /// Back-off settings used by the accept loop.
    #[must_use]
    pub const fn backoff_config(&self) -> &BackoffConfig { &self.backoff_config }
}
