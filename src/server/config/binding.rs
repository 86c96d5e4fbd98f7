//! Listener binding for [`ReassemblyServer`].

use std::{
    net::{SocketAddr, TcpListener as StdTcpListener},
    sync::Arc,
};

use tokio::net::TcpListener;

use crate::{
    framing::HeaderFrameParser,
    server::{Bound, ReassemblyServer, ServerError, ServerState, Unbound},
};

impl<S> ReassemblyServer<S>
where
    S: ServerState,
{
    fn bind_to_listener(
        self,
        std_listener: StdTcpListener,
    ) -> Result<ReassemblyServer<Bound>, ServerError> {
        let parser = HeaderFrameParser::new(&self.framing)?;
        let ReassemblyServer {
            framing,
            limits,
            workers,
            sink,
            on_stream_error,
            ready_tx,
            backoff_config,
            ..
        } = self;

        std_listener
            .set_nonblocking(true)
            .map_err(ServerError::Bind)?;
        let tokio_listener = TcpListener::from_std(std_listener).map_err(ServerError::Bind)?;

        Ok(ReassemblyServer {
            framing,
            limits,
            workers,
            sink,
            on_stream_error,
            ready_tx,
            backoff_config,
            state: Bound {
                listener: Arc::new(tokio_listener),
                parser,
            },
        })
    }
}

impl ReassemblyServer<Unbound> {
    /// Return `None` as the server is not bound.
    ///
    /// # Examples
    ///
    /// ```
    /// use wirestitch::{framing::FramingConfig, server::ReassemblyServer};
    ///
    /// assert!(
    ///     ReassemblyServer::new(FramingConfig::default())
    ///         .local_addr()
    ///         .is_none()
    /// );
    /// ```
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> { None }

    /// Bind to a fresh address.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::net::{Ipv4Addr, SocketAddr};
    ///
    /// use wirestitch::{framing::FramingConfig, server::ReassemblyServer};
    ///
    /// # #[tokio::main]
    /// # async fn main() {
    /// let addr = SocketAddr::from((Ipv4Addr::LOCALHOST, 0));
    /// let server = ReassemblyServer::new(FramingConfig::default())
    ///     .bind(addr)
    ///     .expect("bind failed");
    /// assert!(server.local_addr().is_some());
    /// # }
    /// ```
    ///
    /// # Errors
    /// Returns [`ServerError::Framing`] if the delimiters cannot be resolved
    /// and [`ServerError::Bind`] if binding or configuring the listener fails.
    pub fn bind(self, addr: SocketAddr) -> Result<ReassemblyServer<Bound>, ServerError> {
        HeaderFrameParser::new(&self.framing)?;
        let std_listener = StdTcpListener::bind(addr).map_err(ServerError::Bind)?;
        self.bind_existing_listener(std_listener)
    }

    /// Bind to an existing `StdTcpListener`.
    ///
    /// # Errors
    /// Returns [`ServerError::Framing`] if the delimiters cannot be resolved
    /// and [`ServerError::Bind`] if configuring the listener fails.
    pub fn bind_existing_listener(
        self,
        std_listener: StdTcpListener,
    ) -> Result<ReassemblyServer<Bound>, ServerError> {
        self.bind_to_listener(std_listener)
    }
}

impl ReassemblyServer<Bound> {
    /// Returns the bound address, or `None` if retrieving it fails.
    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> { self.state.listener.local_addr().ok() }

    /// Rebind to a fresh address.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if binding or configuring the listener fails.
    pub fn bind(self, addr: SocketAddr) -> Result<Self, ServerError> {
        let std_listener = StdTcpListener::bind(addr).map_err(ServerError::Bind)?;
        self.bind_existing_listener(std_listener)
    }

    /// Rebind using an existing `StdTcpListener`.
    ///
    /// # Errors
    /// Returns a [`ServerError`] if configuring the listener fails.
    pub fn bind_existing_listener(self, std_listener: StdTcpListener) -> Result<Self, ServerError> {
        self.bind_to_listener(std_listener)
    }
}
