//! Errors raised by [`ReassemblyServer`](super::ReassemblyServer) operations.

use std::{io, net::SocketAddr, sync::Arc};

use thiserror::Error;

use crate::{framing::FramingError, reassembly::ReassemblyError};

/// Errors that may occur while binding or running the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Binding or configuring the listener failed.
    #[error("bind error: {0}")]
    Bind(#[source] io::Error),
    /// Accepting a connection failed.
    #[error("accept error: {0}")]
    Accept(#[source] io::Error),
    /// The framing configuration cannot be resolved.
    #[error("invalid framing configuration: {0}")]
    Framing(#[from] FramingError),
}

/// Reasons a single stream was aborted before delivery.
#[derive(Debug, Error)]
pub enum StreamError {
    /// Reading from the transport failed or produced invalid UTF-8.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
    /// A chunk could not be reassembled.
    #[error("reassembly error: {0}")]
    Reassembly(#[from] ReassemblyError),
}

impl StreamError {
    /// Short label naming the error category, used as a metric label.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Reassembly(ReassemblyError::Framing(_)) => "framing",
            Self::Reassembly(_) => "reassembly",
        }
    }
}

/// Callback notified when a stream is aborted.
///
/// Receives the error and the peer address when it could be determined.
pub type StreamErrorHandler = Arc<dyn Fn(&StreamError, Option<SocketAddr>) + Send + Sync + 'static>;
