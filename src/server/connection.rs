//! Connection handling for [`ReassemblyServer`](super::ReassemblyServer).
//!
//! Each accepted connection is one stream with its own
//! [`ReassemblyBuffer`]. Every transport read is ingested as a chunk; EOF
//! finalises the buffer and the message is delivered exactly once. Any error
//! aborts the stream without delivery.

use std::{fmt, net::SocketAddr, panic::AssertUnwindSafe, sync::Arc};

use futures::{FutureExt, StreamExt};
use log::{debug, error, info, warn};
use tokio::{io::AsyncRead, net::TcpStream, select};
use tokio_util::{codec::FramedRead, sync::CancellationToken, task::TaskTracker};

use super::{StreamError, StreamErrorHandler};
use crate::{
    codec::ChunkDecoder,
    framing::HeaderFrameParser,
    reassembly::{ReassembledMessage, ReassemblyBuffer, ReassemblyLimits},
    sink::{CompletedMessage, CompletionSink},
};

/// Everything a connection task needs, shared by all connections of a server.
pub(super) struct StreamContext {
    pub parser: HeaderFrameParser,
    pub limits: ReassemblyLimits,
    pub sink: Option<Arc<dyn CompletionSink>>,
    pub on_error: Option<StreamErrorHandler>,
}

impl fmt::Debug for StreamContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamContext")
            .field("parser", &self.parser)
            .field("limits", &self.limits)
            .field("sink", &self.sink.as_ref().map(|_| "Some(<sink>)"))
            .field("on_error", &self.on_error.as_ref().map(|_| "Some(<handler>)"))
            .finish()
    }
}

/// Read `reader` to EOF and reassemble its chunks into one message.
///
/// Each successful read of `reader` is treated as one chunk. This is the
/// procedure a server connection runs, minus delivery to a sink.
///
/// # Examples
///
/// ```
/// use wirestitch::{
///     framing::{FramingConfig, HeaderFrameParser},
///     reassembly::ReassemblyLimits,
///     server::read_message,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let parser = HeaderFrameParser::new(&FramingConfig::disabled()).expect("disabled framing");
/// let message = read_message(&b"Hello World"[..], parser, ReassemblyLimits::default())
///     .await
///     .expect("plain text stream");
/// assert_eq!(message.text(), "Hello World");
/// # }
/// ```
///
/// # Errors
///
/// Returns [`StreamError::Io`] if reading fails or the bytes are not UTF-8,
/// and [`StreamError::Reassembly`] if a chunk is rejected.
pub async fn read_message<R>(
    reader: R,
    parser: HeaderFrameParser,
    limits: ReassemblyLimits,
) -> Result<ReassembledMessage, StreamError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = ReassemblyBuffer::with_limits(parser, limits);
    ingest_stream(reader, &mut buffer, None).await?;
    Ok(buffer.finalize())
}

async fn ingest_stream<R>(
    reader: R,
    buffer: &mut ReassemblyBuffer,
    peer_addr: Option<SocketAddr>,
) -> Result<(), StreamError>
where
    R: AsyncRead + Unpin,
{
    let mut chunks = FramedRead::new(reader, ChunkDecoder);
    while let Some(chunk) = chunks.next().await {
        let chunk = chunk?;
        let outcome = buffer.ingest(&chunk)?;
        crate::metrics::inc_chunks();
        debug!(
            "chunk ingested: outcome={outcome:?}, expected={}, pending={}, peer_addr={peer_addr:?}",
            buffer.expected_index(),
            buffer.pending_len()
        );
    }
    Ok(())
}

/// Spawn a task to process a single TCP connection, logging and discarding any panics.
pub(super) fn spawn_connection_task(
    stream: TcpStream,
    peer_addr: Option<SocketAddr>,
    context: Arc<StreamContext>,
    shutdown: CancellationToken,
    tracker: &TaskTracker,
) {
    tracker.spawn(async move {
        let fut = AssertUnwindSafe(process_stream(stream, peer_addr, &context, &shutdown))
            .catch_unwind();

        if let Err(panic) = fut.await {
            crate::metrics::inc_connection_panics();
            let panic_msg = crate::panic::format_panic(&*panic);
            // Emit via both `log` and `tracing` for tests that capture either.
            error!("connection task panicked: panic={panic_msg}, peer_addr={peer_addr:?}");
            tracing::error!(panic = %panic_msg, ?peer_addr, "connection task panicked");
        }
    });
}

/// Drive one stream to completion, then deliver or report it.
pub(super) async fn process_stream<R>(
    reader: R,
    peer_addr: Option<SocketAddr>,
    context: &StreamContext,
    shutdown: &CancellationToken,
) where
    R: AsyncRead + Unpin,
{
    crate::metrics::inc_connections();
    let mut buffer = ReassemblyBuffer::with_limits(context.parser.clone(), context.limits);
    let result = select! {
        biased;

        () = shutdown.cancelled() => None,
        res = ingest_stream(reader, &mut buffer, peer_addr) => Some(res),
    };
    crate::metrics::dec_connections();

    match result {
        Some(Ok(())) => deliver(context, peer_addr, buffer.finalize()),
        Some(Err(err)) => report_stream_error(context, &err, peer_addr),
        None => debug!(
            "stream abandoned at shutdown: completed_bytes={}, peer_addr={peer_addr:?}",
            buffer.completed().len()
        ),
    }
}

fn deliver(context: &StreamContext, peer_addr: Option<SocketAddr>, message: ReassembledMessage) {
    if !message.is_complete() {
        warn!(
            "stream ended with stranded chunks: stranded={:?}, peer_addr={peer_addr:?}",
            message.stranded()
        );
    }
    let chunks = message.chunks();
    let bytes = message.text().len();
    let Some(sink) = context.sink.as_ref() else {
        info!(
            "message completed without a sink: chunks={chunks}, bytes={bytes}, \
             peer_addr={peer_addr:?}"
        );
        return;
    };
    match sink.deliver(CompletedMessage::new(peer_addr, message)) {
        Ok(()) => {
            crate::metrics::inc_messages();
            debug!("message delivered: chunks={chunks}, bytes={bytes}, peer_addr={peer_addr:?}");
        }
        Err(e) => warn!("message delivery failed: error={e}, peer_addr={peer_addr:?}"),
    }
}

fn report_stream_error(context: &StreamContext, err: &StreamError, peer_addr: Option<SocketAddr>) {
    crate::metrics::inc_stream_errors(err.kind());
    warn!("stream aborted: error={err}, peer_addr={peer_addr:?}");
    if let Some(handler) = context.on_error.as_ref() {
        handler(err, peer_addr);
    }
}
