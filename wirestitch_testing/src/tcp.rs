//! TCP helpers for end-to-end tests.

use std::net::{Ipv4Addr, SocketAddr, TcpListener as StdTcpListener};

use tokio::{
    io::AsyncWriteExt,
    net::TcpStream,
    sync::{mpsc, oneshot},
    task::JoinHandle,
};
use wirestitch::{
    server::{ReassemblyServer, ServerError, Unbound},
    sink::{ChannelSink, CompletedMessage},
};

/// Result alias for fallible integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Bind a listener on an ephemeral localhost port.
///
/// Keeping the listener bound avoids races where another process claims the
/// port between discovery and use.
///
/// # Errors
///
/// Returns an error if the OS refuses the bind.
pub fn unused_listener() -> std::io::Result<StdTcpListener> {
    StdTcpListener::bind(SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 0))
}

/// A running server whose completed messages arrive on a channel.
#[derive(Debug)]
pub struct ChannelServer {
    /// Address the server listens on.
    pub addr: SocketAddr,
    /// Completed messages, one per finished connection.
    pub messages: mpsc::UnboundedReceiver<CompletedMessage>,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), ServerError>>,
}

impl ChannelServer {
    /// Signal shutdown and wait for the server task to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if the server task panicked or failed.
    pub async fn stop(mut self) -> TestResult {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.await??;
        Ok(())
    }
}

/// Bind `server` to an ephemeral port with a channel sink and run it.
///
/// Returns once the server has signalled readiness.
///
/// # Errors
///
/// Returns an error if binding fails or the server exits before it is ready.
pub async fn spawn_channel_server(server: ReassemblyServer<Unbound>) -> TestResult<ChannelServer> {
    let (sink, messages) = ChannelSink::channel();
    let (ready_tx, ready_rx) = oneshot::channel();
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let server = server
        .on_message(sink)
        .ready_signal(ready_tx)
        .bind_existing_listener(unused_listener()?)?;
    let addr = server.local_addr().ok_or("server missing local addr")?;
    let handle = tokio::spawn(server.run_with_shutdown(async move {
        let _ = shutdown_rx.await;
    }));
    ready_rx.await?;
    Ok(ChannelServer {
        addr,
        messages,
        shutdown: Some(shutdown_tx),
        handle,
    })
}

/// Connect to `addr`, write every chunk in order and close the write half.
///
/// TCP does not preserve write boundaries, so the server may observe fewer,
/// larger reads than there are chunks.
///
/// # Errors
///
/// Returns any I/O error raised while connecting or writing.
pub async fn send_chunks<I, T>(addr: SocketAddr, chunks: I) -> std::io::Result<()>
where
    I: IntoIterator<Item = T>,
    T: AsRef<[u8]>,
{
    let mut stream = TcpStream::connect(addr).await?;
    for chunk in chunks {
        stream.write_all(chunk.as_ref()).await?;
        stream.flush().await?;
    }
    stream.shutdown().await
}

/// Send `text` as a single write and close the connection.
///
/// # Errors
///
/// Returns any I/O error raised while connecting or writing.
pub async fn send_message(addr: SocketAddr, text: &str) -> std::io::Result<()> {
    send_chunks(addr, [text]).await
}
