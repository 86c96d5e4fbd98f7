//! Runtime control for [`ReassemblyServer`].

mod accept;
mod backoff;

use std::sync::Arc;

#[cfg(test)]
pub(super) use accept::MockAcceptListener;
pub(super) use accept::{AcceptLoopOptions, accept_loop};
pub use backoff::BackoffConfig;
use futures::Future;
use log::{info, warn};
use tokio::{select, signal};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use super::{Bound, ReassemblyServer, ServerError, connection::StreamContext};

impl ReassemblyServer<Bound> {
    /// Run the server until a shutdown signal is received.
    ///
    /// Spawns the configured number of worker tasks and awaits Ctrl+C for shutdown.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use wirestitch::{framing::FramingConfig, server::ReassemblyServer, sink::CompletedMessage};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), wirestitch::server::ServerError> {
    /// let server = ReassemblyServer::new(FramingConfig::default())
    ///     .on_message(|completed: CompletedMessage| {
    ///         println!("{}", completed.text());
    ///         Ok(())
    ///     })
    ///     .bind(([127, 0, 0, 1], 4210).into())?;
    /// server.run().await?;
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// Attempting to run a server without binding fails to compile:
    ///
    /// ```compile_fail
    /// use wirestitch::{framing::FramingConfig, server::ReassemblyServer};
    ///
    /// async fn try_run() {
    ///     ReassemblyServer::new(FramingConfig::default())
    ///         .run()
    ///         .await
    ///         .expect("unbound servers do not expose run()");
    /// }
    /// ```
    ///
    /// # Errors
    ///
    /// Accept failures are retried with exponential back-off and do not
    /// surface as errors; the `Result` is kept for forward compatibility.
    pub async fn run(self) -> Result<(), ServerError> {
        self.run_with_shutdown(async {
            let _ = signal::ctrl_c().await;
        })
        .await
    }

    /// Run the server until the `shutdown` future resolves.
    ///
    /// Open connections are aborted on shutdown without delivering their
    /// partial messages.
    ///
    /// # Examples
    ///
    /// ```
    /// use tokio::sync::oneshot;
    /// use wirestitch::{framing::FramingConfig, server::ReassemblyServer};
    ///
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), wirestitch::server::ServerError> {
    /// let server = ReassemblyServer::new(FramingConfig::default())
    ///     .bind(([127, 0, 0, 1], 0).into())?;
    ///
    /// let (tx, rx) = oneshot::channel::<()>();
    /// let handle = tokio::spawn(async move {
    ///     server
    ///         .run_with_shutdown(async {
    ///             let _ = rx.await;
    ///         })
    ///         .await
    /// });
    ///
    /// // Signal shutdown
    /// let _ = tx.send(());
    /// handle
    ///     .await
    ///     .expect("join server task")
    ///     .expect("server run failed");
    /// # Ok(())
    /// # }
    /// ```
    ///
    /// # Errors
    ///
    /// Accept failures are retried with exponential back-off and do not
    /// surface as errors.
    pub async fn run_with_shutdown<F>(self, shutdown: F) -> Result<(), ServerError>
    where
        F: Future<Output = ()> + Send,
    {
        let ReassemblyServer {
            limits,
            workers,
            sink,
            on_stream_error,
            ready_tx,
            backoff_config,
            state: Bound { listener, parser },
            ..
        } = self;
        let shutdown_token = CancellationToken::new();
        let tracker = TaskTracker::new();
        let context = Arc::new(StreamContext {
            parser,
            limits,
            sink,
            on_error: on_stream_error,
        });

        if let Ok(addr) = listener.local_addr() {
            info!("listening: local_addr={addr}, workers={workers}");
        }

        for _ in 0..workers {
            tracker.spawn(accept_loop(
                Arc::clone(&listener),
                AcceptLoopOptions {
                    context: Arc::clone(&context),
                    shutdown: shutdown_token.clone(),
                    tracker: tracker.clone(),
                    backoff: backoff_config,
                },
            ));
        }

        // Signal readiness after all workers have been spawned.
        if let Some(tx) = ready_tx
            && tx.send(()).is_err()
        {
            warn!("Failed to send readiness signal: receiver dropped");
        }

        select! {
            () = shutdown => shutdown_token.cancel(),
            () = tracker.wait() => {},
        }

        tracker.close();
        tracker.wait().await;
        Ok(())
    }
}
