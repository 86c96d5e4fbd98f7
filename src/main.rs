//! `wirestitch` server binary.
//!
//! Loads settings, listens for TCP streams and prints each reassembled
//! message to standard output.

mod cli;

use anyhow::Context;
use clap::Parser;
use log::info;
use wirestitch::{
    reassembly::UnindexedPolicy,
    settings::{Overrides, Settings},
    sink::{CompletedMessage, DeliveryError},
};

use crate::cli::{Cli, UnindexedChoice};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Applications embedding the library should install their own subscriber.
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let settings = Settings::resolve(cli.config.as_deref(), overrides(&cli))
        .context("failed to load settings")?;
    install_metrics_exporter(&cli)?;

    let addr = settings.server.socket_addr()?;
    let server = settings
        .server()
        .on_message(print_message)
        .bind(addr)
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(
        "wirestitch ready: addr={addr}, framing_enabled={}",
        settings.framing.enabled
    );
    server.run().await?;
    info!("wirestitch stopped");
    Ok(())
}

fn overrides(cli: &Cli) -> Overrides {
    Overrides {
        host: cli.host.clone(),
        port: cli.port,
        workers: cli.workers,
        open: cli.open.clone(),
        close: cli.close.clone(),
        no_header: cli.no_header,
        max_pending: cli.max_pending,
        max_message_bytes: cli.max_message_bytes,
        unindexed: cli.unindexed.map(|choice| match choice {
            UnindexedChoice::Reject => UnindexedPolicy::Reject,
            UnindexedChoice::NextInSequence => UnindexedPolicy::NextInSequence,
            UnindexedChoice::Drop => UnindexedPolicy::Drop,
        }),
    }
}

#[expect(
    clippy::unnecessary_wraps,
    reason = "signature required by CompletionSink"
)]
fn print_message(completed: CompletedMessage) -> Result<(), DeliveryError> {
    println!("{}", completed.text());
    Ok(())
}

#[cfg(feature = "metrics")]
fn install_metrics_exporter(cli: &Cli) -> anyhow::Result<()> {
    if let Some(addr) = cli.metrics_addr {
        metrics_exporter_prometheus::PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!("metrics exporter listening: addr={addr}");
    }
    Ok(())
}

#[cfg(not(feature = "metrics"))]
fn install_metrics_exporter(cli: &Cli) -> anyhow::Result<()> {
    if cli.metrics_addr.is_some() {
        log::warn!("--metrics-addr ignored: built without the metrics feature");
    }
    Ok(())
}
