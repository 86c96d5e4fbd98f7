//! Command line interface for the `wirestitch` binary.
//!
//! Kept free of library types so `build.rs` can include it to render the
//! manual page.

use std::{net::SocketAddr, num::NonZeroUsize, path::PathBuf};

use clap::{Parser, ValueEnum};

/// Command line arguments for the `wirestitch` binary.
///
/// Every option overrides the matching key of the settings file.
#[derive(Debug, Parser)]
#[command(
    name = "wirestitch",
    version,
    about = "Reassemble header-framed text streams received over TCP"
)]
pub struct Cli {
    /// TOML settings file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Interface to listen on [default: 127.0.0.1].
    #[arg(long)]
    pub host: Option<String>,
    /// TCP port to listen on [default: 4210].
    #[arg(short, long)]
    pub port: Option<u16>,
    /// Number of accept workers [default: available parallelism].
    #[arg(short, long)]
    pub workers: Option<NonZeroUsize>,
    /// Opening header delimiter [default: <header>].
    #[arg(long, value_name = "TAG")]
    pub open: Option<String>,
    /// Closing header delimiter; derived from an XML-style open tag when omitted.
    #[arg(long, value_name = "TAG")]
    pub close: Option<String>,
    /// Treat each stream as plain text without headers.
    #[arg(long, conflicts_with_all = ["open", "close"])]
    pub no_header: bool,
    /// Maximum out-of-order chunks held per connection.
    #[arg(long, value_name = "N")]
    pub max_pending: Option<NonZeroUsize>,
    /// Maximum reassembled message size in bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_message_bytes: Option<NonZeroUsize>,
    /// Handling for framed chunks whose header has no index.
    #[arg(long, value_enum)]
    pub unindexed: Option<UnindexedChoice>,
    /// Serve Prometheus metrics on this address.
    #[arg(long, value_name = "ADDR")]
    pub metrics_addr: Option<SocketAddr>,
}

/// Command-line spelling of the unindexed-chunk policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum UnindexedChoice {
    /// Abort the stream.
    Reject,
    /// Use the next expected index.
    NextInSequence,
    /// Discard the chunk.
    Drop,
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::{Cli, UnindexedChoice};

    #[test]
    fn parses_without_arguments() {
        let cli = Cli::parse_from(["wirestitch"]);
        assert!(cli.config.is_none());
        assert!(cli.port.is_none());
        assert!(!cli.no_header);
    }

    #[test]
    fn parses_listener_and_framing_options() {
        let cli = Cli::parse_from([
            "wirestitch",
            "--config",
            "wirestitch.toml",
            "--port",
            "4300",
            "--workers",
            "2",
            "--open",
            "<msg>",
            "--max-pending",
            "8",
        ]);
        assert_eq!(
            cli.config.as_deref(),
            Some(std::path::Path::new("wirestitch.toml"))
        );
        assert_eq!(cli.port, Some(4300));
        assert_eq!(cli.workers.map(std::num::NonZeroUsize::get), Some(2));
        assert_eq!(cli.open.as_deref(), Some("<msg>"));
        assert_eq!(cli.max_pending.map(std::num::NonZeroUsize::get), Some(8));
    }

    #[rstest]
    #[case("reject", UnindexedChoice::Reject)]
    #[case("next-in-sequence", UnindexedChoice::NextInSequence)]
    #[case("drop", UnindexedChoice::Drop)]
    fn parses_unindexed_policy(#[case] value: &str, #[case] expected: UnindexedChoice) {
        let cli = Cli::parse_from(["wirestitch", "--unindexed", value]);
        assert_eq!(cli.unindexed, Some(expected));
    }

    #[rstest]
    #[case(&["wirestitch", "--no-header", "--open", "<a>"])]
    #[case(&["wirestitch", "--workers", "0"])]
    #[case(&["wirestitch", "--unindexed", "sometimes"])]
    fn rejects_invalid_combinations(#[case] args: &[&str]) {
        assert!(Cli::try_parse_from(args).is_err());
    }
}
