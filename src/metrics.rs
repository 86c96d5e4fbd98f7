//! Metric helpers for `wirestitch`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. Without the `metrics` feature
//! the helpers compile to no-ops.

#[cfg(feature = "metrics")]
use metrics::{counter, gauge};

/// Name of the gauge tracking open connections.
pub const CONNECTIONS_ACTIVE: &str = "wirestitch_connections_active";
/// Name of the counter tracking chunks accepted by a reassembly buffer.
pub const CHUNKS_INGESTED: &str = "wirestitch_chunks_ingested_total";
/// Name of the counter tracking messages handed to the sink.
pub const MESSAGES_COMPLETED: &str = "wirestitch_messages_completed_total";
/// Name of the counter tracking aborted streams, labelled by `kind`.
pub const STREAM_ERRORS: &str = "wirestitch_stream_errors_total";
/// Name of the counter tracking panicking connection tasks.
pub const CONNECTION_PANICS: &str = "wirestitch_connection_panics_total";

/// Increment the active connections gauge.
pub fn inc_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).increment(1.0);
}

/// Decrement the active connections gauge.
pub fn dec_connections() {
    #[cfg(feature = "metrics")]
    gauge!(CONNECTIONS_ACTIVE).decrement(1.0);
}

/// Record an ingested chunk.
pub fn inc_chunks() {
    #[cfg(feature = "metrics")]
    counter!(CHUNKS_INGESTED).increment(1);
}

/// Record a delivered message.
pub fn inc_messages() {
    #[cfg(feature = "metrics")]
    counter!(MESSAGES_COMPLETED).increment(1);
}

/// Record an aborted stream under the given error `kind`.
pub fn inc_stream_errors(kind: &'static str) {
    #[cfg(feature = "metrics")]
    counter!(STREAM_ERRORS, "kind" => kind).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = kind;
}

/// Record a connection task that panicked.
pub fn inc_connection_panics() {
    #[cfg(feature = "metrics")]
    counter!(CONNECTION_PANICS).increment(1);
}
