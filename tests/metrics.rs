//! Tests for `wirestitch` metrics helpers.
//!
//! These tests verify that counters and gauges update as expected using
//! `metrics_util::debugging::DebuggingRecorder`.
#![cfg(feature = "metrics")]

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use rstest::rstest;

/// Creates a debugging recorder and snapshotter for metrics testing.
fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter(snapshotter: &Snapshotter, name: &str) -> Option<u64> {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .find_map(|(k, _, _, v)| match v {
            DebugValue::Counter(c) if k.key().name() == name => Some(c),
            _ => None,
        })
}

#[rstest]
#[case(1)]
#[case(3)]
fn chunk_counter_counts_each_ingest(#[case] expected: u64) {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        for _ in 0..expected {
            wirestitch::metrics::inc_chunks();
        }
    });
    assert_eq!(
        counter(&snapshotter, wirestitch::metrics::CHUNKS_INGESTED),
        Some(expected)
    );
}

#[test]
fn message_counter_increments() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, wirestitch::metrics::inc_messages);
    assert_eq!(
        counter(&snapshotter, wirestitch::metrics::MESSAGES_COMPLETED),
        Some(1)
    );
}

#[test]
fn stream_error_metric_carries_kind() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        wirestitch::metrics::inc_stream_errors("framing");
    });

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == wirestitch::metrics::STREAM_ERRORS
            && k.key()
                .labels()
                .any(|l| l.key() == "kind" && l.value() == "framing")
            && matches!(v, DebugValue::Counter(c) if *c > 0)
    });
    assert!(found, "stream error metric not recorded");
}

#[test]
fn connection_gauge_tracks_open_streams() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        wirestitch::metrics::inc_connections();
        wirestitch::metrics::inc_connections();
        wirestitch::metrics::dec_connections();
    });

    let metrics = snapshotter.snapshot().into_vec();
    let found = metrics.iter().any(|(k, _, _, v)| {
        k.key().name() == wirestitch::metrics::CONNECTIONS_ACTIVE
            && matches!(v, DebugValue::Gauge(g) if (g.into_inner() - 1.0).abs() < f64::EPSILON)
    });
    assert!(found, "connection gauge not recorded");
}

#[test]
fn connection_panics_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, wirestitch::metrics::inc_connection_panics);
    assert_eq!(
        counter(&snapshotter, wirestitch::metrics::CONNECTION_PANICS),
        Some(1)
    );
}
