//! Tests for pending capacity, size caps, and unindexed chunk policies.

use std::num::NonZeroUsize;

use rstest::rstest;

use super::{buffer_with, framed};
use crate::{
    framing::{ChunkIndex, FramingConfig, HeaderFrameParser},
    reassembly::{
        IngestOutcome,
        ReassemblyBuffer,
        ReassemblyError,
        ReassemblyLimits,
        UnindexedPolicy,
    },
};

fn nz(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

const UNINDEXED: &str = "<header>{\"kind\":\"note\"}</header>free";

#[test]
fn pending_capacity_is_enforced() {
    let mut buffer = buffer_with(ReassemblyLimits::default().with_max_pending_chunks(nz(2)));
    buffer.ingest(&framed(1, "b")).expect("held back");
    buffer.ingest(&framed(2, "c")).expect("held back");

    let err = buffer
        .ingest(&framed(3, "d"))
        .expect_err("pending map is full");
    assert!(matches!(
        err,
        ReassemblyError::PendingLimitExceeded { index, limit }
            if index == ChunkIndex::new(3) && limit.get() == 2
    ));
    assert_eq!(buffer.pending_len(), 2);
}

#[test]
fn in_order_chunk_is_accepted_with_full_pending_map() {
    let mut buffer = buffer_with(ReassemblyLimits::default().with_max_pending_chunks(nz(1)));
    buffer.ingest(&framed(1, "b")).expect("held back");
    let outcome = buffer.ingest(&framed(0, "a")).expect("appended");
    assert_eq!(outcome, IngestOutcome::Appended { drained: 1 });
    assert_eq!(buffer.completed(), "ab");
}

#[rstest]
#[case::in_order(0)]
#[case::held_back(1)]
fn message_size_cap_counts_completed_and_pending(#[case] second_index: u32) {
    let mut buffer = buffer_with(ReassemblyLimits::default().with_max_message_bytes(nz(5)));
    buffer.ingest(&framed(0, "abc")).expect("within cap");
    let next = if second_index == 0 { 1 } else { 2 };

    let err = buffer
        .ingest(&framed(next, "def"))
        .expect_err("six bytes exceed the cap");
    assert!(matches!(
        err,
        ReassemblyError::MessageTooLarge { attempted: 6, limit } if limit.get() == 5
    ));
    assert_eq!(buffer.completed(), "abc");
    assert_eq!(buffer.pending_len(), 0);
}

#[test]
fn message_size_cap_allows_exact_fit() {
    let mut buffer = buffer_with(ReassemblyLimits::default().with_max_message_bytes(nz(4)));
    buffer.ingest(&framed(1, "cd")).expect("held back");
    buffer.ingest(&framed(0, "ab")).expect("exactly at cap");
    assert_eq!(buffer.finalize().text(), "abcd");
}

#[test]
fn message_size_cap_applies_without_framing() {
    let parser = HeaderFrameParser::new(&FramingConfig::disabled()).expect("disabled framing");
    let mut buffer = ReassemblyBuffer::with_limits(
        parser,
        ReassemblyLimits::default().with_max_message_bytes(nz(3)),
    );
    buffer.ingest("ab").expect("within cap");
    buffer.ingest("cd").expect_err("over cap");
    assert_eq!(buffer.completed(), "ab");
}

#[test]
fn unindexed_chunks_are_rejected_by_default() {
    let mut buffer = buffer_with(ReassemblyLimits::default());
    buffer.ingest(&framed(0, "a")).expect("appended");

    let err = buffer.ingest(UNINDEXED).expect_err("no index");
    assert!(matches!(
        err,
        ReassemblyError::MissingIndex { expected } if expected == ChunkIndex::new(1)
    ));
    assert_eq!(buffer.completed(), "a");
}

#[test]
fn unindexed_chunks_take_next_position_when_configured() {
    let mut buffer =
        buffer_with(ReassemblyLimits::default().with_unindexed(UnindexedPolicy::NextInSequence));
    buffer.ingest(&framed(1, "-tail")).expect("held back");

    let outcome = buffer.ingest(UNINDEXED).expect("treated as index 0");
    assert_eq!(outcome, IngestOutcome::Appended { drained: 1 });
    assert_eq!(buffer.completed(), "free-tail");
}

#[test]
fn unindexed_chunks_are_discarded_when_configured() {
    let mut buffer = buffer_with(ReassemblyLimits::default().with_unindexed(UnindexedPolicy::Drop));
    assert_eq!(
        buffer.ingest(UNINDEXED).expect("dropped"),
        IngestOutcome::Dropped
    );
    buffer.ingest(&framed(0, "a")).expect("appended");
    assert!(buffer.is_open());
    assert_eq!(buffer.completed(), "a");
    assert_eq!(buffer.expected_index(), ChunkIndex::new(1));
}

#[test]
fn limits_deserialise_from_toml() {
    let limits: ReassemblyLimits = toml::from_str(
        r#"
        max_pending_chunks = 8
        max_message_bytes = 4096
        unindexed = "next-in-sequence"
        "#,
    )
    .expect("valid limits table");
    assert_eq!(
        limits,
        ReassemblyLimits::default()
            .with_max_pending_chunks(nz(8))
            .with_max_message_bytes(nz(4096))
            .with_unindexed(UnindexedPolicy::NextInSequence)
    );
}
