//! Resource bounds and policies applied while buffering chunks.
//!
//! Out-of-order chunks are held in memory until their turn. Without a bound a
//! peer could send indices that never become contiguous and grow the pending
//! map for the life of the connection, so both the number of held chunks and
//! the total message size are capped here.

use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use super::ReassemblyError;
use crate::framing::ChunkIndex;

/// Pending capacity used when none is configured.
pub const DEFAULT_MAX_PENDING_CHUNKS: usize = 1024;

/// What to do with a framed chunk whose header has no numeric `index`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnindexedPolicy {
    /// Fail the ingest with [`ReassemblyError::MissingIndex`].
    #[default]
    Reject,
    /// Treat the chunk as carrying the currently expected index.
    NextInSequence,
    /// Discard the chunk without touching the message.
    Drop,
}

/// Bounds applied by a [`ReassemblyBuffer`](super::ReassemblyBuffer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReassemblyLimits {
    /// Maximum number of out-of-order chunks held at once.
    pub max_pending_chunks: NonZeroUsize,
    /// Cap on completed plus pending payload bytes.
    pub max_message_bytes: Option<NonZeroUsize>,
    /// Handling for framed chunks without an index.
    pub unindexed: UnindexedPolicy,
}

impl Default for ReassemblyLimits {
    fn default() -> Self {
        Self {
            max_pending_chunks: NonZeroUsize::new(DEFAULT_MAX_PENDING_CHUNKS)
                .unwrap_or(NonZeroUsize::MIN),
            max_message_bytes: None,
            unindexed: UnindexedPolicy::default(),
        }
    }
}

impl ReassemblyLimits {
    /// Override the pending capacity.
    #[must_use]
    pub fn with_max_pending_chunks(mut self, limit: NonZeroUsize) -> Self {
        self.max_pending_chunks = limit;
        self
    }

    /// Cap the message size.
    #[must_use]
    pub fn with_max_message_bytes(mut self, limit: NonZeroUsize) -> Self {
        self.max_message_bytes = Some(limit);
        self
    }

    /// Choose how unindexed chunks are handled.
    #[must_use]
    pub fn with_unindexed(mut self, policy: UnindexedPolicy) -> Self {
        self.unindexed = policy;
        self
    }
}

/// Check whether adding `additional` bytes to `current` would exceed `limit`.
///
/// # Errors
///
/// Returns [`ReassemblyError::MessageTooLarge`] when the new total is over the
/// cap.
pub(super) fn check_size_limit(
    limit: Option<NonZeroUsize>,
    current: usize,
    additional: usize,
) -> Result<(), ReassemblyError> {
    let Some(limit) = limit else {
        return Ok(());
    };
    let attempted = current.saturating_add(additional);
    if attempted > limit.get() {
        return Err(ReassemblyError::MessageTooLarge { attempted, limit });
    }
    Ok(())
}

/// Check whether another chunk may be held back.
///
/// # Errors
///
/// Returns [`ReassemblyError::PendingLimitExceeded`] when `pending` already
/// holds `limit` chunks.
pub(super) fn check_pending_capacity(
    limit: NonZeroUsize,
    pending: usize,
    index: ChunkIndex,
) -> Result<(), ReassemblyError> {
    if pending >= limit.get() {
        return Err(ReassemblyError::PendingLimitExceeded { index, limit });
    }
    Ok(())
}
