//! Errors surfaced by [`ReassemblyBuffer::ingest`](super::ReassemblyBuffer::ingest).

use std::num::NonZeroUsize;

use thiserror::Error;

use crate::framing::{ChunkIndex, FramingError};

/// Errors produced while ingesting a chunk.
///
/// Every error closes the buffer that raised it; the stream should be
/// abandoned by its owner.
#[derive(Debug, Error)]
pub enum ReassemblyError {
    /// The chunk's header could not be located or decoded.
    #[error("framing error: {0}")]
    Framing(#[from] FramingError),
    /// A framed chunk carried no numeric index.
    #[error("chunk header has no index (expected {expected})")]
    MissingIndex {
        /// Index the buffer was waiting for.
        expected: ChunkIndex,
    },
    /// The index was already appended to the message.
    #[error("chunk index {index} was already consumed (expected {expected})")]
    StaleIndex {
        /// Index carried by the late chunk.
        index: ChunkIndex,
        /// Index the buffer was waiting for.
        expected: ChunkIndex,
    },
    /// A chunk with this index is already held back.
    #[error("chunk index {index} is already buffered")]
    DuplicateIndex {
        /// Index carried by both chunks.
        index: ChunkIndex,
    },
    /// Holding the chunk would exceed the out-of-order capacity.
    #[error("cannot buffer chunk {index}: {limit} chunks already pending")]
    PendingLimitExceeded {
        /// Index of the rejected chunk.
        index: ChunkIndex,
        /// Configured pending capacity.
        limit: NonZeroUsize,
    },
    /// Accepting the chunk would grow the message past the byte cap.
    #[error("message exceeds size limit: {attempted} bytes > {limit} bytes")]
    MessageTooLarge {
        /// Completed plus pending bytes had the chunk been accepted.
        attempted: usize,
        /// Configured byte cap.
        limit: NonZeroUsize,
    },
    /// The index leaves no room for a successor.
    #[error("chunk index overflow at {last}")]
    IndexOverflow {
        /// Offending index.
        last: ChunkIndex,
    },
    /// The buffer was closed by an earlier error.
    #[error("reassembly buffer is closed")]
    Closed,
}
