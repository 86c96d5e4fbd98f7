//! Per-stream buffer that stitches framed chunks back into one message.
//!
//! [`ReassemblyBuffer`] owns the state of a single logical stream: the text
//! completed so far, the next index it expects, and any chunks that arrived
//! ahead of that index. Each [`ingest`](ReassemblyBuffer::ingest) either
//! appends a chunk (then drains whatever pending chunks became contiguous) or
//! holds it back. The buffer never rewrites completed text and consumes each
//! index at most once.

use std::{cmp::Ordering, collections::BTreeMap};

use super::{
    ReassemblyError,
    ReassemblyLimits,
    UnindexedPolicy,
    limits::{check_pending_capacity, check_size_limit},
};
use crate::framing::{ChunkIndex, HeaderFrameParser};

/// Lifecycle of a [`ReassemblyBuffer`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferState {
    /// Accepting chunks.
    Open,
    /// An ingest failed; no further chunks are accepted.
    Closed,
}

/// Result of a successful [`ReassemblyBuffer::ingest`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The chunk was appended, followed by `drained` pending chunks.
    Appended {
        /// Number of held-back chunks that became contiguous.
        drained: usize,
    },
    /// The chunk arrived ahead of its turn and is held back.
    Buffered {
        /// Index of the held chunk.
        index: ChunkIndex,
    },
    /// The chunk had no index and was discarded under
    /// [`UnindexedPolicy::Drop`].
    Dropped,
}

/// Message produced by [`ReassemblyBuffer::finalize`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReassembledMessage {
    text: String,
    chunks: usize,
    stranded: Vec<ChunkIndex>,
}

impl ReassembledMessage {
    /// Construct a message from its parts.
    #[must_use]
    pub fn new(text: String, chunks: usize, stranded: Vec<ChunkIndex>) -> Self {
        Self {
            text,
            chunks,
            stranded,
        }
    }

    /// Borrow the reassembled text.
    #[must_use]
    pub fn text(&self) -> &str { &self.text }

    /// Consume the message, returning the owned text.
    #[must_use]
    pub fn into_text(self) -> String { self.text }

    /// Number of chunks that contributed to the text.
    #[must_use]
    pub const fn chunks(&self) -> usize { self.chunks }

    /// Indices still pending at finalize time, in ascending order.
    ///
    /// These chunks never became contiguous and are absent from
    /// [`text`](Self::text).
    #[must_use]
    pub fn stranded(&self) -> &[ChunkIndex] { &self.stranded }

    /// Whether every received chunk made it into the text.
    #[must_use]
    pub fn is_complete(&self) -> bool { self.stranded.is_empty() }
}

/// Reorders framed chunks of one stream by their header index.
///
/// # Examples
///
/// ```
/// use wirestitch::{
///     framing::{FramingConfig, HeaderFrameParser},
///     reassembly::ReassemblyBuffer,
/// };
///
/// let parser = HeaderFrameParser::new(
///     &FramingConfig::default()
///         .with_open_delimiter("<h>")
///         .with_close_delimiter("</h>"),
/// )
/// .expect("delimiters resolve");
/// let mut buffer = ReassemblyBuffer::new(parser);
/// buffer
///     .ingest(r#"<h>{"index":1}</h>World"#)
///     .expect("held back");
/// buffer
///     .ingest(r#"<h>{"index":0}</h>Hello "#)
///     .expect("appended and drained");
/// assert_eq!(buffer.finalize().text(), "Hello World");
/// ```
#[derive(Debug)]
pub struct ReassemblyBuffer {
    parser: HeaderFrameParser,
    limits: ReassemblyLimits,
    state: BufferState,
    completed: String,
    expected: ChunkIndex,
    pending: BTreeMap<ChunkIndex, String>,
    pending_bytes: usize,
    appended: usize,
}

impl ReassemblyBuffer {
    /// Create a buffer with default [`ReassemblyLimits`].
    #[must_use]
    pub fn new(parser: HeaderFrameParser) -> Self {
        Self::with_limits(parser, ReassemblyLimits::default())
    }

    /// Create a buffer enforcing `limits`.
    #[must_use]
    pub fn with_limits(parser: HeaderFrameParser, limits: ReassemblyLimits) -> Self {
        Self {
            parser,
            limits,
            state: BufferState::Open,
            completed: String::new(),
            expected: ChunkIndex::zero(),
            pending: BTreeMap::new(),
            pending_bytes: 0,
            appended: 0,
        }
    }

    /// Feed one chunk into the buffer.
    ///
    /// With framing disabled the chunk is appended verbatim. Otherwise its
    /// header is parsed and the payload is appended when its index is the
    /// expected one, or held back when it arrives early.
    ///
    /// On error nothing is appended and the buffer moves to
    /// [`BufferState::Closed`].
    ///
    /// # Errors
    ///
    /// Returns [`ReassemblyError::Framing`] for unparseable headers,
    /// [`ReassemblyError::MissingIndex`] for unindexed chunks under
    /// [`UnindexedPolicy::Reject`], [`ReassemblyError::StaleIndex`] or
    /// [`ReassemblyError::DuplicateIndex`] for repeated indices,
    /// [`ReassemblyError::PendingLimitExceeded`] or
    /// [`ReassemblyError::MessageTooLarge`] when a limit would be exceeded,
    /// [`ReassemblyError::IndexOverflow`] for `u32::MAX`, and
    /// [`ReassemblyError::Closed`] once the buffer is closed.
    pub fn ingest(&mut self, chunk: &str) -> Result<IngestOutcome, ReassemblyError> {
        if self.state == BufferState::Closed {
            return Err(ReassemblyError::Closed);
        }
        let result = self.ingest_open(chunk);
        if result.is_err() {
            self.state = BufferState::Closed;
        }
        result
    }

    /// Consume the buffer, yielding the text completed so far.
    ///
    /// Pending chunks that never became contiguous are not part of the text;
    /// their indices are reported by [`ReassembledMessage::stranded`].
    #[must_use]
    pub fn finalize(self) -> ReassembledMessage {
        let stranded = self.pending.into_keys().collect();
        ReassembledMessage::new(self.completed, self.appended, stranded)
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> BufferState { self.state }

    /// Whether the buffer still accepts chunks.
    #[must_use]
    pub fn is_open(&self) -> bool { self.state == BufferState::Open }

    /// Text appended so far, in logical order.
    #[must_use]
    pub fn completed(&self) -> &str { &self.completed }

    /// Index the buffer will append next.
    #[must_use]
    pub const fn expected_index(&self) -> ChunkIndex { self.expected }

    /// Number of chunks held back.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.pending.len() }

    /// Indices held back, in ascending order.
    pub fn pending_indices(&self) -> impl Iterator<Item = ChunkIndex> + '_ {
        self.pending.keys().copied()
    }

    /// Completed plus pending payload bytes.
    #[must_use]
    pub fn buffered_bytes(&self) -> usize { self.completed.len() + self.pending_bytes }

    /// Limits enforced by this buffer.
    #[must_use]
    pub const fn limits(&self) -> &ReassemblyLimits { &self.limits }

    fn ingest_open(&mut self, chunk: &str) -> Result<IngestOutcome, ReassemblyError> {
        let Some(frame) = self.parser.parse(chunk)? else {
            check_size_limit(
                self.limits.max_message_bytes,
                self.buffered_bytes(),
                chunk.len(),
            )?;
            self.completed.push_str(chunk);
            self.appended += 1;
            return Ok(IngestOutcome::Appended { drained: 0 });
        };
        let payload = frame.payload(chunk);

        let index = match (frame.header().index(), self.limits.unindexed) {
            (Some(index), _) => index,
            (None, UnindexedPolicy::Reject) => {
                return Err(ReassemblyError::MissingIndex {
                    expected: self.expected,
                });
            }
            (None, UnindexedPolicy::NextInSequence) => self.expected,
            (None, UnindexedPolicy::Drop) => return Ok(IngestOutcome::Dropped),
        };

        if index.checked_increment().is_none() {
            return Err(ReassemblyError::IndexOverflow { last: index });
        }

        match index.cmp(&self.expected) {
            Ordering::Less => Err(ReassemblyError::StaleIndex {
                index,
                expected: self.expected,
            }),
            Ordering::Equal => {
                check_size_limit(
                    self.limits.max_message_bytes,
                    self.buffered_bytes(),
                    payload.len(),
                )?;
                self.append(payload)?;
                let drained = self.drain_contiguous()?;
                Ok(IngestOutcome::Appended { drained })
            }
            Ordering::Greater => {
                if self.pending.contains_key(&index) {
                    return Err(ReassemblyError::DuplicateIndex { index });
                }
                check_pending_capacity(self.limits.max_pending_chunks, self.pending.len(), index)?;
                check_size_limit(
                    self.limits.max_message_bytes,
                    self.buffered_bytes(),
                    payload.len(),
                )?;
                self.pending_bytes += payload.len();
                self.pending.insert(index, payload.to_owned());
                Ok(IngestOutcome::Buffered { index })
            }
        }
    }

    /// Append `payload` as the expected chunk and advance the cursor.
    fn append(&mut self, payload: &str) -> Result<(), ReassemblyError> {
        let next = self
            .expected
            .checked_increment()
            .ok_or(ReassemblyError::IndexOverflow {
                last: self.expected,
            })?;
        self.completed.push_str(payload);
        self.expected = next;
        self.appended += 1;
        Ok(())
    }

    /// Move pending chunks into the message while they are contiguous with
    /// the cursor. Returns how many were moved.
    fn drain_contiguous(&mut self) -> Result<usize, ReassemblyError> {
        let mut drained = 0;
        while let Some(payload) = self.pending.remove(&self.expected) {
            self.pending_bytes -= payload.len();
            self.append(&payload)?;
            drained += 1;
        }
        Ok(drained)
    }
}
