//! Outbound helper that splits text messages into framed chunks.
//!
//! [`Chunker`] produces the wire form a receiver expects: one frame per chunk,
//! each starting with a delimited JSON header whose `index` counts up from
//! zero. Payloads are split on `char` boundaries so every chunk is valid
//! UTF-8 on its own.

use std::num::NonZeroUsize;

use serde_json::Value;

use super::{ChunkIndex, Delimiters, FramingError, Header};

/// Render one frame: `open + header JSON + close + payload`.
///
/// # Examples
///
/// ```
/// use wirestitch::framing::{ChunkIndex, Delimiters, Header, encode_frame};
///
/// let delimiters = Delimiters::new("<h>", "</h>").expect("non-empty delimiters");
/// let frame = encode_frame(&delimiters, &Header::new(Some(ChunkIndex::new(1))), "World")
///     .expect("header encodes");
/// assert_eq!(frame, r#"<h>{"index":1}</h>World"#);
/// ```
///
/// # Errors
///
/// Returns [`FramingError::Encode`] if the header cannot be serialised.
pub fn encode_frame(
    delimiters: &Delimiters,
    header: &Header,
    payload: &str,
) -> Result<String, FramingError> {
    let json = header.to_json()?;
    let mut frame = String::with_capacity(
        delimiters.open().len() + json.len() + delimiters.close().len() + payload.len(),
    );
    frame.push_str(delimiters.open());
    frame.push_str(&json);
    frame.push_str(delimiters.close());
    frame.push_str(payload);
    Ok(frame)
}

/// A rendered outbound chunk and the index it carries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FramedChunk {
    index: ChunkIndex,
    text: String,
}

impl FramedChunk {
    /// Index written into the chunk's header.
    #[must_use]
    pub const fn index(&self) -> ChunkIndex { self.index }

    /// Borrow the rendered frame.
    #[must_use]
    pub fn as_str(&self) -> &str { &self.text }

    /// Consume the chunk, returning the rendered frame.
    #[must_use]
    pub fn into_string(self) -> String { self.text }
}

/// Splits messages into indexed frames.
#[derive(Clone, Debug)]
pub struct Chunker {
    delimiters: Delimiters,
    max_payload_bytes: NonZeroUsize,
    extra: Header,
}

impl Chunker {
    /// Create a chunker that caps each chunk's payload at `max_payload_bytes`.
    ///
    /// A single character wider than the cap is still emitted whole.
    #[must_use]
    pub fn new(delimiters: Delimiters, max_payload_bytes: NonZeroUsize) -> Self {
        Self {
            delimiters,
            max_payload_bytes,
            extra: Header::default(),
        }
    }

    /// Add an opaque field to every header this chunker writes.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra = self.extra.with_field(key, value);
        self
    }

    /// Return the payload cap in bytes.
    #[must_use]
    pub const fn max_payload_bytes(&self) -> NonZeroUsize { self.max_payload_bytes }

    /// Split `message` into frames indexed from zero.
    ///
    /// An empty message yields a single frame with an empty payload.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::Encode`] if a header cannot be serialised and
    /// [`FramingError::IndexOverflow`] if the message needs more chunks than a
    /// `u32` index can number.
    pub fn chunk(&self, message: &str) -> Result<Vec<FramedChunk>, FramingError> {
        let pieces = split_on_char_boundaries(message, self.max_payload_bytes.get());
        pieces
            .into_iter()
            .enumerate()
            .map(|(position, payload)| {
                let index = frame_index(position)?;
                let mut header = self.extra.clone();
                header.set_index(Some(index));
                let text = encode_frame(&self.delimiters, &header, payload)?;
                Ok(FramedChunk { index, text })
            })
            .collect()
    }
}

fn frame_index(position: usize) -> Result<ChunkIndex, FramingError> {
    ChunkIndex::try_from(position).map_err(|_| FramingError::IndexOverflow { position })
}

fn split_on_char_boundaries(message: &str, max: usize) -> Vec<&str> {
    if message.is_empty() {
        return vec![message];
    }
    let mut pieces = Vec::with_capacity(message.len().div_ceil(max));
    let mut rest = message;
    while !rest.is_empty() {
        let mut end = max.min(rest.len());
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (piece, tail) = rest.split_at(end);
        pieces.push(piece);
        rest = tail;
    }
    pieces
}
