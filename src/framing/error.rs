//! Errors emitted while resolving framing settings or parsing chunk headers.

use thiserror::Error;

/// Errors produced by [`HeaderFrameParser`](super::HeaderFrameParser) and the
/// frame encoder.
#[derive(Debug, Error)]
pub enum FramingError {
    /// Framing is enabled but no closing delimiter was given and none could be
    /// derived from the opening delimiter.
    #[error("cannot derive a close delimiter from open delimiter {open:?}")]
    UnresolvedDelimiters {
        /// Opening delimiter that failed to yield a closing counterpart.
        open: String,
    },
    /// A configured delimiter is the empty string.
    #[error("framing delimiters must not be empty")]
    EmptyDelimiter,
    /// The chunk does not begin with the opening delimiter.
    #[error("chunk does not start with open delimiter {open:?}")]
    MissingOpenDelimiter {
        /// Expected opening delimiter.
        open: String,
    },
    /// The closing delimiter never appears after the opening delimiter.
    #[error("chunk has no close delimiter {close:?}")]
    MissingCloseDelimiter {
        /// Expected closing delimiter.
        close: String,
    },
    /// The header text is not a JSON object.
    #[error("malformed header: {0}")]
    MalformedHeader(#[source] serde_json::Error),
    /// The header carries a numeric `index` that is not a `u32` ordinal.
    #[error("header index {value} is not a valid chunk index")]
    InvalidIndex {
        /// Raw JSON number found in the header.
        value: serde_json::Number,
    },
    /// The message needs more chunks than a `u32` index can number.
    #[error("chunk position {position} exceeds the u32 index space")]
    IndexOverflow {
        /// Zero-based position of the first chunk that cannot be indexed.
        position: usize,
    },
    /// Serialising a header for an outbound frame failed.
    #[error("failed to encode header: {0}")]
    Encode(#[source] serde_json::Error),
}
