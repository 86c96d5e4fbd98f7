//! Header framing for text chunks.
//!
//! Each framed chunk starts with a delimited JSON header whose `index` gives
//! the chunk's position in the logical message. This module resolves the
//! delimiters, parses headers off inbound chunks, and renders outbound frames.
//! Reordering lives in [`crate::reassembly`].

pub mod chunker;
pub mod config;
pub mod error;
mod header;
pub mod index;
pub mod parser;

pub use chunker::{Chunker, FramedChunk, encode_frame};
pub use config::{
    DEFAULT_CLOSE_DELIMITER,
    DEFAULT_OPEN_DELIMITER,
    Delimiters,
    Framing,
    FramingConfig,
    derive_close_tag,
};
pub use error::FramingError;
pub use header::{Header, INDEX_FIELD};
pub use index::ChunkIndex;
pub use parser::{HeaderFrameParser, ParsedFrame, parse};
