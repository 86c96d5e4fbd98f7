#![doc(html_root_url = "https://docs.rs/wirestitch/latest")]
//! Public API for the `wirestitch` library.
//!
//! A sender splits a text message into chunks, each prefixed with a small
//! delimited JSON header carrying the chunk's position:
//!
//! ```text
//! <header>{"index":1}</header> World
//! <header>{"index":0}</header>Hello
//! ```
//!
//! Chunks may arrive in any order. A [`ReassemblyBuffer`] bound to one stream
//! appends each payload once every earlier index has arrived, and yields the
//! message when the stream ends. Framing can also be disabled, in which case
//! chunks are concatenated as they arrive.
//!
//! ```
//! use wirestitch::{FramingConfig, HeaderFrameParser, ReassemblyBuffer};
//!
//! let parser = HeaderFrameParser::new(&FramingConfig::default()).expect("default delimiters");
//! let mut buffer = ReassemblyBuffer::new(parser);
//! buffer
//!     .ingest(r#"<header>{"index":1}</header> World"#)
//!     .expect("held back");
//! buffer
//!     .ingest(r#"<header>{"index":0}</header>Hello"#)
//!     .expect("appended");
//! assert_eq!(buffer.finalize().text(), "Hello World");
//! ```
//!
//! The [`server`] module accepts TCP connections, treating each connection
//! as one stream, and hands completed messages to a [`CompletionSink`].

pub mod codec;
pub mod framing;
pub mod metrics;
pub mod panic;
pub mod reassembly;
pub mod server;
pub mod settings;
pub mod sink;

pub use codec::ChunkDecoder;
pub use framing::{
    ChunkIndex,
    Chunker,
    Delimiters,
    FramingConfig,
    FramingError,
    Header,
    HeaderFrameParser,
    encode_frame,
};
pub use metrics::{CHUNKS_INGESTED, CONNECTIONS_ACTIVE, MESSAGES_COMPLETED, STREAM_ERRORS};
pub use reassembly::{
    IngestOutcome,
    ReassembledMessage,
    ReassemblyBuffer,
    ReassemblyError,
    ReassemblyLimits,
    UnindexedPolicy,
};
pub use server::{ReassemblyServer, ServerError, StreamError};
pub use settings::{ConfigError, Settings};
pub use sink::{ChannelSink, CompletedMessage, CompletionSink, DeliveryError};
