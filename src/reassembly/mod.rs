//! Reordering of framed chunks into complete messages.
//!
//! A [`ReassemblyBuffer`] is bound to exactly one stream. It is driven
//! serially by that stream's owner, so it needs no locking, and it is never
//! shared between streams. Limits on held-back chunks live in
//! [`ReassemblyLimits`].

pub mod buffer;
pub mod error;
pub mod limits;

pub use buffer::{BufferState, IngestOutcome, ReassembledMessage, ReassemblyBuffer};
pub use error::ReassemblyError;
pub use limits::{DEFAULT_MAX_PENDING_CHUNKS, ReassemblyLimits, UnindexedPolicy};
