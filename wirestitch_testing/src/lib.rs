//! Test utilities for `wirestitch`.
//!
//! Frame builders produce wire text without going through the library's own
//! encoder, [`ScriptedReader`] replays an exact sequence of reads so chunk
//! boundaries are deterministic, and the TCP helpers start a server with a
//! channel sink and send whole streams to it.
//!
//! ```rust
//! use wirestitch_testing::{framed, framed_with};
//!
//! assert_eq!(framed(0, "Hello"), r#"<header>{"index":0}</header>Hello"#);
//! assert_eq!(framed_with("<m>", "</m>", 3, "x"), r#"<m>{"index":3}</m>x"#);
//! ```

pub mod frames;
pub mod reader;
pub mod tcp;

pub use frames::{CLOSE, OPEN, framed, framed_with, unindexed};
pub use reader::ScriptedReader;
pub use tcp::{
    ChannelServer,
    TestResult,
    send_chunks,
    send_message,
    spawn_channel_server,
    unused_listener,
};
