//! Deterministic [`AsyncRead`] for exercising chunk boundaries.

use std::{
    collections::VecDeque,
    io,
    pin::Pin,
    task::{Context, Poll},
};

use tokio::io::{AsyncRead, ReadBuf};

/// Reader yielding each scripted segment from a separate `poll_read`.
///
/// TCP may coalesce or split writes, so tests that depend on one read per
/// chunk drive the connection logic with this reader instead of a socket.
/// A segment larger than the caller's buffer is delivered across several
/// reads. After the last segment the reader reports EOF, or the configured
/// error.
///
/// ```rust
/// use tokio::io::AsyncReadExt;
/// use wirestitch_testing::ScriptedReader;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let mut reader = ScriptedReader::new(["ab", "cd"]);
/// let mut buf = [0u8; 8];
/// assert_eq!(reader.read(&mut buf).await.expect("first read"), 2);
/// assert_eq!(reader.read(&mut buf).await.expect("second read"), 2);
/// assert_eq!(reader.read(&mut buf).await.expect("eof"), 0);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct ScriptedReader {
    segments: VecDeque<Vec<u8>>,
    failure: Option<io::ErrorKind>,
}

impl ScriptedReader {
    /// Script the given segments followed by EOF.
    pub fn new<I, T>(segments: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self {
            segments: segments
                .into_iter()
                .map(|segment| segment.as_ref().to_vec())
                .collect(),
            failure: None,
        }
    }

    /// Fail with `kind` instead of reporting EOF once the segments run out.
    #[must_use]
    pub fn failing_with(mut self, kind: io::ErrorKind) -> Self {
        self.failure = Some(kind);
        self
    }

    /// Segments not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.segments.len() }
}

impl AsyncRead for ScriptedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let Some(mut segment) = this.segments.pop_front() else {
            return Poll::Ready(match this.failure.take() {
                Some(kind) => Err(io::Error::new(kind, "scripted read failure")),
                None => Ok(()),
            });
        };
        let take = segment.len().min(buf.remaining());
        buf.put_slice(&segment[..take]);
        if take < segment.len() {
            this.segments.push_front(segment.split_off(take));
        }
        Poll::Ready(Ok(()))
    }
}
