//! Turns raw socket reads into text chunks.
//!
//! Every read delivered by the transport becomes one chunk, matching the
//! "one delivery event, one frame" contract of the framing layer. Reads that
//! end inside a multi-byte UTF-8 sequence keep the incomplete tail buffered
//! and prepend it to the next chunk.

use std::{io, str};

use bytes::BytesMut;
use tokio_util::codec::Decoder;

/// [`Decoder`] yielding each batch of buffered bytes as a `String`.
///
/// # Examples
///
/// ```
/// use bytes::BytesMut;
/// use tokio_util::codec::Decoder;
/// use wirestitch::codec::ChunkDecoder;
///
/// let mut decoder = ChunkDecoder;
/// let mut buf = BytesMut::from(&b"caf\xC3"[..]);
/// assert_eq!(decoder.decode(&mut buf).expect("valid prefix").as_deref(), Some("caf"));
/// buf.extend_from_slice(b"\xA9!");
/// assert_eq!(decoder.decode(&mut buf).expect("completed").as_deref(), Some("é!"));
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ChunkDecoder;

impl Decoder for ChunkDecoder {
    type Item = String;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if src.is_empty() {
            return Ok(None);
        }
        let valid_len = match str::from_utf8(src) {
            Ok(text) => text.len(),
            // An incomplete trailing sequence has no error length.
            Err(err) if err.error_len().is_none() => err.valid_up_to(),
            Err(err) => return Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        };
        if valid_len == 0 {
            return Ok(None);
        }
        let bytes = src.split_to(valid_len);
        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(chunk) => Ok(Some(chunk)),
            None if src.is_empty() => Ok(None),
            None => Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("stream ended inside a UTF-8 sequence ({} bytes)", src.len()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use bytes::BytesMut;
    use rstest::rstest;
    use tokio_util::codec::Decoder;

    use super::ChunkDecoder;

    #[test]
    fn whole_buffer_becomes_one_chunk() {
        let mut buf = BytesMut::from("<header>{\"index\":0}</header>abc");
        let chunk = ChunkDecoder.decode(&mut buf).expect("valid utf-8");
        assert_eq!(
            chunk.as_deref(),
            Some("<header>{\"index\":0}</header>abc")
        );
        assert!(buf.is_empty());
        assert!(ChunkDecoder.decode(&mut buf).expect("empty").is_none());
    }

    #[test]
    fn lone_partial_sequence_waits_for_more_bytes() {
        let mut buf = BytesMut::from(&b"\xE2\x82"[..]);
        assert!(ChunkDecoder.decode(&mut buf).expect("incomplete").is_none());
        assert_eq!(buf.len(), 2);
        buf.extend_from_slice(b"\xAC");
        assert_eq!(
            ChunkDecoder.decode(&mut buf).expect("complete").as_deref(),
            Some("€")
        );
    }

    #[rstest]
    #[case(&b"ab\xFFcd"[..])]
    #[case(&b"\xC3\x28"[..])]
    fn invalid_utf8_is_rejected(#[case] bytes: &[u8]) {
        let mut buf = BytesMut::from(bytes);
        let err = ChunkDecoder.decode(&mut buf).expect_err("invalid utf-8");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn eof_inside_sequence_is_an_error() {
        let mut buf = BytesMut::from(&b"ok\xF0\x9F"[..]);
        assert_eq!(
            ChunkDecoder.decode_eof(&mut buf).expect("prefix").as_deref(),
            Some("ok")
        );
        let err = ChunkDecoder
            .decode_eof(&mut buf)
            .expect_err("dangling bytes at eof");
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn clean_eof_yields_nothing() {
        let mut buf = BytesMut::new();
        assert!(ChunkDecoder.decode_eof(&mut buf).expect("clean").is_none());
    }
}
