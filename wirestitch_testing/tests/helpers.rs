//! Integration coverage for `wirestitch_testing` helpers.

use std::io;

use rstest::rstest;
use tokio::io::AsyncReadExt;
use wirestitch::framing::{FramingConfig, HeaderFrameParser};
use wirestitch_testing::{ScriptedReader, frames::split_framed, framed, unindexed};

#[rstest]
#[case(0, "Hello")]
#[case(7, "é")]
fn framed_text_parses_with_default_delimiters(#[case] index: u32, #[case] payload: &str) {
    let parser = HeaderFrameParser::new(&FramingConfig::default()).expect("default framing");
    let chunk = framed(index, payload);
    let frame = parser
        .parse(&chunk)
        .expect("valid frame")
        .expect("framing enabled");
    assert_eq!(frame.header().index().map(u32::from), Some(index));
    assert_eq!(frame.payload(&chunk), payload);
}

#[test]
fn unindexed_frame_has_no_index() {
    let parser = HeaderFrameParser::new(&FramingConfig::default()).expect("default framing");
    let chunk = unindexed("x");
    let frame = parser
        .parse(&chunk)
        .expect("valid frame")
        .expect("framing enabled");
    assert!(frame.header().index().is_none());
}

#[test]
fn split_framed_covers_the_whole_message() {
    let chunks = split_framed("Hello World", 4);
    assert_eq!(chunks.len(), 4);
    assert_eq!(chunks[0], framed(0, "Hel"));
    assert_eq!(chunks[3], framed(3, "ld"));
}

#[tokio::test]
async fn scripted_reader_splits_oversized_segments() {
    let mut reader = ScriptedReader::new(["abcdef"]);
    let mut buf = [0u8; 4];
    assert_eq!(reader.read(&mut buf).await.expect("first part"), 4);
    assert_eq!(&buf, b"abcd");
    assert_eq!(reader.read(&mut buf).await.expect("second part"), 2);
    assert_eq!(&buf[..2], b"ef");
    assert_eq!(reader.read(&mut buf).await.expect("eof"), 0);
}

#[tokio::test]
async fn scripted_reader_reports_configured_failure() {
    let mut reader = ScriptedReader::new(["ab"]).failing_with(io::ErrorKind::ConnectionReset);
    let mut buf = [0u8; 8];
    assert_eq!(reader.read(&mut buf).await.expect("segment"), 2);
    let err = reader.read(&mut buf).await.expect_err("scripted failure");
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
}
