//! Tests for outbound frame rendering.

use std::num::NonZeroUsize;

use serde_json::Value;

use crate::framing::{
    ChunkIndex,
    Chunker,
    Delimiters,
    FramingConfig,
    Header,
    HeaderFrameParser,
    encode_frame,
};

fn nz(value: usize) -> NonZeroUsize { NonZeroUsize::new(value).expect("non-zero") }

#[test]
fn encoded_frame_parses_back_with_same_delimiters() {
    let delimiters = Delimiters::new("<h>", "</h>").expect("valid delimiters");
    let header = Header::new(Some(ChunkIndex::new(5))).with_field("origin", "test");
    let frame = encode_frame(&delimiters, &header, "body").expect("encodes");

    let parser = HeaderFrameParser::new(
        &FramingConfig::default()
            .with_open_delimiter("<h>")
            .with_close_delimiter("</h>"),
    )
    .expect("resolves");
    let parsed = parser
        .parse(&frame)
        .expect("parses")
        .expect("framing enabled");
    assert_eq!(parsed.header(), &header);
    assert_eq!(parsed.payload(&frame), "body");
}

#[test]
fn chunker_indexes_from_zero() {
    let chunker = Chunker::new(Delimiters::default(), nz(4));
    let chunks = chunker.chunk("Hello World").expect("chunks");

    let indices: Vec<u32> = chunks.iter().map(|c| c.index().get()).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(
        chunks[0].as_str(),
        "<header>{\"index\":0}</header>Hell"
    );
    assert_eq!(
        chunks[2].clone().into_string(),
        "<header>{\"index\":2}</header>rld"
    );
}

#[test]
fn empty_message_yields_single_empty_chunk() {
    let chunks = Chunker::new(Delimiters::default(), nz(8))
        .chunk("")
        .expect("chunks");
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].as_str(), "<header>{\"index\":0}</header>");
}

#[test]
fn chunker_copies_extra_fields_into_every_header() {
    let chunker = Chunker::new(Delimiters::default(), nz(2)).with_field("stream", 9);
    let parser = HeaderFrameParser::new(&FramingConfig::default()).expect("resolves");
    for chunk in chunker.chunk("abcd").expect("chunks") {
        let frame = parser
            .parse(chunk.as_str())
            .expect("parses")
            .expect("framing enabled");
        assert_eq!(frame.header().field("stream"), Some(&Value::from(9)));
        assert_eq!(frame.header().index(), Some(chunk.index()));
    }
}
