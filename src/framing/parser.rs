//! Locates and decodes the header block at the front of a chunk.
//!
//! A framed chunk has the shape `open + JSON object + close + payload`. The
//! parser returns the decoded [`Header`] together with the byte offset at
//! which the payload begins, leaving the payload itself in the caller's
//! buffer.

use super::{Delimiters, Framing, FramingConfig, FramingError, Header};

/// Header and payload position extracted from one chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedFrame {
    header: Header,
    payload_offset: usize,
}

impl ParsedFrame {
    /// Construct a parsed frame.
    #[must_use]
    pub fn new(header: Header, payload_offset: usize) -> Self {
        Self {
            header,
            payload_offset,
        }
    }

    /// Borrow the decoded header.
    #[must_use]
    pub fn header(&self) -> &Header { &self.header }

    /// Consume the frame, returning the header.
    #[must_use]
    pub fn into_header(self) -> Header { self.header }

    /// Byte offset of the first payload byte within the source chunk.
    #[must_use]
    pub const fn payload_offset(&self) -> usize { self.payload_offset }

    /// Slice the payload out of the chunk this frame was parsed from.
    ///
    /// # Panics
    ///
    /// Panics if `chunk` is not the text this frame was parsed from.
    #[must_use]
    pub fn payload<'a>(&self, chunk: &'a str) -> &'a str { &chunk[self.payload_offset..] }
}

/// Header parser bound to a resolved framing mode.
///
/// Delimiters are resolved once, at construction, so configuration errors
/// surface before the first chunk is seen.
///
/// # Examples
///
/// ```
/// use wirestitch::framing::{ChunkIndex, FramingConfig, HeaderFrameParser};
///
/// let parser = HeaderFrameParser::new(&FramingConfig::default().with_open_delimiter("<msg>"))
///     .expect("derivable delimiters");
/// let chunk = r#"<msg>{"index":0}</msg>PAYLOAD"#;
/// let frame = parser
///     .parse(chunk)
///     .expect("well-formed chunk")
///     .expect("framing enabled");
/// assert_eq!(frame.header().index(), Some(ChunkIndex::zero()));
/// assert_eq!(frame.payload(chunk), "PAYLOAD");
/// ```
#[derive(Clone, Debug)]
pub struct HeaderFrameParser {
    framing: Framing,
}

impl HeaderFrameParser {
    /// Resolve `config` and build a parser.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnresolvedDelimiters`] or
    /// [`FramingError::EmptyDelimiter`] when the delimiters cannot be resolved.
    pub fn new(config: &FramingConfig) -> Result<Self, FramingError> {
        Ok(Self::from_framing(config.resolve()?))
    }

    /// Build a parser from an already resolved framing mode.
    #[must_use]
    pub fn from_framing(framing: Framing) -> Self { Self { framing } }

    /// The framing mode applied by this parser.
    #[must_use]
    pub fn framing(&self) -> &Framing { &self.framing }

    /// Report whether chunks are expected to carry a header.
    #[must_use]
    pub fn is_enabled(&self) -> bool { matches!(self.framing, Framing::Enabled(_)) }

    /// Parse the header at the front of `chunk`.
    ///
    /// Returns `Ok(None)` when framing is disabled; the whole chunk is then
    /// payload.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::MissingOpenDelimiter`] or
    /// [`FramingError::MissingCloseDelimiter`] when the header block cannot be
    /// located, [`FramingError::MalformedHeader`] when its contents are not a
    /// JSON object, and [`FramingError::InvalidIndex`] for an out-of-range
    /// numeric index.
    pub fn parse(&self, chunk: &str) -> Result<Option<ParsedFrame>, FramingError> {
        match &self.framing {
            Framing::Disabled => Ok(None),
            Framing::Enabled(delimiters) => parse_frame(chunk, delimiters).map(Some),
        }
    }
}

/// One-shot parse of `chunk` under `config`.
///
/// Prefer [`HeaderFrameParser`] when parsing many chunks with the same
/// configuration.
///
/// # Errors
///
/// Returns any [`FramingError`] raised while resolving `config` or parsing
/// the chunk.
pub fn parse(chunk: &str, config: &FramingConfig) -> Result<Option<ParsedFrame>, FramingError> {
    HeaderFrameParser::new(config)?.parse(chunk)
}

fn parse_frame(chunk: &str, delimiters: &Delimiters) -> Result<ParsedFrame, FramingError> {
    let open = delimiters.open();
    let close = delimiters.close();
    let Some(rest) = chunk.strip_prefix(open) else {
        return Err(FramingError::MissingOpenDelimiter {
            open: open.to_owned(),
        });
    };
    let Some(inner_len) = rest.find(close) else {
        return Err(FramingError::MissingCloseDelimiter {
            close: close.to_owned(),
        });
    };
    let header = Header::from_json(&rest[..inner_len])?;
    let header_inner_end = open.len() + inner_len;
    Ok(ParsedFrame::new(header, header_inner_end + close.len()))
}
