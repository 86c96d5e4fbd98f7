//! Chunk header metadata and its JSON representation.
//!
//! A header carries an optional [`ChunkIndex`] plus any other keys the sender
//! chose to include.

use serde_json::{Map, Number, Value};

use super::{ChunkIndex, FramingError};

/// JSON key carrying the chunk's logical position.
pub const INDEX_FIELD: &str = "index";

/// Metadata parsed from the header block of a single chunk.
///
/// Only `index` is interpreted. All other keys are kept verbatim in
/// [`fields`](Self::fields) so newer senders can add metadata without
/// breaking older receivers.
///
/// # Examples
///
/// ```
/// use serde_json::Value;
/// use wirestitch::framing::{ChunkIndex, Header};
///
/// let header = Header::from_json(r#"{"index":2,"source":"sensor-7"}"#).expect("valid header");
/// assert_eq!(header.index(), Some(ChunkIndex::new(2)));
/// assert_eq!(header.field("source"), Some(&Value::from("sensor-7")));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Header {
    index: Option<ChunkIndex>,
    fields: Map<String, Value>,
}

impl Header {
    /// Create a header carrying `index` and no other fields.
    #[must_use]
    pub fn new(index: Option<ChunkIndex>) -> Self {
        Self {
            index,
            fields: Map::new(),
        }
    }

    /// Attach an opaque field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    /// Position of the chunk in its message, if the sender supplied one.
    #[must_use]
    pub const fn index(&self) -> Option<ChunkIndex> { self.index }

    /// Replace the chunk position.
    pub fn set_index(&mut self, index: Option<ChunkIndex>) { self.index = index; }

    /// Fields other than a numeric `index`.
    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> { &self.fields }

    /// Look up a single opaque field.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> { self.fields.get(key) }

    /// Parse header text as a JSON object.
    ///
    /// A numeric `index` becomes [`index`](Self::index); an `index` of any
    /// other JSON type is left in [`fields`](Self::fields) and the header is
    /// treated as unindexed.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::MalformedHeader`] if `text` is not a JSON
    /// object and [`FramingError::InvalidIndex`] if `index` is a number that is
    /// not a non-negative whole value within `u32`. Whole floats such as `2.0`
    /// are accepted.
    pub fn from_json(text: &str) -> Result<Self, FramingError> {
        let mut fields: Map<String, Value> =
            serde_json::from_str(text).map_err(FramingError::MalformedHeader)?;
        let index = match fields.remove(INDEX_FIELD) {
            Some(Value::Number(value)) => Some(parse_index(value)?),
            Some(other) => {
                fields.insert(INDEX_FIELD.to_owned(), other);
                None
            }
            None => None,
        };
        Ok(Self { index, fields })
    }

    /// Serialise the header as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::Encode`] if serialisation fails.
    pub fn to_json(&self) -> Result<String, FramingError> {
        let mut object = self.fields.clone();
        if let Some(index) = self.index {
            object.insert(INDEX_FIELD.to_owned(), Value::from(index.get()));
        }
        serde_json::to_string(&object).map_err(FramingError::Encode)
    }
}

fn parse_index(value: Number) -> Result<ChunkIndex, FramingError> {
    let index = match value.as_u64() {
        Some(raw) => ChunkIndex::try_from(raw).ok(),
        None => value.as_f64().and_then(whole_index),
    };
    index.ok_or(FramingError::InvalidIndex { value })
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "value is checked to be a whole number within the u32 range"
)]
fn whole_index(raw: f64) -> Option<ChunkIndex> {
    (raw.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&raw))
        .then(|| ChunkIndex::new(raw as u32))
}
