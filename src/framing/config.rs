//! Framing configuration and delimiter resolution.

use serde::{Deserialize, Serialize};

use super::FramingError;

/// Opening delimiter used when none is configured.
pub const DEFAULT_OPEN_DELIMITER: &str = "<header>";
/// Closing delimiter paired with [`DEFAULT_OPEN_DELIMITER`].
pub const DEFAULT_CLOSE_DELIMITER: &str = "</header>";

/// User-facing framing settings.
///
/// When `enabled` is `false` chunks carry no header and are appended in
/// arrival order. When enabled, each chunk must start with a delimited JSON
/// header. Unset delimiters fall back to `<header>` / `</header>`; a close
/// delimiter may also be derived from an XML-style open tag.
///
/// # Examples
///
/// ```
/// use wirestitch::framing::FramingConfig;
///
/// let delimiters = FramingConfig::default()
///     .with_open_delimiter("<msg>")
///     .resolve()
///     .expect("derivable close tag")
///     .delimiters()
///     .cloned()
///     .expect("framing enabled");
/// assert_eq!(delimiters.close(), "</msg>");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FramingConfig {
    /// Whether chunks carry a header block.
    pub enabled: bool,
    /// Text that opens the header block.
    #[serde(rename = "open", skip_serializing_if = "Option::is_none")]
    pub open_delimiter: Option<String>,
    /// Text that closes the header block.
    #[serde(rename = "close", skip_serializing_if = "Option::is_none")]
    pub close_delimiter: Option<String>,
}

impl Default for FramingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            open_delimiter: None,
            close_delimiter: None,
        }
    }
}

impl FramingConfig {
    /// Configuration for header-less streams.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Override the opening delimiter.
    #[must_use]
    pub fn with_open_delimiter(mut self, open: impl Into<String>) -> Self {
        self.open_delimiter = Some(open.into());
        self
    }

    /// Override the closing delimiter.
    #[must_use]
    pub fn with_close_delimiter(mut self, close: impl Into<String>) -> Self {
        self.close_delimiter = Some(close.into());
        self
    }

    /// Resolve the configured delimiters.
    ///
    /// Explicit delimiters take precedence. A missing close delimiter is
    /// derived from the open delimiter via [`derive_close_tag`].
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnresolvedDelimiters`] when the close delimiter
    /// is unset and cannot be derived, or [`FramingError::EmptyDelimiter`] when
    /// either delimiter is empty.
    pub fn resolve(&self) -> Result<Framing, FramingError> {
        if !self.enabled {
            return Ok(Framing::Disabled);
        }
        let open = self
            .open_delimiter
            .as_deref()
            .unwrap_or(DEFAULT_OPEN_DELIMITER);
        let delimiters = match self.close_delimiter.as_deref() {
            Some(close) => Delimiters::new(open, close)?,
            None => Delimiters::from_open(open)?,
        };
        Ok(Framing::Enabled(delimiters))
    }
}

/// Fully resolved framing mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Framing {
    /// Chunks are plain payload.
    Disabled,
    /// Chunks start with a header enclosed by these delimiters.
    Enabled(Delimiters),
}

impl Framing {
    /// Borrow the delimiters when framing is enabled.
    #[must_use]
    pub fn delimiters(&self) -> Option<&Delimiters> {
        match self {
            Self::Disabled => None,
            Self::Enabled(delimiters) => Some(delimiters),
        }
    }
}

/// A validated pair of header delimiters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: DEFAULT_OPEN_DELIMITER.to_owned(),
            close: DEFAULT_CLOSE_DELIMITER.to_owned(),
        }
    }
}

impl Delimiters {
    /// Pair explicit delimiters.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::EmptyDelimiter`] if either string is empty.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self, FramingError> {
        let open = open.into();
        let close = close.into();
        if open.is_empty() || close.is_empty() {
            return Err(FramingError::EmptyDelimiter);
        }
        Ok(Self { open, close })
    }

    /// Derive the closing delimiter from an XML-style opening tag.
    ///
    /// # Errors
    ///
    /// Returns [`FramingError::UnresolvedDelimiters`] if `open` is not of the
    /// form `<name>`.
    pub fn from_open(open: impl Into<String>) -> Result<Self, FramingError> {
        let open = open.into();
        let Some(close) = derive_close_tag(&open) else {
            if open.is_empty() {
                return Err(FramingError::EmptyDelimiter);
            }
            return Err(FramingError::UnresolvedDelimiters { open });
        };
        Ok(Self { open, close })
    }

    /// Text that opens a header block.
    #[must_use]
    pub fn open(&self) -> &str { &self.open }

    /// Text that closes a header block.
    #[must_use]
    pub fn close(&self) -> &str { &self.close }
}

/// Turn `<name>` into `</name>`.
///
/// Exactly one leading `<` and one trailing `>` are stripped; everything in
/// between is the tag name and must be non-empty.
///
/// ```
/// use wirestitch::framing::derive_close_tag;
///
/// assert_eq!(derive_close_tag("<a>").as_deref(), Some("</a>"));
/// assert_eq!(derive_close_tag("<msg>").as_deref(), Some("</msg>"));
/// assert_eq!(derive_close_tag("<>"), None);
/// assert_eq!(derive_close_tag("[msg]"), None);
/// ```
#[must_use]
pub fn derive_close_tag(open: &str) -> Option<String> {
    let name = open.strip_prefix('<')?.strip_suffix('>')?;
    if name.is_empty() {
        return None;
    }
    Some(format!("</{name}>"))
}
