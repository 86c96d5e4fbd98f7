//! Builders for framed chunk text.

/// Default opening delimiter.
pub const OPEN: &str = "<header>";
/// Default closing delimiter.
pub const CLOSE: &str = "</header>";

/// Frame `payload` at `index` using the default delimiters.
#[must_use]
pub fn framed(index: u32, payload: &str) -> String { framed_with(OPEN, CLOSE, index, payload) }

/// Frame `payload` at `index` using custom delimiters.
#[must_use]
pub fn framed_with(open: &str, close: &str, index: u32, payload: &str) -> String {
    format!("{open}{{\"index\":{index}}}{close}{payload}")
}

/// Frame `payload` with a header that has no `index` key.
#[must_use]
pub fn unindexed(payload: &str) -> String { format!("{OPEN}{{}}{CLOSE}{payload}") }

/// Split `message` into `parts` framed chunks of roughly equal size.
///
/// Splits on `char` boundaries; indices run from zero.
///
/// ```rust
/// use wirestitch_testing::frames::split_framed;
///
/// let chunks = split_framed("Hello World", 3);
/// assert_eq!(chunks.len(), 3);
/// assert!(chunks[2].ends_with("rld"));
/// ```
#[must_use]
pub fn split_framed(message: &str, parts: usize) -> Vec<String> {
    let chars: Vec<char> = message.chars().collect();
    let per_part = chars.len().div_ceil(parts.max(1)).max(1);
    chars
        .chunks(per_part)
        .zip(0u32..)
        .map(|(piece, index)| framed(index, &piece.iter().collect::<String>()))
        .collect()
}
