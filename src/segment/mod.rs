//! Splitting literal text into the ordered segments of a request.

use crate::foundation::error::{TextToolError, TextToolResult};
use crate::params::Mode;

/// One unit of text rendered into exactly one image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Segment {
    /// Zero-based position within the request.
    pub index: usize,
    /// Text to render, possibly empty or whitespace-only.
    pub text: String,
}

/// Split `text` into segments according to `mode`.
///
/// - `single`: the whole text verbatim (an empty text is a valid blank segment).
/// - `char`: every Unicode scalar value, whitespace included.
/// - `word`: runs of non-whitespace.
/// - `line`: lines split on `\n` / `\r\n`; a trailing line break does not add a segment, interior
///   blank lines are kept as empty segments.
/// - `token`: split on `|` without trimming.
///
/// Every mode except `single` fails with [`TextToolError::EmptyInput`] when nothing is produced.
pub fn segment_text(mode: Mode, text: &str) -> TextToolResult<Vec<Segment>> {
    let parts: Vec<&str> = match mode {
        Mode::Single => vec![text],
        Mode::Char => text.char_indices().map(|(i, c)| &text[i..i + c.len_utf8()]).collect(),
        Mode::Word => text.split_whitespace().collect(),
        Mode::Line => text.lines().collect(),
        Mode::Token if text.is_empty() => Vec::new(),
        Mode::Token => text.split('|').collect(),
    };

    if parts.is_empty() {
        return Err(TextToolError::EmptyInput {
            mode: mode.as_str().to_owned(),
        });
    }

    Ok(parts
        .into_iter()
        .enumerate()
        .map(|(index, part)| Segment {
            index,
            text: part.to_owned(),
        })
        .collect())
}

#[cfg(test)]
#[path = "../../tests/unit/segment/mod.rs"]
mod tests;
