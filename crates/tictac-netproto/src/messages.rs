use std::str::SplitAsciiWhitespace;

use crate::constants::FIELD_SEPARATOR;
use crate::error::ProtoError;
use crate::msg_id::Keyword;

pub mod client;
pub mod server;

/// A message of one protocol direction.
///
/// Implementors only deal with the fields after the keyword; framing, size
/// limits and keyword lookup live in [`crate::codec`].
pub trait Message: Sized + Send + 'static {
    fn keyword(&self) -> Keyword;

    /// Append everything that follows the keyword, separators included.
    fn write_fields(&self, out: &mut String) -> Result<(), ProtoError>;

    /// Build the message from its keyword and the raw remainder of the line.
    fn parse_fields(keyword: Keyword, rest: &str) -> Result<Self, ProtoError>;
}

/// Stand-in for an integer coordinate outside the `u8` range.
pub const OFF_BOARD: u8 = u8::MAX;

/// Whitespace-separated field cursor over the remainder of a line.
pub(crate) struct Fields<'a> {
    iter: SplitAsciiWhitespace<'a>,
}

impl<'a> Fields<'a> {
    pub(crate) fn new(rest: &'a str) -> Self {
        Self {
            iter: rest.split_ascii_whitespace(),
        }
    }

    pub(crate) fn next(&mut self, name: &'static str) -> Result<&'a str, ProtoError> {
        self.iter.next().ok_or(ProtoError::MissingField(name))
    }

    /// Any integer is a coordinate. Values that do not fit a `u8`, negative
    /// ones included, become [`OFF_BOARD`] so they fail the bounds check
    /// instead of the parse.
    pub(crate) fn coord(&mut self, name: &'static str) -> Result<u8, ProtoError> {
        let raw = self.next(name)?;
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ProtoError::BadInteger {
                field: name,
                value: raw.to_string(),
            });
        }

        let value = digits.parse::<u8>().ok().filter(|&v| !negative || v == 0);
        Ok(value.unwrap_or(OFF_BOARD))
    }

    pub(crate) fn finish(mut self) -> Result<(), ProtoError> {
        match self.iter.next() {
            Some(extra) => Err(ProtoError::TrailingField(extra.to_string())),
            None => Ok(()),
        }
    }
}

pub(crate) fn push_field(out: &mut String, field: impl std::fmt::Display) {
    use std::fmt::Write;
    out.push(FIELD_SEPARATOR);
    // Writing into a String cannot fail.
    let _ = write!(out, "{field}");
}

/// Free text runs to the end of the line, so it must not contain a break.
pub(crate) fn push_text(out: &mut String, text: &str) -> Result<(), ProtoError> {
    if text.contains(['\r', '\n']) {
        return Err(ProtoError::EmbeddedNewline);
    }
    if !text.is_empty() {
        out.push(FIELD_SEPARATOR);
        out.push_str(text);
    }
    Ok(())
}
