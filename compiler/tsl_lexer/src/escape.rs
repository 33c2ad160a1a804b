//! Escape-sequence extraction for charstring literals.
//!
//! Input is the literal text between the enclosing quotes. Rules, in
//! priority order:
//! - `""` decodes to one `"`; a lone `"` is an error
//! - `\'` `\"` `\?` `\\` decode to the escaped character
//! - `\a` `\b` `\f` `\n` `\r` `\t` `\v` decode to control characters
//! - a backslash directly before a raw newline decodes to a newline
//! - `\x` followed by one or two hex digits decodes to that byte
//! - `\` followed by one to three octal digits decodes to that byte (at most 255)
//!
//! Any other escape is an error and the whole literal is rejected.

use std::iter::Peekable;
use std::str::CharIndices;

use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::Span;

/// Why a literal could not be decoded. Offsets are byte offsets of the
/// backslash relative to the start of the literal content.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum EscapeError {
    #[error("invalid escape sequence `\\{found}`")]
    InvalidEscape { offset: u32, found: char },
    #[error("a backslash at the end of a literal does not escape anything")]
    TrailingBackslash { offset: u32 },
    #[error("`\\x` must be followed by one or two hexadecimal digits")]
    MissingHexDigits { offset: u32 },
    #[error("octal escape value {value} is greater than 255")]
    OctalOutOfRange { offset: u32, value: u32 },
    #[error("a quote inside a literal must be doubled")]
    UnpairedQuote { offset: u32 },
}

impl EscapeError {
    pub fn offset(&self) -> u32 {
        match self {
            EscapeError::InvalidEscape { offset, .. }
            | EscapeError::TrailingBackslash { offset }
            | EscapeError::MissingHexDigits { offset }
            | EscapeError::OctalOutOfRange { offset, .. }
            | EscapeError::UnpairedQuote { offset } => *offset,
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            EscapeError::InvalidEscape { .. }
            | EscapeError::TrailingBackslash { .. }
            | EscapeError::UnpairedQuote { .. } => ErrorCode::E0001,
            EscapeError::MissingHexDigits { .. } => ErrorCode::E0002,
            EscapeError::OctalOutOfRange { .. } => ErrorCode::E0003,
        }
    }

    /// Diagnostic pointing at the offending escape. `content_start` is the
    /// source offset of the first character after the opening quote.
    pub fn to_diagnostic(&self, content_start: u32) -> Diagnostic {
        let start = content_start + self.offset();
        let (width, label) = match self {
            EscapeError::UnpairedQuote { .. } => (1, "unpaired quote"),
            _ => (2, "in this escape sequence"),
        };
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(Span::new(start, start + width), label)
    }
}

/// Decode a literal, returning the raw string value.
pub fn extract_charstring(literal: &str) -> Result<String, EscapeError> {
    // Fast path: nothing to decode.
    if memchr::memchr2(b'\\', b'"', literal.as_bytes()).is_none() {
        return Ok(literal.to_owned());
    }

    let mut cursor = Cursor::new(literal);
    let mut decoded = String::with_capacity(literal.len());

    while let Some((offset, c)) = cursor.bump() {
        match c {
            '"' => {
                if cursor.peek() != Some('"') {
                    return Err(EscapeError::UnpairedQuote { offset });
                }
                cursor.bump();
                decoded.push('"');
            }
            '\\' => decoded.push(cursor.escape(offset)?),
            _ => decoded.push(c),
        }
    }

    Ok(decoded)
}

/// Stateful wrapper around [`extract_charstring`]: decodes once, then
/// answers whether decoding failed and why.
#[derive(Clone, Debug)]
pub struct CharstringExtractor {
    result: Result<String, EscapeError>,
}

impl CharstringExtractor {
    pub fn new(literal: &str) -> Self {
        CharstringExtractor {
            result: extract_charstring(literal),
        }
    }

    pub fn is_erroneous(&self) -> bool {
        self.result.is_err()
    }

    pub fn error_message(&self) -> Option<String> {
        self.result.as_ref().err().map(ToString::to_string)
    }

    pub fn error(&self) -> Option<&EscapeError> {
        self.result.as_ref().err()
    }

    /// The decoded string, absent when decoding failed.
    pub fn extracted_string(&self) -> Option<&str> {
        self.result.as_deref().ok()
    }

    pub fn into_result(self) -> Result<String, EscapeError> {
        self.result
    }
}

struct Cursor<'a> {
    chars: Peekable<CharIndices<'a>>,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Cursor {
            chars: text.char_indices().peekable(),
        }
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "literal offsets bounded by u32 like every source offset"
    )]
    fn bump(&mut self) -> Option<(u32, char)> {
        self.chars.next().map(|(i, c)| (i as u32, c))
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    /// Take the next character if it is a digit of `radix`.
    fn digit(&mut self, radix: u32) -> Option<u32> {
        let value = self.peek()?.to_digit(radix)?;
        self.bump();
        Some(value)
    }

    /// Decode the escape whose backslash sits at `offset`.
    fn escape(&mut self, offset: u32) -> Result<char, EscapeError> {
        let Some((_, c)) = self.bump() else {
            return Err(EscapeError::TrailingBackslash { offset });
        };

        match c {
            '\'' | '"' | '?' | '\\' => Ok(c),
            'a' => Ok('\u{7}'),
            'b' => Ok('\u{8}'),
            'f' => Ok('\u{c}'),
            'n' | '\n' => Ok('\n'),
            'r' => Ok('\r'),
            't' => Ok('\t'),
            'v' => Ok('\u{b}'),
            'x' => {
                let Some(high) = self.digit(16) else {
                    return Err(EscapeError::MissingHexDigits { offset });
                };
                let value = match self.digit(16) {
                    Some(low) => high * 16 + low,
                    None => high,
                };
                byte_char(value).ok_or(EscapeError::MissingHexDigits { offset })
            }
            '0'..='7' => {
                let mut value = c.to_digit(8).unwrap_or(0);
                for _ in 0..2 {
                    match self.digit(8) {
                        Some(d) => value = value * 8 + d,
                        None => break,
                    }
                }
                byte_char(value).ok_or(EscapeError::OctalOutOfRange { offset, value })
            }
            found => Err(EscapeError::InvalidEscape { offset, found }),
        }
    }
}

fn byte_char(value: u32) -> Option<char> {
    u8::try_from(value).ok().map(char::from)
}

#[cfg(test)]
mod tests;
