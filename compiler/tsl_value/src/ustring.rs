//! Universal characters and strings.
//!
//! A universal character is a `(group, plane, row, cell)` quadruple. The
//! derived ordering compares coordinates left to right, which is the
//! language's character order. Groups above 127 are not valid characters
//! but are still ordered, so comparison is total.

use std::fmt;
use std::fmt::Write as _;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct UniversalChar {
    pub group: u8,
    pub plane: u8,
    pub row: u8,
    pub cell: u8,
}

impl UniversalChar {
    #[inline]
    pub const fn new(group: u8, plane: u8, row: u8, cell: u8) -> Self {
        UniversalChar {
            group,
            plane,
            row,
            cell,
        }
    }

    /// Character for a single byte: group, plane and row are zero.
    #[inline]
    pub const fn from_byte(byte: u8) -> Self {
        UniversalChar::new(0, 0, 0, byte)
    }

    /// `group << 24 | plane << 16 | row << 8 | cell`.
    #[inline]
    pub const fn code_point(self) -> u32 {
        u32::from_be_bytes([self.group, self.plane, self.row, self.cell])
    }

    #[inline]
    pub const fn from_code_point(code: u32) -> Self {
        let [group, plane, row, cell] = code.to_be_bytes();
        UniversalChar::new(group, plane, row, cell)
    }

    /// True when the character fits in one byte.
    #[inline]
    pub const fn is_single_byte(self) -> bool {
        self.group == 0 && self.plane == 0 && self.row == 0
    }

    /// Printable ASCII, the set rendered inside quotes.
    #[inline]
    pub fn is_printable_ascii(self) -> bool {
        self.is_single_byte() && (0x20..0x7f).contains(&self.cell)
    }

    /// The Rust `char`, if the code point is a Unicode scalar value.
    pub fn to_char(self) -> Option<char> {
        char::from_u32(self.code_point())
    }
}

impl From<char> for UniversalChar {
    fn from(c: char) -> Self {
        UniversalChar::from_code_point(u32::from(c))
    }
}

impl From<[u8; 4]> for UniversalChar {
    fn from([group, plane, row, cell]: [u8; 4]) -> Self {
        UniversalChar::new(group, plane, row, cell)
    }
}

impl fmt::Debug for UniversalChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for UniversalChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "char({}, {}, {}, {})",
            self.group, self.plane, self.row, self.cell
        )
    }
}

/// Why a universal string cannot become a single-byte charstring.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("character {ch} at position {index} does not fit in a charstring")]
pub struct NarrowError {
    pub index: usize,
    pub ch: UniversalChar,
}

/// Result of a successful narrowing.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Narrowed {
    pub text: String,
    /// Positions of characters whose cell exceeds 127. Narrowing keeps them
    /// but callers usually warn.
    pub high_cells: Vec<usize>,
}

/// Ordered sequence of universal characters.
///
/// Comparison is lexicographic over the characters; a proper prefix orders
/// before the longer string.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Default)]
pub struct UniversalCharstring {
    chars: Vec<UniversalChar>,
}

impl UniversalCharstring {
    pub fn new() -> Self {
        UniversalCharstring { chars: Vec::new() }
    }

    pub fn from_chars(chars: Vec<UniversalChar>) -> Self {
        UniversalCharstring { chars }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<UniversalChar> {
        self.chars.get(index).copied()
    }

    #[inline]
    pub fn as_slice(&self) -> &[UniversalChar] {
        &self.chars
    }

    pub fn iter(&self) -> impl Iterator<Item = UniversalChar> + '_ {
        self.chars.iter().copied()
    }

    /// `len` characters starting at `start`, or `None` when the range does
    /// not lie inside the string.
    pub fn substring(&self, start: usize, len: usize) -> Option<Self> {
        let end = start.checked_add(len)?;
        self.chars
            .get(start..end)
            .map(|slice| UniversalCharstring::from_chars(slice.to_vec()))
    }

    pub fn push(&mut self, ch: UniversalChar) {
        self.chars.push(ch);
    }

    pub fn append(&mut self, other: &UniversalCharstring) {
        self.chars.extend_from_slice(&other.chars);
    }

    #[must_use]
    pub fn concat(&self, other: &UniversalCharstring) -> Self {
        let mut chars = Vec::with_capacity(self.len() + other.len());
        chars.extend_from_slice(&self.chars);
        chars.extend_from_slice(&other.chars);
        UniversalCharstring { chars }
    }

    /// Rotate left by `by` positions (right when `left` is false).
    #[must_use]
    pub fn rotated(&self, by: usize, left: bool) -> Self {
        let mut chars = self.chars.clone();
        if !chars.is_empty() {
            let by = by % chars.len();
            if left {
                chars.rotate_left(by);
            } else {
                chars.rotate_right(by);
            }
        }
        UniversalCharstring { chars }
    }

    /// Convert to a single-byte string. Fails on the first character with a
    /// nonzero group, plane or row.
    pub fn narrow(&self) -> Result<Narrowed, NarrowError> {
        let mut text = String::with_capacity(self.len());
        let mut high_cells = Vec::new();
        for (index, ch) in self.chars.iter().copied().enumerate() {
            if !ch.is_single_byte() {
                return Err(NarrowError { index, ch });
            }
            if ch.cell > 127 {
                high_cells.push(index);
            }
            text.push(char::from(ch.cell));
        }
        Ok(Narrowed { text, high_cells })
    }

    /// Characters rendered the way they are written in source.
    pub fn to_source(&self) -> String {
        if self.chars.iter().all(|c| c.is_printable_ascii()) {
            return quote(self.chars.iter().map(|c| char::from(c.cell)));
        }

        let mut pieces: Vec<String> = Vec::new();
        let mut run = String::new();
        for ch in &self.chars {
            if ch.is_printable_ascii() {
                run.push(char::from(ch.cell));
            } else {
                if !run.is_empty() {
                    pieces.push(quote(run.chars()));
                    run.clear();
                }
                pieces.push(ch.to_string());
            }
        }
        if !run.is_empty() {
            pieces.push(quote(run.chars()));
        }
        pieces.join(" & ")
    }
}

/// Quote with the doubled-quote convention.
pub(crate) fn quote(chars: impl Iterator<Item = char>) -> String {
    let mut out = String::from("\"");
    for c in chars {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

impl From<&str> for UniversalCharstring {
    fn from(s: &str) -> Self {
        UniversalCharstring {
            chars: s.chars().map(UniversalChar::from).collect(),
        }
    }
}

impl FromIterator<UniversalChar> for UniversalCharstring {
    fn from_iter<I: IntoIterator<Item = UniversalChar>>(iter: I) -> Self {
        UniversalCharstring {
            chars: iter.into_iter().collect(),
        }
    }
}

impl fmt::Debug for UniversalCharstring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_source())
    }
}

impl fmt::Display for UniversalCharstring {
    /// Displays the text itself; characters that are not Unicode scalar
    /// values print as their quadruple.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for ch in &self.chars {
            match ch.to_char() {
                Some(c) => f.write_char(c)?,
                None => write!(f, "{ch}")?,
            }
        }
        Ok(())
    }
}
