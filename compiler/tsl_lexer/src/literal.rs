//! Bodies of bit, hex and octet string literals and the quadruple notation.
//!
//! The canonical content of a string literal is the digit sequence without
//! whitespace, with hex digits in upper case. Two literals with the same
//! canonical content denote the same value.

use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::Span;

#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
pub enum LiteralError {
    #[error("`{found}` is not a valid digit in a {kind} literal")]
    InvalidDigit { kind: &'static str, found: char },
    #[error("octetstring literal must contain an even number of hexadecimal digits, found {count}")]
    OddOctetDigits { count: usize },
    #[error("malformed quadruple `{text}`: expected `char(group, plane, row, cell)`")]
    MalformedQuadruple { text: String },
    #[error("quadruple component {value} is out of range (group must be 0..=127, others 0..=255)")]
    QuadrupleOutOfRange { value: u32 },
}

impl LiteralError {
    pub fn code(&self) -> ErrorCode {
        match self {
            LiteralError::InvalidDigit { .. } | LiteralError::OddOctetDigits { .. } => {
                ErrorCode::E0004
            }
            LiteralError::MalformedQuadruple { .. } | LiteralError::QuadrupleOutOfRange { .. } => {
                ErrorCode::E0005
            }
        }
    }

    pub fn to_diagnostic(&self, span: Span) -> Diagnostic {
        Diagnostic::error(self.code())
            .with_message(self.to_string())
            .with_label(span, "in this literal")
    }
}

fn canonical_digits(
    body: &str,
    kind: &'static str,
    valid: impl Fn(char) -> bool,
) -> Result<String, LiteralError> {
    let mut digits = String::with_capacity(body.len());
    for c in body.chars().filter(|c| !c.is_ascii_whitespace()) {
        if !valid(c) {
            return Err(LiteralError::InvalidDigit { kind, found: c });
        }
        digits.push(c.to_ascii_uppercase());
    }
    Ok(digits)
}

/// Canonical content of a `'...'B` literal.
pub fn bitstring_body(body: &str) -> Result<String, LiteralError> {
    canonical_digits(body, "bitstring", |c| c == '0' || c == '1')
}

/// Canonical content of a `'...'H` literal.
pub fn hexstring_body(body: &str) -> Result<String, LiteralError> {
    canonical_digits(body, "hexstring", |c| c.is_ascii_hexdigit())
}

/// Canonical content of a `'...'O` literal.
pub fn octetstring_body(body: &str) -> Result<String, LiteralError> {
    let digits = canonical_digits(body, "octetstring", |c| c.is_ascii_hexdigit())?;
    if digits.len() % 2 == 1 {
        return Err(LiteralError::OddOctetDigits {
            count: digits.len(),
        });
    }
    Ok(digits)
}

/// Parse `char(g, p, r, c)` into its four coordinates.
pub fn quadruple(text: &str) -> Result<[u8; 4], LiteralError> {
    let malformed = || LiteralError::MalformedQuadruple {
        text: text.to_owned(),
    };

    let inner = text
        .trim()
        .strip_prefix("char")
        .map(str::trim_start)
        .and_then(|rest| rest.strip_prefix('('))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(malformed)?;

    let mut coords = [0u8; 4];
    let mut parts = inner.split(',');
    for (i, slot) in coords.iter_mut().enumerate() {
        let part = parts.next().ok_or_else(malformed)?.trim();
        let value: u32 = part.parse().map_err(|_| malformed())?;
        let limit = if i == 0 { 127 } else { 255 };
        if value > limit {
            return Err(LiteralError::QuadrupleOutOfRange { value });
        }
        *slot = u8::try_from(value).map_err(|_| LiteralError::QuadrupleOutOfRange { value })?;
    }
    if parts.next().is_some() {
        return Err(malformed());
    }
    Ok(coords)
}
