use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

fn decode(s: &str) -> Option<String> {
    CharstringExtractor::new(s).extracted_string().map(str::to_owned)
}

// === Quotes and simple escapes ===

#[test]
fn doubled_quote_decodes_to_one_quote() {
    assert_eq!(decode(r#"say ""hi"""#).as_deref(), Some(r#"say "hi""#));
    assert_eq!(decode(r#""""#).as_deref(), Some("\""));
}

#[test]
fn lone_quote_fails() {
    assert_eq!(
        extract_charstring(r#"say "hi"#),
        Err(EscapeError::UnpairedQuote { offset: 4 })
    );
    assert_eq!(
        extract_charstring(r#"ab""""c""#),
        Err(EscapeError::UnpairedQuote { offset: 7 })
    );

    let Err(err) = extract_charstring(r#"x"y"#) else {
        panic!("expected a decode error");
    };
    let diag = err.to_diagnostic(20);
    assert_eq!(diag.code, ErrorCode::E0001);
    assert_eq!(diag.primary_span(), Some(Span::new(21, 22)));
}

#[test]
fn plain_text_takes_fast_path() {
    assert_eq!(decode("hello world").as_deref(), Some("hello world"));
}

#[test]
fn quote_like_escapes() {
    assert_eq!(decode(r#"\'\"\?\\"#).as_deref(), Some("'\"?\\"));
}

#[test]
fn control_escapes() {
    assert_eq!(
        decode(r"\a\b\f\n\r\t\v").as_deref(),
        Some("\u{7}\u{8}\u{c}\n\r\t\u{b}")
    );
}

#[test]
fn backslash_newline_is_newline() {
    assert_eq!(decode("ab\\\ncd").as_deref(), Some("ab\ncd"));
}

// === Numeric escapes ===

#[test]
fn hex_escape() {
    assert_eq!(decode(r"\x41").as_deref(), Some("A"));
    assert_eq!(decode(r"\x7").as_deref(), Some("\u{7}"));
    // Only two digits are consumed.
    assert_eq!(decode(r"\x414").as_deref(), Some("A4"));
}

#[test]
fn hex_escape_without_digits_fails() {
    let extractor = CharstringExtractor::new(r"abc\x");
    assert!(extractor.is_erroneous());
    assert_eq!(extractor.extracted_string(), None);
    assert_eq!(
        extractor.error(),
        Some(&EscapeError::MissingHexDigits { offset: 3 })
    );
    assert!(extractor.error_message().is_some());

    assert_eq!(
        extract_charstring(r"\xg"),
        Err(EscapeError::MissingHexDigits { offset: 0 })
    );
}

#[test]
fn octal_escape() {
    assert_eq!(decode(r"\101").as_deref(), Some("A"));
    assert_eq!(decode(r"\0").as_deref(), Some("\0"));
    assert_eq!(decode(r"\1018").as_deref(), Some("A8"));
    assert_eq!(decode(r"\377").as_deref(), Some("\u{ff}"));
}

#[test]
fn octal_escape_above_255_fails() {
    assert_eq!(
        extract_charstring(r"\777"),
        Err(EscapeError::OctalOutOfRange {
            offset: 0,
            value: 511
        })
    );
}

#[test]
fn unknown_escape_fails() {
    assert_eq!(
        extract_charstring(r"ok\q"),
        Err(EscapeError::InvalidEscape {
            offset: 2,
            found: 'q'
        })
    );
    assert_eq!(
        extract_charstring("end\\"),
        Err(EscapeError::TrailingBackslash { offset: 3 })
    );
}

#[test]
fn error_converts_to_diagnostic() {
    let Err(err) = extract_charstring(r"ab\777") else {
        panic!("expected a decode error");
    };
    let diag = err.to_diagnostic(10);
    assert_eq!(diag.code, ErrorCode::E0003);
    assert_eq!(diag.primary_span(), Some(Span::new(12, 14)));
}

proptest! {
    #[test]
    fn text_without_specials_is_unchanged(s in "[a-zA-Z0-9 ,.;:!]{0,40}") {
        prop_assert_eq!(extract_charstring(&s), Ok(s.clone()));
    }

    #[test]
    fn every_byte_round_trips_through_octal(byte in 0u8..=255) {
        let literal = format!("\\{byte:03o}");
        prop_assert_eq!(extract_charstring(&literal), Ok(char::from(byte).to_string()));
    }

    #[test]
    fn every_byte_round_trips_through_hex(byte in 0u8..=255) {
        let literal = format!("\\x{byte:02X}");
        prop_assert_eq!(extract_charstring(&literal), Ok(char::from(byte).to_string()));
    }
}
