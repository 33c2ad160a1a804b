//! Literal decoding.
//!
//! The grammar hands the value engine raw literal text. This crate turns that
//! text into canonical content:
//! - [`CharstringExtractor`]: escape sequences inside `"..."` literals
//! - [`literal`]: bodies of `'...'B`, `'...'H` and `'...'O` literals and the
//!   `char(g, p, r, c)` quadruple notation
//!
//! Decoding failures are typed errors that convert into diagnostics; a failed
//! literal never yields a partially decoded value.

mod escape;
pub mod literal;

pub use escape::{extract_charstring, CharstringExtractor, EscapeError};
pub use literal::LiteralError;
