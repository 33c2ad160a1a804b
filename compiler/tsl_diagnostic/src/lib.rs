//! Diagnostic reporting for the value engine.
//!
//! Every report carries:
//! - an [`ErrorCode`] for searchability
//! - a message (what went wrong)
//! - a primary span (where it went wrong)
//! - optional secondary labels and notes (why)
//!
//! The engine never aggregates diagnostics itself; it hands each one to a
//! [`DiagnosticSink`]. `Vec<Diagnostic>` is the simplest sink, and
//! [`DiagnosticQueue`] adds error limits, deduplication and ordering.

mod diagnostic;
mod error_code;
pub mod queue;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use queue::{DiagnosticConfig, DiagnosticQueue};

/// Location-addressed report function.
///
/// Implementations decide what to do with a report (collect, print, drop);
/// the reporter never retries or suppresses on its side.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}
