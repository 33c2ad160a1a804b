//! TSL value engine
//!
//! Compile-time values of the TSL front end and everything
//! the semantic checker asks of them:
//! - the value model ([`ValueKind`] nodes in a [`ValueArena`])
//! - folding of references, expressions and macros
//!   ([`ValueChecker::get_value_refd_last`])
//! - one-step navigation into fields, elements and string characters
//! - structural equality and the binding predicates (`isbound`, ...)
//! - type-driven string conversions
//! - the incremental edit hook ([`ValueArena::update_syntax`])
//!
//! All cached results are stamped with the [`CompilationTimestamp`] of the
//! pass that produced them.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=tsl_value=debug`: folds, conversions and container fixes.
//! - `RUST_LOG=tsl_value=trace`: every fold, navigation step and cache hit.

mod arena;
mod chain;
mod checker;
mod edit;
mod env;
mod render;
mod timestamp;
mod ustring;
mod value;

use std::sync::Once;

pub use arena::ValueArena;
pub use chain::{ChainLink, Cycle, ReferenceChain};
pub use checker::{CheckConfig, NavMode, ValueChecker};
pub use edit::ReparseRequired;
pub use env::{
    ArrayDimension, Component, DefId, DefKind, Definition, DefinitionTable, DimensionViolation,
    Environment, MacroSite, TypeId, TypeShape,
};
pub use timestamp::{CompilationTimestamp, TimestampSource};
pub use ustring::{NarrowError, Narrowed, UniversalChar, UniversalCharstring};
pub use value::{
    BinaryOp, Builtin, Expectation, Expression, IndexedValue, IntrospectOp, MacroKind,
    NamedValue, NamedValues, ObjidComponent, Reference, SubReference, UnaryOp, ValueFlags,
    ValueId, ValueKind, ValueNode, ValueTag, Values, Verdict,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}
