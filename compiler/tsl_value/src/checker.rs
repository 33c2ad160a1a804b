//! The checking engine: folding, navigation, equality and introspection.
//!
//! A [`ValueChecker`] borrows the arena, the environment and a diagnostic
//! sink for one compilation pass. Every entry point takes the pass
//! [`CompilationTimestamp`]; results cached in the arena are reused until a
//! strictly newer pass asks.

mod convert;
mod equality;
mod expr;
#[cfg(test)]
mod fixture;
mod fold;
mod introspect;
mod navigate;
mod operators;

use num_bigint::BigInt;
use tsl_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use tsl_ir::{Span, StringInterner};

use crate::arena::ValueArena;
use crate::chain::ReferenceChain;
use crate::env::{Environment, TypeShape};
use crate::timestamp::{is_fresh, CompilationTimestamp};
use crate::value::{Expectation, ValueKind, Values};
use crate::ValueId;

pub use navigate::NavMode;

/// Behavior switches for a pass.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct CheckConfig {
    /// Add `omit` for optional fields a record or set value leaves out.
    pub implicit_omit: bool,
    /// Warn when narrowing keeps a character above 127.
    pub warn_on_non_ascii_narrowing: bool,
}

impl Default for CheckConfig {
    fn default() -> Self {
        CheckConfig {
            implicit_omit: false,
            warn_on_non_ascii_narrowing: true,
        }
    }
}

pub struct ValueChecker<'a> {
    arena: &'a mut ValueArena,
    env: &'a dyn Environment,
    sink: &'a mut dyn DiagnosticSink,
    config: CheckConfig,
}

impl<'a> ValueChecker<'a> {
    pub fn new(
        arena: &'a mut ValueArena,
        env: &'a dyn Environment,
        sink: &'a mut dyn DiagnosticSink,
    ) -> Self {
        ValueChecker {
            arena,
            env,
            sink,
            config: CheckConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }

    pub fn arena(&self) -> &ValueArena {
        self.arena
    }

    pub fn config(&self) -> CheckConfig {
        self.config
    }

    fn interner(&self) -> &'a StringInterner {
        self.env.interner()
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.sink.report(diagnostic);
    }

    /// Report against `id` and mark it erroneous.
    fn error_at(&mut self, id: ValueId, diagnostic: Diagnostic) {
        self.arena.mark_erroneous(id);
        self.sink.report(diagnostic);
    }

    /// Shape of the governing type of `id`.
    fn shape(&self, id: ValueId) -> Option<&'a TypeShape> {
        let env = self.env;
        self.arena.ty(id).and_then(|ty| env.type_shape(ty))
    }

    fn stamp(&mut self, id: ValueId, ts: CompilationTimestamp) {
        self.arena.node_mut(id).state.last_time_checked = Some(ts);
    }

    /// Container checks over a whole value tree: repeated field names,
    /// repeated sparse indices and, when configured, implicit omit fields.
    /// Returns the number of problems reported.
    #[tracing::instrument(level = "trace", skip_all, fields(value = id.raw()))]
    pub fn check_containers(&mut self, ts: CompilationTimestamp, id: ValueId) -> usize {
        let node = self.arena.get(id);
        if !node.kind.is_symbolic() && is_fresh(node.last_time_checked(), ts) {
            return 0;
        }
        tsl_stack::ensure_sufficient_stack(|| {
            let mut problems = 0;
            let kind = self.arena.kind(id);
            let has_fields = kind.named_values().is_some();
            let is_sparse = kind.list_values().is_some_and(Values::is_indexed);
            if has_fields {
                problems += self.check_unique_fields(ts, id);
                if self.config.implicit_omit {
                    self.add_implicit_omits(id);
                }
            } else if is_sparse {
                problems += self.check_unique_indices(ts, id);
            }
            self.stamp(id, ts);
            for child in self.arena.children(id) {
                problems += self.check_containers(ts, child);
            }
            problems
        })
    }

    /// Report repeated field names of a record or set value.
    pub fn check_unique_fields(&mut self, ts: CompilationTimestamp, id: ValueId) -> usize {
        let interner = self.env.interner();
        let sink = &mut *self.sink;
        match &mut self.arena.node_mut(id).kind {
            ValueKind::Record(fields) | ValueKind::Set(fields) => {
                fields.check_uniqueness(ts, interner, sink)
            }
            _ => 0,
        }
    }

    /// Report indices that appear more than once in a sparse list.
    pub fn check_unique_indices(&mut self, ts: CompilationTimestamp, id: ValueId) -> usize {
        let Some(Values::Indexed(entries)) = self.arena.kind(id).list_values().cloned() else {
            return 0;
        };
        let mut chain = ReferenceChain::new();
        let mut seen: Vec<(BigInt, Span)> = Vec::with_capacity(entries.len());
        let mut problems = 0;
        for entry in &entries {
            let index = self.get_value_refd_last(ts, entry.index, Expectation::Constant, &mut chain);
            let ValueKind::Integer(i) = self.arena.kind(index) else {
                continue;
            };
            if let Some((_, first)) = seen.iter().find(|(seen_index, _)| seen_index == i) {
                let diag = Diagnostic::error(ErrorCode::E3002)
                    .with_message(format!("duplicate index {i} in an indexed list"))
                    .with_label(entry.span, "repeated here")
                    .with_secondary_label(*first, "first assigned here");
                self.report(diag);
                problems += 1;
            } else {
                seen.push((i.clone(), entry.span));
            }
        }
        problems
    }
}
