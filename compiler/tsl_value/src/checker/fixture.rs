//! Shared setup for checker tests.

use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::{Name, Span};

use crate::arena::ValueArena;
use crate::chain::ReferenceChain;
use crate::env::{DefId, DefinitionTable};
use crate::timestamp::CompilationTimestamp;
use crate::value::{Expectation, Reference};
use crate::ValueId;

use super::{CheckConfig, ValueChecker};

pub(crate) fn sp(start: u32, end: u32) -> Span {
    Span::new(start, end)
}

pub(crate) fn ts(raw: u64) -> CompilationTimestamp {
    CompilationTimestamp::from_raw(raw)
}

pub(crate) struct Fixture {
    pub(crate) env: DefinitionTable,
    pub(crate) arena: ValueArena,
    pub(crate) diags: Vec<Diagnostic>,
    pub(crate) config: CheckConfig,
}

impl Fixture {
    pub(crate) fn new() -> Self {
        Fixture {
            env: DefinitionTable::new("Module", "specs/src/Module.tsl"),
            arena: ValueArena::new(),
            diags: Vec::new(),
            config: CheckConfig::default(),
        }
    }

    pub(crate) fn name(&self, s: &str) -> Name {
        self.env.intern(s)
    }

    /// Plain reference to `name` whose identifier starts at `at`.
    pub(crate) fn reference(&mut self, name: &str, at: u32) -> ValueId {
        let id = self.name(name);
        let len = u32::try_from(name.len()).unwrap_or(0);
        self.arena.reference(Reference::new(id, sp(at, at + len)))
    }

    pub(crate) fn constant(&mut self, name: &str, value: ValueId) -> DefId {
        let ty = self.arena.ty(value);
        let span = self.arena.span(value);
        self.env.add_constant(name, ty, value, span)
    }

    pub(crate) fn with<R>(&mut self, f: impl FnOnce(&mut ValueChecker<'_>) -> R) -> R {
        let mut checker =
            ValueChecker::new(&mut self.arena, &self.env, &mut self.diags).with_config(self.config);
        f(&mut checker)
    }

    pub(crate) fn fold(&mut self, pass: u64, id: ValueId) -> ValueId {
        self.with(|checker| {
            let mut chain = ReferenceChain::new();
            checker.get_value_refd_last(ts(pass), id, Expectation::Constant, &mut chain)
        })
    }

    pub(crate) fn codes(&self) -> Vec<ErrorCode> {
        self.diags.iter().map(|d| d.code).collect()
    }
}
