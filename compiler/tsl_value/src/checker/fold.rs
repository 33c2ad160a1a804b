//! Reduction of symbolic values to their most concrete form.
//!
//! [`ValueChecker::get_value_refd_last`] is the only place a symbolic value
//! is evaluated, and the only place the result is memoized. Per value:
//!
//! 1. a result cached at a pass not older than `ts` is returned as is;
//! 2. otherwise the value is pushed on the reference chain, and re-entry
//!    is reported as a circular reference;
//! 3. the value is evaluated (reference, expression, macro or lower-case
//!    identifier);
//! 4. the chain frame is popped and the result cached under `ts`.

use tsl_diagnostic::{Diagnostic, ErrorCode};

use crate::arena::Derived;
use crate::chain::{ChainLink, ReferenceChain};
use crate::env::{DefId, Definition};
use crate::timestamp::{is_fresh, CompilationTimestamp};
use crate::value::{Expectation, MacroKind, Reference, ValueKind};
use crate::ValueId;

use super::navigate::{NavMode, Step};
use super::ValueChecker;

impl<'a> ValueChecker<'a> {
    /// Fold `id`. Concrete values are returned unchanged; a symbolic value
    /// that cannot be reduced further is returned itself.
    #[tracing::instrument(level = "trace", skip_all, fields(value = id.raw()))]
    pub fn get_value_refd_last(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> ValueId {
        let node = self.arena.get(id);
        if !node.kind.is_symbolic() {
            return id;
        }
        if let Some((stamp, result)) = node.state.folded {
            if !stamp.is_less(ts) {
                tracing::trace!(result = result.raw(), "fold cache hit");
                return result;
            }
        }

        let link = ChainLink {
            value: id,
            span: node.span,
            name: match &node.kind {
                ValueKind::Referenced(reference) => Some(reference.id),
                ValueKind::LowerIdentifier(name) => Some(*name),
                _ => None,
            },
        };

        tsl_stack::ensure_sufficient_stack(|| {
            chain.mark_state();
            let result = match chain.add(link) {
                Ok(()) => Some(self.evaluate(ts, id, expected, chain)),
                Err(cycle) => {
                    let diag = cycle.to_diagnostic(self.interner());
                    self.error_at(id, diag);
                    None
                }
            };
            chain.previous_state();

            let Some(result) = result else {
                return id;
            };
            tracing::debug!(value = id.raw(), result = result.raw(), "folded");
            let state = &mut self.arena.node_mut(id).state;
            state.folded = Some((ts, result));
            state.last_time_checked = Some(ts);
            result
        })
    }

    /// True when `id`, or any part of it, has no compile-time value.
    /// Erroneous values count as unfoldable.
    pub fn is_unfoldable(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> bool {
        tsl_stack::ensure_sufficient_stack(|| {
            let last = self.get_value_refd_last(ts, id, expected, chain);
            if self.arena.is_erroneous(last) || self.arena.kind(last).is_symbolic() {
                return true;
            }
            if matches!(self.arena.kind(last), ValueKind::NotUsed) {
                return true;
            }
            self.arena
                .children(last)
                .into_iter()
                .any(|child| self.is_unfoldable(ts, child, expected, chain))
        })
    }

    fn evaluate(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> ValueId {
        match self.arena.kind(id).clone() {
            ValueKind::Referenced(reference) => {
                self.fold_reference(ts, id, &reference, expected, chain)
            }
            ValueKind::Expression(expr) => self.fold_expression(ts, id, &expr, expected, chain),
            ValueKind::Macro(kind) => self.fold_macro(id, kind, expected),
            ValueKind::LowerIdentifier(_) => {
                let target = self.resolve_lower_identifier(ts, id);
                if target == id {
                    id
                } else {
                    self.get_value_refd_last(ts, target, expected, chain)
                }
            }
            _ => id,
        }
    }

    /// Definition a reference value denotes, memoized per pass. An
    /// unresolvable reference is reported and marked erroneous.
    pub(crate) fn resolve_reference(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
    ) -> Option<&'a Definition> {
        let env = self.env;
        let cached = self.arena.get(id).state.resolved;
        let def_id: Option<DefId> = match cached {
            Some((stamp, def)) if is_fresh(Some(stamp), ts) => def,
            _ => {
                let def = env.resolve(reference);
                self.arena.node_mut(id).state.resolved = Some((ts, def));
                if def.is_none() {
                    let name = self.interner().lookup(reference.id);
                    let diag = Diagnostic::error(ErrorCode::E2003)
                        .with_message(format!("there is no definition named `{name}`"))
                        .with_label(reference.span, "not found in this scope");
                    self.error_at(id, diag);
                }
                def
            }
        };
        def_id.and_then(|def| env.definition(def))
    }

    fn fold_reference(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        expected: Expectation,
        chain: &mut ReferenceChain,
    ) -> ValueId {
        let Some(def) = self.resolve_reference(ts, id, reference) else {
            return id;
        };
        if !def.kind.is_foldable() {
            tracing::trace!(kind = ?def.kind, "reference to a non-constant stays unfoldable");
            return id;
        }
        let Some(mut current) = def.value else {
            return id;
        };

        for step in 0..reference.subrefs.len() {
            match self.step_into(ts, current, reference, step, NavMode::Normal, chain) {
                Step::Found(next) => current = next,
                Step::Missing | Step::Unfoldable => return id,
                Step::Invalid => {
                    self.arena.mark_erroneous(id);
                    return id;
                }
            }
        }
        self.get_value_refd_last(ts, current, expected, chain)
    }

    fn fold_macro(&mut self, id: ValueId, kind: MacroKind, expected: Expectation) -> ValueId {
        let span = self.arena.span(id);
        let site = self.env.macro_site(span);
        let interner = self.interner();

        let folded = match kind {
            MacroKind::ModuleId => ValueKind::Charstring(interner.lookup(site.module).to_owned()),
            MacroKind::DefinitionId => match site.definition {
                Some(def) => ValueKind::Charstring(interner.lookup(def).to_owned()),
                None => {
                    let diag = Diagnostic::error(ErrorCode::E2004)
                        .with_message("`%definitionId` is used outside of any definition")
                        .with_label(span, "no enclosing definition");
                    self.error_at(id, diag);
                    return id;
                }
            },
            MacroKind::TestcaseId => {
                if matches!(expected, Expectation::Constant | Expectation::StaticValue) {
                    let diag = Diagnostic::error(ErrorCode::E2004)
                        .with_message(
                            "`%testcaseId` is not allowed in a constant or static value",
                        )
                        .with_label(span, "known only while a testcase runs");
                    self.error_at(id, diag);
                }
                return id;
            }
            MacroKind::FileName | MacroKind::FilePath => ValueKind::Charstring(site.file_path.clone()),
            MacroKind::BaseFileName => ValueKind::Charstring(site.base_file_name().to_owned()),
            MacroKind::LineNumber => ValueKind::Charstring(site.line.to_string()),
            MacroKind::LineNumberInteger => ValueKind::Integer(site.line.into()),
            MacroKind::Scope => ValueKind::Charstring(site.scope),
        };
        let ty = self.arena.ty(id);
        self.arena.push_derived(id, Derived::Folded, folded, span, ty)
    }
}

#[cfg(test)]
mod tests;
