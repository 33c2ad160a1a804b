//! The binding predicates `isbound`, `ispresent`, `isvalue` and `ischosen`.
//!
//! They are total: a missing field, an inactive alternative or an
//! unassigned index reads as `false` and is never reported. Internally the
//! answer is `None` when the value is not known at compile time; the public
//! entry points treat such a value as bound.

use tsl_diagnostic::ErrorCode;

use crate::chain::ReferenceChain;
use crate::timestamp::CompilationTimestamp;
use crate::value::{Expectation, IntrospectOp, Reference, SubReference, ValueKind};
use crate::ValueId;

use super::expr::Folded;
use super::navigate::{NavMode, Step};
use super::operators::OpError;
use super::ValueChecker;

/// Where a quiet walk along a reference ended.
enum Walk {
    Value(ValueId),
    Absent,
    Unknown,
}

impl ValueChecker<'_> {
    /// Whether accessors `step..` of `reference`, applied to `id`, reach a
    /// bound value.
    pub fn evaluate_isbound(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
    ) -> bool {
        let mut chain = ReferenceChain::new();
        self.isbound_in(ts, id, reference, step, &mut chain)
            .unwrap_or(true)
    }

    /// Like [`evaluate_isbound`](Self::evaluate_isbound), and additionally
    /// false for `omit`.
    pub fn evaluate_ispresent(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
    ) -> bool {
        let mut chain = ReferenceChain::new();
        self.ispresent_in(ts, id, reference, step, &mut chain)
            .unwrap_or(true)
    }

    /// Whether `id` is completely initialized. `omit` counts as a value only
    /// as a field of a record or set (`from_sequence`).
    pub fn evaluate_isvalue(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        from_sequence: bool,
    ) -> bool {
        let mut chain = ReferenceChain::new();
        self.isvalue_in(ts, id, from_sequence, &mut chain)
            .unwrap_or(true)
    }

    /// Whether the union value reached through all but the last accessor of
    /// `reference` has the last accessor's field as active alternative.
    pub fn evaluate_ischosen(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
    ) -> bool {
        let mut chain = ReferenceChain::new();
        self.ischosen_in(ts, id, reference, step, &mut chain)
            .unwrap_or(true)
    }

    fn walk(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        steps: std::ops::Range<usize>,
        chain: &mut ReferenceChain,
    ) -> Walk {
        let mut current = id;
        for step in steps {
            match self.step_into(ts, current, reference, step, NavMode::Introspection, chain) {
                Step::Found(next) => current = next,
                Step::Missing | Step::Invalid => return Walk::Absent,
                Step::Unfoldable => return Walk::Unknown,
            }
        }
        let last = self.get_value_refd_last(ts, current, Expectation::DynamicValue, chain);
        if self.arena.is_erroneous(last) {
            Walk::Absent
        } else if self.arena.kind(last).is_symbolic() {
            Walk::Unknown
        } else {
            Walk::Value(last)
        }
    }

    fn isbound_in(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
        chain: &mut ReferenceChain,
    ) -> Option<bool> {
        match self.walk(ts, id, reference, step..reference.subrefs.len(), chain) {
            Walk::Value(value) => Some(!matches!(self.arena.kind(value), ValueKind::NotUsed)),
            Walk::Absent => Some(false),
            Walk::Unknown => None,
        }
    }

    fn ispresent_in(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
        chain: &mut ReferenceChain,
    ) -> Option<bool> {
        match self.walk(ts, id, reference, step..reference.subrefs.len(), chain) {
            Walk::Value(value) => Some(!matches!(
                self.arena.kind(value),
                ValueKind::NotUsed | ValueKind::Omit
            )),
            Walk::Absent => Some(false),
            Walk::Unknown => None,
        }
    }

    fn ischosen_in(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
        chain: &mut ReferenceChain,
    ) -> Option<bool> {
        let Some(SubReference::Field { name, .. }) = reference.subrefs.last() else {
            return Some(false);
        };
        let parent = reference.subrefs.len() - 1;
        if step > parent {
            return Some(false);
        }
        match self.walk(ts, id, reference, step..parent, chain) {
            Walk::Value(value) => match self.arena.kind(value) {
                ValueKind::Choice { alternative, .. } | ValueKind::Anytype { alternative, .. } => {
                    Some(alternative == name)
                }
                _ => Some(false),
            },
            Walk::Absent => Some(false),
            Walk::Unknown => None,
        }
    }

    fn isvalue_in(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        from_sequence: bool,
        chain: &mut ReferenceChain,
    ) -> Option<bool> {
        let last = self.get_value_refd_last(ts, id, Expectation::DynamicValue, chain);
        if self.arena.is_erroneous(last) {
            return Some(false);
        }
        let (parts, parts_from_sequence): (Vec<ValueId>, bool) = match self.arena.kind(last) {
            ValueKind::Omit => return Some(from_sequence),
            ValueKind::NotUsed => return Some(false),
            kind if kind.is_symbolic() => return None,
            ValueKind::Record(fields) | ValueKind::Set(fields) => {
                (fields.iter().map(|field| field.value).collect(), true)
            }
            ValueKind::RecordOf(values) | ValueKind::SetOf(values) | ValueKind::Array(values) => {
                (values.elements().collect(), false)
            }
            ValueKind::Choice { value, .. } | ValueKind::Anytype { value, .. } => {
                (vec![*value], false)
            }
            ValueKind::ObjectIdentifier(components) => {
                (components.iter().filter_map(|c| c.number).collect(), false)
            }
            _ => return Some(true),
        };

        tsl_stack::ensure_sufficient_stack(|| {
            let mut known = true;
            for part in parts {
                match self.isvalue_in(ts, part, parts_from_sequence, chain) {
                    Some(false) => return Some(false),
                    Some(true) => {}
                    None => known = false,
                }
            }
            known.then_some(true)
        })
    }

    /// Compile-time value of an introspection expression.
    pub(super) fn fold_introspection(
        &mut self,
        ts: CompilationTimestamp,
        op: IntrospectOp,
        target: ValueId,
        chain: &mut ReferenceChain,
    ) -> Result<Folded, OpError> {
        let answer = match self.arena.kind(target).clone() {
            ValueKind::Referenced(reference) => {
                if op == IntrospectOp::IsChosen
                    && !matches!(reference.subrefs.last(), Some(SubReference::Field { .. }))
                {
                    return Err(OpError::new(
                        ErrorCode::E2001,
                        "the operand of `ischosen` must end in a field reference",
                    ));
                }
                let Some(def) = self.resolve_reference(ts, target, &reference) else {
                    return Ok(Folded::Erroneous);
                };
                let Some(start) = def.value.filter(|_| def.kind.is_foldable()) else {
                    return Ok(Folded::Unfoldable);
                };
                match op {
                    IntrospectOp::IsBound => self.isbound_in(ts, start, &reference, 0, chain),
                    IntrospectOp::IsPresent => self.ispresent_in(ts, start, &reference, 0, chain),
                    IntrospectOp::IsChosen => self.ischosen_in(ts, start, &reference, 0, chain),
                    IntrospectOp::IsValue => {
                        match self.walk(ts, start, &reference, 0..reference.subrefs.len(), chain) {
                            Walk::Value(value) => self.isvalue_in(ts, value, false, chain),
                            Walk::Absent => Some(false),
                            Walk::Unknown => None,
                        }
                    }
                }
            }
            _ if op == IntrospectOp::IsValue => self.isvalue_in(ts, target, false, chain),
            other => {
                return Err(OpError::new(
                    ErrorCode::E2001,
                    format!(
                        "the operand of `{}` must be a reference, found {}",
                        op.name(),
                        other.tag().describe()
                    ),
                ))
            }
        };
        Ok(answer.map_or(Folded::Unfoldable, |b| Folded::Value(ValueKind::Boolean(b))))
    }
}
