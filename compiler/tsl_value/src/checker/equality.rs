//! Structural equality of folded values.

use std::collections::BTreeMap;

use num_bigint::BigInt;

use crate::chain::ReferenceChain;
use crate::env::{DefId, TypeShape};
use crate::timestamp::CompilationTimestamp;
use crate::ustring::UniversalCharstring;
use crate::value::{
    Expectation, NamedValues, ObjidComponent, Reference, SubReference, ValueKind, Values,
};
use crate::ValueId;

use super::ValueChecker;

impl ValueChecker<'_> {
    /// Whether `id` and `other` denote the same value once both are folded
    /// and converted to the representation of their governing types.
    #[tracing::instrument(level = "trace", skip_all, fields(value = id.raw(), other = other.raw()))]
    pub fn check_equality(&mut self, ts: CompilationTimestamp, id: ValueId, other: ValueId) -> bool {
        let mut chain = ReferenceChain::new();
        self.equal_values(ts, id, other, &mut chain)
    }

    pub(super) fn equal_values(
        &mut self,
        ts: CompilationTimestamp,
        a: ValueId,
        b: ValueId,
        chain: &mut ReferenceChain,
    ) -> bool {
        tsl_stack::ensure_sufficient_stack(|| {
            let a = self.effective_value(ts, a, chain);
            let b = self.effective_value(ts, b, chain);
            if a == b {
                return true;
            }
            if self.arena.is_erroneous(a) || self.arena.is_erroneous(b) {
                return false;
            }

            match (self.arena.kind(a).clone(), self.arena.kind(b).clone()) {
                (ValueKind::Integer(x), ValueKind::Integer(y)) => x == y,
                // `not_a_number` equals itself.
                (ValueKind::Real(x), ValueKind::Real(y)) => x == y || (x.is_nan() && y.is_nan()),
                (ValueKind::Boolean(x), ValueKind::Boolean(y)) => x == y,
                (ValueKind::Verdict(x), ValueKind::Verdict(y)) => x == y,
                (ValueKind::Charstring(x), ValueKind::Charstring(y))
                | (ValueKind::Bitstring(x), ValueKind::Bitstring(y))
                | (ValueKind::Hexstring(x), ValueKind::Hexstring(y))
                | (ValueKind::Octetstring(x), ValueKind::Octetstring(y)) => x == y,
                (ValueKind::UniversalCharstring(x), ValueKind::UniversalCharstring(y)) => x == y,
                (ValueKind::Charstring(x), ValueKind::UniversalCharstring(y))
                | (ValueKind::UniversalCharstring(y), ValueKind::Charstring(x)) => {
                    UniversalCharstring::from(x.as_str()) == y
                }
                (ValueKind::Enumerated(x), ValueKind::Enumerated(y)) => x == y,
                (ValueKind::ObjectIdentifier(x), ValueKind::ObjectIdentifier(y)) => {
                    self.objids_equal(ts, &x, &y, chain)
                }
                (
                    ValueKind::Choice { alternative: p, value: v },
                    ValueKind::Choice { alternative: q, value: w },
                )
                | (
                    ValueKind::Anytype { alternative: p, value: v },
                    ValueKind::Anytype { alternative: q, value: w },
                ) => p == q && self.equal_values(ts, v, w, chain),
                (ValueKind::Record(x), ValueKind::Record(y)) => {
                    self.records_equal(ts, &x, &y, chain)
                }
                (ValueKind::Set(x), ValueKind::Set(y)) => {
                    match self.shape(a).or_else(|| self.shape(b)) {
                        Some(shape) if shape.has_fields() => {
                            self.sets_equal(ts, shape, &x, &y, chain)
                        }
                        _ => self.records_equal(ts, &x, &y, chain),
                    }
                }
                (ValueKind::RecordOf(x), ValueKind::RecordOf(y))
                | (ValueKind::Array(x), ValueKind::Array(y)) => {
                    let left = self.index_map(ts, a, &x, chain);
                    let right = self.index_map(ts, b, &y, chain);
                    match (left, right) {
                        (Some(left), Some(right)) => {
                            left.len() == right.len()
                                && left.into_iter().zip(right).all(|((i, v), (j, w))| {
                                    i == j && self.equal_values(ts, v, w, chain)
                                })
                        }
                        _ => false,
                    }
                }
                (ValueKind::SetOf(x), ValueKind::SetOf(y)) => {
                    self.multisets_equal(ts, &x, &y, chain)
                }
                (ValueKind::Omit, ValueKind::Omit) | (ValueKind::NotUsed, ValueKind::NotUsed) => {
                    true
                }
                (ValueKind::Referenced(x), ValueKind::Referenced(y)) => {
                    self.references_equal(ts, (a, &x), (b, &y), chain)
                }
                (ValueKind::Macro(x), ValueKind::Macro(y)) => x == y,
                _ => false,
            }
        })
    }

    fn records_equal(
        &mut self,
        ts: CompilationTimestamp,
        x: &NamedValues,
        y: &NamedValues,
        chain: &mut ReferenceChain,
    ) -> bool {
        x.len() == y.len()
            && x.iter().all(|field| {
                y.get(field.name)
                    .is_some_and(|other| self.equal_values(ts, field.value, other.value, chain))
            })
    }

    /// Compare per component of the set type. A left-out field stands for
    /// the component default, or `omit` when there is none.
    fn sets_equal(
        &mut self,
        ts: CompilationTimestamp,
        shape: &TypeShape,
        x: &NamedValues,
        y: &NamedValues,
        chain: &mut ReferenceChain,
    ) -> bool {
        shape.components().iter().all(|component| {
            let left = x.get(component.name).map(|f| f.value).or(component.default);
            let right = y.get(component.name).map(|f| f.value).or(component.default);
            match (left, right) {
                (None, None) => true,
                (Some(v), None) | (None, Some(v)) => self.is_omit(ts, v, chain),
                (Some(v), Some(w)) => self.equal_values(ts, v, w, chain),
            }
        })
    }

    fn is_omit(&mut self, ts: CompilationTimestamp, id: ValueId, chain: &mut ReferenceChain) -> bool {
        let last = self.get_value_refd_last(ts, id, Expectation::DynamicValue, chain);
        matches!(self.arena.kind(last), ValueKind::Omit)
    }

    /// Logical index of every element, in index order. Dense array
    /// positions are shifted by the lower bound. `None` when an index has no
    /// compile-time value. The first entry for a repeated index wins.
    fn index_map(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        values: &Values,
        chain: &mut ReferenceChain,
    ) -> Option<BTreeMap<BigInt, ValueId>> {
        let mut map = BTreeMap::new();
        match values {
            Values::Dense(elements) => {
                let offset = self
                    .shape(id)
                    .and_then(TypeShape::dimension)
                    .map_or(0, |dim| dim.offset);
                for (position, &element) in elements.iter().enumerate() {
                    map.insert(BigInt::from(offset) + position, element);
                }
            }
            Values::Indexed(entries) => {
                for entry in entries {
                    let index =
                        self.get_value_refd_last(ts, entry.index, Expectation::DynamicValue, chain);
                    let ValueKind::Integer(i) = self.arena.kind(index) else {
                        return None;
                    };
                    map.entry(i.clone()).or_insert(entry.value);
                }
            }
        }
        Some(map)
    }

    /// Unordered comparison: every element of `x` must take a distinct
    /// equal element out of the pool built from `y`.
    fn multisets_equal(
        &mut self,
        ts: CompilationTimestamp,
        x: &Values,
        y: &Values,
        chain: &mut ReferenceChain,
    ) -> bool {
        let mut pool: Vec<ValueId> = y.elements().collect();
        if x.len() != pool.len() {
            return false;
        }
        for element in x.elements() {
            let Some(found) = pool
                .iter()
                .position(|&candidate| self.equal_values(ts, element, candidate, chain))
            else {
                return false;
            };
            pool.swap_remove(found);
        }
        true
    }

    fn objids_equal(
        &mut self,
        ts: CompilationTimestamp,
        x: &[ObjidComponent],
        y: &[ObjidComponent],
        chain: &mut ReferenceChain,
    ) -> bool {
        x.len() == y.len()
            && x.iter().zip(y).all(|(p, q)| match (p.number, q.number) {
                (Some(m), Some(n)) => self.equal_values(ts, m, n, chain),
                _ => p.name.is_some() && p.name == q.name,
            })
    }

    /// Two references that stay unfoldable are equal only when they name
    /// the same definition through the same accessors.
    fn references_equal(
        &mut self,
        ts: CompilationTimestamp,
        (a, x): (ValueId, &Reference),
        (b, y): (ValueId, &Reference),
        chain: &mut ReferenceChain,
    ) -> bool {
        let same_definition = match (self.definition_of(ts, a, x), self.definition_of(ts, b, y)) {
            (Some(p), Some(q)) => p == q,
            _ => false,
        };
        same_definition
            && x.subrefs.len() == y.subrefs.len()
            && x.subrefs.iter().zip(&y.subrefs).all(|pair| match pair {
                (
                    SubReference::Field { name: p, .. },
                    SubReference::Field { name: q, .. },
                ) => p == q,
                (
                    SubReference::Index { index: i, .. },
                    SubReference::Index { index: j, .. },
                ) => self.equal_values(ts, *i, *j, chain),
                _ => false,
            })
    }

    fn definition_of(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
    ) -> Option<DefId> {
        self.resolve_reference(ts, id, reference)?;
        self.arena.get(id).state.resolved.and_then(|(_, def)| def)
    }
}

#[cfg(test)]
mod tests;
