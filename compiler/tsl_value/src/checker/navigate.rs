//! One accessor step into a composite or string value.

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive};
use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::{Name, Span};

use crate::arena::Derived;
use crate::chain::ReferenceChain;
use crate::env::{Component, DimensionViolation, TypeShape};
use crate::timestamp::CompilationTimestamp;
use crate::value::{Expectation, Reference, SubReference, ValueKind, Values};
use crate::ValueId;

use super::operators::Units;
use super::ValueChecker;

/// Whether navigation problems are errors or quiet "not bound" answers.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum NavMode {
    Normal,
    /// Inside `isbound`, `ispresent`, `isvalue` and `ischosen`: nothing is
    /// reported and every failure reads as absent.
    Introspection,
}

/// Outcome of a single step.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Step {
    Found(ValueId),
    /// Legal accessor, but the value has nothing there.
    Missing,
    /// The value or the index has no compile-time value.
    Unfoldable,
    /// Illegal accessor; reported unless introspecting.
    Invalid,
}

enum FieldLookup {
    Found(ValueId),
    Absent,
    Inactive(Name),
    NoFields,
}

impl ValueChecker<'_> {
    /// Apply accessor `step` of `reference` to `id`. Returns the sub-value,
    /// or `None` after reporting why there is none.
    #[tracing::instrument(level = "trace", skip_all, fields(value = id.raw(), step))]
    pub fn get_referenced_sub_value(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
        chain: &mut ReferenceChain,
        mode: NavMode,
    ) -> Option<ValueId> {
        match self.step_into(ts, id, reference, step, mode, chain) {
            Step::Found(value) => Some(value),
            Step::Missing | Step::Unfoldable | Step::Invalid => None,
        }
    }

    pub(crate) fn step_into(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        reference: &Reference,
        step: usize,
        mode: NavMode,
        chain: &mut ReferenceChain,
    ) -> Step {
        let Some(subref) = reference.subrefs.get(step) else {
            return Step::Found(id);
        };
        let target = self.get_value_refd_last(ts, id, Expectation::DynamicValue, chain);
        if self.arena.is_erroneous(target) {
            return Step::Invalid;
        }
        if self.arena.kind(target).is_symbolic() {
            return Step::Unfoldable;
        }

        match subref {
            SubReference::Field { name, span } => self.field_step(target, *name, *span, mode),
            SubReference::Index { index, span } => {
                self.index_step(ts, target, *index, *span, mode, chain)
            }
            SubReference::Parameterized { span, .. } => {
                let tag = self.arena.kind(target).tag();
                let diag = Diagnostic::error(ErrorCode::E1009)
                    .with_message(format!(
                        "invalid reference: a {} value cannot take actual parameters",
                        tag.describe()
                    ))
                    .with_label(*span, "parameters are not allowed here");
                self.nav_error(mode, diag)
            }
        }
    }

    fn nav_error(&mut self, mode: NavMode, diagnostic: Diagnostic) -> Step {
        if mode == NavMode::Normal {
            self.report(diagnostic);
            Step::Invalid
        } else {
            Step::Missing
        }
    }

    fn field_step(&mut self, target: ValueId, name: Name, span: Span, mode: NavMode) -> Step {
        let shape = self.shape(target).filter(|shape| shape.has_fields());
        let kind = self.arena.kind(target);
        let tag = kind.tag();
        let lookup = match kind {
            ValueKind::Record(fields) | ValueKind::Set(fields) => match fields.get(name) {
                Some(field) => FieldLookup::Found(field.value),
                None => FieldLookup::Absent,
            },
            ValueKind::Choice { alternative, value } | ValueKind::Anytype { alternative, value } => {
                if *alternative == name {
                    FieldLookup::Found(*value)
                } else {
                    FieldLookup::Inactive(*alternative)
                }
            }
            _ => FieldLookup::NoFields,
        };

        let interner = self.interner();
        let field = interner.lookup(name);
        let nonexistent = |type_name: &str| {
            Diagnostic::error(ErrorCode::E1001)
                .with_message(format!(
                    "reference to nonexistent field `{field}` in a value of {type_name} type"
                ))
                .with_label(span, "no such field")
        };

        let lacks_field = shape.is_some_and(|shape| shape.component(name).is_none());
        match lookup {
            FieldLookup::NoFields => {
                let diag = Diagnostic::error(ErrorCode::E1009)
                    .with_message(format!(
                        "invalid field reference `{field}`: a {} value has no fields",
                        tag.describe()
                    ))
                    .with_label(span, "field access not allowed here");
                self.nav_error(mode, diag)
            }
            _ if lacks_field => self.nav_error(mode, nonexistent(tag.describe())),
            FieldLookup::Found(value) => Step::Found(value),
            // Without a type a missing name cannot be told apart from a
            // misspelling.
            FieldLookup::Absent if shape.is_none() => {
                self.nav_error(mode, nonexistent(tag.describe()))
            }
            FieldLookup::Absent => match shape.and_then(|shape| shape.component(name)) {
                Some(component) if component.optional => Step::Missing,
                Some(&Component {
                    default: Some(default),
                    ..
                }) => Step::Found(default),
                _ => {
                    let diag = Diagnostic::error(ErrorCode::E1010)
                        .with_message(format!(
                            "reference to unbound field `{field}`: the {} value leaves it out",
                            tag.describe()
                        ))
                        .with_label(span, "field not assigned");
                    self.nav_error(mode, diag)
                }
            },
            FieldLookup::Inactive(active) => {
                let diag = Diagnostic::error(ErrorCode::E1002)
                    .with_message(format!(
                        "reference to inactive field `{field}` in a value of {} type; the active field is `{}`",
                        tag.describe(),
                        interner.lookup(active)
                    ))
                    .with_label(span, "not the chosen alternative");
                self.nav_error(mode, diag)
            }
        }
    }

    fn index_step(
        &mut self,
        ts: CompilationTimestamp,
        target: ValueId,
        index: ValueId,
        span: Span,
        mode: NavMode,
        chain: &mut ReferenceChain,
    ) -> Step {
        let folded = self.get_value_refd_last(ts, index, Expectation::DynamicValue, chain);
        let i = match self.arena.kind(folded) {
            ValueKind::Integer(i) => i.clone(),
            kind if kind.is_symbolic() => return Step::Unfoldable,
            _ if self.arena.is_erroneous(folded) => return Step::Invalid,
            kind => {
                let diag = Diagnostic::error(ErrorCode::E1003)
                    .with_message(format!(
                        "index must be an integer value, found {}",
                        kind.tag().describe()
                    ))
                    .with_label(span, "not an integer");
                return self.nav_error(mode, diag);
            }
        };

        let dimension = self.shape(target).and_then(TypeShape::dimension);
        let kind = self.arena.kind(target);
        let tag = kind.tag();

        if let Some(values) = kind.list_values().cloned() {
            let position = match dimension {
                Some(dim) => {
                    let logical = i.to_i64().unwrap_or(if i.is_negative() { i64::MIN } else { i64::MAX });
                    match dim.position(logical) {
                        Ok(position) => position,
                        Err(DimensionViolation::Underflow { lowest }) => {
                            let diag = Diagnostic::error(ErrorCode::E1006)
                                .with_message(format!(
                                    "array index underflow: the index should be at least {lowest} instead of {i}"
                                ))
                                .with_label(span, "below the lower bound");
                            return self.nav_error(mode, diag);
                        }
                        Err(DimensionViolation::Overflow { highest }) => {
                            let diag = Diagnostic::error(ErrorCode::E1007)
                                .with_message(format!(
                                    "array index overflow: the index should be at most {highest} instead of {i}"
                                ))
                                .with_label(span, "above the upper bound");
                            return self.nav_error(mode, diag);
                        }
                    }
                }
                None => match self.plain_position(&i, span, mode) {
                    Ok(position) => position,
                    Err(step) => return step,
                },
            };
            return match values {
                Values::Dense(elements) => match elements.get(position) {
                    Some(&element) => Step::Found(element),
                    None => {
                        let diag = overflow(&i, elements.len(), span);
                        self.nav_error(mode, diag)
                    }
                },
                Values::Indexed(entries) => {
                    for entry in &entries {
                        let stored = self.get_value_refd_last(ts, entry.index, Expectation::DynamicValue, chain);
                        if matches!(self.arena.kind(stored), ValueKind::Integer(n) if *n == i) {
                            return Step::Found(entry.value);
                        }
                    }
                    let diag = Diagnostic::error(ErrorCode::E1008)
                        .with_message(format!("there is no value assigned to index {i}"))
                        .with_label(span, "unassigned index");
                    self.nav_error(mode, diag)
                }
            };
        }

        if let Some(units) = Units::of(kind) {
            let position = match self.plain_position(&i, span, mode) {
                Ok(position) => position,
                Err(step) => return step,
            };
            return match units.element(position) {
                Some(element) => {
                    let ty = self.arena.ty(target);
                    Step::Found(self.arena.push_derived(
                        target,
                        Derived::Element(position),
                        element,
                        span,
                        ty,
                    ))
                }
                None => {
                    let diag = overflow(&i, units.len(), span);
                    self.nav_error(mode, diag)
                }
            };
        }

        let diag = Diagnostic::error(ErrorCode::E1009)
            .with_message(format!(
                "invalid array element reference: a {} value cannot be indexed",
                tag.describe()
            ))
            .with_label(span, "indexing not allowed here");
        self.nav_error(mode, diag)
    }

    /// Zero-based position for a list without array bounds, or a string.
    fn plain_position(&mut self, i: &BigInt, span: Span, mode: NavMode) -> Result<usize, Step> {
        if i.is_negative() {
            let diag = Diagnostic::error(ErrorCode::E1004)
                .with_message(format!(
                    "a non-negative integer value was expected as index instead of {i}"
                ))
                .with_label(span, "negative index");
            return Err(self.nav_error(mode, diag));
        }
        Ok(i.to_usize().unwrap_or(usize::MAX))
    }
}

fn overflow(i: &BigInt, len: usize, span: Span) -> Diagnostic {
    Diagnostic::error(ErrorCode::E1005)
        .with_message(format!(
            "index overflow: the index should be less than {len} instead of {i}"
        ))
        .with_label(span, "past the end")
}
