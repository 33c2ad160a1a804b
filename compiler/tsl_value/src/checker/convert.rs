//! Conversions driven by the governing type: string representations and
//! lower-case identifiers.

use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::Span;

use crate::arena::Derived;
use crate::chain::ReferenceChain;
use crate::env::TypeShape;
use crate::timestamp::{is_fresh, CompilationTimestamp};
use crate::ustring::UniversalCharstring;
use crate::value::{Expectation, NamedValue, Reference, ValueKind};
use crate::ValueId;

use super::operators::bits_to_hex;
use super::ValueChecker;

/// Append zeros until the length is a multiple of `multiple`.
fn pad_right(digits: &str, multiple: usize) -> String {
    let missing = (multiple - digits.len() % multiple) % multiple;
    let mut padded = digits.to_owned();
    padded.extend(std::iter::repeat('0').take(missing));
    padded
}

impl ValueChecker<'_> {
    /// `id` in the representation its governing type asks for: a bit or hex
    /// string typed as octetstring becomes octets (zero-filled at the end),
    /// universal charstrings typed as charstring are narrowed and
    /// charstrings typed as universal charstring are widened. Anything else
    /// is returned unchanged.
    #[tracing::instrument(level = "trace", skip_all, fields(value = id.raw()))]
    pub fn convert_string(&mut self, ts: CompilationTimestamp, id: ValueId) -> ValueId {
        if let Some((stamp, result)) = self.arena.get(id).state.converted {
            if is_fresh(Some(stamp), ts) {
                return result;
            }
        }
        let result = self.convert_uncached(id);
        self.arena.node_mut(id).state.converted = Some((ts, result));
        result
    }

    fn convert_uncached(&mut self, id: ValueId) -> ValueId {
        let Some(shape) = self.shape(id) else {
            return id;
        };
        let span = self.arena.span(id);
        let converted = match (shape, self.arena.kind(id).clone()) {
            (TypeShape::Octetstring, ValueKind::Bitstring(bits)) => {
                ValueKind::Octetstring(bits_to_hex(&pad_right(&bits, 8)))
            }
            (TypeShape::Octetstring, ValueKind::Hexstring(hex)) => {
                ValueKind::Octetstring(pad_right(&hex, 2))
            }
            (TypeShape::UniversalCharstring, ValueKind::Charstring(text)) => {
                ValueKind::UniversalCharstring(UniversalCharstring::from(text.as_str()))
            }
            (TypeShape::Charstring, ValueKind::UniversalCharstring(text)) => match text.narrow() {
                Ok(narrowed) => {
                    if self.config.warn_on_non_ascii_narrowing {
                        for index in narrowed.high_cells {
                            let diag = Diagnostic::warning(ErrorCode::W3001)
                                .with_message(format!(
                                    "character at position {index} is above 127 and is kept as one byte"
                                ))
                                .with_label(span, "in this string");
                            self.report(diag);
                        }
                    }
                    ValueKind::Charstring(narrowed.text)
                }
                Err(err) => {
                    let diag = Diagnostic::error(ErrorCode::E3003)
                        .with_message(format!("universal charstring cannot be converted: {err}"))
                        .with_label(span, "expected a charstring");
                    self.error_at(id, diag);
                    return id;
                }
            },
            _ => return id,
        };
        tracing::trace!(value = id.raw(), "converted string representation");
        let ty = self.arena.ty(id);
        self.arena.push_derived(id, Derived::Converted, converted, span, ty)
    }

    /// Folded and converted form of `id`, the one equality compares.
    pub(crate) fn effective_value(
        &mut self,
        ts: CompilationTimestamp,
        id: ValueId,
        chain: &mut ReferenceChain,
    ) -> ValueId {
        let last = self.get_value_refd_last(ts, id, Expectation::DynamicValue, chain);
        if self.arena.is_erroneous(last) || self.arena.kind(last).is_symbolic() {
            return last;
        }
        self.convert_string(ts, last)
    }

    /// A lower-case identifier is an item when the governing type is an
    /// enumeration listing it, otherwise a reference.
    pub(crate) fn resolve_lower_identifier(&mut self, ts: CompilationTimestamp, id: ValueId) -> ValueId {
        if let Some((stamp, result)) = self.arena.get(id).state.converted {
            if is_fresh(Some(stamp), ts) {
                return result;
            }
        }
        let ValueKind::LowerIdentifier(name) = *self.arena.kind(id) else {
            return id;
        };
        let span = self.arena.span(id);
        let ty = self.arena.ty(id);
        let is_item = self
            .shape(id)
            .is_some_and(|shape| shape.item_index(name).is_some());
        let kind = if is_item {
            ValueKind::Enumerated(name)
        } else {
            ValueKind::Referenced(Reference::new(name, span))
        };
        let result = self.arena.push_derived(id, Derived::Converted, kind, span, ty);
        self.arena.node_mut(id).state.converted = Some((ts, result));
        result
    }

    /// Add `omit` for every optional field of the governing record or set
    /// type that the value leaves out. Returns the number added.
    pub fn add_implicit_omits(&mut self, id: ValueId) -> usize {
        let Some(shape) = self.shape(id) else {
            return 0;
        };
        let Some(fields) = self.arena.kind(id).named_values() else {
            return 0;
        };
        let missing: Vec<_> = shape
            .components()
            .iter()
            .filter(|component| component.optional && !fields.has(component.name))
            .map(|component| (component.name, component.ty))
            .collect();
        if missing.is_empty() {
            return 0;
        }

        let at = Span::point(self.arena.span(id).end);
        let added: Vec<NamedValue> = missing
            .into_iter()
            .map(|(name, ty)| {
                let omit =
                    self.arena
                        .push_derived(id, Derived::ImplicitOmit(name), ValueKind::Omit, at, Some(ty));
                NamedValue {
                    name,
                    name_span: at,
                    value: omit,
                    parsed: false,
                }
            })
            .collect();
        let count = added.len();
        if let ValueKind::Record(fields) | ValueKind::Set(fields) = &mut self.arena.node_mut(id).kind {
            for field in added {
                fields.add(field);
            }
        }
        tracing::debug!(value = id.raw(), count, "added implicit omit fields");
        count
    }
}
