//! Incremental edit hook.
//!
//! After a text edit, [`ValueArena::update_syntax`] either moves a value
//! tree to its new location or asks for the tree to be parsed again. Values
//! created during checking have no text of their own and are left alone.

use tsl_ir::incremental::{ChangeMarker, SpanFate};
use tsl_ir::Span;

use crate::arena::ValueArena;
use crate::value::{SubReference, ValueKind, Values};
use crate::ValueId;

/// The edit overlaps a value; its text must be parsed again.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("edit overlaps the value at {span}; it must be parsed again")]
pub struct ReparseRequired {
    pub span: Span,
}

fn moved(marker: &ChangeMarker, span: Span) -> Span {
    match marker.classify(span) {
        SpanFate::Shifted(span) => span,
        SpanFate::Unchanged | SpanFate::Damaged => span,
    }
}

impl ValueArena {
    /// Apply `marker` to `id` and everything below it.
    #[tracing::instrument(level = "trace", skip_all, fields(value = id.raw()))]
    pub fn update_syntax(
        &mut self,
        id: ValueId,
        marker: &ChangeMarker,
    ) -> Result<(), ReparseRequired> {
        let node = self.get(id);
        if node.is_generated() {
            return Ok(());
        }
        let span = node.span;
        match marker.classify(span) {
            SpanFate::Damaged => {
                tracing::debug!(value = id.raw(), %span, "value damaged by edit");
                return Err(ReparseRequired { span });
            }
            // Children lie inside the span.
            SpanFate::Unchanged => return Ok(()),
            SpanFate::Shifted(new_span) => {
                let node = self.node_mut(id);
                node.span = new_span;
                shift_inner_spans(&mut node.kind, marker);
            }
        }

        tsl_stack::ensure_sufficient_stack(|| {
            for child in self.children(id) {
                self.update_syntax(child, marker)?;
            }
            Ok(())
        })
    }
}

/// Spans stored inside the kind rather than in child nodes.
fn shift_inner_spans(kind: &mut ValueKind, marker: &ChangeMarker) {
    match kind {
        ValueKind::Record(fields) | ValueKind::Set(fields) => {
            for field in fields.entries_mut().filter(|field| field.parsed) {
                field.name_span = moved(marker, field.name_span);
            }
        }
        ValueKind::RecordOf(Values::Indexed(entries))
        | ValueKind::SetOf(Values::Indexed(entries))
        | ValueKind::Array(Values::Indexed(entries)) => {
            for entry in entries {
                entry.span = moved(marker, entry.span);
            }
        }
        ValueKind::ObjectIdentifier(components) => {
            for component in components {
                component.span = moved(marker, component.span);
            }
        }
        ValueKind::Referenced(reference) => {
            reference.span = moved(marker, reference.span);
            for sub in &mut reference.subrefs {
                let (SubReference::Field { span, .. }
                | SubReference::Index { span, .. }
                | SubReference::Parameterized { span, .. }) = sub;
                *span = moved(marker, *span);
            }
        }
        _ => {}
    }
}
