//! Storage for every value of a compilation.
//!
//! Values are pushed once and addressed by [`ValueId`]; nothing is removed,
//! so an id stays valid for the arena's life. Folding results, converted
//! representations, string elements and implicit omit fields are derived
//! nodes: each has one slot per producing value, and a later pass
//! overwrites the slot instead of growing the arena.

use num_bigint::BigInt;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use tsl_diagnostic::DiagnosticSink;
use tsl_ir::{Name, Span};
use tsl_lexer::{literal, CharstringExtractor, LiteralError};

use crate::env::TypeId;
use crate::ustring::UniversalCharstring;
use crate::value::{
    BinaryOp, Builtin, Expression, IntrospectOp, MacroKind, NamedValue, NamedValues,
    ObjidComponent, Reference, SubReference, UnaryOp, ValueFlags, ValueKind, ValueNode, Values, Verdict,
};
use crate::ValueId;

/// What a derived node is, relative to the value that produced it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub(crate) enum Derived {
    /// Folded result of an expression or macro.
    Folded,
    /// Converted string, or the item or reference a lower-case identifier
    /// stands for.
    Converted,
    /// Single-element substring at a position.
    Element(usize),
    /// `omit` added for a left-out optional field.
    ImplicitOmit(Name),
}

#[derive(Clone, Debug, Default)]
pub struct ValueArena {
    nodes: Vec<ValueNode>,
    derived: FxHashMap<(ValueId, Derived), ValueId>,
}

fn to_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or_else(|_| panic!("value arena overflow: {len} values"))
}

impl ValueArena {
    pub fn new() -> Self {
        ValueArena::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        ValueArena {
            nodes: Vec::with_capacity(capacity),
            derived: FxHashMap::default(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn push_node(&mut self, node: ValueNode) -> ValueId {
        let id = ValueId::from_raw(to_u32(self.nodes.len()));
        self.nodes.push(node);
        id
    }

    pub fn push(&mut self, kind: ValueKind, span: Span) -> ValueId {
        self.push_node(ValueNode::new(kind, span))
    }

    pub fn push_typed(&mut self, kind: ValueKind, span: Span, ty: TypeId) -> ValueId {
        let mut node = ValueNode::new(kind, span);
        node.ty = Some(ty);
        self.push_node(node)
    }

    /// Push a value created during checking.
    pub(crate) fn push_generated(
        &mut self,
        kind: ValueKind,
        span: Span,
        ty: Option<TypeId>,
    ) -> ValueId {
        let mut node = ValueNode::new(kind, span);
        node.ty = ty;
        node.state.flags.insert(ValueFlags::GENERATED);
        self.push_node(node)
    }

    /// Store the `derived` node of `owner`. The first call pushes it; later
    /// calls overwrite the same node, resetting its cached state.
    pub(crate) fn push_derived(
        &mut self,
        owner: ValueId,
        derived: Derived,
        kind: ValueKind,
        span: Span,
        ty: Option<TypeId>,
    ) -> ValueId {
        let Some(&slot) = self.derived.get(&(owner, derived)) else {
            let id = self.push_generated(kind, span, ty);
            self.derived.insert((owner, derived), id);
            return id;
        };
        let node = self.node_mut(slot);
        *node = ValueNode::new(kind, span);
        node.ty = ty;
        node.state.flags.insert(ValueFlags::GENERATED);
        slot
    }

    #[inline]
    pub fn get(&self, id: ValueId) -> &ValueNode {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: ValueId) -> &mut ValueNode {
        &mut self.nodes[id.index()]
    }

    #[inline]
    pub fn kind(&self, id: ValueId) -> &ValueKind {
        &self.get(id).kind
    }

    #[inline]
    pub fn span(&self, id: ValueId) -> Span {
        self.get(id).span
    }

    #[inline]
    pub fn ty(&self, id: ValueId) -> Option<TypeId> {
        self.get(id).ty
    }

    pub fn set_type(&mut self, id: ValueId, ty: TypeId) {
        self.node_mut(id).ty = Some(ty);
    }

    #[inline]
    pub fn is_erroneous(&self, id: ValueId) -> bool {
        self.get(id).is_erroneous()
    }

    pub fn mark_erroneous(&mut self, id: ValueId) {
        self.node_mut(id).state.flags.insert(ValueFlags::ERRONEOUS);
    }

    /// Direct children: field values, elements, index expressions,
    /// alternative values, accessor indices and operands.
    pub fn children(&self, id: ValueId) -> SmallVec<[ValueId; 4]> {
        match self.kind(id) {
            ValueKind::Choice { value, .. } | ValueKind::Anytype { value, .. } => {
                SmallVec::from_slice(&[*value])
            }
            ValueKind::Record(fields) | ValueKind::Set(fields) => fields.children().into(),
            ValueKind::RecordOf(values) | ValueKind::SetOf(values) | ValueKind::Array(values) => {
                values.children().into()
            }
            ValueKind::ObjectIdentifier(components) => {
                components.iter().filter_map(|c| c.number).collect()
            }
            ValueKind::Referenced(reference) => reference
                .subrefs
                .iter()
                .flat_map(|sub| match sub {
                    SubReference::Index { index, .. } => vec![*index],
                    SubReference::Parameterized { args, .. } => args.clone(),
                    SubReference::Field { .. } => Vec::new(),
                })
                .collect(),
            ValueKind::Expression(expr) => expr.operands().into_iter().collect(),
            _ => SmallVec::new(),
        }
    }

    /// Remove every generated field below `id` (implicit omit entries), so
    /// the tree looks as parsed again. Returns how many were removed.
    pub fn remove_generated_values(&mut self, id: ValueId) -> usize {
        tsl_stack::ensure_sufficient_stack(|| {
            let mut removed = match &mut self.node_mut(id).kind {
                ValueKind::Record(fields) | ValueKind::Set(fields) => fields.remove_generated(),
                _ => 0,
            };
            for child in self.children(id) {
                removed += self.remove_generated_values(child);
            }
            removed
        })
    }

    // === Constructors ===

    pub fn integer(&mut self, value: impl Into<BigInt>, span: Span) -> ValueId {
        self.push(ValueKind::Integer(value.into()), span)
    }

    pub fn real(&mut self, value: f64, span: Span) -> ValueId {
        self.push(ValueKind::Real(value), span)
    }

    pub fn boolean(&mut self, value: bool, span: Span) -> ValueId {
        self.push(ValueKind::Boolean(value), span)
    }

    pub fn verdict(&mut self, value: Verdict, span: Span) -> ValueId {
        self.push(ValueKind::Verdict(value), span)
    }

    /// Charstring from already decoded text.
    pub fn charstring(&mut self, text: impl Into<String>, span: Span) -> ValueId {
        self.push(ValueKind::Charstring(text.into()), span)
    }

    /// Charstring from a literal in source form. `span` covers the quotes.
    /// A literal with a bad escape is reported, becomes the empty string and
    /// is marked erroneous.
    pub fn charstring_literal(
        &mut self,
        literal: &str,
        span: Span,
        sink: &mut dyn DiagnosticSink,
    ) -> ValueId {
        let extractor = CharstringExtractor::new(literal);
        match extractor.into_result() {
            Ok(text) => self.charstring(text, span),
            Err(err) => {
                sink.report(err.to_diagnostic(span.start + 1));
                let id = self.charstring(String::new(), span);
                self.mark_erroneous(id);
                id
            }
        }
    }

    pub fn ucharstring(&mut self, text: UniversalCharstring, span: Span) -> ValueId {
        self.push(ValueKind::UniversalCharstring(text), span)
    }

    /// `'0101'B` given the text between the quotes.
    pub fn bitstring_literal(&mut self, body: &str, span: Span) -> Result<ValueId, LiteralError> {
        let digits = literal::bitstring_body(body)?;
        Ok(self.push(ValueKind::Bitstring(digits), span))
    }

    pub fn hexstring_literal(&mut self, body: &str, span: Span) -> Result<ValueId, LiteralError> {
        let digits = literal::hexstring_body(body)?;
        Ok(self.push(ValueKind::Hexstring(digits), span))
    }

    pub fn octetstring_literal(
        &mut self,
        body: &str,
        span: Span,
    ) -> Result<ValueId, LiteralError> {
        let digits = literal::octetstring_body(body)?;
        Ok(self.push(ValueKind::Octetstring(digits), span))
    }

    pub fn enumerated(&mut self, item: Name, span: Span) -> ValueId {
        self.push(ValueKind::Enumerated(item), span)
    }

    pub fn objid(&mut self, components: Vec<ObjidComponent>, span: Span) -> ValueId {
        self.push(ValueKind::ObjectIdentifier(components), span)
    }

    pub fn choice(&mut self, alternative: Name, value: ValueId, span: Span) -> ValueId {
        self.push(ValueKind::Choice { alternative, value }, span)
    }

    pub fn anytype(&mut self, alternative: Name, value: ValueId, span: Span) -> ValueId {
        self.push(ValueKind::Anytype { alternative, value }, span)
    }

    pub fn record(&mut self, fields: Vec<NamedValue>, span: Span) -> ValueId {
        self.push(ValueKind::Record(NamedValues::new(fields)), span)
    }

    pub fn set(&mut self, fields: Vec<NamedValue>, span: Span) -> ValueId {
        self.push(ValueKind::Set(NamedValues::new(fields)), span)
    }

    pub fn record_of(&mut self, values: impl Into<Values>, span: Span) -> ValueId {
        self.push(ValueKind::RecordOf(values.into()), span)
    }

    pub fn set_of(&mut self, values: impl Into<Values>, span: Span) -> ValueId {
        self.push(ValueKind::SetOf(values.into()), span)
    }

    pub fn array(&mut self, values: impl Into<Values>, span: Span) -> ValueId {
        self.push(ValueKind::Array(values.into()), span)
    }

    pub fn reference(&mut self, reference: Reference) -> ValueId {
        let span = reference.full_span();
        self.push(ValueKind::Referenced(reference), span)
    }

    pub fn lower_identifier(&mut self, name: Name, span: Span) -> ValueId {
        self.push(ValueKind::LowerIdentifier(name), span)
    }

    pub fn macro_value(&mut self, kind: MacroKind, span: Span) -> ValueId {
        self.push(ValueKind::Macro(kind), span)
    }

    pub fn expression(&mut self, expr: Expression, span: Span) -> ValueId {
        self.push(ValueKind::Expression(Box::new(expr)), span)
    }

    pub fn unary(&mut self, op: UnaryOp, operand: ValueId, span: Span) -> ValueId {
        self.expression(Expression::Unary { op, operand }, span)
    }

    pub fn binary(&mut self, op: BinaryOp, left: ValueId, right: ValueId, span: Span) -> ValueId {
        self.expression(Expression::Binary { op, left, right }, span)
    }

    pub fn call(&mut self, func: Builtin, args: &[ValueId], span: Span) -> ValueId {
        self.expression(
            Expression::Call {
                func,
                args: SmallVec::from_slice(args),
            },
            span,
        )
    }

    pub fn introspect(&mut self, op: IntrospectOp, target: ValueId, span: Span) -> ValueId {
        self.expression(Expression::Introspect { op, target }, span)
    }

    pub fn omit(&mut self, span: Span) -> ValueId {
        self.push(ValueKind::Omit, span)
    }

    pub fn not_used(&mut self, span: Span) -> ValueId {
        self.push(ValueKind::NotUsed, span)
    }
}
