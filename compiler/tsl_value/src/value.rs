//! The value variant.
//!
//! A value is a node in the [`ValueArena`](crate::ValueArena) addressed by a
//! [`ValueId`]. Composite kinds hold the ids of their children; symbolic
//! kinds (references, expressions, macros, unresolved lower-case
//! identifiers) are reduced to concrete ones by the folding engine.

mod expr;
mod named;
mod values;

use std::fmt;

use bitflags::bitflags;
use num_bigint::BigInt;
use smallvec::SmallVec;
use tsl_ir::{Name, Span, Spanned};

use crate::env::{DefId, TypeId};
use crate::timestamp::CompilationTimestamp;
use crate::ustring::UniversalCharstring;

pub use expr::{BinaryOp, Builtin, Expression, IntrospectOp, UnaryOp};
pub use named::{NamedValue, NamedValues};
pub use values::{IndexedValue, Values};

/// Index of a value in its arena.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ValueId(u32);

impl ValueId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        ValueId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({})", self.0)
    }
}

/// Evaluation context a value is folded for.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Expectation {
    /// Known at compile time.
    Constant,
    /// Fixed before execution starts (module parameters allowed).
    StaticValue,
    /// Any runtime value.
    DynamicValue,
    /// Matching context.
    Template,
}

/// Stable kind tag, one per [`ValueKind`] variant.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ValueTag {
    Integer,
    Real,
    Boolean,
    Verdict,
    Charstring,
    UniversalCharstring,
    Bitstring,
    Hexstring,
    Octetstring,
    Enumerated,
    ObjectIdentifier,
    Choice,
    Anytype,
    Record,
    Set,
    RecordOf,
    SetOf,
    Array,
    Referenced,
    LowerIdentifier,
    Macro,
    Expression,
    Omit,
    NotUsed,
}

impl ValueTag {
    /// Kind name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            ValueTag::Integer => "integer",
            ValueTag::Real => "float",
            ValueTag::Boolean => "boolean",
            ValueTag::Verdict => "verdict",
            ValueTag::Charstring => "charstring",
            ValueTag::UniversalCharstring => "universal charstring",
            ValueTag::Bitstring => "bitstring",
            ValueTag::Hexstring => "hexstring",
            ValueTag::Octetstring => "octetstring",
            ValueTag::Enumerated => "enumerated",
            ValueTag::ObjectIdentifier => "objid",
            ValueTag::Choice => "union",
            ValueTag::Anytype => "anytype",
            ValueTag::Record => "record",
            ValueTag::Set => "set",
            ValueTag::RecordOf => "record of",
            ValueTag::SetOf => "set of",
            ValueTag::Array => "array",
            ValueTag::Referenced => "reference",
            ValueTag::LowerIdentifier => "identifier",
            ValueTag::Macro => "macro",
            ValueTag::Expression => "expression",
            ValueTag::Omit => "omit",
            ValueTag::NotUsed => "not used symbol",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Verdict {
    None,
    Pass,
    Inconc,
    Fail,
    Error,
}

impl Verdict {
    pub fn as_str(self) -> &'static str {
        match self {
            Verdict::None => "none",
            Verdict::Pass => "pass",
            Verdict::Inconc => "inconc",
            Verdict::Fail => "fail",
            Verdict::Error => "error",
        }
    }
}

/// Compile-time quantities written as macros.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum MacroKind {
    /// `%moduleId`
    ModuleId,
    /// `%definitionId`
    DefinitionId,
    /// `%testcaseId`
    TestcaseId,
    /// `%fileName`
    FileName,
    /// `__BFILE__`
    BaseFileName,
    /// `__FILE__`
    FilePath,
    /// `%lineNumber`, a charstring
    LineNumber,
    /// `__LINE__`, an integer
    LineNumberInteger,
    /// `__SCOPE__`
    Scope,
}

impl MacroKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MacroKind::ModuleId => "%moduleId",
            MacroKind::DefinitionId => "%definitionId",
            MacroKind::TestcaseId => "%testcaseId",
            MacroKind::FileName => "%fileName",
            MacroKind::BaseFileName => "__BFILE__",
            MacroKind::FilePath => "__FILE__",
            MacroKind::LineNumber => "%lineNumber",
            MacroKind::LineNumberInteger => "__LINE__",
            MacroKind::Scope => "__SCOPE__",
        }
    }
}

/// One accessor step after the root identifier of a reference.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum SubReference {
    /// `.name`
    Field { name: Name, span: Span },
    /// `[index]`
    Index { index: ValueId, span: Span },
    /// `name(args)`, legal only on parameterized definitions.
    Parameterized {
        name: Name,
        args: Vec<ValueId>,
        span: Span,
    },
}

impl Spanned for SubReference {
    fn span(&self) -> Span {
        match self {
            SubReference::Field { span, .. }
            | SubReference::Index { span, .. }
            | SubReference::Parameterized { span, .. } => *span,
        }
    }
}

/// A symbolic reference: root identifier plus accessor steps.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Reference {
    pub id: Name,
    pub span: Span,
    pub subrefs: SmallVec<[SubReference; 2]>,
}

impl Reference {
    pub fn new(id: Name, span: Span) -> Self {
        Reference {
            id,
            span,
            subrefs: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn field(mut self, name: Name, span: Span) -> Self {
        self.subrefs.push(SubReference::Field { name, span });
        self
    }

    #[must_use]
    pub fn index(mut self, index: ValueId, span: Span) -> Self {
        self.subrefs.push(SubReference::Index { index, span });
        self
    }

    /// Span of the identifier plus every step.
    pub fn full_span(&self) -> Span {
        self.subrefs
            .iter()
            .fold(self.span, |span, sub| span.merge(sub.span()))
    }
}

/// Object identifier component: `name`, `number` or `name(number)`.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObjidComponent {
    pub name: Option<Name>,
    pub number: Option<ValueId>,
    pub span: Span,
}

#[derive(Clone, Debug)]
pub enum ValueKind {
    Integer(BigInt),
    Real(f64),
    Boolean(bool),
    Verdict(Verdict),
    Charstring(String),
    UniversalCharstring(UniversalCharstring),
    /// Canonical digits, no quotes or suffix.
    Bitstring(String),
    /// Canonical uppercase digits.
    Hexstring(String),
    /// Canonical uppercase digits, even count.
    Octetstring(String),
    Enumerated(Name),
    ObjectIdentifier(Vec<ObjidComponent>),
    Choice { alternative: Name, value: ValueId },
    Anytype { alternative: Name, value: ValueId },
    Record(NamedValues),
    Set(NamedValues),
    RecordOf(Values),
    SetOf(Values),
    Array(Values),
    Referenced(Reference),
    /// Lower-case identifier not yet known to be an enumeration item or a
    /// reference.
    LowerIdentifier(Name),
    Macro(MacroKind),
    Expression(Box<Expression>),
    Omit,
    NotUsed,
}

impl ValueKind {
    pub fn tag(&self) -> ValueTag {
        match self {
            ValueKind::Integer(_) => ValueTag::Integer,
            ValueKind::Real(_) => ValueTag::Real,
            ValueKind::Boolean(_) => ValueTag::Boolean,
            ValueKind::Verdict(_) => ValueTag::Verdict,
            ValueKind::Charstring(_) => ValueTag::Charstring,
            ValueKind::UniversalCharstring(_) => ValueTag::UniversalCharstring,
            ValueKind::Bitstring(_) => ValueTag::Bitstring,
            ValueKind::Hexstring(_) => ValueTag::Hexstring,
            ValueKind::Octetstring(_) => ValueTag::Octetstring,
            ValueKind::Enumerated(_) => ValueTag::Enumerated,
            ValueKind::ObjectIdentifier(_) => ValueTag::ObjectIdentifier,
            ValueKind::Choice { .. } => ValueTag::Choice,
            ValueKind::Anytype { .. } => ValueTag::Anytype,
            ValueKind::Record(_) => ValueTag::Record,
            ValueKind::Set(_) => ValueTag::Set,
            ValueKind::RecordOf(_) => ValueTag::RecordOf,
            ValueKind::SetOf(_) => ValueTag::SetOf,
            ValueKind::Array(_) => ValueTag::Array,
            ValueKind::Referenced(_) => ValueTag::Referenced,
            ValueKind::LowerIdentifier(_) => ValueTag::LowerIdentifier,
            ValueKind::Macro(_) => ValueTag::Macro,
            ValueKind::Expression(_) => ValueTag::Expression,
            ValueKind::Omit => ValueTag::Omit,
            ValueKind::NotUsed => ValueTag::NotUsed,
        }
    }

    /// Kinds the folding engine reduces further.
    #[inline]
    pub fn is_symbolic(&self) -> bool {
        matches!(
            self,
            ValueKind::Referenced(_)
                | ValueKind::LowerIdentifier(_)
                | ValueKind::Macro(_)
                | ValueKind::Expression(_)
        )
    }

    pub(crate) fn named_values(&self) -> Option<&NamedValues> {
        match self {
            ValueKind::Record(fields) | ValueKind::Set(fields) => Some(fields),
            _ => None,
        }
    }

    pub(crate) fn list_values(&self) -> Option<&Values> {
        match self {
            ValueKind::RecordOf(values) | ValueKind::SetOf(values) | ValueKind::Array(values) => {
                Some(values)
            }
            _ => None,
        }
    }
}

bitflags! {
    #[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
    pub struct ValueFlags: u8 {
        /// A semantic error was reported for this value. Sticky.
        const ERRONEOUS = 1;
        /// Created during checking rather than parsed.
        const GENERATED = 1 << 1;
    }
}

/// Derived state, valid only for the pass it is stamped with.
#[derive(Clone, Debug, Default)]
pub(crate) struct ValueState {
    pub(crate) flags: ValueFlags,
    pub(crate) last_time_checked: Option<CompilationTimestamp>,
    pub(crate) folded: Option<(CompilationTimestamp, ValueId)>,
    pub(crate) converted: Option<(CompilationTimestamp, ValueId)>,
    /// Memoized definition lookup of a reference.
    pub(crate) resolved: Option<(CompilationTimestamp, Option<DefId>)>,
}

#[derive(Clone, Debug)]
pub struct ValueNode {
    pub kind: ValueKind,
    pub span: Span,
    /// Governing type, assigned by the type checker.
    pub ty: Option<TypeId>,
    pub(crate) state: ValueState,
}

impl ValueNode {
    pub fn new(kind: ValueKind, span: Span) -> Self {
        ValueNode {
            kind,
            span,
            ty: None,
            state: ValueState::default(),
        }
    }

    #[inline]
    pub fn flags(&self) -> ValueFlags {
        self.state.flags
    }

    #[inline]
    pub fn is_erroneous(&self) -> bool {
        self.state.flags.contains(ValueFlags::ERRONEOUS)
    }

    #[inline]
    pub fn is_generated(&self) -> bool {
        self.state.flags.contains(ValueFlags::GENERATED)
    }

    pub fn last_time_checked(&self) -> Option<CompilationTimestamp> {
        self.state.last_time_checked
    }
}

impl Spanned for ValueNode {
    fn span(&self) -> Span {
        self.span
    }
}
