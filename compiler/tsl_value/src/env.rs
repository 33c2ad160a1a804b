//! The boundary to symbol and type resolution.
//!
//! The engine never resolves names itself. It asks an [`Environment`] for
//! the definition a reference denotes, for the shape of a governing type and
//! for the compile-time facts macros expand to. [`DefinitionTable`] is a
//! self-contained implementation for drivers that have no separate
//! semantic model.

use rustc_hash::FxHashMap;
use tsl_ir::{Name, Span, StringInterner};

use crate::value::Reference;
use crate::ValueId;

/// Index of a type shape in the environment.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        TypeId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Index of a definition in the environment.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct DefId(u32);

impl DefId {
    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        DefId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Field of a record, set or union type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Component {
    pub name: Name,
    pub ty: TypeId,
    pub optional: bool,
    /// Default value used when a set value leaves the field out.
    pub default: Option<ValueId>,
}

impl Component {
    pub fn new(name: Name, ty: TypeId) -> Self {
        Component {
            name,
            ty,
            optional: false,
            default: None,
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: ValueId) -> Self {
        self.default = Some(default);
        self
    }
}

/// Index range of an array type: `size` elements starting at `offset`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ArrayDimension {
    pub offset: i64,
    pub size: u64,
}

/// Index outside an array dimension.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DimensionViolation {
    Underflow { lowest: i64 },
    Overflow { highest: i64 },
}

impl ArrayDimension {
    /// `[lower..upper]`, both inclusive.
    pub fn from_bounds(lower: i64, upper: i64) -> Self {
        let size = upper.checked_sub(lower).map_or(0, |d| d.saturating_add(1));
        ArrayDimension {
            offset: lower,
            size: u64::try_from(size).unwrap_or(0),
        }
    }

    /// Highest valid index.
    pub fn upper(&self) -> i64 {
        let size = i64::try_from(self.size).unwrap_or(i64::MAX);
        self.offset.saturating_add(size).saturating_sub(1)
    }

    /// Zero-based position of `index`.
    pub fn position(&self, index: i64) -> Result<usize, DimensionViolation> {
        if index < self.offset {
            return Err(DimensionViolation::Underflow {
                lowest: self.offset,
            });
        }
        if index > self.upper() {
            return Err(DimensionViolation::Overflow {
                highest: self.upper(),
            });
        }
        usize::try_from(index - self.offset).map_err(|_| DimensionViolation::Overflow {
            highest: self.upper(),
        })
    }
}

/// What the engine needs to know about a governing type.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum TypeShape {
    Integer,
    Real,
    Boolean,
    Verdict,
    Charstring,
    UniversalCharstring,
    Bitstring,
    Hexstring,
    Octetstring,
    ObjectIdentifier,
    Enumerated { items: Vec<Name> },
    Record(Vec<Component>),
    Set(Vec<Component>),
    Union(Vec<Component>),
    Anytype(Vec<Component>),
    RecordOf { element: TypeId },
    SetOf { element: TypeId },
    Array {
        element: TypeId,
        dimension: ArrayDimension,
    },
}

impl TypeShape {
    /// Fields of a structured type, empty for every other shape.
    pub fn components(&self) -> &[Component] {
        match self {
            TypeShape::Record(components)
            | TypeShape::Set(components)
            | TypeShape::Union(components)
            | TypeShape::Anytype(components) => components,
            _ => &[],
        }
    }

    pub fn component(&self, name: Name) -> Option<&Component> {
        self.components().iter().find(|c| c.name == name)
    }

    pub fn has_fields(&self) -> bool {
        matches!(
            self,
            TypeShape::Record(_) | TypeShape::Set(_) | TypeShape::Union(_) | TypeShape::Anytype(_)
        )
    }

    /// Position of an enumeration item.
    pub fn item_index(&self, item: Name) -> Option<usize> {
        match self {
            TypeShape::Enumerated { items } => items.iter().position(|&i| i == item),
            _ => None,
        }
    }

    pub fn dimension(&self) -> Option<ArrayDimension> {
        match self {
            TypeShape::Array { dimension, .. } => Some(*dimension),
            _ => None,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DefKind {
    Constant,
    ExternalConstant,
    ModuleParameter,
    Variable,
    FormalParameter,
    Template,
}

impl DefKind {
    /// Only plain constants fold to their value at compile time.
    #[inline]
    pub fn is_foldable(self) -> bool {
        matches!(self, DefKind::Constant)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Definition {
    pub name: Name,
    pub kind: DefKind,
    pub ty: Option<TypeId>,
    pub value: Option<ValueId>,
    pub span: Span,
}

/// Compile-time facts at a source location, consumed by macros.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct MacroSite {
    pub module: Name,
    pub file_path: String,
    /// Innermost enclosing definition.
    pub definition: Option<Name>,
    /// One-based line number.
    pub line: u32,
    /// Name of the innermost named scope unit.
    pub scope: String,
}

impl MacroSite {
    /// File name without directories.
    pub fn base_file_name(&self) -> &str {
        self.file_path
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(&self.file_path)
    }
}

/// Symbol and type resolution as seen by the value engine.
pub trait Environment {
    fn interner(&self) -> &StringInterner;

    /// Definition the root identifier of `reference` denotes.
    fn resolve(&self, reference: &Reference) -> Option<DefId>;

    fn definition(&self, id: DefId) -> Option<&Definition>;

    fn type_shape(&self, ty: TypeId) -> Option<&TypeShape>;

    fn macro_site(&self, span: Span) -> MacroSite;
}

/// In-memory environment for one module.
pub struct DefinitionTable {
    interner: StringInterner,
    module: Name,
    file_path: String,
    line_starts: Vec<u32>,
    definitions: Vec<Definition>,
    by_name: FxHashMap<Name, DefId>,
    types: Vec<TypeShape>,
}

impl DefinitionTable {
    pub fn new(module: &str, file_path: impl Into<String>) -> Self {
        let interner = StringInterner::new();
        let module = interner.intern(module);
        DefinitionTable {
            interner,
            module,
            file_path: file_path.into(),
            line_starts: vec![0],
            definitions: Vec::new(),
            by_name: FxHashMap::default(),
            types: Vec::new(),
        }
    }

    pub fn intern(&self, s: &str) -> Name {
        self.interner.intern(s)
    }

    /// Record line starts of the module text for `%lineNumber`.
    pub fn set_source(&mut self, text: &str) {
        self.line_starts = std::iter::once(0)
            .chain(
                newline_offsets(text)
                    .into_iter()
                    .filter_map(|i| u32::try_from(i + 1).ok()),
            )
            .collect();
    }

    pub fn add_type(&mut self, shape: TypeShape) -> TypeId {
        let id = TypeId(u32::try_from(self.types.len()).unwrap_or(u32::MAX));
        self.types.push(shape);
        id
    }

    /// Add a definition; a later definition with the same name shadows the
    /// earlier one.
    pub fn add_definition(&mut self, definition: Definition) -> DefId {
        let id = DefId(u32::try_from(self.definitions.len()).unwrap_or(u32::MAX));
        self.by_name.insert(definition.name, id);
        self.definitions.push(definition);
        id
    }

    /// Shorthand for a constant definition.
    pub fn add_constant(
        &mut self,
        name: &str,
        ty: Option<TypeId>,
        value: ValueId,
        span: Span,
    ) -> DefId {
        let name = self.intern(name);
        self.add_definition(Definition {
            name,
            kind: DefKind::Constant,
            ty,
            value: Some(value),
            span,
        })
    }

    pub fn set_value(&mut self, id: DefId, value: ValueId) {
        if let Some(def) = self.definitions.get_mut(id.0 as usize) {
            def.value = Some(value);
        }
    }

    pub fn lookup(&self, name: Name) -> Option<DefId> {
        self.by_name.get(&name).copied()
    }

    fn line_of(&self, offset: u32) -> u32 {
        let line = self.line_starts.partition_point(|&start| start <= offset);
        u32::try_from(line).unwrap_or(u32::MAX).max(1)
    }
}

fn newline_offsets(text: &str) -> Vec<usize> {
    text.bytes()
        .enumerate()
        .filter_map(|(i, b)| (b == b'\n').then_some(i))
        .collect()
}

impl Environment for DefinitionTable {
    fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn resolve(&self, reference: &Reference) -> Option<DefId> {
        self.lookup(reference.id)
    }

    fn definition(&self, id: DefId) -> Option<&Definition> {
        self.definitions.get(id.0 as usize)
    }

    fn type_shape(&self, ty: TypeId) -> Option<&TypeShape> {
        self.types.get(ty.0 as usize)
    }

    fn macro_site(&self, span: Span) -> MacroSite {
        let definition = self
            .definitions
            .iter()
            .filter(|def| def.span.start <= span.start && span.end <= def.span.end)
            .min_by_key(|def| def.span.len())
            .map(|def| def.name);
        let scope = self
            .interner
            .lookup(definition.unwrap_or(self.module))
            .to_owned();
        MacroSite {
            module: self.module,
            file_path: self.file_path.clone(),
            definition,
            line: self.line_of(span.start),
            scope,
        }
    }
}
