//! Element lists of record-of, set-of and array values.

use tsl_ir::Span;

use crate::ValueId;

/// `[index] := value` in the sparse notation.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct IndexedValue {
    pub index: ValueId,
    pub value: ValueId,
    pub span: Span,
}

/// Either the dense form (`{ a, b }`, position is the index) or the sparse
/// form (`{ [0] := a, [5] := b }`). A list never mixes the two.
///
/// Sparse indices are expressions and may repeat, skip or appear out of
/// order; those are checked and reported, not rejected on construction.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Values {
    Dense(Vec<ValueId>),
    Indexed(Vec<IndexedValue>),
}

impl Values {
    #[inline]
    pub fn is_indexed(&self) -> bool {
        matches!(self, Values::Indexed(_))
    }

    /// Stored entry count (not the logical length of a sparse list).
    pub fn len(&self) -> usize {
        match self {
            Values::Dense(values) => values.len(),
            Values::Indexed(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element values in storage order.
    pub fn elements(&self) -> impl Iterator<Item = ValueId> + '_ {
        let (dense, indexed) = match self {
            Values::Dense(values) => (values.as_slice(), &[][..]),
            Values::Indexed(values) => (&[][..], values.as_slice()),
        };
        dense
            .iter()
            .copied()
            .chain(indexed.iter().map(|entry| entry.value))
    }

    /// Every child id, index expressions included.
    pub fn children(&self) -> Vec<ValueId> {
        match self {
            Values::Dense(values) => values.clone(),
            Values::Indexed(values) => values
                .iter()
                .flat_map(|entry| [entry.index, entry.value])
                .collect(),
        }
    }
}

impl From<Vec<ValueId>> for Values {
    fn from(values: Vec<ValueId>) -> Self {
        Values::Dense(values)
    }
}

impl From<Vec<IndexedValue>> for Values {
    fn from(values: Vec<IndexedValue>) -> Self {
        Values::Indexed(values)
    }
}

impl Default for Values {
    fn default() -> Self {
        Values::Dense(Vec::new())
    }
}
