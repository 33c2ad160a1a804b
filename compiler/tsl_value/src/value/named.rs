//! Named field lists of record and set values.

use rustc_hash::FxHashMap;
use tsl_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use tsl_ir::{Name, Span, StringInterner};

use crate::timestamp::{is_fresh, CompilationTimestamp};
use crate::ValueId;

/// `name := value`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct NamedValue {
    pub name: Name,
    pub name_span: Span,
    pub value: ValueId,
    /// False for entries added during checking (implicit omit).
    pub parsed: bool,
}

impl NamedValue {
    pub fn new(name: Name, name_span: Span, value: ValueId) -> Self {
        NamedValue {
            name,
            name_span,
            value,
            parsed: true,
        }
    }
}

/// Ordered field list with lazily enforced unique names.
///
/// Until [`NamedValues::check_uniqueness`] first runs, lookups return the
/// first entry with a name. The check builds a name map and moves later
/// entries with a repeated name to a side list; they are reported again on
/// every newer pass and never returned by lookups.
#[derive(Clone, Debug, Default)]
pub struct NamedValues {
    values: Vec<NamedValue>,
    map: Option<FxHashMap<Name, usize>>,
    duplicates: Vec<NamedValue>,
    last_unique_check: Option<CompilationTimestamp>,
}

impl NamedValues {
    pub fn new(values: Vec<NamedValue>) -> Self {
        NamedValues {
            values,
            ..NamedValues::default()
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, NamedValue> {
        self.values.iter()
    }

    pub fn at(&self, index: usize) -> Option<&NamedValue> {
        self.values.get(index)
    }

    pub fn get(&self, name: Name) -> Option<&NamedValue> {
        match &self.map {
            Some(map) => map.get(&name).and_then(|&i| self.values.get(i)),
            None => self.values.iter().find(|nv| nv.name == name),
        }
    }

    pub fn has(&self, name: Name) -> bool {
        self.get(name).is_some()
    }

    /// Entries removed by the uniqueness check.
    pub fn duplicates(&self) -> &[NamedValue] {
        &self.duplicates
    }

    pub fn add(&mut self, value: NamedValue) {
        if let Some(map) = &mut self.map {
            if map.contains_key(&value.name) {
                self.duplicates.push(value);
                return;
            }
            map.insert(value.name, self.values.len());
        }
        self.values.push(value);
    }

    /// Report repeated field names, building the name map on first use.
    /// Returns the number of duplicates.
    pub fn check_uniqueness(
        &mut self,
        ts: CompilationTimestamp,
        interner: &StringInterner,
        sink: &mut dyn DiagnosticSink,
    ) -> usize {
        if is_fresh(self.last_unique_check, ts) {
            return self.duplicates.len();
        }

        if self.map.is_none() {
            self.rebuild_map();
            tracing::debug!(
                fields = self.values.len(),
                duplicates = self.duplicates.len(),
                "built field name map"
            );
        }

        for duplicate in &self.duplicates {
            let name = interner.lookup(duplicate.name);
            let mut diag = Diagnostic::error(ErrorCode::E3001)
                .with_message(format!("duplicate field name `{name}`"))
                .with_label(duplicate.name_span, "repeated here");
            if let Some(first) = self.get(duplicate.name) {
                diag = diag.with_secondary_label(first.name_span, "first defined here");
            }
            sink.report(diag);
        }

        self.last_unique_check = Some(ts);
        self.duplicates.len()
    }

    fn rebuild_map(&mut self) {
        let mut map = FxHashMap::default();
        let mut kept = Vec::with_capacity(self.values.len());
        for value in self.values.drain(..) {
            if map.contains_key(&value.name) {
                self.duplicates.push(value);
            } else {
                map.insert(value.name, kept.len());
                kept.push(value);
            }
        }
        self.values = kept;
        self.map = Some(map);
    }

    /// Drop entries added during checking. Returns how many were removed.
    pub fn remove_generated(&mut self) -> usize {
        let before = self.values.len();
        self.values.retain(|nv| nv.parsed);
        let removed = before - self.values.len();
        if removed > 0 {
            if let Some(map) = &mut self.map {
                map.clear();
                for (i, nv) in self.values.iter().enumerate() {
                    map.insert(nv.name, i);
                }
            }
            self.last_unique_check = None;
        }
        removed
    }

    /// Every field value, duplicates included.
    pub fn children(&self) -> Vec<ValueId> {
        self.values
            .iter()
            .chain(&self.duplicates)
            .map(|nv| nv.value)
            .collect()
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut NamedValue> {
        self.values.iter_mut().chain(self.duplicates.iter_mut())
    }
}

impl FromIterator<NamedValue> for NamedValues {
    fn from_iter<I: IntoIterator<Item = NamedValue>>(iter: I) -> Self {
        NamedValues::new(iter.into_iter().collect())
    }
}
