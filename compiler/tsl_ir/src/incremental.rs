//! Edit markers for incremental re-checking.
//!
//! An editor reports a [`TextChange`]; the driver turns it into a
//! [`ChangeMarker`] describing the damaged region of the old text. Values
//! that lie entirely outside that region keep their identity and have their
//! spans shifted; values that touch it must be reparsed.

use crate::Span;

/// A single text edit: `[start, old_end)` of the old text was replaced by
/// `new_len` bytes.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct TextChange {
    pub start: u32,
    pub old_end: u32,
    pub new_len: u32,
}

impl TextChange {
    #[inline]
    pub const fn new(start: u32, old_end: u32, new_len: u32) -> Self {
        TextChange {
            start,
            old_end,
            new_len,
        }
    }

    #[inline]
    pub const fn insert(at: u32, len: u32) -> Self {
        TextChange::new(at, at, len)
    }

    #[inline]
    pub const fn delete(start: u32, len: u32) -> Self {
        TextChange::new(start, start + len, 0)
    }

    /// Net change in document length.
    #[inline]
    pub fn delta(&self) -> i64 {
        i64::from(self.new_len) - i64::from(self.old_end - self.start)
    }
}

/// What happens to a span of the old text once an edit is applied.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SpanFate {
    /// Entirely before the damaged region.
    Unchanged,
    /// Entirely after the damaged region; the new location is attached.
    Shifted(Span),
    /// Overlaps the damaged region.
    Damaged,
}

/// The damaged region of the old text plus the offset delta for everything
/// after it.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChangeMarker {
    pub damaged_start: u32,
    pub damaged_end: u32,
    pub delta: i64,
}

impl ChangeMarker {
    #[inline]
    pub const fn new(damaged_start: u32, damaged_end: u32, delta: i64) -> Self {
        ChangeMarker {
            damaged_start,
            damaged_end,
            delta,
        }
    }

    /// Marker for a single edit. An insertion touches the token it is glued
    /// to, so a zero-length change still damages the value around it.
    pub fn from_change(change: &TextChange) -> Self {
        ChangeMarker::new(change.start, change.old_end, change.delta())
    }

    /// Overlap test. A pure insertion strictly inside a span damages it; an
    /// insertion exactly at a span boundary does not.
    #[inline]
    pub fn intersects(&self, span: Span) -> bool {
        if self.damaged_start == self.damaged_end {
            return span.start < self.damaged_start && self.damaged_start < span.end;
        }
        self.damaged_start < span.end && span.start < self.damaged_end
    }

    #[inline]
    pub fn is_before(&self, span: Span) -> bool {
        span.end <= self.damaged_start
    }

    /// Shift a position that lies at or after the damaged end.
    #[inline]
    fn shift(&self, pos: u32) -> u32 {
        let shifted = i64::from(pos) + self.delta;
        u32::try_from(shifted.max(0)).unwrap_or(u32::MAX)
    }

    pub fn classify(&self, span: Span) -> SpanFate {
        if self.intersects(span) {
            SpanFate::Damaged
        } else if self.is_before(span) {
            SpanFate::Unchanged
        } else {
            SpanFate::Shifted(Span::new(self.shift(span.start), self.shift(span.end)))
        }
    }
}

#[cfg(test)]
mod tests;
