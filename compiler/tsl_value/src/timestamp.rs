//! Logical clock for compilation passes.
//!
//! Every cached result in the value arena is stamped with the pass that
//! produced it. A result is reused while its stamp is not older than the
//! pass asking for it, and recomputed once a strictly newer pass arrives.

/// Identifies one compilation pass. Passes are totally ordered.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct CompilationTimestamp(u64);

impl CompilationTimestamp {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        CompilationTimestamp(raw)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// `self` happened strictly before `other`.
    #[inline]
    pub const fn is_less(self, other: CompilationTimestamp) -> bool {
        self.0 < other.0
    }
}

/// Produces strictly increasing timestamps, one per pass.
#[derive(Clone, Debug, Default)]
pub struct TimestampSource {
    last: u64,
}

impl TimestampSource {
    pub const fn new() -> Self {
        TimestampSource { last: 0 }
    }

    /// Stamp for a new pass.
    pub fn next_pass(&mut self) -> CompilationTimestamp {
        self.last += 1;
        CompilationTimestamp(self.last)
    }

    /// The most recently issued stamp, if any.
    pub fn current(&self) -> Option<CompilationTimestamp> {
        (self.last > 0).then_some(CompilationTimestamp(self.last))
    }
}

/// A cached stamp is still valid for the pass `ts`.
#[inline]
pub(crate) fn is_fresh(cached: Option<CompilationTimestamp>, ts: CompilationTimestamp) -> bool {
    cached.is_some_and(|stamp| !stamp.is_less(ts))
}

#[cfg(test)]
mod tests;
