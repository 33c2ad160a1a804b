//! Cycle detection for reference folding.
//!
//! The chain is a stack of values currently being folded. Entering a value
//! that is already on the stack is a circular reference. Callers bracket
//! each frame with [`ReferenceChain::mark_state`] and
//! [`ReferenceChain::previous_state`] so sibling evaluations never see each
//! other's links.

use smallvec::SmallVec;
use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::{Name, Span, StringInterner};

use crate::ValueId;

/// One frame of the chain: the value being folded and, for references, the
/// name it was reached through.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ChainLink {
    pub value: ValueId,
    pub span: Span,
    pub name: Option<Name>,
}

/// A re-entry. `links` runs from the first occurrence of the re-entered
/// value to the top of the chain.
#[derive(Clone, Debug, Eq, PartialEq, Hash, thiserror::Error)]
#[error("circular reference")]
pub struct Cycle {
    pub entered: ChainLink,
    pub links: Vec<ChainLink>,
}

impl Cycle {
    /// Names along the cycle, closed by repeating the first one.
    pub fn describe(&self, interner: &StringInterner) -> String {
        let names: Vec<&str> = self
            .links
            .iter()
            .filter_map(|link| link.name)
            .map(|name| interner.lookup(name))
            .collect();
        match names.first() {
            Some(first) => {
                let mut path: Vec<String> = names.iter().map(|n| format!("`{n}`")).collect();
                path.push(format!("`{first}`"));
                path.join(" -> ")
            }
            None => format!("value at {}", self.entered.span),
        }
    }

    pub fn to_diagnostic(&self, interner: &StringInterner) -> Diagnostic {
        let mut diag = Diagnostic::error(ErrorCode::E4001)
            .with_message(format!("circular reference: {}", self.describe(interner)))
            .with_label(self.entered.span, "this value depends on itself");
        for link in self.links.iter().skip(1) {
            if let Some(name) = link.name {
                diag = diag.with_secondary_label(
                    link.span,
                    format!("through `{}`", interner.lookup(name)),
                );
            }
        }
        diag
    }
}

#[derive(Clone, Debug, Default)]
pub struct ReferenceChain {
    links: Vec<ChainLink>,
    marks: SmallVec<[usize; 8]>,
}

impl ReferenceChain {
    pub fn new() -> Self {
        ReferenceChain::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains(&self, value: ValueId) -> bool {
        self.links.iter().any(|link| link.value == value)
    }

    /// Push a link. On re-entry nothing is pushed and the cycle is returned.
    pub fn add(&mut self, link: ChainLink) -> Result<(), Cycle> {
        if let Some(first) = self.links.iter().position(|l| l.value == link.value) {
            tracing::debug!(value = ?link.value, depth = self.links.len(), "cycle detected");
            return Err(Cycle {
                entered: self.links[first],
                links: self.links[first..].to_vec(),
            });
        }
        self.links.push(link);
        Ok(())
    }

    /// Remember the current depth.
    pub fn mark_state(&mut self) {
        self.marks.push(self.links.len());
    }

    /// Drop every link added since the matching [`Self::mark_state`].
    pub fn previous_state(&mut self) {
        if let Some(depth) = self.marks.pop() {
            self.links.truncate(depth);
        }
    }

    pub fn release(&mut self) {
        self.links.clear();
        self.marks.clear();
    }
}

#[cfg(test)]
mod tests;
