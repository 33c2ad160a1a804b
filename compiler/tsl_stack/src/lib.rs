//! Stack safety for recursive value walks.
//!
//! Folding, navigation, equality and rendering all recurse over the value
//! tree. Termination is guaranteed by the reference chain, but a literal
//! nested tens of thousands of levels deep would still exhaust the native
//! stack, so every recursive entry point runs inside
//! [`ensure_sufficient_stack`].
//!
//! - **Native targets**: `stacker` grows the stack on demand.
//! - **WASM targets**: plain call.

/// If less than this remains, grow the stack.
const RED_ZONE: usize = 96 * 1024;

/// Size of each new stack segment.
const STACK_PER_RECURSION: usize = 1024 * 1024;

/// Run `f`, growing the stack first if the remaining space is below the red zone.
#[inline]
#[cfg(not(target_arch = "wasm32"))]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    stacker::maybe_grow(RED_ZONE, STACK_PER_RECURSION, f)
}

#[inline]
#[cfg(target_arch = "wasm32")]
pub fn ensure_sufficient_stack<R>(f: impl FnOnce() -> R) -> R {
    f()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A chain of nested single-element lists, walked recursively.
    enum Nested {
        Leaf(u64),
        List(Box<Nested>),
    }

    fn depth(value: &Nested) -> u64 {
        ensure_sufficient_stack(|| match value {
            Nested::Leaf(_) => 0,
            Nested::List(inner) => depth(inner) + 1,
        })
    }

    #[test]
    fn deep_nesting_does_not_overflow() {
        let mut value = Nested::Leaf(7);
        for _ in 0..100_000 {
            value = Nested::List(Box::new(value));
        }
        assert_eq!(depth(&value), 100_000);

        // Drop iteratively; the default recursive drop would overflow.
        let mut current = value;
        while let Nested::List(inner) = current {
            current = *inner;
        }
        assert!(matches!(current, Nested::Leaf(7)));
    }

    #[test]
    fn returns_closure_result() {
        let result: Result<i32, &str> = ensure_sufficient_stack(|| Ok(123));
        assert_eq!(result, Ok(123));
    }
}
