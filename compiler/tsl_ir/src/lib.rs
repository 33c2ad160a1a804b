//! TSL IR - shared front-end primitives
//!
//! The value engine and its collaborators agree on a handful of small,
//! copyable types:
//! - [`Span`]: byte-offset source locations
//! - [`Name`]: interned identifiers, resolved through [`StringInterner`]
//! - [`incremental`]: text-change markers used by the incremental edit hook
//!
//! Every type derives `Clone, Eq, PartialEq, Hash, Debug` so that it can be
//! stored in caches keyed by value.

/// Compile-time assertion that a type has a specific size.
#[macro_export]
macro_rules! static_assert_size {
    ($ty:ty, $size:expr) => {
        const _: [(); $size] = [(); ::std::mem::size_of::<$ty>()];
    };
}

pub mod incremental;
mod interner;
mod name;
mod span;

pub use interner::StringInterner;
pub use name::Name;
pub use span::{Span, SpanError, Spanned};
