#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;

use super::*;

fn link(raw: u32, name: Option<Name>) -> ChainLink {
    ChainLink {
        value: ValueId::from_raw(raw),
        span: Span::new(raw * 10, raw * 10 + 1),
        name,
    }
}

#[test]
fn distinct_links_are_accepted() {
    let mut chain = ReferenceChain::new();
    assert!(chain.add(link(1, None)).is_ok());
    assert!(chain.add(link(2, None)).is_ok());
    assert_eq!(chain.len(), 2);
    assert!(chain.contains(ValueId::from_raw(1)));
}

#[test]
fn reentry_is_a_cycle() {
    let mut chain = ReferenceChain::new();
    chain.add(link(1, None)).unwrap();
    chain.add(link(2, None)).unwrap();
    chain.add(link(3, None)).unwrap();
    let cycle = chain.add(link(2, None)).unwrap_err();
    assert_eq!(cycle.entered.value, ValueId::from_raw(2));
    assert_eq!(cycle.links.len(), 2);
    // The rejected link is not pushed.
    assert_eq!(chain.len(), 3);
}

#[test]
fn previous_state_restores_depth() {
    let mut chain = ReferenceChain::new();
    chain.add(link(1, None)).unwrap();
    chain.mark_state();
    chain.add(link(2, None)).unwrap();
    chain.mark_state();
    chain.add(link(3, None)).unwrap();
    chain.previous_state();
    assert_eq!(chain.len(), 2);
    chain.previous_state();
    assert_eq!(chain.len(), 1);
    // Siblings may revisit a value once its frame is gone.
    assert!(chain.add(link(2, None)).is_ok());
    chain.release();
    assert!(chain.is_empty());
}

#[test]
fn cycle_message_names_the_path() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let mut chain = ReferenceChain::new();
    chain.add(link(1, None)).unwrap();
    chain.add(link(2, Some(b))).unwrap();
    chain.add(link(3, Some(a))).unwrap();
    let cycle = chain.add(link(1, None)).unwrap_err();
    assert_eq!(cycle.describe(&interner), "`b` -> `a` -> `b`");

    let diag = cycle.to_diagnostic(&interner);
    assert_eq!(diag.code, ErrorCode::E4001);
    assert_eq!(diag.message, "circular reference: `b` -> `a` -> `b`");
    assert_eq!(diag.primary_span(), Some(Span::new(10, 11)));
}

#[test]
fn anonymous_cycle_uses_location() {
    let interner = StringInterner::new();
    let mut chain = ReferenceChain::new();
    chain.add(link(4, None)).unwrap();
    let cycle = chain.add(link(4, None)).unwrap_err();
    assert_eq!(cycle.describe(&interner), "value at 40..41");
}
