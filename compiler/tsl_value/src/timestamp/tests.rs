use super::*;

#[test]
fn source_is_strictly_increasing() {
    let mut source = TimestampSource::new();
    assert_eq!(source.current(), None);
    let first = source.next_pass();
    let second = source.next_pass();
    assert!(first.is_less(second));
    assert!(!second.is_less(first));
    assert!(!first.is_less(first));
    assert_eq!(source.current(), Some(second));
}

#[test]
fn freshness() {
    let old = CompilationTimestamp::from_raw(3);
    let new = CompilationTimestamp::from_raw(4);
    assert!(is_fresh(Some(old), old));
    assert!(is_fresh(Some(new), old));
    assert!(!is_fresh(Some(old), new));
    assert!(!is_fresh(None, old));
}
