use pretty_assertions::assert_eq;

use super::*;

#[test]
fn text_change_delta() {
    assert_eq!(TextChange::insert(10, 5).delta(), 5);
    assert_eq!(TextChange::delete(10, 5).delta(), -5);
    assert_eq!(TextChange::new(10, 13, 5).delta(), 2);
}

#[test]
fn replacement_classifies_spans() {
    let marker = ChangeMarker::from_change(&TextChange::new(100, 110, 15));

    assert_eq!(marker.classify(Span::new(10, 50)), SpanFate::Unchanged);
    assert_eq!(marker.classify(Span::new(90, 100)), SpanFate::Unchanged);
    assert_eq!(marker.classify(Span::new(95, 105)), SpanFate::Damaged);
    assert_eq!(marker.classify(Span::new(105, 120)), SpanFate::Damaged);
    assert_eq!(
        marker.classify(Span::new(110, 120)),
        SpanFate::Shifted(Span::new(115, 125))
    );
}

#[test]
fn insertion_inside_span_damages_it() {
    let marker = ChangeMarker::from_change(&TextChange::insert(20, 3));
    assert_eq!(marker.classify(Span::new(10, 30)), SpanFate::Damaged);
    assert_eq!(marker.classify(Span::new(10, 20)), SpanFate::Unchanged);
    assert_eq!(
        marker.classify(Span::new(20, 30)),
        SpanFate::Shifted(Span::new(23, 33))
    );
}

#[test]
fn deletion_shifts_backwards() {
    let marker = ChangeMarker::from_change(&TextChange::delete(10, 4));
    assert_eq!(
        marker.classify(Span::new(14, 20)),
        SpanFate::Shifted(Span::new(10, 16))
    );
}
