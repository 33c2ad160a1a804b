#![allow(clippy::unwrap_used, clippy::expect_used)]

use tsl_ir::Name;

use crate::checker::fixture::{sp, ts, Fixture};
use crate::env::{ArrayDimension, Component, DefKind, Definition, TypeShape};
use crate::ustring::UniversalCharstring;
use crate::value::{IndexedValue, NamedValue, ObjidComponent, Reference};
use crate::ValueId;

fn equal(fx: &mut Fixture, a: ValueId, b: ValueId) -> bool {
    fx.with(|checker| checker.check_equality(ts(1), a, b))
}

fn ints(fx: &mut Fixture, values: &[i64]) -> Vec<ValueId> {
    values.iter().map(|&v| fx.arena.integer(v, sp(0, 1))).collect()
}

fn indexed(fx: &mut Fixture, pairs: &[(i64, i64)]) -> Vec<IndexedValue> {
    pairs
        .iter()
        .map(|&(index, value)| IndexedValue {
            index: fx.arena.integer(index, sp(0, 1)),
            value: fx.arena.integer(value, sp(0, 1)),
            span: sp(0, 1),
        })
        .collect()
}

// === Lists ===

#[test]
fn set_of_ignores_order_and_record_of_does_not() {
    let mut fx = Fixture::new();
    let (x, y) = (ints(&mut fx, &[1, 2, 3]), ints(&mut fx, &[3, 1, 2]));
    let set_a = fx.arena.set_of(x.clone(), sp(0, 9));
    let set_b = fx.arena.set_of(y.clone(), sp(0, 9));
    let rec_a = fx.arena.record_of(x, sp(0, 9));
    let rec_b = fx.arena.record_of(y, sp(0, 9));

    assert!(equal(&mut fx, set_a, set_b));
    assert!(!equal(&mut fx, rec_a, rec_b));
    assert!(fx.diags.is_empty());
}

#[test]
fn set_of_counts_repeated_elements() {
    let mut fx = Fixture::new();
    let (x, y) = (ints(&mut fx, &[1, 1, 2]), ints(&mut fx, &[1, 2, 2]));
    let a = fx.arena.set_of(x, sp(0, 9));
    let b = fx.arena.set_of(y, sp(0, 9));
    let shorter = ints(&mut fx, &[1, 1]);
    let c = fx.arena.set_of(shorter, sp(0, 9));

    assert!(!equal(&mut fx, a, b));
    assert!(!equal(&mut fx, a, c));
}

#[test]
fn dense_and_sparse_record_of_are_comparable() {
    let mut fx = Fixture::new();
    let dense = ints(&mut fx, &[1, 2]);
    let dense = fx.arena.record_of(dense, sp(0, 6));
    let sparse = indexed(&mut fx, &[(1, 2), (0, 1)]);
    let sparse = fx.arena.record_of(sparse, sp(0, 20));
    let gap = indexed(&mut fx, &[(0, 1), (2, 2)]);
    let gap = fx.arena.record_of(gap, sp(0, 20));

    assert!(equal(&mut fx, dense, sparse));
    assert!(!equal(&mut fx, dense, gap));
}

#[test]
fn array_positions_start_at_the_lower_bound() {
    let mut fx = Fixture::new();
    let int = fx.env.add_type(TypeShape::Integer);
    let arr = fx.env.add_type(TypeShape::Array {
        element: int,
        dimension: ArrayDimension::from_bounds(2, 3),
    });
    let dense = ints(&mut fx, &[10, 20]);
    let dense = fx.arena.array(dense, sp(0, 8));
    let sparse = indexed(&mut fx, &[(3, 20), (2, 10)]);
    let sparse = fx.arena.array(sparse, sp(0, 20));
    fx.arena.set_type(dense, arr);
    fx.arena.set_type(sparse, arr);

    assert!(equal(&mut fx, dense, sparse));
}

// === Strings ===

#[test]
fn converted_octetstrings_equal_literal_ones() {
    let mut fx = Fixture::new();
    let oct = fx.env.add_type(TypeShape::Octetstring);
    let bits = fx.arena.bitstring_literal("1010", sp(0, 7)).unwrap();
    let hex = fx.arena.hexstring_literal("ABC", sp(0, 6)).unwrap();
    fx.arena.set_type(bits, oct);
    fx.arena.set_type(hex, oct);
    let a0 = fx.arena.octetstring_literal("A0", sp(0, 5)).unwrap();
    let abc0 = fx.arena.octetstring_literal("ABC0", sp(0, 7)).unwrap();

    assert!(equal(&mut fx, bits, a0));
    assert!(equal(&mut fx, abc0, hex));
    assert!(!equal(&mut fx, bits, abc0));
}

#[test]
fn untyped_bitstring_is_not_an_octetstring() {
    let mut fx = Fixture::new();
    let bits = fx.arena.bitstring_literal("10100000", sp(0, 11)).unwrap();
    let a0 = fx.arena.octetstring_literal("A0", sp(0, 5)).unwrap();
    assert!(!equal(&mut fx, bits, a0));
}

#[test]
fn charstring_and_universal_charstring_compare() {
    let mut fx = Fixture::new();
    let narrow = fx.arena.charstring("abc", sp(0, 5));
    let wide = fx.arena.ucharstring(UniversalCharstring::from("abc"), sp(0, 5));
    let other = fx.arena.ucharstring(UniversalCharstring::from("abd"), sp(0, 5));

    assert!(equal(&mut fx, narrow, wide));
    assert!(equal(&mut fx, wide, narrow));
    assert!(!equal(&mut fx, narrow, other));
}

#[test]
fn not_a_number_equals_itself() {
    let mut fx = Fixture::new();
    let a = fx.arena.real(f64::NAN, sp(0, 12));
    let b = fx.arena.real(f64::NAN, sp(0, 12));
    let one = fx.arena.real(1.0, sp(0, 3));
    assert!(equal(&mut fx, a, b));
    assert!(!equal(&mut fx, a, one));
}

// === Structured values ===

fn fields(fx: &mut Fixture, pairs: &[(Name, i64)]) -> Vec<NamedValue> {
    pairs
        .iter()
        .map(|&(name, v)| NamedValue::new(name, sp(0, 1), fx.arena.integer(v, sp(0, 1))))
        .collect()
}

#[test]
fn record_fields_match_by_name() {
    let mut fx = Fixture::new();
    let (a, b) = (fx.name("a"), fx.name("b"));
    let x = fields(&mut fx, &[(a, 1), (b, 2)]);
    let y = fields(&mut fx, &[(b, 2), (a, 1)]);
    let z = fields(&mut fx, &[(a, 1)]);
    let (x, y, z) = (
        fx.arena.record(x, sp(0, 1)),
        fx.arena.record(y, sp(0, 1)),
        fx.arena.record(z, sp(0, 1)),
    );

    assert!(equal(&mut fx, x, y));
    assert!(!equal(&mut fx, x, z));
}

#[test]
fn set_fields_use_defaults_and_omit() {
    let mut fx = Fixture::new();
    let [a, b, c] = ["a", "b", "c"].map(|n| fx.name(n));
    let int = fx.env.add_type(TypeShape::Integer);
    let five = fx.arena.integer(5, sp(0, 1));
    let ty = fx.env.add_type(TypeShape::Set(vec![
        Component::new(a, int),
        Component::new(b, int).optional(),
        Component::new(c, int).with_default(five),
    ]));

    let only_a = fields(&mut fx, &[(a, 1)]);
    let only_a = fx.arena.set(only_a, sp(0, 1));
    let omit = fx.arena.omit(sp(0, 1));
    let mut explicit = fields(&mut fx, &[(c, 5), (a, 1)]);
    explicit.push(NamedValue::new(b, sp(0, 1), omit));
    let explicit = fx.arena.set(explicit, sp(0, 1));
    let with_b = fields(&mut fx, &[(a, 1), (b, 2)]);
    let with_b = fx.arena.set(with_b, sp(0, 1));
    for id in [only_a, explicit, with_b] {
        fx.arena.set_type(id, ty);
    }

    assert!(equal(&mut fx, only_a, explicit));
    assert!(!equal(&mut fx, only_a, with_b));
}

#[test]
fn unions_need_the_same_alternative() {
    let mut fx = Fixture::new();
    let (x, y) = (fx.name("x"), fx.name("y"));
    let one = fx.arena.integer(1, sp(0, 1));
    let also_one = fx.arena.integer(1, sp(0, 1));
    let a = fx.arena.choice(x, one, sp(0, 1));
    let b = fx.arena.choice(x, also_one, sp(0, 1));
    let c = fx.arena.choice(y, one, sp(0, 1));

    assert!(equal(&mut fx, a, b));
    assert!(!equal(&mut fx, a, c));
}

#[test]
fn object_identifiers_compare_numbers() {
    let mut fx = Fixture::new();
    let objid = |fx: &mut Fixture, numbers: &[i64]| {
        let components = numbers
            .iter()
            .map(|&n| ObjidComponent {
                name: None,
                number: Some(fx.arena.integer(n, sp(0, 1))),
                span: sp(0, 1),
            })
            .collect();
        fx.arena.objid(components, sp(0, 1))
    };
    let a = objid(&mut fx, &[0, 4, 0]);
    let b = objid(&mut fx, &[0, 4, 0]);
    let c = objid(&mut fx, &[0, 4]);

    assert!(equal(&mut fx, a, b));
    assert!(!equal(&mut fx, a, c));
}

// === References ===

#[test]
fn constants_are_folded_before_comparing() {
    let mut fx = Fixture::new();
    let seven = fx.arena.integer(7, sp(0, 1));
    fx.constant("c", seven);
    let r = fx.reference("c", 10);
    let other = fx.arena.integer(7, sp(20, 21));
    assert!(equal(&mut fx, r, other));
}

#[test]
fn unfoldable_references_compare_by_definition() {
    let mut fx = Fixture::new();
    for name in ["v", "w"] {
        let name = fx.name(name);
        fx.env.add_definition(Definition {
            name,
            kind: DefKind::Variable,
            ty: None,
            value: None,
            span: sp(50, 60),
        });
    }
    let f = fx.name("f");
    let v = fx.name("v");
    let v1 = fx.arena.reference(Reference::new(v, sp(0, 1)).field(f, sp(1, 3)));
    let v2 = fx.arena.reference(Reference::new(v, sp(10, 11)).field(f, sp(11, 13)));
    let v3 = fx.reference("v", 20);
    let w = fx.reference("w", 30);

    assert!(equal(&mut fx, v1, v2));
    assert!(!equal(&mut fx, v1, v3));
    assert!(!equal(&mut fx, v3, w));
    assert!(fx.diags.is_empty());
}
