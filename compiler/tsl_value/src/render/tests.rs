#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use tsl_ir::Span;

use super::*;
use crate::ustring::{UniversalChar, UniversalCharstring};
use crate::value::{BinaryOp, Builtin, IndexedValue, MacroKind, NamedValue, ObjidComponent, UnaryOp};

const S: Span = Span::DUMMY;

#[test]
fn scalars() {
    let interner = StringInterner::new();
    let mut arena = ValueArena::new();
    let cases = [
        (arena.integer(-42, S), "-42"),
        (arena.real(1.5, S), "1.5"),
        (arena.real(2.0, S), "2.0"),
        (arena.real(f64::NEG_INFINITY, S), "-infinity"),
        (arena.real(f64::NAN, S), "not_a_number"),
        (arena.boolean(false, S), "false"),
        (arena.charstring("a\"b", S), r#""a""b""#),
        (arena.bitstring_literal("0101", S).unwrap(), "'0101'B"),
        (arena.hexstring_literal("ab", S).unwrap(), "'AB'H"),
        (arena.octetstring_literal("abcd", S).unwrap(), "'ABCD'O"),
        (arena.omit(S), "omit"),
        (arena.not_used(S), "-"),
        (arena.macro_value(MacroKind::LineNumberInteger, S), "__LINE__"),
    ];
    for (id, expected) in cases {
        assert_eq!(arena.render(id, &interner), expected);
    }
}

#[test]
fn universal_charstring_mixes_quadruples() {
    let interner = StringInterner::new();
    let mut arena = ValueArena::new();
    let text: UniversalCharstring = [UniversalChar::from_byte(b'x'), UniversalChar::new(0, 0, 1, 0)]
        .into_iter()
        .collect();
    let id = arena.ucharstring(text, S);
    assert_eq!(arena.render(id, &interner), r#""x" & char(0, 0, 1, 0)"#);
}

#[test]
fn composites() {
    let interner = StringInterner::new();
    let a = interner.intern("a");
    let b = interner.intern("b");
    let mut arena = ValueArena::new();
    let one = arena.integer(1, S);
    let omit = arena.omit(S);
    let record = arena.record(
        vec![NamedValue::new(a, S, one), NamedValue::new(b, S, omit)],
        S,
    );
    assert_eq!(arena.render(record, &interner), "{ a := 1, b := omit }");

    let two = arena.integer(2, S);
    let list = arena.set_of(vec![one, two], S);
    assert_eq!(arena.render(list, &interner), "{ 1, 2 }");

    let zero = arena.integer(0, S);
    let sparse = arena.record_of(
        vec![IndexedValue {
            index: zero,
            value: one,
            span: S,
        }],
        S,
    );
    assert_eq!(arena.render(sparse, &interner), "{ [0] := 1 }");

    let empty = arena.record(Vec::new(), S);
    assert_eq!(arena.render(empty, &interner), "{ }");

    let union = arena.choice(a, record, S);
    assert_eq!(arena.render(union, &interner), "{ a := { a := 1, b := omit } }");

    let four = arena.integer(4, S);
    let objid = arena.objid(
        vec![
            ObjidComponent {
                name: Some(interner.intern("itu_t")),
                number: Some(zero),
                span: S,
            },
            ObjidComponent {
                name: None,
                number: Some(four),
                span: S,
            },
        ],
        S,
    );
    assert_eq!(arena.render(objid, &interner), "objid { itu_t(0) 4 }");
}

#[test]
fn references_and_expressions() {
    let interner = StringInterner::new();
    let mut arena = ValueArena::new();
    let one = arena.integer(1, S);
    let reference = Reference::new(interner.intern("c"), S)
        .field(interner.intern("f"), S)
        .index(one, S);
    let r = arena.reference(reference);
    assert_eq!(arena.render(r, &interner), "c.f[1]");

    let sum = arena.binary(BinaryOp::Add, r, one, S);
    assert_eq!(arena.render(sum, &interner), "(c.f[1] + 1)");
    let neg = arena.unary(UnaryOp::Minus, sum, S);
    assert_eq!(arena.render(neg, &interner), "(-(c.f[1] + 1))");
    let not = arena.unary(UnaryOp::Not, r, S);
    assert_eq!(arena.render(not, &interner), "(not c.f[1])");
    let call = arena.call(Builtin::Int2Str, &[one], S);
    assert_eq!(arena.render(call, &interner), "int2str(1)");
}
