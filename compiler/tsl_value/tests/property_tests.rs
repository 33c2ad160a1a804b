//! End-to-end properties of the value engine, exercised through the public
//! API only:
//! 1. folding is idempotent within a pass and terminates on cycles
//! 2. equality does not depend on representation or on set-of order
//! 3. array bounds, escapes and universal character order behave as the
//!    language defines them
//! 4. the binding predicates never report anything

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tsl_diagnostic::{Diagnostic, ErrorCode};
use tsl_ir::Span;
use tsl_lexer::{extract_charstring, EscapeError};
use tsl_value::{
    ArrayDimension, BinaryOp, CompilationTimestamp, DefinitionTable, Expectation, NamedValue,
    NavMode, Reference, ReferenceChain, TimestampSource, TypeShape, UniversalChar, ValueArena,
    ValueChecker, ValueId, ValueKind,
};

fn sp(start: u32, end: u32) -> Span {
    Span::new(start, end)
}

struct World {
    env: DefinitionTable,
    arena: ValueArena,
    diags: Vec<Diagnostic>,
    clock: TimestampSource,
}

impl World {
    fn new() -> Self {
        World {
            env: DefinitionTable::new("Props", "Props.tsl"),
            arena: ValueArena::new(),
            diags: Vec::new(),
            clock: TimestampSource::new(),
        }
    }

    fn checker(&mut self) -> ValueChecker<'_> {
        ValueChecker::new(&mut self.arena, &self.env, &mut self.diags)
    }

    fn fold(&mut self, ts: CompilationTimestamp, id: ValueId) -> ValueId {
        let mut chain = ReferenceChain::new();
        self.checker()
            .get_value_refd_last(ts, id, Expectation::Constant, &mut chain)
    }
}

// === Folding ===

proptest! {
    #[test]
    fn folding_twice_in_a_pass_gives_the_same_node(a in -1000i64..1000, b in 1i64..1000) {
        let mut w = World::new();
        let ts = w.clock.next_pass();
        let left = w.arena.integer(a, sp(0, 4));
        let right = w.arena.integer(b, sp(7, 11));
        let expr = w.arena.binary(BinaryOp::Mod, left, right, sp(0, 11));

        let first = w.fold(ts, expr);
        let second = w.fold(ts, expr);
        prop_assert_eq!(first, second);
        match w.arena.kind(first) {
            ValueKind::Integer(r) => prop_assert_eq!(r.to_string(), a.rem_euclid(b).to_string()),
            other => prop_assert!(false, "unexpected {:?}", other),
        }
    }
}

#[test]
fn self_referencing_constant_terminates() {
    let mut w = World::new();
    let ts = w.clock.next_pass();
    let name = w.env.intern("c");
    let r = w.arena.reference(Reference::new(name, sp(20, 21)));
    w.env.add_constant("c", None, r, sp(10, 21));

    let folded = w.fold(ts, r);
    assert_eq!(folded, r);
    assert!(w.arena.is_erroneous(folded));
    assert_eq!(w.diags.len(), 1);
    assert_eq!(w.diags[0].code, ErrorCode::E4001);
}

// === Equality ===

#[test]
fn octetstrings_from_bits_and_hex_equal_literals() {
    let mut w = World::new();
    let ts = w.clock.next_pass();
    let oct = w.env.add_type(TypeShape::Octetstring);
    let bits = w.arena.bitstring_literal("00010010", sp(0, 11)).unwrap();
    let hex = w.arena.hexstring_literal("12", sp(20, 25)).unwrap();
    w.arena.set_type(bits, oct);
    w.arena.set_type(hex, oct);
    let literal = w.arena.octetstring_literal("12", sp(30, 35)).unwrap();

    let mut checker = w.checker();
    assert!(checker.check_equality(ts, bits, literal));
    assert!(checker.check_equality(ts, hex, literal));
    assert!(checker.check_equality(ts, bits, hex));
}

#[test]
fn set_of_is_unordered_record_of_is_not() {
    let mut w = World::new();
    let ts = w.clock.next_pass();
    let list = |w: &mut World, values: [i64; 3], set: bool| {
        let elements: Vec<_> = values.iter().map(|&v| w.arena.integer(v, sp(0, 1))).collect();
        if set {
            w.arena.set_of(elements, sp(0, 9))
        } else {
            w.arena.record_of(elements, sp(0, 9))
        }
    };
    let set_a = list(&mut w, [1, 2, 3], true);
    let set_b = list(&mut w, [3, 1, 2], true);
    let rec_a = list(&mut w, [1, 2, 3], false);
    let rec_b = list(&mut w, [3, 1, 2], false);

    let mut checker = w.checker();
    assert!(checker.check_equality(ts, set_a, set_b));
    assert!(!checker.check_equality(ts, rec_a, rec_b));
}

proptest! {
    #[test]
    fn any_permutation_of_a_set_of_is_equal(
        values in prop::collection::vec(-5i64..5, 0..8)
            .prop_flat_map(|v| (Just(v.clone()), Just(v).prop_shuffle()))
    ) {
        let (original, shuffled) = values;
        let mut w = World::new();
        let ts = w.clock.next_pass();
        let a: Vec<_> = original.iter().map(|&v| w.arena.integer(v, sp(0, 1))).collect();
        let b: Vec<_> = shuffled.iter().map(|&v| w.arena.integer(v, sp(0, 1))).collect();
        let set_a = w.arena.set_of(a, sp(0, 1));
        let set_b = w.arena.set_of(b, sp(0, 1));
        prop_assert!(w.checker().check_equality(ts, set_a, set_b));
        prop_assert!(w.diags.is_empty());
    }
}

// === Navigation ===

#[test]
fn array_dimension_two_to_five() {
    let mut w = World::new();
    let ts = w.clock.next_pass();
    let int = w.env.add_type(TypeShape::Integer);
    let arr = w.env.add_type(TypeShape::Array {
        element: int,
        dimension: ArrayDimension::from_bounds(2, 5),
    });
    let elements: Vec<_> = (2..=5).map(|i| w.arena.integer(i, sp(0, 1))).collect();
    let value = w.arena.array(elements.clone(), sp(0, 20));
    w.arena.set_type(value, arr);
    let name = w.env.intern("a");
    let at = |w: &mut World, i: i64| {
        let index = w.arena.integer(i, sp(31, 32));
        let reference = Reference::new(name, sp(30, 31)).index(index, sp(30, 33));
        let mut chain = ReferenceChain::new();
        w.checker()
            .get_referenced_sub_value(ts, value, &reference, 0, &mut chain, NavMode::Normal)
    };

    assert_eq!(at(&mut w, 1), None);
    assert_eq!(at(&mut w, 6), None);
    assert_eq!(at(&mut w, 3), Some(elements[1]));
    let codes: Vec<_> = w.diags.iter().map(|d| d.code).collect();
    assert_eq!(codes, vec![ErrorCode::E1006, ErrorCode::E1007]);
}

// === Literals and characters ===

#[test]
fn escape_sequences() {
    assert_eq!(extract_charstring(r#""""#).as_deref(), Ok("\""));
    assert_eq!(extract_charstring(r"\x41").as_deref(), Ok("A"));
    assert_eq!(extract_charstring(r"\101").as_deref(), Ok("A"));
    assert_eq!(extract_charstring(r"\n").as_deref(), Ok("\n"));
    assert!(matches!(
        extract_charstring(r"\x"),
        Err(EscapeError::MissingHexDigits { .. })
    ));
    assert!(matches!(
        extract_charstring(r"\777"),
        Err(EscapeError::OctalOutOfRange { .. })
    ));
}

#[test]
fn universal_characters_order_by_quadruple() {
    let a = UniversalChar::new(0, 0, 0, 65);
    let b = UniversalChar::new(0, 0, 0, 66);
    let row = UniversalChar::new(0, 0, 1, 0);
    assert!(a < b);
    assert!(b < row);
    assert!(a < row);
}

// === Introspection ===

proptest! {
    #[test]
    fn binding_predicates_never_report(field in "[a-z]{1,6}", index in -3i64..6) {
        let mut w = World::new();
        let ts = w.clock.next_pass();
        let known = w.env.intern("known");
        let one = w.arena.integer(1, sp(0, 1));
        let record = w.arena.record(vec![NamedValue::new(known, sp(0, 1), one)], sp(0, 9));
        let list = w.arena.record_of(vec![one, one], sp(0, 9));
        let root = w.env.intern("c");
        let field = w.env.intern(&field);
        let at = w.arena.integer(index, sp(0, 1));
        let by_field = Reference::new(root, sp(0, 1)).field(field, sp(1, 3));
        let by_index = Reference::new(root, sp(0, 1)).index(at, sp(1, 3));

        let mut checker = w.checker();
        for target in [record, list, one] {
            checker.evaluate_isbound(ts, target, &by_field, 0);
            checker.evaluate_ispresent(ts, target, &by_field, 0);
            checker.evaluate_isbound(ts, target, &by_index, 0);
            checker.evaluate_ispresent(ts, target, &by_index, 0);
        }
        prop_assert!(w.diags.is_empty(), "{:?}", w.diags);
    }
}
