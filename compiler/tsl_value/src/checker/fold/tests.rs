use pretty_assertions::assert_eq;
use tsl_diagnostic::ErrorCode;

use crate::chain::ReferenceChain;
use crate::checker::fixture::{sp, ts, Fixture};
use crate::env::{Component, DefKind, Definition, TypeShape};
use crate::value::{BinaryOp, Expectation, MacroKind, NamedValue, Reference, ValueKind};

// === References ===

#[test]
fn reference_to_constant_folds_to_its_value() {
    let mut fx = Fixture::new();
    let five = fx.arena.integer(5, sp(10, 11));
    fx.constant("c", five);
    let r = fx.reference("c", 20);

    assert_eq!(fx.fold(1, r), five);
    assert!(fx.diags.is_empty());
}

#[test]
fn chained_constants_fold_to_the_last_value() {
    let mut fx = Fixture::new();
    let seven = fx.arena.integer(7, sp(10, 11));
    fx.constant("a", seven);
    let to_a = fx.reference("a", 20);
    fx.constant("b", to_a);
    let to_b = fx.reference("b", 30);

    assert_eq!(fx.fold(1, to_b), seven);
}

#[test]
fn field_of_a_constant_record() {
    let mut fx = Fixture::new();
    let (a, b) = (fx.name("a"), fx.name("b"));
    let int = fx.env.add_type(TypeShape::Integer);
    let rec = fx
        .env
        .add_type(TypeShape::Record(vec![Component::new(a, int), Component::new(b, int)]));
    let one = fx.arena.integer(1, sp(5, 6));
    let two = fx.arena.integer(2, sp(13, 14));
    let value = fx.arena.record(
        vec![
            NamedValue::new(a, sp(0, 1), one),
            NamedValue::new(b, sp(8, 9), two),
        ],
        sp(0, 15),
    );
    fx.arena.set_type(value, rec);
    fx.constant("c", value);
    let c = fx.name("c");
    let r = fx.arena.reference(Reference::new(c, sp(20, 21)).field(b, sp(21, 23)));

    assert_eq!(fx.fold(1, r), two);
    assert!(fx.diags.is_empty());
}

#[test]
fn unknown_name_is_reported_once() {
    let mut fx = Fixture::new();
    let r = fx.reference("nowhere", 4);

    assert_eq!(fx.fold(1, r), r);
    assert_eq!(fx.fold(1, r), r);
    assert_eq!(fx.codes(), vec![ErrorCode::E2003]);
    assert!(fx.arena.is_erroneous(r));
    assert_eq!(fx.diags[0].primary_span(), Some(sp(4, 11)));
}

#[test]
fn non_constant_definitions_stay_unfoldable() {
    let mut fx = Fixture::new();
    let init = fx.arena.integer(3, sp(10, 11));
    let name = fx.name("v");
    fx.env.add_definition(Definition {
        name,
        kind: DefKind::Variable,
        ty: None,
        value: Some(init),
        span: sp(0, 11),
    });
    let r = fx.reference("v", 20);

    assert_eq!(fx.fold(1, r), r);
    let unfoldable = fx.with(|checker| {
        checker.is_unfoldable(ts(1), r, Expectation::DynamicValue, &mut ReferenceChain::new())
    });
    assert!(unfoldable);
    assert!(fx.diags.is_empty());
    assert!(!fx.arena.is_erroneous(r));
}

// === Circularity ===

#[test]
fn self_reference_is_a_cycle() {
    let mut fx = Fixture::new();
    let r = fx.reference("c", 10);
    fx.constant("c", r);

    assert_eq!(fx.fold(1, r), r);
    assert!(fx.arena.is_erroneous(r));
    assert_eq!(fx.codes(), vec![ErrorCode::E4001]);
    assert_eq!(fx.diags[0].message, "circular reference: `c` -> `c`");
}

#[test]
fn mutual_recursion_names_the_path() {
    let mut fx = Fixture::new();
    let to_b = fx.reference("b", 10);
    fx.constant("a", to_b);
    let to_a = fx.reference("a", 20);
    fx.constant("b", to_a);
    let start = fx.reference("a", 30);

    let folded = fx.fold(1, start);
    assert_eq!(folded, to_b);
    assert!(fx.arena.is_erroneous(to_b));
    assert_eq!(fx.codes(), vec![ErrorCode::E4001]);
    assert_eq!(fx.diags[0].message, "circular reference: `b` -> `a` -> `b`");
}

#[test]
fn cycle_through_an_expression_terminates() {
    let mut fx = Fixture::new();
    let r = fx.reference("n", 10);
    let one = fx.arena.integer(1, sp(14, 15));
    let sum = fx.arena.binary(BinaryOp::Add, r, one, sp(10, 15));
    fx.constant("n", sum);

    let folded = fx.fold(1, sum);
    assert_eq!(folded, sum);
    assert!(fx.arena.is_erroneous(sum));
    assert!(fx.codes().contains(&ErrorCode::E4001));
}

// === Caching ===

#[test]
fn folding_is_idempotent_within_a_pass() {
    let mut fx = Fixture::new();
    let one = fx.arena.integer(1, sp(0, 1));
    let two = fx.arena.integer(2, sp(4, 5));
    let sum = fx.arena.binary(BinaryOp::Add, one, two, sp(0, 5));

    let first = fx.fold(1, sum);
    let nodes = fx.arena.len();
    let second = fx.fold(1, sum);
    assert_eq!(first, second);
    assert_eq!(fx.arena.len(), nodes);
    assert!(matches!(fx.arena.kind(first), ValueKind::Integer(i) if *i == 3.into()));
}

#[test]
fn newer_pass_evaluates_again_in_place() {
    let mut fx = Fixture::new();
    let one = fx.arena.integer(1, sp(0, 1));
    let three = fx.arena.integer(3, sp(0, 1));
    let c = fx.constant("c", one);
    let factor = fx.reference("c", 10);
    let two = fx.arena.integer(2, sp(14, 15));
    let product = fx.arena.binary(BinaryOp::Multiply, factor, two, sp(10, 15));

    let first = fx.fold(1, product);
    assert!(matches!(fx.arena.kind(first), ValueKind::Integer(i) if *i == 2.into()));
    let len = fx.arena.len();

    fx.env.set_value(c, three);
    let second = fx.fold(2, product);
    assert_eq!(second, first);
    assert!(matches!(fx.arena.kind(second), ValueKind::Integer(i) if *i == 6.into()));
    assert_eq!(fx.arena.len(), len);
    // An older pass reuses the newest result.
    assert_eq!(fx.fold(1, product), second);
    assert_eq!(fx.arena.get(product).last_time_checked(), Some(ts(2)));
}

#[test]
fn repeated_passes_do_not_grow_the_arena() {
    let mut fx = Fixture::new();
    let module = fx.arena.macro_value(MacroKind::ModuleId, sp(0, 9));
    let two = fx.arena.integer(2, sp(10, 11));
    let three = fx.arena.integer(3, sp(14, 15));
    let sum = fx.arena.binary(BinaryOp::Add, two, three, sp(10, 15));

    fx.fold(1, module);
    fx.fold(1, sum);
    let len = fx.arena.len();
    for pass in 2..=200 {
        fx.fold(pass, module);
        let folded = fx.fold(pass, sum);
        assert!(matches!(fx.arena.kind(folded), ValueKind::Integer(i) if *i == 5.into()));
    }
    assert_eq!(fx.arena.len(), len);
    assert!(fx.diags.is_empty());
}

// === Macros ===

#[test]
fn module_and_definition_macros() {
    let mut fx = Fixture::new();
    let module = fx.arena.macro_value(MacroKind::ModuleId, sp(10, 19));
    let def = fx.arena.macro_value(MacroKind::DefinitionId, sp(30, 43));
    let name = fx.name("greeting");
    fx.env.add_definition(Definition {
        name,
        kind: DefKind::Constant,
        ty: None,
        value: Some(def),
        span: sp(20, 44),
    });

    let folded = fx.fold(1, module);
    assert!(matches!(fx.arena.kind(folded), ValueKind::Charstring(s) if s == "Module"));
    assert!(fx.arena.get(folded).is_generated());
    let folded = fx.fold(1, def);
    assert!(matches!(fx.arena.kind(folded), ValueKind::Charstring(s) if s == "greeting"));
    assert!(fx.diags.is_empty());
}

#[test]
fn definition_id_outside_a_definition_is_an_error() {
    let mut fx = Fixture::new();
    let def = fx.arena.macro_value(MacroKind::DefinitionId, sp(30, 43));

    assert_eq!(fx.fold(1, def), def);
    assert_eq!(fx.codes(), vec![ErrorCode::E2004]);
    assert!(fx.arena.is_erroneous(def));
}

#[test]
fn file_and_line_macros() {
    let mut fx = Fixture::new();
    fx.env.set_source("module Module {\n  const integer x := 1;\n  const charstring l := %lineNumber;\n}\n");
    let line = fx.arena.macro_value(MacroKind::LineNumber, sp(62, 73));
    let line_int = fx.arena.macro_value(MacroKind::LineNumberInteger, sp(62, 73));
    let base = fx.arena.macro_value(MacroKind::BaseFileName, sp(62, 73));
    let path = fx.arena.macro_value(MacroKind::FilePath, sp(62, 73));
    let scope = fx.arena.macro_value(MacroKind::Scope, sp(62, 73));

    let text = |fx: &mut Fixture, id| {
        let folded = fx.fold(1, id);
        match fx.arena.kind(folded) {
            ValueKind::Charstring(s) => s.clone(),
            other => panic!("expected a charstring, found {other:?}"),
        }
    };
    assert_eq!(text(&mut fx, line), "3");
    assert_eq!(text(&mut fx, base), "Module.tsl");
    assert_eq!(text(&mut fx, path), "specs/src/Module.tsl");
    assert_eq!(text(&mut fx, scope), "Module");
    let folded = fx.fold(1, line_int);
    assert!(matches!(fx.arena.kind(folded), ValueKind::Integer(i) if *i == 3.into()));
}

#[test]
fn testcase_id_depends_on_the_context() {
    let mut fx = Fixture::new();
    let in_constant = fx.arena.macro_value(MacroKind::TestcaseId, sp(0, 11));
    let at_runtime = fx.arena.macro_value(MacroKind::TestcaseId, sp(20, 31));

    assert_eq!(fx.fold(1, in_constant), in_constant);
    assert_eq!(fx.codes(), vec![ErrorCode::E2004]);

    let folded = fx.with(|checker| {
        checker.get_value_refd_last(
            ts(1),
            at_runtime,
            Expectation::DynamicValue,
            &mut ReferenceChain::new(),
        )
    });
    assert_eq!(folded, at_runtime);
    assert_eq!(fx.diags.len(), 1);
    assert!(!fx.arena.is_erroneous(at_runtime));
}

// === Lower-case identifiers ===

#[test]
fn lower_identifier_becomes_item_or_reference() {
    let mut fx = Fixture::new();
    let (red, green, limit) = (fx.name("red"), fx.name("green"), fx.name("limit"));
    let color = fx.env.add_type(TypeShape::Enumerated {
        items: vec![red, green],
    });
    let item = fx.arena.lower_identifier(green, sp(0, 5));
    fx.arena.set_type(item, color);

    let folded = fx.fold(1, item);
    assert!(matches!(fx.arena.kind(folded), ValueKind::Enumerated(n) if *n == green));

    let ten = fx.arena.integer(10, sp(20, 22));
    fx.constant("limit", ten);
    let named = fx.arena.lower_identifier(limit, sp(30, 35));
    assert_eq!(fx.fold(1, named), ten);
    assert!(fx.diags.is_empty());
}
