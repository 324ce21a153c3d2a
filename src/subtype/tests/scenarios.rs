// Copyright (c) 2016-2020 Fabian Schuiki

mod common;
use crate::common::*;
use crate::subtype::limits::SizeLimit;
use crate::subtype::pattern::StringPattern;
use crate::subtype::rangelist::{CharRangeList, IntegerRangeList, SizeRangeList};
use crate::subtype::schema::{emit_schema, range_from_schema};
use crate::subtype::tree::Tree;

#[test]
fn integer_intersected_with_parent() {
    let values = Values::new();
    let mut c = SubtypeConstraint::integer(IntegerRangeList::range(1, 10));
    c.intersection(&SubtypeConstraint::integer(IntegerRangeList::range(5, 20)));
    assert_eq!(c.to_string(), "(5..10)");
    assert!(!c.is_value_element(values.int(3)));
    assert!(c.is_value_element(values.int(7)));

    // The same through declared types, where the child stays inside its
    // parent.
    let diag = DiagCollector::new();
    let mut table = SubtypeTable::new();
    let parent = table.add_subtype("Parent", SubtypeKind::Integer);
    table[parent].set_clauses(vec![range(values.int(5), values.int(20))]);
    let child = table.add_subtype("Child", SubtypeKind::Integer);
    table[child].set_parent(parent);
    table[child].set_clauses(vec![range(values.int(5), values.int(10))]);
    table.check_all(&diag);
    assert!(diag.is_empty());
    assert_eq!(table[child].to_display_string(), "(5..10)");
    table.check_value(child, values.int(3), &diag);
    table.check_value(child, values.int(7), &diag);
    assert_eq!(
        diag.messages(Severity::Error),
        vec!["3 is not a valid value for type `Child' which has subtype (5..10)"]
    );
}

#[test]
fn alias_inherits_parent() {
    let values = Values::new();
    let diag = DiagCollector::new();
    let mut table = SubtypeTable::new();
    let parent = table.add_subtype("Byte", SubtypeKind::Integer);
    table[parent].set_clauses(vec![range(values.int(0), values.int(255))]);
    let alias = table.add_subtype("Octet", SubtypeKind::Integer);
    table[alias].set_parent(parent);
    table.check(alias, &diag);
    assert_eq!(table[parent].state(), CheckState::Checked);
    assert_eq!(table[alias].to_display_string(), "(0..255)");
    table.check_value(alias, values.int(256), &diag);
    assert_eq!(diag.num_errors(), 1);
}

#[test]
fn alphabet_with_pattern() {
    let values = Values::new();
    let alphabet = Tree::alphabet(
        CharRangeList::range(
            subtype::limits::CharLimit::new(b'a'),
            subtype::limits::CharLimit::new(b'z'),
        ),
        false,
    );
    let pattern: Tree<String> = Tree::pattern(StringPattern::new("[a-c]+", false));
    assert_eq!(alphabet.is_subset(&pattern), TriBool::Unknown);

    let diag = DiagCollector::new();
    let mut table = SubtypeTable::new();
    let id = table.add_subtype("Lower", SubtypeKind::Charstring);
    table[id].set_clauses(vec![
        range(values.chars("a"), values.chars("z")),
        Clause::Pattern {
            text: "[a-c]+".into(),
            nocase: false,
        },
    ]);
    table.check(id, &diag);
    assert!(diag.is_empty());
    assert!(!table[id].is_error());
    table.check_value(id, values.chars("abc"), &diag);
    assert!(diag.is_empty());
    table.check_value(id, values.chars("XYZ"), &diag);
    assert_eq!(diag.num_errors(), 1);
}

#[test]
fn record_of_except_value() {
    let values = Values::new();
    let empty = values.ints(&[]);
    let mut c = SubtypeConstraint::from_value(empty).unwrap();
    let sizes = SizeRangeList::range(2usize, SizeLimit::Infinity);
    let mut by_size = SubtypeConstraint::from_sizes(SubtypeKind::RecordOf, sizes.clone()).unwrap();
    by_size.set_length(None);
    c.union(&by_size);
    assert_eq!(c.to_string(), "({  }) union length(2..infinity)");
    assert!(c.is_value_element(empty));

    c.except(&SubtypeConstraint::from_value(empty).unwrap());
    assert_eq!(c.to_string(), "length(2..infinity)");
    assert_eq!(c.is_empty(), TriBool::False);
    assert!(!c.is_value_element(empty));
    assert!(c.is_value_element(values.ints(&[1, 2, 3])));
    match *c.set() {
        ConstraintSet::Recof(Some(ref r)) => {
            assert_eq!(r.size_set(), &sizes);
            assert_eq!(r.has_values().is_empty(), TriBool::True);
        }
        _ => panic!("record of constraint lost its set"),
    }
}

#[test]
fn circular_parents() {
    let diag = DiagCollector::new();
    let mut table = SubtypeTable::new();
    let a = table.add_subtype("A", SubtypeKind::Integer);
    let b = table.add_subtype("B", SubtypeKind::Integer);
    table[a].set_parent(b);
    table[b].set_parent(a);
    table.check(a, &diag);
    assert_eq!(
        diag.messages(Severity::Error),
        vec![
            "While checking circular type references in subtype definitions: Circular \
             reference: `B' -> `A' -> `B'"
        ]
    );
    assert!(table[a].is_error());
    assert!(table[b].is_error());
}

#[test]
fn empty_intersection_reported() {
    let values = Values::new();
    let diag = DiagCollector::new();
    let mut table = SubtypeTable::new();
    let id = table.add_subtype("Nothing", SubtypeKind::Bitstring);
    table[id].set_clauses(vec![
        length(values.int(1), values.int(2)),
        length(values.int(4), values.int(5)),
    ]);
    table.check(id, &diag);
    assert_eq!(
        diag.messages(Severity::Error),
        vec!["The subtype is an empty set"]
    );
    assert!(table[id].is_error());

    // An erroneous subtype accepts everything.
    table.check_value(id, &Value::Bitstring("1".into()), &diag);
    assert_eq!(diag.num_errors(), 1);
}

#[test]
fn schema_round_trip() {
    let values = Values::new();
    let diag = DiagCollector::new();
    let mut table = SubtypeTable::new();
    let small = table.add_subtype("Small", SubtypeKind::Integer);
    table[small].set_clauses(vec![
        Clause::Range {
            min: Bound::MinusInfinity,
            min_exclusive: false,
            max: Bound::Value(values.int(-1)),
            max_exclusive: false,
        },
        Clause::Range {
            min: Bound::Value(values.int(3)),
            min_exclusive: true,
            max: Bound::Value(values.int(9)),
            max_exclusive: false,
        },
    ]);
    let list = table.add_subtype("List", SubtypeKind::SetOf);
    table[list].set_clauses(vec![length(values.int(0), values.int(8))]);
    table.check_all(&diag);
    assert!(diag.is_empty());

    for &id in &[small, list] {
        let schema = emit_schema(&table, id);
        let back = range_from_schema(table[id].kind(), &schema).unwrap();
        assert_eq!(
            back.is_equal(table[id].constraint()),
            TriBool::True,
            "{} does not round-trip through {}",
            table[id].to_display_string(),
            schema
        );
    }
}
