// Copyright (c) 2016-2020 Fabian Schuiki

mod common;
use crate::common::*;
use crate::subtype::bitstring::BitstringSet;
use crate::subtype::limits::{CharLimit, IntLimit, Limit, RealLimit, SizeLimit, UCharLimit};
use crate::subtype::masks::{BooleanSet, VerdictSet};
use crate::subtype::rangelist::{CharRangeList, IntegerRangeList, RangeList};
use crate::subtype::real::RealRangeList;
use crate::subtype::tree::{CharstringTree, Tree};

fn int_sets() -> Vec<IntegerRangeList> {
    vec![
        IntegerRangeList::empty(),
        IntegerRangeList::full(),
        IntegerRangeList::single(0),
        IntegerRangeList::range(1, 10),
        IntegerRangeList::range(5, 20).union(&IntegerRangeList::single(-3)),
        IntegerRangeList::range(IntLimit::MinusInfinity, IntLimit::from(-1)),
        IntegerRangeList::range(11, IntLimit::PlusInfinity),
    ]
}

#[test]
fn range_list_laws() {
    simple_logger::init().is_ok();
    let sets = int_sets();
    for a in &sets {
        assert!(a.union(&a.complement()).is_full(), "{} ∪ ¬{}", a, a);
        assert!(a.intersection(&a.complement()).is_empty(), "{} ∩ ¬{}", a, a);
        assert_eq!(&a.complement().complement(), a);
        assert_eq!(&a.union(a), a);
        for b in &sets {
            assert_eq!(
                a.union(b).complement(),
                a.complement().intersection(&b.complement()),
                "¬({} ∪ {})",
                a,
                b
            );
            assert_eq!(
                a.intersection(b).complement(),
                a.complement().union(&b.complement()),
                "¬({} ∩ {})",
                a,
                b
            );
            assert_eq!(a.union(b), b.union(a));
        }
    }
}

#[test]
fn adjacent_ranges_merge() {
    let a = IntegerRangeList::range(1, 4).union(&IntegerRangeList::range(5, 9));
    assert_eq!(a, IntegerRangeList::range(1, 9));
    let c = CharRangeList::range(CharLimit::new(b'a'), CharLimit::new(b'c'))
        .union(&CharRangeList::single(CharLimit::new(b'd')));
    assert_eq!(
        c,
        CharRangeList::range(CharLimit::new(b'a'), CharLimit::new(b'd'))
    );
}

fn check_next_previous<T: Limit>(values: &[T]) {
    for x in values {
        assert_eq!(&x.next().previous(), x, "{}", x);
        assert_eq!(&x.previous().next(), x, "{}", x);
    }
}

#[test]
fn limit_neighbours() {
    check_next_previous(&[IntLimit::from(-5), IntLimit::from(0), IntLimit::from(1i64 << 40)]);
    check_next_previous(&[SizeLimit::Finite(1), SizeLimit::Finite(100)]);
    check_next_previous(&[CharLimit::new(b'a'), CharLimit::new(1)]);
    check_next_previous(&[UCharLimit::new(0x263A), UCharLimit::new(1)]);
    check_next_previous(&[RealLimit::exact(1.5), RealLimit::exact(-0.25)]);
}

#[test]
#[should_panic]
fn next_of_infinity() {
    IntLimit::PlusInfinity.next();
}

#[test]
fn complement_of_every_category() {
    let reals = RealRangeList::range(RealLimit::exact(0.0), RealLimit::exact(1.0));
    assert!(reals.union(&reals.complement()).is_full());
    assert!(reals.intersection(&reals.complement()).is_empty());
    assert!(!reals.complement().is_range_empty());

    let t = BooleanSet::from(true);
    assert!((t | !t).is_full());
    assert!((t & !t).is_empty());
    let pass = VerdictSet::from(subtype::masks::Verdict::Pass);
    assert!((pass | !pass).is_full());

    let bits = BitstringSet::from_value("01").union(&BitstringSet::from_sizes(
        RangeList::range(3usize, 4usize),
    ));
    assert!(bits.union(&bits.complement()).is_full());
    assert!(bits.intersection(&bits.complement()).is_empty());
}

/// All strings over `alphabet` up to length `max`.
fn strings(alphabet: &[char], max: usize) -> Vec<String> {
    let mut all = vec![String::new()];
    let mut last = vec![String::new()];
    for _ in 0..max {
        last = last
            .iter()
            .flat_map(|s| {
                alphabet.iter().map(move |&c| {
                    let mut t = s.clone();
                    t.push(c);
                    t
                })
            })
            .collect();
        all.extend(last.iter().cloned());
    }
    all
}

#[test]
fn tree_emptiness_has_witnesses() {
    let chars = |a: u8, b: u8| -> CharstringTree {
        Tree::alphabet(
            CharRangeList::range(CharLimit::new(a), CharLimit::new(b)),
            false,
        )
    };
    let sizes = |a: usize, b: usize| -> CharstringTree { Tree::size(RangeList::range(a, b)) };
    let trees: Vec<CharstringTree> = vec![
        chars(b'a', b'b'),
        chars(b'a', b'b').intersection(sizes(2, 3)),
        sizes(1, 2).intersection(sizes(3, 4)),
        chars(b'a', b'a').except(chars(b'a', b'b')),
        sizes(0, 1).except(chars(b'a', b'c')),
        Tree::value("ab".to_string()).union(chars(b'c', b'c').intersection(sizes(1, 1))),
    ];
    let samples = strings(&['a', 'b', 'c', 'x'], 4);
    for tree in &trees {
        let witness = samples.iter().find(|s| tree.is_element(s));
        match tree.is_empty() {
            TriBool::True => assert!(witness.is_none(), "{} has element {:?}", tree, witness),
            TriBool::False => assert!(witness.is_some(), "{} has no witness", tree),
            TriBool::Unknown => (),
        }
    }
}

#[test]
fn tri_bool_tables() {
    use crate::subtype::tribool::TriBool::*;
    let all = [False, Unknown, True];
    let or = [[False, Unknown, True], [Unknown, Unknown, True], [True, True, True]];
    let and = [[False, False, False], [False, Unknown, Unknown], [False, Unknown, True]];
    for (i, &a) in all.iter().enumerate() {
        for (j, &b) in all.iter().enumerate() {
            assert_eq!(a | b, or[i][j]);
            assert_eq!(a & b, and[i][j]);
        }
    }
    assert_eq!(!Unknown, Unknown);
    assert_eq!(!True, False);
}
