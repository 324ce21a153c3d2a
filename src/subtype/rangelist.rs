// Copyright (c) 2016-2020 Fabian Schuiki

//! Sets of values represented as sorted lists of disjoint intervals.

use crate::limits::{CharLimit, IntLimit, Limit, SizeLimit, UCharLimit};
use std::cmp::Ordering;
use std::fmt;

/// An ordered set of intervals over a limit type.
///
/// The set is stored as a sorted list of boundary values. Each value carries
/// a flag indicating whether an interval starts at it and extends up to the
/// next value; values without the flag are either single points or the end
/// of an interval.
///
/// The representation is canonical:
///
/// - values are strictly increasing;
/// - adjacent values are always joined into an interval;
/// - no two intervals touch, they would have been merged;
/// - the empty set has no values;
/// - the full set is the single interval `minimum..maximum`.
///
/// Two sets are therefore equal iff their representations are equal.
///
/// # Example
///
/// ```
/// use ttsub_subtype::rangelist::IntegerRangeList;
///
/// let a = IntegerRangeList::range(1, 10);
/// let b = IntegerRangeList::range(5, 20);
/// assert_eq!(format!("{}", a.intersection(&b)), "(5..10)");
/// assert_eq!(format!("{}", a.complement()), "(-infinity..0,11..infinity)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeList<T> {
    values: Vec<T>,
    intervals: Vec<bool>,
}

pub type IntegerRangeList = RangeList<IntLimit>;
pub type SizeRangeList = RangeList<SizeLimit>;
pub type CharRangeList = RangeList<CharLimit>;
pub type UCharRangeList = RangeList<UCharLimit>;

/// One step of the sweep over two range lists.
#[derive(Debug, Clone, Copy)]
struct SweepPoint {
    a: Option<usize>,
    b: Option<usize>,
    union_interval: bool,
    intersection_interval: bool,
    intersection_point: bool,
}

impl SweepPoint {
    fn new(a: Option<usize>, b: Option<usize>) -> SweepPoint {
        SweepPoint {
            a,
            b,
            union_interval: false,
            intersection_interval: false,
            intersection_point: false,
        }
    }
}

impl<T: Limit> RangeList<T> {
    /// Create the empty set.
    pub fn empty() -> RangeList<T> {
        RangeList {
            values: vec![],
            intervals: vec![],
        }
    }

    /// Create the set of all values of the domain.
    pub fn full() -> RangeList<T> {
        RangeList::range(T::minimum(), T::maximum())
    }

    /// Create a set that contains exactly one value.
    pub fn single<L: Into<T>>(l: L) -> RangeList<T> {
        let l = l.into();
        l.check_single_value();
        RangeList {
            values: vec![l],
            intervals: vec![false],
        }
    }

    /// Create a set that contains all values from `begin` to `end`,
    /// inclusively. Panics if `end < begin`.
    pub fn range<B: Into<T>, E: Into<T>>(begin: B, end: E) -> RangeList<T> {
        let (begin, end) = (begin.into(), end.into());
        match begin.cmp(&end) {
            Ordering::Greater => panic!("invalid range {}..{}", begin, end),
            Ordering::Equal => RangeList::single(begin),
            Ordering::Less => {
                begin.check_interval_start();
                end.check_interval_end();
                RangeList {
                    values: vec![begin, end],
                    intervals: vec![true, false],
                }
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.values.len() == 2
            && self.values[0] == T::minimum()
            && self.values[1] == T::maximum()
            && self.intervals[0]
    }

    pub fn is_equal(&self, other: &RangeList<T>) -> bool {
        self == other
    }

    /// Check whether a value is part of the set.
    pub fn is_element(&self, l: &T) -> bool {
        match self.values.binary_search(l) {
            Ok(_) => true,
            Err(0) => false,
            Err(i) => self.intervals[i - 1],
        }
    }

    pub fn union(&self, other: &RangeList<T>) -> RangeList<T> {
        self.set_operation(other, true)
    }

    pub fn intersection(&self, other: &RangeList<T>) -> RangeList<T> {
        self.set_operation(other, false)
    }

    /// All values in `self` but not in `other`.
    pub fn except(&self, other: &RangeList<T>) -> RangeList<T> {
        self.intersection(&other.complement())
    }

    pub fn is_subset(&self, other: &RangeList<T>) -> bool {
        self.except(other).is_empty()
    }

    fn sweep_value<'a>(&'a self, other: &'a RangeList<T>, p: &SweepPoint) -> &'a T {
        match (p.a, p.b) {
            (Some(i), _) => &self.values[i],
            (None, Some(i)) => &other.values[i],
            (None, None) => unreachable!("sweep point without value"),
        }
    }

    fn set_operation(&self, other: &RangeList<T>, is_union: bool) -> RangeList<T> {
        if self.is_empty() {
            return if is_union { other.clone() } else { self.clone() };
        }
        if other.is_empty() {
            return if is_union { self.clone() } else { other.clone() };
        }

        // Merge the boundary values of both sets into one sorted sequence.
        let mut points = Vec::with_capacity(self.values.len() + other.values.len());
        let (mut ai, mut bi) = (0, 0);
        while ai < self.values.len() || bi < other.values.len() {
            let (a, b) = if ai >= self.values.len() {
                (None, Some(bi))
            } else if bi >= other.values.len() {
                (Some(ai), None)
            } else {
                match self.values[ai].cmp(&other.values[bi]) {
                    Ordering::Less => (Some(ai), None),
                    Ordering::Equal => (Some(ai), Some(bi)),
                    Ordering::Greater => (None, Some(bi)),
                }
            };
            if a.is_some() {
                ai += 1;
            }
            if b.is_some() {
                bi += 1;
            }
            points.push(SweepPoint::new(a, b));
        }

        // Sweep over the points and track which intervals we are in.
        let (mut in_a, mut in_b) = (false, false);
        for p in &mut points {
            let mut a_interval = in_a;
            if let Some(i) = p.a {
                a_interval = self.intervals[i];
                if a_interval && in_a {
                    panic!("overlapping intervals in range list");
                }
                in_a = a_interval;
            }
            let mut b_interval = in_b;
            if let Some(i) = p.b {
                b_interval = other.intervals[i];
                if b_interval && in_b {
                    panic!("overlapping intervals in range list");
                }
                in_b = b_interval;
            }
            p.union_interval = a_interval || b_interval;
            p.intersection_point = (p.a.is_some() || in_a) && (p.b.is_some() || in_b);
            p.intersection_interval = a_interval && b_interval;
        }

        // Adjacent points of a union form an interval.
        if is_union {
            for i in 1..points.len() {
                let first = self.sweep_value(other, &points[i - 1]);
                let second = self.sweep_value(other, &points[i]);
                if first.is_adjacent(second) {
                    points[i - 1].union_interval = true;
                    points[i - 1].intersection_interval =
                        points[i - 1].intersection_point && points[i].intersection_point;
                }
            }
        }

        // Emit the points, dropping the ones inside of merged intervals.
        let mut result = RangeList::empty();
        for i in 0..points.len() {
            let p = &points[i];
            let interval = if is_union {
                if i > 0 && points[i - 1].union_interval && p.union_interval {
                    continue;
                }
                p.union_interval
            } else {
                if !p.intersection_point {
                    continue;
                }
                if i > 0 && points[i - 1].intersection_interval && p.intersection_interval {
                    continue;
                }
                p.intersection_interval
            };
            result.values.push(self.sweep_value(other, p).clone());
            result.intervals.push(interval);
        }
        result
    }

    /// All values of the domain that are not in `self`.
    pub fn complement(&self) -> RangeList<T> {
        if self.is_empty() {
            return RangeList::full();
        }
        let min = T::minimum();
        let max = T::maximum();
        let mut result = RangeList::empty();
        let first = &self.values[0];
        if *first != min {
            if min.is_adjacent(first) {
                result.push(min.clone(), false);
            } else {
                result.push(min.clone(), true);
                result.push(first.previous(), false);
            }
        }
        let last = self.values.len() - 1;
        for i in 0..last {
            if self.intervals[i] {
                continue;
            }
            let gap_begin = self.values[i].next();
            let gap_end = self.values[i + 1].previous();
            if gap_begin == gap_end {
                result.push(gap_begin, false);
            } else {
                result.push(gap_begin, true);
                result.push(gap_end, false);
            }
        }
        let last = &self.values[last];
        if *last != max {
            if last.is_adjacent(&max) {
                result.push(max, false);
            } else {
                result.push(last.next(), true);
                result.push(max, false);
            }
        }
        result
    }

    fn push(&mut self, value: T, interval: bool) {
        self.values.push(value);
        self.intervals.push(interval);
    }

    /// The smallest value in the set, or `None` if the set is empty.
    pub fn get_minimal(&self) -> Option<&T> {
        self.values.first()
    }

    /// The largest value in the set, or `None` if the set is empty.
    pub fn get_maximal(&self) -> Option<&T> {
        self.values.last()
    }

    pub fn is_upper_limit_infinity(&self) -> bool {
        self.values.last().map(|v| *v == T::maximum()).unwrap_or(false)
    }

    pub fn is_lower_limit_infinity(&self) -> bool {
        self.values.first().map(|v| *v == T::minimum()).unwrap_or(false)
    }

    /// The set as a list of inclusive `(begin, end)` pairs. Single values
    /// have `begin == end`.
    pub fn ranges(&self) -> Vec<(T, T)> {
        let mut ranges = vec![];
        let mut i = 0;
        while i < self.values.len() {
            if self.intervals[i] {
                ranges.push((self.values[i].clone(), self.values[i + 1].clone()));
                i += 2;
            } else {
                ranges.push((self.values[i].clone(), self.values[i].clone()));
                i += 1;
            }
        }
        ranges
    }

    /// Render the set without the surrounding parentheses, e.g. `1..10,20`.
    pub fn to_string_bare(&self) -> String {
        let mut s = String::new();
        let last = self.values.len().saturating_sub(1);
        for (i, (v, &interval)) in self.values.iter().zip(&self.intervals).enumerate() {
            s.push_str(&v.to_string());
            if interval {
                s.push_str("..");
            } else if i < last {
                s.push(',');
            }
        }
        s
    }
}

impl<T: Limit> fmt::Display for RangeList<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({})", self.to_string_bare())
    }
}

impl RangeList<IntLimit> {
    /// Convert a set of integers into a set of sizes.
    ///
    /// Returns `None` if the set contains `-infinity`, negative numbers, or
    /// numbers that do not fit into a size.
    pub fn to_size_range(&self) -> Option<SizeRangeList> {
        let values = self
            .values
            .iter()
            .map(SizeLimit::from_int_limit)
            .collect::<Option<Vec<_>>>()?;
        Some(RangeList {
            values,
            intervals: self.intervals.clone(),
        })
    }
}

impl RangeList<SizeLimit> {
    /// Convert a set of sizes into a set of integers.
    pub fn to_int_range(&self) -> IntegerRangeList {
        RangeList {
            values: self.values.iter().map(|v| v.to_int_limit()).collect(),
            intervals: self.intervals.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(ranges: &[(i64, i64)]) -> IntegerRangeList {
        ranges.iter().fold(RangeList::empty(), |acc, &(a, b)| {
            acc.union(&RangeList::range(a, b))
        })
    }

    #[test]
    fn construction() {
        let e = IntegerRangeList::empty();
        assert!(e.is_empty());
        assert!(!e.is_full());
        assert!(IntegerRangeList::full().is_full());
        assert_eq!(format!("{}", IntegerRangeList::single(3)), "(3)");
        assert_eq!(format!("{}", IntegerRangeList::range(3, 3)), "(3)");
        assert_eq!(format!("{}", IntegerRangeList::range(1, 5)), "(1..5)");
    }

    #[test]
    #[should_panic]
    fn inverted_range() {
        IntegerRangeList::range(5, 1);
    }

    #[test]
    #[should_panic]
    fn infinite_single_value() {
        IntegerRangeList::single(IntLimit::PlusInfinity);
    }

    #[test]
    fn membership() {
        let s = ints(&[(1, 10), (20, 20), (30, 40)]);
        assert_eq!(format!("{}", s), "(1..10,20,30..40)");
        for &(v, expect) in &[
            (0, false),
            (1, true),
            (5, true),
            (10, true),
            (11, false),
            (20, true),
            (25, false),
            (35, true),
            (41, false),
        ] {
            assert_eq!(s.is_element(&IntLimit::from(v)), expect, "value {}", v);
        }
        assert!(!IntegerRangeList::empty().is_element(&IntLimit::from(0)));
    }

    #[test]
    fn adjacent_values_merge() {
        let s = ints(&[(1, 1), (2, 2), (3, 3)]);
        assert_eq!(format!("{}", s), "(1..3)");
        let s = ints(&[(1, 4), (5, 9)]);
        assert_eq!(format!("{}", s), "(1..9)");
        let s = ints(&[(1, 4), (6, 9)]);
        assert_eq!(format!("{}", s), "(1..4,6..9)");
    }

    #[test]
    fn union_and_intersection() {
        let a = ints(&[(1, 10)]);
        let b = ints(&[(5, 20)]);
        assert_eq!(format!("{}", a.union(&b)), "(1..20)");
        assert_eq!(format!("{}", a.intersection(&b)), "(5..10)");
        assert_eq!(format!("{}", a.except(&b)), "(1..4)");
        let c = ints(&[(12, 12)]);
        assert!(a.intersection(&c).is_empty());
        assert!(c.is_subset(&b));
        assert!(!a.is_subset(&b));
    }

    #[test]
    fn complement() {
        let a = ints(&[(1, 10), (12, 12)]);
        assert_eq!(
            format!("{}", a.complement()),
            "(-infinity..0,11,13..infinity)"
        );
        assert_eq!(a.complement().complement(), a);
        assert!(IntegerRangeList::full().complement().is_empty());
        let half = IntegerRangeList::range(IntLimit::MinusInfinity, 0);
        assert_eq!(format!("{}", half.complement()), "(1..infinity)");
    }

    #[test]
    fn laws() {
        let sets = vec![
            ints(&[]),
            ints(&[(1, 10)]),
            ints(&[(5, 20), (30, 30)]),
            ints(&[(-3, 3), (8, 9), (11, 11)]),
            IntegerRangeList::full(),
            IntegerRangeList::range(IntLimit::MinusInfinity, 7),
        ];
        for a in &sets {
            assert!(a.union(&a.complement()).is_full());
            assert!(a.intersection(&a.complement()).is_empty());
            assert_eq!(a.union(a), *a);
            assert_eq!(a.intersection(a), *a);
            for b in &sets {
                assert_eq!(
                    a.union(b).complement(),
                    a.complement().intersection(&b.complement())
                );
                assert_eq!(
                    a.intersection(b).complement(),
                    a.complement().union(&b.complement())
                );
                assert_eq!(a.union(b), b.union(a));
            }
        }
    }

    #[test]
    fn sizes() {
        let s = SizeRangeList::range(3usize, SizeLimit::Infinity);
        assert_eq!(format!("{}", s), "(3..infinity)");
        assert_eq!(format!("{}", s.complement()), "(0..2)");
        assert!(s.is_upper_limit_infinity());
        assert!(!s.is_lower_limit_infinity());
        assert_eq!(
            format!("{}", SizeRangeList::single(0usize).complement()),
            "(1..infinity)"
        );
        assert_eq!(s.get_minimal(), Some(&SizeLimit::Finite(3)));
    }

    #[test]
    fn int_to_size() {
        let i = ints(&[(1, 4), (7, 7)]);
        assert_eq!(
            format!("{}", i.to_size_range().unwrap()),
            "(1..4,7)"
        );
        assert!(ints(&[(-1, 4)]).to_size_range().is_none());
        assert!(IntegerRangeList::full().to_size_range().is_none());
        let s = SizeRangeList::range(2usize, SizeLimit::Infinity);
        assert_eq!(format!("{}", s.to_int_range()), "(2..infinity)");
    }

    #[test]
    fn chars() {
        let a = CharRangeList::range(CharLimit::new(b'a'), CharLimit::new(b'z'));
        assert_eq!(format!("{}", a), "(\"a\"..\"z\")");
        assert!(a.is_element(&CharLimit::new(b'q')));
        assert!(!a.is_element(&CharLimit::new(b'A')));
        let c = a.complement();
        assert!(c.is_element(&CharLimit::new(0)));
        assert!(c.is_element(&CharLimit::new(127)));
    }

    #[test]
    fn ranges_listing() {
        let s = ints(&[(1, 3), (5, 5)]);
        assert_eq!(
            s.ranges(),
            vec![
                (IntLimit::from(1), IntLimit::from(3)),
                (IntLimit::from(5), IntLimit::from(5))
            ]
        );
    }
}
