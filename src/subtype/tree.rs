// Copyright (c) 2016-2020 Fabian Schuiki

//! Alphabet trees for charstring and universal charstring subtypes.
//!
//! String constraints mix lengths, permitted alphabets, explicit values, and
//! patterns. Not every combination of these can be reduced to a single flat
//! set, so they are kept as an expression tree. Building a node evaluates as
//! much of it as possible: operands of the same kind are merged, explicit
//! values are filtered against the other operand, and empty or full operands
//! are folded away. Whatever remains is queried with three-valued logic.

use crate::limits::{Limit, SizeLimit};
use crate::pattern::StringPattern;
use crate::rangelist::{RangeList, SizeRangeList};
use crate::strvalues::{StringValues, TreeString};
use crate::tribool::TriBool;
use crate::ustring::UString;
use std::fmt;

/// The operator of an interior tree node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOp {
    Intersection,
    Union,
    Except,
}

impl TreeOp {
    pub fn name(self) -> &'static str {
        match self {
            TreeOp::Intersection => "intersection",
            TreeOp::Union => "union",
            TreeOp::Except => "except",
        }
    }
}

/// A constraint on a character string.
#[derive(Debug, Clone)]
pub enum Tree<S: TreeString> {
    /// No string at all.
    Empty,
    /// Every string of the root type.
    All,
    /// The strings whose length is in the set.
    Size(SizeRangeList),
    /// A set of characters. In char context this constrains a single
    /// character, otherwise every character of the string.
    Alphabet {
        set: RangeList<S::Char>,
        char_context: bool,
    },
    /// An explicit set of strings.
    Values(StringValues<S>),
    /// The strings matching a pattern.
    Pattern(StringPattern),
    /// A combination of two trees that could not be evaluated further.
    Op(TreeOp, Box<Tree<S>>, Box<Tree<S>>),
}

pub type CharstringTree = Tree<String>;
pub type UCharstringTree = Tree<UString>;

/// The result of asking a tree for its smallest or largest length or
/// character.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extremum<T> {
    /// The tree has no such limit, e.g. because it is empty.
    Missing,
    /// The limit cannot be determined.
    Unknown,
    Found(T),
}

impl<T: Ord> Extremum<T> {
    /// Combine the limits of the two operands of an intersection.
    fn tighter(self, other: Extremum<T>, is_upper: bool) -> Extremum<T> {
        match (self, other) {
            (Extremum::Found(a), Extremum::Found(b)) => {
                Extremum::Found(if is_upper { a.min(b) } else { a.max(b) })
            }
            (Extremum::Missing, _) | (_, Extremum::Missing) => Extremum::Missing,
            _ => Extremum::Unknown,
        }
    }
}

impl<S: TreeString> Tree<S> {
    /// Create a length constraint.
    pub fn size(set: SizeRangeList) -> Tree<S> {
        Tree::Size(set).simplify()
    }

    /// Create an alphabet constraint.
    pub fn alphabet(set: RangeList<S::Char>, char_context: bool) -> Tree<S> {
        Tree::Alphabet { set, char_context }.simplify()
    }

    /// Create a constraint that contains exactly the given strings.
    pub fn values(values: StringValues<S>) -> Tree<S> {
        Tree::Values(values).simplify()
    }

    /// Create a constraint that contains exactly one string.
    pub fn value(s: S) -> Tree<S> {
        Tree::values(StringValues::single(s))
    }

    /// Create a pattern constraint.
    pub fn pattern(pattern: StringPattern) -> Tree<S> {
        Tree::Pattern(pattern).simplify()
    }

    pub fn intersection(self, other: Tree<S>) -> Tree<S> {
        Tree::op(TreeOp::Intersection, self, other)
    }

    pub fn union(self, other: Tree<S>) -> Tree<S> {
        Tree::op(TreeOp::Union, self, other)
    }

    pub fn except(self, other: Tree<S>) -> Tree<S> {
        Tree::op(TreeOp::Except, self, other)
    }

    /// Replace leaves that are exactly empty or full with `Empty` or `All`.
    fn simplify(self) -> Tree<S> {
        let (empty, full) = match self {
            Tree::Size(ref s) => (s.is_empty(), s.is_full()),
            Tree::Alphabet { ref set, .. } => (set.is_empty(), set.is_full()),
            Tree::Values(ref v) => (v.is_empty(), v.is_full()),
            Tree::Pattern(ref p) => (p.is_empty().is_true(), p.is_full().is_true()),
            _ => (false, false),
        };
        if empty {
            Tree::Empty
        } else if full {
            Tree::All
        } else {
            self
        }
    }

    fn is_single(&self) -> bool {
        match *self {
            Tree::Op(..) => false,
            _ => true,
        }
    }

    fn is_none_leaf(&self) -> bool {
        match *self {
            Tree::Empty => true,
            _ => false,
        }
    }

    fn is_all_leaf(&self) -> bool {
        match *self {
            Tree::All => true,
            _ => false,
        }
    }

    /// Combine two evaluated trees.
    pub fn op(op: TreeOp, a: Tree<S>, b: Tree<S>) -> Tree<S> {
        // One side empty or full.
        let (a_none, b_none) = (a.is_none_leaf(), b.is_none_leaf());
        let (a_all, b_all) = (a.is_all_leaf(), b.is_all_leaf());
        match op {
            TreeOp::Intersection if a_none || b_none => return Tree::Empty,
            TreeOp::Union if a_none => return b,
            TreeOp::Union if b_none => return a,
            TreeOp::Except if b_none => return a,
            TreeOp::Intersection if a_all => return b,
            TreeOp::Intersection if b_all => return a,
            TreeOp::Union if a_all || b_all => return Tree::All,
            TreeOp::Except if b_all => return Tree::Empty,
            _ => (),
        }

        // Trees are not simplified any further.
        if !a.is_single() || !b.is_single() {
            return Tree::Op(op, Box::new(a), Box::new(b));
        }

        // Complement of a length or single character constraint.
        if op == TreeOp::Except && a_all {
            match b {
                Tree::Size(ref s) => return Tree::size(s.complement()),
                Tree::Alphabet {
                    ref set,
                    char_context: true,
                } => return Tree::alphabet(set.complement(), true),
                _ => (),
            }
        }

        // Explicit values can be filtered by the other operand.
        let (a, b) = match (a, b) {
            (Tree::Values(v), b) if !b.is_values() => {
                match Tree::filter_values(op, v, &b, true) {
                    Ok(t) => return t,
                    Err(v) => (Tree::Values(v), b),
                }
            }
            (a, Tree::Values(v)) if !a.is_values() => {
                match Tree::filter_values(op, v, &a, false) {
                    Ok(t) => return t,
                    Err(v) => (a, Tree::Values(v)),
                }
            }
            ab => ab,
        };

        // Operands of the same kind are combined with their own set
        // operations. For alphabets in string context only the intersection
        // distributes: FROM(A) union FROM(B) is not FROM(A union B).
        let combined = match (&a, &b) {
            (Tree::All, Tree::All) => Some(match op {
                TreeOp::Except => Tree::Empty,
                _ => Tree::All,
            }),
            (Tree::Empty, Tree::Empty) => Some(Tree::Empty),
            (Tree::Size(x), Tree::Size(y)) => Some(Tree::size(match op {
                TreeOp::Intersection => x.intersection(y),
                TreeOp::Union => x.union(y),
                TreeOp::Except => x.except(y),
            })),
            (
                Tree::Alphabet {
                    set: x,
                    char_context: cx,
                },
                Tree::Alphabet {
                    set: y,
                    char_context: cy,
                },
            ) => {
                if cx != cy {
                    panic!("alphabet constraints of different contexts combined");
                }
                if *cx || op == TreeOp::Intersection {
                    let set = match op {
                        TreeOp::Intersection => x.intersection(y),
                        TreeOp::Union => x.union(y),
                        TreeOp::Except => x.except(y),
                    };
                    Some(Tree::alphabet(set, *cx))
                } else {
                    None
                }
            }
            (Tree::Values(x), Tree::Values(y)) => Some(Tree::values(match op {
                TreeOp::Intersection => x.intersection(y),
                TreeOp::Union => x.union(y),
                TreeOp::Except => x.except(y),
            })),
            _ => None,
        };
        match combined {
            Some(t) => t,
            None => Tree::Op(op, Box::new(a), Box::new(b)),
        }
    }

    fn is_values(&self) -> bool {
        match *self {
            Tree::Values(_) => true,
            _ => false,
        }
    }

    /// Filter an explicit value set against the other operand of `op`.
    ///
    /// Returns the evaluated tree if the operation could be resolved, or the
    /// filtered values if the node has to be kept.
    fn filter_values(
        op: TreeOp,
        mut values: StringValues<S>,
        other: &Tree<S>,
        values_first: bool,
    ) -> Result<Tree<S>, StringValues<S>> {
        match op {
            TreeOp::Intersection => {
                values.remove_by(other, false);
                Ok(Tree::values(values))
            }
            TreeOp::Union => {
                values.remove_by(other, true);
                if values.is_empty() {
                    Ok(other.clone())
                } else {
                    Err(values)
                }
            }
            TreeOp::Except if values_first => {
                values.remove_by(other, true);
                Ok(Tree::values(values))
            }
            TreeOp::Except => Err(values),
        }
    }

    pub fn is_empty(&self) -> TriBool {
        match *self {
            Tree::Empty => TriBool::True,
            Tree::All => TriBool::False,
            Tree::Size(ref s) => s.is_empty().into(),
            Tree::Alphabet {
                ref set,
                char_context,
            } => {
                if char_context {
                    set.is_empty().into()
                } else {
                    // The empty string is always allowed.
                    TriBool::False
                }
            }
            Tree::Values(ref v) => v.is_empty().into(),
            Tree::Pattern(ref p) => p.is_empty(),
            Tree::Op(TreeOp::Intersection, ref a, ref b) => a.is_empty() | b.is_empty(),
            Tree::Op(TreeOp::Union, ref a, ref b) => a.is_empty() & b.is_empty(),
            Tree::Op(TreeOp::Except, ref a, ref b) => match a.is_empty() {
                TriBool::False => {
                    if b.is_empty().is_true() {
                        TriBool::False
                    } else {
                        TriBool::Unknown
                    }
                }
                r => r,
            },
        }
    }

    pub fn is_full(&self) -> TriBool {
        match *self {
            Tree::Empty => TriBool::False,
            Tree::All => TriBool::True,
            Tree::Size(ref s) => s.is_full().into(),
            Tree::Alphabet { ref set, .. } => set.is_full().into(),
            Tree::Values(ref v) => v.is_full().into(),
            Tree::Pattern(ref p) => p.is_full(),
            Tree::Op(TreeOp::Intersection, ref a, ref b) => a.is_full() & b.is_full(),
            Tree::Op(TreeOp::Union, ref a, ref b) => a.is_full() | b.is_full(),
            Tree::Op(TreeOp::Except, ref a, ref b) => a.is_full() & b.is_empty(),
        }
    }

    pub fn is_equal(&self, other: &Tree<S>) -> TriBool {
        match (self, other) {
            (Tree::Empty, Tree::Empty) | (Tree::All, Tree::All) => TriBool::True,
            (Tree::Size(x), Tree::Size(y)) => x.is_equal(y).into(),
            (Tree::Alphabet { set: x, .. }, Tree::Alphabet { set: y, .. }) => {
                x.is_equal(y).into()
            }
            (Tree::Values(x), Tree::Values(y)) => x.is_equal(y).into(),
            (Tree::Pattern(x), Tree::Pattern(y)) => x.is_equal(y),
            _ => TriBool::Unknown,
        }
    }

    /// Check whether a string satisfies the constraint. Patterns that
    /// cannot be decided let the string pass.
    pub fn is_element(&self, s: &S) -> bool {
        match *self {
            Tree::Empty => false,
            Tree::All => true,
            Tree::Size(ref set) => set.is_element(&SizeLimit::from(s.char_len())),
            Tree::Alphabet { ref set, .. } => match s.to_chars() {
                Some(chars) => chars.iter().all(|c| set.is_element(c)),
                None => false,
            },
            Tree::Values(ref v) => v.is_element(s),
            Tree::Pattern(ref p) => !s.match_pattern(p).is_false(),
            Tree::Op(TreeOp::Intersection, ref a, ref b) => a.is_element(s) && b.is_element(s),
            Tree::Op(TreeOp::Union, ref a, ref b) => a.is_element(s) || b.is_element(s),
            Tree::Op(TreeOp::Except, ref a, ref b) => a.is_element(s) && !b.is_element(s),
        }
    }

    /// Check whether `self` is a subset of `other`.
    ///
    /// Constraints of different kinds are considered unrelated, so that for
    /// example `length(1..4)` is not reported as not being a subset of
    /// `from("a".."z")`.
    pub fn is_subset(&self, other: &Tree<S>) -> TriBool {
        match (self, other) {
            (Tree::Empty, _) => TriBool::True,
            (Tree::All, Tree::All) => TriBool::True,
            (Tree::All, _) => TriBool::Unknown,
            (Tree::Size(x), Tree::Size(y)) => x.is_subset(y).into(),
            (Tree::Alphabet { set: x, .. }, Tree::Alphabet { set: y, .. }) => {
                x.is_subset(y).into()
            }
            (Tree::Values(x), Tree::Values(y)) => x.is_subset(y).into(),
            (Tree::Pattern(x), Tree::Pattern(y)) => x.is_subset(y),
            _ => TriBool::Unknown,
        }
    }

    /// The smallest or largest character the constraint allows.
    pub fn get_alphabet_limit(&self, is_upper: bool) -> Extremum<S::Char> {
        let bound = || {
            Extremum::Found(if is_upper {
                <S::Char as Limit>::maximum()
            } else {
                <S::Char as Limit>::minimum()
            })
        };
        match *self {
            Tree::Empty | Tree::Values(_) => Extremum::Missing,
            Tree::All | Tree::Size(_) => bound(),
            Tree::Alphabet { ref set, .. } => {
                let limit = if is_upper {
                    set.get_maximal()
                } else {
                    set.get_minimal()
                };
                match limit {
                    Some(l) => Extremum::Found(l.clone()),
                    None => Extremum::Missing,
                }
            }
            Tree::Pattern(_) => Extremum::Unknown,
            Tree::Op(TreeOp::Intersection, ref a, ref b) => a
                .get_alphabet_limit(is_upper)
                .tighter(b.get_alphabet_limit(is_upper), is_upper),
            Tree::Op(..) => Extremum::Unknown,
        }
    }

    /// The smallest or largest length the constraint allows.
    pub fn get_size_limit(&self, is_upper: bool) -> Extremum<SizeLimit> {
        let bound = || {
            Extremum::Found(if is_upper {
                SizeLimit::maximum()
            } else {
                SizeLimit::minimum()
            })
        };
        match *self {
            Tree::Empty | Tree::Values(_) => Extremum::Missing,
            Tree::All | Tree::Alphabet { .. } => bound(),
            Tree::Size(ref set) => {
                let limit = if is_upper {
                    set.get_maximal()
                } else {
                    set.get_minimal()
                };
                match limit {
                    Some(l) => Extremum::Found(l.clone()),
                    None => Extremum::Missing,
                }
            }
            Tree::Pattern(_) => Extremum::Unknown,
            Tree::Op(TreeOp::Intersection, ref a, ref b) => a
                .get_size_limit(is_upper)
                .tighter(b.get_size_limit(is_upper), is_upper),
            Tree::Op(..) => Extremum::Unknown,
        }
    }

    /// Check whether the tree may appear as a range in a permitted alphabet
    /// constraint: only single characters and `SIZE(1)` qualify.
    pub fn is_valid_range(&self) -> bool {
        match *self {
            Tree::Empty | Tree::All | Tree::Alphabet { .. } => true,
            Tree::Size(ref s) => s.is_equal(&SizeRangeList::single(1usize)),
            Tree::Values(_) | Tree::Pattern(_) => false,
            Tree::Op(_, ref a, ref b) => a.is_valid_range() && b.is_valid_range(),
        }
    }

    /// Switch between char and string context.
    ///
    /// A `SIZE(1)` constraint in char context allows every character. Only
    /// trees for which `is_valid_range` holds may be switched.
    pub fn set_char_context(&mut self, ctx: bool) {
        match *self {
            Tree::Empty | Tree::All => (),
            Tree::Size(_) => {
                if ctx {
                    *self = Tree::All;
                } else {
                    panic!("length constraint cannot be moved to string context");
                }
            }
            Tree::Alphabet {
                ref mut char_context,
                ..
            } => *char_context = ctx,
            Tree::Values(_) | Tree::Pattern(_) => {
                panic!("value and pattern constraints have no char context")
            }
            Tree::Op(_, ref mut a, ref mut b) => {
                a.set_char_context(ctx);
                b.set_char_context(ctx);
            }
        }
    }
}

impl<S: TreeString> StringValues<S> {
    /// Remove the strings that are (or are not) elements of a leaf
    /// constraint. Other trees leave the values untouched.
    pub fn remove_by(&mut self, tree: &Tree<S>, if_element: bool) {
        match *tree {
            Tree::Size(ref s) => self.remove_by_size(s, if_element),
            Tree::Alphabet { ref set, .. } => self.remove_by_alphabet(set, if_element),
            Tree::Pattern(ref p) => self.remove_by_pattern(p, if_element),
            _ => (),
        }
    }
}

impl<S: TreeString> fmt::Display for Tree<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Tree::Empty => Ok(()),
            Tree::All => write!(f, "ALL"),
            Tree::Size(ref s) => write!(f, "length{}", s),
            Tree::Alphabet {
                ref set,
                char_context,
            } => write!(f, "{}{}", if char_context { "range" } else { "from" }, set),
            Tree::Values(ref v) => write!(f, "{}", v),
            Tree::Pattern(ref p) => write!(f, "{}", p),
            Tree::Op(op, ref a, ref b) => write!(f, "({} {} {})", a, op.name(), b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::CharLimit;

    fn chars(a: u8, b: u8) -> CharstringTree {
        Tree::alphabet(
            RangeList::range(CharLimit::new(a), CharLimit::new(b)),
            false,
        )
    }

    fn len(a: usize, b: usize) -> CharstringTree {
        Tree::size(SizeRangeList::range(a, b))
    }

    fn val(s: &str) -> CharstringTree {
        Tree::value(s.to_string())
    }

    fn s(s: &str) -> String {
        s.to_string()
    }

    #[test]
    fn leaves_simplify() {
        assert!(Tree::<String>::size(SizeRangeList::full()).is_all_leaf());
        assert!(Tree::<String>::size(SizeRangeList::empty()).is_none_leaf());
        assert!(Tree::<String>::values(StringValues::empty()).is_none_leaf());
        assert_eq!(format!("{}", len(1, 4)), "length(1..4)");
        assert_eq!(format!("{}", chars(b'a', b'z')), "from(\"a\"..\"z\")");
    }

    #[test]
    fn same_kind_is_merged() {
        let t = len(1, 4).intersection(len(3, 10));
        assert_eq!(format!("{}", t), "length(3..4)");
        let t = chars(b'a', b'z').intersection(chars(b'm', b'z'));
        assert_eq!(format!("{}", t), "from(\"m\"..\"z\")");
        // Alphabets only distribute over intersections in string context.
        let t = chars(b'a', b'c').union(chars(b'x', b'z'));
        assert_eq!(format!("{}", t), "(from(\"a\"..\"c\") union from(\"x\"..\"z\"))");
        assert!(t.is_element(&s("abc")));
        assert!(!t.is_element(&s("ax")));
    }

    #[test]
    fn values_are_filtered() {
        let v = val("ab").union(val("abcdef"));
        let t = v.clone().intersection(len(1, 4));
        assert_eq!(format!("{}", t), "(\"ab\")");
        let t = len(1, 4).union(v.clone());
        assert_eq!(format!("{}", t), "(length(1..4) union (\"abcdef\"))");
        let t = len(1, 10).union(v.clone());
        assert_eq!(format!("{}", t), "length(1..10)");
        let t = v.clone().except(len(1, 4));
        assert_eq!(format!("{}", t), "(\"abcdef\")");
        let t = v.intersection(val("ab").union(val("x")));
        assert_eq!(format!("{}", t), "(\"ab\")");
    }

    #[test]
    fn complement_of_all() {
        let t = Tree::All.except(len(0, 4));
        assert_eq!(format!("{}", t), "length(5..infinity)");
        let mut c = chars(b'a', b'z');
        c.set_char_context(true);
        let t = Tree::All.except(c);
        assert!(t.is_element(&s("A")));
        assert_eq!(t.get_alphabet_limit(false), Extremum::Found(CharLimit::new(0)));
        let t = Tree::All.except(val("x"));
        assert_eq!(format!("{}", t), "(ALL except (\"x\"))");
        assert_eq!(t.is_empty(), TriBool::Unknown);
        assert_eq!(t.is_full(), TriBool::False);
    }

    #[test]
    fn tri_valued_queries() {
        let p: CharstringTree = Tree::pattern(StringPattern::new("[a-c]+", false));
        let a = chars(b'a', b'z');
        assert_eq!(a.is_subset(&p), TriBool::Unknown);
        assert_eq!(p.is_empty(), TriBool::Unknown);
        let t = a.clone().intersection(p.clone());
        assert_eq!(t.is_empty(), TriBool::Unknown);
        assert!(t.is_element(&s("abc")));
        assert!(!t.is_element(&s("xyz")));
        assert!(!t.is_element(&s("ad")));
        assert_eq!(a.is_empty(), TriBool::False);
        assert_eq!(len(1, 2).is_subset(&len(0, 3)), TriBool::True);
        assert_eq!(len(1, 4).is_subset(&a), TriBool::Unknown);
        assert_eq!(Tree::Empty.is_subset(&a), TriBool::True);
        assert_eq!(a.is_equal(&chars(b'a', b'z')), TriBool::True);
    }

    #[test]
    fn limits() {
        let t = chars(b'b', b'y').intersection(len(2, 5));
        assert_eq!(
            format!("{}", t),
            "(from(\"b\"..\"y\") intersection length(2..5))"
        );
        assert_eq!(t.get_alphabet_limit(true), Extremum::Found(CharLimit::new(b'y')));
        assert_eq!(t.get_alphabet_limit(false), Extremum::Found(CharLimit::new(b'b')));
        assert_eq!(t.get_size_limit(true), Extremum::Found(SizeLimit::from(5usize)));
        assert_eq!(t.get_size_limit(false), Extremum::Found(SizeLimit::from(2usize)));
        let u = chars(b'b', b'y').union(val("a"));
        assert_eq!(u.get_alphabet_limit(true), Extremum::Unknown);
        assert_eq!(val("a").get_size_limit(true), Extremum::Missing);
    }

    #[test]
    fn char_context() {
        let size1 = Tree::<String>::size(SizeRangeList::single(1usize));
        assert!(size1.is_valid_range());
        assert!(!len(1, 2).is_valid_range());
        assert!(!val("a").is_valid_range());
        let mut t = chars(b'a', b'c').intersection(size1);
        t.set_char_context(true);
        assert!(t.is_all_leaf() || t.is_valid_range());
        let mut a = chars(b'a', b'c');
        a.set_char_context(true);
        assert_eq!(a.is_empty(), TriBool::False);
        assert_eq!(format!("{}", a), "range(\"a\"..\"c\")");
    }
}
