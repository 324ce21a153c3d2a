// Copyright (c) 2016-2020 Fabian Schuiki

//! The subtype constraint of a type, independent of where it came from.
//!
//! A constraint carries the category of its root type and at most one set
//! from the category's domain. An absent set means the constraint does not
//! restrict the root type at all. All binary operations require both sides
//! to be of the same category; anything else is a bug in the caller.

use crate::bitstring::{BitstringSet, HexstringSet, OctetstringSet, StringKind, StringSet};
use crate::limits::{IntLimit, Limit, SizeLimit};
use crate::masks::{BooleanSet, VerdictSet};
use crate::rangelist::{IntegerRangeList, RangeList, SizeRangeList};
use crate::real::RealRangeList;
use crate::recof::RecofConstraint;
use crate::strvalues::TreeString;
use crate::tree::{CharstringTree, Extremum, Tree, UCharstringTree};
use crate::tribool::TriBool;
use crate::values::{Value, ValueListConstraint};
use std::fmt;
use ttsub_common::errors::{DiagBuilder2, DiagEmitter};

/// The category of the root type of a subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubtypeKind {
    Integer,
    Float,
    Boolean,
    Verdict,
    Bitstring,
    Hexstring,
    Octetstring,
    Charstring,
    UCharstring,
    Objid,
    Record,
    Set,
    Enum,
    Union,
    Function,
    Altstep,
    Testcase,
    RecordOf,
    SetOf,
}

impl SubtypeKind {
    pub fn name(self) -> &'static str {
        match self {
            SubtypeKind::Integer => "integer",
            SubtypeKind::Float => "float",
            SubtypeKind::Boolean => "boolean",
            SubtypeKind::Verdict => "verdicttype",
            SubtypeKind::Bitstring => "bitstring",
            SubtypeKind::Hexstring => "hexstring",
            SubtypeKind::Octetstring => "octetstring",
            SubtypeKind::Charstring => "charstring",
            SubtypeKind::UCharstring => "universal charstring",
            SubtypeKind::Objid => "objid",
            SubtypeKind::Record => "record",
            SubtypeKind::Set => "set",
            SubtypeKind::Enum => "enumerated",
            SubtypeKind::Union => "union",
            SubtypeKind::Function => "function",
            SubtypeKind::Altstep => "altstep",
            SubtypeKind::Testcase => "testcase",
            SubtypeKind::RecordOf => "record of",
            SubtypeKind::SetOf => "set of",
        }
    }

    /// Parse the name returned by `name()`.
    pub fn from_name(name: &str) -> Option<SubtypeKind> {
        Some(match name {
            "integer" => SubtypeKind::Integer,
            "float" => SubtypeKind::Float,
            "boolean" => SubtypeKind::Boolean,
            "verdicttype" => SubtypeKind::Verdict,
            "bitstring" => SubtypeKind::Bitstring,
            "hexstring" => SubtypeKind::Hexstring,
            "octetstring" => SubtypeKind::Octetstring,
            "charstring" => SubtypeKind::Charstring,
            "universal charstring" => SubtypeKind::UCharstring,
            "objid" => SubtypeKind::Objid,
            "record" => SubtypeKind::Record,
            "set" => SubtypeKind::Set,
            "enumerated" => SubtypeKind::Enum,
            "union" => SubtypeKind::Union,
            "function" => SubtypeKind::Function,
            "altstep" => SubtypeKind::Altstep,
            "testcase" => SubtypeKind::Testcase,
            "record of" => SubtypeKind::RecordOf,
            "set of" => SubtypeKind::SetOf,
            _ => return None,
        })
    }

    /// Whether the category is a list type.
    pub fn is_recof(self) -> bool {
        self == SubtypeKind::RecordOf || self == SubtypeKind::SetOf
    }

    /// Whether values of this category have a length.
    pub fn has_length(self) -> bool {
        match self {
            SubtypeKind::Bitstring
            | SubtypeKind::Hexstring
            | SubtypeKind::Octetstring
            | SubtypeKind::Charstring
            | SubtypeKind::UCharstring
            | SubtypeKind::RecordOf
            | SubtypeKind::SetOf => true,
            _ => false,
        }
    }

    /// The category a value belongs to. `None` for values that carry no
    /// category, i.e. unfoldable and erroneous ones.
    pub fn of_value(v: &Value) -> Option<SubtypeKind> {
        Some(match *v {
            Value::Integer(_) => SubtypeKind::Integer,
            Value::Float(_) => SubtypeKind::Float,
            Value::Boolean(_) => SubtypeKind::Boolean,
            Value::Verdict(_) => SubtypeKind::Verdict,
            Value::Bitstring(_) => SubtypeKind::Bitstring,
            Value::Hexstring(_) => SubtypeKind::Hexstring,
            Value::Octetstring(_) => SubtypeKind::Octetstring,
            Value::Charstring(_) => SubtypeKind::Charstring,
            Value::UCharstring(_) => SubtypeKind::UCharstring,
            Value::Objid(_) => SubtypeKind::Objid,
            Value::Enumerated(_) => SubtypeKind::Enum,
            Value::Record(_) => SubtypeKind::Record,
            Value::Set(_) => SubtypeKind::Set,
            Value::Union(..) => SubtypeKind::Union,
            Value::RecordOf(_) => SubtypeKind::RecordOf,
            Value::SetOf(_) => SubtypeKind::SetOf,
            Value::Function(_) => SubtypeKind::Function,
            Value::Altstep(_) => SubtypeKind::Altstep,
            Value::Testcase(_) => SubtypeKind::Testcase,
            Value::Unfoldable | Value::Error => return None,
        })
    }
}

impl fmt::Display for SubtypeKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// The set operations every category's domain set provides.
///
/// The queries are three-valued since not every domain can decide them.
/// The constructive operations are restricted to sized types so the trait
/// can still be used as an object for the queries.
pub trait SetAlgebra: fmt::Display {
    fn empty_set() -> Self
    where
        Self: Sized;

    fn set_union(&self, other: &Self) -> Self
    where
        Self: Sized;

    fn set_intersection(&self, other: &Self) -> Self
    where
        Self: Sized;

    fn set_except(&self, other: &Self) -> Self
    where
        Self: Sized;

    fn set_complement(&self) -> Self
    where
        Self: Sized;

    fn tri_is_subset(&self, other: &Self) -> TriBool
    where
        Self: Sized;

    fn tri_is_equal(&self, other: &Self) -> TriBool
    where
        Self: Sized;

    fn tri_is_empty(&self) -> TriBool;

    fn tri_is_full(&self) -> TriBool;
}

/// Implement `SetAlgebra` for a set with exact, two-valued queries.
macro_rules! exact_set_algebra {
    ($ty:ty, [$($generics:tt)*]) => {
        impl<$($generics)*> SetAlgebra for $ty {
            fn empty_set() -> Self {
                <$ty>::empty()
            }

            fn set_union(&self, other: &Self) -> Self {
                <$ty>::union(self, other)
            }

            fn set_intersection(&self, other: &Self) -> Self {
                <$ty>::intersection(self, other)
            }

            fn set_except(&self, other: &Self) -> Self {
                <$ty>::except(self, other)
            }

            fn set_complement(&self) -> Self {
                <$ty>::complement(self)
            }

            fn tri_is_subset(&self, other: &Self) -> TriBool {
                <$ty>::is_subset(self, other).into()
            }

            fn tri_is_equal(&self, other: &Self) -> TriBool {
                (self == other).into()
            }

            fn tri_is_empty(&self) -> TriBool {
                <$ty>::is_empty(self).into()
            }

            fn tri_is_full(&self) -> TriBool {
                <$ty>::is_full(self).into()
            }
        }
    };
}

exact_set_algebra!(RangeList<T>, [T: Limit]);
exact_set_algebra!(RealRangeList, []);
exact_set_algebra!(StringSet<K>, [K: StringKind]);

/// Implement `SetAlgebra` for a bit mask set.
macro_rules! mask_set_algebra {
    ($ty:ty) => {
        impl SetAlgebra for $ty {
            fn empty_set() -> Self {
                <$ty>::empty()
            }

            fn set_union(&self, other: &Self) -> Self {
                *self | *other
            }

            fn set_intersection(&self, other: &Self) -> Self {
                *self & *other
            }

            fn set_except(&self, other: &Self) -> Self {
                <$ty>::except(self, other)
            }

            fn set_complement(&self) -> Self {
                !*self
            }

            fn tri_is_subset(&self, other: &Self) -> TriBool {
                <$ty>::is_subset(self, other).into()
            }

            fn tri_is_equal(&self, other: &Self) -> TriBool {
                (self == other).into()
            }

            fn tri_is_empty(&self) -> TriBool {
                <$ty>::is_empty(self).into()
            }

            fn tri_is_full(&self) -> TriBool {
                <$ty>::is_full(self).into()
            }
        }
    };
}

mask_set_algebra!(BooleanSet);
mask_set_algebra!(VerdictSet);

impl<S: TreeString> SetAlgebra for Tree<S> {
    fn empty_set() -> Tree<S> {
        Tree::Empty
    }

    fn set_union(&self, other: &Tree<S>) -> Tree<S> {
        self.clone().union(other.clone())
    }

    fn set_intersection(&self, other: &Tree<S>) -> Tree<S> {
        self.clone().intersection(other.clone())
    }

    fn set_except(&self, other: &Tree<S>) -> Tree<S> {
        self.clone().except(other.clone())
    }

    fn set_complement(&self) -> Tree<S> {
        Tree::All.except(self.clone())
    }

    fn tri_is_subset(&self, other: &Tree<S>) -> TriBool {
        Tree::is_subset(self, other)
    }

    fn tri_is_equal(&self, other: &Tree<S>) -> TriBool {
        Tree::is_equal(self, other)
    }

    fn tri_is_empty(&self) -> TriBool {
        Tree::is_empty(self)
    }

    fn tri_is_full(&self) -> TriBool {
        Tree::is_full(self)
    }
}

impl<'v> SetAlgebra for ValueListConstraint<'v> {
    fn empty_set() -> Self {
        ValueListConstraint::empty()
    }

    fn set_union(&self, other: &Self) -> Self {
        ValueListConstraint::union(self, other)
    }

    fn set_intersection(&self, other: &Self) -> Self {
        ValueListConstraint::intersection(self, other)
    }

    fn set_except(&self, other: &Self) -> Self {
        ValueListConstraint::except(self, other)
    }

    fn set_complement(&self) -> Self {
        ValueListConstraint::complement(self)
    }

    fn tri_is_subset(&self, other: &Self) -> TriBool {
        ValueListConstraint::is_subset(self, other)
    }

    fn tri_is_equal(&self, other: &Self) -> TriBool {
        ValueListConstraint::is_equal(self, other)
    }

    fn tri_is_empty(&self) -> TriBool {
        ValueListConstraint::is_empty(self)
    }

    fn tri_is_full(&self) -> TriBool {
        ValueListConstraint::is_full(self)
    }
}

impl<'v> SetAlgebra for RecofConstraint<'v> {
    fn empty_set() -> Self {
        RecofConstraint::empty()
    }

    fn set_union(&self, other: &Self) -> Self {
        RecofConstraint::union(self, other)
    }

    fn set_intersection(&self, other: &Self) -> Self {
        RecofConstraint::intersection(self, other)
    }

    fn set_except(&self, other: &Self) -> Self {
        RecofConstraint::except(self, other)
    }

    fn set_complement(&self) -> Self {
        RecofConstraint::complement(self)
    }

    fn tri_is_subset(&self, other: &Self) -> TriBool {
        RecofConstraint::is_subset(self, other)
    }

    fn tri_is_equal(&self, other: &Self) -> TriBool {
        RecofConstraint::is_equal(self, other)
    }

    fn tri_is_empty(&self) -> TriBool {
        RecofConstraint::is_empty(self)
    }

    fn tri_is_full(&self) -> TriBool {
        RecofConstraint::is_full(self)
    }
}

/// The domain set of a constraint, one variant per category family. `None`
/// stands for the full set of the category.
#[derive(Debug, Clone)]
pub enum ConstraintSet<'v> {
    /// The constraint is erroneous. It is compatible with everything so no
    /// follow-up errors are reported.
    Error,
    Integer(Option<IntegerRangeList>),
    Float(Option<RealRangeList>),
    Boolean(Option<BooleanSet>),
    Verdict(Option<VerdictSet>),
    Bitstring(Option<BitstringSet>),
    Hexstring(Option<HexstringSet>),
    Octetstring(Option<OctetstringSet>),
    Charstring(Option<CharstringTree>),
    UCharstring(Option<UCharstringTree>),
    /// Objid, record, set, enumerated, union, and the behaviour types.
    Values(Option<ValueListConstraint<'v>>),
    /// Record-of and set-of.
    Recof(Option<RecofConstraint<'v>>),
}

impl<'v> ConstraintSet<'v> {
    /// The unrestricted set of a category.
    pub fn full(kind: SubtypeKind) -> ConstraintSet<'v> {
        match kind {
            SubtypeKind::Integer => ConstraintSet::Integer(None),
            SubtypeKind::Float => ConstraintSet::Float(None),
            SubtypeKind::Boolean => ConstraintSet::Boolean(None),
            SubtypeKind::Verdict => ConstraintSet::Verdict(None),
            SubtypeKind::Bitstring => ConstraintSet::Bitstring(None),
            SubtypeKind::Hexstring => ConstraintSet::Hexstring(None),
            SubtypeKind::Octetstring => ConstraintSet::Octetstring(None),
            SubtypeKind::Charstring => ConstraintSet::Charstring(None),
            SubtypeKind::UCharstring => ConstraintSet::UCharstring(None),
            SubtypeKind::Objid
            | SubtypeKind::Record
            | SubtypeKind::Set
            | SubtypeKind::Enum
            | SubtypeKind::Union
            | SubtypeKind::Function
            | SubtypeKind::Altstep
            | SubtypeKind::Testcase => ConstraintSet::Values(None),
            SubtypeKind::RecordOf | SubtypeKind::SetOf => ConstraintSet::Recof(None),
        }
    }

    /// The set as a trait object. `None` if the set is absent or erroneous.
    pub fn as_algebra(&self) -> Option<&dyn SetAlgebra> {
        match *self {
            ConstraintSet::Error => None,
            ConstraintSet::Integer(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Float(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Boolean(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Verdict(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Bitstring(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Hexstring(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Octetstring(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Charstring(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::UCharstring(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Values(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
            ConstraintSet::Recof(ref s) => s.as_ref().map(|s| s as &dyn SetAlgebra),
        }
    }

    /// Whether the set is present, i.e. actually restricts its category.
    pub fn is_present(&self) -> bool {
        self.as_algebra().is_some()
    }

    /// Drop the set, leaving the category unrestricted.
    fn clear(&mut self) {
        match *self {
            ConstraintSet::Error => (),
            ConstraintSet::Integer(ref mut s) => *s = None,
            ConstraintSet::Float(ref mut s) => *s = None,
            ConstraintSet::Boolean(ref mut s) => *s = None,
            ConstraintSet::Verdict(ref mut s) => *s = None,
            ConstraintSet::Bitstring(ref mut s) => *s = None,
            ConstraintSet::Hexstring(ref mut s) => *s = None,
            ConstraintSet::Octetstring(ref mut s) => *s = None,
            ConstraintSet::Charstring(ref mut s) => *s = None,
            ConstraintSet::UCharstring(ref mut s) => *s = None,
            ConstraintSet::Values(ref mut s) => *s = None,
            ConstraintSet::Recof(ref mut s) => *s = None,
        }
    }
}

/// Apply a function to the sets of two constraints of the same category.
/// Erroneous operands are absorbing.
macro_rules! combine_sets {
    ($a:expr, $b:expr, $f:ident) => {
        match ($a, $b) {
            (ConstraintSet::Integer(a), &ConstraintSet::Integer(ref b)) => {
                ConstraintSet::Integer($f(a, b))
            }
            (ConstraintSet::Float(a), &ConstraintSet::Float(ref b)) => {
                ConstraintSet::Float($f(a, b))
            }
            (ConstraintSet::Boolean(a), &ConstraintSet::Boolean(ref b)) => {
                ConstraintSet::Boolean($f(a, b))
            }
            (ConstraintSet::Verdict(a), &ConstraintSet::Verdict(ref b)) => {
                ConstraintSet::Verdict($f(a, b))
            }
            (ConstraintSet::Bitstring(a), &ConstraintSet::Bitstring(ref b)) => {
                ConstraintSet::Bitstring($f(a, b))
            }
            (ConstraintSet::Hexstring(a), &ConstraintSet::Hexstring(ref b)) => {
                ConstraintSet::Hexstring($f(a, b))
            }
            (ConstraintSet::Octetstring(a), &ConstraintSet::Octetstring(ref b)) => {
                ConstraintSet::Octetstring($f(a, b))
            }
            (ConstraintSet::Charstring(a), &ConstraintSet::Charstring(ref b)) => {
                ConstraintSet::Charstring($f(a, b))
            }
            (ConstraintSet::UCharstring(a), &ConstraintSet::UCharstring(ref b)) => {
                ConstraintSet::UCharstring($f(a, b))
            }
            (ConstraintSet::Values(a), &ConstraintSet::Values(ref b)) => {
                ConstraintSet::Values($f(a, b))
            }
            (ConstraintSet::Recof(a), &ConstraintSet::Recof(ref b)) => {
                ConstraintSet::Recof($f(a, b))
            }
            (ConstraintSet::Error, _) | (_, &ConstraintSet::Error) => ConstraintSet::Error,
            _ => unreachable!("constraint sets of different categories"),
        }
    };
}

/// Evaluate a function on the sets of two constraints of the same category.
macro_rules! compare_sets {
    ($a:expr, $b:expr, $f:ident, $error:expr) => {
        match ($a, $b) {
            (&ConstraintSet::Integer(ref a), &ConstraintSet::Integer(ref b)) => $f(a, b),
            (&ConstraintSet::Float(ref a), &ConstraintSet::Float(ref b)) => $f(a, b),
            (&ConstraintSet::Boolean(ref a), &ConstraintSet::Boolean(ref b)) => $f(a, b),
            (&ConstraintSet::Verdict(ref a), &ConstraintSet::Verdict(ref b)) => $f(a, b),
            (&ConstraintSet::Bitstring(ref a), &ConstraintSet::Bitstring(ref b)) => $f(a, b),
            (&ConstraintSet::Hexstring(ref a), &ConstraintSet::Hexstring(ref b)) => $f(a, b),
            (&ConstraintSet::Octetstring(ref a), &ConstraintSet::Octetstring(ref b)) => $f(a, b),
            (&ConstraintSet::Charstring(ref a), &ConstraintSet::Charstring(ref b)) => $f(a, b),
            (&ConstraintSet::UCharstring(ref a), &ConstraintSet::UCharstring(ref b)) => $f(a, b),
            (&ConstraintSet::Values(ref a), &ConstraintSet::Values(ref b)) => $f(a, b),
            (&ConstraintSet::Recof(ref a), &ConstraintSet::Recof(ref b)) => $f(a, b),
            (&ConstraintSet::Error, _) | (_, &ConstraintSet::Error) => $error,
            _ => unreachable!("constraint sets of different categories"),
        }
    };
}

fn unite<T: SetAlgebra>(a: Option<T>, b: &Option<T>) -> Option<T> {
    match (a, b) {
        (Some(a), &Some(ref b)) => Some(a.set_union(b)),
        _ => None,
    }
}

fn intersect<T: SetAlgebra + Clone>(a: Option<T>, b: &Option<T>) -> Option<T> {
    match (a, b) {
        (a, &None) => a,
        (None, &Some(ref b)) => Some(b.clone()),
        (Some(a), &Some(ref b)) => Some(a.set_intersection(b)),
    }
}

fn subtract<T: SetAlgebra>(a: Option<T>, b: &Option<T>) -> Option<T> {
    match (a, b) {
        (_, &None) => Some(T::empty_set()),
        (None, &Some(ref b)) => Some(b.set_complement()),
        (Some(a), &Some(ref b)) => Some(a.set_except(b)),
    }
}

fn subset<T: SetAlgebra>(a: &Option<T>, b: &Option<T>) -> TriBool {
    match (a, b) {
        (&Some(ref a), &Some(ref b)) => a.tri_is_subset(b),
        _ => TriBool::True,
    }
}

fn equal<T: SetAlgebra>(a: &Option<T>, b: &Option<T>) -> TriBool {
    match (a, b) {
        (&Some(ref a), &Some(ref b)) => a.tri_is_equal(b),
        (&None, &None) => TriBool::True,
        (&Some(ref a), &None) | (&None, &Some(ref a)) => a.tri_is_full(),
    }
}

fn compatible<T: SetAlgebra>(a: &Option<T>, b: &Option<T>) -> bool {
    match (a, b) {
        (&Some(ref a), &Some(ref b)) => !a.set_intersection(b).tri_is_empty().is_true(),
        _ => true,
    }
}

/// A subtype constraint: a category, the set of allowed values, and the
/// length restriction of list types.
#[derive(Debug, Clone)]
pub struct SubtypeConstraint<'v> {
    kind: SubtypeKind,
    set: ConstraintSet<'v>,
    length: Option<SizeRangeList>,
}

impl<'v> SubtypeConstraint<'v> {
    /// Create a constraint that does not restrict its category.
    pub fn new(kind: SubtypeKind) -> SubtypeConstraint<'v> {
        SubtypeConstraint {
            kind,
            set: ConstraintSet::full(kind),
            length: None,
        }
    }

    /// Create a constraint from a set. Panics if the set does not belong to
    /// the category.
    pub fn with_set(kind: SubtypeKind, set: ConstraintSet<'v>) -> SubtypeConstraint<'v> {
        let full = ConstraintSet::full(kind);
        if std::mem::discriminant(&full) != std::mem::discriminant(&set) {
            panic!("constraint set does not belong to category {}", kind);
        }
        SubtypeConstraint {
            kind,
            set,
            length: None,
        }
    }

    /// Create the constraint that allows a single value. `None` for values
    /// that carry no category.
    pub fn from_value(v: &'v Value) -> Option<SubtypeConstraint<'v>> {
        let kind = SubtypeKind::of_value(v)?;
        let set = match *v {
            Value::Integer(ref i) => {
                ConstraintSet::Integer(Some(IntegerRangeList::single(IntLimit::Number(i.clone()))))
            }
            Value::Float(f) => ConstraintSet::Float(Some(RealRangeList::from_value(f))),
            Value::Boolean(b) => ConstraintSet::Boolean(Some(BooleanSet::from(b))),
            Value::Verdict(x) => ConstraintSet::Verdict(Some(VerdictSet::from(x))),
            Value::Bitstring(ref s) => {
                ConstraintSet::Bitstring(Some(StringSet::from_value(s.as_str())))
            }
            Value::Hexstring(ref s) => {
                ConstraintSet::Hexstring(Some(StringSet::from_value(s.as_str())))
            }
            Value::Octetstring(ref s) => {
                ConstraintSet::Octetstring(Some(StringSet::from_value(s.as_str())))
            }
            Value::Charstring(ref s) => ConstraintSet::Charstring(Some(Tree::value(s.clone()))),
            Value::UCharstring(ref s) => ConstraintSet::UCharstring(Some(Tree::value(s.clone()))),
            Value::RecordOf(_) | Value::SetOf(_) => {
                ConstraintSet::Recof(Some(RecofConstraint::from_value(v)))
            }
            _ => ConstraintSet::Values(Some(ValueListConstraint::single(v))),
        };
        Some(SubtypeConstraint::with_set(kind, set))
    }

    pub fn integer(set: IntegerRangeList) -> SubtypeConstraint<'v> {
        SubtypeConstraint::with_set(SubtypeKind::Integer, ConstraintSet::Integer(Some(set)))
    }

    pub fn float(set: RealRangeList) -> SubtypeConstraint<'v> {
        SubtypeConstraint::with_set(SubtypeKind::Float, ConstraintSet::Float(Some(set)))
    }

    pub fn charstring(tree: CharstringTree) -> SubtypeConstraint<'v> {
        SubtypeConstraint::with_set(SubtypeKind::Charstring, ConstraintSet::Charstring(Some(tree)))
    }

    pub fn ucharstring(tree: UCharstringTree) -> SubtypeConstraint<'v> {
        SubtypeConstraint::with_set(
            SubtypeKind::UCharstring,
            ConstraintSet::UCharstring(Some(tree)),
        )
    }

    /// Create the constraint that allows every value whose length is in
    /// `sizes`. `None` for categories without a length.
    pub fn from_sizes(kind: SubtypeKind, sizes: SizeRangeList) -> Option<SubtypeConstraint<'v>> {
        let set = match kind {
            SubtypeKind::Bitstring => {
                ConstraintSet::Bitstring(Some(StringSet::from_sizes(sizes.clone())))
            }
            SubtypeKind::Hexstring => {
                ConstraintSet::Hexstring(Some(StringSet::from_sizes(sizes.clone())))
            }
            SubtypeKind::Octetstring => {
                ConstraintSet::Octetstring(Some(StringSet::from_sizes(sizes.clone())))
            }
            SubtypeKind::Charstring => ConstraintSet::Charstring(Some(Tree::size(sizes.clone()))),
            SubtypeKind::UCharstring => {
                ConstraintSet::UCharstring(Some(Tree::size(sizes.clone())))
            }
            SubtypeKind::RecordOf | SubtypeKind::SetOf => {
                ConstraintSet::Recof(Some(RecofConstraint::from_sizes(sizes.clone())))
            }
            _ => return None,
        };
        let mut c = SubtypeConstraint::with_set(kind, set);
        c.length = Some(sizes);
        Some(c)
    }

    pub fn kind(&self) -> SubtypeKind {
        self.kind
    }

    pub fn set(&self) -> &ConstraintSet<'v> {
        &self.set
    }

    pub fn set_mut(&mut self) -> &mut ConstraintSet<'v> {
        &mut self.set
    }

    pub fn is_error(&self) -> bool {
        match self.set {
            ConstraintSet::Error => true,
            _ => false,
        }
    }

    /// Whether the constraint actually restricts its category.
    pub fn is_restricted(&self) -> bool {
        self.set.is_present()
    }

    pub fn length(&self) -> Option<&SizeRangeList> {
        self.length.as_ref()
    }

    pub fn set_length(&mut self, length: Option<SizeRangeList>) {
        self.length = length;
    }

    /// Mark the constraint as erroneous.
    pub fn set_to_error(&mut self) {
        self.set = ConstraintSet::Error;
        self.length = None;
    }

    /// Drop the domain set, leaving the category unrestricted.
    pub fn clear_set(&mut self) {
        self.set.clear();
    }

    fn check_kind(&self, other: &SubtypeConstraint<'v>, op: &str) {
        if self.kind != other.kind && !self.is_error() && !other.is_error() {
            panic!(
                "{} of {} and {} subtype constraints",
                op, self.kind, other.kind
            );
        }
    }

    /// Replace `self` with `self ∪ other`.
    pub fn union(&mut self, other: &SubtypeConstraint<'v>) {
        self.check_kind(other, "union");
        let set = std::mem::replace(&mut self.set, ConstraintSet::Error);
        self.set = combine_sets!(set, &other.set, unite);
        self.length = unite(self.length.take(), &other.length);
    }

    /// Replace `self` with `self ∩ other`.
    pub fn intersection(&mut self, other: &SubtypeConstraint<'v>) {
        self.check_kind(other, "intersection");
        let set = std::mem::replace(&mut self.set, ConstraintSet::Error);
        self.set = combine_sets!(set, &other.set, intersect);
        self.length = intersect(self.length.take(), &other.length);
    }

    /// Replace `self` with `self \ other`.
    pub fn except(&mut self, other: &SubtypeConstraint<'v>) {
        self.check_kind(other, "except");
        let set = std::mem::replace(&mut self.set, ConstraintSet::Error);
        self.set = combine_sets!(set, &other.set, subtract);
        self.length = subtract(self.length.take(), &other.length);
    }

    /// Check whether `self ⊆ other`. An absent set on either side is
    /// treated as a subset relation that holds.
    pub fn is_subset(&self, other: &SubtypeConstraint<'v>) -> TriBool {
        self.check_kind(other, "subset check");
        compare_sets!(&self.set, &other.set, subset, TriBool::True)
    }

    pub fn is_equal(&self, other: &SubtypeConstraint<'v>) -> TriBool {
        self.check_kind(other, "equality check");
        compare_sets!(&self.set, &other.set, equal, TriBool::Unknown)
    }

    pub fn is_empty(&self) -> TriBool {
        match self.set {
            ConstraintSet::Error => TriBool::Unknown,
            ref set => set
                .as_algebra()
                .map(|s| s.tri_is_empty())
                .unwrap_or(TriBool::False),
        }
    }

    pub fn is_full(&self) -> TriBool {
        match self.set {
            ConstraintSet::Error => TriBool::Unknown,
            ref set => set
                .as_algebra()
                .map(|s| s.tri_is_full())
                .unwrap_or(TriBool::True),
        }
    }

    /// Check whether values of the two constraints may coincide. Only an
    /// intersection that is known to be empty makes them incompatible.
    pub fn is_compatible(&self, other: Option<&SubtypeConstraint<'v>>) -> bool {
        let other = match other {
            Some(o) => o,
            None => return true,
        };
        if self.is_error() || other.is_error() {
            return true;
        }
        self.check_kind(other, "compatibility check");
        compare_sets!(&self.set, &other.set, compatible, true)
    }

    /// Check whether a single element of a string type, i.e. a string of
    /// length one, may be a value of the constraint.
    pub fn is_compatible_with_elem(&self) -> bool {
        fn with_elem<T: SetAlgebra>(set: &Option<T>, elem: T) -> bool {
            match *set {
                Some(ref s) => !s.set_intersection(&elem).tri_is_empty().is_true(),
                None => true,
            }
        }
        let one = || SizeRangeList::single(1usize);
        match self.set {
            ConstraintSet::Error => true,
            ConstraintSet::Bitstring(ref s) => with_elem(s, StringSet::from_sizes(one())),
            ConstraintSet::Hexstring(ref s) => with_elem(s, StringSet::from_sizes(one())),
            ConstraintSet::Octetstring(ref s) => with_elem(s, StringSet::from_sizes(one())),
            ConstraintSet::Charstring(ref s) => with_elem(s, Tree::size(one())),
            ConstraintSet::UCharstring(ref s) => with_elem(s, Tree::size(one())),
            _ => panic!("{} has no string elements", self.kind),
        }
    }

    /// Check whether the length restrictions of two list constraints
    /// overlap.
    pub fn is_length_compatible(&self, other: &SubtypeConstraint<'v>) -> bool {
        if self.is_error() || other.is_error() {
            return true;
        }
        if !self.kind.is_recof() && !other.kind.is_recof() {
            panic!("length compatibility of non-list types {} and {}", self.kind, other.kind);
        }
        compatible(&self.length, &other.length)
    }

    pub fn is_upper_limit_infinity(&self) -> bool {
        match self.set {
            ConstraintSet::Integer(Some(ref s)) => s.is_upper_limit_infinity(),
            ConstraintSet::Float(Some(ref s)) => s.is_upper_limit_infinity(),
            _ => false,
        }
    }

    pub fn is_lower_limit_infinity(&self) -> bool {
        match self.set {
            ConstraintSet::Integer(Some(ref s)) => s.is_lower_limit_infinity(),
            ConstraintSet::Float(Some(ref s)) => s.is_lower_limit_infinity(),
            _ => false,
        }
    }

    /// Check whether a value is allowed by the constraint.
    ///
    /// Unfoldable and erroneous values are always allowed. Panics if the
    /// value does not belong to the category.
    pub fn is_value_element(&self, v: &Value) -> bool {
        if self.is_error() || v.is_unfoldable() {
            return true;
        }
        let value_kind = match SubtypeKind::of_value(v) {
            Some(k) => k,
            None => return true,
        };
        if value_kind != self.kind {
            panic!("{} value checked against {} subtype", value_kind, self.kind);
        }
        match (&self.set, v) {
            (&ConstraintSet::Integer(Some(ref s)), &Value::Integer(ref i)) => {
                s.is_element(&IntLimit::Number(i.clone()))
            }
            (&ConstraintSet::Float(Some(ref s)), &Value::Float(f)) => s.is_element(f),
            (&ConstraintSet::Boolean(Some(ref s)), &Value::Boolean(b)) => s.is_element(b),
            (&ConstraintSet::Verdict(Some(ref s)), &Value::Verdict(x)) => s.is_element(x),
            (&ConstraintSet::Bitstring(Some(ref s)), &Value::Bitstring(ref x)) => s.is_element(x),
            (&ConstraintSet::Hexstring(Some(ref s)), &Value::Hexstring(ref x)) => s.is_element(x),
            (&ConstraintSet::Octetstring(Some(ref s)), &Value::Octetstring(ref x)) => {
                s.is_element(x)
            }
            (&ConstraintSet::Charstring(Some(ref t)), &Value::Charstring(ref x)) => t.is_element(x),
            (&ConstraintSet::UCharstring(Some(ref t)), &Value::UCharstring(ref x)) => {
                t.is_element(x)
            }
            (&ConstraintSet::Values(Some(ref s)), v) => s.is_element(v),
            (&ConstraintSet::Recof(Some(ref s)), v) => s.is_element(v),
            _ => true,
        }
    }

    /// Intersect the constraint with a set of lengths and check whether the
    /// result is known to be empty. Constraints without lengths never are.
    pub fn is_length_range_empty(&self, sizes: &SizeRangeList) -> bool {
        fn check<T: SetAlgebra>(set: &Option<T>, other: T) -> bool {
            match *set {
                Some(ref s) => s.set_intersection(&other).tri_is_empty().is_true(),
                None => false,
            }
        }
        match self.set {
            ConstraintSet::Bitstring(ref s) => check(s, StringSet::from_sizes(sizes.clone())),
            ConstraintSet::Hexstring(ref s) => check(s, StringSet::from_sizes(sizes.clone())),
            ConstraintSet::Octetstring(ref s) => check(s, StringSet::from_sizes(sizes.clone())),
            ConstraintSet::Charstring(ref s) => check(s, Tree::size(sizes.clone())),
            ConstraintSet::UCharstring(ref s) => check(s, Tree::size(sizes.clone())),
            ConstraintSet::Recof(ref s) => check(s, RecofConstraint::from_sizes(sizes.clone())),
            _ => false,
        }
    }

    /// Determine the value of `MIN` or `MAX` in a constraint derived from
    /// this one. For string and list types this is the smallest or largest
    /// allowed length.
    ///
    /// Reports a diagnostic and falls back to the bound of the whole
    /// category if the limit cannot be determined.
    pub fn get_int_limit(&self, is_upper: bool, emitter: &dyn DiagEmitter) -> IntLimit {
        let which = if is_upper { "MAX" } else { "MIN" };
        let default = if is_upper {
            IntLimit::PlusInfinity
        } else if self.kind == SubtypeKind::Integer {
            IntLimit::MinusInfinity
        } else {
            IntLimit::Number(0.into())
        };
        let size = match self.set {
            ConstraintSet::Integer(None)
            | ConstraintSet::Bitstring(None)
            | ConstraintSet::Hexstring(None)
            | ConstraintSet::Octetstring(None)
            | ConstraintSet::Charstring(None)
            | ConstraintSet::UCharstring(None)
            | ConstraintSet::Recof(None) => return default,
            ConstraintSet::Integer(Some(ref s)) => {
                let limit = if is_upper {
                    s.get_maximal()
                } else {
                    s.get_minimal()
                };
                return match limit {
                    Some(l) => l.clone(),
                    None => {
                        emitter.emit(DiagBuilder2::error(format!(
                            "Cannot determine the value of {}: the parent subtype is an empty \
                             set.",
                            which
                        )));
                        default
                    }
                };
            }
            ConstraintSet::Bitstring(Some(ref s)) => s.get_size_limit(is_upper),
            ConstraintSet::Hexstring(Some(ref s)) => s.get_size_limit(is_upper),
            ConstraintSet::Octetstring(Some(ref s)) => s.get_size_limit(is_upper),
            ConstraintSet::Recof(Some(ref s)) => s.get_size_limit(is_upper),
            ConstraintSet::Charstring(Some(ref t)) => {
                return self.tree_int_limit(t.get_size_limit(is_upper), is_upper, default, emitter)
            }
            ConstraintSet::UCharstring(Some(ref t)) => {
                return self.tree_int_limit(t.get_size_limit(is_upper), is_upper, default, emitter)
            }
            _ => panic!("{} has no integer limits", self.kind),
        };
        match size {
            Some(s) => s.to_int_limit(),
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "Cannot determine the value of {} from parent subtype {}",
                    which, self
                )));
                default
            }
        }
    }

    fn tree_int_limit(
        &self,
        limit: Extremum<SizeLimit>,
        is_upper: bool,
        default: IntLimit,
        emitter: &dyn DiagEmitter,
    ) -> IntLimit {
        let which = if is_upper { "MAX" } else { "MIN" };
        match limit {
            Extremum::Found(s) => s.to_int_limit(),
            Extremum::Missing => {
                emitter.emit(DiagBuilder2::error(format!(
                    "Cannot determine the value of {}: the parent subtype does not define a \
                     {}imal size value",
                    which,
                    if is_upper { "max" } else { "min" }
                )));
                default
            }
            Extremum::Unknown => {
                emitter.emit(DiagBuilder2::warning(format!(
                    "Cannot determine the value of {} from parent subtype {}",
                    which, self
                )));
                default
            }
        }
    }
}

impl<'v> fmt::Display for SubtypeConstraint<'v> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_error() {
            return write!(f, "<error>");
        }
        match self.set.as_algebra() {
            Some(s) => write!(f, "{}", s),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::limits::CharLimit;
    use ttsub_common::errors::{DiagCollector, Severity};

    fn ints(a: i64, b: i64) -> SubtypeConstraint<'static> {
        SubtypeConstraint::integer(IntegerRangeList::range(a, b))
    }

    #[test]
    fn absent_sets() {
        let mut a = SubtypeConstraint::new(SubtypeKind::Integer);
        let b = ints(1, 10);
        assert_eq!(a.is_subset(&b), TriBool::True);
        assert_eq!(b.is_subset(&a), TriBool::True);
        assert_eq!(format!("{}", a), "");

        // Union with the full set stays full.
        a.union(&b);
        assert!(!a.is_restricted());

        // Intersection with the full set copies the other side.
        a.intersection(&b);
        assert_eq!(format!("{}", a), "(1..10)");

        // Except of the full set leaves nothing.
        let mut c = ints(1, 10);
        c.except(&SubtypeConstraint::new(SubtypeKind::Integer));
        assert_eq!(c.is_empty(), TriBool::True);

        // Except from the full set is the complement.
        let mut d = SubtypeConstraint::new(SubtypeKind::Integer);
        d.except(&b);
        assert_eq!(format!("{}", d), "(-infinity..0,11..infinity)");
    }

    #[test]
    fn intersection_and_subset() {
        let mut a = ints(1, 10);
        let parent = ints(5, 20);
        assert_eq!(a.is_subset(&parent), TriBool::False);
        a.intersection(&parent);
        assert_eq!(format!("{}", a), "(5..10)");
        assert_eq!(a.is_subset(&parent), TriBool::True);
        assert!(!a.is_value_element(&Value::Integer(3.into())));
        assert!(a.is_value_element(&Value::Integer(7.into())));
    }

    #[test]
    fn compatibility() {
        let a = ints(1, 10);
        assert!(a.is_compatible(Some(&ints(10, 20))));
        assert!(!a.is_compatible(Some(&ints(11, 20))));
        assert!(a.is_compatible(None));
        let mut e = ints(1, 2);
        e.set_to_error();
        assert!(a.is_compatible(Some(&e)));
        assert_eq!(format!("{}", e), "<error>");
    }

    #[test]
    fn string_elements() {
        let bits = SubtypeConstraint::with_set(
            SubtypeKind::Bitstring,
            ConstraintSet::Bitstring(Some(StringSet::from_sizes(SizeRangeList::range(
                2usize,
                SizeLimit::Infinity,
            )))),
        );
        assert!(!bits.is_compatible_with_elem());
        let chars = SubtypeConstraint::charstring(Tree::alphabet(
            RangeList::range(CharLimit::new(b'a'), CharLimit::new(b'z')),
            false,
        ));
        assert!(chars.is_compatible_with_elem());
        assert!(SubtypeConstraint::new(SubtypeKind::Hexstring).is_compatible_with_elem());
    }

    #[test]
    #[should_panic]
    fn category_mismatch() {
        let mut a = ints(1, 2);
        a.union(&SubtypeConstraint::new(SubtypeKind::Float));
    }

    #[test]
    #[should_panic]
    fn value_category_mismatch() {
        ints(1, 2).is_value_element(&Value::Boolean(true));
    }

    #[test]
    fn int_limits() {
        let diag = DiagCollector::new();
        let a = ints(3, 8);
        assert_eq!(a.get_int_limit(false, &diag), IntLimit::from(3));
        assert_eq!(a.get_int_limit(true, &diag), IntLimit::from(8));
        assert!(diag.is_empty());

        let empty = SubtypeConstraint::integer(IntegerRangeList::empty());
        assert_eq!(empty.get_int_limit(false, &diag), IntLimit::MinusInfinity);
        assert_eq!(
            diag.messages(Severity::Error),
            vec!["Cannot determine the value of MIN: the parent subtype is an empty set."]
        );

        let pattern = SubtypeConstraint::charstring(Tree::pattern(
            crate::pattern::StringPattern::new("a*", false),
        ));
        assert_eq!(pattern.get_int_limit(false, &diag), IntLimit::from(0));
        assert_eq!(diag.num_warnings(), 1);

        let sized = SubtypeConstraint::charstring(Tree::size(SizeRangeList::range(2usize, 4usize)));
        assert_eq!(sized.get_int_limit(true, &diag), IntLimit::from(4));
    }

    #[test]
    fn length_restrictions() {
        let mut a = SubtypeConstraint::new(SubtypeKind::RecordOf);
        a.set_length(Some(SizeRangeList::range(1usize, 3usize)));
        let mut b = SubtypeConstraint::new(SubtypeKind::RecordOf);
        b.set_length(Some(SizeRangeList::range(5usize, 6usize)));
        assert!(!a.is_length_compatible(&b));
        b.set_length(None);
        assert!(a.is_length_compatible(&b));
        a.intersection(&b);
        assert_eq!(a.length(), Some(&SizeRangeList::range(1usize, 3usize)));
        a.union(&b);
        assert_eq!(a.length(), None);
    }
}
