// Copyright (c) 2016-2020 Fabian Schuiki

//! Builders for the constraints of ASN.1 types.
//!
//! ASN.1 subtype constraints are parsed elsewhere and handed to these
//! functions piece by piece: single values, value ranges, contained
//! subtypes, size constraints, and permitted alphabets. Each builder checks
//! its inputs, reports problems to the emitter, and returns `None` if no
//! constraint could be built.

use crate::bitstring::StringSet;
use crate::constraint::{ConstraintSet, SubtypeConstraint, SubtypeKind};
use crate::limits::{CharLimit, IntLimit, Limit, RealLimit, SizeLimit, UCharLimit};
use crate::rangelist::{CharRangeList, IntegerRangeList, RangeList, SizeRangeList, UCharRangeList};
use crate::real::RealRangeList;
use crate::recof::RecofConstraint;
use crate::strvalues::TreeString;
use crate::tree::{CharstringTree, Extremum, Tree, UCharstringTree};
use crate::ustring::{code_points_repr, string_repr, UString};
use crate::values::Value;
use once_cell::sync::Lazy;
use ttsub_common::errors::{DiagBuilder2, DiagEmitter};

/// The restricted character string types of ASN.1 that map onto a
/// charstring or universal charstring with an implicit alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AsnStringType {
    Numeric,
    Printable,
    Bmp,
    Teletex,
    Videotex,
}

static NUMERIC_STRING: Lazy<CharstringTree> = Lazy::new(|| {
    let digits = CharRangeList::range(CharLimit::new(b'0'), CharLimit::new(b'9'));
    let space = CharRangeList::single(CharLimit::new(b' '));
    Tree::alphabet(digits.union(&space), false)
});

static PRINTABLE_STRING: Lazy<CharstringTree> = Lazy::new(|| {
    let set = [(b'A', b'Z'), (b'a', b'z'), (b'0', b'9')]
        .iter()
        .map(|&(a, b)| CharRangeList::range(CharLimit::new(a), CharLimit::new(b)))
        .chain(
            b" '()+,-./:=?"
                .iter()
                .map(|&c| CharRangeList::single(CharLimit::new(c))),
        )
        .fold(CharRangeList::empty(), |acc, r| acc.union(&r));
    Tree::alphabet(set, false)
});

static BMP_STRING: Lazy<UCharstringTree> = Lazy::new(|| {
    Tree::alphabet(
        UCharRangeList::range(UCharLimit::new(0), UCharLimit::new(0xFFFF)),
        false,
    )
});

/// The constraint implied by a restricted string type. `None` if the type
/// does not restrict its root type.
pub fn asn_type_constraint(ty: AsnStringType) -> Option<SubtypeConstraint<'static>> {
    match ty {
        AsnStringType::Numeric => Some(SubtypeConstraint::charstring(NUMERIC_STRING.clone())),
        AsnStringType::Printable => Some(SubtypeConstraint::charstring(PRINTABLE_STRING.clone())),
        AsnStringType::Bmp => Some(SubtypeConstraint::ucharstring(BMP_STRING.clone())),
        AsnStringType::Teletex | AsnStringType::Videotex => None,
    }
}

/// Create the constraint that allows a single value.
///
/// Panics if the value does not belong to the category.
pub fn from_asn_value<'v>(kind: SubtypeKind, v: &'v Value) -> Option<SubtypeConstraint<'v>> {
    let value_kind = SubtypeKind::of_value(v)?;
    if value_kind != kind {
        panic!("{} value in a {} constraint", value_kind, kind);
    }
    match *v {
        Value::Verdict(_) | Value::Function(_) | Value::Altstep(_) | Value::Testcase(_) => None,
        _ => SubtypeConstraint::from_value(v),
    }
}

/// Create a permitted alphabet from the characters of a string, e.g. the
/// `"abc"` in `FROM ("abc")`.
pub fn from_asn_charvalues<'v>(
    kind: SubtypeKind,
    v: &Value,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    match (kind, v) {
        (SubtypeKind::Charstring, &Value::Charstring(ref s)) => {
            let mut set = CharRangeList::empty();
            for (i, c) in s.chars().enumerate() {
                if !CharLimit::is_valid_value(c as u32) {
                    emitter.emit(DiagBuilder2::error(format!(
                        "Invalid char in string {} at index {}",
                        string_repr(s),
                        i
                    )));
                    return None;
                }
                set = set.union(&CharRangeList::single(CharLimit::new(c as u8)));
            }
            Some(SubtypeConstraint::charstring(Tree::alphabet(set, true)))
        }
        (SubtypeKind::UCharstring, _) => {
            let cps: Vec<u32> = match *v {
                Value::Charstring(ref s) => s.chars().map(|c| c as u32).collect(),
                Value::UCharstring(ref s) => s.code_points().to_vec(),
                _ => return None,
            };
            let mut set = UCharRangeList::empty();
            for (i, &cp) in cps.iter().enumerate() {
                if !UCharLimit::is_valid_value(cp) {
                    emitter.emit(DiagBuilder2::error(format!(
                        "Invalid universal char in string {} at index {}",
                        code_points_repr(&cps),
                        i
                    )));
                    return None;
                }
                set = set.union(&UCharRangeList::single(UCharLimit::new(cp)));
            }
            Some(SubtypeConstraint::ucharstring(Tree::alphabet(set, true)))
        }
        _ => None,
    }
}

/// The boundaries of a value range constraint, e.g. `(MIN <..10)`. An
/// absent boundary stands for `MIN` or `MAX`.
#[derive(Debug, Clone, Copy)]
pub struct AsnRange<'a> {
    pub min: Option<&'a Value>,
    pub min_exclusive: bool,
    pub max: Option<&'a Value>,
    pub max_exclusive: bool,
}

impl<'a> AsnRange<'a> {
    /// An inclusive range.
    pub fn inclusive(min: Option<&'a Value>, max: Option<&'a Value>) -> AsnRange<'a> {
        AsnRange {
            min,
            min_exclusive: false,
            max,
            max_exclusive: false,
        }
    }
}

/// Create the constraint of a value range.
///
/// `MIN` and `MAX` are resolved against the constraint of the parent type,
/// or the bounds of the category if there is none.
pub fn from_asn_range<'v>(
    kind: SubtypeKind,
    range: AsnRange,
    parent: Option<&SubtypeConstraint>,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    match kind {
        SubtypeKind::Integer => integer_range(range, parent, emitter),
        SubtypeKind::Float => float_range(range, parent, emitter),
        SubtypeKind::Charstring => char_range::<CharLimit>(range, parent, emitter)
            .map(|set| SubtypeConstraint::charstring(Tree::alphabet(set, true))),
        SubtypeKind::UCharstring => char_range::<UCharLimit>(range, parent, emitter)
            .map(|set| SubtypeConstraint::ucharstring(Tree::alphabet(set, true))),
        _ => None,
    }
}

fn integer_range<'v>(
    range: AsnRange,
    parent: Option<&SubtypeConstraint>,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    let bound = |v: Option<&Value>, is_upper: bool| match v {
        Some(&Value::Integer(ref i)) => Some(IntLimit::Number(i.clone())),
        Some(_) => None,
        None => Some(match parent {
            Some(p) => p.get_int_limit(is_upper, emitter),
            None if is_upper => IntLimit::PlusInfinity,
            None => IntLimit::MinusInfinity,
        }),
    };
    let mut min = bound(range.min, false)?;
    let mut max = bound(range.max, true)?;
    if range.min_exclusive {
        if min == IntLimit::MinusInfinity {
            emitter.emit(DiagBuilder2::error(
                "invalid lower boundary, -infinity cannot be excluded from an INTEGER value \
                 range constraint",
            ));
            return None;
        }
        if min == IntLimit::PlusInfinity {
            emitter.emit(DiagBuilder2::error("!infinity is not a valid lower boundary"));
            return None;
        }
        min = min.next();
    }
    if range.max_exclusive {
        if max == IntLimit::PlusInfinity {
            emitter.emit(DiagBuilder2::error(
                "invalid upper boundary, infinity cannot be excluded from an INTEGER value \
                 range constraint",
            ));
            return None;
        }
        if max == IntLimit::MinusInfinity {
            emitter.emit(DiagBuilder2::error("!-infinity is not a valid upper boundary"));
            return None;
        }
        max = max.previous();
    }
    if max < min {
        emitter.emit(DiagBuilder2::error(
            "lower boundary is bigger than upper boundary in INTEGER value range constraint",
        ));
        return None;
    }
    Some(SubtypeConstraint::integer(IntegerRangeList::range(min, max)))
}

fn float_range<'v>(
    range: AsnRange,
    parent: Option<&SubtypeConstraint>,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    let bound = |v: Option<&Value>, is_upper: bool| -> Option<Option<RealLimit>> {
        let which = if is_upper { "upper" } else { "lower" };
        match v {
            Some(&Value::Float(f)) if f.is_nan() => {
                emitter.emit(DiagBuilder2::error(format!(
                    "{} boundary cannot be NOT-A-NUMBER in REAL value range constraint",
                    which
                )));
                Some(None)
            }
            Some(&Value::Float(f)) => Some(Some(RealLimit::exact(f))),
            Some(_) => None,
            None => {
                let fallback = if is_upper {
                    RealLimit::maximum()
                } else {
                    RealLimit::minimum()
                };
                let parent_set = match parent.map(|p| p.set()) {
                    Some(&ConstraintSet::Float(Some(ref s))) => s,
                    _ => return Some(Some(fallback)),
                };
                if parent_set.is_range_empty() {
                    emitter.emit(DiagBuilder2::error(format!(
                        "Cannot determine the value of {}: the parent subtype has no range",
                        if is_upper { "MAX" } else { "MIN" }
                    )));
                    return Some(Some(fallback));
                }
                let limit = if is_upper {
                    parent_set.get_maximal()
                } else {
                    parent_set.get_minimal()
                };
                Some(Some(limit.cloned().unwrap_or(fallback)))
            }
        }
    };
    let min = bound(range.min, false)?;
    let max = bound(range.max, true)?;
    let (mut min, mut max) = match (min, max) {
        (Some(min), Some(max)) => (min, max),
        _ => return None,
    };
    if range.min_exclusive {
        if min == RealLimit::maximum() {
            emitter.emit(DiagBuilder2::error("!infinity is not a valid lower boundary"));
            return None;
        }
        min = min.next();
    }
    if range.max_exclusive {
        if max == RealLimit::minimum() {
            emitter.emit(DiagBuilder2::error("!-infinity is not a valid upper boundary"));
            return None;
        }
        max = max.previous();
    }
    if max < min {
        emitter.emit(DiagBuilder2::error(
            "lower boundary is bigger than upper boundary in REAL value range constraint",
        ));
        return None;
    }
    Some(SubtypeConstraint::float(RealRangeList::range(min, max)))
}

/// The character limit of a string category.
pub(crate) trait RangeChar: Limit {
    type Str: TreeString<Char = Self>;

    /// How the character is called in diagnostics.
    const NAME: &'static str;

    /// How the string type is called in diagnostics.
    const TYPE_NAME: &'static str;

    /// The code point of a single character string. `None` if the value is
    /// not a string of the category, `Some(None)` if it is not exactly one
    /// character long.
    fn single_char(v: &Value) -> Option<Option<u32>>;

    fn from_code_point(cp: u32) -> Option<Self>;

    /// The tree of the category, if `c` is of it.
    fn tree<'a>(c: &'a SubtypeConstraint) -> Option<&'a Option<Tree<Self::Str>>>;

    fn tree_mut<'a, 'v>(
        c: &'a mut SubtypeConstraint<'v>,
    ) -> Option<&'a mut Option<Tree<Self::Str>>>;

    /// Wrap a tree into a constraint of the category.
    fn wrap<'v>(tree: Tree<Self::Str>) -> SubtypeConstraint<'v>;
}

fn single_native_char(s: &str) -> Option<u32> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c as u32),
        _ => None,
    }
}

impl RangeChar for CharLimit {
    type Str = String;
    const NAME: &'static str = "char";
    const TYPE_NAME: &'static str = "charstring";

    fn single_char(v: &Value) -> Option<Option<u32>> {
        match *v {
            Value::Charstring(ref s) => Some(single_native_char(s)),
            _ => None,
        }
    }

    fn from_code_point(cp: u32) -> Option<CharLimit> {
        if CharLimit::is_valid_value(cp) {
            Some(CharLimit::new(cp as u8))
        } else {
            None
        }
    }

    fn tree<'a>(c: &'a SubtypeConstraint) -> Option<&'a Option<CharstringTree>> {
        match *c.set() {
            ConstraintSet::Charstring(ref t) => Some(t),
            _ => None,
        }
    }

    fn tree_mut<'a, 'v>(
        c: &'a mut SubtypeConstraint<'v>,
    ) -> Option<&'a mut Option<CharstringTree>> {
        match *c.set_mut() {
            ConstraintSet::Charstring(ref mut t) => Some(t),
            _ => None,
        }
    }

    fn wrap<'v>(tree: CharstringTree) -> SubtypeConstraint<'v> {
        SubtypeConstraint::charstring(tree)
    }
}

impl RangeChar for UCharLimit {
    type Str = UString;
    const NAME: &'static str = "universal char";
    const TYPE_NAME: &'static str = "universal charstring";

    fn single_char(v: &Value) -> Option<Option<u32>> {
        match *v {
            Value::Charstring(ref s) => Some(single_native_char(s)),
            Value::UCharstring(ref s) if s.len() == 1 => Some(Some(s.code_points()[0])),
            Value::UCharstring(_) => Some(None),
            _ => None,
        }
    }

    fn from_code_point(cp: u32) -> Option<UCharLimit> {
        if UCharLimit::is_valid_value(cp) {
            Some(UCharLimit::new(cp))
        } else {
            None
        }
    }

    fn tree<'a>(c: &'a SubtypeConstraint) -> Option<&'a Option<UCharstringTree>> {
        match *c.set() {
            ConstraintSet::UCharstring(ref t) => Some(t),
            _ => None,
        }
    }

    fn tree_mut<'a, 'v>(
        c: &'a mut SubtypeConstraint<'v>,
    ) -> Option<&'a mut Option<UCharstringTree>> {
        match *c.set_mut() {
            ConstraintSet::UCharstring(ref mut t) => Some(t),
            _ => None,
        }
    }

    fn wrap<'v>(tree: UCharstringTree) -> SubtypeConstraint<'v> {
        SubtypeConstraint::ucharstring(tree)
    }
}

fn char_range<C: RangeChar>(
    range: AsnRange,
    parent: Option<&SubtypeConstraint>,
    emitter: &dyn DiagEmitter,
) -> Option<RangeList<C>> {
    let bound = |v: Option<&Value>, is_upper: bool| -> Option<Option<C>> {
        let which = if is_upper { "upper" } else { "lower" };
        let cp = match v {
            Some(v) => C::single_char(v)?,
            None => {
                let fallback = if is_upper { C::maximum() } else { C::minimum() };
                let tree = match parent.and_then(C::tree) {
                    Some(&Some(ref t)) => t,
                    _ => return Some(Some(fallback)),
                };
                let (which, extreme) = if is_upper {
                    ("MAX", "maximal")
                } else {
                    ("MIN", "minimal")
                };
                return Some(Some(match tree.get_alphabet_limit(is_upper) {
                    Extremum::Found(c) => c,
                    Extremum::Missing => {
                        emitter.emit(DiagBuilder2::error(format!(
                            "Cannot determine the value of {}: the parent subtype does not \
                             define a {} char value",
                            which, extreme
                        )));
                        fallback
                    }
                    Extremum::Unknown => {
                        emitter.emit(DiagBuilder2::warning(format!(
                            "Cannot determine the value of {}, using the {} char value of the \
                             type",
                            which, extreme
                        )));
                        fallback
                    }
                }));
            }
        };
        let cp = match cp {
            Some(cp) => cp,
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "{} boundary of string value range constraint must be a single element \
                     string",
                    which
                )));
                return Some(None);
            }
        };
        match C::from_code_point(cp) {
            Some(c) => Some(Some(c)),
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "{} boundary of string value range constraint is an invalid {}",
                    which,
                    C::NAME
                )));
                Some(None)
            }
        }
    };
    let min = bound(range.min, false)?;
    let max = bound(range.max, true)?;
    let (mut min, mut max) = match (min, max) {
        (Some(min), Some(max)) => (min, max),
        _ => return None,
    };
    if range.min_exclusive {
        if min == C::maximum() {
            emitter.emit(DiagBuilder2::error(
                "exclusive lower boundary is not a legal character",
            ));
            return None;
        }
        min = min.next();
    }
    if range.max_exclusive {
        if max == C::minimum() {
            emitter.emit(DiagBuilder2::error(
                "exclusive upper boundary is not a legal character",
            ));
            return None;
        }
        max = max.previous();
    }
    if max < min {
        emitter.emit(DiagBuilder2::error(
            "lower boundary is bigger than upper boundary in string value range constraint",
        ));
        return None;
    }
    Some(RangeList::range(min, max))
}

/// Use the constraint of a contained subtype, e.g. the `T` in `(T)` or
/// `FROM (T)`. Inside a permitted alphabet the constraint must consist of
/// single characters only.
pub fn from_contained_subtype<'v>(
    contained: Option<&SubtypeConstraint<'v>>,
    char_context: bool,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    let contained = contained?;
    if contained.is_error() {
        return None;
    }
    if !char_context {
        return Some(contained.clone());
    }
    fn in_char_context<S: TreeString>(
        tree: &Option<Tree<S>>,
        emitter: &dyn DiagEmitter,
    ) -> Option<Tree<S>> {
        match *tree {
            None => Some(Tree::All),
            Some(ref t) if t.is_valid_range() => {
                let mut t = t.clone();
                t.set_char_context(true);
                Some(t)
            }
            Some(_) => {
                emitter.emit(DiagBuilder2::error(
                    "The type of the contained subtype constraint cannot be used in a \
                     permitted alphabet constraint",
                ));
                None
            }
        }
    }
    match *contained.set() {
        ConstraintSet::Charstring(ref t) => {
            in_char_context(t, emitter).map(SubtypeConstraint::charstring)
        }
        ConstraintSet::UCharstring(ref t) => {
            in_char_context(t, emitter).map(SubtypeConstraint::ucharstring)
        }
        _ => None,
    }
}

/// Create the constraint of a size constraint, e.g. `SIZE (1..10)`.
///
/// `sizes` is the constraint built from the integer constraint inside the
/// `SIZE`. `target` is the category of the constrained type, or `None` if
/// that type is erroneous. Inside a permitted alphabet only `SIZE(1)` is
/// allowed, which then allows every character.
pub fn asn_size_constraint<'v>(
    sizes: Option<&SubtypeConstraint<'v>>,
    char_context: bool,
    target: Option<SubtypeKind>,
    type_name: &str,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    let sizes = sizes?;
    if sizes.kind() != SubtypeKind::Integer {
        panic!("size constraint built from a {} constraint", sizes.kind());
    }
    let mut size_set = SizeRangeList::full();
    match *sizes.set() {
        ConstraintSet::Error => return None,
        ConstraintSet::Integer(Some(ref ints)) => {
            let valid = IntegerRangeList::range(0, IntLimit::PlusInfinity);
            if !ints.is_subset(&valid) {
                emitter.emit(DiagBuilder2::error(format!(
                    "Range {} is not a valid range for a size constraint",
                    ints
                )));
            } else {
                match ints.to_size_range() {
                    Some(s) => size_set = s,
                    None => emitter.emit(DiagBuilder2::error(format!(
                        "One or more INTEGER values of range {} are too large to be used in a \
                         size constraint",
                        ints
                    ))),
                }
            }
        }
        _ => (),
    }
    let kind = target?;
    let mut result = match kind {
        SubtypeKind::Bitstring => SubtypeConstraint::with_set(
            kind,
            ConstraintSet::Bitstring(Some(StringSet::from_sizes(size_set.clone()))),
        ),
        SubtypeKind::Hexstring => SubtypeConstraint::with_set(
            kind,
            ConstraintSet::Hexstring(Some(StringSet::from_sizes(size_set.clone()))),
        ),
        SubtypeKind::Octetstring => SubtypeConstraint::with_set(
            kind,
            ConstraintSet::Octetstring(Some(StringSet::from_sizes(size_set.clone()))),
        ),
        SubtypeKind::Charstring | SubtypeKind::UCharstring if char_context => {
            if !size_set.is_equal(&SizeRangeList::single(SizeLimit::Finite(1))) {
                emitter.emit(DiagBuilder2::error(
                    "Only SIZE(1) constraint can be used inside a permitted alphabet constraint",
                ));
                return None;
            }
            SubtypeConstraint::new(kind)
        }
        SubtypeKind::Charstring => SubtypeConstraint::charstring(Tree::size(size_set.clone())),
        SubtypeKind::UCharstring => SubtypeConstraint::ucharstring(Tree::size(size_set.clone())),
        SubtypeKind::RecordOf | SubtypeKind::SetOf => SubtypeConstraint::with_set(
            kind,
            ConstraintSet::Recof(Some(RecofConstraint::from_sizes(size_set.clone()))),
        ),
        _ => {
            emitter.emit(DiagBuilder2::error(format!(
                "Size constraint is not allowed for type `{}'",
                type_name
            )));
            return None;
        }
    };
    if !char_context {
        result.set_length(Some(size_set));
    }
    Some(result)
}

/// Create the constraint of a permitted alphabet, e.g. `FROM ("a".."z")`.
/// The constraint built inside the `FROM` is moved out of char context.
pub fn permitted_alphabet_constraint<'v>(
    alphabet: Option<&SubtypeConstraint<'v>>,
    char_context: bool,
    target: Option<SubtypeKind>,
    type_name: &str,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    if char_context {
        emitter.emit(DiagBuilder2::error(
            "Permitted alphabet constraint not allowed inside a permitted alphabet constraint",
        ));
        return None;
    }
    match target? {
        SubtypeKind::Charstring | SubtypeKind::UCharstring => {
            let mut result = alphabet?.clone();
            match *result.set_mut() {
                ConstraintSet::Charstring(Some(ref mut t)) => t.set_char_context(false),
                ConstraintSet::UCharstring(Some(ref mut t)) => t.set_char_context(false),
                _ => (),
            }
            Some(result)
        }
        _ => {
            emitter.emit(DiagBuilder2::error(format!(
                "Permitted alphabet constraint is not allowed for type `{}'",
                type_name
            )));
            None
        }
    }
}
