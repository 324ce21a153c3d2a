// Copyright (c) 2016-2020 Fabian Schuiki

//! Boundary values of the restricted domains.
//!
//! A limit is one endpoint of an interval in a [`RangeList`]. Every domain
//! has its own limit type, but they all share the [`Limit`] interface: a
//! total order, a notion of adjacency, and successor/predecessor functions
//! that the range list uses to compute complements.
//!
//! [`RangeList`]: crate::rangelist::RangeList

use crate::ustring::{quadruple_repr, string_repr};
use num::{BigInt, One, Signed, ToPrimitive};
use std::cmp::Ordering;
use std::fmt;

/// The common interface of all limit types.
pub trait Limit: Clone + Ord + fmt::Debug + fmt::Display {
    /// The smallest value of the domain.
    fn minimum() -> Self;

    /// The largest value of the domain.
    fn maximum() -> Self;

    /// Check whether no value lies strictly between `self` and `other`,
    /// where `self < other`.
    fn is_adjacent(&self, other: &Self) -> bool;

    /// The smallest value larger than `self`.
    fn next(&self) -> Self;

    /// The largest value smaller than `self`.
    fn previous(&self) -> Self;

    /// Panics if `self` cannot stand on its own as a single value.
    fn check_single_value(&self) {}

    /// Panics if `self` cannot start an interval.
    fn check_interval_start(&self) {}

    /// Panics if `self` cannot end an interval.
    fn check_interval_end(&self) {}
}

/// An integer, or one of the two infinities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntLimit {
    MinusInfinity,
    Number(BigInt),
    PlusInfinity,
}

impl IntLimit {
    pub fn number(&self) -> Option<&BigInt> {
        match *self {
            IntLimit::Number(ref n) => Some(n),
            _ => None,
        }
    }
}

impl From<BigInt> for IntLimit {
    fn from(v: BigInt) -> IntLimit {
        IntLimit::Number(v)
    }
}

impl From<i32> for IntLimit {
    fn from(v: i32) -> IntLimit {
        IntLimit::Number(v.into())
    }
}

impl From<i64> for IntLimit {
    fn from(v: i64) -> IntLimit {
        IntLimit::Number(v.into())
    }
}

impl Limit for IntLimit {
    fn minimum() -> IntLimit {
        IntLimit::MinusInfinity
    }

    fn maximum() -> IntLimit {
        IntLimit::PlusInfinity
    }

    fn is_adjacent(&self, other: &IntLimit) -> bool {
        match (self, other) {
            (IntLimit::Number(a), IntLimit::Number(b)) => &(a + BigInt::one()) == b,
            _ => false,
        }
    }

    fn next(&self) -> IntLimit {
        match *self {
            IntLimit::Number(ref n) => IntLimit::Number(n + BigInt::one()),
            ref l => panic!("no successor of integer limit {}", l),
        }
    }

    fn previous(&self) -> IntLimit {
        match *self {
            IntLimit::Number(ref n) => IntLimit::Number(n - BigInt::one()),
            ref l => panic!("no predecessor of integer limit {}", l),
        }
    }

    fn check_single_value(&self) {
        if self.number().is_none() {
            panic!("{} cannot be a single integer value", self);
        }
    }

    fn check_interval_start(&self) {
        if *self == IntLimit::PlusInfinity {
            panic!("infinity cannot start an integer interval");
        }
    }

    fn check_interval_end(&self) {
        if *self == IntLimit::MinusInfinity {
            panic!("-infinity cannot end an integer interval");
        }
    }
}

impl fmt::Display for IntLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            IntLimit::MinusInfinity => write!(f, "-infinity"),
            IntLimit::Number(ref n) => write!(f, "{}", n),
            IntLimit::PlusInfinity => write!(f, "infinity"),
        }
    }
}

/// A length, or infinity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SizeLimit {
    Finite(usize),
    Infinity,
}

impl SizeLimit {
    pub fn size(&self) -> Option<usize> {
        match *self {
            SizeLimit::Finite(s) => Some(s),
            SizeLimit::Infinity => None,
        }
    }

    pub fn to_int_limit(&self) -> IntLimit {
        match *self {
            SizeLimit::Finite(s) => IntLimit::Number(s.into()),
            SizeLimit::Infinity => IntLimit::PlusInfinity,
        }
    }

    /// Convert an integer limit to a size limit.
    ///
    /// Returns `None` for `-infinity`, negative numbers, and numbers that
    /// do not fit into a `usize`.
    pub fn from_int_limit(l: &IntLimit) -> Option<SizeLimit> {
        match *l {
            IntLimit::MinusInfinity => None,
            IntLimit::Number(ref n) if n.is_negative() => None,
            IntLimit::Number(ref n) => n.to_usize().map(SizeLimit::Finite),
            IntLimit::PlusInfinity => Some(SizeLimit::Infinity),
        }
    }
}

impl From<usize> for SizeLimit {
    fn from(s: usize) -> SizeLimit {
        SizeLimit::Finite(s)
    }
}

impl Limit for SizeLimit {
    fn minimum() -> SizeLimit {
        SizeLimit::Finite(0)
    }

    fn maximum() -> SizeLimit {
        SizeLimit::Infinity
    }

    fn is_adjacent(&self, other: &SizeLimit) -> bool {
        match (*self, *other) {
            (SizeLimit::Finite(a), SizeLimit::Finite(b)) => a + 1 == b,
            _ => false,
        }
    }

    fn next(&self) -> SizeLimit {
        match *self {
            SizeLimit::Finite(s) => SizeLimit::Finite(s + 1),
            SizeLimit::Infinity => SizeLimit::Infinity,
        }
    }

    fn previous(&self) -> SizeLimit {
        match *self {
            SizeLimit::Finite(0) => panic!("no predecessor of size 0"),
            SizeLimit::Finite(s) => SizeLimit::Finite(s - 1),
            SizeLimit::Infinity => SizeLimit::Infinity,
        }
    }

    fn check_single_value(&self) {
        if *self == SizeLimit::Infinity {
            panic!("infinity cannot be a single size value");
        }
    }

    fn check_interval_start(&self) {
        if *self == SizeLimit::Infinity {
            panic!("infinity cannot start a size interval");
        }
    }
}

impl fmt::Display for SizeLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            SizeLimit::Finite(s) => write!(f, "{}", s),
            SizeLimit::Infinity => write!(f, "infinity"),
        }
    }
}

/// A character of the 7 bit charstring alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CharLimit(u8);

impl CharLimit {
    pub const MAX_CHAR: u8 = 127;

    /// Create a new char limit. Panics if `chr` is outside `0..=127`.
    pub fn new(chr: u8) -> CharLimit {
        if !CharLimit::is_valid_value(chr as u32) {
            panic!("char limit {} out of range", chr);
        }
        CharLimit(chr)
    }

    pub fn is_valid_value(chr: u32) -> bool {
        chr <= CharLimit::MAX_CHAR as u32
    }

    pub fn get_char(&self) -> u8 {
        self.0
    }
}

impl Limit for CharLimit {
    fn minimum() -> CharLimit {
        CharLimit(0)
    }

    fn maximum() -> CharLimit {
        CharLimit(CharLimit::MAX_CHAR)
    }

    fn is_adjacent(&self, other: &CharLimit) -> bool {
        self.0 + 1 == other.0
    }

    fn next(&self) -> CharLimit {
        if self.0 >= CharLimit::MAX_CHAR {
            panic!("no successor of the last char");
        }
        CharLimit(self.0 + 1)
    }

    fn previous(&self) -> CharLimit {
        if self.0 == 0 {
            panic!("no predecessor of the first char");
        }
        CharLimit(self.0 - 1)
    }
}

impl fmt::Display for CharLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = [self.0];
        write!(f, "{}", string_repr(std::str::from_utf8(&s).unwrap_or("?")))
    }
}

/// A code point of the universal charstring alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UCharLimit(u32);

impl UCharLimit {
    pub const MAX_CODE_POINT: u32 = 0x7FFF_FFFF;

    /// Create a new code point limit. Panics if `cp` exceeds `0x7FFFFFFF`.
    pub fn new(cp: u32) -> UCharLimit {
        if !UCharLimit::is_valid_value(cp) {
            panic!("code point {:#x} out of range", cp);
        }
        UCharLimit(cp)
    }

    pub fn is_valid_value(cp: u32) -> bool {
        cp <= UCharLimit::MAX_CODE_POINT
    }

    pub fn code_point(&self) -> u32 {
        self.0
    }
}

impl Limit for UCharLimit {
    fn minimum() -> UCharLimit {
        UCharLimit(0)
    }

    fn maximum() -> UCharLimit {
        UCharLimit(UCharLimit::MAX_CODE_POINT)
    }

    fn is_adjacent(&self, other: &UCharLimit) -> bool {
        self.0 + 1 == other.0
    }

    fn next(&self) -> UCharLimit {
        if self.0 >= UCharLimit::MAX_CODE_POINT {
            panic!("no successor of the last code point");
        }
        UCharLimit(self.0 + 1)
    }

    fn previous(&self) -> UCharLimit {
        if self.0 == 0 {
            panic!("no predecessor of the first code point");
        }
        UCharLimit(self.0 - 1)
    }
}

impl fmt::Display for UCharLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 >= 0x20 && self.0 < 0x7F {
            write!(f, "{}", crate::ustring::code_points_repr(&[self.0]))
        } else {
            write!(f, "{}", quadruple_repr(self.0))
        }
    }
}

/// Where a real limit sits relative to its value.
///
/// `Lower` is infinitesimally below the value, `Upper` infinitesimally
/// above. This allows open interval ends to be represented without losing
/// the total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RealKind {
    Lower,
    Exact,
    Upper,
}

/// A floating point boundary value.
#[derive(Debug, Clone, Copy)]
pub struct RealLimit {
    value: f64,
    kind: RealKind,
}

impl RealLimit {
    /// Create a new real limit.
    ///
    /// Panics for NaN, for `-infinity` below its value, and for `infinity`
    /// above its value.
    pub fn new(value: f64, kind: RealKind) -> RealLimit {
        if value.is_nan() {
            panic!("real limit cannot be NaN");
        }
        if value == std::f64::NEG_INFINITY && kind == RealKind::Lower {
            panic!("real limit cannot be below -infinity");
        }
        if value == std::f64::INFINITY && kind == RealKind::Upper {
            panic!("real limit cannot be above infinity");
        }
        RealLimit { value, kind }
    }

    pub fn exact(value: f64) -> RealLimit {
        RealLimit::new(value, RealKind::Exact)
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn kind(&self) -> RealKind {
        self.kind
    }
}

impl PartialEq for RealLimit {
    fn eq(&self, other: &RealLimit) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RealLimit {}

impl PartialOrd for RealLimit {
    fn partial_cmp(&self, other: &RealLimit) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RealLimit {
    fn cmp(&self, other: &RealLimit) -> Ordering {
        match self.value.partial_cmp(&other.value) {
            Some(Ordering::Equal) => self.kind.cmp(&other.kind),
            Some(o) => o,
            None => unreachable!("NaN in real limit"),
        }
    }
}

impl Limit for RealLimit {
    fn minimum() -> RealLimit {
        RealLimit::exact(std::f64::NEG_INFINITY)
    }

    fn maximum() -> RealLimit {
        RealLimit::exact(std::f64::INFINITY)
    }

    fn is_adjacent(&self, other: &RealLimit) -> bool {
        self.value == other.value
            && match (self.kind, other.kind) {
                (RealKind::Lower, RealKind::Exact) | (RealKind::Exact, RealKind::Upper) => true,
                _ => false,
            }
    }

    fn next(&self) -> RealLimit {
        match self.kind {
            RealKind::Lower => RealLimit::new(self.value, RealKind::Exact),
            RealKind::Exact | RealKind::Upper => RealLimit::new(self.value, RealKind::Upper),
        }
    }

    fn previous(&self) -> RealLimit {
        match self.kind {
            RealKind::Lower | RealKind::Exact => RealLimit::new(self.value, RealKind::Lower),
            RealKind::Upper => RealLimit::new(self.value, RealKind::Exact),
        }
    }

    fn check_single_value(&self) {
        if self.kind != RealKind::Exact {
            panic!("{} cannot be a single real value", self);
        }
    }

    fn check_interval_start(&self) {
        if self.kind == RealKind::Lower {
            panic!("{} cannot start a real interval", self);
        }
    }

    fn check_interval_end(&self) {
        if self.kind == RealKind::Upper {
            panic!("{} cannot end a real interval", self);
        }
    }
}

/// Format a float the way it appears in diagnostics, e.g. `1.5e1`.
pub fn real_repr(r: f64) -> String {
    if r.is_nan() {
        return "NaN".into();
    }
    if r.is_infinite() {
        return if r > 0.0 { "INF".into() } else { "-INF".into() };
    }
    if r == 0.0 {
        return if r.is_sign_negative() {
            "-0.0e0".into()
        } else {
            "0.0e0".into()
        };
    }
    let s = format!("{:e}", r);
    match s.find('e') {
        Some(pos) if !s[..pos].contains('.') => format!("{}.0{}", &s[..pos], &s[pos..]),
        _ => s,
    }
}

impl fmt::Display for RealLimit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.kind != RealKind::Exact {
            write!(f, "!")?;
        }
        write!(f, "{}", real_repr(self.value))
    }
}
