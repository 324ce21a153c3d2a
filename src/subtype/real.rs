// Copyright (c) 2016-2020 Fabian Schuiki

//! Sets of floating point values.

use crate::limits::{Limit, RealLimit};
use crate::rangelist::RangeList;
use std::fmt;

/// A set of floats: an interval list plus a flag for NaN.
///
/// NaN is unordered and therefore cannot be a limit. It is tracked on the
/// side and combined independently of the intervals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RealRangeList {
    has_nan: bool,
    rl: RangeList<RealLimit>,
}

impl RealRangeList {
    /// The empty set.
    pub fn empty() -> RealRangeList {
        RealRangeList {
            has_nan: false,
            rl: RangeList::empty(),
        }
    }

    /// The set of all floats, including NaN.
    pub fn full() -> RealRangeList {
        RealRangeList {
            has_nan: true,
            rl: RangeList::full(),
        }
    }

    /// The set that contains only NaN.
    pub fn nan() -> RealRangeList {
        RealRangeList {
            has_nan: true,
            rl: RangeList::empty(),
        }
    }

    pub fn single(l: RealLimit) -> RealRangeList {
        RealRangeList {
            has_nan: false,
            rl: RangeList::single(l),
        }
    }

    pub fn range(begin: RealLimit, end: RealLimit) -> RealRangeList {
        RealRangeList {
            has_nan: false,
            rl: RangeList::range(begin, end),
        }
    }

    /// Create the set for a single float value, which may be NaN.
    pub fn from_value(v: f64) -> RealRangeList {
        if v.is_nan() {
            RealRangeList::nan()
        } else {
            RealRangeList::single(RealLimit::exact(v))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rl.is_empty() && !self.has_nan
    }

    pub fn is_full(&self) -> bool {
        self.rl.is_full() && self.has_nan
    }

    pub fn is_equal(&self, other: &RealRangeList) -> bool {
        self == other
    }

    pub fn is_element(&self, r: f64) -> bool {
        if r.is_nan() {
            self.has_nan
        } else {
            self.rl.is_element(&RealLimit::exact(r))
        }
    }

    pub fn union(&self, other: &RealRangeList) -> RealRangeList {
        RealRangeList {
            has_nan: self.has_nan || other.has_nan,
            rl: self.rl.union(&other.rl),
        }
    }

    pub fn intersection(&self, other: &RealRangeList) -> RealRangeList {
        RealRangeList {
            has_nan: self.has_nan && other.has_nan,
            rl: self.rl.intersection(&other.rl),
        }
    }

    pub fn complement(&self) -> RealRangeList {
        RealRangeList {
            has_nan: !self.has_nan,
            rl: self.rl.complement(),
        }
    }

    pub fn except(&self, other: &RealRangeList) -> RealRangeList {
        self.intersection(&other.complement())
    }

    pub fn is_subset(&self, other: &RealRangeList) -> bool {
        self.except(other).is_empty()
    }

    /// Check whether the set contains no float apart from NaN.
    pub fn is_range_empty(&self) -> bool {
        self.rl.is_empty()
    }

    pub fn has_nan(&self) -> bool {
        self.has_nan
    }

    pub fn ranges(&self) -> &RangeList<RealLimit> {
        &self.rl
    }

    pub fn get_minimal(&self) -> Option<&RealLimit> {
        self.rl.get_minimal()
    }

    pub fn get_maximal(&self) -> Option<&RealLimit> {
        self.rl.get_maximal()
    }

    pub fn is_upper_limit_infinity(&self) -> bool {
        self.rl.is_upper_limit_infinity()
    }

    pub fn is_lower_limit_infinity(&self) -> bool {
        self.rl.is_lower_limit_infinity()
    }
}

impl fmt::Display for RealRangeList {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.rl.to_string_bare())?;
        if self.has_nan {
            if !self.rl.is_empty() {
                write!(f, ",")?;
            }
            write!(f, "NaN")?;
        }
        write!(f, ")")
    }
}

/// Shorthand for the limits right above and below a value.
pub fn open_above(v: f64) -> RealLimit {
    RealLimit::exact(v).next()
}

pub fn open_below(v: f64) -> RealLimit {
    RealLimit::exact(v).previous()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::{INFINITY, NAN, NEG_INFINITY};

    #[test]
    fn nan_is_tracked_separately() {
        let a = RealRangeList::range(RealLimit::exact(0.0), RealLimit::exact(1.0));
        let n = RealRangeList::nan();
        let u = a.union(&n);
        assert!(u.is_element(NAN));
        assert!(u.is_element(0.5));
        assert!(!a.is_element(NAN));
        assert!(a.intersection(&n).is_empty());
        assert!(!u.complement().is_element(NAN));
        assert_eq!(format!("{}", u), "(0.0e0..1.0e0,NaN)");
        assert_eq!(format!("{}", n), "(NaN)");
        assert!(n.is_range_empty());
    }

    #[test]
    fn open_bounds() {
        // (0.0 .. 1.0) exclusive on both ends
        let a = RealRangeList::range(open_above(0.0), open_below(1.0));
        assert!(!a.is_element(0.0));
        assert!(a.is_element(0.0001));
        assert!(!a.is_element(1.0));
        let c = a.complement();
        assert!(c.is_element(0.0));
        assert!(c.is_element(1.0));
        assert!(c.is_element(NAN));
        assert!(a.union(&c).is_full());
        assert_eq!(format!("{}", a), "(!0.0e0..!1.0e0)");
    }

    #[test]
    fn infinities() {
        let all = RealRangeList::range(RealLimit::exact(NEG_INFINITY), RealLimit::exact(INFINITY));
        assert!(!all.is_full());
        assert!(all.union(&RealRangeList::nan()).is_full());
        assert!(all.is_upper_limit_infinity());
        assert!(all.is_lower_limit_infinity());
        let pos = RealRangeList::range(open_above(0.0), RealLimit::exact(INFINITY));
        assert!(pos.is_subset(&all));
        assert!(!all.is_subset(&pos));
        assert!(pos.complement().is_element(NEG_INFINITY));
    }
}
