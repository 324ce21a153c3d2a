// Copyright (c) 2016-2020 Fabian Schuiki

//! Constraints on record-of and set-of types.

use crate::limits::SizeLimit;
use crate::rangelist::SizeRangeList;
use crate::tribool::TriBool;
use crate::values::{Value, ValueList};
use std::fmt;

/// A set of record-of or set-of values: all values whose length is in
/// `size`, plus the values in `has`, minus the values in `not`.
///
/// Union and intersection are computed in closed form on these three parts:
///
/// ```text
/// [S1+V1-N1] + [S2+V2-N2] = [(S1+S2)+(V1+V2)-((~S1*N2)+(N1*~S2)+(N1*N2))]
/// [S1+V1-N1] * [S2+V2-N2] = [(S1*S2)+((S1*V2-N1)+(S2*V1-N2)+(V1*V2))-(N1+N2)]
/// ```
#[derive(Debug, Clone)]
pub struct RecofConstraint<'v> {
    size: SizeRangeList,
    has: ValueList<'v>,
    not: ValueList<'v>,
}

impl<'v> RecofConstraint<'v> {
    pub fn empty() -> RecofConstraint<'v> {
        RecofConstraint::from_sizes(SizeRangeList::empty())
    }

    pub fn full() -> RecofConstraint<'v> {
        RecofConstraint::from_sizes(SizeRangeList::full())
    }

    pub fn from_sizes(size: SizeRangeList) -> RecofConstraint<'v> {
        RecofConstraint {
            size,
            has: ValueList::empty(),
            not: ValueList::empty(),
        }
    }

    pub fn from_value(v: &'v Value) -> RecofConstraint<'v> {
        RecofConstraint {
            size: SizeRangeList::empty(),
            has: ValueList::single(v),
            not: ValueList::empty(),
        }
    }

    pub fn size_set(&self) -> &SizeRangeList {
        &self.size
    }

    pub fn has_values(&self) -> &ValueList<'v> {
        &self.has
    }

    pub fn not_values(&self) -> &ValueList<'v> {
        &self.not
    }

    pub fn is_empty(&self) -> TriBool {
        if self.size.is_empty() && self.has.is_empty().is_true() {
            return TriBool::True;
        }
        if self.has.is_empty().is_false() {
            return TriBool::False;
        }
        if self.not.is_empty().is_true() {
            return TriBool::False;
        }
        // The excluded values might cancel out the size constraint.
        TriBool::Unknown
    }

    pub fn is_full(&self) -> TriBool {
        if self.size.is_full() && self.not.is_empty().is_true() {
            return TriBool::True;
        }
        if self.not.is_empty().is_false() {
            return TriBool::False;
        }
        TriBool::Unknown
    }

    /// There is no canonical form, so differing representations may still
    /// denote the same set.
    pub fn is_equal(&self, other: &RecofConstraint<'v>) -> TriBool {
        if self.size.is_equal(&other.size)
            && self.has.is_equal(&other.has).is_true()
            && self.not.is_equal(&other.not).is_true()
        {
            TriBool::True
        } else {
            TriBool::Unknown
        }
    }

    pub fn is_element(&self, v: &Value) -> bool {
        let n = match v.nof_comps() {
            Some(n) => n,
            None => return false,
        };
        if self.size.is_element(&SizeLimit::from(n)) {
            !self.not.is_element(v)
        } else {
            self.has.is_element(v)
        }
    }

    pub fn union(&self, other: &RecofConstraint<'v>) -> RecofConstraint<'v> {
        let mut n2 = other.not.clone();
        n2.remove_by_size(&self.size, true);
        let mut n1 = self.not.clone();
        n1.remove_by_size(&other.size, true);
        RecofConstraint {
            size: self.size.union(&other.size),
            has: self.has.union(&other.has),
            not: n2.union(&n1).union(&self.not.intersection(&other.not)),
        }
        .normalize()
    }

    pub fn intersection(&self, other: &RecofConstraint<'v>) -> RecofConstraint<'v> {
        let mut v1 = self.has.clone();
        v1.remove_by_size(&other.size, false);
        let v1 = v1.except(&other.not);
        let mut v2 = other.has.clone();
        v2.remove_by_size(&self.size, false);
        let v2 = v2.except(&self.not);
        RecofConstraint {
            size: self.size.intersection(&other.size),
            has: self.has.intersection(&other.has).union(&v1).union(&v2),
            not: self.not.union(&other.not),
        }
        .normalize()
    }

    /// Cancel values that are both included and excluded, and drop the
    /// values that the size set already decides.
    fn normalize(mut self) -> RecofConstraint<'v> {
        let both = self.has.intersection(&self.not);
        self.has = self.has.except(&both);
        self.not = self.not.except(&both);
        self.has.remove_by_size(&self.size, true);
        self.not.remove_by_size(&self.size, false);
        self
    }

    pub fn complement(&self) -> RecofConstraint<'v> {
        RecofConstraint {
            size: self.size.complement(),
            has: self.not.clone(),
            not: self.has.clone(),
        }
    }

    pub fn except(&self, other: &RecofConstraint<'v>) -> RecofConstraint<'v> {
        self.intersection(&other.complement())
    }

    pub fn is_subset(&self, other: &RecofConstraint<'v>) -> TriBool {
        self.except(other).is_empty()
    }

    /// The smallest or largest allowed length; `None` if no length is
    /// allowed by the size set.
    pub fn get_size_limit(&self, is_upper: bool) -> Option<SizeLimit> {
        if is_upper {
            self.size.get_maximal().cloned()
        } else {
            self.size.get_minimal().cloned()
        }
    }
}

impl<'v> fmt::Display for RecofConstraint<'v> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let has_values = !self.has.is_empty().is_true();
        if has_values {
            write!(f, "{}", self.has)?;
        }
        if !self.size.is_empty() {
            if has_values {
                write!(f, " union ")?;
            }
            write!(f, "length{}", self.size)?;
        }
        if !self.not.is_empty().is_true() {
            write!(f, " except {}", self.not)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: i32) -> Value {
        Value::RecordOf((0..n).map(|i| Value::Integer(i.into())).collect())
    }

    #[test]
    fn sizes_and_values() {
        let (l0, l1, l3) = (list(0), list(1), list(3));
        let s = RecofConstraint::from_sizes(SizeRangeList::range(2usize, SizeLimit::Infinity));
        let u = s.union(&RecofConstraint::from_value(&l0));
        assert_eq!(format!("{}", u), "({  }) union length(2..infinity)");
        assert!(u.is_element(&l0));
        assert!(!u.is_element(&l1));
        assert!(u.is_element(&l3));
        assert_eq!(u.is_empty(), TriBool::False);

        // Removing the empty list again leaves only the size constraint.
        let e = u.except(&RecofConstraint::from_value(&l0));
        assert_eq!(format!("{}", e), "length(2..infinity)");
        assert_eq!(e.is_empty(), TriBool::False);
    }

    #[test]
    fn excluded_values() {
        let l2 = list(2);
        let s = RecofConstraint::from_sizes(SizeRangeList::range(1usize, 3usize));
        let e = s.except(&RecofConstraint::from_value(&l2));
        assert_eq!(format!("{}", e), "length(1..3) except ({ 0, 1 })");
        assert!(!e.is_element(&l2));
        assert!(e.is_element(&list(3)));
        assert_eq!(e.is_empty(), TriBool::Unknown);
        assert_eq!(e.is_full(), TriBool::False);
        assert_eq!(e.is_subset(&s), TriBool::True);
        assert_eq!(e.get_size_limit(true), Some(SizeLimit::from(3usize)));
        // Values outside the size set are dropped from the excluded list.
        let f = e.intersection(&RecofConstraint::from_sizes(SizeRangeList::single(3usize)));
        assert_eq!(format!("{}", f), "length(3)");
    }

    #[test]
    fn full_and_empty() {
        let full = RecofConstraint::full();
        assert_eq!(full.is_full(), TriBool::True);
        assert_eq!(full.complement().is_empty(), TriBool::True);
        let l1 = list(1);
        let one = RecofConstraint::from_value(&l1);
        assert_eq!(one.union(&one.complement()).is_full(), TriBool::True);
        assert_eq!(one.is_equal(&one.clone()), TriBool::True);
    }
}
