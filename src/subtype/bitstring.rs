// Copyright (c) 2016-2020 Fabian Schuiki

//! Sets of bit, hex, and octet strings.
//!
//! These strings are restricted by length and by explicit value lists. A
//! set is represented as `(size ∪ has) − not`, where `size` is a set of
//! lengths, `has` lists strings whose length is outside of `size`, and `not`
//! lists strings whose length is inside of `size` but which are excluded.
//! Since the alphabets are finite, a value list that covers all strings of
//! one length can be folded into the size set, which keeps the
//! representation canonical.

use crate::limits::SizeLimit;
use crate::rangelist::SizeRangeList;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::marker::PhantomData;

/// The properties of one of the string domains.
pub trait StringKind: fmt::Debug + Clone + PartialEq + Eq {
    /// The number of bits needed to store one element.
    const BITCNT: u32;
    /// The number of characters that encode one element.
    const ELEMSIZE: usize;
    /// The suffix of a literal, e.g. `B` in `'0101'B`.
    const SUFFIX: char;

    fn is_valid_char(c: u8) -> bool;

    /// Spell out the `index`-th string of the given length.
    fn nth_string(index: u64, len: usize) -> String;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bit;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hex;

/// Octet strings are stored as hex digits, two per octet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Octet;

impl StringKind for Bit {
    const BITCNT: u32 = 1;
    const ELEMSIZE: usize = 1;
    const SUFFIX: char = 'B';

    fn is_valid_char(c: u8) -> bool {
        c == b'0' || c == b'1'
    }

    fn nth_string(index: u64, len: usize) -> String {
        if len == 0 {
            return String::new();
        }
        format!("{:0width$b}", index, width = len)
    }
}

impl StringKind for Hex {
    const BITCNT: u32 = 4;
    const ELEMSIZE: usize = 1;
    const SUFFIX: char = 'H';

    fn is_valid_char(c: u8) -> bool {
        c.is_ascii_digit() || (b'A'..=b'F').contains(&c)
    }

    fn nth_string(index: u64, len: usize) -> String {
        if len == 0 {
            return String::new();
        }
        format!("{:0width$X}", index, width = len)
    }
}

impl StringKind for Octet {
    const BITCNT: u32 = 8;
    const ELEMSIZE: usize = 2;
    const SUFFIX: char = 'O';

    fn is_valid_char(c: u8) -> bool {
        Hex::is_valid_char(c)
    }

    fn nth_string(index: u64, len: usize) -> String {
        Hex::nth_string(index, len * 2)
    }
}

/// A set of strings of one of the kinds above.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringSet<K> {
    size: SizeRangeList,
    has: BTreeSet<String>,
    not: BTreeSet<String>,
    kind: PhantomData<K>,
}

pub type BitstringSet = StringSet<Bit>;
pub type HexstringSet = StringSet<Hex>;
pub type OctetstringSet = StringSet<Octet>;

impl<K: StringKind> StringSet<K> {
    /// The empty set.
    pub fn empty() -> StringSet<K> {
        StringSet::from_sizes(SizeRangeList::empty())
    }

    /// All strings.
    pub fn full() -> StringSet<K> {
        StringSet::from_sizes(SizeRangeList::full())
    }

    /// All strings whose length is in the given set.
    pub fn from_sizes(size: SizeRangeList) -> StringSet<K> {
        StringSet {
            size,
            has: BTreeSet::new(),
            not: BTreeSet::new(),
            kind: PhantomData,
        }
    }

    /// The set that contains exactly one string.
    ///
    /// Panics if the string contains characters outside of the kind's
    /// alphabet, or if an octet string has an odd number of digits.
    pub fn from_value<S: Into<String>>(s: S) -> StringSet<K> {
        let s = s.into();
        if s.len() % K::ELEMSIZE != 0 {
            panic!("string '{}'{} has a partial element", s, K::SUFFIX);
        }
        if let Some(c) = s.bytes().find(|&c| !K::is_valid_char(c)) {
            panic!("invalid char `{}` in '{}'{}", c as char, s, K::SUFFIX);
        }
        let mut set = StringSet::empty();
        set.has.insert(s);
        set
    }

    fn elem_len(s: &str) -> SizeLimit {
        SizeLimit::Finite(s.len() / K::ELEMSIZE)
    }

    pub fn is_empty(&self) -> bool {
        self.size.is_empty() && self.has.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.size.is_full() && self.not.is_empty()
    }

    pub fn is_equal(&self, other: &StringSet<K>) -> bool {
        self == other
    }

    pub fn is_element(&self, s: &str) -> bool {
        (self.size.is_element(&Self::elem_len(s)) && !self.not.contains(s)) || self.has.contains(s)
    }

    pub fn size_set(&self) -> &SizeRangeList {
        &self.size
    }

    /// `[S1+V1-N1] + [S2+V2-N2] = [(S1+S2)+(V1+V2)-((~S1*N2)+(N1*~S2)+(N1*N2))]`
    pub fn union(&self, other: &StringSet<K>) -> StringSet<K> {
        let mut result = StringSet::from_sizes(self.size.union(&other.size));
        result.has = self.has.union(&other.has).cloned().collect();
        result.not = self.not.intersection(&other.not).cloned().collect();
        for s in &other.not {
            if !self.size.is_element(&Self::elem_len(s)) {
                result.not.insert(s.clone());
            }
        }
        for s in &self.not {
            if !other.size.is_element(&Self::elem_len(s)) {
                result.not.insert(s.clone());
            }
        }
        result.normalize();
        result
    }

    /// `[S1+V1-N1] * [S2+V2-N2] = [(S1*S2)+((S1*V2-N1)+(S2*V1-N2)+(V1*V2))-(N1+N2)]`
    pub fn intersection(&self, other: &StringSet<K>) -> StringSet<K> {
        let mut result = StringSet::from_sizes(self.size.intersection(&other.size));
        result.has = self.has.intersection(&other.has).cloned().collect();
        for s in &self.has {
            if other.size.is_element(&Self::elem_len(s)) && !other.not.contains(s) {
                result.has.insert(s.clone());
            }
        }
        for s in &other.has {
            if self.size.is_element(&Self::elem_len(s)) && !self.not.contains(s) {
                result.has.insert(s.clone());
            }
        }
        result.not = self.not.union(&other.not).cloned().collect();
        result.normalize();
        result
    }

    pub fn complement(&self) -> StringSet<K> {
        let mut result = StringSet::from_sizes(self.size.complement());
        result.has = self.not.clone();
        result.not = self.has.clone();
        result.canonicalize();
        result
    }

    pub fn except(&self, other: &StringSet<K>) -> StringSet<K> {
        self.intersection(&other.complement())
    }

    pub fn is_subset(&self, other: &StringSet<K>) -> bool {
        self.except(other).is_empty()
    }

    /// The smallest or largest length in the size set, or `None` if there is
    /// no such length.
    pub fn get_size_limit(&self, is_upper: bool) -> Option<SizeLimit> {
        if is_upper {
            self.size.get_maximal().cloned()
        } else {
            self.size.get_minimal().cloned()
        }
    }

    /// Restore the invariants after a set operation.
    fn normalize(&mut self) {
        // Values that are both included and excluded cancel each other.
        let both: Vec<_> = self.has.intersection(&self.not).cloned().collect();
        for s in &both {
            self.has.remove(s);
            self.not.remove(s);
        }
        let size = &self.size;
        self.has.retain(|s| !size.is_element(&Self::elem_len(s)));
        self.not.retain(|s| size.is_element(&Self::elem_len(s)));
        self.canonicalize();
    }

    fn canonicalize(&mut self) {
        self.canonicalize_values(true);
        self.canonicalize_values(false);
    }

    /// Fold the values of `has` (or `not`) into the size set where they
    /// cover all or most strings of a length.
    fn canonicalize_values(&mut self, if_values: bool) {
        let (mut values, mut other) = if if_values {
            (std::mem::take(&mut self.has), std::mem::take(&mut self.not))
        } else {
            (std::mem::take(&mut self.not), std::mem::take(&mut self.has))
        };

        let mut lengths: BTreeMap<usize, u64> = BTreeMap::new();
        for s in &values {
            *lengths.entry(s.len() / K::ELEMSIZE).or_insert(0) += 1;
        }

        for (&len, &count) in &lengths {
            let bits = K::BITCNT as usize * len;
            let all = if bits < 64 { 1u64 << bits } else { u64::max_value() };
            let fold = if count == all {
                true
            } else if (!if_values && count >= all / 2) || (if_values && count > all / 2) {
                for i in 0..all {
                    let s = K::nth_string(i, len);
                    if !values.contains(&s) {
                        other.insert(s);
                    }
                }
                true
            } else {
                false
            };
            if fold {
                values.retain(|s| s.len() / K::ELEMSIZE != len);
                let single = SizeRangeList::single(len);
                self.size = if if_values {
                    self.size.union(&single)
                } else {
                    self.size.except(&single)
                };
            }
        }

        if if_values {
            self.has = values;
            self.not = other;
        } else {
            self.not = values;
            self.has = other;
        }
    }
}

impl<K: StringKind> fmt::Display for StringSet<K> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let list = |set: &BTreeSet<String>| -> String {
            set.iter()
                .map(|s| format!("'{}'{}", s, K::SUFFIX))
                .collect::<Vec<_>>()
                .join(",")
        };
        if !self.has.is_empty() {
            write!(f, "({})", list(&self.has))?;
        }
        if !self.size.is_empty() {
            if !self.has.is_empty() {
                write!(f, " union ")?;
            }
            write!(f, "length{}", self.size)?;
        }
        if !self.not.is_empty() {
            write!(f, " except ({})", list(&self.not))?;
        }
        Ok(())
    }
}
