// Copyright (c) 2016-2020 Fabian Schuiki

//! Explicit sets of character string values.

use crate::limits::{CharLimit, Limit, SizeLimit, UCharLimit};
use crate::pattern::StringPattern;
use crate::rangelist::{RangeList, SizeRangeList};
use crate::tribool::TriBool;
use crate::ustring::{code_points_repr, string_repr, UString};
use std::collections::BTreeSet;
use std::fmt;

/// A string type that can be constrained by an alphabet tree.
pub trait TreeString: Clone + Ord + fmt::Debug {
    /// The limit type of a single character.
    type Char: Limit;

    /// The number of characters in the string.
    fn char_len(&self) -> usize;

    /// The characters of the string as limits. `None` if any character
    /// lies outside the character domain.
    fn to_chars(&self) -> Option<Vec<Self::Char>>;

    /// Match the string against a pattern.
    fn match_pattern(&self, pattern: &StringPattern) -> TriBool;

    /// The string as it would appear in the source text.
    fn repr(&self) -> String;
}

impl TreeString for String {
    type Char = CharLimit;

    fn char_len(&self) -> usize {
        self.chars().count()
    }

    fn to_chars(&self) -> Option<Vec<CharLimit>> {
        self.chars()
            .map(|c| {
                if CharLimit::is_valid_value(c as u32) {
                    Some(CharLimit::new(c as u8))
                } else {
                    None
                }
            })
            .collect()
    }

    fn match_pattern(&self, pattern: &StringPattern) -> TriBool {
        pattern.matches(self)
    }

    fn repr(&self) -> String {
        string_repr(self)
    }
}

impl TreeString for UString {
    type Char = UCharLimit;

    fn char_len(&self) -> usize {
        self.len()
    }

    fn to_chars(&self) -> Option<Vec<UCharLimit>> {
        self.code_points()
            .iter()
            .map(|&cp| {
                if UCharLimit::is_valid_value(cp) {
                    Some(UCharLimit::new(cp))
                } else {
                    None
                }
            })
            .collect()
    }

    fn match_pattern(&self, pattern: &StringPattern) -> TriBool {
        pattern.matches_ustring(self)
    }

    fn repr(&self) -> String {
        code_points_repr(self.code_points())
    }
}

/// A finite set of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringValues<S: Ord> {
    values: BTreeSet<S>,
}

impl<S: TreeString> StringValues<S> {
    pub fn empty() -> StringValues<S> {
        StringValues {
            values: BTreeSet::new(),
        }
    }

    pub fn single(s: S) -> StringValues<S> {
        let mut values = BTreeSet::new();
        values.insert(s);
        StringValues { values }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// A finite set never covers the whole string domain.
    pub fn is_full(&self) -> bool {
        false
    }

    pub fn is_equal(&self, other: &StringValues<S>) -> bool {
        self.values == other.values
    }

    pub fn is_element(&self, s: &S) -> bool {
        self.values.contains(s)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &S> {
        self.values.iter()
    }

    pub fn union(&self, other: &StringValues<S>) -> StringValues<S> {
        StringValues {
            values: self.values.union(&other.values).cloned().collect(),
        }
    }

    pub fn intersection(&self, other: &StringValues<S>) -> StringValues<S> {
        StringValues {
            values: self.values.intersection(&other.values).cloned().collect(),
        }
    }

    pub fn except(&self, other: &StringValues<S>) -> StringValues<S> {
        StringValues {
            values: self.values.difference(&other.values).cloned().collect(),
        }
    }

    pub fn is_subset(&self, other: &StringValues<S>) -> bool {
        self.values.is_subset(&other.values)
    }

    /// Remove the strings whose length is (or is not) in `sizes`.
    pub fn remove_by_size(&mut self, sizes: &SizeRangeList, if_element: bool) {
        self.values
            .retain(|s| sizes.is_element(&SizeLimit::from(s.char_len())) != if_element);
    }

    /// Remove the strings that consist only of characters from `alphabet`
    /// (or that contain at least one character outside of it).
    pub fn remove_by_alphabet(&mut self, alphabet: &RangeList<S::Char>, if_element: bool) {
        self.values.retain(|s| {
            let all_in = match s.to_chars() {
                Some(chars) => chars.iter().all(|c| alphabet.is_element(c)),
                None => false,
            };
            all_in != if_element
        });
    }

    /// Remove the strings that match (or do not match) `pattern`. Strings
    /// with an unknown match result are kept either way.
    pub fn remove_by_pattern(&mut self, pattern: &StringPattern, if_element: bool) {
        self.values.retain(|s| match s.match_pattern(pattern) {
            TriBool::True => !if_element,
            TriBool::False => if_element,
            TriBool::Unknown => true,
        });
    }
}

impl<S: TreeString> fmt::Display for StringValues<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reprs: Vec<_> = self.values.iter().map(|s| s.repr()).collect();
        write!(f, "({})", reprs.join(","))
    }
}
