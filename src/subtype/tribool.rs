// Copyright (c) 2016-2020 Fabian Schuiki

//! Three-valued logic.
//!
//! Several questions about constraints cannot always be decided, e.g.
//! whether a pattern accepts any string at all. Such queries answer with a
//! `TriBool`, where `Unknown` means the engine did not attempt a decision.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

/// A boolean with an additional "don't know" state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriBool {
    False,
    Unknown,
    True,
}

pub use self::TriBool::*;

const AND_TABLE: [[TriBool; 3]; 3] = [
    [False, False, False],
    [False, Unknown, Unknown],
    [False, Unknown, True],
];

const OR_TABLE: [[TriBool; 3]; 3] = [
    [False, Unknown, True],
    [Unknown, Unknown, True],
    [True, True, True],
];

const NOT_TABLE: [TriBool; 3] = [True, Unknown, False];

impl TriBool {
    fn index(self) -> usize {
        match self {
            False => 0,
            Unknown => 1,
            True => 2,
        }
    }

    pub fn and(self, other: TriBool) -> TriBool {
        AND_TABLE[self.index()][other.index()]
    }

    pub fn or(self, other: TriBool) -> TriBool {
        OR_TABLE[self.index()][other.index()]
    }

    /// Check whether this is definitely true.
    pub fn is_true(self) -> bool {
        self == True
    }

    /// Check whether this is definitely false.
    pub fn is_false(self) -> bool {
        self == False
    }

    pub fn is_unknown(self) -> bool {
        self == Unknown
    }
}

impl Not for TriBool {
    type Output = TriBool;

    fn not(self) -> TriBool {
        NOT_TABLE[self.index()]
    }
}

impl BitAnd for TriBool {
    type Output = TriBool;

    fn bitand(self, other: TriBool) -> TriBool {
        self.and(other)
    }
}

impl BitOr for TriBool {
    type Output = TriBool;

    fn bitor(self, other: TriBool) -> TriBool {
        self.or(other)
    }
}

impl From<bool> for TriBool {
    fn from(b: bool) -> TriBool {
        if b {
            True
        } else {
            False
        }
    }
}

impl fmt::Display for TriBool {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            False => write!(f, "false"),
            Unknown => write!(f, "unknown"),
            True => write!(f, "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables() {
        assert_eq!(True & Unknown, Unknown);
        assert_eq!(False & Unknown, False);
        assert_eq!(True | Unknown, True);
        assert_eq!(False | Unknown, Unknown);
        assert_eq!(!Unknown, Unknown);
        assert_eq!(!True, False);
        assert_eq!(TriBool::from(true) & TriBool::from(true), True);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Unknown), "unknown");
        assert_eq!(format!("{}", False), "false");
    }
}
