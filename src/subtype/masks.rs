// Copyright (c) 2016-2020 Fabian Schuiki

//! Sets over the small unordered domains, stored as bit masks.

use std::fmt;

bitflags! {
    /// A set of boolean values.
    pub struct BooleanSet: u8 {
        const FALSE = 1 << 0;
        const TRUE = 1 << 1;
    }
}

bitflags! {
    /// A set of verdicts.
    pub struct VerdictSet: u8 {
        const NONE = 1 << 0;
        const PASS = 1 << 1;
        const INCONC = 1 << 2;
        const FAIL = 1 << 3;
        const ERROR = 1 << 4;
    }
}

/// A verdict value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    None,
    Pass,
    Inconc,
    Fail,
    Error,
}

impl Verdict {
    pub fn name(self) -> &'static str {
        match self {
            Verdict::None => "none",
            Verdict::Pass => "pass",
            Verdict::Inconc => "inconc",
            Verdict::Fail => "fail",
            Verdict::Error => "error",
        }
    }

    pub fn from_name(name: &str) -> Option<Verdict> {
        Some(match name {
            "none" => Verdict::None,
            "pass" => Verdict::Pass,
            "inconc" => Verdict::Inconc,
            "fail" => Verdict::Fail,
            "error" => Verdict::Error,
            _ => return None,
        })
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<bool> for BooleanSet {
    fn from(b: bool) -> BooleanSet {
        if b {
            BooleanSet::TRUE
        } else {
            BooleanSet::FALSE
        }
    }
}

impl From<Verdict> for VerdictSet {
    fn from(v: Verdict) -> VerdictSet {
        match v {
            Verdict::None => VerdictSet::NONE,
            Verdict::Pass => VerdictSet::PASS,
            Verdict::Inconc => VerdictSet::INCONC,
            Verdict::Fail => VerdictSet::FAIL,
            Verdict::Error => VerdictSet::ERROR,
        }
    }
}

// Union, intersection, and complement are the bitwise operators.
macro_rules! mask_set_ops {
    ($name:ident) => {
        impl $name {
            pub fn is_full(&self) -> bool {
                self.is_all()
            }

            pub fn except(&self, other: &$name) -> $name {
                *self & !*other
            }

            pub fn is_subset(&self, other: &$name) -> bool {
                self.except(other).is_empty()
            }
        }
    };
}

mask_set_ops!(BooleanSet);
mask_set_ops!(VerdictSet);

impl BooleanSet {
    pub fn is_element(&self, b: bool) -> bool {
        self.contains(BooleanSet::from(b))
    }
}

impl VerdictSet {
    pub fn is_element(&self, v: Verdict) -> bool {
        self.contains(VerdictSet::from(v))
    }
}

impl fmt::Display for BooleanSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "(")?;
        if self.contains(BooleanSet::FALSE) {
            write!(f, "false")?;
        }
        if self.is_all() {
            write!(f, ",")?;
        }
        if self.contains(BooleanSet::TRUE) {
            write!(f, "true")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for VerdictSet {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let names: Vec<_> = [
            Verdict::None,
            Verdict::Pass,
            Verdict::Inconc,
            Verdict::Fail,
            Verdict::Error,
        ]
        .iter()
        .filter(|&&v| self.is_element(v))
        .map(|v| v.name())
        .collect();
        write!(f, "({})", names.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booleans() {
        let t = BooleanSet::from(true);
        assert_eq!(format!("{}", t), "(true)");
        assert_eq!(format!("{}", !t), "(false)");
        assert_eq!(format!("{}", BooleanSet::all()), "(false,true)");
        assert!((t | !t).is_full());
        assert!((t & !t).is_empty());
        assert!(t.is_subset(&BooleanSet::all()));
        assert!(!t.is_element(false));
    }

    #[test]
    fn verdicts() {
        let s = VerdictSet::PASS | VerdictSet::FAIL;
        assert_eq!(format!("{}", s), "(pass,fail)");
        assert_eq!(format!("{}", !s), "(none,inconc,error)");
        assert!(s.is_element(Verdict::Fail));
        assert!(!s.is_element(Verdict::Error));
        assert!(s.except(&VerdictSet::PASS).is_subset(&VerdictSet::FAIL));
        assert_eq!(Verdict::from_name("inconc"), Some(Verdict::Inconc));
        assert_eq!(Verdict::from_name("maybe"), None);
    }
}
