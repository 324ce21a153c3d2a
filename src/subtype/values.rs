// Copyright (c) 2016-2020 Fabian Schuiki

//! Compile-time values and templates, and sets of values that cannot be
//! ordered.
//!
//! Values are owned by whoever parsed them. The sets in this module only
//! hold references, so set operations copy pointers rather than values.

use crate::limits::{real_repr, SizeLimit};
use crate::masks::Verdict;
use crate::rangelist::SizeRangeList;
use crate::tribool::TriBool;
use crate::ustring::{string_repr, UString};
use num::BigInt;
use std::fmt;

/// A compile-time value.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(BigInt),
    Float(f64),
    Boolean(bool),
    Verdict(Verdict),
    /// A bitstring, as a string of `0` and `1`.
    Bitstring(String),
    /// A hexstring, as a string of hex digits.
    Hexstring(String),
    /// An octetstring, as a string of an even number of hex digits.
    Octetstring(String),
    Charstring(String),
    UCharstring(UString),
    Objid(Vec<u64>),
    Enumerated(String),
    /// A record value. Fields are compared in order.
    Record(Vec<(String, Value)>),
    /// A set value. Fields are compared by name.
    Set(Vec<(String, Value)>),
    /// A union value, the selected alternative and its value.
    Union(String, Box<Value>),
    RecordOf(Vec<Value>),
    /// A set-of value. Elements are compared regardless of their order.
    SetOf(Vec<Value>),
    Function(String),
    Altstep(String),
    Testcase(String),
    /// A value that is only known at run time.
    Unfoldable,
    /// A value that failed to check earlier on.
    Error,
}

impl Value {
    /// The number of elements of a record-of or set-of value.
    pub fn nof_comps(&self) -> Option<usize> {
        match *self {
            Value::RecordOf(ref v) | Value::SetOf(ref v) => Some(v.len()),
            _ => None,
        }
    }

    /// Check whether the value or any of its components is unfoldable.
    pub fn is_unfoldable(&self) -> bool {
        match *self {
            Value::Unfoldable => true,
            Value::Record(ref fields) | Value::Set(ref fields) => {
                fields.iter().any(|&(_, ref v)| v.is_unfoldable())
            }
            Value::Union(_, ref v) => v.is_unfoldable(),
            Value::RecordOf(ref v) | Value::SetOf(ref v) => v.iter().any(Value::is_unfoldable),
            _ => false,
        }
    }

    /// A short description of the kind of value.
    pub fn kind_name(&self) -> &'static str {
        match *self {
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Boolean(_) => "boolean",
            Value::Verdict(_) => "verdict",
            Value::Bitstring(_) => "bitstring",
            Value::Hexstring(_) => "hexstring",
            Value::Octetstring(_) => "octetstring",
            Value::Charstring(_) => "charstring",
            Value::UCharstring(_) => "universal charstring",
            Value::Objid(_) => "objid",
            Value::Enumerated(_) => "enumerated",
            Value::Record(_) => "record",
            Value::Set(_) => "set",
            Value::Union(..) => "union",
            Value::RecordOf(_) => "record of",
            Value::SetOf(_) => "set of",
            Value::Function(_) => "function",
            Value::Altstep(_) => "altstep",
            Value::Testcase(_) => "testcase",
            Value::Unfoldable => "unfoldable",
            Value::Error => "erroneous",
        }
    }
}

fn set_fields_equal(a: &[(String, Value)], b: &[(String, Value)]) -> bool {
    a.len() == b.len()
        && a.iter().all(|&(ref name, ref va)| {
            b.iter()
                .any(|&(ref other, ref vb)| name == other && va == vb)
        })
}

fn set_of_equal(a: &[Value], b: &[Value]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut used = vec![false; b.len()];
    'outer: for va in a {
        for (j, vb) in b.iter().enumerate() {
            if !used[j] && va == vb {
                used[j] = true;
                continue 'outer;
            }
        }
        return false;
    }
    true
}

impl PartialEq for Value {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Verdict(a), Value::Verdict(b)) => a == b,
            (Value::Bitstring(a), Value::Bitstring(b)) => a == b,
            (Value::Hexstring(a), Value::Hexstring(b)) => a.eq_ignore_ascii_case(b),
            (Value::Octetstring(a), Value::Octetstring(b)) => a.eq_ignore_ascii_case(b),
            (Value::Charstring(a), Value::Charstring(b)) => a == b,
            (Value::UCharstring(a), Value::UCharstring(b)) => a == b,
            (Value::Objid(a), Value::Objid(b)) => a == b,
            (Value::Enumerated(a), Value::Enumerated(b)) => a == b,
            (Value::Record(a), Value::Record(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => set_fields_equal(a, b),
            (Value::Union(na, va), Value::Union(nb, vb)) => na == nb && va == vb,
            (Value::RecordOf(a), Value::RecordOf(b)) => a == b,
            (Value::SetOf(a), Value::SetOf(b)) => set_of_equal(a, b),
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Altstep(a), Value::Altstep(b)) => a == b,
            (Value::Testcase(a), Value::Testcase(b)) => a == b,
            _ => false,
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter, items: &[T]) -> fmt::Result {
    write!(f, "{{ ")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    write!(f, " }}")
}

fn write_fields(f: &mut fmt::Formatter, fields: &[(String, Value)]) -> fmt::Result {
    let items: Vec<_> = fields
        .iter()
        .map(|&(ref name, ref v)| format!("{} := {}", name, v))
        .collect();
    write_list(f, &items)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Value::Integer(ref v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", real_repr(v)),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Verdict(v) => write!(f, "{}", v),
            Value::Bitstring(ref v) => write!(f, "'{}'B", v),
            Value::Hexstring(ref v) => write!(f, "'{}'H", v),
            Value::Octetstring(ref v) => write!(f, "'{}'O", v),
            Value::Charstring(ref v) => write!(f, "{}", string_repr(v)),
            Value::UCharstring(ref v) => write!(f, "{}", v),
            Value::Objid(ref v) => {
                let parts: Vec<_> = v.iter().map(|c| c.to_string()).collect();
                write!(f, "objid {{ {} }}", parts.join(" "))
            }
            Value::Enumerated(ref v) => write!(f, "{}", v),
            Value::Record(ref fields) | Value::Set(ref fields) => write_fields(f, fields),
            Value::Union(ref name, ref v) => write!(f, "{{ {} := {} }}", name, v),
            Value::RecordOf(ref v) | Value::SetOf(ref v) => write_list(f, v),
            Value::Function(ref n) | Value::Altstep(ref n) | Value::Testcase(ref n) => {
                write!(f, "refers({})", n)
            }
            Value::Unfoldable => write!(f, "<unfoldable value>"),
            Value::Error => write!(f, "<erroneous value>"),
        }
    }
}

/// A length restriction attached to a template, e.g. `length(2..5)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LengthRestriction {
    pub min: usize,
    /// The upper bound, or `None` for `infinity`.
    pub max: Option<usize>,
}

impl LengthRestriction {
    pub fn single(len: usize) -> LengthRestriction {
        LengthRestriction {
            min: len,
            max: Some(len),
        }
    }

    pub fn range(min: usize, max: Option<usize>) -> LengthRestriction {
        LengthRestriction { min, max }
    }

    /// The lengths allowed by the restriction. `None` if the bounds are
    /// inverted.
    pub fn to_size_range(&self) -> Option<SizeRangeList> {
        let max = match self.max {
            Some(m) if m < self.min => return None,
            Some(m) => SizeLimit::Finite(m),
            None => SizeLimit::Infinity,
        };
        Some(SizeRangeList::range(self.min, max))
    }
}

/// The kinds of pattern templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternKind {
    Bitstring,
    Hexstring,
    Octetstring,
    Charstring,
    UCharstring,
}

impl PatternKind {
    pub fn name(self) -> &'static str {
        match self {
            PatternKind::Bitstring => "bitstring",
            PatternKind::Hexstring => "hexstring",
            PatternKind::Octetstring => "octetstring",
            PatternKind::Charstring => "charstring",
            PatternKind::UCharstring => "universal charstring",
        }
    }
}

/// A template, a value or a set of values used for matching.
#[derive(Debug, Clone)]
pub struct Template<'v> {
    pub kind: TemplateKind<'v>,
    pub length: Option<LengthRestriction>,
}

#[derive(Debug, Clone)]
pub enum TemplateKind<'v> {
    /// A specific value.
    Value(&'v Value),
    Omit,
    /// `?`
    AnyValue,
    /// `*`
    AnyOrOmit,
    /// `*` inside a list, matching any number of elements.
    AnyOrNone,
    /// `(a, b, c)`
    ValueList(Vec<Template<'v>>),
    /// `complement(a, b, c)`
    ComplementedList(Vec<Template<'v>>),
    /// `{ a, b, c }` for a record-of or set-of.
    List(Vec<Template<'v>>),
    /// `{ f1 := a, f2 := b }`
    Named(Vec<(String, Template<'v>)>),
    /// `(lower .. upper)`
    Range,
    Superset(Vec<Template<'v>>),
    Subset(Vec<Template<'v>>),
    /// A pattern of the given kind, e.g. `'10*'B` or `pattern "a?c"`.
    Pattern(PatternKind, String),
    /// A reference to a template that cannot be resolved at compile time.
    Reference,
    Error,
}

impl<'v> Template<'v> {
    pub fn new(kind: TemplateKind<'v>) -> Template<'v> {
        Template { kind, length: None }
    }

    pub fn with_length(self, length: LengthRestriction) -> Template<'v> {
        Template {
            length: Some(length),
            ..self
        }
    }

    /// The number of list elements other than `*`.
    pub fn nof_comps_not_anyornone(&self) -> usize {
        match self.kind {
            TemplateKind::List(ref items) => items
                .iter()
                .filter(|t| match t.kind {
                    TemplateKind::AnyOrNone => false,
                    _ => true,
                })
                .count(),
            _ => 0,
        }
    }

    /// Check whether a list template contains a `*` element.
    pub fn contains_anyornone(&self) -> bool {
        match self.kind {
            TemplateKind::List(ref items) => items.iter().any(|t| match t.kind {
                TemplateKind::AnyOrNone => true,
                _ => false,
            }),
            _ => false,
        }
    }
}

/// Determine the minimum number of elements a pattern matches, and whether
/// it contains a `*` that matches arbitrarily many.
pub fn pattern_min_length(kind: PatternKind, text: &str) -> (usize, bool) {
    let mut len = 0;
    let mut any_or_none = false;
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => any_or_none = true,
            '?' => len += 1,
            '\\' if kind == PatternKind::Charstring || kind == PatternKind::UCharstring => {
                chars.next();
                len += 1;
            }
            '[' if kind == PatternKind::Charstring || kind == PatternKind::UCharstring => {
                while let Some(c) = chars.next() {
                    match c {
                        ']' => break,
                        '\\' => {
                            chars.next();
                        }
                        _ => (),
                    }
                }
                len += 1;
            }
            // Octets are written as two hex digits.
            _ if kind == PatternKind::Octetstring => {
                chars.next();
                len += 1;
            }
            _ => len += 1,
        }
    }
    (len, any_or_none)
}

/// A list of values with structural membership.
#[derive(Debug, Clone, Default)]
pub struct ValueList<'v> {
    values: Vec<&'v Value>,
}

impl<'v> ValueList<'v> {
    pub fn empty() -> ValueList<'v> {
        ValueList { values: vec![] }
    }

    pub fn single(v: &'v Value) -> ValueList<'v> {
        ValueList { values: vec![v] }
    }

    pub fn is_empty(&self) -> TriBool {
        self.values.is_empty().into()
    }

    /// The number of possible values is not known here.
    pub fn is_full(&self) -> TriBool {
        TriBool::Unknown
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn iter<'a>(&'a self) -> impl Iterator<Item = &'v Value> + 'a {
        self.values.iter().cloned()
    }

    pub fn is_element(&self, v: &Value) -> bool {
        self.values
            .iter()
            .any(|&other| std::ptr::eq(other, v) || other == v)
    }

    /// Compare as sets; each element of `other` is matched at most once.
    pub fn is_equal(&self, other: &ValueList<'v>) -> TriBool {
        if self.values.len() != other.values.len() {
            return TriBool::False;
        }
        let mut found = vec![false; other.values.len()];
        for &a in &self.values {
            let hit = other
                .values
                .iter()
                .enumerate()
                .find(|&(j, &b)| !found[j] && (std::ptr::eq(a, b) || a == b))
                .map(|(j, _)| j);
            match hit {
                Some(j) => found[j] = true,
                None => return TriBool::False,
            }
        }
        TriBool::True
    }

    pub fn union(&self, other: &ValueList<'v>) -> ValueList<'v> {
        let mut values = self.values.clone();
        for &v in &other.values {
            if !self.is_element(v) {
                values.push(v);
            }
        }
        ValueList { values }
    }

    pub fn intersection(&self, other: &ValueList<'v>) -> ValueList<'v> {
        ValueList {
            values: self
                .values
                .iter()
                .cloned()
                .filter(|v| other.is_element(v))
                .collect(),
        }
    }

    pub fn except(&self, other: &ValueList<'v>) -> ValueList<'v> {
        ValueList {
            values: self
                .values
                .iter()
                .cloned()
                .filter(|v| !other.is_element(v))
                .collect(),
        }
    }

    pub fn is_subset(&self, other: &ValueList<'v>) -> TriBool {
        self.except(other).is_empty()
    }

    /// Remove the values whose number of elements is (or is not) in
    /// `sizes`. Only valid for record-of and set-of values.
    pub fn remove_by_size(&mut self, sizes: &SizeRangeList, if_element: bool) {
        self.values.retain(|v| {
            let n = match v.nof_comps() {
                Some(n) => n,
                None => panic!("{} value has no number of elements", v.kind_name()),
            };
            sizes.is_element(&SizeLimit::from(n)) != if_element
        });
    }
}

impl<'v> fmt::Display for ValueList<'v> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let reprs: Vec<_> = self.values.iter().map(|v| v.to_string()).collect();
        write!(f, "({})", reprs.join(","))
    }
}

/// A list of values, or all values except a list.
#[derive(Debug, Clone)]
pub struct ValueListConstraint<'v> {
    complemented: bool,
    values: ValueList<'v>,
}

impl<'v> ValueListConstraint<'v> {
    pub fn empty() -> ValueListConstraint<'v> {
        ValueListConstraint {
            complemented: false,
            values: ValueList::empty(),
        }
    }

    pub fn full() -> ValueListConstraint<'v> {
        ValueListConstraint {
            complemented: true,
            values: ValueList::empty(),
        }
    }

    pub fn single(v: &'v Value) -> ValueListConstraint<'v> {
        ValueListConstraint {
            complemented: false,
            values: ValueList::single(v),
        }
    }

    pub fn is_complemented(&self) -> bool {
        self.complemented
    }

    pub fn values(&self) -> &ValueList<'v> {
        &self.values
    }

    pub fn is_empty(&self) -> TriBool {
        if self.complemented {
            self.values.is_full()
        } else {
            self.values.is_empty()
        }
    }

    pub fn is_full(&self) -> TriBool {
        if self.complemented {
            self.values.is_empty()
        } else {
            self.values.is_full()
        }
    }

    pub fn is_equal(&self, other: &ValueListConstraint<'v>) -> TriBool {
        if self.complemented == other.complemented {
            self.values.is_equal(&other.values)
        } else {
            TriBool::Unknown
        }
    }

    pub fn is_element(&self, v: &Value) -> bool {
        self.complemented ^ self.values.is_element(v)
    }

    pub fn union(&self, other: &ValueListConstraint<'v>) -> ValueListConstraint<'v> {
        let (complemented, values) = match (self.complemented, other.complemented) {
            (true, true) => (true, self.values.intersection(&other.values)),
            (true, false) => (true, self.values.except(&other.values)),
            (false, true) => (true, other.values.except(&self.values)),
            (false, false) => (false, self.values.union(&other.values)),
        };
        ValueListConstraint {
            complemented,
            values,
        }
    }

    pub fn intersection(&self, other: &ValueListConstraint<'v>) -> ValueListConstraint<'v> {
        let (complemented, values) = match (self.complemented, other.complemented) {
            (true, true) => (true, self.values.union(&other.values)),
            (true, false) => (false, other.values.except(&self.values)),
            (false, true) => (false, self.values.except(&other.values)),
            (false, false) => (false, self.values.intersection(&other.values)),
        };
        ValueListConstraint {
            complemented,
            values,
        }
    }

    pub fn complement(&self) -> ValueListConstraint<'v> {
        ValueListConstraint {
            complemented: !self.complemented,
            values: self.values.clone(),
        }
    }

    pub fn except(&self, other: &ValueListConstraint<'v>) -> ValueListConstraint<'v> {
        self.intersection(&other.complement())
    }

    pub fn is_subset(&self, other: &ValueListConstraint<'v>) -> TriBool {
        self.except(other).is_empty()
    }
}

impl<'v> fmt::Display for ValueListConstraint<'v> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.complemented {
            write!(f, "(ALL except {})", self.values)
        } else {
            write!(f, "{}", self.values)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn en(name: &str) -> Value {
        Value::Enumerated(name.to_string())
    }

    #[test]
    fn structural_equality() {
        let a = Value::Set(vec![
            ("x".into(), Value::Integer(1.into())),
            ("y".into(), Value::Boolean(true)),
        ]);
        let b = Value::Set(vec![
            ("y".into(), Value::Boolean(true)),
            ("x".into(), Value::Integer(1.into())),
        ]);
        assert_eq!(a, b);
        let c = Value::SetOf(vec![en("a"), en("b"), en("a")]);
        let d = Value::SetOf(vec![en("a"), en("a"), en("b")]);
        let e = Value::SetOf(vec![en("a"), en("b"), en("b")]);
        assert_eq!(c, d);
        assert_ne!(c, e);
        assert_ne!(
            Value::RecordOf(vec![en("a"), en("b")]),
            Value::RecordOf(vec![en("b"), en("a")])
        );
        assert_eq!(Value::Float(std::f64::NAN), Value::Float(std::f64::NAN));
        assert_eq!(Value::Hexstring("ab".into()), Value::Hexstring("AB".into()));
    }

    #[test]
    fn display() {
        let v = Value::Record(vec![
            ("a".into(), Value::Integer(1.into())),
            ("b".into(), Value::Charstring("x".into())),
        ]);
        assert_eq!(format!("{}", v), "{ a := 1, b := \"x\" }");
        assert_eq!(format!("{}", Value::RecordOf(vec![])), "{  }");
        assert_eq!(format!("{}", Value::Objid(vec![0, 4, 0])), "objid { 0 4 0 }");
        assert_eq!(format!("{}", Value::Bitstring("01".into())), "'01'B");
        assert_eq!(format!("{}", Value::Float(1.5)), "1.5e0");
    }

    #[test]
    fn value_list_constraints() {
        let (a, b, c) = (en("a"), en("b"), en("c"));
        let ab = ValueListConstraint::single(&a).union(&ValueListConstraint::single(&b));
        let bc = ValueListConstraint::single(&b).union(&ValueListConstraint::single(&c));
        assert_eq!(format!("{}", ab), "(a,b)");
        assert_eq!(format!("{}", ab.intersection(&bc)), "(b)");
        assert_eq!(format!("{}", ab.except(&bc)), "(a)");
        let not_a = ValueListConstraint::single(&a).complement();
        assert_eq!(format!("{}", not_a), "(ALL except (a))");
        assert!(!not_a.is_element(&en("a")));
        assert!(not_a.is_element(&en("z")));
        assert_eq!(not_a.is_empty(), TriBool::Unknown);
        assert_eq!(not_a.is_full(), TriBool::False);
        assert_eq!(ab.is_full(), TriBool::Unknown);
        assert_eq!(format!("{}", not_a.union(&ab)), "(ALL except ())");
        assert_eq!(not_a.union(&ab).is_full(), TriBool::True);
        assert_eq!(format!("{}", not_a.intersection(&ab)), "(b)");
        assert_eq!(ab.is_subset(&not_a), TriBool::False);
        assert_eq!(ab.intersection(&bc).is_subset(&not_a), TriBool::True);
        assert_eq!(ab.is_equal(&not_a), TriBool::Unknown);
        let ba = ValueListConstraint::single(&b).union(&ValueListConstraint::single(&a));
        assert_eq!(ab.is_equal(&ba), TriBool::True);
    }

    #[test]
    fn pattern_lengths() {
        assert_eq!(pattern_min_length(PatternKind::Bitstring, "1?0*"), (3, true));
        assert_eq!(pattern_min_length(PatternKind::Octetstring, "AB?CD"), (3, false));
        assert_eq!(pattern_min_length(PatternKind::Charstring, "a[bc]\\d"), (3, false));
    }

    #[test]
    fn template_lists() {
        let one = Value::Integer(1.into());
        let t = Template::new(TemplateKind::List(vec![
            Template::new(TemplateKind::Value(&one)),
            Template::new(TemplateKind::AnyOrNone),
            Template::new(TemplateKind::AnyValue),
        ]));
        assert_eq!(t.nof_comps_not_anyornone(), 2);
        assert!(t.contains_anyornone());
        assert_eq!(
            LengthRestriction::range(3, Some(1)).to_size_range(),
            None
        );
    }
}
