// Copyright (c) 2016-2020 Fabian Schuiki

//! The subtypes of the declared types of a module.
//!
//! Each type that carries a restriction has an entry in the `SubtypeTable`.
//! An entry starts out with the restriction clauses as they were written
//! and is turned into a `SubtypeConstraint` by `check`. Checking follows the
//! parent and referenced types first, detects circular references among
//! them, folds the clauses into a constraint, and finally restricts the
//! result to the constraint of the parent. Values and templates can then be
//! checked against the entry.

use crate::asn::{asn_type_constraint, AsnStringType, RangeChar};
use crate::constraint::{SubtypeConstraint, SubtypeKind};
use crate::limits::{CharLimit, IntLimit, Limit, RealLimit, SizeLimit, UCharLimit};
use crate::pattern::StringPattern;
use crate::rangelist::{IntegerRangeList, RangeList, SizeRangeList};
use crate::real::RealRangeList;
use crate::tree::Tree;
use crate::ustring::UString;
use crate::values::{pattern_min_length, PatternKind, Template, TemplateKind, Value};
use itertools::Itertools;
use num::{BigInt, ToPrimitive};
use std::fmt;
use std::ops::{Index, IndexMut};
use ttsub_common::errors::{DiagBuilder2, DiagEmitter};
use ttsub_common::util::HasDesc;

/// The largest length a length restriction may name.
const MAX_LENGTH: i32 = std::i32::MAX;

/// A reference to a subtype in a `SubtypeTable`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubtypeId(usize);

impl SubtypeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SubtypeId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One boundary of a range clause.
#[derive(Debug, Clone, Copy)]
pub enum Bound<'v> {
    MinusInfinity,
    Value(&'v Value),
    PlusInfinity,
}

/// A restriction clause as written in a type definition.
#[derive(Debug, Clone)]
pub enum Clause<'v> {
    /// A single value, e.g. the `1` in `(1, 2, 3)`.
    Single(&'v Value),
    /// A reference to another type whose subtype is included, e.g. the `T`
    /// in `(T, 5)`.
    TypeRef(SubtypeId),
    /// A value range, e.g. `(1 .. !10)`.
    Range {
        min: Bound<'v>,
        min_exclusive: bool,
        max: Bound<'v>,
        max_exclusive: bool,
    },
    /// A length restriction. `upper` is `None` for a single length.
    Length {
        lower: &'v Value,
        upper: Option<Bound<'v>>,
    },
    /// A pattern restriction on a string.
    Pattern { text: String, nocase: bool },
}

/// The constraints of an ASN.1 type, split into the root and the extension
/// part.
#[derive(Debug, Clone)]
pub struct AsnConstraints<'v> {
    pub root: Option<SubtypeConstraint<'v>>,
    pub extendable: bool,
    pub extension: Option<SubtypeConstraint<'v>>,
}

/// The check state of a subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Unchecked,
    /// The subtype is being checked. Guards against reentrant checks.
    Checking,
    Checked,
}

/// The subtype of a declared type.
#[derive(Debug)]
pub struct Subtype<'v> {
    name: String,
    kind: SubtypeKind,
    parent: Option<SubtypeId>,
    clauses: Option<Vec<Clause<'v>>>,
    asn: Option<AsnConstraints<'v>>,
    asn_type: Option<AsnStringType>,
    constraint: SubtypeConstraint<'v>,
    root: Option<SubtypeConstraint<'v>>,
    extendable: bool,
    extension: Option<SubtypeConstraint<'v>>,
    state: CheckState,
    /// The parent and referenced subtypes adopted so far.
    parents: Vec<SubtypeId>,
}

impl<'v> Subtype<'v> {
    fn new(name: String, kind: SubtypeKind) -> Subtype<'v> {
        Subtype {
            name,
            kind,
            parent: None,
            clauses: None,
            asn: None,
            asn_type: None,
            constraint: SubtypeConstraint::new(kind),
            root: None,
            extendable: false,
            extension: None,
            state: CheckState::Unchecked,
            parents: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> SubtypeKind {
        self.kind
    }

    pub fn parent(&self) -> Option<SubtypeId> {
        self.parent
    }

    pub fn set_parent(&mut self, parent: SubtypeId) {
        self.parent = Some(parent);
    }

    /// The restriction clauses of a TTCN-3 type. `None` for types without
    /// a restriction, e.g. plain aliases.
    pub fn clauses(&self) -> Option<&[Clause<'v>]> {
        self.clauses.as_ref().map(|c| c.as_slice())
    }

    pub fn set_clauses(&mut self, clauses: Vec<Clause<'v>>) {
        self.clauses = Some(clauses);
    }

    pub fn set_asn_constraints(&mut self, asn: AsnConstraints<'v>) {
        self.asn = Some(asn);
    }

    pub fn set_asn_type(&mut self, ty: AsnStringType) {
        self.asn_type = Some(ty);
    }

    pub fn state(&self) -> CheckState {
        self.state
    }

    /// The constraint computed by `check`.
    pub fn constraint(&self) -> &SubtypeConstraint<'v> {
        &self.constraint
    }

    pub fn is_error(&self) -> bool {
        self.constraint.is_error()
    }

    /// The root part of the constraint. Same as `constraint` for types
    /// without an extension.
    pub fn root(&self) -> &SubtypeConstraint<'v> {
        self.root.as_ref().unwrap_or(&self.constraint)
    }

    pub fn is_extendable(&self) -> bool {
        self.extendable
    }

    pub fn extension(&self) -> Option<&SubtypeConstraint<'v>> {
        self.extension.as_ref()
    }

    fn set_to_error(&mut self) {
        self.constraint.set_to_error();
        self.root = None;
        self.extendable = false;
        self.extension = None;
    }

    /// Render the subtype for diagnostics, including the extension marker
    /// and extension of ASN.1 types.
    pub fn to_display_string(&self) -> String {
        match self.root {
            Some(ref root) => {
                let mut s = root.to_string();
                if self.extendable {
                    s.push_str(", ...");
                }
                if let Some(ref ext) = self.extension {
                    s.push_str(", ");
                    s.push_str(&ext.to_string());
                }
                s
            }
            None => self.constraint.to_string(),
        }
    }

    fn assert_checked(&self) {
        if self.state != CheckState::Checked {
            panic!("subtype of `{}` used before it was checked", self.name);
        }
    }

    /// The exact length the subtype requires, if any.
    pub fn length_restriction(&self) -> Option<usize> {
        self.assert_checked();
        self.clauses.as_ref()?;
        let length = self.constraint.length()?;
        if length.is_empty() {
            return None;
        }
        match (length.get_minimal(), length.get_maximal()) {
            (Some(&SizeLimit::Finite(min)), Some(&SizeLimit::Finite(max))) if min == max => {
                Some(min)
            }
            _ => None,
        }
    }

    /// Check whether values of length zero are allowed.
    pub fn zero_length_allowed(&self) -> bool {
        self.assert_checked();
        if self.clauses.is_none() {
            return true;
        }
        match self.constraint.length() {
            Some(l) => l.is_element(&SizeLimit::Finite(0)),
            None => true,
        }
    }

    /// Check whether values of length `n` are allowed.
    pub fn is_length_allowed(&self, n: usize) -> bool {
        self.assert_checked();
        match self.constraint.length() {
            Some(l) => l.is_element(&SizeLimit::Finite(n)),
            None => true,
        }
    }

    /// Determine the value of `MIN` or `MAX` in a type derived from this one.
    pub fn get_int_limit(&self, is_upper: bool, emitter: &dyn DiagEmitter) -> IntLimit {
        self.root().get_int_limit(is_upper, emitter)
    }
}

impl<'v> HasDesc for Subtype<'v> {
    fn desc(&self) -> &'static str {
        "subtype"
    }

    fn desc_full(&self) -> String {
        format!("subtype of `{}'", self.name)
    }
}

/// The subtypes of a module.
#[derive(Debug, Default)]
pub struct SubtypeTable<'v> {
    subtypes: Vec<Subtype<'v>>,
}

impl<'v> Index<SubtypeId> for SubtypeTable<'v> {
    type Output = Subtype<'v>;

    fn index(&self, id: SubtypeId) -> &Subtype<'v> {
        &self.subtypes[id.0]
    }
}

impl<'v> IndexMut<SubtypeId> for SubtypeTable<'v> {
    fn index_mut(&mut self, id: SubtypeId) -> &mut Subtype<'v> {
        &mut self.subtypes[id.0]
    }
}

/// The kinds of restriction clauses seen while folding a clause list.
#[derive(Debug, Default)]
struct ClauseMix {
    single: bool,
    range: bool,
    length: bool,
    pattern: bool,
}

impl<'v> SubtypeTable<'v> {
    pub fn new() -> SubtypeTable<'v> {
        Default::default()
    }

    /// Add a subtype for the type `name` of category `kind`.
    pub fn add_subtype<S: Into<String>>(&mut self, name: S, kind: SubtypeKind) -> SubtypeId {
        let id = SubtypeId(self.subtypes.len());
        self.subtypes.push(Subtype::new(name.into(), kind));
        id
    }

    pub fn len(&self) -> usize {
        self.subtypes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subtypes.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = SubtypeId> {
        (0..self.subtypes.len()).map(SubtypeId)
    }

    /// Find a subtype by the name of its type.
    pub fn lookup(&self, name: &str) -> Option<SubtypeId> {
        self.subtypes
            .iter()
            .position(|st| st.name == name)
            .map(SubtypeId)
    }

    /// Check every subtype of the table.
    pub fn check_all(&mut self, emitter: &dyn DiagEmitter) {
        for id in 0..self.subtypes.len() {
            self.check(SubtypeId(id), emitter);
        }
    }

    /// Compute the constraint of a subtype.
    ///
    /// Checking an already checked subtype does nothing. Problems with the
    /// restriction are reported to the emitter and leave the subtype in the
    /// error state.
    pub fn check(&mut self, id: SubtypeId, emitter: &dyn DiagEmitter) {
        if self[id].state != CheckState::Unchecked {
            return;
        }
        debug!("checking subtype of `{}`", self[id].name);
        self[id].state = CheckState::Checking;
        match self.build(id, emitter) {
            Some(built) => {
                let st = &mut self[id];
                st.constraint = built.constraint;
                st.root = built.root;
                st.extendable = built.extendable;
                st.extension = built.extension;
                debug!("subtype of `{}` is {}", st.name, st.to_display_string());
            }
            None => {
                debug!("subtype of `{}` is erroneous", self[id].name);
                self[id].set_to_error();
            }
        }
        self[id].state = CheckState::Checked;
    }

    fn build(&mut self, id: SubtypeId, emitter: &dyn DiagEmitter) -> Option<Built<'v>> {
        let kind = self[id].kind;
        let parent = self[id].parent;
        if let Some(parent) = parent {
            if !self.add_parent_subtype(id, parent, emitter) {
                return None;
            }
            self.check(parent, emitter);
            if self[parent].is_error() {
                return None;
            }
            if self[parent].kind != kind {
                panic!(
                    "subtype of `{}` derived from `{}` of a different category",
                    self[id].name, self[parent].name
                );
            }
        }

        let mut built = if let Some(clauses) = self[id].clauses.clone() {
            let constraint = self.fold_clauses(id, &clauses, emitter)?;
            Built::plain(constraint)
        } else if let Some(asn) = self[id].asn.clone() {
            let mut constraint = asn
                .root
                .clone()
                .unwrap_or_else(|| SubtypeConstraint::new(kind));
            if let Some(ref ext) = asn.extension {
                constraint.union(ext);
            }
            Built {
                constraint,
                root: asn.root,
                extendable: asn.extendable,
                extension: asn.extension,
            }
        } else if let Some(parent) = parent {
            let p = &self[parent];
            Built {
                constraint: p.constraint.clone(),
                root: p.root.clone(),
                extendable: p.extendable,
                extension: p.extension.clone(),
            }
        } else {
            let constraint = self[id]
                .asn_type
                .and_then(asn_type_constraint)
                .filter(|c| c.kind() == kind)
                .unwrap_or_else(|| SubtypeConstraint::new(kind));
            Built::plain(constraint)
        };

        let c = &mut built.constraint;
        if c.is_restricted() && c.is_empty().is_true() {
            emitter.emit(DiagBuilder2::error("The subtype is an empty set"));
            return None;
        }
        if c.is_restricted() && c.is_full().is_true() {
            emitter.emit(DiagBuilder2::warning(format!(
                "The subtype of type `{}' is a full set, it does not constrain the root type.",
                self[id].name
            )));
            debug!("subtype of `{}` is full, dropping it", self[id].name);
            c.clear_set();
        }
        if c.length().map(|l| l.is_full()).unwrap_or(false) {
            c.set_length(None);
        }
        Some(built)
    }

    /// Fold the restriction clauses of a TTCN-3 type into a constraint and
    /// restrict it to the parent's constraint.
    fn fold_clauses(
        &mut self,
        id: SubtypeId,
        clauses: &[Clause<'v>],
        emitter: &dyn DiagEmitter,
    ) -> Option<SubtypeConstraint<'v>> {
        let kind = self[id].kind;
        let mut acc: Option<SubtypeConstraint<'v>> = None;
        let mut mix = ClauseMix::default();
        let mut added = 0;
        for clause in clauses {
            trace!("folding {:?} into subtype of `{}`", clause, self[id].name);
            let ok = match *clause {
                Clause::Single(v) => {
                    mix.single = true;
                    self.add_single(id, &mut acc, v, emitter)
                }
                Clause::TypeRef(other) => {
                    mix.single = true;
                    self.add_type_ref(id, &mut acc, other, emitter)
                }
                Clause::Range {
                    min,
                    min_exclusive,
                    max,
                    max_exclusive,
                } => {
                    mix.range = true;
                    let range = RangeClause {
                        min,
                        min_exclusive,
                        max,
                        max_exclusive,
                    };
                    let is_string =
                        kind == SubtypeKind::Charstring || kind == SubtypeKind::UCharstring;
                    if is_string && (mix.length || mix.pattern) {
                        emitter.emit(DiagBuilder2::error(format!(
                            "Mixing of length/pattern and range subtyping is not allowed for \
                             type `{}'",
                            self[id].name
                        )));
                        false
                    } else {
                        self.add_range(id, &mut acc, range, mix.single, emitter)
                    }
                }
                Clause::Length { lower, upper } => {
                    mix.length = true;
                    self.add_length(id, &mut acc, lower, upper, emitter)
                }
                Clause::Pattern { ref text, nocase } => {
                    mix.pattern = true;
                    self.add_pattern(id, &mut acc, text, nocase, emitter)
                }
            };
            if ok {
                added += 1;
            }
        }

        let is_string = kind == SubtypeKind::Charstring || kind == SubtypeKind::UCharstring;
        if is_string && mix.single && mix.range {
            emitter.emit(DiagBuilder2::error(format!(
                "Mixing of value list and range subtyping is not allowed for type `{}'",
                self[id].name
            )));
            return None;
        }
        if added < clauses.len() {
            return None;
        }

        let mut constraint = acc.unwrap_or_else(|| SubtypeConstraint::new(kind));
        if let Some(parent) = self[id].parent {
            let parent_root = self[parent].root();
            if constraint.is_subset(parent_root).is_false() {
                emitter.emit(DiagBuilder2::error(format!(
                    "The subtype restriction is not a subset of the restriction on the parent \
                     type. Subtype {} is not subset of subtype {}",
                    constraint,
                    self[parent].to_display_string()
                )));
                return None;
            }
            constraint.intersection(parent_root);
        }
        Some(constraint)
    }

    /// Adopt `parent` as a parent or referenced subtype of `id`, unless that
    /// would introduce a circular reference.
    pub fn add_parent_subtype(
        &mut self,
        id: SubtypeId,
        parent: SubtypeId,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        if self[id].parents.contains(&parent) {
            return true;
        }
        let mut chain = vec![id];
        if !self.check_recursion(parent, &mut chain, emitter) {
            return false;
        }
        self[id].parents.push(parent);
        true
    }

    fn check_recursion(
        &self,
        id: SubtypeId,
        chain: &mut Vec<SubtypeId>,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        if chain.contains(&id) {
            let path = chain
                .iter()
                .chain(Some(&id))
                .map(|&st| format!("`{}'", self[st].name))
                .join(" -> ");
            emitter.emit(DiagBuilder2::error(format!(
                "While checking circular type references in subtype definitions: Circular \
                 reference: {}",
                path
            )));
            return false;
        }
        chain.push(id);
        for &p in &self[id].parents {
            if !self.check_recursion(p, chain, emitter) {
                return false;
            }
        }
        chain.pop();
        true
    }

    fn add_single(
        &self,
        id: SubtypeId,
        acc: &mut Option<SubtypeConstraint<'v>>,
        v: &'v Value,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        let st = &self[id];
        let kind = st.kind;
        // Charstring values are valid universal charstrings.
        if let (SubtypeKind::UCharstring, &Value::Charstring(ref s)) = (kind, v) {
            let c = SubtypeConstraint::ucharstring(Tree::value(UString::from(s.as_str())));
            unite(acc, &c);
            return true;
        }
        if SubtypeKind::of_value(v) != Some(kind) {
            emitter.emit(DiagBuilder2::error(format!(
                "{} value {} cannot be used in the subtype of `{}', which is of type {}",
                v.kind_name(),
                v,
                st.name,
                kind
            )));
            return false;
        }
        match SubtypeConstraint::from_value(v) {
            Some(c) => {
                unite(acc, &c);
                true
            }
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "Value {} cannot be used in the subtype of `{}'",
                    v, st.name
                )));
                false
            }
        }
    }

    fn add_type_ref(
        &mut self,
        id: SubtypeId,
        acc: &mut Option<SubtypeConstraint<'v>>,
        other: SubtypeId,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        if self[other].kind != self[id].kind {
            emitter.emit(DiagBuilder2::error(format!(
                "Reference `{}' must refer to a type which has the same root type as this type",
                self[other].name
            )));
            return false;
        }
        if !self.add_parent_subtype(id, other, emitter) {
            return false;
        }
        self.check(other, emitter);
        let referenced = &self[other];
        // Already reported while checking the referenced type.
        if referenced.is_error() {
            return false;
        }
        if !referenced.root().is_restricted() {
            emitter.emit(DiagBuilder2::error(format!(
                "Type referenced by `{}' does not have a subtype",
                referenced.name
            )));
            return false;
        }
        unite(acc, referenced.root());
        true
    }

    fn add_range(
        &self,
        id: SubtypeId,
        acc: &mut Option<SubtypeConstraint<'v>>,
        range: RangeClause<'v>,
        has_other: bool,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        let st = &self[id];
        let c = match st.kind {
            SubtypeKind::Integer => integer_range(range, emitter),
            SubtypeKind::Float => float_range(range, emitter),
            SubtypeKind::Charstring => return char_range::<CharLimit>(acc, range, has_other, emitter),
            SubtypeKind::UCharstring => {
                return char_range::<UCharLimit>(acc, range, has_other, emitter)
            }
            _ => {
                emitter.emit(DiagBuilder2::error(format!(
                    "Range subtyping is not allowed for type `{}'",
                    st.name
                )));
                return false;
            }
        };
        match c {
            Some(c) => {
                unite(acc, &c);
                true
            }
            None => false,
        }
    }

    fn add_length(
        &self,
        id: SubtypeId,
        acc: &mut Option<SubtypeConstraint<'v>>,
        lower: &Value,
        upper: Option<Bound<'v>>,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        let lower_name = if upper.is_some() {
            "lower boundary"
        } else {
            "length restriction value"
        };
        let min = match length_value(lower, lower_name, emitter) {
            Some(n) => n,
            None => return false,
        };
        let max = match upper {
            None => SizeLimit::Finite(min),
            Some(Bound::Value(v)) => match length_value(v, "upper boundary", emitter) {
                Some(n) => SizeLimit::Finite(n),
                None => return false,
            },
            Some(Bound::PlusInfinity) => SizeLimit::Infinity,
            Some(Bound::MinusInfinity) => {
                emitter.emit(DiagBuilder2::error(
                    "The upper boundary of the length restriction cannot be -infinity",
                ));
                return false;
            }
        };
        if max < SizeLimit::Finite(min) {
            emitter.emit(DiagBuilder2::error(
                "The upper boundary of the length restriction is smaller than the lower boundary",
            ));
            return false;
        }
        self.set_length(id, acc, SizeRangeList::range(min, max), emitter)
    }

    /// Restrict the lengths of the values of a subtype.
    fn set_length(
        &self,
        id: SubtypeId,
        acc: &mut Option<SubtypeConstraint<'v>>,
        sizes: SizeRangeList,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        let st = &self[id];
        match SubtypeConstraint::from_sizes(st.kind, sizes) {
            Some(c) => {
                restrict(acc, &c);
                true
            }
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "Length subtyping is not allowed for type `{}'",
                    st.name
                )));
                false
            }
        }
    }

    fn add_pattern(
        &self,
        id: SubtypeId,
        acc: &mut Option<SubtypeConstraint<'v>>,
        text: &str,
        nocase: bool,
        emitter: &dyn DiagEmitter,
    ) -> bool {
        let st = &self[id];
        let pattern = StringPattern::new(text, nocase);
        let c = match st.kind {
            SubtypeKind::Charstring => SubtypeConstraint::charstring(Tree::pattern(pattern)),
            SubtypeKind::UCharstring => SubtypeConstraint::ucharstring(Tree::pattern(pattern)),
            _ => {
                emitter.emit(DiagBuilder2::error(format!(
                    "Pattern subtyping of type `{}' is not allowed",
                    st.name
                )));
                return false;
            }
        };
        restrict(acc, &c);
        true
    }

    /// Check a value against a subtype and report it if it is not allowed.
    ///
    /// Panics if the subtype has not been checked yet, or if the value is of
    /// a different category.
    pub fn check_value(&self, id: SubtypeId, v: &Value, emitter: &dyn DiagEmitter) {
        let st = &self[id];
        match st.state {
            CheckState::Unchecked => panic!("value checked against unchecked subtype"),
            CheckState::Checking => return,
            CheckState::Checked => (),
        }
        if st.is_error() {
            return;
        }
        if !st.constraint.is_value_element(v) {
            emitter.emit(DiagBuilder2::error(format!(
                "{} is not a valid value for type `{}' which has subtype {}",
                v,
                st.name,
                st.to_display_string()
            )));
        }
    }

    /// Check a template against a subtype and report the parts of it that
    /// are not allowed.
    pub fn check_template(&self, id: SubtypeId, t: &Template, emitter: &dyn DiagEmitter) {
        let st = &self[id];
        match st.state {
            CheckState::Unchecked => panic!("template checked against unchecked subtype"),
            CheckState::Checking => return,
            CheckState::Checked => (),
        }
        if st.is_error() {
            return;
        }
        match t.kind {
            TemplateKind::Omit
            | TemplateKind::AnyValue
            | TemplateKind::AnyOrOmit
            | TemplateKind::AnyOrNone
            | TemplateKind::ValueList(_)
            | TemplateKind::ComplementedList(_)
            | TemplateKind::Reference
            | TemplateKind::Error => (),
            TemplateKind::Value(v) => self.check_value(id, v, emitter),
            TemplateKind::List(_) => self.check_list_template(st, t, emitter),
            TemplateKind::Superset(_) | TemplateKind::Subset(_) => {
                if st.kind != SubtypeKind::SetOf {
                    emitter.emit(DiagBuilder2::error(format!(
                        "'{}' template matching mechanism can be used only with 'set of' types",
                        match t.kind {
                            TemplateKind::Superset(_) => "superset",
                            _ => "subset",
                        }
                    )));
                }
            }
            TemplateKind::Pattern(pk, ref text) => {
                self.check_pattern_template(st, pk, text, emitter)
            }
            TemplateKind::Named(_) | TemplateKind::Range => (),
        }
        if let Some(ref length) = t.length {
            if let Some(sizes) = length.to_size_range() {
                if st.constraint.is_length_range_empty(&sizes) {
                    emitter.emit(DiagBuilder2::error(format!(
                        "Template's length restriction {} is outside of the type's subtype \
                         constraint {}",
                        sizes,
                        st.to_display_string()
                    )));
                }
            }
        }
    }

    fn check_list_template(&self, st: &Subtype, t: &Template, emitter: &dyn DiagEmitter) {
        let length = match st.constraint.length() {
            Some(l) if !l.is_empty() => l,
            _ => return,
        };
        let count = t.nof_comps_not_anyornone();
        let min = length.get_minimal().and_then(|l| l.size()).unwrap_or(0);
        if !t.contains_anyornone() && count < min {
            emitter.emit(DiagBuilder2::error(format!(
                "At least {} elements must be present in the list",
                min
            )));
            return;
        }
        if let Some(&SizeLimit::Finite(max)) = length.get_maximal() {
            if count > max {
                emitter.emit(DiagBuilder2::error(format!(
                    "There must not be more than {} elements in the list",
                    max
                )));
            }
        }
    }

    fn check_pattern_template(
        &self,
        st: &Subtype,
        pk: PatternKind,
        text: &str,
        emitter: &dyn DiagEmitter,
    ) {
        let expected = match st.kind {
            SubtypeKind::Bitstring => PatternKind::Bitstring,
            SubtypeKind::Hexstring => PatternKind::Hexstring,
            SubtypeKind::Octetstring => PatternKind::Octetstring,
            SubtypeKind::Charstring => PatternKind::Charstring,
            SubtypeKind::UCharstring => PatternKind::UCharstring,
            _ => {
                emitter.emit(DiagBuilder2::error("Template is incompatible with subtype"));
                return;
            }
        };
        // A charstring pattern may be used for a universal charstring.
        let compatible = pk == expected
            || (pk == PatternKind::Charstring && expected == PatternKind::UCharstring);
        if !compatible {
            emitter.emit(DiagBuilder2::error("Template is incompatible with subtype"));
            return;
        }
        let length = match st.constraint.length() {
            Some(l) if !l.is_empty() => l,
            _ => return,
        };
        let (min_len, any_or_none) = pattern_min_length(pk, text);
        let min = length.get_minimal().and_then(|l| l.size()).unwrap_or(0);
        if !any_or_none && min_len < min {
            emitter.emit(DiagBuilder2::error(format!(
                "At least {} string elements must be present in the {}",
                min,
                pk.name()
            )));
            return;
        }
        if let Some(&SizeLimit::Finite(max)) = length.get_maximal() {
            if min_len > max {
                emitter.emit(DiagBuilder2::error(format!(
                    "There must not be more than {} string elements in the {}",
                    max,
                    pk.name()
                )));
            }
        }
    }
}

/// The result of building a subtype.
struct Built<'v> {
    constraint: SubtypeConstraint<'v>,
    root: Option<SubtypeConstraint<'v>>,
    extendable: bool,
    extension: Option<SubtypeConstraint<'v>>,
}

impl<'v> Built<'v> {
    fn plain(constraint: SubtypeConstraint<'v>) -> Built<'v> {
        Built {
            constraint,
            root: None,
            extendable: false,
            extension: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RangeClause<'v> {
    min: Bound<'v>,
    min_exclusive: bool,
    max: Bound<'v>,
    max_exclusive: bool,
}

/// Add the values of `c` to the constraint being built. Nothing built yet
/// acts as the empty set.
fn unite<'v>(acc: &mut Option<SubtypeConstraint<'v>>, c: &SubtypeConstraint<'v>) {
    match *acc {
        Some(ref mut a) => a.union(c),
        None => *acc = Some(c.clone()),
    }
}

/// Restrict the constraint being built to `c`. Nothing built yet acts as
/// the full set.
fn restrict<'v>(acc: &mut Option<SubtypeConstraint<'v>>, c: &SubtypeConstraint<'v>) {
    match *acc {
        Some(ref mut a) => a.intersection(c),
        None => *acc = Some(c.clone()),
    }
}

/// Convert a length restriction boundary. Reports values that are too
/// large or negative; yields `None` if the value is not an integer.
fn length_value(v: &Value, name: &str, emitter: &dyn DiagEmitter) -> Option<usize> {
    let i = match *v {
        Value::Integer(ref i) => i,
        _ => {
            emitter.emit(DiagBuilder2::error(format!(
                "The {} should be an integer value instead of {}",
                name, v
            )));
            return None;
        }
    };
    if *i > BigInt::from(MAX_LENGTH) {
        emitter.emit(DiagBuilder2::error(format!(
            "The {} should be less than `{}' instead of `{}'",
            name, MAX_LENGTH, i
        )));
        return None;
    }
    match i.to_usize() {
        Some(n) => Some(n),
        None => {
            emitter.emit(DiagBuilder2::error(format!(
                "The {} should be a non-negative integer value instead of `{}'",
                name, i
            )));
            None
        }
    }
}

fn integer_range<'v>(
    range: RangeClause,
    emitter: &dyn DiagEmitter,
) -> Option<SubtypeConstraint<'v>> {
    let limit = |b: Bound, which: &str| match b {
        Bound::MinusInfinity => Some(IntLimit::MinusInfinity),
        Bound::PlusInfinity => Some(IntLimit::PlusInfinity),
        Bound::Value(&Value::Integer(ref i)) => Some(IntLimit::Number(i.clone())),
        Bound::Value(v) => {
            emitter.emit(DiagBuilder2::error(format!(
                "{} boundary of integer subtype range must be an integer value instead of {}",
                which, v
            )));
            None
        }
    };
    let mut min = limit(range.min, "lower")?;
    let mut max = limit(range.max, "upper")?;
    if range.min_exclusive {
        match min {
            IntLimit::MinusInfinity => {
                emitter.emit(DiagBuilder2::error(
                    "invalid lower boundary, -infinity cannot be excluded from an integer \
                     subtype range",
                ));
                return None;
            }
            IntLimit::PlusInfinity => {
                emitter.emit(DiagBuilder2::error("!infinity is not a valid lower boundary"));
                return None;
            }
            IntLimit::Number(_) => min = min.next(),
        }
    } else if min == IntLimit::PlusInfinity {
        emitter.emit(DiagBuilder2::error("infinity is not a valid lower boundary"));
        return None;
    }
    if range.max_exclusive {
        match max {
            IntLimit::PlusInfinity => {
                emitter.emit(DiagBuilder2::error(
                    "invalid upper boundary, infinity cannot be excluded from an integer \
                     subtype range",
                ));
                return None;
            }
            IntLimit::MinusInfinity => {
                emitter.emit(DiagBuilder2::error("!-infinity is not a valid upper boundary"));
                return None;
            }
            IntLimit::Number(_) => max = max.previous(),
        }
    } else if max == IntLimit::MinusInfinity {
        emitter.emit(DiagBuilder2::error("-infinity is not a valid upper boundary"));
        return None;
    }
    if max < min {
        emitter.emit(DiagBuilder2::error(
            "lower boundary is bigger than upper boundary in integer subtype range",
        ));
        return None;
    }
    Some(SubtypeConstraint::integer(IntegerRangeList::range(min, max)))
}

fn float_range<'v>(range: RangeClause, emitter: &dyn DiagEmitter) -> Option<SubtypeConstraint<'v>> {
    let limit = |b: Bound, which: &str| match b {
        Bound::MinusInfinity => Some(RealLimit::minimum()),
        Bound::PlusInfinity => Some(RealLimit::maximum()),
        Bound::Value(&Value::Float(f)) if f.is_nan() => {
            emitter.emit(DiagBuilder2::error(format!(
                "{} boundary cannot be not_a_number in float subtype range",
                which
            )));
            None
        }
        Bound::Value(&Value::Float(f)) => Some(RealLimit::exact(f)),
        Bound::Value(v) => {
            emitter.emit(DiagBuilder2::error(format!(
                "{} boundary of float subtype range must be a float value instead of {}",
                which, v
            )));
            None
        }
    };
    let mut min = limit(range.min, "lower")?;
    let mut max = limit(range.max, "upper")?;
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
            "lower boundary is bigger than upper boundary in float subtype range",
        ));
        return None;
    }
    Some(SubtypeConstraint::float(RealRangeList::range(min, max)))
}

/// Fold a character range clause into the constraint being built. Ranges
/// form a permitted alphabet, so they can only be combined with other
/// ranges.
fn char_range<'v, C: RangeChar>(
    acc: &mut Option<SubtypeConstraint<'v>>,
    range: RangeClause,
    has_other: bool,
    emitter: &dyn DiagEmitter,
) -> bool {
    let type_name = C::TYPE_NAME;
    match (range.min, range.max) {
        (Bound::MinusInfinity, Bound::PlusInfinity) => {
            emitter.emit(DiagBuilder2::error(format!(
                "a range subtype of a {} cannot be (-infinity..infinity)",
                type_name
            )));
            return false;
        }
        (Bound::MinusInfinity, _) | (Bound::PlusInfinity, _) => {
            emitter.emit(DiagBuilder2::error(format!(
                "lower boundary of a {} subtype range cannot be -infinity",
                type_name
            )));
            return false;
        }
        (_, Bound::PlusInfinity) | (_, Bound::MinusInfinity) => {
            emitter.emit(DiagBuilder2::error(format!(
                "upper boundary of a {} subtype range cannot be infinity",
                type_name
            )));
            return false;
        }
        _ => (),
    }
    let limit = |b: Bound, which: &str| -> Option<Option<C>> {
        let v = match b {
            Bound::Value(v) => v,
            _ => unreachable!("infinite {} boundary", which),
        };
        let cp = match C::single_char(v) {
            Some(Some(cp)) => cp,
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "{} boundary of {} subtype range must be a string value instead of {}",
                    which, type_name, v
                )));
                return Some(None);
            }
            Some(None) => {
                emitter.emit(DiagBuilder2::error(format!(
                    "{} boundary of {} subtype range must be a single element string",
                    which, type_name
                )));
                return Some(None);
            }
        };
        match C::from_code_point(cp) {
            Some(c) => Some(Some(c)),
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "{} boundary of {} subtype range is an invalid char",
                    which, type_name
                )));
                Some(None)
            }
        }
    };
    let min = limit(range.min, "lower");
    let max = limit(range.max, "upper");
    let (mut min, mut max) = match (min, max) {
        (Some(Some(min)), Some(Some(max))) => (min, max),
        _ => return false,
    };
    if range.min_exclusive {
        if min == C::maximum() {
            emitter.emit(DiagBuilder2::error(format!(
                "exclusive lower boundary is not a legal {} character",
                type_name
            )));
            return false;
        }
        min = min.next();
    }
    if range.max_exclusive {
        if max == C::minimum() {
            emitter.emit(DiagBuilder2::error(format!(
                "exclusive upper boundary is not a legal {} character",
                type_name
            )));
            return false;
        }
        max = max.previous();
    }
    if max < min {
        emitter.emit(DiagBuilder2::error(format!(
            "lower boundary is bigger than upper boundary in {} subtype range",
            type_name
        )));
        return false;
    }
    let set = RangeList::range(min, max);
    let c = match *acc {
        None => {
            *acc = Some(C::wrap(Tree::alphabet(set, false)));
            return true;
        }
        Some(ref mut c) => c,
    };
    // Mixing with single values is reported once all clauses are folded.
    if has_other {
        return false;
    }
    let tree = match C::tree_mut(c) {
        Some(&mut Some(ref mut t)) => t,
        _ => unreachable!("range folded into a non-{} constraint", type_name),
    };
    tree.set_char_context(true);
    let merged = std::mem::replace(tree, Tree::Empty).union(Tree::alphabet(set, true));
    *tree = merged;
    tree.set_char_context(false);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::values::LengthRestriction;
    use ttsub_common::errors::{DiagCollector, Severity};

    fn int(i: i64) -> Value {
        Value::Integer(i.into())
    }

    fn range<'v>(min: &'v Value, max: &'v Value) -> Clause<'v> {
        Clause::Range {
            min: Bound::Value(min),
            min_exclusive: false,
            max: Bound::Value(max),
            max_exclusive: false,
        }
    }

    #[test]
    fn integer_with_parent() {
        let values = [int(1), int(10), int(5), int(20)];
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let parent = table.add_subtype("P", SubtypeKind::Integer);
        table[parent].set_clauses(vec![range(&values[2], &values[3])]);
        let child = table.add_subtype("C", SubtypeKind::Integer);
        table[child].set_parent(parent);
        table[child].set_clauses(vec![range(&values[0], &values[1])]);
        table.check(child, &diag);
        assert_eq!(table[parent].state(), CheckState::Checked);
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "The subtype restriction is not a subset of the restriction on the parent type. \
                 Subtype (1..10) is not subset of subtype (5..20)"
            ]
        );
        assert!(table[child].is_error());
    }

    #[test]
    fn value_checks() {
        let values = [int(5), int(10), int(3), int(7)];
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("T", SubtypeKind::Integer);
        table[id].set_clauses(vec![range(&values[0], &values[1])]);
        table.check(id, &diag);
        table.check_value(id, &values[2], &diag);
        table.check_value(id, &values[3], &diag);
        table.check_value(id, &Value::Unfoldable, &diag);
        assert_eq!(
            diag.messages(Severity::Error),
            vec!["3 is not a valid value for type `T' which has subtype (5..10)"]
        );
    }

    #[test]
    fn circular_references() {
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let a = table.add_subtype("A", SubtypeKind::Integer);
        let b = table.add_subtype("B", SubtypeKind::Integer);
        table[a].set_clauses(vec![Clause::TypeRef(b)]);
        table[b].set_clauses(vec![Clause::TypeRef(a)]);
        table.check_all(&diag);
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "While checking circular type references in subtype definitions: Circular \
                 reference: `B' -> `A' -> `B'"
            ]
        );
        assert!(table[a].is_error());
        assert!(table[b].is_error());
        assert_eq!(table[b].desc_full(), "subtype of `B'");
    }

    #[test]
    fn type_references() {
        let values = [int(1), int(3), int(10)];
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let small = table.add_subtype("Small", SubtypeKind::Integer);
        table[small].set_clauses(vec![range(&values[0], &values[1])]);
        let plain = table.add_subtype("Plain", SubtypeKind::Integer);
        let both = table.add_subtype("Both", SubtypeKind::Integer);
        table[both].set_clauses(vec![Clause::TypeRef(small), Clause::Single(&values[2])]);
        let bad = table.add_subtype("Bad", SubtypeKind::Integer);
        table[bad].set_clauses(vec![Clause::TypeRef(plain)]);
        table.check_all(&diag);
        assert_eq!(table[both].to_display_string(), "(1..3,10)");
        assert_eq!(
            diag.messages(Severity::Error),
            vec!["Type referenced by `Plain' does not have a subtype"]
        );
        assert!(table[bad].is_error());
    }

    #[test]
    fn full_and_empty_subtypes() {
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let full = table.add_subtype("F", SubtypeKind::Integer);
        table[full].set_clauses(vec![Clause::Range {
            min: Bound::MinusInfinity,
            min_exclusive: false,
            max: Bound::PlusInfinity,
            max_exclusive: false,
        }]);
        table.check(full, &diag);
        assert!(!table[full].constraint().is_restricted());
        assert_eq!(
            diag.messages(Severity::Warning),
            vec!["The subtype of type `F' is a full set, it does not constrain the root type."]
        );
        assert_eq!(diag.num_errors(), 0);
    }

    #[test]
    fn charstring_ranges() {
        let (a, c, x, z) = (
            Value::Charstring("a".into()),
            Value::Charstring("c".into()),
            Value::Charstring("x".into()),
            Value::Charstring("z".into()),
        );
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("C", SubtypeKind::Charstring);
        table[id].set_clauses(vec![range(&a, &c), range(&x, &z)]);
        table.check(id, &diag);
        assert!(diag.is_empty());
        table.check_value(id, &Value::Charstring("abzx".into()), &diag);
        assert!(diag.is_empty());
        table.check_value(id, &Value::Charstring("abd".into()), &diag);
        assert_eq!(diag.num_errors(), 1);

        let mixed = table.add_subtype("M", SubtypeKind::Charstring);
        table[mixed].set_clauses(vec![Clause::Single(&x), range(&a, &c)]);
        table.check(mixed, &diag);
        assert!(table[mixed].is_error());
        assert_eq!(
            diag.messages(Severity::Error)[1],
            "Mixing of value list and range subtyping is not allowed for type `M'"
        );
    }

    #[test]
    fn length_clauses() {
        let (two, four, big) = (int(2), int(4), int(1i64 << 40));
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("L", SubtypeKind::RecordOf);
        table[id].set_clauses(vec![Clause::Length {
            lower: &two,
            upper: Some(Bound::Value(&four)),
        }]);
        table.check(id, &diag);
        assert!(diag.is_empty());
        let st = &table[id];
        assert!(!st.zero_length_allowed());
        assert!(st.is_length_allowed(3));
        assert!(!st.is_length_allowed(5));
        assert_eq!(st.length_restriction(), None);

        let exact = table.add_subtype("E", SubtypeKind::Bitstring);
        table[exact].set_clauses(vec![Clause::Length {
            lower: &four,
            upper: None,
        }]);
        table.check(exact, &diag);
        assert_eq!(table[exact].length_restriction(), Some(4));

        let huge = table.add_subtype("H", SubtypeKind::Bitstring);
        table[huge].set_clauses(vec![Clause::Length {
            lower: &big,
            upper: None,
        }]);
        table.check(huge, &diag);
        assert!(table[huge].is_error());
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "The length restriction value should be less than `2147483647' instead of \
                 `1099511627776'"
            ]
        );

        let int_len = table.add_subtype("I", SubtypeKind::Integer);
        table[int_len].set_clauses(vec![Clause::Length {
            lower: &two,
            upper: None,
        }]);
        table.check(int_len, &diag);
        assert_eq!(
            diag.messages(Severity::Error)[1],
            "Length subtyping is not allowed for type `I'"
        );
    }

    /// Check a single subtype `S` and return whether it is erroneous, along
    /// with the errors reported.
    fn check_clauses(kind: SubtypeKind, clauses: Vec<Clause>) -> (bool, Vec<String>) {
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("S", kind);
        table[id].set_clauses(clauses);
        table.check(id, &diag);
        (table[id].is_error(), diag.messages(Severity::Error))
    }

    #[test]
    fn rejected_clauses_are_reported() {
        let (one, three, a, z) = (
            int(1),
            int(3),
            Value::Charstring("a".into()),
            Value::Charstring("z".into()),
        );
        let half = Value::Float(0.5);
        let length = Clause::Length {
            lower: &one,
            upper: Some(Bound::Value(&three)),
        };
        let pattern = Clause::Pattern {
            text: "[a-z]+".into(),
            nocase: false,
        };

        let mixing =
            vec!["Mixing of length/pattern and range subtyping is not allowed for type `S'"];
        assert_eq!(
            check_clauses(SubtypeKind::Charstring, vec![length.clone(), range(&a, &z)]),
            (true, mixing.iter().map(|s| s.to_string()).collect())
        );
        assert_eq!(
            check_clauses(SubtypeKind::UCharstring, vec![pattern, range(&a, &z)]),
            (true, mixing.iter().map(|s| s.to_string()).collect())
        );
        // The other order is fine.
        let (is_error, errors) =
            check_clauses(SubtypeKind::Charstring, vec![range(&a, &z), length]);
        assert!(!is_error);
        assert!(errors.is_empty());

        assert_eq!(
            check_clauses(
                SubtypeKind::Bitstring,
                vec![Clause::Length {
                    lower: &one,
                    upper: Some(Bound::MinusInfinity),
                }]
            ),
            (
                true,
                vec!["The upper boundary of the length restriction cannot be -infinity".to_string()]
            )
        );

        let (is_error, errors) = check_clauses(
            SubtypeKind::Bitstring,
            vec![Clause::Length {
                lower: &a,
                upper: None,
            }],
        );
        assert!(is_error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("The length restriction value should be an integer value"));

        let cases: Vec<(SubtypeKind, Clause, &str)> = vec![
            (
                SubtypeKind::Integer,
                range(&a, &three),
                "lower boundary of integer subtype range must be an integer value",
            ),
            (
                SubtypeKind::Float,
                range(&half, &one),
                "upper boundary of float subtype range must be a float value",
            ),
            (
                SubtypeKind::Charstring,
                range(&a, &one),
                "upper boundary of charstring subtype range must be a string value",
            ),
            (
                SubtypeKind::Integer,
                Clause::Single(&a),
                "charstring value",
            ),
        ];
        for (kind, clause, expected) in cases {
            let (is_error, errors) = check_clauses(kind, vec![clause]);
            assert!(is_error, "{} subtype should be erroneous", kind);
            assert_eq!(errors.len(), 1, "{:?}", errors);
            assert!(errors[0].starts_with(expected), "{}", errors[0]);
        }
    }

    #[test]
    fn list_templates() {
        let (two, four) = (int(2), int(4));
        let elem = int(0);
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("L", SubtypeKind::RecordOf);
        table[id].set_clauses(vec![Clause::Length {
            lower: &two,
            upper: Some(Bound::Value(&four)),
        }]);
        table.check(id, &diag);

        let one = Template::new(TemplateKind::List(vec![Template::new(TemplateKind::Value(
            &elem,
        ))]));
        table.check_template(id, &one, &diag);
        let one_or_more = Template::new(TemplateKind::List(vec![
            Template::new(TemplateKind::Value(&elem)),
            Template::new(TemplateKind::AnyOrNone),
        ]));
        table.check_template(id, &one_or_more, &diag);
        let five = Template::new(TemplateKind::List(
            (0..5)
                .map(|_| Template::new(TemplateKind::Value(&elem)))
                .collect(),
        ));
        table.check_template(id, &five, &diag);
        let any = Template::new(TemplateKind::AnyValue).with_length(LengthRestriction::single(7));
        table.check_template(id, &any, &diag);
        let subset = Template::new(TemplateKind::Subset(vec![]));
        table.check_template(id, &subset, &diag);
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "At least 2 elements must be present in the list",
                "There must not be more than 4 elements in the list",
                "Template's length restriction (7) is outside of the type's subtype constraint \
                 length(2..4)",
                "'subset' template matching mechanism can be used only with 'set of' types",
            ]
        );
    }

    #[test]
    fn pattern_templates() {
        let (three, five) = (int(3), int(5));
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("S", SubtypeKind::Charstring);
        table[id].set_clauses(vec![Clause::Length {
            lower: &three,
            upper: Some(Bound::Value(&five)),
        }]);
        table.check(id, &diag);
        let short = Template::new(TemplateKind::Pattern(PatternKind::Charstring, "a?".into()));
        table.check_template(id, &short, &diag);
        let open = Template::new(TemplateKind::Pattern(PatternKind::Charstring, "a*".into()));
        table.check_template(id, &open, &diag);
        let long = Template::new(TemplateKind::Pattern(
            PatternKind::Charstring,
            "??????".into(),
        ));
        table.check_template(id, &long, &diag);
        let bits = Template::new(TemplateKind::Pattern(PatternKind::Bitstring, "1*".into()));
        table.check_template(id, &bits, &diag);
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "At least 3 string elements must be present in the charstring",
                "There must not be more than 5 string elements in the charstring",
                "Template is incompatible with subtype",
            ]
        );
    }

    #[test]
    fn asn_extension() {
        let diag = DiagCollector::new();
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("A", SubtypeKind::Integer);
        table[id].set_asn_constraints(AsnConstraints {
            root: Some(SubtypeConstraint::integer(IntegerRangeList::range(1, 5))),
            extendable: true,
            extension: Some(SubtypeConstraint::integer(IntegerRangeList::single(8))),
        });
        table.check(id, &diag);
        let st = &table[id];
        assert_eq!(st.to_display_string(), "(1..5), ..., (8)");
        assert_eq!(format!("{}", st.constraint()), "(1..5,8)");
        assert_eq!(st.get_int_limit(true, &diag), IntLimit::from(5));

        let printable = table.add_subtype("P", SubtypeKind::Charstring);
        table[printable].set_asn_type(AsnStringType::Printable);
        table.check(printable, &diag);
        table.check_value(printable, &Value::Charstring("a;b".into()), &diag);
        assert_eq!(diag.num_errors(), 1);
    }

    #[test]
    #[should_panic]
    fn unchecked_value_check() {
        let mut table = SubtypeTable::new();
        let id = table.add_subtype("T", SubtypeKind::Integer);
        table.check_value(id, &int(1), &DiagCollector::new());
    }
}
