// Copyright (c) 2016-2020 Fabian Schuiki

//! This crate implements the subtype constraint algebra of the ttsub engine.
//!
//! A subtype restricts the values of its root type, for example an integer
//! type to `(1 .. 10)` or a charstring type to `length(3) pattern "a?c"`.
//! The restrictions of each value category are represented as sets closed
//! under union, intersection, and complement. Questions that cannot be
//! decided exactly, such as whether two patterns overlap, are answered with
//! a `TriBool`.
//!
//! The `subtype` module builds these sets from the restriction clauses of a
//! type declaration and checks values and templates against them. The
//! `schema` module emits equivalent JSON schema restrictions.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod tribool;
pub mod ustring;
pub mod limits;
pub mod rangelist;
pub mod real;
pub mod masks;
pub mod bitstring;
pub mod pattern;
pub mod strvalues;
pub mod tree;
pub mod values;
pub mod recof;
pub mod constraint;
pub mod asn;
pub mod subtype;
pub mod schema;

pub use crate::constraint::{ConstraintSet, SetAlgebra, SubtypeConstraint, SubtypeKind};
pub use crate::subtype::{
    AsnConstraints, Bound, CheckState, Clause, Subtype, SubtypeId, SubtypeTable,
};
pub use crate::tribool::TriBool;
pub use crate::values::{Template, TemplateKind, Value};
