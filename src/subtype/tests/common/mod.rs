// Copyright (c) 2016-2020 Fabian Schuiki
#![allow(dead_code)]

//! Utilities for subtype tests.

pub extern crate simple_logger;
pub extern crate ttsub_common;
pub extern crate ttsub_subtype as subtype;
pub use crate::subtype::*;
pub use crate::ttsub_common::errors::{DiagCollector, Severity};
use typed_arena::Arena;

/// The values referenced by the restriction clauses of a test.
pub struct Values {
    arena: Arena<Value>,
}

impl Values {
    pub fn new() -> Values {
        simple_logger::init().is_ok();
        Values {
            arena: Arena::new(),
        }
    }

    pub fn alloc(&self, v: Value) -> &Value {
        self.arena.alloc(v)
    }

    pub fn int(&self, i: i64) -> &Value {
        self.alloc(Value::Integer(i.into()))
    }

    pub fn float(&self, f: f64) -> &Value {
        self.alloc(Value::Float(f))
    }

    pub fn chars(&self, s: &str) -> &Value {
        self.alloc(Value::Charstring(s.into()))
    }

    pub fn ints(&self, is: &[i64]) -> &Value {
        self.alloc(Value::RecordOf(
            is.iter().map(|&i| Value::Integer(i.into())).collect(),
        ))
    }
}

/// An inclusive range clause.
pub fn range<'v>(min: &'v Value, max: &'v Value) -> Clause<'v> {
    Clause::Range {
        min: Bound::Value(min),
        min_exclusive: false,
        max: Bound::Value(max),
        max_exclusive: false,
    }
}

/// A length clause from `min` to `max`.
pub fn length<'v>(min: &'v Value, max: &'v Value) -> Clause<'v> {
    Clause::Length {
        lower: min,
        upper: Some(Bound::Value(max)),
    }
}
