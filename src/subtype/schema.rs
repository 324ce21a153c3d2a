// Copyright (c) 2016-2020 Fabian Schuiki

//! JSON schema restrictions equivalent to a subtype.
//!
//! The schema is derived from the restriction clauses as they were written,
//! not from the computed constraint. References to other types are followed
//! and their value lists and ranges inlined.

use crate::constraint::{ConstraintSet, SubtypeConstraint, SubtypeKind};
use crate::limits::{IntLimit, Limit, RealLimit, SizeLimit};
use crate::pattern::StringPattern;
use crate::rangelist::{IntegerRangeList, SizeRangeList};
use crate::real::RealRangeList;
use crate::subtype::{Bound, CheckState, Clause, SubtypeId, SubtypeTable};
use crate::values::Value;
use itertools::Itertools;
use num::{BigInt, ToPrimitive};
use serde_json::{Map, Value as Json};

type Object = Map<String, Json>;

/// Emit the schema restrictions of a subtype as a JSON object.
///
/// Types without restriction clauses and erroneous subtypes yield an empty
/// object. Panics if the subtype has not been checked yet.
pub fn emit_schema(table: &SubtypeTable, id: SubtypeId) -> Json {
    let st = &table[id];
    if st.state() != CheckState::Checked {
        panic!("schema requested for unchecked subtype of `{}`", st.name());
    }
    if st.is_error() || st.clauses().is_none() {
        return Json::Object(Object::new());
    }
    let mut obj = Object::new();
    if st.kind() == SubtypeKind::Float {
        emit_float(table, id, &mut obj);
    } else {
        emit_clauses(table, id, true, &mut obj);
    }
    trace!("schema of `{}`: {}", st.name(), Json::Object(obj.clone()));
    Json::Object(obj)
}

/// Floats allow the special values only as strings, so they are split off
/// into a separate `enum` beside the number restrictions.
fn emit_float(table: &SubtypeTable, id: SubtypeId, obj: &mut Object) {
    let st = &table[id];
    let allows = |f: f64| match *st.constraint().set() {
        ConstraintSet::Float(Some(ref s)) => s.is_element(f),
        _ => true,
    };
    let mut special = vec![];
    if allows(std::f64::NAN) {
        special.push(Json::from("not_a_number"));
    }
    if allows(std::f64::INFINITY) {
        special.push(Json::from("infinity"));
    }
    if allows(std::f64::NEG_INFINITY) {
        special.push(Json::from("-infinity"));
    }
    let has_number = st
        .clauses()
        .unwrap_or(&[])
        .iter()
        .any(|clause| match *clause {
            Clause::Single(&Value::Float(f)) => f.is_finite(),
            Clause::Range { min, max, .. } => {
                let min_ok = match min {
                    Bound::PlusInfinity => false,
                    Bound::Value(&Value::Float(f)) => f != std::f64::INFINITY,
                    _ => true,
                };
                let max_ok = match max {
                    Bound::MinusInfinity => false,
                    Bound::Value(&Value::Float(f)) => f != std::f64::NEG_INFINITY,
                    _ => true,
                };
                min_ok || max_ok
            }
            _ => false,
        });

    let mut number = Object::new();
    if has_number {
        number.insert("type".into(), Json::from("number"));
        emit_clauses(table, id, false, &mut number);
    }
    let mut specials = Object::new();
    if !special.is_empty() {
        specials.insert("enum".into(), Json::Array(special));
    }
    match (has_number, specials.is_empty()) {
        (true, false) => {
            obj.insert(
                "anyOf".into(),
                Json::Array(vec![Json::Object(number), Json::Object(specials)]),
            );
        }
        (true, true) => obj.extend(number),
        (false, _) => obj.extend(specials),
    }
}

fn emit_clauses(table: &SubtypeTable, id: SubtypeId, allow_special_float: bool, obj: &mut Object) {
    let st = &table[id];
    let kind = st.kind();
    let clauses = st.clauses().unwrap_or(&[]);
    let mut has_value_list = false;
    let mut num_ranges = 0;
    let mut patterns = vec![];
    for clause in clauses {
        match *clause {
            Clause::Single(_) => has_value_list = true,
            Clause::Range { .. } => num_ranges += 1,
            Clause::Length { lower, upper } => {
                let (min_key, max_key) = if kind.is_recof() {
                    ("minItems", "maxItems")
                } else {
                    ("minLength", "maxLength")
                };
                obj.insert(min_key.into(), value_to_json(lower, true));
                match upper {
                    None => {
                        obj.insert(max_key.into(), value_to_json(lower, true));
                    }
                    Some(Bound::Value(v)) => {
                        obj.insert(max_key.into(), value_to_json(v, true));
                    }
                    Some(_) => (),
                }
            }
            Clause::Pattern { ref text, nocase } => {
                match StringPattern::new(text.as_str(), nocase).to_json_regex() {
                    Some(re) => patterns.push(re),
                    None => debug!("pattern `{}` has no schema equivalent", text),
                }
            }
            Clause::TypeRef(_) => (),
        }
    }

    let is_number = kind == SubtypeKind::Integer || kind == SubtypeKind::Float;
    let need_any_of = is_number && num_ranges + has_value_list as usize > 1;
    let mut alternatives = vec![];
    if has_value_list {
        let mut values = vec![];
        collect_values(table, id, allow_special_float, &mut values);
        let mut list = Object::new();
        list.insert("enum".into(), Json::Array(values));
        alternatives.push(list);
    }
    if num_ranges > 0 {
        if is_number {
            collect_number_ranges(table, id, &mut alternatives);
        } else {
            let mut set = String::new();
            collect_string_ranges(table, id, &mut set);
            patterns.push(format!("^[{}]*$", set));
        }
    }
    if need_any_of {
        obj.insert(
            "anyOf".into(),
            Json::Array(alternatives.into_iter().map(Json::Object).collect()),
        );
    } else {
        for alt in alternatives {
            obj.extend(alt);
        }
    }

    match patterns.len() {
        0 => (),
        1 => {
            obj.insert("pattern".into(), Json::from(patterns.remove(0)));
        }
        _ => {
            let all: Vec<_> = patterns
                .into_iter()
                .map(|p| {
                    let mut o = Object::new();
                    o.insert("pattern".into(), Json::from(p));
                    Json::Object(o)
                })
                .collect();
            obj.insert("allOf".into(), Json::Array(all));
        }
    }
}

fn collect_values(
    table: &SubtypeTable,
    id: SubtypeId,
    allow_special_float: bool,
    into: &mut Vec<Json>,
) {
    for clause in table[id].clauses().unwrap_or(&[]) {
        match *clause {
            Clause::Single(v) => {
                if let Value::Float(f) = *v {
                    if !f.is_finite() && !allow_special_float {
                        continue;
                    }
                }
                into.push(value_to_json(v, allow_special_float));
            }
            Clause::TypeRef(other) => collect_values(table, other, allow_special_float, into),
            _ => (),
        }
    }
}

fn collect_number_ranges(table: &SubtypeTable, id: SubtypeId, into: &mut Vec<Object>) {
    for clause in table[id].clauses().unwrap_or(&[]) {
        match *clause {
            Clause::TypeRef(other) => collect_number_ranges(table, other, into),
            Clause::Range {
                min,
                min_exclusive,
                max,
                max_exclusive,
            } => {
                let mut range = Object::new();
                if let Some(v) = finite_bound(min) {
                    range.insert("minimum".into(), value_to_json(v, false));
                    range.insert("exclusiveMinimum".into(), Json::Bool(min_exclusive));
                }
                if let Some(v) = finite_bound(max) {
                    range.insert("maximum".into(), value_to_json(v, false));
                    range.insert("exclusiveMaximum".into(), Json::Bool(max_exclusive));
                }
                into.push(range);
            }
            _ => (),
        }
    }
}

/// The value of a bound, unless it is infinite. Infinite bounds are left
/// out of the schema.
fn finite_bound<'v>(b: Bound<'v>) -> Option<&'v Value> {
    match b {
        Bound::Value(&Value::Float(f)) if f.is_infinite() => None,
        Bound::Value(v) => Some(v),
        _ => None,
    }
}

fn collect_string_ranges(table: &SubtypeTable, id: SubtypeId, into: &mut String) {
    for clause in table[id].clauses().unwrap_or(&[]) {
        match *clause {
            Clause::TypeRef(other) => collect_string_ranges(table, other, into),
            Clause::Range {
                min: Bound::Value(min),
                max: Bound::Value(max),
                ..
            } => {
                into.push_str(&native_string(min));
                into.push('-');
                into.push_str(&native_string(max));
            }
            _ => (),
        }
    }
}

fn native_string(v: &Value) -> String {
    match *v {
        Value::Charstring(ref s) => s.clone(),
        Value::UCharstring(ref s) => s
            .code_points()
            .iter()
            .filter_map(|&cp| std::char::from_u32(cp))
            .collect(),
        _ => String::new(),
    }
}

/// Convert a value into its JSON encoding.
pub fn value_to_json(v: &Value, allow_special_float: bool) -> Json {
    match *v {
        Value::Integer(ref i) => match i.to_i64() {
            Some(n) => Json::from(n),
            None => Json::from(i.to_string()),
        },
        Value::Float(f) if f.is_nan() && allow_special_float => Json::from("not_a_number"),
        Value::Float(f) if f == std::f64::INFINITY && allow_special_float => {
            Json::from("infinity")
        }
        Value::Float(f) if f == std::f64::NEG_INFINITY && allow_special_float => {
            Json::from("-infinity")
        }
        Value::Float(f) => Json::from(f),
        Value::Boolean(b) => Json::Bool(b),
        Value::Verdict(x) => Json::from(x.name()),
        Value::Bitstring(ref s)
        | Value::Hexstring(ref s)
        | Value::Octetstring(ref s)
        | Value::Charstring(ref s)
        | Value::Enumerated(ref s) => Json::from(s.as_str()),
        Value::UCharstring(_) => Json::from(native_string(v)),
        Value::Objid(ref ids) => Json::from(ids.iter().join(".")),
        Value::Record(ref fields) | Value::Set(ref fields) => Json::Object(
            fields
                .iter()
                .map(|(name, v)| (name.clone(), value_to_json(v, allow_special_float)))
                .collect(),
        ),
        Value::Union(ref name, ref v) => {
            let mut o = Object::new();
            o.insert(name.clone(), value_to_json(v, allow_special_float));
            Json::Object(o)
        }
        Value::RecordOf(ref vs) | Value::SetOf(ref vs) => Json::Array(
            vs.iter()
                .map(|v| value_to_json(v, allow_special_float))
                .collect(),
        ),
        Value::Function(_)
        | Value::Altstep(_)
        | Value::Testcase(_)
        | Value::Unfoldable
        | Value::Error => Json::Null,
    }
}

/// Read the numeric range or length bounds of a schema back into a
/// constraint of the category.
///
/// Value lists and patterns are not read. Returns `None` if the schema
/// holds no bounds the category can carry, or a bound is malformed.
pub fn range_from_schema(kind: SubtypeKind, schema: &Json) -> Option<SubtypeConstraint<'static>> {
    let obj = schema.as_object()?;
    match kind {
        SubtypeKind::Integer => {
            let mut set = IntegerRangeList::empty();
            for range in number_ranges(obj) {
                set = set.union(&int_range(range)?);
            }
            if set.is_empty() {
                return None;
            }
            Some(SubtypeConstraint::integer(set))
        }
        SubtypeKind::Float => {
            let mut set = RealRangeList::empty();
            let mut found = false;
            let alternatives = match obj.get("anyOf").and_then(Json::as_array) {
                Some(alts) => alts.iter().filter_map(Json::as_object).collect(),
                None => vec![obj],
            };
            for alt in alternatives {
                for range in number_ranges(alt) {
                    set = set.union(&real_range(range)?);
                    found = true;
                }
                for special in alt.get("enum").and_then(Json::as_array).into_iter().flatten() {
                    let f = match special.as_str() {
                        Some("not_a_number") => std::f64::NAN,
                        Some("infinity") => std::f64::INFINITY,
                        Some("-infinity") => std::f64::NEG_INFINITY,
                        _ => continue,
                    };
                    set = set.union(&RealRangeList::from_value(f));
                    found = true;
                }
            }
            if !found {
                return None;
            }
            Some(SubtypeConstraint::float(set))
        }
        _ if kind.has_length() => {
            let (min_key, max_key) = if kind.is_recof() {
                ("minItems", "maxItems")
            } else {
                ("minLength", "maxLength")
            };
            let min = match obj.get(min_key) {
                Some(v) => v.as_u64()?.to_usize()?,
                None => return None,
            };
            let max = match obj.get(max_key) {
                Some(v) => SizeLimit::Finite(v.as_u64()?.to_usize()?),
                None => SizeLimit::Infinity,
            };
            if max < SizeLimit::Finite(min) {
                return None;
            }
            SubtypeConstraint::from_sizes(kind, SizeRangeList::range(min, max))
        }
        _ => None,
    }
}

/// The objects of a schema that carry numeric bounds.
fn number_ranges(obj: &Object) -> Vec<&Object> {
    let has_bounds = |o: &Object| o.contains_key("minimum") || o.contains_key("maximum");
    match obj.get("anyOf").and_then(Json::as_array) {
        Some(alts) => alts
            .iter()
            .filter_map(Json::as_object)
            .filter(|o| has_bounds(o))
            .collect(),
        None if has_bounds(obj) => vec![obj],
        None => vec![],
    }
}

fn exclusive(obj: &Object, key: &str) -> bool {
    obj.get(key).and_then(Json::as_bool).unwrap_or(false)
}

fn json_int(v: &Json) -> Option<BigInt> {
    match *v {
        Json::Number(ref n) => n.as_i64().map(BigInt::from),
        Json::String(ref s) => s.parse().ok(),
        _ => None,
    }
}

fn int_range(obj: &Object) -> Option<IntegerRangeList> {
    let mut min = match obj.get("minimum") {
        Some(v) => IntLimit::Number(json_int(v)?),
        None => IntLimit::MinusInfinity,
    };
    let mut max = match obj.get("maximum") {
        Some(v) => IntLimit::Number(json_int(v)?),
        None => IntLimit::PlusInfinity,
    };
    if exclusive(obj, "exclusiveMinimum") && obj.contains_key("minimum") {
        min = min.next();
    }
    if exclusive(obj, "exclusiveMaximum") && obj.contains_key("maximum") {
        max = max.previous();
    }
    if max < min {
        return Some(IntegerRangeList::empty());
    }
    Some(IntegerRangeList::range(min, max))
}

fn real_range(obj: &Object) -> Option<RealRangeList> {
    let mut min = match obj.get("minimum") {
        Some(v) => RealLimit::exact(v.as_f64()?),
        None => RealLimit::minimum(),
    };
    let mut max = match obj.get("maximum") {
        Some(v) => RealLimit::exact(v.as_f64()?),
        None => RealLimit::maximum(),
    };
    if exclusive(obj, "exclusiveMinimum") && obj.contains_key("minimum") {
        min = min.next();
    }
    if exclusive(obj, "exclusiveMaximum") && obj.contains_key("maximum") {
        max = max.previous();
    }
    if max < min {
        return Some(RealRangeList::empty());
    }
    Some(RealRangeList::range(min, max))
}
