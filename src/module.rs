// Copyright (c) 2016-2020 Fabian Schuiki

//! Module descriptions read from JSON.
//!
//! A module lists type declarations with their restriction clauses, and a
//! number of values and templates to check against these types:
//!
//! ```json
//! {
//!   "types": [
//!     { "name": "Byte", "kind": "integer", "clauses": [{ "range": { "min": 0, "max": 255 } }] },
//!     { "name": "Small", "kind": "integer", "parent": "Byte", "clauses": [{ "single": 7 }] }
//!   ],
//!   "checks": [{ "type": "Small", "value": 8 }]
//! }
//! ```

use crate::common::errors::{DiagBuilder2, DiagEmitter};
use crate::subtype::masks::Verdict;
use crate::subtype::ustring::UString;
use crate::subtype::values::{LengthRestriction, PatternKind};
use crate::subtype::{
    Bound, Clause, SubtypeId, SubtypeKind, SubtypeTable, Template, TemplateKind, Value,
};
use num::BigInt;
use serde::Deserialize;
use serde_json::Value as Json;
use typed_arena::Arena;

/// A module as it appears in the input.
#[derive(Debug, Deserialize)]
pub struct Module {
    #[serde(default)]
    pub types: Vec<TypeDecl>,
    #[serde(default)]
    pub checks: Vec<Check>,
}

#[derive(Debug, Deserialize)]
pub struct TypeDecl {
    pub name: String,
    pub kind: String,
    #[serde(default)]
    pub parent: Option<String>,
    /// The restriction clauses. Absent for types declared without a
    /// restriction.
    #[serde(default)]
    pub clauses: Option<Vec<ClauseDecl>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClauseDecl {
    Single(Json),
    /// A reference to another type.
    Type(String),
    Range {
        min: Json,
        max: Json,
        #[serde(default)]
        min_exclusive: bool,
        #[serde(default)]
        max_exclusive: bool,
    },
    Length {
        min: Json,
        #[serde(default)]
        max: Option<Json>,
    },
    Pattern {
        text: String,
        #[serde(default)]
        nocase: bool,
    },
}

/// A value or template to check against a type.
#[derive(Debug, Deserialize)]
pub struct Check {
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub value: Option<Json>,
    #[serde(default)]
    pub template: Option<TemplateDecl>,
    /// The length restriction of the template, `[min]` or `[min, max]`.
    #[serde(default)]
    pub length: Option<Vec<usize>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateDecl {
    Value(Json),
    Omit,
    AnyValue,
    AnyOrOmit,
    AnyOrNone,
    ValueList(Vec<TemplateDecl>),
    Complement(Vec<TemplateDecl>),
    List(Vec<TemplateDecl>),
    Superset(Vec<TemplateDecl>),
    Subset(Vec<TemplateDecl>),
    Pattern(String),
}

impl Module {
    pub fn from_str(input: &str) -> serde_json::Result<Module> {
        serde_json::from_str(input)
    }
}

/// The types of a module, resolved into a subtype table.
pub struct Context<'v> {
    values: &'v Arena<Value>,
    pub table: SubtypeTable<'v>,
}

impl<'v> Context<'v> {
    pub fn new(values: &'v Arena<Value>) -> Context<'v> {
        Context {
            values,
            table: SubtypeTable::new(),
        }
    }

    pub fn lookup(&self, name: &str) -> Option<SubtypeId> {
        self.table.lookup(name)
    }

    /// Add the types of a module to the table. Declarations that cannot be
    /// resolved are reported and left without restriction.
    pub fn add_module(&mut self, module: &Module, emitter: &dyn DiagEmitter) -> Result<(), ()> {
        let mut failed = false;
        let mut ids = vec![];
        for decl in &module.types {
            let kind = match SubtypeKind::from_name(&decl.kind) {
                Some(k) => k,
                None => {
                    emitter.emit(DiagBuilder2::error(format!(
                        "`{}' is not a type category",
                        decl.kind
                    )));
                    failed = true;
                    continue;
                }
            };
            if self.table.lookup(&decl.name).is_some() {
                emitter.emit(DiagBuilder2::error(format!(
                    "Type `{}' is declared more than once",
                    decl.name
                )));
                failed = true;
                continue;
            }
            let id = self.table.add_subtype(decl.name.as_str(), kind);
            ids.push((id, decl));
        }
        for (id, decl) in ids {
            if self.resolve(id, decl, emitter).is_err() {
                failed = true;
            }
        }
        if failed {
            Err(())
        } else {
            Ok(())
        }
    }

    fn resolve(
        &mut self,
        id: SubtypeId,
        decl: &TypeDecl,
        emitter: &dyn DiagEmitter,
    ) -> Result<(), ()> {
        let kind = self.table[id].kind();
        if let Some(ref parent) = decl.parent {
            let pid = self.resolve_name(parent, emitter)?;
            if self.table[pid].kind() != kind {
                emitter.emit(DiagBuilder2::error(format!(
                    "Type `{}' cannot be derived from `{}', which is of type {}",
                    decl.name,
                    parent,
                    self.table[pid].kind()
                )));
                return Err(());
            }
            self.table[id].set_parent(pid);
        }
        if let Some(ref clauses) = decl.clauses {
            let mut resolved = vec![];
            for clause in clauses {
                resolved.push(self.clause(kind, clause, emitter)?);
            }
            trace!("clauses of `{}`: {:?}", decl.name, resolved);
            self.table[id].set_clauses(resolved);
        }
        Ok(())
    }

    fn resolve_name(&self, name: &str, emitter: &dyn DiagEmitter) -> Result<SubtypeId, ()> {
        match self.lookup(name) {
            Some(id) => Ok(id),
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "There is no type named `{}'",
                    name
                )));
                Err(())
            }
        }
    }

    fn clause(
        &self,
        kind: SubtypeKind,
        clause: &ClauseDecl,
        emitter: &dyn DiagEmitter,
    ) -> Result<Clause<'v>, ()> {
        Ok(match *clause {
            ClauseDecl::Single(ref v) => Clause::Single(self.value(kind, v, emitter)?),
            ClauseDecl::Type(ref name) => Clause::TypeRef(self.resolve_name(name, emitter)?),
            ClauseDecl::Range {
                ref min,
                ref max,
                min_exclusive,
                max_exclusive,
            } => Clause::Range {
                min: self.bound(kind, min, emitter)?,
                min_exclusive,
                max: self.bound(kind, max, emitter)?,
                max_exclusive,
            },
            ClauseDecl::Length { ref min, ref max } => Clause::Length {
                lower: self.value(SubtypeKind::Integer, min, emitter)?,
                upper: match *max {
                    Some(ref max) => Some(self.bound(SubtypeKind::Integer, max, emitter)?),
                    None => None,
                },
            },
            ClauseDecl::Pattern { ref text, nocase } => Clause::Pattern {
                text: text.clone(),
                nocase,
            },
        })
    }

    fn bound(
        &self,
        kind: SubtypeKind,
        v: &Json,
        emitter: &dyn DiagEmitter,
    ) -> Result<Bound<'v>, ()> {
        match v.as_str() {
            Some("-infinity") => Ok(Bound::MinusInfinity),
            Some("infinity") => Ok(Bound::PlusInfinity),
            _ => Ok(Bound::Value(self.value(kind, v, emitter)?)),
        }
    }

    /// Convert a JSON value into a value of the given category.
    pub fn value(
        &self,
        kind: SubtypeKind,
        v: &Json,
        emitter: &dyn DiagEmitter,
    ) -> Result<&'v Value, ()> {
        match json_to_value(kind, v) {
            Some(v) => Ok(self.values.alloc(v)),
            None => {
                emitter.emit(DiagBuilder2::error(format!(
                    "`{}' is not a valid {} value",
                    v,
                    kind
                )));
                Err(())
            }
        }
    }

    /// Convert a template description of the given category.
    pub fn template(
        &self,
        kind: SubtypeKind,
        t: &TemplateDecl,
        emitter: &dyn DiagEmitter,
    ) -> Result<Template<'v>, ()> {
        let list = |ts: &[TemplateDecl]| -> Result<Vec<Template<'v>>, ()> {
            ts.iter()
                .map(|t| self.element_template(t, emitter))
                .collect()
        };
        Ok(Template::new(match *t {
            TemplateDecl::Value(ref v) => TemplateKind::Value(self.value(kind, v, emitter)?),
            TemplateDecl::Omit => TemplateKind::Omit,
            TemplateDecl::AnyValue => TemplateKind::AnyValue,
            TemplateDecl::AnyOrOmit => TemplateKind::AnyOrOmit,
            TemplateDecl::AnyOrNone => TemplateKind::AnyOrNone,
            TemplateDecl::ValueList(ref ts) => TemplateKind::ValueList(
                ts.iter()
                    .map(|t| self.template(kind, t, emitter))
                    .collect::<Result<_, _>>()?,
            ),
            TemplateDecl::Complement(ref ts) => TemplateKind::ComplementedList(
                ts.iter()
                    .map(|t| self.template(kind, t, emitter))
                    .collect::<Result<_, _>>()?,
            ),
            TemplateDecl::List(ref ts) => TemplateKind::List(list(ts)?),
            TemplateDecl::Superset(ref ts) => TemplateKind::Superset(list(ts)?),
            TemplateDecl::Subset(ref ts) => TemplateKind::Subset(list(ts)?),
            TemplateDecl::Pattern(ref text) => {
                let pk = match kind {
                    SubtypeKind::Bitstring => PatternKind::Bitstring,
                    SubtypeKind::Hexstring => PatternKind::Hexstring,
                    SubtypeKind::Octetstring => PatternKind::Octetstring,
                    SubtypeKind::UCharstring => PatternKind::UCharstring,
                    _ => PatternKind::Charstring,
                };
                TemplateKind::Pattern(pk, text.clone())
            }
        }))
    }

    /// The elements of list templates carry no category of their own.
    fn element_template(
        &self,
        t: &TemplateDecl,
        emitter: &dyn DiagEmitter,
    ) -> Result<Template<'v>, ()> {
        match *t {
            TemplateDecl::Value(ref v) => match generic_value(v) {
                Some(v) => Ok(Template::new(TemplateKind::Value(self.values.alloc(v)))),
                None => {
                    emitter.emit(DiagBuilder2::error(format!("`{}' is not a valid value", v)));
                    Err(())
                }
            },
            _ => self.template(SubtypeKind::Charstring, t, emitter),
        }
    }

    /// Run the value and template checks of a module. Subtypes must have
    /// been checked before.
    pub fn run_checks(&self, module: &Module, emitter: &dyn DiagEmitter) -> Result<(), ()> {
        let mut failed = false;
        for check in &module.checks {
            let id = match self.resolve_name(&check.ty, emitter) {
                Ok(id) => id,
                Err(()) => {
                    failed = true;
                    continue;
                }
            };
            let kind = self.table[id].kind();
            if let Some(ref v) = check.value {
                match self.value(kind, v, emitter) {
                    Ok(v) => self.table.check_value(id, v, emitter),
                    Err(()) => failed = true,
                }
            }
            if let Some(ref t) = check.template {
                let t = match self.template(kind, t, emitter) {
                    Ok(t) => t,
                    Err(()) => {
                        failed = true;
                        continue;
                    }
                };
                let t = match check.length.as_ref().map(|l| l.as_slice()) {
                    Some(&[n]) => t.with_length(LengthRestriction::single(n)),
                    Some(&[min, max]) => t.with_length(LengthRestriction::range(min, Some(max))),
                    Some(_) => {
                        emitter.emit(DiagBuilder2::error(
                            "A template length restriction has one or two boundaries",
                        ));
                        failed = true;
                        continue;
                    }
                    None => t,
                };
                self.table.check_template(id, &t, emitter);
            }
        }
        if failed {
            Err(())
        } else {
            Ok(())
        }
    }
}

/// Convert a JSON value into a value of the given category.
pub fn json_to_value(kind: SubtypeKind, v: &Json) -> Option<Value> {
    Some(match (kind, v) {
        (SubtypeKind::Integer, Json::Number(n)) => Value::Integer(BigInt::from(n.as_i64()?)),
        (SubtypeKind::Integer, Json::String(s)) => Value::Integer(s.parse::<BigInt>().ok()?),
        (SubtypeKind::Float, Json::Number(n)) => Value::Float(n.as_f64()?),
        (SubtypeKind::Float, Json::String(s)) => Value::Float(match s.as_str() {
            "infinity" => std::f64::INFINITY,
            "-infinity" => std::f64::NEG_INFINITY,
            "not_a_number" => std::f64::NAN,
            _ => return None,
        }),
        (SubtypeKind::Boolean, Json::Bool(b)) => Value::Boolean(*b),
        (SubtypeKind::Verdict, Json::String(s)) => Value::Verdict(Verdict::from_name(s)?),
        (SubtypeKind::Bitstring, Json::String(s)) if s.chars().all(|c| c == '0' || c == '1') => {
            Value::Bitstring(s.clone())
        }
        (SubtypeKind::Hexstring, Json::String(s)) if s.chars().all(|c| c.is_ascii_hexdigit()) => {
            Value::Hexstring(s.to_uppercase())
        }
        (SubtypeKind::Octetstring, Json::String(s))
            if s.len() % 2 == 0 && s.chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            Value::Octetstring(s.to_uppercase())
        }
        (SubtypeKind::Charstring, Json::String(s)) if s.is_ascii() => Value::Charstring(s.clone()),
        (SubtypeKind::UCharstring, Json::String(s)) => {
            Value::UCharstring(UString::from(s.as_str()))
        }
        (SubtypeKind::Enum, Json::String(s)) => Value::Enumerated(s.clone()),
        (SubtypeKind::Objid, Json::Array(ids)) => Value::Objid(
            ids.iter()
                .map(|i| i.as_u64())
                .collect::<Option<Vec<_>>>()?,
        ),
        (SubtypeKind::RecordOf, Json::Array(vs)) => {
            Value::RecordOf(vs.iter().map(generic_value).collect::<Option<_>>()?)
        }
        (SubtypeKind::SetOf, Json::Array(vs)) => {
            Value::SetOf(vs.iter().map(generic_value).collect::<Option<_>>()?)
        }
        (SubtypeKind::Record, Json::Object(fields)) => Value::Record(generic_fields(fields)?),
        (SubtypeKind::Set, Json::Object(fields)) => Value::Set(generic_fields(fields)?),
        (SubtypeKind::Union, Json::Object(fields)) if fields.len() == 1 => {
            let (name, v) = fields.iter().next()?;
            Value::Union(name.clone(), Box::new(generic_value(v)?))
        }
        (SubtypeKind::Function, Json::String(s)) => Value::Function(s.clone()),
        (SubtypeKind::Altstep, Json::String(s)) => Value::Altstep(s.clone()),
        (SubtypeKind::Testcase, Json::String(s)) => Value::Testcase(s.clone()),
        _ => return None,
    })
}

/// Convert a JSON value whose category is not known, e.g. the element of a
/// list. Strings become charstrings, arrays record-of values.
fn generic_value(v: &Json) -> Option<Value> {
    match *v {
        Json::Number(ref n) if n.is_f64() => json_to_value(SubtypeKind::Float, v),
        Json::Number(_) => json_to_value(SubtypeKind::Integer, v),
        Json::Bool(_) => json_to_value(SubtypeKind::Boolean, v),
        Json::String(_) => json_to_value(SubtypeKind::Charstring, v)
            .or_else(|| json_to_value(SubtypeKind::UCharstring, v)),
        Json::Array(_) => json_to_value(SubtypeKind::RecordOf, v),
        Json::Object(_) => json_to_value(SubtypeKind::Record, v),
        Json::Null => None,
    }
}

fn generic_fields(fields: &serde_json::Map<String, Json>) -> Option<Vec<(String, Value)>> {
    fields
        .iter()
        .map(|(name, v)| Some((name.clone(), generic_value(v)?)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::errors::{DiagCollector, Severity};

    #[test]
    fn values_by_category() {
        let json = |s: &str| -> Json { serde_json::from_str(s).unwrap() };
        assert_eq!(
            json_to_value(SubtypeKind::Integer, &json("42")),
            Some(Value::Integer(42.into()))
        );
        assert_eq!(
            json_to_value(SubtypeKind::Octetstring, &json("\"0a1B\"")),
            Some(Value::Octetstring("0A1B".into()))
        );
        assert_eq!(json_to_value(SubtypeKind::Octetstring, &json("\"abc\"")), None);
        assert_eq!(json_to_value(SubtypeKind::Bitstring, &json("\"012\"")), None);
        assert_eq!(
            json_to_value(SubtypeKind::SetOf, &json("[1, \"a\"]")),
            Some(Value::SetOf(vec![
                Value::Integer(1.into()),
                Value::Charstring("a".into())
            ]))
        );
        match json_to_value(SubtypeKind::Float, &json("\"not_a_number\"")) {
            Some(Value::Float(f)) => assert!(f.is_nan()),
            v => panic!("unexpected {:?}", v),
        }
    }

    #[test]
    fn resolve_declarations() {
        let module = Module::from_str(
            r#"{
                "types": [
                    { "name": "A", "kind": "integer", "parent": "B" },
                    { "name": "B", "kind": "charstring" },
                    { "name": "C", "kind": "integer", "clauses": [{ "type": "D" }] }
                ]
            }"#,
        )
        .unwrap();
        let arena = Arena::new();
        let mut cx = Context::new(&arena);
        let diag = DiagCollector::new();
        assert!(cx.add_module(&module, &diag).is_err());
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "Type `A' cannot be derived from `B', which is of type charstring",
                "There is no type named `D'",
            ]
        );
        assert_eq!(cx.lookup("A").map(|id| cx.table[id].parent()), Some(None));
    }

    #[test]
    fn misordered_clauses_are_reported() {
        let input = std::fs::read_to_string(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/modules/misordered.json"
        ))
        .unwrap();
        let module = Module::from_str(&input).unwrap();
        let arena = Arena::new();
        let mut cx = Context::new(&arena);
        let diag = DiagCollector::new();
        assert!(cx.add_module(&module, &diag).is_err());
        cx.table.check_all(&diag);
        assert_eq!(
            diag.messages(Severity::Error),
            vec![
                "`9.5' is not a valid integer value",
                "Mixing of length/pattern and range subtyping is not allowed for type `Word'",
                "Mixing of length/pattern and range subtyping is not allowed for type `Name'",
                "The upper boundary of the length restriction cannot be -infinity",
            ]
        );
        for name in &["Word", "Name", "Open"] {
            let id = cx.lookup(name).unwrap();
            assert!(cx.table[id].is_error(), "`{}' should be erroneous", name);
        }
    }
}
