// Copyright (c) 2016-2020 Fabian Schuiki

//! A subtype constraint engine for TTCN-3 type checking.
//!
//! Reads module descriptions, computes the subtype of every declared type,
//! and checks values and templates against them.

#[macro_use]
extern crate log;

// Re-export everything from the common crate.
pub extern crate ttsub_common as common;
pub use crate::common::*;

pub extern crate ttsub_subtype as subtype;

pub mod module;

use crate::common::errors::{DiagBuilder2, DiagEmitter};
use crate::common::util::HasDesc;
use crate::module::{Context, Module};
use crate::subtype::schema::emit_schema;
use serde_json::{Map, Value as Json};
use std::path::Path;
use typed_arena::Arena;

/// Read and parse a module description.
pub fn load_module(path: &Path) -> Result<Module, String> {
    let input = std::fs::read_to_string(path)
        .map_err(|e| format!("Cannot read `{}': {}", path.display(), e))?;
    let module = Module::from_str(&input)
        .map_err(|e| format!("Cannot parse `{}': {}", path.display(), e))?;
    debug!(
        "loaded {} types and {} checks from {}",
        module.types.len(),
        module.checks.len(),
        path.display()
    );
    Ok(module)
}

/// Check the types of a set of modules and run their value and template
/// checks. Returns the JSON schema of every declared type, keyed by name, or
/// an error if any diagnostic of error severity was emitted.
///
/// All modules share one namespace, such that types may refer to types in
/// other modules.
pub fn check_modules(sess: &Session, modules: &[Module]) -> Result<Json, ()> {
    let values = Arena::new();
    let mut cx = Context::new(&values);
    let mut failed = false;
    for module in modules {
        // The remaining types are still worth checking.
        if cx.add_module(module, sess).is_err() {
            failed = true;
        }
    }
    if sess.has_verbosity(Verbosity::CLAUSES) {
        for id in cx.table.ids() {
            let st = &cx.table[id];
            if let Some(clauses) = st.clauses() {
                for clause in clauses {
                    eprintln!("{} clause {:?}", st.desc_full(), clause);
                }
            }
        }
    }
    cx.table.check_all(sess);
    if sess.has_verbosity(Verbosity::SUBTYPES) {
        for id in cx.table.ids() {
            let st = &cx.table[id];
            eprintln!("{}: {}", st.desc_full(), st.to_display_string());
        }
    }
    for module in modules {
        if cx.run_checks(module, sess).is_err() {
            failed = true;
        }
    }
    if failed || sess.failed.get() {
        return Err(());
    }

    let mut schemas = Map::new();
    for id in cx.table.ids() {
        let schema = emit_schema(&cx.table, id);
        if sess.has_verbosity(Verbosity::SCHEMA) {
            eprintln!("{}: {}", cx.table[id].desc_full(), schema);
        }
        schemas.insert(cx.table[id].name().to_string(), schema);
    }
    Ok(Json::Object(schemas))
}

/// Load and check a list of module files.
pub fn run<P: AsRef<Path>>(sess: &Session, inputs: &[P]) -> Result<Json, ()> {
    let mut modules = vec![];
    for input in inputs {
        match load_module(input.as_ref()) {
            Ok(m) => modules.push(m),
            Err(msg) => sess.emit(DiagBuilder2::error(msg)),
        }
    }
    check_modules(sess, &modules)
}
