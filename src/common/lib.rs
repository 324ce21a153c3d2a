// Copyright (c) 2016-2020 Fabian Schuiki

//! This crate contains the fundamental utilities used by the rest of the
//! ttsub constraint engine.

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

pub mod errors;
pub mod util;

use crate::errors::{DiagBuilder2, DiagEmitter, Severity};
use std::cell::Cell;

/// Central data structure of the engine. It holds the options and the
/// diagnostic state of one run.
pub struct Session {
    pub opts: SessionOptions,
    /// Whether any error diagnostics were produced.
    pub failed: Cell<bool>,
    num_warnings: Cell<usize>,
}

impl Session {
    /// Create a new session.
    pub fn new() -> Session {
        Session {
            opts: Default::default(),
            failed: Cell::new(false),
            num_warnings: Cell::new(0),
        }
    }

    /// The number of warnings emitted so far.
    pub fn num_warnings(&self) -> usize {
        self.num_warnings.get()
    }
}

impl DiagEmitter for Session {
    fn emit(&self, mut diag: DiagBuilder2) {
        if diag.severity == Severity::Warning && self.opts.warnings_as_errors {
            diag.severity = Severity::Error;
        }
        match diag.severity {
            Severity::Warning => self.num_warnings.set(self.num_warnings.get() + 1),
            s if s >= Severity::Error => self.failed.set(true),
            _ => (),
        }
        debug!("emitting {} `{}`", diag.severity, diag.message);
        eprintln!("{}", diag);
    }
}

/// A set of options for a session.
///
/// The arguments passed on the command line are intended to modify these
/// values in order to configure the execution of the program.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Promote all warnings to errors.
    pub warnings_as_errors: bool,
    /// The verbosity options.
    pub verbosity: Verbosity,
}

bitflags! {
    /// A set of verbosity options for a session.
    ///
    /// These flags control how much information the engine emits.
    #[derive(Default)]
    pub struct Verbosity: u64 {
        /// Print the computed subtype of every checked type.
        const SUBTYPES = 1 << 0;
        /// Print each restriction clause as it is folded into a subtype.
        const CLAUSES = 1 << 1;
        /// Print the generated schema fragments.
        const SCHEMA = 1 << 2;
    }
}

/// Provides access to a session.
pub trait SessionContext {
    /// Get the session.
    fn sess(&self) -> &Session;

    /// Check if a verbosity option is set.
    fn has_verbosity(&self, verb: Verbosity) -> bool {
        self.sess().opts.verbosity.contains(verb)
    }
}

impl SessionContext for Session {
    fn sess(&self) -> &Session {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_promoted() {
        let mut sess = Session::new();
        sess.emit(DiagBuilder2::warning("meh"));
        assert!(!sess.failed.get());
        assert_eq!(sess.num_warnings(), 1);
        sess.opts.warnings_as_errors = true;
        sess.emit(DiagBuilder2::warning("meh"));
        assert!(sess.failed.get());
    }

    #[test]
    fn verbosity_flags() {
        let mut sess = Session::new();
        assert!(!sess.has_verbosity(Verbosity::SUBTYPES));
        sess.opts.verbosity |= Verbosity::SUBTYPES | Verbosity::SCHEMA;
        assert!(sess.has_verbosity(Verbosity::SCHEMA));
        assert!(!sess.has_verbosity(Verbosity::CLAUSES));
    }
}
