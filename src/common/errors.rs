// Copyright (c) 2016-2020 Fabian Schuiki

//! Utilities to implement diagnostics and error reporting facilities.

use std::cell::RefCell;
use std::fmt;

/// Emits diagnostic messages.
pub trait DiagEmitter {
    /// Emit a diagnostic message.
    fn emit(&self, diag: DiagBuilder2);
}

impl<'a, T> DiagEmitter for &'a T
where
    T: DiagEmitter + ?Sized,
{
    fn emit(&self, diag: DiagBuilder2) {
        (*self).emit(diag)
    }
}

/// Used to emit structured error messages.
#[must_use]
#[derive(Clone, Debug, PartialEq)]
pub struct DiagBuilder2 {
    pub severity: Severity,
    pub message: String,
    pub segments: Vec<DiagSegment>,
}

/// An additional piece of information attached to a diagnostic.
#[derive(Clone, Debug, PartialEq)]
pub enum DiagSegment {
    /// The construct the diagnostic refers to, e.g. "type `Byte`".
    Context(String),
    Note(String),
}

/// A diagnostic result type. Either carries the result `T` in the Ok variant,
/// or an assembled diagnostic in the Err variant.
pub type DiagResult2<T> = Result<T, DiagBuilder2>;

impl DiagBuilder2 {
    pub fn new<S: Into<String>>(severity: Severity, message: S) -> DiagBuilder2 {
        DiagBuilder2 {
            severity: severity,
            message: message.into(),
            segments: Vec::new(),
        }
    }

    pub fn bug<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Bug, message)
    }

    pub fn fatal<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Fatal, message)
    }

    pub fn error<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Error, message)
    }

    pub fn warning<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Warning, message)
    }

    pub fn note<S: Into<String>>(message: S) -> DiagBuilder2 {
        DiagBuilder2::new(Severity::Note, message)
    }

    pub fn segment(self, segment: DiagSegment) -> DiagBuilder2 {
        let mut segments = self.segments;
        segments.push(segment);
        DiagBuilder2 {
            segments: segments,
            ..self
        }
    }

    pub fn context<S: Into<String>>(self, context: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Context(context.into()))
    }

    pub fn add_note<S: Into<String>>(self, message: S) -> DiagBuilder2 {
        self.segment(DiagSegment::Note(message.into()))
    }

    pub fn get_severity(&self) -> Severity {
        self.severity
    }

    pub fn get_message(&self) -> &String {
        &self.message
    }

    pub fn get_segments(&self) -> &[DiagSegment] {
        &self.segments
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub enum Severity {
    Note,
    Warning,
    Error,
    Fatal,
    Bug,
}

impl Severity {
    pub fn to_str(self) -> &'static str {
        match self {
            Severity::Fatal => "fatal",
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Bug => "compiler bug",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl fmt::Display for DiagBuilder2 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let colorcode = match self.get_severity() {
            Severity::Bug | Severity::Fatal | Severity::Error => "\x1B[31;1m",
            Severity::Warning => "\x1B[33;1m",
            Severity::Note => "\x1B[36;1m",
        };
        write!(
            f,
            "{}{}:\x1B[m\x1B[1m {}\x1B[m\n",
            colorcode,
            self.get_severity(),
            self.get_message()
        )?;

        for segment in &self.segments {
            match *segment {
                DiagSegment::Context(ref context) => write!(f, "  --> {}\n", context)?,
                DiagSegment::Note(ref message) => {
                    write!(f, "   = \x1B[1mnote:\x1B[m {}\n", message)?
                }
            }
        }

        if self.get_severity() == Severity::Bug {
            write!(f, "\nYou have encountered a bug in the constraint engine. Sorry about that! We would appreciate if you open an issue [1] and describe how you triggered the bug, together with a minimal module to reproduce it. Thanks!\n")?;
            write!(f, "[1]: https://github.com/fabianschuiki/moore\n")?;
        }

        Ok(())
    }
}

/// A diagnostic sink that keeps every emitted message around.
///
/// Useful when embedding the engine into a larger tool that renders
/// diagnostics itself, and in tests.
#[derive(Default, Debug)]
pub struct DiagCollector {
    diags: RefCell<Vec<DiagBuilder2>>,
}

impl DiagCollector {
    pub fn new() -> DiagCollector {
        Default::default()
    }

    /// Take all collected diagnostics, leaving the collector empty.
    pub fn take(&self) -> Vec<DiagBuilder2> {
        std::mem::replace(&mut *self.diags.borrow_mut(), Vec::new())
    }

    /// The messages of all collected diagnostics with the given severity.
    pub fn messages(&self, severity: Severity) -> Vec<String> {
        self.diags
            .borrow()
            .iter()
            .filter(|d| d.severity == severity)
            .map(|d| d.message.clone())
            .collect()
    }

    pub fn num_errors(&self) -> usize {
        self.diags
            .borrow()
            .iter()
            .filter(|d| d.severity >= Severity::Error)
            .count()
    }

    pub fn num_warnings(&self) -> usize {
        self.diags
            .borrow()
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diags.borrow().is_empty()
    }
}

impl DiagEmitter for DiagCollector {
    fn emit(&self, diag: DiagBuilder2) {
        self.diags.borrow_mut().push(diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_counts() {
        let c = DiagCollector::new();
        c.emit(DiagBuilder2::error("foo"));
        c.emit(DiagBuilder2::warning("bar").context("type `T`"));
        c.emit(DiagBuilder2::bug("baz"));
        assert_eq!(c.num_errors(), 2);
        assert_eq!(c.num_warnings(), 1);
        assert_eq!(c.messages(Severity::Warning), vec!["bar".to_string()]);
        assert_eq!(c.take().len(), 3);
        assert!(c.is_empty());
    }

    #[test]
    fn display_has_severity_and_notes() {
        let d = DiagBuilder2::error("broken")
            .context("type `T`")
            .add_note("look here");
        let s = format!("{}", d);
        assert!(s.contains("error:"));
        assert!(s.contains("broken"));
        assert!(s.contains("--> type `T`"));
        assert!(s.contains("note:"));
    }
}
