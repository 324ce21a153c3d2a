// Copyright (c) 2016-2020 Fabian Schuiki

//! A collection of utility traits shared across the engine.

#![deny(missing_docs)]

/// Describes things that show up in diagnostics.
pub trait HasDesc {
    /// Obtain a human-readable descriptive name for this thing.
    fn desc(&self) -> &'static str;

    /// Obtain a human-readable description, possibly containing the thing's
    /// name.
    fn desc_full(&self) -> String {
        self.desc().into()
    }
}
