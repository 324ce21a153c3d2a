// Copyright (c) 2016-2020 Fabian Schuiki

#![allow(dead_code)]

pub extern crate simple_logger;
pub extern crate ttsub;

pub use ttsub::module::Module;
pub use ttsub::{Session, Verbosity};

/// A fresh session with logging set up.
pub fn session() -> Session {
    simple_logger::init().is_ok();
    Session::new()
}

/// The path of a module description in the test fixtures.
pub fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("modules")
        .join(name)
}
