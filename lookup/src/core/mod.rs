//! Pure lookup logic: paths, typed views and the lookup pipeline.
//!
//! Core modules are free of I/O. They operate on in-memory content and
//! return deterministic outputs suitable for tests.

pub mod chain;
pub mod fallback;
pub mod invariants;
pub mod page;
pub mod path;
pub mod value_map;
