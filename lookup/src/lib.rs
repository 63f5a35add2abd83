//! Null-safe lookups in a hierarchical content tree.
//!
//! Two pieces cooperate:
//!
//! - **[`session`]**: opens a session, runs a lookup against it, releases it on
//!   every exit path and maps faults to a caller-supplied fallback.
//! - **[`core::chain`]**: a short-circuiting pipeline (resolve path → adapt →
//!   read field → follow reference) where a missing value at any step flows
//!   through to a single default at the end.
//!
//! [`repository`] provides the in-memory content store the sessions read, and
//! [`io`] loads content trees and configuration from disk.

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod repository;
pub mod resource;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
