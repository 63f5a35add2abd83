//! I/O helpers: configuration and content tree files.

pub mod config;
pub mod content_store;
