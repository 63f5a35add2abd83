//! Fallback values for absent lookups and mapped faults.

use tracing::warn;

/// Where a lookup's final value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution<T> {
    /// Every step produced a value.
    Found(T),
    /// Some step came up empty and the default was used.
    Defaulted(T),
    /// A fault was mapped to a fallback.
    Recovered(T),
}

impl<T> Resolution<T> {
    pub fn value(&self) -> &T {
        match self {
            Resolution::Found(value)
            | Resolution::Defaulted(value)
            | Resolution::Recovered(value) => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Resolution::Found(value)
            | Resolution::Defaulted(value)
            | Resolution::Recovered(value) => value,
        }
    }
}

/// Log `fault` and substitute `default`.
pub fn with_default_value<T>(fault: anyhow::Error, default: T) -> T {
    warn!(error = %format!("{fault:#}"), "lookup failed, using fallback value");
    default
}

/// An error mapper for [`crate::session::with_session`] that always yields `default`.
pub fn fallback<T>(default: T) -> impl FnOnce(anyhow::Error) -> T {
    move |fault| with_default_value(fault, default)
}

/// Like [`fallback`], wrapping the value as [`Resolution::Recovered`].
pub fn recover<T>(default: T) -> impl FnOnce(anyhow::Error) -> Resolution<T> {
    move |fault| Resolution::Recovered(with_default_value(fault, default))
}
