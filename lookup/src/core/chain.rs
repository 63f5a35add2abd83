//! Short-circuiting lookup pipeline.
//!
//! A [`Lookup`] threads one value through a chain of steps. Each step either
//! produces the next value or leaves the lookup empty. Once empty, later steps
//! are skipped without running their transforms, and the finalizer supplies
//! the default. A transform that fails (returns `Err`) also stops the chain,
//! but the finalizer hands the fault back as `Err` instead of defaulting, so
//! it reaches whoever runs the pipeline.
//!
//! ```
//! use lookup::core::chain::Lookup;
//! use lookup::repository::{Repository, SessionFactory};
//! use lookup::resource::ContentNode;
//!
//! let mut repository = Repository::new();
//! repository.mount(
//!     "/content/page1",
//!     ContentNode::new().with_child(
//!         "jcr:content",
//!         ContentNode::new().with_property("jcr:title", "page1"),
//!     ),
//! )?;
//! let factory = SessionFactory::new(repository).with_administrative(true);
//! let session = factory.administrative()?;
//!
//! let title = Lookup::at(&session, "/content/page1/jcr:content")
//!     .value_map()
//!     .get::<String>("jcr:title")
//!     .or_else(|| "defaultText".to_string())?;
//! assert_eq!(title, "page1");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::Result;

use crate::core::fallback::Resolution;
use crate::core::value_map::{FromValue, ValueMap};
use crate::resource::{FromResource, Resource};
use crate::session::Session;

/// Whether further steps can still run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupState {
    /// A value is present and the next step will run.
    Searching,
    /// The chain ended early (absent or faulted); remaining steps are skipped.
    Resolved,
}

#[derive(Debug)]
enum Step<T> {
    Searching(T),
    Absent,
    Faulted(anyhow::Error),
}

#[derive(Debug)]
pub struct Lookup<T> {
    step: Step<T>,
}

impl<T> Lookup<T> {
    pub fn of(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::present(value),
            None => Self::absent(),
        }
    }

    pub fn present(value: T) -> Self {
        Self {
            step: Step::Searching(value),
        }
    }

    pub fn absent() -> Self {
        Self { step: Step::Absent }
    }

    pub fn state(&self) -> LookupState {
        match self.step {
            Step::Searching(_) => LookupState::Searching,
            Step::Absent | Step::Faulted(_) => LookupState::Resolved,
        }
    }

    /// Apply `f` to a present value; `None` from `f` ends the chain.
    pub fn map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(T) -> Option<U>,
    {
        self.try_map(|value| Ok(f(value)))
    }

    /// Apply a fallible transform. `Err` ends the chain with a fault.
    pub fn try_map<U, F>(self, f: F) -> Lookup<U>
    where
        F: FnOnce(T) -> Result<Option<U>>,
    {
        let step = match self.step {
            Step::Searching(value) => match f(value) {
                Ok(Some(next)) => Step::Searching(next),
                Ok(None) => Step::Absent,
                Err(err) => Step::Faulted(err),
            },
            Step::Absent => Step::Absent,
            Step::Faulted(err) => Step::Faulted(err),
        };
        Lookup { step }
    }

    /// Keep the value only if `predicate` holds.
    pub fn filter<P>(self, predicate: P) -> Lookup<T>
    where
        P: FnOnce(&T) -> bool,
    {
        self.map(|value| predicate(&value).then_some(value))
    }

    /// Finish the chain, computing `default` only if the value is absent.
    pub fn or_else<F>(self, default: F) -> Result<T>
    where
        F: FnOnce() -> T,
    {
        Ok(self.into_option()?.unwrap_or_else(default))
    }

    pub fn or_default(self) -> Result<T>
    where
        T: Default,
    {
        self.or_else(T::default)
    }

    /// Like [`Lookup::or_else`], but records whether the default was used.
    pub fn settle<F>(self, default: F) -> Result<Resolution<T>>
    where
        F: FnOnce() -> T,
    {
        Ok(match self.into_option()? {
            Some(value) => Resolution::Found(value),
            None => Resolution::Defaulted(default()),
        })
    }

    pub fn into_option(self) -> Result<Option<T>> {
        match self.step {
            Step::Searching(value) => Ok(Some(value)),
            Step::Absent => Ok(None),
            Step::Faulted(err) => Err(err),
        }
    }
}

impl Lookup<Resource> {
    /// Start a chain at the resource found at `path`.
    pub fn at<S: Session + ?Sized>(session: &S, path: &str) -> Self {
        Self::of(session.resource(path))
    }

    pub fn adapt<V: FromResource>(self) -> Lookup<V> {
        self.map(|resource| resource.adapt_to::<V>())
    }

    pub fn value_map(self) -> Lookup<ValueMap> {
        self.adapt()
    }

    pub fn child(self, name: &str) -> Lookup<Resource> {
        self.map(|resource| resource.child(name))
    }

    pub fn path(self) -> Lookup<String> {
        self.map(|resource| Some(resource.path().to_string()))
    }
}

impl Lookup<ValueMap> {
    pub fn get<V: FromValue>(self, name: &str) -> Lookup<V> {
        self.map(|properties| properties.get(name))
    }
}

impl Lookup<String> {
    /// Treat the value as a path and look it up through `session`.
    pub fn resolve<S: Session + ?Sized>(self, session: &S) -> Lookup<Resource> {
        self.map(|path| session.resource(&path))
    }
}
