//! Scoped session execution.
//!
//! [`with_session`] opens a session, hands a borrow of it to the caller's
//! lookup, releases it on every exit path and maps faults to a fallback.
//! Absence is the lookup's business (`Option`); faults are `anyhow::Error`
//! values and are only ever handled here.

use anyhow::Result;
use tracing::debug;

use crate::resource::Resource;

/// Handle through which the content store is queried.
pub trait Session {
    /// Find the resource at `path`. Missing and unreadable resources are `None`.
    fn resource(&self, path: &str) -> Option<Resource>;

    /// Release the session. Safe to call more than once.
    fn release(&mut self);
}

/// Releases the wrapped session when dropped, including during unwinding.
struct SessionGuard<S: Session> {
    session: S,
}

impl<S: Session> SessionGuard<S> {
    fn session(&self) -> &S {
        &self.session
    }
}

impl<S: Session> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.release();
        debug!("session released");
    }
}

/// Run `on_success` against a freshly opened session.
///
/// - `open` is called exactly once. If it fails, `on_error` receives the
///   fault and `on_success` never runs.
/// - The session is released after `on_success` returns, whether it returned
///   `Ok` or `Err`, and before `on_error` is called.
/// - Faults are passed to `on_error` unclassified. `on_error` itself cannot
///   fail; a panic inside it propagates to the caller.
pub fn with_session<S, T, O, F, E>(open: O, on_success: F, on_error: E) -> T
where
    S: Session,
    O: FnOnce() -> Result<S>,
    F: FnOnce(&S) -> Result<T>,
    E: FnOnce(anyhow::Error) -> T,
{
    let session = match open() {
        Ok(session) => session,
        Err(err) => {
            debug!(error = %format!("{err:#}"), "failed to open session");
            return on_error(err);
        }
    };
    debug!("session opened");

    let outcome = {
        let guard = SessionGuard { session };
        on_success(guard.session())
    };

    match outcome {
        Ok(value) => value,
        Err(err) => on_error(err),
    }
}

/// [`with_session`] bound to a default session factory.
pub struct SessionRunner<O> {
    open: O,
}

impl<S, O> SessionRunner<O>
where
    S: Session,
    O: Fn() -> Result<S>,
{
    pub fn new(open: O) -> Self {
        Self { open }
    }

    pub fn run<T, F, E>(&self, on_success: F, on_error: E) -> T
    where
        F: FnOnce(&S) -> Result<T>,
        E: FnOnce(anyhow::Error) -> T,
    {
        with_session(&self.open, on_success, on_error)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::panic::{AssertUnwindSafe, catch_unwind};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::{anyhow, bail};
    use tracing::Level;
    use tracing_subscriber::layer::{self, Layer, SubscriberExt};

    use super::*;
    use crate::core::fallback::fallback;
    use crate::test_support::{CountingSession, SessionCounts};

    #[test]
    fn releases_once_on_success() {
        let counts = SessionCounts::default();
        let value = with_session(
            || Ok(CountingSession::new(&counts)),
            |_| Ok("found"),
            |_| "fallback",
        );
        assert_eq!(value, "found");
        assert_eq!(counts.opened(), 1);
        assert_eq!(counts.released(), 1);
    }

    #[test]
    fn releases_before_mapping_a_fault() {
        let counts = SessionCounts::default();
        let released_when_mapped = Cell::new(None);
        let value = with_session(
            || Ok(CountingSession::new(&counts)),
            |_| -> Result<&'static str> { bail!("boom") },
            |err| {
                released_when_mapped.set(Some(counts.released()));
                assert_eq!(err.to_string(), "boom");
                "recovered"
            },
        );
        assert_eq!(value, "recovered");
        assert_eq!(released_when_mapped.get(), Some(1));
        assert_eq!(counts.released(), 1);
    }

    #[test]
    fn factory_fault_skips_success_and_release() {
        let ran = Cell::new(false);
        let value = with_session(
            || -> Result<CountingSession> { Err(anyhow!("login failed")) },
            |_| {
                ran.set(true);
                Ok(1)
            },
            |_| -1,
        );
        assert_eq!(value, -1);
        assert!(!ran.get());
    }

    /// Counts `warn` events seen by the subscriber it is installed in.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: layer::Context<'_, S>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn factory_fault_is_warned_about_once() {
        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(Arc::clone(&warnings)));
        let value = tracing::subscriber::with_default(subscriber, || {
            with_session(
                || -> Result<CountingSession> { Err(anyhow!("login failed")) },
                |_| Ok(1),
                fallback(-1),
            )
        });
        assert_eq!(value, -1);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn calls_happen_in_order() {
        let counts = SessionCounts::default();
        let events = RefCell::new(Vec::new());
        let value = with_session(
            || {
                events.borrow_mut().push("open");
                Ok(CountingSession::new(&counts))
            },
            |_| -> Result<u8> {
                events.borrow_mut().push("success");
                bail!("boom")
            },
            |_| {
                events.borrow_mut().push(if counts.released() == 1 {
                    "error-after-release"
                } else {
                    "error-before-release"
                });
                0
            },
        );
        assert_eq!(value, 0);
        assert_eq!(
            events.into_inner(),
            vec!["open", "success", "error-after-release"]
        );
    }

    #[test]
    fn releases_when_success_panics() {
        let counts = SessionCounts::default();
        let result = catch_unwind(AssertUnwindSafe(|| {
            with_session(
                || Ok(CountingSession::new(&counts)),
                |_| -> Result<u8> { panic!("bug in lookup") },
                |_| 0,
            )
        }));
        assert!(result.is_err());
        assert_eq!(counts.released(), 1);
    }

    #[test]
    fn error_mapping_panic_propagates() {
        let counts = SessionCounts::default();
        let result = catch_unwind(AssertUnwindSafe(|| {
            with_session(
                || Ok(CountingSession::new(&counts)),
                |_| -> Result<u8> { bail!("boom") },
                |_| panic!("mapping failed"),
            )
        }));
        assert!(result.is_err());
        assert_eq!(counts.released(), 1);
    }

    #[test]
    fn runner_opens_a_new_session_per_call() {
        let counts = SessionCounts::default();
        let runner = SessionRunner::new(|| Ok(CountingSession::new(&counts)));
        for _ in 0..3 {
            let value = runner.run(|_| Ok(true), |_| false);
            assert!(value);
        }
        assert_eq!(counts.opened(), 3);
        assert_eq!(counts.released(), 3);
    }
}
