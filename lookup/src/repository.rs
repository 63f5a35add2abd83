//! In-memory content repository and the sessions that read it.
//!
//! A [`SessionFactory`] authenticates callers and opens [`RepositorySession`]s.
//! User sessions only see resources under their principal's read roots;
//! anything else looks missing. Administrative sessions see everything and
//! must be switched on explicitly.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use tracing::{debug, info, warn};

use crate::core::path;
use crate::io::config::LookupConfig;
use crate::resource::{ContentNode, Resource};
use crate::session::{Session, SessionRunner};

/// A content tree addressed by absolute paths.
#[derive(Debug, Clone, Default)]
pub struct Repository {
    root: Arc<ContentNode>,
}

impl Repository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graft `node` at `path`, creating empty intermediate nodes and replacing
    /// whatever was mounted there before.
    pub fn mount(&mut self, mount_path: &str, node: ContentNode) -> Result<()> {
        let normalized = path::normalize(mount_path)
            .ok_or_else(|| anyhow!("invalid mount path '{mount_path}'"))?;
        let Some(parent) = path::parent(&normalized) else {
            self.root = Arc::new(node);
            debug!(path = %normalized, "mounted content at root");
            return Ok(());
        };
        let mut cursor = Arc::make_mut(&mut self.root);
        for segment in path::segments(parent) {
            cursor = cursor.child_mut(segment);
        }
        cursor.set_child(path::name(&normalized), node);
        debug!(path = %normalized, "mounted content");
        Ok(())
    }

    /// Find the resource at `path`. Paths that do not normalize resolve to `None`.
    pub fn resolve(&self, resource_path: &str) -> Option<Resource> {
        let normalized = path::normalize(resource_path)?;
        let mut node = Arc::clone(&self.root);
        for segment in path::segments(&normalized) {
            node = Arc::clone(node.child(segment)?);
        }
        Some(Resource::new(normalized, node))
    }
}

/// Who a session is opened for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
}

impl Credentials {
    pub fn user(name: impl Into<String>) -> Self {
        Self { user: name.into() }
    }
}

/// Counts session lifecycles so callers can check nothing leaked.
#[derive(Debug, Default)]
pub struct SessionLedger {
    opened: AtomicUsize,
    released: AtomicUsize,
}

impl SessionLedger {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }

    /// Sessions opened but not yet released.
    ///
    /// `released` is read first: every release is preceded by its open, so the
    /// later `opened` read can only be larger.
    pub fn live(&self) -> usize {
        let released = self.released();
        self.opened().saturating_sub(released)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Access {
    Administrative,
    User { name: String, read_roots: Vec<String> },
}

pub struct SessionFactory {
    repository: Arc<Repository>,
    principals: BTreeMap<String, Vec<String>>,
    allow_administrative: bool,
    ledger: Arc<SessionLedger>,
}

impl SessionFactory {
    /// A factory with no principals and administrative sessions disabled.
    pub fn new(repository: Repository) -> Self {
        Self {
            repository: Arc::new(repository),
            principals: BTreeMap::new(),
            allow_administrative: false,
            ledger: Arc::new(SessionLedger::default()),
        }
    }

    pub fn from_config(repository: Repository, config: &LookupConfig) -> Self {
        config.principals.iter().fold(
            Self::new(repository).with_administrative(config.allow_administrative),
            |factory, principal| factory.with_principal(&principal.name, &principal.read_roots),
        )
    }

    /// Register a principal. Read roots that are not absolute paths are ignored.
    pub fn with_principal(mut self, name: &str, read_roots: &[String]) -> Self {
        let roots = read_roots
            .iter()
            .filter_map(|root| path::normalize(root))
            .collect();
        self.principals.insert(name.to_string(), roots);
        self
    }

    pub fn with_administrative(mut self, allow: bool) -> Self {
        self.allow_administrative = allow;
        self
    }

    pub fn ledger(&self) -> &SessionLedger {
        &self.ledger
    }

    /// Open a session for a configured principal.
    pub fn login(&self, credentials: &Credentials) -> Result<RepositorySession> {
        let Some(read_roots) = self.principals.get(&credentials.user) else {
            bail!("authentication failed for user '{}'", credentials.user);
        };
        debug!(user = %credentials.user, "login");
        Ok(self.open(Access::User {
            name: credentials.user.clone(),
            read_roots: read_roots.clone(),
        }))
    }

    /// Open an unrestricted session. Fails unless administrative access was enabled.
    pub fn administrative(&self) -> Result<RepositorySession> {
        if !self.allow_administrative {
            bail!("administrative sessions are disabled");
        }
        info!("opening administrative session");
        Ok(self.open(Access::Administrative))
    }

    /// A runner that logs in as `credentials` for every call.
    pub fn runner_for(
        &self,
        credentials: Credentials,
    ) -> SessionRunner<impl Fn() -> Result<RepositorySession> + '_> {
        SessionRunner::new(move || self.login(&credentials))
    }

    /// A runner that opens an administrative session for every call.
    pub fn administrative_runner(
        &self,
    ) -> SessionRunner<impl Fn() -> Result<RepositorySession> + '_> {
        SessionRunner::new(move || self.administrative())
    }

    fn open(&self, access: Access) -> RepositorySession {
        self.ledger.opened.fetch_add(1, Ordering::SeqCst);
        RepositorySession {
            repository: Arc::clone(&self.repository),
            access,
            ledger: Arc::clone(&self.ledger),
            live: true,
        }
    }
}

/// A session over a [`Repository`]. Released on drop if not released earlier.
#[derive(Debug)]
pub struct RepositorySession {
    repository: Arc<Repository>,
    access: Access,
    ledger: Arc<SessionLedger>,
    live: bool,
}

impl RepositorySession {
    /// The authenticated user; `None` for administrative sessions.
    pub fn user(&self) -> Option<&str> {
        match &self.access {
            Access::Administrative => None,
            Access::User { name, .. } => Some(name),
        }
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    fn can_read(&self, resource_path: &str) -> bool {
        match &self.access {
            Access::Administrative => true,
            Access::User { read_roots, .. } => read_roots
                .iter()
                .any(|root| path::is_within(resource_path, root)),
        }
    }
}

impl Session for RepositorySession {
    fn resource(&self, resource_path: &str) -> Option<Resource> {
        if !self.live {
            warn!(path = resource_path, "lookup on released session");
            return None;
        }
        let resource = self.repository.resolve(resource_path)?;
        if !self.can_read(resource.path()) {
            debug!(path = resource.path(), "resource not readable");
            return None;
        }
        Some(resource)
    }

    fn release(&mut self) {
        if self.live {
            self.live = false;
            self.ledger.released.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl Drop for RepositorySession {
    fn drop(&mut self) {
        self.release();
    }
}
