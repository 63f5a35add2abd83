//! Test-only helpers: a sample content tree and session doubles.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Context, Result};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::io::config::{LookupConfig, write_config};
use crate::repository::{Repository, RepositorySession, SessionFactory};
use crate::resource::{ContentNode, Resource};
use crate::session::Session;

/// Sample content mounted at `/content`.
///
/// ```text
/// /content
/// ├── page1/jcr:content   jcr:title=page1
/// ├── page2/jcr:content   ref=/content/page3
/// ├── page3/jcr:content   jcr:title=page3
/// └── page4/jcr:content   ref=/content/missing
/// ```
pub fn sample_tree_json() -> Value {
    json!({
        "jcr:primaryType": "sling:Folder",
        "page1": {
            "jcr:primaryType": "cq:Page",
            "jcr:content": {
                "jcr:primaryType": "cq:PageContent",
                "jcr:title": "page1"
            }
        },
        "page2": {
            "jcr:primaryType": "cq:Page",
            "jcr:content": {
                "jcr:primaryType": "cq:PageContent",
                "jcr:title": "page2",
                "ref": "/content/page3"
            }
        },
        "page3": {
            "jcr:primaryType": "cq:Page",
            "jcr:content": {
                "jcr:primaryType": "cq:PageContent",
                "jcr:title": "page3"
            }
        },
        "page4": {
            "jcr:primaryType": "cq:Page",
            "jcr:content": {
                "jcr:primaryType": "cq:PageContent",
                "jcr:title": "page4",
                "ref": "/content/missing"
            }
        }
    })
}

pub fn sample_tree() -> ContentNode {
    ContentNode::from_json(&sample_tree_json()).expect("sample tree is valid")
}

/// Sample tree at `/content` plus a restricted node at `/conf/global`.
pub fn sample_repository() -> Repository {
    let mut repository = Repository::new();
    repository
        .mount("/content", sample_tree())
        .expect("mount sample tree");
    repository
        .mount(
            "/conf/global",
            ContentNode::new().with_property("secret", "s3cret"),
        )
        .expect("mount conf");
    repository
}

/// Factory over [`sample_repository`] with administrative sessions enabled and
/// an `anonymous` principal reading `/content`.
pub fn sample_factory() -> SessionFactory {
    SessionFactory::new(sample_repository())
        .with_administrative(true)
        .with_principal("anonymous", &["/content".to_string()])
}

/// An administrative session over the sample content.
pub fn sample_session() -> RepositorySession {
    sample_factory()
        .administrative()
        .expect("administrative session")
}

/// Temporary directory holding `sample-tree.json`.
pub struct TestContent {
    dir: TempDir,
    pub tree_path: PathBuf,
}

impl TestContent {
    pub fn new() -> Result<Self> {
        let dir = tempfile::tempdir().context("create tempdir")?;
        let tree_path = dir.path().join("sample-tree.json");
        let mut payload = serde_json::to_string_pretty(&sample_tree_json())?;
        payload.push('\n');
        fs::write(&tree_path, payload)
            .with_context(|| format!("write {}", tree_path.display()))?;
        Ok(Self { dir, tree_path })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write `config` as `lookup.toml` and return its path.
    pub fn write_config(&self, config: &LookupConfig) -> Result<PathBuf> {
        let path = self.dir.path().join("lookup.toml");
        write_config(&path, config)?;
        Ok(path)
    }
}

/// Shared open/release counters for [`CountingSession`].
#[derive(Debug, Clone, Default)]
pub struct SessionCounts {
    opened: Arc<AtomicUsize>,
    released: Arc<AtomicUsize>,
}

impl SessionCounts {
    pub fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

/// Session double that counts every `release` call, repeated ones included.
pub struct CountingSession {
    counts: SessionCounts,
    repository: Repository,
}

impl CountingSession {
    /// A counting session over an empty repository.
    pub fn new(counts: &SessionCounts) -> Self {
        Self::over(counts, Repository::new())
    }

    pub fn over(counts: &SessionCounts, repository: Repository) -> Self {
        counts.opened.fetch_add(1, Ordering::SeqCst);
        Self {
            counts: counts.clone(),
            repository,
        }
    }
}

impl Session for CountingSession {
    fn resource(&self, path: &str) -> Option<Resource> {
        self.repository.resolve(path)
    }

    fn release(&mut self) {
        self.counts.released.fetch_add(1, Ordering::SeqCst);
    }
}
