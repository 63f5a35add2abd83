//! Lookup configuration stored in `lookup.toml`.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::core::path;

pub const DEFAULT_CONFIG_FILE: &str = "lookup.toml";

/// Lookup configuration (TOML).
///
/// Missing fields default to values that work for a single content tree
/// mounted at `/content` and read anonymously.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LookupConfig {
    /// Where loaded content trees are mounted.
    pub content_root: String,

    /// Allow unrestricted sessions. Off unless explicitly enabled.
    pub allow_administrative: bool,

    pub principals: Vec<PrincipalConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PrincipalConfig {
    pub name: String,

    /// Absolute paths this principal may read below.
    pub read_roots: Vec<String>,
}

impl Default for PrincipalConfig {
    fn default() -> Self {
        Self {
            name: "anonymous".to_string(),
            read_roots: vec!["/content".to_string()],
        }
    }
}

impl Default for LookupConfig {
    fn default() -> Self {
        Self {
            content_root: "/content".to_string(),
            allow_administrative: false,
            principals: vec![PrincipalConfig::default()],
        }
    }
}

impl LookupConfig {
    pub fn validate(&self) -> Result<()> {
        if path::normalize(&self.content_root).is_none() {
            return Err(anyhow!(
                "content_root must be an absolute path, got '{}'",
                self.content_root
            ));
        }
        let mut seen = HashSet::new();
        for principal in &self.principals {
            if principal.name.trim().is_empty() {
                return Err(anyhow!("principal name must be non-empty"));
            }
            if !seen.insert(principal.name.as_str()) {
                return Err(anyhow!("duplicate principal '{}'", principal.name));
            }
            if let Some(root) = principal
                .read_roots
                .iter()
                .find(|root| path::normalize(root).is_none())
            {
                return Err(anyhow!(
                    "principal '{}': read root '{}' must be an absolute path",
                    principal.name,
                    root
                ));
            }
        }
        Ok(())
    }
}

/// Read `lookup.toml`-style settings from `path`.
///
/// A missing file is not an error: the built-in settings (anonymous reads
/// under `/content`, no administrative sessions) apply instead.
pub fn load_config(path: &Path) -> Result<LookupConfig> {
    let cfg = match fs::read_to_string(path) {
        Ok(contents) => toml::from_str::<LookupConfig>(&contents)
            .with_context(|| format!("parse lookup config {}", path.display()))?,
        Err(err) if err.kind() == ErrorKind::NotFound => LookupConfig::default(),
        Err(err) => {
            return Err(err).with_context(|| format!("read lookup config {}", path.display()));
        }
    };
    cfg.validate()
        .with_context(|| format!("validate lookup config {}", path.display()))?;
    Ok(cfg)
}

/// Persist `cfg` to `path`, replacing any existing file in one rename so
/// readers never see a half-written config.
pub fn write_config(path: &Path, cfg: &LookupConfig) -> Result<()> {
    cfg.validate()?;
    let mut rendered = toml::to_string_pretty(cfg).context("render lookup config")?;
    rendered.push('\n');

    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let staged = path.with_extension("toml.tmp");
    fs::write(&staged, rendered).with_context(|| format!("stage {}", staged.display()))?;
    fs::rename(&staged, path).with_context(|| format!("install {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_returns_default() {
        let temp = tempfile::tempdir().expect("tempdir");
        let cfg = load_config(&temp.path().join("missing.toml")).expect("load");
        assert_eq!(cfg, LookupConfig::default());
        assert!(!cfg.allow_administrative);
    }

    #[test]
    fn write_then_load_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("lookup.toml");
        let cfg = LookupConfig {
            allow_administrative: true,
            principals: vec![
                PrincipalConfig::default(),
                PrincipalConfig {
                    name: "editor".to_string(),
                    read_roots: vec!["/content".to_string(), "/conf".to_string()],
                },
            ],
            ..LookupConfig::default()
        };
        write_config(&path, &cfg).expect("write");
        let loaded = load_config(&path).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("lookup.toml");
        fs::write(&path, "allow_administrative = true\n").expect("write");
        let cfg = load_config(&path).expect("load");
        assert!(cfg.allow_administrative);
        assert_eq!(cfg.content_root, "/content");
        assert_eq!(cfg.principals, vec![PrincipalConfig::default()]);
    }

    #[test]
    fn validate_rejects_bad_paths_and_duplicates() {
        let relative_root = LookupConfig {
            content_root: "content".to_string(),
            ..LookupConfig::default()
        };
        assert!(relative_root.validate().is_err());

        let duplicate = LookupConfig {
            principals: vec![PrincipalConfig::default(), PrincipalConfig::default()],
            ..LookupConfig::default()
        };
        assert!(duplicate.validate().is_err());

        let bad_root = LookupConfig {
            principals: vec![PrincipalConfig {
                name: "reader".to_string(),
                read_roots: vec!["content".to_string()],
            }],
            ..LookupConfig::default()
        };
        assert!(bad_root.validate().is_err());
    }
}
