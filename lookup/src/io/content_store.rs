//! Content tree loading with schema + invariant validation.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use jsonschema::validator_for;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::core::invariants::validate_invariants;
use crate::io::config::LookupConfig;
use crate::repository::Repository;
use crate::resource::ContentNode;

pub const CONTENT_TREE_SCHEMA: &str =
    include_str!("../../../schemas/content_tree/v1.schema.json");

/// Load and validate a content tree from disk (schema + invariants).
#[instrument(skip_all, fields(tree = %tree_path.display()))]
pub fn load_content_tree(tree_path: &Path) -> Result<ContentNode> {
    let tree_contents = fs::read_to_string(tree_path)
        .with_context(|| format!("read content tree {}", tree_path.display()))?;
    let tree_value: Value = serde_json::from_str(&tree_contents)
        .with_context(|| format!("parse content tree {}", tree_path.display()))?;
    validate_schema(&tree_value)?;
    let tree = ContentNode::from_json(&tree_value)
        .with_context(|| format!("convert content tree {}", tree_path.display()))?;
    validate_tree_invariants(&tree)?;
    debug!("content tree loaded");
    Ok(tree)
}

/// Load a content tree and mount it at the configured `content_root`.
pub fn load_repository(config: &LookupConfig, tree_path: &Path) -> Result<Repository> {
    let tree = load_content_tree(tree_path)?;
    let mut repository = Repository::new();
    repository
        .mount(&config.content_root, tree)
        .with_context(|| format!("mount content at {}", config.content_root))?;
    Ok(repository)
}

pub fn validate_schema(tree: &Value) -> Result<()> {
    let schema_value: Value =
        serde_json::from_str(CONTENT_TREE_SCHEMA).context("parse content tree schema")?;
    let compiled =
        validator_for(&schema_value).map_err(|err| anyhow!("invalid schema: {}", err))?;
    if !compiled.is_valid(tree) {
        let messages = compiled
            .iter_errors(tree)
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(anyhow!(
            "content tree schema validation failed: {}",
            messages.join("; ")
        ));
    }
    Ok(())
}

fn validate_tree_invariants(tree: &ContentNode) -> Result<()> {
    let errors = validate_invariants(tree);
    if errors.is_empty() {
        return Ok(());
    }
    Err(anyhow!("content tree invariants failed: {}", errors.join("; ")))
}
