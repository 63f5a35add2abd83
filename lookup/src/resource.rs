//! Content tree nodes and the resource handles sessions hand out.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::Value;

use crate::core::path;

/// A node in the content tree: named properties plus named children.
///
/// Children are shared (`Arc`) so resources can hand out subtrees without
/// copying them.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ContentNode {
    properties: BTreeMap<String, Value>,
    children: BTreeMap<String, Arc<ContentNode>>,
}

impl ContentNode {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a node from the JSON import layout: nested objects become
    /// children, every other value becomes a property.
    pub fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| anyhow!("content node must be a JSON object"))?;
        let mut node = Self::new();
        for (name, entry) in object {
            match entry {
                Value::Object(_) => {
                    let child =
                        Self::from_json(entry).with_context(|| format!("child '{name}'"))?;
                    node.children.insert(name.clone(), Arc::new(child));
                }
                Value::Null => bail!("property '{name}' is null"),
                other => {
                    node.properties.insert(name.clone(), other.clone());
                }
            }
        }
        Ok(node)
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, name: impl Into<String>, child: ContentNode) -> Self {
        self.children.insert(name.into(), Arc::new(child));
        self
    }

    pub fn property(&self, name: &str) -> Option<&Value> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.properties
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }

    pub fn child(&self, name: &str) -> Option<&Arc<ContentNode>> {
        self.children.get(name)
    }

    pub fn children(&self) -> impl Iterator<Item = (&str, &ContentNode)> {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child.as_ref()))
    }

    /// Replace (or insert) the child `name`.
    pub(crate) fn set_child(&mut self, name: &str, child: ContentNode) {
        self.children.insert(name.to_string(), Arc::new(child));
    }

    /// Mutable access to child `name`, creating an empty node if missing.
    pub(crate) fn child_mut(&mut self, name: &str) -> &mut ContentNode {
        let child = self.children.entry(name.to_string()).or_default();
        Arc::make_mut(child)
    }
}

/// A located node: the path it was found at plus a shared handle to it.
#[derive(Clone, Debug, PartialEq)]
pub struct Resource {
    path: String,
    node: Arc<ContentNode>,
}

impl Resource {
    pub fn new(path: impl Into<String>, node: Arc<ContentNode>) -> Self {
        Self {
            path: path.into(),
            node,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        path::name(&self.path)
    }

    pub fn node(&self) -> &ContentNode {
        &self.node
    }

    pub(crate) fn shared_node(&self) -> Arc<ContentNode> {
        Arc::clone(&self.node)
    }

    pub fn child(&self, name: &str) -> Option<Resource> {
        self.node
            .child(name)
            .map(|child| Resource::new(path::join(&self.path, name), Arc::clone(child)))
    }

    /// Project this resource into a typed view. `None` means the view is not
    /// defined for this resource, which is not an error.
    pub fn adapt_to<V: FromResource>(&self) -> Option<V> {
        V::from_resource(self)
    }
}

/// Typed views a [`Resource`] can be adapted into.
pub trait FromResource: Sized {
    fn from_resource(resource: &Resource) -> Option<Self>;
}
