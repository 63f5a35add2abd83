//! Page view: a resource that carries a `jcr:content` child.

use crate::core::value_map::ValueMap;
use crate::resource::{FromResource, Resource};

pub const CONTENT_NODE: &str = "jcr:content";
pub const TITLE_PROPERTY: &str = "jcr:title";

#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    resource: Resource,
    content: Resource,
}

impl Page {
    pub fn path(&self) -> &str {
        self.resource.path()
    }

    /// The `jcr:content` child holding the page properties.
    pub fn content(&self) -> &Resource {
        &self.content
    }

    pub fn properties(&self) -> ValueMap {
        ValueMap::new(self.content.shared_node())
    }

    pub fn title(&self) -> Option<String> {
        self.properties().get(TITLE_PROPERTY)
    }
}

/// Only resources with a `jcr:content` child are pages.
impl FromResource for Page {
    fn from_resource(resource: &Resource) -> Option<Self> {
        let content = resource.child(CONTENT_NODE)?;
        Some(Self {
            resource: resource.clone(),
            content,
        })
    }
}
