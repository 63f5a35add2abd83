//! Typed property lookups over a resource.

use std::sync::Arc;

use serde_json::Value;

use crate::resource::{ContentNode, FromResource, Resource};

/// Conversion from a stored property value into a requested Rust type.
///
/// Conversions are strict: a value of a different JSON type yields `None`
/// rather than being coerced.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl FromValue for u64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_u64()
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_f64()
    }
}

impl FromValue for Vec<String> {
    fn from_value(value: &Value) -> Option<Self> {
        value.as_array()?.iter().map(String::from_value).collect()
    }
}

/// Property view of a resource.
#[derive(Clone, Debug, PartialEq)]
pub struct ValueMap {
    node: Arc<ContentNode>,
}

impl ValueMap {
    pub fn new(node: Arc<ContentNode>) -> Self {
        Self { node }
    }

    /// Read `name` as `T`. Missing or mistyped properties yield `None`.
    pub fn get<T: FromValue>(&self, name: &str) -> Option<T> {
        self.node.property(name).and_then(T::from_value)
    }

    pub fn get_or<T: FromValue>(&self, name: &str, default: T) -> T {
        self.get(name).unwrap_or(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.node.property(name).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.node.properties().map(|(name, _)| name)
    }
}

impl FromResource for ValueMap {
    fn from_resource(resource: &Resource) -> Option<Self> {
        Some(Self::new(resource.shared_node()))
    }
}
