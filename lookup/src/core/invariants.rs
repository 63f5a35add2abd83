//! Semantic invariants not expressible via JSON Schema.

use serde_json::Value;

use crate::core::path;
use crate::resource::ContentNode;

/// Check content tree invariants:
/// - Node and property names are non-empty, contain no `/`, and are not `.` or `..`
/// - Array properties hold scalars of a single JSON type
pub fn validate_invariants(root: &ContentNode) -> Vec<String> {
    let mut errors = Vec::new();
    validate_node(root, "/", &mut errors);
    errors
}

fn validate_node(node: &ContentNode, node_path: &str, errors: &mut Vec<String>) {
    for (name, value) in node.properties() {
        if let Some(problem) = name_problem(name) {
            errors.push(format!("{node_path}: property {problem}"));
        }
        if matches!(value, Value::Array(items) if !homogeneous_scalars(items)) {
            errors.push(format!(
                "{node_path}: property '{name}' must hold scalars of one type"
            ));
        }
    }

    for (name, child) in node.children() {
        if let Some(problem) = name_problem(name) {
            errors.push(format!("{node_path}: child {problem}"));
            continue;
        }
        validate_node(child, &path::join(node_path, name), errors);
    }
}

fn name_problem(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("name must be non-empty".to_string());
    }
    if name == "." || name == ".." {
        return Some(format!("name '{name}' is reserved"));
    }
    if name.contains('/') {
        return Some(format!("name '{name}' must not contain '/'"));
    }
    None
}

fn homogeneous_scalars(items: &[Value]) -> bool {
    let kind = |value: &Value| match value {
        Value::String(_) => Some(0),
        Value::Number(_) => Some(1),
        Value::Bool(_) => Some(2),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    let Some(first) = items.first() else {
        return true;
    };
    let Some(expected) = kind(first) else {
        return false;
    };
    items.iter().all(|item| kind(item) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn valid_tree_has_no_errors() {
        let tree = ContentNode::from_json(&json!({
            "page1": { "jcr:content": { "jcr:title": "page1", "tags": ["a", "b"], "empty": [] } }
        }))
        .expect("tree");
        assert!(validate_invariants(&tree).is_empty());
    }

    #[test]
    fn reports_bad_names_with_their_location() {
        let tree = ContentNode::from_json(&json!({
            "page1": { "a/b": "x", "..": {} },
            "": "empty"
        }))
        .expect("tree");
        let errors = validate_invariants(&tree);
        assert_eq!(errors.len(), 3, "{errors:?}");
        assert!(errors.iter().any(|e| e == "/: property name must be non-empty"));
        assert!(errors.iter().any(|e| e.starts_with("/page1: property name 'a/b'")));
        assert!(errors.iter().any(|e| e.starts_with("/page1: child name '..'")));
    }

    #[test]
    fn reports_mixed_arrays() {
        let tree = ContentNode::from_json(&json!({ "mixed": ["a", 1], "nested": [["a"]] }))
            .expect("tree");
        assert_eq!(validate_invariants(&tree).len(), 2);
    }
}
