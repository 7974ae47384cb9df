//! Walking serialized scene and prefab graphs.
//!
//! A serialized node is `{ "c": <class>, "p": { ..props }, ":": [ ..children ] }`.
//! The walkers here expect graphs already passed through
//! [`NameFilter::strip`](crate::filter::NameFilter::strip), so excluded nodes
//! are never visited.

use crate::filter::CHILDREN_KEY;
use serde_json::Value;
use std::collections::BTreeSet;

/// Key holding a node's class name.
pub const CLASS_KEY: &str = "c";

/// Class names used by `node` and all of its descendants.
pub fn collect_class_names(node: &Value, out: &mut BTreeSet<String>) {
    if let Some(class) = node.get(CLASS_KEY).and_then(Value::as_str) {
        out.insert(class.to_string());
    }
    if let Some(children) = node.get(CHILDREN_KEY).and_then(Value::as_array) {
        for child in children {
            collect_class_names(child, out);
        }
    }
}

/// Every string value in `value` apart from class names. Asset references
/// (image names, `prefabName`, sound names, ...) are plain strings, so this is
/// the candidate set resolved against the asset registry.
pub fn collect_strings(value: &Value, out: &mut BTreeSet<String>) {
    match value {
        Value::String(s) => {
            out.insert(s.clone());
        }
        Value::Array(items) => {
            for item in items {
                collect_strings(item, out);
            }
        }
        Value::Object(map) => {
            for (key, child) in map {
                if key == CLASS_KEY && child.is_string() {
                    continue;
                }
                collect_strings(child, out);
            }
        }
        _ => {}
    }
}
