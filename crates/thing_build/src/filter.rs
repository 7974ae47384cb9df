//! Build-mode name exclusion.
//!
//! Assets and serialized nodes whose names start with the mode's prefix are
//! left out of a build: `___` in debug builds, `__` in release builds. So
//! `__debug_overlay` ships in debug builds but not in release builds, while
//! `___scratch` never ships.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Key of the child list in a serialized node: `{ "c": .., "p": .., ":": [..] }`.
pub const CHILDREN_KEY: &str = ":";

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    pub fn from_debug(debug: bool) -> Self {
        if debug {
            BuildMode::Debug
        } else {
            BuildMode::Release
        }
    }

    pub fn is_debug(self) -> bool {
        self == BuildMode::Debug
    }

    /// Name prefix of everything excluded from this build.
    pub fn exclusion_prefix(self) -> &'static str {
        match self {
            BuildMode::Debug => "___",
            BuildMode::Release => "__",
        }
    }

    /// Output directory name, also the bundler's mode argument.
    pub fn as_str(self) -> &'static str {
        match self {
            BuildMode::Debug => "debug",
            BuildMode::Release => "release",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NameFilter {
    prefix: &'static str,
}

impl NameFilter {
    pub fn new(mode: BuildMode) -> Self {
        Self {
            prefix: mode.exclusion_prefix(),
        }
    }

    pub fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// An asset name is valid unless it, or any of its path segments, starts
    /// with the prefix.
    pub fn is_name_valid(&self, name: &str) -> bool {
        !name.starts_with(self.prefix) && !name.contains(&format!("/{}", self.prefix))
    }

    /// Whether a serialized child node survives: its `name` must not start
    /// with the prefix and its `prefabName` must be a valid asset name.
    pub fn keeps_node(&self, node: &Value) -> bool {
        let Some(props) = node.get("p") else {
            return true;
        };
        if let Some(name) = props.get("name").and_then(Value::as_str) {
            if name.starts_with(self.prefix) {
                return false;
            }
        }
        if let Some(prefab) = props.get("prefabName").and_then(Value::as_str) {
            if !self.is_name_valid(prefab) {
                return false;
            }
        }
        true
    }

    /// Copy of `value` with every prefixed key removed and every child list
    /// filtered with [`keeps_node`](Self::keeps_node), at any depth.
    pub fn strip(&self, value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut out = Map::new();
                for (key, child) in map {
                    if key.starts_with(self.prefix) {
                        continue;
                    }
                    let child = match child {
                        Value::Array(items) if key == CHILDREN_KEY => Value::Array(
                            items
                                .iter()
                                .filter(|item| self.keeps_node(item))
                                .map(|item| self.strip(item))
                                .collect(),
                        ),
                        _ => self.strip(child),
                    };
                    out.insert(key.clone(), child);
                }
                Value::Object(out)
            }
            Value::Array(items) => Value::Array(items.iter().map(|item| self.strip(item)).collect()),
            other => other.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefix_per_mode() {
        let release = NameFilter::new(BuildMode::Release);
        let debug = NameFilter::new(BuildMode::Debug);

        assert!(!release.is_name_valid("__debug_overlay"));
        assert!(debug.is_name_valid("__debug_overlay"));
        assert!(!debug.is_name_valid("___scratch"));
        assert!(!release.is_name_valid("ui/__wip/panel"));
        assert!(release.is_name_valid("ui/menu__old"));
    }

    #[test]
    fn test_keeps_node() {
        let filter = NameFilter::new(BuildMode::Release);
        assert!(filter.keeps_node(&json!({ "c": "Sprite" })));
        assert!(!filter.keeps_node(&json!({ "c": "Sprite", "p": { "name": "__marker" } })));
        assert!(!filter.keeps_node(&json!({ "c": "Container", "p": { "prefabName": "dev/__cheats" } })));
        assert!(filter.keeps_node(&json!({ "c": "Container", "p": { "name": "hero" } })));
    }

    #[test]
    fn test_strip_recursive() {
        let filter = NameFilter::new(BuildMode::Release);
        let scene = json!({
            "c": "Scene",
            "p": { "name": "level1", "__editorNote": "x" },
            ":": [
                { "c": "Sprite", "p": { "name": "__gizmo" } },
                { "c": "Container", "p": { "name": "enemies" }, ":": [
                    { "c": "Enemy", "p": { "prefabName": "__test_enemy" } },
                    { "c": "Enemy", "p": { "prefabName": "enemy" } }
                ] }
            ]
        });

        assert_eq!(
            filter.strip(&scene),
            json!({
                "c": "Scene",
                "p": { "name": "level1" },
                ":": [
                    { "c": "Container", "p": { "name": "enemies" }, ":": [
                        { "c": "Enemy", "p": { "prefabName": "enemy" } }
                    ] }
                ]
            })
        );
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(BuildMode::from_debug(true).to_string(), "debug");
        assert_eq!(BuildMode::Release.as_str(), "release");
    }
}
