//! Nested ↔ flat conversion of localization data.
//!
//! On disk a language file is a nested JSON object:
//!
//! ```json
//! { "menu": { "play": "Play", "quit": "Quit" } }
//! ```
//!
//! The editor works on the flattened form, `menu.play` / `menu.quit`. A
//! [`LocalizationTree`] is the explicit in-memory form of the nested document;
//! [`LocalizationTree::flatten`] and [`LocalizationTree::unflatten`] convert
//! between the two.

use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Separator between path segments of a flattened key.
pub const KEY_SEPARATOR: char = '.';

/// Flattened key → text mapping.
pub type KeyedText = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum L10nNode {
    Text(String),
    Branch(BTreeMap<String, L10nNode>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalizationTree {
    root: BTreeMap<String, L10nNode>,
}

impl LocalizationTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a tree from a nested JSON object.
    ///
    /// Numbers and booleans are kept as their JSON text; `null` and arrays
    /// are not translatable and are dropped.
    pub fn from_json(value: &Value) -> Self {
        let root = match value {
            Value::Object(map) => branch_from_json(map, ""),
            _ => BTreeMap::new(),
        };
        Self { root }
    }

    pub fn to_json(&self) -> Value {
        Value::Object(branch_to_json(&self.root))
    }

    /// Collapse nested paths into dotted keys.
    pub fn flatten(&self) -> KeyedText {
        let mut out = KeyedText::new();
        flatten_into(&self.root, "", &mut out);
        out
    }

    /// Expand dotted keys into nested branches.
    ///
    /// When a key is both a leaf and the prefix of another key (`a` and
    /// `a.b`), the branch wins and the leaf text is dropped.
    pub fn unflatten(keyed: &KeyedText) -> Self {
        let mut tree = Self::new();
        for (key, text) in keyed {
            tree.insert(key, text.clone());
        }
        tree
    }

    /// Same shape as [`unflatten`](Self::unflatten) with every text empty.
    pub fn skeleton<'a>(keys: impl IntoIterator<Item = &'a String>) -> Self {
        let mut tree = Self::new();
        for key in keys {
            tree.insert(key, String::new());
        }
        tree
    }

    pub fn insert(&mut self, key: &str, text: String) {
        let mut segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
        let leaf = segments.pop().unwrap_or_default();

        let mut node = &mut self.root;
        for segment in segments {
            let entry = node
                .entry(segment.to_string())
                .or_insert_with(|| L10nNode::Branch(BTreeMap::new()));
            if let L10nNode::Text(previous) = entry {
                tracing::warn!(
                    "Localization key \"{}\" shadows text \"{}\" of its parent path",
                    key,
                    previous
                );
                *entry = L10nNode::Branch(BTreeMap::new());
            }
            node = match entry {
                L10nNode::Branch(children) => children,
                L10nNode::Text(_) => unreachable!("text nodes were replaced above"),
            };
        }

        match node.get(leaf) {
            Some(L10nNode::Branch(_)) => {
                tracing::warn!("Localization key \"{}\" is also a parent path, text dropped", key);
            }
            _ => {
                node.insert(leaf.to_string(), L10nNode::Text(text));
            }
        }
    }
}

fn branch_from_json(map: &Map<String, Value>, path: &str) -> BTreeMap<String, L10nNode> {
    let mut out = BTreeMap::new();
    for (segment, value) in map {
        let node = match value {
            Value::String(s) => L10nNode::Text(s.clone()),
            Value::Number(n) => L10nNode::Text(n.to_string()),
            Value::Bool(b) => L10nNode::Text(b.to_string()),
            Value::Object(children) => {
                L10nNode::Branch(branch_from_json(children, &join(path, segment)))
            }
            Value::Null | Value::Array(_) => {
                tracing::debug!("Ignoring non-text localization value at {}", join(path, segment));
                continue;
            }
        };
        out.insert(segment.clone(), node);
    }
    out
}

fn branch_to_json(branch: &BTreeMap<String, L10nNode>) -> Map<String, Value> {
    branch
        .iter()
        .map(|(segment, node)| {
            let value = match node {
                L10nNode::Text(text) => Value::String(text.clone()),
                L10nNode::Branch(children) => Value::Object(branch_to_json(children)),
            };
            (segment.clone(), value)
        })
        .collect()
}

fn flatten_into(branch: &BTreeMap<String, L10nNode>, prefix: &str, out: &mut KeyedText) {
    for (segment, node) in branch {
        let key = join(prefix, segment);
        match node {
            L10nNode::Text(text) => {
                out.insert(key, text.clone());
            }
            L10nNode::Branch(children) => flatten_into(children, &key, out),
        }
    }
}

fn join(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}{}{}", prefix, KEY_SEPARATOR, segment)
    }
}
