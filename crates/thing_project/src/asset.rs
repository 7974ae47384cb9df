//! Asset model shared by the localization editor and the build pipeline.
//!
//! Every file found under an asset folder is classified by its suffix into an
//! [`AssetKind`] and registered as an [`AssetFile`]. The asset *name* is the
//! path relative to its asset folder with the kind suffix removed, e.g.
//! `levels/level1.s.json` becomes the scene `levels/level1`.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of an asset, derived from its file name.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AssetKind {
    Scene,
    Prefab,
    Class,
    Image,
    Sound,
    Resource,
    L10n,
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AssetKind::Scene => "scene",
            AssetKind::Prefab => "prefab",
            AssetKind::Class => "class",
            AssetKind::Image => "image",
            AssetKind::Sound => "sound",
            AssetKind::Resource => "resource",
            AssetKind::L10n => "l10n",
        };
        f.write_str(s)
    }
}

/// Where an asset folder comes from.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum AssetOrigin {
    /// The open project's own `assets/` folder.
    Project,
    /// A library root listed in the project's `libs`.
    Lib(String),
}

impl fmt::Display for AssetOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssetOrigin::Project => f.write_str("project"),
            AssetOrigin::Lib(name) => write!(f, "lib {}", name),
        }
    }
}

/// One asset root, in asset-root order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetFolder {
    /// Folder path relative to the filesystem root.
    pub path: Utf8PathBuf,
    pub origin: AssetOrigin,
}

impl AssetFolder {
    pub fn new(path: impl Into<Utf8PathBuf>, origin: AssetOrigin) -> Self {
        Self {
            path: path.into(),
            origin,
        }
    }
}

/// Identity of an asset inside a registry.
pub type AssetId = (AssetKind, String);

/// Class descriptor stored in a `*.c.json` file.
///
/// `extends` names the parent class explicitly so that ancestry can be walked
/// without loading any code.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClassDesc {
    pub class_name: String,

    /// Module path the generated registration source imports the class from.
    pub source_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,

    /// Declared default property values.
    #[serde(default)]
    pub default_values: serde_json::Value,

    /// Companion classes that must ship together with this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_components: Vec<String>,
}

/// Metadata read from a sound file.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SoundInfo {
    pub duration_ms: u64,
}

/// Parsed content of an asset.
#[derive(Debug, Clone, PartialEq)]
pub enum AssetContent {
    /// Scenes, prefabs, resources and localization files.
    Json(serde_json::Value),
    Class(ClassDesc),
    Sound(SoundInfo),
    /// Binary content that is only ever copied or hashed (images).
    Binary,
}

/// A registered asset.
#[derive(Debug, Clone, PartialEq)]
pub struct AssetFile {
    pub name: String,
    pub kind: AssetKind,
    /// File path relative to the filesystem root.
    pub file_name: Utf8PathBuf,
    /// The asset folder this file was found in.
    pub assets_dir: Utf8PathBuf,
    pub origin: AssetOrigin,
    /// Set for atlas frames: the resource asset that owns this image.
    pub parent_asset: Option<String>,
    pub content: AssetContent,
}

impl AssetFile {
    pub fn id(&self) -> AssetId {
        (self.kind, self.name.clone())
    }

    pub fn json(&self) -> Option<&serde_json::Value> {
        match &self.content {
            AssetContent::Json(value) => Some(value),
            _ => None,
        }
    }

    pub fn class_desc(&self) -> Option<&ClassDesc> {
        match &self.content {
            AssetContent::Class(desc) => Some(desc),
            _ => None,
        }
    }

    pub fn sound_info(&self) -> Option<SoundInfo> {
        match &self.content {
            AssetContent::Sound(info) => Some(*info),
            _ => None,
        }
    }

    /// A resource is an atlas when its JSON carries both `frames` and `meta`.
    pub fn is_atlas(&self) -> bool {
        self.kind == AssetKind::Resource && self.json().is_some_and(is_atlas_json)
    }
}

pub fn is_atlas_json(value: &serde_json::Value) -> bool {
    value.get("frames").is_some() && value.get("meta").is_some()
}

const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "webp", "svg"];

/// Name of the directory that holds localization files.
pub const L10N_DIR_NAME: &str = "i18n";

/// Classify a file by its path relative to an asset folder.
///
/// Returns the asset kind and the asset name, or `None` for files that are
/// not assets. Localization files are named by their full path (see
/// [`AssetIndex`](crate::index::AssetIndex)), so only their kind is
/// meaningful here.
pub fn classify(rel_path: &Utf8Path) -> Option<(AssetKind, String)> {
    let file_name = rel_path.file_name()?;
    let rel = rel_path.as_str().replace('\\', "/");
    let lower = file_name.to_ascii_lowercase();

    for (suffix, kind) in [
        (".s.json", AssetKind::Scene),
        (".p.json", AssetKind::Prefab),
        (".c.json", AssetKind::Class),
    ] {
        if lower.ends_with(suffix) {
            return Some((kind, rel[..rel.len() - suffix.len()].to_string()));
        }
    }

    let extension = rel_path.extension()?.to_ascii_lowercase();
    let stem = rel[..rel.len() - extension.len() - 1].to_string();

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        return Some((AssetKind::Image, stem));
    }
    if extension == "wav" {
        return Some((AssetKind::Sound, stem));
    }
    if extension == "json" {
        let in_l10n_dir = rel_path
            .parent()
            .and_then(|p| p.file_name())
            .is_some_and(|dir| dir == L10N_DIR_NAME);
        let kind = if in_l10n_dir {
            AssetKind::L10n
        } else {
            AssetKind::Resource
        };
        return Some((kind, stem));
    }

    None
}
