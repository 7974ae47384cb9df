//! Project description, asset model and filesystem access for thing-editor
//! projects.
//!
//! A project lives in a directory (e.g. `games/demo/`) under a workspace root
//! and is described by `thing-project.json` (or `thing-project.toml`). Its
//! assets come from the `assets/` folder of every library listed in `libs`,
//! followed by the project's own `assets/` folder.

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};

pub mod asset;
mod disk;
pub mod error;
mod fs;
pub mod index;
mod lock;
mod memory;
pub mod wav;

pub use asset::{AssetContent, AssetFile, AssetFolder, AssetKind, AssetOrigin, ClassDesc, SoundInfo};
pub use disk::DiskFs;
pub use error::{Error, Result, WavError};
pub use fs::ProjectFs;
pub use index::AssetIndex;
pub use lock::{ProjectLock, ProjectLockGuard};
pub use memory::MemoryFs;

/// Directory (relative to the project dir) that receives build manifests.
pub const BUILD_TMP_DIR: &str = ".tmp";

/// Name of every asset folder inside a project or library root.
pub const ASSETS_DIR_NAME: &str = "assets";

fn default_sound_formats() -> Vec<String> {
    vec!["ogg".to_string(), "aac".to_string()]
}

fn default_preloader_scene() -> String {
    "preloader".to_string()
}

fn default_fader() -> String {
    "fader/default".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

/// Describes a project configuration file
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDesc {
    /// The name of the project
    ///
    /// Example: `demo`
    pub name: String,

    /// Library roots whose `assets/` folders precede the project's own,
    /// relative to the workspace root.
    ///
    /// Example: `["libs/core"]`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libs: Vec<String>,

    /// Audio formats every `.wav` source is shipped in.
    #[serde(default = "default_sound_formats")]
    pub sound_formats: Vec<String>,

    /// Whether the merged localization table is embedded into the preloader
    /// manifest.
    #[serde(default)]
    pub embed_locales: bool,

    /// Default text offered when a new localization key is created.
    #[serde(
        rename = "__localesNewKeysPrefix",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub locales_new_keys_prefix: Option<String>,

    /// The bootstrap scene; everything it references ships in the preloader
    /// bundle.
    #[serde(default = "default_preloader_scene")]
    pub preloader_scene: String,

    /// Prefab used for scene transitions, always part of the preloader bundle.
    #[serde(default = "default_fader")]
    pub default_fader: String,

    /// Language selected when the project opens.
    #[serde(default = "default_language")]
    pub default_language: String,

    /// External bundler invoked at the end of a build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundler: Option<BundlerCommand>,
}

/// Command line of the external bundler.
///
/// The project root and `debug`/`release` are appended as the last two
/// arguments.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct BundlerCommand {
    pub command: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl ProjectDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            libs: Vec::new(),
            sound_formats: default_sound_formats(),
            embed_locales: false,
            locales_new_keys_prefix: None,
            preloader_scene: default_preloader_scene(),
            default_fader: default_fader(),
            default_language: default_language(),
            bundler: None,
        }
    }
}

/// An opened project: where it lives and how it is configured.
#[derive(Debug, Clone, PartialEq)]
pub struct Project {
    /// Project directory relative to the workspace root, e.g. `games/demo`.
    pub dir: Utf8PathBuf,
    pub desc: ProjectDesc,
}

impl Project {
    pub fn new(dir: impl Into<Utf8PathBuf>, desc: ProjectDesc) -> Self {
        Self {
            dir: dir.into(),
            desc,
        }
    }

    /// Load the project found in `dir` (relative to `root`).
    pub fn load(root: &Utf8Path, dir: impl Into<Utf8PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let desc_path = resolve_desc_path(&root.join(&dir))?;
        let desc = load_desc(&desc_path)?;
        Ok(Self { dir, desc })
    }

    /// Asset folders in asset-root order: libraries first, the project last.
    pub fn asset_folders(&self) -> Vec<AssetFolder> {
        let mut folders: Vec<AssetFolder> = self
            .desc
            .libs
            .iter()
            .map(|lib| {
                let lib = lib.trim_matches('/');
                AssetFolder::new(
                    Utf8PathBuf::from(lib).join(ASSETS_DIR_NAME),
                    AssetOrigin::Lib(lib.to_string()),
                )
            })
            .collect();
        folders.push(AssetFolder::new(
            self.dir.join(ASSETS_DIR_NAME),
            AssetOrigin::Project,
        ));
        folders
    }

    pub fn assets_dir(&self) -> Utf8PathBuf {
        self.dir.join(ASSETS_DIR_NAME)
    }

    /// Directory receiving manifests and generated sources.
    pub fn build_dir(&self) -> Utf8PathBuf {
        self.dir.join(BUILD_TMP_DIR)
    }
}

/// Find the project description in `project_dir`, JSON first, then TOML.
pub fn resolve_desc_path(project_dir: &Utf8Path) -> Result<Utf8PathBuf> {
    for ext in ["json", "toml"] {
        let path = project_dir.join(format!("thing-project.{}", ext));
        if path.as_std_path().exists() {
            return Ok(path);
        }
    }

    Err(Error::ProjectDescNotFound(project_dir.to_owned()))
}

pub fn load_desc(path: &Utf8Path) -> Result<ProjectDesc> {
    let content = std::fs::read_to_string(path.as_std_path())?;
    match path.extension() {
        Some("json") => Ok(serde_json::from_str(&content)?),
        Some("toml") => Ok(toml::from_str(&content)?),
        _ => Err(Error::InvalidDescExtension(path.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_desc_defaults() {
        let desc: ProjectDesc = serde_json::from_str(r#"{ "name": "demo" }"#).unwrap();
        assert_eq!(desc, ProjectDesc::new("demo"));
        assert_eq!(desc.sound_formats, vec!["ogg", "aac"]);
        assert_eq!(desc.preloader_scene, "preloader");
        assert_eq!(desc.default_fader, "fader/default");
    }

    #[test]
    fn test_desc_serialization_format() {
        let mut desc = ProjectDesc::new("demo");
        desc.embed_locales = true;
        desc.locales_new_keys_prefix = Some("menu.".to_string());
        let json = serde_json::to_string(&desc).unwrap();

        assert!(json.contains("\"embedLocales\":true"));
        assert!(json.contains("\"__localesNewKeysPrefix\":\"menu.\""));
        assert!(json.contains("\"soundFormats\""));
        assert!(!json.contains("\"libs\""));
        assert!(!json.contains("\"bundler\""));
    }

    #[test]
    fn test_asset_folder_order() {
        let mut desc = ProjectDesc::new("demo");
        desc.libs = vec!["libs/core/".to_string(), "libs/ui".to_string()];
        let project = Project::new("games/demo", desc);

        let folders: Vec<_> = project
            .asset_folders()
            .into_iter()
            .map(|f| f.path.into_string())
            .collect();
        assert_eq!(
            folders,
            vec!["libs/core/assets", "libs/ui/assets", "games/demo/assets"]
        );
        assert_eq!(project.build_dir(), Utf8PathBuf::from("games/demo/.tmp"));
    }

    #[test]
    fn test_load_prefers_json() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let project_dir = root.join("games/demo");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(project_dir.join("thing-project.json"), r#"{ "name": "from-json" }"#).unwrap();
        fs::write(project_dir.join("thing-project.toml"), "name = \"from-toml\"\n").unwrap();

        let project = Project::load(&root, "games/demo").unwrap();
        assert_eq!(project.desc.name, "from-json");
    }

    #[test]
    fn test_load_toml() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let project_dir = root.join("games/demo");
        fs::create_dir_all(&project_dir).unwrap();
        fs::write(
            project_dir.join("thing-project.toml"),
            "name = \"demo\"\nembedLocales = true\nsoundFormats = [\"mp3\"]\n",
        )
        .unwrap();

        let project = Project::load(&root, "games/demo").unwrap();
        assert!(project.desc.embed_locales);
        assert_eq!(project.desc.sound_formats, vec!["mp3"]);
    }

    #[test]
    fn test_missing_desc() {
        let dir = tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let result = Project::load(&root, "games/nothing");
        assert!(matches!(result, Err(Error::ProjectDescNotFound(_))));
    }
}
