//! Filesystem collaborator consumed by the localization editor and the build.
//!
//! [`ProjectFs`] is deliberately narrow: whole-file reads and writes, existence
//! checks, copies and access to the scanned [`AssetIndex`]. Paths are always
//! relative to the filesystem root (the directory that holds `games/`,
//! `libs/` and the editor sources).

use crate::asset::{AssetFile, AssetKind};
use crate::error::{Error, Result};
use crate::index::AssetIndex;
use camino::Utf8Path;

pub trait ProjectFs {
    /// Read a whole file.
    fn read_file(&self, path: &Utf8Path) -> Result<Vec<u8>>;

    /// Replace a file's content in one write, creating parent directories.
    fn write_file(&mut self, path: &Utf8Path, content: &[u8]) -> Result<()>;

    fn exists(&self, path: &Utf8Path) -> bool;

    fn copy_file(&mut self, from: &Utf8Path, to: &Utf8Path) -> Result<()>;

    /// Re-scan every asset folder, replacing the current index.
    fn refresh_assets_list(&mut self) -> Result<()>;

    fn assets(&self) -> &AssetIndex;

    fn assets_mut(&mut self) -> &mut AssetIndex;

    fn read_to_string(&self, path: &Utf8Path) -> Result<String> {
        String::from_utf8(self.read_file(path)?).map_err(|_| Error::InvalidUtf8(path.to_owned()))
    }

    fn list_assets(&self, kind: Option<AssetKind>) -> Vec<&AssetFile> {
        self.assets().list(kind)
    }

    fn get_asset(&self, name: &str, kind: AssetKind) -> Option<&AssetFile> {
        self.assets().get(name, kind)
    }

    /// Serialize `content` into the asset's backing file and update the index.
    fn save_asset(&mut self, name: &str, kind: AssetKind, content: &serde_json::Value) -> Result<()> {
        let file_name = self
            .get_asset(name, kind)
            .map(|asset| asset.file_name.clone())
            .ok_or_else(|| Error::AssetNotFound {
                name: name.to_string(),
                kind,
            })?;

        let bytes = serde_json::to_vec_pretty(content)?;
        self.write_file(&file_name, &bytes)?;
        self.assets_mut().update_json(name, kind, content.clone())
    }

    /// Serialize a JSON value into `path` (pretty-printed).
    fn write_json(&mut self, path: &Utf8Path, content: &serde_json::Value) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(content)?;
        self.write_file(path, &bytes)
    }
}
