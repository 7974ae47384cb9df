//! In-memory [`ProjectFs`] implementation.
//!
//! Holds every file in a map and records each write, which makes it the fake
//! of choice for exercising persistence and build output without touching disk.

use crate::asset::AssetFolder;
use crate::error::{Error, Result};
use crate::fs::ProjectFs;
use crate::index::AssetIndex;
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct MemoryFs {
    files: BTreeMap<Utf8PathBuf, Vec<u8>>,
    folders: Vec<AssetFolder>,
    index: AssetIndex,
    writes: Vec<Utf8PathBuf>,
    refresh_count: usize,
}

impl MemoryFs {
    pub fn new(folders: Vec<AssetFolder>) -> Self {
        Self {
            folders,
            ..Default::default()
        }
    }

    /// Add a file without recording it as a write.
    pub fn with_file(mut self, path: impl Into<Utf8PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.into(), content.into());
        self
    }

    pub fn with_json(self, path: impl Into<Utf8PathBuf>, value: serde_json::Value) -> Self {
        let bytes = serde_json::to_vec(&value).unwrap_or_default();
        self.with_file(path, bytes)
    }

    /// Every path written through [`ProjectFs::write_file`], in order.
    pub fn writes(&self) -> &[Utf8PathBuf] {
        &self.writes
    }

    pub fn writes_to(&self, path: &Utf8Path) -> usize {
        self.writes.iter().filter(|p| p.as_path() == path).count()
    }

    pub fn clear_writes(&mut self) {
        self.writes.clear();
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_count
    }

    pub fn file(&self, path: &Utf8Path) -> Option<&[u8]> {
        self.files.get(path).map(Vec::as_slice)
    }

    pub fn json(&self, path: &Utf8Path) -> Option<serde_json::Value> {
        self.file(path)
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }
}

fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(path.as_str().trim_start_matches('/'))
}

impl ProjectFs for MemoryFs {
    fn read_file(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        self.files
            .get(&normalize(path))
            .cloned()
            .ok_or_else(|| Error::FileNotFound(path.to_owned()))
    }

    fn write_file(&mut self, path: &Utf8Path, content: &[u8]) -> Result<()> {
        let path = normalize(path);
        self.writes.push(path.clone());
        self.files.insert(path, content.to_vec());
        Ok(())
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.files.contains_key(&normalize(path))
    }

    fn copy_file(&mut self, from: &Utf8Path, to: &Utf8Path) -> Result<()> {
        let content = self.read_file(from)?;
        self.files.insert(normalize(to), content);
        Ok(())
    }

    fn refresh_assets_list(&mut self) -> Result<()> {
        self.refresh_count += 1;
        self.index.clear();

        for folder in &self.folders {
            for (path, bytes) in &self.files {
                let Ok(rel) = path.strip_prefix(&folder.path) else {
                    continue;
                };
                let added = self.index.add_file(folder, rel, || Ok(bytes.clone()));
                if let Err(e) = added {
                    tracing::warn!("Failed to load asset {}: {}", path, e);
                }
            }
        }
        Ok(())
    }

    fn assets(&self) -> &AssetIndex {
        &self.index
    }

    fn assets_mut(&mut self) -> &mut AssetIndex {
        &mut self.index
    }
}
