//! In-memory asset registry built by scanning asset folders.
//!
//! Both [`DiskFs`](crate::DiskFs) and [`MemoryFs`](crate::MemoryFs) feed the
//! files they enumerate into an [`AssetIndex`], so classification and parsing
//! behave identically on disk and in tests.
//!
//! Folders are scanned in asset-root order. A later folder replaces an earlier
//! folder's asset with the same `(kind, name)`, which lets a project override
//! library assets. Localization files are keyed by their full path instead, so
//! every library's `i18n/` files stay visible.

use crate::asset::{
    classify, is_atlas_json, AssetContent, AssetFile, AssetFolder, AssetId, AssetKind, ClassDesc,
    SoundInfo,
};
use crate::error::{Error, Result};
use crate::wav::wav_duration_ms;
use camino::Utf8Path;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone)]
pub struct AssetIndex {
    assets: BTreeMap<AssetId, AssetFile>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.assets.clear();
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Register one file found in `folder`.
    ///
    /// `load` is only called for kinds whose content has to be parsed, so
    /// images are never read during a scan.
    pub fn add_file<F>(&mut self, folder: &AssetFolder, rel_path: &Utf8Path, load: F) -> Result<()>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        let Some((kind, name)) = classify(rel_path) else {
            tracing::trace!("Skipping non-asset file {}", rel_path);
            return Ok(());
        };

        let file_name = folder.path.join(rel_path);
        let mut asset = AssetFile {
            name,
            kind,
            file_name: file_name.clone(),
            assets_dir: folder.path.clone(),
            origin: folder.origin.clone(),
            parent_asset: None,
            content: AssetContent::Binary,
        };

        match kind {
            AssetKind::Image => {}
            AssetKind::Sound => {
                let bytes = load()?;
                let duration_ms = match wav_duration_ms(&bytes) {
                    Ok(ms) => ms,
                    Err(reason) => {
                        tracing::warn!("Could not read duration of {}: {}", file_name, reason);
                        0
                    }
                };
                asset.content = AssetContent::Sound(SoundInfo { duration_ms });
            }
            AssetKind::Class => {
                let desc: ClassDesc = serde_json::from_slice(&load()?)?;
                asset.name = desc.class_name.clone();
                asset.content = AssetContent::Class(desc);
            }
            AssetKind::L10n => {
                asset.name = file_name.with_extension("").into_string();
                asset.content = AssetContent::Json(serde_json::from_slice(&load()?)?);
            }
            AssetKind::Scene | AssetKind::Prefab | AssetKind::Resource => {
                asset.content = AssetContent::Json(serde_json::from_slice(&load()?)?);
            }
        }

        if asset.kind == AssetKind::Resource {
            self.add_atlas_frames(&asset);
        }

        self.insert(asset);
        Ok(())
    }

    /// Register every frame of an atlas resource as a child image.
    fn add_atlas_frames(&mut self, atlas: &AssetFile) {
        let Some(json) = atlas.json().filter(|json| is_atlas_json(json)) else {
            return;
        };
        let Some(frames) = json.get("frames").and_then(|f| f.as_object()) else {
            return;
        };
        for frame_name in frames.keys() {
            let frame_name = frame_name
                .rsplit_once('.')
                .map(|(stem, _)| stem)
                .unwrap_or(frame_name);
            self.insert(AssetFile {
                name: frame_name.to_string(),
                kind: AssetKind::Image,
                file_name: atlas.file_name.clone(),
                assets_dir: atlas.assets_dir.clone(),
                origin: atlas.origin.clone(),
                parent_asset: Some(atlas.name.clone()),
                content: AssetContent::Binary,
            });
        }
    }

    pub fn insert(&mut self, asset: AssetFile) {
        if let Some(previous) = self.assets.insert(asset.id(), asset) {
            tracing::debug!(
                "Asset {} ({}) from {} overridden",
                previous.name,
                previous.kind,
                previous.assets_dir
            );
        }
    }

    pub fn get(&self, name: &str, kind: AssetKind) -> Option<&AssetFile> {
        self.assets.get(&(kind, name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str, kind: AssetKind) -> Option<&mut AssetFile> {
        self.assets.get_mut(&(kind, name.to_string()))
    }

    /// All assets (optionally of one kind), ordered by kind then name.
    pub fn list(&self, kind: Option<AssetKind>) -> Vec<&AssetFile> {
        self.assets
            .values()
            .filter(|asset| kind.map_or(true, |k| asset.kind == k))
            .collect()
    }

    /// Replace the JSON content of an asset after it was saved.
    pub fn update_json(&mut self, name: &str, kind: AssetKind, value: serde_json::Value) -> Result<()> {
        let asset = self
            .get_mut(name, kind)
            .ok_or_else(|| Error::AssetNotFound {
                name: name.to_string(),
                kind,
            })?;
        asset.content = AssetContent::Json(value);
        Ok(())
    }
}
