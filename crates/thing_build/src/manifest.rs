//! Asset descriptors: the JSON manifests the runtime loads.
//!
//! One [`AssetDescriptor`] is produced per partition. Binary files are not
//! embedded; they are listed under content-hashed names and recorded as
//! [`CopyEntry`] values for the bundler to copy.

use crate::error::Result;
use crate::filter::NameFilter;
use crate::hash::hashed_asset_name;
use camino::Utf8PathBuf;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use thing_l10n::LocalizationTable;
use thing_project::asset::AssetId;
use thing_project::{AssetFile, AssetKind, ProjectDesc, ProjectFs};

/// Engine-provided textures that never have a file to ship.
pub const SYSTEM_TEXTURES: [&str; 2] = ["EMPTY", "WHITE"];

pub const PRELOADER_MANIFEST: &str = "assets-preloader.json";
pub const MAIN_MANIFEST: &str = "assets-main.json";
pub const COPY_LIST: &str = "assets-to-copy.json";

/// One file the bundler copies into the build output.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct CopyEntry {
    pub from: Utf8PathBuf,
    pub to: String,
}

/// `[hashedName, durationMs]`
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct SoundEntry(pub String, pub u64);

#[derive(Serialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssetDescriptor {
    pub scenes: BTreeMap<String, Value>,
    pub prefabs: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resources: Option<Vec<String>>,
    pub images: Vec<String>,
    pub sounds: Vec<SoundEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_desc: Option<ProjectDesc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<LocalizationTable>,
}

impl AssetDescriptor {
    /// Serialized form with every excluded key and child removed.
    pub fn to_filtered_json(&self, filter: &NameFilter) -> Result<Value> {
        Ok(filter.strip(&serde_json::to_value(self)?))
    }
}

/// Builds descriptors and accumulates the copy list across partitions.
pub struct ManifestBuilder<'a> {
    fs: &'a dyn ProjectFs,
    filter: NameFilter,
    sound_formats: &'a [String],
    copies: Vec<CopyEntry>,
}

impl<'a> ManifestBuilder<'a> {
    pub fn new(fs: &'a dyn ProjectFs, filter: NameFilter, sound_formats: &'a [String]) -> Self {
        Self {
            fs,
            filter,
            sound_formats,
            copies: Vec::new(),
        }
    }

    /// Describe the assets in `ids`.
    pub fn describe(&mut self, ids: &BTreeSet<AssetId>) -> Result<AssetDescriptor> {
        let fs = self.fs;
        let mut descriptor = AssetDescriptor::default();
        for (kind, name) in ids {
            if !self.filter.is_name_valid(name) {
                continue;
            }
            let Some(asset) = fs.get_asset(name, *kind) else {
                continue;
            };
            match asset.kind {
                AssetKind::Image => self.add_image(asset, &mut descriptor)?,
                AssetKind::Sound => self.add_sound(asset, &mut descriptor)?,
                AssetKind::Resource => self.add_resource(asset, &mut descriptor)?,
                AssetKind::Scene => {
                    if let Some(json) = asset.json() {
                        descriptor.scenes.insert(asset.name.clone(), json.clone());
                    }
                }
                AssetKind::Prefab => {
                    if let Some(json) = asset.json() {
                        descriptor.prefabs.insert(asset.name.clone(), json.clone());
                    }
                }
                AssetKind::Class | AssetKind::L10n => {}
            }
        }
        Ok(descriptor)
    }

    pub fn copies(&self) -> &[CopyEntry] {
        &self.copies
    }

    pub fn into_copies(self) -> Vec<CopyEntry> {
        self.copies
    }

    fn add_image(&mut self, asset: &AssetFile, descriptor: &mut AssetDescriptor) -> Result<()> {
        if SYSTEM_TEXTURES.contains(&asset.name.as_str()) || asset.parent_asset.is_some() {
            return Ok(());
        }
        let bytes = self.fs.read_file(&asset.file_name)?;
        let extension = asset.file_name.extension().unwrap_or("png");
        let hashed = format!("{}.{}", hashed_asset_name(&asset.name, &bytes), extension);

        self.copies.push(CopyEntry {
            from: asset.file_name.clone(),
            to: hashed.clone(),
        });
        descriptor.images.push(hashed);
        Ok(())
    }

    fn add_sound(&mut self, asset: &AssetFile, descriptor: &mut AssetDescriptor) -> Result<()> {
        let bytes = self.fs.read_file(&asset.file_name)?;
        let hashed = hashed_asset_name(&asset.name, &bytes);

        for format in self.sound_formats {
            self.copies.push(CopyEntry {
                from: asset.file_name.with_extension(format),
                to: format!("{}.{}", hashed, format),
            });
        }
        let duration = asset.sound_info().map_or(0, |info| info.duration_ms);
        descriptor.sounds.push(SoundEntry(hashed, duration));
        Ok(())
    }

    fn add_resource(&mut self, asset: &AssetFile, descriptor: &mut AssetDescriptor) -> Result<()> {
        if !asset.is_atlas() {
            return Ok(());
        }
        let bytes = self.fs.read_file(&asset.file_name)?;
        let hashed = hashed_asset_name(&asset.name, &bytes);

        self.copies.push(CopyEntry {
            from: asset.file_name.clone(),
            to: format!("{}.json", hashed),
        });
        descriptor.resources.get_or_insert_with(Vec::new).push(hashed);
        Ok(())
    }
}
