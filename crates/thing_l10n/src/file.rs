use crate::error::{Error, Result};
use crate::tree::{KeyedText, LocalizationTree};
use camino::{Utf8Path, Utf8PathBuf};
use thing_project::{AssetFile, AssetKind, AssetOrigin};

/// One language file of a localization directory, e.g.
/// `games/demo/assets/i18n/en.json`.
///
/// The text is held flattened; [`to_json`](Self::to_json) re-nests it for
/// persistence. A file is always rewritten as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizationFile {
    /// Registry name of the backing asset (file path without extension).
    pub asset_name: String,
    pub file_name: Utf8PathBuf,
    /// Directory the file lives in; groups one file per language.
    pub directory: String,
    pub language: String,
    pub origin: AssetOrigin,
    /// Asset folder the directory belongs to.
    pub assets_dir: Utf8PathBuf,
    pub keyed_text: KeyedText,
}

impl LocalizationFile {
    /// Create a file that does not exist on disk yet.
    pub fn new(
        directory: impl Into<String>,
        language: impl Into<String>,
        origin: AssetOrigin,
        assets_dir: impl Into<Utf8PathBuf>,
        keyed_text: KeyedText,
    ) -> Self {
        let directory = directory.into();
        let language = language.into();
        let file_name = Utf8PathBuf::from(&directory).join(format!("{}.json", language));
        Self {
            asset_name: file_name.with_extension("").into_string(),
            file_name,
            directory,
            language,
            origin,
            assets_dir: assets_dir.into(),
            keyed_text,
        }
    }

    pub fn from_asset(asset: &AssetFile) -> Result<Self> {
        if asset.kind != AssetKind::L10n {
            return Err(Error::InvalidContent(format!(
                "{} is a {} asset, not a localization file",
                asset.file_name, asset.kind
            )));
        }
        let json = asset.json().ok_or_else(|| {
            Error::InvalidContent(format!("{} has no JSON content", asset.file_name))
        })?;

        let (directory, language) = split_file_name(&asset.file_name)?;
        Ok(Self {
            asset_name: asset.name.clone(),
            file_name: asset.file_name.clone(),
            directory,
            language,
            origin: asset.origin.clone(),
            assets_dir: asset.assets_dir.clone(),
            keyed_text: LocalizationTree::from_json(json).flatten(),
        })
    }

    /// A file for `language` next to `sibling`, holding the same keys with
    /// empty texts.
    pub fn skeleton_of(sibling: &LocalizationFile, language: impl Into<String>) -> Self {
        let keyed_text = sibling
            .keyed_text
            .keys()
            .map(|key| (key.clone(), String::new()))
            .collect();
        Self::new(
            sibling.directory.clone(),
            language,
            sibling.origin.clone(),
            sibling.assets_dir.clone(),
            keyed_text,
        )
    }

    pub fn to_json(&self) -> serde_json::Value {
        LocalizationTree::unflatten(&self.keyed_text).to_json()
    }

    pub fn has_key(&self, key: &str) -> bool {
        self.keyed_text.contains_key(key)
    }
}

/// `a/b/i18n/en.json` → (`a/b/i18n`, `en`)
fn split_file_name(file_name: &Utf8Path) -> Result<(String, String)> {
    let language = file_name
        .file_stem()
        .ok_or_else(|| Error::InvalidContent(format!("{} has no file name", file_name)))?;
    let directory = file_name.parent().map(Utf8Path::as_str).unwrap_or_default();
    Ok((directory.to_string(), language.to_string()))
}
