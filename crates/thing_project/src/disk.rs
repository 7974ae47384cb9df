//! On-disk [`ProjectFs`] implementation.

use crate::asset::AssetFolder;
use crate::error::{Error, Result};
use crate::fs::ProjectFs;
use crate::index::AssetIndex;
use camino::{Utf8Path, Utf8PathBuf};
use walkdir::WalkDir;

/// Filesystem-backed project access rooted at a workspace directory.
///
/// ```text
/// root/
///   libs/
///     core/
///       assets/               # library asset folder (scanned first)
///   games/
///     demo/
///       thing-project.json
///       assets/               # project asset folder (scanned last)
///         boot.s.json
///         i18n/en.json
///       .tmp/                 # build output, never scanned
/// ```
pub struct DiskFs {
    root: Utf8PathBuf,
    folders: Vec<AssetFolder>,
    index: AssetIndex,
}

impl DiskFs {
    /// Create a filesystem view and scan the given asset folders.
    pub fn open(root: Utf8PathBuf, folders: Vec<AssetFolder>) -> Result<Self> {
        let mut fs = Self {
            root,
            folders,
            index: AssetIndex::new(),
        };
        fs.refresh_assets_list()?;
        Ok(fs)
    }

    fn abs(&self, path: &Utf8Path) -> Utf8PathBuf {
        self.root.join(path.as_str().trim_start_matches('/'))
    }
}

impl ProjectFs for DiskFs {
    fn read_file(&self, path: &Utf8Path) -> Result<Vec<u8>> {
        let abs = self.abs(path);
        if !abs.as_std_path().exists() {
            return Err(Error::FileNotFound(path.to_owned()));
        }
        Ok(std::fs::read(abs.as_std_path())?)
    }

    fn write_file(&mut self, path: &Utf8Path, content: &[u8]) -> Result<()> {
        let abs = self.abs(path);
        if let Some(parent) = abs.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }

        // Write next to the target and rename over it so readers never see a
        // half-written file.
        let staging = Utf8PathBuf::from(format!("{}.partial", abs));
        std::fs::write(staging.as_std_path(), content)?;
        std::fs::rename(staging.as_std_path(), abs.as_std_path())?;
        tracing::debug!("Wrote {} ({} bytes)", path, content.len());
        Ok(())
    }

    fn exists(&self, path: &Utf8Path) -> bool {
        self.abs(path).as_std_path().exists()
    }

    fn copy_file(&mut self, from: &Utf8Path, to: &Utf8Path) -> Result<()> {
        let src = self.abs(from);
        let dst = self.abs(to);
        if !src.as_std_path().exists() {
            return Err(Error::FileNotFound(from.to_owned()));
        }
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent.as_std_path())?;
        }
        std::fs::copy(src.as_std_path(), dst.as_std_path())?;
        Ok(())
    }

    fn refresh_assets_list(&mut self) -> Result<()> {
        self.index.clear();

        for folder in &self.folders {
            let folder_abs = self.root.join(&folder.path);
            if !folder_abs.as_std_path().exists() {
                tracing::debug!("Asset folder {} does not exist, skipping", folder.path);
                continue;
            }

            let walker = WalkDir::new(folder_abs.as_std_path())
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| !e.file_name().to_string_lossy().starts_with('.'));

            for entry in walker {
                let entry = entry.map_err(|e| Error::Io(e.into()))?;
                if !entry.file_type().is_file() {
                    continue;
                }

                let utf8_path = match Utf8PathBuf::from_path_buf(entry.path().to_path_buf()) {
                    Ok(p) => p,
                    Err(p) => {
                        tracing::warn!("Skipping non-UTF-8 path: {}", p.display());
                        continue;
                    }
                };
                let Ok(rel) = utf8_path.strip_prefix(&folder_abs) else {
                    continue;
                };

                let added = self
                    .index
                    .add_file(folder, rel, || Ok(std::fs::read(utf8_path.as_std_path())?));
                if let Err(e) = added {
                    tracing::warn!("Failed to load asset {}: {}", utf8_path, e);
                }
            }
        }

        tracing::info!("Scanned {} assets in {} folders", self.index.len(), self.folders.len());
        Ok(())
    }

    fn assets(&self) -> &AssetIndex {
        &self.index
    }

    fn assets_mut(&mut self) -> &mut AssetIndex {
        &mut self.index
    }
}
