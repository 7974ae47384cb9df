//! In-memory localization state of the open project.
//!
//! The store keeps every [`LocalizationFile`] in a `(directory, language)` slot
//! and derives two separate structures from them in [`rebuild`]:
//!
//! * the merged [`LocalizationTable`], one flat dictionary per language over
//!   *all* directories. Directories are merged in asset-root order (then by
//!   path), so a project directory overrides a library directory defining the
//!   same key. This is what the runtime and the build see.
//! * the editable view of the *current* directory only: its key list and its
//!   per-language texts ([`DirectoryView`]).
//!
//! [`rebuild`]: LocalizationStore::rebuild

use crate::error::{Error, Result};
use crate::file::LocalizationFile;
use crate::tree::KeyedText;
use camino::Utf8PathBuf;
use std::collections::{BTreeMap, BTreeSet};
use thing_project::{AssetKind, Project, ProjectFs};

/// Language id → merged flat dictionary.
pub type LocalizationTable = BTreeMap<String, KeyedText>;

/// Label of the leading "no selection" entry of the selectable key list.
pub const NO_SELECTION: &str = "- - -";

/// One entry of the key picker; `value` is `None` for the sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectableKey {
    pub value: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct LocalizationStore {
    /// Asset folders in asset-root order.
    folders: Vec<Utf8PathBuf>,
    files: BTreeMap<String, BTreeMap<String, LocalizationFile>>,
    dirty: bool,
    current_directory: Option<String>,
    current_language: String,

    table: LocalizationTable,
    directories: Vec<String>,
    languages: Vec<String>,
    keys: Vec<String>,
    selectable: Vec<SelectableKey>,
}

impl LocalizationStore {
    pub fn new(folders: Vec<Utf8PathBuf>, current_language: impl Into<String>) -> Self {
        Self {
            folders,
            files: BTreeMap::new(),
            dirty: true,
            current_directory: None,
            current_language: current_language.into(),
            table: LocalizationTable::new(),
            directories: Vec::new(),
            languages: Vec::new(),
            keys: Vec::new(),
            selectable: vec![sentinel()],
        }
    }

    /// Read-only snapshot of the project's localization files as indexed by
    /// `fs`, already rebuilt.
    pub fn load(fs: &dyn ProjectFs, project: &Project) -> Result<Self> {
        let folders = project.asset_folders().into_iter().map(|f| f.path).collect();
        let mut store = Self::new(folders, project.desc.default_language.clone());
        store.register_assets(fs);
        store.rebuild()?;
        Ok(store)
    }

    /// Register every localization asset of `fs`. Files with unusable content
    /// are skipped with a warning.
    pub fn register_assets(&mut self, fs: &dyn ProjectFs) {
        for asset in fs.list_assets(Some(AssetKind::L10n)) {
            match LocalizationFile::from_asset(asset) {
                Ok(file) => self.register_file(file),
                Err(e) => tracing::warn!("Skipping localization file {}: {}", asset.file_name, e),
            }
        }
    }

    /// Drop every file and all derived state, e.g. before opening another
    /// project.
    pub fn reset(&mut self, folders: Vec<Utf8PathBuf>) {
        let language = std::mem::take(&mut self.current_language);
        *self = Self::new(folders, language);
    }

    /// Insert or replace the file in its `(directory, language)` slot.
    pub fn register_file(&mut self, file: LocalizationFile) {
        self.files
            .entry(file.directory.clone())
            .or_default()
            .insert(file.language.clone(), file);
        self.dirty = true;
    }

    pub fn unregister_file(&mut self, directory: &str, language: &str) -> Option<LocalizationFile> {
        let dir_files = self.files.get_mut(directory)?;
        let removed = dir_files.remove(language);
        if dir_files.is_empty() {
            self.files.remove(directory);
        }
        if removed.is_some() {
            self.dirty = true;
        }
        removed
    }

    /// Forget every registered file, keeping the current selection.
    pub fn clear_files(&mut self) {
        self.files.clear();
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Recompute the merged table, the directory and language lists, the
    /// current directory's key list and the selectable key list.
    ///
    /// Depends only on the registered files and the selected directory and
    /// language; calling it twice in a row yields the same state.
    pub fn rebuild(&mut self) -> Result<()> {
        let mut table = LocalizationTable::new();
        let mut directories = Vec::new();
        let mut last_directory = None;

        for folder in &self.folders {
            for (directory, dir_files) in &self.files {
                let first = dir_files
                    .values()
                    .next()
                    .ok_or_else(|| Error::EmptyDirectory(directory.clone()))?;
                if first.assets_dir != *folder {
                    continue;
                }
                directories.push(directory.clone());
                for file in dir_files.values() {
                    table
                        .entry(file.language.clone())
                        .or_default()
                        .extend(file.keyed_text.iter().map(|(k, v)| (k.clone(), v.clone())));
                }
                last_directory = Some(directory.clone());
            }
        }

        for directory in self.files.keys() {
            if !directories.contains(directory) {
                tracing::warn!(
                    "Localization folder {} is outside of the project asset folders, ignored",
                    directory
                );
            }
        }

        let current = match &self.current_directory {
            Some(dir) if directories.contains(dir) => Some(dir.clone()),
            _ => last_directory,
        };

        let keys = match &current {
            Some(dir) => self
                .first_file(dir)?
                .keyed_text
                .keys()
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let all_keys: BTreeSet<&String> = table.values().flat_map(|t| t.keys()).collect();
        let mut selectable = vec![sentinel()];
        selectable.extend(all_keys.into_iter().map(|key| SelectableKey {
            value: Some(key.clone()),
            name: key.clone(),
        }));

        self.languages = table.keys().cloned().collect();
        self.table = table;
        self.directories = directories;
        self.current_directory = current;
        self.keys = keys;
        self.selectable = selectable;
        self.dirty = false;

        tracing::debug!(
            "Localization rebuilt: {} folders, {} languages, {} keys in current folder",
            self.directories.len(),
            self.languages.len(),
            self.keys.len()
        );
        Ok(())
    }

    /// Rebuild only if something changed since the last rebuild.
    pub fn ensure_built(&mut self) -> Result<()> {
        if self.dirty {
            self.rebuild()?;
        }
        Ok(())
    }

    /// Select the directory shown in the editable view.
    pub fn set_current_directory(&mut self, directory: &str) -> Result<()> {
        if !self.files.contains_key(directory) {
            return Err(Error::UnknownDirectory(directory.to_string()));
        }
        self.current_directory = Some(directory.to_string());
        self.rebuild()
    }

    pub fn set_current_language(&mut self, language: impl Into<String>) {
        self.current_language = language.into();
        self.dirty = true;
    }

    pub fn current_directory(&self) -> Option<&str> {
        self.current_directory.as_deref()
    }

    /// The selected directory, failing when the project has none.
    pub fn require_current_directory(&self) -> Result<&str> {
        self.current_directory().ok_or(Error::NoDirectories)
    }

    pub fn current_language(&self) -> &str {
        &self.current_language
    }

    pub fn table(&self) -> &LocalizationTable {
        &self.table
    }

    /// Directories in merge order.
    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    pub fn languages(&self) -> &[String] {
        &self.languages
    }

    /// Keys of the current directory.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    pub fn selectable_keys(&self) -> &[SelectableKey] {
        &self.selectable
    }

    /// Whether any language of the merged table defines `key`.
    pub fn has_key(&self, key: &str) -> bool {
        self.table.values().any(|texts| texts.contains_key(key))
    }

    pub fn text(&self, language: &str, key: &str) -> Option<&str> {
        self.table.get(language)?.get(key).map(String::as_str)
    }

    pub fn has_directory(&self, directory: &str) -> bool {
        self.files.contains_key(directory)
    }

    pub fn directory_files(&self, directory: &str) -> Result<&BTreeMap<String, LocalizationFile>> {
        self.files
            .get(directory)
            .ok_or_else(|| Error::UnknownDirectory(directory.to_string()))
    }

    pub(crate) fn directory_files_mut(
        &mut self,
        directory: &str,
    ) -> Result<&mut BTreeMap<String, LocalizationFile>> {
        self.dirty = true;
        self.files
            .get_mut(directory)
            .ok_or_else(|| Error::UnknownDirectory(directory.to_string()))
    }

    /// The file whose key set stands for the whole directory.
    pub fn first_file(&self, directory: &str) -> Result<&LocalizationFile> {
        self.directory_files(directory)?
            .values()
            .next()
            .ok_or_else(|| Error::EmptyDirectory(directory.to_string()))
    }

    pub fn file(&self, directory: &str, language: &str) -> Option<&LocalizationFile> {
        self.files.get(directory)?.get(language)
    }

    /// Every registered file, by directory then language.
    pub fn files(&self) -> impl Iterator<Item = &LocalizationFile> {
        self.files.values().flat_map(|dir_files| dir_files.values())
    }

    /// Directories lacking a file for `language`.
    pub fn directories_missing(&self, language: &str) -> Vec<String> {
        self.files
            .iter()
            .filter(|(_, dir_files)| !dir_files.contains_key(language))
            .map(|(dir, _)| dir.clone())
            .collect()
    }

    /// First directory (in merge order) that defines `key` in any language.
    pub fn find_key_directory(&self, key: &str) -> Option<&str> {
        self.directories
            .iter()
            .find(|dir| {
                self.files
                    .get(dir.as_str())
                    .is_some_and(|dir_files| dir_files.values().any(|f| f.has_key(key)))
            })
            .map(String::as_str)
    }

    /// Editable rows of the current directory.
    pub fn view(&self) -> Result<DirectoryView<'_>> {
        let directory = self.require_current_directory()?;
        Ok(DirectoryView {
            directory,
            keys: &self.keys,
            files: self.directory_files(directory)?,
        })
    }

    /// Keys of the current language's merged table, sorted, for the typings
    /// artifact.
    pub fn typing_keys(&self) -> Vec<&str> {
        self.table
            .get(&self.current_language)
            .map(|texts| texts.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}

fn sentinel() -> SelectableKey {
    SelectableKey {
        value: None,
        name: NO_SELECTION.to_string(),
    }
}

/// The grid of one directory: keys down, languages across.
#[derive(Debug, Clone, Copy)]
pub struct DirectoryView<'a> {
    pub directory: &'a str,
    pub keys: &'a [String],
    pub files: &'a BTreeMap<String, LocalizationFile>,
}

impl<'a> DirectoryView<'a> {
    pub fn languages(&self) -> impl Iterator<Item = &'a str> {
        self.files.keys().map(String::as_str)
    }

    pub fn text(&self, language: &str, key: &str) -> Option<&'a str> {
        self.files.get(language)?.keyed_text.get(key).map(String::as_str)
    }

    /// Keys whose id or any translation contains `search`, ignoring case.
    /// An empty search matches everything.
    pub fn filter(&self, search: &str) -> Vec<&'a str> {
        let search = search.to_lowercase();
        self.keys
            .iter()
            .filter(|key| {
                search.is_empty()
                    || key.to_lowercase().contains(&search)
                    || self.files.values().any(|file| {
                        file.keyed_text
                            .get(key.as_str())
                            .is_some_and(|text| text.to_lowercase().contains(&search))
                    })
            })
            .map(String::as_str)
            .collect()
    }
}
