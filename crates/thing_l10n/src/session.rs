//! Editing operations over a [`LocalizationStore`] with debounced persistence.
//!
//! Every edit is validated first and refused without touching anything when it
//! is invalid. Accepted edits mutate the in-memory files and mark them pending;
//! the files are written once the editing burst has been quiet for
//! [`PERSIST_DEBOUNCE`](crate::debounce::PERSIST_DEBOUNCE). Key operations
//! (add, rename, delete) always apply to every language file of the current
//! directory so that their key sets stay aligned.
//!
//! The session never holds the filesystem. Operations that read or write take
//! it as an argument, and the owner drives persistence with
//! [`tick`](LocalizationSession::tick) or [`flush`](LocalizationSession::flush).

use crate::debounce::{Clock, Debouncer, SystemClock};
use crate::error::{Error, KeyRejection, Result};
use crate::file::LocalizationFile;
use crate::key::KeyValidator;
use crate::store::LocalizationStore;
use crate::tree::KeyedText;
use crate::typings::{generate_typings, TYPINGS_PATH};
use crate::validate::{TemplateValidator, TemplateWarning};
use camino::{Utf8Path, Utf8PathBuf};
use std::collections::BTreeSet;
use thing_project::asset::L10N_DIR_NAME;
use thing_project::{AssetFolder, AssetKind, Project, ProjectFs, ProjectLock};

/// Address of one text cell in the editable grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellRef {
    pub directory: String,
    pub language: String,
    pub key: String,
}

pub struct LocalizationSession {
    store: LocalizationStore,
    folders: Vec<AssetFolder>,
    keys: KeyValidator,
    templates: TemplateValidator,
    debouncer: Debouncer,
    clock: Box<dyn Clock>,
    /// `(directory, language)` slots waiting to be written.
    pending: BTreeSet<(String, String)>,
    lock: ProjectLock,
    new_keys_prefix: Option<String>,
}

impl LocalizationSession {
    pub fn new(project: &Project, lock: ProjectLock) -> Result<Self> {
        let folders = project.asset_folders();
        Ok(Self {
            store: LocalizationStore::new(
                folders.iter().map(|f| f.path.clone()).collect(),
                project.desc.default_language.clone(),
            ),
            folders,
            keys: KeyValidator::new()?,
            templates: TemplateValidator::new()?,
            debouncer: Debouncer::default(),
            clock: Box::new(SystemClock),
            pending: BTreeSet::new(),
            lock,
            new_keys_prefix: project.desc.locales_new_keys_prefix.clone(),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Create a session and load every localization file the filesystem has
    /// already scanned.
    pub fn open(fs: &mut dyn ProjectFs, project: &Project, lock: ProjectLock) -> Result<Self> {
        let mut session = Self::new(project, lock)?;
        session.sync_from_assets(fs);
        session.refresh(fs)?;
        tracing::info!(
            "Opened localization of {}: {} folders, {} languages",
            project.desc.name,
            session.store.directories().len(),
            session.store.languages().len()
        );
        Ok(session)
    }

    pub fn store(&self) -> &LocalizationStore {
        &self.store
    }

    pub fn lock(&self) -> &ProjectLock {
        &self.lock
    }

    /// Replace the registered files with the localization assets of `fs`.
    pub fn sync_from_assets(&mut self, fs: &dyn ProjectFs) {
        self.store.clear_files();
        self.store.register_assets(fs);
    }

    /// Re-scan the filesystem and reload everything.
    pub fn reload(&mut self, fs: &mut dyn ProjectFs) -> Result<()> {
        self.pending.clear();
        self.debouncer.cancel();
        fs.refresh_assets_list()?;
        self.sync_from_assets(fs);
        self.refresh(fs)
    }

    /// Rebuild derived state, create files missing for the current language
    /// and regenerate the typings artifact.
    pub fn refresh(&mut self, fs: &mut dyn ProjectFs) -> Result<()> {
        self.store.rebuild()?;
        let language = self.store.current_language().to_string();
        self.ensure_language_coverage(fs, &language)?;
        self.write_typings(fs)
    }

    /// Give every directory a file for `language`, mirroring the directory's
    /// keys with empty texts. Returns the created files.
    pub fn ensure_language_coverage(
        &mut self,
        fs: &mut dyn ProjectFs,
        language: &str,
    ) -> Result<Vec<Utf8PathBuf>> {
        let mut created = Vec::new();
        for directory in self.store.directories_missing(language) {
            let file = LocalizationFile::skeleton_of(self.store.first_file(&directory)?, language);
            fs.write_json(&file.file_name, &file.to_json())?;
            tracing::warn!("Localization file {} created.", file.file_name);
            created.push(file.file_name.clone());
            self.store.register_file(file);
        }

        if !created.is_empty() {
            fs.refresh_assets_list()?;
            self.store.rebuild()?;
        }
        Ok(created)
    }

    pub fn set_current_directory(&mut self, directory: &str) -> Result<()> {
        self.store.set_current_directory(directory)
    }

    /// Switch the language the typings and key picker follow.
    pub fn set_current_language(&mut self, fs: &mut dyn ProjectFs, language: &str) -> Result<()> {
        let language = self.keys.normalize_language(language)?;
        self.store.set_current_language(language);
        self.refresh(fs)
    }

    /// Add `key` with empty texts to every file of the current directory.
    /// Returns the cell to edit next.
    pub fn add_key(&mut self, key: &str, language: &str) -> Result<CellRef> {
        self.check_unlocked()?;
        let directory = self.store.require_current_directory()?.to_string();
        let store = &self.store;
        self.keys
            .validate_key(key, |k| store.has_key(k) || store.keys().iter().any(|own| own == k))?;
        self.keys
            .check_path_conflict(key, self.directory_keys(&directory)?)?;

        for file in self.store.directory_files_mut(&directory)?.values_mut() {
            file.keyed_text.insert(key.to_string(), String::new());
        }
        self.schedule_directory(&directory)?;
        self.store.rebuild()?;

        tracing::debug!("Added localization key {} to {}", key, directory);
        Ok(CellRef {
            directory,
            language: language.to_string(),
            key: key.to_string(),
        })
    }

    /// Rename a key in every file of the current directory, keeping each
    /// file's own text.
    pub fn rename_key(&mut self, old_key: &str, new_key: &str) -> Result<()> {
        self.check_unlocked()?;
        if old_key == new_key {
            return Err(KeyRejection::SameKey(new_key.to_string()).into());
        }
        self.keys.validate_key_shape(new_key)?;
        let directory = self.require_key_in_current(old_key)?;
        if self.store.keys().iter().any(|k| k == new_key) || self.store.has_key(new_key) {
            return Err(KeyRejection::RenameTargetExists(new_key.to_string()).into());
        }
        let others = self
            .directory_keys(&directory)?
            .into_iter()
            .filter(|k| *k != old_key);
        self.keys.check_path_conflict(new_key, others)?;

        for file in self.store.directory_files_mut(&directory)?.values_mut() {
            if let Some(text) = file.keyed_text.remove(old_key) {
                file.keyed_text.insert(new_key.to_string(), text);
            }
        }
        self.schedule_directory(&directory)?;
        self.store.rebuild()
    }

    /// Remove a key from every file of the current directory.
    pub fn delete_key(&mut self, key: &str) -> Result<()> {
        self.check_unlocked()?;
        let directory = self.require_key_in_current(key)?;

        for file in self.store.directory_files_mut(&directory)?.values_mut() {
            file.keyed_text.remove(key);
        }
        self.schedule_directory(&directory)?;
        self.store.rebuild()
    }

    /// Change one translation. Only that language's file is scheduled.
    pub fn set_cell_value(&mut self, directory: &str, language: &str, key: &str, text: &str) -> Result<()> {
        self.check_unlocked()?;
        let file = self
            .store
            .directory_files(directory)?
            .get(language)
            .ok_or_else(|| Error::UnknownLanguage {
                directory: directory.to_string(),
                language: language.to_string(),
            })?;
        match file.keyed_text.get(key) {
            None => return Err(KeyRejection::UnknownKey(key.to_string()).into()),
            Some(current) if current == text => return Ok(()),
            Some(_) => {}
        }

        if let Some(file) = self.store.directory_files_mut(directory)?.get_mut(language) {
            file.keyed_text.insert(key.to_string(), text.to_string());
        }

        self.schedule(directory, language);
        self.store.rebuild()
    }

    /// Create files for a new language in every directory.
    pub fn add_language(&mut self, fs: &mut dyn ProjectFs, language: &str) -> Result<Vec<Utf8PathBuf>> {
        self.check_unlocked()?;
        let language = self.keys.normalize_language(language)?;
        let directory = self.store.require_current_directory()?;
        if self.store.file(directory, &language).is_some() {
            return Err(KeyRejection::LanguageExists(language).into());
        }

        let created = self.ensure_language_coverage(fs, &language)?;
        self.write_typings(fs)?;
        tracing::info!("Added language {} ({} files)", language, created.len());
        Ok(created)
    }

    /// Create a new localization directory `<assets_dir>/<group>/i18n` with an
    /// empty file for every known language and select it.
    pub fn add_directory(
        &mut self,
        fs: &mut dyn ProjectFs,
        assets_dir: &Utf8Path,
        group: &str,
    ) -> Result<String> {
        self.check_unlocked()?;
        let folder = self
            .folders
            .iter()
            .find(|f| f.path == assets_dir)
            .cloned()
            .ok_or_else(|| Error::UnknownDirectory(assets_dir.to_string()))?;

        let group = group.trim_matches('/');
        if !group.is_empty() {
            self.keys.validate_key_shape(group)?;
        }
        let group_dir = if group.is_empty() {
            folder.path.clone()
        } else {
            folder.path.join(group)
        };
        let directory = group_dir.join(L10N_DIR_NAME).into_string();
        if self.store.has_directory(&directory) {
            return Err(KeyRejection::DirectoryExists(directory).into());
        }

        let mut languages: BTreeSet<String> = self.store.languages().iter().cloned().collect();
        languages.insert(self.store.current_language().to_string());

        for language in languages {
            let file = LocalizationFile::new(
                directory.clone(),
                language,
                folder.origin.clone(),
                folder.path.clone(),
                KeyedText::new(),
            );
            fs.write_json(&file.file_name, &file.to_json())?;
            tracing::info!("Localization file {} created.", file.file_name);
            self.store.register_file(file);
        }

        fs.refresh_assets_list()?;
        self.store.set_current_directory(&directory)?;
        self.write_typings(fs)?;
        Ok(directory)
    }

    /// Locate `key` for editing: in the current directory, in whichever
    /// directory defines it (switching to it), or newly created in the current
    /// directory.
    pub fn edit_key(&mut self, key: &str, language: &str) -> Result<CellRef> {
        if let Some(directory) = self.store.current_directory() {
            if self.store.keys().iter().any(|k| k == key) {
                return Ok(CellRef {
                    directory: directory.to_string(),
                    language: language.to_string(),
                    key: key.to_string(),
                });
            }
        }

        if let Some(directory) = self.store.find_key_directory(key).map(str::to_string) {
            self.store.set_current_directory(&directory)?;
            return Ok(CellRef {
                directory,
                language: language.to_string(),
                key: key.to_string(),
            });
        }

        self.add_key(key, language)
    }

    /// Default text for the "new key" prompt.
    pub fn suggest_new_key(&self) -> String {
        if let Some(prefix) = self.new_keys_prefix.as_ref().filter(|p| !p.is_empty()) {
            return prefix.clone();
        }
        let Some(first) = self.store.keys().first() else {
            return String::new();
        };
        match first.rsplit_once('.') {
            Some((prefix, _)) => format!("{}.", prefix),
            None => String::new(),
        }
    }

    /// Check placeholder consistency in every directory, logging each
    /// mismatch.
    pub fn validate_template_consistency(&self) -> Vec<TemplateWarning> {
        let mut warnings = Vec::new();
        for directory in self.store.directories() {
            let Ok(files) = self.store.directory_files(directory) else {
                continue;
            };
            warnings.extend(self.templates.validate_directory(directory, files.values()));
        }
        for warning in &warnings {
            tracing::warn!("{}", warning);
        }
        warnings
    }

    pub fn has_pending_writes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Write pending files if the debounce window has expired. Returns the
    /// number of files written.
    pub fn tick(&mut self, fs: &mut dyn ProjectFs) -> Result<usize> {
        if self.debouncer.poll(self.clock.now()) {
            return self.write_pending(fs);
        }
        Ok(0)
    }

    /// Write pending files now.
    pub fn flush(&mut self, fs: &mut dyn ProjectFs) -> Result<usize> {
        self.debouncer.cancel();
        self.write_pending(fs)
    }

    fn write_pending(&mut self, fs: &mut dyn ProjectFs) -> Result<usize> {
        let mut written = 0;
        for (directory, language) in std::mem::take(&mut self.pending) {
            let Some(file) = self.store.file(&directory, &language) else {
                continue;
            };
            let content = file.to_json();
            if fs.get_asset(&file.asset_name, AssetKind::L10n).is_some() {
                fs.save_asset(&file.asset_name, AssetKind::L10n, &content)?;
            } else {
                fs.write_json(&file.file_name, &content)?;
            }
            written += 1;
        }

        if written > 0 {
            self.write_typings(fs)?;
            tracing::debug!("Saved {} localization files", written);
        }
        Ok(written)
    }

    fn write_typings(&self, fs: &mut dyn ProjectFs) -> Result<()> {
        let typings = generate_typings(self.store.typing_keys());
        fs.write_file(Utf8Path::new(TYPINGS_PATH), typings.as_bytes())?;
        Ok(())
    }

    fn schedule(&mut self, directory: &str, language: &str) {
        self.pending
            .insert((directory.to_string(), language.to_string()));
        self.debouncer.schedule(self.clock.now());
    }

    fn schedule_directory(&mut self, directory: &str) -> Result<()> {
        let languages: Vec<String> = self.store.directory_files(directory)?.keys().cloned().collect();
        for language in languages {
            self.schedule(directory, &language);
        }
        Ok(())
    }

    /// Every key held by any file of `directory`.
    fn directory_keys(&self, directory: &str) -> Result<BTreeSet<&str>> {
        Ok(self
            .store
            .directory_files(directory)?
            .values()
            .flat_map(|file| file.keyed_text.keys().map(String::as_str))
            .collect())
    }

    fn require_key_in_current(&self, key: &str) -> Result<String> {
        let directory = self.store.require_current_directory()?;
        if !self.store.keys().iter().any(|k| k == key) {
            return Err(KeyRejection::UnknownKey(key.to_string()).into());
        }
        Ok(directory.to_string())
    }

    fn check_unlocked(&self) -> Result<()> {
        self.lock.ensure_free().map_err(|_| Error::ProjectBusy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debounce::{ManualClock, PERSIST_DEBOUNCE};
    use serde_json::json;
    use std::time::Duration;
    use thing_project::{MemoryFs, ProjectDesc};

    const UI: &str = "games/demo/assets/ui/i18n";
    const DIALOGUE: &str = "games/demo/assets/dialogue/i18n";

    fn project() -> Project {
        Project::new("games/demo", ProjectDesc::new("demo"))
    }

    fn setup() -> (MemoryFs, LocalizationSession, ManualClock) {
        let project = project();
        let mut fs = MemoryFs::new(project.asset_folders())
            .with_json(
                format!("{}/en.json", UI),
                json!({ "menu": { "play": "Play", "quit": "Quit" } }),
            )
            .with_json(
                format!("{}/fr.json", UI),
                json!({ "menu": { "play": "Jouer", "quit": "Quitter" } }),
            )
            .with_json(
                format!("{}/en.json", DIALOGUE),
                json!({ "greeting": "Hello %s" }),
            )
            .with_json(format!("{}/fr.json", DIALOGUE), json!({ "greeting": "Bonjour" }));
        fs.refresh_assets_list().unwrap();

        let clock = ManualClock::new();
        let session = LocalizationSession::open(&mut fs, &project, ProjectLock::new())
            .unwrap()
            .with_clock(clock.clone());
        fs.clear_writes();
        (fs, session, clock)
    }

    fn path(directory: &str, language: &str) -> Utf8PathBuf {
        Utf8PathBuf::from(format!("{}/{}.json", directory, language))
    }

    #[test]
    fn test_open_loads_and_selects_last_directory() {
        let (_fs, session, _clock) = setup();
        let store = session.store();

        assert_eq!(store.current_directory(), Some(UI));
        assert_eq!(store.keys(), &["menu.play".to_string(), "menu.quit".to_string()]);
        assert_eq!(store.text("fr", "greeting"), Some("Bonjour"));
    }

    #[test]
    fn test_add_key_aligns_languages() {
        let (_fs, mut session, _clock) = setup();
        let cell = session.add_key("menu.options", "fr").unwrap();

        assert_eq!(cell.directory, UI);
        assert_eq!(cell.language, "fr");
        for file in session.store().directory_files(UI).unwrap().values() {
            assert_eq!(file.keyed_text.get("menu.options").map(String::as_str), Some(""));
        }
        assert!(session.store().directory_files(DIALOGUE).unwrap()["en"]
            .keyed_text
            .get("menu.options")
            .is_none());
    }

    #[test]
    fn test_add_key_rejections_leave_state_untouched() {
        let (_fs, mut session, _clock) = setup();
        let before = session.store().table().clone();

        let err = session.add_key("menu.play", "en").unwrap_err();
        assert!(matches!(err, Error::Rejected(KeyRejection::KeyExists(_))));
        assert_eq!(err.to_string(), "ID already exists");
        // exists in another directory of the merged table
        assert!(session.add_key("greeting", "en").is_err());
        assert!(session.add_key("menu.", "en").is_err());
        assert!(session.add_key("menu play", "en").is_err());

        assert_eq!(session.store().table(), &before);
        assert!(!session.has_pending_writes());
    }

    #[test]
    fn test_rename_round_trip() {
        let (_fs, mut session, _clock) = setup();
        let before = session.store().directory_files(UI).unwrap().clone();

        session.rename_key("menu.play", "menu.start").unwrap();
        assert_eq!(session.store().text("fr", "menu.start"), Some("Jouer"));
        assert_eq!(session.store().text("en", "menu.play"), None);

        session.rename_key("menu.start", "menu.play").unwrap();
        assert_eq!(session.store().directory_files(UI).unwrap(), &before);
    }

    #[test]
    fn test_rename_rejections() {
        let (_fs, mut session, _clock) = setup();
        assert!(matches!(
            session.rename_key("menu.play", "menu.play"),
            Err(Error::Rejected(KeyRejection::SameKey(_)))
        ));
        assert!(matches!(
            session.rename_key("menu.play", "menu.quit"),
            Err(Error::Rejected(KeyRejection::RenameTargetExists(_)))
        ));
        assert!(matches!(
            session.rename_key("nope", "other"),
            Err(Error::Rejected(KeyRejection::UnknownKey(_)))
        ));
    }

    #[test]
    fn test_nested_key_collisions_refused() {
        let (mut fs, mut session, _clock) = setup();
        let before = session.store().table().clone();

        assert!(matches!(
            session.add_key("menu.play.hint", "en"),
            Err(Error::Rejected(KeyRejection::PathConflict(ref k))) if k == "menu.play"
        ));
        assert!(matches!(
            session.add_key("menu", "en"),
            Err(Error::Rejected(KeyRejection::PathConflict(_)))
        ));
        assert!(matches!(
            session.rename_key("menu.quit", "menu.play.quit"),
            Err(Error::Rejected(KeyRejection::PathConflict(_)))
        ));
        assert_eq!(session.store().table(), &before);
        assert!(!session.has_pending_writes());

        session.flush(&mut fs).unwrap();
        session.reload(&mut fs).unwrap();
        assert_eq!(session.store().text("en", "menu.play"), Some("Play"));
        assert_eq!(session.store().text("fr", "menu.quit"), Some("Quitter"));
    }

    #[test]
    fn test_rename_below_own_old_path() {
        let (mut fs, mut session, _clock) = setup();
        session.rename_key("menu.play", "menu.play.label").unwrap();
        session.flush(&mut fs).unwrap();

        assert_eq!(
            fs.json(&path(UI, "fr")).unwrap(),
            json!({ "menu": { "play": { "label": "Jouer" }, "quit": "Quitter" } })
        );
        session.reload(&mut fs).unwrap();
        assert_eq!(session.store().text("fr", "menu.play.label"), Some("Jouer"));
    }

    #[test]
    fn test_rejected_cell_edit_keeps_store_clean() {
        let (_fs, mut session, _clock) = setup();
        assert!(!session.store().is_dirty());

        assert!(matches!(
            session.set_cell_value(UI, "de", "menu.play", "Spielen"),
            Err(Error::UnknownLanguage { .. })
        ));
        assert!(matches!(
            session.set_cell_value(UI, "en", "menu.nope", "x"),
            Err(Error::Rejected(KeyRejection::UnknownKey(_)))
        ));
        session.set_cell_value(UI, "en", "menu.play", "Play").unwrap();

        assert!(!session.store().is_dirty());
        assert!(!session.has_pending_writes());
    }

    #[test]
    fn test_delete_key() {
        let (_fs, mut session, _clock) = setup();
        session.delete_key("menu.quit").unwrap();

        assert_eq!(session.store().keys(), &["menu.play".to_string()]);
        assert_eq!(session.store().text("fr", "menu.quit"), None);
    }

    #[test]
    fn test_burst_of_edits_writes_once() {
        let (mut fs, mut session, clock) = setup();
        for i in 0..5 {
            session
                .set_cell_value(UI, "en", "menu.play", &format!("Play {}", i))
                .unwrap();
            clock.advance(Duration::from_millis(100));
            assert_eq!(session.tick(&mut fs).unwrap(), 0);
        }

        clock.advance(PERSIST_DEBOUNCE);
        assert_eq!(session.tick(&mut fs).unwrap(), 1);
        assert_eq!(fs.writes_to(&path(UI, "en")), 1);
        assert_eq!(fs.writes_to(&path(UI, "fr")), 0);
        assert_eq!(
            fs.json(&path(UI, "en")).unwrap(),
            json!({ "menu": { "play": "Play 4", "quit": "Quit" } })
        );
    }

    #[test]
    fn test_spaced_edits_write_each_time() {
        let (mut fs, mut session, clock) = setup();
        for i in 0..3 {
            session
                .set_cell_value(UI, "fr", "menu.play", &format!("Jouer {}", i))
                .unwrap();
            clock.advance(PERSIST_DEBOUNCE + Duration::from_millis(1));
            session.tick(&mut fs).unwrap();
        }
        assert_eq!(fs.writes_to(&path(UI, "fr")), 3);
    }

    #[test]
    fn test_key_edits_write_every_language() {
        let (mut fs, mut session, _clock) = setup();
        session.add_key("menu.options", "en").unwrap();
        assert_eq!(session.flush(&mut fs).unwrap(), 2);

        assert_eq!(fs.writes_to(&path(UI, "en")), 1);
        assert_eq!(fs.writes_to(&path(UI, "fr")), 1);
        assert_eq!(
            fs.json(&path(UI, "fr")).unwrap()["menu"]["options"],
            json!("")
        );
        let typings = fs.read_to_string(Utf8Path::new(TYPINGS_PATH)).unwrap();
        assert!(typings.contains("(id: \"menu.options\", values?: KeyedObject): string;"));
    }

    #[test]
    fn test_add_language_covers_all_directories() {
        let (mut fs, mut session, _clock) = setup();
        let refreshes = fs.refresh_count();

        let created = session.add_language(&mut fs, "DE").unwrap();
        assert_eq!(created, vec![path(DIALOGUE, "de"), path(UI, "de")]);
        assert_eq!(fs.refresh_count(), refreshes + 1);
        assert_eq!(
            fs.json(&path(UI, "de")).unwrap(),
            json!({ "menu": { "play": "", "quit": "" } })
        );
        assert_eq!(fs.json(&path(DIALOGUE, "de")).unwrap(), json!({ "greeting": "" }));
        assert!(session.store().languages().contains(&"de".to_string()));

        let err = session.add_language(&mut fs, "de").unwrap_err();
        assert_eq!(err.to_string(), "Language with ID=de already exists");
    }

    #[test]
    fn test_open_creates_missing_current_language() {
        let project = project();
        let mut fs = MemoryFs::new(project.asset_folders())
            .with_json(format!("{}/fr.json", UI), json!({ "title": "Titre" }));
        fs.refresh_assets_list().unwrap();

        let session = LocalizationSession::open(&mut fs, &project, ProjectLock::new()).unwrap();
        assert_eq!(fs.json(&path(UI, "en")).unwrap(), json!({ "title": "" }));
        assert!(session.store().file(UI, "en").is_some());
    }

    #[test]
    fn test_template_warning() {
        let (_fs, session, _clock) = setup();
        let warnings = session.validate_template_consistency();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].key, "greeting");
        assert_eq!(warnings[0].language, "fr");
        assert_eq!(warnings[0].directory, DIALOGUE);
    }

    #[test]
    fn test_edit_key_switches_directory() {
        let (_fs, mut session, _clock) = setup();
        let cell = session.edit_key("greeting", "en").unwrap();
        assert_eq!(cell.directory, DIALOGUE);
        assert_eq!(session.store().current_directory(), Some(DIALOGUE));

        let cell = session.edit_key("farewell", "en").unwrap();
        assert_eq!(cell.directory, DIALOGUE);
        assert!(session.store().keys().contains(&"farewell".to_string()));
    }

    #[test]
    fn test_suggest_new_key() {
        let (_fs, mut session, _clock) = setup();
        assert_eq!(session.suggest_new_key(), "menu.");

        session.set_current_directory(DIALOGUE).unwrap();
        assert_eq!(session.suggest_new_key(), "");

        session.new_keys_prefix = Some("hud.".to_string());
        assert_eq!(session.suggest_new_key(), "hud.");
    }

    #[test]
    fn test_add_directory() {
        let (mut fs, mut session, _clock) = setup();
        let directory = session
            .add_directory(&mut fs, Utf8Path::new("games/demo/assets"), "shop")
            .unwrap();

        assert_eq!(directory, "games/demo/assets/shop/i18n");
        assert_eq!(session.store().current_directory(), Some(directory.as_str()));
        assert_eq!(fs.json(&path(&directory, "en")).unwrap(), json!({}));
        assert_eq!(fs.json(&path(&directory, "fr")).unwrap(), json!({}));

        let err = session
            .add_directory(&mut fs, Utf8Path::new("games/demo/assets"), "shop")
            .unwrap_err();
        assert!(matches!(err, Error::Rejected(KeyRejection::DirectoryExists(_))));
    }

    #[test]
    fn test_mutations_refused_while_locked() {
        let (mut fs, mut session, _clock) = setup();
        let _guard = session.lock().try_acquire().unwrap();

        assert!(matches!(session.add_key("menu.x", "en"), Err(Error::ProjectBusy)));
        assert!(matches!(session.delete_key("menu.play"), Err(Error::ProjectBusy)));
        assert!(matches!(session.add_language(&mut fs, "de"), Err(Error::ProjectBusy)));
        assert!(matches!(
            session.set_cell_value(UI, "en", "menu.play", "x"),
            Err(Error::ProjectBusy)
        ));
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let (mut fs, mut session, _clock) = setup();
        fs.write_json(&path(UI, "en"), &json!({ "menu": { "play": "Go" } }))
            .unwrap();

        session.reload(&mut fs).unwrap();
        assert_eq!(session.store().text("en", "menu.play"), Some("Go"));
    }
}
