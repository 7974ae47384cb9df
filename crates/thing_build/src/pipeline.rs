//! The build pipeline.
//!
//! The [`BuildPipeline`] turns an authored project into the manifests the
//! runtime loads and hands them to an external [`Bundler`].
//!
//! # Build Algorithm
//!
//! 1. Take the project lock; editing operations are refused until the build
//!    returns.
//! 2. Load the localization files from the asset index and check placeholder
//!    consistency across languages. Mismatches are warnings.
//! 3. Partition the assets into preloader, main and excluded sets and decide
//!    which classes ship (see [`DependencyAnalyzer`]).
//! 4. Describe both partitions. The preloader descriptor also carries the
//!    project description, and the merged localization table when the project
//!    embeds locales.
//! 5. Write `assets-preloader.json`, `assets-main.json`, `classes.ts` and
//!    `assets-to-copy.json` into `<projectDir>/.tmp/`, each as one whole-file
//!    write, and copy the first `index.html` found in the asset folders
//!    (searched from the project backwards).
//! 6. Run the bundler. A bundler that ran and failed yields
//!    [`BuildOutcome::Failed`]; the manifests stay on disk for inspection.

use crate::analyzer::DependencyAnalyzer;
use crate::bundler::{BuildFailure, BundleRequest, BundleStatus, Bundler};
use crate::classes::{generate_class_registration, CLASSES_MODULE};
use crate::error::{Error, Result};
use crate::filter::{BuildMode, NameFilter};
use crate::manifest::{ManifestBuilder, COPY_LIST, MAIN_MANIFEST, PRELOADER_MANIFEST};
use camino::Utf8Path;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thing_l10n::{LocalizationStore, TemplateValidator};
use thing_project::{Project, ProjectFs, ProjectLock};

/// Port of the dev server that serves built projects.
pub const DEV_SERVER_PORT: u16 = 5174;

const INDEX_HTML: &str = "index.html";

/// Progress information emitted during a build.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildProgress {
    pub stage: BuildStage,
    pub mode: BuildMode,
}

/// Stages of the build pipeline, emitted in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildStage {
    /// Checking localization placeholders.
    Validating,
    /// Partitioning assets and retaining classes.
    Analyzing,
    WritingManifests,
    /// Waiting for the external bundler.
    Bundling,
    Complete,
}

type ProgressCallback = Arc<dyn Fn(BuildProgress) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    /// The bundler succeeded; the build is served at `url`.
    Success { url: String },
    Failed(BuildFailure),
}

impl BuildOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, BuildOutcome::Success { .. })
    }
}

/// Summary returned after a build.
#[derive(Debug)]
pub struct BuildReport {
    pub mode: BuildMode,
    /// Sorted class names that ship.
    pub retained_classes: Vec<String>,
    pub pruned_classes: Vec<String>,
    pub preloader_assets: usize,
    pub main_assets: usize,
    pub excluded_assets: usize,
    /// Placeholder mismatches and unresolved required components.
    pub warnings: Vec<String>,
    pub outcome: BuildOutcome,
    pub build_time: Duration,
}

/// `http://localhost:5174/<projectDir>/<debug|release>/`
pub fn success_url(project_dir: &Utf8Path, mode: BuildMode) -> String {
    format!(
        "http://localhost:{}/{}/{}/",
        DEV_SERVER_PORT,
        project_dir.as_str().trim_matches('/'),
        mode
    )
}

/// Orchestrates a project build.
///
/// Create one with [`new`](Self::new), optionally attach a progress callback
/// with [`with_progress`](Self::with_progress), then call [`run`](Self::run).
pub struct BuildPipeline<'a> {
    project: &'a Project,
    mode: BuildMode,
    lock: ProjectLock,
    progress_callback: Option<ProgressCallback>,
}

impl<'a> BuildPipeline<'a> {
    pub fn new(project: &'a Project, mode: BuildMode, lock: ProjectLock) -> Self {
        Self {
            project,
            mode,
            lock,
            progress_callback: None,
        }
    }

    /// Register a progress callback receiving a [`BuildProgress`] per stage.
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(BuildProgress) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(callback));
        self
    }

    /// Run the whole build. See the module docs for the algorithm.
    ///
    /// Fails with [`Error::ProjectBusy`] if another build holds the lock.
    pub fn run(&self, fs: &mut dyn ProjectFs, bundler: &mut dyn Bundler) -> Result<BuildReport> {
        let start_time = Instant::now();
        let _guard = self.lock.try_acquire().map_err(|_| Error::ProjectBusy)?;
        let desc = &self.project.desc;
        let filter = NameFilter::new(self.mode);

        tracing::info!("Building {} ({})", desc.name, self.mode);
        tracing::info!("Project dir: {}", self.project.dir);

        self.emit_progress(BuildStage::Validating);
        let localization = LocalizationStore::load(&*fs, self.project)?;
        let mut warnings = validate_templates(&localization)?;

        self.emit_progress(BuildStage::Analyzing);
        let analyzer = DependencyAnalyzer::new(
            fs.assets(),
            filter,
            &desc.preloader_scene,
            &desc.default_fader,
        );
        let partition = analyzer.partition()?;
        let retention = analyzer.retain_classes();
        warnings.extend(retention.warnings.iter().cloned());
        tracing::info!(
            "Partitioned assets: {} preloader, {} main, {} excluded",
            partition.preloader.len(),
            partition.main.len(),
            partition.excluded.len()
        );
        tracing::info!(
            "Retained {} classes, pruned {}",
            retention.retained.len(),
            retention.pruned.len()
        );

        self.emit_progress(BuildStage::WritingManifests);
        let (preloader_json, main_json, copies) = {
            let mut manifests = ManifestBuilder::new(&*fs, filter, &desc.sound_formats);
            let mut preloader = manifests.describe(&partition.preloader)?;
            preloader.project_desc = Some(desc.clone());
            if desc.embed_locales {
                preloader.text = Some(localization.table().clone());
            }
            let main = manifests.describe(&partition.main)?;
            (
                preloader.to_filtered_json(&filter)?,
                main.to_filtered_json(&filter)?,
                manifests.into_copies(),
            )
        };
        let classes_src = generate_class_registration(&retention.retained)?;

        let build_dir = self.project.build_dir();
        write_compact(fs, &build_dir.join(PRELOADER_MANIFEST), &preloader_json)?;
        write_compact(fs, &build_dir.join(MAIN_MANIFEST), &main_json)?;
        fs.write_file(&build_dir.join(CLASSES_MODULE), classes_src.as_bytes())?;
        let copy_list = build_dir.join(COPY_LIST);
        fs.write_file(&copy_list, &serde_json::to_vec(&copies)?)?;
        self.copy_index_html(fs)?;

        self.emit_progress(BuildStage::Bundling);
        let request = BundleRequest {
            project_dir: &self.project.dir,
            mode: self.mode,
            copies: &copies,
            copy_list: &copy_list,
        };
        let outcome = match bundler.bundle(&request)? {
            BundleStatus::Success => {
                let url = success_url(&self.project.dir, self.mode);
                tracing::info!("Build finished: {}", url);
                BuildOutcome::Success { url }
            }
            BundleStatus::Failed(message) => {
                let failure = BuildFailure::parse(message);
                tracing::error!("Build failed: {}", failure);
                BuildOutcome::Failed(failure)
            }
        };

        self.emit_progress(BuildStage::Complete);

        Ok(BuildReport {
            mode: self.mode,
            retained_classes: retention
                .retained
                .iter()
                .map(|entry| entry.class_name.clone())
                .collect(),
            pruned_classes: retention.pruned,
            preloader_assets: partition.preloader.len(),
            main_assets: partition.main.len(),
            excluded_assets: partition.excluded.len(),
            warnings,
            outcome,
            build_time: start_time.elapsed(),
        })
    }

    fn copy_index_html(&self, fs: &mut dyn ProjectFs) -> Result<()> {
        for folder in self.project.asset_folders().iter().rev() {
            let source = folder.path.join(INDEX_HTML);
            if fs.exists(&source) {
                fs.copy_file(&source, &self.project.build_dir().join(INDEX_HTML))?;
                tracing::debug!("Copied {}", source);
                break;
            }
        }
        Ok(())
    }

    fn emit_progress(&self, stage: BuildStage) {
        tracing::debug!("Build stage: {:?}", stage);
        if let Some(callback) = &self.progress_callback {
            callback(BuildProgress {
                stage,
                mode: self.mode,
            });
        }
    }
}

fn validate_templates(store: &LocalizationStore) -> Result<Vec<String>> {
    let validator = TemplateValidator::new()?;
    let mut warnings = Vec::new();
    for directory in store.directories() {
        let files = store.directory_files(directory)?;
        for warning in validator.validate_directory(directory, files.values()) {
            tracing::warn!("{}", warning);
            warnings.push(warning.to_string());
        }
    }
    Ok(warnings)
}

fn write_compact(fs: &mut dyn ProjectFs, path: &Utf8Path, value: &Value) -> Result<()> {
    fs.write_file(path, &serde_json::to_vec(value)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::CopyEntry;
    use camino::Utf8PathBuf;
    use serde_json::json;
    use std::sync::Mutex;
    use thing_project::{DiskFs, MemoryFs, ProjectDesc};

    /// Records what the bundler saw.
    #[derive(Default)]
    struct FakeBundler {
        calls: Vec<(Utf8PathBuf, BuildMode, Vec<CopyEntry>)>,
        lock_held: Vec<bool>,
        lock: Option<ProjectLock>,
        fail_with: Option<String>,
    }

    impl Bundler for FakeBundler {
        fn bundle(&mut self, request: &BundleRequest<'_>) -> Result<BundleStatus> {
            self.calls.push((
                request.project_dir.to_owned(),
                request.mode,
                request.copies.to_vec(),
            ));
            if let Some(lock) = &self.lock {
                self.lock_held.push(lock.is_held());
            }
            Ok(match &self.fail_with {
                Some(message) => BundleStatus::Failed(message.clone()),
                None => BundleStatus::Success,
            })
        }
    }

    fn class(name: &str, extends: Option<&str>) -> Value {
        json!({
            "className": name,
            "sourcePath": format!("/games/demo/src/{}.c.ts", name.to_lowercase()),
            "extends": extends,
            "defaultValues": { "speed": 1, "__note": "editor only" },
            "requiredComponents": [],
        })
    }

    fn project(embed_locales: bool) -> Project {
        let mut desc = ProjectDesc::new("demo");
        desc.preloader_scene = "boot".to_string();
        desc.embed_locales = embed_locales;
        desc.sound_formats = vec!["ogg".to_string()];
        Project::new("games/demo", desc)
    }

    fn project_fs(project: &Project) -> MemoryFs {
        let mut fs = MemoryFs::new(project.asset_folders())
            .with_json(
                "games/demo/assets/boot.s.json",
                json!({ "c": "Scene", ":": [ { "c": "Sprite", "p": { "image": "logo" } } ] }),
            )
            .with_json(
                "games/demo/assets/level1.s.json",
                json!({ "c": "Scene", ":": [ { "c": "Container", "p": { "prefabName": "enemy" } } ] }),
            )
            .with_json(
                "games/demo/assets/enemy.p.json",
                json!({ "c": "Enemy", "p": { "sound": "growl" } }),
            )
            .with_json("games/demo/assets/__debug.p.json", json!({ "c": "Debug" }))
            .with_file("games/demo/assets/logo.png", b"logo".to_vec())
            .with_file("games/demo/assets/growl.wav", b"growl".to_vec())
            .with_file("games/demo/assets/index.html", b"<html></html>".to_vec())
            .with_json("games/demo/assets/src/scene.c.json", class("Scene", None))
            .with_json("games/demo/assets/src/sprite.c.json", class("Sprite", None))
            .with_json("games/demo/assets/src/container.c.json", class("Container", None))
            .with_json("games/demo/assets/src/actor.c.json", class("Actor", Some("Container")))
            .with_json("games/demo/assets/src/enemy.c.json", class("Enemy", Some("Actor")))
            .with_json("games/demo/assets/src/debug.c.json", class("Debug", None))
            .with_json(
                "games/demo/assets/i18n/en.json",
                json!({ "greeting": "Hello %s", "menu": { "start": "Start" } }),
            )
            .with_json(
                "games/demo/assets/i18n/fr.json",
                json!({ "greeting": "Bonjour", "menu": { "start": "Jouer" } }),
            );
        fs.refresh_assets_list().unwrap();
        fs
    }

    fn tmp(name: &str) -> Utf8PathBuf {
        Utf8PathBuf::from("games/demo/.tmp").join(name)
    }

    #[test]
    fn test_build_writes_manifests() {
        let project = project(false);
        let mut fs = project_fs(&project);
        let mut bundler = FakeBundler::default();
        let report = BuildPipeline::new(&project, BuildMode::Release, ProjectLock::new())
            .run(&mut fs, &mut bundler)
            .unwrap();

        assert_eq!(
            report.retained_classes,
            vec!["Actor", "Container", "Enemy", "Scene", "Sprite"]
        );
        assert_eq!(report.pruned_classes, vec!["Debug"]);
        assert!(report.excluded_assets >= 1);

        let preloader = fs.json(&tmp(PRELOADER_MANIFEST)).unwrap();
        assert!(preloader["scenes"].get("boot").is_some());
        assert!(preloader["scenes"].get("level1").is_none());
        assert_eq!(preloader["projectDesc"]["name"], "demo");
        assert!(preloader.get("text").is_none());

        let main = fs.json(&tmp(MAIN_MANIFEST)).unwrap();
        assert!(main["scenes"].get("level1").is_some());
        assert!(main["prefabs"].get("enemy").is_some());
        assert!(main["prefabs"].get("__debug").is_none());
        assert!(main.get("projectDesc").is_none());
        assert_eq!(main["sounds"][0][1], 0);

        let classes = String::from_utf8(fs.file(&tmp(CLASSES_MODULE)).unwrap().to_vec()).unwrap();
        assert!(classes.contains("import Enemy from \"games/demo/src/enemy.c.ts\";"));
        assert!(classes.contains("Enemy.__defaultValues = {\"speed\":1};"));
        assert!(!classes.contains("Debug"));

        let copies = fs.json(&tmp(COPY_LIST)).unwrap();
        assert_eq!(copies.as_array().unwrap().len(), 2);
        assert_eq!(fs.file(&tmp(INDEX_HTML)), Some(&b"<html></html>"[..]));

        assert_eq!(bundler.calls.len(), 1);
        assert_eq!(bundler.calls[0].0, Utf8PathBuf::from("games/demo"));
        assert_eq!(bundler.calls[0].1, BuildMode::Release);
        assert_eq!(
            report.outcome,
            BuildOutcome::Success {
                url: "http://localhost:5174/games/demo/release/".to_string()
            }
        );
    }

    #[test]
    fn test_template_warnings_reported() {
        let project = project(false);
        let mut fs = project_fs(&project);
        let report = BuildPipeline::new(&project, BuildMode::Debug, ProjectLock::new())
            .run(&mut fs, &mut FakeBundler::default())
            .unwrap();

        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("greeting"));
        assert!(report.warnings[0].contains("fr"));
        assert!(report.outcome.is_success());
    }

    #[test]
    fn test_embedded_locales() {
        let project = project(true);
        let mut fs = project_fs(&project);
        BuildPipeline::new(&project, BuildMode::Release, ProjectLock::new())
            .run(&mut fs, &mut FakeBundler::default())
            .unwrap();

        let preloader = fs.json(&tmp(PRELOADER_MANIFEST)).unwrap();
        assert_eq!(preloader["text"]["en"]["menu.start"], "Start");
        assert_eq!(preloader["text"]["fr"]["greeting"], "Bonjour");
        let main = fs.json(&tmp(MAIN_MANIFEST)).unwrap();
        assert!(main.get("text").is_none());
    }

    #[test]
    fn test_lock_held_during_bundling() {
        let project = project(false);
        let mut fs = project_fs(&project);
        let lock = ProjectLock::new();
        let mut bundler = FakeBundler {
            lock: Some(lock.clone()),
            ..Default::default()
        };
        BuildPipeline::new(&project, BuildMode::Release, lock.clone())
            .run(&mut fs, &mut bundler)
            .unwrap();

        assert_eq!(bundler.lock_held, vec![true]);
        assert!(!lock.is_held());
    }

    #[test]
    fn test_busy_project_refused() {
        let project = project(false);
        let mut fs = project_fs(&project);
        let lock = ProjectLock::new();
        let _guard = lock.try_acquire().unwrap();
        let mut bundler = FakeBundler::default();

        let result = BuildPipeline::new(&project, BuildMode::Release, lock.clone())
            .run(&mut fs, &mut bundler);
        assert!(matches!(result, Err(Error::ProjectBusy)));
        assert!(bundler.calls.is_empty());
        assert!(fs.file(&tmp(PRELOADER_MANIFEST)).is_none());
    }

    #[test]
    fn test_bundler_failure_keeps_manifests() {
        let project = project(false);
        let mut fs = project_fs(&project);
        let mut bundler = FakeBundler {
            fail_with: Some("Build failed\ngames/demo/src/enemy.c.ts:4:2: ERROR: boom".to_string()),
            ..Default::default()
        };
        let report = BuildPipeline::new(&project, BuildMode::Debug, ProjectLock::new())
            .run(&mut fs, &mut bundler)
            .unwrap();

        let BuildOutcome::Failed(failure) = &report.outcome else {
            panic!("expected a failed build");
        };
        let location = failure.location.as_ref().unwrap();
        assert_eq!((location.file.as_str(), location.line, location.column), ("games/demo/src/enemy.c.ts", 4, 2));
        assert!(fs.file(&tmp(PRELOADER_MANIFEST)).is_some());
    }

    #[test]
    fn test_missing_preloader_aborts() {
        let mut project = project(false);
        project.desc.preloader_scene = "nowhere".to_string();
        let mut fs = project_fs(&project);
        let mut bundler = FakeBundler::default();
        let result = BuildPipeline::new(&project, BuildMode::Release, ProjectLock::new())
            .run(&mut fs, &mut bundler);

        assert!(matches!(result, Err(Error::MissingAsset { .. })));
        assert!(bundler.calls.is_empty());
    }

    #[test]
    fn test_progress_stages_in_order() {
        let project = project(false);
        let mut fs = project_fs(&project);
        let stages = Arc::new(Mutex::new(Vec::new()));
        let seen = Arc::clone(&stages);
        BuildPipeline::new(&project, BuildMode::Release, ProjectLock::new())
            .with_progress(move |progress| seen.lock().unwrap().push(progress.stage))
            .run(&mut fs, &mut FakeBundler::default())
            .unwrap();

        assert_eq!(
            *stages.lock().unwrap(),
            vec![
                BuildStage::Validating,
                BuildStage::Analyzing,
                BuildStage::WritingManifests,
                BuildStage::Bundling,
                BuildStage::Complete,
            ]
        );
    }

    #[test]
    fn test_repeated_builds_are_identical() {
        let project = project(true);
        let mut fs = project_fs(&project);
        let pipeline = BuildPipeline::new(&project, BuildMode::Release, ProjectLock::new());

        pipeline.run(&mut fs, &mut FakeBundler::default()).unwrap();
        let first: Vec<_> = [PRELOADER_MANIFEST, MAIN_MANIFEST, CLASSES_MODULE, COPY_LIST]
            .iter()
            .map(|name| fs.file(&tmp(name)).unwrap().to_vec())
            .collect();
        pipeline.run(&mut fs, &mut FakeBundler::default()).unwrap();
        for (name, before) in [PRELOADER_MANIFEST, MAIN_MANIFEST, CLASSES_MODULE, COPY_LIST]
            .iter()
            .zip(first)
        {
            assert_eq!(fs.file(&tmp(name)).unwrap(), &before[..], "{} changed", name);
        }
    }

    #[test]
    fn test_build_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap();
        let assets = root.join("games/demo/assets");
        std::fs::create_dir_all(assets.join("src")).unwrap();
        std::fs::write(assets.join("boot.s.json"), r#"{ "c": "Scene" }"#).unwrap();
        std::fs::write(
            assets.join("src/scene.c.json"),
            r#"{ "className": "Scene", "sourcePath": "/games/demo/src/scene.c.ts" }"#,
        )
        .unwrap();

        let project = project(false);
        let mut fs = DiskFs::open(root.clone(), project.asset_folders()).unwrap();
        let report = BuildPipeline::new(&project, BuildMode::Release, ProjectLock::new())
            .run(&mut fs, &mut FakeBundler::default())
            .unwrap();

        assert_eq!(report.retained_classes, vec!["Scene"]);
        assert_eq!(report.preloader_assets, 1);
        let written = std::fs::read_to_string(root.join("games/demo/.tmp/assets-preloader.json")).unwrap();
        assert!(written.contains("\"boot\""));
        assert!(root.join("games/demo/.tmp/classes.ts").exists());
    }

    #[test]
    fn test_success_url() {
        assert_eq!(
            success_url(Utf8Path::new("/games/demo/"), BuildMode::Debug),
            "http://localhost:5174/games/demo/debug/"
        );
    }
}
