use crate::errors::CliError;
use crate::ProjectArgs;
use camino::Utf8PathBuf;
use miette::{IntoDiagnostic, Result, WrapErr};
use thing_project::{DiskFs, Project};

pub mod config;

#[macro_export]
macro_rules! println_pad {
    ($($arg:tt)*) => {{
        let __s = format!($($arg)*);
        for __line in __s.lines() {
            println!("    {}", __line);
        }
    }};
}

/// The workspace root and the project opened inside it.
#[derive(Debug)]
pub struct Workspace {
    pub root: Utf8PathBuf,
    pub project: Project,
}

impl Workspace {
    /// Resolve the root and project from the arguments, falling back to the
    /// last used ones, and remember them for the next run.
    pub fn open(args: &ProjectArgs) -> Result<Self> {
        let mut cfg = config::load_config();

        let root = match (&args.root, &cfg.root) {
            (Some(root), _) => Utf8PathBuf::from(root),
            (None, Some(root)) => root.clone(),
            (None, None) => current_dir()?,
        };
        if !root.as_std_path().is_dir() {
            return Err(CliError::invalid_root(root.as_str()).into());
        }

        let dir = args
            .project
            .as_deref()
            .map(Utf8PathBuf::from)
            .or_else(|| cfg.project.clone())
            .ok_or(CliError::ProjectNotSelected)?;
        let dir = Utf8PathBuf::from(dir.as_str().trim_matches('/'));

        let project = match Project::load(&root, dir) {
            Ok(project) => project,
            Err(thing_project::Error::ProjectDescNotFound(dir)) => {
                return Err(CliError::ProjectDescNotFound { dir }.into())
            }
            Err(e) => {
                return Err(e)
                    .into_diagnostic()
                    .wrap_err("Failed to load project description")
            }
        };

        cfg.root = Some(root.clone());
        cfg.project = Some(project.dir.clone());
        if let Err(e) = config::save_config(&cfg) {
            tracing::warn!("Failed to save config: {}", e);
        }

        Ok(Self { root, project })
    }

    /// Scan the project's asset folders.
    pub fn open_fs(&self) -> Result<DiskFs> {
        DiskFs::open(self.root.clone(), self.project.asset_folders())
            .into_diagnostic()
            .wrap_err("Failed to scan asset folders")
    }
}

fn current_dir() -> Result<Utf8PathBuf> {
    let dir = std::env::current_dir().into_diagnostic()?;
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|dir| CliError::invalid_root(dir.display().to_string()).into())
}
