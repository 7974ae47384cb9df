use camino::Utf8PathBuf;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    #[error("No project selected")]
    #[diagnostic(
        code(project::not_selected),
        help("Pass --project <dir> (e.g. games/demo); it is remembered for later runs")
    )]
    ProjectNotSelected,

    #[error("Project description not found in {dir}")]
    #[diagnostic(
        code(config::not_found),
        help("Create a thing-project.json or thing-project.toml file in your project directory")
    )]
    ProjectDescNotFound { dir: Utf8PathBuf },

    #[error("Project \"{name}\" has no bundler configured")]
    #[diagnostic(
        code(build::no_bundler),
        help("Add a \"bundler\": {{ \"command\": ..., \"args\": [...] }} entry to the project description")
    )]
    NoBundler { name: String },

    #[error("Build failed: {message}")]
    #[diagnostic(code(build::failed), help("{location}"))]
    BuildFailed {
        message: String,
        location: String,
    },

    #[error("Invalid workspace root: {path}")]
    #[diagnostic(
        code(config::invalid_root),
        help("The root must be an existing directory with a UTF-8 path")
    )]
    InvalidRoot { path: String },

    #[error("Localization edit rejected: {reason}")]
    #[diagnostic(code(l10n::rejected))]
    Rejected { reason: String },
}

impl CliError {
    pub fn no_bundler(name: impl Into<String>) -> Self {
        Self::NoBundler { name: name.into() }
    }

    pub fn invalid_root(path: impl Into<String>) -> Self {
        Self::InvalidRoot { path: path.into() }
    }
}
