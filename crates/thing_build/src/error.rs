//! Error types for build operations.

use thing_project::AssetKind;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that abort a build.
///
/// A failing bundler is not one of them: it is reported as
/// [`BuildOutcome::Failed`](crate::BuildOutcome::Failed) after the manifests
/// have been written.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading project files or writing build output failed.
    #[error(transparent)]
    Project(#[from] thing_project::Error),

    #[error(transparent)]
    Localization(#[from] thing_l10n::Error),

    /// A designated entry asset (preloader scene) is missing.
    #[error("Required {kind} \"{name}\" not found")]
    MissingAsset { name: String, kind: AssetKind },

    /// The external bundler could not be started at all.
    #[error("Failed to run bundler \"{command}\": {source}")]
    BundlerSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Another build holds the project lock.
    #[error("A build is already running")]
    ProjectBusy,
}
