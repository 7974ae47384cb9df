//! Error types for localization editing.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Reasons an edit is refused before anything is mutated.
///
/// The `Display` text is the message shown next to the rejected input.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyRejection {
    #[error("ID already exists")]
    KeyExists(String),

    #[error("ID can not begin or end with \".\"")]
    DotAtEdge(String),

    #[error("ID can contain letters, digits, \"_\", \"/\" and \".\"")]
    InvalidCharacters(String),

    #[error("ID can not be empty")]
    EmptyKey,

    /// The key would nest under another key's text, or another key would
    /// nest under it. Carries the existing key.
    #[error("ID conflicts with existing key \"{0}\"")]
    PathConflict(String),

    #[error("Please rename key.")]
    SameKey(String),

    #[error("Key with that name already exists.")]
    RenameTargetExists(String),

    #[error("Key \"{0}\" does not exist")]
    UnknownKey(String),

    #[error("Language with ID={0} already exists")]
    LanguageExists(String),

    #[error("Language ID can contain letters, digits, \"_\" and \"-\"")]
    InvalidLanguageId(String),

    #[error("Localization folder {0} already exists")]
    DirectoryExists(String),
}

/// Errors that can occur while loading, editing or persisting localization data.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading, writing or scanning project files failed.
    #[error(transparent)]
    Project(#[from] thing_project::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Regex(#[from] regex::Error),

    /// The edit was refused by validation; nothing changed.
    #[error("{0}")]
    Rejected(#[from] KeyRejection),

    /// A directory is registered but holds no files. Directories are only
    /// created together with their first file, so this is an invariant
    /// violation.
    #[error("Localization folder {0} has no files")]
    EmptyDirectory(String),

    #[error("Unknown localization folder: {0}")]
    UnknownDirectory(String),

    #[error("No \"{language}\" file in localization folder {directory}")]
    UnknownLanguage { directory: String, language: String },

    /// An operation needs a selected directory but the project has no
    /// localization files at all.
    #[error("Project has no localization folders")]
    NoDirectories,

    #[error("A localization file has invalid content: {0}")]
    InvalidContent(String),

    /// A build holds the project lock.
    #[error("Project is locked by a running build")]
    ProjectBusy,
}
