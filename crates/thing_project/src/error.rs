//! Error types for project and asset access.
//!
//! All fallible functions in this crate return [`Result<T>`]. External error
//! types (`std::io::Error`, `serde_json::Error`, TOML errors) are converted via
//! `From` impls.

use crate::asset::AssetKind;
use camino::Utf8PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading a project or touching its files.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem I/O failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse or serialize JSON (project description, assets).
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Failed to parse a TOML project description.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Neither `thing-project.json` nor `thing-project.toml` exists.
    #[error("Project description not found in {0}")]
    ProjectDescNotFound(Utf8PathBuf),

    /// The project description has an extension we can't parse.
    #[error("Invalid project description extension: {0}")]
    InvalidDescExtension(Utf8PathBuf),

    /// A file requested through [`ProjectFs`](crate::ProjectFs) does not exist.
    #[error("File not found: {0}")]
    FileNotFound(Utf8PathBuf),

    /// No asset with the given name and kind is registered.
    #[error("Asset not found: {name} ({kind})")]
    AssetNotFound { name: String, kind: AssetKind },

    /// A file expected to hold text is not valid UTF-8.
    #[error("File is not valid UTF-8: {0}")]
    InvalidUtf8(Utf8PathBuf),

    /// A build currently holds the project lock.
    #[error("Project is locked by a running build")]
    ProjectBusy,
}

/// Reasons a sound file's duration could not be read.
#[derive(Error, Debug)]
pub enum WavError {
    /// The file ended before a complete header or chunk.
    #[error("truncated WAV data: {0}")]
    Truncated(#[from] std::io::Error),

    #[error("missing {0} signature")]
    MissingSignature(&'static str),

    #[error("missing {0} chunk")]
    MissingChunk(&'static str),

    #[error("zero byte rate")]
    ZeroByteRate,
}
