//! The external bundler collaborator and parsing of its failures.

use crate::error::{Error, Result};
use crate::filter::BuildMode;
use crate::manifest::CopyEntry;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::process::Command;
use thing_project::BundlerCommand;

/// Everything the bundler gets to package a build.
#[derive(Debug, Clone, Copy)]
pub struct BundleRequest<'a> {
    /// Project directory relative to the filesystem root.
    pub project_dir: &'a Utf8Path,
    pub mode: BuildMode,
    pub copies: &'a [CopyEntry],
    /// Where the copy list was written, for bundlers that read it from disk.
    pub copy_list: &'a Utf8Path,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BundleStatus {
    Success,
    /// The bundler ran and reported an error message.
    Failed(String),
}

/// Final packaging step of a build.
///
/// `Err` means the bundler could not run at all; a bundler that ran and
/// rejected the project returns [`BundleStatus::Failed`].
pub trait Bundler {
    fn bundle(&mut self, request: &BundleRequest<'_>) -> Result<BundleStatus>;
}

/// Runs `<command> <args…> <projectRoot> <debug|release>` from the filesystem
/// root.
#[derive(Debug, Clone)]
pub struct CommandBundler {
    root: Utf8PathBuf,
    command: BundlerCommand,
}

impl CommandBundler {
    pub fn new(root: impl Into<Utf8PathBuf>, command: BundlerCommand) -> Self {
        Self {
            root: root.into(),
            command,
        }
    }
}

impl Bundler for CommandBundler {
    fn bundle(&mut self, request: &BundleRequest<'_>) -> Result<BundleStatus> {
        let project_root = self.root.join(request.project_dir);
        tracing::info!(
            "Running bundler: {} {} {} {}",
            self.command.command,
            self.command.args.join(" "),
            project_root,
            request.mode
        );

        let output = Command::new(&self.command.command)
            .args(&self.command.args)
            .arg(project_root.as_str())
            .arg(request.mode.as_str())
            .current_dir(self.root.as_std_path())
            .output()
            .map_err(|source| Error::BundlerSpawn {
                command: self.command.command.clone(),
                source,
            })?;

        if output.status.success() {
            return Ok(BundleStatus::Success);
        }

        let mut message = String::from_utf8_lossy(&output.stdout).into_owned();
        message.push_str(&String::from_utf8_lossy(&output.stderr));
        let message = message.trim().to_string();
        tracing::error!("Bundler exited with {}", output.status);
        Ok(BundleStatus::Failed(message))
    }
}

/// A source position reported by the bundler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildFailure {
    /// Raw bundler message, always kept.
    pub message: String,
    pub location: Option<SourceLocation>,
}

impl BuildFailure {
    /// Parse `summary\n<file>:<line>:<column>: ERROR ...`. The file may itself
    /// contain `:` (drive letters). Unparseable messages keep no location.
    pub fn parse(message: impl Into<String>) -> Self {
        let message = message.into();
        let location = parse_location(&message);
        if location.is_none() {
            tracing::debug!("No source location in bundler message");
        }
        Self { message, location }
    }

    /// Path following `" in file "`, if the message names one.
    pub fn file_link(&self) -> Option<&str> {
        let (_, rest) = self.message.split_once(" in file ")?;
        let path = rest.lines().next()?.trim();
        (!path.is_empty()).then_some(path)
    }
}

impl fmt::Display for BuildFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn parse_location(message: &str) -> Option<SourceLocation> {
    let detail = message.split('\n').nth(1)?;
    let tokens: Vec<&str> = detail.split(':').collect();
    let marker = tokens.iter().position(|t| t.contains("ERROR"))?;
    if marker < 3 {
        return None;
    }
    let line = tokens[marker - 2].trim().parse().ok()?;
    let column = tokens[marker - 1].trim().parse().ok()?;
    let file = tokens[..marker - 2].join(":");
    Some(SourceLocation {
        file: file.trim().to_string(),
        line,
        column,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_location() {
        let failure = BuildFailure::parse(
            "Build failed with 1 error:\ngames/demo/src/enemy.c.ts:12:5: ERROR: Expected \";\" but found \"}\"",
        );
        assert_eq!(
            failure.location,
            Some(SourceLocation {
                file: "games/demo/src/enemy.c.ts".into(),
                line: 12,
                column: 5,
            })
        );
        assert_eq!(failure.location.unwrap().to_string(), "games/demo/src/enemy.c.ts:12:5");
    }

    #[test]
    fn test_parse_location_with_drive_letter() {
        let failure = BuildFailure::parse("Build failed\nC:/work/src/a.ts:3:14: ERROR: oops");
        let location = failure.location.unwrap();
        assert_eq!(location.file, "C:/work/src/a.ts");
        assert_eq!((location.line, location.column), (3, 14));
    }

    #[test]
    fn test_unparseable_message_kept() {
        for message in ["single line", "Build failed\nno marker here", "x\nERROR: a:b"] {
            let failure = BuildFailure::parse(message);
            assert_eq!(failure.location, None);
            assert_eq!(failure.message, message);
        }
    }

    #[test]
    fn test_file_link() {
        let failure = BuildFailure::parse("Could not resolve import in file games/demo/src/hud.c.ts");
        assert_eq!(failure.file_link(), Some("games/demo/src/hud.c.ts"));
        assert_eq!(BuildFailure::parse("plain").file_link(), None);
    }
}
