//! Localization data of thing-editor projects.
//!
//! Localization files live in `i18n/` directories of any asset folder, one
//! `<language>.json` per language. The [`LocalizationStore`] merges them into
//! one table per language and exposes the current directory for editing; the
//! [`LocalizationSession`] validates edits, keeps key sets aligned across the
//! languages of a directory and persists changed files after a quiet period.

pub mod debounce;
pub mod error;
mod file;
mod key;
mod session;
mod store;
mod tree;
mod typings;
mod validate;

pub use debounce::{Clock, Debouncer, ManualClock, SystemClock, PERSIST_DEBOUNCE};
pub use error::{Error, KeyRejection, Result};
pub use file::LocalizationFile;
pub use key::KeyValidator;
pub use session::{CellRef, LocalizationSession};
pub use store::{DirectoryView, LocalizationStore, LocalizationTable, SelectableKey, NO_SELECTION};
pub use tree::{KeyedText, L10nNode, LocalizationTree, KEY_SEPARATOR};
pub use typings::{generate_typings, TYPINGS_PATH};
pub use validate::{TemplateValidator, TemplateWarning};
