//! Build pipeline of thing-editor projects.
//!
//! A build filters out debug-only content, splits the remaining assets into a
//! preloader bundle and a main bundle, prunes classes nothing references and
//! writes the manifests an external bundler packages:
//!
//! - `assets-preloader.json` / `assets-main.json`: one [`AssetDescriptor`] per
//!   partition
//! - `classes.ts`: the generated class-registration module
//! - `assets-to-copy.json`: binary files to copy under content-hashed names
//!
//! See [`BuildPipeline`] for the full algorithm.

pub mod analyzer;
pub mod bundler;
mod classes;
pub mod error;
pub mod filter;
mod graph;
mod hash;
pub mod manifest;
mod pipeline;

pub use analyzer::{ClassManifestEntry, ClassRetention, DependencyAnalyzer, Partition};
pub use bundler::{BuildFailure, BundleRequest, BundleStatus, Bundler, CommandBundler, SourceLocation};
pub use classes::{generate_class_registration, CLASSES_MODULE};
pub use error::{Error, Result};
pub use filter::{BuildMode, NameFilter, CHILDREN_KEY};
pub use hash::hashed_asset_name;
pub use manifest::{AssetDescriptor, CopyEntry, ManifestBuilder, SoundEntry};
pub use pipeline::{
    success_url, BuildOutcome, BuildPipeline, BuildProgress, BuildReport, BuildStage,
    DEV_SERVER_PORT,
};
