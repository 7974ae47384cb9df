mod build;
mod info;
mod l10n;

pub use build::*;
pub use info::*;
pub use l10n::*;
