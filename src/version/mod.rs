//! Version value types.
//!
//! - `semantic` - three-part versions with numeric ordering and prerelease labels
//! - `range` - NuGet interval notation over those versions

mod range;
mod semantic;

use thiserror::Error;

pub use range::{Bound, VersionRange};
pub use semantic::SemanticVersion;

/// Version and range parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("invalid version format: '{input}'")]
    InvalidFormat { input: String },

    #[error("invalid number in version: '{component}'")]
    InvalidNumber { component: String },

    #[error("invalid prerelease label: '{prerelease}'")]
    InvalidPrerelease { prerelease: String },

    #[error("invalid version range: '{input}'")]
    InvalidRange { input: String },

    #[error("version range [{min}, {max}] is empty")]
    EmptyRange {
        min: SemanticVersion,
        max: SemanticVersion,
    },

    #[error("version range has no bounds")]
    Unbounded,

    #[error("no next major version after {version}")]
    Overflow { version: SemanticVersion },
}
