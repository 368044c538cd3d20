//! Version sources - where a package's currently built version comes from.
//!
//! The manifest only declares dependencies; the version being built lives
//! next to the code. Each source reads it from a different file convention:
//!
//! - `assembly_info` - `[assembly: AssemblyVersion("1.2.3")]` in `Properties/AssemblyInfo.cs`
//! - `project_file` - `<Version>` in an SDK-style `.csproj`

mod assembly_info;
mod project_file;

use std::path::Path;

use crate::error::UpdateResult;
use crate::version::SemanticVersion;

pub use assembly_info::{AssemblyInfoSource, DEFAULT_ASSEMBLY_INFO};
pub use project_file::ProjectFileSource;

/// Reports the currently built version of the package in `source_dir`.
///
/// Fails with `VersionUnavailable` when no version marker exists.
#[cfg_attr(test, mockall::automock)]
pub trait VersionSource {
    fn current_version(&self, source_dir: &Path) -> UpdateResult<SemanticVersion>;
}

/// Selects a [`VersionSource`] implementation from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum SourceKind {
    /// `AssemblyVersion` attribute in an AssemblyInfo file
    #[default]
    AssemblyInfo,
    /// `<Version>` property of the project file
    ProjectFile,
}
