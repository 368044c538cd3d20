//! Application layer - Use cases that coordinate the package and manifest modules.
//!
//! This layer sits between the CLI and the domain: it owns the order in which
//! the repository is read, planned and written.

mod update;

pub use update::{
    DependencyReport, DependencyStatus, PackageReport, RunSummary, UpdateOptions, UpdateUseCase,
};
