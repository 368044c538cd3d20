//! Package model and discovery
//!
//! This module finds the manifests below a solution root and holds the
//! packages read from them, indexed by id.

mod discovery;
mod graph;
mod model;

pub use discovery::{ManifestScan, ScanOptions, find_all_manifests, scan};
pub use graph::PackageGraph;
pub use model::{Dependency, Package};
