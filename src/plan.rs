//! Computing dependency range edits from a package graph.
//!
//! Planning is pure: it reads the scan-time versions held by the graph and
//! produces the edits to write, without touching the file system. Ranges are
//! derived only from those versions, never from another package's updated
//! manifest, so the order packages are visited in cannot change the result
//! and dependency cycles need no special handling.

use log::{debug, info};
use serde::Serialize;
use std::path::PathBuf;

use crate::error::{UpdateError, UpdateResult};
use crate::package::PackageGraph;
use crate::version::VersionRange;

/// New range for one dependency of one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edit {
    pub manifest_path: PathBuf,
    pub package_id: String,
    pub dependency_id: String,
    /// First declared range for this dependency
    pub previous: VersionRange,
    pub range: VersionRange,
    changed: bool,
}

impl Edit {
    /// Whether applying this edit changes the manifest.
    pub fn is_change(&self) -> bool {
        self.changed
    }
}

/// A dependency that does not resolve to a scanned package. Left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExternalDependency {
    pub package_id: String,
    pub dependency_id: String,
    pub range: VersionRange,
}

/// All edits for one manifest, one per internal dependency id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEdits {
    pub manifest_path: PathBuf,
    pub package_id: String,
    pub edits: Vec<Edit>,
}

impl ManifestEdits {
    pub fn has_changes(&self) -> bool {
        self.edits.iter().any(Edit::is_change)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdatePlan {
    /// One entry per package, in discovery order
    pub manifests: Vec<ManifestEdits>,
    pub external: Vec<ExternalDependency>,
}

impl UpdatePlan {
    pub fn edits(&self) -> impl Iterator<Item = &Edit> {
        self.manifests.iter().flat_map(|m| m.edits.iter())
    }

    pub fn changes(&self) -> impl Iterator<Item = &Edit> {
        self.edits().filter(|e| e.is_change())
    }
}

/// Pin every internal dependency to `[current, next major)` of its target.
#[tracing::instrument(skip(graph))]
pub fn plan_updates(graph: &PackageGraph) -> UpdateResult<UpdatePlan> {
    let mut plan = UpdatePlan::default();

    for package in graph.packages() {
        let mut edits: Vec<Edit> = Vec::new();

        for dependency in &package.dependencies {
            let Some(target) = graph.resolve(&dependency.id) else {
                info!(
                    "{}: {} is not an intra-solution dependency",
                    package.id, dependency.id
                );
                plan.external.push(ExternalDependency {
                    package_id: package.id.clone(),
                    dependency_id: dependency.id.clone(),
                    range: dependency.range.clone(),
                });
                continue;
            };

            if target.id == package.id {
                debug!("{} depends on itself", package.id);
            }

            let range = VersionRange::pinned_to_major(target.current_version.clone()).map_err(|source| {
                UpdateError::Parse {
                    path: target.manifest_path.clone(),
                    context: format!("current version of {}", target.id),
                    source,
                }
            })?;

            // The same id may be declared in several framework groups
            if let Some(existing) = edits.iter_mut().find(|e| e.dependency_id == dependency.id) {
                existing.changed |= dependency.range != range;
                continue;
            }

            debug!(
                "{}: {} {} -> {}",
                package.id, dependency.id, dependency.range, range
            );
            edits.push(Edit {
                manifest_path: package.manifest_path.clone(),
                package_id: package.id.clone(),
                dependency_id: dependency.id.clone(),
                changed: dependency.range != range,
                previous: dependency.range.clone(),
                range,
            });
        }

        plan.manifests.push(ManifestEdits {
            manifest_path: package.manifest_path.clone(),
            package_id: package.id.clone(),
            edits,
        });
    }

    Ok(plan)
}
