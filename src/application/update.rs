//! Update use case - pins intra-solution dependency ranges.
//!
//! This use case coordinates:
//! - Finding manifests below the root
//! - Reading each package and its current version
//! - Planning the new ranges
//! - Writing the changed manifests (skipped for a dry run)
//!
//! Every manifest is read before the first one is written, so a bad manifest
//! anywhere in the tree leaves the whole repository untouched.

use anyhow::anyhow;
use log::{debug, info};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{UpdateError, UpdateResult};
use crate::manifest::{apply_edits, read_manifest};
use crate::package::{Package, PackageGraph, ScanOptions, scan};
use crate::plan::{Edit, UpdatePlan, plan_updates};
use crate::runtime::{Runtime, display_relative};
use crate::source::VersionSource;
use crate::version::{SemanticVersion, VersionRange};

/// Resolved settings for one run
#[derive(Debug, Clone)]
pub struct UpdateOptions {
    pub root: PathBuf,
    pub scan: ScanOptions,
    pub dry_run: bool,
}

/// What happened to one declared dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DependencyStatus {
    Updated { from: VersionRange, to: VersionRange },
    Unchanged { range: VersionRange },
    External { range: VersionRange },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyReport {
    pub id: String,
    #[serde(flatten)]
    pub status: DependencyStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageReport {
    pub id: String,
    /// Manifest path relative to the scan root
    pub manifest: PathBuf,
    pub version: SemanticVersion,
    pub dependencies: Vec<DependencyReport>,
}

/// Outcome of a run, printed as text or JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub root: PathBuf,
    pub packages: Vec<PackageReport>,
    pub internal_dependencies: usize,
    pub external_dependencies: usize,
    pub edits_applied: usize,
    pub manifests_written: usize,
    pub dry_run: bool,
    /// Range changes written to disk, or the planned ones for a dry run
    pub changes: Vec<Edit>,
}

/// Dependency ids actually rewritten, keyed by manifest path.
type Applied = HashMap<PathBuf, Vec<String>>;

impl RunSummary {
    /// Summarise a run. For a dry run every planned change is reported;
    /// otherwise only the edits found in `applied`.
    fn new(
        root: &Path,
        graph: &PackageGraph,
        plan: &UpdatePlan,
        dry_run: bool,
        applied: &Applied,
    ) -> Self {
        let effective = |edit: &Edit| {
            edit.is_change()
                && (dry_run
                    || applied
                        .get(&edit.manifest_path)
                        .is_some_and(|ids| ids.contains(&edit.dependency_id)))
        };

        let packages = graph
            .packages()
            .map(|package| PackageReport {
                id: package.id.clone(),
                manifest: display_relative(root, &package.manifest_path),
                version: package.current_version.clone(),
                dependencies: dependency_reports(package, plan, &effective),
            })
            .collect();
        let changes: Vec<Edit> = plan.edits().filter(|e| effective(*e)).cloned().collect();

        let mut summary = RunSummary {
            root: root.to_path_buf(),
            packages,
            internal_dependencies: plan.edits().count(),
            external_dependencies: plan.external.len(),
            edits_applied: 0,
            manifests_written: 0,
            dry_run,
            changes,
        };
        if !dry_run {
            summary.edits_applied = summary.changes.len();
            summary.manifests_written = summary.manifests_changed();
        }
        summary
    }

    /// Manifests with at least one reported change
    pub fn manifests_changed(&self) -> usize {
        let mut paths: Vec<&Path> = self.changes.iter().map(|e| e.manifest_path.as_path()).collect();
        paths.dedup();
        paths.len()
    }
}

fn dependency_reports(
    package: &Package,
    plan: &UpdatePlan,
    effective: &dyn Fn(&Edit) -> bool,
) -> Vec<DependencyReport> {
    let edits: Vec<&Edit> = plan
        .edits()
        .filter(|e| e.manifest_path == package.manifest_path)
        .collect();

    package
        .dependency_ids()
        .into_iter()
        .filter_map(|id| {
            let status = match edits.iter().find(|e| e.dependency_id == id) {
                Some(edit) if effective(edit) => DependencyStatus::Updated {
                    from: edit.previous.clone(),
                    to: edit.range.clone(),
                },
                Some(edit) => DependencyStatus::Unchanged {
                    range: edit.range.clone(),
                },
                None => {
                    let external = plan
                        .external
                        .iter()
                        .find(|x| x.package_id == package.id && x.dependency_id == id)?;
                    DependencyStatus::External {
                        range: external.range.clone(),
                    }
                }
            };
            Some(DependencyReport {
                id: id.to_string(),
                status,
            })
        })
        .collect()
}

/// Update use case - scan, plan and apply
pub struct UpdateUseCase<'a, R: Runtime, S: VersionSource + ?Sized> {
    runtime: &'a R,
    source: &'a S,
}

impl<'a, R: Runtime, S: VersionSource + ?Sized> UpdateUseCase<'a, R, S> {
    pub fn new(runtime: &'a R, source: &'a S) -> Self {
        Self { runtime, source }
    }

    /// Read every manifest below the root into a package graph.
    #[tracing::instrument(skip(self, options), fields(root = ?options.root))]
    pub fn load(&self, options: &UpdateOptions) -> UpdateResult<PackageGraph> {
        if !self.runtime.is_dir(&options.root) {
            return Err(UpdateError::io(&options.root, anyhow!("not a directory")));
        }

        let mut packages = Vec::new();
        for manifest in scan(self.runtime, &options.root, &options.scan) {
            let package = read_manifest(self.runtime, self.source, &manifest?)?;
            info!(
                "Found package {} @ {:?} (version {})",
                package.id, package.manifest_path, package.current_version
            );
            packages.push(package);
        }

        debug!("Found {} package(s)", packages.len());
        PackageGraph::build(packages)
    }

    /// Run the whole update and report what changed.
    #[tracing::instrument(skip(self, options), fields(root = ?options.root, dry_run = options.dry_run))]
    pub fn execute(&self, options: &UpdateOptions) -> UpdateResult<RunSummary> {
        let graph = self.load(options)?;
        let plan = plan_updates(&graph)?;
        let mut applied = Applied::new();

        if options.dry_run {
            info!("Dry run: {} planned change(s) not written", plan.changes().count());
        } else {
            for manifest in plan.manifests.iter().filter(|m| m.has_changes()) {
                let ids = apply_edits(self.runtime, manifest)?;
                if !ids.is_empty() {
                    applied.insert(manifest.manifest_path.clone(), ids);
                }
            }
        }

        Ok(RunSummary::new(
            &options.root,
            &graph,
            &plan,
            options.dry_run,
            &applied,
        ))
    }
}
