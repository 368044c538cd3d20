//! Registry of the packages found in one scan.

use std::collections::HashMap;

use crate::error::{UpdateError, UpdateResult};

use super::Package;

/// All discovered packages, keyed by id, in discovery order.
///
/// Read-only once built. Dependency cycles between ids are allowed; the graph
/// only answers lookups and never walks edges.
#[derive(Debug, Default)]
pub struct PackageGraph {
    packages: Vec<Package>,
    index: HashMap<String, usize>,
}

impl PackageGraph {
    /// Build the graph, rejecting two manifests that declare the same id.
    pub fn build(packages: impl IntoIterator<Item = Package>) -> UpdateResult<Self> {
        let mut graph = PackageGraph::default();
        for package in packages {
            if let Some(&existing) = graph.index.get(&package.id) {
                return Err(UpdateError::DuplicatePackageId {
                    id: package.id,
                    first: graph.packages[existing].manifest_path.clone(),
                    second: package.manifest_path,
                });
            }
            graph.index.insert(package.id.clone(), graph.packages.len());
            graph.packages.push(package);
        }
        Ok(graph)
    }

    /// Look up a package by exact id. `None` means the id is external.
    pub fn resolve(&self, id: &str) -> Option<&Package> {
        self.index.get(id).map(|&i| &self.packages[i])
    }

    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.iter()
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}
