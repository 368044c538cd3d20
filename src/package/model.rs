use serde::Serialize;
use std::path::PathBuf;

use crate::version::{SemanticVersion, VersionRange};

/// A dependency declared in a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub id: String,
    pub range: VersionRange,
}

impl Dependency {
    pub fn new(id: impl Into<String>, range: VersionRange) -> Self {
        Self {
            id: id.into(),
            range,
        }
    }
}

/// A package discovered during the scan.
///
/// Built once from its manifest and version source; never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub id: String,
    pub manifest_path: PathBuf,
    pub source_dir: PathBuf,
    pub current_version: SemanticVersion,
    /// In document order
    pub dependencies: Vec<Dependency>,
}

impl Package {
    /// Dependency ids, each listed once, in first-seen order.
    pub fn dependency_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = Vec::with_capacity(self.dependencies.len());
        for dep in &self.dependencies {
            if !ids.contains(&dep.id.as_str()) {
                ids.push(&dep.id);
            }
        }
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dependency_ids_are_unique_in_order() {
        let range = VersionRange::parse("1.0.0").unwrap();
        let package = Package {
            id: "Acme.App".into(),
            manifest_path: PathBuf::from("/repo/App/App.nuspec"),
            source_dir: PathBuf::from("/repo/App"),
            current_version: SemanticVersion::new(1, 0, 0),
            dependencies: vec![
                Dependency::new("Acme.Core", range.clone()),
                Dependency::new("Newtonsoft.Json", range.clone()),
                Dependency::new("Acme.Core", range),
            ],
        };
        assert_eq!(package.dependency_ids(), ["Acme.Core", "Newtonsoft.Json"]);
    }
}
