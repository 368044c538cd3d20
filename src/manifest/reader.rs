use log::debug;
use std::path::Path;

use crate::error::{UpdateError, UpdateResult};
use crate::package::{Dependency, Package};
use crate::runtime::Runtime;
use crate::source::VersionSource;
use crate::version::VersionRange;
use crate::xml;

use super::{DEPENDENCY_PATH, GROUPED_DEPENDENCY_PATH, ID_PATH};

/// Id and dependencies declared by a manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestContents {
    pub id: String,
    pub dependencies: Vec<Dependency>,
}

/// Parse manifest text.
///
/// Every dependency must carry `id` and `version`, and every `version` must
/// be a valid range: a bad entry fails the whole manifest rather than being
/// skipped, because that attribute is what gets rewritten.
pub fn parse_manifest(path: &Path, text: &str) -> UpdateResult<ManifestContents> {
    let package = xml::parse(path, text)?;
    let document = package.as_document();

    let id = xml::first_text(path, &document, &xml::local_path(ID_PATH))?
        .ok_or_else(|| UpdateError::malformed(path, "missing /package/metadata/id"))?;

    let query = format!(
        "{} | {}",
        xml::local_path(DEPENDENCY_PATH),
        xml::local_path(GROUPED_DEPENDENCY_PATH)
    );

    let mut dependencies = Vec::new();
    for (index, node) in xml::select(path, &document, &query)?.iter().enumerate() {
        let missing = |attribute: &str| {
            UpdateError::malformed(
                path,
                format!("dependency #{} has no '{}' attribute", index + 1, attribute),
            )
        };

        let dep_id = xml::attribute(node, "id")
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| missing("id"))?;
        let version = xml::attribute(node, "version").ok_or_else(|| missing("version"))?;

        let range = VersionRange::parse(version).map_err(|source| UpdateError::Parse {
            path: path.to_path_buf(),
            context: format!("dependency '{}'", dep_id),
            source,
        })?;

        dependencies.push(Dependency::new(dep_id, range));
    }

    Ok(ManifestContents { id, dependencies })
}

/// Read a manifest and resolve its package's current version.
///
/// The version source is consulted exactly once, with the manifest's
/// directory.
#[tracing::instrument(skip(runtime, source))]
pub fn read_manifest<R, S>(runtime: &R, source: &S, path: &Path) -> UpdateResult<Package>
where
    R: Runtime,
    S: VersionSource + ?Sized,
{
    let text = runtime
        .read_to_string(path)
        .map_err(|e| UpdateError::io(path, e))?;
    let contents = parse_manifest(path, &text)?;

    let source_dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."))
        .to_path_buf();
    let current_version = source.current_version(&source_dir)?;

    debug!(
        "{:?}: package {} at {} with {} dependencies",
        path,
        contents.id,
        current_version,
        contents.dependencies.len()
    );

    Ok(Package {
        id: contents.id,
        manifest_path: path.to_path_buf(),
        source_dir,
        current_version,
        dependencies: contents.dependencies,
    })
}
