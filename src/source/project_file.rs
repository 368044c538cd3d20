use log::debug;
use std::path::Path;

use crate::error::{UpdateError, UpdateResult};
use crate::runtime::Runtime;
use crate::version::SemanticVersion;
use crate::xml;

use super::VersionSource;

/// Reads `<Version>` (or `<VersionPrefix>`) from the `.csproj` next to the manifest.
///
/// Unlike `AssemblyVersion`, these properties may carry a prerelease label.
pub struct ProjectFileSource<'a, R: Runtime> {
    runtime: &'a R,
}

impl<'a, R: Runtime> ProjectFileSource<'a, R> {
    pub fn new(runtime: &'a R) -> Self {
        Self { runtime }
    }
}

impl<R: Runtime> VersionSource for ProjectFileSource<'_, R> {
    #[tracing::instrument(skip(self))]
    fn current_version(&self, source_dir: &Path) -> UpdateResult<SemanticVersion> {
        let unavailable = |reason: String| UpdateError::VersionUnavailable {
            dir: source_dir.to_path_buf(),
            reason,
        };

        let project = self
            .runtime
            .read_dir(source_dir)
            .map_err(|e| UpdateError::io(source_dir, e))?
            .into_iter()
            .find(|p| {
                p.extension().is_some_and(|e| e.eq_ignore_ascii_case("csproj"))
                    && !self.runtime.is_dir(p)
            })
            .ok_or_else(|| unavailable("no .csproj file".into()))?;

        let text = self
            .runtime
            .read_to_string(&project)
            .map_err(|e| UpdateError::io(&project, e))?;
        let package = xml::parse(&project, &text)?;
        let document = package.as_document();

        let mut value = None;
        for property in ["Version", "VersionPrefix"] {
            let query = xml::local_path(&["Project", "PropertyGroup", property]);
            value = xml::first_text(&project, &document, &query)?;
            if value.is_some() {
                break;
            }
        }
        let value = value.ok_or_else(|| {
            unavailable(format!("no <Version> property in {}", project.display()))
        })?;

        debug!("{:?}: <Version>{}</Version>", project, value);

        SemanticVersion::parse(&value).map_err(|source| UpdateError::Parse {
            path: project,
            context: "<Version> property".into(),
            source,
        })
    }
}
