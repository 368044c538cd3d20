use log::{debug, info};
use std::path::Path;

use crate::error::{UpdateError, UpdateResult};
use crate::plan::{Edit, ManifestEdits};
use crate::runtime::Runtime;

use super::document::ManifestDocument;
use super::{DEPENDENCY_PATH, GROUPED_DEPENDENCY_PATH};

/// Outcome of rewriting one manifest's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// New document text, `None` when every node already holds its range
    pub text: Option<String>,
    /// Ids of the dependencies whose `version` attribute changed, in edit order
    pub applied: Vec<String>,
}

/// Rewrite the `version` attribute of every dependency named by `edits`.
///
/// Every `dependency` element with a matching `id` is updated, including ones
/// inside framework `group`s. An edit counts as applied only if at least one
/// of its nodes held a different value.
pub fn rewrite_manifest(path: &Path, text: &str, edits: &[&Edit]) -> UpdateResult<Rewrite> {
    let mut document =
        ManifestDocument::parse(text).map_err(|e| UpdateError::malformed(path, e.to_string()))?;
    let mut applied = Vec::new();

    for edit in edits {
        let nodes = document.find_nodes(|node| {
            (node.path_is(DEPENDENCY_PATH) || node.path_is(GROUPED_DEPENDENCY_PATH))
                && node.attribute("id").map(str::trim) == Some(edit.dependency_id.as_str())
        });

        if nodes.is_empty() {
            return Err(UpdateError::DependencyNodeMissing {
                path: path.to_path_buf(),
                id: edit.dependency_id.clone(),
            });
        }

        let value = edit.range.to_string();
        let mut changed = false;
        for node in nodes {
            changed |= document.node(node).attribute("version") != Some(value.as_str());
            if !document.set_attribute(node, "version", &value) {
                return Err(UpdateError::malformed(
                    path,
                    format!("dependency '{}' has no 'version' attribute", edit.dependency_id),
                ));
            }
        }
        if changed {
            applied.push(edit.dependency_id.clone());
        }
    }

    Ok(Rewrite {
        text: (!applied.is_empty()).then(|| document.to_string()),
        applied,
    })
}

/// Apply the changing edits of one manifest in a single read-modify-write.
///
/// The file is neither read nor written when no edit changes a range, and not
/// written when every node on disk already holds its new range. Returns the
/// ids of the dependencies actually rewritten.
#[tracing::instrument(skip(runtime, manifest), fields(path = ?manifest.manifest_path))]
pub fn apply_edits<R: Runtime>(runtime: &R, manifest: &ManifestEdits) -> UpdateResult<Vec<String>> {
    let path = manifest.manifest_path.as_path();
    let changes: Vec<&Edit> = manifest.edits.iter().filter(|e| e.is_change()).collect();

    if changes.is_empty() {
        debug!("{:?}: no dependency ranges to update", path);
        return Ok(Vec::new());
    }

    let text = runtime
        .read_to_string(path)
        .map_err(|e| UpdateError::io(path, e))?;

    let rewrite = rewrite_manifest(path, &text, &changes)?;
    match rewrite.text {
        Some(updated) => {
            runtime
                .write(path, updated.as_bytes())
                .map_err(|e| UpdateError::io(path, e))?;
            info!("{:?}: updated {} dependency range(s)", path, rewrite.applied.len());
        }
        None => debug!("{:?}: already up to date on disk", path),
    }
    Ok(rewrite.applied)
}
