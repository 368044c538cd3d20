use log::debug;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use crate::error::{UpdateError, UpdateResult};
use crate::runtime::{Runtime, has_excluded_segment};

/// Which files count as manifests and which directories are never entered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Manifest file extension, without the dot
    pub extension: String,
    /// Directory names skipped wherever they appear below the root
    pub excluded: Vec<String>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            extension: "nuspec".into(),
            excluded: ["obj", "bin", "packages", ".git"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Lazily walk `root` for manifest files.
///
/// Directories are visited depth first in `read_dir` order. Build output and
/// package caches are skipped by name, and symlinked directories are not
/// followed. Call `scan` again (or clone the iterator before use) to restart.
pub fn scan<'a, R: Runtime>(runtime: &'a R, root: &Path, options: &'a ScanOptions) -> ManifestScan<'a, R> {
    ManifestScan {
        runtime,
        root: root.to_path_buf(),
        options,
        dirs: vec![root.to_path_buf()],
        files: VecDeque::new(),
    }
}

pub struct ManifestScan<'a, R: Runtime> {
    runtime: &'a R,
    root: PathBuf,
    options: &'a ScanOptions,
    dirs: Vec<PathBuf>,
    files: VecDeque<PathBuf>,
}

impl<R: Runtime> Clone for ManifestScan<'_, R> {
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime,
            root: self.root.clone(),
            options: self.options,
            dirs: self.dirs.clone(),
            files: self.files.clone(),
        }
    }
}

impl<R: Runtime> ManifestScan<'_, R> {
    fn is_manifest(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(&self.options.extension))
    }

    fn visit(&mut self, dir: &Path) -> UpdateResult<()> {
        let entries = self
            .runtime
            .read_dir(dir)
            .map_err(|e| UpdateError::io(dir, e))?;

        let mut subdirs = Vec::new();
        for entry in entries {
            if self.runtime.is_dir(&entry) {
                if self.runtime.is_symlink(&entry) {
                    debug!("Not following symlinked directory {:?}", entry);
                } else if has_excluded_segment(&self.root, &entry, &self.options.excluded) {
                    debug!("Skipping excluded directory {:?}", entry);
                } else {
                    subdirs.push(entry);
                }
            } else if self.is_manifest(&entry) {
                self.files.push_back(entry);
            }
        }

        // Stack: push in reverse so the first subdirectory is visited first
        self.dirs.extend(subdirs.into_iter().rev());
        Ok(())
    }
}

impl<R: Runtime> Iterator for ManifestScan<'_, R> {
    type Item = UpdateResult<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(file) = self.files.pop_front() {
                return Some(Ok(file));
            }
            let dir = self.dirs.pop()?;
            if let Err(e) = self.visit(&dir) {
                // A failed directory ends the scan
                self.dirs.clear();
                return Some(Err(e));
            }
        }
    }
}

/// Collect every manifest path under `root`.
#[tracing::instrument(skip(runtime, options))]
pub fn find_all_manifests<R: Runtime>(
    runtime: &R,
    root: &Path,
    options: &ScanOptions,
) -> UpdateResult<Vec<PathBuf>> {
    scan(runtime, root, options).collect()
}
