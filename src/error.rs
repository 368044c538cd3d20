//! Errors raised while scanning and updating manifests.
//!
//! Every variant is fatal to the run: they describe repository data that has
//! to be fixed by hand, so nothing is retried or skipped.

use std::path::PathBuf;
use thiserror::Error;

use crate::version::VersionError;

#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("{}: invalid version in {context}: {source}", path.display())]
    Parse {
        path: PathBuf,
        context: String,
        #[source]
        source: VersionError,
    },

    #[error("{}: malformed manifest: {reason}", path.display())]
    MalformedManifest { path: PathBuf, reason: String },

    #[error("unable to determine the current version of {}: {reason}", dir.display())]
    VersionUnavailable { dir: PathBuf, reason: String },

    #[error(
        "package id '{id}' is declared by both {} and {}",
        first.display(),
        second.display()
    )]
    DuplicatePackageId {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{}: no dependency node with id '{id}'", path.display())]
    DependencyNodeMissing { path: PathBuf, id: String },

    #[error("{}: {source:#}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

/// Category of an [`UpdateError`], for callers that only care about the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Parse,
    MalformedManifest,
    VersionUnavailable,
    DuplicatePackageId,
    DependencyNodeMissing,
    Io,
}

impl UpdateError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            UpdateError::Parse { .. } => ErrorKind::Parse,
            UpdateError::MalformedManifest { .. } => ErrorKind::MalformedManifest,
            UpdateError::VersionUnavailable { .. } => ErrorKind::VersionUnavailable,
            UpdateError::DuplicatePackageId { .. } => ErrorKind::DuplicatePackageId,
            UpdateError::DependencyNodeMissing { .. } => ErrorKind::DependencyNodeMissing,
            UpdateError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: anyhow::Error) -> Self {
        UpdateError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        UpdateError::MalformedManifest {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

pub type UpdateResult<T> = Result<T, UpdateError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offending_file() {
        let err = UpdateError::DependencyNodeMissing {
            path: PathBuf::from("src/Core/Core.nuspec"),
            id: "Acme.Util".into(),
        };
        assert_eq!(
            err.to_string(),
            "src/Core/Core.nuspec: no dependency node with id 'Acme.Util'"
        );
        assert_eq!(err.kind(), ErrorKind::DependencyNodeMissing);
    }

    #[test]
    fn test_parse_error_keeps_source() {
        let err = UpdateError::Parse {
            path: PathBuf::from("a.nuspec"),
            context: "dependency 'B'".into(),
            source: VersionError::InvalidRange {
                input: "[1.0.0,".into(),
            },
        };
        assert_eq!(
            err.to_string(),
            "a.nuspec: invalid version in dependency 'B': invalid version range: '[1.0.0,'"
        );
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_io_error_includes_context_chain() {
        let source = anyhow::anyhow!("permission denied").context("Failed to write to file");
        let err = UpdateError::io("x.nuspec", source);
        assert_eq!(
            err.to_string(),
            "x.nuspec: Failed to write to file: permission denied"
        );
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
