//! Nuspec manifests: reading package declarations and rewriting dependency ranges.
//!
//! - `reader` - parse a manifest into a [`Package`](crate::package::Package)
//! - `document` - lossless element index used for in-place edits
//! - `writer` - apply planned edits to a manifest file

pub mod document;
mod reader;
mod writer;

pub use document::{ElementNode, ManifestDocument, NodeId};
pub use reader::{ManifestContents, parse_manifest, read_manifest};
pub use writer::{Rewrite, apply_edits, rewrite_manifest};

pub(crate) const ID_PATH: &[&str] = &["package", "metadata", "id"];
pub(crate) const DEPENDENCY_PATH: &[&str] = &["package", "metadata", "dependencies", "dependency"];
pub(crate) const GROUPED_DEPENDENCY_PATH: &[&str] =
    &["package", "metadata", "dependencies", "group", "dependency"];
