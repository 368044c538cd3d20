//! Read-only XML queries over manifests and project files.
//!
//! Queries use `local-name()` steps so documents with a default namespace
//! (`<package xmlns="http://schemas.microsoft.com/packaging/...">`) match the
//! same paths as plain ones.

use std::path::Path;
use sxd_document::dom::Document;
use sxd_xpath::nodeset::Node;
use sxd_xpath::{Value, evaluate_xpath};

use crate::error::{UpdateError, UpdateResult};

/// Build a namespace-agnostic absolute path, e.g. `["package", "metadata"]`
/// becomes `/*[local-name()='package']/*[local-name()='metadata']`.
pub(crate) fn local_path(steps: &[&str]) -> String {
    steps
        .iter()
        .map(|step| format!("/*[local-name()='{}']", step))
        .collect()
}

pub(crate) fn parse(path: &Path, text: &str) -> UpdateResult<sxd_document::Package> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    sxd_document::parser::parse(text)
        .map_err(|e| UpdateError::malformed(path, format!("not well-formed XML: {}", e)))
}

/// Nodes selected by `xpath`, in document order.
pub(crate) fn select<'d>(
    path: &Path,
    document: &'d Document<'d>,
    xpath: &str,
) -> UpdateResult<Vec<Node<'d>>> {
    match evaluate_xpath(document, xpath) {
        Ok(Value::Nodeset(nodes)) => Ok(nodes.document_order()),
        Ok(_) => Ok(Vec::new()),
        Err(e) => Err(UpdateError::malformed(
            path,
            format!("query {} failed: {}", xpath, e),
        )),
    }
}

/// Trimmed text of the first node selected by `xpath`, if it is not empty.
pub(crate) fn first_text(
    path: &Path,
    document: &Document<'_>,
    xpath: &str,
) -> UpdateResult<Option<String>> {
    let text = select(path, document, xpath)?
        .first()
        .map(|node| node.string_value().trim().to_string());
    Ok(text.filter(|t| !t.is_empty()))
}

/// Value of attribute `name` on an element node.
pub(crate) fn attribute<'d>(node: &Node<'d>, name: &str) -> Option<&'d str> {
    match node {
        Node::Element(element) => element.attribute_value(name),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACED: &str = r#"<?xml version="1.0"?>
<package xmlns="http://schemas.microsoft.com/packaging/2011/08/nuspec.xsd">
  <metadata>
    <id> Acme.Core </id>
  </metadata>
</package>"#;

    #[test]
    fn test_local_path() {
        assert_eq!(
            local_path(&["package", "metadata"]),
            "/*[local-name()='package']/*[local-name()='metadata']"
        );
    }

    #[test]
    fn test_first_text_ignores_default_namespace() {
        let path = Path::new("Core.nuspec");
        let package = parse(path, NAMESPACED).unwrap();
        let document = package.as_document();
        let id = first_text(path, &document, &local_path(&["package", "metadata", "id"])).unwrap();
        assert_eq!(id.as_deref(), Some("Acme.Core"));
    }

    #[test]
    fn test_first_text_missing_node() {
        let path = Path::new("Core.nuspec");
        let package = parse(path, NAMESPACED).unwrap();
        let document = package.as_document();
        let text = first_text(path, &document, &local_path(&["package", "files"])).unwrap();
        assert_eq!(text, None);
    }

    #[test]
    fn test_select_and_attribute() {
        let path = Path::new("a.xml");
        let package = parse(path, r#"<a><b id="1"/><b id="2"/><b/></a>"#).unwrap();
        let document = package.as_document();
        let nodes = select(path, &document, &local_path(&["a", "b"])).unwrap();
        let ids: Vec<_> = nodes.iter().map(|n| attribute(n, "id")).collect();
        assert_eq!(ids, [Some("1"), Some("2"), None]);
    }

    #[test]
    fn test_parse_skips_byte_order_mark() {
        let path = Path::new("Core.nuspec");
        let text = format!("\u{feff}{}", NAMESPACED);
        let package = parse(path, &text).unwrap();
        let document = package.as_document();
        let id = first_text(path, &document, &local_path(&["package", "metadata", "id"])).unwrap();
        assert_eq!(id.as_deref(), Some("Acme.Core"));
    }

    #[test]
    fn test_parse_rejects_malformed_xml() {
        let err = parse(Path::new("bad.nuspec"), "<package><metadata></package>").unwrap_err();
        assert!(err.to_string().starts_with("bad.nuspec: malformed manifest"));
    }
}
