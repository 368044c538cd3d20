//! Lossless element index over an XML document.
//!
//! The text is parsed once with `roxmltree`, which checks well-formedness and
//! reports the byte span of every attribute value. Only elements are indexed:
//! their local-name path and those spans. Editing an attribute records a
//! replacement for its span, so rendering reproduces the original text exactly
//! apart from the replaced values. Comments, whitespace, line endings,
//! attribute order, quote style, a byte order mark, the XML declaration and
//! namespace prefixes are never touched.

use std::collections::BTreeMap;
use std::fmt;
use std::ops::Range;
use thiserror::Error;

const BOM: char = '\u{feff}';

#[derive(Error, Debug)]
#[error(transparent)]
pub struct MarkupError(#[from] roxmltree::Error);

/// Index of an element in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct Attribute {
    name: String,
    /// Unescaped value
    value: String,
    /// Span of the raw value between the quotes
    span: Range<usize>,
    quote: char,
}

/// An element start tag.
#[derive(Debug, Clone)]
pub struct ElementNode<'a> {
    doc: &'a ManifestDocument,
    index: usize,
}

#[derive(Debug, Clone)]
struct Element {
    /// Local names from the root element down to this one
    path: Vec<String>,
    attributes: Vec<Attribute>,
}

#[derive(Debug, Clone)]
pub struct ManifestDocument {
    text: String,
    elements: Vec<Element>,
    replacements: BTreeMap<usize, (Range<usize>, String)>,
}

impl ManifestDocument {
    pub fn parse(text: &str) -> Result<Self, MarkupError> {
        let (offset, body) = match text.strip_prefix(BOM) {
            Some(body) => (BOM.len_utf8(), body),
            None => (0, text),
        };
        let options = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..roxmltree::ParsingOptions::default()
        };
        let document = roxmltree::Document::parse_with_options(body, options)?;

        let elements = document
            .descendants()
            .filter(|node| node.is_element())
            .map(|node| Element {
                path: element_path(node),
                attributes: node
                    .attributes()
                    .filter(|attr| attr.namespace().is_none())
                    .map(|attr| {
                        let raw = attr.range_value();
                        let span = raw.start + offset..raw.end + offset;
                        Attribute {
                            name: attr.name().to_string(),
                            value: attr.value().to_string(),
                            quote: quote_before(text, span.start),
                            span,
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            text: text.to_string(),
            elements,
            replacements: BTreeMap::new(),
        })
    }

    pub(crate) fn node(&self, id: NodeId) -> ElementNode<'_> {
        ElementNode {
            doc: self,
            index: id.0,
        }
    }

    /// All elements matching `predicate`, in document order.
    pub fn find_nodes<F>(&self, predicate: F) -> Vec<NodeId>
    where
        F: Fn(&ElementNode<'_>) -> bool,
    {
        (0..self.elements.len())
            .filter(|&index| predicate(&ElementNode { doc: self, index }))
            .map(NodeId)
            .collect()
    }

    /// Replace the value of attribute `name` on `node`.
    ///
    /// Returns `false` if the element has no such attribute. The value is
    /// escaped for the attribute's existing quote character.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> bool {
        let Some(attr) = self.elements[node.0]
            .attributes
            .iter()
            .find(|a| a.name == name)
        else {
            return false;
        };
        let escaped = escape(value, attr.quote);
        self.replacements
            .insert(attr.span.start, (attr.span.clone(), escaped));
        true
    }
}

impl fmt::Display for ManifestDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cursor = 0;
        for (span, value) in self.replacements.values() {
            f.write_str(&self.text[cursor..span.start])?;
            f.write_str(value)?;
            cursor = span.end;
        }
        f.write_str(&self.text[cursor..])
    }
}

impl<'a> ElementNode<'a> {
    fn element(&self) -> &'a Element {
        &self.doc.elements[self.index]
    }

    pub fn id(&self) -> NodeId {
        NodeId(self.index)
    }

    /// Local names from the root element, e.g. `["package", "metadata", "id"]`.
    pub fn path(&self) -> &'a [String] {
        &self.element().path
    }

    pub fn path_is(&self, steps: &[&str]) -> bool {
        self.path().len() == steps.len() && self.path().iter().zip(steps).all(|(a, b)| a == b)
    }

    /// Unescaped value of an unprefixed attribute, as parsed.
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.element()
            .attributes
            .iter()
            .find(|a| a.name == name)
            .map(|a| a.value.as_str())
    }
}

fn element_path(node: roxmltree::Node<'_, '_>) -> Vec<String> {
    let mut path: Vec<String> = node
        .ancestors()
        .filter(|n| n.is_element())
        .map(|n| n.tag_name().name().to_string())
        .collect();
    path.reverse();
    path
}

/// The quote character opening the value that starts at `start`.
fn quote_before(text: &str, start: usize) -> char {
    match text.as_bytes().get(start.wrapping_sub(1)) {
        Some(b'\'') => '\'',
        _ => '"',
    }
}

fn escape(value: &str, quote: char) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '"' if quote == '"' => out.push_str("&quot;"),
            '\'' if quote == '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const NUSPEC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<!-- generated once, maintained by hand -->
<package xmlns="http://schemas.microsoft.com/packaging/2011/08/nuspec.xsd">
  <metadata>
    <id>Acme.App</id>
    <version>$version$</version>
    <description><![CDATA[Uses <dependency id="fake"/> in prose]]></description>
    <dependencies>
      <!-- <dependency id="Acme.Core" version="0.0.1" /> -->
      <dependency id="Acme.Core"   version="1.0.0" />
      <dependency version='[2.0,3.0)' id='Newtonsoft.Json'/>
    </dependencies>
  </metadata>
</package>
"#;

    fn dependency(doc: &ManifestDocument, id: &str) -> Vec<NodeId> {
        doc.find_nodes(|n| {
            n.path_is(&["package", "metadata", "dependencies", "dependency"])
                && n.attribute("id") == Some(id)
        })
    }

    #[test]
    fn test_index_skips_comments_and_cdata() {
        let doc = ManifestDocument::parse(NUSPEC).unwrap();
        let all = doc.find_nodes(|n| n.path().last().is_some_and(|l| l == "dependency"));
        assert_eq!(all.len(), 2);
        assert!(dependency(&doc, "fake").is_empty());
    }

    #[test]
    fn test_unmodified_document_renders_identically() {
        let doc = ManifestDocument::parse(NUSPEC).unwrap();
        assert_eq!(doc.to_string(), NUSPEC);
    }

    #[test]
    fn test_set_attribute_only_touches_value() {
        let mut doc = ManifestDocument::parse(NUSPEC).unwrap();
        let node = dependency(&doc, "Acme.Core")[0];
        assert!(doc.set_attribute(node, "version", "[1.2.0,2.0.0)"));

        let expected = NUSPEC.replace(
            r#"<dependency id="Acme.Core"   version="1.0.0" />"#,
            r#"<dependency id="Acme.Core"   version="[1.2.0,2.0.0)" />"#,
        );
        assert_eq!(doc.to_string(), expected);
    }

    #[test]
    fn test_set_attribute_keeps_single_quotes() {
        let mut doc = ManifestDocument::parse(NUSPEC).unwrap();
        let node = dependency(&doc, "Newtonsoft.Json")[0];
        assert!(doc.set_attribute(node, "version", "13.0.1"));
        assert!(doc.to_string().contains("<dependency version='13.0.1' id='Newtonsoft.Json'/>"));
    }

    #[test]
    fn test_set_attribute_missing_attribute() {
        let mut doc = ManifestDocument::parse(r#"<a><b id="x"/></a>"#).unwrap();
        let node = doc.find_nodes(|n| n.path_is(&["a", "b"]))[0];
        assert!(!doc.set_attribute(node, "version", "1.0.0"));
        assert_eq!(doc.to_string(), r#"<a><b id="x"/></a>"#);
    }

    #[test]
    fn test_setting_same_value_renders_identically() {
        let mut doc = ManifestDocument::parse(NUSPEC).unwrap();
        let node = dependency(&doc, "Acme.Core")[0];
        doc.set_attribute(node, "version", "1.0.0");
        assert_eq!(doc.to_string(), NUSPEC);
    }

    #[test]
    fn test_values_are_escaped_and_unescaped() {
        let mut doc = ManifestDocument::parse(r#"<a b="x &amp; &#65;&#x42; y"/>"#).unwrap();
        let node = doc.find_nodes(|n| n.path_is(&["a"]))[0];
        assert_eq!(doc.node(node).attribute("b"), Some("x & AB y"));

        doc.set_attribute(node, "b", r#"<"&">"#);
        assert_eq!(doc.to_string(), r#"<a b="&lt;&quot;&amp;&quot;>"/>"#);
    }

    #[test]
    fn test_byte_order_mark_and_crlf_survive_edits() {
        let text = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>\r\n\
                    <package>\r\n\
                    \x20 <metadata>\r\n\
                    \x20   <dependencies>\r\n\
                    \x20     <dependency id=\"Acme.Core\" version=\"1.0.0\" />\r\n\
                    \x20   </dependencies>\r\n\
                    \x20 </metadata>\r\n\
                    </package>\r\n";
        let mut doc = ManifestDocument::parse(text).unwrap();
        assert_eq!(doc.to_string(), text);

        let node = dependency(&doc, "Acme.Core")[0];
        assert_eq!(doc.node(node).attribute("version"), Some("1.0.0"));
        assert!(doc.set_attribute(node, "version", "[2.3.1,3.0.0)"));

        let rendered = doc.to_string();
        assert!(rendered.starts_with("\u{feff}<?xml"));
        assert_eq!(rendered.matches("\r\n").count(), text.matches("\r\n").count());
        assert!(!rendered.replace("\r\n", "").contains('\n'));
        assert_eq!(rendered, text.replace(r#"version="1.0.0""#, r#"version="[2.3.1,3.0.0)""#));
    }

    #[test]
    fn test_namespaced_attributes_are_not_matched_by_local_name() {
        let doc = ManifestDocument::parse(r#"<a xmlns:x="urn:x" x:id="no" id="yes"/>"#).unwrap();
        let node = doc.find_nodes(|n| n.path_is(&["a"]))[0];
        assert_eq!(doc.node(node).attribute("id"), Some("yes"));
    }

    #[test]
    fn test_prefixed_names_use_local_name() {
        let doc = ManifestDocument::parse(r#"<n:package xmlns:n="urn:x"><n:metadata/></n:package>"#)
            .unwrap();
        assert_eq!(doc.find_nodes(|n| n.path_is(&["package", "metadata"])).len(), 1);
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        let text = "<!DOCTYPE package [ <!ENTITY x \"a>b\"> ]>\n<package/>";
        let doc = ManifestDocument::parse(text).unwrap();
        assert_eq!(doc.find_nodes(|n| n.path_is(&["package"])).len(), 1);
    }

    #[test]
    fn test_malformed_markup_is_rejected() {
        for text in [
            "",
            "just text",
            "<package>",
            "<package></metadata>",
            "<a></a><b/>",
            "<a b=c/>",
            "<a b/>",
            "<a b=\"c/>",
            "<a b=\"1\" b=\"2\"/>",
            "<a b=\"&bogus;\"/>",
            "<!-- open",
            "</a>",
        ] {
            assert!(ManifestDocument::parse(text).is_err(), "{text:?} should not parse");
        }
    }
}
