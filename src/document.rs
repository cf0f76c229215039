//! Navigation helpers over the `roxmltree` parse tree.

use std::path::Path;

use roxmltree::{Document, Node};

use crate::error::{Result, StreamsError};

pub const STREAM_TAG: &str = "stream";
pub const IMMUTABLE_STREAM_TAG: &str = "immutable_stream";

/// Parse a streams document, attributing failures to `file`.
pub fn parse_document<'input>(text: &'input str, file: &Path) -> Result<Document<'input>> {
    Document::parse(text).map_err(|e| StreamsError::XmlParse {
        file: file.to_path_buf(),
        line: e.pos().row as usize,
        details: e.to_string(),
    })
}

/// `<stream>` or `<immutable_stream>` element
pub fn is_stream_element(node: &Node<'_, '_>) -> bool {
    node.is_element() && (node.has_tag_name(STREAM_TAG) || node.has_tag_name(IMMUTABLE_STREAM_TAG))
}

pub fn is_immutable(stream: &Node<'_, '_>) -> bool {
    stream.has_tag_name(IMMUTABLE_STREAM_TAG)
}

/// Stream elements directly under `root`, in document order
pub fn stream_elements<'a, 'input: 'a>(
    root: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    root.children().filter(is_stream_element)
}

/// First child element named `tag`
pub fn child<'a, 'input: 'a>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|c| c.is_element() && c.has_tag_name(tag))
}

/// All child elements named `tag`
pub fn children<'a, 'input: 'a>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |c| c.is_element() && c.has_tag_name(tag))
}

/// Stream element whose `name` attribute equals `name` exactly
pub fn find_stream<'a, 'input: 'a>(root: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    stream_elements(root).find(|s| s.attribute("name") == Some(name))
}

/// 1-based line on which `node` starts
pub fn line_of(node: &Node<'_, '_>) -> u32 {
    node.document().text_pos_at(node.range().start).row
}
