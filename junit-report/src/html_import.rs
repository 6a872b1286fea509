//! HTML import
//!
//! Parses existing HTML reports with `scraper` and copies the parsed tree
//! into a [`Document`], so reports produced elsewhere can be decorated the
//! same way as generated ones. Pages that are not reports come back out of
//! [`Document::to_html`] as they went in, apart from the normalization the
//! HTML5 parser itself applies.

use crate::dom::{Document, NodeId};
use crate::types::Result;
use scraper::node::Element;
use scraper::{Html, Node};
use std::path::Path;

/// Parse an HTML document into a [`Document`]
///
/// Parsing follows the HTML5 algorithm and never fails: missing `html`,
/// `head`, `body` and `tbody` elements are inserted the way browsers do.
pub fn parse_html(html: &str) -> Document {
    let parsed = Html::parse_document(html);
    if !parsed.errors.is_empty() {
        log::debug!("HTML parser recovered from {} errors", parsed.errors.len());
    }

    let mut doc = Document::new();
    let mut stack = vec![(parsed.tree.root(), doc.root())];

    while let Some((source, parent)) = stack.pop() {
        let target = match source.value() {
            Node::Document | Node::Fragment => parent,
            Node::Doctype(doctype) => {
                let id =
                    doc.create_doctype(doctype.name(), doctype.public_id(), doctype.system_id());
                doc.append_child(parent, id);
                continue;
            }
            Node::Comment(comment) => {
                let id = doc.create_comment(comment);
                doc.append_child(parent, id);
                continue;
            }
            Node::Text(text) => {
                doc.append_text(parent, text);
                continue;
            }
            Node::Element(element) => {
                let id = doc.append_element(parent, element.name());
                copy_attributes(&mut doc, id, element);
                id
            }
            Node::ProcessingInstruction(_) => continue,
        };

        // Reversed so that children are appended in document order
        let children: Vec<_> = source.children().collect();
        stack.extend(children.into_iter().rev().map(|child| (child, target)));
    }

    doc
}

/// Copy attributes in source order, keeping prefixes such as `xlink:`
fn copy_attributes(doc: &mut Document, id: NodeId, element: &Element) {
    for (name, value) in element.attrs.iter() {
        match &name.prefix {
            Some(prefix) => doc.set_attr(id, &format!("{}:{}", prefix, name.local), value),
            None => doc.set_attr(id, &name.local, value),
        }
    }
}

/// Read and parse an HTML file
pub fn read_html_file(path: &Path) -> Result<Document> {
    log::info!("Reading HTML report: {:?}", path);
    let html = std::fs::read_to_string(path)?;
    Ok(parse_html(&html))
}

/// Returns the ids of every element named `name`, in document order
pub fn elements_named(doc: &Document, name: &str) -> Vec<NodeId> {
    doc.descendants(doc.root())
        .into_iter()
        .filter(|&n| doc.element_name(n) == Some(name))
        .collect()
}
