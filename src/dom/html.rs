//! HTML import and export.
//!
//! Import goes through `scraper`'s html5ever parser so real-world pages
//! (missing end tags, implied `<head>`/`<body>`) produce the same tree a
//! browser would. Export writes the document back out with the localized
//! strings in place.

use ego_tree::NodeRef;
use scraper::{Html, Node};

use crate::dom::{Child, Document, ElementId};
use crate::util::{escape_attr, escape_text};

/// Elements that never have children or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text is written without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

impl Document {
    /// What: Parse an HTML page into a document.
    ///
    /// Inputs:
    /// - `html`: Page source
    ///
    /// Output:
    /// - Document whose root mirrors the page's `<html>` element
    ///
    /// Details:
    /// - Comments, doctypes and processing instructions are dropped.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut doc = Self::new();
        let root = doc.root();
        for node in parsed.tree.root().children() {
            if let Node::Element(element) = node.value()
                && element.name() == "html"
            {
                for (name, value) in element.attrs() {
                    doc.set_attr(root, name, value);
                }
                for child in node.children() {
                    import_node(&mut doc, root, child);
                }
            }
        }
        doc
    }

    /// Serialize the document as an HTML page.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>\n");
        self.write_element(self.root(), &mut out);
        out.push('\n');
        out
    }

    /// Serialize one element and its subtree.
    fn write_element(&self, id: ElementId, out: &mut String) {
        let tag = self.tag(id);
        out.push('<');
        out.push_str(tag);
        for (name, value) in self.attrs(id) {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attr(value));
            out.push('"');
        }
        out.push('>');
        if VOID_ELEMENTS.contains(&tag) {
            return;
        }
        let raw = RAW_TEXT_ELEMENTS.contains(&tag);
        for child in self.children(id) {
            match child {
                Child::Text(text) if raw => out.push_str(text),
                Child::Text(text) => out.push_str(&escape_text(text)),
                Child::Element(child) => self.write_element(*child, out),
            }
        }
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

/// Copy one parsed node (and its subtree) under `parent`.
fn import_node(doc: &mut Document, parent: ElementId, node: NodeRef<'_, Node>) {
    match node.value() {
        Node::Element(element) => {
            let id = doc.create_element(element.name());
            for (name, value) in element.attrs() {
                doc.set_attr(id, name, value);
            }
            doc.append_child(parent, id);
            for child in node.children() {
                import_node(doc, id, child);
            }
        }
        Node::Text(text) => doc.append_text(parent, text.as_ref()),
        _ => {}
    }
}
