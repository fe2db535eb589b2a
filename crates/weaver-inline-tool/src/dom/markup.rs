//! Markup parsing and serialization for [`Document`].
//!
//! Parsing runs the input through html5ever as the contents of `<body>` and
//! copies the resulting tree into the arena, so character references and
//! malformed markup are handled the way a browser handles them. Serialization
//! escapes text and attribute values with the same escaper the renderer uses.

use std::fmt;

use html5ever::tendril::TendrilSink;
use html5ever::{ParseOpts, parse_document};
use markdown_weaver_escape::{FmtWriter, escape_html, escape_html_body_text};
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use smol_str::SmolStr;
use thiserror::Error;

use super::{Document, NodeId, NodeKind};

/// Errors from [`Document::parse`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParseError {
    #[error("invalid tag name {0:?}")]
    InvalidName(String),

    #[error("parsed markup has no body element")]
    MissingBody,
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

impl Document {
    /// Parse markup into a new document; top-level nodes become children of
    /// the document node.
    pub fn parse(markup: &str) -> Result<Self, ParseError> {
        let mut doc = Document::new();
        let root = doc.root();
        doc.parse_into(root, markup)?;
        Ok(doc)
    }

    /// Parse markup as body content and append the resulting nodes to `parent`.
    pub fn parse_into(&mut self, parent: NodeId, markup: &str) -> Result<(), ParseError> {
        // An explicit body start tag keeps leading comments and whitespace
        // inside the body instead of before it.
        let source = format!("<!DOCTYPE html><body>{markup}");
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(source);
        let body = child_element(&dom.document, "html")
            .and_then(|html| child_element(&html, "body"))
            .ok_or(ParseError::MissingBody)?;

        for child in body.children.borrow().iter() {
            self.import(parent, child)?;
        }
        Ok(())
    }

    /// Copy an rcdom subtree under `parent`.
    fn import(&mut self, parent: NodeId, handle: &Handle) -> Result<(), ParseError> {
        let node = match &handle.data {
            NodeData::Element { name, attrs, .. } => {
                let attributes = attrs
                    .borrow()
                    .iter()
                    .map(|attr| (SmolStr::new(&*attr.name.local), attr.value.to_string()))
                    .collect();
                let element = self
                    .create_element_with_attributes(&name.local, attributes)
                    .map_err(|_| ParseError::InvalidName(name.local.to_string()))?;
                for child in handle.children.borrow().iter() {
                    self.import(element, child)?;
                }
                element
            }
            NodeData::Text { contents } => self.create_text(contents.borrow().to_string()),
            NodeData::Comment { contents } => self.create_comment(contents.to_string()),
            _ => return Ok(()),
        };
        self.attach(parent, node);
        Ok(())
    }

    /// Append a freshly created node; parse targets are always containers.
    fn attach(&mut self, parent: NodeId, node: NodeId) {
        if let Err(err) = self.append_child(parent, node) {
            tracing::warn!(target: "weaver::inline_tool", %err, "dropping unparented node");
        }
    }

    // === Serialization ===

    /// Markup for everything under the document node.
    pub fn to_markup(&self) -> String {
        self.inner_markup(self.root())
    }

    /// Markup for a node's children.
    pub fn inner_markup(&self, node: NodeId) -> String {
        render(|out| self.write_children(node, out))
    }

    /// Markup for a node including itself.
    pub fn outer_markup(&self, node: NodeId) -> String {
        render(|out| self.write_node(node, out))
    }

    fn write_children(&self, node: NodeId, out: &mut String) -> fmt::Result {
        for &child in self.children(node) {
            self.write_node(child, out)?;
        }
        Ok(())
    }

    fn write_node(&self, node: NodeId, out: &mut String) -> fmt::Result {
        match self.kind(node) {
            Some(NodeKind::Element { name, attributes }) => {
                out.push('<');
                out.push_str(name);
                for (key, value) in attributes {
                    out.push(' ');
                    out.push_str(key);
                    out.push_str("=\"");
                    escape_html(FmtWriter(&mut *out), value)?;
                    out.push('"');
                }
                out.push('>');
                if is_void(name) {
                    return Ok(());
                }
                self.write_children(node, out)?;
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
            Some(NodeKind::Text(data)) => escape_html_body_text(FmtWriter(&mut *out), data)?,
            Some(NodeKind::Comment(data)) => {
                out.push_str("<!--");
                out.push_str(data);
                out.push_str("-->");
            }
            Some(NodeKind::Document) | Some(NodeKind::Fragment) => {
                self.write_children(node, out)?;
            }
            None => {}
        }
        Ok(())
    }
}

fn render(write: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // fmt::Write for String never fails.
    let _ = write(&mut out);
    out
}

fn child_element(node: &Handle, local: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| matches!(&child.data, NodeData::Element { name, .. } if &*name.local == local))
        .cloned()
}
