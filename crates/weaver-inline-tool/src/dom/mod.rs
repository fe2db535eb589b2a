//! In-memory document tree with DOM range semantics.
//!
//! [`Document`] is an arena of nodes addressed by [`NodeId`]. It implements
//! [`EditableDom`](crate::host::EditableDom) so the toggle algorithm can run
//! natively (tests, server-side transforms) with the same behavior it has
//! against a browser DOM:
//!
//! - ranges are *live* and are moved by every mutation exactly like DOM ranges
//! - `extract_range` clones partially contained ancestors and splits text
//! - `insert_into_range` splits a text container and grows collapsed ranges
//!
//! Text offsets are character offsets (NOT byte offsets, NOT UTF-16 units).
//!
//! Invariants:
//! - node 0 is the document node and never has a parent
//! - every child listed under a parent has that parent as its `parent`
//! - detached nodes stay allocated; node ids are never reused
//! - range slots are reused after `detach_range`, so tracking cost follows
//!   the number of live ranges, not the number ever created

mod editable;
mod markup;
mod range;

use std::fmt;

use smol_str::SmolStr;

use crate::host::HostError;

pub use markup::ParseError;
pub use range::{BoundaryPoint, RangeId};

/// Handle to a node in a [`Document`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What a node is, along with its payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// The document node. Accepts any kind of child.
    Document,
    /// A detached container whose children move as a unit on insertion.
    Fragment,
    /// An element with a lowercase name and attributes in source order.
    Element {
        name: SmolStr,
        attributes: Vec<(SmolStr, String)>,
    },
    Text(String),
    Comment(String),
}

impl NodeKind {
    /// Text and comments carry character data and have no children.
    pub fn is_character_data(&self) -> bool {
        matches!(self, NodeKind::Text(_) | NodeKind::Comment(_))
    }

    fn can_have_children(&self) -> bool {
        matches!(
            self,
            NodeKind::Document | NodeKind::Fragment | NodeKind::Element { .. }
        )
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
#[derive(Clone, Debug)]
pub struct Document {
    nodes: Vec<NodeData>,
    ranges: Vec<range::RangeSlot>,
    free_ranges: Vec<u32>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
            }],
            ranges: Vec::new(),
            free_ranges: Vec::new(),
        }
    }

    /// The document node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    fn data(&self, id: NodeId) -> Result<&NodeData, HostError> {
        self.nodes
            .get(id.index())
            .ok_or_else(|| HostError::NotFound(format!("node {id} does not exist")))
    }

    fn data_mut(&mut self, id: NodeId) -> Result<&mut NodeData, HostError> {
        self.nodes
            .get_mut(id.index())
            .ok_or_else(|| HostError::NotFound(format!("node {id} does not exist")))
    }

    // === Queries ===

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    /// Children in order. Empty for unknown ids and character data.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element name, if the node is an element.
    pub fn element_name(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    /// Value of an attribute on an element.
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Character data of a text or comment node.
    pub fn data_of(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(data) | NodeKind::Comment(data) => Some(data.as_str()),
            _ => None,
        }
    }

    /// DOM node length: characters for character data, child count otherwise.
    pub fn node_length(&self, id: NodeId) -> usize {
        match self.kind(id) {
            Some(NodeKind::Text(data)) | Some(NodeKind::Comment(data)) => data.chars().count(),
            Some(_) => self.children(id).len(),
            None => 0,
        }
    }

    /// Position of a node among its parent's children.
    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&c| c == id)
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_of(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Whether `ancestor` is `node` or one of its ancestors.
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == ancestor {
                return true;
            }
            current = self.parent(n);
        }
        false
    }

    /// Topmost ancestor of a node (the node itself if detached).
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Descendants of a node in tree order, excluding the node itself.
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        let mut stack: Vec<NodeId> = self.children(id).to_vec();
        stack.reverse();
        Descendants { doc: self, stack }
    }

    /// Concatenated data of all descendant text nodes.
    pub fn text_content(&self, id: NodeId) -> String {
        if let Some(NodeKind::Text(data)) | Some(NodeKind::Comment(data)) = self.kind(id) {
            return data.clone();
        }
        let mut out = String::new();
        for node in self.descendants(id) {
            if let Some(NodeKind::Text(data)) = self.kind(node) {
                out.push_str(data);
            }
        }
        out
    }

    /// Connected elements with the given name, in tree order.
    pub fn elements_named(&self, name: &str) -> Vec<NodeId> {
        self.descendants(self.root())
            .filter(|&n| {
                self.element_name(n)
                    .is_some_and(|el| el.eq_ignore_ascii_case(name))
            })
            .collect()
    }

    // === Construction ===

    fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Create a detached element. The name is stored lowercased.
    pub fn create_element(&mut self, name: &str) -> Result<NodeId, HostError> {
        self.create_element_with_attributes(name, Vec::new())
    }

    pub fn create_element_with_attributes(
        &mut self,
        name: &str,
        attributes: Vec<(SmolStr, String)>,
    ) -> Result<NodeId, HostError> {
        if let Some(reason) = crate::tag::invalid_reason(name) {
            return Err(HostError::InvalidCharacter(format!("{name:?}: {reason}")));
        }
        Ok(self.alloc(NodeKind::Element {
            name: SmolStr::new(name.to_ascii_lowercase()),
            attributes,
        }))
    }

    pub fn create_text(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Text(data.into()))
    }

    pub fn create_comment(&mut self, data: impl Into<String>) -> NodeId {
        self.alloc(NodeKind::Comment(data.into()))
    }

    pub fn create_fragment(&mut self) -> NodeId {
        self.alloc(NodeKind::Fragment)
    }

    /// Shallow copy of a node: same kind and payload, no children, detached.
    pub fn clone_node(&mut self, id: NodeId) -> Result<NodeId, HostError> {
        let kind = self.data(id)?.kind.clone();
        if kind == NodeKind::Document {
            return Err(HostError::HierarchyRequest(
                "the document node cannot be cloned".into(),
            ));
        }
        Ok(self.alloc(kind))
    }

    /// Copy of a character data node carrying different data.
    fn clone_with_data(&mut self, id: NodeId, data: String) -> Result<NodeId, HostError> {
        match self.data(id)?.kind {
            NodeKind::Text(_) => Ok(self.alloc(NodeKind::Text(data))),
            NodeKind::Comment(_) => Ok(self.alloc(NodeKind::Comment(data))),
            _ => Err(HostError::InvalidState(format!(
                "node {id} does not carry character data"
            ))),
        }
    }

    // === Mutation ===

    /// Append a node (or a fragment's children) to `parent`.
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> Result<(), HostError> {
        self.insert_before(parent, node, None)
    }

    /// Insert a node (or a fragment's children) before `child`, or at the end
    /// when `child` is `None`.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), HostError> {
        self.ensure_pre_insertion_validity(parent, node, child)?;
        let mut reference = child;
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }
        self.insert_unchecked(parent, node, reference)
    }

    fn ensure_pre_insertion_validity(
        &self,
        parent: NodeId,
        node: NodeId,
        child: Option<NodeId>,
    ) -> Result<(), HostError> {
        if !self.data(parent)?.kind.can_have_children() {
            return Err(HostError::HierarchyRequest(format!(
                "node {parent} cannot have children"
            )));
        }
        if self.data(node)?.kind == NodeKind::Document {
            return Err(HostError::HierarchyRequest(
                "the document node cannot be inserted".into(),
            ));
        }
        if self.is_inclusive_ancestor(node, parent) {
            return Err(HostError::HierarchyRequest(format!(
                "node {node} is an inclusive ancestor of {parent}"
            )));
        }
        if let Some(child) = child {
            if self.parent(child) != Some(parent) {
                return Err(HostError::NotFound(format!(
                    "node {child} is not a child of {parent}"
                )));
            }
        }
        Ok(())
    }

    /// Insert without validity checks. Fragments are emptied into `parent`.
    fn insert_unchecked(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> Result<(), HostError> {
        let nodes: Vec<NodeId> = if self.data(node)?.kind == NodeKind::Fragment {
            self.children(node).to_vec()
        } else {
            vec![node]
        };
        if nodes.is_empty() {
            return Ok(());
        }
        for &n in &nodes {
            if self.parent(n).is_some() {
                self.remove(n)?;
            }
        }

        let count = nodes.len();
        let index = match reference {
            Some(r) => self
                .index_of(r)
                .ok_or_else(|| HostError::NotFound(format!("reference node {r} is detached")))?,
            None => self.children(parent).len(),
        };
        if reference.is_some() {
            self.update_boundaries(|_, bp| {
                if bp.node == parent && bp.offset > index {
                    bp.offset += count;
                }
            });
        }

        for &n in &nodes {
            self.data_mut(n)?.parent = Some(parent);
        }
        let children = &mut self.data_mut(parent)?.children;
        for (i, n) in nodes.into_iter().enumerate() {
            children.insert(index + i, n);
        }
        Ok(())
    }

    /// Detach a node from its parent.
    ///
    /// Range boundaries inside the removed subtree move to where the node was.
    pub fn remove(&mut self, node: NodeId) -> Result<(), HostError> {
        let parent = self
            .parent(node)
            .ok_or_else(|| HostError::NotFound(format!("node {node} has no parent")))?;
        let index = self
            .index_of(node)
            .ok_or_else(|| HostError::NotFound(format!("node {node} missing from {parent}")))?;

        self.update_boundaries(|doc, bp| {
            if doc.is_inclusive_ancestor(node, bp.node) {
                *bp = BoundaryPoint::new(parent, index);
            } else if bp.node == parent && bp.offset > index {
                bp.offset -= 1;
            }
        });

        self.data_mut(parent)?.children.remove(index);
        self.data_mut(node)?.parent = None;
        Ok(())
    }

    /// Split a text node at `offset`, returning the new node holding the tail.
    pub fn split_text(&mut self, node: NodeId, offset: usize) -> Result<NodeId, HostError> {
        let data = match &self.data(node)?.kind {
            NodeKind::Text(data) => data.clone(),
            _ => {
                return Err(HostError::InvalidState(format!(
                    "node {node} is not a text node"
                )));
            }
        };
        let length = data.chars().count();
        if offset > length {
            return Err(HostError::IndexSize(format!(
                "offset {offset} exceeds text length {length}"
            )));
        }

        let tail = char_slice(&data, offset, length).to_string();
        let new_node = self.create_text(tail);

        if let Some(parent) = self.parent(node) {
            let index = self
                .index_of(node)
                .ok_or_else(|| HostError::NotFound(format!("node {node} missing from {parent}")))?;
            let next = self.next_sibling(node);
            self.insert_unchecked(parent, new_node, next)?;

            self.update_boundaries(|_, bp| {
                if bp.node == node && bp.offset > offset {
                    *bp = BoundaryPoint::new(new_node, bp.offset - offset);
                }
            });
            self.update_boundaries(|_, bp| {
                if bp.node == parent && bp.offset == index + 1 {
                    bp.offset += 1;
                }
            });
        }

        self.replace_data(node, offset, length - offset, "")?;
        Ok(new_node)
    }

    /// Replace `count` characters at `offset` in a text or comment node.
    pub fn replace_data(
        &mut self,
        node: NodeId,
        offset: usize,
        count: usize,
        data: &str,
    ) -> Result<(), HostError> {
        let current = match &self.data(node)?.kind {
            NodeKind::Text(d) | NodeKind::Comment(d) => d.clone(),
            _ => {
                return Err(HostError::InvalidState(format!(
                    "node {node} does not carry character data"
                )));
            }
        };
        let length = current.chars().count();
        if offset > length {
            return Err(HostError::IndexSize(format!(
                "offset {offset} exceeds data length {length}"
            )));
        }
        let count = count.min(length - offset);
        let inserted = data.chars().count();

        let mut replaced = String::with_capacity(current.len() + data.len());
        replaced.push_str(char_slice(&current, 0, offset));
        replaced.push_str(data);
        replaced.push_str(char_slice(&current, offset + count, length));

        if let NodeKind::Text(d) | NodeKind::Comment(d) = &mut self.data_mut(node)?.kind {
            *d = replaced;
        }

        self.update_boundaries(|_, bp| {
            if bp.node != node {
                return;
            }
            if bp.offset > offset && bp.offset <= offset + count {
                bp.offset = offset;
            } else if bp.offset > offset + count {
                bp.offset = bp.offset + inserted - count;
            }
        });
        Ok(())
    }

    // === Text lookup ===

    /// Position of the first occurrence of `needle` inside a single connected
    /// text node, in tree order.
    pub fn find_text(&self, needle: &str) -> Option<BoundaryPoint> {
        self.descendants(self.root()).find_map(|node| {
            let NodeKind::Text(data) = self.kind(node)? else {
                return None;
            };
            let byte = data.find(needle)?;
            Some(BoundaryPoint::new(node, data[..byte].chars().count()))
        })
    }

    /// Create a live range over the first occurrence of `needle`.
    pub fn select_text(&mut self, needle: &str) -> Result<RangeId, HostError> {
        let start = self
            .find_text(needle)
            .ok_or_else(|| HostError::NotFound(format!("text {needle:?} not in document")))?;
        let end = BoundaryPoint::new(start.node, start.offset + needle.chars().count());
        self.create_range(start, end)
    }
}

/// Tree-order iterator over a node's descendants.
pub struct Descendants<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack
            .extend(self.doc.children(node).iter().rev().copied());
        Some(node)
    }
}

/// Slice a string by character positions, clamping to its length.
fn char_slice(s: &str, start: usize, end: usize) -> &str {
    let byte_at = |pos: usize| {
        s.char_indices()
            .nth(pos)
            .map(|(b, _)| b)
            .unwrap_or(s.len())
    };
    let start_byte = byte_at(start);
    let end_byte = byte_at(end).max(start_byte);
    &s[start_byte..end_byte]
}
