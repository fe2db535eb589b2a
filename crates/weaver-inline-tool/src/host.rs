//! Host capability traits for structured editing.
//!
//! These traits define the interface between the toggle algorithm and the
//! document it edits (browser DOM, the in-memory [`Document`](crate::dom::Document),
//! native UI trees). The algorithm only ever talks to the document through
//! [`EditableDom`], so the same wrap/unwrap logic runs unchanged on every host.

use std::fmt;

use smol_str::SmolStr;
use thiserror::Error;

use crate::tag::MarkupTag;

/// Failure reported by a host document operation.
///
/// Variants mirror the DOM exception names a browser raises for the same
/// conditions, so adapters can map native errors one-to-one.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum HostError {
    /// An offset or index lies outside the node it refers to.
    #[error("index out of range: {0}")]
    IndexSize(String),

    /// The operation would produce an invalid tree shape.
    #[error("hierarchy request rejected: {0}")]
    HierarchyRequest(String),

    /// A node or range is not where the operation expected it to be.
    #[error("not found: {0}")]
    NotFound(String),

    /// A name contains characters the host does not accept.
    #[error("invalid character: {0}")]
    InvalidCharacter(String),

    /// The handle is no longer usable (detached range, dead node).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Anything else the host reports.
    #[error("host error: {0}")]
    Other(String),
}

impl From<&str> for HostError {
    fn from(s: &str) -> Self {
        HostError::Other(s.to_string())
    }
}

impl From<String> for HostError {
    fn from(s: String) -> Self {
        HostError::Other(s)
    }
}

/// Structured-editing primitives the toggle algorithm needs from its host.
///
/// Splits into two capabilities:
///
/// - *selection queries*: walking parents, reading tags, inspecting range
///   boundaries and producing a range that encloses an element
/// - *document mutation*: creating elements, extracting and inserting range
///   content, detaching nodes
///
/// Ranges are expected to be *live*: the host keeps their boundaries valid as
/// the tree is mutated, the way DOM ranges behave.
pub trait EditableDom {
    /// Handle to a node in the document.
    type Node: Clone + PartialEq + fmt::Debug;
    /// Handle to a live range.
    type Range: Clone + fmt::Debug;
    /// Detached content produced by extraction.
    type Fragment;

    // === Selection queries ===

    /// The parent of a node, if it has one.
    fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name when the node is an element, `None` otherwise.
    fn tag_name(&self, node: &Self::Node) -> Option<SmolStr>;

    /// Container node of the range's start boundary.
    fn range_start(&self, range: &Self::Range) -> Result<Self::Node, HostError>;

    /// Container node of the range's end boundary.
    fn range_end(&self, range: &Self::Range) -> Result<Self::Node, HostError>;

    /// Whether the range is empty.
    fn is_collapsed(&self, range: &Self::Range) -> Result<bool, HostError>;

    /// Create a new range spanning exactly the contents of `node`.
    fn range_enclosing(&mut self, node: &Self::Node) -> Result<Self::Range, HostError>;

    /// Signal that a range handle is no longer referenced by the caller.
    ///
    /// Hosts with garbage-collected ranges can ignore this.
    fn release_range(&mut self, _range: &Self::Range) {}

    // === Document mutation ===

    /// Create a detached element with the given tag.
    fn create_element(&mut self, tag: &MarkupTag) -> Result<Self::Node, HostError>;

    /// Remove the range's content from the document and return it.
    ///
    /// Afterwards the range is collapsed at the extraction point.
    fn extract_contents(&mut self, range: &Self::Range) -> Result<Self::Fragment, HostError>;

    /// Move all of a fragment's nodes to the end of `parent`.
    fn append_fragment(
        &mut self,
        parent: &Self::Node,
        fragment: Self::Fragment,
    ) -> Result<(), HostError>;

    /// Insert a node at the start of the range.
    ///
    /// A collapsed range grows to enclose the inserted node.
    fn insert_node(&mut self, range: &Self::Range, node: &Self::Node) -> Result<(), HostError>;

    /// Insert a fragment's nodes at the start of the range.
    ///
    /// A collapsed range grows to enclose the inserted nodes.
    fn insert_fragment(
        &mut self,
        range: &Self::Range,
        fragment: Self::Fragment,
    ) -> Result<(), HostError>;

    /// Detach a node from its parent.
    fn remove_node(&mut self, node: &Self::Node) -> Result<(), HostError>;
}
