//! [`EditableDom`] implementation for the in-memory [`Document`].

use smol_str::SmolStr;

use super::{BoundaryPoint, Document, NodeId, RangeId};
use crate::host::{EditableDom, HostError};
use crate::tag::MarkupTag;

impl EditableDom for Document {
    type Node = NodeId;
    type Range = RangeId;
    type Fragment = NodeId;

    fn parent_node(&self, node: &NodeId) -> Option<NodeId> {
        self.parent(*node)
    }

    fn tag_name(&self, node: &NodeId) -> Option<SmolStr> {
        self.element_name(*node).map(SmolStr::new)
    }

    fn range_start(&self, range: &RangeId) -> Result<NodeId, HostError> {
        Ok(self.range_bounds(*range)?.0.node)
    }

    fn range_end(&self, range: &RangeId) -> Result<NodeId, HostError> {
        Ok(self.range_bounds(*range)?.1.node)
    }

    fn is_collapsed(&self, range: &RangeId) -> Result<bool, HostError> {
        self.range_collapsed(*range)
    }

    fn range_enclosing(&mut self, node: &NodeId) -> Result<RangeId, HostError> {
        let range = self.collapsed_range(BoundaryPoint::new(*node, 0))?;
        self.select_node_contents(range, *node)?;
        Ok(range)
    }

    fn release_range(&mut self, range: &RangeId) {
        self.detach_range(*range);
    }

    fn create_element(&mut self, tag: &MarkupTag) -> Result<NodeId, HostError> {
        Document::create_element(self, tag.as_str())
    }

    fn extract_contents(&mut self, range: &RangeId) -> Result<NodeId, HostError> {
        self.extract_range(*range)
    }

    fn append_fragment(&mut self, parent: &NodeId, fragment: NodeId) -> Result<(), HostError> {
        self.append_child(*parent, fragment)
    }

    fn insert_node(&mut self, range: &RangeId, node: &NodeId) -> Result<(), HostError> {
        self.insert_into_range(*range, *node)
    }

    fn insert_fragment(&mut self, range: &RangeId, fragment: NodeId) -> Result<(), HostError> {
        self.insert_into_range(*range, fragment)
    }

    fn remove_node(&mut self, node: &NodeId) -> Result<(), HostError> {
        self.remove(*node)
    }
}
