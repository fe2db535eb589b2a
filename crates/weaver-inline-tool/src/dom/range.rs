//! Live ranges over a [`Document`].

use std::cmp::Ordering;

use super::{Document, NodeId, NodeKind, char_slice};
use crate::host::HostError;

/// Handle to a live range registered with a [`Document`].
///
/// Slots are reused once a range is detached; the generation keeps an old
/// handle from reaching the range that took over its slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct RangeId {
    index: u32,
    generation: u32,
}

/// A position in the tree: a container node plus an offset into it.
///
/// The offset counts characters for text and comments, children otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoundaryPoint {
    pub node: NodeId,
    pub offset: usize,
}

impl BoundaryPoint {
    pub fn new(node: NodeId, offset: usize) -> Self {
        Self { node, offset }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct LiveRange {
    pub(crate) start: BoundaryPoint,
    pub(crate) end: BoundaryPoint,
}

#[derive(Clone, Debug)]
pub(crate) struct RangeSlot {
    generation: u32,
    live: Option<LiveRange>,
}

impl Document {
    // === Range lifecycle ===

    /// Register a live range from `start` to `end`.
    ///
    /// Follows DOM `setStart`/`setEnd`: an `end` before `start` (or in a
    /// different tree) collapses the range at `end`.
    pub fn create_range(
        &mut self,
        start: BoundaryPoint,
        end: BoundaryPoint,
    ) -> Result<RangeId, HostError> {
        let range = self.collapsed_range(start)?;
        self.set_end(range, end)?;
        Ok(range)
    }

    /// Register a collapsed live range at `at`.
    pub fn collapsed_range(&mut self, at: BoundaryPoint) -> Result<RangeId, HostError> {
        self.check_boundary(at)?;
        let live = Some(LiveRange { start: at, end: at });

        if let Some(index) = self.free_ranges.pop() {
            if let Some(slot) = self.ranges.get_mut(index as usize) {
                slot.live = live;
                return Ok(RangeId {
                    index,
                    generation: slot.generation,
                });
            }
        }
        let index = self.ranges.len() as u32;
        self.ranges.push(RangeSlot {
            generation: 0,
            live,
        });
        Ok(RangeId {
            index,
            generation: 0,
        })
    }

    /// Stop tracking a range. Later use of the handle fails with `InvalidState`.
    pub fn detach_range(&mut self, range: RangeId) {
        let Some(slot) = self.ranges.get_mut(range.index as usize) else {
            return;
        };
        if slot.generation != range.generation || slot.live.is_none() {
            return;
        }
        slot.live = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_ranges.push(range.index);
    }

    /// Number of ranges still tracked.
    pub fn live_range_count(&self) -> usize {
        self.ranges.iter().filter(|slot| slot.live.is_some()).count()
    }

    /// Number of range slots allocated, tracked or free.
    pub fn range_capacity(&self) -> usize {
        self.ranges.len()
    }

    fn live(&self, range: RangeId) -> Result<LiveRange, HostError> {
        self.ranges
            .get(range.index as usize)
            .filter(|slot| slot.generation == range.generation)
            .and_then(|slot| slot.live)
            .ok_or_else(|| detached(range))
    }

    fn live_mut(&mut self, range: RangeId) -> Result<&mut LiveRange, HostError> {
        self.ranges
            .get_mut(range.index as usize)
            .filter(|slot| slot.generation == range.generation)
            .and_then(|slot| slot.live.as_mut())
            .ok_or_else(|| detached(range))
    }

    // === Range queries ===

    /// Start and end boundary points of a range.
    pub fn range_bounds(&self, range: RangeId) -> Result<(BoundaryPoint, BoundaryPoint), HostError> {
        let live = self.live(range)?;
        Ok((live.start, live.end))
    }

    pub fn range_collapsed(&self, range: RangeId) -> Result<bool, HostError> {
        let live = self.live(range)?;
        Ok(live.start == live.end)
    }

    /// Text covered by a range, like DOM `Range.toString()`.
    pub fn range_text(&self, range: RangeId) -> Result<String, HostError> {
        let (start, end) = self.range_bounds(range)?;
        if start.node == end.node {
            if let Some(NodeKind::Text(data)) = self.kind(start.node) {
                return Ok(char_slice(data, start.offset, end.offset).to_string());
            }
        }

        let mut out = String::new();
        if let Some(NodeKind::Text(data)) = self.kind(start.node) {
            out.push_str(char_slice(data, start.offset, usize::MAX));
        }
        let root = self.tree_root(start.node);
        for node in self.descendants(root) {
            if let Some(NodeKind::Text(data)) = self.kind(node) {
                if self.is_contained(node, start, end) {
                    out.push_str(data);
                }
            }
        }
        if let Some(NodeKind::Text(data)) = self.kind(end.node) {
            out.push_str(char_slice(data, 0, end.offset));
        }
        Ok(out)
    }

    // === Range mutation ===

    pub fn set_start(&mut self, range: RangeId, bp: BoundaryPoint) -> Result<(), HostError> {
        self.check_boundary(bp)?;
        let live = self.live(range)?;
        let after_end = !matches!(
            self.compare_points(bp, live.end),
            Some(Ordering::Less | Ordering::Equal)
        );
        let slot = self.live_mut(range)?;
        slot.start = bp;
        if after_end {
            slot.end = bp;
        }
        Ok(())
    }

    pub fn set_end(&mut self, range: RangeId, bp: BoundaryPoint) -> Result<(), HostError> {
        self.check_boundary(bp)?;
        let live = self.live(range)?;
        let before_start = !matches!(
            self.compare_points(bp, live.start),
            Some(Ordering::Greater | Ordering::Equal)
        );
        let slot = self.live_mut(range)?;
        slot.end = bp;
        if before_start {
            slot.start = bp;
        }
        Ok(())
    }

    /// Make the range span exactly the contents of `node`.
    pub fn select_node_contents(&mut self, range: RangeId, node: NodeId) -> Result<(), HostError> {
        self.data(node)?;
        let length = self.node_length(node);
        let slot = self.live_mut(range)?;
        slot.start = BoundaryPoint::new(node, 0);
        slot.end = BoundaryPoint::new(node, length);
        Ok(())
    }

    // === Content operations ===

    /// Move the range's content into a new fragment.
    ///
    /// Partially selected elements are cloned into the fragment, partially
    /// selected text is split. The range collapses at the extraction point.
    pub fn extract_range(&mut self, range: RangeId) -> Result<NodeId, HostError> {
        let (start, end) = self.range_bounds(range)?;
        let (fragment, collapse_to) = self.extract_span(start, end)?;
        let slot = self.live_mut(range)?;
        slot.start = collapse_to;
        slot.end = collapse_to;
        Ok(fragment)
    }

    fn extract_span(
        &mut self,
        start: BoundaryPoint,
        end: BoundaryPoint,
    ) -> Result<(NodeId, BoundaryPoint), HostError> {
        let fragment = self.create_fragment();
        if start == end {
            return Ok((fragment, start));
        }

        let is_char_data = |doc: &Document, n: NodeId| {
            doc.kind(n).is_some_and(NodeKind::is_character_data)
        };

        if start.node == end.node && is_char_data(self, start.node) {
            let data = self.data_of(start.node).unwrap_or_default();
            let piece = char_slice(data, start.offset, end.offset).to_string();
            let clone = self.clone_with_data(start.node, piece)?;
            self.append_child(fragment, clone)?;
            self.replace_data(start.node, start.offset, end.offset - start.offset, "")?;
            return Ok((fragment, start));
        }

        let mut common = start.node;
        while !self.is_inclusive_ancestor(common, end.node) {
            common = self.parent(common).ok_or_else(|| {
                HostError::HierarchyRequest("range boundaries are in different trees".into())
            })?;
        }

        let first_partial = if self.is_inclusive_ancestor(start.node, end.node) {
            None
        } else {
            Some(self.child_towards(common, start.node)?)
        };
        let last_partial = if self.is_inclusive_ancestor(end.node, start.node) {
            None
        } else {
            Some(self.child_towards(common, end.node)?)
        };

        let contained: Vec<NodeId> = self
            .children(common)
            .iter()
            .copied()
            .filter(|&c| self.is_contained(c, start, end))
            .collect();

        let collapse_to = if self.is_inclusive_ancestor(start.node, end.node) {
            start
        } else {
            let mut reference = start.node;
            loop {
                let parent = self.parent(reference).ok_or_else(|| {
                    HostError::HierarchyRequest("range start escaped its tree".into())
                })?;
                if self.is_inclusive_ancestor(parent, end.node) {
                    break;
                }
                reference = parent;
            }
            let parent = self.parent(reference).unwrap_or(common);
            let index = self.index_of(reference).unwrap_or(0);
            BoundaryPoint::new(parent, index + 1)
        };

        if let Some(first) = first_partial {
            if is_char_data(self, first) {
                let data = self.data_of(first).unwrap_or_default();
                let length = data.chars().count();
                let piece = char_slice(data, start.offset, length).to_string();
                let clone = self.clone_with_data(first, piece)?;
                self.append_child(fragment, clone)?;
                self.replace_data(first, start.offset, length - start.offset, "")?;
            } else {
                let clone = self.clone_node(first)?;
                self.append_child(fragment, clone)?;
                let inner_end = BoundaryPoint::new(first, self.node_length(first));
                let (sub, _) = self.extract_span(start, inner_end)?;
                self.append_child(clone, sub)?;
            }
        }

        for child in contained {
            self.append_child(fragment, child)?;
        }

        if let Some(last) = last_partial {
            if is_char_data(self, last) {
                let data = self.data_of(last).unwrap_or_default();
                let piece = char_slice(data, 0, end.offset).to_string();
                let clone = self.clone_with_data(last, piece)?;
                self.append_child(fragment, clone)?;
                self.replace_data(last, 0, end.offset, "")?;
            } else {
                let clone = self.clone_node(last)?;
                self.append_child(fragment, clone)?;
                let (sub, _) = self.extract_span(BoundaryPoint::new(last, 0), end)?;
                self.append_child(clone, sub)?;
            }
        }

        Ok((fragment, collapse_to))
    }

    /// Insert a node (or a fragment's children) at the start of the range.
    ///
    /// A text start container is split at the boundary. If the range was
    /// collapsed it grows to enclose what was inserted.
    pub fn insert_into_range(&mut self, range: RangeId, node: NodeId) -> Result<(), HostError> {
        let (start, _) = self.range_bounds(range)?;
        let container = start.node;

        let is_text = match self.data(container)?.kind {
            NodeKind::Comment(_) => {
                return Err(HostError::HierarchyRequest(
                    "cannot insert into a comment".into(),
                ));
            }
            NodeKind::Text(_) => {
                if self.parent(container).is_none() {
                    return Err(HostError::HierarchyRequest(
                        "cannot insert next to a detached text node".into(),
                    ));
                }
                true
            }
            _ => false,
        };
        if container == node {
            return Err(HostError::HierarchyRequest(
                "cannot insert a node into itself".into(),
            ));
        }

        let mut reference = if is_text {
            Some(container)
        } else {
            self.children(container).get(start.offset).copied()
        };
        let parent = match reference {
            Some(r) => self
                .parent(r)
                .ok_or_else(|| HostError::NotFound(format!("node {r} has no parent")))?,
            None => container,
        };
        self.ensure_pre_insertion_validity(parent, node, reference)?;

        if is_text {
            reference = Some(self.split_text(container, start.offset)?);
        }
        if reference == Some(node) {
            reference = self.next_sibling(node);
        }
        if self.parent(node).is_some() {
            self.remove(node)?;
        }

        let mut new_offset = match reference {
            Some(r) => self
                .index_of(r)
                .ok_or_else(|| HostError::NotFound(format!("reference node {r} is detached")))?,
            None => self.node_length(parent),
        };
        new_offset += if self.data(node)?.kind == NodeKind::Fragment {
            self.children(node).len()
        } else {
            1
        };

        self.insert_unchecked(parent, node, reference)?;

        if self.range_collapsed(range)? {
            self.live_mut(range)?.end = BoundaryPoint::new(parent, new_offset);
        }
        Ok(())
    }

    // === Boundary bookkeeping ===

    /// Apply `f` to every boundary point of every live range.
    pub(crate) fn update_boundaries(
        &mut self,
        mut f: impl FnMut(&Document, &mut BoundaryPoint),
    ) {
        let mut ranges = std::mem::take(&mut self.ranges);
        for live in ranges.iter_mut().filter_map(|slot| slot.live.as_mut()) {
            f(self, &mut live.start);
            f(self, &mut live.end);
        }
        self.ranges = ranges;
    }

    fn check_boundary(&self, bp: BoundaryPoint) -> Result<(), HostError> {
        self.data(bp.node)?;
        let length = self.node_length(bp.node);
        if bp.offset > length {
            return Err(HostError::IndexSize(format!(
                "offset {} exceeds length {length} of node {}",
                bp.offset, bp.node
            )));
        }
        Ok(())
    }

    /// The child of `ancestor` on the path down to `node`.
    fn child_towards(&self, ancestor: NodeId, node: NodeId) -> Result<NodeId, HostError> {
        let mut current = node;
        loop {
            match self.parent(current) {
                Some(parent) if parent == ancestor => return Ok(current),
                Some(parent) => current = parent,
                None => {
                    return Err(HostError::NotFound(format!(
                        "node {node} is not below {ancestor}"
                    )));
                }
            }
        }
    }

    /// Whether `node` lies entirely between `start` and `end`.
    fn is_contained(&self, node: NodeId, start: BoundaryPoint, end: BoundaryPoint) -> bool {
        let node_start = BoundaryPoint::new(node, 0);
        let node_end = BoundaryPoint::new(node, self.node_length(node));
        self.compare_points(node_start, start) == Some(Ordering::Greater)
            && self.compare_points(node_end, end) == Some(Ordering::Less)
    }

    /// Tree-order comparison of two boundary points.
    ///
    /// Returns `None` when the points live in different trees.
    pub fn compare_points(&self, a: BoundaryPoint, b: BoundaryPoint) -> Option<Ordering> {
        let (root_a, key_a) = self.point_key(a);
        let (root_b, key_b) = self.point_key(b);
        (root_a == root_b).then(|| key_a.cmp(&key_b))
    }

    /// Child-index path from the tree root to the point, offset last.
    ///
    /// Lexicographic order on these keys is boundary-point order: a point
    /// inside child `i` sorts after `(parent, i)` and before `(parent, i + 1)`.
    fn point_key(&self, bp: BoundaryPoint) -> (NodeId, Vec<usize>) {
        let mut key = vec![bp.offset];
        let mut current = bp.node;
        while let Some(parent) = self.parent(current) {
            key.push(self.index_of(current).unwrap_or(0));
            current = parent;
        }
        key.reverse();
        (current, key)
    }
}

fn detached(range: RangeId) -> HostError {
    HostError::InvalidState(format!("range {} is detached", range.index))
}
