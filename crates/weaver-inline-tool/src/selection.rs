//! Selection model threaded through toggle operations.
//!
//! The core never reads ambient selection state. Hosts snapshot their native
//! selection into an [`ActiveSelection`] before a call and apply it back
//! afterwards, so the toggle logic stays a plain function of its inputs.

use crate::host::{EditableDom, HostError};
use crate::tag::MarkupTag;

/// The user's current selection as a single range plus a direction.
///
/// A backwards selection was made right-to-left: its anchor sits at the end
/// of the range and its focus at the start.
#[derive(Clone, Debug, PartialEq)]
pub struct ActiveSelection<R> {
    range: Option<R>,
    backwards: bool,
}

impl<R> Default for ActiveSelection<R> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<R> ActiveSelection<R> {
    /// No selection at all.
    pub fn empty() -> Self {
        Self {
            range: None,
            backwards: false,
        }
    }

    /// A forward selection over `range`.
    pub fn from_range(range: R) -> Self {
        Self {
            range: Some(range),
            backwards: false,
        }
    }

    /// A selection over `range` made right-to-left.
    pub fn backwards(range: R) -> Self {
        Self {
            range: Some(range),
            backwards: true,
        }
    }

    pub fn range(&self) -> Option<&R> {
        self.range.as_ref()
    }

    pub fn is_backwards(&self) -> bool {
        self.backwards
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }

    /// Replace the range with a forward selection, returning the old one.
    pub fn set(&mut self, range: R) -> Option<R> {
        self.backwards = false;
        self.range.replace(range)
    }

    /// Drop the selection, returning the old range.
    pub fn clear(&mut self) -> Option<R> {
        self.backwards = false;
        self.range.take()
    }

    /// Take the range out, leaving the selection empty.
    pub fn take(&mut self) -> Option<R> {
        self.clear()
    }

    /// Container node of the selection's anchor.
    pub fn anchor_node<D>(&self, dom: &D) -> Result<Option<D::Node>, HostError>
    where
        D: EditableDom<Range = R>,
    {
        let Some(range) = &self.range else {
            return Ok(None);
        };
        let node = if self.backwards {
            dom.range_end(range)?
        } else {
            dom.range_start(range)?
        };
        Ok(Some(node))
    }

    /// Container node of the selection's focus.
    pub fn focus_node<D>(&self, dom: &D) -> Result<Option<D::Node>, HostError>
    where
        D: EditableDom<Range = R>,
    {
        let Some(range) = &self.range else {
            return Ok(None);
        };
        let node = if self.backwards {
            dom.range_start(range)?
        } else {
            dom.range_end(range)?
        };
        Ok(Some(node))
    }
}

/// Walk from `anchor` (inclusive) up through its parents looking for an
/// element named `tag`.
///
/// Stops without a match at `root`, which is never itself considered, or at a
/// node that has no parent.
pub fn find_ancestor_with_tag<D: EditableDom>(
    dom: &D,
    anchor: &D::Node,
    tag: &MarkupTag,
    root: &D::Node,
) -> Option<D::Node> {
    let mut current = anchor.clone();
    loop {
        if current == *root {
            return None;
        }
        if dom
            .tag_name(&current)
            .is_some_and(|name| tag.matches(&name))
        {
            tracing::trace!(
                target: "weaver::inline_tool",
                tag = %tag,
                node = ?current,
                "found wrapper ancestor"
            );
            return Some(current);
        }
        current = dom.parent_node(&current)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;

    fn tag(name: &str) -> MarkupTag {
        MarkupTag::new(name).unwrap()
    }

    #[test]
    fn test_lookup_is_inclusive() {
        let doc = Document::parse("<p><i>bar</i></p>").unwrap();
        let i = doc.elements_named("i")[0];
        assert_eq!(
            find_ancestor_with_tag(&doc, &i, &tag("i"), &doc.root()),
            Some(i)
        );
    }

    #[test]
    fn test_lookup_walks_parents() {
        let doc = Document::parse("<p><i>a <b>bar</b></i></p>").unwrap();
        let i = doc.elements_named("i")[0];
        let text = doc.find_text("bar").unwrap().node;
        assert_eq!(
            find_ancestor_with_tag(&doc, &text, &tag("I"), &doc.root()),
            Some(i)
        );
        assert_eq!(
            find_ancestor_with_tag(&doc, &text, &tag("u"), &doc.root()),
            None
        );
    }

    #[test]
    fn test_lookup_stops_at_root() {
        let doc = Document::parse("<i><p>bar</p></i>").unwrap();
        let p = doc.elements_named("p")[0];
        let outer = doc.elements_named("i")[0];
        let text = doc.find_text("bar").unwrap().node;
        // The editable root is never matched, nor is anything above it.
        assert_eq!(find_ancestor_with_tag(&doc, &text, &tag("i"), &p), None);
        assert_eq!(find_ancestor_with_tag(&doc, &outer, &tag("i"), &outer), None);
    }

    #[test]
    fn test_lookup_stops_at_detached_top() {
        let mut doc = Document::new();
        let b = doc.create_element("b").unwrap();
        let t = doc.create_text("x");
        doc.append_child(b, t).unwrap();
        let root = doc.root();
        assert_eq!(find_ancestor_with_tag(&doc, &t, &tag("i"), &root), None);
        assert_eq!(find_ancestor_with_tag(&doc, &t, &tag("b"), &root), Some(b));
    }

    #[test]
    fn test_anchor_and_focus_follow_direction() {
        let mut doc = Document::parse("<p>foo <i>bar</i></p>").unwrap();
        let start = doc.find_text("foo").unwrap();
        let end = doc.find_text("bar").unwrap();
        let range = doc.create_range(start, end).unwrap();

        let forward = ActiveSelection::from_range(range);
        assert_eq!(forward.anchor_node(&doc).unwrap(), Some(start.node));
        assert_eq!(forward.focus_node(&doc).unwrap(), Some(end.node));

        let backwards = ActiveSelection::backwards(range);
        assert_eq!(backwards.anchor_node(&doc).unwrap(), Some(end.node));
        assert_eq!(backwards.focus_node(&doc).unwrap(), Some(start.node));

        let empty = ActiveSelection::<crate::dom::RangeId>::empty();
        assert_eq!(empty.anchor_node(&doc).unwrap(), None);
    }

    #[test]
    fn test_set_resets_direction() {
        let mut sel = ActiveSelection::backwards(1u8);
        assert_eq!(sel.set(2), Some(1));
        assert!(!sel.is_backwards());
        assert_eq!(sel.take(), Some(2));
        assert!(sel.is_empty());
    }
}
