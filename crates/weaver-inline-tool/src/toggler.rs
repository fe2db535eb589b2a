//! Wrap/unwrap toggling of inline markup around a selection.
//!
//! [`SelectionToggler`] is bound to one tag and one editable root. A toggle
//! looks for an enclosing element with the tag starting at the range's start
//! container, then its end container. If one is found the whole element is
//! unwrapped; otherwise the range's content is wrapped in a new element.
//!
//! After every successful toggle the active selection covers the affected
//! content, and no empty wrapper element is left behind.

use crate::error::ToggleError;
use crate::host::{EditableDom, HostError};
use crate::selection::{ActiveSelection, find_ancestor_with_tag};
use crate::tag::MarkupTag;

/// What a call to [`SelectionToggler::toggle`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// There was no range to act on. Nothing changed.
    NoSelection,
    /// The range was collapsed and not inside a wrapper. Nothing changed.
    Skipped,
    /// The range's content was wrapped in a new element.
    Wrapped,
    /// An enclosing wrapper was removed.
    Unwrapped,
}

/// Applies or removes one inline tag within an editable root.
///
/// Generic over the host's node handle so it can be built before a document
/// is available; the document itself is passed to each call.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectionToggler<N> {
    tag: MarkupTag,
    root: N,
}

impl<N> SelectionToggler<N>
where
    N: Clone + PartialEq + std::fmt::Debug,
{
    pub fn new(tag: MarkupTag, root: N) -> Self {
        Self { tag, root }
    }

    pub fn tag(&self) -> &MarkupTag {
        &self.tag
    }

    /// The editable root that bounds ancestor lookups.
    pub fn root(&self) -> &N {
        &self.root
    }

    /// Wrap the range in the tag, or unwrap the wrapper it sits in.
    #[tracing::instrument(
        level = "debug",
        target = "weaver::inline_tool",
        skip_all,
        fields(tag = %self.tag)
    )]
    pub fn toggle<D>(
        &self,
        dom: &mut D,
        range: Option<&D::Range>,
        selection: &mut ActiveSelection<D::Range>,
    ) -> Result<ToggleOutcome, ToggleError>
    where
        D: EditableDom<Node = N>,
    {
        let Some(range) = range else {
            tracing::trace!(target: "weaver::inline_tool", "no selection, nothing to toggle");
            return Ok(ToggleOutcome::NoSelection);
        };

        if let Some(wrapper) = self.find_wrapper(dom, range)? {
            self.unwrap(dom, &wrapper, selection)?;
            return Ok(ToggleOutcome::Unwrapped);
        }

        if dom.is_collapsed(range)? {
            tracing::debug!(target: "weaver::inline_tool", "collapsed range outside a wrapper, skipping");
            return Ok(ToggleOutcome::Skipped);
        }

        self.wrap(dom, range, selection)?;
        Ok(ToggleOutcome::Wrapped)
    }

    /// Nearest wrapper around the range's start container, falling back to
    /// its end container.
    pub fn find_wrapper<D>(&self, dom: &D, range: &D::Range) -> Result<Option<N>, HostError>
    where
        D: EditableDom<Node = N>,
    {
        let start = dom.range_start(range)?;
        if let Some(found) = find_ancestor_with_tag(dom, &start, &self.tag, &self.root) {
            return Ok(Some(found));
        }
        let end = dom.range_end(range)?;
        if end == start {
            return Ok(None);
        }
        Ok(find_ancestor_with_tag(dom, &end, &self.tag, &self.root))
    }

    /// Move the range's content into a new wrapper element inserted where the
    /// content was, then select the wrapper's contents.
    ///
    /// Refuses collapsed ranges, since the wrapper would be empty.
    pub fn wrap<D>(
        &self,
        dom: &mut D,
        range: &D::Range,
        selection: &mut ActiveSelection<D::Range>,
    ) -> Result<N, ToggleError>
    where
        D: EditableDom<Node = N>,
    {
        if dom.is_collapsed(range)? {
            return Err(ToggleError::CollapsedRange);
        }

        let wrapper = dom.create_element(&self.tag)?;
        let contents = dom.extract_contents(range)?;
        dom.append_fragment(&wrapper, contents)?;
        dom.insert_node(range, &wrapper)?;
        tracing::debug!(target: "weaver::inline_tool", wrapper = ?wrapper, "wrapped selection");

        let enclosing = dom.range_enclosing(&wrapper)?;
        self.select(dom, selection, enclosing);
        Ok(wrapper)
    }

    /// Remove a wrapper, keeping its content in place and selected.
    ///
    /// The whole wrapper is unwrapped no matter how much of it the selection
    /// covered.
    pub fn unwrap<D>(
        &self,
        dom: &mut D,
        wrapper: &N,
        selection: &mut ActiveSelection<D::Range>,
    ) -> Result<(), ToggleError>
    where
        D: EditableDom<Node = N>,
    {
        if dom.parent_node(wrapper).is_none() {
            return Err(HostError::NotFound(format!("wrapper {wrapper:?} is not in the document")).into());
        }

        let range = dom.range_enclosing(wrapper)?;
        if let Err(err) = Self::reinsert_contents(dom, wrapper, &range) {
            dom.release_range(&range);
            return Err(err.into());
        }
        tracing::debug!(target: "weaver::inline_tool", wrapper = ?wrapper, "unwrapped selection");

        // The live range now spans exactly the reinserted content.
        self.select(dom, selection, range);
        Ok(())
    }

    fn reinsert_contents<D>(dom: &mut D, wrapper: &N, range: &D::Range) -> Result<(), HostError>
    where
        D: EditableDom<Node = N>,
    {
        let contents = dom.extract_contents(range)?;
        dom.remove_node(wrapper)?;
        dom.insert_fragment(range, contents)
    }

    /// Whether `anchor` sits inside an element with the tag.
    pub fn is_active<D>(&self, dom: &D, anchor: &N) -> bool
    where
        D: EditableDom<Node = N>,
    {
        find_ancestor_with_tag(dom, anchor, &self.tag, &self.root).is_some()
    }

    /// Whether the selection's anchor, or failing that its focus, sits inside
    /// an element with the tag. False for an empty selection.
    pub fn is_selection_active<D>(&self, dom: &D, selection: &ActiveSelection<D::Range>) -> bool
    where
        D: EditableDom<Node = N>,
    {
        let lookup = || -> Result<bool, HostError> {
            if let Some(anchor) = selection.anchor_node(dom)? {
                if self.is_active(dom, &anchor) {
                    return Ok(true);
                }
            }
            Ok(selection
                .focus_node(dom)?
                .is_some_and(|focus| self.is_active(dom, &focus)))
        };
        lookup().unwrap_or_else(|err| {
            tracing::trace!(target: "weaver::inline_tool", %err, "selection unreadable, reporting inactive");
            false
        })
    }

    /// Make `range` the active selection, releasing the range it replaces.
    fn select<D>(&self, dom: &mut D, selection: &mut ActiveSelection<D::Range>, range: D::Range)
    where
        D: EditableDom<Node = N>,
    {
        tracing::trace!(target: "weaver::inline_tool", range = ?range, "restoring selection");
        if let Some(previous) = selection.set(range) {
            dom.release_range(&previous);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{BoundaryPoint, Document, NodeId, RangeId};

    fn toggler(doc: &Document, tag: &str) -> SelectionToggler<NodeId> {
        SelectionToggler::new(MarkupTag::new(tag).unwrap(), doc.root())
    }

    fn selected_text(doc: &Document, selection: &ActiveSelection<RangeId>) -> String {
        doc.range_text(*selection.range().unwrap()).unwrap()
    }

    #[test]
    fn test_scenario_wrap_then_unwrap() {
        let mut doc = Document::parse("<p>foo bar</p>").unwrap();
        let t = toggler(&doc, "i");
        let range = doc.select_text("bar").unwrap();
        let mut selection = ActiveSelection::from_range(range);

        let outcome = t.toggle(&mut doc, Some(&range), &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::Wrapped);
        insta::assert_snapshot!(doc.to_markup(), @"<p>foo <i>bar</i></p>");
        assert!(t.is_selection_active(&doc, &selection));
        assert_eq!(selected_text(&doc, &selection), "bar");

        // A caret inside "bar" is enough to unwrap.
        let inside = doc.find_text("bar").unwrap();
        let caret = doc
            .collapsed_range(BoundaryPoint::new(inside.node, 1))
            .unwrap();
        let outcome = t.toggle(&mut doc, Some(&caret), &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::Unwrapped);
        insta::assert_snapshot!(doc.to_markup(), @"<p>foo bar</p>");
        assert!(!t.is_selection_active(&doc, &selection));
        assert_eq!(selected_text(&doc, &selection), "bar");
    }

    #[test]
    fn test_no_selection_is_a_noop() {
        let mut doc = Document::parse("<p>foo</p>").unwrap();
        let t = toggler(&doc, "b");
        let mut selection = ActiveSelection::empty();
        let outcome = t.toggle(&mut doc, None, &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::NoSelection);
        assert_eq!(doc.to_markup(), "<p>foo</p>");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_collapsed_range_is_skipped() {
        let mut doc = Document::parse("<p>foo</p>").unwrap();
        let t = toggler(&doc, "b");
        let at = doc.find_text("foo").unwrap();
        let caret = doc.collapsed_range(at).unwrap();
        let mut selection = ActiveSelection::from_range(caret);

        let outcome = t.toggle(&mut doc, Some(&caret), &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::Skipped);
        assert_eq!(doc.to_markup(), "<p>foo</p>");
        assert!(matches!(
            t.wrap(&mut doc, &caret, &mut selection),
            Err(ToggleError::CollapsedRange)
        ));
        assert_eq!(doc.to_markup(), "<p>foo</p>");
    }

    #[test]
    fn test_selection_after_wrap_encloses_wrapper() {
        let mut doc = Document::parse("hello").unwrap();
        let t = toggler(&doc, "b");
        let range = doc.select_text("hello").unwrap();
        let mut selection = ActiveSelection::from_range(range);

        let wrapper = t.wrap(&mut doc, &range, &mut selection).unwrap();
        assert_eq!(doc.to_markup(), "<b>hello</b>");
        let (start, end) = doc.range_bounds(*selection.range().unwrap()).unwrap();
        assert_eq!(start, BoundaryPoint::new(wrapper, 0));
        assert_eq!(end, BoundaryPoint::new(wrapper, doc.children(wrapper).len()));
    }

    #[test]
    fn test_whole_phrase_unwrap() {
        let mut doc = Document::parse("<mark>hello world</mark>").unwrap();
        let t = toggler(&doc, "mark");
        let range = doc.select_text("world").unwrap();
        let mut selection = ActiveSelection::from_range(range);

        let outcome = t.toggle(&mut doc, Some(&range), &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::Unwrapped);
        assert_eq!(doc.to_markup(), "hello world");
        assert_eq!(selected_text(&doc, &selection), "hello world");
        assert!(doc.elements_named("mark").is_empty());
    }

    #[test]
    fn test_wrapper_found_from_range_end() {
        let mut doc = Document::parse("<p>foo <b>bar</b></p>").unwrap();
        let t = toggler(&doc, "b");
        let start = doc.find_text("foo").unwrap();
        let end = doc.find_text("bar").unwrap();
        let range = doc
            .create_range(start, BoundaryPoint::new(end.node, 2))
            .unwrap();
        let mut selection = ActiveSelection::from_range(range);

        let outcome = t.toggle(&mut doc, Some(&range), &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::Unwrapped);
        assert_eq!(doc.to_markup(), "<p>foo bar</p>");
    }

    #[test]
    fn test_wrap_across_elements() {
        let mut doc = Document::parse("<p>one <u>two three</u> four</p>").unwrap();
        let t = toggler(&doc, "i");
        let start = doc.find_text("one").unwrap();
        let end = doc.find_text("two three").unwrap();
        let range = doc
            .create_range(
                BoundaryPoint::new(start.node, 2),
                BoundaryPoint::new(end.node, 3),
            )
            .unwrap();
        let mut selection = ActiveSelection::from_range(range);

        t.toggle(&mut doc, Some(&range), &mut selection).unwrap();
        insta::assert_snapshot!(
            doc.to_markup(),
            @"<p>on<i>e <u>two</u></i><u> three</u> four</p>"
        );
        assert_eq!(selected_text(&doc, &selection), "e two");
    }

    #[test]
    fn test_lookup_bounded_by_root() {
        let mut doc = Document::parse("<i><div>foo</div></i>").unwrap();
        let editable = doc.elements_named("div")[0];
        let t = SelectionToggler::new(MarkupTag::new("i").unwrap(), editable);
        let range = doc.select_text("foo").unwrap();
        let mut selection = ActiveSelection::from_range(range);

        // The <i> outside the editable root is invisible, so this wraps.
        let outcome = t.toggle(&mut doc, Some(&range), &mut selection).unwrap();
        assert_eq!(outcome, ToggleOutcome::Wrapped);
        assert_eq!(doc.to_markup(), "<i><div><i>foo</i></div></i>");
    }

    #[test]
    fn test_unwrap_detached_wrapper_fails_without_mutation() {
        let mut doc = Document::parse("<p>x</p>").unwrap();
        let t = toggler(&doc, "i");
        let stray = doc.create_element("i").unwrap();
        let text = doc.create_text("y");
        doc.append_child(stray, text).unwrap();
        let mut selection = ActiveSelection::empty();

        let err = t.unwrap(&mut doc, &stray, &mut selection).unwrap_err();
        assert!(matches!(err, ToggleError::Host(HostError::NotFound(_))));
        assert_eq!(doc.outer_markup(stray), "<i>y</i>");
        assert!(selection.is_empty());
    }

    #[test]
    fn test_replaced_selection_range_is_released() {
        let mut doc = Document::parse("<p>foo bar</p>").unwrap();
        let t = toggler(&doc, "i");
        let range = doc.select_text("bar").unwrap();
        let mut selection = ActiveSelection::from_range(range);
        assert_eq!(doc.live_range_count(), 1);

        t.toggle(&mut doc, Some(&range), &mut selection).unwrap();
        assert_eq!(doc.live_range_count(), 1);
        assert_ne!(selection.range(), Some(&range));
    }

    #[test]
    fn test_host_rejection_propagates_without_rollback() {
        let mut doc = Document::parse("<p><!--abcdef--></p>").unwrap();
        let t = toggler(&doc, "i");
        let p = doc.elements_named("p")[0];
        let comment = doc.children(p)[0];
        let range = doc
            .create_range(BoundaryPoint::new(comment, 1), BoundaryPoint::new(comment, 3))
            .unwrap();
        let mut selection = ActiveSelection::from_range(range);

        let err = t.toggle(&mut doc, Some(&range), &mut selection).unwrap_err();
        assert!(matches!(
            err,
            ToggleError::Host(HostError::HierarchyRequest(_))
        ));
        // The extraction already happened and is not undone.
        assert_eq!(doc.to_markup(), "<p><!--adef--></p>");
        assert_eq!(selection.range(), Some(&range));
    }

    #[test]
    fn test_range_slots_are_reused_across_toggles() {
        let mut doc = Document::parse("<p>foo bar</p>").unwrap();
        let t = toggler(&doc, "i");
        let range = doc.select_text("bar").unwrap();
        let mut selection = ActiveSelection::from_range(range);

        for _ in 0..100 {
            let current = *selection.range().unwrap();
            t.toggle(&mut doc, Some(&current), &mut selection).unwrap();
        }
        assert_eq!(doc.to_markup(), "<p>foo bar</p>");
        assert_eq!(doc.live_range_count(), 1);
        assert_eq!(doc.range_capacity(), 2);
    }
}
