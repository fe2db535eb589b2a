//! `EditableDom` over the live browser DOM.
//!
//! Every primitive maps onto the matching `Range`/`Node` method, so the
//! toggle algorithm gets native live-range behavior for free.

use smol_str::SmolStr;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{DocumentFragment, DomException, Element, Node, Range};
use weaver_inline_tool::{EditableDom, HostError, MarkupTag};

/// Browser document handle implementing the core's host capabilities.
#[derive(Clone, Debug)]
pub struct BrowserDom {
    document: web_sys::Document,
}

impl BrowserDom {
    pub fn new(document: web_sys::Document) -> Self {
        Self { document }
    }

    /// The window's document, if there is one.
    pub fn from_window() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        Some(Self::new(document))
    }

    pub fn document(&self) -> &web_sys::Document {
        &self.document
    }
}

/// Map a thrown JS value onto a [`HostError`] by DOMException name.
pub fn host_error(value: JsValue) -> HostError {
    let error = if let Some(exception) = value.dyn_ref::<DomException>() {
        let message = exception.message();
        match exception.name().as_str() {
            "IndexSizeError" => HostError::IndexSize(message),
            "HierarchyRequestError" => HostError::HierarchyRequest(message),
            "NotFoundError" => HostError::NotFound(message),
            "InvalidCharacterError" => HostError::InvalidCharacter(message),
            "InvalidStateError" => HostError::InvalidState(message),
            other => HostError::Other(format!("{other}: {message}")),
        }
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        HostError::Other(String::from(error.message()))
    } else {
        HostError::Other(format!("{value:?}"))
    };
    tracing::warn!(target: "weaver::inline_tool::browser", %error, "DOM operation rejected");
    error
}

impl EditableDom for BrowserDom {
    type Node = Node;
    type Range = Range;
    type Fragment = DocumentFragment;

    fn parent_node(&self, node: &Node) -> Option<Node> {
        node.parent_node()
    }

    fn tag_name(&self, node: &Node) -> Option<SmolStr> {
        let element = node.dyn_ref::<Element>()?;
        Some(SmolStr::new(element.local_name().to_ascii_lowercase()))
    }

    fn range_start(&self, range: &Range) -> Result<Node, HostError> {
        range.start_container().map_err(host_error)
    }

    fn range_end(&self, range: &Range) -> Result<Node, HostError> {
        range.end_container().map_err(host_error)
    }

    fn is_collapsed(&self, range: &Range) -> Result<bool, HostError> {
        Ok(range.collapsed())
    }

    fn range_enclosing(&mut self, node: &Node) -> Result<Range, HostError> {
        let range = self.document.create_range().map_err(host_error)?;
        range.select_node_contents(node).map_err(host_error)?;
        Ok(range)
    }

    fn create_element(&mut self, tag: &MarkupTag) -> Result<Node, HostError> {
        let element = self
            .document
            .create_element(tag.as_str())
            .map_err(host_error)?;
        Ok(element.into())
    }

    fn extract_contents(&mut self, range: &Range) -> Result<DocumentFragment, HostError> {
        range.extract_contents().map_err(host_error)
    }

    fn append_fragment(
        &mut self,
        parent: &Node,
        fragment: DocumentFragment,
    ) -> Result<(), HostError> {
        parent.append_child(&fragment).map_err(host_error)?;
        Ok(())
    }

    fn insert_node(&mut self, range: &Range, node: &Node) -> Result<(), HostError> {
        range.insert_node(node).map_err(host_error)
    }

    fn insert_fragment(&mut self, range: &Range, fragment: DocumentFragment) -> Result<(), HostError> {
        range.insert_node(&fragment).map_err(host_error)
    }

    fn remove_node(&mut self, node: &Node) -> Result<(), HostError> {
        let parent = node
            .parent_node()
            .ok_or_else(|| HostError::NotFound("node has no parent".into()))?;
        parent.remove_child(node).map_err(host_error)?;
        Ok(())
    }
}
