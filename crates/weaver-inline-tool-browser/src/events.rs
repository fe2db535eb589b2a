//! Event handling for an inline tool bound to an editor element.
//!
//! [`BrowserInlineTool`] owns a core tool instance plus its rendered button.
//! Each handler snapshots the window selection, runs the core, and writes the
//! selection back, so the core never touches ambient browser state.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlButtonElement, KeyboardEvent, Node, Range};
use weaver_inline_tool::{
    ActiveSelection, GenericInlineTool, HostError, IconClasses, InlineTool, Key, KeyCombo,
    KeydownResult, Modifiers, ToggleComponent, ToggleError, ToggleOutcome, ToolApi,
};

use crate::button::{render_button, sync_button};
use crate::dom::{BrowserDom, host_error};
use crate::platform::platform;
use crate::selection::{apply_selection, read_selection};

/// An inline tool wired to a contenteditable editor element.
pub struct BrowserInlineTool {
    tool: GenericInlineTool<Node>,
    dom: BrowserDom,
    editor: Element,
    button: Option<HtmlButtonElement>,
    combo: Option<KeyCombo>,
}

impl BrowserInlineTool {
    /// Instantiate `component` for the editor element.
    ///
    /// The component's shortcut, if any, is resolved for the current platform.
    pub fn new(
        component: &ToggleComponent,
        editor: Element,
        styles: IconClasses,
    ) -> Result<Self, ToggleError> {
        let document = editor
            .owner_document()
            .ok_or_else(|| HostError::NotFound("editor element has no owner document".into()))?;
        let combo = component
            .shortcut()
            .map(|shortcut| shortcut.parse(platform().mac))
            .transpose()?;
        let tool = component.instantiate(ToolApi {
            styles,
            root: Node::from(editor.clone()),
        });
        Ok(Self {
            tool,
            dom: BrowserDom::new(document),
            editor,
            button: None,
            combo,
        })
    }

    pub fn tool(&self) -> &GenericInlineTool<Node> {
        &self.tool
    }

    /// The key combination that triggers this tool, if it has a shortcut.
    pub fn key_combo(&self) -> Option<&KeyCombo> {
        self.combo.as_ref()
    }

    /// Render a fresh toolbar button.
    pub fn render(&mut self) -> Result<HtmlButtonElement, HostError> {
        let model = InlineTool::<BrowserDom>::render(&mut self.tool).clone();
        let button = render_button(self.dom.document(), &model)?;
        self.button = Some(button.clone());
        Ok(button)
    }

    /// The toolbar button was clicked.
    pub fn on_click(&mut self) -> Result<ToggleOutcome, ToggleError> {
        self.toggle_current_selection()
    }

    /// The document selection moved. Refreshes the button's active state.
    pub fn on_selection_change(&mut self) -> bool {
        let selection = read_selection().unwrap_or_else(|_| ActiveSelection::empty());
        let active = self.tool.check_state(&self.dom, &selection);
        if let (Some(button), Some(model)) = (&self.button, self.tool.button()) {
            if let Err(err) = sync_button(button, model) {
                tracing::warn!(target: "weaver::inline_tool::browser", %err, "failed to sync button");
            }
        }
        active
    }

    /// Toggle when the keydown matches the tool's shortcut.
    pub fn handle_keydown(&mut self, event: &KeyboardEvent) -> KeydownResult {
        let key = key_from_event(event);
        let modifiers = Modifiers {
            ctrl: event.ctrl_key(),
            alt: event.alt_key(),
            shift: event.shift_key(),
            meta: event.meta_key(),
        };

        if self
            .combo
            .as_ref()
            .is_some_and(|combo| combo.matches(&key, modifiers))
        {
            event.prevent_default();
            if let Err(err) = self.toggle_current_selection() {
                tracing::warn!(target: "weaver::inline_tool::browser", %err, "shortcut toggle failed");
            }
            return KeydownResult::Handled;
        }

        if key.is_navigation() {
            return KeydownResult::PassThrough;
        }
        KeydownResult::NotHandled
    }

    fn toggle_current_selection(&mut self) -> Result<ToggleOutcome, ToggleError> {
        let mut selection = read_selection()?;
        let range = match selection.range() {
            Some(range) if self.contains_range(range)? => Some(range.clone()),
            Some(_) => {
                tracing::trace!(target: "weaver::inline_tool::browser", "selection is not inside the editor");
                None
            }
            None => None,
        };

        let outcome = self
            .tool
            .surround(&mut self.dom, range.as_ref(), &mut selection)?;
        if matches!(outcome, ToggleOutcome::Wrapped | ToggleOutcome::Unwrapped) {
            apply_selection(&selection)?;
        }
        self.on_selection_change();
        Ok(outcome)
    }

    /// Whether both ends of `range` lie inside the editor element.
    fn contains_range(&self, range: &Range) -> Result<bool, HostError> {
        let start = range.start_container().map_err(host_error)?;
        let end = range.end_container().map_err(host_error)?;
        Ok(self.editor.contains(Some(&start)) && self.editor.contains(Some(&end)))
    }

    /// Attach click, keydown and selectionchange listeners.
    ///
    /// Renders the button if it has not been rendered yet. Listeners stay
    /// registered until the returned value is dropped.
    pub fn attach(this: &Rc<RefCell<Self>>) -> Result<ToolListeners, HostError> {
        let (button, editor, document) = {
            let mut tool = this.borrow_mut();
            let button = match tool.button.clone() {
                Some(button) => button,
                None => tool.render()?,
            };
            (button, tool.editor.clone(), tool.dom.document().clone())
        };

        let handle = Rc::clone(this);
        let click = EventListener::new(&button, "click", move |_| {
            let Ok(mut tool) = handle.try_borrow_mut() else {
                return;
            };
            if let Err(err) = tool.on_click() {
                tracing::warn!(target: "weaver::inline_tool::browser", %err, "toggle failed");
            }
        });

        let handle = Rc::clone(this);
        let keydown = EventListener::new_with_options(
            &editor,
            "keydown",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
                    return;
                };
                if let Ok(mut tool) = handle.try_borrow_mut() {
                    tool.handle_keydown(event);
                }
            },
        );

        let handle = Rc::clone(this);
        let selection_change = EventListener::new(&document, "selectionchange", move |_| {
            if let Ok(mut tool) = handle.try_borrow_mut() {
                tool.on_selection_change();
            }
        });

        Ok(ToolListeners {
            _click: click,
            _keydown: keydown,
            _selection_change: selection_change,
        })
    }
}

/// Registered event listeners for a [`BrowserInlineTool`]. Dropping this
/// removes them.
pub struct ToolListeners {
    _click: EventListener,
    _keydown: EventListener,
    _selection_change: EventListener,
}

/// Convert a keydown event's `key` into the core's [`Key`].
pub fn key_from_event(event: &KeyboardEvent) -> Key {
    parse_key(&event.key())
}

/// Parse a DOM `KeyboardEvent.key` value.
pub fn parse_key(key: &str) -> Key {
    match key {
        "Enter" => Key::Enter,
        "Backspace" => Key::Backspace,
        "Delete" => Key::Delete,
        "Tab" => Key::Tab,
        "Escape" => Key::Escape,
        "Insert" => Key::Insert,
        " " => Key::Space,
        "ArrowLeft" => Key::ArrowLeft,
        "ArrowRight" => Key::ArrowRight,
        "ArrowUp" => Key::ArrowUp,
        "ArrowDown" => Key::ArrowDown,
        "Home" => Key::Home,
        "End" => Key::End,
        s if s.chars().count() == 1 => Key::character(s),
        _ => Key::Unidentified,
    }
}
