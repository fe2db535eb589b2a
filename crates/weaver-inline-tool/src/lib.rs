//! weaver-inline-tool: inline formatting toggles without framework dependencies.
//!
//! This crate provides:
//! - `EditableDom` trait for the structured-editing primitives a host offers
//! - `SelectionToggler` - wraps a selection in a tag, or unwraps the tag around it
//! - `build_toggle_component` - turns a `ToolConfig` into a toolbar tool
//! - `Shortcut` / `KeyCombo` - `CMD+SHIFT+M` style keybindings
//! - `dom::Document` - in-memory tree with DOM range semantics, for native use and tests

pub mod dom;
pub mod error;
pub mod host;
pub mod keys;
pub mod selection;
pub mod tag;
pub mod toggler;
pub mod tool;

pub use error::ToggleError;
pub use host::{EditableDom, HostError};
pub use keys::{Key, KeyCombo, KeydownResult, Modifiers, Shortcut};
pub use selection::{ActiveSelection, find_ancestor_with_tag};
pub use smol_str::SmolStr;
pub use tag::MarkupTag;
pub use toggler::{SelectionToggler, ToggleOutcome};
pub use tool::{
    GenericInlineTool, IconClasses, InlineTool, SanitizeRules, ToggleComponent, ToolApi,
    ToolButton, ToolConfig, build_toggle_component,
};
