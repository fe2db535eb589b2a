//! Browser DOM layer for weaver inline tools.
//!
//! This crate binds the host-agnostic toggle logic to a live page. It
//! assumes a `wasm32-unknown-unknown` target environment.
//!
//! # Architecture
//!
//! - `dom`: `EditableDom` over web-sys nodes and ranges
//! - `selection`: window `Selection` ↔ `ActiveSelection` bridging
//! - `button`: toolbar button rendering
//! - `events`: click, selectionchange and shortcut handling
//! - `platform`: OS detection for the `CMD` modifier
//!
//! # Re-exports
//!
//! This crate re-exports `weaver-inline-tool` for convenience, so consumers
//! only need to depend on `weaver-inline-tool-browser`.

// Re-export core crate
pub use weaver_inline_tool;
pub use weaver_inline_tool::*;

pub mod button;
pub mod dom;
pub mod events;
pub mod platform;
pub mod selection;

pub use button::{render_button, sync_button};
pub use dom::{BrowserDom, host_error};
pub use events::{BrowserInlineTool, ToolListeners, key_from_event, parse_key};
pub use platform::{Platform, platform};
pub use selection::{apply_selection, read_selection};
