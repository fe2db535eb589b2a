//! Component factory for inline formatting tools.
//!
//! [`build_toggle_component`] turns a [`ToolConfig`] into a
//! [`ToggleComponent`]: the "class" a host editor registers. The host then
//! [instantiates](ToggleComponent::instantiate) it with its styling and
//! editable root, and drives the resulting [`GenericInlineTool`] through the
//! [`InlineTool`] trait.

use std::sync::Arc;

use markdown_weaver_escape::{FmtWriter, escape_html};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::ToggleError;
use crate::host::EditableDom;
use crate::keys::Shortcut;
use crate::selection::ActiveSelection;
use crate::tag::MarkupTag;
use crate::toggler::{SelectionToggler, ToggleOutcome};

/// Configuration for one inline tool.
///
/// Deserializes from camelCase JSON:
///
/// ```json
/// { "tagName": "mark", "toolboxIcon": "<svg/>", "shortcut": "CMD+SHIFT+M" }
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolConfig {
    /// Element tag the tool wraps selections in.
    pub tag_name: String,
    /// Markup shown inside the toolbar button.
    pub toolbox_icon: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanitize: Option<SanitizeRules>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<Shortcut>,
}

impl ToolConfig {
    pub fn new(tag_name: impl Into<String>, toolbox_icon: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            toolbox_icon: toolbox_icon.into(),
            sanitize: None,
            shortcut: None,
        }
    }

    pub fn with_sanitize(mut self, rules: SanitizeRules) -> Self {
        self.sanitize = Some(rules);
        self
    }

    pub fn with_shortcut(mut self, shortcut: impl Into<Shortcut>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ToggleError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Sanitizer rules handed through to the host untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SanitizeRules(serde_json::Value);

impl SanitizeRules {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }
}

/// Style classes for the toolbar button, as supplied by the host.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconClasses {
    pub base: String,
    pub active: String,
}

impl IconClasses {
    pub fn new(base: impl Into<String>, active: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            active: active.into(),
        }
    }
}

/// What the host editor provides when instantiating a tool.
#[derive(Clone, Debug)]
pub struct ToolApi<N> {
    pub styles: IconClasses,
    /// Editable root bounding wrapper lookups.
    pub root: N,
}

#[derive(Debug)]
struct ToolDescriptor {
    tag: MarkupTag,
    toolbox_icon: SmolStr,
    sanitize: Option<SanitizeRules>,
    shortcut: Option<Shortcut>,
}

/// A validated tool definition, shared by every instance created from it.
#[derive(Clone, Debug)]
pub struct ToggleComponent {
    descriptor: Arc<ToolDescriptor>,
}

/// Validate a configuration and produce the component for it.
///
/// Fails on an unusable tag name or a shortcut that does not parse.
pub fn build_toggle_component(config: ToolConfig) -> Result<ToggleComponent, ToggleError> {
    let tag = MarkupTag::new(&config.tag_name)?;
    if let Some(shortcut) = &config.shortcut {
        shortcut.parse(false)?;
    }
    tracing::debug!(
        target: "weaver::inline_tool",
        tag = %tag,
        shortcut = config.shortcut.as_ref().map(Shortcut::as_str),
        "built inline tool component"
    );
    Ok(ToggleComponent {
        descriptor: Arc::new(ToolDescriptor {
            tag,
            toolbox_icon: SmolStr::new(config.toolbox_icon),
            sanitize: config.sanitize,
            shortcut: config.shortcut,
        }),
    })
}

impl ToggleComponent {
    /// Tools built here always act on inline selections.
    pub const IS_INLINE: bool = true;

    pub fn is_inline(&self) -> bool {
        Self::IS_INLINE
    }

    pub fn tag(&self) -> &MarkupTag {
        &self.descriptor.tag
    }

    pub fn toolbox_icon(&self) -> &str {
        &self.descriptor.toolbox_icon
    }

    pub fn sanitize(&self) -> Option<&SanitizeRules> {
        self.descriptor.sanitize.as_ref()
    }

    pub fn shortcut(&self) -> Option<&Shortcut> {
        self.descriptor.shortcut.as_ref()
    }

    /// Create a tool instance bound to a host editor.
    pub fn instantiate<N>(&self, api: ToolApi<N>) -> GenericInlineTool<N>
    where
        N: Clone + PartialEq + std::fmt::Debug,
    {
        GenericInlineTool {
            component: self.clone(),
            toggler: SelectionToggler::new(self.descriptor.tag.clone(), api.root),
            classes: api.styles,
            button: None,
        }
    }
}

/// The shape a host editor expects from an inline tool.
pub trait InlineTool<D: EditableDom> {
    /// Create a fresh toolbar button.
    fn render(&mut self) -> &ToolButton;

    /// Wrap or unwrap the given range.
    fn surround(
        &mut self,
        dom: &mut D,
        range: Option<&D::Range>,
        selection: &mut ActiveSelection<D::Range>,
    ) -> Result<ToggleOutcome, ToggleError>;

    /// Whether the selection is inside the tool's tag. Updates the button's
    /// active class to match.
    fn check_state(&mut self, dom: &D, selection: &ActiveSelection<D::Range>) -> bool;

    fn toolbox_icon(&self) -> &str;

    fn sanitize(&self) -> Option<&SanitizeRules>;

    fn shortcut(&self) -> Option<&Shortcut>;
}

/// Inline tool instance produced by [`ToggleComponent::instantiate`].
#[derive(Clone, Debug)]
pub struct GenericInlineTool<N> {
    component: ToggleComponent,
    toggler: SelectionToggler<N>,
    classes: IconClasses,
    button: Option<ToolButton>,
}

impl<N> GenericInlineTool<N> {
    pub fn component(&self) -> &ToggleComponent {
        &self.component
    }

    pub fn toggler(&self) -> &SelectionToggler<N> {
        &self.toggler
    }

    pub fn icon_classes(&self) -> &IconClasses {
        &self.classes
    }

    /// The most recently rendered button.
    pub fn button(&self) -> Option<&ToolButton> {
        self.button.as_ref()
    }
}

impl<D> InlineTool<D> for GenericInlineTool<D::Node>
where
    D: EditableDom,
{
    fn render(&mut self) -> &ToolButton {
        let button = ToolButton::new(&self.classes.base, self.component.toolbox_icon());
        self.button.insert(button)
    }

    fn surround(
        &mut self,
        dom: &mut D,
        range: Option<&D::Range>,
        selection: &mut ActiveSelection<D::Range>,
    ) -> Result<ToggleOutcome, ToggleError> {
        self.toggler.toggle(dom, range, selection)
    }

    fn check_state(&mut self, dom: &D, selection: &ActiveSelection<D::Range>) -> bool {
        let active = self.toggler.is_selection_active(dom, selection);
        if let Some(button) = &mut self.button {
            button.set_active(&self.classes.active, active);
        }
        active
    }

    fn toolbox_icon(&self) -> &str {
        self.component.toolbox_icon()
    }

    fn sanitize(&self) -> Option<&SanitizeRules> {
        self.component.sanitize()
    }

    fn shortcut(&self) -> Option<&Shortcut> {
        self.component.shortcut()
    }
}

/// Model of the toolbar button a tool renders.
///
/// Always a `type="button"` element whose inner HTML is the toolbox icon.
/// Hosts materialize it into their own widget tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolButton {
    classes: Vec<String>,
    inner_html: String,
}

impl ToolButton {
    pub const BUTTON_TYPE: &'static str = "button";

    pub fn new(base_class: &str, icon: &str) -> Self {
        let mut button = Self {
            classes: Vec::new(),
            inner_html: icon.to_string(),
        };
        button.add_class(base_class);
        button
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn inner_html(&self) -> &str {
        &self.inner_html
    }

    /// Add or remove `active_class`, like `classList.toggle(class, force)`.
    pub fn set_active(&mut self, active_class: &str, active: bool) {
        if active {
            self.add_class(active_class);
        } else {
            self.classes.retain(|c| c != active_class);
        }
    }

    fn add_class(&mut self, class: &str) {
        if !class.is_empty() && !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    /// Serialize as a `<button>` element. The icon is emitted as-is.
    pub fn to_markup(&self) -> String {
        let mut out = format!("<button type=\"{}\" class=\"", Self::BUTTON_TYPE);
        // fmt::Write for String never fails.
        let _ = escape_html(FmtWriter(&mut out), &self.classes.join(" "));
        out.push_str("\">");
        out.push_str(&self.inner_html);
        out.push_str("</button>");
        out
    }
}
