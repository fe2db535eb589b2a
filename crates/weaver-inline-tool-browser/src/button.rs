//! Materialize `ToolButton` models as `<button>` elements.

use wasm_bindgen::JsCast;
use web_sys::HtmlButtonElement;
use weaver_inline_tool::{HostError, ToolButton};

use crate::dom::host_error;

/// Create a `<button>` element matching the model.
pub fn render_button(
    document: &web_sys::Document,
    model: &ToolButton,
) -> Result<HtmlButtonElement, HostError> {
    let button = document
        .create_element("button")
        .map_err(host_error)?
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| HostError::Other("created element is not a button".into()))?;
    button.set_type(ToolButton::BUTTON_TYPE);
    button.set_inner_html(model.inner_html());
    sync_button(&button, model)?;
    Ok(button)
}

/// Bring an existing button's classes in line with the model.
pub fn sync_button(button: &HtmlButtonElement, model: &ToolButton) -> Result<(), HostError> {
    let class_list = button.class_list();
    for index in (0..class_list.length()).rev() {
        if let Some(class) = class_list.item(index) {
            if !model.has_class(&class) {
                class_list.remove_1(&class).map_err(host_error)?;
            }
        }
    }
    for class in model.classes() {
        class_list.add_1(class).map_err(host_error)?;
    }
    Ok(())
}
