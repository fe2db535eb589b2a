//! WASM browser tests for weaver-inline-tool-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use weaver_inline_tool_browser::{
    BrowserDom, BrowserInlineTool, EditableDom, HostError, IconClasses, Key, KeydownResult,
    MarkupTag, ToggleOutcome, ToolConfig, build_toggle_component, parse_key, read_selection,
};

fn document() -> web_sys::Document {
    web_sys::window().unwrap().document().unwrap()
}

/// Mount a fresh editor element containing `html`.
fn mount(html: &str) -> web_sys::Element {
    let doc = document();
    let editor = doc.create_element("div").unwrap();
    editor.set_attribute("contenteditable", "true").unwrap();
    editor.set_inner_html(html);
    doc.body().unwrap().append_child(&editor).unwrap();
    editor
}

/// Select the first occurrence of `needle` in the editor's first text node.
fn select_text(editor: &web_sys::Element, needle: &str) {
    let mut node = editor.first_child();
    while let Some(n) = node {
        if n.node_type() == web_sys::Node::TEXT_NODE {
            let text = n.text_content().unwrap_or_default();
            if let Some(byte) = text.find(needle) {
                let start = text[..byte].encode_utf16().count() as u32;
                let end = start + needle.encode_utf16().count() as u32;
                let range = document().create_range().unwrap();
                range.set_start(&n, start).unwrap();
                range.set_end(&n, end).unwrap();
                let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
                selection.remove_all_ranges().unwrap();
                selection.add_range(&range).unwrap();
                return;
            }
        }
        node = n.first_child().or_else(|| n.next_sibling());
    }
    panic!("{needle:?} not found");
}

fn styles() -> IconClasses {
    IconClasses::new("inline-tool", "inline-tool--active")
}

// === Toggle round trip ===

#[wasm_bindgen_test]
fn test_click_wraps_and_unwraps() {
    let editor = mount("<p>foo bar</p>");
    let component = build_toggle_component(ToolConfig::new("i", "<b>I</b>")).unwrap();
    let mut tool = BrowserInlineTool::new(&component, editor.clone(), styles()).unwrap();
    let button = tool.render().unwrap();
    assert_eq!(button.type_(), "button");
    assert_eq!(button.inner_html(), "<b>I</b>");

    select_text(&editor, "bar");
    assert_eq!(tool.on_click().unwrap(), ToggleOutcome::Wrapped);
    assert_eq!(editor.inner_html(), "<p>foo <i>bar</i></p>");
    assert!(button.class_list().contains("inline-tool--active"));

    let selection = read_selection().unwrap();
    let range = selection.range().unwrap();
    assert_eq!(String::from(range.to_string()), "bar");

    assert_eq!(tool.on_click().unwrap(), ToggleOutcome::Unwrapped);
    assert_eq!(editor.inner_html(), "<p>foo bar</p>");
    assert!(!button.class_list().contains("inline-tool--active"));
    editor.remove();
}

#[wasm_bindgen_test]
fn test_selection_outside_editor_is_ignored() {
    let editor = mount("<p>inside</p>");
    let outside = mount("<p>outside</p>");
    let component = build_toggle_component(ToolConfig::new("mark", "M")).unwrap();
    let mut tool = BrowserInlineTool::new(&component, editor.clone(), styles()).unwrap();

    select_text(&outside, "outside");
    assert_eq!(tool.on_click().unwrap(), ToggleOutcome::NoSelection);
    assert_eq!(outside.inner_html(), "<p>outside</p>");
    editor.remove();
    outside.remove();
}

#[wasm_bindgen_test]
fn test_selection_leaving_editor_is_ignored() {
    let editor = mount("<p>inside</p>");
    let outside = mount("<p>outside</p>");
    let component = build_toggle_component(ToolConfig::new("mark", "M")).unwrap();
    let mut tool = BrowserInlineTool::new(&component, editor.clone(), styles()).unwrap();

    let start = editor.first_child().unwrap().first_child().unwrap();
    let end = outside.first_child().unwrap().first_child().unwrap();
    let range = document().create_range().unwrap();
    range.set_start(&start, 2).unwrap();
    range.set_end(&end, 3).unwrap();
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    selection.remove_all_ranges().unwrap();
    selection.add_range(&range).unwrap();

    assert_eq!(tool.on_click().unwrap(), ToggleOutcome::NoSelection);
    assert_eq!(editor.inner_html(), "<p>inside</p>");
    assert_eq!(outside.inner_html(), "<p>outside</p>");
    editor.remove();
    outside.remove();
}

// === Shortcuts ===

#[wasm_bindgen_test]
fn test_shortcut_keydown_toggles() {
    let editor = mount("<p>foo bar</p>");
    let component =
        build_toggle_component(ToolConfig::new("b", "B").with_shortcut("CTRL+B")).unwrap();
    let mut tool = BrowserInlineTool::new(&component, editor.clone(), styles()).unwrap();
    tool.render().unwrap();

    select_text(&editor, "foo");
    let init = web_sys::KeyboardEventInit::new();
    init.set_key("b");
    init.set_ctrl_key(true);
    init.set_cancelable(true);
    let event = web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    assert_eq!(tool.handle_keydown(&event), KeydownResult::Handled);
    assert!(event.default_prevented());
    assert_eq!(editor.inner_html(), "<p><b>foo</b> bar</p>");

    let plain = web_sys::KeyboardEvent::new("keydown").unwrap();
    assert_eq!(tool.handle_keydown(&plain), KeydownResult::NotHandled);
    editor.remove();
}

#[wasm_bindgen_test]
fn test_parse_key() {
    assert_eq!(parse_key("ArrowUp"), Key::ArrowUp);
    assert_eq!(parse_key(" "), Key::Space);
    assert_eq!(parse_key("m"), Key::character("m"));
    assert_eq!(parse_key("Shift"), Key::Unidentified);
}

// === Host error mapping ===

#[wasm_bindgen_test]
fn test_dom_exceptions_map_to_host_errors() {
    let mut dom = BrowserDom::new(document());
    let detached: web_sys::Node = document().create_element("span").unwrap().into();
    let err = dom.remove_node(&detached).unwrap_err();
    assert!(matches!(err, HostError::NotFound(_)));

    let text: web_sys::Node = document().create_text_node("x").unchecked_into();
    let range = dom.range_enclosing(&text).unwrap();
    let tag = MarkupTag::new("em").unwrap();
    let em = dom.create_element(&tag).unwrap();
    // Inserting into a range inside a detached text node has no parent to split into.
    let err = dom.insert_node(&range, &em).unwrap_err();
    assert!(matches!(err, HostError::HierarchyRequest(_)));
}
