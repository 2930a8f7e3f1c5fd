use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Event, EventTarget, HtmlElement, HtmlInputElement};

/// Get element by ID
pub fn get_element_by_id(document: &Document, id: &str) -> Result<Element, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Element not found: {}", id)))
}

/// Get HTML element by ID
pub fn get_html_element_by_id(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlElement: {}", id)))
}

/// Get input element by ID
pub fn get_input_by_id(document: &Document, id: &str) -> Result<HtmlInputElement, JsValue> {
    let element = get_element_by_id(document, id)?;
    element
        .dyn_into::<HtmlInputElement>()
        .map_err(|_| JsValue::from_str(&format!("Element is not HtmlInputElement: {}", id)))
}

/// Attach a listener for the widget's lifetime
pub fn add_listener<F>(target: &EventTarget, event: &str, callback: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
    closure.forget(); // Keep the closure alive
    Ok(())
}

/// Same as [`add_listener`] but in the capture phase, for events that do not bubble
pub fn add_capture_listener<F>(target: &EventTarget, event: &str, callback: F) -> Result<(), JsValue>
where
    F: FnMut(Event) + 'static,
{
    let closure = Closure::wrap(Box::new(callback) as Box<dyn FnMut(Event)>);
    target.add_event_listener_with_callback_and_bool(event, closure.as_ref().unchecked_ref(), true)?;
    closure.forget();
    Ok(())
}

/// Add click listener to element
pub fn add_click_listener<F>(element: &Element, mut callback: F) -> Result<(), JsValue>
where
    F: FnMut() + 'static,
{
    add_listener(element, "click", move |_| callback())
}

/// Index stored in `attr` on the nearest ancestor of the event target matching `selector`
pub fn closest_index(event: &Event, selector: &str, attr: &str) -> Option<usize> {
    let target = event.target()?.dyn_into::<Element>().ok()?;
    let matched = target.closest(selector).ok()??;
    matched.get_attribute(attr)?.parse().ok()
}

/// Show element
pub fn show_element(element: &HtmlElement) {
    let _ = element.style().set_property("display", "block");
}

/// Hide element
pub fn hide_element(element: &HtmlElement) {
    let _ = element.style().set_property("display", "none");
}

/// Scroll element to bottom
pub fn scroll_to_bottom(element: &Element) {
    if let Ok(html_element) = element.clone().dyn_into::<HtmlElement>() {
        html_element.set_scroll_top(html_element.scroll_height());
    }
}
