use log::error;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;

use crate::rust_error;
use crate::web_error_handling::{JsResult, describe_js_error};


pub trait WebElementExt {
    fn with_id(self, value: &str) -> web_sys::Element;
    fn has_class(&self, class: &str) -> bool;
    fn set_style_property(&self, property: &str, value: &str) -> JsResult<()>;
    // Returns false if the element cannot be clicked (e.g. it's an SVG element).
    fn click_if_html(&self) -> bool;
}

impl WebElementExt for web_sys::Element {
    fn with_id(self, value: &str) -> web_sys::Element {
        self.set_id(value);
        self
    }

    fn has_class(&self, class: &str) -> bool { self.class_list().contains(class) }

    fn set_style_property(&self, property: &str, value: &str) -> JsResult<()> {
        let element = self
            .dyn_ref::<web_sys::HtmlElement>()
            .ok_or_else(|| rust_error!("Element <{}> has no inline style", self.tag_name()))?;
        element.style().set_property(property, value)
    }

    fn click_if_html(&self) -> bool {
        match self.dyn_ref::<web_sys::HtmlElement>() {
            Some(element) => {
                element.click();
                true
            }
            None => false,
        }
    }
}

pub trait EventTargetExt {
    // The listener is never removed and errors it returns are logged.
    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()>;
}

impl EventTargetExt for web_sys::EventTarget {
    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, mut listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()> {
        let event_type_copy = event_type.to_owned();
        let closure = Closure::<dyn FnMut(E)>::new(move |event: E| {
            if let Err(err) = listener(event) {
                error!("\"{}\" listener failed: {}", event_type_copy, describe_js_error(&err));
            }
        });
        self.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }
}
