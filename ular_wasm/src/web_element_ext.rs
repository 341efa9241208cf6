use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::convert::FromWasmAbi;

use crate::rust_error;
use crate::web_document::web_document;
use crate::web_error_handling::JsResult;


pub trait WebElementExt {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element>;
    fn with_classes(self, classes: impl IntoIterator<Item = &str>) -> JsResult<web_sys::Element>;
    fn with_text_content(self, text: &str) -> web_sys::Element;

    // Panels are shown and hidden via inline `display`, so the page stylesheet doesn't need to
    // know about them.
    fn set_displayed(&self, displayed: bool) -> JsResult<()>;
    fn set_style(&self, property: &str, value: &str) -> JsResult<()>;

    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()>;

    fn remove_all_children(&self);
    fn append_new_element(&self, local_name: &str) -> JsResult<web_sys::Element>;
}

impl WebElementExt for web_sys::Element {
    fn with_attribute(self, name: &str, value: &str) -> JsResult<web_sys::Element> {
        self.set_attribute(name, value)?;
        Ok(self)
    }

    fn with_classes(self, classes: impl IntoIterator<Item = &str>) -> JsResult<web_sys::Element> {
        for class in classes {
            self.class_list().add_1(class)?;
        }
        Ok(self)
    }

    fn with_text_content(self, text: &str) -> web_sys::Element {
        self.set_text_content(Some(text));
        self
    }

    fn set_displayed(&self, displayed: bool) -> JsResult<()> {
        self.set_style("display", if displayed { "block" } else { "none" })
    }

    fn set_style(&self, property: &str, value: &str) -> JsResult<()> {
        let element = self
            .dyn_ref::<web_sys::HtmlElement>()
            .ok_or_else(|| rust_error!("Element \"{}\" cannot be styled", self.id()))?;
        element.style().set_property(property, value)
    }

    // Improvement potential: Don't leak, let JS GC handle it. Fine for listeners installed once
    // per page load, not for anything added repeatedly.
    fn add_event_listener_and_forget<E: FromWasmAbi + 'static>(
        &self, event_type: &str, listener: impl FnMut(E) -> JsResult<()> + 'static,
    ) -> JsResult<()> {
        let closure = Closure::new(listener);
        self.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn remove_all_children(&self) { self.replace_children_with_node_0() }

    // Improvement potential. Check if fetching `web_document()` every time slows down functions
    // that create a lot of elements.
    fn append_new_element(&self, local_name: &str) -> JsResult<web_sys::Element> {
        let node = web_document()?.create_element(local_name)?;
        self.append_child(&node)?;
        Ok(node)
    }
}
