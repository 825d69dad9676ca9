use eval_gauge::{DomMutation, GaugeDom, Selector};
use wasm_bindgen::{JsCast, JsValue};

use crate::web_document::WebDocument;
use crate::web_element_ext::WebElementExt;
use crate::web_error_handling::JsResult;
use crate::web_iterators::IntoNodeListIterator;


// The live document. The two observers are created by the caller, because their callbacks need
// to reach the synchronizer that will own this object.
pub struct WebGaugeDom {
    document: WebDocument,
    structure_observer: web_sys::MutationObserver,
    content_observer: web_sys::MutationObserver,
}

impl WebGaugeDom {
    pub fn new(
        document: WebDocument, structure_observer: web_sys::MutationObserver,
        content_observer: web_sys::MutationObserver,
    ) -> Self {
        WebGaugeDom {
            document,
            structure_observer,
            content_observer,
        }
    }
}

impl GaugeDom for WebGaugeDom {
    type Element = web_sys::Element;
    type Error = JsValue;

    fn query_all(&self, selector: &Selector) -> JsResult<Vec<web_sys::Element>> {
        Ok(self.document.query_selector_all(&selector.css())?.elements().collect())
    }

    fn query_within(
        &self, root: &web_sys::Element, selector: &Selector,
    ) -> JsResult<Option<web_sys::Element>> {
        root.query_selector(&selector.css())
    }

    fn matches(&self, element: &web_sys::Element, selector: &Selector) -> JsResult<bool> {
        element.matches(&selector.css())
    }

    fn parent(&self, element: &web_sys::Element) -> Option<web_sys::Element> {
        element.parent_element()
    }

    fn has_class(&self, element: &web_sys::Element, class: &str) -> bool {
        element.has_class(class)
    }

    fn inner_markup(&self, element: &web_sys::Element) -> Option<String> {
        Some(element.inner_html())
    }

    fn text_content(&self, element: &web_sys::Element) -> Option<String> { element.text_content() }

    fn create_element(&self, id: &str) -> JsResult<web_sys::Element> {
        Ok(self.document.create_element("div")?.with_id(id))
    }

    fn append_child(&self, parent: &web_sys::Element, child: &web_sys::Element) -> JsResult<()> {
        parent.append_child(child)?;
        Ok(())
    }

    // Text, not markup: the pearl is foreign content and is mirrored through its text.
    fn set_text(&self, element: &web_sys::Element, text: &str) -> JsResult<()> {
        element.set_text_content(Some(text));
        Ok(())
    }

    fn set_style(&self, element: &web_sys::Element, property: &str, value: &str) -> JsResult<()> {
        element.set_style_property(property, value)
    }

    fn click(&self, selector: &Selector) -> JsResult<bool> {
        Ok(self.document.query_selector(&selector.css())?.is_some_and(|e| e.click_if_html()))
    }

    fn watch_structure(&self) -> JsResult<()> {
        let options = web_sys::MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        options.set_attributes(true);
        options.set_attribute_filter(&js_sys::Array::of1(&JsValue::from_str("class")));
        let body = self.document.body()?;
        self.structure_observer.observe_with_options(&body, &options)
    }

    // Observing a node again only replaces its options, so repeated calls are fine.
    fn watch_content(&self, element: &web_sys::Element) -> JsResult<()> {
        let options = web_sys::MutationObserverInit::new();
        options.set_child_list(true);
        options.set_character_data(true);
        options.set_subtree(true);
        self.content_observer.observe_with_options(element, &options)
    }
}

pub fn mutations_from_records(records: &js_sys::Array) -> Vec<DomMutation<web_sys::Element>> {
    records
        .iter()
        .filter_map(|record| record.dyn_into::<web_sys::MutationRecord>().ok())
        .filter_map(|record| mutation_from_record(&record))
        .collect()
}

fn mutation_from_record(
    record: &web_sys::MutationRecord,
) -> Option<DomMutation<web_sys::Element>> {
    match record.type_().as_str() {
        "childList" => Some(DomMutation::ChildList {
            added: record.added_nodes().into_iterator().elements().collect(),
            removed: record.removed_nodes().into_iterator().elements().collect(),
        }),
        "attributes" => {
            let target = record.target()?.dyn_into::<web_sys::Element>().ok()?;
            Some(DomMutation::Attributes { target, attribute_name: record.attribute_name() })
        }
        // The target is a text node; report the element holding it.
        "characterData" => {
            let target = record.target()?.parent_element()?;
            Some(DomMutation::CharacterData { target })
        }
        _ => None,
    }
}
