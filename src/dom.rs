use std::fmt;

use crate::config::Selector;


// A change notification, as delivered by the host page. Non-element nodes are dropped before
// they get here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomMutation<E> {
    ChildList { added: Vec<E>, removed: Vec<E> },
    Attributes { target: E, attribute_name: Option<String> },
    CharacterData { target: E },
}

impl<E> DomMutation<E> {
    pub fn is_class_change(&self) -> bool {
        matches!(self, DomMutation::Attributes { attribute_name: Some(name), .. } if name == "class")
    }
}

// The slice of the page the gauge synchronizer needs: element queries and writes plus two change
// feeds. All methods take `&self`: the page is shared with the host and mutated through handles.
pub trait GaugeDom {
    type Element: Clone + PartialEq + fmt::Debug;
    type Error: fmt::Debug;

    // Document order.
    fn query_all(&self, selector: &Selector) -> Result<Vec<Self::Element>, Self::Error>;
    fn query_within(
        &self, root: &Self::Element, selector: &Selector,
    ) -> Result<Option<Self::Element>, Self::Error>;
    fn matches(&self, element: &Self::Element, selector: &Selector) -> Result<bool, Self::Error>;
    fn contains_match(
        &self, element: &Self::Element, selector: &Selector,
    ) -> Result<bool, Self::Error> {
        Ok(self.query_within(element, selector)?.is_some())
    }

    fn parent(&self, element: &Self::Element) -> Option<Self::Element>;
    fn has_class(&self, element: &Self::Element, class: &str) -> bool;
    fn inner_markup(&self, element: &Self::Element) -> Option<String>;
    fn text_content(&self, element: &Self::Element) -> Option<String>;

    // Returns a detached element carrying `id`.
    fn create_element(&self, id: &str) -> Result<Self::Element, Self::Error>;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element)
    -> Result<(), Self::Error>;
    fn set_text(&self, element: &Self::Element, text: &str) -> Result<(), Self::Error>;
    fn set_style(
        &self, element: &Self::Element, property: &str, value: &str,
    ) -> Result<(), Self::Error>;
    // Returns false if nothing matched.
    fn click(&self, selector: &Selector) -> Result<bool, Self::Error>;

    // Subscribes to child list and `class` attribute changes anywhere in the document.
    fn watch_structure(&self) -> Result<(), Self::Error>;
    // Subscribes to child list and character data changes under `element`. Subscribing the same
    // element twice must not duplicate notifications.
    fn watch_content(&self, element: &Self::Element) -> Result<(), Self::Error>;
}
