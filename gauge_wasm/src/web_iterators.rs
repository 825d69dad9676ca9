use wasm_bindgen::JsCast;


pub struct NodeListIterator {
    collection: web_sys::NodeList,
    index: u32,
}

// Cannot implement `IntoIterator` for `NodeList` because both the trait and the struct are
// foreign.
pub trait IntoNodeListIterator {
    fn into_iterator(self) -> NodeListIterator;
}

impl From<web_sys::NodeList> for NodeListIterator {
    fn from(collection: web_sys::NodeList) -> Self { Self { collection, index: 0 } }
}

impl IntoNodeListIterator for web_sys::NodeList {
    fn into_iterator(self) -> NodeListIterator { self.into() }
}

impl Iterator for NodeListIterator {
    type Item = web_sys::Node;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.collection.item(self.index);
        self.index += 1;
        item
    }
}

impl NodeListIterator {
    // Text and comment nodes are skipped.
    pub fn elements(self) -> impl Iterator<Item = web_sys::Element> {
        self.filter_map(|node| node.dyn_into::<web_sys::Element>().ok())
    }
}
