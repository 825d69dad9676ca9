// Test utilities shared by unit tests and integration tests in the "tests" folder.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::convert::Infallible;

use itertools::Itertools;

use crate::config::Selector;
use crate::dom::{DomMutation, GaugeDom};


#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

#[derive(Clone, Debug, Default)]
struct MemoryNode {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    text: String,
    styles: BTreeMap<String, String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

// A tiny element tree standing in for the browser document.
//
// Like `MutationObserver`, it queues notifications for every edit once the corresponding watch is
// installed; tests hand them over to the synchronizer with `take_structure_batch` and
// `take_content_notification`.
pub struct MemoryDom {
    nodes: RefCell<Vec<MemoryNode>>,
    structure_watched: Cell<bool>,
    content_watched: RefCell<Vec<NodeId>>,
    structure_queue: RefCell<Vec<DomMutation<NodeId>>>,
    content_pending: Cell<bool>,
    clicks: RefCell<Vec<NodeId>>,
}

impl MemoryDom {
    pub fn new() -> Self {
        let body = MemoryNode { tag: "body".to_owned(), ..MemoryNode::default() };
        MemoryDom {
            nodes: RefCell::new(vec![body]),
            structure_watched: Cell::new(false),
            content_watched: RefCell::new(Vec::new()),
            structure_queue: RefCell::new(Vec::new()),
            content_pending: Cell::new(false),
            clicks: RefCell::new(Vec::new()),
        }
    }

    pub fn body(&self) -> NodeId { NodeId(0) }

    pub fn new_element(&self, tag: &str, classes: &[&str]) -> NodeId {
        let mut nodes = self.nodes.borrow_mut();
        nodes.push(MemoryNode {
            tag: tag.to_owned(),
            classes: classes.iter().map(|&c| c.to_owned()).collect(),
            ..MemoryNode::default()
        });
        NodeId(nodes.len() - 1)
    }

    // Links silently. Use on a detached element from `new_element`, then `append` the whole
    // subtree in one notification.
    pub fn new_child(&self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let child = self.new_element(tag, classes);
        self.link(parent, child);
        child
    }

    pub fn append(&self, parent: NodeId, child: NodeId) {
        self.link(parent, child);
        self.record_structure(DomMutation::ChildList { added: vec![child], removed: vec![] });
        self.record_content(parent);
    }

    pub fn append_new(&self, parent: NodeId, tag: &str, classes: &[&str]) -> NodeId {
        let child = self.new_element(tag, classes);
        self.append(parent, child);
        child
    }

    pub fn remove(&self, node: NodeId) {
        let Some(parent) = self.node(node).parent else {
            return;
        };
        {
            let mut nodes = self.nodes.borrow_mut();
            nodes[parent.0].children.retain(|&c| c != node);
            nodes[node.0].parent = None;
        }
        self.record_structure(DomMutation::ChildList { added: vec![], removed: vec![node] });
        self.record_content(parent);
    }

    pub fn set_classes(&self, node: NodeId, classes: &[&str]) {
        self.nodes.borrow_mut()[node.0].classes = classes.iter().map(|&c| c.to_owned()).collect();
        self.record_structure(DomMutation::Attributes {
            target: node,
            attribute_name: Some("class".to_owned()),
        });
    }

    pub fn set_attribute(&self, node: NodeId, name: &str, value: &str) {
        self.nodes.borrow_mut()[node.0].attributes.insert(name.to_owned(), value.to_owned());
        self.record_structure(DomMutation::Attributes {
            target: node,
            attribute_name: Some(name.to_owned()),
        });
    }

    // What the host page does to a pearl: replaces its markup. Tags and the `&lt;`, `&gt;` and
    // `&amp;` entities are understood when the text is read back.
    pub fn set_content(&self, node: NodeId, content: &str) {
        self.nodes.borrow_mut()[node.0].text = content.to_owned();
        self.record_structure(DomMutation::ChildList { added: vec![], removed: vec![] });
        self.record_content(node);
    }

    pub fn text(&self, node: NodeId) -> String { self.node(node).text }
    pub fn style(&self, node: NodeId, property: &str) -> Option<String> {
        self.node(node).styles.get(property).cloned()
    }
    pub fn element_id(&self, node: NodeId) -> Option<String> { self.node(node).id }
    pub fn class_name(&self, node: NodeId) -> String { self.node(node).classes.iter().join(" ") }
    pub fn children(&self, node: NodeId) -> Vec<NodeId> { self.node(node).children }
    pub fn find_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.body())
            .into_iter()
            .filter(|&n| self.node_matches(n, selector))
            .collect()
    }

    pub fn is_structure_watched(&self) -> bool { self.structure_watched.get() }
    pub fn content_watched(&self) -> Vec<NodeId> { self.content_watched.borrow().clone() }
    pub fn clicks(&self) -> Vec<NodeId> { self.clicks.borrow().clone() }

    pub fn take_structure_batch(&self) -> Vec<DomMutation<NodeId>> {
        self.structure_queue.take()
    }
    pub fn take_content_notification(&self) -> bool { self.content_pending.replace(false) }

    fn node(&self, node: NodeId) -> MemoryNode { self.nodes.borrow()[node.0].clone() }

    fn link(&self, parent: NodeId, child: NodeId) {
        let mut nodes = self.nodes.borrow_mut();
        if let Some(old_parent) = nodes[child.0].parent {
            nodes[old_parent.0].children.retain(|&c| c != child);
        }
        nodes[child.0].parent = Some(parent);
        nodes[parent.0].children.push(child);
    }

    // Pre-order, excluding `root` itself.
    fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut result = Vec::new();
        let mut stack = nodes[root.0].children.iter().rev().copied().collect_vec();
        while let Some(node) = stack.pop() {
            result.push(node);
            stack.extend(nodes[node.0].children.iter().rev().copied());
        }
        result
    }

    fn ancestors_and_self(&self, node: NodeId) -> Vec<NodeId> {
        let nodes = self.nodes.borrow();
        let mut result = vec![node];
        let mut current = node;
        while let Some(parent) = nodes[current.0].parent {
            result.push(parent);
            current = parent;
        }
        result
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.ancestors_and_self(node).last() == Some(&self.body())
    }

    fn node_matches(&self, node: NodeId, selector: &Selector) -> bool {
        let node = self.node(node);
        match selector {
            Selector::Tag(tag) => node.tag == *tag,
            Selector::Class(class) => node.classes.contains(class),
            Selector::Id(id) => node.id.as_ref() == Some(id),
            // Only `tag[attr="value"]` is supported.
            Selector::Css(css) => {
                let Some((tag, rest)) = css.split_once('[') else {
                    return node.tag == *css;
                };
                let Some((attr, value)) = rest.trim_end_matches(']').split_once('=') else {
                    return false;
                };
                node.tag == tag && node.attributes.get(attr).map(String::as_str)
                    == Some(value.trim_matches('"'))
            }
        }
    }

    fn record_structure(&self, mutation: DomMutation<NodeId>) {
        if self.structure_watched.get() {
            self.structure_queue.borrow_mut().push(mutation);
        }
    }

    fn record_content(&self, node: NodeId) {
        let watched = self.content_watched.borrow();
        if self.ancestors_and_self(node).iter().any(|n| watched.contains(n)) {
            self.content_pending.set(true);
        }
    }
}

impl GaugeDom for MemoryDom {
    type Element = NodeId;
    type Error = Infallible;

    fn query_all(&self, selector: &Selector) -> Result<Vec<NodeId>, Infallible> {
        Ok(self.find_all(selector))
    }

    fn query_within(
        &self, root: &NodeId, selector: &Selector,
    ) -> Result<Option<NodeId>, Infallible> {
        Ok(self.descendants(*root).into_iter().find(|&n| self.node_matches(n, selector)))
    }

    fn matches(&self, element: &NodeId, selector: &Selector) -> Result<bool, Infallible> {
        Ok(self.node_matches(*element, selector))
    }

    fn parent(&self, element: &NodeId) -> Option<NodeId> { self.node(*element).parent }

    fn has_class(&self, element: &NodeId, class: &str) -> bool {
        self.node(*element).classes.iter().any(|c| c == class)
    }

    fn inner_markup(&self, element: &NodeId) -> Option<String> { Some(self.text(*element)) }

    fn text_content(&self, element: &NodeId) -> Option<String> {
        Some(markup_to_text(&self.text(*element)))
    }

    fn create_element(&self, id: &str) -> Result<NodeId, Infallible> {
        let node = self.new_element("div", &[]);
        self.nodes.borrow_mut()[node.0].id = Some(id.to_owned());
        Ok(node)
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) -> Result<(), Infallible> {
        self.append(*parent, *child);
        Ok(())
    }

    fn set_text(&self, element: &NodeId, text: &str) -> Result<(), Infallible> {
        self.nodes.borrow_mut()[element.0].text = text.to_owned();
        Ok(())
    }

    fn set_style(&self, element: &NodeId, property: &str, value: &str) -> Result<(), Infallible> {
        self.nodes.borrow_mut()[element.0].styles.insert(property.to_owned(), value.to_owned());
        Ok(())
    }

    fn click(&self, selector: &Selector) -> Result<bool, Infallible> {
        match self.find_all(selector).first() {
            Some(&node) => {
                self.clicks.borrow_mut().push(node);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn watch_structure(&self) -> Result<(), Infallible> {
        self.structure_watched.set(true);
        Ok(())
    }

    fn watch_content(&self, element: &NodeId) -> Result<(), Infallible> {
        let mut watched = self.content_watched.borrow_mut();
        if !watched.contains(element) {
            watched.push(*element);
        }
        Ok(())
    }
}


fn markup_to_text(markup: &str) -> String {
    let mut text = String::new();
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => text.push(ch),
            _ => {}
        }
    }
    text.replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}
