//! In-memory document model
//!
//! An arena of elements rooted at `<html>`. Removing an element only detaches
//! it, so stale `NodeId`s held by timers stay valid and can be checked with
//! [`Document::is_attached`]. A detached subtree goes back to the arena only
//! through [`Document::release`], once its owner knows nothing refers to it.

mod rect;
mod selector;

pub use rect::Rect;
pub use selector::Selector;

use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Handle to an element in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

/// A single element: tag, classes, attributes, inline style, text and layout box
#[derive(Debug, Clone)]
pub struct Element {
    pub tag: String,
    classes: Vec<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    /// Text directly inside this element (children carry their own)
    text: String,
    /// Layout box in document coordinates
    pub rect: Rect,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            classes: Vec::new(),
            attributes: BTreeMap::new(),
            style: BTreeMap::new(),
            text: String::new(),
            rect: Rect::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    pub fn add_class(&mut self, class: &str) {
        if !self.has_class(class) {
            self.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Toggle a class, returning whether it is present afterwards
    pub fn toggle_class(&mut self, class: &str) -> bool {
        if self.has_class(class) {
            self.remove_class(class);
            false
        } else {
            self.add_class(class);
            true
        }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Space-joined class list, as `className` reports it
    pub fn class_name(&self) -> String {
        self.classes.join(" ")
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.remove(name)
    }

    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        self.style.insert(property.to_string(), value.into());
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

/// Serializable view of an attached subtree
#[derive(Debug, Clone, Serialize)]
pub struct NodeSnapshot {
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub text: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnapshot>,
}

/// The page document
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    /// Released slots, reused by `create_element`
    free: Vec<NodeId>,
    root: NodeId,
    head: NodeId,
    body: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty `<html><head></head><body></body></html>` document
    pub fn new() -> Self {
        let mut doc = Self {
            nodes: vec![Element::new("html")],
            free: Vec::new(),
            root: NodeId(0),
            head: NodeId(0),
            body: NodeId(0),
        };
        doc.head = doc.create_element("head");
        doc.body = doc.create_element("body");
        doc.append_child(doc.root, doc.head);
        doc.append_child(doc.root, doc.body);
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn head(&self) -> NodeId {
        self.head
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        if let Some(node) = self.free.pop() {
            self.nodes[node.0] = Element::new(tag);
            return node;
        }
        self.nodes.push(Element::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Return a detached subtree's slots to the arena for reuse.
    ///
    /// The caller must hold the only remaining references to `node` and its
    /// descendants: their ids will name new elements afterwards. Attached
    /// nodes are left alone.
    pub fn release(&mut self, node: NodeId) {
        if node == self.root || self.parent(node).is_some() {
            return;
        }
        let mut released = self.descendants(node);
        released.push(node);
        for n in released {
            self.nodes[n.0] = Element::new("");
            self.free.push(n);
        }
    }

    /// Elements currently allocated, attached or not
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    pub fn element(&self, node: NodeId) -> &Element {
        &self.nodes[node.0]
    }

    pub fn element_mut(&mut self, node: NodeId) -> &mut Element {
        &mut self.nodes[node.0]
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.element(node).parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.element(node).children
    }

    /// Append `child` to `parent`, moving it out of its current parent first
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.remove(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    /// Detach an element from its parent. Detached elements are ignored by queries.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|&c| c != node);
        }
    }

    /// Iterate the ancestors of `node`, nearest first
    pub fn ancestors(&self, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(node), move |&n| self.parent(n))
    }

    /// Whether the element is reachable from the document root
    pub fn is_attached(&self, node: NodeId) -> bool {
        node == self.root || self.ancestors(node).any(|a| a == self.root)
    }

    /// `node == ancestor` or `ancestor` is one of its ancestors
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        node == ancestor || self.ancestors(node).any(|a| a == ancestor)
    }

    /// Pre-order descendants of `node`, excluding `node` itself
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).iter().rev().copied().collect();
        while let Some(n) = stack.pop() {
            out.push(n);
            stack.extend(self.children(n).iter().rev().copied());
        }
        out
    }

    /// All attached elements matching `selector`, in document order
    pub fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|&n| selector.matches(self, n))
            .collect()
    }

    /// First attached element matching `selector`
    pub fn query(&self, selector: &Selector) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// Parse `selector` and return every match
    pub fn select(&self, selector: &str) -> Result<Vec<NodeId>> {
        Ok(self.query_all(&Selector::parse(selector)?))
    }

    /// Parse `selector` and return the first match
    pub fn select_one(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query(&Selector::parse(selector)?))
    }

    /// First descendant of `node` matching `selector`
    pub fn find_within(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(node)
            .into_iter()
            .find(|&n| selector.matches(self, n))
    }

    /// `node` itself or its nearest ancestor matching `selector`
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|&n| selector.matches(self, n))
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|&n| self.element(n).attribute("id") == Some(id))
    }

    /// Concatenated text of the element and all its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut text = self.element(node).text().to_string();
        for n in self.descendants(node) {
            text.push_str(self.element(n).text());
        }
        text
    }

    /// Bottom edge of the lowest attached element
    pub fn scroll_height(&self) -> f64 {
        self.descendants(self.root)
            .into_iter()
            .map(|n| self.element(n).rect.bottom())
            .fold(0.0, f64::max)
    }

    /// Snapshot of the attached tree for serialization
    pub fn snapshot(&self) -> NodeSnapshot {
        self.snapshot_node(self.root)
    }

    fn snapshot_node(&self, node: NodeId) -> NodeSnapshot {
        let el = self.element(node);
        NodeSnapshot {
            tag: el.tag.clone(),
            classes: el.classes.clone(),
            attributes: el.attributes.clone(),
            style: el.style.clone(),
            text: el.text.clone(),
            children: el
                .children
                .iter()
                .map(|&c| self.snapshot_node(c))
                .collect(),
        }
    }
}
