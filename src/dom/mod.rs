//! # Page Model
//!
//! A small arena DOM: the reconciler's view of the page. It knows nothing
//! about endpoints or gestures.
//!
//! ```text
//! Document
//! ├── nodes: Vec<Node>      // arena, indexed by NodeId
//! │   ├── Element           // tag, attributes, value, disabled, display
//! │   └── Text              // character data
//! └── root: NodeId          // the <body> everything hangs off
//! ```
//!
//! Nodes are never freed. Detached nodes (replaced children, removed
//! subtrees) stay in the arena but are unreachable from the root, which
//! matches what a script holding a stale element reference would observe.

pub mod fixture;
pub mod selector;

use std::collections::BTreeMap;
use std::fmt;

pub use fixture::{ElementSpec, NodeSpec};
pub use selector::Selector;

/// Handle to a node inside one `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug)]
pub enum DomError {
    /// A selector string could not be parsed.
    Selector(String),
    /// A selector matched nothing where an element was required.
    NoMatch(String),
}

impl fmt::Display for DomError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomError::Selector(msg) => write!(f, "invalid selector: {msg}"),
            DomError::NoMatch(sel) => write!(f, "no element matches {sel}"),
        }
    }
}

impl std::error::Error for DomError {}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub tag: String,
    /// Content attributes, including `id`, `class` and `data-*`.
    pub attributes: BTreeMap<String, String>,
    /// The `value` property of form controls.
    pub value: Option<String>,
    pub disabled: bool,
    /// Inline `style.display`. `None` means never set.
    pub display: Option<String>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.attributes.get("id").map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attributes
            .get("class")
            .map(String::as_str)
            .unwrap_or("")
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }
}

#[derive(Debug, Clone)]
enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document with a `<body>` root.
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.create_element("body");
        doc
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    // ========================================================================
    // Construction
    // ========================================================================

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        id
    }

    /// Appends `child` as the last child of `parent`, detaching it from any
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || !self.contains_node(parent) || !self.contains_node(child) {
            return;
        }
        self.detach(child);
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.0].parent.take() {
            self.nodes[parent.0].children.retain(|c| *c != node);
        }
    }

    fn contains_node(&self, node: NodeId) -> bool {
        node.0 < self.nodes.len()
    }

    // ========================================================================
    // Element access
    // ========================================================================

    pub fn element(&self, node: NodeId) -> Option<&Element> {
        match self.nodes.get(node.0).map(|n| &n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match self.nodes.get_mut(node.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.0).and_then(|n| n.parent)
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attr(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.attributes.insert(name.to_string(), value.to_string());
        }
    }

    /// Reads `data-<name>`, the `dataset` view of an element.
    pub fn data(&self, node: NodeId, name: &str) -> Option<&str> {
        self.attr(node, &format!("data-{name}"))
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.element(node).is_some_and(|el| el.has_class(class))
    }

    pub fn add_class(&mut self, node: NodeId, class: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        if el.has_class(class) {
            return;
        }
        let joined = match el.attributes.get("class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {class}", existing.trim()),
            _ => class.to_string(),
        };
        el.attributes.insert("class".to_string(), joined);
    }

    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        let Some(el) = self.element_mut(node) else {
            return;
        };
        if !el.has_class(class) {
            return;
        }
        let kept: Vec<&str> = el.classes().filter(|c| *c != class).collect();
        let joined = kept.join(" ");
        el.attributes.insert("class".to_string(), joined);
    }

    pub fn is_disabled(&self, node: NodeId) -> bool {
        self.element(node).is_some_and(|el| el.disabled)
    }

    pub fn set_disabled(&mut self, node: NodeId, disabled: bool) {
        if let Some(el) = self.element_mut(node) {
            el.disabled = disabled;
        }
    }

    pub fn value(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|el| el.value.as_deref())
    }

    pub fn set_value(&mut self, node: NodeId, value: &str) {
        if let Some(el) = self.element_mut(node) {
            el.value = Some(value.to_string());
        }
    }

    pub fn display(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|el| el.display.as_deref())
    }

    pub fn set_display(&mut self, node: NodeId, display: &str) {
        if let Some(el) = self.element_mut(node) {
            el.display = Some(display.to_string());
        }
    }

    /// True unless the inline style hides the element.
    pub fn is_displayed(&self, node: NodeId) -> bool {
        self.display(node) != Some("none")
    }

    // ========================================================================
    // Text
    // ========================================================================

    /// Concatenated character data of the node and all its descendants.
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        match &n.kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(_) => {
                for child in &n.children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replaces all children of `node` with a single text node.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) {
        if !self.contains_node(node) {
            return;
        }
        if let NodeKind::Text(t) = &mut self.nodes[node.0].kind {
            *t = text.to_string();
            return;
        }
        for child in std::mem::take(&mut self.nodes[node.0].children) {
            self.nodes[child.0].parent = None;
        }
        if !text.is_empty() {
            let text_node = self.create_text(text);
            self.append_child(node, text_node);
        }
    }

    // ========================================================================
    // Traversal and queries
    // ========================================================================

    /// All descendants of `scope` in document order, excluding `scope`.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            out.push(node);
            stack.extend(self.children(node).iter().rev().copied());
        }
        out
    }

    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        self.element(node).is_some_and(|el| selector.matches(el))
    }

    /// Nearest inclusive ancestor of `node` matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = Some(node);
        while let Some(n) = current {
            if self.matches(n, selector) {
                return Some(n);
            }
            current = self.parent(n);
        }
        None
    }

    /// First descendant of `scope` matching `selector`.
    pub fn query(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|n| self.matches(*n, selector))
    }

    pub fn query_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|n| self.matches(*n, selector))
            .collect()
    }

    /// Parses `selector` and queries the whole document for it.
    pub fn select(&self, selector: &str) -> Result<NodeId, DomError> {
        let parsed: Selector = selector.parse()?;
        self.query_including_root(&parsed)
            .ok_or_else(|| DomError::NoMatch(selector.to_string()))
    }

    fn query_including_root(&self, selector: &Selector) -> Option<NodeId> {
        if self.matches(self.root, selector) {
            return Some(self.root);
        }
        self.query(self.root, selector)
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.query_including_root(&Selector::id(id))
    }

    /// Named, enabled form controls under `form` as `(name, value)` pairs,
    /// in document order.
    pub fn form_fields(&self, form: NodeId) -> Vec<(String, String)> {
        self.descendants(form)
            .into_iter()
            .filter_map(|n| self.element(n))
            .filter(|el| matches!(el.tag.as_str(), "input" | "textarea" | "select"))
            .filter(|el| !el.disabled)
            .filter(|el| !matches!(el.attributes.get("type").map(String::as_str), Some("submit" | "button")))
            .filter_map(|el| {
                let name = el.attributes.get("name")?;
                Some((name.clone(), el.value.clone().unwrap_or_default()))
            })
            .collect()
    }

    // ========================================================================
    // Serialisation
    // ========================================================================

    /// Markup for `node` and its subtree. Text and attribute values are
    /// escaped.
    pub fn outer_html(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_html(node, &mut out);
        out
    }

    fn write_html(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.nodes.get(node.0) else {
            return;
        };
        let el = match &n.kind {
            NodeKind::Text(t) => {
                out.push_str(&escape(t));
                return;
            }
            NodeKind::Element(el) => el,
        };
        out.push('<');
        out.push_str(&el.tag);
        for (name, value) in &el.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape(value)));
        }
        if let Some(value) = &el.value {
            out.push_str(&format!(" value=\"{}\"", escape(value)));
        }
        if let Some(display) = &el.display {
            out.push_str(&format!(" style=\"display: {}\"", escape(display)));
        }
        if el.disabled {
            out.push_str(" disabled");
        }
        out.push('>');
        if is_void(&el.tag) {
            return;
        }
        for child in &n.children {
            self.write_html(*child, out);
        }
        out.push_str("</");
        out.push_str(&el.tag);
        out.push('>');
    }
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "img" | "br" | "hr" | "meta" | "link")
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
