//! Page fixtures: a JSON element tree that builds a `Document`.
//!
//! ```json
//! { "tag": "article", "attrs": { "class": "post", "data-post-id": "7" },
//!   "children": [ "plain text", { "tag": "span", "text": "hi" } ] }
//! ```

use std::collections::BTreeMap;

use serde::Deserialize;

use super::{Document, NodeId};

/// A node in a fixture: bare strings become text nodes.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum NodeSpec {
    Text(String),
    Element(ElementSpec),
}

#[derive(Deserialize, Debug, Clone)]
pub struct ElementSpec {
    pub tag: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Shorthand for a single leading text child.
    pub text: Option<String>,
    pub value: Option<String>,
    #[serde(default)]
    pub disabled: bool,
    pub display: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
}

impl Document {
    /// Builds a document whose `<body>` children are `nodes`.
    pub fn from_specs(nodes: &[NodeSpec]) -> Self {
        let mut doc = Document::new();
        let root = doc.root();
        for spec in nodes {
            let node = doc.build(spec);
            doc.append_child(root, node);
        }
        doc
    }

    /// Builds a detached subtree from `spec` and returns its top node.
    pub fn build(&mut self, spec: &NodeSpec) -> NodeId {
        match spec {
            NodeSpec::Text(text) => self.create_text(text),
            NodeSpec::Element(el) => self.build_element(el),
        }
    }

    fn build_element(&mut self, spec: &ElementSpec) -> NodeId {
        let node = self.create_element(&spec.tag);
        if let Some(el) = self.element_mut(node) {
            el.attributes = spec.attrs.clone();
            el.value = spec.value.clone();
            el.disabled = spec.disabled;
            el.display = spec.display.clone();
        }
        if let Some(text) = &spec.text {
            let t = self.create_text(text);
            self.append_child(node, t);
        }
        for child in &spec.children {
            let c = self.build(child);
            self.append_child(node, c);
        }
        node
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;

    #[test]
    fn test_fixture_builds_tree() {
        let specs: Vec<NodeSpec> = serde_json::from_value(serde_json::json!([
            { "tag": "div", "attrs": { "id": "comments-7" }, "display": "none", "children": [
                { "tag": "ul", "attrs": { "class": "comment-list" } },
                "loose text"
            ]}
        ]))
        .unwrap();
        let doc = Document::from_specs(&specs);
        let panel = doc.get_element_by_id("comments-7").unwrap();
        assert!(!doc.is_displayed(panel));
        assert!(doc.query(panel, &Selector::class("comment-list")).is_some());
        assert_eq!(doc.text_content(panel), "loose text");
    }

    #[test]
    fn test_text_shorthand_precedes_children() {
        let spec: NodeSpec = serde_json::from_value(serde_json::json!(
            { "tag": "button", "text": "💬 留言 (2)", "children": [{ "tag": "i", "text": "!" }] }
        ))
        .unwrap();
        let mut doc = Document::new();
        let node = doc.build(&spec);
        assert_eq!(doc.text_content(node), "💬 留言 (2)!");
    }
}
