use core_types::NodeKey;
use std::sync::Arc;

/// Owned snapshot of a live subtree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        key: NodeKey,
        children: Vec<Node>,
    },
    Element {
        key: NodeKey,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, Option<String>)>,
        style: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text {
        key: NodeKey,
        text: String,
    },
}

impl Node {
    pub fn key(&self) -> NodeKey {
        match self {
            Node::Document { key, .. } => *key,
            Node::Element { key, .. } => *key,
            Node::Text { key, .. } => *key,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children, .. } | Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn attribute(&self, wanted: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(wanted))
                .and_then(|(_, v)| v.as_deref()),
            _ => None,
        }
    }
}
