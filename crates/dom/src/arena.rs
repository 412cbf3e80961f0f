use crate::DomError;
use core_types::{EventKind, ListenerId, NodeKey};
use std::sync::Arc;

pub(crate) struct NodeArena {
    nodes: Vec<NodeRecord>,
}

pub(crate) struct NodeRecord {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeKey>,
    pub(crate) children: Vec<NodeKey>,
}

pub(crate) enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    /// Tombstone left behind by a removal; the slot is never reused.
    Removed,
}

pub(crate) struct ElementData {
    pub(crate) name: Arc<str>,
    pub(crate) attributes: Vec<(Arc<str>, Option<String>)>,
    pub(crate) style: Vec<(String, String)>,
    pub(crate) value: String,
    pub(crate) listeners: Vec<(EventKind, ListenerId)>,
}

impl ElementData {
    pub(crate) fn new(name: Arc<str>, attributes: Vec<(Arc<str>, Option<String>)>) -> Self {
        Self {
            name,
            attributes,
            style: Vec::new(),
            value: String::new(),
            listeners: Vec::new(),
        }
    }
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element(_))
    }
}

impl NodeArena {
    pub(crate) fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    pub(crate) fn push(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
        });
        key
    }

    pub(crate) fn get(&self, key: NodeKey) -> Option<&NodeRecord> {
        self.nodes
            .get(key.0 as usize)
            .filter(|n| !matches!(n.kind, NodeKind::Removed))
    }

    pub(crate) fn get_mut(&mut self, key: NodeKey) -> Option<&mut NodeRecord> {
        self.nodes
            .get_mut(key.0 as usize)
            .filter(|n| !matches!(n.kind, NodeKind::Removed))
    }

    pub(crate) fn live(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        self.get(key).ok_or(DomError::DeadNode(key))
    }

    pub(crate) fn element(&self, key: NodeKey) -> Result<&ElementData, DomError> {
        match &self.live(key)?.kind {
            NodeKind::Element(data) => Ok(data),
            _ => Err(DomError::NotAnElement(key)),
        }
    }

    pub(crate) fn element_mut(&mut self, key: NodeKey) -> Result<&mut ElementData, DomError> {
        match self.get_mut(key).map(|n| &mut n.kind) {
            Some(NodeKind::Element(data)) => Ok(data),
            Some(_) => Err(DomError::NotAnElement(key)),
            None => Err(DomError::DeadNode(key)),
        }
    }

    fn check_insert(&self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        let parent_record = self.live(parent)?;
        let child_record = self.live(child)?;
        if parent == child || self.is_inclusive_ancestor(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        if !parent_record.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        if child_record.parent.is_some() || matches!(child_record.kind, NodeKind::Document) {
            return Err(DomError::AlreadyAttached(child));
        }
        Ok(())
    }

    pub(crate) fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        self.nodes[parent.0 as usize].children.push(child);
        self.nodes[child.0 as usize].parent = Some(parent);
        Ok(())
    }

    pub(crate) fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        self.check_insert(parent, child)?;
        if self.live(before)?.parent != Some(parent) {
            return Err(DomError::InvalidSibling { parent, before });
        }
        let siblings = &mut self.nodes[parent.0 as usize].children;
        let pos = siblings
            .iter()
            .position(|k| *k == before)
            .ok_or(DomError::InvalidSibling { parent, before })?;
        siblings.insert(pos, child);
        self.nodes[child.0 as usize].parent = Some(parent);
        Ok(())
    }

    /// Detach `key` from its parent and tombstone its whole subtree.
    pub(crate) fn remove_subtree(&mut self, key: NodeKey) -> Result<(), DomError> {
        let parent = self.live(key)?.parent;
        if let Some(parent) = parent
            && let Some(record) = self.get_mut(parent)
        {
            record.children.retain(|k| *k != key);
        }
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let Some(record) = self.nodes.get_mut(current.0 as usize) else {
                continue;
            };
            stack.append(&mut record.children);
            record.parent = None;
            record.kind = NodeKind::Removed;
        }
        Ok(())
    }

    /// True when `ancestor` is `node` or lies on its parent chain.
    pub(crate) fn is_inclusive_ancestor(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.get(key).and_then(|r| r.parent);
        }
        false
    }

    /// Live descendants of `root` (exclusive) in document order.
    pub(crate) fn descendants(&self, root: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = match self.get(root) {
            Some(record) => record.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(key) = stack.pop() {
            let Some(record) = self.get(key) else {
                continue;
            };
            out.push(key);
            stack.extend(record.children.iter().rev().copied());
        }
        out
    }
}
