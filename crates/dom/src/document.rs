use crate::DomError;
use crate::arena::{ElementData, NodeArena, NodeKind};
use crate::mutation::{MutationRecord, ObserveOptions, Observers};
use core_types::{DomVersion, EventKind, ListenerId, NodeKey, ObserverId};
use html::{Node, PatchKey, Selector};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
    Complete,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBehavior {
    Auto,
    Smooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollBlock {
    Start,
    Center,
    End,
    Nearest,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// A scroll the document was asked to perform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: NodeKey,
    pub options: ScrollOptions,
}

/// Live host document.
///
/// The document node and the `<html>` element are permanent. Everything else,
/// including `<body>`, can be removed by the host at any time, and every key
/// handed out stays safe to query afterwards.
pub struct Document {
    arena: NodeArena,
    root: NodeKey,
    html: NodeKey,
    pub(crate) patch_keys: HashMap<PatchKey, NodeKey>,
    pub(crate) allocated: HashSet<PatchKey>,
    pub(crate) version: DomVersion,
    location: Url,
    ready_state: ReadyState,
    observers: Observers,
    scrolls: Vec<ScrollRequest>,
}

fn element_kind(name: &str) -> NodeKind {
    NodeKind::Element(ElementData::new(Arc::from(name), Vec::new()))
}

fn is_block(name: &str) -> bool {
    matches!(
        name.to_ascii_lowercase().as_str(),
        "p" | "div"
            | "section"
            | "article"
            | "header"
            | "footer"
            | "li"
            | "pre"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "br"
    )
}

impl Document {
    pub fn new(location: &str) -> Result<Self, DomError> {
        let location = Url::parse(location)?;
        let mut arena = NodeArena::new();
        let root = arena.push(NodeKind::Document);
        let html = arena.push(element_kind("html"));
        let head = arena.push(element_kind("head"));
        let body = arena.push(element_kind("body"));
        arena.append_child(root, html)?;
        arena.append_child(html, head)?;
        arena.append_child(html, body)?;

        let patch_keys = HashMap::from([
            (PatchKey::DOCUMENT, root),
            (PatchKey::HTML, html),
            (PatchKey::HEAD, head),
            (PatchKey::BODY, body),
        ]);
        let allocated = patch_keys.keys().copied().collect();

        Ok(Self {
            arena,
            root,
            html,
            patch_keys,
            allocated,
            version: DomVersion::INITIAL,
            location,
            ready_state: ReadyState::Loading,
            observers: Observers::new(),
            scrolls: Vec::new(),
        })
    }

    // --- Document-level state ---

    pub fn document_node(&self) -> NodeKey {
        self.root
    }

    pub fn document_element(&self) -> NodeKey {
        self.html
    }

    /// The current `<body>`, if the host has not removed it.
    pub fn body(&self) -> Option<NodeKey> {
        self.arena
            .live(self.html)
            .ok()?
            .children
            .iter()
            .copied()
            .find(|k| self.name(*k).is_some_and(|n| n.eq_ignore_ascii_case("body")))
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    pub fn set_location(&mut self, location: &str) -> Result<(), DomError> {
        self.location = self.location.join(location)?;
        Ok(())
    }

    pub fn host(&self) -> Option<&str> {
        self.location.host_str()
    }

    pub fn ready_state(&self) -> ReadyState {
        self.ready_state
    }

    pub fn set_ready_state(&mut self, state: ReadyState) {
        self.ready_state = state;
    }

    pub fn version(&self) -> DomVersion {
        self.version
    }

    // --- Tree construction ---

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.arena.push(element_kind(name))
    }

    pub(crate) fn create_element_with(
        &mut self,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, Option<String>)>,
    ) -> NodeKey {
        self.arena
            .push(NodeKind::Element(ElementData::new(name, attributes)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.arena.push(NodeKind::Text(text.to_string()))
    }

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.arena.append_child(parent, child)?;
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: NodeKey,
    ) -> Result<(), DomError> {
        self.arena.insert_before(parent, child, before)?;
        self.record(parent, vec![child], Vec::new());
        Ok(())
    }

    /// Remove `key` and its subtree. Every key in the subtree becomes dead.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        if key == self.root || key == self.html {
            return Err(DomError::Protected(key));
        }
        let parent = self.arena.live(key)?.parent;
        self.arena.remove_subtree(key)?;
        if let Some(parent) = parent {
            self.record(parent, Vec::new(), vec![key]);
        }
        Ok(())
    }

    pub fn remove_children(&mut self, key: NodeKey) -> Result<(), DomError> {
        let children = self.arena.live(key)?.children.clone();
        if children.is_empty() {
            return Ok(());
        }
        for child in &children {
            self.arena.remove_subtree(*child)?;
        }
        self.record(key, Vec::new(), children);
        Ok(())
    }

    /// Replace the children of `key` with a single text node.
    pub fn set_text_content(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        let children = self.arena.live(key)?.children.clone();
        if let [only] = children.as_slice()
            && let Some(NodeKind::Text(existing)) = self.arena.get(*only).map(|r| &r.kind)
            && existing == text
        {
            return Ok(());
        }
        for child in &children {
            self.arena.remove_subtree(*child)?;
        }
        let text_node = self.create_text(text);
        self.arena.append_child(key, text_node)?;
        self.record(key, vec![text_node], children);
        Ok(())
    }

    pub fn set_text(&mut self, key: NodeKey, text: &str) -> Result<(), DomError> {
        match self.arena.get_mut(key).map(|r| &mut r.kind) {
            Some(NodeKind::Text(existing)) => {
                existing.clear();
                existing.push_str(text);
                Ok(())
            }
            Some(_) => Err(DomError::NotText(key)),
            None => Err(DomError::DeadNode(key)),
        }
    }

    fn record(&mut self, target: NodeKey, added: Vec<NodeKey>, removed: Vec<NodeKey>) {
        self.observers.record(
            &self.arena,
            MutationRecord {
                target,
                added,
                removed,
            },
        );
    }

    // --- Node queries ---

    pub fn is_live(&self, key: NodeKey) -> bool {
        self.arena.get(key).is_some()
    }

    pub fn is_connected(&self, key: NodeKey) -> bool {
        self.is_live(key) && self.arena.is_inclusive_ancestor(self.root, key)
    }

    /// Inclusive containment: a node contains itself.
    pub fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        self.is_live(node) && self.arena.is_inclusive_ancestor(ancestor, node)
    }

    pub fn name(&self, key: NodeKey) -> Option<&str> {
        self.arena.element(key).ok().map(|data| &*data.name)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.arena.get(key).and_then(|r| r.parent)
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.arena.get(key).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    /// Rendered text of a subtree: script and style content is skipped and
    /// block elements end with a line break.
    pub fn inner_text(&self, key: NodeKey) -> String {
        let mut out = String::new();
        self.collect_text(key, &mut out);
        out
    }

    fn collect_text(&self, key: NodeKey, out: &mut String) {
        let Some(record) = self.arena.get(key) else {
            return;
        };
        match &record.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element(data) => {
                if data.name.eq_ignore_ascii_case("script") || data.name.eq_ignore_ascii_case("style")
                {
                    return;
                }
                for child in &record.children {
                    self.collect_text(*child, out);
                }
                if is_block(&data.name) {
                    out.push('\n');
                }
            }
            NodeKind::Document => {
                for child in &record.children {
                    self.collect_text(*child, out);
                }
            }
            NodeKind::Removed => {}
        }
    }

    pub fn get_element_by_id(&self, id: &str) -> Option<NodeKey> {
        self.arena
            .descendants(self.root)
            .into_iter()
            .find(|k| self.attribute(*k, "id") == Some(id))
    }

    pub fn query_selector(&self, selector: &Selector) -> Option<NodeKey> {
        self.arena
            .descendants(self.root)
            .into_iter()
            .find(|k| self.matches(*k, selector))
    }

    pub fn query_selector_all(&self, selector: &Selector) -> Vec<NodeKey> {
        self.arena
            .descendants(self.root)
            .into_iter()
            .filter(|k| self.matches(*k, selector))
            .collect()
    }

    /// Nearest inclusive ancestor of `key` matching `selector`.
    pub fn closest(&self, key: NodeKey, selector: &Selector) -> Option<NodeKey> {
        let mut current = Some(key);
        while let Some(k) = current {
            if self.matches(k, selector) {
                return Some(k);
            }
            current = self.parent(k);
        }
        None
    }

    pub fn matches(&self, key: NodeKey, selector: &Selector) -> bool {
        self.arena
            .element(key)
            .is_ok_and(|data| selector.matches(&data.name, &data.attributes))
    }

    // --- Attributes, styles, values ---

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.arena
            .element(key)
            .ok()?
            .attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .and_then(|(_, v)| v.as_deref())
    }

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        let data = self.arena.element_mut(key)?;
        match data
            .attributes
            .iter_mut()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
        {
            Some((_, existing)) if existing.as_deref() == Some(value) => {}
            Some((_, existing)) => *existing = Some(value.to_string()),
            None => data
                .attributes
                .push((Arc::from(name), Some(value.to_string()))),
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<(), DomError> {
        self.arena
            .element_mut(key)?
            .attributes
            .retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        Ok(())
    }

    pub(crate) fn replace_attributes(
        &mut self,
        key: NodeKey,
        attributes: &[(Arc<str>, Option<String>)],
    ) -> Result<(), DomError> {
        let data = self.arena.element_mut(key)?;
        data.attributes.clear();
        data.attributes.extend(attributes.iter().cloned());
        Ok(())
    }

    pub fn style(&self, key: NodeKey, property: &str) -> Option<&str> {
        self.arena
            .element(key)
            .ok()?
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_style(&mut self, key: NodeKey, property: &str, value: &str) -> Result<(), DomError> {
        let data = self.arena.element_mut(key)?;
        match data.style.iter_mut().find(|(k, _)| k == property) {
            Some((_, existing)) if existing == value => {}
            Some((_, existing)) => *existing = value.to_string(),
            None => data.style.push((property.to_string(), value.to_string())),
        }
        Ok(())
    }

    pub fn remove_style(&mut self, key: NodeKey, property: &str) -> Result<(), DomError> {
        self.arena
            .element_mut(key)?
            .style
            .retain(|(k, _)| k != property);
        Ok(())
    }

    pub fn value(&self, key: NodeKey) -> Option<&str> {
        self.arena.element(key).ok().map(|data| data.value.as_str())
    }

    pub fn set_value(&mut self, key: NodeKey, value: &str) -> Result<(), DomError> {
        let data = self.arena.element_mut(key)?;
        data.value.clear();
        data.value.push_str(value);
        Ok(())
    }

    // --- Events ---

    /// Register `listener` for `kind` on `key`. Registering the same pair twice
    /// has no effect.
    pub fn add_event_listener(
        &mut self,
        key: NodeKey,
        kind: EventKind,
        listener: ListenerId,
    ) -> Result<(), DomError> {
        let data = self.arena.element_mut(key)?;
        if !data.listeners.contains(&(kind, listener)) {
            data.listeners.push((kind, listener));
        }
        Ok(())
    }

    /// Listeners that fire for an event of `kind` at `target`, innermost first.
    pub fn dispatch(&self, target: NodeKey, kind: EventKind) -> Result<Vec<ListenerId>, DomError> {
        self.arena.live(target)?;
        let mut out = Vec::new();
        let mut current = Some(target);
        while let Some(key) = current {
            if let Ok(data) = self.arena.element(key) {
                out.extend(
                    data.listeners
                        .iter()
                        .filter(|(k, _)| *k == kind)
                        .map(|(_, id)| *id),
                );
            }
            current = self.parent(key);
        }
        Ok(out)
    }

    // --- Scrolling ---

    pub fn scroll_into_view(&mut self, key: NodeKey, options: ScrollOptions) -> Result<(), DomError> {
        if !self.is_live(key) {
            return Err(DomError::DeadNode(key));
        }
        if !self.is_connected(key) {
            return Err(DomError::Detached(key));
        }
        log::trace!(target: "dom.scroll", "scroll {key:?} into view ({options:?})");
        self.scrolls.push(ScrollRequest {
            target: key,
            options,
        });
        Ok(())
    }

    pub fn scrolls(&self) -> &[ScrollRequest] {
        &self.scrolls
    }

    // --- Observation ---

    pub fn observe(&mut self, target: NodeKey, options: ObserveOptions) -> Result<ObserverId, DomError> {
        self.arena.live(target)?;
        Ok(self.observers.observe(target, options))
    }

    /// Cancel an observer. Disconnecting an inactive observer is an error the
    /// caller may ignore.
    pub fn disconnect(&mut self, id: ObserverId) -> Result<(), DomError> {
        self.observers.disconnect(id)
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observers.is_active(id)
    }

    pub fn has_pending_mutations(&self) -> bool {
        self.observers.has_pending()
    }

    pub fn take_mutation_records(&mut self) -> Vec<(ObserverId, Vec<MutationRecord>)> {
        self.observers.take()
    }

    // --- Snapshots ---

    pub fn snapshot(&self) -> Node {
        self.snapshot_of(self.root)
            .unwrap_or(Node::Document {
                key: self.root,
                children: Vec::new(),
            })
    }

    pub fn snapshot_of(&self, key: NodeKey) -> Option<Node> {
        let record = self.arena.get(key)?;
        let children = record
            .children
            .iter()
            .filter_map(|c| self.snapshot_of(*c))
            .collect();
        let node = match &record.kind {
            NodeKind::Document => Node::Document { key, children },
            NodeKind::Element(data) => Node::Element {
                key,
                name: Arc::clone(&data.name),
                attributes: data.attributes.clone(),
                style: data.style.clone(),
                children,
            },
            NodeKind::Text(text) => Node::Text {
                key,
                text: text.clone(),
            },
            NodeKind::Removed => return None,
        };
        Some(node)
    }
}
