//! Incremental DOM patch protocol.
//!
//! A host page re-renders by sending ordered batches of patches to the live
//! document. The page's own injected chrome never travels through this
//! protocol; it is created directly on the document.
//!
//! Invariants:
//! - Patches are applied in order.
//! - References must point to live keys at the time they are used (except the
//!   `key` of create operations).
//! - Keys below [`PatchKey::FIRST_HOST`] are reserved for the nodes every
//!   document starts with; hosts allocate their own keys from there upward.
//! - A key is never reused within a document, even after its node is removed.
//! - Element and attribute names are canonical ASCII-lowercase.
//! - Attribute order and duplicates are preserved; appliers must not dedupe.

use std::sync::Arc;

/// Host-allocated identity of a node within one document's patch stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchKey(pub u32);

impl PatchKey {
    /// Reserved sentinel for "unassigned/invalid" identity.
    pub const INVALID: PatchKey = PatchKey(0);
    pub const DOCUMENT: PatchKey = PatchKey(1);
    pub const HTML: PatchKey = PatchKey(2);
    pub const HEAD: PatchKey = PatchKey(3);
    pub const BODY: PatchKey = PatchKey(4);
    /// First key a host may allocate.
    pub const FIRST_HOST: PatchKey = PatchKey(16);

    pub fn is_reserved(self) -> bool {
        self.0 < Self::FIRST_HOST.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DomPatch {
    /// Create a detached element node with initial attributes.
    CreateElement {
        key: PatchKey,
        name: Arc<str>,
        attributes: Vec<(Arc<str>, Option<String>)>,
    },
    /// Create a detached text node.
    CreateText { key: PatchKey, text: String },
    /// Append a child to the end of a parent's children list.
    AppendChild { parent: PatchKey, child: PatchKey },
    /// Insert a child before an existing sibling.
    InsertBefore {
        parent: PatchKey,
        child: PatchKey,
        before: PatchKey,
    },
    /// Remove a node and its entire subtree.
    ///
    /// This also removes nodes the page injected under it, which is exactly
    /// how a host re-render wipes out foreign chrome.
    RemoveNode { key: PatchKey },
    /// Replace all attributes on an element node.
    SetAttributes {
        key: PatchKey,
        attributes: Vec<(Arc<str>, Option<String>)>,
    },
    /// Replace the text content of a text node.
    SetText { key: PatchKey, text: String },
}

impl DomPatch {
    pub fn element(key: PatchKey, name: &str, attributes: &[(&str, &str)]) -> DomPatch {
        DomPatch::CreateElement {
            key,
            name: Arc::from(name),
            attributes: attributes
                .iter()
                .map(|(k, v)| (Arc::from(*k), Some((*v).to_string())))
                .collect(),
        }
    }
}
