//! Host re-renders arrive as versioned [`DomPatch`] batches.

use crate::{DomError, Document};
use core_types::{DomVersion, NodeKey};
use html::{DomPatch, PatchKey};
use std::sync::Arc;

impl Document {
    /// Apply one host batch moving the document from `from` to `to`.
    ///
    /// Patches are applied in order; a failing patch aborts the rest of the
    /// batch and leaves the version unchanged.
    pub fn apply(
        &mut self,
        from: DomVersion,
        to: DomVersion,
        patches: &[DomPatch],
    ) -> Result<(), DomError> {
        if self.version != from {
            return Err(DomError::VersionMismatch {
                expected: self.version,
                got: from,
            });
        }
        if to != from.next() {
            return Err(DomError::NonMonotonicVersion { from, to });
        }
        for patch in patches {
            self.apply_one(patch)?;
        }
        self.version = to;
        log::debug!(
            target: "dom.patch",
            "applied {} patches, now at {:?}",
            patches.len(),
            self.version
        );
        Ok(())
    }

    /// Node currently bound to a host patch key.
    pub fn resolve_patch_key(&self, key: PatchKey) -> Option<NodeKey> {
        self.patch_keys
            .get(&key)
            .copied()
            .filter(|k| self.is_live(*k))
    }

    fn apply_one(&mut self, patch: &DomPatch) -> Result<(), DomError> {
        match patch {
            DomPatch::CreateElement {
                key,
                name,
                attributes,
            } => {
                self.allocate(*key)?;
                let node = self.create_element_with(Arc::clone(name), attributes.clone());
                self.patch_keys.insert(*key, node);
            }
            DomPatch::CreateText { key, text } => {
                self.allocate(*key)?;
                let node = self.create_text(text);
                self.patch_keys.insert(*key, node);
            }
            DomPatch::AppendChild { parent, child } => {
                let parent = self.live(*parent)?;
                let child = self.live(*child)?;
                self.append_child(parent, child)?;
            }
            DomPatch::InsertBefore {
                parent,
                child,
                before,
            } => {
                let parent = self.live(*parent)?;
                let child = self.live(*child)?;
                let before = self.live(*before)?;
                self.insert_before(parent, child, before)?;
            }
            DomPatch::RemoveNode { key } => {
                let node = self.live(*key)?;
                self.remove(node)?;
            }
            DomPatch::SetAttributes { key, attributes } => {
                let node = self.live(*key)?;
                self.replace_attributes(node, attributes)?;
            }
            DomPatch::SetText { key, text } => {
                let node = self.live(*key)?;
                self.set_text(node, text)?;
            }
        }
        Ok(())
    }

    fn allocate(&mut self, key: PatchKey) -> Result<(), DomError> {
        if key == PatchKey::INVALID || key.is_reserved() {
            return Err(DomError::InvalidKey(key));
        }
        if !self.allocated.insert(key) {
            return Err(DomError::DuplicateKey(key));
        }
        Ok(())
    }

    fn live(&self, key: PatchKey) -> Result<NodeKey, DomError> {
        self.resolve_patch_key(key).ok_or(DomError::MissingKey(key))
    }
}
