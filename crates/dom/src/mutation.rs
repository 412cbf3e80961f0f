//! Structural-mutation observers.
//!
//! Records are queued as mutations happen and handed out in batches, one batch
//! per observer, when the owner of the event loop drains them.

use crate::DomError;
use crate::arena::NodeArena;
use core_types::{NodeKey, ObserverId};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub subtree: bool,
}

impl ObserveOptions {
    pub const SUBTREE_CHILD_LIST: ObserveOptions = ObserveOptions {
        child_list: true,
        subtree: true,
    };
}

/// One insertion or removal under `target`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeKey,
    pub added: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
}

struct Registration {
    id: ObserverId,
    target: NodeKey,
    options: ObserveOptions,
}

pub(crate) struct Observers {
    next_id: u32,
    active: Vec<Registration>,
    pending: Vec<(ObserverId, MutationRecord)>,
}

impl Observers {
    pub(crate) fn new() -> Self {
        Self {
            next_id: 1,
            active: Vec::new(),
            pending: Vec::new(),
        }
    }

    pub(crate) fn observe(&mut self, target: NodeKey, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.active.push(Registration {
            id,
            target,
            options,
        });
        id
    }

    pub(crate) fn disconnect(&mut self, id: ObserverId) -> Result<(), DomError> {
        let before = self.active.len();
        self.active.retain(|r| r.id != id);
        if self.active.len() == before {
            return Err(DomError::UnknownObserver(id));
        }
        self.pending.retain(|(owner, _)| *owner != id);
        Ok(())
    }

    pub(crate) fn is_active(&self, id: ObserverId) -> bool {
        self.active.iter().any(|r| r.id == id)
    }

    /// Queue `record` for every observer watching its target.
    pub(crate) fn record(&mut self, arena: &NodeArena, record: MutationRecord) {
        for reg in &self.active {
            if !reg.options.child_list {
                continue;
            }
            let watches = reg.target == record.target
                || (reg.options.subtree && arena.is_inclusive_ancestor(reg.target, record.target));
            if watches {
                log::trace!(
                    target: "dom.mutation",
                    "queue record for {:?}: target={:?} +{} -{}",
                    reg.id,
                    record.target,
                    record.added.len(),
                    record.removed.len()
                );
                self.pending.push((reg.id, record.clone()));
            }
        }
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Drain queued records grouped per observer, observers ordered by their
    /// first queued record.
    pub(crate) fn take(&mut self) -> Vec<(ObserverId, Vec<MutationRecord>)> {
        let mut out: Vec<(ObserverId, Vec<MutationRecord>)> = Vec::new();
        for (id, record) in self.pending.drain(..) {
            match out.iter_mut().find(|(owner, _)| *owner == id) {
                Some((_, records)) => records.push(record),
                None => out.push((id, vec![record])),
            }
        }
        out
    }
}
