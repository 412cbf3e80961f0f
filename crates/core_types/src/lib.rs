/// Milliseconds on the page's virtual clock.
pub type Millis = u64;

/// Position of an entry in discovery order, starting at 1.
pub type Sequence = u32;

/// Handle to a node in a live document.
///
/// Keys are arena slots that are never reused, so a key outlives the node it
/// names and can be checked for liveness instead of faulting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Monotonic version of a document as seen by host patch batches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DomVersion(pub u64);

impl DomVersion {
    pub const INITIAL: DomVersion = DomVersion(0);

    pub fn next(self) -> DomVersion {
        DomVersion(self.0 + 1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    Input,
}
