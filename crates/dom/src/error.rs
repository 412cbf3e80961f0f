use core_types::{DomVersion, NodeKey, ObserverId};
use html::PatchKey;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomError {
    #[error("node {0:?} is not live")]
    DeadNode(NodeKey),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeKey),
    #[error("node {0:?} is not a text node")]
    NotText(NodeKey),
    #[error("node {0:?} cannot have children")]
    InvalidParent(NodeKey),
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeKey),
    #[error("{before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: NodeKey, before: NodeKey },
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeKey, child: NodeKey },
    #[error("node {0:?} cannot be removed")]
    Protected(NodeKey),
    #[error("node {0:?} is not connected to the document")]
    Detached(NodeKey),
    #[error("observer {0:?} is not active")]
    UnknownObserver(ObserverId),
    #[error("patch key {0:?} is invalid")]
    InvalidKey(PatchKey),
    #[error("patch key {0:?} was already allocated")]
    DuplicateKey(PatchKey),
    #[error("patch key {0:?} does not name a live node")]
    MissingKey(PatchKey),
    #[error("expected version {expected:?}, got {got:?}")]
    VersionMismatch { expected: DomVersion, got: DomVersion },
    #[error("non-monotonic version step {from:?} -> {to:?}")]
    NonMonotonicVersion { from: DomVersion, to: DomVersion },
    #[error("invalid location: {0}")]
    InvalidLocation(#[from] url::ParseError),
}
