//! Live host document: the mutable tree a page renders into and foreign
//! chrome is injected into.

mod arena;
mod document;
mod error;
mod mutation;
mod patch;

pub use document::{Document, ReadyState, ScrollBehavior, ScrollBlock, ScrollOptions, ScrollRequest};
pub use error::DomError;
pub use mutation::{MutationRecord, ObserveOptions};
