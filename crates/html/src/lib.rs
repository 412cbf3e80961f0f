//! Host-side node model shared by the live document and its tooling.
//!
//! - [`DomPatch`] is the incremental protocol a host page uses to re-render.
//! - [`Node`] is an owned snapshot of a subtree, used for outlines and tests.
//! - [`Selector`] is the small matching vocabulary site adapters need.
//! - [`text`] holds whitespace normalization and case-insensitive search.

pub mod dom_utils;
pub mod text;

mod dom_patch;
mod selector;
mod types;

pub use crate::dom_patch::{DomPatch, PatchKey};
pub use crate::selector::{AttrMatch, Selector};
pub use crate::types::Node;
