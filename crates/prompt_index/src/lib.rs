//! Live, searchable index of the prompts a user has sent in a chat page.
//!
//! The core runs inside a host-controlled document it does not own. It finds
//! user messages through a per-site [`SiteAdapter`], folds them into an
//! append-only index as the host renders them, and keeps an injected side
//! panel (search box plus result list) and a floating toggle alive while the
//! host re-renders around them.
//!
//! Everything is single-threaded. [`PageRuntime`] owns the document, the
//! timer queue and the event bus and feeds them to [`PromptIndex`].

pub mod adapter;
pub mod chrome;
pub mod config;
pub mod index;
pub mod projection;

mod engine;
mod host;
mod observe;
mod panel;
mod reconcile;
mod runtime;

pub use adapter::SiteAdapter;
pub use config::{Config, ConfigError};
pub use engine::PromptIndex;
pub use host::{Host, Task};
pub use index::{IndexEntry, Indexer, ReindexOutcome};
pub use observe::Observation;
pub use panel::{Panel, Visibility};
pub use projection::project;
pub use reconcile::Reconciler;
pub use runtime::PageRuntime;
