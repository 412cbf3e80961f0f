//! The page-side core: owns the index and panel state and reacts to host
//! events, mutation batches and its own timers.
//!
//! Writers: only the indexer appends entries and only the panel changes
//! visibility. Every other component reads.

use crate::adapter::SiteAdapter;
use crate::chrome::{
    self, BOUND_ATTR, ENTRY_ATTR, HIGHLIGHT, LIST_ID, SEARCH_ID, SESSION_ID, SIDEBAR_ID, TOGGLE_ID,
    UiAction,
};
use crate::config::Config;
use crate::host::{Host, Task};
use crate::index::{IndexEntry, Indexer, ReindexOutcome};
use crate::observe::Observation;
use crate::panel::{Panel, Visibility};
use crate::projection::project;
use crate::reconcile::Reconciler;
use core_types::{EventKind, NodeKey, ObserverId, TimerId};
use dom::{Document, MutationRecord, ReadyState, ScrollBehavior, ScrollBlock, ScrollOptions};
use html::Selector;
use std::collections::HashMap;

const ENTRY_ROW: Selector = Selector::tag("button");

#[derive(Debug)]
struct Highlight {
    previous: Option<String>,
    timer: TimerId,
}

pub struct PromptIndex {
    pub(crate) config: Config,
    pub(crate) adapter: SiteAdapter,
    pub(crate) panel: Panel,
    indexer: Indexer,
    observation: Observation,
    reconciler: Reconciler,
    highlights: HashMap<NodeKey, Highlight>,
    awaiting_ready: bool,
    booted: bool,
}

impl PromptIndex {
    pub fn new(config: Config) -> Self {
        let indexer = Indexer::new(config.max_empty_retries);
        Self {
            config,
            adapter: SiteAdapter::Generic,
            panel: Panel::new(),
            indexer,
            observation: Observation::new(),
            reconciler: Reconciler::new(),
            highlights: HashMap::new(),
            awaiting_ready: false,
            booted: false,
        }
    }

    // --- Accessors ---

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn adapter(&self) -> SiteAdapter {
        self.adapter
    }

    pub fn entries(&self) -> &[IndexEntry] {
        self.indexer.entries()
    }

    pub fn project(&self, query: &str) -> Vec<&IndexEntry> {
        project(self.indexer.entries(), query)
    }

    pub fn visibility(&self) -> Visibility {
        self.panel.visibility()
    }

    pub fn is_booted(&self) -> bool {
        self.booted
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconciler.is_running()
    }

    pub fn subscription(&self) -> Option<ObserverId> {
        self.observation.subscription()
    }

    // --- Lifecycle ---

    /// Boot now if the document is past `Loading`, otherwise once the host
    /// reports `DOMContentLoaded`. Returns whether boot ran.
    pub fn boot_when_ready(&mut self, host: &mut Host<'_>) -> bool {
        if host.doc.ready_state() == ReadyState::Loading {
            log::debug!(target: "prompt_index", "document still loading, deferring boot");
            self.awaiting_ready = true;
            return false;
        }
        self.boot(host);
        true
    }

    pub fn on_dom_content_loaded(&mut self, host: &mut Host<'_>) {
        if std::mem::take(&mut self.awaiting_ready) {
            self.boot(host);
        }
    }

    /// Full initialization. Running it again re-resolves the adapter and
    /// restarts observation and repair; the index is kept.
    pub fn boot(&mut self, host: &mut Host<'_>) {
        self.adapter = SiteAdapter::for_document(host.doc);
        log::info!(
            target: "prompt_index",
            "boot on {} with the {} adapter",
            host.doc.location(),
            self.adapter.name()
        );
        if let Err(err) = chrome::inject_toggle(host.doc, &self.config, false) {
            log::warn!(target: "prompt_index", "toggle injection failed: {err}");
        }
        if let Err(err) = chrome::inject_sidebar(host.doc, &self.config, Visibility::Shown) {
            log::warn!(target: "prompt_index", "panel injection failed: {err}");
        }
        self.fill_session(host.doc);
        self.panel.show(host, &self.config, self.adapter);
        self.attach_search(host.doc);
        self.start_observing(host.doc);
        self.reconciler.start(host.timers, &self.config);
        self.booted = true;
    }

    fn start_observing(&mut self, doc: &mut Document) {
        self.observation.start(doc, self.adapter);
        self.indexer.reindex(doc, self.adapter);
        self.render_list(doc);
    }

    // --- Host events ---

    pub fn on_click(&mut self, host: &mut Host<'_>, target: NodeKey) {
        for action in self.actions(host.doc, target, EventKind::Click) {
            match action {
                UiAction::Toggle => self.toggle_clicked(host),
                UiAction::Close => self.panel.hide(host, &self.config, self.adapter),
                UiAction::Row => self.row_clicked(host, target),
                UiAction::Search => {}
            }
        }
    }

    pub fn on_input(&mut self, host: &mut Host<'_>, target: NodeKey, value: &str) {
        if let Err(err) = host.doc.set_value(target, value) {
            log::debug!(target: "prompt_index", "input on {target:?}: {err}");
            return;
        }
        if self
            .actions(host.doc, target, EventKind::Input)
            .contains(&UiAction::Search)
        {
            self.render_list(host.doc);
        }
    }

    /// Back/forward navigation: let the host re-render, then catch up.
    pub fn on_popstate(&mut self, host: &mut Host<'_>) {
        host.timers
            .set_timeout(self.config.navigation_settle_ms, Task::NavigationSettled);
    }

    pub fn on_mutations(&mut self, host: &mut Host<'_>, from: ObserverId, records: &[MutationRecord]) {
        let chrome = self.chrome_roots(host.doc);
        if !self.observation.wants(host.doc, from, records, &chrome) {
            log::trace!(target: "prompt_index.observe", "ignoring {} records from {from:?}", records.len());
            return;
        }
        self.reindex(host.doc);
    }

    pub fn run_task(&mut self, host: &mut Host<'_>, id: TimerId, task: Task) {
        log::trace!(target: "prompt_index", "timer {id:?} fired: {task:?}");
        match task {
            Task::FinishFade => self.panel.finish_fade(host.doc),
            Task::ReconcileTick => self.reconcile_tick(host),
            Task::StopReconcile => self.reconciler.stop(host.timers),
            Task::NavigationSettled => {
                self.attach_search(host.doc);
                self.fill_session(host.doc);
                self.reindex(host.doc);
            }
            Task::ClearHighlight { element } => self.clear_highlight(host.doc, element, id),
        }
    }

    // --- Internals ---

    fn actions(&self, doc: &Document, target: NodeKey, kind: EventKind) -> Vec<UiAction> {
        match doc.dispatch(target, kind) {
            Ok(listeners) => listeners
                .into_iter()
                .filter_map(UiAction::from_listener)
                .collect(),
            Err(err) => {
                log::debug!(target: "prompt_index", "{kind:?} on {target:?}: {err}");
                Vec::new()
            }
        }
    }

    fn chrome_roots(&self, doc: &Document) -> Vec<NodeKey> {
        [TOGGLE_ID, SIDEBAR_ID]
            .into_iter()
            .filter_map(|id| doc.get_element_by_id(id))
            .collect()
    }

    fn reindex(&mut self, doc: &mut Document) -> ReindexOutcome {
        let outcome = self.indexer.reindex(doc, self.adapter);
        if outcome.added > 0 {
            self.render_list(doc);
        }
        outcome
    }

    fn toggle_clicked(&mut self, host: &mut Host<'_>) {
        if host.doc.get_element_by_id(SIDEBAR_ID).is_none() {
            log::info!(target: "prompt_index", "panel missing on toggle, re-injecting");
            self.reinject_panel(host);
            self.panel.force_hidden(host, &self.config, self.adapter);
            self.panel.show(host, &self.config, self.adapter);
            return;
        }
        self.panel.toggle(host, &self.config, self.adapter);
    }

    /// Inject a fresh hidden panel and bring its contents up to date.
    pub(crate) fn reinject_panel(&mut self, host: &mut Host<'_>) {
        if let Err(err) = chrome::inject_sidebar(host.doc, &self.config, Visibility::Hidden) {
            log::warn!(target: "prompt_index", "panel injection failed: {err}");
            return;
        }
        self.fill_session(host.doc);
        self.attach_search(host.doc);
        self.render_list(host.doc);
    }

    pub(crate) fn attach_search(&self, doc: &mut Document) {
        let Some(input) = doc.get_element_by_id(SEARCH_ID) else {
            return;
        };
        if doc.attribute(input, BOUND_ATTR) == Some("true") {
            return;
        }
        let bound = doc
            .set_attribute(input, BOUND_ATTR, "true")
            .and_then(|_| doc.add_event_listener(input, EventKind::Input, UiAction::Search.listener()));
        match bound {
            Ok(()) => log::debug!(target: "prompt_index", "search input {input:?} bound"),
            Err(err) => log::debug!(target: "prompt_index", "binding search input: {err}"),
        }
    }

    fn fill_session(&self, doc: &mut Document) {
        let Some(slot) = doc.get_element_by_id(SESSION_ID) else {
            return;
        };
        let session = self.adapter.session_id(doc);
        if let Err(err) = doc.set_text_content(slot, &session) {
            log::debug!(target: "prompt_index", "session label: {err}");
        }
    }

    fn query(&self, doc: &Document) -> String {
        doc.get_element_by_id(SEARCH_ID)
            .and_then(|input| doc.value(input))
            .unwrap_or_default()
            .to_owned()
    }

    fn render_list(&self, doc: &mut Document) {
        let Some(list) = doc.get_element_by_id(LIST_ID) else {
            return;
        };
        let query = self.query(doc);
        let rows = project(self.indexer.entries(), &query);
        log::trace!(target: "prompt_index.panel", "rendering {} rows for {query:?}", rows.len());
        if let Err(err) = chrome::render_rows(doc, list, &rows, self.config.snippet_chars) {
            log::debug!(target: "prompt_index.panel", "render failed: {err}");
        }
    }

    fn row_clicked(&mut self, host: &mut Host<'_>, target: NodeKey) {
        let Some(row) = host.doc.closest(target, &ENTRY_ROW) else {
            return;
        };
        let Some(element) = host
            .doc
            .attribute(row, ENTRY_ATTR)
            .and_then(|id| self.indexer.entry(id))
            .map(|entry| entry.element)
        else {
            return;
        };
        self.jump_to(host, element);
    }

    /// Scroll an indexed element into view and flash a highlight on it. A
    /// removed element makes this a no-op.
    pub fn jump_to(&mut self, host: &mut Host<'_>, element: NodeKey) {
        let options = ScrollOptions {
            behavior: ScrollBehavior::Smooth,
            block: ScrollBlock::Center,
        };
        if let Err(err) = host.doc.scroll_into_view(element, options) {
            log::debug!(target: "prompt_index", "jump to {element:?}: {err}");
            return;
        }
        let previous = match self.highlights.remove(&element) {
            Some(active) => {
                host.timers.clear(active.timer);
                active.previous
            }
            None => host.doc.style(element, "box-shadow").map(str::to_owned),
        };
        if let Err(err) = host.doc.set_style(element, "box-shadow", HIGHLIGHT) {
            log::debug!(target: "prompt_index", "highlight {element:?}: {err}");
            return;
        }
        let timer = host.timers.set_timeout(
            self.config.highlight_ms,
            Task::ClearHighlight { element },
        );
        self.highlights.insert(element, Highlight { previous, timer });
    }

    fn clear_highlight(&mut self, doc: &mut Document, element: NodeKey, timer: TimerId) {
        let Some(active) = self.highlights.remove(&element) else {
            return;
        };
        if active.timer != timer {
            self.highlights.insert(element, active);
            return;
        }
        let restored = match active.previous {
            Some(previous) => doc.set_style(element, "box-shadow", &previous),
            None => doc.remove_style(element, "box-shadow"),
        };
        if let Err(err) = restored {
            log::trace!(target: "prompt_index", "highlight restore on {element:?}: {err}");
        }
    }
}
