//! Single-threaded event loop that drives the core against a live document.

use crate::config::Config;
use crate::engine::PromptIndex;
use crate::host::{Host, Task};
use bus::{Bus, HostEvent};
use core_types::Millis;
use dom::{Document, ReadyState};
use runtime_timers::Timers;
use std::sync::mpsc::Sender;

/// Upper bound on event/mutation rounds per pump. A well-behaved page settles
/// in a handful.
const MAX_PUMP_ROUNDS: usize = 1_000;

pub struct PageRuntime {
    doc: Document,
    timers: Timers<Task>,
    bus: Bus,
    core: PromptIndex,
}

impl PageRuntime {
    pub fn new(doc: Document, config: Config) -> Self {
        Self {
            doc,
            timers: Timers::new(),
            bus: Bus::new(),
            core: PromptIndex::new(config),
        }
    }

    pub fn sender(&self) -> Sender<HostEvent> {
        self.bus.sender()
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Direct host-side access, for edits that bypass the patch stream.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    pub fn core(&self) -> &PromptIndex {
        &self.core
    }

    pub fn timers(&self) -> &Timers<Task> {
        &self.timers
    }

    pub fn now(&self) -> Millis {
        self.timers.now()
    }

    /// Boot (now, or once the document is ready) and settle.
    pub fn start(&mut self) {
        let mut host = Host::new(&mut self.doc, &mut self.timers);
        self.core.boot_when_ready(&mut host);
        self.pump();
    }

    /// Re-run full initialization.
    pub fn reboot(&mut self) {
        let mut host = Host::new(&mut self.doc, &mut self.timers);
        self.core.boot(&mut host);
        self.pump();
    }

    /// Drain queued host events and mutation batches until neither produces
    /// more work.
    pub fn pump(&mut self) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut progressed = false;
            while let Ok(event) = self.bus.evt_rx.try_recv() {
                self.handle(event);
                progressed = true;
            }
            for (from, records) in self.doc.take_mutation_records() {
                let mut host = Host::new(&mut self.doc, &mut self.timers);
                self.core.on_mutations(&mut host, from, &records);
                progressed = true;
            }
            if !progressed {
                return;
            }
        }
        log::warn!(target: "prompt_index.runtime", "page did not settle after {MAX_PUMP_ROUNDS} rounds");
    }

    /// Move the virtual clock forward by `ms`, running every timer that comes
    /// due on the way, in order, and settling after each.
    pub fn advance(&mut self, ms: Millis) {
        self.pump();
        let until = self.timers.now().saturating_add(ms);
        while let Some((id, task)) = self.timers.pop_due(until) {
            let mut host = Host::new(&mut self.doc, &mut self.timers);
            self.core.run_task(&mut host, id, task);
            self.pump();
        }
        self.timers.advance_to(until);
    }

    fn handle(&mut self, event: HostEvent) {
        log::trace!(target: "prompt_index.runtime", "host event {event:?}");
        match event {
            HostEvent::DomContentLoaded => {
                if self.doc.ready_state() == ReadyState::Loading {
                    self.doc.set_ready_state(ReadyState::Interactive);
                }
                let mut host = Host::new(&mut self.doc, &mut self.timers);
                self.core.on_dom_content_loaded(&mut host);
            }
            HostEvent::Patches { from, to, patches } => {
                if let Err(err) = self.doc.apply(from, to, &patches) {
                    log::warn!(target: "prompt_index.runtime", "host patch batch {from:?}->{to:?} rejected: {err}");
                }
            }
            HostEvent::PopState { url } => {
                if let Err(err) = self.doc.set_location(&url) {
                    log::debug!(target: "prompt_index.runtime", "popstate to {url:?}: {err}");
                }
                let mut host = Host::new(&mut self.doc, &mut self.timers);
                self.core.on_popstate(&mut host);
            }
            HostEvent::Click { target } => {
                let mut host = Host::new(&mut self.doc, &mut self.timers);
                self.core.on_click(&mut host, target);
            }
            HostEvent::Input { target, value } => {
                let mut host = Host::new(&mut self.doc, &mut self.timers);
                self.core.on_input(&mut host, target, &value);
            }
        }
    }
}
