//! Bounded self-healing of the injected chrome.
//!
//! For a fixed window after boot the page re-injects a toggle or panel the
//! host has deleted and re-binds a search input that lost its listener. The
//! window does not reopen on its own; only a fresh boot restarts it.

use crate::chrome::{SIDEBAR_ID, TOGGLE_ID, inject_toggle};
use crate::config::Config;
use crate::engine::PromptIndex;
use crate::host::{Host, Task};
use core_types::TimerId;
use runtime_timers::Timers;

#[derive(Debug, Default)]
pub struct Reconciler {
    interval: Option<TimerId>,
    deadline: Option<TimerId>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, timers: &mut Timers<Task>, config: &Config) {
        self.stop(timers);
        self.interval = Some(timers.set_interval(config.reconcile_interval_ms, Task::ReconcileTick));
        self.deadline = Some(timers.set_timeout(config.reconcile_duration_ms, Task::StopReconcile));
        log::debug!(
            target: "prompt_index.reconcile",
            "repairing every {}ms for {}ms",
            config.reconcile_interval_ms,
            config.reconcile_duration_ms
        );
    }

    pub fn stop(&mut self, timers: &mut Timers<Task>) {
        if let Some(interval) = self.interval.take() {
            timers.clear(interval);
            log::debug!(target: "prompt_index.reconcile", "repair window closed");
        }
        if let Some(deadline) = self.deadline.take() {
            timers.clear(deadline);
        }
    }

    pub fn is_running(&self) -> bool {
        self.interval.is_some()
    }
}

impl PromptIndex {
    pub(crate) fn reconcile_tick(&mut self, host: &mut Host<'_>) {
        if host.doc.get_element_by_id(TOGGLE_ID).is_none() {
            log::info!(target: "prompt_index.reconcile", "toggle missing, re-injecting");
            if let Err(err) = inject_toggle(host.doc, &self.config, self.panel.is_shown()) {
                log::debug!(target: "prompt_index.reconcile", "toggle injection failed: {err}");
            }
        }
        if host.doc.get_element_by_id(SIDEBAR_ID).is_none() {
            log::info!(target: "prompt_index.reconcile", "panel missing, re-injecting hidden");
            self.reinject_panel(host);
            self.panel.force_hidden(host, &self.config, self.adapter);
        }
        self.attach_search(host.doc);
    }
}
