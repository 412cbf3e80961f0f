//! Shown/Hidden state of the side panel and the layout that follows it.
//!
//! Both transitions are idempotent. A hide schedules a single fade-completion
//! timer; a later show cancels it, so the panel can never end up out of layout
//! while the state says it is shown.

use crate::adapter::SiteAdapter;
use crate::chrome::{HIDDEN_ATTR, SIDEBAR_ID, TOGGLE_ID};
use crate::config::Config;
use crate::host::{Host, Task};
use core_types::{NodeKey, TimerId};
use dom::{Document, DomError};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Visibility {
    Shown,
    Hidden,
}

#[derive(Debug)]
pub struct Panel {
    visibility: Visibility,
    fade: Option<TimerId>,
    /// Element currently carrying the reserved margin. The host root can
    /// change under us, so the margin is released from here, not from
    /// whatever the adapter resolves next.
    margin_on: Option<NodeKey>,
}

impl Default for Panel {
    fn default() -> Self {
        Self::new()
    }
}

impl Panel {
    pub fn new() -> Self {
        Self {
            visibility: Visibility::Shown,
            fade: None,
            margin_on: None,
        }
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_shown(&self) -> bool {
        self.visibility == Visibility::Shown
    }

    /// Pending fade-completion timer, if a hide is still animating.
    pub fn fade_timer(&self) -> Option<TimerId> {
        self.fade
    }

    pub fn show(&mut self, host: &mut Host<'_>, config: &Config, adapter: SiteAdapter) {
        let Some(aside) = host.doc.get_element_by_id(SIDEBAR_ID) else {
            log::debug!(target: "prompt_index.panel", "show: panel is not in the document");
            return;
        };
        self.cancel_fade(host);
        self.visibility = Visibility::Shown;
        let root = adapter.root(host.doc);
        if let Err(err) = self.apply_shown(host.doc, aside, config, root) {
            log::debug!(target: "prompt_index.panel", "show: {err}");
        }
    }

    pub fn hide(&mut self, host: &mut Host<'_>, config: &Config, adapter: SiteAdapter) {
        if self.visibility == Visibility::Hidden {
            return;
        }
        let Some(aside) = host.doc.get_element_by_id(SIDEBAR_ID) else {
            log::debug!(target: "prompt_index.panel", "hide: panel is not in the document");
            return;
        };
        self.visibility = Visibility::Hidden;
        let root = adapter.root(host.doc);
        if let Err(err) = self.apply_hidden(host.doc, aside, config, root) {
            log::debug!(target: "prompt_index.panel", "hide: {err}");
        }
        self.fade = Some(host.timers.set_timeout(config.fade_ms, Task::FinishFade));
    }

    /// Flip to the opposite state.
    pub fn toggle(&mut self, host: &mut Host<'_>, config: &Config, adapter: SiteAdapter) {
        match self.visibility {
            Visibility::Shown => self.hide(host, config, adapter),
            Visibility::Hidden => self.show(host, config, adapter),
        }
    }

    /// Runs when the fade timer fires.
    pub fn finish_fade(&mut self, doc: &mut Document) {
        self.fade = None;
        if self.visibility != Visibility::Hidden {
            return;
        }
        if let Some(aside) = doc.get_element_by_id(SIDEBAR_ID)
            && let Err(err) = doc.set_style(aside, "display", "none")
        {
            log::debug!(target: "prompt_index.panel", "finish fade: {err}");
        }
    }

    /// Adopt a panel that was just injected in its hidden state: no fade, the
    /// layout collapses at once.
    pub fn force_hidden(&mut self, host: &mut Host<'_>, config: &Config, adapter: SiteAdapter) {
        self.cancel_fade(host);
        self.visibility = Visibility::Hidden;
        let root = adapter.root(host.doc);
        if let Err(err) = self.set_layout(host.doc, root, config, false) {
            log::debug!(target: "prompt_index.panel", "force hidden: {err}");
        }
    }

    fn cancel_fade(&mut self, host: &mut Host<'_>) {
        if let Some(timer) = self.fade.take() {
            host.timers.clear(timer);
        }
    }

    fn apply_shown(&mut self, doc: &mut Document, aside: NodeKey, config: &Config, root: NodeKey) -> Result<(), DomError> {
        doc.set_attribute(aside, HIDDEN_ATTR, "false")?;
        doc.set_style(aside, "display", "flex")?;
        doc.set_style(aside, "opacity", "1")?;
        self.set_layout(doc, root, config, true)
    }

    fn apply_hidden(&mut self, doc: &mut Document, aside: NodeKey, config: &Config, root: NodeKey) -> Result<(), DomError> {
        doc.set_attribute(aside, HIDDEN_ATTR, "true")?;
        doc.set_style(aside, "opacity", "0")?;
        self.set_layout(doc, root, config, false)
    }

    /// Reserve (or release) room for the panel beside the host root and move
    /// the toggle out of its way.
    fn set_layout(&mut self, doc: &mut Document, root: NodeKey, config: &Config, shown: bool) -> Result<(), DomError> {
        if let Some(previous) = self.margin_on.take()
            && previous != root
            && doc.is_live(previous)
        {
            doc.remove_style(previous, "margin-right")?;
        }
        if doc.style(root, "transition").is_none() {
            let transition = format!("margin-right {}ms ease", config.fade_ms);
            doc.set_style(root, "transition", &transition)?;
        }
        if shown {
            doc.set_style(root, "margin-right", &config.panel_width())?;
            self.margin_on = Some(root);
        } else {
            doc.remove_style(root, "margin-right")?;
        }
        if let Some(toggle) = doc.get_element_by_id(TOGGLE_ID) {
            doc.set_style(toggle, "right", &config.toggle_offset(shown))?;
        }
        Ok(())
    }
}
