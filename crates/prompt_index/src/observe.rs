//! Structural subscription on the adapter's root.

use crate::adapter::SiteAdapter;
use core_types::{NodeKey, ObserverId};
use dom::{Document, MutationRecord, ObserveOptions};

#[derive(Debug, Default)]
pub struct Observation {
    subscription: Option<ObserverId>,
}

impl Observation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscription(&self) -> Option<ObserverId> {
        self.subscription
    }

    /// Subscribe to the current root. Any earlier subscription is cancelled
    /// first so two are never live at once.
    pub fn start(&mut self, doc: &mut Document, adapter: SiteAdapter) {
        self.stop(doc);
        let root = adapter.root(doc);
        match doc.observe(root, ObserveOptions::SUBTREE_CHILD_LIST) {
            Ok(id) => {
                log::debug!(target: "prompt_index.observe", "observing {root:?} as {id:?}");
                self.subscription = Some(id);
            }
            Err(err) => log::debug!(target: "prompt_index.observe", "cannot observe {root:?}: {err}"),
        }
    }

    pub fn stop(&mut self, doc: &mut Document) {
        if let Some(prior) = self.subscription.take()
            && let Err(err) = doc.disconnect(prior)
        {
            // The host may have torn the subscription down already.
            log::debug!(target: "prompt_index.observe", "disconnect {prior:?}: {err}");
        }
    }

    /// Whether a drained batch should trigger a reindex. Batches from stale
    /// subscriptions and batches that only touch `chrome` are dropped.
    pub fn wants(
        &self,
        doc: &Document,
        from: ObserverId,
        records: &[MutationRecord],
        chrome: &[NodeKey],
    ) -> bool {
        if self.subscription != Some(from) {
            return false;
        }
        !records.iter().all(|record| touches_only(doc, record, chrome))
    }
}

fn touches_only(doc: &Document, record: &MutationRecord, chrome: &[NodeKey]) -> bool {
    if chrome.iter().any(|c| doc.contains(*c, record.target)) {
        return true;
    }
    record
        .added
        .iter()
        .chain(&record.removed)
        .all(|node| chrome.contains(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::new("https://example.org/").unwrap()
    }

    #[test]
    fn restart_cancels_prior_subscription() {
        let mut doc = doc();
        let mut obs = Observation::new();
        obs.start(&mut doc, SiteAdapter::Generic);
        let first = obs.subscription().unwrap();
        obs.start(&mut doc, SiteAdapter::Generic);
        let second = obs.subscription().unwrap();
        assert_ne!(first, second);
        assert!(!doc.is_observing(first));
        assert!(doc.is_observing(second));
    }

    #[test]
    fn stop_swallows_an_already_inactive_subscription() {
        let mut doc = doc();
        let mut obs = Observation::new();
        obs.start(&mut doc, SiteAdapter::Generic);
        let id = obs.subscription().unwrap();
        doc.disconnect(id).unwrap();
        obs.stop(&mut doc);
        assert_eq!(obs.subscription(), None);
    }

    #[test]
    fn chrome_only_batches_are_dropped() {
        let mut doc = doc();
        let mut obs = Observation::new();
        obs.start(&mut doc, SiteAdapter::Generic);
        let id = obs.subscription().unwrap();
        let body = doc.body().unwrap();

        let panel = doc.create_element("aside");
        doc.append_child(body, panel).unwrap();
        let row = doc.create_element("button");
        doc.append_child(panel, row).unwrap();
        let batches = doc.take_mutation_records();
        let (from, records) = &batches[0];
        assert_eq!(*from, id);
        assert!(!obs.wants(&doc, *from, records, &[panel]));

        let message = doc.create_element("div");
        doc.append_child(body, message).unwrap();
        let batches = doc.take_mutation_records();
        assert!(obs.wants(&doc, batches[0].0, &batches[0].1, &[panel]));
    }

    #[test]
    fn stale_subscription_batches_are_dropped() {
        let mut doc = doc();
        let mut obs = Observation::new();
        obs.start(&mut doc, SiteAdapter::Generic);
        let records = vec![MutationRecord {
            target: doc.body().unwrap(),
            added: vec![NodeKey(999)],
            removed: Vec::new(),
        }];
        assert!(!obs.wants(&doc, ObserverId(4242), &records, &[]));
    }
}
