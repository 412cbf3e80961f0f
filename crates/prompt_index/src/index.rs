//! Incremental, idempotent indexing of message elements.
//!
//! Invariants:
//! - An element is represented by at most one entry, however often it is
//!   enumerated.
//! - Sequence numbers start at 1, are dense, and are never reassigned.
//! - An element whose text is still empty is not tagged and is reconsidered on
//!   the next pass, up to `max_empty_retries` passes.
//! - The in-memory tag set decides what was seen. The `data-pi-indexed`
//!   marker is written for the host's benefit and never read back.

use crate::adapter::SiteAdapter;
use core_types::{NodeKey, Sequence};
use dom::Document;
use html::text::{contains_folded, fold_case, normalize_whitespace};
use std::collections::{HashMap, HashSet};

pub const INDEXED_ATTR: &str = "data-pi-indexed";
pub const ANCHOR_ATTR: &str = "data-pi-anchor";

/// One discovered message. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub sequence: Sequence,
    pub text: String,
    /// Weak reference: the host owns the element and may remove it.
    pub element: NodeKey,
    folded: String,
}

impl IndexEntry {
    fn new(sequence: Sequence, text: String, element: NodeKey) -> Self {
        let folded = fold_case(&text);
        Self {
            id: entry_id(sequence),
            sequence,
            text,
            element,
            folded,
        }
    }

    /// Substring test against a query already passed through `fold_case`.
    pub fn matches_folded(&self, folded_query: &str) -> bool {
        contains_folded(&self.folded, folded_query)
    }
}

pub fn entry_id(sequence: Sequence) -> String {
    format!("pi-{sequence}")
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReindexOutcome {
    pub scanned: usize,
    pub added: usize,
    /// Elements skipped this pass because their text was still empty.
    pub deferred: usize,
}

#[derive(Debug)]
pub struct Indexer {
    entries: Vec<IndexEntry>,
    tagged: HashSet<NodeKey>,
    empty_passes: HashMap<NodeKey, u32>,
    abandoned: HashSet<NodeKey>,
    max_empty_retries: u32,
}

impl Indexer {
    pub fn new(max_empty_retries: u32) -> Self {
        Self {
            entries: Vec::new(),
            tagged: HashSet::new(),
            empty_passes: HashMap::new(),
            abandoned: HashSet::new(),
            max_empty_retries,
        }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, id: &str) -> Option<&IndexEntry> {
        let sequence: Sequence = id.strip_prefix("pi-")?.parse().ok()?;
        let index = usize::try_from(sequence).ok()?.checked_sub(1)?;
        self.entries.get(index)
    }

    fn next_sequence(&self) -> Sequence {
        self.entries.len() as Sequence + 1
    }

    /// Fold every not-yet-seen message element the adapter enumerates into
    /// the index.
    pub fn reindex(&mut self, doc: &mut Document, adapter: SiteAdapter) -> ReindexOutcome {
        let elements = adapter.messages(doc);
        let mut outcome = ReindexOutcome {
            scanned: elements.len(),
            ..ReindexOutcome::default()
        };

        for element in elements {
            if self.tagged.contains(&element) || self.abandoned.contains(&element) {
                continue;
            }

            let text = normalize_whitespace(&doc.inner_text(element));
            if text.is_empty() {
                self.defer(element);
                outcome.deferred += 1;
                continue;
            }

            let entry = IndexEntry::new(self.next_sequence(), text, element);
            if let Err(err) = doc
                .set_attribute(element, INDEXED_ATTR, "true")
                .and_then(|_| doc.set_attribute(element, ANCHOR_ATTR, &entry.id))
            {
                log::debug!(target: "prompt_index.indexer", "could not tag {element:?}: {err}");
            }
            log::trace!(
                target: "prompt_index.indexer",
                "indexed {} ({element:?}, {} chars)",
                entry.id,
                entry.text.len()
            );
            self.tagged.insert(element);
            self.empty_passes.remove(&element);
            self.entries.push(entry);
            outcome.added += 1;
        }
        // Removed elements are never enumerated again.
        self.empty_passes.retain(|element, _| doc.is_live(*element));

        if outcome.added > 0 {
            log::debug!(
                target: "prompt_index.indexer",
                "reindex added {} of {} scanned, {} total",
                outcome.added,
                outcome.scanned,
                self.entries.len()
            );
        }
        outcome
    }

    fn defer(&mut self, element: NodeKey) {
        let passes = self.empty_passes.entry(element).or_insert(0);
        *passes += 1;
        if *passes > self.max_empty_retries {
            self.empty_passes.remove(&element);
            self.abandoned.insert(element);
            log::debug!(
                target: "prompt_index.indexer",
                "abandoning {element:?}: still empty after {} passes",
                self.max_empty_retries
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Document {
        Document::new("https://chatgpt.com/c/t1").unwrap()
    }

    fn user_message(doc: &mut Document, text: &str) -> (NodeKey, NodeKey) {
        let body = doc.body().unwrap();
        let turn = doc.create_element("div");
        doc.set_attribute(turn, "data-message-author-role", "user").unwrap();
        let t = doc.create_text(text);
        doc.append_child(turn, t).unwrap();
        doc.append_child(body, turn).unwrap();
        (turn, t)
    }

    #[test]
    fn reindex_twice_is_a_no_op() {
        let mut doc = page();
        user_message(&mut doc, "hello");
        user_message(&mut doc, "world");
        let mut indexer = Indexer::new(8);
        let first = indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        let snapshot = indexer.entries().to_vec();
        let second = indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert_eq!(first.added, 2);
        assert_eq!(second.added, 0);
        assert_eq!(indexer.entries(), snapshot.as_slice());
    }

    #[test]
    fn entries_are_tagged_in_the_document() {
        let mut doc = page();
        let (turn, _) = user_message(&mut doc, "  spaced \n out  ");
        let mut indexer = Indexer::new(8);
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        let entry = &indexer.entries()[0];
        assert_eq!(entry.id, "pi-1");
        assert_eq!(entry.sequence, 1);
        assert_eq!(entry.text, "spaced out");
        assert_eq!(doc.attribute(turn, INDEXED_ATTR), Some("true"));
        assert_eq!(doc.attribute(turn, ANCHOR_ATTR), Some("pi-1"));
        assert_eq!(indexer.entry("pi-1").map(|e| e.element), Some(turn));
        assert!(indexer.entry("pi-0").is_none());
        assert!(indexer.entry("bogus").is_none());
    }

    #[test]
    fn empty_elements_are_retried_until_they_render() {
        let mut doc = page();
        let (turn, text) = user_message(&mut doc, "   ");
        let mut indexer = Indexer::new(8);
        let pass = indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert_eq!(pass.deferred, 1);
        assert!(indexer.is_empty());
        assert_eq!(doc.attribute(turn, INDEXED_ATTR), None);

        doc.set_text(text, "finally here").unwrap();
        assert_eq!(indexer.reindex(&mut doc, SiteAdapter::ChatGpt).added, 1);
        assert_eq!(indexer.reindex(&mut doc, SiteAdapter::ChatGpt).added, 0);
        assert_eq!(indexer.entries()[0].text, "finally here");
    }

    #[test]
    fn empty_retries_are_bounded() {
        let mut doc = page();
        let (_, text) = user_message(&mut doc, "");
        let mut indexer = Indexer::new(2);
        for _ in 0..3 {
            indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        }
        doc.set_text(text, "too late").unwrap();
        let pass = indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert_eq!(pass.added, 0);
        assert_eq!(pass.deferred, 0);
    }

    #[test]
    fn stripped_tags_do_not_cause_duplicates() {
        let mut doc = page();
        let (turn, _) = user_message(&mut doc, "once");
        let mut indexer = Indexer::new(8);
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        doc.remove_attribute(turn, INDEXED_ATTR).unwrap();
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert_eq!(indexer.len(), 1);
    }

    #[test]
    fn copied_marker_does_not_hide_a_new_element() {
        let mut doc = page();
        let (turn, _) = user_message(&mut doc, "cloned");
        doc.set_attribute(turn, INDEXED_ATTR, "true").unwrap();
        let mut indexer = Indexer::new(8);
        assert_eq!(indexer.reindex(&mut doc, SiteAdapter::ChatGpt).added, 1);
        assert_eq!(indexer.entries()[0].element, turn);
    }

    #[test]
    fn removed_empty_elements_are_forgotten() {
        let mut doc = page();
        let (turn, _) = user_message(&mut doc, "");
        let mut indexer = Indexer::new(8);
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert!(indexer.empty_passes.contains_key(&turn));

        doc.remove(turn).unwrap();
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert!(indexer.empty_passes.is_empty());
    }

    #[test]
    fn text_snapshot_is_immutable() {
        let mut doc = page();
        let (_, text) = user_message(&mut doc, "original");
        let mut indexer = Indexer::new(8);
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        doc.set_text(text, "edited").unwrap();
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        assert_eq!(indexer.entries()[0].text, "original");
    }

    #[test]
    fn removed_elements_keep_their_entry_and_numbering() {
        let mut doc = page();
        let (first, _) = user_message(&mut doc, "one");
        let mut indexer = Indexer::new(8);
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        doc.remove(first).unwrap();
        user_message(&mut doc, "two");
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        let sequences: Vec<_> = indexer.entries().iter().map(|e| e.sequence).collect();
        assert_eq!(sequences, vec![1, 2]);
        assert!(!doc.is_live(indexer.entries()[0].element));
    }
}
