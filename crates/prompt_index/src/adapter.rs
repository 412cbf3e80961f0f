//! Per-site strategies for finding the conversation root, the user's
//! messages and the conversation identifier.

use dom::Document;
use core_types::NodeKey;
use html::Selector;
use std::collections::HashSet;
use url::Url;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SiteAdapter {
    ChatGpt,
    /// Origin-agnostic fallback; always applicable.
    Generic,
}

const KNOWN_HOSTS: &[(&str, SiteAdapter)] = &[("chatgpt.com", SiteAdapter::ChatGpt)];

const MAIN: Selector = Selector::tag("main");
const ROLE_MAIN: Selector = Selector::tag_attr_eq("div", "role", "main");
const USER_MESSAGE: Selector = Selector::attr_eq("data-message-author-role", "user");
const MESSAGE_CONTAINER: Selector = Selector::tag("div");

impl SiteAdapter {
    /// Pick the adapter for `host` by domain suffix. Unknown or missing hosts
    /// get [`SiteAdapter::Generic`].
    pub fn resolve(host: Option<&str>) -> SiteAdapter {
        let Some(host) = host else {
            return SiteAdapter::Generic;
        };
        let host = host.to_ascii_lowercase();
        KNOWN_HOSTS
            .iter()
            .find(|(suffix, _)| {
                host == *suffix
                    || host
                        .strip_suffix(*suffix)
                        .is_some_and(|rest| rest.ends_with('.'))
            })
            .map(|(_, adapter)| *adapter)
            .unwrap_or(SiteAdapter::Generic)
    }

    pub fn for_document(doc: &Document) -> SiteAdapter {
        Self::resolve(doc.host())
    }

    pub fn name(self) -> &'static str {
        match self {
            SiteAdapter::ChatGpt => "chatgpt",
            SiteAdapter::Generic => "generic",
        }
    }

    /// Subtree to observe and to lay out around. Never fails: the `<html>`
    /// element is the last resort.
    pub fn root(self, doc: &Document) -> NodeKey {
        let specific = match self {
            SiteAdapter::ChatGpt => doc
                .query_selector(&MAIN)
                .or_else(|| doc.query_selector(&ROLE_MAIN)),
            SiteAdapter::Generic => doc.query_selector(&MAIN),
        };
        specific
            .or_else(|| doc.body())
            .unwrap_or_else(|| doc.document_element())
    }

    /// User messages in document order, each lifted to its enclosing `div`.
    pub fn messages(self, doc: &Document) -> Vec<NodeKey> {
        let mut seen = HashSet::new();
        doc.query_selector_all(&USER_MESSAGE)
            .into_iter()
            .map(|leaf| doc.closest(leaf, &MESSAGE_CONTAINER).unwrap_or(leaf))
            .filter(|container| seen.insert(*container))
            .collect()
    }

    pub fn session_id(self, doc: &Document) -> String {
        let location = doc.location();
        match self {
            SiteAdapter::ChatGpt => {
                conversation_segment(location).unwrap_or_else(|| location.to_string())
            }
            SiteAdapter::Generic => location.to_string(),
        }
    }
}

/// The segment after `/c/` in a conversation URL.
fn conversation_segment(url: &Url) -> Option<String> {
    let segments: Vec<&str> = url.path_segments()?.collect();
    segments
        .windows(2)
        .find(|w| w[0] == "c" && !w[1].is_empty())
        .map(|w| w[1].to_string())
}
