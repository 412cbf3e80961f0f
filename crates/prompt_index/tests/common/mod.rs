#![allow(dead_code)]

use bus::HostEvent;
use core_types::NodeKey;
use dom::{Document, ReadyState};
use html::{PatchKey, Selector};
use html_test_support::ChatPage;
use prompt_index::chrome::{ENTRY_ATTR, LIST_ID, SEARCH_ID, SIDEBAR_ID, TOGGLE_ID};
use prompt_index::{Config, IndexEntry, PageRuntime};

pub const CHAT_URL: &str = "https://chatgpt.com/c/conv-1";

pub fn runtime(url: &str) -> PageRuntime {
    let mut doc = Document::new(url).expect("valid url");
    doc.set_ready_state(ReadyState::Complete);
    PageRuntime::new(doc, Config::default())
}

/// A booted runtime on a chat page that already has its `<main>` thread.
pub fn booted_chat() -> (PageRuntime, ChatPage) {
    let mut rt = runtime(CHAT_URL);
    let mut page = ChatPage::new();
    page.scaffold();
    send(&mut rt, page.commit());
    rt.start();
    (rt, page)
}

pub fn send(rt: &mut PageRuntime, event: HostEvent) {
    rt.sender().send(event).expect("bus is open");
    rt.pump();
}

pub fn commit(rt: &mut PageRuntime, page: &mut ChatPage) {
    send(rt, page.commit());
}

pub fn node(rt: &PageRuntime, key: PatchKey) -> NodeKey {
    rt.document()
        .resolve_patch_key(key)
        .unwrap_or_else(|| panic!("{key:?} is not live"))
}

pub fn by_id(rt: &PageRuntime, id: &str) -> NodeKey {
    rt.document()
        .get_element_by_id(id)
        .unwrap_or_else(|| panic!("#{id} missing"))
}

pub fn sidebar(rt: &PageRuntime) -> NodeKey {
    by_id(rt, SIDEBAR_ID)
}

pub fn toggle(rt: &PageRuntime) -> NodeKey {
    by_id(rt, TOGGLE_ID)
}

pub fn style(rt: &PageRuntime, key: NodeKey, property: &str) -> Option<String> {
    rt.document().style(key, property).map(str::to_owned)
}

pub fn sequences(entries: &[&IndexEntry]) -> Vec<u32> {
    entries.iter().map(|e| e.sequence).collect()
}

/// `data-pi-entry` of every rendered row, top to bottom.
pub fn row_ids(rt: &PageRuntime) -> Vec<String> {
    let doc = rt.document();
    let list = by_id(rt, LIST_ID);
    doc.children(list)
        .iter()
        .filter_map(|row| doc.attribute(*row, ENTRY_ATTR))
        .map(str::to_owned)
        .collect()
}

pub fn row(rt: &PageRuntime, entry_id: &str) -> NodeKey {
    let doc = rt.document();
    doc.query_selector_all(&Selector::has_attr(ENTRY_ATTR))
        .into_iter()
        .find(|row| doc.attribute(*row, ENTRY_ATTR) == Some(entry_id))
        .unwrap_or_else(|| panic!("no row for {entry_id}"))
}

pub fn click(rt: &mut PageRuntime, target: NodeKey) {
    send(rt, HostEvent::Click { target });
}

pub fn search(rt: &mut PageRuntime, query: &str) {
    let target = by_id(rt, SEARCH_ID);
    send(
        rt,
        HostEvent::Input {
            target,
            value: query.to_string(),
        },
    );
}
