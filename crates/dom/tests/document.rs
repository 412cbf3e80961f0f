use core_types::{DomVersion, EventKind, ListenerId};
use dom::{DomError, Document, ObserveOptions, ScrollBehavior, ScrollBlock, ScrollOptions};
use html::{DomPatch, PatchKey, Selector};

const SMOOTH_CENTER: ScrollOptions = ScrollOptions {
    behavior: ScrollBehavior::Smooth,
    block: ScrollBlock::Center,
};

fn doc() -> Document {
    Document::new("https://chatgpt.com/c/abc").unwrap()
}

fn element_with_text(doc: &mut Document, parent: core_types::NodeKey, name: &str, text: &str) -> core_types::NodeKey {
    let el = doc.create_element(name);
    let t = doc.create_text(text);
    doc.append_child(el, t).unwrap();
    doc.append_child(parent, el).unwrap();
    el
}

#[test]
fn new_document_has_body_and_permanent_root() {
    let mut doc = doc();
    let body = doc.body().expect("body");
    assert!(doc.is_connected(body));
    assert!(matches!(
        doc.remove(doc.document_element()),
        Err(DomError::Protected(_))
    ));
    doc.remove(body).unwrap();
    assert!(doc.body().is_none());
    assert!(!doc.is_live(body));
}

#[test]
fn get_element_by_id_ignores_detached_nodes() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let detached = doc.create_element("aside");
    doc.set_attribute(detached, "id", "pi-sidebar").unwrap();
    assert_eq!(doc.get_element_by_id("pi-sidebar"), None);
    doc.append_child(body, detached).unwrap();
    assert_eq!(doc.get_element_by_id("pi-sidebar"), Some(detached));
}

#[test]
fn closest_is_inclusive() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let outer = doc.create_element("div");
    doc.append_child(body, outer).unwrap();
    let inner = element_with_text(&mut doc, outer, "span", "x");
    assert_eq!(doc.closest(inner, &Selector::tag("div")), Some(outer));
    assert_eq!(doc.closest(outer, &Selector::tag("div")), Some(outer));
    assert_eq!(doc.closest(inner, &Selector::tag("main")), None);
}

#[test]
fn inner_text_skips_scripts_and_breaks_blocks() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let wrapper = doc.create_element("div");
    doc.append_child(body, wrapper).unwrap();
    element_with_text(&mut doc, wrapper, "p", "first");
    element_with_text(&mut doc, wrapper, "script", "var x;");
    element_with_text(&mut doc, wrapper, "p", "second");
    assert_eq!(doc.inner_text(wrapper), "first\nsecond\n\n");
}

#[test]
fn subtree_observer_sees_deep_insertions_only_under_target() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let main = doc.create_element("main");
    doc.append_child(body, main).unwrap();
    let observer = doc.observe(main, ObserveOptions::SUBTREE_CHILD_LIST).unwrap();

    let thread = doc.create_element("div");
    doc.append_child(main, thread).unwrap();
    let msg = element_with_text(&mut doc, thread, "div", "hello");
    let aside = doc.create_element("aside");
    doc.append_child(body, aside).unwrap();

    let batches = doc.take_mutation_records();
    assert_eq!(batches.len(), 1);
    let (id, records) = &batches[0];
    assert_eq!(*id, observer);
    let added: Vec<_> = records.iter().flat_map(|r| r.added.clone()).collect();
    assert_eq!(added, vec![thread, msg]);
    assert!(!doc.has_pending_mutations());
}

#[test]
fn disconnect_drops_pending_records_and_reports_second_call() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let observer = doc.observe(body, ObserveOptions::SUBTREE_CHILD_LIST).unwrap();
    element_with_text(&mut doc, body, "div", "x");
    doc.disconnect(observer).unwrap();
    assert!(doc.take_mutation_records().is_empty());
    assert!(matches!(
        doc.disconnect(observer),
        Err(DomError::UnknownObserver(_))
    ));
}

#[test]
fn dispatch_bubbles_to_ancestors() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let list = doc.create_element("div");
    doc.append_child(body, list).unwrap();
    let row = element_with_text(&mut doc, list, "button", "1");
    doc.add_event_listener(list, EventKind::Click, ListenerId(7)).unwrap();
    doc.add_event_listener(list, EventKind::Click, ListenerId(7)).unwrap();
    doc.add_event_listener(row, EventKind::Input, ListenerId(8)).unwrap();

    let fired = doc.dispatch(row, EventKind::Click).unwrap();
    assert_eq!(fired, vec![ListenerId(7)]);
}

#[test]
fn scroll_on_removed_node_is_an_error_not_a_panic() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let el = element_with_text(&mut doc, body, "div", "x");
    doc.scroll_into_view(el, SMOOTH_CENTER).unwrap();
    doc.remove(el).unwrap();
    assert!(matches!(
        doc.scroll_into_view(el, SMOOTH_CENTER),
        Err(DomError::DeadNode(_))
    ));
    assert_eq!(doc.scrolls().len(), 1);
}

#[test]
fn patch_batches_are_versioned() {
    let mut doc = doc();
    let main = PatchKey(16);
    let patches = vec![
        DomPatch::element(main, "main", &[]),
        DomPatch::AppendChild {
            parent: PatchKey::BODY,
            child: main,
        },
    ];
    assert!(matches!(
        doc.apply(DomVersion(0), DomVersion(2), &patches),
        Err(DomError::NonMonotonicVersion { .. })
    ));
    doc.apply(DomVersion(0), DomVersion(1), &patches).unwrap();
    assert_eq!(doc.version(), DomVersion(1));
    assert!(doc.query_selector(&Selector::tag("main")).is_some());
    assert!(matches!(
        doc.apply(DomVersion(0), DomVersion(1), &[]),
        Err(DomError::VersionMismatch { .. })
    ));
}

#[test]
fn patch_keys_are_never_reused() {
    let mut doc = doc();
    let key = PatchKey(20);
    doc.apply(
        DomVersion(0),
        DomVersion(1),
        &[
            DomPatch::CreateText {
                key,
                text: "a".into(),
            },
            DomPatch::AppendChild {
                parent: PatchKey::BODY,
                child: key,
            },
            DomPatch::RemoveNode { key },
        ],
    )
    .unwrap();
    assert!(matches!(
        doc.apply(
            DomVersion(1),
            DomVersion(2),
            &[DomPatch::CreateText {
                key,
                text: "b".into()
            }]
        ),
        Err(DomError::DuplicateKey(_))
    ));
    assert!(matches!(
        doc.apply(DomVersion(1), DomVersion(2), &[DomPatch::RemoveNode { key }]),
        Err(DomError::MissingKey(_))
    ));
}

#[test]
fn set_attributes_patch_replaces_foreign_tags() {
    let mut doc = doc();
    let key = PatchKey(30);
    doc.apply(
        DomVersion(0),
        DomVersion(1),
        &[
            DomPatch::element(key, "div", &[("data-message-author-role", "user")]),
            DomPatch::AppendChild {
                parent: PatchKey::BODY,
                child: key,
            },
        ],
    )
    .unwrap();
    let node = doc.resolve_patch_key(key).unwrap();
    doc.set_attribute(node, "data-pi-indexed", "true").unwrap();
    doc.apply(
        DomVersion(1),
        DomVersion(2),
        &[DomPatch::SetAttributes {
            key,
            attributes: vec![],
        }],
    )
    .unwrap();
    assert_eq!(doc.attribute(node, "data-pi-indexed"), None);
}

#[test]
fn set_text_content_is_a_no_op_for_identical_text() {
    let mut doc = doc();
    let body = doc.body().unwrap();
    let label = doc.create_element("span");
    doc.append_child(body, label).unwrap();
    doc.set_text_content(label, "abc").unwrap();
    let observer = doc.observe(label, ObserveOptions::SUBTREE_CHILD_LIST).unwrap();
    doc.set_text_content(label, "abc").unwrap();
    assert!(doc.take_mutation_records().is_empty());
    doc.set_text_content(label, "def").unwrap();
    assert_eq!(doc.take_mutation_records()[0].0, observer);
    assert_eq!(doc.inner_text(label), "def");
}

#[test]
fn set_location_resolves_relative_paths() {
    let mut doc = doc();
    doc.set_location("/c/xyz").unwrap();
    assert_eq!(doc.location().as_str(), "https://chatgpt.com/c/xyz");
    assert_eq!(doc.host(), Some("chatgpt.com"));
}
