mod common;

use common::*;
use html_test_support::ChatPage;
use prompt_index::index::{ANCHOR_ATTR, INDEXED_ATTR};
use proptest::prelude::*;

#[test]
fn existing_messages_are_indexed_at_boot() {
    let mut rt = runtime(CHAT_URL);
    let mut page = ChatPage::new();
    page.scaffold();
    page.user_message("already here");
    page.assistant_message("an answer");
    page.user_message("me again");
    commit(&mut rt, &mut page);
    rt.start();

    let texts: Vec<_> = rt.core().entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["already here", "me again"]);
    assert_eq!(row_ids(&rt), vec!["pi-1", "pi-2"]);
}

#[test]
fn indexed_messages_carry_their_anchor() {
    let (mut rt, mut page) = booted_chat();
    let msg = page.user_message("anchored");
    commit(&mut rt, &mut page);
    let turn = node(&rt, msg.turn);
    assert_eq!(rt.document().attribute(turn, INDEXED_ATTR), Some("true"));
    assert_eq!(rt.document().attribute(turn, ANCHOR_ATTR), Some("pi-1"));
}

#[test]
fn streamed_message_is_indexed_once_text_arrives() {
    let (mut rt, mut page) = booted_chat();
    let msg = page.empty_message();
    commit(&mut rt, &mut page);
    assert!(rt.core().entries().is_empty());

    page.append_text(msg.body, "streamed ");
    commit(&mut rt, &mut page);
    page.append_text(msg.body, "in pieces");
    commit(&mut rt, &mut page);

    let entries = rt.core().entries();
    assert_eq!(entries.len(), 1);
    // Text is fixed at discovery.
    assert_eq!(entries[0].text, "streamed");
}

#[test]
fn stripped_tags_do_not_cause_duplicates() {
    let (mut rt, mut page) = booted_chat();
    let msg = page.user_message("keep me single");
    commit(&mut rt, &mut page);

    page.user_message("another");
    commit(&mut rt, &mut page);
    let turn = node(&rt, msg.turn);
    assert_eq!(rt.document().attribute(turn, INDEXED_ATTR), Some("true"));
    page.rerender_attributes(msg.turn, &[("data-message-author-role", "user")]);
    page.user_message("third");
    commit(&mut rt, &mut page);

    assert_eq!(sequences(&rt.core().project("")), vec![1, 2, 3]);
    assert_eq!(rt.document().attribute(turn, INDEXED_ATTR), None);
}

#[test]
fn rejected_batch_is_logged_not_fatal() {
    let (mut rt, mut page) = booted_chat();
    let stale = page.commit();
    page.user_message("after a gap");
    // Skip a version: the document refuses the next batch.
    let skipped = page.commit();
    send(&mut rt, skipped);
    assert!(rt.core().entries().is_empty());
    send(&mut rt, stale);
    assert!(rt.core().is_booted());
}

/// Messages split into consecutive batches at the given cut points.
fn batches_strategy() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (1usize..24).prop_flat_map(|n| (Just(n), proptest::collection::vec(0..=n, 0..6)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn no_message_is_lost_across_batches((n, mut cuts) in batches_strategy()) {
        cuts.push(n);
        cuts.sort_unstable();
        let (mut rt, mut page) = booted_chat();

        let mut next = 0;
        for cut in cuts {
            while next < cut {
                page.user_message(&format!("message number {next}"));
                next += 1;
            }
            commit(&mut rt, &mut page);
        }

        let entries = rt.core().entries();
        prop_assert_eq!(entries.len(), n);
        for (i, entry) in entries.iter().enumerate() {
            prop_assert_eq!(entry.sequence as usize, i + 1);
            prop_assert_eq!(&entry.text, &format!("message number {i}"));
        }
        prop_assert_eq!(row_ids(&rt).len(), n);
    }

    #[test]
    fn projection_is_the_case_insensitive_subset(
        texts in proptest::collection::vec("[a-cA-C ]{1,8}", 1..12),
        query in "[a-cA-C]{0,2}",
    ) {
        let (mut rt, mut page) = booted_chat();
        for text in &texts {
            page.user_message(&format!("#{text}"));
        }
        commit(&mut rt, &mut page);

        let projected = rt.core().project(&query);
        let expected: Vec<u32> = rt
            .core()
            .entries()
            .iter()
            .filter(|e| e.text.to_lowercase().contains(&query.to_lowercase()))
            .map(|e| e.sequence)
            .collect();
        prop_assert_eq!(sequences(&projected), expected);
    }
}
