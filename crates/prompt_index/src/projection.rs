use crate::index::IndexEntry;
use html::text::fold_case;

/// Entries whose text contains `query`, ignoring case, in sequence order.
/// The empty query matches everything.
pub fn project<'a>(entries: &'a [IndexEntry], query: &str) -> Vec<&'a IndexEntry> {
    let folded = fold_case(query);
    entries
        .iter()
        .filter(|entry| entry.matches_folded(&folded))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::SiteAdapter;
    use crate::index::Indexer;
    use dom::Document;

    fn indexed(texts: &[&str]) -> Indexer {
        let mut doc = Document::new("https://chatgpt.com/").unwrap();
        let body = doc.body().unwrap();
        for text in texts {
            let el = doc.create_element("div");
            doc.set_attribute(el, "data-message-author-role", "user").unwrap();
            let t = doc.create_text(text);
            doc.append_child(el, t).unwrap();
            doc.append_child(body, el).unwrap();
        }
        let mut indexer = Indexer::new(8);
        indexer.reindex(&mut doc, SiteAdapter::ChatGpt);
        indexer
    }

    fn sequences(entries: &[&IndexEntry]) -> Vec<u32> {
        entries.iter().map(|e| e.sequence).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let indexer = indexed(&["a", "b", "c"]);
        assert_eq!(sequences(&project(indexer.entries(), "")), vec![1, 2, 3]);
    }

    #[test]
    fn query_matches_case_insensitively() {
        let indexer = indexed(&["hello", "goodbye world", "HELLO again"]);
        assert_eq!(sequences(&project(indexer.entries(), "hello")), vec![1, 3]);
        assert_eq!(sequences(&project(indexer.entries(), "WORLD")), vec![2]);
        assert!(project(indexer.entries(), "absent").is_empty());
    }

    #[test]
    fn query_is_not_trimmed() {
        let indexer = indexed(&["goodbye world", "helloworld"]);
        assert_eq!(sequences(&project(indexer.entries(), " world")), vec![1]);
    }
}
