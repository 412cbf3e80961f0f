//! Text helpers for indexing and searching rendered content.

use memchr::memmem;

/// Collapse every run of whitespace into a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}

/// Truncate `text` to at most `max_chars` characters, ending with `…` when cut.
///
/// Whitespace is normalized first so a snippet always fits on one line.
pub fn snippet(text: &str, max_chars: usize) -> String {
    let text = normalize_whitespace(text);
    if text.chars().count() <= max_chars {
        return text;
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = text.chars().take(keep).collect();
    out.push('…');
    out
}

/// Case-fold a string for containment checks.
pub fn fold_case(text: &str) -> String {
    if text.is_ascii() {
        text.to_ascii_lowercase()
    } else {
        text.to_lowercase()
    }
}

/// Substring test on strings already passed through [`fold_case`].
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    if haystack.len() < needle.len() {
        return false;
    }
    memmem::find(haystack.as_bytes(), needle.as_bytes()).is_some()
}

pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    contains_folded(&fold_case(haystack), &fold_case(needle))
}
