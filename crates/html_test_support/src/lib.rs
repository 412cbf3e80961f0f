//! Shared helpers for tests that drive a page the way a chat host would.

pub mod chat_page;
pub mod scenario;

pub use chat_page::{ChatPage, MessageKeys};
pub use scenario::{QueryCase, Scenario};

/// Human-readable report of the first mismatch between two line lists, with
/// two lines of context on each side. Empty when they are equal.
pub fn diff_lines(expected: &[String], actual: &[String]) -> String {
    use std::fmt::Write;

    const MISSING: &str = "<missing>";
    fn line(lines: &[String], i: usize) -> &str {
        lines.get(i).map(String::as_str).unwrap_or(MISSING)
    }

    let max = expected.len().max(actual.len());
    let Some(first) = (0..max).find(|&i| line(expected, i) != line(actual, i)) else {
        return String::new();
    };

    let mut out = String::new();
    let start = first.saturating_sub(2);
    let end = (first + 3).min(max);
    let _ = writeln!(&mut out, "first mismatch at line {}:", first + 1);
    for i in start..end {
        let marker = if i == first { ">" } else { " " };
        let _ = writeln!(&mut out, "{marker} {:>4}  expected: {}", i + 1, line(expected, i));
        let _ = writeln!(&mut out, "{marker} {:>4}    actual: {}", i + 1, line(actual, i));
    }
    let _ = writeln!(
        &mut out,
        "expected {} lines, actual {} lines",
        expected.len(),
        actual.len()
    );
    out
}
