//! Small text helpers shared by the extractor, summarizer, and logging.

/// Trim and collapse every run of whitespace to a single space.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(collapse_whitespace("  Fact\n\t Sheet  "), "Fact Sheet");
/// ```
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Count whitespace-delimited tokens.
pub fn word_count(s: &str) -> usize {
    s.split_whitespace().count()
}

/// Truncate a string for logging purposes.
///
/// Long strings are cut to `max` characters with an ellipsis and the number
/// of dropped bytes appended. Cuts always land on a char boundary.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        None => s.to_string(),
        Some((cut, _)) => format!("{}…(+{} bytes)", &s[..cut], s.len() - cut),
    }
}
