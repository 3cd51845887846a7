//! Date text normalization.
//!
//! Listing markup carries dates either as machine-readable ISO-8601
//! (`2025-05-27T12:40:25-04:00`) or as long-form prose (`May 27, 2025`).
//! Both reduce to a [`NaiveDate`]; time of day is discarded.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static ISO_DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{2}-\d{2}").unwrap());

static LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:January|February|March|April|May|June|July|August|September|October|November|December)\s+\d{1,2},?\s+\d{4}\b",
    )
    .unwrap()
});

/// Parse a calendar date out of arbitrary text.
///
/// The ISO pattern is tried first. If an ISO-looking substring is present it
/// decides the outcome alone, so `2025-13-40` yields `None` even when a
/// long-form date follows. Otherwise the first `Month D, YYYY` (comma
/// optional) is parsed.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    if let Some(m) = ISO_DATE.find(text) {
        return NaiveDate::parse_from_str(m.as_str(), "%Y-%m-%d").ok();
    }

    let m = LONG_DATE.find(text)?;
    let normalized = m
        .as_str()
        .replace(',', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    NaiveDate::parse_from_str(&normalized, "%B %d %Y").ok()
}

/// Long-form rendering used in digest headers, e.g. `Tuesday, June 10, 2025`.
pub fn long_form(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}
