//! Recency filtering, title deduplication, and ordering.

use crate::models::ArticleRecord;
use chrono::{Days, NaiveDate};
use itertools::Itertools;
use tracing::{info, instrument};

/// Earliest publication date still inside a `days_back` window ending `today`.
///
/// A window reaching past the earliest representable date saturates there.
pub fn cutoff(today: NaiveDate, days_back: u32) -> NaiveDate {
    today
        .checked_sub_days(Days::new(u64::from(days_back)))
        .unwrap_or(NaiveDate::MIN)
}

/// Keep records dated on or after the cutoff, drop repeated titles, and
/// sort newest first.
///
/// The first record seen with a given title wins. The sort is stable, so
/// records sharing a date keep their encounter order.
#[instrument(level = "info", skip(records), fields(input = records.len()))]
pub fn filter_recent(
    records: Vec<ArticleRecord>,
    days_back: u32,
    today: NaiveDate,
) -> Vec<ArticleRecord> {
    let cutoff = cutoff(today, days_back);

    let mut kept = records
        .into_iter()
        .filter(|record| record.published_date >= cutoff)
        .unique_by(|record| record.title.clone())
        .collect::<Vec<_>>();
    kept.sort_by(|a, b| b.published_date.cmp(&a.published_date));

    info!(%cutoff, kept = kept.len(), "Filtered records");
    kept
}
