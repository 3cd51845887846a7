//! Digest rendering.
//!
//! Records arrive sorted newest first. A date header is emitted whenever
//! the publication date changes from the previous record, so each date
//! forms exactly one group as long as the input is sorted.
//!
//! ```text
//! === Tuesday, June 10, 2025 ===
//!
//! Restoring Order Through Executive Order
//! [Executive Order]
//! The President signed an order ...
//! https://www.whitehouse.gov/presidential-actions/2025/06/eo-one/
//! ```

use crate::dates::long_form;
use crate::models::{ArticleBody, ArticleRecord};
use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};
use std::fmt::{self, Write as _};

/// Body used when nothing survived filtering.
pub const EMPTY_DIGEST: &str = "No new articles in this period.";

/// Email subject for a digest produced on `today`.
pub fn subject(today: NaiveDate, count: usize) -> String {
    let noun = if count == 1 { "article" } else { "articles" };
    format!("News digest for {today} ({count} {noun})")
}

/// One-line description of a fetched article body, e.g.
/// `412 words, by Jane Roe, topics: Economy, Trade, with images`.
pub fn body_meta(body: &ArticleBody) -> String {
    let mut parts = vec![format!("{} words", body.word_count)];
    if let Some(author) = &body.author {
        parts.push(format!("by {author}"));
    }
    if !body.topics.is_empty() {
        let topics = body.topics.iter().map(String::as_str).collect::<Vec<_>>();
        parts.push(format!("topics: {}", topics.join(", ")));
    }
    match (body.has_images, body.has_videos) {
        (true, true) => parts.push("with images and video".to_string()),
        (true, false) => parts.push("with images".to_string()),
        (false, true) => parts.push("with video".to_string()),
        (false, false) => {}
    }
    parts.join(", ")
}

/// Append one formatted line. Writing into a `String` cannot fail.
fn push_line(out: &mut String, args: fmt::Arguments<'_>) {
    let _ = out.write_fmt(args);
    out.push('\n');
}

/// Split sorted records into runs of equal publication date.
pub fn group_by_date(records: &[ArticleRecord]) -> Vec<(NaiveDate, Vec<&ArticleRecord>)> {
    let mut groups: Vec<(NaiveDate, Vec<&ArticleRecord>)> = Vec::new();
    for record in records {
        if let Some((date, items)) = groups.last_mut() {
            if *date == record.published_date {
                items.push(record);
                continue;
            }
        }
        groups.push((record.published_date, vec![record]));
    }
    groups
}

/// Render a plain-text digest.
pub fn format_plain(records: &[ArticleRecord]) -> String {
    if records.is_empty() {
        return format!("{EMPTY_DIGEST}\n");
    }

    let mut out = String::new();
    for (date, items) in group_by_date(records) {
        push_line(&mut out, format_args!("=== {} ===\n", long_form(date)));
        for record in items {
            push_line(&mut out, format_args!("{}", record.title));
            push_line(&mut out, format_args!("[{}]", record.category));
            if let Some(blurb) = record.blurb() {
                push_line(&mut out, format_args!("{blurb}"));
            }
            if let Some(body) = &record.body {
                push_line(&mut out, format_args!("({})", body_meta(body)));
            }
            push_line(&mut out, format_args!("{}\n", record.link));
        }
    }
    out
}

/// Render an HTML digest suitable for a `text/html` email body.
pub fn format_html(records: &[ArticleRecord]) -> String {
    let mut out = String::from("<html><body>\n");
    if records.is_empty() {
        push_line(&mut out, format_args!("<p>{EMPTY_DIGEST}</p>"));
    }

    for (date, items) in group_by_date(records) {
        push_line(&mut out, format_args!("<h2>{}</h2>\n<ul>", encode_text(&long_form(date))));
        for record in items {
            push_line(
                &mut out,
                format_args!(
                    "<li><a href=\"{}\">{}</a> <em>{}</em>",
                    encode_double_quoted_attribute(&record.link),
                    encode_text(&record.title),
                    record.category
                ),
            );
            if let Some(blurb) = record.blurb() {
                push_line(&mut out, format_args!("<p>{}</p>", encode_text(blurb)));
            }
            if let Some(body) = &record.body {
                push_line(&mut out, format_args!("<small>{}</small>", encode_text(&body_meta(body))));
            }
            push_line(&mut out, format_args!("</li>"));
        }
        push_line(&mut out, format_args!("</ul>"));
    }

    out.push_str("</body></html>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn record(title: &str, date: NaiveDate, category: Category) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            published_date: date,
            category,
            excerpt: None,
            link: format!("https://www.whitehouse.gov/{}/", title.to_lowercase().replace(' ', "-")),
            body: None,
            summary: None,
        }
    }

    fn sample() -> Vec<ArticleRecord> {
        let mut first = record("First Order", ymd(2025, 6, 10), Category::ExecutiveOrder);
        first.summary = Some("Short summary.".to_string());
        let mut second = record("Second Statement", ymd(2025, 6, 10), Category::Statement);
        second.excerpt = Some("Listing excerpt.".to_string());
        let third = record("Older Briefing", ymd(2025, 6, 9), Category::Briefing);
        vec![first, second, third]
    }

    #[test]
    fn test_group_by_date() {
        let records = sample();
        let groups = group_by_date(&records);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, ymd(2025, 6, 10));
        assert_eq!(groups[0].1.len(), 2);
        assert_eq!(groups[1].0, ymd(2025, 6, 9));
        assert_eq!(groups[1].1.len(), 1);
    }

    #[test]
    fn test_plain_has_one_header_per_date() {
        let out = format_plain(&sample());
        assert_eq!(out.matches("=== ").count(), 2);

        let june_10 = out.find("=== Tuesday, June 10, 2025 ===").unwrap();
        let june_9 = out.find("=== Monday, June 9, 2025 ===").unwrap();
        assert!(june_10 < june_9);

        let first = out.find("First Order").unwrap();
        let second = out.find("Second Statement").unwrap();
        let older = out.find("Older Briefing").unwrap();
        assert!(june_10 < first && first < second && second < june_9 && june_9 < older);
    }

    #[test]
    fn test_plain_record_block() {
        let out = format_plain(&sample());
        assert!(out.contains(
            "First Order\n[Executive Order]\nShort summary.\nhttps://www.whitehouse.gov/first-order/\n\n"
        ));
        assert!(out.contains("Second Statement\n[Statement]\nListing excerpt.\n"));
        assert!(out.contains("Older Briefing\n[Briefing]\nhttps://www.whitehouse.gov/older-briefing/\n"));
    }

    #[test]
    fn test_plain_exact_layout() {
        let records = vec![record("Older Briefing", ymd(2025, 6, 9), Category::Briefing)];
        assert_eq!(
            format_plain(&records),
            "=== Monday, June 9, 2025 ===\n\nOlder Briefing\n[Briefing]\nhttps://www.whitehouse.gov/older-briefing/\n\n"
        );
        assert_eq!(
            format_html(&records),
            "<html><body>\n<h2>Monday, June 9, 2025</h2>\n<ul>\n\
             <li><a href=\"https://www.whitehouse.gov/older-briefing/\">Older Briefing</a> <em>Briefing</em>\n\
             </li>\n</ul>\n</body></html>\n"
        );
    }

    #[test]
    fn test_plain_empty() {
        assert_eq!(format_plain(&[]), format!("{EMPTY_DIGEST}\n"));
    }

    #[test]
    fn test_html_groups_and_escapes() {
        let mut records = sample();
        records[0].title = "Tariffs & <Trade>".to_string();
        let out = format_html(&records);
        assert_eq!(out.matches("<h2>").count(), 2);
        assert_eq!(out.matches("<li>").count(), 3);
        assert!(out.contains("Tariffs &amp; &lt;Trade&gt;"));
        assert!(out.contains("<em>Executive Order</em>"));
        assert!(out.contains("<p>Short summary.</p>"));
    }

    #[test]
    fn test_html_empty() {
        let out = format_html(&[]);
        assert!(out.contains(EMPTY_DIGEST));
        assert!(!out.contains("<h2>"));
    }

    #[test]
    fn test_body_meta_line() {
        let body = ArticleBody {
            full_text: "a b c".to_string(),
            word_count: 3,
            author: Some("Jane Roe".to_string()),
            topics: ["Trade".to_string(), "Economy".to_string()].into_iter().collect(),
            has_images: true,
            ..ArticleBody::default()
        };
        assert_eq!(
            body_meta(&body),
            "3 words, by Jane Roe, topics: Economy, Trade, with images"
        );

        let mut records = sample();
        records[2].body = Some(body);
        let out = format_plain(&records);
        assert!(out.contains(
            "Older Briefing\n[Briefing]\n(3 words, by Jane Roe, topics: Economy, Trade, with images)\nhttps://"
        ));
    }

    #[test]
    fn test_subject() {
        assert_eq!(subject(ymd(2025, 6, 10), 3), "News digest for 2025-06-10 (3 articles)");
        assert_eq!(subject(ymd(2025, 6, 10), 1), "News digest for 2025-06-10 (1 article)");
    }
}
