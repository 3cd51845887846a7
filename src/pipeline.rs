//! One end-to-end digest run.
//!
//! 1. **Listing**: fetch each configured listing page and extract records
//! 2. **Filter**: recency window, title dedup, newest first
//! 3. **Enrich** (optional): fetch article bodies, summarize them
//! 4. **Format**: render the digest
//! 5. **Deliver**: hand it to the mailer, or print it when there is none
//!
//! Stages run strictly one after another and every await completes before
//! the next request starts. The network collaborators are trait-bound
//! parameters, so a run is reproducible from canned pages.

use crate::article::parse_article_body;
use crate::deliver::Mailer;
use crate::digest::{format_html, format_plain, subject};
use crate::errors::RunError;
use crate::extract::extract;
use crate::fetch::PageSource;
use crate::filter::filter_recent;
use crate::models::ArticleRecord;
use crate::rules::CompiledRules;
use crate::summarize::Summarize;
use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

/// Per-run knobs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub sites: Vec<String>,
    pub days_back: u32,
    pub full_content: bool,
    pub html: bool,
}

/// What a run produced.
#[derive(Debug)]
pub struct RunReport {
    pub records: Vec<ArticleRecord>,
    /// Candidates dropped during extraction, across all sites.
    pub skipped: usize,
    pub subject: String,
    pub body: String,
    /// `None` when no mailer was configured and the digest was printed.
    pub delivered: Option<bool>,
}

/// Fetch and extract every listing, in site order.
///
/// A site whose listing cannot be fetched is skipped. If none could be
/// fetched the run has nothing to work with and fails.
#[instrument(level = "info", skip_all, fields(sites = sites.len()))]
pub async fn collect_listings<P: PageSource>(
    fetcher: &P,
    sites: &[String],
    rules: &CompiledRules,
) -> Result<(Vec<ArticleRecord>, usize), RunError> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut fetched_any = false;

    for site in sites {
        let base = match Url::parse(site) {
            Ok(base) => base,
            Err(e) => {
                error!(%site, error = %e, "Invalid listing URL; skipping site");
                continue;
            }
        };
        let html = match fetcher.fetch(site).await {
            Ok(html) => html,
            Err(e) => {
                error!(%site, error = %e, "Listing fetch failed; skipping site");
                continue;
            }
        };
        fetched_any = true;

        let extraction = extract(&html, &base, rules);
        for reason in &extraction.skipped {
            debug!(%site, %reason, "Candidate skipped");
        }
        skipped += extraction.skipped.len();
        records.extend(extraction.records);
    }

    if !fetched_any {
        return Err(RunError::NoListings);
    }
    info!(records = records.len(), skipped, "Collected listing records");
    Ok((records, skipped))
}

/// Fetch article bodies and, when a summarizer is given, summarize them.
///
/// Each article is isolated: a failed fetch leaves it without a body, a
/// failed summary leaves it without a summary. Nothing here drops a record.
#[instrument(level = "info", skip_all, fields(records = records.len(), summarize = summarizer.is_some()))]
pub async fn enrich<P: PageSource, S: Summarize>(
    records: Vec<ArticleRecord>,
    fetcher: &P,
    summarizer: Option<&S>,
) -> Vec<ArticleRecord> {
    let enriched: Vec<ArticleRecord> = stream::iter(records)
        .then(move |mut record| async move {
            match fetcher.fetch(&record.link).await {
                Ok(html) => {
                    let body = parse_article_body(&html);
                    debug!(
                        link = %record.link,
                        words = body.word_count,
                        published = ?body.published_time_raw,
                        "Parsed article body"
                    );
                    record.body = Some(body);
                }
                Err(e) => {
                    warn!(link = %record.link, error = %e, "Article fetch failed; keeping listing data only");
                    return record;
                }
            }

            let Some(summarizer) = summarizer else {
                return record;
            };
            let text = match &record.body {
                Some(body) if !body.full_text.is_empty() => body.full_text.clone(),
                _ => {
                    debug!(link = %record.link, "No article text to summarize");
                    return record;
                }
            };
            match summarizer.summarize(&text).await {
                Ok(summary) => record.summary = Some(summary),
                Err(e) => {
                    warn!(link = %record.link, error = %e, "Summarization failed; keeping article without summary");
                }
            }
            record
        })
        .collect()
        .await;

    let with_body = enriched.iter().filter(|r| r.body.is_some()).count();
    let with_summary = enriched.iter().filter(|r| r.summary.is_some()).count();
    info!(with_body, with_summary, "Enriched articles");
    enriched
}

/// Run the whole pipeline once.
#[instrument(level = "info", skip_all, fields(%today, days_back = options.days_back))]
pub async fn run<P, S, M>(
    options: &RunOptions,
    rules: &CompiledRules,
    fetcher: &P,
    summarizer: Option<&S>,
    mailer: Option<&M>,
    today: NaiveDate,
) -> Result<RunReport, RunError>
where
    P: PageSource,
    S: Summarize,
    M: Mailer,
{
    let (records, skipped) = collect_listings(fetcher, &options.sites, rules).await?;
    let mut records = filter_recent(records, options.days_back, today);

    if options.full_content || summarizer.is_some() {
        records = enrich(records, fetcher, summarizer).await;
    }

    let subject = subject(today, records.len());
    let body = if options.html {
        format_html(&records)
    } else {
        format_plain(&records)
    };

    let delivered = match mailer {
        Some(mailer) => {
            let ok = mailer.send(&subject, &body, options.html).await;
            if ok {
                info!(%subject, "Digest delivered");
            } else {
                error!(%subject, "Digest delivery failed");
            }
            Some(ok)
        }
        None => {
            println!("{subject}\n\n{body}");
            None
        }
    };

    let report = RunReport {
        records,
        skipped,
        subject,
        body,
        delivered,
    };
    if report.delivered == Some(false) {
        return Err(RunError::Delivery);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{FetchError, SummarizeError};
    use crate::models::Category;
    use crate::rules::ExtractionRules;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const LISTING_URL: &str = "https://www.whitehouse.gov/news/";

    const LISTING: &str = r#"<ul>
      <li class="wp-block-post">
        <h2 class="wp-block-post-title"><a href="/presidential-actions/2025/06/eo/">Executive Order on Statements</a></h2>
        <time datetime="2025-06-10T09:00:00-04:00">June 10, 2025</time>
      </li>
      <li class="wp-block-post">
        <h2 class="wp-block-post-title"><a href="/briefings-statements/2025/06/fact-sheet/">Fact Sheet: Trade</a></h2>
        <time datetime="2025-06-10T08:00:00-04:00">June 10, 2025</time>
      </li>
      <li class="wp-block-post">
        <h2 class="wp-block-post-title"><a href="/briefings-statements/2025/06/briefing/">Press Briefing</a></h2>
        <div class="wp-block-post-date">June 9, 2025</div>
      </li>
      <li class="wp-block-post">
        <h2 class="wp-block-post-title"><a href="/briefings-statements/2025/06/old/">Old Proclamation</a></h2>
        <time datetime="2025-05-01">May 1, 2025</time>
      </li>
      <li class="wp-block-post">
        <h2 class="wp-block-post-title"><a href="/no-date/">Undated</a></h2>
      </li>
      <li class="wp-block-post">
        <h2 class="wp-block-post-title"><a href="/presidential-actions/2025/06/eo-dup/">Executive Order on Statements</a></h2>
        <time datetime="2025-06-10">June 10, 2025</time>
      </li>
    </ul>"#;

    struct FakePages(HashMap<String, String>);

    impl FakePages {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self(
                pages
                    .iter()
                    .map(|(url, html)| (url.to_string(), html.to_string()))
                    .collect(),
            )
        }
    }

    impl PageSource for FakePages {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.0.get(url).cloned().ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
        }
    }

    /// Fails on any text mentioning "fail", echoes a prefix otherwise.
    struct FakeSummarizer;

    impl Summarize for FakeSummarizer {
        async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
            if text.contains("fail") {
                Err(SummarizeError::EmptyCompletion)
            } else {
                Ok(format!("Summary of: {}", text.split_whitespace().next().unwrap_or("")))
            }
        }
    }

    struct RecordingMailer {
        accept: bool,
        sent: RefCell<Vec<(String, String, bool)>>,
    }

    impl RecordingMailer {
        fn new(accept: bool) -> Self {
            Self {
                accept,
                sent: RefCell::new(Vec::new()),
            }
        }
    }

    impl Mailer for RecordingMailer {
        async fn send(&self, subject: &str, body: &str, is_html: bool) -> bool {
            self.sent
                .borrow_mut()
                .push((subject.to_string(), body.to_string(), is_html));
            self.accept
        }
    }

    fn options(full_content: bool) -> RunOptions {
        RunOptions {
            sites: vec![LISTING_URL.to_string()],
            days_back: 7,
            full_content,
            html: false,
        }
    }

    fn rules() -> CompiledRules {
        ExtractionRules::default().compile().unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 10).unwrap()
    }

    fn article(text: &str) -> String {
        format!("<html><body><article><p>{text}</p></article></body></html>")
    }

    #[tokio::test]
    async fn test_run_listing_only() {
        let pages = FakePages::new(&[(LISTING_URL, LISTING)]);
        let mailer = RecordingMailer::new(true);

        let report = run(
            &options(false),
            &rules(),
            &pages,
            None::<&FakeSummarizer>,
            Some(&mailer),
            today(),
        )
        .await
        .unwrap();

        let titles: Vec<&str> = report.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            titles,
            vec!["Executive Order on Statements", "Fact Sheet: Trade", "Press Briefing"]
        );
        assert_eq!(report.records[0].category, Category::ExecutiveOrder);
        assert_eq!(
            report.records[0].link,
            "https://www.whitehouse.gov/presidential-actions/2025/06/eo/"
        );
        assert_eq!(report.skipped, 1);
        assert!(report.records.iter().all(|r| r.body.is_none()));
        assert_eq!(report.delivered, Some(true));

        let sent = mailer.sent.borrow();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "News digest for 2025-06-10 (3 articles)");
        assert_eq!(sent[0].1.matches("=== ").count(), 2);
        assert!(!sent[0].2);
    }

    #[tokio::test]
    async fn test_run_isolates_article_failures() {
        let pages = FakePages::new(&[
            (LISTING_URL, LISTING),
            (
                "https://www.whitehouse.gov/presidential-actions/2025/06/eo/",
                &article("Ordered text"),
            ),
            (
                "https://www.whitehouse.gov/briefings-statements/2025/06/fact-sheet/",
                &article("this will fail to summarize"),
            ),
        ]);
        let mailer = RecordingMailer::new(true);

        let report = run(
            &options(true),
            &rules(),
            &pages,
            Some(&FakeSummarizer),
            Some(&mailer),
            today(),
        )
        .await
        .unwrap();

        assert_eq!(report.records.len(), 3);
        let [eo, fact_sheet, briefing] = &report.records[..] else {
            panic!("expected three records");
        };
        assert_eq!(eo.summary.as_deref(), Some("Summary of: Ordered"));
        assert_eq!(eo.body.as_ref().unwrap().word_count, 2);
        assert!(fact_sheet.body.is_some());
        assert!(fact_sheet.summary.is_none());
        assert!(briefing.body.is_none());
        assert!(report.body.contains("Summary of: Ordered"));
    }

    #[tokio::test]
    async fn test_run_fails_without_any_listing() {
        let pages = FakePages::new(&[]);
        let err = run(
            &options(false),
            &rules(),
            &pages,
            None::<&FakeSummarizer>,
            None::<&RecordingMailer>,
            today(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RunError::NoListings));
    }

    #[tokio::test]
    async fn test_run_skips_failed_site_but_keeps_others() {
        let pages = FakePages::new(&[(LISTING_URL, LISTING)]);
        let mut opts = options(false);
        opts.sites.insert(0, "https://www.whitehouse.gov/missing/".to_string());
        opts.sites.push("not a url".to_string());

        let report = run(
            &opts,
            &rules(),
            &pages,
            None::<&FakeSummarizer>,
            None::<&RecordingMailer>,
            today(),
        )
        .await
        .unwrap();
        assert_eq!(report.records.len(), 3);
        assert_eq!(report.delivered, None);
    }

    #[tokio::test]
    async fn test_run_reports_delivery_failure() {
        let pages = FakePages::new(&[(LISTING_URL, LISTING)]);
        let mailer = RecordingMailer::new(false);
        let mut opts = options(false);
        opts.html = true;

        let err = run(
            &opts,
            &rules(),
            &pages,
            None::<&FakeSummarizer>,
            Some(&mailer),
            today(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RunError::Delivery));
        assert!(mailer.sent.borrow()[0].2);
    }

    #[tokio::test]
    async fn test_run_is_deterministic() {
        let pages = FakePages::new(&[(LISTING_URL, LISTING)]);
        let mut bodies = Vec::new();
        for _ in 0..2 {
            let report = run(
                &options(false),
                &rules(),
                &pages,
                None::<&FakeSummarizer>,
                None::<&RecordingMailer>,
                today(),
            )
            .await
            .unwrap();
            bodies.push(report.body);
        }
        assert_eq!(bodies[0], bodies[1]);
    }
}
