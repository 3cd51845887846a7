//! Listing page extraction.
//!
//! Turns listing HTML into [`ArticleRecord`]s using a [`CompiledRules`]
//! fallback chain per field. Each candidate node is handled on its own:
//! a candidate that lacks a title, a parseable date, or a usable link is
//! dropped and its reason recorded, and the rest of the batch carries on.

use crate::dates::parse_date;
use crate::errors::CandidateError;
use crate::models::{ArticleRecord, Category};
use crate::rules::CompiledRules;
use crate::utils::collapse_whitespace;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

static ANCHOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Result of one extraction pass over a listing page.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Records in document order.
    pub records: Vec<ArticleRecord>,
    /// One entry per dropped candidate.
    pub skipped: Vec<CandidateError>,
}

/// Extract every candidate article from `html`.
///
/// `base` is the listing URL; relative hrefs are resolved against its origin.
#[instrument(level = "info", skip_all, fields(base = %base))]
pub fn extract(html: &str, base: &Url, rules: &CompiledRules) -> Extraction {
    let document = Html::parse_document(html);
    let candidates = select_candidates(&document, rules);

    let mut extraction = Extraction::default();
    for node in candidates {
        match extract_candidate(node, base, rules) {
            Ok(record) => extraction.records.push(record),
            Err(e) => {
                debug!(reason = %e, "Skipping candidate");
                extraction.skipped.push(e);
            }
        }
    }

    info!(
        records = extraction.records.len(),
        skipped = extraction.skipped.len(),
        "Extracted listing candidates"
    );
    extraction
}

/// First candidate selector that matches anything defines the candidate set.
fn select_candidates<'a>(document: &'a Html, rules: &CompiledRules) -> Vec<ElementRef<'a>> {
    rules
        .candidates
        .iter()
        .map(|selector| document.select(selector).collect::<Vec<_>>())
        .find(|found| !found.is_empty())
        .unwrap_or_default()
}

/// Build a record from one candidate node.
pub fn extract_candidate(
    node: ElementRef<'_>,
    base: &Url,
    rules: &CompiledRules,
) -> Result<ArticleRecord, CandidateError> {
    let (title_el, title) = find_title(node, rules).ok_or(CandidateError::MissingTitle)?;
    let published_date = find_date(node, rules, &title)?;
    let link = find_link(node, title_el, rules, base, &title)?;
    let excerpt = find_excerpt(node, rules, &title);
    let category = Category::classify(&element_text(node));

    Ok(ArticleRecord {
        title,
        published_date,
        category,
        excerpt,
        link,
        body: None,
        summary: None,
    })
}

fn element_text(el: ElementRef<'_>) -> String {
    collapse_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

fn find_title<'a>(node: ElementRef<'a>, rules: &CompiledRules) -> Option<(ElementRef<'a>, String)> {
    rules.title.iter().find_map(|selector| {
        node.select(selector)
            .map(|el| (el, element_text(el)))
            .find(|(_, text)| !text.is_empty())
    })
}

fn find_date(
    node: ElementRef<'_>,
    rules: &CompiledRules,
    title: &str,
) -> Result<NaiveDate, CandidateError> {
    let mut first_unparseable: Option<String> = None;

    for rule in &rules.date {
        let Some(selector) = &rule.selector else {
            // Free-text scan: only a recognized pattern counts as located.
            if let Some(date) = parse_date(&element_text(node)) {
                return Ok(date);
            }
            continue;
        };

        let texts: Vec<String> = node
            .select(selector)
            .filter_map(|el| match &rule.attr {
                Some(attr) => el.value().attr(attr).map(str::to_string),
                None => Some(element_text(el)),
            })
            .collect();

        for raw in texts {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            match parse_date(raw) {
                Some(date) => return Ok(date),
                None => {
                    first_unparseable.get_or_insert_with(|| raw.to_string());
                }
            }
        }
    }

    Err(match first_unparseable {
        Some(raw) => CandidateError::UnparseableDate {
            title: title.to_string(),
            raw,
        },
        None => CandidateError::MissingDate {
            title: title.to_string(),
        },
    })
}

fn find_link(
    node: ElementRef<'_>,
    title_el: ElementRef<'_>,
    rules: &CompiledRules,
    base: &Url,
    title: &str,
) -> Result<String, CandidateError> {
    let own_anchor = if title_el.value().name() == "a" {
        title_el.value().attr("href")
    } else {
        None
    };
    let href = own_anchor
        .or_else(|| title_el.select(&ANCHOR).find_map(|a| a.value().attr("href")))
        .or_else(|| {
            rules
                .link
                .iter()
                .find_map(|selector| node.select(selector).find_map(|a| a.value().attr("href")))
        })
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| CandidateError::MissingLink {
            title: title.to_string(),
        })?;

    let bad_link = || CandidateError::BadLink {
        title: title.to_string(),
        href: href.to_string(),
    };
    // Relative hrefs hang off the site origin, not the listing path.
    let origin = Url::parse(&base.origin().ascii_serialization()).map_err(|_| bad_link())?;
    let resolved = origin.join(href).map_err(|_| bad_link())?;
    match resolved.scheme() {
        "http" | "https" => Ok(resolved.to_string()),
        _ => Err(bad_link()),
    }
}

fn find_excerpt(node: ElementRef<'_>, rules: &CompiledRules, title: &str) -> Option<String> {
    rules.excerpt.iter().find_map(|selector| {
        node.select(selector)
            .map(element_text)
            .find(|text| !text.is_empty() && text != title)
    })
}
