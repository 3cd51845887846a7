//! Article page parsing into an [`ArticleBody`].
//!
//! Detail pages use a different template from the listing, so every field
//! here is a best-effort fallback chain, much like the listing rules.

use crate::models::ArticleBody;
use crate::utils::{collapse_whitespace, word_count};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeSet;

fn sel(s: &str) -> Selector {
    Selector::parse(s).unwrap()
}

static CONTAINERS: Lazy<Vec<Selector>> =
    Lazy::new(|| vec![sel("article"), sel("main"), sel(".entry-content")]);
static TEXT_BLOCKS: Lazy<Selector> = Lazy::new(|| sel("p, h1, h2, h3, h4, h5, h6"));
static META_AUTHOR: Lazy<Selector> = Lazy::new(|| sel(r#"meta[name="author"]"#));
static AUTHOR_ELEMENTS: Lazy<Selector> = Lazy::new(|| sel(r#"[rel="author"], .author"#));
static JSON_LD: Lazy<Selector> = Lazy::new(|| sel(r#"script[type="application/ld+json"]"#));
static META_PUBLISHED: Lazy<Selector> =
    Lazy::new(|| sel(r#"meta[property="article:published_time"]"#));
static TIME_DATETIME: Lazy<Selector> = Lazy::new(|| sel("time[datetime]"));
static META_TAGS: Lazy<Selector> = Lazy::new(|| sel(r#"meta[property="article:tag"]"#));
static TAG_LINKS: Lazy<Selector> = Lazy::new(|| sel(r#"a[rel~="tag"]"#));
static IMAGES: Lazy<Selector> = Lazy::new(|| sel("img"));
static VIDEOS: Lazy<Selector> = Lazy::new(|| {
    sel(r#"video, iframe[src*="youtube"], iframe[src*="vimeo"], iframe[src*="player"]"#)
});

/// Parse an article page.
pub fn parse_article_body(html: &str) -> ArticleBody {
    let document = Html::parse_document(html);
    let root = content_root(&document);

    let full_text = root
        .select(&TEXT_BLOCKS)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    ArticleBody {
        word_count: word_count(&full_text),
        full_text,
        author: find_author(&document),
        published_time_raw: find_published_time(&document),
        topics: find_topics(&document),
        has_images: root.select(&IMAGES).next().is_some(),
        has_videos: root.select(&VIDEOS).next().is_some(),
    }
}

fn content_root(document: &Html) -> ElementRef<'_> {
    CONTAINERS
        .iter()
        .find_map(|selector| document.select(selector).next())
        .unwrap_or_else(|| document.root_element())
}

fn meta_content(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace)
        .find(|s| !s.is_empty())
}

fn find_author(document: &Html) -> Option<String> {
    meta_content(document, &META_AUTHOR)
        .or_else(|| {
            document
                .select(&AUTHOR_ELEMENTS)
                .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")))
                .find(|s| !s.is_empty())
        })
        .or_else(|| json_ld_author(document))
}

/// First author name found in any JSON-LD block.
fn json_ld_author(document: &Html) -> Option<String> {
    document.select(&JSON_LD).find_map(|script| {
        let text = script.text().collect::<String>();
        let json: serde_json::Value = serde_json::from_str(text.trim()).ok()?;
        let graph = match json.get("@graph").and_then(|g| g.as_array()).cloned() {
            Some(nodes) => nodes,
            None => vec![json],
        };
        graph.iter().find_map(|node| author_name(node.get("author")?))
    })
}

fn author_name(author: &serde_json::Value) -> Option<String> {
    let name = match author {
        serde_json::Value::String(s) => Some(s.trim().to_string()),
        serde_json::Value::Object(obj) => obj
            .get("name")
            .and_then(|n| n.as_str())
            .map(|n| n.trim().to_string()),
        serde_json::Value::Array(items) => items.iter().find_map(author_name),
        _ => None,
    };
    name.filter(|s| !s.is_empty())
}

fn find_published_time(document: &Html) -> Option<String> {
    meta_content(document, &META_PUBLISHED).or_else(|| {
        document
            .select(&TIME_DATETIME)
            .filter_map(|el| el.value().attr("datetime"))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    })
}

fn find_topics(document: &Html) -> BTreeSet<String> {
    let from_meta = document
        .select(&META_TAGS)
        .filter_map(|el| el.value().attr("content"))
        .map(collapse_whitespace);
    let from_links = document
        .select(&TAG_LINKS)
        .map(|el| collapse_whitespace(&el.text().collect::<Vec<_>>().join(" ")));
    from_meta
        .chain(from_links)
        .filter(|topic| !topic.is_empty())
        .collect()
}
