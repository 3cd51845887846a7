//! Data models for discovered articles.
//!
//! - [`ArticleRecord`]: one news item found on a listing page
//! - [`ArticleBody`]: content pulled from the article's own page
//! - [`Category`]: coarse kind of release, derived from keywords
//!
//! Records live for a single run: built by [`crate::extract`], optionally
//! enriched in place by the body/summary step, then rendered once by
//! [`crate::digest`].

use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::fmt;

/// Kind of release, matched by keyword over the candidate's full text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    General,
    ExecutiveOrder,
    FactSheet,
    Statement,
    Proclamation,
    Briefing,
}

impl Category {
    /// Keyword table in match priority order. The first keyword found wins.
    const KEYWORDS: [(&'static str, Category); 5] = [
        ("executive order", Category::ExecutiveOrder),
        ("fact sheet", Category::FactSheet),
        ("statement", Category::Statement),
        ("proclamation", Category::Proclamation),
        ("briefing", Category::Briefing),
    ];

    /// Classify free text, case-insensitively.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// assert_eq!(Category::classify("Executive Order and Statement"), Category::ExecutiveOrder);
    /// assert_eq!(Category::classify("Remarks"), Category::General);
    /// ```
    pub fn classify(text: &str) -> Category {
        let lowered = text.to_lowercase();
        Self::KEYWORDS
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword))
            .map(|(_, category)| *category)
            .unwrap_or(Category::General)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::General => "General",
            Category::ExecutiveOrder => "Executive Order",
            Category::FactSheet => "Fact Sheet",
            Category::Statement => "Statement",
            Category::Proclamation => "Proclamation",
            Category::Briefing => "Briefing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One news item discovered on a listing page.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleRecord {
    /// Whitespace-collapsed headline. Never empty.
    pub title: String,
    /// Calendar date of publication; time of day is dropped.
    pub published_date: NaiveDate,
    pub category: Category,
    pub excerpt: Option<String>,
    /// Absolute URL of the article page.
    pub link: String,
    /// Filled only when full-content fetching is enabled.
    pub body: Option<ArticleBody>,
    /// Filled only when summarization is enabled and succeeded.
    pub summary: Option<String>,
}

impl ArticleRecord {
    /// Summary if present, else the listing excerpt.
    pub fn blurb(&self) -> Option<&str> {
        self.summary.as_deref().or(self.excerpt.as_deref())
    }
}

/// Content taken from an article's own page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleBody {
    /// Paragraph and heading texts, separated by blank lines.
    pub full_text: String,
    /// Whitespace-delimited tokens in `full_text`.
    pub word_count: usize,
    pub author: Option<String>,
    pub published_time_raw: Option<String>,
    pub topics: BTreeSet<String>,
    pub has_images: bool,
    pub has_videos: bool,
}
