//! Extraction rules: which selectors locate each field of a listing item.
//!
//! Listing markup is not under our control, so every field is described by
//! an ordered fallback list. Rules are plain data: the built-in set targets
//! the WordPress block markup used by the White House news listing, and a
//! YAML file can replace it for another layout without code changes.
//!
//! ```yaml
//! candidates: ["li.wp-block-post", "article"]
//! title: ["h1, h2, h3, h4, h5, h6", "[class*='title']"]
//! date:
//!   - { selector: "time", attr: "datetime" }
//!   - { selector: "[class*='date']" }
//!   - {}                      # scan the candidate's whole text
//! link: ["a[href]"]
//! excerpt: ["p", "[class*='excerpt']"]
//! ```

use crate::errors::RulesError;
use scraper::Selector;
use serde::Deserialize;
use std::path::Path;
use tracing::{info, instrument};

/// One step of the date fallback chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DateRule {
    /// Element to read from. `None` scans the candidate's own text.
    #[serde(default)]
    pub selector: Option<String>,
    /// Attribute to read instead of the element text.
    #[serde(default)]
    pub attr: Option<String>,
}

/// Serializable rule descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractionRules {
    pub candidates: Vec<String>,
    pub title: Vec<String>,
    pub date: Vec<DateRule>,
    #[serde(default = "default_link")]
    pub link: Vec<String>,
    #[serde(default)]
    pub excerpt: Vec<String>,
}

fn default_link() -> Vec<String> {
    vec!["a[href]".to_string()]
}

impl Default for ExtractionRules {
    fn default() -> Self {
        let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            candidates: strings(&[
                "li.wp-block-post",
                "article",
                "[class*='post-item'], [class*='news-item'], [class*='article']",
            ]),
            title: strings(&["h1, h2, h3, h4, h5, h6", "[class*='title']"]),
            date: vec![
                DateRule {
                    selector: Some("time".to_string()),
                    attr: Some("datetime".to_string()),
                },
                DateRule {
                    selector: Some("[class*='date']".to_string()),
                    attr: None,
                },
                DateRule::default(),
            ],
            link: default_link(),
            excerpt: strings(&["p", "[class*='excerpt']"]),
        }
    }
}

impl ExtractionRules {
    /// Load rules from a YAML file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RulesError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| RulesError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let rules = Self::from_yaml_str(&text)?;
        info!(candidates = rules.candidates.len(), "Loaded extraction rules");
        Ok(rules)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, RulesError> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Parse every selector once, up front.
    pub fn compile(&self) -> Result<CompiledRules, RulesError> {
        if self.candidates.is_empty() {
            return Err(RulesError::Empty("candidates"));
        }
        if self.title.is_empty() {
            return Err(RulesError::Empty("title"));
        }
        if self.date.is_empty() {
            return Err(RulesError::Empty("date"));
        }

        let date = self
            .date
            .iter()
            .map(|rule| -> Result<CompiledDateRule, RulesError> {
                Ok(CompiledDateRule {
                    selector: rule.selector.as_deref().map(parse_selector).transpose()?,
                    attr: rule.attr.clone(),
                })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;

        Ok(CompiledRules {
            candidates: parse_all(&self.candidates)?,
            title: parse_all(&self.title)?,
            date,
            link: parse_all(&self.link)?,
            excerpt: parse_all(&self.excerpt)?,
        })
    }
}

fn parse_selector(s: &str) -> Result<Selector, RulesError> {
    Selector::parse(s).map_err(|e| RulesError::Selector {
        selector: s.to_string(),
        reason: e.to_string(),
    })
}

fn parse_all(list: &[String]) -> Result<Vec<Selector>, RulesError> {
    list.iter().map(|s| parse_selector(s)).collect()
}

#[derive(Debug, Clone)]
pub struct CompiledDateRule {
    pub selector: Option<Selector>,
    pub attr: Option<String>,
}

/// [`ExtractionRules`] with every selector parsed.
#[derive(Debug, Clone)]
pub struct CompiledRules {
    pub candidates: Vec<Selector>,
    pub title: Vec<Selector>,
    pub date: Vec<CompiledDateRule>,
    pub link: Vec<Selector>,
    pub excerpt: Vec<Selector>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rules_compile() {
        let compiled = ExtractionRules::default().compile().unwrap();
        assert_eq!(compiled.candidates.len(), 3);
        assert_eq!(compiled.date.len(), 3);
        assert!(compiled.date[2].selector.is_none());
    }

    #[test]
    fn test_rules_from_yaml() {
        let yaml = r#"
candidates: ["div.release"]
title: ["h3"]
date:
  - { selector: "span.when" }
  - {}
excerpt: ["p.lede"]
"#;
        let rules = ExtractionRules::from_yaml_str(yaml).unwrap();
        assert_eq!(rules.candidates, vec!["div.release".to_string()]);
        assert_eq!(rules.link, vec!["a[href]".to_string()]);
        assert_eq!(rules.date[0].selector.as_deref(), Some("span.when"));
        assert_eq!(rules.date[1], DateRule::default());
        assert!(rules.compile().is_ok());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let rules = ExtractionRules {
            candidates: vec!["li[".to_string()],
            ..ExtractionRules::default()
        };
        match rules.compile() {
            Err(RulesError::Selector { selector, .. }) => assert_eq!(selector, "li["),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_empty_required_list_is_rejected() {
        let rules = ExtractionRules {
            title: vec![],
            ..ExtractionRules::default()
        };
        assert!(matches!(rules.compile(), Err(RulesError::Empty("title"))));
    }

    #[test]
    fn test_missing_rules_file() {
        let err = ExtractionRules::from_yaml_file("/nonexistent/rules.yaml").unwrap_err();
        assert!(matches!(err, RulesError::Io { .. }));
    }
}
