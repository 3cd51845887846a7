//! Error types for every stage of the digest pipeline.
//!
//! Each stage owns its error type so the caller can decide, per stage,
//! whether a failure skips one item or ends the run:
//!
//! | Type | Raised by | Policy |
//! |------|-----------|--------|
//! | [`FetchError`] | [`crate::fetch`] | skip the item; a missing listing skips the site |
//! | [`CandidateError`] | [`crate::extract`] | collected, candidate dropped |
//! | [`SummarizeError`] | [`crate::summarize`] | logged, article kept without summary |
//! | [`DeliveryError`] | [`crate::deliver`] | folded into a `bool` at the mailer boundary |
//! | [`RulesError`] | [`crate::rules`] | fatal at start-up |
//! | [`RunError`] | [`crate::pipeline`] | fatal for one run |

use thiserror::Error;

/// A page could not be retrieved.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} returned HTTP {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
}

/// Why one listing candidate did not become an [`crate::models::ArticleRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CandidateError {
    #[error("candidate has no title")]
    MissingTitle,
    #[error("candidate {title:?} has no date text")]
    MissingDate { title: String },
    #[error("candidate {title:?} has unparseable date {raw:?}")]
    UnparseableDate { title: String, raw: String },
    #[error("candidate {title:?} has no link")]
    MissingLink { title: String },
    #[error("candidate {title:?} has unresolvable link {href:?}")]
    BadLink { title: String, href: String },
}

#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarization request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("summarization API returned HTTP {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("summarization API returned no completion")]
    EmptyCompletion,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("no recipients given")]
    NoRecipients,
    #[error("invalid address {address:?}: {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },
    #[error("could not build message: {0}")]
    Message(#[from] lettre::error::Error),
    #[error("smtp error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Error)]
pub enum RulesError {
    #[error("could not read rules file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse rules file: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid selector {selector:?}: {reason}")]
    Selector { selector: String, reason: String },
    #[error("rule list {0:?} is empty")]
    Empty(&'static str),
}

#[derive(Debug, Error)]
pub enum RunError {
    #[error("no listing page could be fetched")]
    NoListings,
    #[error(transparent)]
    Rules(#[from] RulesError),
    #[error("digest delivery failed")]
    Delivery,
    #[error("configuration error: {0}")]
    Config(String),
}
