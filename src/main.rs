//! # Gov News Digest
//!
//! Scrapes recent items from government news listing pages, optionally
//! pulls and summarizes each article, and emails a digest grouped by date.
//!
//! ## Usage
//!
//! ```sh
//! gov_news_digest --days-back 7 --dry-run
//! ```
//!
//! ## Architecture
//!
//! A single linear pipeline (see [`pipeline`]):
//! 1. **Listing**: fetch each listing page and extract candidate articles
//! 2. **Filter**: keep the recency window, drop duplicate titles, newest first
//! 3. **Enrich**: optionally fetch article bodies and summarize them, one at a time
//! 4. **Output**: render the digest and email it (or print it)
//!
//! With `--update-interval` the pipeline repeats; runs share no state.

use chrono::Local;
use clap::Parser;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod article;
mod cli;
mod dates;
mod deliver;
mod digest;
mod errors;
mod extract;
mod fetch;
mod filter;
mod models;
mod pipeline;
mod rules;
mod summarize;
mod utils;

use cli::Cli;
use deliver::{SmtpMailer, SmtpSettings};
use errors::RunError;
use fetch::HttpFetcher;
use pipeline::RunOptions;
use rules::{CompiledRules, ExtractionRules};
use summarize::ChatSummarizer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    info!("gov_news_digest starting up");

    let args = Cli::parse();
    debug!(sites = ?args.sites(), days_back = args.days_back, "Parsed CLI arguments");

    // ---- Rules ----
    let rules = match &args.rules {
        Some(path) => ExtractionRules::from_yaml_file(path)?,
        None => ExtractionRules::default(),
    }
    .compile()?;

    // ---- Collaborators ----
    let fetcher = HttpFetcher::new()?;

    let summarizer = if args.summarize {
        let api_key = args.openai_api_key.clone().ok_or_else(|| {
            RunError::Config("--summarize needs OPENAI_API_KEY".to_string())
        })?;
        let client = reqwest::Client::builder().build()?;
        Some(ChatSummarizer::new(
            client,
            args.openai_api_base.clone(),
            api_key,
            args.model.clone(),
        ))
    } else {
        None
    };

    let mailer = if args.can_send() {
        Some(SmtpMailer {
            settings: SmtpSettings {
                server: args.smtp_server.clone(),
                port: args.smtp_port,
                sender: args.sender_email.clone().unwrap_or_default(),
                credential: args.sender_password.clone().unwrap_or_default(),
            },
            recipients: args.recipients(),
        })
    } else {
        if !args.dry_run {
            warn!("Email settings incomplete; the digest will be printed instead of sent");
        }
        None
    };

    let options = RunOptions {
        sites: args.sites(),
        days_back: args.days_back,
        full_content: args.full_content || args.summarize,
        html: args.html,
    };

    // ---- Run once, or on an interval ----
    let Some(minutes) = args.update_interval else {
        run_once(&options, &rules, &fetcher, summarizer.as_ref(), mailer.as_ref()).await?;
        return Ok(());
    };

    let interval = Duration::from_secs(poll_seconds(minutes));
    info!(minutes, "Polling mode");
    loop {
        if let Err(e) =
            run_once(&options, &rules, &fetcher, summarizer.as_ref(), mailer.as_ref()).await
        {
            error!(error = %e, "Run failed; waiting for next interval");
        }
        tokio::time::sleep(interval).await;
    }
}

/// Polling period in seconds; at least one minute, saturating on huge values.
fn poll_seconds(minutes: u64) -> u64 {
    minutes.max(1).saturating_mul(60)
}

#[instrument(level = "info", skip_all)]
async fn run_once(
    options: &RunOptions,
    rules: &CompiledRules,
    fetcher: &HttpFetcher,
    summarizer: Option<&ChatSummarizer>,
    mailer: Option<&SmtpMailer>,
) -> Result<(), RunError> {
    let start_time = std::time::Instant::now();
    let today = Local::now().date_naive();

    let report = pipeline::run(options, rules, fetcher, summarizer, mailer, today).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        subject = %report.subject,
        body_bytes = report.body.len(),
        articles = report.records.len(),
        skipped = report.skipped,
        delivered = ?report.delivered,
        "Run complete"
    );
    Ok(())
}
