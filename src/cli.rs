//! Command-line interface definitions for the news digest.
//!
//! Every option can come from a flag or from the environment, so the tool
//! runs unchanged under a scheduler with only env vars set.

use clap::Parser;

/// Command-line arguments for the news digest.
///
/// # Examples
///
/// ```sh
/// # Print yesterday's and today's items without sending anything
/// gov_news_digest --days-back 1 --dry-run
///
/// # Email a summarized HTML digest every 30 minutes
/// SENDER_EMAIL=me@gmail.com SENDER_PASSWORD=app-pass RECIPIENT_EMAILS=a@x.org,b@y.org \
///   OPENAI_API_KEY=sk-... gov_news_digest --summarize --html --update-interval 30
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Listing pages to scan, comma-separated
    #[arg(
        long,
        env = "NEWS_SITES",
        value_delimiter = ',',
        default_value = "https://www.whitehouse.gov/news/"
    )]
    pub sites: Vec<String>,

    /// Keep articles published within this many days of today
    #[arg(short, long, env = "DAYS_BACK", default_value_t = 1)]
    pub days_back: u32,

    /// Sender email address (also the SMTP login)
    #[arg(long, env = "SENDER_EMAIL")]
    pub sender_email: Option<String>,

    /// Sender password or app token
    #[arg(long, env = "SENDER_PASSWORD", hide_env_values = true)]
    pub sender_password: Option<String>,

    /// Recipient addresses, comma-separated
    #[arg(long, env = "RECIPIENT_EMAILS", value_delimiter = ',')]
    pub recipients: Vec<String>,

    /// SMTP submission server
    #[arg(long, env = "SMTP_SERVER", default_value = "smtp.gmail.com")]
    pub smtp_server: String,

    /// SMTP submission port
    #[arg(long, env = "SMTP_PORT", default_value_t = 587)]
    pub smtp_port: u16,

    /// Send the digest as HTML instead of plain text
    #[arg(long, env = "DIGEST_HTML")]
    pub html: bool,

    /// Fetch each article page for its full text and metadata
    #[arg(long, env = "FETCH_FULL_CONTENT")]
    pub full_content: bool,

    /// Summarize each article's text (implies --full-content)
    #[arg(long, env = "SUMMARIZE")]
    pub summarize: bool,

    /// API key for the summarization endpoint
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat API
    #[arg(long, env = "OPENAI_API_BASE", default_value = "https://api.openai.com/v1")]
    pub openai_api_base: String,

    /// Chat model used for summaries
    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo")]
    pub model: String,

    /// Optional YAML file replacing the built-in extraction rules
    #[arg(short, long, env = "EXTRACTION_RULES")]
    pub rules: Option<String>,

    /// Minutes between runs; omit to run once
    #[arg(short = 'i', long, env = "UPDATE_INTERVAL")]
    pub update_interval: Option<u64>,

    /// Print the digest instead of emailing it
    #[arg(long, env = "DRY_RUN")]
    pub dry_run: bool,
}

impl Cli {
    /// Sites with surrounding whitespace and empty entries removed.
    pub fn sites(&self) -> Vec<String> {
        clean_list(&self.sites)
    }

    pub fn recipients(&self) -> Vec<String> {
        clean_list(&self.recipients)
    }

    /// Whether there is enough to attempt an email at all.
    pub fn can_send(&self) -> bool {
        !self.dry_run
            && self.sender_email.is_some()
            && self.sender_password.is_some()
            && !self.recipients().is_empty()
    }
}

fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
