//! Article summarization through an OpenAI-compatible chat API.
//!
//! # Architecture
//!
//! - [`Summarize`]: the seam the pipeline depends on
//! - [`ChatSummarizer`]: `reqwest` client for `POST {api_base}/chat/completions`
//!
//! One request per article, no retry. A failure is returned to the caller,
//! which logs it and leaves that article without a summary.

use crate::errors::SummarizeError;
use crate::utils::truncate_for_log;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Fixed system instruction sent with every request.
pub const SYSTEM_PROMPT: &str = "Summarize the following text concisely.";
/// Upper bound on completion length.
pub const MAX_TOKENS: u32 = 150;
/// Moderate randomness.
pub const TEMPERATURE: f32 = 0.7;
/// Article text beyond this many characters is not sent.
pub const MAX_INPUT_CHARS: usize = 12_000;

/// Anything that can shorten article text.
pub trait Summarize {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError>;
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    pub max_tokens: u32,
    pub temperature: f32,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatReply,
}

#[derive(Debug, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub content: Option<String>,
}

/// Build the request body for one article.
pub fn build_request<'a>(model: &'a str, text: &'a str) -> ChatRequest<'a> {
    let text = match text.char_indices().nth(MAX_INPUT_CHARS) {
        Some((cut, _)) => &text[..cut],
        None => text,
    };
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: SYSTEM_PROMPT,
            },
            ChatMessage {
                role: "user",
                content: text,
            },
        ],
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Text of the first choice, trimmed. Empty counts as no completion.
pub fn completion_text(response: ChatResponse) -> Result<String, SummarizeError> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(SummarizeError::EmptyCompletion)
}

/// [`Summarize`] implementation for OpenAI-compatible endpoints.
pub struct ChatSummarizer {
    client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for ChatSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSummarizer")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl ChatSummarizer {
    pub fn new(
        client: reqwest::Client,
        api_base: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_base: api_base.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.api_base.trim_end_matches('/'))
    }
}

impl Summarize for ChatSummarizer {
    #[instrument(level = "info", skip_all, fields(model = %self.model, chars = text.len()))]
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        let t0 = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&build_request(&self.model, text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %truncate_for_log(&body, 300), "Summarization API error");
            return Err(SummarizeError::Status { status, body });
        }

        let summary = completion_text(response.json::<ChatResponse>().await?)?;
        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            summary_chars = summary.len(),
            "Summarized article"
        );
        Ok(summary)
    }
}
