//! Summarizer: LLM calls with exponential backoff, absorbed into a string.
//!
//! # Architecture
//!
//! - [`AskAsync`]: Core trait defining async LLM interaction
//! - [`ChatClient`]: OpenAI-compatible `chat/completions` client
//! - [`RetryAsk`]: Decorator that adds retry logic to any `AskAsync` implementation
//! - [`summarize`]: Builds the prompt and turns every failure into a fixed
//!   placeholder, so callers never see an error
//! - [`summarize_session`]: Summarizes a set of session items with bounded
//!   concurrency; a summarizer that cannot even be set up marks every item
//!   with [`SUMMARY_FAILED`]
//!
//! # Retry Strategy
//!
//! - Configurable retry count (5 by default)
//! - Exponential backoff starting at the configured base delay
//! - Maximum delay capped at 30 seconds
//! - Random jitter (0-250ms) added to prevent thundering herd

use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{error, info, instrument, warn};
use url::Url;
use uuid::Uuid;

use crate::config::SummarizerConfig;
use crate::session::Session;
use crate::utils::truncate_for_log;

/// Returned when the model answers with nothing.
pub const SUMMARY_UNAVAILABLE: &str = "Could not generate summary.";

/// Returned when the model could not be reached at all.
pub const SUMMARY_FAILED: &str =
    "Error generating AI summary. Please check your connection or try again later.";

/// Trait for async LLM interaction.
///
/// This abstraction allows for different LLM backends or decorators (like retry logic).
pub trait AskAsync {
    /// The type of response returned by the LLM.
    type Response;

    /// Send text to the LLM and receive a response.
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>>;
}

/// Wrapper that adds exponential backoff retry logic to any [`AskAsync`] implementation.
///
/// # Backoff Strategy
///
/// ```text
/// delay = min(base_delay * 2^(attempt-1), max_delay) + random_jitter(0..max_jitter)
/// ```
pub struct RetryAsk<T> {
    inner: T,
    /// Retries after the first attempt before giving up.
    max_retries: usize,
    /// Initial delay between retries (doubles with each attempt).
    base_delay: StdDuration,
    max_delay: StdDuration,
    max_jitter_ms: u64,
}

impl<T> RetryAsk<T>
where
    T: AskAsync,
{
    pub fn new(inner: T, max_retries: usize, base_delay: StdDuration) -> Self {
        Self {
            inner,
            max_retries,
            base_delay,
            max_delay: StdDuration::from_secs(30),
            max_jitter_ms: 250,
        }
    }

    /// Retry settings taken from the summarizer configuration.
    pub fn from_config(inner: T, config: &SummarizerConfig) -> Self {
        Self::new(
            inner,
            config.max_retries,
            StdDuration::from_millis(config.base_delay_ms),
        )
    }

    pub fn with_max_jitter(mut self, max_jitter_ms: u64) -> Self {
        self.max_jitter_ms = max_jitter_ms;
        self
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(u32::MAX).min(16);
        let delay = self
            .base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay);
        let jitter_ms: u64 = rng().random_range(0..=self.max_jitter_ms);
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryAsk<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryAsk")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .finish()
    }
}

impl<T> AskAsync for RetryAsk<T>
where
    T: AskAsync + fmt::Debug,
{
    type Response = T::Response;

    #[instrument(level = "info", skip_all)]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            let attempt_t0 = Instant::now();
            match self.inner.ask(text).await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    attempt += 1;
                    let attempt_dt = attempt_t0.elapsed();
                    let total_dt = total_t0.elapsed();

                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_attempt = attempt_dt.as_millis(),
                            elapsed_ms_total = total_dt.as_millis(),
                            error = %e,
                            "ask() exhausted retries"
                        );
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        elapsed_ms_attempt = attempt_dt.as_millis(),
                        elapsed_ms_total = total_dt.as_millis(),
                        ?delay,
                        error = %e,
                        "ask() attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// Client for an OpenAI-compatible `chat/completions` endpoint.
pub struct ChatClient {
    http: reqwest::Client,
    endpoint: Url,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    system_prompt: String,
}

impl fmt::Debug for ChatClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatClient")
            .field("endpoint", &self.endpoint.as_str())
            .field("model", &self.model)
            .field("has_api_key", &self.api_key.is_some())
            .finish()
    }
}

impl ChatClient {
    pub fn from_config(config: &SummarizerConfig) -> Result<Self, Box<dyn Error>> {
        let http = reqwest::Client::builder()
            .timeout(StdDuration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: completions_endpoint(&config.api_base)?,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl AskAsync for ChatClient {
    type Response = String;

    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn ask(&self, text: &str) -> Result<Self::Response, Box<dyn Error>> {
        let t0 = Instant::now();
        let body = ChatRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: text,
                },
            ],
        };

        let mut request = self.http.post(self.endpoint.clone()).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?.error_for_status()?;
        let parsed: ChatResponse = response.json().await?;

        info!(elapsed_ms = t0.elapsed().as_millis(), "Chat completion returned");
        Ok(parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default())
    }
}

/// `chat/completions` under `api_base`, tolerating a missing trailing slash.
pub fn completions_endpoint(api_base: &str) -> Result<Url, url::ParseError> {
    let base = if api_base.ends_with('/') {
        Url::parse(api_base)?
    } else {
        Url::parse(&format!("{api_base}/"))?
    };
    base.join("chat/completions")
}

/// User prompt asking for a short summary of one article.
pub fn summary_prompt(headline: &str, story: &str) -> String {
    format!(
        "Summarize the following news item content into a concise, professional summary of about 3 sentences.\n\nHEADLINE: {headline}\nSTORY: {story}\n"
    )
}

/// Summarize an article.
///
/// # Arguments
///
/// * `client` - Any [`AskAsync`] backend returning text, usually a [`RetryAsk`]
/// * `headline` - Headline of the article
/// * `story` - Story text the summary is based on
///
/// # Returns
///
/// The trimmed summary. Never fails: errors become [`SUMMARY_FAILED`] and
/// empty answers become [`SUMMARY_UNAVAILABLE`].
#[instrument(level = "info", skip_all, fields(headline = %truncate_for_log(headline, 80)))]
pub async fn summarize<A>(client: &A, headline: &str, story: &str) -> String
where
    A: AskAsync<Response = String>,
{
    match client.ask(&summary_prompt(headline, story)).await {
        Ok(summary) if !summary.trim().is_empty() => summary.trim().to_string(),
        Ok(_) => {
            warn!("Model returned an empty summary");
            SUMMARY_UNAVAILABLE.to_string()
        }
        Err(e) => {
            error!(error = %e, "Summarization failed");
            SUMMARY_FAILED.to_string()
        }
    }
}

/// Summarize the session items in `ids` and attach each summary.
///
/// Builds a [`ChatClient`] wrapped in [`RetryAsk`] from `config`. When the
/// client cannot be built (for example an unparsable `api_base`), the error is
/// logged and every listed item gets [`SUMMARY_FAILED`] instead.
///
/// # Arguments
///
/// * `session` - Session holding the items
/// * `ids` - Items to summarize, in listing order
/// * `config` - Endpoint, retry, and concurrency settings
///
/// # Returns
///
/// Number of items that received a summary or placeholder.
#[instrument(level = "info", skip_all, fields(count = ids.len()))]
pub async fn summarize_session(
    session: &mut Session,
    ids: &[Uuid],
    config: &SummarizerConfig,
) -> usize {
    match ChatClient::from_config(config) {
        Ok(client) => {
            let client = RetryAsk::from_config(client, config);
            summarize_items(&client, session, ids, config.concurrency).await
        }
        Err(e) => {
            error!(api_base = %config.api_base, error = %e, "Could not set up the summarizer");
            let failed: Vec<(Uuid, String)> = ids
                .iter()
                .filter_map(|id| session.get(*id))
                .map(|item| (item.id, item.story.clone()))
                .collect();
            let mut attached = 0;
            for (id, story) in failed {
                if attach(session, id, story, SUMMARY_FAILED.to_string()) {
                    attached += 1;
                }
            }
            attached
        }
    }
}

/// Summarize the session items in `ids` through `client`, at most
/// `concurrency` requests at a time, and attach the results in order.
pub async fn summarize_items<A>(
    client: &A,
    session: &mut Session,
    ids: &[Uuid],
    concurrency: usize,
) -> usize
where
    A: AskAsync<Response = String>,
{
    let requests: Vec<(Uuid, String, String)> = ids
        .iter()
        .filter_map(|id| session.get(*id))
        .map(|item| (item.id, item.headline.clone(), item.story.clone()))
        .collect();

    let summaries: Vec<(Uuid, String, String)> = stream::iter(requests)
        .map(|(id, headline, story)| async move {
            let summary = summarize(client, &headline, &story).await;
            (id, story, summary)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut attached = 0;
    for (id, story, summary) in summaries {
        if attach(session, id, story, summary) {
            attached += 1;
        }
    }
    info!(attached, "Attached summaries");
    attached
}

fn attach(session: &mut Session, id: Uuid, story: String, summary: String) -> bool {
    match session.attach_summary(id, story, summary) {
        Ok(()) => true,
        Err(e) => {
            warn!(error = %e, "Summary not attached");
            false
        }
    }
}
