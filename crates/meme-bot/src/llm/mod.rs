//! Reasoning-service clients
//!
//! Each backend turns a prompt into free-form reply text. Interpreting that
//! text is the analyzer's job.

pub mod gemini;
pub mod openai;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::{ReasoningConfig, ReasoningProvider};
use crate::errors::ReasoningError;

pub use gemini::GeminiClient;
pub use openai::OpenAiClient;

/// Sampling settings shared by every backend.
pub(crate) const MAX_OUTPUT_TOKENS: u32 = 150;
pub(crate) const TEMPERATURE: f32 = 0.7;

/// A language model that answers a single prompt.
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Short backend name for logs.
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError>;
}

/// Retry behaviour for 429 / 5xx / transport failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub initial_backoff: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &ReasoningConfig) -> Self {
        Self {
            attempts: config.retry_attempts.max(1),
            initial_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

/// Build the configured backend, or `None` when no credential allows one.
pub fn build_client(config: &ReasoningConfig, http: HttpClient) -> Option<Arc<dyn ReasoningClient>> {
    let retry = RetryPolicy::from_config(config);
    match config.active_provider()? {
        ReasoningProvider::Gemini => {
            let key = config.gemini_key()?;
            info!("Mood analysis via Gemini ({})", config.gemini_model);
            Some(Arc::new(GeminiClient::new(
                http,
                key,
                &config.gemini_model,
                &config.gemini_base_url,
                retry,
            )))
        }
        ReasoningProvider::OpenAi => {
            let key = config.openai_key()?;
            info!("Mood analysis via OpenAI ({})", config.openai_model);
            Some(Arc::new(OpenAiClient::new(
                http,
                key,
                &config.openai_model,
                &config.openai_base_url,
                retry,
            )))
        }
    }
}

/// How a backend proves who it is. Never part of the URL.
#[derive(Debug, Clone, Copy)]
pub(crate) enum ApiAuth<'a> {
    Bearer(&'a str),
    Header(&'static str, &'a str),
}

/// POST a JSON body and return the decoded JSON reply, retrying transient failures.
pub(crate) async fn post_json_with_retry(
    http: &HttpClient,
    url: &str,
    auth: Option<ApiAuth<'_>>,
    body: &serde_json::Value,
    retry: RetryPolicy,
) -> Result<serde_json::Value, ReasoningError> {
    let attempts = retry.attempts.max(1);
    let mut delay = retry.initial_backoff;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match post_json_once(http, url, auth, body).await {
            Err(e) if e.is_retryable() && attempt < attempts => {
                warn!(attempt, error = %e, retry_in = ?delay, "Reasoning API retryable error, retrying");
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            other => return other,
        }
    }
}

async fn post_json_once(
    http: &HttpClient,
    url: &str,
    auth: Option<ApiAuth<'_>>,
    body: &serde_json::Value,
) -> Result<serde_json::Value, ReasoningError> {
    let request = http.post(url).json(body);
    let request = match auth {
        Some(ApiAuth::Bearer(token)) => request.bearer_auth(token),
        Some(ApiAuth::Header(name, value)) => request.header(name, value),
        None => request,
    };

    let response = request.send().await?;
    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ReasoningError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    debug!("Reasoning API replied with {} bytes", text.len());
    Ok(serde_json::from_str(&text)?)
}
