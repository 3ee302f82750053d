use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::{post_json_with_retry, ApiAuth, ReasoningClient, RetryPolicy, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::errors::ReasoningError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Google Gemini `generateContent` backend.
pub struct GeminiClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl GeminiClient {
    pub fn new(
        http: HttpClient,
        api_key: &str,
        model: &str,
        base_url: &str,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            http,
            api_key: api_key.to_string(),
            model: model.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            retry,
        }
    }
}

#[async_trait]
impl ReasoningClient for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        let body = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": prompt}],
            }],
            "generationConfig": {
                "maxOutputTokens": MAX_OUTPUT_TOKENS,
                "temperature": TEMPERATURE,
            },
        });

        // POST .../models/{model}:generateContent
        let url = format!("{}/{}:generateContent", self.base_url, self.model);
        let auth = Some(ApiAuth::Header(API_KEY_HEADER, &self.api_key));

        let reply = post_json_with_retry(&self.http, &url, auth, &body, self.retry).await?;
        reply_text(&reply)
    }
}

/// Concatenate the text parts of the first candidate.
fn reply_text(reply: &serde_json::Value) -> Result<String, ReasoningError> {
    if let Some(message) = reply["error"]["message"].as_str() {
        return Err(ReasoningError::Api(message.to_string()));
    }

    let text: String = reply["candidates"][0]["content"]["parts"]
        .as_array()
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part["text"].as_str())
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ReasoningError::EmptyReply);
    }
    Ok(text)
}
