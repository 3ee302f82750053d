use async_trait::async_trait;
use reqwest::Client as HttpClient;

use super::{post_json_with_retry, ApiAuth, ReasoningClient, RetryPolicy, MAX_OUTPUT_TOKENS, TEMPERATURE};
use crate::errors::ReasoningError;

/// OpenAI chat-completions backend.
pub struct OpenAiClient {
    http: HttpClient,
    api_key: String,
    model: String,
    base_url: String,
    retry: RetryPolicy,
}

impl OpenAiClient {
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
impl ReasoningClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String, ReasoningError> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "max_tokens": MAX_OUTPUT_TOKENS,
            "temperature": TEMPERATURE,
        });
        let url = format!("{}/chat/completions", self.base_url);

        let auth = Some(ApiAuth::Bearer(&self.api_key));
        let reply = post_json_with_retry(&self.http, &url, auth, &body, self.retry).await?;

        if let Some(message) = reply["error"]["message"].as_str() {
            return Err(ReasoningError::Api(message.to_string()));
        }
        match reply["choices"][0]["message"]["content"].as_str() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(ReasoningError::EmptyReply),
        }
    }
}
