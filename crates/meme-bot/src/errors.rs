//! Error types for meme-bot
//!
//! Failures talking to the reasoning or media services are always recovered
//! with a fallback, so these types mostly exist to be logged. Discord send
//! failures are classified so they can be logged at the right level.

use serenity::http::HttpError;
use thiserror::Error;
use tracing::{error, warn};

/// Failure of a reasoning-service call.
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("API error: {0}")]
    Api(String),

    #[error("empty reply")]
    EmptyReply,

    #[error("malformed reply: {0}")]
    MalformedReply(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ReasoningError {
    /// Whether another attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            ReasoningError::Http(_) => true,
            ReasoningError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

/// Failure of a media-search lookup.
#[derive(Debug, Error)]
pub enum GifLookupError {
    #[error("no media-search credential configured")]
    MissingCredential,

    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    #[error("search returned {0}")]
    Status(u16),

    #[error("search returned no results")]
    NoResults,

    #[error("malformed search response: {0}")]
    Malformed(String),
}

// Request URLs may carry credentials, so they never reach the message.
impl From<reqwest::Error> for ReasoningError {
    fn from(e: reqwest::Error) -> Self {
        ReasoningError::Http(e.without_url())
    }
}

impl From<reqwest::Error> for GifLookupError {
    fn from(e: reqwest::Error) -> Self {
        GifLookupError::Http(e.without_url())
    }
}

/// Failure of a whole recommendation run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("recommendation task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}

/// How bad a failed Discord send is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendSeverity {
    RateLimited,
    /// Retrying will not help (missing permissions, unknown channel, ...).
    Permanent,
    Transient,
}

/// Classify an HTTP status from a Discord API response.
pub fn classify_status(status: u16) -> SendSeverity {
    match status {
        429 => SendSeverity::RateLimited,
        400..=499 => SendSeverity::Permanent,
        _ => SendSeverity::Transient,
    }
}

/// Classify a serenity error.
pub fn classify(err: &serenity::Error) -> SendSeverity {
    match err {
        serenity::Error::Http(HttpError::UnsuccessfulRequest(resp)) => {
            classify_status(resp.status_code.as_u16())
        }
        _ => SendSeverity::Transient,
    }
}

/// Log a failed send at the level its severity deserves.
pub fn log_send_error(channel_id: u64, err: &serenity::Error) {
    match classify(err) {
        SendSeverity::Permanent => {
            error!("Cannot send to channel {}: {}", channel_id, err);
        }
        SendSeverity::RateLimited => {
            warn!("Rate limited sending to channel {}: {}", channel_id, err);
        }
        SendSeverity::Transient => {
            warn!("Failed to send to channel {}: {}", channel_id, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_status() {
        assert_eq!(classify_status(429), SendSeverity::RateLimited);
        assert_eq!(classify_status(403), SendSeverity::Permanent);
        assert_eq!(classify_status(404), SendSeverity::Permanent);
        assert_eq!(classify_status(500), SendSeverity::Transient);
        assert_eq!(classify_status(502), SendSeverity::Transient);
    }

    #[test]
    fn test_non_http_serenity_error_is_transient() {
        let err = serenity::Error::Other("gateway hiccup");
        assert_eq!(classify(&err), SendSeverity::Transient);
    }

    #[test]
    fn test_reasoning_status_retryable() {
        let rate = ReasoningError::Status {
            status: 429,
            body: String::new(),
        };
        let server = ReasoningError::Status {
            status: 503,
            body: String::new(),
        };
        let client = ReasoningError::Status {
            status: 401,
            body: "bad key".to_string(),
        };
        assert!(rate.is_retryable());
        assert!(server.is_retryable());
        assert!(!client.is_retryable());
        assert!(!ReasoningError::EmptyReply.is_retryable());
        assert!(!ReasoningError::MalformedReply("x".to_string()).is_retryable());
    }

    #[test]
    fn test_reasoning_error_display() {
        let err = ReasoningError::Status {
            status: 401,
            body: "bad key".to_string(),
        };
        assert_eq!(err.to_string(), "API returned 401: bad key");
        assert_eq!(
            ReasoningError::Api("quota".to_string()).to_string(),
            "API error: quota"
        );
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("nope").unwrap_err();
        let err: ReasoningError = json_err.into();
        assert!(err.to_string().starts_with("Serialization error:"));
    }

    #[test]
    fn test_gif_error_display() {
        assert_eq!(GifLookupError::Status(500).to_string(), "search returned 500");
        assert_eq!(
            GifLookupError::NoResults.to_string(),
            "search returned no results"
        );
    }
}
