//! Messages held in a channel's rolling context

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single chat message as remembered by the context buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextMessage {
    /// Display name of the author at the time the message was seen.
    pub author: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ContextMessage {
    pub fn new(
        author: impl Into<String>,
        content: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            author: author.into(),
            content: content.into(),
            timestamp,
        }
    }

    /// Build a message stamped with the current time.
    pub fn now(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(author, content, Utc::now())
    }
}
