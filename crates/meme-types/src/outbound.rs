//! What the bot sends back to a channel

use serde::{Deserialize, Serialize};

use crate::mood::MoodAnalysis;

/// How a recommendation came about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RecommendationSource {
    /// Fired by the random trigger on an ordinary message.
    Auto,
    /// Asked for explicitly with the meme command.
    Requested { by: String },
}

/// A finished recommendation: the mood that was detected and the GIF picked for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub analysis: MoodAnalysis,
    pub gif_url: String,
    pub source: RecommendationSource,
}

/// Platform-neutral rich message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
}

/// A message ready to be posted to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Text { content: String },
    Embed(Embed),
}

impl OutboundMessage {
    pub fn text(content: impl Into<String>) -> Self {
        OutboundMessage::Text {
            content: content.into(),
        }
    }
}
