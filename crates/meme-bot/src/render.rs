//! Turns pipeline results into channel messages

use meme_types::{ContextMessage, Embed, OutboundMessage, Recommendation, RecommendationSource};

use crate::dispatcher::Reply;

pub const AUTO_COLOR: u32 = 0x00ff88;
pub const REQUESTED_COLOR: u32 = 0xff6b6b;
pub const CONTEXT_COLOR: u32 = 0x3498db;
pub const HELP_COLOR: u32 = 0x9b59b6;

const RECOMMENDATION_TITLE: &str = "🎭 Meme Recommendation";

/// Discord rejects embed descriptions longer than this (in characters).
pub const MAX_DESCRIPTION_CHARS: usize = 4096;
/// Cap for model-provided mood and search text.
pub const MAX_LABEL_CHARS: usize = 200;

pub const NOT_FOUND_NOTICE: &str = "❌ Sorry, couldn't find a suitable meme right now!";
pub const FAILURE_NOTICE: &str = "❌ Something went wrong with the meme recommendation!";
pub const NO_CONTEXT_NOTICE: &str = "📝 No recent conversation context available.";
pub const CLEARED_NOTICE: &str = "🧹 Conversation context cleared!";
pub const NOTHING_TO_CLEAR_NOTICE: &str = "📝 No context to clear.";
pub const COMMAND_FAILURE_NOTICE: &str = "❌ Something went wrong with that command!";

pub fn recommendation(rec: &Recommendation) -> OutboundMessage {
    let mood = truncate(&title_case(&rec.analysis.mood), MAX_LABEL_CHARS);
    let query = truncate(&rec.analysis.search_query, MAX_LABEL_CHARS);
    let (description, color, origin) = match &rec.source {
        RecommendationSource::Auto => (
            format!(
                "**Mood detected:** {}\n**Context:** {}",
                mood, query
            ),
            AUTO_COLOR,
            "Auto-detected".to_string(),
        ),
        RecommendationSource::Requested { by } => (
            format!("**Mood:** {}\n**Search:** {}", mood, query),
            REQUESTED_COLOR,
            format!("Requested by {}", by),
        ),
    };

    OutboundMessage::Embed(Embed {
        title: RECOMMENDATION_TITLE.to_string(),
        description,
        color,
        image_url: Some(rec.gif_url.clone()),
        footer: Some(format!(
            "Confidence: {} | {}",
            rec.analysis.confidence, origin
        )),
    })
}

pub fn reply(reply: &Reply) -> OutboundMessage {
    match reply {
        Reply::Recommendation(rec) => recommendation(rec),
        Reply::NotFound => OutboundMessage::text(NOT_FOUND_NOTICE),
        Reply::Failed => OutboundMessage::text(FAILURE_NOTICE),
    }
}

/// Recent messages as `**author:** content` lines.
pub fn context(messages: &[ContextMessage]) -> OutboundMessage {
    if messages.is_empty() {
        return OutboundMessage::text(NO_CONTEXT_NOTICE);
    }

    let description = messages
        .iter()
        .map(|m| format!("**{}:** {}", m.author, m.content))
        .collect::<Vec<_>>()
        .join("\n");

    OutboundMessage::Embed(Embed {
        title: "💬 Recent Conversation Context".to_string(),
        description: truncate(&description, MAX_DESCRIPTION_CHARS),
        color: CONTEXT_COLOR,
        image_url: None,
        footer: None,
    })
}

pub fn cleared(removed: bool) -> OutboundMessage {
    if removed {
        OutboundMessage::text(CLEARED_NOTICE)
    } else {
        OutboundMessage::text(NOTHING_TO_CLEAR_NOTICE)
    }
}

pub fn help(prefix: &str) -> OutboundMessage {
    let description = format!(
        "🎭 **Meme Recommendation Bot Commands:**\n\
         \n\
         `{p}meme [context]` - Get a meme recommendation (with optional context)\n\
         `{p}context` - Show recent conversation context\n\
         `{p}clear_context` - Clear conversation context\n\
         `{p}help_meme` - Show this help message\n\
         \n\
         **Auto-features:**\n\
         - Watches the conversation and now and then drops a fitting GIF\n\
         - Picks the GIF from the mood of the last few messages\n\
         \n\
         **Supported moods:**\n\
         - Roast/Savage\n\
         - Celebration/Victory\n\
         - Chaos/Confusion\n\
         - Hype/Excitement\n\
         - And more!",
        p = prefix
    );

    OutboundMessage::Embed(Embed {
        title: "🤖 Meme Bot Help".to_string(),
        description,
        color: HELP_COLOR,
        image_url: None,
        footer: None,
    })
}

/// Cut `text` to at most `max` characters, ending in "…" when shortened.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Capitalise the first letter of every word, lower-case the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut at_word_start = true;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            at_word_start = true;
        }
    }
    out
}
