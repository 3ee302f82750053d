//! Conversation mood analysis
//!
//! Asks a reasoning backend to classify the last few messages and falls back
//! to a keyword scan whenever that is not possible. `analyze` always
//! produces an answer.

#[path = "mood_tests.rs"]
mod mood_tests;

use meme_types::{Confidence, MoodAnalysis};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::errors::ReasoningError;
use crate::llm::ReasoningClient;

/// Messages embedded in the prompt.
pub const PROMPT_WINDOW: usize = 5;

/// Keyword buckets in priority order; the first bucket with a hit wins.
const KEYWORD_BUCKETS: &[(&[&str], &str, &str)] = &[
    (&["roast", "burn", "savage", "rekt"], "roast", "savage burn gif"),
    (
        &["celebration", "victory", "win", "congrats"],
        "celebration",
        "celebration victory gif",
    ),
    (&["chaos", "madness", "wtf", "confused"], "chaos", "confused chaos gif"),
];

const NEUTRAL: (&str, &str) = ("neutral", "reaction gif");

/// Shape the model is asked to answer with.
#[derive(Debug, Deserialize)]
struct MoodReply {
    mood: String,
    search_query: String,
    #[serde(default)]
    confidence: Option<String>,
}

pub struct MoodAnalyzer {
    client: Option<Arc<dyn ReasoningClient>>,
}

impl MoodAnalyzer {
    pub fn new(client: Option<Arc<dyn ReasoningClient>>) -> Self {
        Self { client }
    }

    /// Keyword analysis only.
    pub fn offline() -> Self {
        Self { client: None }
    }

    pub fn has_backend(&self) -> bool {
        self.client.is_some()
    }

    /// Classify the mood of `messages` (oldest first).
    pub async fn analyze(&self, messages: &[String]) -> MoodAnalysis {
        let Some(client) = &self.client else {
            return fallback_analysis(messages);
        };

        match analyze_with(client.as_ref(), messages).await {
            Ok(analysis) => {
                debug!(
                    backend = client.name(),
                    mood = %analysis.mood,
                    "Mood analysis succeeded"
                );
                analysis
            }
            Err(e) => {
                warn!(backend = client.name(), error = %e, "Mood analysis failed, using keywords");
                fallback_analysis(messages)
            }
        }
    }
}

async fn analyze_with(
    client: &dyn ReasoningClient,
    messages: &[String],
) -> Result<MoodAnalysis, ReasoningError> {
    let prompt = build_prompt(messages);
    let reply = client.complete(&prompt).await?;
    parse_reply(&reply)
}

/// Prompt embedding the last few messages.
pub fn build_prompt(messages: &[String]) -> String {
    let start = messages.len().saturating_sub(PROMPT_WINDOW);
    let conversation = messages[start..].join("\n");

    format!(
        "Analyze the following conversation and determine:\n\
         1. The overall mood/vibe (roast, celebration, chaos, hype, confusion, etc.)\n\
         2. A search query for finding an appropriate reaction GIF\n\
         \n\
         Conversation:\n\
         {conversation}\n\
         \n\
         Respond with JSON only: \
         {{\"mood\": \"mood\", \"search_query\": \"gif search terms\", \"confidence\": \"high|medium|low\"}}"
    )
}

/// Turn model output into an analysis. Prose around the JSON object is ignored.
pub fn parse_reply(reply: &str) -> Result<MoodAnalysis, ReasoningError> {
    let object = extract_json_object(reply)
        .ok_or_else(|| ReasoningError::MalformedReply("no JSON object in reply".to_string()))?;

    let parsed: MoodReply = serde_json::from_str(object)?;

    let mood = parsed.mood.trim();
    let search_query = parsed.search_query.trim();
    if mood.is_empty() || search_query.is_empty() {
        return Err(ReasoningError::MalformedReply(
            "mood and search_query must not be empty".to_string(),
        ));
    }

    let confidence = parsed
        .confidence
        .as_deref()
        .map(Confidence::from_label)
        .unwrap_or(Confidence::Low);

    Ok(MoodAnalysis::new(mood, search_query, confidence))
}

/// First balanced `{...}` in `text`, honouring string literals.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Keyword classification over every message.
pub fn fallback_analysis(messages: &[String]) -> MoodAnalysis {
    let text = messages.join(" ").to_lowercase();

    let (mood, query) = KEYWORD_BUCKETS
        .iter()
        .find(|(keywords, _, _)| keywords.iter().any(|k| text.contains(*k)))
        .map(|(_, mood, query)| (*mood, *query))
        .unwrap_or(NEUTRAL);

    MoodAnalysis::new(mood, query, Confidence::Low)
}
