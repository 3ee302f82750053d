//! Mood classification produced by the analyzer

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse reliability tag attached to a mood. Not a calibrated probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
    /// The user asked for a meme and there was nothing to analyze.
    Manual,
    /// Part of the label set and accepted when deserializing. The bot
    /// itself tags its no-context pick as `Manual`.
    Random,
}

impl Confidence {
    /// Interpret a label returned by a language model.
    ///
    /// `high`, `medium` and `low` are accepted case-insensitively; anything
    /// else is treated as `Low`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "high" => Confidence::High,
            "medium" => Confidence::Medium,
            _ => Confidence::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
            Confidence::Low => "low",
            Confidence::Manual => "manual",
            Confidence::Random => "random",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of analyzing a slice of conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoodAnalysis {
    pub mood: String,
    /// Phrase handed to the media search.
    pub search_query: String,
    pub confidence: Confidence,
}

impl MoodAnalysis {
    pub fn new(
        mood: impl Into<String>,
        search_query: impl Into<String>,
        confidence: Confidence,
    ) -> Self {
        Self {
            mood: mood.into(),
            search_query: search_query.into(),
            confidence,
        }
    }

    /// Used when a meme is requested for a channel with no history.
    pub fn random() -> Self {
        Self::new("random", "funny reaction gif", Confidence::Manual)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_label_known_values() {
        assert_eq!(Confidence::from_label("high"), Confidence::High);
        assert_eq!(Confidence::from_label("Medium"), Confidence::Medium);
        assert_eq!(Confidence::from_label(" LOW "), Confidence::Low);
    }

    #[test]
    fn test_from_label_unknown_is_low() {
        assert_eq!(Confidence::from_label("high/medium/low"), Confidence::Low);
        assert_eq!(Confidence::from_label(""), Confidence::Low);
        // Only the analyzer itself may produce manual/random
        assert_eq!(Confidence::from_label("manual"), Confidence::Low);
    }

    #[test]
    fn test_confidence_serializes_lowercase() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"medium\"");
        let back: Confidence = serde_json::from_str("\"random\"").unwrap();
        assert_eq!(back, Confidence::Random);
    }

    #[test]
    fn test_random_analysis() {
        let a = MoodAnalysis::random();
        assert_eq!(a.mood, "random");
        assert_eq!(a.search_query, "funny reaction gif");
        assert_eq!(a.confidence, Confidence::Manual);
        assert_eq!(a.confidence.to_string(), "manual");
    }
}
