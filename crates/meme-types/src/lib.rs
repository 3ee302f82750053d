//! Shared types for the meme recommendation bot
//!
//! Everything that crosses a module boundary inside the bot lives here:
//! buffered chat messages, mood classifications, and the outbound messages
//! the bot hands back to Discord.

pub mod context;
pub mod mood;
pub mod outbound;

pub use context::ContextMessage;
pub use mood::{Confidence, MoodAnalysis};
pub use outbound::{Embed, OutboundMessage, Recommendation, RecommendationSource};
