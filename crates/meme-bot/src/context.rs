//! Per-channel rolling conversation context
//!
//! Keeps the last few messages of every channel the bot can see. Nothing is
//! persisted; a restart starts every channel from scratch.

#[path = "context_tests.rs"]
mod context_tests;

use meme_types::ContextMessage;
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;

/// Messages kept per channel unless configured otherwise.
pub const MAX_CONTEXT_MESSAGES: usize = 10;

/// Bounded FIFO of recent messages, keyed by channel id.
///
/// Created once at startup and shared by reference between the event
/// handler and the dispatcher.
pub struct ContextBuffer {
    channels: RwLock<HashMap<u64, VecDeque<ContextMessage>>>,
    capacity: usize,
}

impl ContextBuffer {
    pub fn new() -> Self {
        Self::with_capacity(MAX_CONTEXT_MESSAGES)
    }

    /// A capacity of zero is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Record a message stamped with the current time.
    pub async fn record(&self, channel_id: u64, author: &str, content: &str) {
        self.insert(channel_id, ContextMessage::now(author, content))
            .await;
    }

    /// Add a message at its place by timestamp, evicting the oldest entries
    /// beyond capacity.
    ///
    /// Events may take the lock out of order; sorting on the platform's
    /// timestamp keeps each channel chronological. Equal timestamps keep
    /// insertion order.
    pub async fn insert(&self, channel_id: u64, message: ContextMessage) {
        let mut channels = self.channels.write().await;
        let history = channels.entry(channel_id).or_default();
        let at = history
            .iter()
            .rposition(|m| m.timestamp <= message.timestamp)
            .map_or(0, |i| i + 1);
        history.insert(at, message);
        while history.len() > self.capacity {
            history.pop_front();
        }
    }

    /// Last `n` messages of a channel, oldest first. Empty for unknown channels.
    pub async fn recent(&self, channel_id: u64, n: usize) -> Vec<ContextMessage> {
        let channels = self.channels.read().await;
        match channels.get(&channel_id) {
            Some(history) => {
                let skip = history.len().saturating_sub(n);
                history.iter().skip(skip).cloned().collect()
            }
            None => vec![],
        }
    }

    /// Forget a channel. Returns `false` when there was nothing to forget.
    pub async fn clear(&self, channel_id: u64) -> bool {
        let mut channels = self.channels.write().await;
        channels.remove(&channel_id).is_some()
    }

    /// Number of channels with buffered context
    pub async fn active_channels(&self) -> usize {
        self.channels.read().await.len()
    }
}

impl Default for ContextBuffer {
    fn default() -> Self {
        Self::new()
    }
}
