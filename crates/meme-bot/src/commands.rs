//! Prefix command surface
//!
//! `!meme [text]`, `!context`, `!clear_context` and `!help_meme`. Unknown
//! commands are ignored.

use meme_types::OutboundMessage;
use tracing::debug;

use crate::dispatcher::RecommendationDispatcher;
use crate::render;

/// Messages listed by the context command.
const CONTEXT_PREVIEW: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Recommend now, optionally from the given text.
    Meme(Option<String>),
    ShowContext,
    ClearContext,
    Help,
}

impl Command {
    /// Parse a message body. `None` for ordinary chat and unknown commands.
    pub fn parse(prefix: &str, content: &str) -> Option<Self> {
        let body = content.trim_start().strip_prefix(prefix)?;
        let (name, rest) = match body.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (body, ""),
        };

        match name {
            "meme" if rest.is_empty() => Some(Command::Meme(None)),
            "meme" => Some(Command::Meme(Some(rest.to_string()))),
            "context" => Some(Command::ShowContext),
            "clear_context" => Some(Command::ClearContext),
            "help_meme" => Some(Command::Help),
            _ => {
                debug!("Ignoring unknown command: {}", name);
                None
            }
        }
    }
}

/// Run a command for `author` in `channel_id` and build the answer.
pub async fn execute(
    dispatcher: &RecommendationDispatcher,
    command: Command,
    channel_id: u64,
    author: &str,
    prefix: &str,
) -> OutboundMessage {
    match command {
        Command::Meme(text) => {
            let reply = dispatcher
                .recommend_now(channel_id, text.as_deref(), author)
                .await;
            render::reply(&reply)
        }
        Command::ShowContext => {
            let recent = dispatcher.contexts().recent(channel_id, CONTEXT_PREVIEW).await;
            render::context(&recent)
        }
        Command::ClearContext => render::cleared(dispatcher.contexts().clear(channel_id).await),
        Command::Help => render::help(prefix),
    }
}
