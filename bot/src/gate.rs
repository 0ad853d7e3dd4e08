//! Operator gate — decides which chat messages are commands

use serde::Deserialize;

use crate::config::ChatConfig;

/// A chat message as delivered by the platform adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub author_id: String,
    #[serde(default)]
    pub author_is_bot: bool,
    /// Guild (server) the message was posted in; `None` for direct messages.
    #[serde(default)]
    pub guild_id: Option<String>,
    pub content: String,
}

/// Returns the command text (prefix stripped, trimmed) when the message
/// should be handled, `None` when it must be ignored.
pub fn accept<'a>(config: &ChatConfig, message: &'a IncomingMessage) -> Option<&'a str> {
    if message.guild_id.is_none() || message.author_is_bot {
        return None;
    }
    if config.prefix.is_empty() {
        return None;
    }
    let body = message.content.strip_prefix(config.prefix.as_str())?;
    if !config.devs.iter().any(|dev| *dev == message.author_id) {
        return None;
    }
    Some(body.trim())
}
