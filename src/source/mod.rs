pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// A message read from the source channel
#[derive(Debug, Clone, PartialEq)]
pub struct SourceMessage {
    /// Message text; `None` for media without a caption, service messages, etc.
    pub text: Option<String>,
    pub date: DateTime<Utc>,
    /// Marked chat id (channels are `-100...`)
    pub chat_id: i64,
    /// Id unique within the chat
    pub id: i32,
}

/// Result of a history read. A read that fails part-way keeps what it
/// fetched before the failure.
#[derive(Debug, Default)]
pub struct History {
    /// Oldest first
    pub messages: Vec<SourceMessage>,
    /// Set when the read stopped early; older messages may be missing
    pub error: Option<anyhow::Error>,
}

impl History {
    pub fn complete(messages: Vec<SourceMessage>) -> Self {
        Self {
            messages,
            error: None,
        }
    }
}

/// Read side of the identity session, scoped to one source channel.
#[async_trait]
pub trait ChannelSource: Send + Sync {
    /// Marked id of the channel this source reads from
    fn chat_id(&self) -> i64;

    /// Every message dated at or after `since`, oldest first.
    async fn history_since(&self, since: DateTime<Utc>) -> History;

    /// Wait for the next new message in the source channel.
    /// Returns `None` once the connection is closed.
    async fn next_message(&self) -> Result<Option<SourceMessage>>;
}
