//! In-memory stand-ins for the two Telegram sessions.

use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Mutex as AsyncMutex};

use crate::notify::AlertSink;
use crate::source::{ChannelSource, History, SourceMessage};

pub const SOURCE_CHAT: i64 = -1009876543210;

pub fn message_at(id: i32, date: DateTime<Utc>, text: Option<&str>) -> SourceMessage {
    SourceMessage {
        text: text.map(str::to_string),
        date,
        chat_id: SOURCE_CHAT,
        id,
    }
}

/// Source with a fixed history and a live feed driven by the test.
/// History is returned as given, without applying `since`.
pub struct FakeSource {
    history: Vec<SourceMessage>,
    live: AsyncMutex<mpsc::UnboundedReceiver<SourceMessage>>,
    /// Read fails after returning this many messages
    fail_after: Option<usize>,
}

impl FakeSource {
    pub fn with_history(history: Vec<SourceMessage>) -> Self {
        let (_tx, rx) = mpsc::unbounded_channel();
        Self {
            history,
            live: AsyncMutex::new(rx),
            fail_after: None,
        }
    }

    pub fn broken() -> Self {
        Self::failing_after(Vec::new(), 0)
    }

    /// History read that delivers the first `count` messages, then fails.
    pub fn failing_after(history: Vec<SourceMessage>, count: usize) -> Self {
        let mut source = Self::with_history(history);
        source.fail_after = Some(count);
        source
    }

    /// Live source; dropping the sender simulates a disconnect.
    pub fn live() -> (Self, mpsc::UnboundedSender<SourceMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let source = Self {
            history: Vec::new(),
            live: AsyncMutex::new(rx),
            fail_after: None,
        };
        (source, tx)
    }
}

#[async_trait]
impl ChannelSource for FakeSource {
    fn chat_id(&self) -> i64 {
        SOURCE_CHAT
    }

    async fn history_since(&self, _since: DateTime<Utc>) -> History {
        match self.fail_after {
            Some(count) => History {
                messages: self.history.iter().take(count).cloned().collect(),
                error: Some(anyhow::anyhow!("history unavailable")),
            },
            None => History::complete(self.history.clone()),
        }
    }

    async fn next_message(&self) -> Result<Option<SourceMessage>> {
        Ok(self.live.lock().await.recv().await)
    }
}

/// Sink that records every alert; optionally rejects alerts containing a marker.
#[derive(Default)]
pub struct RecordingSink {
    sent: Mutex<Vec<String>>,
    reject_containing: Option<String>,
}

impl RecordingSink {
    pub fn failing() -> Self {
        Self::rejecting("")
    }

    pub fn rejecting(marker: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_containing: Some(marker.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl AlertSink for RecordingSink {
    async fn send_alert(&self, text: &str) -> Result<()> {
        if let Some(marker) = &self.reject_containing {
            if text.contains(marker.as_str()) {
                anyhow::bail!("chat not found");
            }
        }
        self.sent.lock().unwrap().push(text.to_string());
        Ok(())
    }
}
