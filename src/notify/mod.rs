pub mod format;
pub mod telegram;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;

use crate::source::SourceMessage;
use format::{format_alert, AlertContent, MatchOrigin};

/// Write side of the service session: posts into the destination channel.
#[async_trait]
pub trait AlertSink: Send + Sync {
    async fn send_alert(&self, text: &str) -> Result<()>;
}

/// Formats matches and hands them to the sink.
#[derive(Clone)]
pub struct Notifier {
    sink: Arc<dyn AlertSink>,
    link_host: String,
}

impl Notifier {
    pub fn new(sink: Arc<dyn AlertSink>, link_host: impl Into<String>) -> Self {
        Self {
            sink,
            link_host: link_host.into(),
        }
    }

    /// Send one alert for `message`. Errors are returned to the caller,
    /// which decides whether to continue.
    pub async fn notify(
        &self,
        message: &SourceMessage,
        keywords: &[&str],
        origin: MatchOrigin,
    ) -> Result<()> {
        let text = format_alert(&AlertContent {
            body: message.text.as_deref().unwrap_or_default(),
            date: message.date,
            chat_id: message.chat_id,
            message_id: message.id,
            keywords,
            origin,
            link_host: &self.link_host,
        });
        self.sink.send_alert(&text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{message_at, RecordingSink};
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_notify_formats_and_sends_once() {
        let sink = Arc::new(RecordingSink::default());
        let notifier = Notifier::new(sink.clone(), "t.me");
        let date = Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap();
        let message = message_at(42, date, Some("오늘 긴급 회의가 있습니다"));

        notifier
            .notify(&message, &["긴급"], MatchOrigin::Monitor)
            .await
            .unwrap();

        let sent = sink.sent();
        assert_eq!(sent.len(), 1);
        assert!(sent[0].contains("오늘 긴급 회의가 있습니다"));
        assert!(sent[0].contains("2026-10-01 12:00"));
        assert!(sent[0].ends_with("https://t.me/c/9876543210/42"));
    }

    #[tokio::test]
    async fn test_sink_error_is_returned() {
        let sink = Arc::new(RecordingSink::failing());
        let notifier = Notifier::new(sink.clone(), "t.me");
        let message = message_at(1, Utc::now(), Some("긴급"));

        let result = notifier.notify(&message, &["긴급"], MatchOrigin::Scan).await;
        assert!(result.is_err());
        assert!(sink.sent().is_empty());
    }
}
