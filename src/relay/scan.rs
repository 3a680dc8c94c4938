use std::time::Duration;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use super::{AppContext, Outcome};
use crate::notify::format::MatchOrigin;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanSummary {
    /// Messages inside the window
    pub scanned: usize,
    /// Messages with at least one keyword
    pub matched: usize,
    /// Alerts delivered
    pub sent: usize,
    /// Alerts that failed to send
    pub failed: usize,
}

/// One-shot pass over the recent history of the source channel.
pub struct ScanRunner {
    ctx: AppContext,
    lookback: chrono::Duration,
    pace: Duration,
}

impl ScanRunner {
    pub fn new(ctx: AppContext, lookback: chrono::Duration, pace: Duration) -> Self {
        Self {
            ctx,
            lookback,
            pace,
        }
    }

    /// Scan everything from `now - lookback` (inclusive) up to `now`,
    /// oldest first, sending one alert per matching message.
    ///
    /// If the history read stops early, the messages it did return are still
    /// relayed before the read error is returned.
    pub async fn run(&self, now: DateTime<Utc>) -> Result<ScanSummary> {
        let since = now - self.lookback;
        info!(
            "Scanning messages since {} (keywords: {})",
            since.format("%Y-%m-%d %H:%M"),
            self.ctx.keywords
        );

        let read = self.ctx.source.history_since(since).await;
        let mut history = read.messages;
        history.retain(|m| m.date >= since && m.date <= now);
        // Alerts go out in posting order even if the source pages differently.
        history.sort_by_key(|m| (m.date, m.id));

        let mut summary = ScanSummary {
            scanned: history.len(),
            ..Default::default()
        };

        for message in &history {
            match self.ctx.relay(message, MatchOrigin::Scan).await {
                Outcome::Ignored | Outcome::NoText | Outcome::NoMatch => continue,
                Outcome::Sent => {
                    summary.matched += 1;
                    summary.sent += 1;
                }
                Outcome::Failed => {
                    summary.matched += 1;
                    summary.failed += 1;
                }
            }
            if !self.pace.is_zero() {
                debug!("Pausing {:?} before the next alert", self.pace);
                tokio::time::sleep(self.pace).await;
            }
        }

        info!(
            "Scan complete. Keywords found in {} message(s); {} alert(s) sent, {} failed",
            summary.matched, summary.sent, summary.failed
        );

        if let Some(e) = read.error {
            error!(
                "Channel history is incomplete; only {} message(s) could be scanned: {:#}",
                summary.scanned, e
            );
            return Err(e.context("Scan did not cover the full window"));
        }
        Ok(summary)
    }
}
