use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

use super::{AppContext, Outcome};
use crate::notify::format::MatchOrigin;
use crate::source::SourceMessage;

/// New-message handler scoped to the source channel.
pub struct Subscription {
    chat_id: i64,
    ctx: AppContext,
}

impl Subscription {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            chat_id: ctx.source.chat_id(),
            ctx,
        }
    }

    /// Invoked once per inbound message.
    pub async fn on_message(&self, message: SourceMessage) -> Outcome {
        if message.chat_id != self.chat_id {
            return Outcome::Ignored;
        }
        self.ctx.relay(&message, MatchOrigin::Monitor).await
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonitorSummary {
    pub events: usize,
    pub sent: usize,
    pub failed: usize,
}

impl MonitorSummary {
    fn record(&mut self, done: std::result::Result<Outcome, JoinError>) {
        match done {
            Ok(Outcome::Sent) => self.sent += 1,
            Ok(Outcome::Failed) => self.failed += 1,
            Ok(_) => {}
            Err(e) => {
                error!("Message handler panicked: {}", e);
                self.failed += 1;
            }
        }
    }
}

/// Real-time watch over the source channel.
pub struct MonitorRunner {
    ctx: AppContext,
}

impl MonitorRunner {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx }
    }

    /// Dispatch every new message to the subscription until the source
    /// disconnects or `shutdown` resolves. Handlers run concurrently; all
    /// in-flight handlers are awaited before returning.
    pub async fn run<F>(&self, shutdown: F) -> Result<MonitorSummary>
    where
        F: Future<Output = ()>,
    {
        let subscription = Arc::new(Subscription::new(self.ctx.clone()));
        let mut handlers = JoinSet::new();
        let mut summary = MonitorSummary::default();
        tokio::pin!(shutdown);

        info!(
            "Monitoring chat {} for keywords: {}",
            self.ctx.source.chat_id(),
            self.ctx.keywords
        );
        info!("Press Ctrl+C to stop");

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping monitor");
                    break Ok(());
                }
                next = self.ctx.source.next_message() => match next {
                    Ok(Some(message)) => {
                        summary.events += 1;
                        let subscription = subscription.clone();
                        handlers.spawn(async move { subscription.on_message(message).await });
                    }
                    Ok(None) => {
                        warn!("Connection closed, stopping monitor");
                        break Ok(());
                    }
                    Err(e) => break Err(e).context("Monitor stopped on a source error"),
                },
                Some(done) = handlers.join_next(), if !handlers.is_empty() => {
                    summary.record(done);
                }
            }
        };

        while let Some(done) = handlers.join_next().await {
            summary.record(done);
        }

        info!(
            "Monitor stopped after {} event(s); {} alert(s) sent, {} failed",
            summary.events, summary.sent, summary.failed
        );
        result.map(|()| summary)
    }
}
