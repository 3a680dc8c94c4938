pub mod monitor;
pub mod scan;

use std::fmt;
use std::sync::Arc;

use clap::ValueEnum;
use tracing::{error, info};

use crate::keywords::KeywordSet;
use crate::notify::format::MatchOrigin;
use crate::notify::Notifier;
use crate::source::{ChannelSource, SourceMessage};

/// Run mode, fixed for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Search the last 7 days once, then exit
    Scan,
    /// Watch for new messages until interrupted
    Monitor,
}

impl From<Mode> for MatchOrigin {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Scan => MatchOrigin::Scan,
            Mode::Monitor => MatchOrigin::Monitor,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&MatchOrigin::from(*self), f)
    }
}

/// Both sessions plus the keyword set, built once in `main` and handed to
/// whichever runner the mode selects.
#[derive(Clone)]
pub struct AppContext {
    pub keywords: Arc<KeywordSet>,
    /// Identity session
    pub source: Arc<dyn ChannelSource>,
    /// Service session
    pub notifier: Notifier,
}

/// What happened to a single message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Not from the source channel
    Ignored,
    NoText,
    NoMatch,
    Sent,
    Failed,
}

impl AppContext {
    pub fn new(
        keywords: KeywordSet,
        source: Arc<dyn ChannelSource>,
        notifier: Notifier,
    ) -> Self {
        Self {
            keywords: Arc::new(keywords),
            source,
            notifier,
        }
    }

    /// Match one message and send an alert for it if any keyword hits.
    /// Send failures are logged here and reported as `Failed`, never raised,
    /// so one bad message cannot stop a runner.
    pub async fn relay(&self, message: &SourceMessage, origin: MatchOrigin) -> Outcome {
        let text = match message.text.as_deref() {
            Some(t) if !t.is_empty() => t,
            _ => return Outcome::NoText,
        };

        let found = self.keywords.find_matches(Some(text));
        if found.is_empty() {
            return Outcome::NoMatch;
        }

        info!(
            "Keyword '{}' found in message {} ({}), sending alert",
            found.join(", "),
            message.id,
            origin
        );

        match self.notifier.notify(message, &found, origin).await {
            Ok(()) => Outcome::Sent,
            Err(e) => {
                error!("Failed to send alert for message {}: {:#}", message.id, e);
                Outcome::Failed
            }
        }
    }
}
