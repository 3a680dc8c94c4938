use anyhow::{Context, Result};
use async_trait::async_trait;
use teloxide::payloads::SendMessageSetters;
use teloxide::prelude::*;
use teloxide::types::LinkPreviewOptions;
use tracing::info;

use super::AlertSink;

/// Service session: the bot account posting alerts to the destination channel.
pub struct BotNotifier {
    bot: Bot,
    target: ChatId,
}

impl BotNotifier {
    /// Build the bot client and confirm the token with `getMe`.
    pub async fn start(token: &str, target_id: i64) -> Result<Self> {
        let bot = Bot::new(token);
        let me = bot
            .get_me()
            .await
            .context("Failed to start bot session (getMe)")?;
        info!(
            "Bot session started as @{}",
            me.user.username.as_deref().unwrap_or("unknown")
        );

        Ok(Self {
            bot,
            target: ChatId(target_id),
        })
    }
}

fn no_preview() -> LinkPreviewOptions {
    LinkPreviewOptions {
        is_disabled: true,
        url: None,
        prefer_small_media: false,
        prefer_large_media: false,
        show_above_text: false,
    }
}

#[async_trait]
impl AlertSink for BotNotifier {
    async fn send_alert(&self, text: &str) -> Result<()> {
        self.bot
            .send_message(self.target, text)
            .link_preview_options(no_preview())
            .await
            .with_context(|| format!("Failed to send alert to chat {}", self.target.0))?;
        Ok(())
    }
}
