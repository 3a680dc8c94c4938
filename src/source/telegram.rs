use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use grammers_client::types::Message;
use grammers_client::{Client, Config as ClientConfig, InitParams, InvocationError, Update};
use grammers_session::{PackedChat, PackedType, Session};
use tracing::{debug, info, warn};

use super::{ChannelSource, History, SourceMessage};
use crate::config::TelegramConfig;

/// Offset Bot API style ids add to channel ids (`-100` prefix)
const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

/// Convert an MTProto peer into the marked id used in config and deep links.
pub fn marked_id(ty: PackedType, id: i64) -> i64 {
    match ty {
        PackedType::User | PackedType::Bot => id,
        PackedType::Chat => -id,
        PackedType::Megagroup | PackedType::Broadcast | PackedType::Gigagroup => {
            -(CHANNEL_ID_OFFSET + id)
        }
    }
}

/// Open an MTProto connection backed by the session file.
/// The session may or may not be authorized yet.
pub async fn connect_client(config: &TelegramConfig) -> Result<Client> {
    let session = Session::load_file_or_create(&config.session_file).with_context(|| {
        format!(
            "Failed to open session file: {}",
            config.session_file.display()
        )
    })?;

    Client::connect(ClientConfig {
        session,
        api_id: config.api_id,
        api_hash: config.api_hash.clone(),
        params: InitParams {
            catch_up: false,
            ..Default::default()
        },
    })
    .await
    .context("Failed to connect to Telegram")
}

pub fn save_session(client: &Client, path: &Path) -> Result<()> {
    client
        .session()
        .save_to_file(path)
        .with_context(|| format!("Failed to save session file: {}", path.display()))
}

/// Identity session: the user account reading the source channel.
///
/// The session file is written back when the value is dropped, so scan
/// completion, monitor shutdown and error paths all release it the same way.
pub struct UserSession {
    client: Client,
    session_file: PathBuf,
    chat: PackedChat,
    chat_id: i64,
}

impl UserSession {
    pub async fn open(config: &TelegramConfig, source_id: i64) -> Result<Self> {
        let client = connect_client(config).await?;

        let authorized = client
            .is_authorized()
            .await
            .context("Failed to check session authorization")?;
        if !authorized {
            anyhow::bail!(
                "User session {} is not authorized; run `telerelay-login` first",
                config.session_file.display()
            );
        }

        let chat = resolve_chat(&client, source_id).await?;
        info!("User session started, watching chat {}", source_id);

        Ok(Self {
            client,
            session_file: config.session_file.clone(),
            chat,
            chat_id: source_id,
        })
    }

    fn convert(&self, message: &Message) -> SourceMessage {
        let text = message.text();
        SourceMessage {
            text: (!text.is_empty()).then(|| text.to_string()),
            date: message.date(),
            chat_id: self.chat_id,
            id: message.id(),
        }
    }
}

impl Drop for UserSession {
    fn drop(&mut self) {
        match save_session(&self.client, &self.session_file) {
            Ok(()) => info!("User session closed"),
            Err(e) => warn!("Failed to persist user session: {:#}", e),
        }
    }
}

/// Find the source chat among the account's dialogs; MTProto needs the
/// access hash that only comes with a known peer.
async fn resolve_chat(client: &Client, marked: i64) -> Result<PackedChat> {
    let mut dialogs = client.iter_dialogs();
    while let Some(dialog) = dialogs.next().await.context("Failed to list dialogs")? {
        let packed = dialog.chat().pack();
        if marked_id(packed.ty, packed.id) == marked {
            return Ok(packed);
        }
    }
    anyhow::bail!(
        "Chat {} not found in this account's dialogs; is the account subscribed?",
        marked
    )
}

#[async_trait]
impl ChannelSource for UserSession {
    fn chat_id(&self) -> i64 {
        self.chat_id
    }

    async fn history_since(&self, since: DateTime<Utc>) -> History {
        // The server pages newest first; collect back to `since` and flip.
        let mut iter = self.client.iter_messages(self.chat);
        let mut history = History::default();
        loop {
            match iter.next().await {
                Ok(Some(message)) if message.date() >= since => {
                    history.messages.push(self.convert(&message));
                }
                Ok(_) => break,
                Err(e) => {
                    history.error =
                        Some(anyhow::Error::new(e).context("Failed to fetch channel history"));
                    break;
                }
            }
        }
        history.messages.reverse();
        debug!(
            "Fetched {} messages since {}",
            history.messages.len(),
            since
        );
        history
    }

    async fn next_message(&self) -> Result<Option<SourceMessage>> {
        loop {
            let update = match self.client.next_update().await {
                Ok(update) => update,
                Err(InvocationError::Dropped) => return Ok(None),
                Err(e) => return Err(e).context("Failed to receive update"),
            };

            if let Update::NewMessage(message) = update {
                let packed = message.chat().pack();
                if marked_id(packed.ty, packed.id) == self.chat_id {
                    return Ok(Some(self.convert(&message)));
                }
            }
        }
    }
}
