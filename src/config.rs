use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::keywords::KeywordSet;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub channels: ChannelsConfig,
    #[serde(default)]
    pub keywords: KeywordsConfig,
    #[serde(default = "default_scan_config")]
    pub scan: ScanConfig,
    #[serde(default = "default_notify_config")]
    pub notify: NotifyConfig,
    #[serde(default = "default_logging_config")]
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    /// Application id from my.telegram.org, shared by both sessions
    #[serde(default)]
    pub api_id: i32,
    #[serde(default)]
    pub api_hash: String,
    #[serde(default)]
    pub bot_token: String,
    /// Where the user (identity) session is persisted after login
    #[serde(default = "default_session_file")]
    pub session_file: PathBuf,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ChannelsConfig {
    /// Channel being watched, in marked form (`-100...` for channels)
    #[serde(default)]
    pub source_id: i64,
    /// Channel that receives alerts
    #[serde(default)]
    pub target_id: i64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct KeywordsConfig {
    /// Comma-separated keyword list
    #[serde(default)]
    pub list: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,
    /// Pause after every scan notification
    #[serde(default = "default_pace_ms")]
    pub pace_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NotifyConfig {
    #[serde(default = "default_link_host")]
    pub link_host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub directory: PathBuf,
    #[serde(default = "default_log_prefix")]
    pub file_prefix: String,
    /// Number of daily log files kept on disk
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

fn default_session_file() -> PathBuf {
    PathBuf::from("user_session.session")
}

fn default_lookback_days() -> u32 {
    7
}

fn default_pace_ms() -> u64 {
    1000
}

fn default_link_host() -> String {
    "t.me".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_prefix() -> String {
    "telebot".to_string()
}

fn default_max_log_files() -> usize {
    30
}

fn default_scan_config() -> ScanConfig {
    ScanConfig {
        lookback_days: default_lookback_days(),
        pace_ms: default_pace_ms(),
    }
}

fn default_notify_config() -> NotifyConfig {
    NotifyConfig {
        link_host: default_link_host(),
    }
}

fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        directory: default_log_dir(),
        file_prefix: default_log_prefix(),
        max_files: default_max_log_files(),
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>> {
    if !path.exists() {
        return Ok(HashMap::new());
    }
    dotenvy::from_path_iter(path)
        .with_context(|| format!("Failed to read env file: {}", path.display()))?
        .map(|item| item.with_context(|| format!("Failed to parse env file: {}", path.display())))
        .collect()
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_id: 0,
            api_hash: String::new(),
            bot_token: String::new(),
            session_file: default_session_file(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            telegram: TelegramConfig::default(),
            channels: ChannelsConfig::default(),
            keywords: KeywordsConfig::default(),
            scan: default_scan_config(),
            notify: default_notify_config(),
            logging: default_logging_config(),
        }
    }
}

impl Config {
    /// Load the TOML file (when present) and apply environment overrides,
    /// including a `.env` file in the working directory.
    /// The result is not validated; call [`Config::validate`] before use.
    pub fn load(path: &Path) -> Result<Self> {
        Self::load_with_env_file(path, Path::new(".env"))
    }

    /// Like [`Config::load`], reading dotenv-style variables from `env_file`.
    /// Variables already set in the process environment win over the file;
    /// a missing file is ignored.
    pub fn load_with_env_file(path: &Path, env_file: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)?
        } else {
            Config::default()
        };

        let file_vars = read_env_file(env_file)?;
        config.apply_env(|key| {
            std::env::var(key)
                .ok()
                .or_else(|| file_vars.get(key).cloned())
        })?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Override fields from the deployment's environment variable names.
    /// `lookup` is injected so tests do not touch the process environment.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("API_ID") {
            self.telegram.api_id = v
                .trim()
                .parse()
                .with_context(|| format!("API_ID is not a number: {}", v))?;
        }
        if let Some(v) = lookup("API_HASH") {
            self.telegram.api_hash = v.trim().to_string();
        }
        if let Some(v) = lookup("BOT_TOKEN") {
            self.telegram.bot_token = v.trim().to_string();
        }
        if let Some(v) = lookup("SOURCE_CHANNEL_ID") {
            self.channels.source_id = v
                .trim()
                .parse()
                .with_context(|| format!("SOURCE_CHANNEL_ID is not a number: {}", v))?;
        }
        if let Some(v) = lookup("TARGET_CHANNEL_ID") {
            self.channels.target_id = v
                .trim()
                .parse()
                .with_context(|| format!("TARGET_CHANNEL_ID is not a number: {}", v))?;
        }
        if let Some(v) = lookup("KEYWORDS") {
            self.keywords.list = v;
        }
        Ok(())
    }

    /// Credentials needed by the identity session alone (used by the login tool).
    pub fn validate_api_credentials(&self) -> Result<()> {
        if self.telegram.api_id == 0 {
            anyhow::bail!("telegram.api_id (API_ID) is not set");
        }
        if self.telegram.api_hash.is_empty() {
            anyhow::bail!("telegram.api_hash (API_HASH) is not set");
        }
        Ok(())
    }

    /// Fail fast on anything that would otherwise surface as a runtime anomaly.
    pub fn validate(&self) -> Result<()> {
        self.validate_api_credentials()?;
        if self.telegram.bot_token.is_empty() {
            anyhow::bail!("telegram.bot_token (BOT_TOKEN) is not set");
        }
        if self.channels.source_id == 0 {
            anyhow::bail!("channels.source_id (SOURCE_CHANNEL_ID) is not set");
        }
        if self.channels.target_id == 0 {
            anyhow::bail!("channels.target_id (TARGET_CHANNEL_ID) is not set");
        }
        if self.keyword_set().is_empty() {
            anyhow::bail!("keywords.list (KEYWORDS) contains no keywords");
        }
        if self.scan.lookback_days == 0 {
            anyhow::bail!("scan.lookback_days must be at least 1");
        }
        if self.notify.link_host.is_empty() {
            anyhow::bail!("notify.link_host must not be empty");
        }
        Ok(())
    }

    pub fn keyword_set(&self) -> KeywordSet {
        KeywordSet::parse(&self.keywords.list)
    }

    pub fn lookback(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.scan.lookback_days))
    }

    pub fn pace(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.scan.pace_ms)
    }
}
