use std::time::Duration;

use crate::error::{HomeworkError, Result};

pub const DEFAULT_ENDPOINT: &str = "https://practicum.yandex.ru/api/user_api/homework_statuses/";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

/// Secrets the bot cannot run without. Read once at startup.
#[derive(Clone, Default)]
pub struct Secrets {
    /// OAuth token for the homework API
    pub practicum_token: Option<String>,

    /// Telegram bot token
    pub telegram_token: Option<String>,

    /// Chat that receives every notification
    pub telegram_chat_id: Option<String>,
}

// Tokens stay out of logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("missing", &self.missing())
            .finish()
    }
}

/// Secrets after the startup check, with every value present.
#[derive(Clone)]
pub struct Credentials {
    pub practicum_token: String,
    pub telegram_token: String,
    pub telegram_chat_id: String,
}

impl Secrets {
    pub fn from_env() -> Self {
        Self {
            practicum_token: non_empty_var("PRACTICUM_TOKEN"),
            telegram_token: non_empty_var("TELEGRAM_TOKEN"),
            telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),
        }
    }

    /// Environment names of the secrets that are absent or empty.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("PRACTICUM_TOKEN", &self.practicum_token),
            ("TELEGRAM_TOKEN", &self.telegram_token),
            ("TELEGRAM_CHAT_ID", &self.telegram_chat_id),
        ]
        .into_iter()
        .filter(|(_, value)| value.as_deref().is_none_or(str::is_empty))
        .map(|(name, _)| name)
        .collect()
    }

    /// Startup guard: logs one critical line per missing secret.
    ///
    /// Returns `true` only when all three secrets are set. The caller must
    /// exit before entering the poll loop otherwise.
    pub fn ensure_ready(&self) -> bool {
        let missing = self.missing();
        for name in &missing {
            tracing::error!(
                severity = "critical",
                variable = name,
                "Required environment variable is missing, the bot will stop"
            );
        }
        missing.is_empty()
    }

    pub fn credentials(&self) -> Result<Credentials> {
        if let Some(name) = self.missing().first() {
            return Err(HomeworkError::ConfigMissing(name));
        }
        Ok(Credentials {
            practicum_token: self.practicum_token.clone().unwrap_or_default(),
            telegram_token: self.telegram_token.clone().unwrap_or_default(),
            telegram_chat_id: self.telegram_chat_id.clone().unwrap_or_default(),
        })
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub secrets: Secrets,

    /// Homework status endpoint
    pub endpoint: String,

    /// Telegram Bot API base URL
    pub telegram_api_url: String,

    /// Pause between poll cycles (default: 600 seconds)
    pub poll_interval: Duration,

    /// Timeout for every outbound HTTP request (default: 30 seconds)
    pub http_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables, reading `.env` first.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            secrets: Secrets::from_env(),
            endpoint: std::env::var("PRACTICUM_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string()),
            telegram_api_url: std::env::var("TELEGRAM_API_URL")
                .unwrap_or_else(|_| DEFAULT_TELEGRAM_API_URL.to_string()),
            poll_interval: positive_secs(
                "RETRY_TIME_SECS",
                std::env::var("RETRY_TIME_SECS").ok(),
                600,
            )?,
            http_timeout: positive_secs(
                "HTTP_TIMEOUT_SECS",
                std::env::var("HTTP_TIMEOUT_SECS").ok(),
                30,
            )?,
        })
    }

    /// Run the startup guard and hand out credentials, or fail naming
    /// every missing secret.
    pub fn ready_credentials(&self) -> anyhow::Result<Credentials> {
        if !self.secrets.ensure_ready() {
            anyhow::bail!(
                "required configuration is missing: {}",
                self.secrets.missing().join(", ")
            );
        }
        Ok(self.secrets.credentials()?)
    }
}

/// Parse a duration knob in whole seconds. Zero is rejected.
fn positive_secs(name: &str, raw: Option<String>, default: u64) -> anyhow::Result<Duration> {
    let secs = match raw {
        Some(raw) => raw
            .parse::<u64>()
            .map_err(|_| anyhow::anyhow!("{name} must be a valid u64"))?,
        None => default,
    };
    if secs == 0 {
        anyhow::bail!("{name} must be a positive number of seconds");
    }
    Ok(Duration::from_secs(secs))
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}
