use thiserror::Error;

/// Closed set of failures the bot can run into.
///
/// Only `ConfigMissing` is fatal; the poll loop logs and relays every other
/// variant and then carries on with the next cycle.
#[derive(Debug, Error)]
pub enum HomeworkError {
    #[error("Missing required environment variable: {0}")]
    ConfigMissing(&'static str),

    #[error("Homework API returned status {status}")]
    ApiUnavailable { status: u16 },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Malformed API response: {0}")]
    MalformedResponse(String),

    #[error("Homework record is missing field `{0}`")]
    MissingField(&'static str),

    #[error("Unknown homework status: {0}")]
    UnknownStatus(String),

    #[error("Notification delivery failed: {0}")]
    NotifyTransport(String),
}

impl HomeworkError {
    /// Whether the process must stop instead of retrying on the next cycle.
    pub fn is_fatal(&self) -> bool {
        matches!(self, HomeworkError::ConfigMissing(_))
    }
}

pub type Result<T> = std::result::Result<T, HomeworkError>;
