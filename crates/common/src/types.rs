use std::str::FromStr;

/// Review status codes reported by the homework API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomeworkStatus {
    Approved,
    Reviewing,
    Rejected,
}

impl HomeworkStatus {
    /// Lexicon text shown to the student for this status.
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "Работа проверена: ревьюеру всё понравилось. Ура!",
            HomeworkStatus::Reviewing => "Работа взята на проверку ревьюером.",
            HomeworkStatus::Rejected => "Работа проверена: у ревьюера есть замечания.",
        }
    }
}

impl std::fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HomeworkStatus::Approved => write!(f, "approved"),
            HomeworkStatus::Reviewing => write!(f, "reviewing"),
            HomeworkStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for HomeworkStatus {
    type Err = String;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        match code {
            "approved" => Ok(HomeworkStatus::Approved),
            "reviewing" => Ok(HomeworkStatus::Reviewing),
            "rejected" => Ok(HomeworkStatus::Rejected),
            other => Err(other.to_string()),
        }
    }
}

/// Unix timestamp (seconds) passed to the API as `from_date`.
pub type Cursor = i64;

/// A response that passed shape validation.
///
/// `homeworks` holds the raw records, newest first. `current_date` is the
/// cursor the API wants us to use next time, when it sent one.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedResponse {
    pub homeworks: Vec<serde_json::Value>,
    pub current_date: Option<Cursor>,
}

impl ValidatedResponse {
    /// The cursor for the next poll: the API's refresh value, else `previous`.
    pub fn next_cursor(&self, previous: Cursor) -> Cursor {
        self.current_date.unwrap_or(previous)
    }
}
