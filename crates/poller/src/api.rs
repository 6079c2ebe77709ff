use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::header::AUTHORIZATION;
use serde_json::Value;

use homework_common::config::Credentials;
use homework_common::error::{HomeworkError, Result};
use homework_common::types::Cursor;

/// Where homework statuses come from.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait StatusSource: Send + Sync {
    /// Fetch the raw, not yet validated, status payload for items changed
    /// since `cursor`.
    async fn fetch(&self, cursor: Cursor) -> Result<Value>;
}

/// HTTP client for the homework status endpoint.
pub struct ApiPoller {
    client: reqwest::Client,
    endpoint: String,
    token: String,
}

impl std::fmt::Debug for ApiPoller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiPoller")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ApiPoller {
    pub fn new(
        endpoint: impl Into<String>,
        credentials: &Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            token: credentials.practicum_token.clone(),
        })
    }
}

#[async_trait]
impl StatusSource for ApiPoller {
    async fn fetch(&self, cursor: Cursor) -> Result<Value> {
        // A zero cursor means "from now".
        let from_date = if cursor > 0 {
            cursor
        } else {
            Utc::now().timestamp()
        };

        tracing::debug!(endpoint = %self.endpoint, from_date, "Requesting homework statuses");

        let response = self
            .client
            .get(&self.endpoint)
            .header(AUTHORIZATION, format!("OAuth {}", self.token))
            .query(&[("from_date", from_date)])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HomeworkError::ApiUnavailable {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| HomeworkError::MalformedResponse(format!("body is not JSON: {e}")))
    }
}
