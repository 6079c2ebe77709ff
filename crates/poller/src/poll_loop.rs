//! The bot's main loop: fetch, validate, format, notify, sleep, repeat.
//!
//! Every failure inside a cycle is logged, relayed to the chat on a
//! best-effort basis, and followed by the same fixed pause. The loop only
//! ends when its cancellation token fires.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio_util::sync::CancellationToken;

use homework_common::error::{HomeworkError, Result};
use homework_common::types::Cursor;
use homework_notifier::{Notifier, notify};

use crate::api::StatusSource;
use crate::formatter::format_status;
use crate::validator::validate;

/// Prefix of the diagnostic message relayed when a cycle fails.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы";

/// What a successful cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The newest record was formatted and handed to the notifier.
    Notified(String),
    /// The API reported nothing new.
    NoNewStatus,
}

pub struct PollLoop {
    source: Arc<dyn StatusSource>,
    notifier: Arc<dyn Notifier>,
    interval: Duration,
    cursor: Cursor,
    cancel: CancellationToken,
}

impl PollLoop {
    /// Create a loop whose cursor starts at the current time.
    pub fn new(
        source: Arc<dyn StatusSource>,
        notifier: Arc<dyn Notifier>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            source,
            notifier,
            interval,
            cursor: Utc::now().timestamp(),
            cancel,
        }
    }

    pub fn with_cursor(mut self, cursor: Cursor) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Run one poll cycle without sleeping.
    ///
    /// The cursor only moves when the whole cycle succeeds.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let response = self.source.fetch(self.cursor).await?;
        let validated = validate(&response)?;

        let outcome = match validated.homeworks.first() {
            Some(record) => {
                let text = format_status(record)?;
                notify(self.notifier.as_ref(), &text).await;
                CycleOutcome::Notified(text)
            }
            None => {
                tracing::debug!(cursor = self.cursor, "No new homework statuses");
                CycleOutcome::NoNewStatus
            }
        };

        self.cursor = validated.next_cursor(self.cursor);
        Ok(outcome)
    }

    /// Poll until the cancellation token fires.
    ///
    /// Cancellation also abandons an in-flight cycle; the cursor keeps its
    /// previous value in that case.
    pub async fn run(&mut self) {
        tracing::info!(
            cursor = self.cursor,
            interval_secs = self.interval.as_secs(),
            "Poll loop started"
        );

        let cancel = self.cancel.clone();
        loop {
            let result = tokio::select! {
                biased;
                result = self.run_cycle() => result,
                _ = cancel.cancelled() => break,
            };
            if let Err(e) = result {
                self.report_failure(&e).await;
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        tracing::info!(cursor = self.cursor, "Poll loop stopped");
    }

    async fn report_failure(&self, error: &HomeworkError) {
        let message = format!("{FAILURE_PREFIX}: {error}");
        tracing::error!(error = %error, cursor = self.cursor, "Poll cycle failed");
        notify(self.notifier.as_ref(), &message).await;
    }
}
