// ABOUTME: Deletes every message in a collected record list, one request at a time
// ABOUTME: Layers bounded retries over rate-limit waits and tallies each outcome

use anyhow::Result;
use indicatif::ProgressBar;
use std::time::Duration;

use crate::error::DeleterError;
use crate::remote::{Endpoints, RateLimitOutcome, Record, RequestSpec, Requester};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeletionTally {
    pub deleted: usize,
    pub skipped: usize,
    pub failed: usize,
    pub total: usize,
}

/// A record that could not be deleted, kept for the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureEntry {
    pub index: usize,
    pub message_id: String,
    pub channel_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct MutationReport {
    pub tally: DeletionTally,
    pub failures: Vec<FailureEntry>,
    /// Set when a 401 stopped the run before the end of the list.
    pub aborted: bool,
}

impl MutationReport {
    /// An aborted run is an error for the caller even though the report
    /// itself is complete up to the abort.
    pub fn ensure_completed(&self) -> Result<(), DeleterError> {
        if !self.aborted {
            return Ok(());
        }
        let reason = self
            .failures
            .last()
            .map(|f| f.reason.clone())
            .unwrap_or_else(|| "the token was rejected".to_string());
        Err(DeleterError::Unauthorized(format!(
            "deletion stopped early after {} of {} messages: {}",
            self.tally.deleted + self.tally.skipped + self.tally.failed,
            self.tally.total,
            reason
        )))
    }
}

/// Result of processing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Deleted,
    Skipped,
    Failed(String),
}

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Pause between consecutive records.
    pub record_delay: Duration,
}

pub struct BulkMutator<R> {
    requester: R,
    endpoints: Endpoints,
    policy: RetryPolicy,
    progress: ProgressBar,
}

impl<R: Requester> BulkMutator<R> {
    pub fn new(requester: R, endpoints: Endpoints, policy: RetryPolicy) -> Self {
        Self {
            requester,
            endpoints,
            policy,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Processes `records` in order. Per-record failures are tallied and the
    /// run continues; a 401 stops the run and marks the report aborted.
    pub async fn run(&self, records: &[Record]) -> Result<MutationReport> {
        let mut report = MutationReport {
            tally: DeletionTally {
                total: records.len(),
                ..DeletionTally::default()
            },
            ..MutationReport::default()
        };
        self.progress.set_length(records.len() as u64);

        for (index, record) in records.iter().enumerate() {
            self.progress.inc(1);

            let Some((channel_id, message_id)) = record.key() else {
                self.progress.suspend(|| {
                    tracing::warn!(index, "Skipping record with missing id or channel_id")
                });
                report.tally.skipped += 1;
                continue;
            };

            self.progress.suspend(|| {
                tracing::info!(
                    position = index + 1,
                    total = records.len(),
                    message_id,
                    channel_id,
                    "Processing message"
                )
            });
            self.progress.set_message(format!("message {}", message_id));

            match self.delete_one(channel_id, message_id).await {
                Ok(RecordOutcome::Deleted) => report.tally.deleted += 1,
                Ok(RecordOutcome::Skipped) => report.tally.skipped += 1,
                Ok(RecordOutcome::Failed(reason)) => {
                    self.progress.suspend(|| {
                        tracing::error!(message_id, reason = %reason, "Failed to delete message")
                    });
                    report.tally.failed += 1;
                    report.failures.push(FailureEntry {
                        index,
                        message_id: message_id.to_string(),
                        channel_id: channel_id.to_string(),
                        reason,
                    });
                }
                Err(err) => {
                    self.progress.suspend(|| {
                        tracing::error!(message_id, error = %err, "Stopping deletion run")
                    });
                    report.tally.failed += 1;
                    report.failures.push(FailureEntry {
                        index,
                        message_id: message_id.to_string(),
                        channel_id: channel_id.to_string(),
                        reason: err.to_string(),
                    });
                    report.aborted = true;
                    break;
                }
            }

            if index + 1 < records.len() {
                tokio::time::sleep(self.policy.record_delay).await;
            }
        }

        if report.aborted {
            self.progress.abandon();
        } else {
            self.progress.finish_and_clear();
        }
        Ok(report)
    }

    /// Deletes one message. Rate-limit waits repeat without consuming an
    /// attempt; only other failures count toward `max_attempts`.
    pub async fn delete_one(
        &self,
        channel_id: &str,
        message_id: &str,
    ) -> Result<RecordOutcome, DeleterError> {
        let url = self
            .endpoints
            .message(channel_id, message_id)
            .map_err(|e| DeleterError::Config(e.to_string()))?;
        let spec = RequestSpec::delete(url);
        let max_attempts = self.policy.max_attempts;
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            tracing::debug!(attempt, max_attempts, message_id, "Attempting delete");

            let failure = match self.requester.execute(&spec).await {
                // A 2xx whose body is not JSON still means the server accepted it.
                RateLimitOutcome::Ok { .. }
                | RateLimitOutcome::Error {
                    status: Some(200..=299),
                    ..
                } => {
                    self.progress
                        .suspend(|| tracing::info!(message_id, "Deleted message"));
                    return Ok(RecordOutcome::Deleted);
                }
                RateLimitOutcome::RateLimited { wait } => {
                    self.progress.suspend(|| {
                        tracing::warn!(
                            message_id,
                            wait_ms = wait.as_millis() as u64,
                            "Rate limited, retrying the same message"
                        )
                    });
                    tokio::time::sleep(wait).await;
                    attempt -= 1;
                    continue;
                }
                RateLimitOutcome::Fatal { status } => {
                    return Err(DeleterError::Unauthorized(format!(
                        "status {} while deleting message {}; the token is invalid",
                        status, message_id
                    )));
                }
                RateLimitOutcome::Error {
                    status: Some(404), ..
                } => {
                    self.progress.suspend(|| {
                        tracing::info!(message_id, "Message not found, already deleted or invalid id")
                    });
                    return Ok(RecordOutcome::Skipped);
                }
                RateLimitOutcome::Error {
                    status: Some(403),
                    body,
                } => {
                    return Ok(RecordOutcome::Failed(format!("Forbidden (403): {}", body)));
                }
                RateLimitOutcome::Error {
                    status: Some(status),
                    body,
                } => format!("Status {}: {}", status, body),
                RateLimitOutcome::Error { status: None, body } => format!("Fetch error: {}", body),
            };

            if attempt >= max_attempts {
                return Ok(RecordOutcome::Failed(format!(
                    "Failed after {} attempts ({})",
                    max_attempts, failure
                )));
            }

            let wait = self.policy.base_delay * attempt;
            self.progress.suspend(|| {
                tracing::warn!(
                    message_id,
                    attempt,
                    wait_ms = wait.as_millis() as u64,
                    error = %failure,
                    "Delete failed, retrying"
                )
            });
            tokio::time::sleep(wait).await;
        }
    }
}
