// ABOUTME: Walks the paginated search endpoint and accumulates every matching message
// ABOUTME: Retries rate-limited pages verbatim and keeps partial results on failure

use anyhow::Result;
use std::time::Duration;

use crate::config::SearchScope;
use crate::remote::{Endpoints, RateLimitOutcome, Record, RequestSpec, Requester, SearchResponse};

/// Why collection stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// Accumulated count reached the first reported total.
    ReachedTotal,
    /// A page added nothing before the total was reached, or the first page
    /// reported no total at all.
    EmptyPage,
    /// A non-rate-limit failure. Everything gathered so far is kept.
    Aborted { reason: String },
}

#[derive(Debug, Clone)]
pub struct Collection {
    pub records: Vec<Record>,
    /// The total reported by the first successful page, frozen for the run.
    pub known_total: Option<u64>,
    pub stop: StopReason,
}

impl Collection {
    pub fn is_complete(&self) -> bool {
        self.stop == StopReason::ReachedTotal
    }
}

pub struct Collector<R> {
    requester: R,
    endpoints: Endpoints,
    author_id: String,
    guild_id: String,
    page_delay: Duration,
}

impl<R: Requester> Collector<R> {
    pub fn new(
        requester: R,
        endpoints: Endpoints,
        scope: &SearchScope,
        page_delay: Duration,
    ) -> Self {
        Self {
            requester,
            endpoints,
            author_id: scope.author_id.clone(),
            guild_id: scope.guild_id.clone(),
            page_delay,
        }
    }

    /// Fetches pages until the frozen total is reached or a page adds nothing.
    ///
    /// The next offset is always the accumulated length, so uneven page sizes
    /// self-correct. Only URL construction can return `Err`; request failures
    /// end the walk with [`StopReason::Aborted`].
    pub async fn collect(&self) -> Result<Collection> {
        let mut records: Vec<Record> = Vec::new();
        let mut known_total: Option<u64> = None;

        loop {
            let offset = records.len();
            let url = self
                .endpoints
                .search(&self.guild_id, &self.author_id, offset)?;
            let spec = RequestSpec::get(url);

            tracing::info!(
                offset,
                target_total = ?known_total,
                "Fetching search page"
            );

            let body = match self.requester.execute(&spec).await {
                RateLimitOutcome::RateLimited { wait } => {
                    tracing::warn!(
                        offset,
                        wait_ms = wait.as_millis() as u64,
                        "Rate limited, retrying the same page"
                    );
                    tokio::time::sleep(wait).await;
                    continue;
                }
                RateLimitOutcome::Ok { body, .. } => body.unwrap_or(serde_json::Value::Null),
                RateLimitOutcome::Error { status, body } => {
                    let reason = match status {
                        Some(status) => format!("search failed with status {}: {}", status, body),
                        None => format!("search request failed: {}", body),
                    };
                    return Ok(abort(records, known_total, offset, reason));
                }
                RateLimitOutcome::Fatal { status } => {
                    let reason = format!("search rejected the credential (status {})", status);
                    return Ok(abort(records, known_total, offset, reason));
                }
            };

            let page = match serde_json::from_value::<SearchResponse>(body) {
                Ok(response) => response.into_page(),
                Err(e) => {
                    let reason = format!("unexpected search response shape: {}", e);
                    return Ok(abort(records, known_total, offset, reason));
                }
            };

            let page_len = page.records.len();
            if known_total.is_none() {
                known_total = page.reported_total;
            }
            records.extend(page.records);

            tracing::info!(
                fetched = page_len,
                accumulated = records.len(),
                total = ?known_total,
                "Fetched search page"
            );

            let reached = known_total.is_some_and(|total| records.len() as u64 >= total);
            if page_len == 0 && !reached {
                tracing::warn!(
                    accumulated = records.len(),
                    total = ?known_total,
                    "Received an empty page before reaching the reported total; the total may be stale"
                );
            }

            let has_more = known_total.is_some() && !reached && page_len > 0;
            if !has_more {
                let stop = if reached {
                    StopReason::ReachedTotal
                } else {
                    StopReason::EmptyPage
                };
                tracing::info!(accumulated = records.len(), ?stop, "Finished fetching");
                return Ok(Collection {
                    records,
                    known_total,
                    stop,
                });
            }

            tokio::time::sleep(self.page_delay).await;
        }
    }
}

fn abort(
    records: Vec<Record>,
    known_total: Option<u64>,
    offset: usize,
    reason: String,
) -> Collection {
    tracing::error!(
        offset,
        accumulated = records.len(),
        reason = %reason,
        "Collection aborted, keeping partial results"
    );
    Collection {
        records,
        known_total,
        stop: StopReason::Aborted { reason },
    }
}
