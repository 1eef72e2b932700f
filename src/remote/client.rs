// ABOUTME: HTTP client for issuing single requests against the Discord API
// ABOUTME: Classifies every response into ok, rate-limited, error or fatal outcomes

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use std::time::Duration;

use super::models::RateLimitBody;

const BODY_SNIPPET_LEN: usize = 200;

/// A fully-formed outbound request. Headers are owned by the requester and
/// attached to every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: String,
}

impl RequestSpec {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::GET,
            url: url.into(),
        }
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self {
            method: Method::DELETE,
            url: url.into(),
        }
    }
}

/// Classification of exactly one network attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum RateLimitOutcome {
    /// 2xx. `body` is `None` for empty bodies (204).
    Ok {
        status: u16,
        body: Option<serde_json::Value>,
    },
    /// 429, with the wait already floored to the policy minimum.
    RateLimited { wait: Duration },
    /// Any other failure. `status` is `None` for transport failures.
    Error { status: Option<u16>, body: String },
    /// 401: the credential is invalid and no later call can succeed.
    Fatal { status: u16 },
}

impl RateLimitOutcome {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        RateLimitOutcome::Error {
            status: None,
            body: err.to_string(),
        }
    }
}

/// How long to wait on a 429 when the server gives no usable hint, and the
/// minimum wait regardless of hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub default_wait: Duration,
    pub min_wait: Duration,
}

impl RateLimitPolicy {
    /// Header seconds win over the body's fractional seconds, which win over
    /// the default. The result never drops below `min_wait`.
    pub fn wait_for(&self, retry_after_header: Option<&str>, body: &str) -> Duration {
        let hinted = retry_after_header
            .and_then(parse_whole_seconds)
            .map(|secs| Duration::from_millis(secs.saturating_mul(1000)))
            .or_else(|| body_retry_after(body));

        hinted.unwrap_or(self.default_wait).max(self.min_wait)
    }
}

/// Parses the leading integer of a header value, so `"2.7"` reads as 2.
fn parse_whole_seconds(value: &str) -> Option<u64> {
    let digits: String = value
        .trim()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

fn body_retry_after(body: &str) -> Option<Duration> {
    let parsed: RateLimitBody = serde_json::from_str(body).ok()?;
    let secs = parsed.retry_after.filter(|s| s.is_finite() && *s > 0.0)?;
    Some(Duration::from_millis((secs * 1000.0).ceil() as u64))
}

/// Maps a raw response onto an outcome. Kept free of I/O so the whole
/// decision table is testable without a server.
pub fn classify_response(
    status: u16,
    retry_after_header: Option<&str>,
    body: &str,
    policy: &RateLimitPolicy,
) -> RateLimitOutcome {
    match status {
        429 => RateLimitOutcome::RateLimited {
            wait: policy.wait_for(retry_after_header, body),
        },
        401 => RateLimitOutcome::Fatal { status },
        200..=299 if body.trim().is_empty() => RateLimitOutcome::Ok { status, body: None },
        200..=299 => match serde_json::from_str(body) {
            Ok(value) => RateLimitOutcome::Ok {
                status,
                body: Some(value),
            },
            Err(e) => RateLimitOutcome::Error {
                status: Some(status),
                body: format!("unparseable response body ({}): {}", e, snippet(body)),
            },
        },
        _ => RateLimitOutcome::Error {
            status: Some(status),
            body: snippet(body),
        },
    }
}

/// Classifies a response whose status arrived but whose body could not be
/// read. The status still decides the outcome; the read error stands in for
/// the body on errors.
pub fn classify_unreadable_body(
    status: u16,
    retry_after_header: Option<&str>,
    read_error: &dyn std::fmt::Display,
    policy: &RateLimitPolicy,
) -> RateLimitOutcome {
    match classify_response(status, retry_after_header, "", policy) {
        RateLimitOutcome::Error { status, .. } => RateLimitOutcome::Error {
            status,
            body: format!("unreadable response body: {}", read_error),
        },
        outcome => outcome,
    }
}

/// Truncates a response body for diagnostics.
pub fn snippet(body: &str) -> String {
    if body.chars().count() <= BODY_SNIPPET_LEN {
        return body.to_string();
    }
    let mut cut: String = body.chars().take(BODY_SNIPPET_LEN).collect();
    cut.push('…');
    cut
}

/// Issues one request and classifies the response. Implementations never
/// retry and never sleep; callers own the backoff policy.
#[async_trait]
pub trait Requester: Send + Sync {
    async fn execute(&self, spec: &RequestSpec) -> RateLimitOutcome;
}

#[async_trait]
impl<T: Requester + ?Sized> Requester for &T {
    async fn execute(&self, spec: &RequestSpec) -> RateLimitOutcome {
        (**self).execute(spec).await
    }
}

pub struct HttpRequester {
    client: Client,
    policy: RateLimitPolicy,
}

impl HttpRequester {
    pub fn new(headers: HeaderMap, timeout: Duration, policy: RateLimitPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self::from_client(client, policy))
    }

    /// Wraps an already configured client; its default headers are sent on
    /// every request.
    pub fn from_client(client: Client, policy: RateLimitPolicy) -> Self {
        Self { client, policy }
    }
}

#[async_trait]
impl Requester for HttpRequester {
    async fn execute(&self, spec: &RequestSpec) -> RateLimitOutcome {
        let response = match self
            .client
            .request(spec.method.clone(), &spec.url)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %spec.url, error = %e, "Transport failure");
                return RateLimitOutcome::transport(e);
            }
        };

        let status = response.status().as_u16();
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);

        match response.text().await {
            Ok(body) => classify_response(status, retry_after.as_deref(), &body, &self.policy),
            Err(e) => {
                tracing::debug!(status, error = %e, "Could not read response body");
                classify_unreadable_body(status, retry_after.as_deref(), &e, &self.policy)
            }
        }
    }
}
