// ABOUTME: Shared fixtures for engine integration tests
// ABOUTME: A scripted requester that replays canned outcomes and records every call

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use discord_message_deleter::remote::{RateLimitOutcome, Record, RequestSpec, Requester};
use serde_json::json;

pub const BASE_URL: &str = "https://discord.test/api/v9";

#[derive(Default)]
pub struct ScriptedRequester {
    outcomes: Mutex<VecDeque<RateLimitOutcome>>,
    calls: Mutex<Vec<RequestSpec>>,
}

impl ScriptedRequester {
    pub fn new(outcomes: impl IntoIterator<Item = RateLimitOutcome>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<RequestSpec> {
        self.calls.lock().unwrap().clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.url).collect()
    }

    pub fn remaining(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }
}

#[async_trait]
impl Requester for ScriptedRequester {
    async fn execute(&self, spec: &RequestSpec) -> RateLimitOutcome {
        self.calls.lock().unwrap().push(spec.clone());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .expect("requester called more times than scripted")
    }
}

pub fn records(ids: std::ops::Range<usize>) -> Vec<Record> {
    ids.map(|i| Record::new(i.to_string(), "9")).collect()
}

/// A search page with one record per group, as the API nests them.
pub fn page(ids: std::ops::Range<usize>, total: Option<u64>) -> RateLimitOutcome {
    let groups: Vec<_> = ids
        .map(|i| json!([{ "id": i.to_string(), "channel_id": "9", "content": format!("msg {}", i) }]))
        .collect();
    let mut body = json!({ "messages": groups });
    if let Some(total) = total {
        body["total_results"] = json!(total);
    }
    RateLimitOutcome::Ok {
        status: 200,
        body: Some(body),
    }
}

pub fn no_content() -> RateLimitOutcome {
    RateLimitOutcome::Ok {
        status: 204,
        body: None,
    }
}

pub fn status(code: u16) -> RateLimitOutcome {
    RateLimitOutcome::Error {
        status: Some(code),
        body: format!("{{\"message\": \"status {}\"}}", code),
    }
}

pub fn rate_limited(ms: u64) -> RateLimitOutcome {
    RateLimitOutcome::RateLimited {
        wait: Duration::from_millis(ms),
    }
}

pub fn unauthorized() -> RateLimitOutcome {
    RateLimitOutcome::Fatal { status: 401 }
}
