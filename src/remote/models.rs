// ABOUTME: Data structures exchanged with the Discord API and the record file
// ABOUTME: Records keep their opaque payload so persistence round-trips verbatim

use serde::{Deserialize, Serialize};

/// One remote message, identified by `(channel_id, id)`.
///
/// Identifiers are optional on the type because record files are operator
/// supplied; entries without them are skipped at deletion time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(flatten)]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

impl Record {
    pub fn new(id: impl Into<String>, channel_id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            channel_id: Some(channel_id.into()),
            payload: serde_json::Map::new(),
        }
    }

    /// Returns `(channel_id, id)` when both identifiers are present and non-empty.
    pub fn key(&self) -> Option<(&str, &str)> {
        match (self.channel_id.as_deref(), self.id.as_deref()) {
            (Some(channel), Some(id)) if !channel.is_empty() && !id.is_empty() => {
                Some((channel, id))
            }
            _ => None,
        }
    }
}

/// Body of a search response. Messages arrive grouped (each hit with its
/// context), hence the nested sequence.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub messages: Vec<Vec<Record>>,
    pub total_results: Option<u64>,
}

impl SearchResponse {
    pub fn into_page(self) -> PageResult {
        PageResult {
            records: self.messages.into_iter().flatten().collect(),
            reported_total: self.total_results,
        }
    }
}

/// One flattened search page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    pub records: Vec<Record>,
    pub reported_total: Option<u64>,
}

/// Body of a 429 response.
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitBody {
    pub retry_after: Option<f64>,
}
