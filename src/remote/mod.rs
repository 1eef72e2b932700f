// ABOUTME: Remote API module
// ABOUTME: Request classification, endpoint URLs and wire models for the Discord API

pub mod client;
pub mod endpoints;
pub mod models;

pub use client::{
    classify_response, classify_unreadable_body, HttpRequester, RateLimitOutcome,
    RateLimitPolicy, RequestSpec, Requester,
};
pub use endpoints::Endpoints;
pub use models::{PageResult, Record, SearchResponse};
