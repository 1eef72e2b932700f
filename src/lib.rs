// ABOUTME: Library root for the Discord message deleter
// ABOUTME: Exposes the paginated collector, the bulk deleter and their supporting modules

pub mod collector;
pub mod config;
pub mod error;
pub mod headers;
pub mod mutator;
pub mod remote;
pub mod safety;
pub mod storage;

pub use collector::{Collection, Collector, StopReason};
pub use config::Config;
pub use error::DeleterError;
pub use mutator::{BulkMutator, DeletionTally, MutationReport, RetryPolicy};
