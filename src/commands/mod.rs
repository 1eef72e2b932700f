pub mod delete;
pub mod search;
