// ABOUTME: Custom error types for the message deleter
// ABOUTME: Run-level failures that stop a command, with actionable messages

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleterError {
    Config(String),
    MalformedInput(String),
    Unauthorized(String),
    Storage(String),
}

impl fmt::Display for DeleterError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DeleterError::Config(msg) => write!(f, "Configuration error: {}", msg),
            DeleterError::MalformedInput(msg) => write!(f, "Malformed input: {}", msg),
            DeleterError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DeleterError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for DeleterError {}
