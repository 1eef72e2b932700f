// ABOUTME: Run configuration: credentials, search scope, file paths and pacing
// ABOUTME: Loaded from an optional TOML file and overlaid with environment values

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::DeleterError;
use crate::remote::RateLimitPolicy;

pub const DEFAULT_API_BASE_URL: &str = "https://discord.com/api/v9";
pub const DEFAULT_RECORDS_FILE: &str = "found_messages.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub token: Option<String>,
    pub author_id: Option<String>,
    pub guild_id: Option<String>,
    pub api_base_url: String,
    pub records_file: PathBuf,
    pub pacing: PacingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            author_id: None,
            guild_id: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            records_file: PathBuf::from(DEFAULT_RECORDS_FILE),
            pacing: PacingConfig::default(),
        }
    }
}

/// Delays and caps, all in milliseconds unless the name says otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PacingConfig {
    pub search_delay_ms: u64,
    pub search_min_wait_ms: u64,
    pub search_default_wait_ms: u64,
    pub delete_delay_ms: u64,
    pub delete_default_wait_ms: u64,
    pub retry_base_delay_ms: u64,
    pub max_attempts: u32,
    pub request_timeout_secs: u64,
    pub confirm_delay_secs: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            search_delay_ms: 1100,
            search_min_wait_ms: 1200,
            search_default_wait_ms: 5000,
            delete_delay_ms: 1500,
            delete_default_wait_ms: 3000,
            retry_base_delay_ms: 5000,
            max_attempts: 3,
            request_timeout_secs: 30,
            confirm_delay_secs: 5,
        }
    }
}

impl PacingConfig {
    pub fn search_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            default_wait: Duration::from_millis(self.search_default_wait_ms),
            min_wait: Duration::from_millis(self.search_min_wait_ms),
        }
    }

    /// Delete waits never drop below the steady inter-record cadence.
    pub fn delete_policy(&self) -> RateLimitPolicy {
        RateLimitPolicy {
            default_wait: Duration::from_millis(self.delete_default_wait_ms),
            min_wait: Duration::from_millis(self.delete_delay_ms),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// The validated subset the search command needs.
#[derive(Debug, Clone)]
pub struct SearchScope {
    pub token: String,
    pub author_id: String,
    pub guild_id: String,
}

impl Config {
    /// Reads a TOML file, or returns defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays `DISCORD_TOKEN`, `AUTHOR_ID` and `GUILD_ID` from `lookup`.
    /// Empty values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        if let Some(token) = get("DISCORD_TOKEN") {
            self.token = Some(token);
        }
        if let Some(author_id) = get("AUTHOR_ID") {
            self.author_id = Some(author_id);
        }
        if let Some(guild_id) = get("GUILD_ID") {
            self.guild_id = Some(guild_id);
        }
    }

    pub fn validate(&self) -> Result<(), DeleterError> {
        if self.pacing.max_attempts == 0 {
            return Err(DeleterError::Config(
                "pacing.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.api_base_url.trim().is_empty() {
            return Err(DeleterError::Config("api_base_url is empty".to_string()));
        }
        Ok(())
    }

    pub fn require_token(&self) -> Result<&str, DeleterError> {
        self.token.as_deref().ok_or_else(|| {
            DeleterError::Config(
                "Missing DISCORD_TOKEN. Set it in the environment or the config file".to_string(),
            )
        })
    }

    pub fn search_scope(&self) -> Result<SearchScope, DeleterError> {
        let token = self.require_token()?.to_string();
        let missing = |name: &str| {
            DeleterError::Config(format!(
                "Missing {}. Set it in the environment or the config file",
                name
            ))
        };
        let author_id = self.author_id.clone().ok_or_else(|| missing("AUTHOR_ID"))?;
        let guild_id = self.guild_id.clone().ok_or_else(|| missing("GUILD_ID"))?;
        Ok(SearchScope {
            token,
            author_id,
            guild_id,
        })
    }
}
