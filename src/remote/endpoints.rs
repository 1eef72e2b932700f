// ABOUTME: URL construction for the search and delete endpoints
// ABOUTME: Identifiers are percent-encoded as path segments

use anyhow::{anyhow, Context, Result};
use reqwest::Url;

use crate::error::DeleterError;

#[derive(Debug, Clone)]
pub struct Endpoints {
    base: Url,
}

impl Endpoints {
    pub fn new(api_base_url: &str) -> Result<Self> {
        let base = Url::parse(api_base_url)
            .with_context(|| format!("Invalid API base URL '{}'", api_base_url))?;
        if base.cannot_be_a_base() {
            return Err(DeleterError::Config(format!(
                "API base URL '{}' cannot carry a path",
                api_base_url
            ))
            .into());
        }
        Ok(Self { base })
    }

    fn with_segments(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// `GET /guilds/{guild}/messages/search?author_id=..[&offset=..]`.
    /// The offset is omitted on the first page.
    pub fn search(&self, guild_id: &str, author_id: &str, offset: usize) -> Result<String> {
        let mut url = self.with_segments(&["guilds", guild_id, "messages", "search"])?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("author_id", author_id);
            if offset > 0 {
                query.append_pair("offset", &offset.to_string());
            }
        }
        Ok(url.into())
    }

    /// `DELETE /channels/{channel}/messages/{message}`.
    pub fn message(&self, channel_id: &str, message_id: &str) -> Result<String> {
        let url = self.with_segments(&["channels", channel_id, "messages", message_id])?;
        Ok(url.into())
    }
}
