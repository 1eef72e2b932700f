// ABOUTME: The `search` command
// ABOUTME: Collects all matching messages and saves them for a later delete run

use anyhow::Result;
use std::path::Path;
use std::time::Duration;

use discord_message_deleter::collector::{Collector, StopReason};
use discord_message_deleter::headers::build_headers;
use discord_message_deleter::remote::{Endpoints, HttpRequester};
use discord_message_deleter::{safety, storage, Config};

pub async fn execute(config: &Config, output: &Path) -> Result<()> {
    let scope = config.search_scope()?;
    safety::warn_if_user_token(&scope.token);

    let requester = HttpRequester::new(
        build_headers(&scope.token)?,
        config.pacing.request_timeout(),
        config.pacing.search_policy(),
    )?;
    let endpoints = Endpoints::new(&config.api_base_url)?;
    let collector = Collector::new(
        requester,
        endpoints,
        &scope,
        Duration::from_millis(config.pacing.search_delay_ms),
    );

    tracing::info!(
        author_id = %scope.author_id,
        guild_id = %scope.guild_id,
        "Starting message search"
    );
    let collection = collector.collect().await?;

    if let StopReason::Aborted { reason } = &collection.stop {
        tracing::warn!(
            reason = %reason,
            "Returning a potentially incomplete message list"
        );
    }

    if !storage::save_collection(output, &collection.records)? {
        println!("No messages were found for this author in this guild");
        return Ok(());
    }

    println!(
        "Saved {} messages to {} (server reported {})",
        collection.records.len(),
        output.display(),
        collection
            .known_total
            .map(|t| t.to_string())
            .unwrap_or_else(|| "no total".to_string())
    );
    Ok(())
}
