// ABOUTME: The `delete` command
// ABOUTME: Reads a saved record list, confirms with the operator and deletes each message

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

use discord_message_deleter::headers::build_headers;
use discord_message_deleter::mutator::{BulkMutator, MutationReport, RetryPolicy};
use discord_message_deleter::remote::{Endpoints, HttpRequester};
use discord_message_deleter::safety::{self, Confirmation};
use discord_message_deleter::{storage, Config};

pub async fn execute(config: &Config, input: &Path, assume_yes: bool) -> Result<()> {
    let token = config.require_token()?;
    safety::warn_if_user_token(token);

    let records = storage::load_records(input)?;
    if records.is_empty() {
        println!("No messages found in {}. Nothing to delete", input.display());
        return Ok(());
    }
    tracing::info!(count = records.len(), path = %input.display(), "Loaded messages");

    let pacing = &config.pacing;
    let mode = Confirmation::choose(assume_yes, Duration::from_secs(pacing.confirm_delay_secs));
    if !safety::confirm_deletion(records.len(), mode).await? {
        println!("Aborted, nothing was deleted");
        return Ok(());
    }

    let requester = HttpRequester::new(
        build_headers(token)?,
        pacing.request_timeout(),
        pacing.delete_policy(),
    )?;
    let policy = RetryPolicy {
        max_attempts: pacing.max_attempts,
        base_delay: Duration::from_millis(pacing.retry_base_delay_ms),
        record_delay: Duration::from_millis(pacing.delete_delay_ms),
    };

    let progress = ProgressBar::new(records.len() as u64);
    progress.set_style(
        ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")?
            .progress_chars("=> "),
    );

    let mutator = BulkMutator::new(requester, Endpoints::new(&config.api_base_url)?, policy)
        .with_progress(progress);
    let report = mutator.run(&records).await?;

    print_report(&report);
    report.ensure_completed()?;
    Ok(())
}

fn print_report(report: &MutationReport) {
    let tally = &report.tally;
    println!();
    println!("Total messages processed: {}", tally.total);
    println!("Successfully deleted:     {}", tally.deleted);
    println!("Skipped (e.g. not found): {}", tally.skipped);
    println!("Failed:                   {}", tally.failed);

    if !report.failures.is_empty() {
        println!();
        println!("Failures:");
        for failure in &report.failures {
            println!(
                "  [{}] message {} in channel {}: {}",
                failure.index + 1,
                failure.message_id,
                failure.channel_id,
                failure.reason
            );
        }
    }
}
