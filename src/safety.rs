// ABOUTME: Safety controls shown before touching a live account
// ABOUTME: Token heuristics and the confirmation gate in front of irreversible deletes

use anyhow::Result;
use dialoguer::Confirm;
use std::io::IsTerminal;
use std::time::Duration;

const BOT_TOKEN_PREFIX: &str = "Bot ";

/// Service-issued tokens are sent with a `Bot ` prefix.
pub fn is_bot_token(token: &str) -> bool {
    token.starts_with(BOT_TOKEN_PREFIX)
}

pub fn warn_if_user_token(token: &str) {
    if is_bot_token(token) {
        return;
    }
    tracing::warn!(
        "The provided DISCORD_TOKEN does not appear to be a Bot token. Automating user \
         accounts is against Discord's Terms of Service and can lead to account \
         termination. Deleted messages cannot be restored."
    );
}

/// How the operator agrees to an irreversible run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// `--yes` was given.
    Preapproved,
    /// Ask on the terminal.
    Prompt,
    /// No terminal: count down so the operator can still press Ctrl+C.
    Countdown(Duration),
}

impl Confirmation {
    pub fn choose(assume_yes: bool, countdown: Duration) -> Self {
        if assume_yes {
            Confirmation::Preapproved
        } else if std::io::stdin().is_terminal() {
            Confirmation::Prompt
        } else {
            Confirmation::Countdown(countdown)
        }
    }
}

/// Returns `Ok(false)` when the operator declines.
pub async fn confirm_deletion(count: usize, mode: Confirmation) -> Result<bool> {
    match mode {
        Confirmation::Preapproved => Ok(true),
        Confirmation::Prompt => {
            let prompt = format!("Permanently delete {} messages? There is no undo", count);
            let answer = tokio::task::spawn_blocking(move || {
                Confirm::new().with_prompt(prompt).default(false).interact()
            })
            .await??;
            Ok(answer)
        }
        Confirmation::Countdown(delay) => {
            tracing::warn!(
                count,
                delay_secs = delay.as_secs(),
                "Deletion will start shortly. Press Ctrl+C to abort"
            );
            tokio::time::sleep(delay).await;
            Ok(true)
        }
    }
}
