//! Interactive prompts and progress feedback.

use std::time::Duration;

use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm as ConfirmPrompt, Password};
use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;
use taskmanager_client::Confirm;
use tracing::warn;

/// Answers confirmations from the terminal, or approves everything with
/// `--yes`.
#[derive(Debug, Clone, Copy)]
pub struct Approver {
    assume_yes: bool,
}

impl Approver {
    pub const fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Confirm for Approver {
    fn confirm(&self, prompt: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        ConfirmPrompt::with_theme(&ColorfulTheme::default())
            .with_prompt(prompt)
            .default(false)
            .interact()
            .unwrap_or_else(|e| {
                // No terminal to ask on: treat as "no"
                warn!(error = %e, "Confirmation prompt failed");
                false
            })
    }
}

/// Use `given` or ask for a password on the terminal.
pub fn password(given: Option<String>, confirm: bool) -> Result<SecretString, dialoguer::Error> {
    if let Some(password) = given {
        return Ok(SecretString::from(password));
    }

    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Confirm password", "Passwords do not match");
    }
    prompt.interact().map(SecretString::from)
}

/// A spinner on stderr shown while a request is outstanding.
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.blue} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Run `fut` with a spinner, clearing it when done.
pub async fn with_spinner<F: Future>(message: &str, fut: F) -> F::Output {
    let pb = spinner(message);
    let output = fut.await;
    pb.finish_and_clear();
    output
}
