//! Confirmation gate (C11): a uniform interactive yes/no prompt with a
//! non-interactive override.

use crate::errors::CoreError;
use anyhow::Result;
use dialoguer::Confirm;
use std::io::IsTerminal;

/// Ask `prompt`, honoring `--yes` (auto-answers "yes") and refusing to block
/// with [`CoreError::NonInteractive`] when stdin is not a terminal and
/// `--yes` was not given.
pub fn confirm(prompt: &str, yes: bool, default: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CoreError::NonInteractive.into());
    }

    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| anyhow::anyhow!("failed to read confirmation: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yes_flag_short_circuits_without_prompting() {
        assert!(confirm("proceed?", true, false).unwrap());
    }
}
