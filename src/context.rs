//! Process-wide settings threaded explicitly instead of read from globals.
//!
//! Every command constructs one `RunContext` from its parsed flags and passes
//! it down to the protocol and collector functions it calls. Nothing in
//! `manifest`, `status`, `git`, or the protocol modules reaches for an
//! environment variable or a `OnceLock` to answer "are we verbose" or "did
//! the user pass --yes" — they take it as a parameter.

use std::path::PathBuf;

/// Settings common to every subcommand.
#[derive(Debug, Clone)]
pub struct RunContext {
    /// Pre-answer every confirmation prompt with "yes".
    pub yes: bool,
    /// Emit step-by-step detail via `Output::debug`/`Output::step`.
    pub verbose: bool,
    /// Never read stdin as a manifest source, even if data is pending.
    pub ignore_stdin: bool,
    /// Upper bound on concurrent per-repo git invocations.
    pub max_workers: usize,
    /// Path to the forge CLI binary (defaults to `gh` on PATH).
    pub forge_path: PathBuf,
}

impl Default for RunContext {
    fn default() -> Self {
        Self {
            yes: false,
            verbose: false,
            ignore_stdin: false,
            max_workers: 8,
            forge_path: PathBuf::from("gh"),
        }
    }
}

impl RunContext {
    pub fn new(yes: bool, verbose: bool, ignore_stdin: bool) -> Self {
        Self {
            yes,
            verbose,
            ignore_stdin,
            ..Self::default()
        }
    }

    /// Worker count for a fleet of `repo_count` repos: `min(max_workers, repo_count)`,
    /// never zero.
    pub fn worker_count(&self, repo_count: usize) -> usize {
        self.max_workers.min(repo_count).max(1)
    }
}
