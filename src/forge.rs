//! Forge CLI wrapper used by the PR orchestrator (C9).
//!
//! Shells out to `gh` (GitHub CLI) exactly as the process runner does for
//! git: one repo at a time, since rate-limiting and interactive auth prompts
//! on the forge CLI must not interleave across repos.

use crate::errors::CoreError;
use crate::process;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
pub struct PrInfo {
    pub number: u64,
    pub url: String,
    pub title: String,
    pub state: String,
    #[serde(rename = "headRefName")]
    pub head_ref: String,
    #[serde(default)]
    pub body: String,
    #[serde(rename = "baseRefName", default)]
    pub base_ref: String,
    #[serde(default)]
    pub author: PrAuthor,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrAuthor {
    pub login: String,
}

/// A forge CLI handle bound to a binary path and a repo's working directory.
pub struct Forge<'a> {
    pub binary: &'a Path,
}

impl<'a> Forge<'a> {
    pub fn new(binary: &'a Path) -> Self {
        Self { binary }
    }

    fn bin_str(&self) -> String {
        self.binary.to_string_lossy().into_owned()
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<process::ProcessOutput> {
        process::run(&self.bin_str(), args, dir)
    }

    /// The open PR (if any) whose head ref is `branch`.
    pub fn find_open_pr(&self, dir: &Path, branch: &str) -> Result<Option<PrInfo>> {
        let head_filter = format!("--head={branch}");
        let out = self.run(
            dir,
            &[
                "pr",
                "list",
                &head_filter,
                "--state",
                "open",
                "--json",
                "number,url,title,state,headRefName,body,baseRefName,author",
            ],
        )?;
        if !out.success() {
            return Err(CoreError::ForgeError(out.stderr.trim().to_string()).into());
        }
        let prs: Vec<PrInfo> = serde_json::from_str(&out.stdout)
            .context("failed to parse `gh pr list` output")?;
        Ok(prs.into_iter().next())
    }

    /// All PRs (any state) targeting `branch`, for the "Related Pull Requests"
    /// section and `pr status`.
    pub fn list_prs_for_branch(&self, dir: &Path, branch: &str) -> Result<Vec<PrInfo>> {
        let head_filter = format!("--head={branch}");
        let out = self.run(
            dir,
            &[
                "pr",
                "list",
                &head_filter,
                "--state",
                "all",
                "--json",
                "number,url,title,state,headRefName,body,baseRefName,author",
            ],
        )?;
        if !out.success() {
            return Err(CoreError::ForgeError(out.stderr.trim().to_string()).into());
        }
        serde_json::from_str(&out.stdout).context("failed to parse `gh pr list` output")
    }

    /// Whether `base` exists on `remote`'s origin, used to detect the
    /// *Skip (missing-base)* PR bucket.
    pub fn remote_branch_exists(&self, dir: &Path, base: &str) -> Result<bool> {
        let refname = format!("refs/heads/{base}");
        let out = process::run("git", &["ls-remote", "--exit-code", "--heads", "origin", &refname], dir)?;
        Ok(out.success() && !out.stdout.trim().is_empty())
    }

    pub fn create_pr(
        &self,
        dir: &Path,
        title: &str,
        body: &str,
        base: &str,
        head: &str,
        draft: bool,
    ) -> Result<String> {
        let mut args = vec!["pr", "create", "--title", title, "--body", body, "--base", base, "--head", head];
        if draft {
            args.push("--draft");
        }
        let out = self.run(dir, &args)?;
        if !out.success() {
            return Err(CoreError::ForgeError(out.stderr.trim().to_string()).into());
        }
        Ok(out.stdout.trim().to_string())
    }

    /// Update only the body of an existing PR.
    pub fn update_pr_body(&self, dir: &Path, number: u64, body: &str) -> Result<()> {
        let number_str = number.to_string();
        let out = self.run(dir, &["pr", "edit", &number_str, "--body", body])?;
        if !out.success() {
            return Err(CoreError::ForgeError(out.stderr.trim().to_string()).into());
        }
        Ok(())
    }

    /// Fetch a PR's body by its forge URL (used by `pr checkout`).
    pub fn pr_body_by_url(&self, url: &str) -> Result<String> {
        let out = self.run(
            Path::new("."),
            &["pr", "view", url, "--json", "body"],
        )?;
        if !out.success() {
            return Err(CoreError::ForgeError(out.stderr.trim().to_string()).into());
        }
        let v: serde_json::Value =
            serde_json::from_str(&out.stdout).context("failed to parse `gh pr view` output")?;
        Ok(v["body"].as_str().unwrap_or_default().to_string())
    }

    /// The authenticated user's login, for the PR-creator permission check.
    pub fn current_user(&self) -> Result<String> {
        let out = self.run(Path::new("."), &["api", "user", "--jq", ".login"])?;
        if !out.success() {
            return Err(CoreError::ForgeError(out.stderr.trim().to_string()).into());
        }
        Ok(out.stdout.trim().to_string())
    }

    /// Whether the current user has push (write) permission on the repo at
    /// `dir`.
    pub fn has_write_permission(&self, dir: &Path) -> Result<bool> {
        let out = self.run(
            dir,
            &["api", "repos/{owner}/{repo}", "--jq", ".permissions.push"],
        )?;
        if !out.success() {
            // Treat an unresolvable permission check as denied rather than a
            // hard failure, so the fleet keeps going and the repo is skipped.
            return Ok(false);
        }
        Ok(out.stdout.trim() == "true")
    }

    pub fn ensure_available(&self) -> Result<()> {
        process::ensure_tool_available(&self.bin_str())
    }
}
