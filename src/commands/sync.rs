//! `mstl sync` — pull every repo with a configured merge/rebase strategy (C7).

use super::common::{load_manifest, CommonArgs};
use crate::confirm;
use crate::git::GitAdapter;
use crate::output::Output;
use anyhow::Result;
use clap::{Parser, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Merge,
    Rebase,
}

#[derive(Parser, Debug)]
#[command(name = "sync")]
#[command(version = crate::VERSION)]
#[command(about = "Pull every repository, merging or rebasing onto its upstream")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Integration strategy; prompted interactively when omitted.
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<Strategy>,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let manifest = load_manifest(&args.common, output)?;
    let ctx = args.common.to_context();
    let workspace_root = manifest.workspace_root();
    let git = GitAdapter::new(ctx.verbose);

    if manifest.repos.is_empty() {
        output.result("no repositories to sync");
        return Ok(());
    }

    let strategy = match args.strategy {
        Some(s) => s,
        None => {
            let rebase = confirm::confirm("rebase instead of merge?", ctx.yes, false)?;
            if rebase {
                Strategy::Rebase
            } else {
                Strategy::Merge
            }
        }
    };

    let mut any_conflict = false;
    for repo in &manifest.repos {
        let dir = workspace_root.join(&repo.id);
        if !dir.is_dir() {
            output.error(&format!("{}: missing directory", repo.id));
            any_conflict = true;
            continue;
        }

        if git.is_dirty(&dir).unwrap_or(true) {
            output.error(&format!("{}: working tree is dirty, skipped", repo.id));
            any_conflict = true;
            continue;
        }
        if git.has_untracked(&dir).unwrap_or(false) {
            output.warning(&format!("{}: has untracked files", repo.id));
        }

        let branch = match git.current_branch(&dir) {
            Ok(b) => b,
            Err(e) => {
                output.error(&format!("{}: {e}", repo.id));
                any_conflict = true;
                continue;
            }
        };

        let upstream = match git.upstream_for(&dir, &branch).unwrap_or(None) {
            Some(up) => up,
            None => {
                output.error(&format!("{}: no upstream configured, skipped", repo.id));
                any_conflict = true;
                continue;
            }
        };

        match pull(&git, &dir, &upstream, strategy) {
            Ok(()) => output.list_item(&format!("{}: synced with {upstream}", repo.id)),
            Err(e) => {
                output.error(&format!("{}: conflict ({e})", repo.id));
                any_conflict = true;
            }
        }
    }

    if any_conflict {
        anyhow::bail!("one or more repositories failed to sync cleanly")
    } else {
        output.result(&format!("synced {} repositories", manifest.repos.len()));
        Ok(())
    }
}

fn pull(
    git: &GitAdapter,
    dir: &std::path::Path,
    upstream: &str,
    strategy: Strategy,
) -> Result<()> {
    let (remote, branch) = upstream
        .split_once('/')
        .ok_or_else(|| anyhow::anyhow!("malformed upstream ref {upstream}"))?;
    git.fetch(dir, Some(remote))?;

    let args: Vec<&str> = match strategy {
        Strategy::Merge => vec!["merge", upstream],
        Strategy::Rebase => vec!["rebase", upstream],
    };
    let _ = branch;
    let out = crate::process::run_with_stdin("git", &args, dir, None, git.verbose)?;
    if !out.success() {
        if strategy == Strategy::Rebase {
            let _ = crate::process::run_with_stdin(
                "git",
                &["rebase", "--abort"],
                dir,
                None,
                git.verbose,
            );
        } else {
            let _ = crate::process::run_with_stdin(
                "git",
                &["merge", "--abort"],
                dir,
                None,
                git.verbose,
            );
        }
        anyhow::bail!(out.stderr.trim().to_string());
    }
    Ok(())
}
