//! `mstl reset` — hard-reset every repo to its upstream.
//!
//! A destructive, confirmation-gated discard of local history and
//! working-tree state back to each repo's configured upstream, reported
//! per-repo like switch/sync/push.

use super::common::{load_manifest, CommonArgs};
use crate::confirm;
use crate::git::GitAdapter;
use crate::output::Output;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "reset")]
#[command(version = crate::VERSION)]
#[command(about = "Hard-reset every repository to its upstream, discarding local changes")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Skip fetching before resolving each upstream's tip.
    #[arg(long = "no-fetch")]
    pub no_fetch: bool,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let manifest = load_manifest(&args.common, output)?;
    let ctx = args.common.to_context();
    let workspace_root = manifest.workspace_root();
    let git = GitAdapter::new(ctx.verbose);

    if manifest.repos.is_empty() {
        output.result("no repositories to reset");
        return Ok(());
    }

    output.warning("this discards all local commits and working-tree changes not on the upstream");
    let proceed = confirm::confirm(
        &format!("hard-reset {} repositories to their upstream?", manifest.repos.len()),
        ctx.yes,
        false,
    )?;
    if !proceed {
        output.result("reset aborted");
        return Ok(());
    }

    let mut failures = Vec::new();
    for repo in &manifest.repos {
        let dir = workspace_root.join(&repo.id);
        match reset_one(&git, &dir, args.no_fetch) {
            Ok(sha) => output.list_item(&format!("{}: reset to {sha}", repo.id)),
            Err(e) => {
                output.error(&format!("{}: {e}", repo.id));
                failures.push(repo.id.clone());
            }
        }
    }

    if failures.is_empty() {
        output.result(&format!("reset {} repositories", manifest.repos.len()));
        Ok(())
    } else {
        anyhow::bail!("failed to reset: {}", failures.join(", "))
    }
}

fn reset_one(git: &GitAdapter, dir: &std::path::Path, no_fetch: bool) -> Result<String> {
    let branch = git.current_branch(dir)?;
    let upstream = git
        .upstream_for(dir, &branch)?
        .ok_or_else(|| anyhow::anyhow!("no upstream configured"))?;
    if !no_fetch {
        let remote = upstream.split('/').next().unwrap_or("origin");
        git.fetch(dir, Some(remote))?;
    }
    let sha = git.resolve_ref(dir, &upstream)?;
    git.reset_hard(dir, &sha)?;
    Ok(sha)
}
