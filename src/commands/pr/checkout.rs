//! `pr checkout` — reconstruct a workspace from a PR's embedded snapshot.
//!
//! The dependency-graph section embedded in a PR body is rendered prose
//! (forward/reverse adjacency in English), not the mermaid source it was
//! parsed from, so it can't be losslessly reconstructed here; checkout
//! materializes the manifest but leaves `.mstl/dependency-graph.md` absent.

use crate::commands::common::CommonArgs;
use crate::forge::Forge;
use crate::git::GitAdapter;
use crate::manifest::{self, RepoEntry};
use crate::output::Output;
use crate::snapshot::Snapshot;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "checkout")]
#[command(about = "Clone and reset every repository in a PR's embedded snapshot")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// URL of a PR carrying a mistletoe snapshot block.
    pub pr_url: String,

    /// Directory to materialize the workspace in. Defaults to the current directory.
    #[arg(long = "dest")]
    pub dest: Option<PathBuf>,

    /// Shallow-clone depth passed to `git clone --depth`.
    #[arg(long = "depth")]
    pub depth: Option<u32>,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let ctx = args.common.to_context();
    crate::process::ensure_tool_available(&ctx.forge_path.to_string_lossy())?;

    let forge = Forge::new(&ctx.forge_path);
    let body = forge
        .pr_body_by_url(&args.pr_url)
        .context("failed to fetch PR body")?;
    let snapshot = Snapshot::parse(&body).context("PR body has no usable mistletoe snapshot")?;

    let cwd = crate::utils::get_current_directory()?;
    let dest = args.dest.clone().unwrap_or(cwd);
    let git = GitAdapter::new(ctx.verbose);

    for entry in &snapshot.0 {
        let repo_dest = dest.join(&entry.id);
        output.step(&format!("Cloning {} into {}", entry.url, repo_dest.display()));
        git.clone(&entry.url, &repo_dest, args.depth)
            .with_context(|| format!("{}: clone failed", entry.id))?;

        if git.has_local_branch(&repo_dest, &entry.branch).unwrap_or(false) {
            git.checkout(&repo_dest, &entry.branch)
                .with_context(|| format!("{}: checkout failed", entry.id))?;
        } else if git
            .has_remote_branch(&repo_dest, "origin", &entry.branch)
            .unwrap_or(false)
        {
            git.checkout_b(&repo_dest, &entry.branch, Some(&format!("origin/{}", entry.branch)))
                .with_context(|| format!("{}: checkout failed", entry.id))?;
        } else {
            anyhow::bail!("{}: branch {} not found locally or on origin", entry.id, entry.branch);
        }

        git.reset_hard(&repo_dest, &entry.revision)
            .with_context(|| format!("{}: reset to {} failed", entry.id, entry.revision))?;

        output.list_item(&format!("{}: reset to {}", entry.id, entry.revision));
    }

    let repos: Vec<RepoEntry> = snapshot
        .0
        .iter()
        .map(|entry| RepoEntry {
            url: entry.url.clone(),
            id: Some(entry.id.clone()),
            branch: entry.branch.clone(),
            base_branch: None,
            revision: Some(entry.revision.clone()),
        })
        .collect();
    manifest::write_to(&dest.join(manifest::MANIFEST_RELATIVE_PATH), &repos)?;

    output.result(&format!("checked out {} repositories", snapshot.0.len()));
    Ok(())
}
