//! `mstl switch` — create or select the same branch name across every repo (C6).

use super::common::{load_manifest, CommonArgs};
use crate::confirm;
use crate::errors::CoreError;
use crate::git::GitAdapter;
use crate::output::Output;
use anyhow::Result;
use clap::Parser;
use std::collections::BTreeSet;

#[derive(Parser, Debug)]
#[command(name = "switch")]
#[command(version = crate::VERSION)]
#[command(about = "Create or select one branch name across every repository")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Branch to switch to.
    pub name: String,

    /// Create the branch if it does not already exist.
    #[arg(short = 'c', long = "create")]
    pub create: bool,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let manifest = load_manifest(&args.common, output)?;
    let ctx = args.common.to_context();
    let workspace_root = manifest.workspace_root();
    let git = GitAdapter::new(ctx.verbose);

    let mut current_branches = Vec::with_capacity(manifest.repos.len());
    for repo in &manifest.repos {
        let dir = workspace_root.join(&repo.id);
        let branch = git.current_branch(&dir).ok();
        current_branches.push((repo.id.clone(), branch));
    }

    let distinct: BTreeSet<&str> = current_branches
        .iter()
        .filter_map(|(_, b)| b.as_deref())
        .collect();
    let common_branch = distinct.iter().next().copied();
    let drift = distinct.len() > 1;
    let target_matches_common = common_branch == Some(args.name.as_str());

    if drift && !target_matches_common {
        output.warning("repositories are not all on the same branch:");
        for (id, branch) in &current_branches {
            output.list_item(&format!("{id}: {}", branch.as_deref().unwrap_or("(detached)")));
        }
        let proceed = confirm::confirm(
            &format!("switch all repositories to '{}' anyway?", args.name),
            ctx.yes,
            false,
        )?;
        if !proceed {
            output.result("switch aborted");
            return Ok(());
        }
    }

    let mut failures = Vec::new();
    for repo in &manifest.repos {
        let dir = workspace_root.join(&repo.id);
        let outcome = if args.create {
            switch_create(&git, &dir, &args.name)
        } else {
            switch_select(&git, &dir, &repo.id, &args.name)
        };

        match outcome {
            Ok(()) => output.list_item(&format!("{}: switched to {}", repo.id, args.name)),
            Err(e) => {
                output.error(&format!("{}: {e}", repo.id));
                failures.push(repo.id.clone());
                break;
            }
        }
    }

    if failures.is_empty() {
        output.result(&format!(
            "switched {} repositories to '{}'",
            manifest.repos.len(),
            args.name
        ));
        Ok(())
    } else {
        anyhow::bail!(
            "switch stopped after failure in {}; earlier repositories were left switched",
            failures[0]
        )
    }
}

fn switch_create(git: &GitAdapter, dir: &std::path::Path, name: &str) -> Result<()> {
    if git.has_local_branch(dir, name)? {
        git.checkout(dir, name)?;
    } else {
        git.checkout_b(dir, name, None)?;
    }
    if git.has_remote_branch(dir, "origin", name).unwrap_or(false) {
        git.set_upstream(dir, "origin", name)?;
    }
    Ok(())
}

fn switch_select(git: &GitAdapter, dir: &std::path::Path, id: &str, name: &str) -> Result<()> {
    if git.has_local_branch(dir, name)? {
        git.checkout(dir, name)?;
        return Ok(());
    }
    if git.has_remote_branch(dir, "origin", name).unwrap_or(false) {
        git.checkout_b(dir, name, Some(&format!("origin/{name}")))?;
        return Ok(());
    }
    Err(CoreError::NoSuchBranch(id.to_string()).into())
}
