//! `mstl snapshot` — print the current workspace state as a fenced
//! `mistletoe-snapshot` block, the same artifact the PR orchestrator embeds.

use super::common::{load_manifest, CommonArgs};
use crate::output::Output;
use crate::snapshot::{Snapshot, SnapshotEntry};
use crate::status;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "snapshot")]
#[command(version = crate::VERSION)]
#[command(about = "Print a fenced snapshot block of every repository's current state")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Skip fetching before computing each repo's HEAD sha.
    #[arg(long = "no-fetch")]
    pub no_fetch: bool,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let manifest = load_manifest(&args.common, output)?;
    let ctx = args.common.to_context();
    let workspace_root = manifest.workspace_root();

    let (_rows, fingerprints) = status::collect(&manifest, &workspace_root, &ctx, args.no_fetch);

    let entries: Vec<SnapshotEntry> = manifest
        .repos
        .iter()
        .filter_map(|repo| {
            let fp = fingerprints.iter().find(|f| f.id == repo.id)?;
            Some(SnapshotEntry {
                id: repo.id.clone(),
                url: repo.entry.url.clone(),
                branch: repo.entry.branch.clone(),
                revision: fp.head_sha.clone(),
            })
        })
        .collect();

    let missing = manifest.repos.len() - entries.len();
    if missing > 0 {
        output.warning(&format!("{missing} repositories were skipped (missing or detached)"));
    }

    let snapshot = Snapshot(entries);
    output.raw(snapshot.render()?.trim_end());
    Ok(())
}
