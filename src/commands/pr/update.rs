//! `pr update` — reuses the `pr create` phases, but only touches repos that
//! already have an open PR; a repo behind remote is warned and skipped
//! rather than treated as a hard error.

use super::body;
use super::categorize::Bucket;
use super::shared;
use crate::commands::common::{load_manifest, CommonArgs};
use crate::confirm;
use crate::forge::Forge;
use crate::git::GitAdapter;
use crate::output::Output;
use crate::snapshot::Snapshot;
use anyhow::Result;
use clap::Parser;
use std::collections::BTreeSet;

#[derive(Parser, Debug)]
#[command(name = "update")]
#[command(about = "Update pull requests with the latest push, body, and snapshot")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Optional new body text; when omitted, the non-delimited portion of
    /// each existing PR body is preserved.
    #[arg(long = "body")]
    pub body: Option<String>,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let ctx = args.common.to_context();
    crate::process::ensure_tool_available(&ctx.forge_path.to_string_lossy())?;

    let manifest = load_manifest(&args.common, output)?;
    let workspace_root = manifest.workspace_root();
    let git = GitAdapter::new(ctx.verbose);
    let forge = Forge::new(&ctx.forge_path);

    let known_ids: BTreeSet<String> = manifest.repos.iter().map(|r| r.id.clone()).collect();
    let graph = {
        let path = manifest.dependency_file();
        if path.is_file() {
            let text = std::fs::read_to_string(&path)?;
            crate::depgraph::parse_and_validate(&text, &known_ids)?
        } else {
            crate::depgraph::DependencyGraph::default()
        }
    };

    let (plans, fingerprints, related) =
        shared::collect_and_categorize(&manifest, &workspace_root, &ctx, &git, &forge, output)?;

    for plan in &plans {
        let label = match plan.bucket {
            Bucket::SkipBehind => "skipped (behind remote)".to_string(),
            Bucket::CreateOnly | Bucket::PushAndCreate => "skipped (no open PR to update)".to_string(),
            other => other.label().to_string(),
        };
        output.list_item(&format!("{}: {label}", plan.id));
    }

    let updatable: Vec<&shared::RepoPlan> = plans
        .iter()
        .filter(|p| matches!(p.bucket, Bucket::PushAndUpdate | Bucket::UpdateOnly))
        .collect();

    if updatable.is_empty() {
        output.result("no pull requests to update");
        return Ok(());
    }

    let proceed = confirm::confirm("proceed with the plan above?", ctx.yes, false)?;
    if !proceed {
        output.result("pr update aborted");
        return Ok(());
    }

    shared::reverify_fingerprints(&plans, &fingerprints, &git)?;
    shared::push_all(&plans, &git, output)?;

    let full_snapshot = Snapshot(
        plans
            .iter()
            .filter_map(|plan| {
                let fp = fingerprints.iter().find(|f| f.id == plan.id)?;
                let repo = manifest.find_id(&plan.id)?;
                Some(crate::snapshot::SnapshotEntry {
                    id: plan.id.clone(),
                    url: repo.entry.url.clone(),
                    branch: plan.branch.clone(),
                    revision: fp.head_sha.clone(),
                })
            })
            .collect(),
    );

    let all_ids: Vec<String> = manifest.repos.iter().map(|r| r.id.clone()).collect();
    let current_user = forge.current_user().ok();

    for plan in updatable {
        let Some(pr) = &plan.existing_pr else { continue };
        let owned_by_other = current_user
            .as_deref()
            .map(|me| !pr.author.login.is_empty() && pr.author.login != me)
            .unwrap_or(false);
        if owned_by_other && !body::has_block(&pr.body) {
            output.warning(&format!(
                "{}: PR #{} owned by {}, no mistletoe block present; refusing to update",
                plan.id, pr.number, pr.author.login
            ));
            continue;
        }

        let other_ids: Vec<String> = all_ids.iter().filter(|id| *id != &plan.id).cloned().collect();
        let block = body::render_block(&plan.id, &other_ids, &related, &graph, &full_snapshot)?;
        let base_body = args.body.as_deref().unwrap_or(&pr.body);
        let new_body = body::apply_block(base_body, &block);

        match forge.update_pr_body(&plan.dir, pr.number, &new_body) {
            Ok(()) => output.result(&format!("{}: updated PR #{}", plan.id, pr.number)),
            Err(e) => {
                output.error(&format!("{}: {e}", plan.id));
                return Err(e);
            }
        }
    }

    Ok(())
}
