//! `pr create` — grouped create/update of PRs across the workspace (C9).

use super::body;
use super::categorize::Bucket;
use super::shared;
use crate::commands::common::{load_manifest, CommonArgs};
use crate::confirm;
use crate::errors::CoreError;
use crate::forge::Forge;
use crate::git::GitAdapter;
use crate::output::Output;
use crate::snapshot::Snapshot;
use anyhow::Result;
use clap::Parser;
use std::collections::BTreeSet;

#[derive(Parser, Debug)]
#[command(name = "create")]
#[command(about = "Create pull requests across every ahead-of-remote repository")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    #[arg(long = "title")]
    pub title: String,

    #[arg(long = "body", default_value = "")]
    pub body: String,

    #[arg(long = "draft")]
    pub draft: bool,
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
    let graph = load_dependency_graph(&manifest, &known_ids)?;

    let (plans, fingerprints, related) =
        shared::collect_and_categorize(&manifest, &workspace_root, &ctx, &git, &forge, output)?;

    if let Some(behind) = plans.iter().find(|p| p.bucket == Bucket::SkipBehind) {
        return Err(CoreError::BehindRemote(behind.id.clone()).into());
    }

    shared::print_categorization(&plans, output);
    for plan in &plans {
        if plan.bucket.is_skip() {
            output.warning(&format!("{}: skipped ({})", plan.id, plan.bucket.label()));
        }
    }

    if plans.iter().all(|p| p.bucket.is_skip()) {
        output.result("nothing to create or update");
        return Ok(());
    }

    let proceed = confirm::confirm("proceed with the plan above?", ctx.yes, false)?;
    if !proceed {
        output.result("pr create aborted");
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

    for plan in &plans {
        if plan.bucket.is_skip() {
            continue;
        }
        let other_ids: Vec<String> = all_ids.iter().filter(|id| *id != &plan.id).cloned().collect();
        let block = body::render_block(&plan.id, &other_ids, &related, &graph, &full_snapshot)?;

        if plan.bucket.is_create() {
            let full_body = if args.body.is_empty() {
                block.clone()
            } else {
                format!("{}\n\n{}", args.body, block)
            };
            match forge.create_pr(&plan.dir, &args.title, &full_body, &plan.base, &plan.branch, args.draft) {
                Ok(url) => output.result(&format!("{}: created {url}", plan.id)),
                Err(e) => {
                    output.error(&format!("{}: {e}", plan.id));
                    return Err(e);
                }
            }
        } else {
            let Some(pr) = &plan.existing_pr else {
                continue;
            };
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
            let new_body = body::apply_block(&pr.body, &block);
            match forge.update_pr_body(&plan.dir, pr.number, &new_body) {
                Ok(()) => output.result(&format!("{}: updated PR #{}", plan.id, pr.number)),
                Err(e) => {
                    output.error(&format!("{}: {e}", plan.id));
                    return Err(e);
                }
            }
        }
    }

    Ok(())
}

fn load_dependency_graph(
    manifest: &crate::manifest::Manifest,
    known_ids: &BTreeSet<String>,
) -> Result<crate::depgraph::DependencyGraph> {
    let path = manifest.dependency_file();
    if !path.is_file() {
        return Ok(crate::depgraph::DependencyGraph::default());
    }
    let text = std::fs::read_to_string(&path)?;
    crate::depgraph::parse_and_validate(&text, known_ids)
}
