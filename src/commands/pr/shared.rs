//! Phases A-D shared by `pr create` and `pr update`: collect state, classify,
//! re-fingerprint, push.

use super::categorize::{categorize, Bucket};
use crate::context::RunContext;
use crate::errors::CoreError;
use crate::forge::{Forge, PrInfo};
use crate::git::GitAdapter;
use crate::manifest::Manifest;
use crate::output::Output;
use crate::status::{self, Fingerprint};
use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;

pub struct RepoPlan {
    pub id: String,
    pub dir: PathBuf,
    pub branch: String,
    pub base: String,
    pub bucket: Bucket,
    pub existing_pr: Option<PrInfo>,
}

/// Phase A + B: collect status/fingerprints and classify every repo.
pub fn collect_and_categorize(
    manifest: &Manifest,
    workspace_root: &std::path::Path,
    ctx: &RunContext,
    git: &GitAdapter,
    forge: &Forge,
    output: &mut dyn Output,
) -> Result<(Vec<RepoPlan>, Vec<Fingerprint>, HashMap<String, Vec<PrInfo>>)> {
    let (rows, fingerprints) = status::collect(manifest, workspace_root, ctx, false);

    let mut plans = Vec::with_capacity(manifest.repos.len());
    let mut related: HashMap<String, Vec<PrInfo>> = HashMap::new();

    for (repo, row) in manifest.repos.iter().zip(rows.iter()) {
        let dir = workspace_root.join(&repo.id);
        let branch = match &row.branch {
            Some(b) => b.clone(),
            None => {
                output.warning(&format!("{}: {}", repo.id, row.notice.as_deref().unwrap_or("unavailable")));
                continue;
            }
        };
        let base = repo.entry.effective_base_branch().to_string();

        let prs_for_branch = forge.list_prs_for_branch(&dir, &branch).unwrap_or_default();
        related.insert(repo.id.clone(), prs_for_branch.clone());
        let existing_pr = prs_for_branch.into_iter().find(|p| p.state.eq_ignore_ascii_case("OPEN"));

        let base_exists = forge.remote_branch_exists(&dir, &base).unwrap_or(false);
        let has_write = forge.has_write_permission(&dir).unwrap_or(false);

        let bucket = categorize(
            existing_pr.is_some(),
            row.ahead,
            row.behind,
            base_exists,
            has_write,
        );

        plans.push(RepoPlan {
            id: repo.id.clone(),
            dir,
            branch,
            base,
            bucket,
            existing_pr,
        });
    }

    Ok((plans, fingerprints, related))
}

pub fn print_categorization(plans: &[RepoPlan], output: &mut dyn Output) {
    for plan in plans {
        output.list_item(&format!("{}: {}", plan.id, plan.bucket.label()));
    }
}

/// Phase C: re-fingerprint every repo in a push bucket, aborting with
/// `ConcurrentModification` on the first mismatch before any push happens.
pub fn reverify_fingerprints(
    plans: &[RepoPlan],
    fingerprints: &[Fingerprint],
    git: &GitAdapter,
) -> Result<()> {
    for plan in plans.iter().filter(|p| p.bucket.is_push()) {
        let Some(before) = fingerprints.iter().find(|f| f.id == plan.id) else {
            continue;
        };
        let head_sha = git.head_sha(&plan.dir)?;
        let dirty = git.is_dirty(&plan.dir).unwrap_or(true);
        if head_sha != before.head_sha || dirty != before.dirty {
            return Err(CoreError::ConcurrentModification(plan.id.clone()).into());
        }
    }
    Ok(())
}

/// Phase D: push every push-bucket repo, stopping at the first failure.
pub fn push_all(plans: &[RepoPlan], git: &GitAdapter, output: &mut dyn Output) -> Result<()> {
    for plan in plans.iter().filter(|p| p.bucket.is_push()) {
        let had_upstream = git.upstream_for(&plan.dir, &plan.branch).unwrap_or(None).is_some();
        git.push(&plan.dir, "origin", &plan.branch, !had_upstream)?;
        output.list_item(&format!("{}: pushed {}", plan.id, plan.branch));
    }
    Ok(())
}

/// Capture a fresh fingerprint/snapshot entry for `plan` immediately after
/// pushing, for embedding in the rendered body.
pub fn snapshot_entry_for(
    plan: &RepoPlan,
    url: &str,
    git: &GitAdapter,
) -> Result<crate::snapshot::SnapshotEntry> {
    Ok(crate::snapshot::SnapshotEntry {
        id: plan.id.clone(),
        url: url.to_string(),
        branch: plan.branch.clone(),
        revision: git.head_sha(&plan.dir)?,
    })
}
