//! Status collector (C5): folds git-adapter observations into a status row
//! and a fingerprint per repo, without mutating repository state.

use crate::context::RunContext;
use crate::git::GitAdapter;
use crate::manifest::Manifest;
use crate::parallel;
use std::path::{Path, PathBuf};

/// `(id, HEAD-sha, dirty-bit)` captured alongside a status row, consumed
/// only by the PR orchestrator's race check between collection and push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    pub id: String,
    pub head_sha: String,
    pub dirty: bool,
}

/// One row of a status table: never mutates the repository it describes.
#[derive(Debug, Clone)]
pub struct StatusRow {
    pub id: String,
    pub branch: Option<String>,
    pub upstream: Option<String>,
    pub ahead: u32,
    pub behind: u32,
    pub dirty: bool,
    pub untracked: bool,
    pub token: String,
    pub notice: Option<String>,
}

impl StatusRow {
    fn missing(id: &str) -> Self {
        Self {
            id: id.to_string(),
            branch: None,
            upstream: None,
            ahead: 0,
            behind: 0,
            dirty: false,
            untracked: false,
            token: "!".to_string(),
            notice: Some("missing".to_string()),
        }
    }
}

/// Compute the one-character status token per the priority list
/// `! > ? > * > X > < > = `, with `-` appended when there is no upstream.
fn compute_token(dirty: bool, untracked: bool, ahead: u32, behind: u32, has_upstream: bool, unhealthy: bool) -> String {
    let mut token = if unhealthy {
        "!".to_string()
    } else if untracked {
        "?".to_string()
    } else if dirty {
        "*".to_string()
    } else if ahead > 0 && behind > 0 {
        "X".to_string()
    } else if behind > 0 {
        "<".to_string()
    } else if ahead > 0 {
        ">".to_string()
    } else {
        "=".to_string()
    };
    if !has_upstream {
        token.push('-');
    }
    token
}

/// Collect a status row and fingerprint for every repo in `manifest`,
/// ordered by manifest position. `no_fetch` skips the optional fetch step
/// that would otherwise make ahead/behind reflect the remote.
pub fn collect(
    manifest: &Manifest,
    workspace_root: &Path,
    ctx: &RunContext,
    no_fetch: bool,
) -> (Vec<StatusRow>, Vec<Fingerprint>) {
    let git = GitAdapter::new(ctx.verbose);
    let workers = ctx.worker_count(manifest.repos.len());

    let items: Vec<(String, PathBuf, String)> = manifest
        .repos
        .iter()
        .map(|r| (r.id.clone(), workspace_root.join(&r.id), r.entry.branch.clone()))
        .collect();

    let results = parallel::map_bounded(items, workers, move |(id, dir, configured_branch)| {
        collect_one(&git, id, dir, configured_branch, no_fetch)
    });

    let mut rows = Vec::with_capacity(results.len());
    let mut fingerprints = Vec::with_capacity(results.len());
    for (row, fp) in results {
        rows.push(row);
        if let Some(fp) = fp {
            fingerprints.push(fp);
        }
    }
    (rows, fingerprints)
}

fn collect_one(
    git: &GitAdapter,
    id: String,
    dir: PathBuf,
    configured_branch: String,
    no_fetch: bool,
) -> (StatusRow, Option<Fingerprint>) {
    if !dir.is_dir() {
        return (StatusRow::missing(&id), None);
    }

    if !no_fetch {
        let _ = git.fetch(&dir, None);
    }

    let branch = match git.current_branch(&dir) {
        Ok(b) => b,
        Err(_) => {
            let mut row = StatusRow::missing(&id);
            row.notice = Some("detached HEAD".to_string());
            return (row, None);
        }
    };

    let head_sha = git.head_sha(&dir).unwrap_or_default();
    let dirty = git.is_dirty(&dir).unwrap_or(false);
    let untracked = git.has_untracked(&dir).unwrap_or(false);

    let fingerprint = Some(Fingerprint {
        id: id.clone(),
        head_sha: head_sha.clone(),
        dirty,
    });

    let upstream = git.upstream_for(&dir, &branch).unwrap_or(None);
    let mut notice = None;
    let mut ahead = 0u32;
    let mut behind = 0u32;
    let mut unhealthy = false;
    let mut effective_upstream = upstream.clone();

    if let Some(ref up) = upstream {
        // Upstream sanity: flag when the tracked branch name differs from the
        // local name, or when the remote ref backing it is gone.
        let up_short_name = up.rsplit_once('/').map(|(_, n)| n).unwrap_or(up.as_str());
        let remote = up.split('/').next().unwrap_or("origin");
        let remote_still_exists = git
            .has_remote_branch(&dir, remote, up_short_name)
            .unwrap_or(false);

        if up_short_name != branch || !remote_still_exists {
            let _ = git.unset_upstream(&dir, &branch);
            notice = Some(format!("upstream {up} is stale; unset"));
            effective_upstream = None;
        } else {
            match git.ahead_behind(&dir, &branch, up) {
                Ok((a, b)) => {
                    ahead = a;
                    behind = b;
                }
                Err(_) => unhealthy = true,
            }
        }
    }

    let token = compute_token(dirty, untracked, ahead, behind, effective_upstream.is_some(), unhealthy);

    let row = StatusRow {
        id,
        branch: Some(branch),
        upstream: effective_upstream,
        ahead,
        behind,
        dirty,
        untracked,
        token,
        notice,
    };

    (row, fingerprint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_priority_order() {
        assert_eq!(compute_token(false, false, 0, 0, true, false), "=");
        assert_eq!(compute_token(false, false, 0, 0, false, false), "=-");
        assert_eq!(compute_token(false, false, 3, 0, true, false), ">");
        assert_eq!(compute_token(false, false, 0, 2, true, false), "<");
        assert_eq!(compute_token(false, false, 1, 1, true, false), "X");
        assert_eq!(compute_token(true, false, 0, 0, true, false), "*");
        assert_eq!(compute_token(true, true, 0, 0, true, false), "?");
        assert_eq!(compute_token(true, true, 0, 0, true, true), "!");
    }

    #[test]
    fn missing_directory_yields_bang_token() {
        let row = StatusRow::missing("repoA");
        assert_eq!(row.token, "!");
        assert_eq!(row.notice.as_deref(), Some("missing"));
    }
}
