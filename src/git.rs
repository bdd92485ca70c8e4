//! Git adapter (C4): a thin typed facade over the `git` executable.
//!
//! Every operation takes the repo's working directory explicitly rather than
//! relying on the process's current directory, since the status collector
//! and the switch/sync/push protocols dispatch these calls across a bounded
//! worker pool where each thread owns exactly one repo's subtree.

use crate::errors::CoreError;
use crate::process::{self, ProcessOutput};
use anyhow::{Context, Result};
use std::path::Path;

/// Handle bound to nothing more than a verbosity flag; all state lives in the
/// filesystem paths passed to each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct GitAdapter {
    pub verbose: bool,
}

fn bail_on_failure(op: &str, out: &ProcessOutput) -> Result<()> {
    if !out.success() {
        anyhow::bail!("git {op} failed: {}", out.stderr.trim());
    }
    Ok(())
}

impl GitAdapter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    fn run(&self, dir: &Path, args: &[&str]) -> Result<ProcessOutput> {
        process::run_with_stdin("git", args, dir, None, self.verbose)
    }

    /// Clone `url` into `dest`. Fails if `dest` exists, is non-empty, and is
    /// not already a clone of `url`.
    pub fn clone(&self, url: &str, dest: &Path, depth: Option<u32>) -> Result<()> {
        if dest.is_dir() {
            let non_empty = std::fs::read_dir(dest)
                .map(|mut it| it.next().is_some())
                .unwrap_or(false);
            if non_empty {
                let existing = self.remote_url(dest, "origin").ok();
                let same_origin = existing
                    .as_deref()
                    .map(|u| crate::manifest::canonicalize_url(u) == crate::manifest::canonicalize_url(url))
                    .unwrap_or(false);
                if !same_origin {
                    anyhow::bail!(
                        "destination {} exists, is non-empty, and is not a clone of {url}",
                        dest.display()
                    );
                }
                return Ok(());
            }
        }

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let depth_str = depth.map(|d| d.to_string());
        let mut args = vec!["clone"];
        if let Some(ref d) = depth_str {
            args.push("--depth");
            args.push(d);
        }
        let dest_str = dest.to_string_lossy().into_owned();
        args.push(url);
        args.push(&dest_str);

        let out = process::run_with_stdin("git", &args, Path::new("."), None, self.verbose)?;
        bail_on_failure("clone", &out)
    }

    pub fn current_branch(&self, dir: &Path) -> Result<String> {
        let out = self.run(dir, &["symbolic-ref", "--short", "-q", "HEAD"])?;
        if !out.success() {
            return Err(CoreError::Detached(dir.display().to_string()).into());
        }
        let branch = out.stdout.trim().to_string();
        if branch.is_empty() {
            return Err(CoreError::Detached(dir.display().to_string()).into());
        }
        Ok(branch)
    }

    pub fn head_sha(&self, dir: &Path) -> Result<String> {
        let out = self.run(dir, &["rev-parse", "HEAD"])?;
        bail_on_failure("rev-parse HEAD", &out)?;
        Ok(out.stdout.trim().to_string())
    }

    pub fn has_local_branch(&self, dir: &Path, name: &str) -> Result<bool> {
        let refname = format!("refs/heads/{name}");
        let out = self.run(dir, &["show-ref", "--verify", "--quiet", &refname])?;
        Ok(out.success())
    }

    pub fn has_remote_branch(&self, dir: &Path, remote: &str, name: &str) -> Result<bool> {
        let refname = format!("refs/heads/{name}");
        let out = self.run(dir, &["ls-remote", "--exit-code", "--heads", remote, &refname])?;
        Ok(out.success() && !out.stdout.trim().is_empty())
    }

    pub fn fetch(&self, dir: &Path, remote: Option<&str>) -> Result<()> {
        let remote = remote.unwrap_or("origin");
        let out = self.run(dir, &["fetch", remote])?;
        bail_on_failure("fetch", &out)
    }

    /// `(ahead, behind)` of `local` relative to `upstream`.
    pub fn ahead_behind(&self, dir: &Path, local: &str, upstream: &str) -> Result<(u32, u32)> {
        let range = format!("{upstream}...{local}");
        let out = self.run(dir, &["rev-list", "--left-right", "--count", &range])?;
        bail_on_failure("rev-list", &out)?;
        let mut parts = out.stdout.split_whitespace();
        let behind: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .context("malformed rev-list output")?;
        let ahead: u32 = parts
            .next()
            .and_then(|s| s.parse().ok())
            .context("malformed rev-list output")?;
        Ok((ahead, behind))
    }

    pub fn is_dirty(&self, dir: &Path) -> Result<bool> {
        let out = self.run(dir, &["status", "--porcelain", "--untracked-files=no"])?;
        bail_on_failure("status", &out)?;
        Ok(!out.stdout.trim().is_empty())
    }

    pub fn has_untracked(&self, dir: &Path) -> Result<bool> {
        let out = self.run(dir, &["ls-files", "--others", "--exclude-standard"])?;
        bail_on_failure("ls-files", &out)?;
        Ok(!out.stdout.trim().is_empty())
    }

    pub fn checkout(&self, dir: &Path, name: &str) -> Result<()> {
        let out = self.run(dir, &["checkout", "--quiet", name])?;
        bail_on_failure("checkout", &out)
    }

    /// `checkout -b name [start]`; `start` defaults to the current branch.
    pub fn checkout_b(&self, dir: &Path, name: &str, start: Option<&str>) -> Result<()> {
        let mut args = vec!["checkout", "--quiet", "-b", name];
        if let Some(start) = start {
            args.push(start);
        }
        let out = self.run(dir, &args)?;
        bail_on_failure("checkout -b", &out)
    }

    pub fn set_upstream(&self, dir: &Path, remote: &str, name: &str) -> Result<()> {
        let upstream = format!("{remote}/{name}");
        let out = self.run(dir, &["branch", "--set-upstream-to", &upstream, name])?;
        bail_on_failure("branch --set-upstream-to", &out)
    }

    pub fn unset_upstream(&self, dir: &Path, name: &str) -> Result<()> {
        let out = self.run(dir, &["branch", "--unset-upstream", name]);
        // Idempotent: "no upstream configured" is not an error for our purposes.
        out.map(|_| ())
    }

    pub fn push(&self, dir: &Path, remote: &str, name: &str, set_upstream: bool) -> Result<()> {
        let mut args = vec!["push"];
        if set_upstream {
            args.push("--set-upstream");
        }
        args.push(remote);
        args.push(name);
        let out = self.run(dir, &args)?;
        if !out.success() {
            if out.stderr.contains("non-fast-forward") || out.stderr.contains("fetch first") {
                return Err(CoreError::NonFastForward(dir.display().to_string()).into());
            }
            anyhow::bail!("git push failed: {}", out.stderr.trim());
        }
        Ok(())
    }

    /// Resolve any ref expression (branch, remote-tracking ref, sha) to a
    /// 40-char commit sha.
    pub fn resolve_ref(&self, dir: &Path, refname: &str) -> Result<String> {
        let out = self.run(dir, &["rev-parse", refname])?;
        bail_on_failure("rev-parse", &out)?;
        Ok(out.stdout.trim().to_string())
    }

    pub fn reset_hard(&self, dir: &Path, sha: &str) -> Result<()> {
        let out = self.run(dir, &["reset", "--hard", sha])?;
        bail_on_failure("reset --hard", &out)
    }

    pub fn remote_url(&self, dir: &Path, remote: &str) -> Result<String> {
        let key = format!("remote.{remote}.url");
        let out = self.run(dir, &["config", "--get", &key])?;
        bail_on_failure("config --get", &out)?;
        Ok(out.stdout.trim().to_string())
    }

    /// The upstream branch name for `local` (e.g. `origin/main`), if set.
    pub fn upstream_for(&self, dir: &Path, local: &str) -> Result<Option<String>> {
        let refname = format!("{local}@{{upstream}}");
        let out = self.run(dir, &["rev-parse", "--abbrev-ref", &refname])?;
        if out.success() {
            Ok(Some(out.stdout.trim().to_string()))
        } else {
            Ok(None)
        }
    }

    /// The default branch advertised by `remote`'s HEAD symref, via
    /// `ls-remote --symref`.
    pub fn remote_default_branch(&self, dir: &Path, remote: &str) -> Result<Option<String>> {
        let out = self.run(dir, &["ls-remote", "--symref", remote, "HEAD"])?;
        if !out.success() {
            return Ok(None);
        }
        for line in out.stdout.lines() {
            if let Some(rest) = line.strip_prefix("ref: ") {
                if let Some((refname, _)) = rest.split_once('\t') {
                    if let Some(name) = refname.strip_prefix("refs/heads/") {
                        return Ok(Some(name.to_string()));
                    }
                }
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn init_repo(dir: &Path) -> GitAdapter {
        let git = GitAdapter::new(false);
        std::process::Command::new("git")
            .args(["init", "--quiet", "-b", "main"])
            .current_dir(dir)
            .output()
            .unwrap();
        std::process::Command::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(dir)
            .output()
            .unwrap();
        std::process::Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(dir)
            .output()
            .unwrap();
        std::fs::write(dir.join("f.txt"), "hello").unwrap();
        std::process::Command::new("git")
            .args(["add", "."])
            .current_dir(dir)
            .output()
            .unwrap();
        std::process::Command::new("git")
            .args(["commit", "--quiet", "-m", "init"])
            .current_dir(dir)
            .output()
            .unwrap();
        git
    }

    #[test]
    fn current_branch_and_head_sha() {
        let dir = tempdir().unwrap();
        let git = init_repo(dir.path());
        assert_eq!(git.current_branch(dir.path()).unwrap(), "main");
        assert_eq!(git.head_sha(dir.path()).unwrap().len(), 40);
    }

    #[test]
    fn is_dirty_detects_modification() {
        let dir = tempdir().unwrap();
        let git = init_repo(dir.path());
        assert!(!git.is_dirty(dir.path()).unwrap());
        std::fs::write(dir.path().join("f.txt"), "changed").unwrap();
        assert!(git.is_dirty(dir.path()).unwrap());
    }

    #[test]
    fn has_untracked_detects_new_file() {
        let dir = tempdir().unwrap();
        let git = init_repo(dir.path());
        assert!(!git.has_untracked(dir.path()).unwrap());
        std::fs::write(dir.path().join("new.txt"), "x").unwrap();
        assert!(git.has_untracked(dir.path()).unwrap());
    }

    #[test]
    fn checkout_b_creates_and_switches() {
        let dir = tempdir().unwrap();
        let git = init_repo(dir.path());
        git.checkout_b(dir.path(), "feature", None).unwrap();
        assert_eq!(git.current_branch(dir.path()).unwrap(), "feature");
        assert!(git.has_local_branch(dir.path(), "feature").unwrap());
    }
}
