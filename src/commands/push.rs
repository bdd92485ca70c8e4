//! `mstl push` — preflight then push every repo, all-or-none per repo (C8).

use super::common::{load_manifest, CommonArgs};
use crate::git::GitAdapter;
use crate::output::Output;
use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "push")]
#[command(version = crate::VERSION)]
#[command(about = "Push every repository that is cleanly ahead of its upstream")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let manifest = load_manifest(&args.common, output)?;
    let ctx = args.common.to_context();
    let workspace_root = manifest.workspace_root();
    let git = GitAdapter::new(ctx.verbose);

    let mut pushed = 0usize;
    for repo in &manifest.repos {
        let dir = workspace_root.join(&repo.id);
        if !dir.is_dir() {
            output.error(&format!("{}: missing directory", repo.id));
            anyhow::bail!("push stopped: {} is missing", repo.id);
        }

        if git.is_dirty(&dir).unwrap_or(true) {
            output.error(&format!("{}: working tree is dirty", repo.id));
            anyhow::bail!("push stopped: {} has a dirty working tree", repo.id);
        }

        let branch = git.current_branch(&dir)?;
        let upstream = git.upstream_for(&dir, &branch).unwrap_or(None);

        if let Some(up) = &upstream {
            let (_, behind) = git.ahead_behind(&dir, &branch, up)?;
            if behind > 0 {
                output.error(&format!("{}: behind or diverged from {up}", repo.id));
                anyhow::bail!("push stopped: {} is behind {up}", repo.id);
            }
        }

        let set_upstream = upstream.is_none();
        match git.push(&dir, "origin", &branch, set_upstream) {
            Ok(()) => {
                output.list_item(&format!("{}: pushed {branch}", repo.id));
                pushed += 1;
            }
            Err(e) => {
                output.error(&format!("{}: {e}", repo.id));
                anyhow::bail!("push stopped: {e}");
            }
        }
    }

    output.result(&format!("pushed {pushed} repositories"));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TestOutput;
    use tempfile::tempdir;

    #[test]
    fn dirty_tree_stops_before_pushing() {
        let dir = tempdir().unwrap();
        let mstl = dir.path().join(".mstl");
        std::fs::create_dir_all(&mstl).unwrap();
        std::fs::write(
            mstl.join("config.json"),
            r#"{"repositories":[{"url":"https://example.com/org/repoa.git"}]}"#,
        )
        .unwrap();
        let repo_dir = dir.path().join("repoa");
        std::fs::create_dir_all(&repo_dir).unwrap();
        std::process::Command::new("git")
            .args(["init", "--quiet", "-b", "main"])
            .current_dir(&repo_dir)
            .output()
            .unwrap();
        std::process::Command::new("git")
            .args(["config", "user.email", "test@example.com"])
            .current_dir(&repo_dir)
            .output()
            .unwrap();
        std::process::Command::new("git")
            .args(["config", "user.name", "Test"])
            .current_dir(&repo_dir)
            .output()
            .unwrap();
        std::fs::write(repo_dir.join("f.txt"), "hello").unwrap();
        std::process::Command::new("git")
            .args(["add", "."])
            .current_dir(&repo_dir)
            .output()
            .unwrap();
        std::process::Command::new("git")
            .args(["commit", "--quiet", "-m", "init"])
            .current_dir(&repo_dir)
            .output()
            .unwrap();
        std::fs::write(repo_dir.join("f.txt"), "dirty").unwrap();

        let args = Args {
            common: CommonArgs {
                file: Some(mstl.join("config.json")),
                ignore_stdin: true,
                yes: true,
                verbose: false,
                forge_bin: None,
            },
        };
        let mut output = TestOutput::new();
        let result = run_with_output(&args, &mut output);
        assert!(result.is_err());
        assert!(output.has_error("dirty"));
    }
}
