//! `mstl init` — create a workspace from a manifest source and clone every
//! listed repo into it.

use super::common::CommonArgs;
use crate::depgraph;
use crate::git::GitAdapter;
use crate::manifest::{self, RepoEntry};
use crate::output::Output;
use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeSet;
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "init")]
#[command(version = crate::VERSION)]
#[command(about = "Create a workspace from a manifest and clone its repositories")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Read the manifest from stdin instead of a file or an ancestor workspace.
    #[arg(long = "from-stdin")]
    pub from_stdin: bool,

    /// Validate a dependency-graph file against the manifest and copy it in.
    #[arg(long = "dependencies")]
    pub dependencies: Option<PathBuf>,

    /// Directory to create the workspace in. Defaults to the current directory.
    #[arg(long = "dest")]
    pub dest: Option<PathBuf>,

    /// Shallow-clone depth passed to `git clone --depth`.
    #[arg(long = "depth")]
    pub depth: Option<u32>,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;

    let cwd = crate::utils::get_current_directory()?;
    let dest = args.dest.clone().unwrap_or_else(|| cwd.clone());

    let repos = load_source_repos(args, &cwd, output)?;

    let known_ids: BTreeSet<String> = repos
        .iter()
        .map(|r| r.id.clone().unwrap_or_default())
        .collect();
    // Repos without an explicit id still need a derived id for validation.
    let mut resolved_ids = BTreeSet::new();
    for r in &repos {
        let id = match &r.id {
            Some(id) => id.clone(),
            None => manifest::derive_id(&r.url)?,
        };
        resolved_ids.insert(id);
    }
    let _ = known_ids;

    let dependency_text = if let Some(dep_path) = &args.dependencies {
        let text = std::fs::read_to_string(dep_path)
            .with_context(|| format!("failed to read {}", dep_path.display()))?;
        depgraph::parse_and_validate(&text, &resolved_ids)
            .context("dependency graph does not match manifest")?;
        Some(text)
    } else {
        None
    };

    output.step(&format!("Creating workspace at {}", dest.display()));
    manifest::write_to(&dest.join(manifest::MANIFEST_RELATIVE_PATH), &repos)?;
    if let Some(text) = &dependency_text {
        let dep_dest = dest.join(manifest::DEPENDENCY_RELATIVE_PATH);
        if let Some(parent) = dep_dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&dep_dest, text)?;
    }

    let git = GitAdapter::new(args.common.verbose);
    for repo in &repos {
        let id = match &repo.id {
            Some(id) => id.clone(),
            None => manifest::derive_id(&repo.url)?,
        };
        let repo_dest = dest.join(&id);
        output.step(&format!("Cloning {} into {}", repo.url, repo_dest.display()));
        git.clone(&repo.url, &repo_dest, args.depth)
            .with_context(|| format!("failed to clone {}", id))?;
        if repo.branch != "main" {
            if git.has_local_branch(&repo_dest, &repo.branch).unwrap_or(false) {
                git.checkout(&repo_dest, &repo.branch)?;
            } else if git
                .has_remote_branch(&repo_dest, "origin", &repo.branch)
                .unwrap_or(false)
            {
                git.checkout_b(&repo_dest, &repo.branch, Some(&format!("origin/{}", repo.branch)))?;
            }
        }
    }

    output.result(&format!("Initialized workspace with {} repositories", repos.len()));
    Ok(())
}

fn load_source_repos(
    args: &Args,
    cwd: &std::path::Path,
    output: &mut dyn Output,
) -> Result<Vec<RepoEntry>> {
    if let Some(path) = &args.common.file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        return parse_repositories(&text);
    }

    if args.from_stdin {
        if args.common.ignore_stdin {
            anyhow::bail!("--from-stdin and --ignore-stdin were both given");
        }
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read manifest from stdin")?;
        return parse_repositories(&text);
    }

    // Adopt a manifest from the workspace one level up, if present.
    if let Some(parent) = cwd.parent() {
        let candidate = parent.join(manifest::MANIFEST_RELATIVE_PATH);
        if candidate.is_file() {
            let text = std::fs::read_to_string(&candidate)
                .with_context(|| format!("failed to read {}", candidate.display()))?;
            output.info(&format!("Using manifest at {}", candidate.display()));
            return parse_repositories(&text);
        }
    }

    anyhow::bail!("no manifest source given: pass --file, --from-stdin, or run from inside an existing workspace's subdirectory")
}

#[derive(serde::Deserialize)]
struct RawManifest {
    repositories: Vec<RepoEntry>,
}

fn parse_repositories(text: &str) -> Result<Vec<RepoEntry>> {
    let raw: RawManifest =
        serde_json::from_str(text).context("manifest source is not valid JSON")?;
    Ok(raw.repositories)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::TestOutput;
    use tempfile::tempdir;

    #[test]
    fn rejects_dependency_graph_with_unknown_node() {
        let dir = tempdir().unwrap();
        let manifest_path = dir.path().join("manifest.json");
        std::fs::write(
            &manifest_path,
            r#"{"repositories":[{"url":"https://example.com/org/repoa.git"}]}"#,
        )
        .unwrap();
        let dep_path = dir.path().join("dep.md");
        std::fs::write(
            &dep_path,
            "```mermaid\ngraph TD\nrepoa --> repoz\n```\n",
        )
        .unwrap();

        let args = Args {
            common: CommonArgs {
                file: Some(manifest_path),
                ignore_stdin: false,
                yes: true,
                verbose: false,
                forge_bin: None,
            },
            from_stdin: false,
            dependencies: Some(dep_path),
            dest: Some(dir.path().join("workspace")),
            depth: None,
        };
        let mut output = TestOutput::new();
        let result = run_with_output(&args, &mut output);
        assert!(result.is_err());
        assert!(!dir.path().join("workspace").join(".mstl").exists());
    }
}
