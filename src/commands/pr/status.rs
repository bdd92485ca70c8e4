//! `pr status` — list open PRs for each repo's current branch. No mutation,
//! and (per the open question this leaves explicit) no implicit fetch: a
//! stale local branch name would otherwise mean a stale PR lookup, but a
//! network fetch here would surprise a command documented as read-only.

use crate::commands::common::{load_manifest, CommonArgs};
use crate::forge::Forge;
use crate::git::GitAdapter;
use crate::output::Output;
use anyhow::Result;
use clap::Parser;
use tabled::Tabled;

#[derive(Parser, Debug)]
#[command(name = "status")]
#[command(about = "List open pull requests for each repository's current branch")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Tabled)]
struct Row {
    #[tabled(rename = "REPO")]
    id: String,
    #[tabled(rename = "PR")]
    number: String,
    #[tabled(rename = "TITLE")]
    title: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "URL")]
    url: String,
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let ctx = args.common.to_context();
    crate::process::ensure_tool_available(&ctx.forge_path.to_string_lossy())?;

    let manifest = load_manifest(&args.common, output)?;
    let workspace_root = manifest.workspace_root();
    let git = GitAdapter::new(ctx.verbose);
    let forge = Forge::new(&ctx.forge_path);

    let mut rows = Vec::new();
    for repo in &manifest.repos {
        let dir = workspace_root.join(&repo.id);
        if !dir.is_dir() {
            output.warning(&format!("{}: missing directory", repo.id));
            continue;
        }
        let branch = match git.current_branch(&dir) {
            Ok(b) => b,
            Err(e) => {
                output.warning(&format!("{}: {e}", repo.id));
                continue;
            }
        };
        match forge.find_open_pr(&dir, &branch) {
            Ok(Some(pr)) => rows.push(Row {
                id: repo.id.clone(),
                number: pr.number.to_string(),
                title: pr.title,
                state: pr.state,
                url: pr.url,
            }),
            Ok(None) => rows.push(Row {
                id: repo.id.clone(),
                number: "-".to_string(),
                title: "-".to_string(),
                state: "none".to_string(),
                url: "-".to_string(),
            }),
            Err(e) => output.warning(&format!("{}: {e}", repo.id)),
        }
    }

    output.raw(&tabled::Table::new(rows).to_string());
    Ok(())
}
