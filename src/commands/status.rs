//! `mstl status` — render a one-line-per-repo status table (C5).

use super::common::{load_manifest, CommonArgs};
use crate::output::Output;
use crate::status::{self, StatusRow};
use anyhow::Result;
use clap::Parser;
use tabled::Tabled;

#[derive(Parser, Debug)]
#[command(name = "status")]
#[command(version = crate::VERSION)]
#[command(about = "Show branch, upstream, and dirty state for every repository")]
pub struct Args {
    #[command(flatten)]
    pub common: CommonArgs,

    /// Skip fetching from each remote before computing ahead/behind counts.
    #[arg(long = "no-fetch")]
    pub no_fetch: bool,
}

#[derive(Tabled)]
struct TableRow {
    #[tabled(rename = "")]
    token: String,
    #[tabled(rename = "REPO")]
    id: String,
    #[tabled(rename = "BRANCH")]
    branch: String,
    #[tabled(rename = "UPSTREAM")]
    upstream: String,
    #[tabled(rename = "AHEAD")]
    ahead: String,
    #[tabled(rename = "BEHIND")]
    behind: String,
    #[tabled(rename = "NOTICE")]
    notice: String,
}

impl From<&StatusRow> for TableRow {
    fn from(row: &StatusRow) -> Self {
        Self {
            token: row.token.clone(),
            id: row.id.clone(),
            branch: row.branch.clone().unwrap_or_else(|| "-".to_string()),
            upstream: row.upstream.clone().unwrap_or_else(|| "-".to_string()),
            ahead: row.ahead.to_string(),
            behind: row.behind.to_string(),
            notice: row.notice.clone().unwrap_or_default(),
        }
    }
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    crate::process::ensure_tool_available("git")?;
    let manifest = load_manifest(&args.common, output)?;
    let ctx = args.common.to_context();
    let workspace_root = manifest.workspace_root();

    let (rows, _fingerprints) = status::collect(&manifest, &workspace_root, &ctx, args.no_fetch);

    for row in &rows {
        if let Some(notice) = &row.notice {
            output.warning(&format!("{}: {}", row.id, notice));
        }
    }

    let table_rows: Vec<TableRow> = rows.iter().map(TableRow::from).collect();
    let table = tabled::Table::new(table_rows).to_string();
    output.raw(&table);

    Ok(())
}
