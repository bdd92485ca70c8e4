//! PR orchestrator (C9): grouped create/update/checkout/status of PRs.

mod body;
mod categorize;
pub mod checkout;
pub mod create;
mod shared;
pub mod status;
pub mod update;

use crate::output::Output;
use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pr")]
#[command(version = crate::VERSION)]
#[command(about = "Grouped pull-request create/update/status/checkout across the workspace")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Create(create::Args),
    Update(update::Args),
    Status(status::Args),
    Checkout(checkout::Args),
}

pub fn run_with_output(args: &Args, output: &mut dyn Output) -> Result<()> {
    match &args.command {
        Command::Create(a) => create::run_with_output(a, output),
        Command::Update(a) => update::run_with_output(a, output),
        Command::Status(a) => status::run_with_output(a, output),
        Command::Checkout(a) => checkout::run_with_output(a, output),
    }
}
