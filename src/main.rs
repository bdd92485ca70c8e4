//! mstl - multi-repo git orchestrator.
//!
//! A single binary covering the workspace lifecycle: create it (`init`),
//! observe it (`status`, `snapshot`), move it in lock-step
//! (`switch`/`sync`/`push`/`reset`), and coordinate grouped pull requests
//! across it (`pr create|update|status|checkout`).

use anyhow::Result;
use clap::{Parser, Subcommand};
use mstl::commands;
use mstl::output::{CliOutput, Output, OutputConfig};

#[derive(Parser, Debug)]
#[command(name = "mstl")]
#[command(version = mstl::VERSION_DISPLAY)]
#[command(about = "Coordinate synchronized git operations and grouped pull requests across a manifest of related repositories")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a workspace from a manifest and clone its repositories
    Init(commands::init::Args),
    /// Show branch, upstream, and dirty state for every repository
    Status(commands::status::Args),
    /// Create or select one branch name across every repository
    Switch(commands::switch::Args),
    /// Pull every repository, merging or rebasing onto its upstream
    Sync(commands::sync::Args),
    /// Push every repository that is cleanly ahead of its upstream
    Push(commands::push::Args),
    /// Hard-reset every repository to its upstream
    Reset(commands::reset::Args),
    /// Print a fenced snapshot block of every repository's current state
    Snapshot(commands::snapshot::Args),
    /// Grouped pull-request operations across the workspace
    Pr(commands::pr::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let verbose = match &cli.command {
        Command::Init(a) => a.common.verbose,
        Command::Status(a) => a.common.verbose,
        Command::Switch(a) => a.common.verbose,
        Command::Sync(a) => a.common.verbose,
        Command::Push(a) => a.common.verbose,
        Command::Reset(a) => a.common.verbose,
        Command::Snapshot(a) => a.common.verbose,
        Command::Pr(a) => match &a.command {
            commands::pr::Command::Create(a) => a.common.verbose,
            commands::pr::Command::Update(a) => a.common.verbose,
            commands::pr::Command::Status(a) => a.common.verbose,
            commands::pr::Command::Checkout(a) => a.common.verbose,
        },
    };

    mstl::logging::init_logging(verbose);
    let mut output: Box<dyn Output> = Box::new(CliOutput::new(OutputConfig::new(false, verbose)));

    let result = match &cli.command {
        Command::Init(a) => commands::init::run_with_output(a, output.as_mut()),
        Command::Status(a) => commands::status::run_with_output(a, output.as_mut()),
        Command::Switch(a) => commands::switch::run_with_output(a, output.as_mut()),
        Command::Sync(a) => commands::sync::run_with_output(a, output.as_mut()),
        Command::Push(a) => commands::push::run_with_output(a, output.as_mut()),
        Command::Reset(a) => commands::reset::run_with_output(a, output.as_mut()),
        Command::Snapshot(a) => commands::snapshot::run_with_output(a, output.as_mut()),
        Command::Pr(a) => commands::pr::run_with_output(a, output.as_mut()),
    };

    if let Err(ref e) = result {
        output.error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}
