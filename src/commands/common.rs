//! Flags shared by every subcommand, flattened into each command's `Args`.

use clap::Args as ClapArgs;
use std::path::PathBuf;

#[derive(ClapArgs, Debug, Clone)]
pub struct CommonArgs {
    /// Path to the manifest file. Defaults to `.mstl/config.json`, searching
    /// ancestor directories when not found in the current one.
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<PathBuf>,

    /// Never treat piped stdin as a manifest source, even when data is pending.
    #[arg(long = "ignore-stdin", global = true)]
    pub ignore_stdin: bool,

    /// Pre-answer every confirmation prompt with "yes".
    #[arg(long = "yes", global = true)]
    pub yes: bool,

    /// Emit step-by-step detail for every git/forge invocation.
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    /// Path to the forge CLI binary. Defaults to `gh` on PATH.
    #[arg(long = "forge-bin", global = true)]
    pub forge_bin: Option<PathBuf>,
}

impl CommonArgs {
    pub fn to_context(&self) -> crate::context::RunContext {
        let mut ctx = crate::context::RunContext::new(self.yes, self.verbose, self.ignore_stdin);
        if let Some(bin) = &self.forge_bin {
            ctx.forge_path = bin.clone();
        }
        ctx
    }

    pub fn manifest_source(&self) -> crate::manifest::ManifestSource {
        match &self.file {
            Some(path) => crate::manifest::ManifestSource::Path(path.clone()),
            None => crate::manifest::ManifestSource::Implicit,
        }
    }
}

/// Load the manifest for `common`, surfacing the ancestor-adoption notice
/// (if any) through `output`.
pub fn load_manifest(
    common: &CommonArgs,
    output: &mut dyn crate::output::Output,
) -> anyhow::Result<crate::manifest::Manifest> {
    let cwd = crate::utils::get_current_directory()?;
    let (manifest, notice) =
        crate::manifest::load(&common.manifest_source(), &cwd, common.ignore_stdin)?;
    if let Some(notice) = notice {
        output.info(&notice);
    }
    Ok(manifest)
}
