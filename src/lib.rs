/// Clean semver, set by `build.rs`; used by clap's `--version` output.
pub const VERSION: &str = env!("MSTL_VERSION");

/// Version with dev branch/hash suffix when not a release build, set by
/// `build.rs`; used for the human-facing `mstl --version` line.
pub const VERSION_DISPLAY: &str = env!("MSTL_VERSION_DISPLAY");

pub mod commands;
pub mod confirm;
pub mod context;
pub mod depgraph;
pub mod errors;
pub mod forge;
pub mod git;
pub mod logging;
pub mod manifest;
pub mod output;
pub mod parallel;
pub mod process;
pub mod snapshot;
pub mod status;
pub mod styles;
pub mod utils;
