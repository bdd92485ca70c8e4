//! Typed error kinds shared across the workspace state machine.
//!
//! Commands surface these through `anyhow::Error` (via `?`), but keeping them
//! as a closed enum lets callers match on `.downcast_ref::<CoreError>()` when
//! they need to branch on failure kind rather than message text (the
//! categorizer in `pr create` does this to distinguish a hard stop from a
//! per-repo skip).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("required tool not found on PATH: {0}")]
    ToolMissing(String),

    #[error("manifest invalid: {0}")]
    ManifestInvalid(String),

    #[error("workspace invalid: {0}")]
    WorkspaceInvalid(String),

    #[error("{0}: no such branch")]
    NoSuchBranch(String),

    #[error("{0}: HEAD is detached")]
    Detached(String),

    #[error("{0}: working tree is dirty")]
    Dirty(String),

    #[error("{0}: behind remote")]
    BehindRemote(String),

    #[error("{0}: push rejected (not a fast-forward)")]
    NonFastForward(String),

    #[error("confirmation required but stdin is not a terminal (use --yes)")]
    NonInteractive,

    #[error("dependency graph references unknown repo id: {0}")]
    UnknownNode(String),

    #[error("malformed dependency graph line: {0}")]
    BadEdge(String),

    #[error("dependency graph has a self-loop on {0}")]
    SelfLoop(String),

    #[error("{0}: repository changed since status was collected")]
    ConcurrentModification(String),

    #[error("{0}: permission denied")]
    PermissionDenied(String),

    #[error("forge error: {0}")]
    ForgeError(String),

    #[error("{0}: conflict")]
    Conflict(String),
}
