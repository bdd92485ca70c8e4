//! Process runner (C1): the only place that shells out to an external binary.
//!
//! Every git and forge invocation in the crate funnels through
//! [`run`]/[`run_with_stdin`]. The runner never interprets the bytes it
//! transports — callers parse stdout/stderr themselves. In verbose mode the
//! invocation and its output are also echoed to the terminal via the
//! caller's `Output`, mirroring how a user would see raw git commands when
//! running with `-v`.

use crate::errors::CoreError;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Result of running an external program to completion.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Run `program` with `args` in `cwd`, returning captured stdout/stderr/exit.
///
/// Fails with [`CoreError::ToolMissing`] when `program` cannot be resolved on
/// `PATH` (i.e. when the OS itself fails to spawn the process).
pub fn run(program: &str, args: &[&str], cwd: &Path) -> Result<ProcessOutput> {
    run_with_stdin(program, args, cwd, None, false)
}

/// Like [`run`], optionally feeding `stdin` to the child and/or streaming the
/// invocation and its output to the terminal when `verbose` is set.
pub fn run_with_stdin(
    program: &str,
    args: &[&str],
    cwd: &Path,
    stdin: Option<&str>,
    verbose: bool,
) -> Result<ProcessOutput> {
    if verbose {
        eprintln!("+ {program} {}", args.join(" "));
    }

    let mut command = Command::new(program);
    command
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    command.stdin(if stdin.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });

    let mut child = command.spawn().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            anyhow::Error::new(CoreError::ToolMissing(program.to_string()))
        } else {
            anyhow::Error::new(e)
                .context(format!("failed to spawn '{program}'"))
        }
    })?;

    if let Some(input) = stdin {
        if let Some(mut pipe) = child.stdin.take() {
            pipe.write_all(input.as_bytes())
                .with_context(|| format!("failed to write stdin to '{program}'"))?;
        }
    }

    let output = child
        .wait_with_output()
        .with_context(|| format!("failed to wait on '{program}'"))?;

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    let status = output.status.code().unwrap_or(-1);

    if verbose {
        if !stdout.is_empty() {
            eprint!("{stdout}");
        }
        if !stderr.is_empty() {
            eprint!("{stderr}");
        }
    }

    Ok(ProcessOutput {
        stdout,
        stderr,
        status,
    })
}

/// Confirm `program` resolves on `PATH` without running it.
pub fn ensure_tool_available(program: &str) -> Result<()> {
    which::which(program)
        .map(|_| ())
        .map_err(|_| anyhow::Error::new(CoreError::ToolMissing(program.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_captures_stdout() {
        let out = run("echo", &["hello"], Path::new(".")).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout.trim(), "hello");
    }

    #[test]
    fn run_missing_tool_errors() {
        let err = run("definitely-not-a-real-binary", &[], Path::new(".")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::ToolMissing(_))
        ));
    }

    #[test]
    fn run_with_stdin_feeds_child() {
        let out = run_with_stdin("cat", &[], Path::new("."), Some("piped text"), false).unwrap();
        assert!(out.success());
        assert_eq!(out.stdout, "piped text");
    }
}
