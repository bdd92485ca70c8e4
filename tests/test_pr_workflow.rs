//! End-to-end coverage of the PR orchestrator (C9) against a fake forge CLI.
//!
//! `gh` is replaced by a small shell script so `pr create`/`pr update` run
//! their full phases (collect, categorize, re-fingerprint, push, render,
//! create-or-update) against a real local git remote with no network access.

use mstl::commands::common::CommonArgs;
use mstl::commands::pr::create;
use mstl::commands::pr::update;
use mstl::output::TestOutput;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use tempfile::tempdir;

fn run_git(dir: &Path, args: &[&str]) {
    let out = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        out.status.success(),
        "git {:?} failed: {}",
        args,
        String::from_utf8_lossy(&out.stderr)
    );
}

fn init_bare(path: &Path) {
    std::fs::create_dir_all(path).unwrap();
    run_git(path, &["init", "--quiet", "--bare", "-b", "main"]);
}

fn clone_and_commit(remote: &Path, work: &Path) {
    run_git(
        work.parent().unwrap(),
        &[
            "clone",
            "--quiet",
            remote.to_str().unwrap(),
            work.file_name().unwrap().to_str().unwrap(),
        ],
    );
    run_git(work, &["config", "user.email", "test@example.com"]);
    run_git(work, &["config", "user.name", "Test"]);
    std::fs::write(work.join("f.txt"), "hello").unwrap();
    run_git(work, &["add", "."]);
    run_git(work, &["commit", "--quiet", "-m", "init"]);
    run_git(work, &["push", "--quiet", "origin", "main"]);
    // Leave local one commit ahead of the remote for push-and-create.
    std::fs::write(work.join("f.txt"), "hello again").unwrap();
    run_git(work, &["add", "."]);
    run_git(work, &["commit", "--quiet", "-m", "second"]);
}

/// A fake `gh` that logs every invocation (one line per call, unit-separated
/// args) to `log_path` -- baked directly into the script text rather than an
/// env var, so concurrent tests in this binary never race over a shared
/// process-global -- and answers just enough to drive categorization and
/// body rendering: no open PR on first call, a clean permission check, and
/// an echoed PR URL / no-op edit.
fn write_fake_gh(path: &Path, log_path: &Path) {
    let script = format!(
        r#"#!/bin/sh
{{
  for a in "$@"; do printf '%s\x1f' "$a"; done
  printf '\n'
}} >> "{log}"

case "$1 $2" in
  "pr list")
    echo "[]"
    ;;
  "pr create")
    echo "https://example.com/org/repoa/pull/1"
    ;;
  "pr edit")
    echo ""
    ;;
  "api user")
    echo "tester"
    ;;
  "api repos/{{owner}}/{{repo}}")
    echo "true"
    ;;
  *)
    echo "unhandled invocation: $*" >&2
    exit 1
    ;;
esac
"#,
        log = log_path.display()
    );
    let mut f = std::fs::File::create(path).unwrap();
    f.write_all(script.as_bytes()).unwrap();
    let mut perms = f.metadata().unwrap().permissions();
    perms.set_mode(0o755);
    f.set_permissions(perms).unwrap();
}

fn common_args(manifest_path: &Path, forge_bin: &Path) -> CommonArgs {
    CommonArgs {
        file: Some(manifest_path.to_path_buf()),
        ignore_stdin: true,
        yes: true,
        verbose: false,
        forge_bin: Some(forge_bin.to_path_buf()),
    }
}

fn write_manifest(manifest_path: &Path, remote: &Path) {
    std::fs::create_dir_all(manifest_path.parent().unwrap()).unwrap();
    std::fs::write(
        manifest_path,
        format!(
            r#"{{"repositories":[{{"url":"{}","id":"repoa","branch":"main","base-branch":"main"}}]}}"#,
            remote.to_str().unwrap()
        ),
    )
    .unwrap();
}

#[test]
fn pr_create_then_update_renders_idempotent_body() {
    let root = tempdir().unwrap();
    let remote = root.path().join("remote.git");
    init_bare(&remote);
    let repo_dir = root.path().join("repoa");
    clone_and_commit(&remote, &repo_dir);

    let manifest_path = root.path().join(".mstl").join("config.json");
    write_manifest(&manifest_path, &remote);

    let gh_path = root.path().join("gh");
    let gh_log = root.path().join("gh.log");
    write_fake_gh(&gh_path, &gh_log);

    let create_args = create::Args {
        common: common_args(&manifest_path, &gh_path),
        title: "Add thing".to_string(),
        body: "Hello".to_string(),
        draft: false,
    };
    let mut output = TestOutput::new();
    create::run_with_output(&create_args, &mut output).expect("pr create should succeed");
    assert!(output.has_result("created"));

    let log_after_create = std::fs::read_to_string(&gh_log).unwrap();
    assert!(log_after_create.contains("pr\u{1f}create"));

    // `pr update` finds no open PR (the fake forge always answers `pr list`
    // with `[]`), so every plan lands in CreateOnly/PushAndCreate, none of
    // which update() treats as updatable -- it reports nothing to do rather
    // than re-creating.
    let update_args = update::Args {
        common: common_args(&manifest_path, &gh_path),
        body: None,
    };
    let mut output2 = TestOutput::new();
    update::run_with_output(&update_args, &mut output2).expect("pr update should succeed");
    assert!(output2.has_result("no pull requests to update"));
}

#[test]
fn pr_create_body_contains_mistletoe_block() {
    let root = tempdir().unwrap();
    let remote = root.path().join("remote.git");
    init_bare(&remote);
    let repo_dir = root.path().join("repoa");
    clone_and_commit(&remote, &repo_dir);

    let manifest_path = root.path().join(".mstl").join("config.json");
    write_manifest(&manifest_path, &remote);

    let gh_path = root.path().join("gh");
    let gh_log = root.path().join("gh2.log");
    write_fake_gh(&gh_path, &gh_log);

    let create_args = create::Args {
        common: common_args(&manifest_path, &gh_path),
        title: "Add thing".to_string(),
        body: "Hello".to_string(),
        draft: false,
    };
    let mut output = TestOutput::new();
    create::run_with_output(&create_args, &mut output).expect("pr create should succeed");

    let log = std::fs::read_to_string(&gh_log).unwrap();
    let create_line = log.lines().find(|l| l.contains("pr\u{1f}create")).unwrap();
    let fields: Vec<&str> = create_line.split('\u{1f}').collect();
    let body_idx = fields.iter().position(|f| *f == "--body").unwrap();
    let body = fields[body_idx + 1];

    assert!(body.starts_with("Hello"));
    assert!(body.contains("<!-- mistletoe:begin -->"));
    assert!(body.contains("<!-- mistletoe:end -->"));
    assert!(body.contains("mistletoe-snapshot"));
}
