#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! End-to-end tests of the `dotman` binary: exit codes and visible effects.
//!
//! Every invocation gets `--home`, `--root`, and a private `XDG_CACHE_HOME`
//! so nothing outside the sandbox is read or written.

mod common;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

use common::{Sandbox, SandboxBuilder};

fn dotman(sb: &Sandbox) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("dotman");
    cmd.env("XDG_CACHE_HOME", sb.dir.path().join("cache"))
        .env_remove("DOTMAN_ROOT")
        .arg("--home")
        .arg(sb.home())
        .arg("--root")
        .arg(sb.root());
    cmd
}

// ---------------------------------------------------------------------------
// Usage errors: exit 2
// ---------------------------------------------------------------------------

#[test]
fn missing_subcommand_exits_2() {
    let sb = SandboxBuilder::new().build();
    dotman(&sb).assert().code(2);
}

#[test]
fn unknown_subcommand_exits_2() {
    let sb = SandboxBuilder::new().build();
    dotman(&sb).arg("frobnicate").assert().code(2);
}

#[test]
fn unmatched_selector_exits_2() {
    let sb = SandboxBuilder::new().repo_file("bashrc", "x").build();
    dotman(&sb)
        .args(["restore", "emacs"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("does not match any tracked entry"));
}

#[test]
fn adopt_outside_home_exits_2() {
    let sb = SandboxBuilder::new().build();
    let outside = sb.dir.path().join("outside");
    std::fs::write(&outside, "x").unwrap();
    dotman(&sb).arg("adopt").arg(&outside).assert().code(2);
    assert!(outside.is_file());
}

#[test]
fn missing_root_exits_2() {
    let sb = SandboxBuilder::new().build();
    cargo_bin_cmd!("dotman")
        .env("XDG_CACHE_HOME", sb.dir.path().join("cache"))
        .arg("--home")
        .arg(sb.home())
        .arg("--root")
        .arg(sb.dir.path().join("no-such-repo"))
        .arg("restore")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not a directory"));
}

#[test]
fn invalid_repository_options_exit_2() {
    let sb = SandboxBuilder::new().build();
    common::write(&sb.repo_path(".dotman.toml"), "[ignore\n");
    dotman(&sb).arg("restore").assert().code(2);
}

// ---------------------------------------------------------------------------
// Runs: exit 0 or 1
// ---------------------------------------------------------------------------

#[test]
fn version_prints_name() {
    let sb = SandboxBuilder::new().build();
    dotman(&sb)
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("dotman "));
}

#[cfg(unix)]
#[test]
fn restore_links_and_exits_0() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "x")
        .repo_file("config__foo/bar.conf", "y")
        .build();
    dotman(&sb).arg("restore").assert().success();
    assert!(common::is_symlink(&sb.home_path(".bashrc")));
    assert!(common::is_symlink(&sb.home_path(".config/foo")));
}

#[cfg(unix)]
#[test]
fn dry_run_restore_changes_nothing() {
    let sb = SandboxBuilder::new().repo_file("bashrc", "x").build();
    let before = sb.tree();
    dotman(&sb)
        .args(["restore", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("DRY RUN"));
    assert_eq!(sb.tree(), before);
}

#[cfg(unix)]
#[test]
fn conflict_exits_1_and_force_exits_0() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "repo")
        .home_file(".bashrc", "live")
        .build();
    dotman(&sb).arg("restore").assert().code(1);
    assert_eq!(
        std::fs::read_to_string(sb.home_path(".bashrc")).unwrap(),
        "live"
    );
    dotman(&sb).args(["restore", "--force"]).assert().success();
    assert!(common::is_symlink(&sb.home_path(".bashrc")));
}

#[cfg(unix)]
#[test]
fn adopt_then_unstow_round_trip() {
    let sb = SandboxBuilder::new().home_file(".gitconfig", "[user]\n").build();
    dotman(&sb).args(["adopt", "~/.gitconfig"]).assert().success();
    assert!(common::is_symlink(&sb.home_path(".gitconfig")));
    assert!(sb.repo_path("gitconfig").is_file());

    dotman(&sb).args(["unstow", "~/.gitconfig"]).assert().success();
    assert!(!common::is_symlink(&sb.home_path(".gitconfig")));
    assert!(sb.repo_path("gitconfig").is_file());
}

#[cfg(unix)]
#[test]
fn unstow_foreign_link_exits_1() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "x")
        .home_symlink(".bashrc", "/etc/hosts")
        .build();
    dotman(&sb).args(["unstow", "~/.bashrc"]).assert().code(1);
}

#[cfg(unix)]
#[test]
fn log_file_is_written_to_cache_dir() {
    let sb = SandboxBuilder::new().repo_file("bashrc", "x").build();
    dotman(&sb).arg("restore").assert().success();
    let log = std::fs::read_to_string(sb.dir.path().join("cache/dotman/restore.log")).unwrap();
    assert!(log.contains(".bashrc"), "{log}");
}

#[cfg(unix)]
#[test]
fn self_test_passes() {
    let sb = SandboxBuilder::new().build();
    cargo_bin_cmd!("dotman")
        .env("XDG_CACHE_HOME", sb.dir.path().join("cache"))
        .arg("--self-test")
        .assert()
        .success();
}

#[cfg(unix)]
#[test]
fn self_test_ignores_subcommand() {
    let sb = SandboxBuilder::new().repo_file("bashrc", "x").build();
    let before = sb.tree();
    dotman(&sb)
        .args(["--self-test", "restore", "--force"])
        .assert()
        .success();
    assert_eq!(sb.tree(), before);
}
