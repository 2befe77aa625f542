#![cfg(unix)]
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::wildcard_imports,
    clippy::indexing_slicing
)]
//! Integration tests for `unstow`.

mod common;

use std::fs;

use common::{SandboxBuilder, is_symlink};
use dotman_cli::error::{EntryError, UsageError};
use dotman_cli::fs::digest::tree_digest;
use dotman_cli::policy::{Category, Decision};

/// A managed file link becomes a regular file; the repository copy stays.
#[test]
fn unstow_materializes_file() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "export EDITOR=vi\n")
        .home_symlink(".bashrc", "repo/bashrc")
        .build();
    let live = sb.home_path(".bashrc");

    let report = sb.engine().unstow(&live, false).unwrap();

    assert!(report.is_success(), "{:?}", report.failures);
    assert!(!is_symlink(&live));
    assert_eq!(fs::read_to_string(&live).unwrap(), "export EDITOR=vi\n");
    assert!(sb.repo_path("bashrc").is_file());
}

/// A managed directory link becomes a real directory with identical content.
#[test]
fn unstow_materializes_directory() {
    let sb = SandboxBuilder::new()
        .repo_file("config__foo/bar.conf", "a\n")
        .repo_file("config__foo/sub/baz.conf", "b\n")
        .home_symlink(".config/foo", "repo/config__foo")
        .build();
    let live = sb.home_path(".config/foo");

    let report = sb.engine().unstow(&live, false).unwrap();

    assert!(report.is_success(), "{:?}", report.failures);
    assert!(live.is_dir() && !is_symlink(&live));
    assert_eq!(
        tree_digest(&live).unwrap(),
        tree_digest(&sb.repo_path("config__foo")).unwrap()
    );
    assert!(sb.repo_path("config__foo/sub/baz.conf").is_file());
}

/// A symlink pointing anywhere else is a conflict and nothing changes.
#[test]
fn unstow_refuses_foreign_symlink() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "repo\n")
        .home_file("other", "other\n")
        .home_symlink(".bashrc", "other")
        .build();
    let before = sb.tree();

    let report = sb.engine().unstow(&sb.home_path(".bashrc"), false).unwrap();

    assert_eq!(report.plan.count(Category::Conflict), 1);
    assert!(matches!(report.failures[0], EntryError::Conflict { .. }));
    assert_eq!(sb.tree(), before);
}

/// A regular file is not a symlink into the repository either.
#[test]
fn unstow_refuses_regular_file() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "repo\n")
        .home_file(".bashrc", "live\n")
        .build();
    let before = sb.tree();
    let report = sb.engine().unstow(&sb.home_path(".bashrc"), false).unwrap();
    assert_eq!(report.plan.count(Category::Conflict), 1);
    assert_eq!(sb.tree(), before);
}

/// A file reached through a linked parent must be unstowed via that parent.
#[test]
fn unstow_refuses_path_inside_linked_directory() {
    let sb = SandboxBuilder::new()
        .repo_file("config__foo/bar.conf", "a\n")
        .home_symlink(".config/foo", "repo/config__foo")
        .build();
    let before = sb.tree();
    let report = sb
        .engine()
        .unstow(&sb.home_path(".config/foo/bar.conf"), false)
        .unwrap();
    let reason = report.plan.steps[0].decision.reason().unwrap().to_string();
    assert!(reason.contains("linked parent"), "{reason}");
    assert_eq!(sb.tree(), before);
}

/// A managed link whose repository content is gone cannot be unstowed.
#[test]
fn unstow_dangling_managed_link_is_error() {
    let sb = SandboxBuilder::new()
        .home_symlink(".bashrc", "repo/bashrc")
        .build();
    let report = sb.engine().unstow(&sb.home_path(".bashrc"), false).unwrap();
    assert_eq!(report.plan.count(Category::Error), 1);
    assert!(is_symlink(&sb.home_path(".bashrc")));
}

/// Dry-run decides but leaves the link in place.
#[test]
fn unstow_dry_run_changes_nothing() {
    let sb = SandboxBuilder::new()
        .repo_file("bashrc", "x")
        .home_symlink(".bashrc", "repo/bashrc")
        .build();
    let before = sb.tree();
    let report = sb.engine().unstow(&sb.home_path(".bashrc"), true).unwrap();
    assert_eq!(report.plan.steps[0].decision, Decision::RestoreOriginal);
    assert_eq!(sb.tree(), before);
}

/// Paths outside the home directory are usage errors.
#[test]
fn unstow_outside_home_is_usage_error() {
    let sb = SandboxBuilder::new().build();
    let err = sb.engine().unstow(&sb.dir.path().join("x"), false).unwrap_err();
    assert!(matches!(err, UsageError::Unmappable { .. }));
}
