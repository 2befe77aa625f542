// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed repository and home directory with a
// fluent builder, so each integration test can set up an isolated sandbox
// without repeating filesystem boilerplate.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use dotman_cli::config::Config;
use dotman_cli::engine::Engine;
use dotman_cli::fs::BackupManager;
use dotman_cli::fs::digest::snapshot;
use dotman_cli::logging::Logger;

/// Backup stamp used by every sandbox engine.
pub const STAMP: &str = "20240101-120000";

/// An isolated repository and home directory backed by a [`tempfile::TempDir`].
pub struct Sandbox {
    /// Temporary directory holding `repo/` and `home/`.
    pub dir: tempfile::TempDir,
    /// Loaded configuration (canonical paths).
    pub config: Config,
    /// Logger the engine reports to.
    pub log: Logger,
}

impl Sandbox {
    /// Engine with a fixed backup stamp.
    pub fn engine(&self) -> Engine<'_> {
        Engine::new(&self.config, &self.log).with_backups(BackupManager::with_stamp(STAMP))
    }

    /// Canonical home directory.
    pub fn home(&self) -> &Path {
        &self.config.home
    }

    /// Canonical repository root.
    pub fn root(&self) -> &Path {
        &self.config.root
    }

    /// `rel` under the home directory.
    pub fn home_path(&self, rel: &str) -> PathBuf {
        self.config.home.join(rel)
    }

    /// `rel` under the repository.
    pub fn repo_path(&self, rel: &str) -> PathBuf {
        self.config.root.join(rel)
    }

    /// Snapshot of both trees, keyed `home/...` and `repo/...`.
    pub fn tree(&self) -> BTreeMap<PathBuf, String> {
        let mut all = BTreeMap::new();
        for (label, root) in [("home", self.home()), ("repo", self.root())] {
            for (rel, content) in snapshot(root).expect("snapshot") {
                all.insert(Path::new(label).join(rel), content);
            }
        }
        all
    }
}

/// Whether `path` itself is a symlink.
pub fn is_symlink(path: &Path) -> bool {
    path.symlink_metadata()
        .is_ok_and(|m| m.file_type().is_symlink())
}

/// Write `content` to `path`, creating parent directories.
pub fn write(path: &Path, content: &str) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent");
    }
    std::fs::write(path, content).expect("write file");
}

/// Fluent builder for [`Sandbox`].
pub struct SandboxBuilder {
    dir: tempfile::TempDir,
}

impl SandboxBuilder {
    /// Begin building a sandbox with empty `repo/` and `home/` directories.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::create_dir_all(dir.path().join("repo")).expect("create repo");
        std::fs::create_dir_all(dir.path().join("home")).expect("create home");
        Self { dir }
    }

    fn repo(&self) -> PathBuf {
        self.dir.path().join("repo")
    }

    fn home(&self) -> PathBuf {
        self.dir.path().join("home")
    }

    /// Add a file to the repository.
    pub fn repo_file(self, rel: &str, content: &str) -> Self {
        write(&self.repo().join(rel), content);
        self
    }

    /// Write `<repo>/.dotman.toml`.
    pub fn repo_options(self, toml: &str) -> Self {
        write(&self.repo().join(".dotman.toml"), toml);
        self
    }

    /// Add a file to the home directory.
    pub fn home_file(self, rel: &str, content: &str) -> Self {
        write(&self.home().join(rel), content);
        self
    }

    /// Add an (empty) directory to the home directory.
    pub fn home_dir(self, rel: &str) -> Self {
        std::fs::create_dir_all(self.home().join(rel)).expect("create home dir");
        self
    }

    /// Add a symlink in the home directory pointing at `target`.
    ///
    /// A target starting with `repo/` is resolved inside the sandbox.
    #[cfg(unix)]
    pub fn home_symlink(self, rel: &str, target: &str) -> Self {
        let link = self.home().join(rel);
        if let Some(parent) = link.parent() {
            std::fs::create_dir_all(parent).expect("create link parent");
        }
        let target = target
            .strip_prefix("repo/")
            .map_or_else(|| PathBuf::from(target), |r| self.repo().join(r));
        std::os::unix::fs::symlink(target, link).expect("create symlink");
        self
    }

    /// Finish building and load the configuration.
    pub fn build(self) -> Sandbox {
        let config = Config::load(&self.repo(), &self.home()).expect("load config");
        Sandbox {
            dir: self.dir,
            config,
            log: Logger::quiet(),
        }
    }
}
