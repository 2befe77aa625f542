//! Top-level subcommand orchestration.
pub mod adopt;
pub mod restore;
pub mod unstow;
pub mod version;

use std::path::{Path, PathBuf};

use crate::cli::GlobalOpts;
use crate::config::{Config, resolve_home, resolve_root};
use crate::engine::RunReport;
use crate::error::DotmanError;
use crate::logging::Logger;
use crate::mapping::{expand_home, lexical_normalize};

/// How a command that ran to completion went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Every entry was changed or already correct.
    Success,
    /// At least one entry conflicted or failed.
    EntriesFailed,
}

impl RunStatus {
    /// Process exit code for this status.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::EntriesFailed => 1,
        }
    }
}

/// Shared state produced by the common command setup sequence.
#[derive(Debug)]
pub struct CommandSetup {
    /// Resolved home, repository, and repository options.
    pub config: Config,
}

impl CommandSetup {
    /// Resolve the home directory and repository root, then load the
    /// repository options.
    ///
    /// # Errors
    ///
    /// Returns [`DotmanError::Config`] if either directory cannot be found
    /// or the options file is invalid.
    pub fn init(global: &GlobalOpts, log: &Logger) -> Result<Self, DotmanError> {
        let home = resolve_home(global.home.as_deref())?;
        let root = resolve_root(global.root.as_deref())?;

        log.stage("Loading configuration");
        let config = Config::load(&root, &home)?;
        log.debug(&format!("home: {}", config.home.display()));
        log.debug(&format!("repository: {}", config.root.display()));
        log.debug(&format!(
            "ignoring directories [{}] and suffixes [{}]",
            config.ignore.dirs.join(", "),
            config.ignore.suffixes.join(", ")
        ));
        Ok(Self { config })
    }
}

/// Turn a home path argument into an absolute path under `home`.
///
/// `~` expands to `home` and relative paths are taken from `cwd`. When the
/// result is not under `home` as spelled, its parent is canonicalized so an
/// aliased home (a symlinked `/home`, say) still maps.
#[must_use]
pub fn absolute_home_path(raw: &Path, home: &Path, cwd: &Path) -> PathBuf {
    let expanded = raw
        .to_str()
        .map_or_else(|| raw.to_path_buf(), |s| expand_home(s, home));
    let path = lexical_normalize(&if expanded.is_absolute() {
        expanded
    } else {
        cwd.join(expanded)
    });
    if path.starts_with(home) {
        return path;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => dunce::canonicalize(parent)
            .map_or_else(|_| path.clone(), |parent| parent.join(name)),
        _ => path,
    }
}

/// Log the outcome of `report` and the per-entry summary.
#[must_use]
pub fn finish(report: &RunReport, log: &Logger) -> RunStatus {
    for record in &report.backups {
        log.debug(&format!(
            "backup: {} -> {}",
            record.original.display(),
            record.backup.display()
        ));
    }
    log.print_summary();
    log.info(&report.plan.summary());

    if report.is_success() {
        RunStatus::Success
    } else {
        let count = report.failures.len();
        let noun = if count == 1 { "entry" } else { "entries" };
        log.error(&format!("{count} {noun} conflicted or failed"));
        RunStatus::EntriesFailed
    }
}
