//! Reconciliation engine: restore, adopt, and unstow.
//!
//! Every entry is probed, decided, and (unless dry-run) applied on its own,
//! immediately after its probe; a failing entry is recorded and the run
//! moves on. Dry-run goes through exactly the same planning, so its
//! [`OperationPlan`] is the plan a real run would execute.
//!
//! Nothing here deletes user content: every replacement either backs the
//! content up first or removes a symlink that was verified to point at the
//! expected repository path. Between probe and mutation there is no lock, so
//! a concurrent writer can still race a run.
mod adopt;
pub mod enumerate;
pub mod plan;
mod restore;
mod unstow;

use std::fmt;
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::EntryError;
use crate::fs::helpers::ensure_parent_dir;
use crate::fs::link::create_symlink;
use crate::fs::{BackupManager, BackupRecord};
use crate::logging::{EntryStatus, Log};
use crate::mapping::PathMapper;
use crate::policy::Category;

pub use enumerate::{RepoEntry, Selector};
pub use plan::{OperationPlan, PlannedStep, RunReport};

/// Applies reconciliation operations for one configuration.
pub struct Engine<'a> {
    config: &'a Config,
    mapper: PathMapper,
    backups: BackupManager,
    log: &'a dyn Log,
}

impl fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("backups", &self.backups)
            .finish_non_exhaustive()
    }
}

impl<'a> Engine<'a> {
    /// Create an engine whose backups are stamped with the current time.
    #[must_use]
    pub fn new(config: &'a Config, log: &'a dyn Log) -> Self {
        Self {
            config,
            mapper: PathMapper::new(config.home.clone()),
            backups: BackupManager::new(),
            log,
        }
    }

    /// Replace the backup manager (fixed stamp, forced copy strategy).
    #[must_use]
    pub fn with_backups(mut self, backups: BackupManager) -> Self {
        self.backups = backups;
        self
    }

    /// The path mapper for this engine's home directory.
    #[must_use]
    pub const fn mapper(&self) -> &PathMapper {
        &self.mapper
    }

    /// The configuration the engine runs against.
    #[must_use]
    pub const fn config(&self) -> &Config {
        self.config
    }

    /// Display `path` with the home directory shortened to `~`.
    #[must_use]
    pub fn tilde(&self, path: &Path) -> String {
        path.strip_prefix(&self.config.home).map_or_else(
            |_| path.display().to_string(),
            |rel| format!("~/{}", rel.display()),
        )
    }

    fn backup(&self, path: &Path, backups: &mut Vec<BackupRecord>) -> Result<PathBuf, EntryError> {
        let backup = self.backups.backup(path).map_err(|source| EntryError::Backup {
            path: path.to_path_buf(),
            source,
        })?;
        self.log.info(&format!(
            "backed up {} to {}",
            self.tilde(path),
            self.tilde(&backup)
        ));
        backups.push(BackupRecord {
            original: path.to_path_buf(),
            backup: backup.clone(),
        });
        Ok(backup)
    }

    /// Record `step` in `report`, applying it through `apply` when it is a
    /// change and this is not a dry run.
    fn run_step<F>(&self, step: PlannedStep, report: &mut RunReport, apply: F)
    where
        F: FnOnce(&Self, &PlannedStep, &mut Vec<BackupRecord>) -> Result<(), EntryError>,
    {
        let name = self.tilde(&step.home);
        let action = format!("{} {name} -> {}", step.decision, step.repo.display());
        match step.decision.category() {
            Category::NoOp => {
                self.log.debug(&format!("{name}: already ok"));
                self.log.record(&name, EntryStatus::Unchanged, None);
            }
            Category::Change if report.plan.dry_run => {
                let mut message = format!("would {action}");
                if step.decision.needs_backup()
                    && let Ok(planned) = self.backups.plan(&step.home)
                {
                    message.push_str(&format!(" (backup: {})", self.tilde(&planned)));
                }
                if step.displaces_repo_copy
                    && let Ok(planned) = self.backups.plan(&step.repo)
                {
                    message.push_str(&format!(" (repository backup: {})", planned.display()));
                }
                self.log.dry_run(&message);
                let decision = step.decision.to_string();
                self.log.record(&name, EntryStatus::DryRun, Some(&decision));
            }
            Category::Change => match apply(self, &step, &mut report.backups) {
                Ok(()) => {
                    self.log.info(&action);
                    let decision = step.decision.to_string();
                    self.log.record(&name, EntryStatus::Changed, Some(&decision));
                }
                Err(e) => self.fail(&name, e, report),
            },
            Category::Conflict | Category::PermissionDenied | Category::Error => {
                if let Some(e) = EntryError::from_decision(&step.home, &step.decision) {
                    self.fail(&name, e, report);
                }
            }
        }
        report.plan.steps.push(step);
    }

    fn fail(&self, name: &str, error: EntryError, report: &mut RunReport) {
        let detail = error.detail();
        if matches!(error, EntryError::Conflict { .. }) {
            self.log.warn(&format!("{name}: {detail}"));
            self.log.record(name, EntryStatus::Conflict, Some(&detail));
        } else {
            self.log.error(&format!("{name}: {detail}"));
            self.log.record(name, EntryStatus::Failed, Some(&detail));
        }
        report.failures.push(error);
    }
}

/// Create missing parents of `step.home`, then the symlink to `step.repo`.
fn link(step: &PlannedStep) -> anyhow::Result<()> {
    ensure_parent_dir(&step.home)?;
    create_symlink(&step.repo, &step.home)
}
