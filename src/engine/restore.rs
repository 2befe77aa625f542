//! `restore`: link every selected repository entry into the home directory.
use anyhow::Context as _;
use std::fs;

use super::enumerate::{self, RepoEntry, Selector};
use super::{Engine, PlannedStep, RunReport, link};
use crate::error::{DotmanError, EntryError};
use crate::fs::{BackupRecord, EntryKind, blocked_ancestor, probe};
use crate::policy::{Category, Decision, Operation, decide};

impl Engine<'_> {
    /// Tracked repository entries, narrowed to those matched by `raw`.
    ///
    /// # Errors
    ///
    /// Returns [`DotmanError::Usage`] if a selector cannot be resolved or
    /// matches nothing, and [`DotmanError::Other`] if the repository cannot
    /// be read.
    pub fn select(&self, raw: &[String]) -> Result<Vec<RepoEntry>, DotmanError> {
        let selectors = raw
            .iter()
            .map(|r| Selector::parse(r, &self.mapper, &self.config.root))
            .collect::<Result<Vec<_>, _>>()?;
        let entries = enumerate::tracked_entries(&self.config.root, &self.config.ignore)?;
        Ok(enumerate::select(entries, &selectors)?)
    }

    /// Link `entries` into the home directory.
    ///
    /// Each entry is probed and, unless `dry_run`, applied before the next
    /// one is looked at. Existing content is only replaced with `force`, and
    /// then only after it has been backed up.
    #[must_use]
    pub fn restore(&self, entries: &[RepoEntry], force: bool, dry_run: bool) -> RunReport {
        let mut report = RunReport::new(Operation::Restore, dry_run);
        for entry in entries {
            let home = match self.mapper.to_home(&entry.rel) {
                Ok(home) => home,
                Err(source) => {
                    let name = entry.rel.display().to_string();
                    let error = EntryError::Configuration {
                        entry: name.clone(),
                        source,
                    };
                    self.fail(&name, error, &mut report);
                    continue;
                }
            };
            let repo = self.config.root.join(&entry.rel);

            let mut decision = decide(Operation::Restore, &probe(&home, &repo), force);
            if decision == Decision::ReplaceEmptyDirThenLink && entry.kind == EntryKind::File {
                // an empty directory only stands in for a directory entry
                decision = if force {
                    Decision::BackupThenLink
                } else {
                    Decision::Conflict(
                        "empty directory in the way of a file (use --force to back it up)"
                            .to_string(),
                    )
                };
            }
            if decision.category() == Category::Change
                && let Some(blocker) = blocked_ancestor(&home)
            {
                decision =
                    Decision::Conflict(format!("{} is not a directory", self.tilde(&blocker)));
            }

            let step = PlannedStep {
                home,
                repo,
                kind: entry.kind,
                decision,
                displaces_repo_copy: false,
            };
            self.run_step(step, &mut report, Self::apply_restore);
        }
        report
    }

    fn apply_restore(
        &self,
        step: &PlannedStep,
        backups: &mut Vec<BackupRecord>,
    ) -> Result<(), EntryError> {
        match step.decision {
            Decision::ReplaceEmptyDirThenLink => {
                fs::remove_dir(&step.home)
                    .with_context(|| format!("removing empty directory {}", step.home.display()))
                    .map_err(|e| EntryError::from_failure(&step.home, &e))?;
            }
            Decision::BackupThenLink => {
                self.backup(&step.home, backups)?;
            }
            _ => {}
        }
        link(step).map_err(|e| EntryError::from_failure(&step.home, &e))
    }
}
