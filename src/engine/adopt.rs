//! `adopt`: move live content into the repository and link it back.
//!
//! The content is moved before the link is created. A failure after the
//! move leaves the content in the repository, where a later `restore`
//! links it back.
use anyhow::Context as _;
use std::fs;
use std::path::Path;

use super::{Engine, PlannedStep, RunReport, link};
use crate::error::{EntryError, UsageError};
use crate::fs::helpers::{copy_tree, ensure_parent_dir, relocate, remove_entry};
use crate::fs::probe::resolve_link_target;
use crate::fs::{BackupRecord, EntryKind, ProbeResult, blocked_ancestor, probe};
use crate::mapping::lexical_normalize;
use crate::policy::{Category, Decision, Operation, decide};

impl Engine<'_> {
    /// Adopt the live content at `home_path`.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Unmappable`] if `home_path` has no repository
    /// counterpart. Nothing is touched in that case.
    pub fn adopt(
        &self,
        home_path: &Path,
        force: bool,
        dry_run: bool,
    ) -> Result<RunReport, UsageError> {
        let home = lexical_normalize(home_path);
        let rel = self
            .mapper
            .try_to_repo(&home)
            .map_err(|source| UsageError::Unmappable {
                path: home.clone(),
                source,
            })?;
        let repo = self.config.root.join(rel);

        let probed = probe(&home, &repo);
        let kind = match &probed {
            ProbeResult::RegularContent { kind, .. } => *kind,
            _ => fs::metadata(&home).map_or(EntryKind::File, |m| EntryKind::of(&m)),
        };
        let mut decision = decide(Operation::Adopt, &probed, force);
        let mut displaces_repo_copy = false;
        if decision.category() == Category::Change {
            match self.repository_side(&home, &repo, &probed, force) {
                Ok(displaces) => displaces_repo_copy = displaces,
                Err(refused) => decision = refused,
            }
        }

        let mut report = RunReport::new(Operation::Adopt, dry_run);
        let step = PlannedStep {
            home,
            repo,
            kind,
            decision,
            displaces_repo_copy,
        };
        self.run_step(step, &mut report, Self::apply_adopt);
        Ok(report)
    }

    /// Check that the content can land at `repo`.
    ///
    /// `Ok(true)` means an existing repository copy will be backed up first.
    fn repository_side(
        &self,
        home: &Path,
        repo: &Path,
        probed: &ProbeResult,
        force: bool,
    ) -> Result<bool, Decision> {
        let root = &self.config.root;
        if home.starts_with(root) || dunce::canonicalize(home).is_ok_and(|h| h.starts_with(root)) {
            return Err(Decision::Error("already inside the repository".to_string()));
        }
        if root.starts_with(home) {
            return Err(Decision::Error("contains the repository".to_string()));
        }
        if let Some(blocker) = blocked_ancestor(repo) {
            return Err(Decision::Conflict(format!(
                "{} is not a directory",
                blocker.display()
            )));
        }
        if let ProbeResult::SymlinkElsewhere { points_to } = probed {
            let target = resolve_link_target(home, points_to);
            if fs::metadata(&target).is_err() {
                return Err(Decision::Error(format!(
                    "link target {} does not exist",
                    target.display()
                )));
            }
        }
        if repo.symlink_metadata().is_ok() {
            if !force {
                return Err(Decision::Conflict(format!(
                    "{} already exists in the repository (use --force to back it up)",
                    repo.display()
                )));
            }
            return Ok(true);
        }
        Ok(false)
    }

    fn apply_adopt(
        &self,
        step: &PlannedStep,
        backups: &mut Vec<BackupRecord>,
    ) -> Result<(), EntryError> {
        if step.displaces_repo_copy {
            self.backup(&step.repo, backups)?;
        }
        ensure_parent_dir(&step.repo).map_err(|e| EntryError::from_failure(&step.repo, &e))?;

        match step.decision {
            Decision::MoveIntoRepoThenLink => {
                let degraded = relocate(&step.home, &step.repo, self.backups.strategy())
                    .map_err(|e| EntryError::from_failure(&step.home, &e))?;
                if degraded {
                    self.log.debug(&format!(
                        "{}: copied across devices and verified",
                        self.tilde(&step.home)
                    ));
                }
            }
            Decision::BackupThenMoveThenLink => {
                dunce::canonicalize(&step.home)
                    .with_context(|| format!("resolving link {}", step.home.display()))
                    .and_then(|target| copy_tree(&target, &step.repo))
                    .map_err(|e| {
                        if step.repo.symlink_metadata().is_ok() {
                            remove_entry(&step.repo).ok();
                        }
                        EntryError::from_failure(&step.home, &e)
                    })?;
                if let Err(e) = self.backup(&step.home, backups) {
                    remove_entry(&step.repo).ok();
                    return Err(e);
                }
            }
            _ => {}
        }

        link(step).map_err(|e| EntryError::Io {
            path: step.home.clone(),
            message: format!(
                "{e:#}; the content is safe in {}, run restore to link it",
                step.repo.display()
            ),
        })
    }
}
