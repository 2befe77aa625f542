//! `unstow`: replace a managed symlink with a real copy of its content.
use std::fs;
use std::path::Path;

use super::{Engine, PlannedStep, RunReport};
use crate::error::{EntryError, UsageError};
use crate::fs::helpers::copy_into_place;
use crate::fs::{EntryKind, ProbeResult, probe};
use crate::mapping::lexical_normalize;
use crate::policy::{Decision, Operation, decide};

impl Engine<'_> {
    /// Unstow the symlink at `home_path`. The repository copy is kept.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Unmappable`] if `home_path` has no repository
    /// counterpart.
    pub fn unstow(&self, home_path: &Path, dry_run: bool) -> Result<RunReport, UsageError> {
        let home = lexical_normalize(home_path);
        let rel = self
            .mapper
            .try_to_repo(&home)
            .map_err(|source| UsageError::Unmappable {
                path: home.clone(),
                source,
            })?;
        let repo = self.config.root.join(rel);

        let mut decision = decide(Operation::Unstow, &probe(&home, &repo), false);
        let kind = match fs::metadata(&repo) {
            Ok(meta) => EntryKind::of(&meta),
            Err(_) => {
                if decision == Decision::RestoreOriginal {
                    decision = Decision::Error(format!(
                        "repository content {} is missing",
                        repo.display()
                    ));
                }
                EntryKind::File
            }
        };

        let mut report = RunReport::new(Operation::Unstow, dry_run);
        let step = PlannedStep {
            home,
            repo,
            kind,
            decision,
            displaces_repo_copy: false,
        };
        self.run_step(step, &mut report, |_, step, _| apply_unstow(step));
        Ok(report)
    }
}

fn apply_unstow(step: &PlannedStep) -> Result<(), EntryError> {
    if !matches!(probe(&step.home, &step.repo), ProbeResult::SymlinkToManagedRepo) {
        return Err(EntryError::Conflict {
            path: step.home.clone(),
            reason: "link changed after it was inspected".to_string(),
        });
    }
    copy_into_place(&step.repo, &step.home).map_err(|e| EntryError::from_failure(&step.home, &e))
}
