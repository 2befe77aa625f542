//! Plans and reports produced by a reconciliation run.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;

use crate::error::EntryError;
use crate::fs::{BackupRecord, EntryKind};
use crate::policy::{Category, Decision, Operation};

/// One decided entry of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedStep {
    /// Home path the step acts on.
    pub home: PathBuf,
    /// Absolute repository path it links to.
    pub repo: PathBuf,
    /// File or directory.
    pub kind: EntryKind,
    /// What the run does (or would do) with it.
    pub decision: Decision,
    /// Adopt only: an existing repository copy is backed up first.
    pub displaces_repo_copy: bool,
}

/// Ordered steps of one run. In dry-run mode this is the whole output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationPlan {
    /// The reconciliation performed.
    pub operation: Operation,
    /// Whether mutations were suppressed.
    pub dry_run: bool,
    /// Decided entries, in processing order.
    pub steps: Vec<PlannedStep>,
}

impl OperationPlan {
    /// An empty plan.
    #[must_use]
    pub const fn new(operation: Operation, dry_run: bool) -> Self {
        Self {
            operation,
            dry_run,
            steps: Vec::new(),
        }
    }

    /// Number of steps per decision category.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for step in &self.steps {
            *counts.entry(step.decision.category()).or_insert(0) += 1;
        }
        counts
    }

    /// Number of steps in `category`.
    #[must_use]
    pub fn count(&self, category: Category) -> usize {
        self.steps
            .iter()
            .filter(|s| s.decision.category() == category)
            .count()
    }

    /// One-line summary such as `restore: 2 to change, 1 already ok, 1 conflict`.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut out = format!("{}:", self.operation);
        let change = self.count(Category::Change);
        let noop = self.count(Category::NoOp);
        write!(out, " {change} to change, {noop} already ok").unwrap_or(());
        for (category, label) in [
            (Category::Conflict, "conflict"),
            (Category::PermissionDenied, "permission denied"),
            (Category::Error, "error"),
        ] {
            let n = self.count(category);
            if n > 0 {
                write!(out, ", {n} {label}").unwrap_or(());
            }
        }
        if self.dry_run {
            out.push_str(" (dry run)");
        }
        out
    }
}

/// Outcome of a run: the plan, every per-entry failure, and every backup.
#[derive(Debug, Clone)]
pub struct RunReport {
    /// What was decided for each entry.
    pub plan: OperationPlan,
    /// Failures in processing order, with per-path detail.
    pub failures: Vec<EntryError>,
    /// Backups created (never in dry-run).
    pub backups: Vec<BackupRecord>,
}

impl RunReport {
    /// An empty report.
    #[must_use]
    pub const fn new(operation: Operation, dry_run: bool) -> Self {
        Self {
            plan: OperationPlan::new(operation, dry_run),
            failures: Vec::new(),
            backups: Vec::new(),
        }
    }

    /// `true` when no entry conflicted or failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}
