//! Conflict policy: what to do with a probed home path.
//!
//! [`decide`] is a pure function of the operation, the probe result, and
//! `--force`. Nothing is ever overwritten without `--force`, and `--force`
//! only ever turns a conflict into a backup.
use std::fmt;

use crate::fs::ProbeResult;

/// The reconciliation being performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Link repository entries into the home directory.
    Restore,
    /// Move live content into the repository and link it back.
    Adopt,
    /// Replace a managed symlink with a real copy of its content.
    Unstow,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Restore => "restore",
            Self::Adopt => "adopt",
            Self::Unstow => "unstow",
        })
    }
}

/// Per-entry decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Create the symlink.
    Link,
    /// Remove an empty placeholder directory, then link.
    ReplaceEmptyDirThenLink,
    /// Already in the desired state.
    NoOp,
    /// Back up what is there, then link.
    BackupThenLink,
    /// Move the live content into the repository, then link.
    MoveIntoRepoThenLink,
    /// Back up a stray symlink, bring its content into the repository, then link.
    BackupThenMoveThenLink,
    /// Replace the managed symlink with a copy of the repository content.
    RestoreOriginal,
    /// Existing content is in the way and `--force` was not given.
    Conflict(String),
    /// The path could not be inspected or changed for lack of permission.
    PermissionDenied(String),
    /// The operation makes no sense for this path.
    Error(String),
}

/// Coarse grouping of decisions for counting and exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    /// The step changes the filesystem.
    Change,
    /// Nothing to do.
    NoOp,
    /// Blocked by existing content.
    Conflict,
    /// Blocked by permissions.
    PermissionDenied,
    /// Invalid for this path.
    Error,
}

impl Category {
    /// Whether entries of this category make the run fail.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Conflict | Self::PermissionDenied | Self::Error)
    }
}

impl Decision {
    /// Group this decision for summaries.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Link
            | Self::ReplaceEmptyDirThenLink
            | Self::BackupThenLink
            | Self::MoveIntoRepoThenLink
            | Self::BackupThenMoveThenLink
            | Self::RestoreOriginal => Category::Change,
            Self::NoOp => Category::NoOp,
            Self::Conflict(_) => Category::Conflict,
            Self::PermissionDenied(_) => Category::PermissionDenied,
            Self::Error(_) => Category::Error,
        }
    }

    /// Whether carrying out this decision creates a backup.
    #[must_use]
    pub const fn needs_backup(&self) -> bool {
        matches!(self, Self::BackupThenLink | Self::BackupThenMoveThenLink)
    }

    /// The reason attached to a failing decision.
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Conflict(r) | Self::PermissionDenied(r) | Self::Error(r) => Some(r),
            _ => None,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Link => f.write_str("link"),
            Self::ReplaceEmptyDirThenLink => f.write_str("replace empty directory and link"),
            Self::NoOp => f.write_str("already ok"),
            Self::BackupThenLink => f.write_str("back up and link"),
            Self::MoveIntoRepoThenLink => f.write_str("move into repository and link"),
            Self::BackupThenMoveThenLink => {
                f.write_str("back up link, copy target into repository and link")
            }
            Self::RestoreOriginal => f.write_str("replace link with a copy"),
            Self::Conflict(r) => write!(f, "conflict: {r}"),
            Self::PermissionDenied(r) => write!(f, "permission denied: {r}"),
            Self::Error(r) => write!(f, "error: {r}"),
        }
    }
}

/// Decide what `operation` should do with a path in state `probe`.
#[must_use]
pub fn decide(operation: Operation, probe: &ProbeResult, force: bool) -> Decision {
    if let ProbeResult::Unreadable { reason } = probe {
        return Decision::PermissionDenied(reason.clone());
    }
    match operation {
        Operation::Restore => decide_restore(probe, force),
        Operation::Adopt => decide_adopt(probe, force),
        Operation::Unstow => decide_unstow(probe),
    }
}

fn decide_restore(probe: &ProbeResult, force: bool) -> Decision {
    match probe {
        ProbeResult::Absent => Decision::Link,
        ProbeResult::SymlinkToManagedRepo | ProbeResult::ResolvesToRepo => Decision::NoOp,
        ProbeResult::RegularContent { empty: true, .. } => Decision::ReplaceEmptyDirThenLink,
        ProbeResult::RegularContent { .. } | ProbeResult::SymlinkElsewhere { .. } => {
            if force {
                Decision::BackupThenLink
            } else {
                Decision::Conflict(format!("{probe} in the way (use --force to back it up)"))
            }
        }
        ProbeResult::Unreadable { reason } => Decision::PermissionDenied(reason.clone()),
    }
}

fn decide_adopt(probe: &ProbeResult, force: bool) -> Decision {
    match probe {
        ProbeResult::Absent => Decision::Error("nothing to adopt".to_string()),
        ProbeResult::RegularContent { .. } => Decision::MoveIntoRepoThenLink,
        ProbeResult::SymlinkToManagedRepo | ProbeResult::ResolvesToRepo => Decision::NoOp,
        ProbeResult::SymlinkElsewhere { .. } => {
            if force {
                Decision::BackupThenMoveThenLink
            } else {
                Decision::Conflict(format!("{probe} (use --force to adopt its content)"))
            }
        }
        ProbeResult::Unreadable { reason } => Decision::PermissionDenied(reason.clone()),
    }
}

fn decide_unstow(probe: &ProbeResult) -> Decision {
    match probe {
        ProbeResult::SymlinkToManagedRepo => Decision::RestoreOriginal,
        ProbeResult::Unreadable { reason } => Decision::PermissionDenied(reason.clone()),
        ProbeResult::ResolvesToRepo => Decision::Conflict(
            "reached through a linked parent directory; unstow that directory instead"
                .to_string(),
        ),
        other => Decision::Conflict(format!("not a symlink into the repository ({other})")),
    }
}
