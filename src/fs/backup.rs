//! Timestamped backups of content that is about to be replaced.
//!
//! A backup is a sibling named `<path>.bak.<YYYYmmdd-HHMMSS>`, with `.1`,
//! `.2`, ... appended when that name is taken. The timestamp is fixed when
//! the manager is created, so every backup of one run shares it. Backups are
//! never removed by this crate.
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;

use super::helpers::{RelocateStrategy, relocate};

/// `strftime` format of the backup timestamp.
pub const STAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

const MAX_ATTEMPTS: u32 = 10_000;

/// Errors raised while backing up a path. The original is untouched.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BackupError {
    /// The path vanished before it could be backed up.
    #[error("nothing to back up at {}", .0.display())]
    Missing(PathBuf),

    /// Every candidate name was already taken.
    #[error("no free backup name for {} after {attempts} attempts", path.display())]
    Exhausted {
        /// Path that was to be backed up.
        path: PathBuf,
        /// Number of names tried.
        attempts: u32,
    },

    /// Moving or copying the content failed.
    #[error("backing up {}: {message}", path.display())]
    Io {
        /// Path that was to be backed up.
        path: PathBuf,
        /// Underlying failure with its context chain.
        message: String,
    },
}

/// A completed backup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupRecord {
    /// Where the content used to live.
    pub original: PathBuf,
    /// Where it lives now.
    pub backup: PathBuf,
}

/// Creates backups that share one timestamp per run.
#[derive(Debug, Clone)]
pub struct BackupManager {
    stamp: String,
    strategy: RelocateStrategy,
}

impl Default for BackupManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BackupManager {
    /// Create a manager stamped with the current local time.
    #[must_use]
    pub fn new() -> Self {
        Self::with_stamp(Local::now().format(STAMP_FORMAT).to_string())
    }

    /// Create a manager with an explicit stamp.
    #[must_use]
    pub fn with_stamp(stamp: impl Into<String>) -> Self {
        Self {
            stamp: stamp.into(),
            strategy: RelocateStrategy::default(),
        }
    }

    /// Override how content is moved to its backup path.
    #[must_use]
    pub const fn with_strategy(mut self, strategy: RelocateStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// The timestamp shared by this run's backups.
    #[must_use]
    pub fn stamp(&self) -> &str {
        &self.stamp
    }

    /// The strategy used to move content.
    #[must_use]
    pub const fn strategy(&self) -> RelocateStrategy {
        self.strategy
    }

    /// The name a backup of `path` would get right now, without touching
    /// anything.
    ///
    /// # Errors
    ///
    /// Returns [`BackupError::Exhausted`] if no free name is found.
    pub fn plan(&self, path: &Path) -> Result<PathBuf, BackupError> {
        let mut base = OsString::from(path.as_os_str());
        base.push(format!(".bak.{}", self.stamp));
        let base = PathBuf::from(base);
        if base.symlink_metadata().is_err() {
            return Ok(base);
        }
        for n in 1..MAX_ATTEMPTS {
            let mut candidate = OsString::from(base.as_os_str());
            candidate.push(format!(".{n}"));
            let candidate = PathBuf::from(candidate);
            if candidate.symlink_metadata().is_err() {
                return Ok(candidate);
            }
        }
        Err(BackupError::Exhausted {
            path: path.to_path_buf(),
            attempts: MAX_ATTEMPTS,
        })
    }

    /// Move whatever is at `path` (file, directory, or symlink) to a fresh
    /// backup name and return that name.
    ///
    /// # Errors
    ///
    /// Returns a [`BackupError`] if `path` is gone, no name is free, or the
    /// move fails. In every error case `path` is left as it was.
    pub fn backup(&self, path: &Path) -> Result<PathBuf, BackupError> {
        if path.symlink_metadata().is_err() {
            return Err(BackupError::Missing(path.to_path_buf()));
        }
        let dest = self.plan(path)?;
        relocate(path, &dest, self.strategy).map_err(|e| BackupError::Io {
            path: path.to_path_buf(),
            message: format!("{e:#}"),
        })?;
        Ok(dest)
    }
}
