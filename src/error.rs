//! Domain-specific error types.
//!
//! Helpers return [`anyhow::Result`] with path context; the engine turns
//! per-entry failures into [`EntryError`] rows so one bad entry never stops
//! the rest, and commands surface run-level problems as [`DotmanError`].
//!
//! # Error hierarchy
//!
//! ```text
//! DotmanError                 (process exit code)
//! ├── Config(ConfigError)     home/root resolution, .dotman.toml      → 2
//! ├── Usage(UsageError)       unmappable paths, empty selections      → 2
//! └── Other(anyhow::Error)    anything unexpected                     → 1
//!
//! EntryError                  one row per failed entry                → 1
//! ├── Configuration           bad repository name encoding
//! ├── Conflict                existing content, no --force
//! ├── Permission              probe or mutation denied
//! ├── Backup                  backup failed, original untouched
//! ├── Io                      any other mutation failure
//! └── Invalid                 operation makes no sense for the path
//! ```
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::fs::BackupError;
use crate::mapping::MappingError;
use crate::policy::Decision;

/// Top-level error returned by commands.
#[derive(Error, Debug)]
pub enum DotmanError {
    /// Home or repository could not be resolved, or the repository config is bad.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Arguments that cannot be acted on.
    #[error("usage error: {0}")]
    Usage(#[from] UsageError),

    /// Anything else.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DotmanError {
    /// Process exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::Usage(_) => 2,
            Self::Other(_) => 1,
        }
    }
}

/// Errors resolving the home directory, the repository, or its config file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// No repository root could be found.
    #[error("dotfiles repository not found (tried {0}); pass --root or set DOTMAN_ROOT")]
    MissingRoot(String),

    /// No home directory could be determined.
    #[error("home directory not found; pass --home or set HOME")]
    MissingHome,

    /// A directory that must exist does not.
    #[error("{what} is not a directory: {}", path.display())]
    NotADirectory {
        /// Which directory (home or repository).
        what: &'static str,
        /// The offending path.
        path: PathBuf,
    },

    /// The config file could not be parsed.
    #[error("invalid TOML in {file}: {message}")]
    InvalidSyntax {
        /// Config file path.
        file: String,
        /// Parser message.
        message: String,
    },

    /// An I/O error occurred while reading a config file.
    #[error("IO error reading config file {path}: {source}")]
    Io {
        /// Path to the file that could not be read.
        path: String,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Arguments that cannot be acted on. Raised before anything is mutated.
#[derive(Error, Debug)]
pub enum UsageError {
    /// A home path that has no repository counterpart.
    #[error("cannot manage {}: {source}", path.display())]
    Unmappable {
        /// The path as resolved.
        path: PathBuf,
        /// Why the mapping refused it.
        source: MappingError,
    },

    /// A restore selector that matches no tracked entry.
    #[error("'{0}' does not match any tracked entry")]
    NoMatch(String),
}

/// One failed entry of a run.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    /// The repository name does not follow the mapping conventions.
    #[error("{entry}: {source}")]
    Configuration {
        /// Repository-relative name.
        entry: String,
        /// Mapping failure.
        source: MappingError,
    },

    /// Existing content is in the way.
    #[error("{}: conflict: {reason}", path.display())]
    Conflict {
        /// Affected home path.
        path: PathBuf,
        /// What is in the way.
        reason: String,
    },

    /// Inspection or mutation was denied.
    #[error("{}: permission denied: {reason}", path.display())]
    Permission {
        /// Affected path.
        path: PathBuf,
        /// Underlying message.
        reason: String,
    },

    /// The backup step failed; nothing else was attempted.
    #[error("{}: {source}", path.display())]
    Backup {
        /// Affected home path.
        path: PathBuf,
        /// Backup failure.
        source: BackupError,
    },

    /// Any other mutation failure.
    #[error("{}: {message}", path.display())]
    Io {
        /// Affected path.
        path: PathBuf,
        /// Failure with its context chain.
        message: String,
    },

    /// The operation does not apply to this path.
    #[error("{}: {reason}", path.display())]
    Invalid {
        /// Affected path.
        path: PathBuf,
        /// Why.
        reason: String,
    },
}

impl EntryError {
    /// The error row for a failing decision, if it is one.
    #[must_use]
    pub fn from_decision(path: &Path, decision: &Decision) -> Option<Self> {
        let path = path.to_path_buf();
        match decision {
            Decision::Conflict(reason) => Some(Self::Conflict {
                path,
                reason: reason.clone(),
            }),
            Decision::PermissionDenied(reason) => Some(Self::Permission {
                path,
                reason: reason.clone(),
            }),
            Decision::Error(reason) => Some(Self::Invalid {
                path,
                reason: reason.clone(),
            }),
            _ => None,
        }
    }

    /// Classify a mutation failure, keeping permission problems distinct.
    #[must_use]
    pub fn from_failure(path: &Path, err: &anyhow::Error) -> Self {
        let denied = err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<io::Error>())
            .any(|e| e.kind() == io::ErrorKind::PermissionDenied);
        if denied {
            Self::Permission {
                path: path.to_path_buf(),
                reason: format!("{err:#}"),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                message: format!("{err:#}"),
            }
        }
    }

    /// The message without the leading path.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Configuration { source, .. } => source.to_string(),
            Self::Conflict { reason, .. } => format!("conflict: {reason}"),
            Self::Permission { reason, .. } => format!("permission denied: {reason}"),
            Self::Backup { source, .. } => source.to_string(),
            Self::Io { message, .. } => message.clone(),
            Self::Invalid { reason, .. } => reason.clone(),
        }
    }

    /// Short label used in summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "configuration",
            Self::Conflict { .. } => "conflict",
            Self::Permission { .. } => "permission",
            Self::Backup { .. } => "backup",
            Self::Io { .. } => "io",
            Self::Invalid { .. } => "invalid",
        }
    }
}
