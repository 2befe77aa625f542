//! Structured logger with dry-run awareness and summary collection.
use std::path::PathBuf;
use std::sync::Mutex;

use super::subscriber::{DRY_RUN_TARGET, STAGE_TARGET};
use super::types::{EntryRecord, EntryStatus, Log};
use super::utils::log_file_path;

/// Implement the display methods of [`Log`] by delegating to inherent methods
/// of the same name on the implementing type.
macro_rules! forward_log_methods {
    ($($method:ident),+ $(,)?) => {
        $(
            fn $method(&self, msg: &str) {
                self.$method(msg);
            }
        )+
    };
}

/// Structured logger with dry-run awareness and summary collection.
///
/// Messages go through [`tracing`]; the subscriber installed by
/// [`init_subscriber`](super::init_subscriber) decides where they land.
#[derive(Debug)]
pub struct Logger {
    entries: Mutex<Vec<EntryRecord>>,
    log_file: Option<PathBuf>,
    quiet: bool,
}

impl Logger {
    /// Create a logger for `command`.
    ///
    /// Stores the log file path for display in the run summary; the file
    /// itself is written by the subscriber's file layer.
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: log_file_path(command),
            quiet: false,
        }
    }

    /// Create a logger that demotes every message to DEBUG.
    ///
    /// Used for nested runs whose output is summarised by the caller.
    #[must_use]
    pub const fn quiet() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: None,
            quiet: true,
        }
    }

    #[cfg(test)]
    pub(crate) const fn with_log_file(path: PathBuf) -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            log_file: Some(path),
            quiet: false,
        }
    }

    /// Return the log file path, if available.
    #[must_use]
    pub const fn log_path(&self) -> Option<&PathBuf> {
        self.log_file.as_ref()
    }

    /// Log an error message.
    pub fn error(&self, msg: &str) {
        if self.quiet {
            tracing::debug!("error: {msg}");
        } else {
            tracing::error!("{msg}");
        }
    }

    /// Log a warning message.
    pub fn warn(&self, msg: &str) {
        if self.quiet {
            tracing::debug!("warning: {msg}");
        } else {
            tracing::warn!("{msg}");
        }
    }

    /// Log a stage header (major section).
    pub fn stage(&self, msg: &str) {
        if self.quiet {
            tracing::debug!("stage: {msg}");
        } else {
            tracing::info!(target: STAGE_TARGET, "{msg}");
        }
    }

    /// Log an informational message.
    pub fn info(&self, msg: &str) {
        if self.quiet {
            tracing::debug!("{msg}");
        } else {
            tracing::info!("{msg}");
        }
    }

    /// Log a debug message (suppressed on console unless verbose).
    pub fn debug(&self, msg: &str) {
        tracing::debug!("{msg}");
    }

    /// Log a dry-run action message.
    pub fn dry_run(&self, msg: &str) {
        if self.quiet {
            tracing::debug!("would: {msg}");
        } else {
            tracing::info!(target: DRY_RUN_TARGET, "{msg}");
        }
    }

    /// Record an entry result for the summary.
    pub fn record(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        if let Ok(mut guard) = self.entries.lock() {
            guard.push(EntryRecord {
                name: name.to_string(),
                status,
                message: message.map(String::from),
            });
        }
    }

    /// Return a copy of every recorded entry.
    #[must_use]
    pub fn entries(&self) -> Vec<EntryRecord> {
        self.entries.lock().map_or_else(|_| vec![], |g| g.clone())
    }

    /// Count the entries that conflicted or failed.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.entries.lock().map_or(0, |guard| {
            guard.iter().filter(|e| e.status.is_failure()).count()
        })
    }

    /// Log the summary of all recorded entries.
    pub fn print_summary(&self) {
        let entries = self.entries();
        if entries.is_empty() {
            return;
        }

        self.stage("Summary");

        let mut changed = 0u32;
        let mut unchanged = 0u32;
        let mut dry_run = 0u32;
        let mut conflict = 0u32;
        let mut failed = 0u32;

        for entry in &entries {
            let (icon, color) = match entry.status {
                EntryStatus::Changed => {
                    changed += 1;
                    ("✓", "\x1b[32m")
                }
                EntryStatus::Unchanged => {
                    unchanged += 1;
                    ("·", "\x1b[2m")
                }
                EntryStatus::DryRun => {
                    dry_run += 1;
                    ("~", "\x1b[37m")
                }
                EntryStatus::Conflict => {
                    conflict += 1;
                    ("!", "\x1b[33m")
                }
                EntryStatus::Failed => {
                    failed += 1;
                    ("✗", "\x1b[31m")
                }
            };

            let suffix = entry
                .message
                .as_ref()
                .map_or_else(String::new, |msg| format!(" ({msg})"));

            self.info(&format!("{color}{icon} {}{suffix}\x1b[0m", entry.name));
        }

        let total = changed + unchanged + dry_run + conflict + failed;
        self.info(&format!(
            "{total} entries: \x1b[32m{changed} changed\x1b[0m, \x1b[2m{unchanged} already ok\x1b[0m, \x1b[37m{dry_run} dry-run\x1b[0m, \x1b[33m{conflict} conflict\x1b[0m, \x1b[31m{failed} failed\x1b[0m"
        ));

        if let Some(path) = &self.log_file {
            self.info(&format!("\x1b[2mlog: {}\x1b[0m", path.display()));
        }
    }
}

impl Log for Logger {
    forward_log_methods!(stage, info, debug, warn, error, dry_run);

    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>) {
        self.record(name, status, message);
    }
}
