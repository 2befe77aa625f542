//! Core logging types: entry records, status, and the [`Log`] trait.

/// Per-entry result for summary reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRecord {
    /// Home path (or repository name) the record is about.
    pub name: String,
    /// Final status of the entry.
    pub status: EntryStatus,
    /// Optional detail (decision taken, conflict reason, backup path).
    pub message: Option<String>,
}

/// Status of a processed entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryStatus {
    /// The filesystem was changed.
    Changed,
    /// Already in the desired state.
    Unchanged,
    /// A change was planned but not applied.
    DryRun,
    /// Blocked by existing content.
    Conflict,
    /// Failed for any other reason.
    Failed,
}

impl EntryStatus {
    /// Whether this status makes the run fail.
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(self, Self::Conflict | Self::Failed)
    }
}

/// Abstraction over logging backends.
///
/// The engine logs through this trait so that commands can route its output
/// to the console ([`Logger::new`](super::Logger::new)) or keep it at debug
/// level ([`Logger::quiet`](super::Logger::quiet)).
pub trait Log: Send + Sync {
    /// Log a stage header (major section).
    fn stage(&self, msg: &str);
    /// Log an informational message.
    fn info(&self, msg: &str);
    /// Log a debug message (may be suppressed on console).
    fn debug(&self, msg: &str);
    /// Log a warning message.
    fn warn(&self, msg: &str);
    /// Log an error message.
    fn error(&self, msg: &str);
    /// Log a dry-run action message.
    fn dry_run(&self, msg: &str);
    /// Record an entry result for the summary.
    fn record(&self, name: &str, status: EntryStatus, message: Option<&str>);
}
