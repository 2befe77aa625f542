//! Filesystem layer: probing, backups, symlinks, and content digests.

pub mod backup;
pub mod digest;
pub mod helpers;
pub mod link;
pub mod probe;

pub use backup::{BackupError, BackupManager, BackupRecord};
pub use helpers::RelocateStrategy;
pub use probe::{EntryKind, ProbeResult, blocked_ancestor, probe};
