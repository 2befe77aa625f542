//! Read-only inspection of a home-directory path.
//!
//! [`probe`] classifies what currently lives at a path relative to the
//! repository entry it should link to. It never mutates and never fails:
//! every I/O problem becomes [`ProbeResult::Unreadable`].
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::mapping::lexical_normalize;

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryKind {
    /// A regular file (or anything that is not a directory).
    File,
    /// A directory.
    Directory,
}

impl EntryKind {
    /// Classify from metadata.
    #[must_use]
    pub fn of(meta: &fs::Metadata) -> Self {
        if meta.is_dir() {
            Self::Directory
        } else {
            Self::File
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File => f.write_str("file"),
            Self::Directory => f.write_str("directory"),
        }
    }
}

/// What currently occupies a home path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeResult {
    /// Nothing exists at the path.
    Absent,
    /// Real content that is not the repository entry.
    RegularContent {
        /// File or directory.
        kind: EntryKind,
        /// `true` only for a directory with no entries.
        empty: bool,
    },
    /// A symlink pointing exactly at the expected repository path.
    SymlinkToManagedRepo,
    /// Not a symlink itself, but already the repository entry (reached
    /// through a linked parent directory, or a hard link).
    ResolvesToRepo,
    /// A symlink pointing anywhere else, dangling or not.
    SymlinkElsewhere {
        /// The raw link target.
        points_to: PathBuf,
    },
    /// The path could not be inspected.
    Unreadable {
        /// Why inspection failed.
        reason: String,
    },
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("absent"),
            Self::RegularContent { kind, empty: true } => write!(f, "empty {kind}"),
            Self::RegularContent { kind, empty: false } => write!(f, "existing {kind}"),
            Self::SymlinkToManagedRepo => f.write_str("already linked"),
            Self::ResolvesToRepo => f.write_str("already resolves to the repository"),
            Self::SymlinkElsewhere { points_to } => {
                write!(f, "symlink to {}", points_to.display())
            }
            Self::Unreadable { reason } => write!(f, "unreadable: {reason}"),
        }
    }
}

/// Inspect `path` against the repository path it is expected to link to.
///
/// Symlinks are read one hop only. A relative target is resolved against
/// the link's parent directory before comparison.
#[must_use]
pub fn probe(path: &Path, expected: &Path) -> ProbeResult {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if is_missing(&e) => return ProbeResult::Absent,
        Err(e) => {
            return ProbeResult::Unreadable {
                reason: e.to_string(),
            };
        }
    };

    if meta.file_type().is_symlink() {
        return match fs::read_link(path) {
            Ok(points_to) => {
                let resolved = resolve_link_target(path, &points_to);
                if same_location(&resolved, expected) {
                    ProbeResult::SymlinkToManagedRepo
                } else {
                    ProbeResult::SymlinkElsewhere { points_to }
                }
            }
            Err(e) => ProbeResult::Unreadable {
                reason: e.to_string(),
            },
        };
    }

    if is_same_entry(path, &meta, expected) {
        return ProbeResult::ResolvesToRepo;
    }

    let kind = EntryKind::of(&meta);
    let empty = match kind {
        EntryKind::File => false,
        EntryKind::Directory => match fs::read_dir(path) {
            Ok(mut entries) => entries.next().is_none(),
            Err(e) => {
                return ProbeResult::Unreadable {
                    reason: e.to_string(),
                };
            }
        },
    };
    ProbeResult::RegularContent { kind, empty }
}

/// The nearest ancestor of `path` that exists but cannot hold children.
///
/// A regular file (or dangling symlink) where a parent directory is needed
/// makes linking impossible; this reports it before anything is touched.
#[must_use]
pub fn blocked_ancestor(path: &Path) -> Option<PathBuf> {
    for ancestor in path.ancestors().skip(1) {
        if ancestor.as_os_str().is_empty() {
            break;
        }
        match fs::metadata(ancestor) {
            Ok(meta) if meta.is_dir() => return None,
            Ok(_) => return Some(ancestor.to_path_buf()),
            Err(e) if is_missing(&e) => {
                if ancestor.symlink_metadata().is_ok() {
                    return Some(ancestor.to_path_buf());
                }
            }
            Err(_) => return None,
        }
    }
    None
}

/// Absolute location a symlink at `link` with raw target `points_to` refers to.
#[must_use]
pub fn resolve_link_target(link: &Path, points_to: &Path) -> PathBuf {
    if points_to.is_absolute() {
        lexical_normalize(points_to)
    } else {
        let parent = link.parent().unwrap_or_else(|| Path::new(""));
        lexical_normalize(&parent.join(points_to))
    }
}

fn is_missing(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::NotFound | io::ErrorKind::NotADirectory
    )
}

/// Compare two locations lexically, then with their parents canonicalized.
///
/// The final component is never resolved, so a link *to* a symlink is not
/// confused with a link to what that symlink points at.
fn same_location(a: &Path, b: &Path) -> bool {
    let (a, b) = (lexical_normalize(a), lexical_normalize(b));
    if a == b {
        return true;
    }
    match (canonical_parent(&a), canonical_parent(&b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn canonical_parent(path: &Path) -> Option<PathBuf> {
    let name = path.file_name()?;
    let parent = dunce::canonicalize(path.parent()?).ok()?;
    Some(parent.join(name))
}

fn is_same_entry(path: &Path, meta: &fs::Metadata, expected: &Path) -> bool {
    if let (Ok(a), Ok(b)) = (dunce::canonicalize(path), dunce::canonicalize(expected))
        && a == b
    {
        return true;
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::MetadataExt as _;
        if let Ok(other) = fs::metadata(expected) {
            return meta.dev() == other.dev() && meta.ino() == other.ino();
        }
    }
    #[cfg(not(unix))]
    let _ = meta;
    false
}
