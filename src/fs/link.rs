//! Platform symlink primitives.
use anyhow::{Context as _, Result};
use std::fs;
use std::path::Path;

/// Create a symlink at `link` pointing to `target`.
///
/// # Errors
///
/// Returns an error if the link cannot be created (for example because
/// something already exists at `link`).
pub fn create_symlink(target: &Path, link: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(target, link).with_context(|| {
            format!(
                "creating symlink {} -> {}",
                link.display(),
                target.display()
            )
        })?;
    }

    #[cfg(windows)]
    {
        let result = if target.is_dir() {
            std::os::windows::fs::symlink_dir(target, link)
        } else {
            std::os::windows::fs::symlink_file(target, link)
        };
        result.with_context(|| {
            format!(
                "creating symlink {} -> {} (requires developer mode or admin)",
                link.display(),
                target.display()
            )
        })?;
    }

    Ok(())
}

/// Remove the symlink at `path` without touching what it points to.
///
/// Refuses to remove anything that is not a symlink.
///
/// # Errors
///
/// Returns an error if `path` is not a symlink or cannot be removed.
pub fn remove_symlink(path: &Path) -> Result<()> {
    let meta =
        fs::symlink_metadata(path).with_context(|| format!("reading metadata {}", path.display()))?;
    if !meta.file_type().is_symlink() {
        anyhow::bail!("refusing to remove non-symlink {}", path.display());
    }
    if is_dir_like(&meta) {
        fs::remove_dir(path)
            .with_context(|| format!("removing directory symlink: {}", path.display()))?;
    } else {
        fs::remove_file(path).with_context(|| format!("removing symlink: {}", path.display()))?;
    }
    Ok(())
}

/// Check if metadata represents a directory-like entry.
///
/// On Windows, `symlink_metadata().is_dir()` is `false` for directory
/// symlinks, so the raw `FILE_ATTRIBUTE_DIRECTORY` bit is checked instead.
fn is_dir_like(meta: &fs::Metadata) -> bool {
    #[cfg(windows)]
    {
        use std::os::windows::fs::MetadataExt;
        meta.file_attributes() & 0x10 != 0 // FILE_ATTRIBUTE_DIRECTORY
    }
    #[cfg(not(windows))]
    {
        meta.is_dir()
    }
}
