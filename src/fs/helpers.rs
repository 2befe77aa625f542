//! File-system helpers shared by the engine and the backup manager.
use anyhow::{Context as _, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::digest::tree_digest;
use super::link::{create_symlink, remove_symlink};

/// How [`relocate`] moves an entry to its new path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RelocateStrategy {
    /// Atomic rename, degrading to copy-verify-delete on a cross-device error.
    #[default]
    Rename,
    /// Always copy, verify the digest, then delete the source.
    CopyVerifyDelete,
}

/// Ensure the parent directory of `path` exists, creating it (and any
/// ancestors) if necessary.
///
/// # Errors
///
/// Returns an error if the directory cannot be created.
pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create parent: {}", parent.display()))?;
    }
    Ok(())
}

/// Move `src` to `dst`, which must not exist yet.
///
/// Returns `true` when the degraded copy path was taken. On any failure of
/// that path the partial copy is removed and `src` is left in place.
///
/// # Errors
///
/// Returns an error if the rename fails for a reason other than crossing
/// devices, or if the copy, its verification, or the final delete fails.
pub fn relocate(src: &Path, dst: &Path, strategy: RelocateStrategy) -> Result<bool> {
    if dst.symlink_metadata().is_ok() {
        anyhow::bail!("destination already exists: {}", dst.display());
    }
    if strategy == RelocateStrategy::Rename {
        match fs::rename(src, dst) {
            Ok(()) => return Ok(false),
            Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {}
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("rename {} to {}", src.display(), dst.display()));
            }
        }
    }
    copy_verify_delete(src, dst)?;
    Ok(true)
}

fn copy_verify_delete(src: &Path, dst: &Path) -> Result<()> {
    let verified =
        copy_tree(src, dst).and_then(|()| Ok((tree_digest(src)?, tree_digest(dst)?)));
    match verified {
        Ok((expected, actual)) if actual == expected => {}
        Ok((expected, actual)) => {
            discard(dst);
            anyhow::bail!(
                "verification failed for {}: expected {expected}, got {actual}",
                dst.display()
            );
        }
        Err(e) => {
            discard(dst);
            return Err(e);
        }
    }
    remove_entry(src)
}

/// Recursively copy `src` to `dst`.
///
/// Symlinks inside the tree are recreated as symlinks, not followed, so the
/// copy hashes identically to the source.
///
/// # Errors
///
/// Returns an error if any entry cannot be read or written.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    let meta =
        fs::symlink_metadata(src).with_context(|| format!("reading metadata {}", src.display()))?;
    if meta.file_type().is_symlink() {
        let target =
            fs::read_link(src).with_context(|| format!("reading link: {}", src.display()))?;
        create_symlink(&target, dst)?;
    } else if meta.is_dir() {
        fs::create_dir(dst).with_context(|| format!("creating directory {}", dst.display()))?;
        for entry in
            fs::read_dir(src).with_context(|| format!("reading directory {}", src.display()))?
        {
            let entry = entry.with_context(|| format!("reading entry in {}", src.display()))?;
            copy_tree(&entry.path(), &dst.join(entry.file_name()))?;
        }
    } else {
        fs::copy(src, dst)
            .with_context(|| format!("copying {} to {}", src.display(), dst.display()))?;
    }
    Ok(())
}

/// Remove a file, symlink, or whole directory tree at `path`.
///
/// # Errors
///
/// Returns an error if the entry cannot be removed.
pub fn remove_entry(path: &Path) -> Result<()> {
    let meta =
        fs::symlink_metadata(path).with_context(|| format!("reading metadata {}", path.display()))?;
    if meta.file_type().is_symlink() {
        remove_symlink(path)
    } else if meta.is_dir() {
        fs::remove_dir_all(path).with_context(|| format!("removing {}", path.display()))
    } else {
        fs::remove_file(path).with_context(|| format!("removing {}", path.display()))
    }
}

fn discard(path: &Path) {
    if path.symlink_metadata().is_ok() {
        remove_entry(path).ok();
    }
}

/// Sibling path used to stage content before it is renamed into place.
fn staging_path(target: &Path) -> PathBuf {
    let parent = target.parent().unwrap_or_else(|| Path::new("."));
    let name = target
        .file_name()
        .map_or_else(|| "entry".into(), |n| n.to_string_lossy());
    parent.join(format!(".{name}.dotman-tmp"))
}

/// Replace the symlink at `target` with a real copy of `source`.
///
/// The copy is staged next to `target` first, so `target` is absent only
/// between the symlink removal and the rename. If the rename fails the
/// symlink is put back.
///
/// # Errors
///
/// Returns an error if staging, removing the symlink, or renaming fails.
pub fn copy_into_place(source: &Path, target: &Path) -> Result<()> {
    let tmp = staging_path(target);
    if tmp.symlink_metadata().is_ok() {
        anyhow::bail!("staging path already exists: {}", tmp.display());
    }
    if let Err(e) = copy_tree(source, &tmp) {
        discard(&tmp);
        return Err(e).with_context(|| format!("staging copy of {}", source.display()));
    }

    if let Err(e) = remove_symlink(target) {
        discard(&tmp);
        return Err(e);
    }
    if let Err(e) = fs::rename(&tmp, target) {
        discard(&tmp);
        create_symlink(source, target).ok();
        return Err(e).with_context(|| format!("rename {} to {}", tmp.display(), target.display()));
    }
    Ok(())
}
