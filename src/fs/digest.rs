//! Content digests for files and directory trees.
//!
//! A tree digest covers names, file bytes and symlink targets, so two trees
//! with equal digests hold the same content regardless of where they live.
//! Used to verify cross-device copies and by tests to prove content was left
//! untouched.
use anyhow::{Context as _, Result};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Compute the lowercase hex SHA-256 digest of the entry at `path`.
///
/// Symlinks are hashed by their target and never followed.
///
/// # Errors
///
/// Returns an error if any part of the tree cannot be read.
pub fn tree_digest(path: &Path) -> Result<String> {
    let mut hasher = Sha256::new();
    feed(path, &mut hasher)?;
    Ok(to_hex(&hasher.finalize()))
}

/// Map every path below `root` (relative, `root` itself excluded) to a short
/// description of its content.
///
/// Files map to their digest, directories to `dir`, symlinks to
/// `-> <target>`. Two snapshots are equal exactly when nothing under `root`
/// changed.
///
/// # Errors
///
/// Returns an error if the tree cannot be walked.
pub fn snapshot(root: &Path) -> Result<BTreeMap<PathBuf, String>> {
    let mut out = BTreeMap::new();
    walk(root, root, &mut out)?;
    Ok(out)
}

fn walk(root: &Path, dir: &Path, out: &mut BTreeMap<PathBuf, String>) -> Result<()> {
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?
    {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        let file_type = entry
            .file_type()
            .with_context(|| format!("reading file type: {}", path.display()))?;
        if file_type.is_symlink() {
            let target = fs::read_link(&path)
                .with_context(|| format!("reading link: {}", path.display()))?;
            out.insert(rel, format!("-> {}", target.display()));
        } else if file_type.is_dir() {
            out.insert(rel, "dir".to_string());
            walk(root, &path, out)?;
        } else {
            out.insert(rel, tree_digest(&path)?);
        }
    }
    Ok(())
}

fn feed(path: &Path, hasher: &mut Sha256) -> Result<()> {
    let meta =
        fs::symlink_metadata(path).with_context(|| format!("reading metadata {}", path.display()))?;
    if meta.file_type().is_symlink() {
        let target =
            fs::read_link(path).with_context(|| format!("reading link: {}", path.display()))?;
        hasher.update(b"L");
        hasher.update(target.to_string_lossy().as_bytes());
    } else if meta.is_dir() {
        hasher.update(b"D");
        let mut children: Vec<_> = fs::read_dir(path)
            .with_context(|| format!("reading directory {}", path.display()))?
            .map(|e| e.map(|e| e.file_name()))
            .collect::<std::io::Result<_>>()
            .with_context(|| format!("listing {}", path.display()))?;
        children.sort();
        for name in children {
            hasher.update(name.to_string_lossy().as_bytes());
            hasher.update([0u8]);
            feed(&path.join(&name), hasher)?;
        }
        hasher.update(b"E");
    } else {
        let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        hasher.update(b"F");
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    Ok(())
}

fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        // write! to a String is infallible
        write!(hex, "{b:02x}").unwrap_or(());
    }
    hex
}
