//! Repository traversal and restore selection.
use anyhow::{Context as _, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::IgnoreRules;
use crate::error::UsageError;
use crate::fs::EntryKind;
use crate::mapping::{CONFIG_PREFIX, MappingError, PathMapper, expand_home, lexical_normalize};

/// A managed unit: a repository-relative path and its kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RepoEntry {
    /// Path relative to the repository root.
    pub rel: PathBuf,
    /// File or directory.
    pub kind: EntryKind,
}

/// Every managed entry under `root`, sorted by path.
///
/// Top-level `config__<app>` directories are single whole-directory entries.
/// Other directories are walked and each file (or symlink) inside is an
/// entry. Hidden top-level names belong to the repository and are skipped,
/// as is anything matched by `ignore`.
///
/// # Errors
///
/// Returns an error if a directory cannot be read.
pub fn tracked_entries(root: &Path, ignore: &IgnoreRules) -> Result<Vec<RepoEntry>> {
    let mut entries = Vec::new();
    for (name, path, is_dir) in sorted_children(root)? {
        if name.starts_with('.') {
            continue;
        }
        if is_dir {
            if ignore.ignores_dir(&name) {
                continue;
            }
            if name.starts_with(CONFIG_PREFIX) {
                entries.push(RepoEntry {
                    rel: PathBuf::from(&name),
                    kind: EntryKind::Directory,
                });
            } else {
                walk_files(root, &path, ignore, &mut entries)?;
            }
        } else if !ignore.ignores_file(&name) {
            entries.push(RepoEntry {
                rel: PathBuf::from(&name),
                kind: EntryKind::File,
            });
        }
    }
    entries.sort();
    Ok(entries)
}

fn walk_files(
    root: &Path,
    dir: &Path,
    ignore: &IgnoreRules,
    out: &mut Vec<RepoEntry>,
) -> Result<()> {
    for (name, path, is_dir) in sorted_children(dir)? {
        if is_dir {
            if !ignore.ignores_dir(&name) {
                walk_files(root, &path, ignore, out)?;
            }
        } else if !ignore.ignores_file(&name) {
            let rel = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
            out.push(RepoEntry {
                rel,
                kind: EntryKind::File,
            });
        }
    }
    Ok(())
}

/// `(name, path, is_real_directory)` for each child, sorted by name.
fn sorted_children(dir: &Path) -> Result<Vec<(String, PathBuf, bool)>> {
    let mut children = Vec::new();
    let listing =
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in listing {
        let entry = entry.with_context(|| format!("reading entry in {}", dir.display()))?;
        let file_type = entry
            .file_type()
            .with_context(|| format!("reading file type: {}", entry.path().display()))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        children.push((name, entry.path(), file_type.is_dir()));
    }
    children.sort();
    Ok(children)
}

/// One `restore` path argument, resolved to a repository-relative prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    raw: String,
    rel: PathBuf,
}

impl Selector {
    /// Resolve `raw`.
    ///
    /// `~/...` and absolute paths are home paths, mapped back with
    /// [`PathMapper::to_repo`]; absolute paths inside the repository are
    /// taken relative to it. Anything else is already repository-relative.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::Unmappable`] if `raw` cannot be resolved.
    pub fn parse(raw: &str, mapper: &PathMapper, root: &Path) -> Result<Self, UsageError> {
        let expanded = expand_home(raw, mapper.home());
        let rel = if expanded.is_absolute() {
            let normalized = lexical_normalize(&expanded);
            if let Ok(inside) = normalized.strip_prefix(root) {
                inside.to_path_buf()
            } else {
                mapper
                    .try_to_repo(&normalized)
                    .map_err(|source| UsageError::Unmappable {
                        path: normalized.clone(),
                        source,
                    })?
            }
        } else {
            lexical_normalize(&expanded)
        };

        if rel.as_os_str().is_empty() || rel.starts_with("..") {
            return Err(UsageError::Unmappable {
                path: expanded,
                source: MappingError::InvalidComponent(raw.to_string()),
            });
        }
        Ok(Self {
            raw: raw.to_string(),
            rel,
        })
    }

    /// The argument as given.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The repository-relative prefix it resolved to.
    #[must_use]
    pub fn rel(&self) -> &Path {
        &self.rel
    }

    /// An entry matches when it lies inside the selector, or the selector
    /// lies inside it (a file within a whole-directory entry).
    #[must_use]
    pub fn matches(&self, entry: &RepoEntry) -> bool {
        entry.rel.starts_with(&self.rel) || self.rel.starts_with(&entry.rel)
    }
}

/// Keep the entries matched by any selector; all entries when there are none.
///
/// # Errors
///
/// Returns [`UsageError::NoMatch`] for the first selector matching nothing.
pub fn select(
    entries: Vec<RepoEntry>,
    selectors: &[Selector],
) -> Result<Vec<RepoEntry>, UsageError> {
    if selectors.is_empty() {
        return Ok(entries);
    }
    if let Some(unmatched) = selectors
        .iter()
        .find(|s| !entries.iter().any(|e| s.matches(e)))
    {
        return Err(UsageError::NoMatch(unmatched.raw().to_string()));
    }
    Ok(entries
        .into_iter()
        .filter(|e| selectors.iter().any(|s| s.matches(e)))
        .collect())
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn repo() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        for file in [
            "bashrc",
            "ssh/config",
            "config__foo/bar.conf",
            "config__foo/nested/deep.conf",
            "local__bin__scripts/tool",
            "vim/colors/x.vim",
            "vim/__pycache__/junk",
            "vim/mod.pyc",
            ".git/HEAD",
            ".dotman.toml",
        ] {
            let path = root.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "x").unwrap();
        }
        dir
    }

    fn rels(entries: &[RepoEntry]) -> Vec<String> {
        entries
            .iter()
            .map(|e| e.rel.to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn enumerates_whole_config_dirs_and_individual_files() {
        let dir = repo();
        let entries = tracked_entries(dir.path(), &IgnoreRules::default()).unwrap();
        assert_eq!(
            rels(&entries),
            vec![
                "bashrc",
                "config__foo",
                "local__bin__scripts/tool",
                "ssh/config",
                "vim/colors/x.vim",
            ]
        );
        let config = entries.iter().find(|e| e.rel == Path::new("config__foo")).unwrap();
        assert_eq!(config.kind, EntryKind::Directory);
    }

    #[test]
    fn extra_ignore_rules_apply_at_any_depth() {
        let dir = repo();
        let rules = IgnoreRules {
            dirs: vec!["colors".to_string()],
            suffixes: vec!["config".to_string()],
        };
        let entries = tracked_entries(dir.path(), &rules).unwrap();
        assert!(!rels(&entries).contains(&"vim/colors/x.vim".to_string()));
        assert!(!rels(&entries).contains(&"ssh/config".to_string()));
    }

    #[test]
    fn empty_repository_has_no_entries() {
        let dir = tempfile::tempdir().unwrap();
        assert!(tracked_entries(dir.path(), &IgnoreRules::default()).unwrap().is_empty());
    }

    // -----------------------------------------------------------------------
    // Selector
    // -----------------------------------------------------------------------

    #[test]
    fn selector_accepts_repo_relative_paths() {
        let mapper = PathMapper::new("/home/u");
        let s = Selector::parse("ssh/./config", &mapper, Path::new("/repo")).unwrap();
        assert_eq!(s.rel(), Path::new("ssh/config"));
    }

    #[test]
    fn selector_maps_home_paths() {
        let mapper = PathMapper::new("/home/u");
        let s = Selector::parse("~/.config/foo/bar.conf", &mapper, Path::new("/repo")).unwrap();
        assert_eq!(s.rel(), Path::new("config__foo/bar.conf"));
        let s = Selector::parse("/home/u/.ssh", &mapper, Path::new("/repo")).unwrap();
        assert_eq!(s.rel(), Path::new("ssh"));
    }

    #[test]
    fn selector_accepts_paths_inside_the_repository() {
        let mapper = PathMapper::new("/home/u");
        let s = Selector::parse("/repo/vim/colors", &mapper, Path::new("/repo")).unwrap();
        assert_eq!(s.rel(), Path::new("vim/colors"));
    }

    #[test]
    fn selector_rejects_unmappable_paths() {
        let mapper = PathMapper::new("/home/u");
        assert!(matches!(
            Selector::parse("/etc/passwd", &mapper, Path::new("/repo")),
            Err(UsageError::Unmappable { .. })
        ));
        assert!(matches!(
            Selector::parse("../outside", &mapper, Path::new("/repo")),
            Err(UsageError::Unmappable { .. })
        ));
    }

    #[test]
    fn select_matches_both_directions() {
        let dir = repo();
        let mapper = PathMapper::new("/home/u");
        let entries = tracked_entries(dir.path(), &IgnoreRules::default()).unwrap();
        let selectors = vec![
            Selector::parse("vim", &mapper, dir.path()).unwrap(),
            Selector::parse("config__foo/bar.conf", &mapper, dir.path()).unwrap(),
        ];
        let selected = select(entries, &selectors).unwrap();
        assert_eq!(rels(&selected), vec!["config__foo", "vim/colors/x.vim"]);
    }

    #[test]
    fn select_reports_first_selector_without_match() {
        let dir = repo();
        let mapper = PathMapper::new("/home/u");
        let entries = tracked_entries(dir.path(), &IgnoreRules::default()).unwrap();
        let selectors = vec![Selector::parse("emacs", &mapper, dir.path()).unwrap()];
        let err = select(entries, &selectors).unwrap_err();
        assert_eq!(err.to_string(), "'emacs' does not match any tracked entry");
    }

    #[test]
    fn select_without_selectors_keeps_everything() {
        let dir = repo();
        let entries = tracked_entries(dir.path(), &IgnoreRules::default()).unwrap();
        let n = entries.len();
        assert_eq!(select(entries, &[]).unwrap().len(), n);
    }
}
