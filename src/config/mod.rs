//! Run configuration: home directory, repository root, and repository options.
//!
//! Repository options live in an optional `.dotman.toml` at the repository
//! root:
//!
//! ```toml
//! [ignore]
//! dirs = ["node_modules"]
//! suffixes = [".swp"]
//! ```
pub mod toml_loader;

use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Name of the repository options file.
pub const CONFIG_FILE: &str = ".dotman.toml";

/// Environment variable naming the repository root.
pub const ROOT_ENV: &str = "DOTMAN_ROOT";

/// Directory name searched for when no root is given.
pub const DEFAULT_ROOT_DIR: &str = "dotfiles";

/// Everything a run needs to know about where things live.
#[derive(Debug, Clone)]
pub struct Config {
    /// Canonical home directory.
    pub home: PathBuf,
    /// Canonical repository root.
    pub root: PathBuf,
    /// Names skipped while enumerating the repository.
    pub ignore: IgnoreRules,
}

/// Directory names and file suffixes that are never managed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IgnoreRules {
    /// Directory names skipped at any depth.
    pub dirs: Vec<String>,
    /// File name suffixes skipped at any depth.
    pub suffixes: Vec<String>,
}

impl Default for IgnoreRules {
    fn default() -> Self {
        Self {
            dirs: vec![".git".to_string(), "__pycache__".to_string()],
            suffixes: vec![".pyc".to_string()],
        }
    }
}

impl IgnoreRules {
    /// Whether a directory with this name is skipped.
    #[must_use]
    pub fn ignores_dir(&self, name: &str) -> bool {
        self.dirs.iter().any(|d| d == name)
    }

    /// Whether a file with this name is skipped.
    #[must_use]
    pub fn ignores_file(&self, name: &str) -> bool {
        self.suffixes.iter().any(|s| name.ends_with(s.as_str()))
    }

    fn extend(&mut self, extra: IgnoreSection) {
        for dir in extra.dirs {
            if !self.dirs.contains(&dir) {
                self.dirs.push(dir);
            }
        }
        for suffix in extra.suffixes {
            if !self.suffixes.contains(&suffix) {
                self.suffixes.push(suffix);
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RepoFile {
    ignore: IgnoreSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct IgnoreSection {
    dirs: Vec<String>,
    suffixes: Vec<String>,
}

impl Config {
    /// Canonicalize `root` and `home` and read the repository options file.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if either path is not a directory or the
    /// options file is unreadable or invalid.
    pub fn load(root: &Path, home: &Path) -> Result<Self, ConfigError> {
        let root = canonical_dir("repository", root)?;
        let home = canonical_dir("home directory", home)?;
        let file: RepoFile = toml_loader::load_config(&root.join(CONFIG_FILE))?;
        let mut ignore = IgnoreRules::default();
        ignore.extend(file.ignore);
        Ok(Self { home, root, ignore })
    }
}

fn canonical_dir(what: &'static str, path: &Path) -> Result<PathBuf, ConfigError> {
    match dunce::canonicalize(path) {
        Ok(canonical) if canonical.is_dir() => Ok(canonical),
        _ => Err(ConfigError::NotADirectory {
            what,
            path: path.to_path_buf(),
        }),
    }
}

/// Resolve the home directory: `--home`, then `$HOME` (or `%USERPROFILE%`).
///
/// # Errors
///
/// Returns [`ConfigError::MissingHome`] if none is available.
pub fn resolve_home(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(home) = explicit {
        return Ok(home.to_path_buf());
    }
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingHome)
}

/// Resolve the repository root from the process environment.
///
/// Order: `--root`, `$DOTMAN_ROOT`, `./dotfiles`, then a `dotfiles`
/// directory beside the checkout the binary was built in.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRoot`] listing every candidate tried.
pub fn resolve_root(explicit: Option<&Path>) -> Result<PathBuf, ConfigError> {
    resolve_root_from(
        explicit,
        env::var_os(ROOT_ENV),
        env::current_exe().ok(),
        env::current_dir().ok(),
    )
}

/// [`resolve_root`] with every input passed in.
///
/// # Errors
///
/// Returns [`ConfigError::MissingRoot`] listing every candidate tried.
pub fn resolve_root_from(
    explicit: Option<&Path>,
    env_root: Option<OsString>,
    exe: Option<PathBuf>,
    cwd: Option<PathBuf>,
) -> Result<PathBuf, ConfigError> {
    if let Some(root) = explicit {
        return Ok(root.to_path_buf());
    }
    if let Some(root) = env_root.filter(|r| !r.is_empty()) {
        return Ok(PathBuf::from(root));
    }

    let mut candidates = Vec::new();
    if let Some(cwd) = cwd {
        candidates.push(cwd.join(DEFAULT_ROOT_DIR));
    }
    if let Some(bin_dir) = exe.as_deref().and_then(Path::parent) {
        // target/<profile>/ inside a checkout, or an installed bin/
        candidates.push(bin_dir.join("../..").join(DEFAULT_ROOT_DIR));
        candidates.push(bin_dir.join("..").join(DEFAULT_ROOT_DIR));
    }

    if let Some(found) = candidates.iter().find(|c| c.is_dir()) {
        return Ok(found.clone());
    }
    let tried = candidates
        .iter()
        .map(|c| c.display().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    Err(ConfigError::MissingRoot(if tried.is_empty() {
        ROOT_ENV.to_string()
    } else {
        tried
    }))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    fn dirs() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("repo");
        let home = tmp.path().join("home");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&home).unwrap();
        (tmp, root, home)
    }

    // -----------------------------------------------------------------------
    // Config::load
    // -----------------------------------------------------------------------

    #[test]
    fn load_without_options_file_uses_defaults() {
        let (_tmp, root, home) = dirs();
        let config = Config::load(&root, &home).unwrap();
        assert_eq!(config.ignore, IgnoreRules::default());
        assert!(config.root.is_absolute());
        assert!(config.home.is_absolute());
    }

    #[test]
    fn load_extends_default_ignores() {
        let (_tmp, root, home) = dirs();
        fs::write(
            root.join(CONFIG_FILE),
            "[ignore]\ndirs = [\"node_modules\", \".git\"]\nsuffixes = [\".swp\"]\n",
        )
        .unwrap();
        let config = Config::load(&root, &home).unwrap();
        assert_eq!(config.ignore.dirs, vec![".git", "__pycache__", "node_modules"]);
        assert_eq!(config.ignore.suffixes, vec![".pyc", ".swp"]);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let (_tmp, root, home) = dirs();
        fs::write(root.join(CONFIG_FILE), "[ignore]\nfiles = []\n").unwrap();
        let err = Config::load(&root, &home).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSyntax { .. }));
    }

    #[test]
    fn load_rejects_missing_root() {
        let (tmp, _root, home) = dirs();
        let err = Config::load(&tmp.path().join("nope"), &home).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotADirectory {
                what: "repository",
                ..
            }
        ));
    }

    #[test]
    fn ignore_rules_match_names_and_suffixes() {
        let rules = IgnoreRules::default();
        assert!(rules.ignores_dir(".git"));
        assert!(rules.ignores_dir("__pycache__"));
        assert!(!rules.ignores_dir("git"));
        assert!(rules.ignores_file("mod.pyc"));
        assert!(!rules.ignores_file("mod.py"));
    }

    // -----------------------------------------------------------------------
    // resolve_root_from / resolve_home
    // -----------------------------------------------------------------------

    #[test]
    fn explicit_root_wins() {
        let root = resolve_root_from(
            Some(Path::new("/explicit")),
            Some(OsString::from("/env")),
            None,
            None,
        )
        .unwrap();
        assert_eq!(root, PathBuf::from("/explicit"));
    }

    #[test]
    fn env_root_beats_discovery() {
        let root = resolve_root_from(None, Some(OsString::from("/env")), None, None).unwrap();
        assert_eq!(root, PathBuf::from("/env"));
    }

    #[test]
    fn discovers_dotfiles_in_cwd() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir(tmp.path().join(DEFAULT_ROOT_DIR)).unwrap();
        let root =
            resolve_root_from(None, None, None, Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(root, tmp.path().join(DEFAULT_ROOT_DIR));
    }

    #[test]
    fn discovers_dotfiles_beside_checkout_binary() {
        let tmp = tempfile::tempdir().unwrap();
        fs::create_dir_all(tmp.path().join("target/release")).unwrap();
        fs::create_dir(tmp.path().join(DEFAULT_ROOT_DIR)).unwrap();
        let exe = tmp.path().join("target/release/dotman");
        let root = resolve_root_from(None, None, Some(exe), None).unwrap();
        assert!(root.is_dir());
        assert_eq!(
            dunce::canonicalize(root).unwrap(),
            dunce::canonicalize(tmp.path().join(DEFAULT_ROOT_DIR)).unwrap()
        );
    }

    #[test]
    fn cwd_dotfiles_beats_checkout_binary() {
        let tmp = tempfile::tempdir().unwrap();
        let checkout = tmp.path().join("checkout");
        let cwd = tmp.path().join("work");
        fs::create_dir_all(checkout.join("target/release")).unwrap();
        fs::create_dir(checkout.join(DEFAULT_ROOT_DIR)).unwrap();
        fs::create_dir_all(cwd.join(DEFAULT_ROOT_DIR)).unwrap();
        let exe = checkout.join("target/release/dotman");
        let root = resolve_root_from(None, None, Some(exe), Some(cwd.clone())).unwrap();
        assert_eq!(root, cwd.join(DEFAULT_ROOT_DIR));
    }

    #[test]
    fn missing_root_lists_candidates() {
        let tmp = tempfile::tempdir().unwrap();
        let err =
            resolve_root_from(None, None, None, Some(tmp.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRoot(_)));
        assert!(err.to_string().contains(DEFAULT_ROOT_DIR));
    }

    #[test]
    fn explicit_home_wins() {
        assert_eq!(
            resolve_home(Some(Path::new("/h"))).unwrap(),
            PathBuf::from("/h")
        );
    }
}
