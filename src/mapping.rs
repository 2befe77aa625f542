//! Repository ⇄ home-directory path conventions.
//!
//! Every managed entry lives in the repository under a name that encodes where
//! it belongs in `$HOME`:
//!
//! | repository                    | home                       |
//! |-------------------------------|----------------------------|
//! | `config__<app>/...`           | `~/.config/<app>/...`      |
//! | `local__bin__scripts/...`     | `~/.local/bin/scripts/...` |
//! | `<name>/...`                  | `~/.<name>/...`            |
//!
//! [`PathMapper::to_repo`] is the exact left inverse of
//! [`PathMapper::to_home`]. Names whose round trip would not be the identity
//! (for example a bare top-level `config` directory) are rejected up front
//! instead of being linked somewhere the inverse cannot find again.
use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Top-level repository prefix that encodes `~/.config/<app>`.
pub const CONFIG_PREFIX: &str = "config__";

/// Top-level repository directory that encodes `~/.local/bin/scripts`.
pub const SCRIPTS_DIR: &str = "local__bin__scripts";

/// Why a path could not be mapped in one direction or the other.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The path has no components.
    #[error("empty path")]
    Empty,

    /// A `config__` name without the application part.
    #[error("'{0}' names a config directory but no application")]
    MissingAppName(String),

    /// `..`, a root, or a drive prefix inside a relative path.
    #[error("'{0}' contains a component that is not a plain name")]
    InvalidComponent(String),

    /// A component that is not valid UTF-8.
    #[error("'{0}' is not valid UTF-8")]
    NonUtf8(String),

    /// Hidden top-level names belong to the repository itself (`.git`, ...).
    #[error("hidden top-level name '{0}' is reserved for repository metadata")]
    HiddenTopLevel(String),

    /// The name maps somewhere whose inverse is a different repository path.
    #[error("'{path}' is not canonical; track it as '{canonical}'")]
    NonCanonical {
        /// The path as given.
        path: String,
        /// The name the inverse mapping would produce.
        canonical: String,
    },

    /// The name collides with one of the encoded conventions.
    #[error("'{0}' collides with an encoded directory name")]
    Reserved(String),

    /// The home path is not below the home directory.
    #[error("{} is outside the home directory", .0.display())]
    OutsideHome(PathBuf),

    /// The home directory itself was given.
    #[error("the home directory itself cannot be managed")]
    HomeRoot,

    /// Only dotfiles and dot-directories under `$HOME` are managed.
    #[error("'{0}' is not a dotfile or dot-directory")]
    NotDotted(String),

    /// A container directory (e.g. `~/.config`) rather than something below it.
    #[error("expected a path below {0}")]
    Incomplete(&'static str),
}

/// Pure translation between repository-relative paths and home paths.
#[derive(Debug, Clone)]
pub struct PathMapper {
    home: PathBuf,
}

impl PathMapper {
    /// Create a mapper rooted at `home`.
    #[must_use]
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self { home: home.into() }
    }

    /// The home directory this mapper resolves against.
    #[must_use]
    pub fn home(&self) -> &Path {
        &self.home
    }

    /// Map a repository-relative path to its absolute home path.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if `rel` is malformed or not canonical.
    pub fn to_home(&self, rel: &Path) -> Result<PathBuf, MappingError> {
        Ok(self.home.join(home_relative(rel)?))
    }

    /// Map a home path back to its repository-relative path, if it has one.
    #[must_use]
    pub fn to_repo(&self, home_path: &Path) -> Option<PathBuf> {
        self.try_to_repo(home_path).ok()
    }

    /// Like [`to_repo`](Self::to_repo), but explains a refusal.
    ///
    /// The path is normalized lexically; symlinks are never followed because
    /// the path *in* `$HOME` is what gets mapped.
    ///
    /// # Errors
    ///
    /// Returns a [`MappingError`] if the path is outside home, is home
    /// itself, or does not follow the dotfile conventions.
    pub fn try_to_repo(&self, home_path: &Path) -> Result<PathBuf, MappingError> {
        let normalized = lexical_normalize(home_path);
        let rel = normalized
            .strip_prefix(&self.home)
            .map_err(|_| MappingError::OutsideHome(normalized.clone()))?;
        repo_relative(rel)
    }
}

/// Normalize `.` and `..` components without touching the filesystem.
#[must_use]
pub fn lexical_normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if out.file_name().is_some() {
                    out.pop();
                } else if !out.has_root() {
                    out.push(component.as_os_str());
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Expand a leading `~` to `home`.
#[must_use]
pub fn expand_home(raw: &str, home: &Path) -> PathBuf {
    if raw == "~" {
        home.to_path_buf()
    } else if let Some(rest) = raw.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(raw)
    }
}

fn segments(path: &Path) -> Result<Vec<&str>, MappingError> {
    let mut parts = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => {
                let name = name
                    .to_str()
                    .ok_or_else(|| MappingError::NonUtf8(path.display().to_string()))?;
                parts.push(name);
            }
            Component::CurDir => {}
            _ => return Err(MappingError::InvalidComponent(path.display().to_string())),
        }
    }
    if parts.is_empty() {
        return Err(MappingError::Empty);
    }
    Ok(parts)
}

fn join_parts(first: impl AsRef<Path>, rest: &[&str]) -> PathBuf {
    rest.iter()
        .fold(first.as_ref().to_path_buf(), |acc, part| acc.join(part))
}

fn home_relative(rel: &Path) -> Result<PathBuf, MappingError> {
    let parts = segments(rel)?;
    let Some((top, rest)) = parts.split_first() else {
        return Err(MappingError::Empty);
    };

    let base: PathBuf = if let Some(app) = top.strip_prefix(CONFIG_PREFIX) {
        if app.is_empty() {
            return Err(MappingError::MissingAppName((*top).to_string()));
        }
        [".config", app].iter().collect()
    } else if *top == SCRIPTS_DIR {
        [".local", "bin", "scripts"].iter().collect()
    } else if top.starts_with('.') {
        return Err(MappingError::HiddenTopLevel((*top).to_string()));
    } else {
        PathBuf::from(format!(".{top}"))
    };
    let home_rel = join_parts(base, rest);

    let given = join_parts(top, rest);
    match repo_relative(&home_rel) {
        Ok(canonical) if canonical == given => Ok(home_rel),
        Ok(canonical) => Err(MappingError::NonCanonical {
            path: given.display().to_string(),
            canonical: canonical.display().to_string(),
        }),
        Err(_) => Err(MappingError::Reserved(given.display().to_string())),
    }
}

fn repo_relative(rel: &Path) -> Result<PathBuf, MappingError> {
    let parts = segments(rel).map_err(|e| match e {
        MappingError::Empty => MappingError::HomeRoot,
        other => other,
    })?;
    let Some((top, rest)) = parts.split_first() else {
        return Err(MappingError::HomeRoot);
    };

    let name = top
        .strip_prefix('.')
        .filter(|name| !name.is_empty())
        .ok_or_else(|| MappingError::NotDotted((*top).to_string()))?;
    if name.starts_with('.') {
        return Err(MappingError::HiddenTopLevel(name.to_string()));
    }
    if name.starts_with(CONFIG_PREFIX) || name == SCRIPTS_DIR {
        return Err(MappingError::Reserved((*top).to_string()));
    }

    if name == "config" {
        let (app, rest) = rest
            .split_first()
            .ok_or(MappingError::Incomplete("~/.config"))?;
        return Ok(join_parts(format!("{CONFIG_PREFIX}{app}"), rest));
    }
    if name == "local"
        && let Some(scripts) = rest.strip_prefix(&["bin", "scripts"][..])
    {
        return Ok(join_parts(SCRIPTS_DIR, scripts));
    }

    Ok(join_parts(name, rest))
}
