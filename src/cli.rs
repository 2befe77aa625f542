//! Command-line interface definition.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI entry point for the dotfiles reconciliation engine.
#[derive(Parser, Debug)]
#[command(
    name = "dotman",
    about = "Keep a home directory in sync with a dotfiles repository through symlinks",
    version
)]
pub struct Cli {
    /// Subcommand to run (omit only with `--self-test`).
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Run the built-in scenario checks in a scratch directory and exit;
    /// any subcommand and its flags are ignored
    #[arg(long)]
    pub self_test: bool,

    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Home directory to reconcile (defaults to $HOME)
    #[arg(long, global = true, value_name = "DIR")]
    pub home: Option<PathBuf>,

    /// Dotfiles repository root (defaults to $DOTMAN_ROOT, then ./dotfiles)
    #[arg(long, global = true, value_name = "DIR")]
    pub root: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Link repository entries into the home directory
    Restore(RestoreOpts),
    /// Move a live file or directory into the repository and link it back
    Adopt(AdoptOpts),
    /// Replace a managed symlink with a real copy of its content
    Unstow(UnstowOpts),
    /// Print version information
    Version,
}

impl Command {
    /// Name used for the log file and messages.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Restore(_) => "restore",
            Self::Adopt(_) => "adopt",
            Self::Unstow(_) => "unstow",
            Self::Version => "version",
        }
    }
}

/// Options for the `restore` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct RestoreOpts {
    /// Restore only these entries (repository-relative or home paths)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<String>,

    /// Back up conflicting content and link anyway
    #[arg(short, long)]
    pub force: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

/// Options for the `adopt` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct AdoptOpts {
    /// Home path to adopt
    #[arg(value_name = "HOME_PATH")]
    pub path: PathBuf,

    /// Adopt the target of a foreign symlink, or displace an existing repository copy
    #[arg(short, long)]
    pub force: bool,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}

/// Options for the `unstow` subcommand.
#[derive(Parser, Debug, Clone)]
pub struct UnstowOpts {
    /// Managed symlink to replace with a copy
    #[arg(value_name = "HOME_PATH")]
    pub path: PathBuf,

    /// Preview changes without applying
    #[arg(short = 'd', long)]
    pub dry_run: bool,
}
