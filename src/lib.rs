//! Symlink-based dotfiles reconciliation engine.
//!
//! Keeps a home directory in sync with a dotfiles repository by linking
//! repository entries into place (`restore`), pulling live content into the
//! repository (`adopt`), and turning a link back into a real copy
//! (`unstow`). Existing user content is never overwritten without `--force`,
//! and then only after a verified backup.
//!
//! The public API is organised into layers:
//!
//! - **[`mapping`]** - the bijection between repository names and home paths
//! - **[`fs`]** - probing, linking, digests, and backups
//! - **[`policy`]** - the pure decision table for each probed path
//! - **[`engine`]** - restore, adopt, and unstow over a [`config::Config`]
//! - **[`commands`]** - top-level subcommand orchestration
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod error;
pub mod fs;
pub mod logging;
pub mod mapping;
pub mod policy;
