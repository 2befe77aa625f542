//! Command: move live content into the repository and link it back.
use anyhow::Context as _;
use std::env;

use crate::cli::{AdoptOpts, GlobalOpts};
use crate::engine::Engine;
use crate::error::DotmanError;
use crate::logging::Logger;

use super::{CommandSetup, RunStatus, absolute_home_path, finish};

/// Run the adopt command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded or the path has no
/// repository counterpart.
pub fn run(global: &GlobalOpts, opts: &AdoptOpts, log: &Logger) -> Result<RunStatus, DotmanError> {
    let setup = CommandSetup::init(global, log)?;
    let engine = Engine::new(&setup.config, log);

    let cwd = env::current_dir().context("reading current directory")?;
    let path = absolute_home_path(&opts.path, &setup.config.home, &cwd);
    log.stage(&format!("Adopting {}", engine.tilde(&path)));
    if opts.dry_run {
        log.info("dry run: nothing will be changed");
    }
    let report = engine.adopt(&path, opts.force, opts.dry_run)?;
    Ok(finish(&report, log))
}
