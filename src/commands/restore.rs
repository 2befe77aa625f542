//! Command: link repository entries into the home directory.
use crate::cli::{GlobalOpts, RestoreOpts};
use crate::engine::Engine;
use crate::error::DotmanError;
use crate::logging::Logger;

use super::{CommandSetup, RunStatus, finish};

/// Run the restore command.
///
/// # Errors
///
/// Returns an error if configuration cannot be loaded, the repository
/// cannot be read, or a selector is unusable. Per-entry failures are
/// reported through the returned [`RunStatus`] instead.
pub fn run(
    global: &GlobalOpts,
    opts: &RestoreOpts,
    log: &Logger,
) -> Result<RunStatus, DotmanError> {
    let setup = CommandSetup::init(global, log)?;
    let engine = Engine::new(&setup.config, log);

    let entries = engine.select(&opts.paths)?;
    log.stage(&format!(
        "Restoring {} entries from {}",
        entries.len(),
        setup.config.root.display()
    ));
    if opts.dry_run {
        log.info("dry run: nothing will be changed");
    }
    let report = engine.restore(&entries, opts.force, opts.dry_run);
    Ok(finish(&report, log))
}
