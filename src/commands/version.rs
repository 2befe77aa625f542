//! Command: print version information.
use std::io::{self, Write as _};

/// The build version: `DOTMAN_VERSION` at build time, else the crate version.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("DOTMAN_VERSION") {
        Some(version) => version,
        None => env!("CARGO_PKG_VERSION"),
    }
}

/// Write `dotman <version>` to stdout.
///
/// # Errors
///
/// Returns an error if stdout cannot be written.
pub fn run() -> io::Result<()> {
    writeln!(io::stdout().lock(), "dotman {}", version())
}
