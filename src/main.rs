//! `dotman` binary entry point.
use std::process::ExitCode;

use clap::{CommandFactory as _, Parser as _, error::ErrorKind};

use dotman_cli::cli::{Cli, Command};
use dotman_cli::commands::{self, RunStatus};
use dotman_cli::error::DotmanError;
use dotman_cli::logging::{self, Logger};

fn main() -> ExitCode {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    // --self-test runs the harness whatever else was given
    let command = match (&args.command, args.self_test) {
        (_, true) => None,
        (Some(command), false) => Some(command),
        (None, false) => Cli::command()
            .error(ErrorKind::MissingSubcommand, "a subcommand is required")
            .exit(),
    };
    let name = command.map_or("self-test", Command::name);

    logging::init_subscriber(args.verbose, name);
    let log = Logger::new(name);

    let result = match command {
        None => {
            if let Some(ignored) = &args.command {
                log.debug(&format!("ignoring `{}` under --self-test", ignored.name()));
            }
            Ok(commands::self_test::run(&log))
        }
        Some(Command::Restore(opts)) => commands::restore::run(&args.global, opts, &log),
        Some(Command::Adopt(opts)) => commands::adopt::run(&args.global, opts, &log),
        Some(Command::Unstow(opts)) => commands::unstow::run(&args.global, opts, &log),
        Some(Command::Version) => commands::version::run()
            .map(|()| RunStatus::Success)
            .map_err(|e| DotmanError::Other(e.into())),
    };

    match result {
        Ok(status) => ExitCode::from(status.exit_code()),
        Err(e) => {
            log.error(&format!("{e:#}"));
            ExitCode::from(e.exit_code())
        }
    }
}
