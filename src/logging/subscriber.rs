//! Tracing subscriber setup: console formatter, file layer, and initialisation.
use std::fmt;
use std::fs;
use std::io::Write as _;
use std::path::Path;
use std::sync::Mutex;

use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

use super::utils::{format_utc_datetime, format_utc_time, log_file_path, strip_ansi};

/// Tracing target for stage headers.
pub const STAGE_TARGET: &str = "dotman::stage";

/// Tracing target for dry-run messages.
pub const DRY_RUN_TARGET: &str = "dotman::dry_run";

/// Collects the `message` field of an event.
#[derive(Default)]
struct MessageExtractor {
    message: String,
}

impl Visit for MessageExtractor {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        }
    }
}

fn message_of(event: &Event<'_>) -> String {
    let mut extractor = MessageExtractor::default();
    event.record(&mut extractor);
    extractor.message
}

/// Column tag for a file line: the level, or the kind of INFO message.
fn file_tag(level: Level, target: &str) -> &'static str {
    match (level, target) {
        (Level::INFO, STAGE_TARGET) => "STAGE",
        (Level::INFO, DRY_RUN_TARGET) => "PLAN",
        (Level::ERROR, _) => "ERROR",
        (Level::WARN, _) => "WARN",
        (Level::INFO, _) => "INFO",
        _ => "DEBUG",
    }
}

/// Appends every event to the per-command log file, one timestamped line
/// each, with ANSI codes stripped.
#[derive(Debug)]
pub(super) struct FileLayer {
    file: Mutex<fs::File>,
}

impl FileLayer {
    /// Open the log file for `command` under the cache directory, or `None`
    /// when it cannot be created.
    pub(super) fn new(command: &str) -> Option<Self> {
        Self::at(&log_file_path(command)?, command)
    }

    /// Start a fresh log at `path` with a one-line run header.
    pub(super) fn at(path: &Path, command: &str) -> Option<Self> {
        let version =
            option_env!("DOTMAN_VERSION").unwrap_or(concat!("dev-", env!("CARGO_PKG_VERSION")));
        let header = format!("# dotman {version} {command}, {}\n", format_utc_datetime());
        fs::write(path, header).ok()?;
        let file = fs::OpenOptions::new().append(true).open(path).ok()?;
        Some(Self {
            file: Mutex::new(file),
        })
    }
}

impl<S: Subscriber> tracing_subscriber::Layer<S> for FileLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let metadata = event.metadata();
        let tag = file_tag(*metadata.level(), metadata.target());
        let line = format!(
            "{} {tag:<5} {}",
            format_utc_time(),
            strip_ansi(&message_of(event))
        );
        if let Ok(mut f) = self.file.lock() {
            writeln!(f, "{line}").ok();
        }
    }
}

/// Console output: stage headers, indented entry lines, colored problems.
struct ConsoleFormatter;

impl<S, N> FormatEvent<S, N> for ConsoleFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let level = *metadata.level();
        let target = metadata.target();
        let msg = message_of(event);

        match level {
            Level::ERROR => writeln!(writer, "\x1b[31mERROR\x1b[0m {msg}"),
            Level::WARN => writeln!(writer, "\x1b[33mWARN\x1b[0m  {msg}"),
            Level::INFO if target == STAGE_TARGET => {
                writeln!(writer, "\x1b[1;34m==>\x1b[0m \x1b[1m{msg}\x1b[0m")
            }
            Level::INFO if target == DRY_RUN_TARGET => {
                writeln!(writer, "  \x1b[33m[DRY RUN]\x1b[0m {msg}")
            }
            Level::INFO => writeln!(writer, "  {msg}"),
            _ => writeln!(writer, "  \x1b[2m{msg}\x1b[0m"),
        }
    }
}

/// Initialise the global [`tracing`] subscriber.
///
/// Console output goes to stdout (INFO and DEBUG) and stderr (WARN and
/// ERROR); DEBUG is shown only when `verbose`. Every event, DEBUG included,
/// is also appended to `$XDG_CACHE_HOME/dotman/<command>.log`. Call once at
/// startup; later calls are ignored.
pub fn init_subscriber(verbose: bool, command: &str) {
    use tracing_subscriber::fmt::writer::MakeWriterExt as _;
    use tracing_subscriber::{
        Layer as _, filter::LevelFilter, fmt, layer::SubscriberExt as _,
        util::SubscriberInitExt as _,
    };

    let console_level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };

    let make_writer = std::io::stderr
        .with_max_level(Level::WARN)
        .and(std::io::stdout.with_min_level(Level::INFO));

    let console_layer = fmt::layer()
        .event_format(ConsoleFormatter)
        .with_writer(make_writer)
        .with_filter(console_level);

    let file_layer = FileLayer::new(command).map(|l| l.with_filter(LevelFilter::DEBUG));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .ok();
}
