//! Console + file logging.
//!
//! Every line reads `<timestamp> | <LEVEL> | <message>`. The same lines go to
//! stdout and to `<dir>/antibox.log`; both sinks drop events above the
//! configured verbosity, except status lines which always pass.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use tracing::{Event, Level, Metadata, Subscriber, error};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::{FilterFn, filter_fn};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{Layer, layer::SubscriberExt, util::SubscriberInitExt};

use antibox_core::STATUS_TARGET;

pub const LOG_FILE: &str = "antibox.log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.6f";

// ── Verbosity ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Verbosity {
    Error,
    #[default]
    Info,
    Debug,
}

impl Verbosity {
    fn max_level(self) -> Level {
        match self {
            Self::Error => Level::ERROR,
            Self::Info => Level::INFO,
            Self::Debug => Level::DEBUG,
        }
    }

    /// Whether an event with `meta` is written at this verbosity.
    pub fn allows(self, meta: &Metadata<'_>) -> bool {
        if meta.target() == STATUS_TARGET {
            return true;
        }
        meta.target().starts_with("antibox") && *meta.level() <= self.max_level()
    }
}

impl FromStr for Verbosity {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ERROR" => Ok(Self::Error),
            "INFO" => Ok(Self::Info),
            "DEBUG" => Ok(Self::Debug),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Error => "ERROR",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        })
    }
}

fn gate(verbosity: Verbosity) -> FilterFn<impl Fn(&Metadata<'_>) -> bool> {
    filter_fn(move |meta| verbosity.allows(meta))
}

// ── Line format ─────────────────────────────────────────────────────

/// `<local timestamp> | <LEVEL> | <message>`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Local::now().format(TIMESTAMP_FORMAT);
        write!(writer, "{now} | {} | ", level_label(event.metadata()))?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Level column, padded to five characters. Status lines render as `INFO `.
fn level_label(meta: &Metadata<'_>) -> &'static str {
    if meta.target() == STATUS_TARGET {
        return "INFO ";
    }
    match *meta.level() {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN ",
        Level::INFO => "INFO ",
        Level::DEBUG => "DEBUG",
        _ => "TRACE",
    }
}

// ── Setup ───────────────────────────────────────────────────────────

/// Install the global subscriber. Hold the returned guard until exit so the
/// file sink is flushed.
pub fn init(verbosity: Verbosity, dir: &Path) -> Option<WorkerGuard> {
    let file = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(LOG_FILE)
        .build(dir);

    let (file_layer, guard, file_error) = match file {
        Ok(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(writer)
                .with_filter(gate(verbosity));
            (Some(layer), Some(guard), None)
        }
        Err(e) => (None, None, Some(e)),
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(LineFormat)
                .with_ansi(false)
                .with_writer(std::io::stdout)
                .with_filter(gate(verbosity)),
        )
        .with(file_layer)
        .init();

    if let Some(e) = file_error {
        error!(
            "LOG => Cannot open {}: {e}. Logging to stdout only.",
            dir.join(LOG_FILE).display()
        );
    }

    guard
}
