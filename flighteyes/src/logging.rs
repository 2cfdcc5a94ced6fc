//! Logging setup.
//!
//! Installs a global `tracing` subscriber: console output with local
//! timestamps, plus an optional daily-rotated log file written through a
//! non-blocking `tracing-appender` worker. The console defaults to stderr;
//! callers that draw on the terminal can supply their own writer.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name prefix; files are named `flighteyes.YYYY-MM-DD.log`.
pub const LOG_FILE_PREFIX: &str = "flighteyes";

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to create log directory {}: {source}", .path.display())]
    Directory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to open log file: {0}")]
    Appender(String),

    #[error("Failed to install logger: {0}")]
    Install(String),
}

/// Logging options resolved from the command line and config file.
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    pub verbose: bool,
    /// Also write logs to this directory.
    pub directory: Option<PathBuf>,
}

/// Filter directive used when `RUST_LOG` is not set.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "flighteyes=debug"
    } else {
        "flighteyes=info"
    }
}

fn build_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)))
}

/// Creates the daily-rotated appender for `directory`.
pub fn file_appender(directory: &Path) -> Result<RollingFileAppender, LoggingError> {
    fs::create_dir_all(directory).map_err(|source| LoggingError::Directory {
        path: directory.to_path_buf(),
        source,
    })?;

    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .build(directory)
        .map_err(|e| LoggingError::Appender(e.to_string()))
}

/// Installs the global subscriber with console output on stderr.
///
/// When a log directory is configured the returned guard must be kept alive
/// until exit, or buffered file output is lost.
pub fn init_logging(options: &LoggingOptions) -> Result<Option<WorkerGuard>, LoggingError> {
    init_logging_with_writer(options, io::stderr)
}

/// Like [`init_logging`], with console output going to `console`.
pub fn init_logging_with_writer<W>(
    options: &LoggingOptions,
    console: W,
) -> Result<Option<WorkerGuard>, LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let (subscriber, guard) = build_subscriber(options, console)?;
    subscriber
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))?;

    Ok(guard)
}

type BoxedSubscriber = Box<dyn Subscriber + Send + Sync>;

fn build_subscriber<W>(
    options: &LoggingOptions,
    console: W,
) -> Result<(BoxedSubscriber, Option<WorkerGuard>), LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let console_layer = fmt::layer()
        .with_writer(console)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false);

    let (file_layer, guard) = match &options.directory {
        Some(directory) => {
            let (writer, guard) = tracing_appender::non_blocking(file_appender(directory)?);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(build_filter(options.verbose))
        .with(console_layer)
        .with(file_layer);

    Ok((Box::new(subscriber), guard))
}
