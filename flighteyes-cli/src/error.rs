//! CLI error type and exit codes.

use std::fmt;

use flighteyes::config::ConfigError;
use flighteyes::logging::LoggingError;
use flighteyes::pipeline::PipelineError;
use flighteyes::provider::ProviderError;

use crate::wallpaper::WallpaperError;

/// Exit code for bad arguments, matching clap's own usage errors.
pub const EXIT_USAGE: i32 = 2;
/// Exit code for every other failure.
pub const EXIT_FAILURE: i32 = 1;

/// Errors reported by the `flighteyes` binary.
#[derive(Debug)]
pub enum CliError {
    /// Arguments parsed but are not usable (e.g. `nan`).
    Usage(String),
    Config(String),
    Logging(String),
    /// HTTP client could not be created.
    Provider(String),
    Cache(String),
    Pipeline(PipelineError),
    Wallpaper(String),
}

impl CliError {
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Usage(_) => EXIT_USAGE,
            _ => EXIT_FAILURE,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "Invalid arguments: {}", msg),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Logging(msg) => write!(f, "Logging setup failed: {}", msg),
            CliError::Provider(msg) => write!(f, "Imagery provider error: {}", msg),
            CliError::Cache(msg) => write!(f, "Tile cache error: {}", msg),
            CliError::Pipeline(e) => write!(f, "{}", e),
            CliError::Wallpaper(msg) => write!(f, "Failed to set desktop background: {}", msg),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Pipeline(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<LoggingError> for CliError {
    fn from(e: LoggingError) -> Self {
        CliError::Logging(e.to_string())
    }
}

impl From<ProviderError> for CliError {
    fn from(e: ProviderError) -> Self {
        CliError::Provider(e.to_string())
    }
}

impl From<PipelineError> for CliError {
    fn from(e: PipelineError) -> Self {
        CliError::Pipeline(e)
    }
}

impl From<WallpaperError> for CliError {
    fn from(e: WallpaperError) -> Self {
        CliError::Wallpaper(e.to_string())
    }
}
