//! # Logging Utilities
//!
//! Logging infrastructure for stackfix using `tracing`.
//!
//! Logs always go to stderr (and optionally a file): stdout is reserved for
//! the reconstructed stack so it can be piped or diffed.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stackfix_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=stackfix_core=trace`)
//! - `STACKFIX_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `STACKFIX_LOG_FILE`: Optional path to a daily-rolling log file

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use tracing::Level;
use tracing_appender::non_blocking::NonBlocking;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Environment variable selecting the output format.
pub const LOG_FORMAT_ENV: &str = "STACKFIX_LOG_FORMAT";

/// Environment variable naming an optional log file.
pub const LOG_FILE_ENV: &str = "STACKFIX_LOG_FILE";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format (default)
    Pretty,
    /// JSON format, for collecting logs from scripted runs
    Json,
}

impl FromStr for LogFormat
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(format!("Unknown log format: {s}. Use 'pretty' or 'json'")),
        }
    }
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel
{
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    Info,
    /// Debug level
    Debug,
    /// Trace level (most verbose)
    Trace,
}

impl From<LogLevel> for Level
{
    fn from(level: LogLevel) -> Self
    {
        match level {
            LogLevel::Error => Level::ERROR,
            LogLevel::Warn => Level::WARN,
            LogLevel::Info => Level::INFO,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Trace => Level::TRACE,
        }
    }
}

impl FromStr for LogLevel
{
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!(
                "Unknown log level: {s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            )),
        }
    }
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `stackfix_core=debug`)
/// - `STACKFIX_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `STACKFIX_LOG_FILE`: Optional path to log file
///
/// ## Errors
///
/// Returns an error if:
/// - `STACKFIX_LOG_FORMAT` holds an unknown format
/// - `RUST_LOG` is not a valid filter directive
/// - Logging is already initialized
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = match env::var(LOG_FORMAT_ENV) {
        Ok(value) => LogFormat::from_str(&value).map_err(LoggingError::InvalidFormat)?,
        Err(_) => LogFormat::Pretty,
    };

    let filter = env_filter(env::var(EnvFilter::DEFAULT_ENV).ok().as_deref())?;
    init_logging_internal(format, filter)
}

/// Build the filter for a `RUST_LOG` value, defaulting to WARN when unset.
fn env_filter(value: Option<&str>) -> Result<EnvFilter, LoggingError>
{
    match value {
        // The CLI is chatty enough below WARN
        None => Ok(EnvFilter::new(Level::WARN.to_string())),
        Some(value) => EnvFilter::try_new(value).map_err(|e| LoggingError::InvalidLevel(format!("{value}: {e}"))),
    }
}

/// Initialize logging with explicit level and format
///
/// The explicit level takes precedence over `RUST_LOG`.
///
/// ## Example
///
/// ```rust,no_run
/// use stackfix_utils::{LogFormat, LogLevel, init_logging_with_level};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty)
///     .expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    let level: Level = level.into();
    init_logging_internal(format, EnvFilter::new(level.to_string()))
}

/// Non-blocking writer for the file named by `STACKFIX_LOG_FILE`, if set.
fn file_writer() -> Option<NonBlocking>
{
    let file_path = env::var(LOG_FILE_ENV).ok().map(PathBuf::from)?;
    let file_appender = tracing_appender::rolling::daily(
        file_path.parent().unwrap_or_else(|| Path::new(".")),
        file_path.file_name().unwrap_or_default(),
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the worker alive for the rest of the process
    std::mem::forget(guard);
    Some(non_blocking)
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// One output layer in the chosen format.
fn fmt_layer<W>(format: LogFormat, writer: W, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::rfc_3339());

    match format {
        LogFormat::Pretty => layer.with_ansi(ansi).with_filter(filter).boxed(),
        LogFormat::Json => layer
            .json()
            .with_current_span(true)
            .with_span_list(true)
            .with_filter(filter)
            .boxed(),
    }
}

fn init_logging_internal(format: LogFormat, filter: EnvFilter) -> Result<(), LoggingError>
{
    let mut layers = Vec::new();
    if let Some(writer) = file_writer() {
        // No ANSI in files
        layers.push(fmt_layer(format, writer, false, filter.clone()));
    }
    layers.push(fmt_layer(format, io::stderr, true, filter));

    Registry::default()
        .with(layers)
        .try_init()
        .map_err(|e| LoggingError::InitializationFailed(e.to_string()))
}

/// Logging initialization error
#[derive(Debug, thiserror::Error)]
pub enum LoggingError
{
    /// Invalid log format
    #[error("Invalid log format: {0}")]
    InvalidFormat(String),

    /// Invalid log level
    #[error("Invalid log level: {0}")]
    InvalidLevel(String),

    /// Failed to initialize logging
    #[error("Failed to initialize logging: {0}")]
    InitializationFailed(String),
}
