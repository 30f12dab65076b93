//! # Logging Utilities
//!
//! Logging infrastructure for symgraph using `tracing`.
//!
//! This module provides structured logging with support for:
//! - Pretty or JSON output
//! - Environment variable configuration
//! - Log level filtering
//! - A per-input build log written next to the binary being read
//!
//! Console output goes to stderr; stdout is left to the model printout.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use symgraph_utils::init_logging;
//!
//! // Initialize with default settings (reads from RUST_LOG env var)
//! init_logging().expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level filter (e.g., `RUST_LOG=debug`, `RUST_LOG=symgraph_core=trace`)
//! - `SYMGRAPH_LOG_FORMAT`: Set output format (`json` or `pretty`, default: `pretty`)
//! - `SYMGRAPH_LOG_FILE`: Optional path to a daily-rolling log file, in addition to the console
//!
//! ## Build Logs
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! use symgraph_utils::{init_build_log, LogLevel};
//!
//! // Everything goes to game.elf.symgraph.log, nothing to the console
//! let path = init_build_log(Path::new("game.elf"), Some(LogLevel::Debug)).expect("Failed to open build log");
//! println!("logging to {}", path.display());
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, io};

use chrono::Utc;
use tracing::Level;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::{self};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Extension appended to the input path for build logs.
pub const BUILD_LOG_EXTENSION: &str = "symgraph.log";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat
{
    /// Pretty-printed, human-readable format
    #[default]
    Pretty,
    /// JSON format, one object per line
    Json,
}

impl FromStr for LogFormat
{
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "pretty" | "dev" | "development" => Ok(LogFormat::Pretty),
            "json" | "prod" | "production" => Ok(LogFormat::Json),
            _ => Err(LoggingError::InvalidFormat(format!("{s}. Use 'pretty' or 'json'"))),
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
    type Err = LoggingError;

    fn from_str(s: &str) -> Result<Self, Self::Err>
    {
        match s.to_lowercase().as_str() {
            "error" | "err" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" | "dbg" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(LoggingError::InvalidLevel(format!(
                "{s}. Use 'error', 'warn', 'info', 'debug', or 'trace'"
            ))),
        }
    }
}

/// Path of the build log for `input`: the input path with
/// [`BUILD_LOG_EXTENSION`] appended.
///
/// ```rust
/// use std::path::Path;
///
/// use symgraph_utils::logging::build_log_path;
///
/// assert_eq!(build_log_path(Path::new("out/game.elf")), Path::new("out/game.elf.symgraph.log"));
/// ```
pub fn build_log_path(input: &Path) -> PathBuf
{
    let mut file_name = input.file_name().unwrap_or_default().to_os_string();
    file_name.push(".");
    file_name.push(BUILD_LOG_EXTENSION);
    input.with_file_name(file_name)
}

/// Initialize logging with default settings
///
/// Reads configuration from environment variables:
/// - `RUST_LOG`: Log level filter (e.g., `debug`, `symgraph_core=trace`)
/// - `SYMGRAPH_LOG_FORMAT`: Output format (`json` or `pretty`, default: `pretty`)
/// - `SYMGRAPH_LOG_FILE`: Optional path to log file
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging() -> Result<(), LoggingError>
{
    let format = env::var("SYMGRAPH_LOG_FORMAT")
        .ok()
        .and_then(|s| LogFormat::from_str(&s).ok())
        .unwrap_or_default();

    let default_level = env::var("RUST_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .parse::<LogLevel>()
        .map(Into::into)
        .unwrap_or(Level::INFO);

    init_logging_internal(format, default_level)
}

/// Initialize logging with explicit level and format
///
/// ```rust,no_run
/// use symgraph_utils::{init_logging_with_level, LogFormat, LogLevel};
///
/// init_logging_with_level(LogLevel::Debug, LogFormat::Pretty).expect("Failed to initialize logging");
/// ```
///
/// ## Errors
///
/// Returns an error if logging is already initialized.
pub fn init_logging_with_level(level: LogLevel, format: LogFormat) -> Result<(), LoggingError>
{
    init_logging_internal(format, level.into())
}

/// Send every log line of this run to the build log of `input`
///
/// The log is file-only so it doesn't mix with the model printout. It is
/// truncated at the start of each run and opens with a timestamped header.
///
/// ## Arguments
///
/// * `input` - The binary being read; the log is written next to it.
/// * `level` - Optional log level. If `None`, uses `RUST_LOG` or defaults to `INFO`.
///
/// ## Errors
///
/// Returns an error if the log file can't be created or logging is already
/// initialized.
pub fn init_build_log(input: &Path, level: Option<LogLevel>) -> Result<PathBuf, LoggingError>
{
    let log_file = build_log_path(input);
    let mut file = std::fs::File::create(&log_file)?;
    writeln!(file, "# symgraph build log for {} ({})", input.display(), Utc::now().to_rfc3339())?;

    init_logging_file_only(&log_file, LogFormat::Pretty, level.map(Into::into))?;
    Ok(log_file)
}

fn default_filter(default_level: Level) -> EnvFilter
{
    // RUST_LOG can override the default level with more specific filters
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.to_string()))
}

fn file_parts(path: &Path) -> (PathBuf, PathBuf)
{
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let file_name = PathBuf::from(path.file_name().unwrap_or_default());
    (directory, file_name)
}

fn init_logging_internal(format: LogFormat, default_level: Level) -> Result<(), LoggingError>
{
    let env_filter = default_filter(default_level);

    // Check if file logging is requested
    let file_writer = env::var("SYMGRAPH_LOG_FILE").ok().map(|path| {
        let (directory, file_name) = file_parts(Path::new(&path));
        let (non_blocking, guard) =
            tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file_name));
        // The guard flushes on drop; it has to live as long as the process.
        std::mem::forget(guard);
        non_blocking
    });

    let registry = match format {
        LogFormat::Pretty => {
            let console_layer = fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(true)
                .with_writer(io::stderr)
                .with_filter(env_filter.clone());
            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(false) // No ANSI in files
                    .with_filter(env_filter)
            });
            Registry::default().with(console_layer).with(file_layer).try_init()
        }
        LogFormat::Json => {
            let console_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(io::stderr)
                .with_filter(env_filter.clone());
            let file_layer = file_writer.map(|writer| {
                fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_filter(env_filter)
            });
            Registry::default().with(console_layer).with(file_layer).try_init()
        }
    };

    registry.map_err(|err| LoggingError::InitializationFailed(err.to_string()))
}

/// Internal initialization function for file-only logging
fn init_logging_file_only(log_file: &Path, format: LogFormat, explicit_level: Option<Level>) -> Result<(), LoggingError>
{
    // Priority:
    // 1. If explicit_level is Some (from --log-level CLI flag), use it
    // 2. If RUST_LOG is set, use it (allows module-specific filters like "symgraph_core=trace")
    // 3. Otherwise, use INFO as default
    let env_filter = if let Some(level) = explicit_level {
        EnvFilter::new(level.to_string())
    } else if let Ok(rust_log) = env::var("RUST_LOG") {
        EnvFilter::try_new(&rust_log).unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()))
    } else {
        EnvFilter::new(Level::INFO.to_string())
    };

    let (directory, file_name) = file_parts(log_file);
    let file_appender = tracing_appender::rolling::never(directory, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Store the guard to prevent it from being dropped
    std::mem::forget(guard);

    let result = match format {
        LogFormat::Pretty => {
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_ansi(false) // No ANSI in files
                .with_filter(env_filter);
            Registry::default().with(file_layer).try_init()
        }
        LogFormat::Json => {
            let file_layer = fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(ChronoUtc::rfc_3339())
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter);
            Registry::default().with(file_layer).try_init()
        }
    };

    result.map_err(|err| LoggingError::InitializationFailed(err.to_string()))
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

    /// File logging error
    #[error("File logging error: {0}")]
    FileError(#[from] io::Error),
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_log_format_from_str()
    {
        assert_eq!(LogFormat::from_str("pretty").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("JSON").unwrap(), LogFormat::Json);
        assert_eq!(LogFormat::from_str("dev").unwrap(), LogFormat::Pretty);
        assert_eq!(LogFormat::from_str("prod").unwrap(), LogFormat::Json);
        assert!(matches!(
            LogFormat::from_str("invalid"),
            Err(LoggingError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_log_level_from_str()
    {
        assert_eq!(LogLevel::from_str("error").unwrap(), LogLevel::Error);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("dbg").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("trace").unwrap(), LogLevel::Trace);
        assert!(matches!(LogLevel::from_str("loud"), Err(LoggingError::InvalidLevel(_))));
    }

    #[test]
    fn test_log_level_to_tracing_level()
    {
        assert_eq!(Level::from(LogLevel::Error), Level::ERROR);
        assert_eq!(Level::from(LogLevel::Warn), Level::WARN);
        assert_eq!(Level::from(LogLevel::Info), Level::INFO);
        assert_eq!(Level::from(LogLevel::Debug), Level::DEBUG);
        assert_eq!(Level::from(LogLevel::Trace), Level::TRACE);
    }

    #[test]
    fn test_build_log_path_keeps_directory()
    {
        assert_eq!(build_log_path(Path::new("game")), PathBuf::from("game.symgraph.log"));
        assert_eq!(
            build_log_path(Path::new("/tmp/bin/game.so")),
            PathBuf::from("/tmp/bin/game.so.symgraph.log")
        );
    }

    #[test]
    fn test_file_parts_defaults_to_current_directory()
    {
        let (directory, file_name) = file_parts(Path::new("symgraph.log"));
        assert_eq!(directory, PathBuf::from("."));
        assert_eq!(file_name, PathBuf::from("symgraph.log"));
    }
}
