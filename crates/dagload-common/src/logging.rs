//! Logging configuration and initialization
//!
//! All dagload binaries log through `tracing`. This module turns a
//! [`LogConfig`] into a global subscriber with:
//!
//! - console output on stderr (stdout stays free for command output)
//! - optional daily-rotated file output
//! - text or JSON formatting
//! - level and per-target directives, overridable from the environment
//!
//! Use structured fields rather than formatted strings where a value is
//! worth filtering on:
//!
//! ```rust
//! use tracing::info;
//!
//! let model = "res.partner";
//! info!(model, batch = 3, "Batch loaded");
//! ```
//!
//! # Example
//!
//! ```no_run
//! use dagload_common::logging::{init_logging, LogConfig, LogLevel};
//!
//! let config = LogConfig::builder().level(LogLevel::Debug).build();
//! let _guard = init_logging(&config).unwrap();
//! tracing::info!("Application started");
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Log level for filtering messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert to tracing Level
    pub fn to_tracing_level(self) -> Level {
        match self {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(anyhow::anyhow!("Invalid log level: {}", s)),
        }
    }
}

/// Where log events are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    /// stderr only
    #[default]
    Console,
    /// Daily-rotated file only
    File,
    Both,
}

impl LogOutput {
    fn console(self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    fn file(self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

impl std::str::FromStr for LogOutput {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "console" | "stderr" => Ok(LogOutput::Console),
            "file" => Ok(LogOutput::File),
            "both" | "all" => Ok(LogOutput::Both),
            _ => Err(anyhow::anyhow!("Invalid log output: {}", s)),
        }
    }
}

/// Log line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "pretty" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(anyhow::anyhow!("Invalid log format: {}", s)),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Minimum log level
    pub level: LogLevel,

    pub output: LogOutput,

    pub format: LogFormat,

    /// Directory for log files (only used when output includes file)
    pub log_dir: PathBuf,

    /// Log file name prefix, e.g. "dagload" -> "dagload.2024-01-18"
    pub log_file_prefix: String,

    /// Additional filter directives such as "reqwest=warn,dagload_core=trace"
    pub filter_directives: Option<String>,

    /// Whether to include the emitting module in each line
    pub include_targets: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            output: LogOutput::Console,
            format: LogFormat::Text,
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: "dagload".to_string(),
            filter_directives: None,
            include_targets: true,
        }
    }
}

impl LogConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for fluent configuration
    pub fn builder() -> LogConfigBuilder {
        LogConfigBuilder::default()
    }

    /// Apply environment overrides on top of `self`
    ///
    /// Environment variables:
    /// - `LOG_LEVEL`: trace, debug, info, warn, error
    /// - `LOG_OUTPUT`: console, file, both
    /// - `LOG_FORMAT`: text, json
    /// - `LOG_DIR`: directory for log files
    /// - `LOG_FILE_PREFIX`: prefix for log files
    /// - `LOG_FILTER`: additional filter directives
    pub fn merge_env(mut self) -> Result<Self> {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.level = level.parse()?;
        }
        if let Ok(output) = std::env::var("LOG_OUTPUT") {
            self.output = output.parse()?;
        }
        if let Ok(format) = std::env::var("LOG_FORMAT") {
            self.format = format.parse()?;
        }
        if let Ok(dir) = std::env::var("LOG_DIR") {
            self.log_dir = PathBuf::from(dir);
        }
        if let Ok(prefix) = std::env::var("LOG_FILE_PREFIX") {
            self.log_file_prefix = prefix;
        }
        if let Ok(filter) = std::env::var("LOG_FILTER") {
            self.filter_directives = Some(filter);
        }
        Ok(self)
    }

    /// Load configuration from environment variables over the defaults
    pub fn from_env() -> Result<Self> {
        Self::default().merge_env()
    }

    fn env_filter(&self) -> Result<EnvFilter> {
        let mut filter =
            EnvFilter::from_default_env().add_directive(self.level.to_tracing_level().into());

        if let Some(ref directives) = self.filter_directives {
            for directive in directives.split(',').filter(|d| !d.trim().is_empty()) {
                filter = filter.add_directive(
                    directive
                        .trim()
                        .parse()
                        .with_context(|| format!("Failed to parse filter directive '{}'", directive))?,
                );
            }
        }

        Ok(filter)
    }
}

/// Builder for LogConfig
#[derive(Default)]
pub struct LogConfigBuilder {
    config: LogConfig,
}

impl LogConfigBuilder {
    pub fn level(mut self, level: LogLevel) -> Self {
        self.config.level = level;
        self
    }

    pub fn output(mut self, output: LogOutput) -> Self {
        self.config.output = output;
        self
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.config.format = format;
        self
    }

    pub fn log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.log_dir = dir.into();
        self
    }

    pub fn log_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.log_file_prefix = prefix.into();
        self
    }

    pub fn filter_directives(mut self, filter: impl Into<String>) -> Self {
        self.config.filter_directives = Some(filter.into());
        self
    }

    pub fn include_targets(mut self, include: bool) -> Self {
        self.config.include_targets = include;
        self
    }

    pub fn build(self) -> LogConfig {
        self.config
    }
}

/// Keeps the background file writer alive; drop it last, at process exit.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _file: Option<WorkerGuard>,
}

/// Install the global tracing subscriber
///
/// Fails if a global subscriber is already set.
pub fn init_logging(config: &LogConfig) -> Result<LoggingGuard> {
    let filter = config.env_filter()?;

    let console_layer = config.output.console().then(|| {
        let layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(config.include_targets);
        match config.format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        }
    });

    let mut guard = None;
    let file_layer = if config.output.file() {
        std::fs::create_dir_all(&config.log_dir).context("Failed to create log directory")?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, &config.log_file_prefix);
        let (writer, worker_guard) = tracing_appender::non_blocking(appender);
        guard = Some(worker_guard);

        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(config.include_targets)
            .with_ansi(false);
        Some(match config.format {
            LogFormat::Text => layer.boxed(),
            LogFormat::Json => layer.json().boxed(),
        })
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(LoggingGuard { _file: guard })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_from_str() {
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_output_from_str() {
        assert_eq!("stderr".parse::<LogOutput>().unwrap(), LogOutput::Console);
        assert_eq!("both".parse::<LogOutput>().unwrap(), LogOutput::Both);
        assert!(LogOutput::Both.console() && LogOutput::Both.file());
        assert!(!LogOutput::File.console());
        assert!("syslog".parse::<LogOutput>().is_err());
    }

    #[test]
    fn test_builder() {
        let config = LogConfig::builder()
            .level(LogLevel::Warn)
            .format(LogFormat::Json)
            .log_file_prefix("dagload-cli")
            .filter_directives("reqwest=warn")
            .build();

        assert_eq!(config.level, LogLevel::Warn);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.log_file_prefix, "dagload-cli");
        assert_eq!(config.filter_directives.as_deref(), Some("reqwest=warn"));
        assert_eq!(config.output, LogOutput::Console);
    }

    #[test]
    fn test_bad_filter_directive_is_rejected() {
        let config = LogConfig::builder().filter_directives("dagload_core=loudest").build();
        assert!(config.env_filter().is_err());
    }
}
