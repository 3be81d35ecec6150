//! Subscriber setup for the command line tool
//!
//! Events go to three places: stdout, a log file and an error log file that
//! only receives warnings and errors.

use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};

use tracing_subscriber::{
    filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

use crate::errors::{SenderError, SenderResult};

pub const DEFAULT_LOG_DIR_NAME: &str = ".kaspa-tx-sender";
pub const LOG_FILE_NAME: &str = "kaspa-tx-sender.log";
pub const ERROR_LOG_FILE_NAME: &str = "kaspa-tx-sender-err.log";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub log_dir: PathBuf,
    pub stdout_level: LevelFilter,
    pub file_level: LevelFilter,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
            stdout_level: LevelFilter::INFO,
            file_level: LevelFilter::TRACE,
        }
    }
}

impl LogConfig {
    pub fn with_log_dir<P: Into<PathBuf>>(mut self, log_dir: P) -> Self {
        self.log_dir = log_dir.into();
        self
    }

    /// Set the stdout level from a name such as `debug` or `warn`
    pub fn with_stdout_level(mut self, level: &str) -> SenderResult<Self> {
        self.stdout_level = LevelFilter::from_str(level)
            .map_err(|_| SenderError::LoggingError(format!("Unknown log level '{level}'")))?;
        Ok(self)
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILE_NAME)
    }

    pub fn error_log_file(&self) -> PathBuf {
        self.log_dir.join(ERROR_LOG_FILE_NAME)
    }
}

/// `~/.kaspa-tx-sender`, or the working directory if no home is set
pub fn default_log_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_default()
        .join(DEFAULT_LOG_DIR_NAME)
}

fn open_append(path: &Path) -> SenderResult<Arc<File>> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Arc::new)
        .map_err(|e| SenderError::LoggingError(format!("Cannot open {}: {e}", path.display())))
}

/// Install the global subscriber. Can only succeed once per process.
pub fn init_logging(config: &LogConfig) -> SenderResult<()> {
    fs::create_dir_all(&config.log_dir).map_err(|e| {
        SenderError::LoggingError(format!(
            "Cannot create log directory {}: {e}",
            config.log_dir.display()
        ))
    })?;
    let log_file = open_append(&config.log_file())?;
    let error_log_file = open_append(&config.error_log_file())?;

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_filter(config.stdout_level);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(log_file)
        .with_filter(config.file_level);
    let error_layer = fmt::layer()
        .with_ansi(false)
        .with_writer(error_log_file)
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(stdout_layer)
        .with(file_layer)
        .with(error_layer)
        .try_init()
        .map_err(|e| SenderError::LoggingError(e.to_string()))
}
