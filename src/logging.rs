//! Structured logging for grubtheme
//!
//! Installs a `log` backend that writes timestamped, coloured lines to stderr
//! and plain lines to an optional append-only file. Progress meant for the
//! user is printed to stdout by the binaries, not through this logger.

use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use std::time::Instant;

use crate::config::LogLevel;

/// Timestamp format for log entries
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Global initialization guard
static INIT_LOGGER: Once = Once::new();

/// Logger backend for the generator and verifier
pub struct ThemeLogger {
    /// File output for logs
    file: Option<Mutex<File>>,
    /// Log level filter
    level: LevelFilter,
    /// Whether to output to stderr
    console_output: bool,
}

impl ThemeLogger {
    fn format_entry(record: &Record, timestamp: &str, level: &str) -> String {
        format!(
            "[{}] {} [{}] {}\n",
            timestamp,
            level,
            record.module_path().unwrap_or("<unknown>"),
            record.args()
        )
    }
}

impl log::Log for ThemeLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();

        if self.console_output {
            let level_str = match record.level() {
                Level::Error => "\x1B[31mERROR\x1B[0m", // Red
                Level::Warn => "\x1B[33mWARN \x1B[0m",  // Yellow
                Level::Info => "\x1B[32mINFO \x1B[0m",  // Green
                Level::Debug => "\x1B[36mDEBUG\x1B[0m", // Cyan
                Level::Trace => "\x1B[90mTRACE\x1B[0m", // Gray
            };
            let entry = Self::format_entry(record, &timestamp, level_str);
            let _ = io::stderr().write_all(entry.as_bytes());
        }

        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let entry =
                    Self::format_entry(record, &timestamp, &format!("{:<5}", record.level()));
                let _ = file.write_all(entry.as_bytes());
                let _ = file.flush();
            }
        }
    }

    fn flush(&self) {
        if let Some(file) = &self.file {
            if let Ok(mut file) = file.lock() {
                let _ = file.flush();
            }
        }
    }
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Configure logging with the specified level and optionally a log file
///
/// Only the first call in a process installs the logger; later calls are
/// no-ops that return `Ok(())`.
pub fn configure_logging(
    level: LogLevel,
    log_file: Option<PathBuf>,
    console_output: bool,
) -> Result<(), String> {
    let mut result = Ok(());

    INIT_LOGGER.call_once(|| {
        let level_filter = LevelFilter::from(level);

        let file = match &log_file {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        if let Err(e) = std::fs::create_dir_all(parent) {
                            result = Err(format!("Failed to create log directory: {}", e));
                            return;
                        }
                    }
                }

                match OpenOptions::new().create(true).append(true).open(path) {
                    Ok(file) => Some(Mutex::new(file)),
                    Err(e) => {
                        result = Err(format!("Failed to open log file: {}", e));
                        return;
                    }
                }
            }
            None => None,
        };

        let logger = Box::new(ThemeLogger {
            file,
            level: level_filter,
            console_output,
        });

        if let Err(e) = log::set_boxed_logger(logger) {
            result = Err(format!("Failed to set logger: {}", e));
            return;
        }

        log::set_max_level(level_filter);

        log::debug!("Logging initialized at level: {}", level);
        if let Some(path) = &log_file {
            log::debug!("Log file: {}", path.display());
        }
    });

    result
}

/// Helper for performance logging
pub struct PerformanceLogger {
    /// Operation being timed
    operation: String,
    /// Component performing the operation
    component: String,
    /// Start time
    start_time: Instant,
}

impl PerformanceLogger {
    /// Create a new performance logger
    pub fn new<S: Into<String>>(component: S, operation: S) -> Self {
        Self {
            component: component.into(),
            operation: operation.into(),
            start_time: Instant::now(),
        }
    }

    /// Finish timing and log result
    pub fn finish(self) {
        log::debug!(
            "[{}::{}] Operation completed in {:?}",
            self.component,
            self.operation,
            self.start_time.elapsed()
        );
    }

    /// Finish timing with additional context
    pub fn finish_with_context(self, context: &str) {
        log::debug!(
            "[{}::{}] Operation '{}' completed in {:?}",
            self.component,
            self.operation,
            context,
            self.start_time.elapsed()
        );
    }
}
