#![deny(missing_docs)]
//! Shared logging utilities for the render queue workspace.
//!
//! This crate provides the `queue_*` logging macros used across the codebase,
//! the console logger that renders `[<source> <timestamp>] <message>` lines,
//! and a minimal test initializer for the global logger.

use std::fmt;
use std::io::{self, Write};

use chrono::NaiveDateTime;
use log::{Level, LevelFilter, Log, Metadata, Record};
use simplelog::{Config, SharedLogger};

/// Source label used by the `queue_*` macros when none is given.
pub const DEFAULT_SOURCE: &str = "Queue";

/// Timestamp layout of console lines, e.g. `2024-Mar-05 14:02:11`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d %H:%M:%S";

/// Logs a trace-level message using the global logging facade.
#[macro_export]
macro_rules! queue_trace {
    (source: $source:expr, $($arg:tt)+) => {{
        log::trace!(target: $source, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        log::trace!(target: $crate::DEFAULT_SOURCE, $($arg)+);
    }};
}

/// Logs a debug-level message using the global logging facade.
#[macro_export]
macro_rules! queue_debug {
    (source: $source:expr, $($arg:tt)+) => {{
        log::debug!(target: $source, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        log::debug!(target: $crate::DEFAULT_SOURCE, $($arg)+);
    }};
}

/// Logs an info-level message using the global logging facade.
#[macro_export]
macro_rules! queue_info {
    (source: $source:expr, $($arg:tt)+) => {{
        log::info!(target: $source, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        log::info!(target: $crate::DEFAULT_SOURCE, $($arg)+);
    }};
}

/// Logs a warn-level message using the global logging facade.
#[macro_export]
macro_rules! queue_warn {
    (source: $source:expr, $($arg:tt)+) => {{
        log::warn!(target: $source, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        log::warn!(target: $crate::DEFAULT_SOURCE, $($arg)+);
    }};
}

/// Logs an error-level message using the global logging facade.
#[macro_export]
macro_rules! queue_error {
    (source: $source:expr, $($arg:tt)+) => {{
        log::error!(target: $source, $($arg)+);
    }};
    ($($arg:tt)+) => {{
        log::error!(target: $crate::DEFAULT_SOURCE, $($arg)+);
    }};
}

/// Renders one console line: `[<source> <timestamp>] <message>`.
pub fn format_line(source: &str, timestamp: &NaiveDateTime, message: impl fmt::Display) -> String {
    format!(
        "[{} {}] {}",
        source_label(source),
        timestamp.format(TIMESTAMP_FORMAT),
        message
    )
}

/// Reduces a log target to the label shown in console lines.
///
/// Module-path targets from crates that don't use the `queue_*` macros are
/// shortened to their crate name.
pub fn source_label(target: &str) -> &str {
    target.split("::").next().unwrap_or(target)
}

/// Terminal logger producing the console line format.
///
/// Info and lower go to stdout; warnings and errors go to stderr.
pub struct ConsoleLogger {
    level: LevelFilter,
}

impl ConsoleLogger {
    /// Creates a boxed console logger for use with `simplelog::CombinedLogger`.
    pub fn new(level: LevelFilter) -> Box<Self> {
        Box::new(Self { level })
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let now = chrono::Local::now().naive_local();
        let line = format_line(record.target(), &now, record.args());
        if record.level() <= Level::Warn {
            let _ = writeln!(io::stderr().lock(), "{line}");
        } else {
            let _ = writeln!(io::stdout().lock(), "{line}");
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
        let _ = io::stderr().flush();
    }
}

impl SharedLogger for ConsoleLogger {
    fn level(&self) -> LevelFilter {
        self.level
    }

    fn config(&self) -> Option<&Config> {
        None
    }

    fn as_log(self: Box<Self>) -> Box<dyn Log> {
        Box::new(*self)
    }
}

/// Initializes a simple terminal logger for use in unit tests.
///
/// This safely no-ops if another logger has already been initialized.
pub fn initialize_for_tests() {
    use simplelog::{ColorChoice, CombinedLogger, TermLogger, TerminalMode};

    // Use debug level in debug builds, info in release builds.
    let level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    // Ignore the error if a logger was already set by another test.
    let _ = CombinedLogger::init(vec![TermLogger::new(
        level,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )]);
}
