//! Logger initialization for the renderq binary.
//!
//! Console output always uses the `[<source> <timestamp>] <message>` layout;
//! an optional file sink receives the same records through simplelog.

use std::fs::File;
use std::path::Path;

use log::LevelFilter;
use renderq_logging::ConsoleLogger;
use simplelog::{CombinedLogger, Config, ConfigBuilder, SharedLogger, WriteLogger};

pub fn initialize(level: LevelFilter, log_file: Option<&Path>) {
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![ConsoleLogger::new(level)];
    if let Some(path) = log_file {
        if let Some(file_logger) = create_file_logger(level, build_config(), path) {
            loggers.push(file_logger);
        }
    }

    let _ = CombinedLogger::init(loggers);
}

fn build_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_target_level(LevelFilter::Error)
        .build()
}

fn create_file_logger(
    level: LevelFilter,
    config: Config,
    path: &Path,
) -> Option<Box<WriteLogger<File>>> {
    match File::create(path) {
        Ok(file) => Some(WriteLogger::new(level, config, file)),
        Err(err) => {
            eprintln!("Warning: Could not create log file at {:?}: {}", path, err);
            None
        }
    }
}
