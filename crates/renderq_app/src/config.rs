//! Optional RON configuration file, merged under the command line.
//!
//! ```ron
//! (
//!     threads: Some(8),
//!     useserver: ["10.0.0.2", "10.0.0.3:18018"],
//!     serverinterval: Some(60),
//!     debug: false,
//!     fixedseed: false,
//! )
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use renderq_engine::RenderOptions;
use renderq_logging::queue_info;
use serde::Deserialize;
use thiserror::Error;

use crate::cli::Cli;

pub const DEFAULT_CONFIG_FILE: &str = "renderq.ron";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub threads: Option<usize>,
    pub useserver: Vec<String>,
    pub serverinterval: Option<u32>,
    pub debug: bool,
    pub fixedseed: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

/// Loads `explicit`, or `./renderq.ron` when it exists, or the defaults.
pub fn load(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    match explicit {
        Some(path) => read(path),
        None => {
            let path = Path::new(DEFAULT_CONFIG_FILE);
            if path.is_file() {
                read(path)
            } else {
                Ok(FileConfig::default())
            }
        }
    }
}

fn read(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    queue_info!("Loaded configuration from {:?}", path);
    Ok(config)
}

/// Command-line values win; server lists from both sources are combined.
pub fn render_options(cli: &Cli, file: FileConfig) -> RenderOptions {
    let mut servers = file.useserver;
    servers.extend(cli.useserver.iter().cloned());
    RenderOptions {
        debug: cli.debug || file.debug,
        fixed_seed: cli.fixedseed || file.fixedseed,
        threads: cli.threads.or(file.threads),
        servers,
        server_interval: cli.serverinterval.or(file.serverinterval),
    }
}
