use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::LevelFilter;
use renderq_engine::SimSettings;

/// Console render queue: renders each scene file in turn.
///
/// SIGHUP (Ctrl-Break on Windows) skips the current scene; Ctrl-C or
/// SIGTERM stops the whole queue.
#[derive(Debug, Parser)]
#[command(name = "renderq", version)]
pub struct Cli {
    /// Increase output verbosity (show DEBUG messages)
    #[arg(long, conflicts_with_all = ["quiet", "very_quiet"])]
    pub verbose: bool,

    /// Reduce output verbosity (hide INFO messages)
    #[arg(short, long)]
    pub quiet: bool,

    /// Reduce output verbosity even more (hide WARNING messages)
    #[arg(short = 'x', long)]
    pub very_quiet: bool,

    /// Enable debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Disable random seed mode
    #[arg(short, long)]
    pub fixedseed: bool,

    /// Number of rendering threads [default: logical cores]
    #[arg(short, long, value_name = "T")]
    pub threads: Option<usize>,

    /// Address of a rendering server to use (repeatable)
    #[arg(short = 'u', long, value_name = "ADDR", action = ArgAction::Append)]
    pub useserver: Vec<String>,

    /// Seconds between requests to rendering servers
    #[arg(short = 'i', long, value_name = "S")]
    pub serverinterval: Option<u32>,

    /// Configuration file [default: ./renderq.ron if present]
    #[arg(short = 'C', long, value_name = "PATH")]
    pub configfile: Option<PathBuf>,

    /// Also write the log to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Samples per pixel at which the built-in engine stops
    #[arg(long, value_name = "SPP")]
    pub halt_spp: Option<f64>,

    /// Film resolution of the built-in engine
    #[arg(long, value_name = "WxH", value_parser = parse_resolution)]
    pub resolution: Option<(u32, u32)>,

    /// Scene files to render, in order
    #[arg(required = true, value_name = "SCENE")]
    pub scenes: Vec<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else if self.very_quiet {
            LevelFilter::Error
        } else if self.quiet {
            LevelFilter::Warn
        } else {
            LevelFilter::Info
        }
    }

    pub fn sim_settings(&self) -> SimSettings {
        let mut settings = SimSettings::default();
        if let Some(spp) = self.halt_spp {
            settings.halt_spp = spp;
        }
        if let Some((width, height)) = self.resolution {
            settings.width = width;
            settings.height = height;
        }
        settings
    }
}

fn parse_resolution(raw: &str) -> Result<(u32, u32), String> {
    let (width, height) = raw
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got {raw:?}"))?;
    let width: u32 = width.trim().parse().map_err(|e| format!("bad width: {e}"))?;
    let height: u32 = height.trim().parse().map_err(|e| format!("bad height: {e}"))?;
    if width == 0 || height == 0 {
        return Err("resolution must be non-zero".to_string());
    }
    Ok((width, height))
}
