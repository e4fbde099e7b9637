mod cli;
mod config;
mod logging;

use anyhow::Context;
use clap::Parser;
use renderq_engine::{
    Interrupt, JobOrchestrator, OrchestratorSettings, SignalController, SimulatedEngine,
};
use renderq_logging::{queue_info, queue_warn};

use crate::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(cli.log_level(), cli.log_file.as_deref());

    let file_config = config::load(cli.configfile.as_deref())?;
    let options = config::render_options(&cli, file_config);

    if options.fixed_seed && !options.applies_fixed_seed() {
        queue_warn!("Using random seed for network rendering");
    }
    queue_info!("Threads: {}", options.resolved_threads());
    if !options.servers.is_empty() {
        match options.server_interval {
            Some(secs) => queue_info!("Server request interval: {} secs", secs),
            None => queue_info!("Server request interval: engine default"),
        }
    }

    let interrupt = Interrupt::new();
    let _signals =
        SignalController::install(interrupt.clone()).context("installing signal handlers")?;

    let engine = SimulatedEngine::new(cli.sim_settings());
    let mut orchestrator = JobOrchestrator::new(
        engine,
        options,
        OrchestratorSettings::default(),
        interrupt,
    );
    let report = orchestrator.run(&cli.scenes);

    queue_info!("Render queue finished: {}", report.tally());
    Ok(())
}
