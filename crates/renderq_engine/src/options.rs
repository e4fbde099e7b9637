use std::thread;
use std::time::Duration;

/// Per-context configuration applied before a scene is parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    pub debug: bool,
    pub fixed_seed: bool,
    /// Total worker threads per context; `None` uses the host's parallelism.
    pub threads: Option<usize>,
    pub servers: Vec<String>,
    /// Seconds between film requests to remote servers.
    pub server_interval: Option<u32>,
}

impl RenderOptions {
    /// Worker threads to run, never less than one.
    pub fn resolved_threads(&self) -> usize {
        self.threads
            .unwrap_or_else(|| thread::available_parallelism().map_or(1, |n| n.get()))
            .max(1)
    }

    /// Fixed seeding only applies to purely local renders.
    pub fn applies_fixed_seed(&self) -> bool {
        self.fixed_seed && self.servers.is_empty()
    }
}

/// Timing of the orchestration loops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub ready_poll: Duration,
    pub render_poll: Duration,
    pub sampler_interval: Duration,
    pub sampler_startup_delay: Duration,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            ready_poll: Duration::from_millis(300),
            render_poll: Duration::from_secs(5),
            sampler_interval: Duration::from_millis(500),
            sampler_startup_delay: Duration::ZERO,
        }
    }
}
