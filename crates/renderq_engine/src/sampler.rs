use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use renderq_core::{NetworkProgress, ProgressSnapshot};
use renderq_logging::{queue_debug, queue_info};

use crate::{Attribute, EngineError, PeriodicTask, RenderContext, Statistic};

/// Default time between background samples.
pub const SAMPLER_INTERVAL: Duration = Duration::from_millis(500);

/// Log source of progress lines.
pub const STATS_SOURCE: &str = "Stats";

/// Periodically reads a context's live statistics.
///
/// The background task only refreshes the cached snapshot; [`poke`](Self::poke)
/// samples and logs synchronously on the caller's thread.
pub struct ProgressSampler {
    core: Arc<SamplerCore>,
    task: PeriodicTask<EngineError>,
}

struct SamplerCore {
    context: Arc<dyn RenderContext>,
    state: Mutex<SamplerState>,
}

#[derive(Default)]
struct SamplerState {
    /// Zero until the engine reports a resolution; fixed afterwards.
    pixels: u64,
    last: Option<ProgressSnapshot>,
}

impl ProgressSampler {
    pub fn new(context: Arc<dyn RenderContext>) -> Self {
        Self::with_timing(context, SAMPLER_INTERVAL, Duration::ZERO)
    }

    pub fn with_timing(
        context: Arc<dyn RenderContext>,
        interval: Duration,
        startup_delay: Duration,
    ) -> Self {
        let name = format!("sampler-{}", context.name());
        Self {
            core: Arc::new(SamplerCore {
                context,
                state: Mutex::new(SamplerState::default()),
            }),
            task: PeriodicTask::new(name, interval).with_startup_delay(startup_delay),
        }
    }

    /// Seeds the pixel count from a resolution the caller already read.
    pub fn seed_resolution(&self, width: f64, height: f64) {
        let mut state = self.core.lock();
        if state.pixels == 0 {
            state.pixels = pixel_count(width, height);
        }
    }

    pub fn start(&mut self) -> io::Result<()> {
        let core = self.core.clone();
        self.task.start(move || core.kick().map(|_| ()))
    }

    pub fn set_interval(&self, interval: Duration) {
        self.task.set_interval(interval);
    }

    /// Reads the statistics once and caches the result.
    pub fn kick(&self) -> Result<ProgressSnapshot, EngineError> {
        self.core.kick()
    }

    /// Samples now and logs the progress line.
    pub fn poke(&self) -> Result<ProgressSnapshot, EngineError> {
        let snapshot = self.core.kick()?;
        match snapshot.status_line() {
            Some(line) => queue_info!(source: STATS_SOURCE, "{}", line),
            None => queue_debug!(source: STATS_SOURCE, "Waiting for render statistics"),
        }
        Ok(snapshot)
    }

    pub fn last_snapshot(&self) -> Option<ProgressSnapshot> {
        self.core.lock().last
    }

    pub fn pixels(&self) -> u64 {
        self.core.lock().pixels
    }

    /// Stops the background task and returns the failure that ended it early,
    /// if any.
    pub fn finish(&mut self) -> Result<(), EngineError> {
        self.task.stop();
        self.task.join()
    }
}

impl SamplerCore {
    fn lock(&self) -> MutexGuard<'_, SamplerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn kick(&self) -> Result<ProgressSnapshot, EngineError> {
        let ctx = self.context.as_ref();
        let mut state = self.lock();

        if state.pixels == 0 {
            let width = ctx.attribute(Attribute::FILM_X_RESOLUTION)?;
            let height = ctx.attribute(Attribute::FILM_Y_RESOLUTION)?;
            state.pixels = pixel_count(width, height);
        }

        let elapsed_secs = ctx.statistic(Statistic::SecElapsed)?;
        let local_samples = ctx.attribute(Attribute::FILM_LOCAL_SAMPLES)?;

        let servers = ctx.server_count()?;
        let network = if servers > 0 {
            Some(NetworkProgress {
                servers,
                samples: ctx.attribute(Attribute::FILM_NETWORK_SAMPLES)?,
            })
        } else {
            None
        };

        let snapshot = ProgressSnapshot {
            elapsed_secs,
            pixels: state.pixels,
            local_samples,
            network,
        };
        state.last = Some(snapshot);
        Ok(snapshot)
    }
}

fn pixel_count(width: f64, height: f64) -> u64 {
    let width = if width.is_finite() { width.max(0.0) as u64 } else { 0 };
    let height = if height.is_finite() { height.max(0.0) as u64 } else { 0 };
    width.saturating_mul(height)
}
