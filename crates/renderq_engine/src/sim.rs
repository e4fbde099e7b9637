//! In-process stand-in for a native rendering engine.
//!
//! Implements the context contract with synthetic statistics so the queue
//! can be driven end to end without an engine library. No pixels are
//! computed; samples accrue at a fixed rate per worker thread and per
//! attached server until the halt target is met.

use std::fs;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use renderq_logging::{queue_debug, queue_warn};

use crate::{Attribute, ContextFactory, EngineError, RenderContext, SceneFile, Statistic};

/// Server polling interval used when none is configured.
const DEFAULT_SERVER_INTERVAL_SECS: u32 = 180;

#[derive(Debug, Clone, PartialEq)]
pub struct SimSettings {
    pub width: u32,
    pub height: u32,
    pub samples_per_thread_per_sec: f64,
    pub samples_per_server_per_sec: f64,
    /// Samples per pixel after which the render counts as finished.
    pub halt_spp: f64,
    pub parse_delay: Duration,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            samples_per_thread_per_sec: 250_000.0,
            samples_per_server_per_sec: 200_000.0,
            halt_spp: 64.0,
            parse_delay: Duration::from_millis(200),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SimulatedEngine {
    settings: SimSettings,
}

impl SimulatedEngine {
    pub fn new(settings: SimSettings) -> Self {
        Self { settings }
    }
}

impl ContextFactory for SimulatedEngine {
    fn create(&self, name: &str) -> Result<Arc<dyn RenderContext>, EngineError> {
        Ok(Arc::new(SimContext::new(name, self.settings.clone())))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Idle,
    Parsing,
    Ready,
    Failed,
}

struct SimState {
    debug: bool,
    random: bool,
    server_interval_secs: u32,
    servers: Vec<String>,
    parse: ParseState,
    /// Render start; set when the scene becomes ready.
    started: Option<Instant>,
    stopped_at: Option<Instant>,
    threads: u32,
    /// Local samples banked before the last thread count change.
    banked: f64,
    banked_at: Option<Instant>,
}

pub struct SimContext {
    name: String,
    settings: SimSettings,
    state: Arc<Mutex<SimState>>,
    parser: Mutex<Option<JoinHandle<()>>>,
}

impl SimContext {
    pub fn new(name: impl Into<String>, settings: SimSettings) -> Self {
        Self {
            name: name.into(),
            settings,
            state: Arc::new(Mutex::new(SimState {
                debug: false,
                random: true,
                server_interval_secs: DEFAULT_SERVER_INTERVAL_SECS,
                servers: Vec::new(),
                parse: ParseState::Idle,
                started: None,
                stopped_at: None,
                threads: 0,
                banked: 0.0,
                banked_at: None,
            })),
            parser: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        lock_state(&self.state)
    }

    fn pixels(&self) -> f64 {
        f64::from(self.settings.width) * f64::from(self.settings.height)
    }

    fn target_samples(&self) -> f64 {
        self.pixels() * self.settings.halt_spp
    }

    fn now(state: &SimState) -> Instant {
        state.stopped_at.unwrap_or_else(Instant::now)
    }

    fn elapsed(state: &SimState) -> f64 {
        match state.started {
            Some(started) => Self::now(state).duration_since(started).as_secs_f64(),
            None => 0.0,
        }
    }

    fn raw_local_samples(&self, state: &SimState) -> f64 {
        let Some(banked_at) = state.banked_at else {
            return 0.0;
        };
        let running = Self::now(state).duration_since(banked_at).as_secs_f64();
        state.banked + running * f64::from(state.threads) * self.settings.samples_per_thread_per_sec
    }

    /// Network samples arrive in batches, once per server polling interval.
    fn raw_network_samples(&self, state: &SimState) -> f64 {
        if state.servers.is_empty() || state.server_interval_secs == 0 {
            return 0.0;
        }
        let interval = f64::from(state.server_interval_secs);
        let collected = (Self::elapsed(state) / interval).floor() * interval;
        collected * state.servers.len() as f64 * self.settings.samples_per_server_per_sec
    }

    /// Local and network samples, scaled down together so their sum never
    /// passes the halt target.
    fn samples(&self, state: &SimState) -> (f64, f64) {
        let local = self.raw_local_samples(state);
        let network = self.raw_network_samples(state);
        let total = local + network;
        let target = self.target_samples();
        if total > target && total > 0.0 {
            let scale = target / total;
            (local * scale, network * scale)
        } else {
            (local, network)
        }
    }

    /// Compares unscaled counts; the scaled pair can sum to just under the target.
    fn enough_samples(&self, state: &SimState) -> bool {
        let total = self.raw_local_samples(state) + self.raw_network_samples(state);
        state.parse == ParseState::Ready && total >= self.target_samples()
    }
}

fn lock_state(state: &Mutex<SimState>) -> MutexGuard<'_, SimState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RenderContext for SimContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn enable_debug_mode(&self) -> Result<(), EngineError> {
        self.lock().debug = true;
        Ok(())
    }

    fn disable_random_mode(&self) -> Result<(), EngineError> {
        self.lock().random = false;
        Ok(())
    }

    fn set_network_server_update_interval(&self, secs: u32) -> Result<(), EngineError> {
        self.lock().server_interval_secs = secs;
        Ok(())
    }

    fn add_server(&self, address: &str) -> Result<(), EngineError> {
        if address.trim().is_empty() {
            return Err(EngineError::Engine("empty server address".to_string()));
        }
        self.lock().servers.push(address.to_string());
        Ok(())
    }

    fn parse(&self, scene: &SceneFile) -> Result<(), EngineError> {
        {
            let mut state = self.lock();
            if state.parse != ParseState::Idle {
                return Err(EngineError::Engine(format!(
                    "context {} already has a scene",
                    self.name
                )));
            }
            state.parse = ParseState::Parsing;
            if state.debug {
                queue_debug!(
                    "sim: parsing {} (base dir {}, random seed {})",
                    scene.path.display(),
                    scene.base_dir.display(),
                    state.random
                );
            }
        }

        let state = self.state.clone();
        let path = scene.path.clone();
        let delay = self.settings.parse_delay;
        let handle = thread::Builder::new()
            .name(format!("sim-parse-{}", self.name))
            .spawn(move || {
                thread::sleep(delay);
                let readable = fs::metadata(&path).map(|meta| meta.is_file() && meta.len() > 0);
                let mut state = lock_state(&state);
                if state.stopped_at.is_some() {
                    state.parse = ParseState::Failed;
                    return;
                }
                match readable {
                    Ok(true) => {
                        let now = Instant::now();
                        state.parse = ParseState::Ready;
                        state.started = Some(now);
                        state.banked_at = Some(now);
                        state.threads = 1;
                    }
                    Ok(false) => {
                        queue_warn!("sim: scene {} is empty", path.display());
                        state.parse = ParseState::Failed;
                    }
                    Err(err) => {
                        queue_warn!("sim: cannot read scene {}: {}", path.display(), err);
                        state.parse = ParseState::Failed;
                    }
                }
            })?;
        *self.parser.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
        Ok(())
    }

    fn parse_successful(&self) -> bool {
        self.lock().parse != ParseState::Failed
    }

    fn statistic(&self, statistic: Statistic) -> Result<f64, EngineError> {
        let state = self.lock();
        let flag = |set: bool| if set { 1.0 } else { 0.0 };
        let value = match statistic {
            Statistic::SceneIsReady => flag(state.parse == ParseState::Ready),
            // The simulated film never produces output of its own.
            Statistic::FilmIsReady => 0.0,
            Statistic::Terminated => flag(state.stopped_at.is_some()),
            Statistic::EnoughSamples => flag(self.enough_samples(&state)),
            Statistic::SecElapsed => Self::elapsed(&state),
        };
        Ok(value)
    }

    fn attribute(&self, attribute: Attribute) -> Result<f64, EngineError> {
        let state = self.lock();
        let ready = state.parse == ParseState::Ready;
        let value = match attribute {
            Attribute::FILM_X_RESOLUTION if ready => f64::from(self.settings.width),
            Attribute::FILM_Y_RESOLUTION if ready => f64::from(self.settings.height),
            Attribute::FILM_X_RESOLUTION | Attribute::FILM_Y_RESOLUTION => 0.0,
            Attribute::FILM_LOCAL_SAMPLES => self.samples(&state).0,
            Attribute::FILM_NETWORK_SAMPLES => self.samples(&state).1,
            Attribute { category, name } => {
                return Err(EngineError::AttributeUnavailable { category, name })
            }
        };
        Ok(value)
    }

    fn server_count(&self) -> Result<u32, EngineError> {
        let state = self.lock();
        if state.parse == ParseState::Ready {
            Ok(u32::try_from(state.servers.len()).unwrap_or(u32::MAX))
        } else {
            Ok(0)
        }
    }

    fn add_thread(&self) -> Result<(), EngineError> {
        let mut state = self.lock();
        if state.parse != ParseState::Ready {
            return Err(EngineError::Engine(
                "threads can only be added to a ready scene".to_string(),
            ));
        }
        let now = Instant::now();
        state.banked = self.raw_local_samples(&state);
        state.banked_at = Some(now);
        state.threads += 1;
        Ok(())
    }

    fn exit(&self) {
        let mut state = self.lock();
        if state.stopped_at.is_none() {
            state.stopped_at = Some(Instant::now());
        }
    }

    fn wait(&self) {
        let handle = self
            .parser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
        }
    }

    fn cleanup(&self) {
        let mut state = self.lock();
        state.servers.clear();
        state.threads = 0;
        queue_debug!("sim: context {} cleaned up", self.name);
    }
}
