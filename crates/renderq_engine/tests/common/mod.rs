#![allow(dead_code)]

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use renderq_engine::{
    Attribute, ContextFactory, EngineError, OrchestratorSettings, RenderContext, SceneFile,
    Statistic,
};

/// Called with the context name and the render poll index on every
/// "enough samples" check.
pub type RenderHook = Arc<dyn Fn(&str, usize) + Send + Sync>;

#[derive(Clone)]
pub struct Script {
    pub ready_after: usize,
    pub parse_fails: bool,
    pub done_after: usize,
    pub width: f64,
    pub height: f64,
    /// Resolution reads before the engine reports a non-zero size.
    pub resolution_after: usize,
    pub servers: u32,
    pub fail_add_thread: bool,
    pub fail_elapsed: bool,
    pub on_render_poll: Option<RenderHook>,
}

impl Default for Script {
    fn default() -> Self {
        Self {
            ready_after: 2,
            parse_fails: false,
            done_after: 3,
            width: 10.0,
            height: 5.0,
            resolution_after: 0,
            servers: 0,
            fail_add_thread: false,
            fail_elapsed: false,
            on_render_poll: None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Calls {
    pub created: Vec<String>,
    /// Ordered contract calls, prefixed by context name.
    pub events: Vec<String>,
    pub add_thread: usize,
    pub exit: usize,
    pub wait: usize,
    pub cleanup: usize,
    pub released: usize,
    pub resolution_reads: usize,
    pub network_reads: usize,
}

#[derive(Clone, Default)]
pub struct MockEngine {
    calls: Arc<Mutex<Calls>>,
    scripts: HashMap<String, Script>,
    fallback: Script,
}

impl MockEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the scene whose path ends with `file_name`.
    pub fn script(mut self, file_name: &str, script: Script) -> Self {
        self.scripts.insert(file_name.to_string(), script);
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().unwrap().clone()
    }

    pub fn context(&self, name: &str) -> Arc<MockContext> {
        Arc::new(MockContext::new(name, self.script_for(name), self.calls.clone()))
    }

    fn script_for(&self, name: &str) -> Script {
        self.scripts
            .iter()
            .find(|(file_name, _)| name.ends_with(file_name.as_str()))
            .map(|(_, script)| script.clone())
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl ContextFactory for MockEngine {
    fn create(&self, name: &str) -> Result<Arc<dyn RenderContext>, EngineError> {
        self.calls.lock().unwrap().created.push(name.to_string());
        Ok(self.context(name))
    }
}

pub struct MockContext {
    name: String,
    script: Script,
    calls: Arc<Mutex<Calls>>,
    ready_checks: AtomicUsize,
    render_checks: AtomicUsize,
    resolution_reads: AtomicUsize,
}

impl MockContext {
    fn new(name: &str, script: Script, calls: Arc<Mutex<Calls>>) -> Self {
        Self {
            name: name.to_string(),
            script,
            calls,
            ready_checks: AtomicUsize::new(0),
            render_checks: AtomicUsize::new(0),
            resolution_reads: AtomicUsize::new(0),
        }
    }

    fn record(&self, event: &str) {
        self.calls
            .lock()
            .unwrap()
            .events
            .push(format!("{}:{}", short_name(&self.name), event));
    }

    fn resolution(&self, value: f64) -> f64 {
        self.calls.lock().unwrap().resolution_reads += 1;
        let reads = self.resolution_reads.fetch_add(1, Ordering::SeqCst);
        // Width and height are read in pairs.
        if reads / 2 < self.script.resolution_after {
            0.0
        } else {
            value
        }
    }
}

impl RenderContext for MockContext {
    fn name(&self) -> &str {
        &self.name
    }

    fn enable_debug_mode(&self) -> Result<(), EngineError> {
        self.record("debug");
        Ok(())
    }

    fn disable_random_mode(&self) -> Result<(), EngineError> {
        self.record("fixed-seed");
        Ok(())
    }

    fn set_network_server_update_interval(&self, secs: u32) -> Result<(), EngineError> {
        self.record(&format!("interval={secs}"));
        Ok(())
    }

    fn add_server(&self, address: &str) -> Result<(), EngineError> {
        self.record(&format!("server={address}"));
        Ok(())
    }

    fn parse(&self, _scene: &SceneFile) -> Result<(), EngineError> {
        self.record("parse");
        Ok(())
    }

    fn parse_successful(&self) -> bool {
        !self.script.parse_fails
    }

    fn statistic(&self, statistic: Statistic) -> Result<f64, EngineError> {
        let flag = |set: bool| if set { 1.0 } else { 0.0 };
        let value = match statistic {
            Statistic::SceneIsReady => {
                let checks = self.ready_checks.fetch_add(1, Ordering::SeqCst);
                flag(!self.script.parse_fails && checks >= self.script.ready_after)
            }
            Statistic::FilmIsReady | Statistic::Terminated => 0.0,
            Statistic::EnoughSamples => {
                let poll = self.render_checks.fetch_add(1, Ordering::SeqCst);
                if let Some(hook) = &self.script.on_render_poll {
                    hook(&self.name, poll);
                }
                flag(poll >= self.script.done_after)
            }
            Statistic::SecElapsed => {
                if self.script.fail_elapsed {
                    return Err(EngineError::StatisticUnavailable("secElapsed"));
                }
                10.0 * (self.render_checks.load(Ordering::SeqCst) as f64 + 1.0)
            }
        };
        Ok(value)
    }

    fn attribute(&self, attribute: Attribute) -> Result<f64, EngineError> {
        let value = match attribute {
            Attribute::FILM_X_RESOLUTION => self.resolution(self.script.width),
            Attribute::FILM_Y_RESOLUTION => self.resolution(self.script.height),
            Attribute::FILM_LOCAL_SAMPLES => 1000.0,
            Attribute::FILM_NETWORK_SAMPLES => {
                self.calls.lock().unwrap().network_reads += 1;
                500.0
            }
            Attribute { category, name } => {
                return Err(EngineError::AttributeUnavailable { category, name })
            }
        };
        Ok(value)
    }

    fn server_count(&self) -> Result<u32, EngineError> {
        Ok(self.script.servers)
    }

    fn add_thread(&self) -> Result<(), EngineError> {
        if self.script.fail_add_thread {
            return Err(EngineError::Engine("thread pool exhausted".into()));
        }
        self.calls.lock().unwrap().add_thread += 1;
        Ok(())
    }

    fn exit(&self) {
        self.record("exit");
        self.calls.lock().unwrap().exit += 1;
    }

    fn wait(&self) {
        self.record("wait");
        self.calls.lock().unwrap().wait += 1;
    }

    fn cleanup(&self) {
        self.record("cleanup");
        self.calls.lock().unwrap().cleanup += 1;
    }
}

impl Drop for MockContext {
    fn drop(&mut self) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.released += 1;
            calls
                .events
                .push(format!("{}:release", short_name(&self.name)));
        }
    }
}

fn short_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| name.to_string())
}

/// Millisecond-scale timings so tests finish quickly.
pub fn fast_settings() -> OrchestratorSettings {
    OrchestratorSettings {
        ready_poll: Duration::from_millis(1),
        render_poll: Duration::from_millis(1),
        sampler_interval: Duration::from_millis(1),
        sampler_startup_delay: Duration::ZERO,
    }
}

pub fn write_scene(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "WorldBegin\nWorldEnd\n").unwrap();
    path
}

/// Polls `condition` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    condition()
}
