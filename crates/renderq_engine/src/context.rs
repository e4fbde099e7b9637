use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::EngineError;

/// A scalar engine attribute addressed by (category, name).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Attribute {
    pub category: &'static str,
    pub name: &'static str,
}

impl Attribute {
    pub const FILM_X_RESOLUTION: Attribute = Attribute::film("xResolution");
    pub const FILM_Y_RESOLUTION: Attribute = Attribute::film("yResolution");
    pub const FILM_LOCAL_SAMPLES: Attribute = Attribute::film("numberOfLocalSamples");
    pub const FILM_NETWORK_SAMPLES: Attribute = Attribute::film("numberOfSamplesFromNetwork");

    const fn film(name: &'static str) -> Self {
        Self {
            category: "film",
            name,
        }
    }
}

/// Render statistics exposed by a context. Flags read as `1.0` when set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statistic {
    SceneIsReady,
    FilmIsReady,
    Terminated,
    EnoughSamples,
    SecElapsed,
}

impl Statistic {
    pub fn name(self) -> &'static str {
        match self {
            Statistic::SceneIsReady => "sceneIsReady",
            Statistic::FilmIsReady => "filmIsReady",
            Statistic::Terminated => "terminated",
            Statistic::EnoughSamples => "enoughSamples",
            Statistic::SecElapsed => "secElapsed",
        }
    }
}

/// A scene submitted to the engine, with the directory its relative
/// references resolve against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneFile {
    pub path: PathBuf,
    pub base_dir: PathBuf,
}

impl SceneFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let base_dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self { path, base_dir }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One engine rendering context: the opaque state of a single render.
///
/// Calls take `&self` because the context is read concurrently by the
/// progress sampler while the orchestrator drives it.
pub trait RenderContext: Send + Sync {
    fn name(&self) -> &str;

    fn enable_debug_mode(&self) -> Result<(), EngineError>;
    fn disable_random_mode(&self) -> Result<(), EngineError>;
    fn set_network_server_update_interval(&self, secs: u32) -> Result<(), EngineError>;
    fn add_server(&self, address: &str) -> Result<(), EngineError>;

    /// Starts an asynchronous parse and returns immediately.
    fn parse(&self, scene: &SceneFile) -> Result<(), EngineError>;
    fn parse_successful(&self) -> bool;

    fn statistic(&self, statistic: Statistic) -> Result<f64, EngineError>;
    fn attribute(&self, attribute: Attribute) -> Result<f64, EngineError>;
    fn server_count(&self) -> Result<u32, EngineError>;

    fn add_thread(&self) -> Result<(), EngineError>;

    fn exit(&self);
    /// Blocks until the context's workers have stopped.
    fn wait(&self);
    fn cleanup(&self);

    fn flag(&self, statistic: Statistic) -> Result<bool, EngineError> {
        let value = self.statistic(statistic)?;
        Ok((value - 1.0).abs() < f64::EPSILON)
    }
}

/// Creates one named context per job. Dropping the last handle releases it.
pub trait ContextFactory {
    fn create(&self, name: &str) -> Result<Arc<dyn RenderContext>, EngineError>;
}
