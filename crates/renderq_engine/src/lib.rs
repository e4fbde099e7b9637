//! Render queue engine: context contract, timers, signal dispatch and the
//! job orchestration loop.
mod context;
mod error;
mod interrupt;
mod options;
mod orchestrator;
mod periodic;
mod sampler;
mod signals;
pub mod sim;

pub use context::{Attribute, ContextFactory, RenderContext, SceneFile, Statistic};
pub use error::{EngineError, SignalError};
pub use interrupt::Interrupt;
pub use options::{OrchestratorSettings, RenderOptions};
pub use orchestrator::JobOrchestrator;
pub use periodic::{PeriodicTask, StopHandle};
pub use sampler::{ProgressSampler, SAMPLER_INTERVAL, STATS_SOURCE};
pub use signals::{dispatch_signal, SignalController};
pub use sim::{SimSettings, SimulatedEngine};
