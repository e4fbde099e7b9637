use std::io;

use renderq_core::OperatorSignal;
use thiserror::Error;

/// Failure reported by a rendering engine call.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("attribute {category}.{name} is unavailable")]
    AttributeUnavailable {
        category: &'static str,
        name: &'static str,
    },
    #[error("statistic {0} is unavailable")]
    StatisticUnavailable(&'static str),
    #[error("scene file {path} rejected: {message}")]
    SceneRejected { path: String, message: String },
    #[error("engine error: {0}")]
    Engine(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Debug, Error)]
pub enum SignalError {
    #[error("failed to start signal dispatcher: {0}")]
    Runtime(#[source] io::Error),
    #[error("failed to install handler for {signal}: {source}")]
    Install {
        signal: OperatorSignal,
        #[source]
        source: io::Error,
    },
    #[error("signal dispatcher exited before installing handlers")]
    DispatcherGone,
}
