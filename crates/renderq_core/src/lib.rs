//! Render queue core: job state machine, stop reasons and progress formatting.
mod phase;
mod progress;
mod report;
mod signal;
mod stop;

pub use phase::{JobEvent, JobPhase, TransitionError};
pub use progress::{format_elapsed_time, NetworkProgress, ProgressSnapshot};
pub use report::{JobOutcome, JobReport, QueueReport, QueueTally};
pub use signal::{OperatorSignal, SKIP_SIGNAL, TRAPPED_SIGNALS};
pub use stop::StopReason;
