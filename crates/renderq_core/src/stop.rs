use std::fmt;

use crate::OperatorSignal;

/// Why a job's wait loop was cut short.
///
/// `Skip` abandons the current job only; `Abort` also stops the queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    Skip { reason: String },
    Abort { reason: String },
}

impl StopReason {
    pub fn skip(reason: impl Into<String>) -> Self {
        StopReason::Skip {
            reason: reason.into(),
        }
    }

    pub fn abort(reason: impl Into<String>) -> Self {
        StopReason::Abort {
            reason: reason.into(),
        }
    }

    /// Classifies a trapped operator signal.
    pub fn from_signal(signal: OperatorSignal) -> Self {
        let reason = format!("Caught signal {signal}");
        if signal.is_skip() {
            Self::skip(reason)
        } else {
            Self::abort(reason)
        }
    }

    pub fn is_abort(&self) -> bool {
        matches!(self, StopReason::Abort { .. })
    }

    pub fn reason(&self) -> &str {
        match self {
            StopReason::Skip { reason } | StopReason::Abort { reason } => reason,
        }
    }

    /// Combines two pending reasons. An abort is never downgraded to a skip.
    pub fn merge(self, newer: StopReason) -> StopReason {
        match (&self, &newer) {
            (StopReason::Abort { .. }, StopReason::Skip { .. }) => self,
            _ => newer,
        }
    }
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}
